use std::sync::Arc;

use smallvec::ToSmallVec;

use crate::{
    ComposableTransform, ComposesWith, Error, Invertible, Matrix, ShortVec, Transform,
    TransformKind, VComposableTransform, VInvertible, Vectorizable,
    vectorizable::check_vector_len,
};

/// Multiply each coordinate value by a constant factor.
///
/// Factors may be negative (reflection) or zero (projection onto a hyperplane);
/// zero factors make the scale non-invertible.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale(ShortVec<f64>);

impl Scale {
    pub fn try_new(scale: &[f64]) -> Result<Self, Error> {
        check_factors(scale)?;
        Ok(Self(scale.to_smallvec()))
    }

    /// The same factor for every dimension.
    pub fn uniform(factor: f64, n_dims: usize) -> Result<Self, Error> {
        Self::try_new(&vec![factor; n_dims])
    }

    pub fn factors(&self) -> &[f64] {
        &self.0
    }
}

fn check_factors(scale: &[f64]) -> Result<(), Error> {
    for s in scale.iter() {
        if s.is_subnormal() {
            return Err(Error::InvalidParameter("Scale is subnormal".into()));
        }
        if s.is_nan() {
            return Err(Error::InvalidParameter("Scale is NaN".into()));
        }
        if s.is_infinite() {
            return Err(Error::InvalidParameter("Scale is infinite".into()));
        }
    }
    Ok(())
}

impl Transform for Scale {
    fn n_dims(&self) -> Option<usize> {
        Some(self.0.len())
    }

    fn kind(&self) -> TransformKind {
        TransformKind::Scale
    }

    fn transform_into(&self, pt: &[f64], buf: &mut [f64]) {
        for ((o, p), s) in buf.iter_mut().zip(pt.iter()).zip(self.0.iter()) {
            *o = s * p;
        }
    }

    fn h_matrix(&self) -> Option<Matrix> {
        let mut diagonal = self.0.to_vec();
        diagonal.push(1.0);
        Some(Matrix::from_diagonal(&diagonal))
    }

    fn invert(&self) -> Option<Arc<dyn Transform>> {
        if !self.has_true_inverse() {
            return None;
        }
        self.pseudoinverse()
            .ok()
            .map(|t| Arc::new(t) as Arc<dyn Transform>)
    }

    fn as_composable(&self) -> Option<&dyn ComposableTransform> {
        Some(self)
    }

    fn as_composable_mut(&mut self) -> Option<&mut dyn ComposableTransform> {
        Some(self)
    }

    fn as_vectorizable(&self) -> Option<&dyn Vectorizable> {
        Some(self)
    }
}

impl Scale {
    fn multiply_by(&mut self, transform: &dyn Transform) -> Result<(), Error> {
        let other = transform
            .as_vectorizable()
            .ok_or(Error::NotVectorizable(transform.kind()))?
            .as_vector();
        check_vector_len(self.0.len(), &other)?;
        for (s, o) in self.0.iter_mut().zip(other.iter()) {
            *s *= o;
        }
        Ok(())
    }
}

impl ComposableTransform for Scale {
    fn composes_inplace_with(&self) -> ComposesWith {
        ComposesWith::Kinds(&[TransformKind::Scale])
    }

    fn compose_before_inplace_unchecked(&mut self, transform: &dyn Transform) -> Result<(), Error> {
        self.multiply_by(transform)
    }

    // diagonal matrices commute
    fn compose_after_inplace_unchecked(&mut self, transform: &dyn Transform) -> Result<(), Error> {
        self.multiply_by(transform)
    }
}

impl VComposableTransform for Scale {}

impl Vectorizable for Scale {
    fn n_parameters(&self) -> usize {
        self.0.len()
    }

    fn as_vector(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    fn update_from_vector(&mut self, vector: &[f64]) -> Result<(), Error> {
        check_vector_len(self.0.len(), vector)?;
        check_factors(vector)?;
        self.0.copy_from_slice(vector);
        Ok(())
    }
}

impl Invertible for Scale {
    fn has_true_inverse(&self) -> bool {
        self.0.iter().all(|s| *s != 0.0)
    }

    /// Zero factors stay zero.
    fn build_pseudoinverse(&self) -> Result<Self, Error> {
        Ok(Scale(
            self.0
                .iter()
                .map(|s| if *s == 0.0 { 0.0 } else { 1.0 / s })
                .collect(),
        ))
    }
}

impl VInvertible for Scale {}

#[cfg(test)]
mod tests {
    use super::Scale;
    use crate::tests::{
        assert_points_eq, check_compose_after, check_compose_before, check_compose_inplace,
        check_inverse, check_transform_points, init_logger,
    };
    use crate::{
        ComposableTransform, Invertible, Points, Transform, TransformExt, TransformKind,
        VComposableTransform, VInvertible,
    };
    use approx::assert_ulps_eq;

    fn make_transform() -> Scale {
        Scale::try_new(&[1.0, 0.5, 2.0]).unwrap()
    }

    fn other() -> Scale {
        Scale::try_new(&[4.0, -1.0, 0.25]).unwrap()
    }

    #[test]
    fn test_points() {
        check_transform_points(make_transform());
    }

    #[test]
    fn test_inverse() {
        check_inverse(make_transform());
    }

    #[test]
    fn test_compose() {
        init_logger();
        let composed = make_transform().compose_after(&other()).unwrap();
        assert_eq!(composed.kind(), TransformKind::Scale);
        check_compose_before(make_transform(), other());
        check_compose_after(make_transform(), other());
        check_compose_inplace(make_transform(), other());
    }

    #[test]
    fn test_compose_after_by_vectors_matches_native() {
        init_logger();
        let mut native = make_transform();
        native.compose_after_inplace(&other()).unwrap();

        let mut by_vectors = make_transform();
        by_vectors.compose_after_inplace_by_vectors(&other()).unwrap();

        assert_eq!(native, by_vectors);
    }

    #[test]
    fn test_pseudoinverse_of_degenerate_scale() {
        init_logger();
        let s = Scale::try_new(&[2.0, 0.0]).unwrap();
        assert!(!s.has_true_inverse());
        assert!(s.invert().is_none());

        let inv = s.pseudoinverse().unwrap();
        assert_ulps_eq!(inv.factors(), [0.5, 0.0].as_slice());

        let pts = Points::from_rows(&[[2.0, 3.0], [-4.0, 1.0]]).unwrap();
        let round_trip = inv.apply(&s.apply(&pts).unwrap()).unwrap();
        assert_points_eq(
            &round_trip,
            &Points::from_rows(&[[2.0, 0.0], [-4.0, 0.0]]).unwrap(),
        );
    }

    #[test]
    fn test_pseudoinverse_vector() {
        let s = make_transform();
        assert_ulps_eq!(
            s.pseudoinverse_vector(&[2.0, 4.0, 0.0]).unwrap().as_slice(),
            [0.5, 0.25, 0.0].as_slice()
        );
        assert!(s.pseudoinverse_vector(&[1.0]).is_err());
    }
}
