use std::sync::Arc;

use smallvec::ToSmallVec;

use crate::{
    Alignable, Alignment, ComposableTransform, ComposesWith, Error, Invertible, Matrix,
    PointCloud, ShortVec, Transform, TransformKind, VComposableTransform, VInvertible,
    Vectorizable, vectorizable::check_vector_len,
};

/// Translate each coordinate by adding a constant value.
///
/// When aligned, the translation maps the centre of the source onto the centre of the target.
#[derive(Debug, Clone)]
pub struct Translation {
    translation: ShortVec<f64>,
    alignment: Option<Alignment>,
}

impl Translation {
    pub fn try_new(translation: &[f64]) -> Result<Self, Error> {
        check_finite(translation)?;
        Ok(Self {
            translation: translation.to_smallvec(),
            alignment: None,
        })
    }

    pub fn translation(&self) -> &[f64] {
        &self.translation
    }
}

fn check_finite(translation: &[f64]) -> Result<(), Error> {
    for t in translation.iter() {
        if t.is_nan() {
            return Err(Error::InvalidParameter("Translation is NaN".into()));
        }
        if t.is_infinite() {
            return Err(Error::InvalidParameter("Translation is infinite".into()));
        }
    }
    Ok(())
}

fn centre_difference(source: &PointCloud, target: &PointCloud) -> ShortVec<f64> {
    source
        .centre()
        .iter()
        .zip(target.centre().iter())
        .map(|(s, t)| t - s)
        .collect()
}

impl Transform for Translation {
    fn n_dims(&self) -> Option<usize> {
        Some(self.translation.len())
    }

    fn kind(&self) -> TransformKind {
        TransformKind::Translation
    }

    fn transform_into(&self, pt: &[f64], buf: &mut [f64]) {
        for ((o, p), t) in buf.iter_mut().zip(pt.iter()).zip(self.translation.iter()) {
            *o = t + p;
        }
    }

    fn h_matrix(&self) -> Option<Matrix> {
        let n = self.translation.len();
        let mut h = Matrix::identity(n + 1);
        for (r, t) in self.translation.iter().enumerate() {
            h[(r, n)] = *t;
        }
        Some(h)
    }

    fn invert(&self) -> Option<Arc<dyn Transform>> {
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

impl ComposableTransform for Translation {
    fn composes_inplace_with(&self) -> ComposesWith {
        ComposesWith::Kinds(&[TransformKind::Translation])
    }

    fn compose_before_inplace_unchecked(&mut self, transform: &dyn Transform) -> Result<(), Error> {
        let other = transform
            .as_vectorizable()
            .ok_or(Error::NotVectorizable(transform.kind()))?
            .as_vector();
        check_vector_len(self.translation.len(), &other)?;
        for (t, o) in self.translation.iter_mut().zip(other.iter()) {
            *t += o;
        }
        self.sync_target()
    }

    fn compose_after_inplace_unchecked(&mut self, transform: &dyn Transform) -> Result<(), Error> {
        self.compose_after_inplace_by_vectors(transform)
    }
}

impl VComposableTransform for Translation {}

impl Vectorizable for Translation {
    fn n_parameters(&self) -> usize {
        self.translation.len()
    }

    fn as_vector(&self) -> Vec<f64> {
        self.translation.to_vec()
    }

    fn update_from_vector(&mut self, vector: &[f64]) -> Result<(), Error> {
        check_vector_len(self.translation.len(), vector)?;
        check_finite(vector)?;
        self.translation.copy_from_slice(vector);
        self.sync_target()
    }
}

impl Invertible for Translation {
    fn has_true_inverse(&self) -> bool {
        true
    }

    fn build_pseudoinverse(&self) -> Result<Self, Error> {
        Ok(Self {
            translation: self.translation.iter().map(|t| -t).collect(),
            alignment: None,
        })
    }
}

impl VInvertible for Translation {
    fn pseudoinverse_vector(&self, vector: &[f64]) -> Result<Vec<f64>, Error> {
        check_vector_len(self.translation.len(), vector)?;
        Ok(vector.iter().map(|v| -v).collect())
    }
}

impl Alignable for Translation {
    type AlignOptions = ();

    fn align_unchecked(
        source: Arc<PointCloud>,
        target: Arc<PointCloud>,
        _options: Self::AlignOptions,
    ) -> Result<Self, Error> {
        let translation = centre_difference(&source, &target);
        check_finite(&translation)?;
        Ok(Self {
            translation,
            alignment: Some(Alignment::try_new(source, target)?),
        })
    }

    fn alignment(&self) -> Option<&Alignment> {
        self.alignment.as_ref()
    }

    fn set_target_unchecked(&mut self, target: Arc<PointCloud>) -> Result<(), Error> {
        let alignment = self.alignment.as_mut().ok_or(Error::NotAnAlignment)?;
        let translation = centre_difference(alignment.source(), &target);
        check_finite(&translation)?;
        alignment.set_target(target)?;
        self.translation = translation;
        Ok(())
    }
}
