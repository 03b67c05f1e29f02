use std::{fmt, sync::Arc};

use crate::{
    ComposableTransform, Error, Matrix, Points, TransformChain, TransformKind, Vectorizable,
};

/// The mapping handed to a [Transformable] object:
/// the checked primitive of a transform, with its options attached.
pub type TransformFn<'a> = dyn Fn(&Points) -> Result<Points, Error> + 'a;

/// Core spatial transformation interface.
///
/// Implementors supply the per-point primitive [Transform::transform_into];
/// application to arrays and [Transformable] objects,
/// and chain-based composition, are provided.
/// Optional capabilities (native composition, parameter vectors)
/// are exposed through the `as_*` queries.
pub trait Transform: fmt::Debug + Send + Sync + CloneTransform {
    /// Dimensionality of the input space; None if not constrained.
    fn n_dims(&self) -> Option<usize>;

    /// Dimensionality of the output space; None if not constrained.
    ///
    /// The same as the input unless overridden by a dimension-changing transform.
    fn n_dims_output(&self) -> Option<usize> {
        self.n_dims()
    }

    /// Tag identifying the concrete kind of transform, used for capability dispatch.
    fn kind(&self) -> TransformKind;

    /// Transform a single point from the input space to the output space.
    /// Writes to a pre-allocated output buffer.
    ///
    /// Implementations do not check bounds and may panic if given buffers of the wrong length.
    fn transform_into(&self, pt: &[f64], buf: &mut [f64]);

    /// Map an array of points to a new array.
    ///
    /// The trait default calls [Transform::transform_into] on every row;
    /// specific transforms may override it.
    fn transform_points(&self, points: &Points) -> Points {
        let out_ndim = self.n_dims_output().unwrap_or(points.n_dims());
        let mut out = Points::zeros(points.n_points(), out_ndim);
        for (pt, buf) in points.rows().zip(out.rows_mut()) {
            self.transform_into(pt, buf);
        }
        out
    }

    /// Augmented matrix representation, for transforms in the affine family.
    fn h_matrix(&self) -> Option<Matrix> {
        None
    }

    /// Return the (pseudo)inverse transformation, if it exists.
    fn invert(&self) -> Option<Arc<dyn Transform>> {
        None
    }

    fn as_composable(&self) -> Option<&dyn ComposableTransform> {
        None
    }

    fn as_composable_mut(&mut self) -> Option<&mut dyn ComposableTransform> {
        None
    }

    fn as_vectorizable(&self) -> Option<&dyn Vectorizable> {
        None
    }

    /// `c = a.compose_before(b)` gives `c.apply(p) == b.apply(a.apply(p))`.
    ///
    /// Composes natively if this transform can absorb `transform`
    /// and exposes [Transform::as_composable_mut],
    /// otherwise builds a [TransformChain].
    /// Neither operand is changed.
    fn compose_before(&self, transform: &dyn Transform) -> Result<Arc<dyn Transform>, Error> {
        check_connects(self.n_dims_output(), transform.n_dims())?;
        if self
            .as_composable()
            .is_some_and(|c| c.composes_inplace_with().accepts(transform))
        {
            let mut native = self.clone_box();
            if let Some(c) = native.as_composable_mut() {
                c.compose_before_inplace_unchecked(transform)?;
                return Ok(Arc::from(native));
            }
        }
        log::trace!("Chaining {} before {}", self.kind(), transform.kind());
        Ok(Arc::new(TransformChain::try_new(vec![
            self.clone_arc(),
            transform.clone_arc(),
        ])?))
    }

    /// `c = a.compose_after(b)` gives `c.apply(p) == a.apply(b.apply(p))`.
    ///
    /// Composes natively if this transform can absorb `transform`
    /// and exposes [Transform::as_composable_mut],
    /// otherwise builds a [TransformChain].
    /// Neither operand is changed.
    fn compose_after(&self, transform: &dyn Transform) -> Result<Arc<dyn Transform>, Error> {
        check_connects(transform.n_dims_output(), self.n_dims())?;
        if self
            .as_composable()
            .is_some_and(|c| c.composes_inplace_with().accepts(transform))
        {
            let mut native = self.clone_box();
            if let Some(c) = native.as_composable_mut() {
                c.compose_after_inplace_unchecked(transform)?;
                return Ok(Arc::from(native));
            }
        }
        log::trace!("Chaining {} after {}", self.kind(), transform.kind());
        Ok(Arc::new(TransformChain::try_new(vec![
            transform.clone_arc(),
            self.clone_arc(),
        ])?))
    }
}

/// Fails if an output of `out_ndim` cannot feed an input of `in_ndim`.
pub(crate) fn check_connects(out_ndim: Option<usize>, in_ndim: Option<usize>) -> Result<(), Error> {
    match (out_ndim, in_ndim) {
        (Some(expected), Some(found)) if expected != found => {
            Err(Error::DimensionMismatch { expected, found })
        }
        _ => Ok(()),
    }
}

/// Cloning for transform trait objects.
///
/// Implemented for every [Transform] which is [Clone].
pub trait CloneTransform {
    fn clone_box(&self) -> Box<dyn Transform>;

    fn clone_arc(&self) -> Arc<dyn Transform>;
}

impl<T: Transform + Clone + 'static> CloneTransform for T {
    fn clone_box(&self) -> Box<dyn Transform> {
        Box::new(self.clone())
    }

    fn clone_arc(&self) -> Arc<dyn Transform> {
        Arc::new(self.clone())
    }
}

impl Clone for Box<dyn Transform> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// An object which knows how to transform itself.
pub trait Transformable: Clone {
    /// Apply the mapping to this object, mutating it.
    fn transform_inplace(&mut self, transform: &TransformFn<'_>) -> Result<(), Error>;

    /// Apply the mapping to a copy of this object, leaving the original as it was.
    ///
    /// The trait default clones and then calls [Transformable::transform_inplace] on the copy.
    fn transformed(&self, transform: &TransformFn<'_>) -> Result<Self, Error> {
        let mut copy = self.clone();
        copy.transform_inplace(transform)?;
        Ok(copy)
    }
}

/// Per-call settings for applying a transform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Transform at most this many points at a time.
    /// None transforms all points at once.
    pub batch_size: Option<usize>,
}

impl ApplyOptions {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
}

/// Application of transforms to arrays and [Transformable] objects.
///
/// Implemented for every [Transform], including trait objects.
pub trait TransformExt: Transform {
    /// Map an array of points, checking its dimensionality
    /// and splitting it into batches if requested.
    fn apply_points(&self, points: &Points, options: &ApplyOptions) -> Result<Points, Error> {
        if let Some(expected) = self.n_dims() {
            if points.n_dims() != expected {
                return Err(Error::DimensionMismatch {
                    expected,
                    found: points.n_dims(),
                });
            }
        }
        match options.batch_size {
            Some(0) => Err(Error::InvalidParameter("batch size must be positive".into())),
            Some(size) if size < points.n_points() => {
                log::trace!("Transforming {} points in batches of {size}", points.n_points());
                let out_ndim = self.n_dims_output().unwrap_or(points.n_dims());
                let mut data = Vec::with_capacity(points.n_points() * out_ndim);
                for batch in points.batches(size) {
                    data.extend(self.transform_points(&batch).into_data());
                }
                Points::try_new(data, out_ndim)
            }
            _ => Ok(self.transform_points(points)),
        }
    }

    /// Apply this transform to `x`, mutating it.
    ///
    /// `x` is handed the mapping and transforms itself;
    /// a raw [Points] array is overwritten with the result.
    fn apply_inplace<X: Transformable>(&self, x: &mut X) -> Result<(), Error> {
        self.apply_inplace_with(x, &ApplyOptions::default())
    }

    fn apply_inplace_with<X: Transformable>(
        &self,
        x: &mut X,
        options: &ApplyOptions,
    ) -> Result<(), Error> {
        x.transform_inplace(&|pts: &Points| self.apply_points(pts, options))
    }

    /// Apply this transform to `x`, returning a transformed copy and leaving `x` as it was.
    fn apply<X: Transformable>(&self, x: &X) -> Result<X, Error> {
        self.apply_with(x, &ApplyOptions::default())
    }

    fn apply_with<X: Transformable>(&self, x: &X, options: &ApplyOptions) -> Result<X, Error> {
        x.transformed(&|pts: &Points| self.apply_points(pts, options))
    }
}

impl<T: Transform + ?Sized> TransformExt for T {}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{ComposesWith, tests::init_logger};

    /// Claims to compose natively, but only exposes the capability immutably.
    #[derive(Debug, Clone)]
    struct ReadOnlyComposable(f64);

    impl Transform for ReadOnlyComposable {
        fn n_dims(&self) -> Option<usize> {
            Some(1)
        }

        fn kind(&self) -> TransformKind {
            TransformKind::Custom("ReadOnlyComposable")
        }

        fn transform_into(&self, pt: &[f64], buf: &mut [f64]) {
            buf[0] = pt[0] + self.0;
        }

        fn as_composable(&self) -> Option<&dyn ComposableTransform> {
            Some(self)
        }
    }

    impl ComposableTransform for ReadOnlyComposable {
        fn composes_inplace_with(&self) -> ComposesWith {
            ComposesWith::Any
        }

        fn compose_before_inplace_unchecked(
            &mut self,
            _transform: &dyn Transform,
        ) -> Result<(), Error> {
            unreachable!("not reachable through the trait object")
        }

        fn compose_after_inplace_unchecked(
            &mut self,
            _transform: &dyn Transform,
        ) -> Result<(), Error> {
            unreachable!("not reachable through the trait object")
        }
    }

    #[test]
    fn test_compose_without_mutable_capability_chains() {
        init_logger();
        let a = ReadOnlyComposable(1.0);
        let b = ReadOnlyComposable(10.0);
        let pts = Points::from_rows(&[[0.0], [5.0]]).unwrap();

        let before = a.compose_before(&b).unwrap();
        assert_eq!(before.kind(), TransformKind::Chain);
        assert_eq!(before.apply(&pts).unwrap().as_slice(), &[11.0, 16.0]);

        let after = a.compose_after(&b).unwrap();
        assert_eq!(after.kind(), TransformKind::Chain);
        assert_eq!(after.apply(&pts).unwrap().as_slice(), &[11.0, 16.0]);

        let chain = TransformChain::try_new(vec![Arc::new(a), Arc::new(b)]).unwrap();
        assert_eq!(chain.len(), 2);
    }
}
