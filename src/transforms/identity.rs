use std::sync::Arc;

use crate::{
    ComposableTransform, ComposesWith, Error, Invertible, Matrix, Transform, TransformKind,
};

/// A no-op transform which returns the input point as the output point.
///
/// Defined for one dimensionality.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Identity(usize);

impl Identity {
    pub fn new(n_dims: usize) -> Self {
        Self(n_dims)
    }
}

impl Transform for Identity {
    fn n_dims(&self) -> Option<usize> {
        Some(self.0)
    }

    fn kind(&self) -> TransformKind {
        TransformKind::Identity
    }

    fn transform_into(&self, pt: &[f64], buf: &mut [f64]) {
        buf.copy_from_slice(pt);
    }

    fn h_matrix(&self) -> Option<Matrix> {
        Some(Matrix::identity(self.0 + 1))
    }

    fn invert(&self) -> Option<Arc<dyn Transform>> {
        Some(Arc::new(*self))
    }

    fn as_composable(&self) -> Option<&dyn ComposableTransform> {
        Some(self)
    }

    fn as_composable_mut(&mut self) -> Option<&mut dyn ComposableTransform> {
        Some(self)
    }
}

impl ComposableTransform for Identity {
    fn composes_inplace_with(&self) -> ComposesWith {
        ComposesWith::Kinds(&[TransformKind::Identity])
    }

    fn compose_before_inplace_unchecked(&mut self, _transform: &dyn Transform) -> Result<(), Error> {
        Ok(())
    }

    fn compose_after_inplace_unchecked(&mut self, _transform: &dyn Transform) -> Result<(), Error> {
        Ok(())
    }
}

impl Invertible for Identity {
    fn has_true_inverse(&self) -> bool {
        true
    }

    fn build_pseudoinverse(&self) -> Result<Self, Error> {
        Ok(*self)
    }
}
