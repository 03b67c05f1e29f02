use std::sync::Arc;

use smallvec::{ToSmallVec, smallvec};

use crate::{
    ComposableTransform, ComposesWith, Error, Points, ShortVec, Transform, TransformKind,
    traits::check_connects,
};

/// Apply a sequence of transforms in order.
///
/// The first transform is applied first,
/// its result fed into the second, and so on.
/// This is the fallback result of composing transforms which cannot compose natively;
/// a chain itself can absorb any transform.
#[derive(Debug, Clone, Default)]
pub struct TransformChain {
    transforms: Vec<Arc<dyn Transform>>,
}

impl TransformChain {
    /// Fails if any transform's output cannot feed the next transform's input.
    pub fn try_new(transforms: Vec<Arc<dyn Transform>>) -> Result<Self, Error> {
        let mut out_ndim = None;
        for t in transforms.iter() {
            check_connects(out_ndim, t.n_dims())?;
            out_ndim = t.n_dims_output().or(out_ndim);
        }
        Ok(Self { transforms })
    }

    pub fn builder() -> TransformChainBuilder {
        TransformChainBuilder(vec![])
    }

    pub fn transforms(&self) -> &[Arc<dyn Transform>] {
        &self.transforms
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl Transform for TransformChain {
    /// Unconstrained elements preserve dimensionality,
    /// so the first constrained element decides.
    fn n_dims(&self) -> Option<usize> {
        self.transforms.iter().find_map(|t| t.n_dims())
    }

    fn n_dims_output(&self) -> Option<usize> {
        self.transforms.iter().rev().find_map(|t| t.n_dims_output())
    }

    fn kind(&self) -> TransformKind {
        TransformKind::Chain
    }

    fn transform_into(&self, pt: &[f64], buf: &mut [f64]) {
        let mut current: ShortVec<f64> = pt.to_smallvec();
        for t in self.transforms.iter() {
            let out_ndim = t.n_dims_output().unwrap_or(current.len());
            let mut next: ShortVec<f64> = smallvec![f64::NAN; out_ndim];
            t.transform_into(&current, &mut next);
            current = next;
        }
        buf.copy_from_slice(&current);
    }

    fn transform_points(&self, points: &Points) -> Points {
        self.transforms
            .iter()
            .fold(points.clone(), |acc, t| t.transform_points(&acc))
    }

    fn invert(&self) -> Option<Arc<dyn Transform>> {
        let mut inv_transforms = Vec::with_capacity(self.transforms.len());
        for t in self.transforms.iter().rev() {
            inv_transforms.push(t.invert()?);
        }
        Some(Arc::new(TransformChain {
            transforms: inv_transforms,
        }))
    }

    fn as_composable(&self) -> Option<&dyn ComposableTransform> {
        Some(self)
    }

    fn as_composable_mut(&mut self) -> Option<&mut dyn ComposableTransform> {
        Some(self)
    }
}

impl ComposableTransform for TransformChain {
    fn composes_inplace_with(&self) -> ComposesWith {
        ComposesWith::Any
    }

    fn compose_before_inplace_unchecked(&mut self, transform: &dyn Transform) -> Result<(), Error> {
        self.transforms.push(transform.clone_arc());
        Ok(())
    }

    fn compose_after_inplace_unchecked(&mut self, transform: &dyn Transform) -> Result<(), Error> {
        self.transforms.insert(0, transform.clone_arc());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct TransformChainBuilder(Vec<Arc<dyn Transform>>);

impl TransformChainBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    pub fn add_arced(&mut self, t: Arc<dyn Transform>) -> Result<&mut Self, Error> {
        let out_ndim = self.0.iter().rev().find_map(|t| t.n_dims_output());
        check_connects(out_ndim, t.n_dims())?;
        self.0.push(t);
        Ok(self)
    }

    pub fn add_transform<T: Transform + 'static>(&mut self, t: T) -> Result<&mut Self, Error> {
        self.add_arced(Arc::new(t))
    }

    pub fn build(self) -> TransformChain {
        TransformChain { transforms: self.0 }
    }
}
