//! Transforms bound to a source and target point cloud.
//!
//! A transform built with [Alignable::align] represents the best mapping it can express
//! from its source to its target.
//! The target can later be swapped out with [Alignable::set_target],
//! which updates the transform's parameters to match.
//! A transform built any other way is unbound,
//! and the alignment-only operations fail with [Error::NotAnAlignment].
use std::sync::Arc;

use crate::{Error, PointCloud, Transform, TransformExt};

/// Fails unless `source` and `target` have the same dimensionality and number of points.
pub fn verify_source_and_target(source: &PointCloud, target: &PointCloud) -> Result<(), Error> {
    if source.n_dims() != target.n_dims() {
        return Err(Error::DimensionMismatch {
            expected: source.n_dims(),
            found: target.n_dims(),
        });
    }
    if source.n_points() != target.n_points() {
        return Err(Error::PointCountMismatch {
            expected: source.n_points(),
            found: target.n_points(),
        });
    }
    Ok(())
}

/// A validated source and target pair.
///
/// The point clouds are shared with the caller, never modified.
#[derive(Debug, Clone)]
pub struct Alignment {
    source: Arc<PointCloud>,
    target: Arc<PointCloud>,
}

impl Alignment {
    pub fn try_new(source: Arc<PointCloud>, target: Arc<PointCloud>) -> Result<Self, Error> {
        verify_source_and_target(&source, &target)?;
        Ok(Self { source, target })
    }

    pub fn source(&self) -> &Arc<PointCloud> {
        &self.source
    }

    pub fn target(&self) -> &Arc<PointCloud> {
        &self.target
    }

    /// Replace the target, which must match the current one's shape.
    pub fn set_target(&mut self, target: Arc<PointCloud>) -> Result<(), Error> {
        verify_source_and_target(&self.target, &target)?;
        self.target = target;
        Ok(())
    }
}

/// Transforms which can be fitted to map a source point cloud onto a target.
pub trait Alignable: Transform + Clone + Sized {
    /// Settings for the fit performed by [Alignable::align_unchecked].
    type AlignOptions: Default;

    /// Fit a transform aligning `source` to `target`.
    ///
    /// Called by [Alignable::align_with] once `source` and `target` are verified.
    /// The result must be bound to both.
    fn align_unchecked(
        source: Arc<PointCloud>,
        target: Arc<PointCloud>,
        options: Self::AlignOptions,
    ) -> Result<Self, Error>;

    /// The bound source and target; None for a transform not built by alignment.
    fn alignment(&self) -> Option<&Alignment>;

    /// Update this transform's parameters to best map the source onto `target`,
    /// and store `target`.
    ///
    /// Called by [Alignable::set_target] once `target` is verified;
    /// it must leave the transform consistent with the new target.
    fn set_target_unchecked(&mut self, target: Arc<PointCloud>) -> Result<(), Error>;

    /// Build the transform which best aligns `source` to `target`.
    fn align(
        source: impl Into<Arc<PointCloud>>,
        target: impl Into<Arc<PointCloud>>,
    ) -> Result<Self, Error> {
        Self::align_with(source, target, Default::default())
    }

    fn align_with(
        source: impl Into<Arc<PointCloud>>,
        target: impl Into<Arc<PointCloud>>,
        options: Self::AlignOptions,
    ) -> Result<Self, Error> {
        let source = source.into();
        let target = target.into();
        verify_source_and_target(&source, &target)?;
        Self::align_unchecked(source, target, options)
    }

    fn is_alignment_transform(&self) -> bool {
        self.alignment().is_some()
    }

    fn source(&self) -> Option<&Arc<PointCloud>> {
        self.alignment().map(|a| a.source())
    }

    fn target(&self) -> Option<&Arc<PointCloud>> {
        self.alignment().map(|a| a.target())
    }

    /// Point this alignment at a new target, updating its parameters.
    ///
    /// Fails on unbound transforms,
    /// and if the new target's shape differs from the current target's.
    fn set_target(&mut self, target: impl Into<Arc<PointCloud>>) -> Result<(), Error> {
        let current = self.target().ok_or(Error::NotAnAlignment)?;
        let target = target.into();
        verify_source_and_target(current, &target)?;
        log::debug!("Retargeting {} alignment", self.kind());
        self.set_target_unchecked(target)
    }

    /// The source, transformed by this transform.
    fn aligned_source(&self) -> Result<PointCloud, Error> {
        let source = self.source().ok_or(Error::NotAnAlignment)?;
        self.apply(source.as_ref())
    }

    /// Frobenius norm of the difference between the target and the aligned source.
    fn alignment_error(&self) -> Result<f64, Error> {
        let target = self.target().ok_or(Error::NotAnAlignment)?;
        let aligned = self.aligned_source()?;
        target.points().distance(aligned.points())
    }

    /// A new alignment with the same source, retargeted to `target`.
    ///
    /// Implementors overriding this must verify `target` themselves.
    fn from_target(&self, target: impl Into<Arc<PointCloud>>) -> Result<Self, Error> {
        let mut new = self.clone();
        new.set_target(target)?;
        Ok(new)
    }

    /// Reset the target to the aligned source.
    ///
    /// Must be called after any change to the parameters of a bound transform
    /// made outside of [Alignable::set_target].
    /// Does nothing for unbound transforms.
    fn sync_target(&mut self) -> Result<(), Error> {
        if !self.is_alignment_transform() {
            return Ok(());
        }
        let aligned = self.aligned_source()?;
        self.set_target(aligned)
    }
}

/// Alignments which are entirely defined by their source and target.
///
/// They are bound from construction,
/// so [Alignable::align_unchecked] is simply their constructor.
pub trait PureAlignment: Alignable {
    /// The source and target which define this transform.
    fn bound_alignment(&self) -> &Alignment;

    fn n_points(&self) -> usize {
        self.bound_alignment().source().n_points()
    }
}
