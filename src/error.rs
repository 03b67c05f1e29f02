use thiserror::Error;

use crate::{ComposesWith, TransformKind};

/// Errors produced while building, composing, applying or aligning transforms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// In-place composition was attempted with a kind the receiver cannot absorb.
    #[error("{receiver} can only compose inplace with {accepted} - not {given}")]
    IncompatibleComposition {
        receiver: TransformKind,
        accepted: ComposesWith,
        given: TransformKind,
    },

    /// An alignment-only operation was called on a transform
    /// which was not built with the align constructor.
    #[error("not an alignment transform: build it with the align constructor")]
    NotAnAlignment,

    #[error("dimensionality mismatch: expected {expected}D, got {found}D")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("point count mismatch: expected {expected} points, got {found}")]
    PointCountMismatch { expected: usize, found: usize },

    #[error("parameter vector has length {found}, expected {expected}")]
    ParameterCount { expected: usize, found: usize },

    #[error("{0} does not expose a parameter vector")]
    NotVectorizable(TransformKind),

    #[error("transform is not invertible: {0}")]
    NotInvertible(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("invalid coordinate array: {0}")]
    InvalidArray(String),
}
