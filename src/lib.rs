//! Composable spatial transforms over arrays of points.
//!
//! Every [Transform] maps points in one space to points in another.
//! Transforms can be applied to raw [Points] arrays
//! or to any [Transformable] object, such as a [PointCloud],
//! and composed with each other: natively where the kinds allow it
//! (see [ComposableTransform]), otherwise as a [TransformChain].
//!
//! Capabilities beyond the core interface are separate traits:
//! parameter vectors ([Vectorizable]), inversion ([Invertible]),
//! and fitting to a source and target point cloud ([Alignable]).
use smallvec::SmallVec;

#[cfg(test)]
mod tests;

mod error;
pub use error::Error;

mod points;
pub use points::Points;

mod matrix;
pub use matrix::Matrix;

mod traits;
pub use traits::{
    ApplyOptions, CloneTransform, Transform, TransformExt, TransformFn, Transformable,
};

mod composable;
pub use composable::{ComposableTransform, ComposesWith, TransformKind, VComposableTransform};

mod vectorizable;
pub use vectorizable::Vectorizable;

mod invertible;
pub use invertible::{Invertible, VInvertible};

mod alignment;
pub use alignment::{Alignable, Alignment, PureAlignment, verify_source_and_target};

mod shape;
pub use shape::PointCloud;

mod transforms;
pub use transforms::{
    Affine, Identity, NearestDisplacement, Scale, TransformChain, TransformChainBuilder,
    Translation,
};

pub const COORD_SIZE: usize = 6;

/// A short vector type alias for convenience,
/// which avoids allocating for points of up to [COORD_SIZE] dimensions.
pub type ShortVec<T> = SmallVec<[T; COORD_SIZE]>;
