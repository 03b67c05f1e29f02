//! Native composition.
//!
//! Any two transforms can be composed into a [TransformChain](crate::TransformChain).
//! Some transforms know how to absorb certain other kinds of transform directly,
//! e.g. two translations compose into a single translation.
//!
//! The mathematical composition `(a o b)(x) == a(b(x))` is provided by the `compose_after` family:
//! `a.compose_after(b).apply(x) == a.apply(b.apply(x))`.
//! The reverse order, where the other transform is applied to the result of this one,
//! is provided by the `compose_before` family:
//! `a.compose_before(b).apply(x) == b.apply(a.apply(x))`.
use std::fmt;

use crate::{Error, Transform, Vectorizable, traits::check_connects};

/// Identifies the concrete kind of a transform for capability dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Chain,
    Identity,
    Translation,
    Scale,
    Affine,
    NearestDisplacement,
    /// A kind defined outside this crate.
    Custom(&'static str),
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformKind::Chain => f.write_str("TransformChain"),
            TransformKind::Identity => f.write_str("Identity"),
            TransformKind::Translation => f.write_str("Translation"),
            TransformKind::Scale => f.write_str("Scale"),
            TransformKind::Affine => f.write_str("Affine"),
            TransformKind::NearestDisplacement => f.write_str("NearestDisplacement"),
            TransformKind::Custom(name) => f.write_str(name),
        }
    }
}

/// The kinds of transform which a [ComposableTransform] can absorb without chaining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposesWith {
    Any,
    Kinds(&'static [TransformKind]),
}

impl ComposesWith {
    pub fn accepts(&self, transform: &dyn Transform) -> bool {
        match self {
            ComposesWith::Any => true,
            ComposesWith::Kinds(kinds) => kinds.contains(&transform.kind()),
        }
    }
}

impl fmt::Display for ComposesWith {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComposesWith::Any => f.write_str("any transform"),
            ComposesWith::Kinds(kinds) => {
                f.write_str("[")?;
                for (idx, k) in kinds.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A transform which can absorb other transforms of certain kinds,
/// staying the same kind itself.
///
/// Implementors should also return `Some(self)` from
/// [Transform::as_composable] and [Transform::as_composable_mut],
/// which is how [Transform::compose_before] and [Transform::compose_after]
/// find the native path.
pub trait ComposableTransform: Transform {
    /// The kinds of transform which this transform composes against natively.
    fn composes_inplace_with(&self) -> ComposesWith;

    /// Combine `transform` into this one, so that it is applied after the original.
    ///
    /// Callers guarantee that `transform` is accepted by [ComposableTransform::composes_inplace_with]
    /// and that dimensionalities connect.
    fn compose_before_inplace_unchecked(&mut self, transform: &dyn Transform) -> Result<(), Error>;

    /// Combine `transform` into this one, so that it is applied before the original.
    ///
    /// Callers guarantee that `transform` is accepted by [ComposableTransform::composes_inplace_with]
    /// and that dimensionalities connect.
    fn compose_after_inplace_unchecked(&mut self, transform: &dyn Transform) -> Result<(), Error>;

    /// `a_orig = a.clone(); a.compose_before_inplace(b)` gives
    /// `a.apply(p) == b.apply(a_orig.apply(p))`.
    ///
    /// `transform` is left unchanged.
    /// Fails, leaving this transform unchanged,
    /// if `transform` cannot be absorbed.
    fn compose_before_inplace(&mut self, transform: &dyn Transform) -> Result<(), Error> {
        self.check_composes_inplace(transform)?;
        check_connects(self.n_dims_output(), transform.n_dims())?;
        self.compose_before_inplace_unchecked(transform)
    }

    /// `a_orig = a.clone(); a.compose_after_inplace(b)` gives
    /// `a.apply(p) == a_orig.apply(b.apply(p))`.
    ///
    /// `transform` is left unchanged.
    /// Fails, leaving this transform unchanged,
    /// if `transform` cannot be absorbed.
    fn compose_after_inplace(&mut self, transform: &dyn Transform) -> Result<(), Error> {
        self.check_composes_inplace(transform)?;
        check_connects(transform.n_dims_output(), self.n_dims())?;
        self.compose_after_inplace_unchecked(transform)
    }

    fn check_composes_inplace(&self, transform: &dyn Transform) -> Result<(), Error> {
        let accepted = self.composes_inplace_with();
        if accepted.accepts(transform) {
            Ok(())
        } else {
            Err(Error::IncompatibleComposition {
                receiver: self.kind(),
                accepted,
                given: transform.kind(),
            })
        }
    }
}

/// Composition shortcuts for transforms with a parameter vector.
///
/// The defaults build a transform from the vector and compose with it;
/// implementors may override them to avoid building the intermediate object.
pub trait VComposableTransform: ComposableTransform + Vectorizable + Clone + Sized {
    /// `a.compose_before_from_vector_inplace(b_vec)` is
    /// `a.compose_before_inplace(a.from_vector(b_vec))`.
    fn compose_before_from_vector_inplace(&mut self, vector: &[f64]) -> Result<(), Error> {
        let transform = self.from_vector(vector)?;
        self.compose_before_inplace(&transform)
    }

    /// `a.compose_after_from_vector_inplace(b_vec)` is
    /// `a.compose_after_inplace(a.from_vector(b_vec))`.
    fn compose_after_from_vector_inplace(&mut self, vector: &[f64]) -> Result<(), Error> {
        let transform = self.from_vector(vector)?;
        self.compose_after_inplace(&transform)
    }

    /// An after-composition built only from vector encoding and the before path:
    /// take `transform`'s parameters, then compose the original parameters before them.
    ///
    /// Suitable as [ComposableTransform::compose_after_inplace_unchecked]
    /// when `transform` shares this transform's parameter encoding.
    fn compose_after_inplace_by_vectors(&mut self, transform: &dyn Transform) -> Result<(), Error> {
        let theirs = transform
            .as_vectorizable()
            .ok_or(Error::NotVectorizable(transform.kind()))?
            .as_vector();
        let own = self.as_vector();
        self.update_from_vector(&theirs)?;
        self.compose_before_from_vector_inplace(&own)
    }
}
