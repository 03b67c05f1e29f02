mod affine;
pub use affine::Affine;
mod chain;
pub use chain::{TransformChain, TransformChainBuilder};
mod displacement;
pub use displacement::NearestDisplacement;
mod identity;
pub use identity::Identity;
mod scale;
pub use scale::Scale;
mod translation;
pub use translation::Translation;
