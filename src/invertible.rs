use crate::{Error, Transform, Vectorizable};

/// A transform with an exact or approximate inverse.
pub trait Invertible: Transform + Sized {
    /// True if [Invertible::pseudoinverse] is an exact inverse.
    fn has_true_inverse(&self) -> bool;

    /// The exact inverse if there is one, otherwise the best approximation.
    ///
    /// Called by [Invertible::pseudoinverse].
    fn build_pseudoinverse(&self) -> Result<Self, Error>;

    /// The transform which undoes this one:
    /// exact when [Invertible::has_true_inverse], otherwise an approximation.
    fn pseudoinverse(&self) -> Result<Self, Error> {
        self.build_pseudoinverse()
    }
}

/// Inversion operating directly on parameter vectors.
pub trait VInvertible: Invertible + Vectorizable + Clone {
    /// The parameter vector of the pseudoinverse of the transform encoded by `vector`.
    ///
    /// Equivalent to `self.from_vector(vector)?.pseudoinverse()?.as_vector()`;
    /// implementors may override it to skip building the intermediate transforms.
    fn pseudoinverse_vector(&self, vector: &[f64]) -> Result<Vec<f64>, Error> {
        Ok(self.from_vector(vector)?.pseudoinverse()?.as_vector())
    }
}
