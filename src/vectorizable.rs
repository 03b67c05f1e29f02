use crate::Error;

/// Objects whose parameters can be flattened into a vector of floats,
/// and updated from such a vector.
///
/// Alignment transforms must call [Alignable::sync_target](crate::Alignable::sync_target)
/// from [Vectorizable::update_from_vector], so that the target follows the new parameters.
pub trait Vectorizable {
    /// Length of the parameter vector.
    fn n_parameters(&self) -> usize;

    fn as_vector(&self) -> Vec<f64>;

    /// Overwrite this object's parameters.
    ///
    /// Fails, leaving the object unchanged, if the vector has the wrong length.
    fn update_from_vector(&mut self, vector: &[f64]) -> Result<(), Error>;

    /// A new object like this one, with the given parameters.
    fn from_vector(&self, vector: &[f64]) -> Result<Self, Error>
    where
        Self: Clone + Sized,
    {
        let mut new = self.clone();
        new.update_from_vector(vector)?;
        Ok(new)
    }
}

pub(crate) fn check_vector_len(expected: usize, vector: &[f64]) -> Result<(), Error> {
    if vector.len() != expected {
        return Err(Error::ParameterCount {
            expected,
            found: vector.len(),
        });
    }
    Ok(())
}
