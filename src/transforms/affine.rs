use std::sync::Arc;

use crate::{
    ComposableTransform, ComposesWith, Error, Invertible, Matrix, ShortVec, Transform,
    TransformKind, VComposableTransform, VInvertible, Vectorizable,
    vectorizable::check_vector_len,
};

/// Kinds with an augmented matrix representation.
const HOMOGENEOUS: &[TransformKind] = &[
    TransformKind::Affine,
    TransformKind::Translation,
    TransformKind::Scale,
    TransformKind::Identity,
];

/// A linear transformation followed by a translation,
/// stored as an augmented matrix.
///
/// For a transform from N to M dimensions,
/// the augmented matrix has M + 1 rows and N + 1 columns,
/// with a bottom row of `[0, 0, ..., 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Affine {
    augmented: Matrix,
}

impl Affine {
    /// `linear` has M rows and N columns for a transform from N to M dimensions.
    pub fn try_new(linear: Matrix, translation: &[f64]) -> Result<Self, Error> {
        if linear.nrows() != translation.len() {
            return Err(Error::DimensionMismatch {
                expected: linear.nrows(),
                found: translation.len(),
            });
        }
        let nrows = linear.nrows();
        let ncols = linear.ncols();
        let mut data = Vec::with_capacity((nrows + 1) * (ncols + 1));
        for (r, t) in translation.iter().enumerate() {
            data.extend_from_slice(linear.row(r));
            data.push(*t);
        }
        data.extend(std::iter::repeat_n(0.0, ncols));
        data.push(1.0);
        Self::try_from_augmented(Matrix::try_new(data, ncols + 1)?)
    }

    /// Create an Affine transform from an augmented matrix,
    /// i.e. which includes the translation as the last column
    /// and a bottom row of [0, 0, ..., 1].
    pub fn try_from_augmented(augmented: Matrix) -> Result<Self, Error> {
        if augmented.nrows() < 2 || augmented.ncols() < 2 {
            return Err(Error::InvalidArray(
                "augmented matrix must be at least 2x2".into(),
            ));
        }
        let last = augmented.row(augmented.nrows() - 1);
        let (zeros, one) = last.split_at(last.len() - 1);
        if zeros.iter().any(|z| *z != 0.0) || one[0] != 1.0 {
            return Err(Error::InvalidArray(
                "augmented matrix must have a bottom row of [0, ..., 0, 1]".into(),
            ));
        }
        if augmented.as_slice().iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidParameter("Affine matrix is not finite".into()));
        }
        Ok(Self { augmented })
    }

    pub fn identity(n_dims: usize) -> Self {
        Self {
            augmented: Matrix::identity(n_dims + 1),
        }
    }

    /// The affine transform equal to any transform in the affine family.
    pub fn from_homogeneous(transform: &dyn Transform) -> Option<Self> {
        transform
            .h_matrix()
            .and_then(|h| Self::try_from_augmented(h).ok())
    }

    pub fn augmented(&self) -> &Matrix {
        &self.augmented
    }

    /// The M x N linear part.
    pub fn linear_component(&self) -> Matrix {
        self.augmented
            .block(self.augmented.nrows() - 1, self.augmented.ncols() - 1)
    }

    pub fn translation_component(&self) -> ShortVec<f64> {
        let last_col = self.augmented.ncols() - 1;
        (0..self.augmented.nrows() - 1)
            .map(|r| self.augmented[(r, last_col)])
            .collect()
    }

    fn homogeneous_of(transform: &dyn Transform) -> Result<Matrix, Error> {
        transform
            .h_matrix()
            .ok_or(Error::IncompatibleComposition {
                receiver: TransformKind::Affine,
                accepted: ComposesWith::Kinds(HOMOGENEOUS),
                given: transform.kind(),
            })
    }

    fn n_parameters_for(&self) -> usize {
        (self.augmented.nrows() - 1) * self.augmented.ncols()
    }
}

impl Transform for Affine {
    fn n_dims(&self) -> Option<usize> {
        Some(self.augmented.ncols() - 1)
    }

    fn n_dims_output(&self) -> Option<usize> {
        Some(self.augmented.nrows() - 1)
    }

    fn kind(&self) -> TransformKind {
        TransformKind::Affine
    }

    fn transform_into(&self, pt: &[f64], buf: &mut [f64]) {
        let ncols = self.augmented.ncols();
        for (r, o) in buf.iter_mut().enumerate() {
            let row = self.augmented.row(r);
            *o = row[..ncols - 1]
                .iter()
                .zip(pt.iter())
                .map(|(m, p)| m * p)
                .sum::<f64>()
                + row[ncols - 1];
        }
    }

    fn h_matrix(&self) -> Option<Matrix> {
        Some(self.augmented.clone())
    }

    fn invert(&self) -> Option<Arc<dyn Transform>> {
        self.pseudoinverse()
            .ok()
            .map(|t| Arc::new(t) as Arc<dyn Transform>)
    }

    fn as_composable(&self) -> Option<&dyn ComposableTransform> {
        Some(self)
    }

    fn as_composable_mut(&mut self) -> Option<&mut dyn ComposableTransform> {
        Some(self)
    }

    fn as_vectorizable(&self) -> Option<&dyn Vectorizable> {
        Some(self)
    }
}

impl ComposableTransform for Affine {
    fn composes_inplace_with(&self) -> ComposesWith {
        ComposesWith::Kinds(HOMOGENEOUS)
    }

    fn compose_before_inplace_unchecked(&mut self, transform: &dyn Transform) -> Result<(), Error> {
        let other = Self::homogeneous_of(transform)?;
        self.augmented = other.matmul_matrix(&self.augmented)?;
        Ok(())
    }

    fn compose_after_inplace_unchecked(&mut self, transform: &dyn Transform) -> Result<(), Error> {
        let other = Self::homogeneous_of(transform)?;
        self.augmented = self.augmented.matmul_matrix(&other)?;
        Ok(())
    }
}

impl VComposableTransform for Affine {}

/// Parameters are the augmented matrix without its constant bottom row, row-major.
impl Vectorizable for Affine {
    fn n_parameters(&self) -> usize {
        self.n_parameters_for()
    }

    fn as_vector(&self) -> Vec<f64> {
        self.augmented.as_slice()[..self.n_parameters_for()].to_vec()
    }

    fn update_from_vector(&mut self, vector: &[f64]) -> Result<(), Error> {
        let n = self.n_parameters_for();
        check_vector_len(n, vector)?;
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidParameter("Affine matrix is not finite".into()));
        }
        self.augmented.as_mut_slice()[..n].copy_from_slice(vector);
        Ok(())
    }
}

impl Invertible for Affine {
    fn has_true_inverse(&self) -> bool {
        self.augmented.inverse().is_some()
    }

    fn build_pseudoinverse(&self) -> Result<Self, Error> {
        if self.augmented.nrows() != self.augmented.ncols() {
            return Err(Error::NotInvertible(format!(
                "affine maps {}D to {}D",
                self.augmented.ncols() - 1,
                self.augmented.nrows() - 1
            )));
        }
        let augmented = self
            .augmented
            .inverse()
            .ok_or_else(|| Error::NotInvertible("affine matrix is singular".into()))?;
        Ok(Self { augmented })
    }
}

impl VInvertible for Affine {}
