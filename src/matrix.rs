use std::ops::{Index, IndexMut};

use crate::Error;

/// Pivots smaller than this are treated as zero during inversion.
const SINGULAR_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    /// Row-major / C-ordered matrix data.
    data: Vec<f64>,
    nrows: usize,
    ncols: usize,
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        self.get(index.0, index.1)
            .expect("index should be in bounds")
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        assert!(index.1 < self.ncols, "index should be in bounds");
        &mut self.data[index.0 * self.ncols + index.1]
    }
}

impl Matrix {
    /// Row-major/ C order data
    pub fn try_new(data: Vec<f64>, ncols: usize) -> Result<Self, Error> {
        if ncols == 0 || data.len() % ncols != 0 {
            return Err(Error::InvalidArray(format!(
                "Matrix data length {} is not divisible by ncols {}",
                data.len(),
                ncols
            )));
        }
        let nrows = data.len() / ncols;
        Ok(Self { data, nrows, ncols })
    }

    pub fn identity(n: usize) -> Self {
        Self::from_diagonal(&vec![1.0; n])
    }

    pub fn from_diagonal(diagonal: &[f64]) -> Self {
        let n = diagonal.len();
        let mut data = vec![0.0; n * n];
        for (idx, d) in diagonal.iter().enumerate() {
            data[idx * n + idx] = *d;
        }
        Self {
            data,
            nrows: n,
            ncols: n,
        }
    }

    /// Matrix product `self * rhs`.
    pub fn matmul_matrix(&self, rhs: &Matrix) -> Result<Matrix, Error> {
        if self.ncols != rhs.nrows {
            return Err(Error::DimensionMismatch {
                expected: self.ncols,
                found: rhs.nrows,
            });
        }
        let mut data = vec![0.0; self.nrows * rhs.ncols];
        for r in 0..self.nrows {
            let out_row = &mut data[r * rhs.ncols..(r + 1) * rhs.ncols];
            for k in 0..self.ncols {
                let lhs = self.data[r * self.ncols + k];
                let rhs_row = &rhs.data[k * rhs.ncols..(k + 1) * rhs.ncols];
                for (o, v) in out_row.iter_mut().zip(rhs_row.iter()) {
                    *o += lhs * v;
                }
            }
        }
        Ok(Matrix {
            data,
            nrows: self.nrows,
            ncols: rhs.ncols,
        })
    }

    /// Gauss-Jordan elimination with partial pivoting.
    ///
    /// None if the matrix is not square or is singular.
    pub fn inverse(&self) -> Option<Matrix> {
        if self.nrows != self.ncols {
            return None;
        }
        let n = self.nrows;
        let mut work = self.clone();
        let mut inv = Matrix::identity(n);

        for col in 0..n {
            let pivot_row = (col..n).max_by(|a, b| {
                work[(*a, col)].abs().total_cmp(&work[(*b, col)].abs())
            })?;
            let pivot = work[(pivot_row, col)];
            if pivot.abs() < SINGULAR_EPSILON {
                return None;
            }
            work.swap_rows(col, pivot_row);
            inv.swap_rows(col, pivot_row);

            for c in 0..n {
                work[(col, c)] /= pivot;
                inv[(col, c)] /= pivot;
            }
            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = work[(r, col)];
                if factor == 0.0 {
                    continue;
                }
                for c in 0..n {
                    let work_delta = factor * work[(col, c)];
                    let inv_delta = factor * inv[(col, c)];
                    work[(r, c)] -= work_delta;
                    inv[(r, c)] -= inv_delta;
                }
            }
        }
        Some(inv)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for c in 0..self.ncols {
            self.data.swap(a * self.ncols + c, b * self.ncols + c);
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&f64> {
        if col >= self.ncols {
            return None;
        }
        self.data.get(row * self.ncols + col)
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.ncols..(row + 1) * self.ncols]
    }

    /// Copy of the top-left `nrows` x `ncols` block.
    ///
    /// Panics if the block is larger than the matrix.
    pub fn block(&self, nrows: usize, ncols: usize) -> Matrix {
        assert!(nrows <= self.nrows && ncols <= self.ncols);
        let mut data = Vec::with_capacity(nrows * ncols);
        for r in 0..nrows {
            data.extend_from_slice(&self.row(r)[..ncols]);
        }
        Matrix { data, nrows, ncols }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_ulps_eq;
    use faer::rand::SeedableRng;
    use faer::stats::prelude::{Rng, SmallRng};

    fn new_rng() -> SmallRng {
        SmallRng::seed_from_u64(1991)
    }

    #[test]
    fn test_matmul_matrix() {
        #[rustfmt::skip]
        let a = Matrix::try_new(vec![
            1.0, 2.0, 3.0,
            4.0, 5.0, 6.0,
        ], 3).unwrap();
        #[rustfmt::skip]
        let b = Matrix::try_new(vec![
            1.0, 0.0,
            0.0, 1.0,
            2.0, -1.0,
        ], 2).unwrap();
        let c = a.matmul_matrix(&b).unwrap();
        assert_eq!((c.nrows(), c.ncols()), (2, 2));
        assert_ulps_eq!(c.as_slice(), [7.0, -1.0, 16.0, -1.0].as_slice());

        assert!(a.matmul_matrix(&a).is_err());
    }

    #[test]
    fn test_inverse_random() {
        let mut rng = new_rng();
        for idx in 0..50 {
            let n = idx / 10 + 1;
            let mut data = Vec::with_capacity(n * n);
            for _ in 0..(n * n) {
                data.push(rng.random::<f64>() * 10.0);
            }
            let mut mat = Matrix::try_new(data, n).unwrap();
            // diagonally dominant, so comfortably invertible
            for d in 0..n {
                mat[(d, d)] += 10.0 * n as f64;
            }
            let inv = mat.inverse().unwrap();
            let product = mat.matmul_matrix(&inv).unwrap();
            assert_ulps_eq!(
                product.as_slice(),
                Matrix::identity(n).as_slice(),
                epsilon = 1e-10
            );
        }
    }

    #[test]
    fn test_inverse_singular() {
        #[rustfmt::skip]
        let mat = Matrix::try_new(vec![
            1.0, 2.0,
            2.0, 4.0,
        ], 2).unwrap();
        assert!(mat.inverse().is_none());
        assert!(Matrix::try_new(vec![1.0; 6], 3).unwrap().inverse().is_none());
    }

    #[test]
    fn test_block() {
        let mat = Matrix::try_new((0..12).map(|v| v as f64).collect(), 4).unwrap();
        let block = mat.block(2, 3);
        assert_eq!((block.nrows(), block.ncols()), (2, 3));
        assert_eq!(block.as_slice(), &[0.0, 1.0, 2.0, 4.0, 5.0, 6.0]);
    }
}
