use std::ops::{Index, IndexMut};

use crate::{Error, ShortVec, TransformFn, Transformable};
use smallvec::smallvec;

/// A dense array of points: `n_points` rows of `n_dims` coordinates.
///
/// Data are stored row-major (C order),
/// so each point is a contiguous slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Points {
    data: Vec<f64>,
    n_dims: usize,
}

impl Points {
    /// Row-major / C order data.
    pub fn try_new(data: Vec<f64>, n_dims: usize) -> Result<Self, Error> {
        if n_dims == 0 {
            return Err(Error::InvalidArray("points must have at least 1 dimension".into()));
        }
        if data.len() % n_dims != 0 {
            return Err(Error::InvalidArray(format!(
                "data length {} is not divisible by n_dims {}",
                data.len(),
                n_dims
            )));
        }
        Ok(Self { data, n_dims })
    }

    /// Build from a slice of equal-length rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, Error> {
        let Some(n_dims) = rows.first().map(|r| r.as_ref().len()) else {
            return Err(Error::InvalidArray(
                "cannot infer dimensionality from zero rows".into(),
            ));
        };
        let mut data = Vec::with_capacity(rows.len() * n_dims);
        for row in rows.iter() {
            let row = row.as_ref();
            if row.len() != n_dims {
                return Err(Error::InvalidArray(format!(
                    "inconsistent row length {}, expected {}",
                    row.len(),
                    n_dims
                )));
            }
            data.extend_from_slice(row);
        }
        Self::try_new(data, n_dims)
    }

    /// An array of zeros; panics if `n_dims` is 0.
    pub fn zeros(n_points: usize, n_dims: usize) -> Self {
        assert!(n_dims > 0, "points must have at least 1 dimension");
        Self {
            data: vec![0.0; n_points * n_dims],
            n_dims,
        }
    }

    pub fn n_points(&self) -> usize {
        self.data.len() / self.n_dims
    }

    pub fn n_dims(&self) -> usize {
        self.n_dims
    }

    pub fn row(&self, idx: usize) -> &[f64] {
        &self.data[idx * self.n_dims..(idx + 1) * self.n_dims]
    }

    pub fn row_mut(&mut self, idx: usize) -> &mut [f64] {
        &mut self.data[idx * self.n_dims..(idx + 1) * self.n_dims]
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_dims)
    }

    pub fn rows_mut(&mut self) -> impl ExactSizeIterator<Item = &mut [f64]> {
        self.data.chunks_exact_mut(self.n_dims)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f64> {
        self.data
    }

    /// Split into consecutive copies of at most `batch_size` points each.
    pub(crate) fn batches(&self, batch_size: usize) -> impl Iterator<Item = Points> {
        let n_dims = self.n_dims;
        self.data
            .chunks(batch_size * n_dims)
            .map(move |chunk| Points {
                data: chunk.to_vec(),
                n_dims,
            })
    }

    /// Mean of every dimension.
    ///
    /// NaN-filled for an empty array.
    pub fn centre(&self) -> ShortVec<f64> {
        let mut total: ShortVec<f64> = smallvec![0.0; self.n_dims];
        for row in self.rows() {
            for (t, v) in total.iter_mut().zip(row.iter()) {
                *t += v;
            }
        }
        let n = self.n_points() as f64;
        for t in total.iter_mut() {
            *t /= n;
        }
        total
    }

    /// Frobenius norm of the element-wise difference between two arrays of the same shape.
    pub fn distance(&self, other: &Points) -> Result<f64, Error> {
        if self.n_dims != other.n_dims {
            return Err(Error::DimensionMismatch {
                expected: self.n_dims,
                found: other.n_dims,
            });
        }
        if self.n_points() != other.n_points() {
            return Err(Error::PointCountMismatch {
                expected: self.n_points(),
                found: other.n_points(),
            });
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt())
    }
}

impl Index<(usize, usize)> for Points {
    type Output = f64;

    fn index(&self, (point, dim): (usize, usize)) -> &Self::Output {
        assert!(dim < self.n_dims, "dimension index out of bounds");
        &self.data[point * self.n_dims + dim]
    }
}

impl IndexMut<(usize, usize)> for Points {
    fn index_mut(&mut self, (point, dim): (usize, usize)) -> &mut Self::Output {
        assert!(dim < self.n_dims, "dimension index out of bounds");
        &mut self.data[point * self.n_dims + dim]
    }
}

impl AsRef<[f64]> for Points {
    fn as_ref(&self) -> &[f64] {
        self.data.as_ref()
    }
}

/// A raw array is overwritten with the mapped result;
/// its non-destructive variant maps without copying first.
impl Transformable for Points {
    fn transform_inplace(&mut self, transform: &TransformFn<'_>) -> Result<(), Error> {
        *self = transform(self)?;
        Ok(())
    }

    fn transformed(&self, transform: &TransformFn<'_>) -> Result<Self, Error> {
        transform(self)
    }
}

#[cfg(feature = "ndarray")]
mod ndarray_conversions {
    use ndarray::{Array2, ArrayView2};

    use super::Points;
    use crate::Error;

    impl From<Points> for Array2<f64> {
        fn from(points: Points) -> Self {
            let shape = (points.n_points(), points.n_dims());
            Array2::from_shape_vec(shape, points.into_data())
                .expect("points data length is a multiple of n_dims")
        }
    }

    impl TryFrom<ArrayView2<'_, f64>> for Points {
        type Error = Error;

        fn try_from(value: ArrayView2<'_, f64>) -> Result<Self, Self::Error> {
            let n_dims = value.ncols();
            Points::try_new(value.iter().copied().collect(), n_dims)
        }
    }

    impl TryFrom<Array2<f64>> for Points {
        type Error = Error;

        fn try_from(value: Array2<f64>) -> Result<Self, Self::Error> {
            Points::try_from(value.view())
        }
    }

    #[cfg(test)]
    mod tests {
        use ndarray::array;

        use super::*;

        #[test]
        fn test_round_trip_array() {
            let arr = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
            let pts = Points::try_from(arr.view()).unwrap();
            assert_eq!(pts.n_points(), 3);
            assert_eq!(pts.row(1), &[3.0, 4.0]);
            let back: Array2<f64> = pts.into();
            assert_eq!(back, arr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_ulps_eq;

    #[test]
    fn test_from_rows() {
        let pts = Points::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(pts.n_points(), 2);
        assert_eq!(pts.n_dims(), 3);
        assert_eq!(pts[(1, 2)], 6.0);
        assert_eq!(pts.row(0), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_ragged_rows() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            Points::from_rows(&rows),
            Err(Error::InvalidArray(_))
        ));
    }

    #[test]
    fn test_zero_width() {
        assert!(Points::try_new(vec![], 0).is_err());
        assert!(Points::try_new(vec![1.0, 2.0, 3.0], 2).is_err());
    }

    #[test]
    fn test_centre() {
        let pts = Points::from_rows(&[[0.0, 0.0], [2.0, 4.0], [4.0, 8.0]]).unwrap();
        assert_ulps_eq!(pts.centre().as_slice(), [2.0, 4.0].as_slice());
    }

    #[test]
    fn test_batches_cover_all_points() {
        let pts = Points::from_rows(&[[0.0], [1.0], [2.0], [3.0], [4.0]]).unwrap();
        let sizes: Vec<_> = pts.batches(2).map(|b| b.n_points()).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[test]
    fn test_distance() {
        let a = Points::from_rows(&[[0.0, 0.0], [1.0, 1.0]]).unwrap();
        let b = Points::from_rows(&[[3.0, 4.0], [1.0, 1.0]]).unwrap();
        assert_ulps_eq!(a.distance(&b).unwrap(), 5.0);

        let c = Points::from_rows(&[[0.0, 0.0]]).unwrap();
        assert_eq!(
            a.distance(&c),
            Err(Error::PointCountMismatch {
                expected: 2,
                found: 1
            })
        );
    }
}
