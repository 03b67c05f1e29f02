use crate::{Error, Points, ShortVec, TransformFn, Transformable};

/// A set of points which can transform itself.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    points: Points,
}

impl PointCloud {
    pub fn new(points: Points) -> Self {
        Self { points }
    }

    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, Error> {
        Ok(Self::new(Points::from_rows(rows)?))
    }

    pub fn n_dims(&self) -> usize {
        self.points.n_dims()
    }

    pub fn n_points(&self) -> usize {
        self.points.n_points()
    }

    pub fn points(&self) -> &Points {
        &self.points
    }

    pub fn into_points(self) -> Points {
        self.points
    }

    pub fn centre(&self) -> ShortVec<f64> {
        self.points.centre()
    }
}

impl From<Points> for PointCloud {
    fn from(points: Points) -> Self {
        Self::new(points)
    }
}

impl Transformable for PointCloud {
    fn transform_inplace(&mut self, transform: &TransformFn<'_>) -> Result<(), Error> {
        self.points = transform(&self.points)?;
        Ok(())
    }
}
