use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::{
    Alignable, Alignment, Error, Invertible, Points, PointCloud, PureAlignment, Transform,
    TransformKind,
};

/// Move each point by the displacement of its nearest source point.
///
/// Entirely defined by its source and target:
/// every source point lands exactly on its target.
#[derive(Debug, Clone)]
pub struct NearestDisplacement {
    alignment: Alignment,
    /// `target - source`, row for row.
    displacements: Points,
}

impl NearestDisplacement {
    /// Fails unless `source` and `target` have the same shape.
    pub fn new(
        source: impl Into<Arc<PointCloud>>,
        target: impl Into<Arc<PointCloud>>,
    ) -> Result<Self, Error> {
        Self::align(source, target)
    }

    fn from_alignment(alignment: Alignment) -> Result<Self, Error> {
        let displacements = displacements(alignment.source(), alignment.target())?;
        Ok(Self {
            alignment,
            displacements,
        })
    }

    pub fn displacements(&self) -> &Points {
        &self.displacements
    }

    fn nearest_source(&self, pt: &[f64]) -> Option<usize> {
        self.alignment
            .source()
            .points()
            .rows()
            .enumerate()
            .min_by_key(|(_, s)| {
                OrderedFloat(
                    s.iter()
                        .zip(pt.iter())
                        .map(|(a, b)| (a - b).powi(2))
                        .sum::<f64>(),
                )
            })
            .map(|(idx, _)| idx)
    }
}

fn displacements(source: &PointCloud, target: &PointCloud) -> Result<Points, Error> {
    let data = target
        .points()
        .as_slice()
        .iter()
        .zip(source.points().as_slice().iter())
        .map(|(t, s)| t - s)
        .collect();
    Points::try_new(data, source.n_dims())
}

impl Transform for NearestDisplacement {
    fn n_dims(&self) -> Option<usize> {
        Some(self.alignment.source().n_dims())
    }

    fn kind(&self) -> TransformKind {
        TransformKind::NearestDisplacement
    }

    fn transform_into(&self, pt: &[f64], buf: &mut [f64]) {
        buf.copy_from_slice(pt);
        if let Some(idx) = self.nearest_source(pt) {
            for (o, d) in buf.iter_mut().zip(self.displacements.row(idx)) {
                *o += d;
            }
        }
    }
}

impl Alignable for NearestDisplacement {
    type AlignOptions = ();

    fn align_unchecked(
        source: Arc<PointCloud>,
        target: Arc<PointCloud>,
        _options: Self::AlignOptions,
    ) -> Result<Self, Error> {
        Self::from_alignment(Alignment::try_new(source, target)?)
    }

    fn alignment(&self) -> Option<&Alignment> {
        Some(&self.alignment)
    }

    fn set_target_unchecked(&mut self, target: Arc<PointCloud>) -> Result<(), Error> {
        let displacements = displacements(self.alignment.source(), &target)?;
        self.alignment.set_target(target)?;
        self.displacements = displacements;
        Ok(())
    }
}

impl PureAlignment for NearestDisplacement {
    fn bound_alignment(&self) -> &Alignment {
        &self.alignment
    }
}

impl Invertible for NearestDisplacement {
    /// Exact on the target points only.
    fn has_true_inverse(&self) -> bool {
        false
    }

    fn build_pseudoinverse(&self) -> Result<Self, Error> {
        Self::from_alignment(Alignment::try_new(
            self.alignment.target().clone(),
            self.alignment.source().clone(),
        )?)
    }
}
