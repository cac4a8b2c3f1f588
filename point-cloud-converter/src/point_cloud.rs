/// In-memory point cloud staged between readers and writers.
use crate::bounds::PointCloudBounds;
use crate::error::{ConvertError, Result};
use crate::georeference;
use constants::conversion::REDUCTION_CHUNK_SIZE;
use glam::f64::DVec3;
use rayon::prelude::*;

/// Positions with optional per-point RGB colour in the 0-1 range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    positions: Vec<DVec3>,
    colours: Option<Vec<[f32; 3]>>,
}

impl PointCloud {
    /// Pair positions with colours; colour count must match position count.
    pub fn new(positions: Vec<DVec3>, colours: Option<Vec<[f32; 3]>>) -> Result<Self> {
        if let Some(colours) = &colours {
            if colours.len() != positions.len() {
                return Err(ConvertError::LengthMismatch {
                    positions: positions.len(),
                    colours: colours.len(),
                });
            }
        }

        Ok(Self { positions, colours })
    }

    pub fn from_positions(positions: Vec<DVec3>) -> Self {
        Self {
            positions,
            colours: None,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    pub fn colours(&self) -> Option<&[[f32; 3]]> {
        self.colours.as_deref()
    }

    pub fn has_colours(&self) -> bool {
        self.colours.is_some()
    }

    /// Fill in `default` for every point when the cloud carries no colour.
    pub fn with_default_colour(mut self, default: [f32; 3]) -> Self {
        if self.colours.is_none() {
            self.colours = Some(vec![default; self.positions.len()]);
        }
        self
    }

    /// Bounds computed in parallel chunks.
    pub fn bounds(&self) -> PointCloudBounds {
        self.positions
            .par_chunks(REDUCTION_CHUNK_SIZE)
            .map(PointCloudBounds::from_points)
            .reduce(PointCloudBounds::new, PointCloudBounds::merge)
    }

    pub fn centroid(&self) -> Option<DVec3> {
        georeference::centroid(&self.positions)
    }

    pub fn translate(&mut self, offset: DVec3) {
        georeference::translate(&mut self.positions, offset);
    }

    /// Move the cloud so its centroid sits at the origin.
    /// Returns the removed centroid, zero for an empty cloud.
    pub fn recentre(&mut self) -> DVec3 {
        let centroid = self.centroid().unwrap_or(DVec3::ZERO);
        self.translate(-centroid);
        centroid
    }
}
