/// Centroid and translation arithmetic used to move geometry between a local
/// frame and the georeferenced frame of a reference point cloud.
use constants::conversion::REDUCTION_CHUNK_SIZE;
use glam::f64::DVec3;
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;

/// How geometry is moved onto the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslationMode {
    /// Move the geometry so its own centroid lands on the reference centroid.
    #[default]
    Centroid,
    /// Add the reference centroid to every vertex. Inverts an import recentre.
    Offset,
}

impl FromStr for TranslationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "centroid" => Ok(TranslationMode::Centroid),
            "offset" => Ok(TranslationMode::Offset),
            other => Err(format!("unknown translation mode '{}'", other)),
        }
    }
}

impl fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslationMode::Centroid => f.write_str("centroid"),
            TranslationMode::Offset => f.write_str("offset"),
        }
    }
}

/// Arithmetic mean of the points, or `None` when there are none.
pub fn centroid(points: &[DVec3]) -> Option<DVec3> {
    if points.is_empty() {
        return None;
    }

    let sum = points
        .par_chunks(REDUCTION_CHUNK_SIZE)
        .map(|chunk| chunk.iter().copied().sum::<DVec3>())
        .reduce(|| DVec3::ZERO, |a, b| a + b);

    Some(sum / points.len() as f64)
}

/// Shift every point by `offset`.
pub fn translate(points: &mut [DVec3], offset: DVec3) {
    points.par_iter_mut().for_each(|p| *p += offset);
}

/// Shift the points so their centroid lands on `target`.
/// Returns the applied translation; empty input is left untouched.
pub fn translate_to_target(points: &mut [DVec3], target: DVec3) -> DVec3 {
    let Some(current) = centroid(points) else {
        return DVec3::ZERO;
    };

    let offset = target - current;
    translate(points, offset);
    offset
}

/// Move the points onto `reference` using the chosen mode.
pub fn align(points: &mut [DVec3], reference: DVec3, mode: TranslationMode) -> DVec3 {
    match mode {
        TranslationMode::Centroid => translate_to_target(points, reference),
        TranslationMode::Offset => {
            translate(points, reference);
            reference
        }
    }
}
