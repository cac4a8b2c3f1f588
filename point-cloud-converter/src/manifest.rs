/// Origin sidecar written by an import, recording the centroid that was
/// removed so later exports can be moved back onto the survey frame.
use crate::bounds::PointCloudBounds;
use crate::error::Result;
use constants::conversion::ORIGIN_SUFFIX;
use glam::f64::DVec3;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginManifest {
    /// Point cloud the local frame was derived from.
    pub source: PathBuf,
    pub point_count: usize,
    pub has_colour: bool,
    /// Centroid subtracted from every point on import.
    pub centroid: DVec3,
    /// Bounds of the source cloud before recentring.
    pub bounds: PointCloudBounds,
}

impl OriginManifest {
    /// `site.ply` gets `site_origin.json` alongside it.
    pub fn path_for(output: &Path) -> PathBuf {
        let stem = output
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        output.with_file_name(format!("{}{}.json", stem, ORIGIN_SUFFIX))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Saved {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
