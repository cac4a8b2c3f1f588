/// PCD input through pcd-rs. Only XYZ is read.
use crate::error::{ConvertError, Result};
use crate::point_cloud::PointCloud;
use glam::f64::DVec3;
use log::info;
use pcd_rs::DynReader;
use std::fs;
use std::path::Path;

pub fn read_point_cloud(file_path: &Path) -> Result<PointCloud> {
    if !file_path.exists() {
        return Err(ConvertError::NotFound(file_path.to_path_buf()));
    }

    let buf = fs::read(file_path)?;
    let reader = DynReader::from_bytes(&buf).map_err(|e| ConvertError::Pcd(e.to_string()))?;

    let mut positions = Vec::new();
    for (idx, record) in reader.enumerate() {
        let record = record.map_err(|e| ConvertError::Pcd(e.to_string()))?;
        // to_xyz only matches the exact stored type, so try F4 then F8.
        let xyz = record.clone()
            .to_xyz::<f32>()
            .map(|[x, y, z]| DVec3::new(x as f64, y as f64, z as f64))
            .or_else(|| record.to_xyz::<f64>().map(DVec3::from_array))
            .ok_or(ConvertError::MissingField {
                record: idx,
                field: "xyz",
            })?;
        positions.push(xyz);
    }

    info!("Read {} points from {}", positions.len(), file_path.display());
    Ok(PointCloud::from_positions(positions))
}
