/// LAS/LAZ input: point loading and header inspection.
use crate::error::{ConvertError, Result};
use crate::point_cloud::PointCloud;
use crate::progress::point_bar;
use constants::class::class_name;
use constants::conversion::{LAS_COLOUR_MAX, PROGRESS_STRIDE};
use glam::f64::DVec3;
use las::Reader;
use log::info;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Create LAS file reader for point cloud access.
/// Handles both .las and .laz compressed formats.
pub fn create_reader(file_path: &Path) -> Result<Reader> {
    if file_path.as_os_str().is_empty() {
        return Err(ConvertError::MissingPath("LAS input"));
    }
    if !file_path.exists() {
        return Err(ConvertError::NotFound(file_path.to_path_buf()));
    }

    let file = File::open(file_path)?;
    let buf_reader = BufReader::new(file);
    Ok(Reader::new(buf_reader)?)
}

fn normalise_colour(colour: las::Color) -> [f32; 3] {
    [
        colour.red as f32 / LAS_COLOUR_MAX,
        colour.green as f32 / LAS_COLOUR_MAX,
        colour.blue as f32 / LAS_COLOUR_MAX,
    ]
}

/// Load every point; colours are kept only when the point format has RGB.
pub fn read_point_cloud(file_path: &Path, progress: bool) -> Result<PointCloud> {
    let mut reader = create_reader(file_path)?;
    let total_points = reader.header().number_of_points();
    let has_colour = reader.header().point_format().has_color;

    let pb = point_bar(total_points, progress, "Loading points")?;

    let mut positions = Vec::with_capacity(total_points as usize);
    let mut colours = has_colour.then(|| Vec::with_capacity(total_points as usize));

    for (idx, point_result) in reader.points().enumerate() {
        let point = point_result?;
        positions.push(DVec3::new(point.x, point.y, point.z));
        if let Some(colours) = colours.as_mut() {
            colours.push(point.color.map(normalise_colour).unwrap_or([0.0; 3]));
        }

        if idx % PROGRESS_STRIDE == 0 {
            pb.set_position(idx as u64);
        }
    }
    pb.finish_with_message("Points loaded");

    info!(
        "Read {} points from {} ({})",
        positions.len(),
        file_path.display(),
        if has_colour { "RGB" } else { "no colour" }
    );

    PointCloud::new(positions, colours)
}

/// Centroid of a reference LAS file.
pub fn read_centroid(file_path: &Path, progress: bool) -> Result<DVec3> {
    let cloud = read_point_cloud(file_path, progress)?;
    cloud
        .centroid()
        .ok_or_else(|| ConvertError::EmptyCloud(file_path.to_path_buf()))
}

/// Header summary and per-class point counts of a LAS/LAZ file.
#[derive(Debug, Clone)]
pub struct LasFileInfo {
    pub version: (u8, u8),
    pub point_format: u8,
    pub point_count: u64,
    pub has_colour: bool,
    pub scale: DVec3,
    pub offset: DVec3,
    pub min: DVec3,
    pub max: DVec3,
    pub extra_bytes_vlr: bool,
    pub classes: BTreeMap<u8, u64>,
}

impl LasFileInfo {
    pub fn from_path(file_path: &Path, progress: bool) -> Result<Self> {
        let mut reader = create_reader(file_path)?;
        let header = reader.header();
        let transforms = header.transforms();
        let bounds = header.bounds();

        let mut info = Self {
            version: (header.version().major, header.version().minor),
            point_format: header.point_format().to_u8()?,
            point_count: header.number_of_points(),
            has_colour: header.point_format().has_color,
            scale: DVec3::new(transforms.x.scale, transforms.y.scale, transforms.z.scale),
            offset: DVec3::new(
                transforms.x.offset,
                transforms.y.offset,
                transforms.z.offset,
            ),
            min: DVec3::new(bounds.min.x, bounds.min.y, bounds.min.z),
            max: DVec3::new(bounds.max.x, bounds.max.y, bounds.max.z),
            extra_bytes_vlr: header.vlrs().iter().any(|vlr| vlr.record_id == 4),
            classes: BTreeMap::new(),
        };

        let pb = point_bar(info.point_count, progress, "Counting classes")?;
        for (idx, point_result) in reader.points().enumerate() {
            let point = point_result?;
            *info
                .classes
                .entry(u8::from(point.classification))
                .or_insert(0) += 1;

            if idx % PROGRESS_STRIDE == 0 {
                pb.set_position(idx as u64);
            }
        }
        pb.finish_with_message("Classes counted");

        Ok(info)
    }

    /// Log coordinate system and file information.
    pub fn log(&self, file_path: &Path) {
        info!("LAS/LAZ File Information:");
        info!("  File: {}", file_path.display());
        info!("  Version: {}.{}", self.version.0, self.version.1);
        info!("  Points: {}", self.point_count);
        info!("  Point format: {}", self.point_format);
        info!("  Colour: {}", if self.has_colour { "RGB" } else { "none" });
        info!(
            "  Scale factors: X={}, Y={}, Z={}",
            self.scale.x, self.scale.y, self.scale.z
        );
        info!(
            "  Offsets: X={}, Y={}, Z={}",
            self.offset.x, self.offset.y, self.offset.z
        );
        info!("  X: {:.2} to {:.2}", self.min.x, self.max.x);
        info!("  Y: {:.2} to {:.2}", self.min.y, self.max.y);
        info!("  Z: {:.2} to {:.2}", self.min.z, self.max.z);
        if self.extra_bytes_vlr {
            info!("  Extra Bytes VLR present");
        }
        for (class, count) in &self.classes {
            info!("  Class {:>3} {:<26} {}", class, class_name(*class), count);
        }
    }
}
