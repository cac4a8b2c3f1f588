/// Conversion commands: each loads a file, transforms the geometry and writes
/// the result.
use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};
use crate::georeference::{self, TranslationMode};
use crate::laz::{self, LasFileInfo};
use crate::manifest::OriginManifest;
use crate::obj;
use crate::pcd;
use crate::ply;
use crate::point_cloud::PointCloud;
use constants::coordinate_system::{Axis, REFERENCE_FORWARD, REFERENCE_UP, axis_conversion};
use glam::f64::DVec3;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the georeferencing target comes from.
#[derive(Debug, Clone)]
pub enum Reference {
    /// Centroid of a LAS/LAZ point cloud.
    Las(PathBuf),
    /// Centroid stored by a previous import.
    Origin(PathBuf),
}

/// Parameters of an OBJ georeferencing run.
#[derive(Debug, Clone)]
pub struct GeoreferenceRequest {
    pub input: PathBuf,
    pub reference: Reference,
    pub mode: TranslationMode,
    /// Axes the OBJ was exported with.
    pub forward: Axis,
    pub up: Axis,
    /// Defaults to `<stem>_georeferenced.obj` next to the input.
    pub output: Option<PathBuf>,
}

impl GeoreferenceRequest {
    pub fn new(input: PathBuf, reference: Reference) -> Self {
        Self {
            input,
            reference,
            mode: TranslationMode::default(),
            forward: REFERENCE_FORWARD,
            up: REFERENCE_UP,
            output: None,
        }
    }
}

/// Output kinds a point cloud can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputKind {
    Ply,
    Obj,
}

impl OutputKind {
    fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("ply") => Ok(OutputKind::Ply),
            Some("obj") => Ok(OutputKind::Obj),
            _ => Err(ConvertError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

pub struct PointCloudConverter {
    config: ConverterConfig,
}

impl PointCloudConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// LAS/LAZ to PLY, keeping world coordinates and any RGB.
    pub fn las_to_ply(&self, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| input.with_extension("ply"));

        let cloud = laz::read_point_cloud(input, self.config.progress)?;
        ply::write_point_cloud(&output, &cloud, self.config.ply_format)?;

        info!(
            "Converted {} to {} ({} points)",
            input.display(),
            output.display(),
            cloud.len()
        );
        Ok(output)
    }

    /// LAS/LAZ to a recentred point mesh (PLY or OBJ by extension).
    /// Points without colour get the configured default; the removed centroid
    /// is saved to an origin sidecar.
    pub fn import_las(&self, input: &Path, output: Option<&Path>) -> Result<(PathBuf, OriginManifest)> {
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| input.with_extension("ply"));
        let kind = OutputKind::from_path(&output)?;

        let cloud = laz::read_point_cloud(input, self.config.progress)?;
        if cloud.is_empty() {
            return Err(ConvertError::EmptyCloud(input.to_path_buf()));
        }

        let has_colour = cloud.has_colours();
        let bounds = cloud.bounds();
        let mut cloud = cloud.with_default_colour(self.config.default_colour);
        let centroid = cloud.recentre();

        self.write_cloud(&output, &cloud, kind)?;

        let manifest = OriginManifest {
            source: input.to_path_buf(),
            point_count: cloud.len(),
            has_colour,
            centroid,
            bounds,
        };
        manifest.save(&OriginManifest::path_for(&output))?;

        info!(
            "Imported {} into local coordinates at {} (origin {:.3}, {:.3}, {:.3})",
            input.display(),
            output.display(),
            centroid.x,
            centroid.y,
            centroid.z
        );
        if !bounds.is_empty() {
            let extent = bounds.dimensions();
            info!(
                "  Extent: {:.2} x {:.2} x {:.2}",
                extent.x, extent.y, extent.z
            );
        }
        Ok((output, manifest))
    }

    /// PCD to a vertex-only OBJ.
    pub fn pcd_to_obj(&self, input: &Path, output: Option<&Path>) -> Result<PathBuf> {
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| input.with_extension("obj"));

        let cloud = pcd::read_point_cloud(input)?;
        obj::write_point_cloud(&output, &cloud, self.config.obj_precision)?;

        info!(
            "Converted {} to {} ({} points)",
            input.display(),
            output.display(),
            cloud.len()
        );
        Ok(output)
    }

    /// Move an OBJ onto the reference centroid, rewriting only vertex lines.
    ///
    /// The file stays in its export axes: the reference centroid is carried
    /// into that frame before translating, so normals and faces stay valid.
    pub fn georeference_obj(&self, request: &GeoreferenceRequest) -> Result<PathBuf> {
        let axes = axis_conversion(request.forward, request.up).ok_or_else(|| {
            ConvertError::ParallelAxes {
                forward: request.forward.to_string(),
                up: request.up.to_string(),
            }
        })?;

        let reference = self.reference_centroid(&request.reference)?;
        let target = axes * reference;

        let text = fs::read_to_string(&request.input)?;
        let mut vertices = obj::load_vertices(&text)?;
        let local_centroid = georeference::centroid(&vertices);
        let offset = georeference::align(&mut vertices, target, request.mode);
        let rewritten = obj::rewrite_vertices(&text, &vertices, self.config.obj_precision)?;

        let output = request
            .output
            .clone()
            .unwrap_or_else(|| obj::georeferenced_path(&request.input));
        fs::write(&output, rewritten)?;

        info!(
            "Georeferenced {} vertices ({} mode, axes {} forward / {} up)",
            vertices.len(),
            request.mode,
            request.forward,
            request.up
        );
        if let Some(c) = local_centroid {
            info!("  Local centroid: ({:.3}, {:.3}, {:.3})", c.x, c.y, c.z);
        }
        info!(
            "  Translation: ({:.3}, {:.3}, {:.3})",
            offset.x, offset.y, offset.z
        );
        info!("Saved {}", output.display());
        Ok(output)
    }

    /// Header summary with class counts.
    pub fn info(&self, input: &Path) -> Result<LasFileInfo> {
        let info = LasFileInfo::from_path(input, self.config.progress)?;
        info.log(input);
        Ok(info)
    }

    fn reference_centroid(&self, reference: &Reference) -> Result<DVec3> {
        match reference {
            Reference::Las(path) => laz::read_centroid(path, self.config.progress),
            Reference::Origin(path) => Ok(OriginManifest::load(path)?.centroid),
        }
    }

    fn write_cloud(&self, output: &Path, cloud: &PointCloud, kind: OutputKind) -> Result<()> {
        match kind {
            OutputKind::Ply => ply::write_point_cloud(output, cloud, self.config.ply_format),
            OutputKind::Obj => obj::write_point_cloud(output, cloud, self.config.obj_precision),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::laz::tests::survey_fixture;
    use crate::pcd::tests::write_fixture as write_pcd_fixture;
    use crate::ply::PlyFormat;

    fn quiet_converter() -> PointCloudConverter {
        PointCloudConverter::new(ConverterConfig {
            ply_format: PlyFormat::Ascii,
            progress: false,
            ..ConverterConfig::default()
        })
    }

    fn assert_close(a: DVec3, b: DVec3) {
        assert!((a - b).length() < 1e-3, "{:?} != {:?}", a, b);
    }

    #[test]
    fn las_to_ply_defaults_to_sibling_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = survey_fixture(dir.path(), true);
        let output = quiet_converter().las_to_ply(&input, None).unwrap();

        assert_eq!(output, dir.path().join("survey_rgb.ply"));
        let text = fs::read_to_string(&output).unwrap();
        assert!(text.contains("element vertex 4"));
        assert!(text.contains("property uchar red"));
        assert!(text.contains("1000 2000 10 255 0 0"));
    }

    #[test]
    fn las_to_ply_writes_binary_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let input = survey_fixture(dir.path(), true);
        let converter = PointCloudConverter::new(ConverterConfig {
            progress: false,
            ..ConverterConfig::default()
        });
        let output = converter.las_to_ply(&input, None).unwrap();

        let bytes = fs::read(&output).unwrap();
        let marker = b"end_header\n";
        let header_len = bytes
            .windows(marker.len())
            .position(|w| w == marker)
            .unwrap()
            + marker.len();
        let header = String::from_utf8_lossy(&bytes[..header_len]);
        assert!(header.contains("format binary_little_endian 1.0"));

        let body = &bytes[header_len..];
        assert_eq!(body.len(), 4 * (3 * 8 + 3));
        let x = f64::from_le_bytes(body[0..8].try_into().unwrap());
        let z = f64::from_le_bytes(body[16..24].try_into().unwrap());
        assert!((x - 1000.0).abs() < 1e-3);
        assert!((z - 10.0).abs() < 1e-3);
        assert_eq!(&body[24..27], &[255, 0, 0]);
    }

    #[test]
    fn pcd_to_obj_writes_every_point() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_pcd_fixture(dir.path(), "area.pcd", 4);
        let output = quiet_converter().pcd_to_obj(&input, None).unwrap();

        assert_eq!(output, dir.path().join("area.obj"));
        let vertices = obj::load_vertices(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(
            vertices,
            vec![
                DVec3::new(0.5, 1.0, 1.5),
                DVec3::new(-2.0, 0.0, 4.0),
                DVec3::new(3.0, 3.0, 3.0),
            ]
        );
    }

    #[test]
    fn import_recentres_and_defaults_to_white() {
        let dir = tempfile::tempdir().unwrap();
        let input = survey_fixture(dir.path(), false);
        let output = dir.path().join("local.obj");
        let (written, manifest) = quiet_converter().import_las(&input, Some(&output)).unwrap();

        assert_eq!(written, output);
        assert!(!manifest.has_colour);
        assert_close(manifest.centroid, DVec3::new(1001.0, 2002.0, 12.0));

        let text = fs::read_to_string(&output).unwrap();
        let vertices = obj::load_vertices(&text).unwrap();
        assert_eq!(vertices.len(), 4);
        assert_close(georeference::centroid(&vertices).unwrap(), DVec3::ZERO);
        assert!(text.contains(" 1.0000 1.0000 1.0000"));

        let sidecar = OriginManifest::load(&dir.path().join("local_origin.json")).unwrap();
        assert_eq!(sidecar, manifest);
    }

    #[test]
    fn import_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let input = survey_fixture(dir.path(), false);
        let err = quiet_converter()
            .import_las(&input, Some(&dir.path().join("local.stl")))
            .unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat(_)));
    }

    #[test]
    fn georeference_lands_on_reference_centroid() {
        let dir = tempfile::tempdir().unwrap();
        let reference = survey_fixture(dir.path(), false);
        let mesh = dir.path().join("model.obj");
        fs::write(
            &mesh,
            "o Model\nv -1 -1 0\nv 1 -1 0\nv 1 1 0\nv -1 1 2\nf 1 2 3 4\n",
        )
        .unwrap();

        let request = GeoreferenceRequest::new(mesh.clone(), Reference::Las(reference));
        let output = quiet_converter().georeference_obj(&request).unwrap();

        assert_eq!(output, dir.path().join("model_georeferenced.obj"));
        let text = fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("o Model\n"));
        assert!(text.ends_with("f 1 2 3 4\n"));
        let vertices = obj::load_vertices(&text).unwrap();
        assert_close(
            georeference::centroid(&vertices).unwrap(),
            DVec3::new(1001.0, 2002.0, 12.0),
        );
    }

    #[test]
    fn import_then_offset_restores_survey_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let input = survey_fixture(dir.path(), false);
        let local = dir.path().join("local.obj");
        let converter = quiet_converter();
        converter.import_las(&input, Some(&local)).unwrap();

        let mut request = GeoreferenceRequest::new(
            local.clone(),
            Reference::Origin(dir.path().join("local_origin.json")),
        );
        request.mode = TranslationMode::Offset;
        request.output = Some(dir.path().join("restored.obj"));
        let output = converter.georeference_obj(&request).unwrap();

        let restored = obj::load_vertices(&fs::read_to_string(output).unwrap()).unwrap();
        assert_close(restored[0], DVec3::new(1000.0, 2000.0, 10.0));
        assert_close(restored[2], DVec3::new(1002.0, 2004.0, 14.0));
    }

    #[test]
    fn georeference_respects_export_axes() {
        let dir = tempfile::tempdir().unwrap();
        let reference = survey_fixture(dir.path(), false);
        let mesh = dir.path().join("y_up.obj");
        fs::write(&mesh, "v 0 0 0\nv 2 0 0\n").unwrap();

        let mut request = GeoreferenceRequest::new(mesh, Reference::Las(reference));
        request.forward = Axis::NegZ;
        request.up = Axis::Y;
        let output = quiet_converter().georeference_obj(&request).unwrap();

        let vertices = obj::load_vertices(&fs::read_to_string(output).unwrap()).unwrap();
        // Survey height 12 becomes Y, survey northing 2002 becomes -Z.
        assert_close(
            georeference::centroid(&vertices).unwrap(),
            DVec3::new(1001.0, 12.0, -2002.0),
        );
    }

    #[test]
    fn georeference_rejects_parallel_axes() {
        let mut request = GeoreferenceRequest::new(
            PathBuf::from("unused.obj"),
            Reference::Origin(PathBuf::from("unused.json")),
        );
        request.forward = Axis::Z;
        request.up = Axis::NegZ;
        let err = quiet_converter().georeference_obj(&request).unwrap_err();
        assert!(matches!(err, ConvertError::ParallelAxes { .. }));
    }

    #[test]
    fn info_reports_header() {
        let dir = tempfile::tempdir().unwrap();
        let input = survey_fixture(dir.path(), true);
        let info = quiet_converter().info(&input).unwrap();
        assert_eq!(info.point_count, 4);
        assert_eq!(info.classes.values().sum::<u64>(), 4);
    }
}
