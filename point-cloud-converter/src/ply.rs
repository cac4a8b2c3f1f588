/// PLY point cloud writer.
use crate::error::Result;
use crate::point_cloud::PointCloud;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlyFormat {
    Ascii,
    #[default]
    BinaryLittleEndian,
}

impl PlyFormat {
    fn header_name(self) -> &'static str {
        match self {
            PlyFormat::Ascii => "ascii",
            PlyFormat::BinaryLittleEndian => "binary_little_endian",
        }
    }
}

/// Quantise a 0-1 colour channel to a byte.
pub fn colour_to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn write_point_cloud(path: &Path, cloud: &PointCloud, format: PlyFormat) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_to(&mut writer, cloud, format)?;
    writer.flush()?;
    Ok(())
}

/// Write header and vertex data; colour properties are only emitted when present.
pub fn write_to<W: Write>(writer: &mut W, cloud: &PointCloud, format: PlyFormat) -> Result<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format {} 1.0", format.header_name())?;
    writeln!(writer, "comment point-cloud-converter")?;
    writeln!(writer, "element vertex {}", cloud.len())?;
    for axis in ["x", "y", "z"] {
        writeln!(writer, "property double {}", axis)?;
    }
    if cloud.has_colours() {
        for channel in ["red", "green", "blue"] {
            writeln!(writer, "property uchar {}", channel)?;
        }
    }
    writeln!(writer, "end_header")?;

    let colours = cloud.colours();
    for (idx, p) in cloud.positions().iter().enumerate() {
        let rgb = colours.map(|c| c[idx].map(colour_to_u8));
        match format {
            PlyFormat::Ascii => {
                write!(writer, "{} {} {}", p.x, p.y, p.z)?;
                if let Some([r, g, b]) = rgb {
                    write!(writer, " {} {} {}", r, g, b)?;
                }
                writeln!(writer)?;
            }
            PlyFormat::BinaryLittleEndian => {
                writer.write_all(&p.x.to_le_bytes())?;
                writer.write_all(&p.y.to_le_bytes())?;
                writer.write_all(&p.z.to_le_bytes())?;
                if let Some(rgb) = rgb {
                    writer.write_all(&rgb)?;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::f64::DVec3;

    fn coloured_pair() -> PointCloud {
        PointCloud::new(
            vec![DVec3::new(1.5, -2.0, 3.25), DVec3::new(0.0, 0.0, 0.0)],
            Some(vec![[1.0, 0.5, 0.0], [0.0, 0.0, 1.0]]),
        )
        .unwrap()
    }

    #[test]
    fn ascii_output_lists_vertices_with_colour() {
        let mut buf = Vec::new();
        write_to(&mut buf, &coloured_pair(), PlyFormat::Ascii).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "ply");
        assert_eq!(lines[1], "format ascii 1.0");
        assert!(lines.contains(&"element vertex 2"));
        assert!(lines.contains(&"property uchar red"));
        let body_start = lines.iter().position(|l| *l == "end_header").unwrap() + 1;
        assert_eq!(lines[body_start], "1.5 -2 3.25 255 128 0");
        assert_eq!(lines[body_start + 1], "0 0 0 0 0 255");
    }

    #[test]
    fn binary_output_has_fixed_stride() {
        let mut buf = Vec::new();
        write_to(&mut buf, &coloured_pair(), PlyFormat::BinaryLittleEndian).unwrap();
        let marker = b"end_header\n";
        let header_len = buf
            .windows(marker.len())
            .position(|w| w == marker)
            .unwrap()
            + marker.len();
        let body = &buf[header_len..];
        assert_eq!(body.len(), 2 * (3 * 8 + 3));
        assert_eq!(f64::from_le_bytes(body[0..8].try_into().unwrap()), 1.5);
        assert_eq!(&body[24..27], &[255, 128, 0]);
    }

    #[test]
    fn colourless_cloud_omits_colour_properties() {
        let cloud = PointCloud::from_positions(vec![DVec3::ONE]);
        let mut buf = Vec::new();
        write_to(&mut buf, &cloud, PlyFormat::Ascii).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(!text.contains("uchar"));
        assert!(text.ends_with("end_header\n1 1 1\n"));
    }

    #[test]
    fn colour_quantisation_clamps() {
        assert_eq!(colour_to_u8(-0.2), 0);
        assert_eq!(colour_to_u8(1.7), 255);
        assert_eq!(colour_to_u8(0.5), 128);
    }
}
