/// Wavefront OBJ vertex handling.
///
/// Only geometric vertex lines (`v x y z ...`) are interpreted. Everything
/// else in a file, faces, normals, groups, comments and material references,
/// passes through a rewrite untouched.
use crate::error::{ConvertError, Result};
use crate::point_cloud::PointCloud;
use constants::conversion::GEOREFERENCED_SUFFIX;
use glam::f64::DVec3;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

fn is_vertex_line(line: &str) -> bool {
    line.starts_with("v ")
}

/// Lines with their terminators; `\n`, `\r\n` and a lone `\r` all end a line.
fn lines_inclusive(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let line_end = b == b'\n' || (b == b'\r' && bytes.get(i + 1) != Some(&b'\n'));
        if line_end {
            lines.push(&text[start..=i]);
            start = i + 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Split a line into its content and its terminator.
fn split_terminator(line: &str) -> (&str, &str) {
    let body = line.trim_end_matches(['\n', '\r']);
    (body, &line[body.len()..])
}

/// Parse a vertex line into its position and any trailing tokens.
fn parse_vertex(body: &str, line_no: usize) -> Result<(DVec3, Vec<&str>)> {
    let mut tokens = body.split_whitespace().skip(1);
    let mut coords = [0.0f64; 3];
    for (axis, coord) in coords.iter_mut().enumerate() {
        let token = tokens.next().ok_or_else(|| ConvertError::ObjParse {
            line: line_no,
            message: format!("vertex has {} coordinates, expected 3", axis),
        })?;
        *coord = token.parse().map_err(|_| ConvertError::ObjParse {
            line: line_no,
            message: format!("invalid coordinate '{}'", token),
        })?;
    }

    Ok((DVec3::from_array(coords), tokens.collect()))
}

/// Positions of every vertex line, in file order.
pub fn load_vertices(text: &str) -> Result<Vec<DVec3>> {
    lines_inclusive(text)
        .into_iter()
        .map(|line| split_terminator(line).0)
        .enumerate()
        .filter(|(_, body)| is_vertex_line(body))
        .map(|(idx, body)| parse_vertex(body, idx + 1).map(|(p, _)| p))
        .collect()
}

/// Replace vertex positions in order, copying all other lines verbatim.
/// Tokens after the third coordinate (vertex colours) are kept.
pub fn rewrite_vertices(text: &str, vertices: &[DVec3], precision: usize) -> Result<String> {
    let lines = lines_inclusive(text);
    let vertex_lines = lines
        .iter()
        .filter(|l| is_vertex_line(split_terminator(l).0))
        .count();
    if vertex_lines != vertices.len() {
        return Err(ConvertError::VertexCountMismatch {
            lines: vertex_lines,
            vertices: vertices.len(),
        });
    }

    let mut out = String::with_capacity(text.len());
    let mut next_vertex = vertices.iter();

    for (idx, line) in lines.into_iter().enumerate() {
        let (body, terminator) = split_terminator(line);
        if !is_vertex_line(body) {
            out.push_str(line);
            continue;
        }

        let (_, extra) = parse_vertex(body, idx + 1)?;
        // Count was checked above.
        let Some(v) = next_vertex.next() else { break };
        out.push_str(&format!(
            "v {:.p$} {:.p$} {:.p$}",
            v.x,
            v.y,
            v.z,
            p = precision
        ));
        for token in extra {
            out.push(' ');
            out.push_str(token);
        }
        out.push_str(terminator);
    }

    Ok(out)
}

/// Write a vertex-only OBJ; coloured clouds use the `v x y z r g b` extension.
pub fn write_point_cloud(path: &Path, cloud: &PointCloud, precision: usize) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "# point-cloud-converter")?;
    writeln!(writer, "# {} vertices", cloud.len())?;

    let colours = cloud.colours();
    for (idx, p) in cloud.positions().iter().enumerate() {
        write!(
            writer,
            "v {:.p$} {:.p$} {:.p$}",
            p.x,
            p.y,
            p.z,
            p = precision
        )?;
        if let Some(colours) = colours {
            let [r, g, b] = colours[idx];
            write!(writer, " {:.4} {:.4} {:.4}", r, g, b)?;
        }
        writeln!(writer)?;
    }

    writer.flush()?;
    Ok(())
}

/// `scan.obj` becomes `scan_georeferenced.obj` next to the input.
pub fn georeferenced_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    path.with_file_name(format!("{}{}.obj", stem, GEOREFERENCED_SUFFIX))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE_CORNER: &str = "# exported mesh\r\n\
mtllib scene.mtl\r\n\
o Plane\r\n\
v 1.000000 0.000000 -1.000000\r\n\
v -1.000000 0.000000 -1.000000 0.5 0.5 0.5\r\n\
vn 0.0000 1.0000 0.0000\r\n\
vt 0.000000 0.000000\r\n\
v 0.000000 2.000000 1.000000\r\n\
s 0\r\n\
f 1//1 2//1 3//1\r\n";

    #[test]
    fn loads_only_geometric_vertices() {
        let vertices = load_vertices(CUBE_CORNER).unwrap();
        assert_eq!(
            vertices,
            vec![
                DVec3::new(1.0, 0.0, -1.0),
                DVec3::new(-1.0, 0.0, -1.0),
                DVec3::new(0.0, 2.0, 1.0),
            ]
        );
    }

    #[test]
    fn rewrite_preserves_non_vertex_lines_verbatim() {
        let moved = [
            DVec3::new(100.5, 200.0, 3.0),
            DVec3::new(98.5, 200.0, 3.0),
            DVec3::new(99.5, 202.0, 5.0),
        ];
        let out = rewrite_vertices(CUBE_CORNER, &moved, 6).unwrap();

        let original: Vec<&str> = CUBE_CORNER.split_inclusive('\n').collect();
        let rewritten: Vec<&str> = out.split_inclusive('\n').collect();
        assert_eq!(original.len(), rewritten.len());
        for (a, b) in original.iter().zip(&rewritten) {
            if !a.starts_with("v ") {
                assert_eq!(a, b);
            }
        }

        assert_eq!(rewritten[3], "v 100.500000 200.000000 3.000000\r\n");
        assert_eq!(rewritten[4], "v 98.500000 200.000000 3.000000 0.5 0.5 0.5\r\n");
        assert_eq!(load_vertices(&out).unwrap(), moved.to_vec());
    }

    #[test]
    fn carriage_return_only_files_are_split() {
        let text = "o A\rv 1 2 3\rv 4 5 6\r";
        assert_eq!(
            load_vertices(text).unwrap(),
            vec![DVec3::new(1.0, 2.0, 3.0), DVec3::new(4.0, 5.0, 6.0)]
        );

        let out = rewrite_vertices(text, &[DVec3::ZERO, DVec3::ONE], 1).unwrap();
        assert_eq!(out, "o A\rv 0.0 0.0 0.0\rv 1.0 1.0 1.0\r");
    }

    #[test]
    fn rewrite_keeps_missing_final_newline() {
        let out = rewrite_vertices("v 0 0 0", &[DVec3::ONE], 2).unwrap();
        assert_eq!(out, "v 1.00 1.00 1.00");
    }

    #[test]
    fn rewrite_rejects_wrong_vertex_count() {
        let err = rewrite_vertices(CUBE_CORNER, &[DVec3::ZERO], 6).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::VertexCountMismatch {
                lines: 3,
                vertices: 1
            }
        ));
    }

    #[test]
    fn malformed_vertex_reports_line() {
        let err = load_vertices("o Broken\nv 1.0 2.0\n").unwrap_err();
        assert!(matches!(err, ConvertError::ObjParse { line: 2, .. }));

        let err = load_vertices("v 1.0 nan-ish 2.0\n").unwrap_err();
        assert!(matches!(err, ConvertError::ObjParse { line: 1, .. }));
    }

    #[test]
    fn georeferenced_name_follows_stem() {
        assert_eq!(
            georeferenced_path(Path::new("/tmp/out/site.obj")),
            PathBuf::from("/tmp/out/site_georeferenced.obj")
        );
        assert_eq!(
            georeferenced_path(Path::new("mesh.v2.OBJ")),
            PathBuf::from("mesh.v2_georeferenced.obj")
        );
    }

    #[test]
    fn writes_coloured_vertex_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.obj");
        let cloud = PointCloud::new(
            vec![DVec3::new(0.25, -1.0, 2.0)],
            Some(vec![[1.0, 0.0, 0.5]]),
        )
        .unwrap();
        write_point_cloud(&path, &cloud, 3).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("v 0.250 -1.000 2.000 1.0000 0.0000 0.5000\n"));
        assert_eq!(load_vertices(&text).unwrap(), vec![DVec3::new(0.25, -1.0, 2.0)]);
    }
}
