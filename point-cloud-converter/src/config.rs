/// Converter settings, loaded from an optional JSON file.
use crate::error::Result;
use crate::ply::PlyFormat;
use constants::conversion::{DEFAULT_COLOUR, OBJ_PRECISION};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Encoding of written PLY files.
    pub ply_format: PlyFormat,
    /// Decimal places for OBJ vertex coordinates.
    pub obj_precision: usize,
    /// Colour given to imported points when the LAS file has none.
    pub default_colour: [f32; 3],
    /// Draw progress bars while streaming points.
    pub progress: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ply_format: PlyFormat::BinaryLittleEndian,
            obj_precision: OBJ_PRECISION,
            default_colour: DEFAULT_COLOUR,
            progress: true,
        }
    }
}

impl ConverterConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
