/// Error type shared by every conversion step.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("LAS error: {0}")]
    Las(#[from] las::Error),

    #[error("PCD error: {0}")]
    Pcd(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("progress template error: {0}")]
    Template(#[from] indicatif::style::TemplateError),

    #[error("file path is not set: {0}")]
    MissingPath(&'static str),

    #[error("file does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{colours} colours supplied for {positions} positions")]
    LengthMismatch { positions: usize, colours: usize },

    #[error("OBJ line {line}: {message}")]
    ObjParse { line: usize, message: String },

    #[error("OBJ has {lines} vertex lines but {vertices} vertices were supplied")]
    VertexCountMismatch { lines: usize, vertices: usize },

    #[error("no points in {}", .0.display())]
    EmptyCloud(PathBuf),

    #[error("forward axis {forward} and up axis {up} are parallel")]
    ParallelAxes { forward: String, up: String },

    #[error(transparent)]
    InvalidAxis(#[from] constants::coordinate_system::ParseAxisError),

    #[error("unsupported output format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("PCD record {record} has no {field} field")]
    MissingField { record: usize, field: &'static str },
}

pub type Result<T> = std::result::Result<T, ConvertError>;
