/// Axis conventions shared by exporters and the georeferencing pass.
use glam::f64::{DMat3, DVec3};
use std::fmt;
use std::str::FromStr;

/// Forward axis of the reference (LAS) frame.
pub const REFERENCE_FORWARD: Axis = Axis::Y;

/// Up axis of the reference (LAS) frame.
pub const REFERENCE_UP: Axis = Axis::Z;

/// Signed coordinate axis used to describe an export frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
    NegX,
    NegY,
    NegZ,
}

impl Axis {
    /// Unit vector pointing along this axis.
    pub fn unit(self) -> DVec3 {
        match self {
            Axis::X => DVec3::X,
            Axis::Y => DVec3::Y,
            Axis::Z => DVec3::Z,
            Axis::NegX => DVec3::NEG_X,
            Axis::NegY => DVec3::NEG_Y,
            Axis::NegZ => DVec3::NEG_Z,
        }
    }

    /// True when both axes lie on the same line, ignoring sign.
    pub fn is_parallel_to(self, other: Axis) -> bool {
        self.unit().cross(other.unit()) == DVec3::ZERO
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
            Axis::NegX => "-X",
            Axis::NegY => "-Y",
            Axis::NegZ => "-Z",
        };
        f.write_str(name)
    }
}

/// Error returned when an axis name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAxisError(pub String);

impl fmt::Display for ParseAxisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown axis '{}'", self.0)
    }
}

impl std::error::Error for ParseAxisError {}

impl FromStr for Axis {
    type Err = ParseAxisError;

    /// Accepts `X`, `-X` and `NEGATIVE_X` forms, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" | "+X" => Ok(Axis::X),
            "Y" | "+Y" => Ok(Axis::Y),
            "Z" | "+Z" => Ok(Axis::Z),
            "-X" | "NEGATIVE_X" => Ok(Axis::NegX),
            "-Y" | "NEGATIVE_Y" => Ok(Axis::NegY),
            "-Z" | "NEGATIVE_Z" => Ok(Axis::NegZ),
            _ => Err(ParseAxisError(s.to_string())),
        }
    }
}

/// Build the matrix taking reference-frame coordinates (forward +Y, up +Z)
/// into a frame with the given forward and up axes.
/// Columns are `forward x up`, `forward`, `up`; returns `None` for parallel axes.
pub fn axis_conversion(forward: Axis, up: Axis) -> Option<DMat3> {
    if forward.is_parallel_to(up) {
        return None;
    }

    let forward = forward.unit();
    let up = up.unit();
    Some(DMat3::from_cols(forward.cross(up), forward, up))
}
