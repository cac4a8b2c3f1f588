/// Shared settings for point cloud conversion

/// Full-scale value of a LAS 16-bit colour channel
pub const LAS_COLOUR_MAX: f32 = 65535.0;

/// Colour assigned to every point when the source carries no RGB
pub const DEFAULT_COLOUR: [f32; 3] = [1.0, 1.0, 1.0];

/// Decimal places written for rewritten OBJ vertex coordinates
pub const OBJ_PRECISION: usize = 6;

/// Suffix appended to the stem of a georeferenced OBJ
pub const GEOREFERENCED_SUFFIX: &str = "_georeferenced";

/// Suffix appended to the stem of an import's origin sidecar
pub const ORIGIN_SUFFIX: &str = "_origin";

/// Points per rayon chunk in centroid and bounds reductions
pub const REDUCTION_CHUNK_SIZE: usize = 25_000;

/// Points between progress bar refreshes while streaming a file
pub const PROGRESS_STRIDE: usize = 50_000;
