pub mod class;
pub mod conversion;
pub mod coordinate_system;
