// Service module exports
// Engine logic: grid resolution, conversions, gesture controllers, settings

pub mod conversion;
pub mod drag;
pub mod gesture;
pub mod grid;
pub mod resize;
pub mod settings;
