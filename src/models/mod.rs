// Module exports for models

pub mod entry;
pub mod geometry;
pub mod settings;
pub mod slots;
