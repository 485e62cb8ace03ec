// Rust Calendar Gestures Library
// Drag and resize engine for time-grid calendar views

pub mod error;
pub mod models;
pub mod services;
pub mod ui_egui;
pub mod utils;

pub use error::{EngineError, EngineResult, SurfaceError};
pub use models::entry::CalendarEntry;
pub use models::settings::EngineSettings;
pub use services::gesture::{EntryGestures, GestureHost, GestureOutcome, PointerInput};
