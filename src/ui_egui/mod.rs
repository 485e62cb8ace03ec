//! egui demo surface for the gesture engine.
//!
//! Renders a week or day time grid, feeds pointer input to
//! [`EntryGestures`](crate::services::gesture::EntryGestures) and paints the
//! visual cues it requests.

mod app;
pub mod surface;
pub mod time_grid;

pub use app::{AppHost, CalendarApp};
