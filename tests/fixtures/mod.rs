// Test fixtures - reusable test data
// A recording host, a rendered week grid and pointer helpers shared by the integration tests

#![allow(dead_code)]

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use egui::{Pos2, Vec2};

use rust_calendar_gestures::models::entry::CalendarEntry;
use rust_calendar_gestures::models::geometry::{ContainerRole, ElementHandle};
use rust_calendar_gestures::services::gesture::{GestureHost, PointerInput, VisualCue};
use rust_calendar_gestures::ui_egui::surface::RenderedGrid;

pub const HOUR_HEIGHT: f32 = 60.0;
pub const COLUMN_WIDTH: f32 = 100.0;

/// Sample entries
pub mod entries {
    use super::*;

    /// Jan 15 2023, 10:00 - 12:00
    pub fn two_hour_meeting() -> CalendarEntry {
        CalendarEntry::new("meeting", "2023-01-15T10:00", "2023-01-15T12:00")
            .with_field("title", "Planning")
            .with_field("color", "#4682B4")
    }

    /// Jan 15 2023, 10:00 - 11:00
    pub fn one_hour_call() -> CalendarEntry {
        CalendarEntry::new("call", "2023-01-15T10:00", "2023-01-15T11:00")
            .with_field("title", "Call")
    }

    /// Three entries stacked in the 14:00 slot of Jan 16 2023
    pub fn busy_afternoon() -> Vec<CalendarEntry> {
        (0..3)
            .map(|i| {
                CalendarEntry::new(
                    format!("busy-{}", i),
                    "2023-01-16T14:00",
                    "2023-01-16T15:00",
                )
            })
            .collect()
    }
}

/// The week of Sunday Jan 15 2023.
pub fn week_of_jan_15() -> Vec<NaiveDate> {
    (15..22)
        .map(|d| NaiveDate::from_ymd_opt(2023, 1, d).unwrap())
        .collect()
}

pub fn week_grid(entries: &[CalendarEntry]) -> RenderedGrid {
    RenderedGrid::layout(
        Pos2::ZERO,
        ContainerRole::WeekGrid,
        &week_of_jan_15(),
        COLUMN_WIDTH,
        HOUR_HEIGHT,
        entries,
    )
}

pub fn day_grid(entries: &[CalendarEntry]) -> RenderedGrid {
    RenderedGrid::layout(
        Pos2::ZERO,
        ContainerRole::DayView,
        &week_of_jan_15()[..1],
        COLUMN_WIDTH * 4.0,
        HOUR_HEIGHT,
        entries,
    )
}

pub fn element<'g>(grid: &'g RenderedGrid, entry_id: &str) -> &'g ElementHandle {
    grid.entries
        .iter()
        .map(|block| &block.element)
        .find(|element| element.entry_id == entry_id)
        .unwrap_or_else(|| panic!("entry {} not laid out", entry_id))
}

/// Point in the middle of an entry's body.
pub fn body_point(element: &ElementHandle) -> Pos2 {
    Pos2::new(element.rect.center().x, element.rect.top() + 10.0)
}

/// Point on an entry's bottom resize handle.
pub fn handle_point(element: &ElementHandle) -> Pos2 {
    Pos2::new(element.rect.center().x, element.rect.bottom() - 2.0)
}

/// Pointer clock that advances by a fixed step per sample.
pub struct Clock {
    t0: Instant,
    elapsed: Duration,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            t0: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn now(&self) -> Instant {
        self.t0 + self.elapsed
    }

    pub fn advance(&mut self, by: Duration) -> Instant {
        self.elapsed += by;
        self.now()
    }

    /// Sample at `pos`, 16 ms after the previous one.
    pub fn at(&mut self, pos: Pos2) -> PointerInput {
        PointerInput::new(pos, self.advance(Duration::from_millis(16)))
    }

    pub fn offset(&mut self, from: Pos2, by: Vec2) -> PointerInput {
        self.at(from + by)
    }
}

#[derive(Default)]
pub struct RecordingHost {
    pub clicks_blocked: bool,
    pub updates: Vec<CalendarEntry>,
    pub cues: Vec<(String, VisualCue)>,
}

impl RecordingHost {
    pub fn saw(&self, cue: &VisualCue) -> bool {
        self.cues.iter().any(|(_, c)| c == cue)
    }
}

impl GestureHost for RecordingHost {
    fn set_clicks_blocked(&mut self, blocked: bool) {
        self.clicks_blocked = blocked;
    }

    fn on_update(&mut self, entry: CalendarEntry) {
        self.updates.push(entry);
    }

    fn apply_visual(&mut self, entry_id: &str, cue: VisualCue) {
        self.cues.push((entry_id.to_string(), cue));
    }
}
