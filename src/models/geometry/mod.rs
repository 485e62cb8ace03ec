// Geometry module
// Per-gesture snapshot of the rendered time grid

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use egui::{Pos2, Rect};

/// Which rendered surface hosts an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerRole {
    WeekGrid,
    DayView,
}

/// Reference to an entry's live visual element.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementHandle {
    pub entry_id: String,
    pub rect: Rect,
}

impl ElementHandle {
    pub fn new(entry_id: impl Into<String>, rect: Rect) -> Self {
        Self {
            entry_id: entry_id.into(),
            rect,
        }
    }

    /// Point just inside the top edge, used to find the hosting slot.
    pub fn anchor_point(&self) -> Pos2 {
        Pos2::new(self.rect.center().x, self.rect.top() + 1.0)
    }
}

/// One rendered slot cell.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotRef {
    pub row: usize,
    pub col: usize,
    pub rect: Rect,
    /// Ids of the entries currently rendered in this slot
    pub occupants: Vec<String>,
    /// Minutes since midnight at which the slot starts
    pub start_minute: u32,
    pub date: Option<NaiveDate>,
}

impl SlotRef {
    pub fn occupancy(&self) -> usize {
        self.occupants.len()
    }

    /// Occupancy as seen by `entry_id` while it is being moved: the entry
    /// does not compete with itself for room.
    pub fn occupancy_excluding(&self, entry_id: &str) -> usize {
        self.occupants.iter().filter(|id| *id != entry_id).count()
    }
}

/// Geometry of the grid an entry lives in, captured once at gesture start.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryDescriptor {
    pub hour_height: f32,
    /// Zero in single-day view
    pub day_width: f32,
    pub in_week_view: bool,
    /// Columns per row of `slots` (days in week view, 1 in day view)
    pub columns: usize,
    /// Row-major: hour rows x day columns
    pub slots: Vec<SlotRef>,
    /// Index into `slots` of the slot hosting the entry
    pub start_slot: Option<usize>,
    pub start_day: NaiveDate,
    pub start_hour: u32,
    pub start_minute: u32,
}

impl GeometryDescriptor {
    /// Descriptor used when the live surface cannot be inspected: no
    /// horizontal movement, no slots, anchored at the entry's own start.
    pub fn degraded(hour_height: f32, anchor: NaiveDateTime) -> Self {
        Self {
            hour_height,
            day_width: 0.0,
            in_week_view: false,
            columns: 1,
            slots: Vec::new(),
            start_slot: None,
            start_day: anchor.date(),
            start_hour: anchor.hour(),
            start_minute: anchor.minute(),
        }
    }

    pub fn start_slot_ref(&self) -> Option<&SlotRef> {
        self.start_slot.and_then(|index| self.slots.get(index))
    }

    pub fn rows(&self) -> usize {
        if self.columns == 0 {
            0
        } else {
            self.slots.len().div_ceil(self.columns)
        }
    }

    /// Allows horizontal (cross-day) movement
    pub fn allows_day_change(&self) -> bool {
        self.in_week_view && self.day_width > 0.0
    }
}
