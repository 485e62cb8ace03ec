//! Shared plumbing for drag and resize sessions.
//!
//! Both controllers are single-threaded state machines advanced by pointer
//! input. They talk back to their host (the view that renders the entry)
//! only through [`GestureHost`].

mod affordance;
mod coordinator;
mod deferred;
mod listeners;

use std::time::{Duration, Instant};

use egui::{Pos2, Vec2};

use crate::models::entry::CalendarEntry;
use crate::models::geometry::SlotRef;

pub use affordance::{Affordance, HandleRects, HANDLE_SIZE};
pub use coordinator::EntryGestures;
pub use deferred::{ClickSuppressor, DeferredAction, DeferredActions};
pub use listeners::{ListenerRegistry, Subscription};

/// Movement (px, either axis) that turns a pressed entry into a drag.
pub const DRAG_THRESHOLD: f32 = 5.0;
/// Vertical movement (px) before a resize computes anything.
pub const RESIZE_THRESHOLD: f32 = 3.0;
/// Delay before the clicks-blocked flag is released after a gesture.
pub const CLICK_RELEASE_DELAY: Duration = Duration::from_millis(500);
/// How long a dropped entry keeps its "recently dragged" styling.
pub const RECENTLY_DRAGGED_WINDOW: Duration = Duration::from_millis(1000);
/// Window in which the click synthesized by a drop is swallowed.
pub const CLICK_SUPPRESS_WINDOW: Duration = Duration::from_millis(300);
/// Delay before an armed resize switches to its active styling.
pub const RESIZE_PROMOTE_DELAY: Duration = Duration::from_millis(100);

/// Externally visible phase of a gesture controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    Armed,
    Active,
    Settling,
}

/// Why a gesture ended without a commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    /// Released before crossing the movement threshold
    NoMovement,
    /// Candidate slot already at capacity
    CapacityExceeded,
    /// Computing the new schedule failed
    CommitFailed,
}

/// Result of releasing the pointer.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureOutcome {
    /// No gesture was in progress
    Ignored,
    Aborted(AbortReason),
    /// The gesture resolved to the entry's current schedule
    Unchanged,
    Committed(CalendarEntry),
}

impl GestureOutcome {
    pub fn committed(&self) -> Option<&CalendarEntry> {
        match self {
            GestureOutcome::Committed(entry) => Some(entry),
            _ => None,
        }
    }
}

/// One pointer sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerInput {
    pub pos: Pos2,
    /// Vertical scroll offset of the grid when sampled
    pub scroll_y: f32,
    pub at: Instant,
}

impl PointerInput {
    pub fn new(pos: Pos2, at: Instant) -> Self {
        Self {
            pos,
            scroll_y: 0.0,
            at,
        }
    }

    pub fn with_scroll(mut self, scroll_y: f32) -> Self {
        self.scroll_y = scroll_y;
        self
    }
}

/// Accumulated pointer displacement since arming, in screen pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GestureDelta {
    pub dx: f32,
    pub dy: f32,
}

impl GestureDelta {
    /// Delta between two samples; scrolling the grid counts as vertical
    /// movement relative to the content.
    pub fn between(origin: &PointerInput, current: &PointerInput) -> Self {
        Self {
            dx: current.pos.x - origin.pos.x,
            dy: (current.pos.y - origin.pos.y) + (current.scroll_y - origin.scroll_y),
        }
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.dx, self.dy)
    }
}

/// Visual state changes requested from the host.
#[derive(Clone, Debug, PartialEq)]
pub enum VisualCue {
    /// Translate the dragged entry by the accumulated delta
    Translate(Vec2),
    Dragging(bool),
    /// Candidate drop slot and whether dropping there is rejected
    CandidateSlot {
        slot: Option<SlotRef>,
        over_limit: bool,
    },
    RecentlyDragged(bool),
    ResizeActive(bool),
    /// Live preview height of a resized entry
    PreviewHeight(f32),
    /// Return the entry to its neutral rendering
    Reset,
}

/// The view hosting a gesture.
pub trait GestureHost {
    fn set_clicks_blocked(&mut self, blocked: bool);

    /// Commit a new schedule for the entry. Persisting it is up to the host.
    fn on_update(&mut self, entry: CalendarEntry);

    fn apply_visual(&mut self, entry_id: &str, cue: VisualCue);
}
