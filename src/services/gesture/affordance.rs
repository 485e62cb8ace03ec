// Entry affordances
//
// Splits an entry's visual element into the drag body and the resize
// handle along its trailing (bottom) edge. The two regions are disjoint,
// which is what keeps drag and resize mutually exclusive per gesture.

use egui::{Pos2, Rect, Vec2};

/// Height of the resize handle hit area
pub const HANDLE_SIZE: f32 = 8.0;

/// Which gesture a pointer-down starts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affordance {
    Body,
    ResizeHandle,
}

/// Hit areas for a timed entry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandleRects {
    pub body: Rect,
    pub bottom: Rect,
}

impl HandleRects {
    pub fn for_timed_entry(entry_rect: Rect) -> Self {
        // Short entries give the handle at most a third of their height so
        // there is always something left to grab for a drag
        let zone_height = HANDLE_SIZE.min(entry_rect.height() / 3.0);

        let bottom = Rect::from_min_size(
            Pos2::new(entry_rect.left(), entry_rect.bottom() - zone_height),
            Vec2::new(entry_rect.width(), zone_height),
        );
        let body = Rect::from_min_max(entry_rect.min, Pos2::new(entry_rect.right(), bottom.top()));

        Self { body, bottom }
    }

    /// Check which region a point hits
    pub fn hit_test(&self, pos: Pos2) -> Option<Affordance> {
        if self.bottom.contains(pos) {
            Some(Affordance::ResizeHandle)
        } else if self.body.contains(pos) {
            Some(Affordance::Body)
        } else {
            None
        }
    }
}
