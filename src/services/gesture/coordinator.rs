//! Routes pointer input to the drag or resize controller.
//!
//! A pointer-down picks exactly one controller from the affordance it lands
//! on; while that gesture runs, further pointer-downs are ignored.

use std::time::Instant;

use crate::models::entry::CalendarEntry;
use crate::models::geometry::ElementHandle;
use crate::models::settings::EngineSettings;
use crate::services::drag::DragController;
use crate::services::grid::GeometryProvider;
use crate::services::resize::ResizeController;

use super::{
    Affordance, GestureHost, GestureOutcome, GesturePhase, HandleRects, ListenerRegistry,
    PointerInput,
};

pub struct EntryGestures {
    drag: DragController,
    resize: ResizeController,
}

impl EntryGestures {
    pub fn new(settings: EngineSettings, listeners: ListenerRegistry) -> Self {
        Self {
            drag: DragController::new(settings.clone(), listeners.clone()),
            resize: ResizeController::new(settings, listeners),
        }
    }

    pub fn set_settings(&mut self, settings: EngineSettings) {
        self.drag.set_settings(settings.clone());
        self.resize.set_settings(settings);
    }

    pub fn is_active(&self) -> bool {
        !(self.drag.is_idle() && self.resize.is_idle())
    }

    /// Entry currently being dragged or resized.
    pub fn active_entry(&self) -> Option<&str> {
        self.drag.entry_id().or_else(|| self.resize.entry_id())
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn resize(&self) -> &ResizeController {
        &self.resize
    }

    /// Arm the controller matching the affordance under the pointer.
    /// Returns which one was armed.
    pub fn pointer_down(
        &mut self,
        element: &ElementHandle,
        entry: &CalendarEntry,
        input: PointerInput,
        provider: &dyn GeometryProvider,
        host: &mut dyn GestureHost,
    ) -> Option<Affordance> {
        if self.is_active() {
            return None;
        }

        let affordance = HandleRects::for_timed_entry(element.rect).hit_test(input.pos)?;
        let armed = match affordance {
            Affordance::ResizeHandle => {
                let armed = self.resize.arm(element, entry, input, provider, host);
                if armed {
                    self.drag.cancel_click_release();
                }
                armed
            }
            Affordance::Body => self.drag.arm(element, entry, input, provider),
        };
        armed.then_some(affordance)
    }

    pub fn pointer_move(&mut self, input: PointerInput, host: &mut dyn GestureHost) {
        if !self.drag.is_idle() {
            self.drag.pointer_move(input, host);
            if self.drag.phase() == GesturePhase::Active {
                self.resize.cancel_click_release();
            }
        } else if !self.resize.is_idle() {
            self.resize.pointer_move(input, host);
        }
    }

    pub fn pointer_up(&mut self, input: PointerInput, host: &mut dyn GestureHost) -> GestureOutcome {
        if !self.drag.is_idle() {
            self.drag.pointer_up(input, host)
        } else if !self.resize.is_idle() {
            self.resize.pointer_up(input, host)
        } else {
            GestureOutcome::Ignored
        }
    }

    pub fn poll(&mut self, now: Instant, host: &mut dyn GestureHost) {
        self.drag.poll(now, host);
        self.resize.poll(now, host);
    }

    /// Earliest pending deferred action, for scheduling a repaint.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.drag.next_deadline(), self.resize.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Whether a click at `now` must be swallowed as part of a drop.
    pub fn take_click(&mut self, now: Instant) -> bool {
        self.drag.take_click(now)
    }

    pub fn teardown(&mut self, host: &mut dyn GestureHost) {
        self.drag.teardown(host);
        self.resize.teardown(host);
    }
}
