//! Fixed-delay follow-ups of a gesture.
//!
//! These outlive the gesture itself (the clicks-blocked release fires after
//! settling) and carry no payload beyond which flag to flip. The owning
//! controller drains them from `poll`.

use std::time::{Duration, Instant};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeferredAction {
    ReleaseClickBlock,
    ClearRecentlyDragged { entry_id: String },
    PromoteResize { entry_id: String },
}

#[derive(Debug, Default)]
pub struct DeferredActions {
    pending: Vec<(Instant, DeferredAction)>,
}

impl DeferredActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, action: DeferredAction) {
        self.pending.push((now + delay, action));
    }

    /// Remove and return every action due at `now`, oldest deadline first.
    pub fn drain_due(&mut self, now: Instant) -> Vec<DeferredAction> {
        let mut due: Vec<(Instant, DeferredAction)> = Vec::new();
        self.pending.retain(|(deadline, action)| {
            if *deadline <= now {
                due.push((*deadline, action.clone()));
                false
            } else {
                true
            }
        });
        due.sort_by_key(|(deadline, _)| *deadline);
        due.into_iter().map(|(_, action)| action).collect()
    }

    /// Remove everything, regardless of deadline.
    pub fn drain_all(&mut self) -> Vec<DeferredAction> {
        self.pending.sort_by_key(|(deadline, _)| *deadline);
        self.pending.drain(..).map(|(_, action)| action).collect()
    }

    /// Forget pending actions matching `predicate`.
    pub fn cancel_where(&mut self, predicate: impl Fn(&DeferredAction) -> bool) {
        self.pending.retain(|(_, action)| !predicate(action));
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|(deadline, _)| *deadline).min()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// One-shot click swallow armed after a successful drop.
#[derive(Debug, Default)]
pub struct ClickSuppressor {
    until: Option<Instant>,
}

impl ClickSuppressor {
    pub fn arm(&mut self, now: Instant, window: Duration) {
        self.until = Some(now + window);
    }

    /// Whether a click arriving at `now` must be swallowed. The first call
    /// disarms the suppressor whether or not the window is still open.
    pub fn take(&mut self, now: Instant) -> bool {
        match self.until.take() {
            Some(until) => now <= until,
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.until.is_some()
    }

    pub fn clear(&mut self) {
        self.until = None;
    }
}
