//! Drag controller: moves an entry to a new day and time.
//!
//! `Idle -> Armed` on pointer-down on the entry body, `Armed -> Active` once
//! the pointer travels past [`DRAG_THRESHOLD`], `Active -> Settling -> Idle`
//! on release. Only the final release position is ever committed; every
//! intermediate move is preview only.

use std::time::Instant;

use chrono::Duration;

use crate::error::{EngineError, EngineResult};
use crate::models::entry::{CalendarEntry, EntrySpan};
use crate::models::geometry::{ElementHandle, GeometryDescriptor, SlotRef};
use crate::models::settings::EngineSettings;
use crate::services::conversion::{
    decompose_free_delta, round_half_up, slot_for_delta, snapped_minutes_delta, SnapContext,
};
use crate::services::gesture::{
    AbortReason, ClickSuppressor, DeferredAction, DeferredActions, GestureDelta, GestureHost,
    GestureOutcome, GesturePhase, ListenerRegistry, PointerInput, Subscription, VisualCue,
    CLICK_RELEASE_DELAY, CLICK_SUPPRESS_WINDOW, DRAG_THRESHOLD, RECENTLY_DRAGGED_WINDOW,
};
use crate::services::grid::GeometryProvider;
use crate::utils::date::{at_hour_minute, EntryInstant};

/// State captured at arm time.
struct DragSession {
    entry: CalendarEntry,
    span: EntrySpan,
    geometry: GeometryDescriptor,
    origin: PointerInput,
    _listeners: Subscription,
}

/// A drag past the movement threshold.
struct ActiveDrag {
    session: DragSession,
    delta: GestureDelta,
    candidate: Option<SlotRef>,
    would_exceed_limit: bool,
}

enum DragState {
    Idle,
    Armed(DragSession),
    Active(ActiveDrag),
    Settling,
}

pub struct DragController {
    settings: EngineSettings,
    listeners: ListenerRegistry,
    state: DragState,
    deferred: DeferredActions,
    click_suppressor: ClickSuppressor,
}

impl DragController {
    pub fn new(settings: EngineSettings, listeners: ListenerRegistry) -> Self {
        Self {
            settings,
            listeners,
            state: DragState::Idle,
            deferred: DeferredActions::new(),
            click_suppressor: ClickSuppressor::default(),
        }
    }

    pub fn set_settings(&mut self, settings: EngineSettings) {
        self.settings = settings;
    }

    pub fn phase(&self) -> GesturePhase {
        match self.state {
            DragState::Idle => GesturePhase::Idle,
            DragState::Armed(_) => GesturePhase::Armed,
            DragState::Active(_) => GesturePhase::Active,
            DragState::Settling => GesturePhase::Settling,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, DragState::Idle)
    }

    /// Entry id of the gesture in progress, if any.
    pub fn entry_id(&self) -> Option<&str> {
        match &self.state {
            DragState::Armed(session) => Some(&session.entry.id),
            DragState::Active(active) => Some(&active.session.entry.id),
            _ => None,
        }
    }

    /// Whether the current drag would be rejected by the slot capacity.
    pub fn would_exceed_limit(&self) -> bool {
        matches!(&self.state, DragState::Active(active) if active.would_exceed_limit)
    }

    /// Start a session for a pointer-down on the entry body.
    ///
    /// Declines (returns `false`) when a gesture is already running or the
    /// entry's instants cannot be parsed; nothing is registered then.
    pub fn arm(
        &mut self,
        element: &ElementHandle,
        entry: &CalendarEntry,
        input: PointerInput,
        provider: &dyn GeometryProvider,
    ) -> bool {
        if !self.is_idle() {
            log::debug!("Drag for {} ignored, a gesture is already running", entry.id);
            return false;
        }

        let span = match entry.span() {
            Ok(span) => span,
            Err(err) => {
                log::warn!("Not dragging entry {}: {}", entry.id, err);
                return false;
            }
        };

        let geometry = provider.describe(element, self.settings.hour_height, span.start.local);
        self.state = DragState::Armed(DragSession {
            entry: entry.clone(),
            span,
            geometry,
            origin: input,
            _listeners: self.listeners.subscribe(&entry.id),
        });
        log::debug!("Drag armed for entry {}", entry.id);
        true
    }

    pub fn pointer_move(&mut self, input: PointerInput, host: &mut dyn GestureHost) {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        self.state = match state {
            DragState::Armed(session) => {
                let delta = GestureDelta::between(&session.origin, &input);
                if delta.dx.abs() > DRAG_THRESHOLD || delta.dy.abs() > DRAG_THRESHOLD {
                    log::debug!("Drag started for entry {}", session.entry.id);
                    host.set_clicks_blocked(true);
                    host.apply_visual(&session.entry.id, VisualCue::Dragging(true));
                    let mut active = ActiveDrag {
                        session,
                        delta,
                        candidate: None,
                        would_exceed_limit: false,
                    };
                    self.track(&mut active, delta, host);
                    DragState::Active(active)
                } else {
                    DragState::Armed(session)
                }
            }
            DragState::Active(mut active) => {
                let delta = GestureDelta::between(&active.session.origin, &input);
                self.track(&mut active, delta, host);
                DragState::Active(active)
            }
            other => other,
        };
    }

    /// Live preview: translate the entry and flag the candidate slot.
    fn track(&self, active: &mut ActiveDrag, delta: GestureDelta, host: &mut dyn GestureHost) {
        active.delta = delta;
        active.candidate = slot_for_delta(delta.as_vec2(), &active.session.geometry).cloned();
        active.would_exceed_limit = active.candidate.as_ref().is_some_and(|slot| {
            slot.occupancy_excluding(&active.session.entry.id)
                >= self.settings.max_simultaneous_events
        });

        let id = &active.session.entry.id;
        host.apply_visual(id, VisualCue::Translate(delta.as_vec2()));
        host.apply_visual(
            id,
            VisualCue::CandidateSlot {
                slot: active.candidate.clone(),
                over_limit: active.would_exceed_limit,
            },
        );
    }

    /// Release the pointer: commit the move or abort.
    pub fn pointer_up(&mut self, input: PointerInput, host: &mut dyn GestureHost) -> GestureOutcome {
        let state = std::mem::replace(&mut self.state, DragState::Settling);
        let outcome = match state {
            DragState::Idle | DragState::Settling => GestureOutcome::Ignored,
            DragState::Armed(session) => {
                // A click: the entry never moved and clicks were never blocked
                host.apply_visual(&session.entry.id, VisualCue::Reset);
                GestureOutcome::Aborted(AbortReason::NoMovement)
            }
            DragState::Active(mut active) => {
                let delta = GestureDelta::between(&active.session.origin, &input);
                self.track(&mut active, delta, host);
                self.settle(active, input.at, host)
            }
        };
        // Dropping the session above released its listeners
        self.state = DragState::Idle;
        outcome
    }

    fn settle(&mut self, active: ActiveDrag, now: Instant, host: &mut dyn GestureHost) -> GestureOutcome {
        let id = active.session.entry.id.clone();

        if active.would_exceed_limit {
            log::info!("Drop of entry {} rejected, target slot is full", id);
            self.finish(&id, now, host);
            return GestureOutcome::Aborted(AbortReason::CapacityExceeded);
        }

        let proposed = match self.compute_drop(&active) {
            Ok(proposed) => proposed,
            Err(err) => {
                log::warn!("Failed to compute drop for entry {}: {}", id, err);
                self.finish(&id, now, host);
                return GestureOutcome::Aborted(AbortReason::CommitFailed);
            }
        };

        let Some((start, end)) = proposed else {
            log::debug!("Drag of entry {} resolved to its current schedule", id);
            self.finish(&id, now, host);
            return GestureOutcome::Unchanged;
        };

        let updated = active.session.entry.with_span(&start, &end);
        log::info!("Moved entry {} to {} .. {}", id, updated.start, updated.end);
        self.finish(&id, now, host);
        host.on_update(updated.clone());

        host.apply_visual(&id, VisualCue::RecentlyDragged(true));
        self.deferred.schedule(
            now,
            RECENTLY_DRAGGED_WINDOW,
            DeferredAction::ClearRecentlyDragged { entry_id: id },
        );
        self.click_suppressor.arm(now, CLICK_SUPPRESS_WINDOW);

        GestureOutcome::Committed(updated)
    }

    /// Shared tail of every settle path of a promoted drag, which blocked clicks.
    fn finish(&mut self, entry_id: &str, now: Instant, host: &mut dyn GestureHost) {
        host.apply_visual(entry_id, VisualCue::Reset);
        self.deferred
            .schedule(now, CLICK_RELEASE_DELAY, DeferredAction::ReleaseClickBlock);
    }

    /// New `(start, end)` for the final delta, or `None` when unchanged.
    fn compute_drop(&self, active: &ActiveDrag) -> EngineResult<Option<(EntryInstant, EntryInstant)>> {
        let geometry = &active.session.geometry;
        let span = &active.session.span;
        let delta = active.delta;

        let day_delta = if geometry.allows_day_change() {
            round_half_up(delta.dx / geometry.day_width)
        } else {
            0
        };

        let moved = match self.settings.snap() {
            None => {
                let (hour_delta, minute_delta) =
                    decompose_free_delta(delta.dy, geometry.hour_height);
                let minutes = i64::from(geometry.start_minute) + minute_delta;
                let hour = (i64::from(geometry.start_hour) + hour_delta + minutes.div_euclid(60))
                    .clamp(0, 23) as u32;
                let minute = self
                    .settings
                    .custom_slots
                    .nearest_minute(hour, minutes.rem_euclid(60) as u32);
                at_hour_minute(geometry.start_day, hour, minute)
                    .ok_or(EngineError::Overflow("drop time"))?
            }
            Some(snap) => {
                let minutes = snapped_minutes_delta(
                    delta.dy,
                    geometry.hour_height,
                    snap,
                    SnapContext::Drag,
                );
                span.start
                    .local
                    .checked_add_signed(Duration::minutes(minutes))
                    .ok_or(EngineError::Overflow("drop time"))?
            }
        };

        let new_start = moved
            .checked_add_signed(Duration::days(day_delta))
            .ok_or(EngineError::Overflow("drop day"))?;
        let new_end = new_start
            .checked_add_signed(span.duration())
            .ok_or(EngineError::Overflow("drop end"))?;

        if new_start == span.start.local && new_end == span.end.local {
            return Ok(None);
        }

        Ok(Some((
            span.start.with_local(new_start),
            span.end.with_local(new_end),
        )))
    }

    /// Run deferred follow-ups that are due.
    pub fn poll(&mut self, now: Instant, host: &mut dyn GestureHost) {
        for action in self.deferred.drain_due(now) {
            apply_deferred(action, host);
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deferred.next_deadline()
    }

    /// Drop a pending click release: another gesture now holds the block.
    pub fn cancel_click_release(&mut self) {
        self.deferred
            .cancel_where(|action| matches!(action, DeferredAction::ReleaseClickBlock));
    }

    /// Whether a click at `now` is the one synthesized by the last drop.
    pub fn take_click(&mut self, now: Instant) -> bool {
        self.click_suppressor.take(now)
    }

    /// Host is going away: drop any session and release every flag now.
    pub fn teardown(&mut self, host: &mut dyn GestureHost) {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        match &state {
            DragState::Armed(session) => {
                log::debug!("Armed drag for entry {} torn down", session.entry.id);
                host.apply_visual(&session.entry.id, VisualCue::Reset);
            }
            DragState::Active(active) => {
                log::debug!("Drag for entry {} torn down", active.session.entry.id);
                host.apply_visual(&active.session.entry.id, VisualCue::Reset);
                host.set_clicks_blocked(false);
            }
            DragState::Idle | DragState::Settling => {}
        }
        drop(state);

        for action in self.deferred.drain_all() {
            apply_deferred(action, host);
        }
        self.click_suppressor.clear();
    }
}

fn apply_deferred(action: DeferredAction, host: &mut dyn GestureHost) {
    match action {
        DeferredAction::ReleaseClickBlock => host.set_clicks_blocked(false),
        DeferredAction::ClearRecentlyDragged { entry_id } => {
            host.apply_visual(&entry_id, VisualCue::RecentlyDragged(false))
        }
        DeferredAction::PromoteResize { .. } => {}
    }
}
