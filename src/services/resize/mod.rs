//! Resize controller: changes an entry's end time from its bottom handle.
//!
//! Parallel to the drag controller but one-dimensional. Clicks are blocked
//! the moment the handle is pressed; the active styling follows after
//! [`RESIZE_PROMOTE_DELAY`] whether or not the pointer moved, while the
//! [`RESIZE_THRESHOLD`] decides whether anything gets computed at all.

use std::time::Instant;

use chrono::Duration;

use crate::error::{EngineError, EngineResult};
use crate::models::entry::{CalendarEntry, EntrySpan};
use crate::models::geometry::{ElementHandle, GeometryDescriptor};
use crate::models::settings::EngineSettings;
use crate::services::conversion::{snapped_minutes_delta, SnapContext};
use crate::services::gesture::{
    AbortReason, DeferredAction, DeferredActions, GestureDelta, GestureHost, GestureOutcome,
    GesturePhase, ListenerRegistry, PointerInput, Subscription, VisualCue, CLICK_RELEASE_DELAY,
    RESIZE_PROMOTE_DELAY, RESIZE_THRESHOLD,
};
use crate::services::grid::GeometryProvider;
use crate::utils::date::EntryInstant;

struct ResizeSession {
    entry: CalendarEntry,
    span: EntrySpan,
    geometry: GeometryDescriptor,
    origin: PointerInput,
    original_height: f32,
    /// Set once vertical travel exceeds the threshold
    delta: Option<GestureDelta>,
    _listeners: Subscription,
}

enum ResizeState {
    Idle,
    Armed(ResizeSession),
    Active(ResizeSession),
    Settling,
}

pub struct ResizeController {
    settings: EngineSettings,
    listeners: ListenerRegistry,
    state: ResizeState,
    deferred: DeferredActions,
}

impl ResizeController {
    pub fn new(settings: EngineSettings, listeners: ListenerRegistry) -> Self {
        Self {
            settings,
            listeners,
            state: ResizeState::Idle,
            deferred: DeferredActions::new(),
        }
    }

    pub fn set_settings(&mut self, settings: EngineSettings) {
        self.settings = settings;
    }

    pub fn phase(&self) -> GesturePhase {
        match self.state {
            ResizeState::Idle => GesturePhase::Idle,
            ResizeState::Armed(_) => GesturePhase::Armed,
            ResizeState::Active(_) => GesturePhase::Active,
            ResizeState::Settling => GesturePhase::Settling,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ResizeState::Idle)
    }

    pub fn entry_id(&self) -> Option<&str> {
        match &self.state {
            ResizeState::Armed(session) | ResizeState::Active(session) => Some(&session.entry.id),
            _ => None,
        }
    }

    /// Start a session for a pointer-down on the resize handle.
    pub fn arm(
        &mut self,
        element: &ElementHandle,
        entry: &CalendarEntry,
        input: PointerInput,
        provider: &dyn GeometryProvider,
        host: &mut dyn GestureHost,
    ) -> bool {
        if !self.is_idle() {
            log::debug!("Resize for {} ignored, a gesture is already running", entry.id);
            return false;
        }

        let span = match entry.span() {
            Ok(span) => span,
            Err(err) => {
                log::warn!("Not resizing entry {}: {}", entry.id, err);
                return false;
            }
        };

        let geometry = provider.describe(element, self.settings.hour_height, span.start.local);
        self.state = ResizeState::Armed(ResizeSession {
            entry: entry.clone(),
            span,
            geometry,
            origin: input,
            original_height: element.rect.height(),
            delta: None,
            _listeners: self.listeners.subscribe(&entry.id),
        });

        host.set_clicks_blocked(true);
        self.deferred.schedule(
            input.at,
            RESIZE_PROMOTE_DELAY,
            DeferredAction::PromoteResize {
                entry_id: entry.id.clone(),
            },
        );
        log::debug!("Resize armed for entry {}", entry.id);
        true
    }

    pub fn pointer_move(&mut self, input: PointerInput, host: &mut dyn GestureHost) {
        // Promotion is time based; catch up before handling the move
        self.poll(input.at, host);

        if let ResizeState::Armed(session) | ResizeState::Active(session) = &mut self.state {
            track(session, &input, host);
        }
    }

    pub fn pointer_up(&mut self, input: PointerInput, host: &mut dyn GestureHost) -> GestureOutcome {
        let state = std::mem::replace(&mut self.state, ResizeState::Settling);
        let outcome = match state {
            ResizeState::Idle | ResizeState::Settling => GestureOutcome::Ignored,
            ResizeState::Armed(mut session) | ResizeState::Active(mut session) => {
                track(&mut session, &input, host);
                self.settle(session, input.at, host)
            }
        };
        self.state = ResizeState::Idle;
        outcome
    }

    fn settle(
        &mut self,
        session: ResizeSession,
        now: Instant,
        host: &mut dyn GestureHost,
    ) -> GestureOutcome {
        let id = session.entry.id.clone();
        host.apply_visual(&id, VisualCue::Reset);
        self.deferred.cancel_where(
            |action| matches!(action, DeferredAction::PromoteResize { entry_id } if *entry_id == id),
        );
        self.deferred
            .schedule(now, CLICK_RELEASE_DELAY, DeferredAction::ReleaseClickBlock);

        let Some(delta) = session.delta else {
            log::debug!("Resize of entry {} released without movement", id);
            return GestureOutcome::Aborted(AbortReason::NoMovement);
        };

        match self.compute_end(&session, delta) {
            Ok(Some(end)) => {
                let updated = session.entry.with_span(&session.span.start, &end);
                log::info!("Resized entry {} to end at {}", id, updated.end);
                host.on_update(updated.clone());
                GestureOutcome::Committed(updated)
            }
            Ok(None) => GestureOutcome::Unchanged,
            Err(err) => {
                log::warn!("Failed to compute resize for entry {}: {}", id, err);
                GestureOutcome::Aborted(AbortReason::CommitFailed)
            }
        }
    }

    /// New end instant, or `None` when the end does not change.
    ///
    /// The end never lands earlier than one step after the start (the snap
    /// interval, or one hour without snap), capped at the original end so
    /// the floor never lengthens an already short entry.
    fn compute_end(&self, session: &ResizeSession, delta: GestureDelta) -> EngineResult<Option<EntryInstant>> {
        let span = &session.span;
        let minutes = snapped_minutes_delta(
            delta.dy,
            session.geometry.hour_height,
            self.settings.snap_minutes,
            SnapContext::Resize,
        );
        if minutes == 0 {
            return Ok(None);
        }

        let step = self.settings.snap().unwrap_or(60);
        let floor = span
            .start
            .local
            .checked_add_signed(Duration::minutes(i64::from(step)))
            .ok_or(EngineError::Overflow("resize floor"))?
            .min(span.end.local);
        let new_end = span
            .end
            .local
            .checked_add_signed(Duration::minutes(minutes))
            .ok_or(EngineError::Overflow("resize end"))?
            .max(floor);

        if new_end == span.end.local {
            return Ok(None);
        }
        Ok(Some(span.end.with_local(new_end)))
    }

    /// Run deferred follow-ups that are due, including the switch to the
    /// active styling.
    pub fn poll(&mut self, now: Instant, host: &mut dyn GestureHost) {
        for action in self.deferred.drain_due(now) {
            match action {
                DeferredAction::PromoteResize { entry_id } => self.promote(&entry_id, host),
                DeferredAction::ReleaseClickBlock => host.set_clicks_blocked(false),
                DeferredAction::ClearRecentlyDragged { entry_id } => {
                    host.apply_visual(&entry_id, VisualCue::RecentlyDragged(false))
                }
            }
        }
    }

    fn promote(&mut self, entry_id: &str, host: &mut dyn GestureHost) {
        let state = std::mem::replace(&mut self.state, ResizeState::Idle);
        self.state = match state {
            ResizeState::Armed(session) if session.entry.id == entry_id => {
                host.apply_visual(entry_id, VisualCue::ResizeActive(true));
                ResizeState::Active(session)
            }
            other => other,
        };
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deferred.next_deadline()
    }

    /// Drop a pending click release: another gesture now holds the block.
    pub fn cancel_click_release(&mut self) {
        self.deferred
            .cancel_where(|action| matches!(action, DeferredAction::ReleaseClickBlock));
    }

    /// Host is going away: drop any session and release every flag now.
    pub fn teardown(&mut self, host: &mut dyn GestureHost) {
        let state = std::mem::replace(&mut self.state, ResizeState::Idle);
        if let ResizeState::Armed(session) | ResizeState::Active(session) = &state {
            log::debug!("Resize for entry {} torn down", session.entry.id);
            host.apply_visual(&session.entry.id, VisualCue::Reset);
        }
        drop(state);

        // Pending promotion and click release are moot once the host is gone
        self.deferred.drain_all();
        host.set_clicks_blocked(false);
    }
}

/// Record the latest delta and preview the new height.
fn track(session: &mut ResizeSession, input: &PointerInput, host: &mut dyn GestureHost) {
    let delta = GestureDelta::between(&session.origin, input);
    if session.delta.is_none() && delta.dy.abs() <= RESIZE_THRESHOLD {
        return;
    }
    session.delta = Some(delta);

    let min_height = session.geometry.hour_height / 2.0;
    let height = (session.original_height + delta.dy).max(min_height);
    host.apply_visual(&session.entry.id, VisualCue::PreviewHeight(height));
}
