// Property-based tests for drag and resize commits
// Random pointer deltas and snap settings against a laid-out week grid

#[path = "../fixtures/mod.rs"]
mod fixtures;

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveDateTime};
use egui::Vec2;
use proptest::prelude::*;

use fixtures::{body_point, element, entries, handle_point, week_grid, Clock, RecordingHost};
use rust_calendar_gestures::models::settings::EngineSettings;
use rust_calendar_gestures::services::conversion::{snap_instant, snapped_minutes_delta, SnapContext};
use rust_calendar_gestures::services::gesture::{EntryGestures, GestureOutcome, ListenerRegistry};
use rust_calendar_gestures::services::grid::GridInfoResolver;
use rust_calendar_gestures::utils::date::parse_instant;
use rust_calendar_gestures::CalendarEntry;

fn run(entry: &CalendarEntry, snap: u32, at_handle: bool, by: Vec2) -> (GestureOutcome, usize) {
    let grid = week_grid(std::slice::from_ref(entry));
    let listeners = ListenerRegistry::new();
    let settings = EngineSettings {
        snap_minutes: snap,
        ..EngineSettings::default()
    };
    let mut gestures = EntryGestures::new(settings, listeners.clone());
    let mut host = RecordingHost::default();
    let mut clock = Clock::new();

    let element = element(&grid, &entry.id).clone();
    let start = if at_handle {
        handle_point(&element)
    } else {
        body_point(&element)
    };
    let resolver = GridInfoResolver::new(&grid);
    let down = clock.at(start);
    gestures.pointer_down(&element, entry, down, &resolver, &mut host);
    let moved = clock.offset(start, by);
    gestures.pointer_move(moved, &mut host);
    let up = clock.offset(start, by);
    let outcome = gestures.pointer_up(up, &mut host);
    (outcome, listeners.active_count())
}

fn local(value: &str) -> NaiveDateTime {
    parse_instant(value).map(|i| i.local).unwrap()
}

fn snap_choice() -> impl Strategy<Value = u32> {
    prop_oneof![Just(0u32), Just(5), Just(10), Just(15), Just(30), Just(60)]
}

proptest! {
    /// Property: a committed drag keeps the entry's duration
    #[test]
    fn prop_drag_preserves_duration(
        dx in 0.0f32..600.0,
        dy in -500.0f32..700.0,
        snap in snap_choice(),
    ) {
        let entry = entries::two_hour_meeting();
        let (outcome, listening) = run(&entry, snap, false, Vec2::new(dx, dy));

        prop_assert_eq!(listening, 0);
        if let Some(moved) = outcome.committed() {
            let duration = local(&moved.end) - local(&moved.start);
            prop_assert_eq!(duration, ChronoDuration::hours(2));
        }
    }

    /// Property: with snap enabled the start moves by whole snap steps
    #[test]
    fn prop_snapped_drag_moves_in_steps(
        dy in -400.0f32..400.0,
        snap in prop_oneof![Just(5u32), Just(10), Just(15), Just(30)],
    ) {
        let entry = entries::two_hour_meeting();
        let (outcome, _) = run(&entry, snap, false, Vec2::new(0.0, dy));

        if let Some(moved) = outcome.committed() {
            let shift = (local(&moved.start) - local(&entry.start)).num_minutes();
            prop_assert_eq!(shift % i64::from(snap), 0);
        }
    }

    /// Property: a resize never moves the start and never ends at or before it
    #[test]
    fn prop_resize_keeps_start(
        dy in -600.0f32..600.0,
        snap in snap_choice(),
    ) {
        let entry = entries::two_hour_meeting();
        let (outcome, listening) = run(&entry, snap, true, Vec2::new(0.0, dy));

        prop_assert_eq!(listening, 0);
        if let Some(resized) = outcome.committed() {
            prop_assert_eq!(local(&resized.start), local(&entry.start));
            prop_assert!(local(&resized.end) > local(&resized.start));
        }
    }

    /// Property: without snap a resize changes the end by whole hours
    #[test]
    fn prop_free_resize_moves_whole_hours(dy in 4.0f32..600.0) {
        let entry = entries::one_hour_call();
        let (outcome, _) = run(&entry, 0, true, Vec2::new(0.0, dy));

        if let Some(resized) = outcome.committed() {
            let change = (local(&resized.end) - local(&entry.end)).num_minutes();
            prop_assert_eq!(change % 60, 0);
        }
    }

    /// Property: snapped deltas are always multiples of the snap value
    #[test]
    fn prop_snapped_delta_is_multiple(
        dy in -2000.0f32..2000.0,
        hour_height in 20.0f32..200.0,
        snap in 1u32..=60,
    ) {
        for context in [SnapContext::Drag, SnapContext::Resize] {
            let minutes = snapped_minutes_delta(dy, hour_height, snap, context);
            prop_assert_eq!(minutes % i64::from(snap), 0);
        }
    }

    /// Property: snapping an already snapped instant changes nothing, for
    /// snap values that divide the hour
    #[test]
    fn prop_snap_instant_is_idempotent(
        minute_of_day in 0u32..1440,
        second in 0u32..60,
        snap in prop::sample::select(vec![1i64, 2, 3, 4, 5, 6, 10, 12, 15, 20, 30, 60]),
    ) {
        let value = NaiveDate::from_ymd_opt(2023, 1, 15)
            .unwrap()
            .and_hms_opt(minute_of_day / 60, minute_of_day % 60, second)
            .unwrap();
        let once = snap_instant(value, snap);
        prop_assert_eq!(snap_instant(once, snap), once);
    }
}
