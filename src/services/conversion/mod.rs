//! Pixel/time conversions for gestures on the time grid.
//!
//! Pure functions: slot lookup from accumulated pointer deltas, vertical
//! pixel delta to minutes under the drag and resize policies, and snapping
//! of absolute instants to a fixed minute boundary.

use chrono::{Duration, NaiveDateTime, Timelike};
use egui::{Pos2, Vec2};

use crate::models::geometry::{GeometryDescriptor, SlotRef};
use crate::utils::date::{parse_instant, truncate_to_minute};

/// Which gesture a minutes conversion is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapContext {
    Drag,
    Resize,
}

/// Round to nearest, with .5 going towards positive infinity.
pub fn round_half_up(value: f32) -> i64 {
    (value + 0.5).floor() as i64
}

/// Locate the slot a gesture currently points at.
///
/// `delta.y` must already include any scroll drift since the gesture began.
/// Zero hour and day movement returns the start slot itself so a pointer
/// wobbling inside the original cell never flickers to a neighbour.
pub fn slot_for_delta(delta: Vec2, geometry: &GeometryDescriptor) -> Option<&SlotRef> {
    let hour_delta = if geometry.hour_height > 0.0 {
        round_half_up(delta.y / geometry.hour_height)
    } else {
        0
    };
    let day_delta = if geometry.allows_day_change() {
        round_half_up(delta.x / geometry.day_width)
    } else {
        0
    };

    let start_index = geometry.start_slot?;
    if hour_delta == 0 && day_delta == 0 {
        return geometry.slots.get(start_index);
    }

    let columns = geometry.columns.max(1);
    let rows = geometry.rows();
    if rows == 0 {
        return None;
    }

    let start_row = (start_index / columns) as i64;
    let start_col = (start_index % columns) as i64;
    let row = (start_row + hour_delta).clamp(0, rows as i64 - 1) as usize;
    let col = (start_col + day_delta).clamp(0, columns as i64 - 1) as usize;

    geometry.slots.get(row * columns + col)
}

/// [`slot_for_delta`] from absolute pointer positions.
pub fn slot_at_pointer<'g>(
    pointer: Pos2,
    origin: Pos2,
    scroll_drift: f32,
    geometry: &'g GeometryDescriptor,
) -> Option<&'g SlotRef> {
    let delta = pointer - origin + Vec2::new(0.0, scroll_drift);
    slot_for_delta(delta, geometry)
}

/// Convert a vertical pixel delta into a minutes delta.
///
/// * snap enabled: `round(dy / snap_pixels) * snap`, any context
/// * snap disabled, resize: whole grid hours, `round(dy / hour_height) * 60`
/// * snap disabled, drag: unquantized minutes; the drag controller splits
///   the delta itself with [`decompose_free_delta`] and reconciles the
///   minute part against custom slots
pub fn snapped_minutes_delta(
    delta_y: f32,
    hour_height: f32,
    snap_minutes: u32,
    context: SnapContext,
) -> i64 {
    if hour_height <= 0.0 {
        return 0;
    }

    if snap_minutes > 0 {
        let snap_pixels = snap_minutes as f32 * (hour_height / 60.0);
        return round_half_up(delta_y / snap_pixels) * i64::from(snap_minutes);
    }

    match context {
        SnapContext::Resize => round_half_up(delta_y / hour_height) * 60,
        SnapContext::Drag => round_half_up(delta_y / hour_height * 60.0),
    }
}

/// Split a free-mode vertical delta into whole hours (floored) and the
/// remaining minutes.
pub fn decompose_free_delta(delta_y: f32, hour_height: f32) -> (i64, i64) {
    if hour_height <= 0.0 {
        return (0, 0);
    }
    let hours = (delta_y / hour_height).floor();
    let remainder = delta_y - hours * hour_height;
    (hours as i64, round_half_up(remainder / hour_height * 60.0))
}

/// Round an instant's minutes to the nearest multiple of `snap_minutes`
/// (ties up), dropping seconds. Non-positive snap values return the input.
pub fn snap_instant(value: NaiveDateTime, snap_minutes: i64) -> NaiveDateTime {
    if snap_minutes <= 0 {
        return value;
    }

    let base = truncate_to_minute(value);
    let minute = i64::from(base.minute());
    let snapped = round_half_up(minute as f32 / snap_minutes as f32) * snap_minutes;

    base.checked_add_signed(Duration::minutes(snapped - minute))
        .unwrap_or(value)
}

/// [`snap_instant`] over ISO strings. Unparsable input comes back unchanged.
pub fn snap_iso(value: &str, snap_minutes: Option<i64>) -> String {
    let Some(snap) = snap_minutes.filter(|s| *s > 0) else {
        return value.to_string();
    };
    match parse_instant(value) {
        Some(instant) => instant
            .with_local(snap_instant(instant.local, snap))
            .to_iso(),
        None => value.to_string(),
    }
}
