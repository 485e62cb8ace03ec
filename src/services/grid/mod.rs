//! Grid info resolution.
//!
//! Turns the live rendered calendar surface into a [`GeometryDescriptor`]
//! once per gesture. The surface is reached only through [`GridSurface`], so
//! controllers can be driven headlessly from synthetic geometry.

pub mod headers;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::error::SurfaceError;
use crate::models::geometry::{ContainerRole, ElementHandle, GeometryDescriptor, SlotRef};
use crate::utils::date::minute_of_day;

pub use headers::parse_header_date;

/// Fallback column count when a week grid renders no headers.
pub const DAYS_PER_WEEK: usize = 7;

/// A rendered day header: its text and measured width.
#[derive(Clone, Debug, PartialEq)]
pub struct DayHeader {
    pub label: String,
    pub width: f32,
}

/// Read-only queries against the rendering layer.
#[cfg_attr(test, mockall::automock)]
pub trait GridSurface {
    /// Which grid container the element sits in.
    fn container_role(&self, element: &ElementHandle) -> Result<ContainerRole, SurfaceError>;

    fn container_width(&self, role: ContainerRole) -> Result<f32, SurfaceError>;

    /// Header row of the week grid, left to right.
    fn day_headers(&self) -> Result<Vec<DayHeader>, SurfaceError>;

    /// Slot cells of the container, row-major.
    fn slots(&self, role: ContainerRole) -> Result<Vec<SlotRef>, SurfaceError>;
}

impl<S: GridSurface + ?Sized> GridSurface for &S {
    fn container_role(&self, element: &ElementHandle) -> Result<ContainerRole, SurfaceError> {
        (**self).container_role(element)
    }

    fn container_width(&self, role: ContainerRole) -> Result<f32, SurfaceError> {
        (**self).container_width(role)
    }

    fn day_headers(&self) -> Result<Vec<DayHeader>, SurfaceError> {
        (**self).day_headers()
    }

    fn slots(&self, role: ContainerRole) -> Result<Vec<SlotRef>, SurfaceError> {
        (**self).slots(role)
    }
}

/// Produces the per-gesture geometry snapshot.
#[cfg_attr(test, mockall::automock)]
pub trait GeometryProvider {
    fn describe(
        &self,
        element: &ElementHandle,
        hour_height: f32,
        entry_start: NaiveDateTime,
    ) -> GeometryDescriptor;
}

/// [`GeometryProvider`] backed by a live [`GridSurface`].
pub struct GridInfoResolver<S> {
    surface: S,
}

impl<S: GridSurface> GridInfoResolver<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn try_describe(
        &self,
        element: &ElementHandle,
        hour_height: f32,
        entry_start: NaiveDateTime,
    ) -> Result<GeometryDescriptor, SurfaceError> {
        let role = self.surface.container_role(element)?;
        let slots = self.surface.slots(role)?;
        let entry_day = entry_start.date();

        let (in_week_view, day_width, columns, entry_col) = match role {
            ContainerRole::WeekGrid => {
                // Headers are optional: without them the container width decides
                let headers = self.surface.day_headers().unwrap_or_else(|err| {
                    log::debug!("Day headers unavailable ({}), using container width", err);
                    Vec::new()
                });
                if headers.is_empty() {
                    let width = self.surface.container_width(role)?;
                    (true, width / DAYS_PER_WEEK as f32, DAYS_PER_WEEK, None)
                } else {
                    let dates = headers
                        .iter()
                        .map(|h| parse_header_date(&h.label, entry_day))
                        .collect::<Result<Vec<NaiveDate>, _>>()?;
                    let total: f32 = headers.iter().map(|h| h.width).sum();
                    let width = total / headers.len() as f32;
                    let col = dates.iter().position(|d| *d == entry_day);
                    (true, width, headers.len(), col)
                }
            }
            ContainerRole::DayView => (false, 0.0, 1, Some(0)),
        };

        let start_slot = hosting_slot(&slots, element)
            .or_else(|| slot_by_time(&slots, entry_col, entry_day, entry_start));

        Ok(GeometryDescriptor {
            hour_height,
            day_width,
            in_week_view,
            columns,
            slots,
            start_slot,
            start_day: entry_day,
            start_hour: entry_start.hour(),
            start_minute: entry_start.minute(),
        })
    }
}

impl<S: GridSurface> GeometryProvider for GridInfoResolver<S> {
    fn describe(
        &self,
        element: &ElementHandle,
        hour_height: f32,
        entry_start: NaiveDateTime,
    ) -> GeometryDescriptor {
        match self.try_describe(element, hour_height, entry_start) {
            Ok(geometry) => geometry,
            Err(err) => {
                log::warn!(
                    "Grid geometry unavailable for entry {}, degrading: {}",
                    element.entry_id,
                    err
                );
                GeometryDescriptor::degraded(hour_height, entry_start)
            }
        }
    }
}

/// Slot whose rect contains the top edge of the element.
fn hosting_slot(slots: &[SlotRef], element: &ElementHandle) -> Option<usize> {
    let anchor = element.anchor_point();
    slots.iter().position(|slot| slot.rect.contains(anchor))
}

/// Latest slot in the entry's column starting at or before the entry.
fn slot_by_time(
    slots: &[SlotRef],
    column: Option<usize>,
    day: NaiveDate,
    start: NaiveDateTime,
) -> Option<usize> {
    let minute = minute_of_day(start);
    slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| match (slot.date, column) {
            (Some(date), _) => date == day,
            (None, Some(col)) => slot.col == col,
            (None, None) => false,
        })
        .filter(|(_, slot)| slot.start_minute <= minute)
        .max_by_key(|(_, slot)| slot.start_minute)
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Pos2, Rect, Vec2};
    use pretty_assertions::assert_eq;

    const HOUR: f32 = 60.0;
    const COL: f32 = 100.0;

    fn ymd_hm(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn grid_slots(columns: usize, first_day: u32) -> Vec<SlotRef> {
        let mut slots = Vec::new();
        for row in 0..24 {
            for col in 0..columns {
                slots.push(SlotRef {
                    row,
                    col,
                    rect: Rect::from_min_size(
                        Pos2::new(col as f32 * COL, row as f32 * HOUR),
                        Vec2::new(COL, HOUR),
                    ),
                    occupants: Vec::new(),
                    start_minute: row as u32 * 60,
                    date: NaiveDate::from_ymd_opt(2023, 1, first_day + col as u32),
                });
            }
        }
        slots
    }

    fn headers() -> Vec<DayHeader> {
        (15..22)
            .map(|d| DayHeader {
                label: ymd_hm(d, 0, 0).format("%a, %b %-d").to_string(),
                width: 98.0 + (d % 2) as f32 * 4.0,
            })
            .collect()
    }

    fn element_at(col: usize, hour: f32) -> ElementHandle {
        ElementHandle::new(
            "e1",
            Rect::from_min_size(
                Pos2::new(col as f32 * COL + 4.0, hour * HOUR),
                Vec2::new(COL - 8.0, HOUR * 2.0),
            ),
        )
    }

    #[test]
    fn test_week_view_descriptor() {
        let mut surface = MockGridSurface::new();
        surface
            .expect_container_role()
            .returning(|_| Ok(ContainerRole::WeekGrid));
        surface.expect_slots().returning(|_| Ok(grid_slots(7, 15)));
        surface.expect_day_headers().returning(|| Ok(headers()));
        surface.expect_container_width().never();

        let resolver = GridInfoResolver::new(surface);
        let geometry = resolver.describe(&element_at(2, 10.0), HOUR, ymd_hm(17, 10, 0));

        assert!(geometry.in_week_view);
        assert_eq!(geometry.columns, 7);
        // widths alternate 98/102 starting at 102 for odd days: 4 x 102 + 3 x 98
        assert_eq!(geometry.day_width, (4.0 * 102.0 + 3.0 * 98.0) / 7.0);
        let start = geometry.start_slot_ref().unwrap();
        assert_eq!((start.row, start.col), (10, 2));
        assert_eq!(geometry.start_day, NaiveDate::from_ymd_opt(2023, 1, 17).unwrap());
    }

    #[test]
    fn test_missing_headers_fall_back_to_container_width() {
        let mut surface = MockGridSurface::new();
        surface
            .expect_container_role()
            .returning(|_| Ok(ContainerRole::WeekGrid));
        surface.expect_slots().returning(|_| Ok(grid_slots(7, 15)));
        surface.expect_day_headers().returning(|| Ok(Vec::new()));
        surface.expect_container_width().returning(|_| Ok(700.0));

        let geometry =
            GridInfoResolver::new(surface).describe(&element_at(0, 9.0), HOUR, ymd_hm(15, 9, 0));
        assert_eq!(geometry.day_width, 100.0);
        assert_eq!(geometry.columns, DAYS_PER_WEEK);
    }

    #[test]
    fn test_header_query_failure_falls_back_to_container_width() {
        let mut surface = MockGridSurface::new();
        surface
            .expect_container_role()
            .returning(|_| Ok(ContainerRole::WeekGrid));
        surface.expect_slots().returning(|_| Ok(grid_slots(7, 15)));
        surface
            .expect_day_headers()
            .returning(|| Err(SurfaceError::Query("headers not rendered".to_string())));
        surface.expect_container_width().times(1).returning(|_| Ok(700.0));

        let geometry =
            GridInfoResolver::new(surface).describe(&element_at(0, 9.0), HOUR, ymd_hm(15, 9, 0));
        assert!(geometry.in_week_view);
        assert_eq!(geometry.day_width, 100.0);
        assert_eq!(geometry.columns, DAYS_PER_WEEK);
        assert_eq!(geometry.slots.len(), 7 * 24);
    }

    #[test]
    fn test_day_view_has_no_width() {
        let mut surface = MockGridSurface::new();
        surface
            .expect_container_role()
            .returning(|_| Ok(ContainerRole::DayView));
        surface.expect_slots().returning(|_| Ok(grid_slots(1, 15)));
        surface.expect_day_headers().never();

        let geometry =
            GridInfoResolver::new(surface).describe(&element_at(0, 8.0), HOUR, ymd_hm(15, 8, 0));
        assert!(!geometry.in_week_view);
        assert_eq!(geometry.day_width, 0.0);
        assert_eq!(geometry.columns, 1);
        assert_eq!(geometry.start_slot, Some(8));
    }

    #[test]
    fn test_start_slot_by_time_when_element_offscreen() {
        let mut surface = MockGridSurface::new();
        surface
            .expect_container_role()
            .returning(|_| Ok(ContainerRole::WeekGrid));
        surface.expect_slots().returning(|_| Ok(grid_slots(7, 15)));
        surface.expect_day_headers().returning(|| Ok(headers()));

        let offscreen = ElementHandle::new(
            "e1",
            Rect::from_min_size(Pos2::new(-500.0, -500.0), Vec2::new(10.0, 10.0)),
        );
        let geometry = GridInfoResolver::new(surface).describe(&offscreen, HOUR, ymd_hm(19, 14, 30));
        let start = geometry.start_slot_ref().unwrap();
        assert_eq!((start.row, start.col), (14, 4));
    }

    #[test]
    fn test_missing_container_degrades() {
        let mut surface = MockGridSurface::new();
        surface
            .expect_container_role()
            .returning(|e| Err(SurfaceError::MissingContainer(e.entry_id.clone())));
        surface.expect_slots().never();

        let geometry =
            GridInfoResolver::new(surface).describe(&element_at(0, 8.0), 48.0, ymd_hm(15, 8, 45));
        assert_eq!(geometry, GeometryDescriptor::degraded(48.0, ymd_hm(15, 8, 45)));
    }

    #[test]
    fn test_malformed_header_degrades() {
        let mut surface = MockGridSurface::new();
        surface
            .expect_container_role()
            .returning(|_| Ok(ContainerRole::WeekGrid));
        surface.expect_slots().returning(|_| Ok(grid_slots(7, 15)));
        surface.expect_day_headers().returning(|| {
            Ok(vec![DayHeader {
                label: "???".to_string(),
                width: 100.0,
            }])
        });

        let geometry =
            GridInfoResolver::new(surface).describe(&element_at(0, 8.0), HOUR, ymd_hm(15, 8, 0));
        assert_eq!(geometry.day_width, 0.0);
        assert!(geometry.slots.is_empty());
        assert!(!geometry.in_week_view);
    }
}
