//! Per-frame record of the painted time grid.
//!
//! The grid is laid out first (pure geometry, no painting), then painted and
//! queried. Laying out separately keeps the record usable as a
//! [`GridSurface`] in headless tests.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use egui::{Pos2, Rect, Vec2};

use crate::error::SurfaceError;
use crate::models::entry::CalendarEntry;
use crate::models::geometry::{ContainerRole, ElementHandle, SlotRef};
use crate::services::grid::{DayHeader, GridSurface};
use crate::utils::date::{at_hour_minute, minute_of_day};

pub const TIME_LABEL_WIDTH: f32 = 50.0;
pub const HEADER_HEIGHT: f32 = 24.0;
pub const COLUMN_PADDING: f32 = 4.0;
const HOURS: usize = 24;

/// A laid-out entry block.
#[derive(Clone, Debug, PartialEq)]
pub struct EntryBlock {
    pub element: ElementHandle,
    pub date: NaiveDate,
}

#[derive(Clone, Debug)]
pub struct RenderedGrid {
    pub role: ContainerRole,
    /// Whole grid area, headers and time labels included
    pub container: Rect,
    /// Header cells with their rects, week view only
    pub headers: Vec<(DayHeader, Rect)>,
    pub slots: Vec<SlotRef>,
    pub entries: Vec<EntryBlock>,
    pub dates: Vec<NaiveDate>,
    pub hour_height: f32,
    pub column_width: f32,
    grid_origin: Pos2,
}

impl RenderedGrid {
    /// Lay out `dates` as day columns starting at `origin`.
    pub fn layout(
        origin: Pos2,
        role: ContainerRole,
        dates: &[NaiveDate],
        column_width: f32,
        hour_height: f32,
        entries: &[CalendarEntry],
    ) -> Self {
        let header_height = match role {
            ContainerRole::WeekGrid => HEADER_HEIGHT,
            ContainerRole::DayView => 0.0,
        };
        let grid_origin = origin + Vec2::new(TIME_LABEL_WIDTH, header_height);
        let container = Rect::from_min_size(
            origin,
            Vec2::new(
                TIME_LABEL_WIDTH + column_width * dates.len() as f32,
                header_height + hour_height * HOURS as f32,
            ),
        );

        let headers = match role {
            ContainerRole::WeekGrid => dates
                .iter()
                .enumerate()
                .map(|(col, date)| {
                    let rect = Rect::from_min_size(
                        Pos2::new(grid_origin.x + col as f32 * column_width, origin.y),
                        Vec2::new(column_width, header_height),
                    );
                    let header = DayHeader {
                        label: date.format("%a, %b %-d").to_string(),
                        width: rect.width(),
                    };
                    (header, rect)
                })
                .collect(),
            ContainerRole::DayView => Vec::new(),
        };

        let spans: Vec<(&str, NaiveDateTime, NaiveDateTime)> = entries
            .iter()
            .filter_map(|entry| {
                let span = entry.span().ok()?;
                Some((entry.id.as_str(), span.start.local, span.end.local))
            })
            .collect();

        let mut slots = Vec::with_capacity(HOURS * dates.len());
        for row in 0..HOURS {
            for (col, date) in dates.iter().enumerate() {
                let start_minute = row as u32 * 60;
                let occupants = at_hour_minute(*date, row as u32, 0)
                    .map(|slot_start| {
                        let slot_end = slot_start + Duration::hours(1);
                        spans
                            .iter()
                            .filter(|(_, start, end)| *start < slot_end && *end > slot_start)
                            .map(|(id, _, _)| id.to_string())
                            .collect()
                    })
                    .unwrap_or_default();

                slots.push(SlotRef {
                    row,
                    col,
                    rect: Rect::from_min_size(
                        grid_origin
                            + Vec2::new(col as f32 * column_width, row as f32 * hour_height),
                        Vec2::new(column_width, hour_height),
                    ),
                    occupants,
                    start_minute,
                    date: Some(*date),
                });
            }
        }

        let blocks = entries
            .iter()
            .filter_map(|entry| {
                let span = entry.span().ok()?;
                let date = span.start.date();
                let col = dates.iter().position(|d| *d == date)?;
                let top = minute_of_day(span.start.local) as f32 / 60.0 * hour_height;
                let end_of_day = (HOURS as f32) * hour_height;
                let minutes = span.duration().num_minutes() as f32;
                let height = (minutes / 60.0 * hour_height)
                    .max(hour_height / 4.0)
                    .min(end_of_day - top);
                let rect = Rect::from_min_size(
                    grid_origin
                        + Vec2::new(col as f32 * column_width + COLUMN_PADDING, top),
                    Vec2::new(column_width - 2.0 * COLUMN_PADDING, height),
                );
                Some(EntryBlock {
                    element: ElementHandle::new(entry.id.clone(), rect),
                    date,
                })
            })
            .collect();

        Self {
            role,
            container,
            headers,
            slots,
            entries: blocks,
            dates: dates.to_vec(),
            hour_height,
            column_width,
            grid_origin,
        }
    }

    /// Topmost entry block under `pos`.
    pub fn entry_at(&self, pos: Pos2) -> Option<&ElementHandle> {
        self.entries
            .iter()
            .rev()
            .map(|block| &block.element)
            .find(|element| element.rect.contains(pos))
    }

    /// Wall-clock time under `pos`, if it is inside a day column.
    pub fn time_at(&self, pos: Pos2) -> Option<NaiveDateTime> {
        let local = pos - self.grid_origin;
        if local.x < 0.0 || local.y < 0.0 || self.column_width <= 0.0 {
            return None;
        }
        let col = (local.x / self.column_width) as usize;
        let date = *self.dates.get(col)?;
        let minutes = (local.y / self.hour_height * 60.0) as i64;
        if minutes >= (HOURS * 60) as i64 {
            return None;
        }
        at_hour_minute(date, 0, 0).map(|midnight| midnight + Duration::minutes(minutes))
    }
}

impl GridSurface for RenderedGrid {
    fn container_role(&self, element: &ElementHandle) -> Result<ContainerRole, SurfaceError> {
        if self.container.contains(element.rect.center()) {
            Ok(self.role)
        } else {
            Err(SurfaceError::MissingContainer(element.entry_id.clone()))
        }
    }

    fn container_width(&self, role: ContainerRole) -> Result<f32, SurfaceError> {
        if role != self.role {
            return Err(SurfaceError::Query(format!("no {:?} container rendered", role)));
        }
        Ok(self.container.width() - TIME_LABEL_WIDTH)
    }

    fn day_headers(&self) -> Result<Vec<DayHeader>, SurfaceError> {
        Ok(self.headers.iter().map(|(header, _)| header.clone()).collect())
    }

    fn slots(&self, role: ContainerRole) -> Result<Vec<SlotRef>, SurfaceError> {
        if role != self.role {
            return Err(SurfaceError::Query(format!("no {:?} container rendered", role)));
        }
        Ok(self.slots.clone())
    }
}
