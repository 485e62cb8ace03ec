//! Painting for the time grid and the entry blocks on it.
//!
//! Layout lives in [`RenderedGrid`]; this module only draws a laid-out grid
//! plus whatever visual state the gesture controllers have requested.

use std::collections::HashMap;

use egui::{Color32, FontId, Pos2, Rect, Stroke, Vec2};

use super::surface::{RenderedGrid, TIME_LABEL_WIDTH};
use crate::models::entry::CalendarEntry;
use crate::models::geometry::SlotRef;
use crate::services::gesture::{HandleRects, VisualCue};

const DEFAULT_ENTRY_COLOR: Color32 = Color32::from_rgb(70, 130, 180);
const DROP_OK_COLOR: Color32 = Color32::from_rgb(120, 200, 120);
const DROP_REJECTED_COLOR: Color32 = Color32::from_rgb(220, 90, 90);

/// Rendering state of one entry block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntryVisual {
    pub translate: Vec2,
    pub dragging: bool,
    pub recently_dragged: bool,
    pub resize_active: bool,
    pub preview_height: Option<f32>,
}

impl EntryVisual {
    fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

/// Visual state requested by the gesture controllers.
#[derive(Debug, Default)]
pub struct GridVisuals {
    entries: HashMap<String, EntryVisual>,
    drop_hint: Option<(SlotRef, bool)>,
}

impl GridVisuals {
    pub fn apply(&mut self, entry_id: &str, cue: VisualCue) {
        if let VisualCue::CandidateSlot { slot, over_limit } = cue {
            self.drop_hint = slot.map(|slot| (slot, over_limit));
            return;
        }

        let visual = self.entries.entry(entry_id.to_string()).or_default();
        match cue {
            VisualCue::Translate(offset) => visual.translate = offset,
            VisualCue::Dragging(on) => visual.dragging = on,
            VisualCue::RecentlyDragged(on) => visual.recently_dragged = on,
            VisualCue::ResizeActive(on) => visual.resize_active = on,
            VisualCue::PreviewHeight(height) => visual.preview_height = Some(height),
            VisualCue::Reset => {
                // The recently-dragged marker outlives the gesture; its own timer clears it
                *visual = EntryVisual {
                    recently_dragged: visual.recently_dragged,
                    ..EntryVisual::default()
                };
                self.drop_hint = None;
            }
            VisualCue::CandidateSlot { .. } => {}
        }

        if visual.is_neutral() {
            self.entries.remove(entry_id);
        }
    }

    pub fn entry(&self, entry_id: &str) -> Option<&EntryVisual> {
        self.entries.get(entry_id)
    }

    pub fn drop_hint(&self) -> Option<&(SlotRef, bool)> {
        self.drop_hint.as_ref()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.drop_hint = None;
    }
}

/// Parse a hex color string such as `#FF5500`.
pub fn parse_color(hex: &str) -> Option<Color32> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;

    Some(Color32::from_rgb(r, g, b))
}

fn entry_color(entry: &CalendarEntry) -> Color32 {
    entry
        .fields
        .get("color")
        .and_then(|value| value.as_str())
        .and_then(parse_color)
        .unwrap_or(DEFAULT_ENTRY_COLOR)
}

/// Draw grid lines, labels and headers.
pub fn paint_grid(painter: &egui::Painter, grid: &RenderedGrid, visuals: &egui::Visuals) {
    let line = Stroke::new(1.0, visuals.widgets.noninteractive.bg_stroke.color);
    let text = visuals.text_color();

    painter.rect_filled(grid.container, 0.0, visuals.extreme_bg_color);

    for (header, rect) in &grid.headers {
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            &header.label,
            FontId::proportional(13.0),
            text,
        );
    }

    for slot in grid.slots.iter().filter(|slot| slot.col == 0) {
        let y = slot.rect.top();
        painter.line_segment(
            [
                Pos2::new(grid.container.left() + TIME_LABEL_WIDTH, y),
                Pos2::new(grid.container.right(), y),
            ],
            line,
        );
        painter.text(
            Pos2::new(grid.container.left() + TIME_LABEL_WIDTH - 5.0, y + 2.0),
            egui::Align2::RIGHT_TOP,
            format!("{:02}:00", slot.row),
            FontId::proportional(12.0),
            Color32::GRAY,
        );
    }

    for slot in grid.slots.iter().filter(|slot| slot.row == 0) {
        let x = slot.rect.left();
        painter.line_segment(
            [
                Pos2::new(x, grid.container.top()),
                Pos2::new(x, grid.container.bottom()),
            ],
            line,
        );
    }
}

/// Highlight the candidate drop slot, red when the drop would be rejected.
pub fn paint_drop_hint(painter: &egui::Painter, gesture_visuals: &GridVisuals) {
    let Some((slot, over_limit)) = gesture_visuals.drop_hint() else {
        return;
    };
    let color = if *over_limit {
        DROP_REJECTED_COLOR
    } else {
        DROP_OK_COLOR
    };
    painter.rect_filled(slot.rect, 2.0, color.gamma_multiply(0.25));
    painter.rect_stroke(slot.rect, 2.0, Stroke::new(1.5, color));
}

/// Draw every entry block with its gesture styling applied.
pub fn paint_entries(
    painter: &egui::Painter,
    grid: &RenderedGrid,
    entries: &[CalendarEntry],
    gesture_visuals: &GridVisuals,
    selected: Option<&str>,
) {
    for block in &grid.entries {
        let Some(entry) = entries.iter().find(|e| e.id == block.element.entry_id) else {
            continue;
        };
        let visual = gesture_visuals.entry(&entry.id).cloned().unwrap_or_default();

        let mut rect = block.element.rect.translate(visual.translate);
        if let Some(height) = visual.preview_height {
            rect = Rect::from_min_size(rect.min, Vec2::new(rect.width(), height));
        }

        let mut fill = entry_color(entry);
        if visual.dragging {
            fill = fill.gamma_multiply(0.7);
        }
        painter.rect_filled(rect, 3.0, fill);

        let border = if visual.resize_active || visual.recently_dragged {
            Some(Stroke::new(2.0, DROP_OK_COLOR))
        } else if selected == Some(entry.id.as_str()) {
            Some(Stroke::new(2.0, Color32::WHITE))
        } else {
            None
        };
        if let Some(stroke) = border {
            painter.rect_stroke(rect, 3.0, stroke);
        }

        let handle = HandleRects::for_timed_entry(rect).bottom;
        painter.rect_filled(handle.shrink2(Vec2::new(rect.width() / 3.0, 2.0)), 1.0, fill.gamma_multiply(1.4));

        painter.text(
            rect.left_top() + Vec2::new(4.0, 2.0),
            egui::Align2::LEFT_TOP,
            entry.title().unwrap_or("(untitled)"),
            FontId::proportional(12.0),
            Color32::WHITE,
        );
    }
}
