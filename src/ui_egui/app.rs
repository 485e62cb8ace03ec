use std::time::Instant;

use chrono::{Datelike, Duration, Local, NaiveDate};
use egui::{Pos2, Sense, Vec2};

use super::surface::{RenderedGrid, TIME_LABEL_WIDTH};
use super::time_grid::{paint_drop_hint, paint_entries, paint_grid, GridVisuals};
use crate::models::entry::CalendarEntry;
use crate::models::geometry::ContainerRole;
use crate::models::settings::EngineSettings;
use crate::services::conversion::snap_instant;
use crate::services::gesture::{
    EntryGestures, GestureHost, GestureOutcome, ListenerRegistry, PointerInput, VisualCue,
};
use crate::services::grid::GridInfoResolver;
use crate::services::settings::SettingsService;
use crate::utils::date::EntryInstant;

const SNAP_CHOICES: [u32; 6] = [0, 5, 10, 15, 30, 60];
/// Snap used for quick-created entries when snapping is off
const QUICK_CREATE_SNAP: i64 = 15;
const QUICK_CREATE_MINUTES: i64 = 60;

/// Receives gesture callbacks for the demo grid.
#[derive(Debug, Default)]
pub struct AppHost {
    pub clicks_blocked: bool,
    pub visuals: GridVisuals,
    pending: Vec<CalendarEntry>,
}

impl AppHost {
    /// Committed entries not yet merged into the model.
    pub fn take_updates(&mut self) -> Vec<CalendarEntry> {
        std::mem::take(&mut self.pending)
    }
}

impl GestureHost for AppHost {
    fn set_clicks_blocked(&mut self, blocked: bool) {
        self.clicks_blocked = blocked;
    }

    fn on_update(&mut self, entry: CalendarEntry) {
        log::info!("Entry {} moved to {} - {}", entry.id, entry.start, entry.end);
        self.pending.push(entry);
    }

    fn apply_visual(&mut self, entry_id: &str, cue: VisualCue) {
        self.visuals.apply(entry_id, cue);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GridMode {
    Week,
    Day,
}

pub struct CalendarApp {
    entries: Vec<CalendarEntry>,
    settings: EngineSettings,
    settings_service: Option<SettingsService>,
    listeners: ListenerRegistry,
    gestures: EntryGestures,
    host: AppHost,
    mode: GridMode,
    current_date: NaiveDate,
    selected: Option<String>,
    scroll_y: f32,
    next_id: u64,
    status: Option<String>,
}

impl CalendarApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings_service = match SettingsService::from_default_location() {
            Ok(service) => Some(service),
            Err(e) => {
                log::warn!("Settings will not be persisted: {:#}", e);
                None
            }
        };
        let settings = settings_service
            .as_ref()
            .map(SettingsService::load_or_default)
            .unwrap_or_default();

        Self::with_settings(settings, settings_service, Local::now().date_naive())
    }

    fn with_settings(
        settings: EngineSettings,
        settings_service: Option<SettingsService>,
        today: NaiveDate,
    ) -> Self {
        let listeners = ListenerRegistry::new();
        let gestures = EntryGestures::new(settings.clone(), listeners.clone());
        let entries = sample_entries(today);
        let next_id = entries.len() as u64 + 1;

        Self {
            entries,
            settings,
            settings_service,
            listeners,
            gestures,
            host: AppHost::default(),
            mode: GridMode::Week,
            current_date: today,
            selected: None,
            scroll_y: 0.0,
            next_id,
            status: None,
        }
    }

    fn visible_dates(&self) -> Vec<NaiveDate> {
        match self.mode {
            GridMode::Day => vec![self.current_date],
            GridMode::Week => {
                let offset = self.current_date.weekday().num_days_from_sunday() as i64;
                let start = self.current_date - Duration::days(offset);
                (0..7).map(|d| start + Duration::days(d)).collect()
            }
        }
    }

    fn apply_settings(&mut self) {
        self.gestures.set_settings(self.settings.clone());
    }

    fn merge_updates(&mut self) {
        for updated in self.host.take_updates() {
            if let Some(entry) = self.entries.iter_mut().find(|e| e.id == updated.id) {
                *entry = updated;
            }
        }
    }

    fn show_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let step = match self.mode {
                GridMode::Week => 7,
                GridMode::Day => 1,
            };
            if ui.button("◀").clicked() {
                self.current_date -= Duration::days(step);
            }
            if ui.button("Today").clicked() {
                self.current_date = Local::now().date_naive();
            }
            if ui.button("▶").clicked() {
                self.current_date += Duration::days(step);
            }
            ui.label(self.current_date.format("%B %Y").to_string());

            ui.separator();
            ui.selectable_value(&mut self.mode, GridMode::Week, "Week");
            ui.selectable_value(&mut self.mode, GridMode::Day, "Day");

            ui.separator();
            let before = self.settings.clone();
            egui::ComboBox::from_label("Snap")
                .selected_text(snap_label(self.settings.snap_minutes))
                .show_ui(ui, |ui| {
                    for choice in SNAP_CHOICES {
                        ui.selectable_value(
                            &mut self.settings.snap_minutes,
                            choice,
                            snap_label(choice),
                        );
                    }
                });
            ui.add(
                egui::DragValue::new(&mut self.settings.max_simultaneous_events)
                    .range(1..=20)
                    .prefix("Max per slot: "),
            );
            if self.settings != before {
                self.apply_settings();
            }

            if let Some(service) = &self.settings_service {
                if ui.button("Save settings").clicked() {
                    self.status = Some(match service.save(&self.settings) {
                        Ok(()) => format!("Saved to {}", service.path().display()),
                        Err(e) => {
                            log::error!("Failed to save settings: {:#}", e);
                            format!("Save failed: {}", e)
                        }
                    });
                }
            }
            if let Some(status) = &self.status {
                ui.weak(status);
            }
        });
    }

    fn show_grid(&mut self, ui: &mut egui::Ui) {
        let dates = self.visible_dates();
        let role = match self.mode {
            GridMode::Week => ContainerRole::WeekGrid,
            GridMode::Day => ContainerRole::DayView,
        };
        let column_width =
            ((ui.available_width() - TIME_LABEL_WIDTH) / dates.len() as f32).max(40.0);
        let origin = ui.cursor().min;
        let grid = RenderedGrid::layout(
            origin,
            role,
            &dates,
            column_width,
            self.settings.hour_height,
            &self.entries,
        );
        let response = ui.allocate_rect(grid.container, Sense::click_and_drag());

        self.handle_pointer(ui.ctx(), &grid, &response);

        let painter = ui.painter_at(grid.container);
        paint_grid(&painter, &grid, ui.visuals());
        paint_drop_hint(&painter, &self.host.visuals);
        paint_entries(
            &painter,
            &grid,
            &self.entries,
            &self.host.visuals,
            self.selected.as_deref(),
        );
    }

    fn handle_pointer(&mut self, ctx: &egui::Context, grid: &RenderedGrid, response: &egui::Response) {
        let now = Instant::now();
        let (pressed, released, pos) = ctx.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.interact_pos().or(i.pointer.latest_pos()),
            )
        });
        let Some(pos) = pos else {
            return;
        };
        let input = PointerInput::new(pos, now).with_scroll(self.scroll_y);

        if pressed && response.hovered() {
            self.press(grid, input);
        } else if released {
            match self.gestures.pointer_up(input, &mut self.host) {
                GestureOutcome::Committed(entry) => self.selected = Some(entry.id),
                GestureOutcome::Aborted(reason) => log::debug!("Gesture aborted: {:?}", reason),
                GestureOutcome::Unchanged | GestureOutcome::Ignored => {}
            }
        } else if self.gestures.is_active() {
            self.gestures.pointer_move(input, &mut self.host);
        }
        self.merge_updates();

        if response.double_clicked() && grid.entry_at(pos).is_none() {
            self.quick_create(grid, pos);
        } else if response.clicked() {
            self.click(grid, pos, now);
        }
    }

    fn press(&mut self, grid: &RenderedGrid, input: PointerInput) {
        let Some(element) = grid.entry_at(input.pos).cloned() else {
            return;
        };
        let Some(entry) = self.entries.iter().find(|e| e.id == element.entry_id).cloned() else {
            return;
        };
        let resolver = GridInfoResolver::new(grid);
        if let Some(affordance) =
            self.gestures
                .pointer_down(&element, &entry, input, &resolver, &mut self.host)
        {
            log::debug!("Armed {:?} on {}", affordance, entry.id);
        }
    }

    fn click(&mut self, grid: &RenderedGrid, pos: Pos2, now: Instant) {
        if self.host.clicks_blocked || self.gestures.take_click(now) {
            return;
        }
        self.selected = grid.entry_at(pos).map(|element| element.entry_id.clone());
    }

    fn quick_create(&mut self, grid: &RenderedGrid, pos: Pos2) {
        let Some(time) = grid.time_at(pos) else {
            return;
        };
        let snap = self
            .settings
            .snap()
            .map(i64::from)
            .unwrap_or(QUICK_CREATE_SNAP);
        let start = snap_instant(time, snap);
        let end = start + Duration::minutes(QUICK_CREATE_MINUTES);

        let id = format!("entry-{}", self.next_id);
        self.next_id += 1;
        let entry = CalendarEntry::new(
            id.clone(),
            EntryInstant::naive(start).to_iso(),
            EntryInstant::naive(end).to_iso(),
        )
        .with_field("title", "New event");
        log::info!("Created {} at {}", id, entry.start);
        self.entries.push(entry);
        self.selected = Some(id);
    }
}

impl eframe::App for CalendarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.gestures.poll(Instant::now(), &mut self.host);
        self.merge_updates();

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) && self.gestures.is_active() {
            self.gestures.teardown(&mut self.host);
            self.host.visuals.clear();
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.show_toolbar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.spacing_mut().item_spacing = Vec2::ZERO;
            let output = egui::ScrollArea::vertical()
                .id_source("time_grid")
                .auto_shrink([false, false])
                .show(ui, |ui| self.show_grid(ui));
            self.scroll_y = output.state.offset.y;
        });

        if let Some(deadline) = self.gestures.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.gestures.teardown(&mut self.host);
        log::debug!("Gesture listeners left at exit: {}", self.listeners.active_count());
    }
}

fn snap_label(minutes: u32) -> String {
    if minutes == 0 {
        "Off".to_string()
    } else {
        format!("{} min", minutes)
    }
}

fn sample_entries(today: NaiveDate) -> Vec<CalendarEntry> {
    let at = |day: i64, hour: u32, minute: u32| {
        let date = today + Duration::days(day);
        date.and_hms_opt(hour, minute, 0)
            .map(|t| EntryInstant::naive(t).to_iso())
            .unwrap_or_default()
    };
    vec![
        CalendarEntry::new("entry-1", at(0, 9, 0), at(0, 10, 0))
            .with_field("title", "Standup")
            .with_field("color", "#4682B4"),
        CalendarEntry::new("entry-2", at(0, 13, 0), at(0, 14, 30))
            .with_field("title", "Design review")
            .with_field("color", "#8E44AD"),
        CalendarEntry::new("entry-3", at(1, 11, 15), at(1, 12, 0))
            .with_field("title", "Lunch")
            .with_field("color", "#27AE60"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> CalendarApp {
        let today = NaiveDate::from_ymd_opt(2023, 1, 18).unwrap();
        CalendarApp::with_settings(EngineSettings::default(), None, today)
    }

    #[test]
    fn test_week_dates_start_on_sunday() {
        let app = app();
        let dates = app.visible_dates();
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2023, 1, 15).unwrap());
    }

    #[test]
    fn test_host_updates_are_merged() {
        let mut app = app();
        let moved = app.entries[0].clone().with_span(
            &EntryInstant::naive(
                NaiveDate::from_ymd_opt(2023, 1, 18)
                    .unwrap()
                    .and_hms_opt(15, 0, 0)
                    .unwrap(),
            ),
            &EntryInstant::naive(
                NaiveDate::from_ymd_opt(2023, 1, 18)
                    .unwrap()
                    .and_hms_opt(16, 0, 0)
                    .unwrap(),
            ),
        );
        app.host.on_update(moved.clone());
        app.merge_updates();

        assert_eq!(app.entries[0], moved);
        assert!(app.host.take_updates().is_empty());
    }

    #[test]
    fn test_sample_entries_are_valid() {
        let app = app();
        assert!(app.entries.iter().all(|e| e.span().is_ok()));
        assert_eq!(app.next_id, 4);
    }
}
