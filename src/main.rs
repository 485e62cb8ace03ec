// Rust Calendar Gestures
// Demo entry point

use rust_calendar_gestures::ui_egui::CalendarApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    log::info!("Starting calendar gesture demo");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Calendar Gestures"),
        ..Default::default()
    };

    eframe::run_native(
        "Calendar Gestures",
        options,
        Box::new(|cc| Ok(Box::new(CalendarApp::new(cc)))),
    )
}
