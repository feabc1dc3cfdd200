use anyhow::anyhow;
use eframe::egui;
use sketch_calc::gui::SketchApp;
use sketch_calc::logging;
use sketch_calc::session::{Event, Session};
use sketch_calc::settings::{ApiConfig, Settings};
use sketch_calc::submit::CalculateClient;
use std::sync::Arc;

const SETTINGS_PATH: &str = "settings.json";

fn main() -> anyhow::Result<()> {
    let settings = Settings::load(SETTINGS_PATH)?;
    logging::init(settings.debug_logging, settings.log_file.clone());

    let api = ApiConfig::from_env()?;
    let client = CalculateClient::new(&api, settings.request_timeout())?;
    tracing::info!(endpoint = %client.endpoint(), "sketch_calc starting");

    let (width, height) = settings.window_size.unwrap_or((1280.0, 800.0));
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    let style = settings.surface_style();
    let initial_swatch = settings.initial_swatch();
    eframe::run_native(
        "Sketch Calc",
        native_options,
        Box::new(move |cc| {
            let mut session = Session::new(style, Arc::new(client));
            session.dispatch(Event::SelectColor(initial_swatch));
            Box::new(SketchApp::new(&cc.egui_ctx, session, settings, SETTINGS_PATH))
        }),
    )
    .map_err(|err| anyhow!("window event loop failed: {err}"))
}
