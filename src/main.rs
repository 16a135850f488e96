//! Serial Plotter - Main Entry Point
//!
//! Plots comma-separated numeric telemetry read from a serial port in real time.

use anyhow::anyhow;
use serialplot_rs::{
    config::{self, AppConfig},
    frontend::SerialPlotApp,
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file name prefix inside the app data directory
const LOG_FILE_PREFIX: &str = "serialplot-rs.log";

/// Set up console logging plus a daily log file when the data directory is usable
///
/// The returned guard must be held until exit so buffered file output is flushed.
fn init_logging() -> Option<WorkerGuard> {
    let (file_layer, guard) = match config::ensure_app_data_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,serialplot_rs=debug")),
        )
        .with(fmt::layer())
        .with(file_layer)
        .init();

    guard
}

fn main() -> anyhow::Result<()> {
    let log_guard = init_logging();
    if log_guard.is_none() {
        tracing::warn!("App data directory unavailable, logging to console only");
    }

    tracing::info!("Starting Serial Plotter");

    let config = AppConfig::load_or_default();
    tracing::debug!(
        "Config: port={:?} baud={} poll={}ms",
        config.serial.port,
        config.serial.baud_rate,
        config.poll_interval_ms
    );

    // Configure eframe options
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([640.0, 400.0])
            .with_title("Serial Plotter"),
        ..Default::default()
    };

    eframe::run_native(
        "Serial Plotter",
        native_options,
        Box::new(|cc| Ok(Box::new(SerialPlotApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("UI error: {}", e))?;

    tracing::info!("Shutting down...");
    Ok(())
}
