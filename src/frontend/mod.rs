//! Frontend module for egui UI
//!
//! This module renders the plot and forwards user input to the session.
//! Widgets never touch the session directly: they send [`SessionEvent`]s
//! through a crossbeam channel, and the app drains that queue once per
//! frame before polling.
//!
//! # Layout
//!
//! - Top: toolbar (port, baud rate, reset, disconnect, log toggle)
//! - Bottom: status bar
//! - Right (optional): raw line log
//! - Center: plot
//!
//! # Main Types
//!
//! - [`SerialPlotApp`] - Main application state implementing [`eframe::App`]
//! - [`PlotView`] - Plot configuration and rendering

pub mod ansi;
mod panels;
mod plot;
pub mod status_bar;
pub mod toolbar;

pub use panels::LogPanel;
pub use plot::{data_bounds, to_color32, PlotView};
pub use status_bar::{render_status_bar, StatusBarContext};
pub use toolbar::{render_toolbar, ToolbarContext, ToolbarResult};

use crate::backend::available_ports;
use crate::buffer::TraceSnapshot;
use crate::config::AppConfig;
use crate::session::{Session, SessionEvent};
use crossbeam_channel::{Receiver, Sender};
use std::time::{Duration, Instant};

/// Upper bound on poll steps run in a single frame after a stall
const MAX_TICKS_PER_FRAME: u32 = 64;

/// Number of poll ticks due after `elapsed`, capped per frame
pub fn due_ticks(elapsed: Duration, interval: Duration) -> u32 {
    if interval.is_zero() {
        return 1;
    }
    let due = elapsed.as_nanos() / interval.as_nanos();
    due.min(MAX_TICKS_PER_FRAME as u128) as u32
}

/// Main application state for the serial plotter
pub struct SerialPlotApp {
    // === Session ===
    session: Session,

    // === UI event queue ===
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,

    // === Configuration ===
    config: AppConfig,

    // === View state ===
    plot_view: PlotView,
    snapshot: TraceSnapshot,
    available_ports: Vec<String>,
    last_tick: Instant,
}

impl SerialPlotApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let visuals = if config.ui.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        cc.egui_ctx.set_visuals(visuals);

        Self::with_session(Session::new(&config.serial, config.ui.log_capacity), config)
    }

    /// Build the app around an existing session
    pub fn with_session(mut session: Session, config: AppConfig) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();

        session.connect_configured();

        Self {
            session,
            events_tx,
            events_rx,
            plot_view: PlotView::from_config(&config.ui),
            config,
            snapshot: TraceSnapshot::default(),
            available_ports: available_ports(),
            last_tick: Instant::now(),
        }
    }

    /// Apply queued events, then run the poll steps that are due
    pub fn process_events(&mut self) {
        let mut settings_changed = false;
        let mut reset_requested = false;

        while let Ok(event) = self.events_rx.try_recv() {
            match &event {
                SessionEvent::PortChanged(port) => {
                    self.config.serial.port = Some(port.clone());
                    settings_changed = true;
                }
                SessionEvent::BaudRateChanged(baud_rate) => {
                    self.config.serial.baud_rate = *baud_rate;
                    settings_changed = true;
                }
                SessionEvent::ResetDevice => reset_requested = true,
                _ => {}
            }
            self.session.handle_event(event);
        }

        if settings_changed {
            self.save_config();
        }

        // Let the Connecting state reach the screen before the pulse blocks
        if reset_requested {
            self.last_tick = Instant::now();
        }

        let interval = self.config.poll_interval();
        let ticks = due_ticks(self.last_tick.elapsed(), interval);
        if ticks > 0 {
            for _ in 0..ticks {
                self.session.handle_event(SessionEvent::Tick);
            }
            self.last_tick = Instant::now();
        }

        if let Some(snapshot) = self
            .session
            .buffer()
            .snapshot_if_newer(self.snapshot.generation, Some(self.plot_view.max_render_points))
        {
            self.snapshot = snapshot;
        }
    }

    fn send(&self, event: SessionEvent) {
        // The receiver lives in self, so the channel cannot be disconnected
        let _ = self.events_tx.send(event);
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save_default() {
            tracing::warn!("Failed to save config: {}", e);
        }
    }

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        let ctx = ToolbarContext {
            ports: &self.available_ports,
            port: self.session.port(),
            baud_rate: self.session.baud_rate(),
            status: self.session.status(),
            show_log: self.config.ui.show_log,
            follow_latest: self.plot_view.follow_latest,
        };
        let result = render_toolbar(ui, &ctx);

        for event in result.events {
            self.send(event);
        }
        if result.refresh_ports {
            self.available_ports = available_ports();
            tracing::debug!("Found {} ports", self.available_ports.len());
        }
        if result.toggle_log {
            self.config.ui.show_log = !self.config.ui.show_log;
        }
        if result.reset_view {
            self.plot_view.reset_view();
        }
    }

    fn render_status_bar(&self, ui: &mut egui::Ui) {
        let source = self.session.source_description();
        let (trace_count, total_samples) = self
            .session
            .buffer()
            .with(|b| (b.trace_count(), b.total_samples()));

        let ctx = StatusBarContext {
            status: self.session.status(),
            source: &source,
            stats: self.session.stats(),
            trace_count,
            total_samples,
            last_error: self.session.last_error(),
        };
        render_status_bar(ui, &ctx);
    }
}

impl eframe::App for SerialPlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_events();
        ctx.request_repaint_after(self.config.poll_interval());

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.render_status_bar(ui);
        });

        if self.config.ui.show_log {
            egui::SidePanel::right("raw_log")
                .resizable(true)
                .default_width(320.0)
                .show(ctx, |ui| {
                    LogPanel::render(ui, self.session.log());
                });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.snapshot.series.is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("Waiting for data...");
                });
            } else {
                self.plot_view.render(ui, &self.snapshot);
            }
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.session.handle_event(SessionEvent::Disconnect);
        self.save_config();
    }
}
