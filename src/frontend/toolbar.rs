//! Toolbar panel: port, baud rate, and device controls.
//!
//! Selecting an entry in either combo box reconnects immediately; there is
//! no separate Connect button.

use egui::{Color32, RichText, Ui};

use crate::config::BAUD_RATES;
use crate::frontend::status_bar::status_indicator;
use crate::session::SessionEvent;
use crate::types::ConnectionStatus;

/// Context needed to render the toolbar.
pub struct ToolbarContext<'a> {
    pub ports: &'a [String],
    pub port: Option<&'a str>,
    pub baud_rate: u32,
    pub status: ConnectionStatus,
    pub show_log: bool,
    pub follow_latest: bool,
}

/// Result from rendering the toolbar
#[derive(Debug, Default)]
pub struct ToolbarResult {
    pub events: Vec<SessionEvent>,
    pub refresh_ports: bool,
    pub toggle_log: bool,
    pub reset_view: bool,
}

/// Render the main application toolbar.
///
/// Returns the session events and view changes to be applied by the app.
pub fn render_toolbar(ui: &mut Ui, ctx: &ToolbarContext<'_>) -> ToolbarResult {
    let mut result = ToolbarResult::default();

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 4.0;

        // === Connection group ===
        render_connection_group(ui, ctx, &mut result);

        ui.separator();

        // === Device group ===
        render_device_group(ui, ctx, &mut result);

        // === Right-aligned view group ===
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            render_view_group(ui, ctx, &mut result);
        });
    });

    result
}

fn render_connection_group(ui: &mut Ui, ctx: &ToolbarContext<'_>, result: &mut ToolbarResult) {
    let (status_color, status_text) = status_indicator(ctx.status);
    ui.colored_label(status_color, "●").on_hover_text(status_text);

    // Port selector
    let port_text = ctx.port.unwrap_or("Select port...");
    egui::ComboBox::from_id_salt("toolbar_port_selector")
        .selected_text(port_text)
        .width(180.0)
        .show_ui(ui, |ui| {
            if ctx.ports.is_empty() {
                ui.label("No ports found");
            } else {
                for port in ctx.ports {
                    let selected = ctx.port == Some(port.as_str());
                    if ui.selectable_label(selected, port).clicked() {
                        result.events.push(SessionEvent::PortChanged(port.clone()));
                    }
                }
            }
            ui.separator();
            if ui.button("Refresh").clicked() {
                result.refresh_ports = true;
            }
        });

    // Baud rate selector
    egui::ComboBox::from_id_salt("toolbar_baud_selector")
        .selected_text(format!("{} baud", ctx.baud_rate))
        .width(110.0)
        .show_ui(ui, |ui| {
            for &baud in BAUD_RATES {
                if ui
                    .selectable_label(ctx.baud_rate == baud, baud.to_string())
                    .clicked()
                    && baud != ctx.baud_rate
                {
                    result.events.push(SessionEvent::BaudRateChanged(baud));
                }
            }
        });
}

fn render_device_group(ui: &mut Ui, ctx: &ToolbarContext<'_>, result: &mut ToolbarResult) {
    let has_port = ctx.port.is_some();

    if ui
        .add_enabled(has_port, egui::Button::new("Reset Device"))
        .on_hover_text("Pulse DTR/RTS and reopen the port")
        .clicked()
    {
        result.events.push(SessionEvent::ResetDevice);
    }

    if ctx.status == ConnectionStatus::Connected {
        let btn = egui::Button::new(RichText::new("Disconnect").color(Color32::WHITE))
            .fill(Color32::from_rgb(50, 120, 50));
        if ui.add(btn).on_hover_text("Close the serial port").clicked() {
            result.events.push(SessionEvent::Disconnect);
        }
    } else if let Some(port) = ctx.port {
        if ui
            .button("Reconnect")
            .on_hover_text("Open the selected port")
            .clicked()
        {
            result.events.push(SessionEvent::PortChanged(port.to_string()));
        }
    }
}

fn render_view_group(ui: &mut Ui, ctx: &ToolbarContext<'_>, result: &mut ToolbarResult) {
    if ui.selectable_label(ctx.show_log, "Log").clicked() {
        result.toggle_log = true;
    }

    if ui
        .add_enabled(!ctx.follow_latest, egui::Button::new("Follow"))
        .on_hover_text("Fit the view to the data")
        .clicked()
    {
        result.reset_view = true;
    }
}
