//! Status bar panel with connection state and line counters.

use egui::{Color32, RichText, Ui};

use crate::types::{ConnectionStatus, LinkStats};

/// Context needed to render the status bar.
pub struct StatusBarContext<'a> {
    pub status: ConnectionStatus,
    pub source: &'a str,
    pub stats: &'a LinkStats,
    pub trace_count: usize,
    pub total_samples: usize,
    pub last_error: Option<&'a str>,
}

/// Indicator color and label for a connection status
pub fn status_indicator(status: ConnectionStatus) -> (Color32, &'static str) {
    match status {
        ConnectionStatus::Connected => (Color32::GREEN, "Connected"),
        ConnectionStatus::Connecting => (Color32::YELLOW, "Connecting"),
        ConnectionStatus::Disconnected => (Color32::GRAY, "Disconnected"),
        ConnectionStatus::Error => (Color32::RED, "Error"),
    }
}

/// Lines received but never plotted
pub fn dropped_lines(stats: &LinkStats) -> u64 {
    stats.unusable_lines + stats.shape_mismatches + stats.overlong_lines
}

/// Render the status bar.
pub fn render_status_bar(ui: &mut Ui, ctx: &StatusBarContext<'_>) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        // === Connection status dot + source ===
        let (status_color, status_text) = status_indicator(ctx.status);
        ui.colored_label(status_color, "●");
        let source_display = if ctx.status == ConnectionStatus::Connected {
            format!("{}: {}", status_text, ctx.source)
        } else {
            status_text.to_string()
        };
        ui.label(RichText::new(source_display).small());

        ui.separator();

        let stats = ctx.stats;

        // === Lines ===
        ui.label(RichText::new(format!("Lines: {}", stats.lines_received)).small());

        ui.separator();

        // === Traces and samples ===
        ui.label(
            RichText::new(format!(
                "Traces: {}  Samples: {}",
                ctx.trace_count, ctx.total_samples
            ))
            .small(),
        );

        ui.separator();

        // === Dropped lines ===
        let dropped = dropped_lines(stats);
        let dropped_color = if dropped > 0 {
            Color32::LIGHT_RED
        } else {
            Color32::GRAY
        };
        ui.colored_label(
            dropped_color,
            RichText::new(format!("Dropped: {}", dropped)).small(),
        )
        .on_hover_text(format!(
            "Unusable: {}\nShape mismatches: {}\nOverlong: {}\nDecode replacements: {}\nRead errors: {}",
            stats.unusable_lines,
            stats.shape_mismatches,
            stats.overlong_lines,
            stats.decode_replacements,
            stats.read_errors
        ));

        ui.separator();

        // === Data transferred ===
        let kb = stats.bytes_read as f64 / 1024.0;
        let data_text = if kb > 1024.0 {
            format!("Data: {:.2} MB", kb / 1024.0)
        } else {
            format!("Data: {:.2} KB", kb)
        };
        ui.label(RichText::new(data_text).small());

        // === Error message (right-aligned) ===
        if let Some(error) = ctx.last_error {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.colored_label(Color32::RED, RichText::new(error).small());
            });
        }
    });
}
