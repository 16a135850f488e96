//! Panel components for the frontend UI
//!
//! - [`LogPanel`] - Raw received lines, including those that were not plotted

use super::ansi;
use crate::session::RawLog;
use egui::{Color32, RichText, Ui};

/// Renders the raw line log
pub struct LogPanel;

impl LogPanel {
    /// Render the log, newest line at the bottom
    pub fn render(ui: &mut Ui, log: &RawLog) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Received lines").strong());
            ui.label(
                RichText::new(format!("({}/{})", log.len(), log.capacity()))
                    .small()
                    .color(Color32::GRAY),
            );
        });
        ui.separator();

        if log.is_empty() {
            ui.label(RichText::new("Nothing received yet").italics().color(Color32::GRAY));
            return;
        }

        let font_id = egui::TextStyle::Monospace.resolve(ui.style());
        let row_height = ui.text_style_height(&egui::TextStyle::Monospace);
        let default_color = ui.visuals().text_color();
        let strong_color = ui.visuals().strong_text_color();

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show_rows(ui, row_height, log.len(), |ui, rows| {
                for entry in log.rows(rows) {
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(entry.received_at.format("%H:%M:%S%.3f").to_string())
                                .monospace()
                                .small()
                                .color(Color32::GRAY),
                        );
                        ui.label(ansi::layout_job(
                            &entry.text,
                            font_id.clone(),
                            default_color,
                            strong_color,
                        ));
                    });
                }
            });
    }
}
