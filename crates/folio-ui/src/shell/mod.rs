use egui::{Context, TopBottomPanel};
use std::time::{Duration, Instant};

use crate::theme::Theme;
use crate::ErrorMessage;

/// How long an error banner stays up
const ERROR_TTL: Duration = Duration::from_secs(10);

/// Pages of the site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Experience timeline
    Resume,
    /// Receipt validation stepper
    ReceiptDemo,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Resume, Page::ReceiptDemo];

    pub fn title(self) -> &'static str {
        match self {
            Page::Resume => "Experience",
            Page::ReceiptDemo => "Receipt Validation",
        }
    }
}

/// Shell configuration
pub struct ShellConfig {
    pub site_title: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            site_title: "Portfolio".to_string(),
        }
    }
}

/// Render the top bar. Returns true when the theme toggle was clicked.
pub fn top_bar(ctx: &Context, config: &ShellConfig, page: &mut Page, theme: &Theme) -> bool {
    let mut toggled = false;

    TopBottomPanel::top("top_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.heading(&config.site_title);
            ui.separator();

            for candidate in Page::ALL {
                if ui.selectable_label(*page == candidate, candidate.title()).clicked() {
                    *page = candidate;
                }
            }

            // Right-aligned theme toggle
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let hover = if theme.dark_mode { "Switch to light theme" } else { "Switch to dark theme" };
                if ui.button(theme.toggle_icon()).on_hover_text(hover).clicked() {
                    toggled = true;
                }
            });
        });
    });

    toggled
}

/// Show error messages, dropping expired ones
pub fn show_error_messages(ui: &mut egui::Ui, messages: &mut Vec<ErrorMessage>, now: Instant) {
    messages.retain(|msg| now.saturating_duration_since(msg.timestamp) < ERROR_TTL);

    for msg in messages.iter() {
        egui::Frame::none()
            .fill(crate::theme::error_color().linear_multiply(0.2))
            .stroke(egui::Stroke::new(1.0, crate::theme::error_color()))
            .rounding(4.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("⚠").color(crate::theme::error_color()));
                    ui.label(&msg.title);
                    ui.separator();
                    ui.label(&msg.message);
                });
            });
    }
}
