//! User interface components for the portfolio site
//!
//! This crate provides the egui-based carousel panel, the site shell
//! and theming.

pub mod carousel_panel;
pub mod shell;
pub mod theme;
pub mod widget_utils;

use std::time::Instant;

/// Re-export commonly used types
pub use carousel_panel::{CarouselPanel, CarouselPanelConfig, PanelStyle, SlideMirror};
pub use shell::{Page, ShellConfig};
pub use theme::{apply_theme, Theme};
pub use widget_utils::WidgetId;

// Re-export commonly used functions
pub use shell::{show_error_messages, top_bar};

/// Error message to display
pub struct ErrorMessage {
    pub title: String,
    pub message: String,
    pub timestamp: Instant,
}

impl ErrorMessage {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            timestamp: Instant::now(),
        }
    }
}

// Common icon definitions
pub mod icons {
    pub const PLAY: &str = "▶ Play";
    pub const PAUSE: &str = "⏸";
    pub const PREVIOUS: &str = "◀";
    pub const NEXT: &str = "▶";
    pub const RETURN_TO_START: &str = "⏮";
    pub const EXPAND: &str = "+";
    pub const COLLAPSE: &str = "−";
    pub const SCREEN_BACK: &str = "← Back";
    pub const SCREEN_NEXT: &str = "Next →";
    pub const SCREEN_SUBMIT: &str = "Submit";
}
