use egui::{Context, Visuals, Style, Color32, Rounding, Stroke, FontId, FontFamily, TextStyle};
use std::collections::BTreeMap;

/// Theme configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub dark_mode: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "Folio Dark".to_string(),
            dark_mode: true,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Folio Light".to_string(),
            dark_mode: false,
        }
    }

    pub fn from_dark_mode(dark_mode: bool) -> Self {
        if dark_mode { Self::dark() } else { Self::light() }
    }

    /// Icon shown on the toggle: the theme you would switch to
    pub fn toggle_icon(&self) -> &'static str {
        if self.dark_mode { "☀" } else { "🌙" }
    }
}

struct Palette {
    bg: Color32,
    panel_bg: Color32,
    widget_bg: Color32,
    hover: Color32,
    active: Color32,
    border: Color32,
    text: Color32,
}

impl Palette {
    fn for_theme(theme: &Theme) -> Self {
        if theme.dark_mode {
            Self {
                bg: Color32::from_rgb(23, 23, 23),
                panel_bg: Color32::from_rgb(31, 31, 31),
                widget_bg: Color32::from_rgb(40, 40, 40),
                hover: Color32::from_rgb(50, 50, 50),
                active: Color32::from_rgb(60, 60, 60),
                border: Color32::from_rgb(70, 70, 70),
                text: Color32::from_rgb(220, 220, 220),
            }
        } else {
            Self {
                bg: Color32::from_rgb(250, 250, 248),
                panel_bg: Color32::from_rgb(242, 242, 240),
                widget_bg: Color32::from_rgb(230, 230, 228),
                hover: Color32::from_rgb(218, 218, 216),
                active: Color32::from_rgb(205, 205, 203),
                border: Color32::from_rgb(190, 190, 188),
                text: Color32::from_rgb(30, 30, 30),
            }
        }
    }
}

/// Apply the site theme
pub fn apply_theme(ctx: &Context, theme: &Theme) {
    let mut style = Style::default();
    let mut visuals = if theme.dark_mode { Visuals::dark() } else { Visuals::light() };
    let palette = Palette::for_theme(theme);
    let accent = accent_color();

    // Window and panel styling
    visuals.window_fill = palette.panel_bg;
    visuals.panel_fill = palette.panel_bg;
    visuals.extreme_bg_color = palette.bg;
    visuals.faint_bg_color = palette.widget_bg;

    // Widget styling
    for (widget, fill) in [
        (&mut visuals.widgets.noninteractive, palette.widget_bg),
        (&mut visuals.widgets.inactive, palette.widget_bg),
        (&mut visuals.widgets.hovered, palette.hover),
    ] {
        widget.bg_fill = fill;
        widget.bg_stroke = Stroke::new(1.0, palette.border);
        widget.fg_stroke = Stroke::new(1.0, palette.text);
        widget.rounding = Rounding::same(4.0);
    }

    visuals.widgets.active.bg_fill = palette.active;
    visuals.widgets.active.bg_stroke = Stroke::new(1.0, accent);
    visuals.widgets.active.fg_stroke = Stroke::new(1.0, palette.text);
    visuals.widgets.active.rounding = Rounding::same(4.0);

    // Selection and highlighting
    visuals.selection.bg_fill = accent.linear_multiply(0.3);
    visuals.selection.stroke = Stroke::new(1.0, accent);
    visuals.hyperlink_color = accent;

    // Apply spacing
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 5.0);

    // Font sizes
    let mut font_sizes = BTreeMap::new();
    font_sizes.insert(TextStyle::Small, FontId::new(11.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Body, FontId::new(14.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Button, FontId::new(14.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Heading, FontId::new(22.0, FontFamily::Proportional));
    font_sizes.insert(TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace));
    style.text_styles = font_sizes;

    style.visuals = visuals;
    ctx.set_style(style);
}

/// Get the accent color for the theme
pub fn accent_color() -> Color32 {
    Color32::from_rgb(100, 150, 250)
}

/// Get the error color for the theme
pub fn error_color() -> Color32 {
    Color32::from_rgb(230, 80, 80)
}

/// Fill for slides that are neither active nor previous
pub fn slide_fill(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(38, 38, 42)
    } else {
        Color32::from_rgb(236, 236, 240)
    }
}
