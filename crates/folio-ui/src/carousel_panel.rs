//! Carousel panel widget
//! Draws a timeline track or a stepper screen and binds it to a controller

use egui::{Align2, FontId, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use folio_core::{Carousel, CarouselSubscriber, Direction, RenderPass, SlideMetrics};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::icons;
use crate::theme::{accent_color, slide_fill};
use crate::widget_utils::WidgetId;

/// How long a card pulse lasts after a stagger restart
const CARD_PULSE: Duration = Duration::from_millis(300);

/// Track slide transition, in seconds
const TRACK_TRANSITION: f32 = 0.5;

/// Mirrors a controller's render passes for immediate-mode drawing.
///
/// Deferred callbacks may arrive from a runtime thread, so every update
/// asks egui for a repaint.
pub struct SlideMirror {
    pass: RwLock<Option<RenderPass>>,
    card_restarts: RwLock<Vec<Option<Instant>>>,
    ctx: egui::Context,
}

impl SlideMirror {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            pass: RwLock::new(None),
            card_restarts: RwLock::new(Vec::new()),
            ctx,
        }
    }

    /// Latest mirrored render pass
    pub fn pass(&self) -> Option<RenderPass> {
        self.pass.read().clone()
    }

    /// Pulse strength of `card` in `[0, 1]`
    pub fn card_pulse(&self, card: usize, now: Instant) -> f32 {
        let restarts = self.card_restarts.read();
        match restarts.get(card).copied().flatten() {
            Some(at) => {
                let elapsed = now.saturating_duration_since(at);
                1.0 - (elapsed.as_secs_f32() / CARD_PULSE.as_secs_f32()).min(1.0)
            }
            None => 0.0,
        }
    }
}

impl CarouselSubscriber for SlideMirror {
    fn on_render(&self, pass: &RenderPass) {
        *self.pass.write() = Some(pass.clone());
        self.ctx.request_repaint();
    }

    fn on_activate(&self, slot: usize) {
        if let Some(pass) = self.pass.write().as_mut() {
            pass.activate(slot);
        }
        self.ctx.request_repaint();
    }

    fn on_stagger(&self, card: usize) {
        let mut restarts = self.card_restarts.write();
        if restarts.len() <= card {
            restarts.resize(card + 1, None);
        }
        restarts[card] = Some(Instant::now());
        drop(restarts);
        self.ctx.request_repaint();
    }

    fn on_expansion_change(&self, slide: usize, expanded: bool) {
        if let Some(pass) = self.pass.write().as_mut() {
            pass.set_expanded(slide, expanded);
        }
        self.ctx.request_repaint();
    }
}

/// Buttons shown inside a stepper screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenButtons {
    back: bool,
    forward: &'static str,
}

impl ScreenButtons {
    fn for_position(position: usize, slide_count: usize) -> Self {
        Self {
            back: position > 0,
            forward: if position + 1 >= slide_count { icons::SCREEN_SUBMIT } else { icons::SCREEN_NEXT },
        }
    }
}

/// Dots follow the position right away; only the slide waits for activation
fn indicator_selected(pass: &RenderPass, index: usize) -> bool {
    index == pass.position
}

/// How slides are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStyle {
    /// Horizontal track translated by the render pass offset
    Track,
    /// One screen at a time, fading in on activation
    Screens,
}

/// Carousel panel configuration
#[derive(Debug, Clone)]
pub struct CarouselPanelConfig {
    pub style: PanelStyle,

    /// Height of the slide area
    pub height: f32,

    /// Widest a slide may get
    pub max_slide_width: f32,

    /// Show the progress bar
    pub show_progress: bool,

    /// Show one selectable label per slide
    pub show_indicators: bool,

    /// Number of stat cards under the slides
    pub stat_cards: usize,
}

impl Default for CarouselPanelConfig {
    fn default() -> Self {
        Self {
            style: PanelStyle::Track,
            height: 200.0,
            max_slide_width: 340.0,
            show_progress: true,
            show_indicators: true,
            stat_cards: 0,
        }
    }
}

/// Carousel panel widget
pub struct CarouselPanel {
    /// Mirror registered with the controller
    mirror: Arc<SlideMirror>,

    /// Panel configuration
    config: CarouselPanelConfig,

    /// Metrics last handed to the controller
    last_metrics: Option<SlideMetrics>,

    id: WidgetId,
}

impl CarouselPanel {
    /// Create a panel and subscribe it to `carousel`
    pub fn new(ctx: &egui::Context, carousel: &Carousel) -> Self {
        let mirror = Arc::new(SlideMirror::new(ctx.clone()));
        carousel.controller.add_subscriber(mirror.clone());

        Self {
            mirror,
            config: CarouselPanelConfig::default(),
            last_metrics: None,
            id: WidgetId::new("carousel").child(carousel.name()),
        }
    }

    /// Set configuration
    pub fn with_config(mut self, config: CarouselPanelConfig) -> Self {
        self.config = config;
        self
    }

    /// Show the carousel panel UI
    pub fn ui(&mut self, ui: &mut Ui, carousel: &mut Carousel, now: Instant) {
        let Some(pass) = self.mirror.pass() else {
            return;
        };

        self.show_controls(ui, carousel, &pass, now);

        if self.config.show_progress {
            ui.add(egui::ProgressBar::new(pass.progress).desired_width(ui.available_width()));
        }

        ui.add_space(8.0);
        let width = ui.available_width();
        let (rect, response) = ui.allocate_exact_size(Vec2::new(width, self.config.height), Sense::click_and_drag());
        self.sync_metrics(carousel, rect);

        match self.config.style {
            PanelStyle::Track => self.draw_track(ui, rect, &response, carousel, &pass),
            PanelStyle::Screens => self.draw_screens(ui, rect, carousel, &pass),
        }
        self.handle_swipe(ui, &response, carousel);

        if self.config.show_indicators {
            ui.add_space(6.0);
            self.show_indicators(ui, carousel, &pass);
        }

        if self.config.stat_cards > 0 {
            ui.add_space(10.0);
            self.draw_stat_cards(ui, now);
        }
    }

    /// Show navigation controls
    fn show_controls(&self, ui: &mut Ui, carousel: &mut Carousel, pass: &RenderPass, now: Instant) {
        ui.horizontal(|ui| {
            let prev = ui.add_enabled(!pass.prev_disabled, egui::Button::new(icons::PREVIOUS));
            if prev.on_hover_text("Previous (Left Arrow)").clicked() {
                carousel.controller.step(Direction::Previous, true);
            }

            let next = ui.add_enabled(!pass.next_disabled, egui::Button::new(icons::NEXT));
            if next.on_hover_text("Next (Right Arrow)").clicked() {
                carousel.controller.step(Direction::Next, true);
            }

            if carousel.has_autoplay() {
                let (icon, hover_text) = if carousel.is_playing() {
                    (icons::PAUSE, "Pause (Space)")
                } else {
                    (icons::PLAY, "Play (Space)")
                };
                let toggle = ui.add(egui::SelectableLabel::new(carousel.is_playing(), icon));
                if toggle.on_hover_text(hover_text).clicked() {
                    carousel.toggle_autoplay(now);
                }
            }

            if pass.return_to_start_visible && ui.button(format!("{} Latest", icons::RETURN_TO_START)).clicked() {
                carousel.controller.go_to_start(true);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new(format!("{} / {}", pass.position + 1, pass.slide_count)).strong(),
                );
            });
        });
    }

    /// Slide width follows the available width; a change replays the layout
    fn sync_metrics(&mut self, carousel: &Carousel, rect: Rect) {
        let metrics = SlideMetrics {
            width: (rect.width() * 0.8).min(self.config.max_slide_width).max(120.0),
            ..SlideMetrics::default()
        };
        if self.last_metrics != Some(metrics) {
            debug!(carousel = carousel.name(), width = metrics.width, "Slide width changed");
            self.last_metrics = Some(metrics);
            carousel.controller.relayout(metrics);
        }
    }

    /// Draw the horizontal track
    fn draw_track(&mut self, ui: &mut Ui, rect: Rect, response: &egui::Response, carousel: &Carousel, pass: &RenderPass) {
        let painter = ui.painter_at(rect);
        let dark_mode = ui.visuals().dark_mode;
        let text_color = ui.visuals().text_color();
        let metrics = self.last_metrics.unwrap_or_default();

        painter.rect_filled(rect, Rounding::same(6.0), ui.visuals().extreme_bg_color);

        let transition = if pass.animate { TRACK_TRANSITION } else { 0.0 };
        let offset = ui.ctx().animate_value_with_time(self.id.child("offset").id(), pass.track_offset, transition);

        let mut clicked_slot = None;
        let mut clicked_expand = None;
        let pointer = response.clicked().then(|| response.interact_pointer_pos()).flatten();

        for (slot, indicator) in pass.slides.iter().enumerate() {
            let original = indicator.clone_of.unwrap_or(slot);
            let Some(content) = carousel.content.get(original) else {
                continue;
            };

            let left = rect.left() + 16.0 + offset + slot as f32 * metrics.pitch();
            let slide_rect = Rect::from_min_size(Pos2::new(left, rect.top() + 12.0), Vec2::new(metrics.width, rect.height() - 24.0));
            if !slide_rect.intersects(rect) {
                continue;
            }

            let fill = if indicator.active {
                accent_color().linear_multiply(0.35)
            } else {
                slide_fill(dark_mode)
            };
            painter.rect_filled(slide_rect, Rounding::same(8.0), fill);
            if indicator.active {
                painter.rect_stroke(slide_rect, Rounding::same(8.0), Stroke::new(2.0, accent_color()));
            }

            let inner = slide_rect.shrink(12.0);
            painter.text(inner.left_top(), Align2::LEFT_TOP, &content.label, FontId::proportional(12.0), accent_color());
            painter.text(inner.left_top() + Vec2::new(0.0, 18.0), Align2::LEFT_TOP, &content.title, FontId::proportional(17.0), text_color);
            painter.text(inner.left_top() + Vec2::new(0.0, 42.0), Align2::LEFT_TOP, &content.body, FontId::proportional(13.0), text_color.linear_multiply(0.8));

            if indicator.expanded {
                for (line, detail) in content.details.iter().enumerate() {
                    painter.text(
                        inner.left_top() + Vec2::new(0.0, 66.0 + line as f32 * 18.0),
                        Align2::LEFT_TOP,
                        format!("• {detail}"),
                        FontId::proportional(12.0),
                        text_color,
                    );
                }
            }

            let expand_rect = Rect::from_min_size(inner.right_bottom() - Vec2::new(22.0, 22.0), Vec2::splat(22.0));
            if !content.details.is_empty() {
                painter.text(
                    expand_rect.center(),
                    Align2::CENTER_CENTER,
                    if indicator.expanded { icons::COLLAPSE } else { icons::EXPAND },
                    FontId::proportional(18.0),
                    accent_color(),
                );
            }

            if let Some(pos) = pointer {
                if !content.details.is_empty() && expand_rect.contains(pos) {
                    clicked_expand = Some(original);
                } else if slide_rect.contains(pos) {
                    clicked_slot = Some(original);
                }
            }
        }

        // The expand toggle takes precedence over slide navigation
        if let Some(slide) = clicked_expand {
            carousel.controller.toggle_expanded(slide);
        } else if let Some(slot) = clicked_slot {
            carousel.controller.go_to(slot, true);
        }
    }

    /// Draw one screen at a time
    fn draw_screens(&mut self, ui: &mut Ui, rect: Rect, carousel: &Carousel, pass: &RenderPass) {
        let painter = ui.painter_at(rect);
        let text_color = ui.visuals().text_color();

        let screen_width = (rect.height() * 0.6).min(rect.width());
        let screen = Rect::from_center_size(rect.center(), Vec2::new(screen_width, rect.height()));
        painter.rect_filled(screen, Rounding::same(18.0), ui.visuals().extreme_bg_color);
        painter.rect_stroke(screen, Rounding::same(18.0), Stroke::new(3.0, ui.visuals().widgets.noninteractive.bg_stroke.color));

        for (slot, indicator) in pass.slides.iter().enumerate() {
            let Some(content) = carousel.content.get(slot) else {
                continue;
            };
            let visible = ui.ctx().animate_bool_with_time(self.id.index(slot).id(), indicator.active, 0.3);
            if visible <= 0.0 {
                continue;
            }

            // Previous screens leave to the left, upcoming ones enter from the right
            let travel = (1.0 - visible) * screen_width * 0.3;
            let shift = if indicator.previous { -travel } else { travel };
            let color = text_color.linear_multiply(visible);
            let center = screen.center() + Vec2::new(shift, 0.0);

            painter.text(center - Vec2::new(0.0, 30.0), Align2::CENTER_CENTER, &content.title, FontId::proportional(20.0), color);
            painter.text(center, Align2::CENTER_CENTER, &content.body, FontId::proportional(13.0), color);
            for (line, detail) in content.details.iter().enumerate() {
                painter.text(
                    center + Vec2::new(0.0, 26.0 + line as f32 * 16.0),
                    Align2::CENTER_CENTER,
                    detail,
                    FontId::proportional(11.0),
                    color.linear_multiply(0.7),
                );
            }
        }

        self.draw_screen_buttons(ui, screen, carousel, pass);
    }

    /// Back and next/submit buttons inside the stepper screen
    fn draw_screen_buttons(&self, ui: &mut Ui, screen: Rect, carousel: &Carousel, pass: &RenderPass) {
        let buttons = ScreenButtons::for_position(pass.position, pass.slide_count);
        let row = Rect::from_min_max(
            Pos2::new(screen.left() + 16.0, screen.bottom() - 52.0),
            Pos2::new(screen.right() - 16.0, screen.bottom() - 20.0),
        );
        let half = (row.width() - 8.0) / 2.0;

        if buttons.back {
            let back_rect = Rect::from_min_size(row.left_top(), Vec2::new(half, row.height()));
            if ui.put(back_rect, egui::Button::new(icons::SCREEN_BACK)).clicked() {
                carousel.controller.step(Direction::Previous, true);
            }
        }

        let forward_rect = if buttons.back {
            Rect::from_min_max(Pos2::new(row.right() - half, row.top()), row.right_bottom())
        } else {
            row
        };
        if ui.put(forward_rect, egui::Button::new(buttons.forward)).clicked() {
            // Submit on the last screen is a boundary no-op under Clamped
            carousel.controller.step(Direction::Next, true);
        }
    }

    fn handle_swipe(&self, ui: &Ui, response: &egui::Response, carousel: &mut Carousel) {
        if response.drag_started() {
            match response.interact_pointer_pos() {
                Some(pos) => carousel.begin_swipe(pos.x),
                None => carousel.cancel_swipe(),
            }
        }
        if response.drag_released() {
            match ui.input(|i| i.pointer.latest_pos()) {
                Some(pos) => {
                    carousel.finish_swipe(pos.x);
                }
                None => carousel.cancel_swipe(),
            }
        }
    }

    /// Year indicators / step dots
    fn show_indicators(&self, ui: &mut Ui, carousel: &Carousel, pass: &RenderPass) {
        ui.horizontal(|ui| {
            for (index, content) in carousel.content.iter().enumerate() {
                if ui.selectable_label(indicator_selected(pass, index), &content.label).clicked() {
                    carousel.controller.go_to(index, true);
                }
            }
        });
    }

    fn draw_stat_cards(&mut self, ui: &mut Ui, now: Instant) {
        let count = self.config.stat_cards;
        let spacing = 8.0;
        let card_width = ((ui.available_width() - spacing * (count as f32 - 1.0)) / count as f32).max(40.0);
        let (rect, _) = ui.allocate_exact_size(Vec2::new(ui.available_width(), 48.0), Sense::hover());
        let painter = ui.painter_at(rect);

        let mut animating = false;
        for card in 0..count {
            let pulse = self.mirror.card_pulse(card, now);
            animating |= pulse > 0.0;

            let left = rect.left() + card as f32 * (card_width + spacing);
            let base = Rect::from_min_size(Pos2::new(left, rect.top()), Vec2::new(card_width, rect.height()));
            let card_rect = base.expand(pulse * 3.0);
            let fill = slide_fill(ui.visuals().dark_mode);
            painter.rect_filled(card_rect, Rounding::same(6.0), fill);
            painter.rect_stroke(card_rect, Rounding::same(6.0), Stroke::new(1.0, accent_color().linear_multiply(0.3 + pulse * 0.7)));
        }

        if animating {
            ui.ctx().request_repaint();
        }
    }
}
