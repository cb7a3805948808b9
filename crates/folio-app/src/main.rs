//! Main application entry point

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use eframe::egui::{self, Context};
use tracing::{error, info, warn};

use folio_core::input::{Key, KeyPress};
use folio_core::{Carousel, PortfolioState, SiteConfig, TokioScheduler};
use folio_ui::{CarouselPanel, CarouselPanelConfig, ErrorMessage, Page, PanelStyle, ShellConfig, Theme};

/// Main application state
struct PortfolioApp {
    /// Both carousels and their shared services
    state: PortfolioState,

    /// Timeline panel on the resume page
    timeline_panel: CarouselPanel,

    /// Stepper panel on the receipt page
    stepper_panel: CarouselPanel,

    /// Page currently shown
    page: Page,

    /// Current theme
    theme: Theme,

    shell: ShellConfig,

    /// Error messages to display
    error_messages: Vec<ErrorMessage>,

    /// Runs deferred activations and stagger callbacks
    _runtime: tokio::runtime::Runtime,
}

impl PortfolioApp {
    fn new(
        cc: &eframe::CreationContext<'_>,
        state: PortfolioState,
        runtime: tokio::runtime::Runtime,
        error_messages: Vec<ErrorMessage>,
    ) -> Self {
        let theme = Theme::from_dark_mode(state.settings.dark_mode);
        folio_ui::apply_theme(&cc.egui_ctx, &theme);

        let timeline_panel = CarouselPanel::new(&cc.egui_ctx, &state.timeline).with_config(CarouselPanelConfig {
            style: PanelStyle::Track,
            ..CarouselPanelConfig::default()
        });
        let stepper_panel = CarouselPanel::new(&cc.egui_ctx, &state.stepper).with_config(CarouselPanelConfig {
            style: PanelStyle::Screens,
            height: 320.0,
            stat_cards: 3,
            ..CarouselPanelConfig::default()
        });

        Self {
            state,
            timeline_panel,
            stepper_panel,
            page: Page::Resume,
            theme,
            shell: ShellConfig::default(),
            error_messages,
            _runtime: runtime,
        }
    }

    fn active_carousel(&mut self) -> &mut Carousel {
        match self.page {
            Page::Resume => &mut self.state.timeline,
            Page::ReceiptDemo => &mut self.state.stepper,
        }
    }

    /// Route this frame's key presses to the visible carousel
    fn handle_keys(&mut self, ctx: &Context, now: Instant) {
        let in_text_input = ctx.wants_keyboard_input();
        let keys: Vec<Key> = ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key { key, pressed: true, repeat: false, .. } => map_key(*key),
                    _ => None,
                })
                .collect()
        });

        let carousel = self.active_carousel();
        for key in keys {
            carousel.handle_key(KeyPress { key, in_text_input }, now);
        }
    }

    fn toggle_theme(&mut self, ctx: &Context) {
        let dark_mode = self.state.toggle_theme();
        self.theme = Theme::from_dark_mode(dark_mode);
        folio_ui::apply_theme(ctx, &self.theme);
    }
}

impl eframe::App for PortfolioApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        self.handle_keys(ctx, now);

        // Autoplay only advances the timeline while it is on screen
        if self.page == Page::Resume {
            self.state.timeline.tick(now);
            if let Some(wait) = self.state.timeline.time_until_next(now) {
                ctx.request_repaint_after(wait.max(Duration::from_millis(16)));
            }
        }

        if folio_ui::top_bar(ctx, &self.shell, &mut self.page, &self.theme) {
            self.toggle_theme(ctx);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            folio_ui::show_error_messages(ui, &mut self.error_messages, now);

            match self.page {
                Page::Resume => {
                    ui.heading("Experience");
                    ui.label("Click a role to focus it, or use the arrow keys. Space toggles autoplay.");
                    ui.add_space(8.0);
                    self.timeline_panel.ui(ui, &mut self.state.timeline, now);
                }
                Page::ReceiptDemo => {
                    ui.heading("Receipt Validation");
                    ui.label("Step through the flow with the arrows or the number keys.");
                    ui.add_space(8.0);
                    self.stepper_panel.ui(ui, &mut self.state.stepper, now);
                }
            }
        });
    }
}

/// Keys the carousels understand
fn map_key(key: egui::Key) -> Option<Key> {
    use egui::Key as K;

    let key = match key {
        K::ArrowLeft => Key::ArrowLeft,
        K::ArrowRight => Key::ArrowRight,
        K::Space => Key::Space,
        K::Num0 => Key::Digit(0),
        K::Num1 => Key::Digit(1),
        K::Num2 => Key::Digit(2),
        K::Num3 => Key::Digit(3),
        K::Num4 => Key::Digit(4),
        K::Num5 => Key::Digit(5),
        K::Num6 => Key::Digit(6),
        K::Num7 => Key::Digit(7),
        K::Num8 => Key::Digit(8),
        K::Num9 => Key::Digit(9),
        _ => return None,
    };
    Some(key)
}

/// Load the site configuration named on the command line, falling back to
/// the built-in defaults when it is missing or invalid
fn load_config(path: Option<PathBuf>) -> (SiteConfig, Vec<ErrorMessage>) {
    let Some(path) = path else {
        info!("No configuration given, using defaults");
        return (SiteConfig::default(), Vec::new());
    };

    match SiteConfig::load(&path) {
        Ok(config) => (config, Vec::new()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Falling back to default configuration");
            let message = ErrorMessage::new("Configuration", format!("{}: {}", path.display(), e));
            (SiteConfig::default(), vec![message])
        }
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting portfolio site");

    let (config, error_messages) = load_config(std::env::args_os().nth(1).map(PathBuf::from));

    let runtime = tokio::runtime::Runtime::new()?;
    let scheduler = Arc::new(TokioScheduler::new(runtime.handle().clone()));
    let state = PortfolioState::from_config(&config, scheduler).map_err(|e| {
        error!(error = %e, "Invalid site configuration");
        e
    })?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([640.0, 480.0]),
        default_theme: if config.dark_mode { eframe::Theme::Dark } else { eframe::Theme::Light },
        persist_window: false,
        ..Default::default()
    };

    eframe::run_native(
        "Portfolio",
        options,
        Box::new(move |cc| Box::new(PortfolioApp::new(cc, state, runtime, error_messages))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
