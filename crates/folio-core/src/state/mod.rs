use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::autoplay::Autoplay;
use crate::config::{CarouselConfig, SiteConfig, SlideContent};
use crate::error::Result;
use crate::events::{events::AutoplayToggled, EventBus};
use crate::input::{KeyBindings, KeyPress, NavCommand, SwipeTracker};
use crate::navigation::{CarouselController, Direction};
use crate::schedule::Scheduler;

/// A controller together with its content and input state
pub struct Carousel {
    /// The navigation controller
    pub controller: Arc<CarouselController>,

    /// Slide content, indexed like the controller's slides
    pub content: Vec<SlideContent>,

    /// Optional keys this variant handles
    pub keys: KeyBindings,

    swipe: SwipeTracker,
    autoplay: Option<Autoplay>,
    event_bus: Arc<EventBus>,
}

impl Carousel {
    /// Build a carousel from its configuration
    pub fn from_config(
        config: &CarouselConfig,
        scheduler: Arc<dyn Scheduler>,
        event_bus: Arc<EventBus>,
    ) -> Result<Self> {
        config.validate()?;

        let controller = CarouselController::initialize(config.to_spec(), scheduler)?
            .with_event_bus(event_bus.clone());

        Ok(Self {
            controller: Arc::new(controller),
            content: config.slides.clone(),
            keys: config.keys,
            swipe: SwipeTracker::new(config.swipe_threshold_px),
            autoplay: config.autoplay()?,
            event_bus,
        })
    }

    pub fn name(&self) -> &str {
        self.controller.name()
    }

    /// Apply a command. Returns whether anything changed.
    pub fn dispatch(&mut self, command: NavCommand, now: Instant) -> bool {
        match command {
            NavCommand::Step(direction) => self.controller.step(direction, true),
            NavCommand::GoTo(index) => self.controller.go_to(index, true),
            NavCommand::ToggleAutoplay => self.toggle_autoplay(now).is_some(),
        }
    }

    /// Route a key press through this variant's bindings
    pub fn handle_key(&mut self, press: KeyPress, now: Instant) -> bool {
        match self.keys.command_for(press, self.controller.slide_count()) {
            Some(command) => self.dispatch(command, now),
            None => false,
        }
    }

    pub fn begin_swipe(&mut self, x: f32) {
        self.swipe.begin(x);
    }

    pub fn cancel_swipe(&mut self) {
        self.swipe.cancel();
    }

    /// Finish a swipe; a long enough one steps once
    pub fn finish_swipe(&mut self, x: f32) -> Option<Direction> {
        let direction = self.swipe.finish(x)?;
        self.controller.step(direction, true);
        Some(direction)
    }

    pub fn has_autoplay(&self) -> bool {
        self.autoplay.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.autoplay.as_ref().is_some_and(Autoplay::is_playing)
    }

    /// Flip autoplay. `None` when the variant has no autoplay.
    pub fn toggle_autoplay(&mut self, now: Instant) -> Option<bool> {
        let autoplay = self.autoplay.as_mut()?;
        let enabled = autoplay.toggle(now);

        debug!(carousel = %self.controller.name(), enabled, "autoplay toggled");
        self.event_bus.publish(AutoplayToggled {
            carousel: self.controller.name().to_string(),
            enabled,
        });
        Some(enabled)
    }

    /// Drive autoplay from the caller's clock
    pub fn tick(&mut self, now: Instant) -> usize {
        match self.autoplay.as_mut() {
            Some(autoplay) => autoplay.poll(now, &self.controller),
            None => 0,
        }
    }

    /// How long the caller may sleep before the next autoplay advance
    pub fn time_until_next(&self, now: Instant) -> Option<std::time::Duration> {
        self.autoplay.as_ref()?.time_until_next(now)
    }
}

/// Site settings
#[derive(Debug, Clone)]
pub struct SiteSettings {
    /// Whether to use dark mode
    pub dark_mode: bool,
}

/// The page state: both carousels plus shared services
pub struct PortfolioState {
    /// Horizontal experience timeline
    pub timeline: Carousel,

    /// Receipt validation stepper
    pub stepper: Carousel,

    /// The event bus
    pub event_bus: Arc<EventBus>,

    pub settings: SiteSettings,
}

impl PortfolioState {
    /// Build both carousels from `config`
    pub fn from_config(config: &SiteConfig, scheduler: Arc<dyn Scheduler>) -> Result<Self> {
        let event_bus = Arc::new(EventBus::new());

        let timeline = Carousel::from_config(&config.timeline, scheduler.clone(), event_bus.clone())?;
        let stepper = Carousel::from_config(&config.stepper, scheduler, event_bus.clone())?;

        Ok(Self {
            timeline,
            stepper,
            event_bus,
            settings: SiteSettings { dark_mode: config.dark_mode },
        })
    }

    /// Flip the theme. Returns the new dark-mode flag.
    pub fn toggle_theme(&mut self) -> bool {
        self.settings.dark_mode = !self.settings.dark_mode;
        debug!(dark_mode = self.settings.dark_mode, "theme toggled");
        self.settings.dark_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{events::SlideChanged, handler_from_fn};
    use crate::input::Key;
    use crate::schedule::ManualScheduler;
    use parking_lot::Mutex;
    use std::time::Duration;

    fn state() -> PortfolioState {
        PortfolioState::from_config(&SiteConfig::default(), Arc::new(ManualScheduler::new()))
            .expect("default config is valid")
    }

    #[test]
    fn test_digit_keys_only_reach_stepper() {
        let mut state = state();
        let now = Instant::now();

        assert!(state.stepper.handle_key(KeyPress::new(Key::Digit(3)), now));
        assert_eq!(state.stepper.controller.context().display_number(), 3);

        assert!(!state.timeline.handle_key(KeyPress::new(Key::Digit(3)), now));
        assert_eq!(state.timeline.controller.position(), 0);
    }

    #[test]
    fn test_space_toggles_timeline_autoplay() {
        let mut state = state();
        let now = Instant::now();
        let toggles = Arc::new(Mutex::new(Vec::new()));
        let sink = toggles.clone();
        state.event_bus.subscribe::<AutoplayToggled>(handler_from_fn(move |event| {
            if let Some(toggled) = event.as_any().downcast_ref::<AutoplayToggled>() {
                sink.lock().push(toggled.enabled);
            }
        }));

        assert!(state.timeline.handle_key(KeyPress::new(Key::Space), now));
        assert!(state.timeline.is_playing());
        assert!(!state.stepper.handle_key(KeyPress::new(Key::Space), now));

        assert_eq!(state.timeline.tick(now + Duration::from_secs(4)), 1);
        assert_eq!(state.timeline.controller.position(), 1);
        assert_eq!(*toggles.lock(), vec![true]);
    }

    #[test]
    fn test_swipe_steps_once() {
        let mut state = state();

        state.stepper.begin_swipe(300.0);
        assert_eq!(state.stepper.finish_swipe(200.0), Some(Direction::Next));
        assert_eq!(state.stepper.controller.position(), 1);

        state.stepper.begin_swipe(300.0);
        assert_eq!(state.stepper.finish_swipe(290.0), None);
        assert_eq!(state.stepper.controller.position(), 1);
    }

    #[test]
    fn test_shared_bus_sees_both_carousels() {
        let mut state = state();
        let names = Arc::new(Mutex::new(Vec::new()));
        let sink = names.clone();
        state.event_bus.subscribe::<SlideChanged>(handler_from_fn(move |event| {
            if let Some(changed) = event.as_any().downcast_ref::<SlideChanged>() {
                sink.lock().push(changed.carousel.clone());
            }
        }));

        let now = Instant::now();
        state.timeline.dispatch(NavCommand::Step(Direction::Previous), now);
        state.stepper.dispatch(NavCommand::GoTo(1), now);

        assert_eq!(*names.lock(), vec!["timeline".to_string(), "receipt".to_string()]);
        assert_eq!(state.timeline.controller.position(), 3);
    }

    #[test]
    fn test_theme_toggle() {
        let mut state = state();
        assert!(state.settings.dark_mode);
        assert!(!state.toggle_theme());
        assert!(state.toggle_theme());
    }
}
