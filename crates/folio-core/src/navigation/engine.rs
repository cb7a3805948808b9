//! Carousel controller implementation

use super::render::RenderInput;
use super::{
    CarouselContext, CarouselSpec, CarouselSubscriber, Direction, RenderPass, SlideMetrics,
};
use crate::error::{FolioError, Result};
use crate::events::{events::{ExpansionToggled, SlideChanged}, EventBus};
use crate::schedule::Scheduler;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::{Arc, Weak};
use tracing::{debug, trace};

/// Mutable controller state
#[derive(Debug, Clone)]
struct CarouselState {
    position: usize,
    expanded: BTreeSet<usize>,
    metrics: SlideMetrics,
    last_pass: RenderPass,
}

/// Bounded position over a fixed sequence of slides.
///
/// Every successful navigation runs a full render pass and hands it to the
/// subscribers. Requests the boundary policy rejects do nothing at all.
pub struct CarouselController {
    spec: CarouselSpec,
    state: Arc<RwLock<CarouselState>>,
    subscribers: Arc<RwLock<Vec<Weak<dyn CarouselSubscriber>>>>,
    scheduler: Arc<dyn Scheduler>,
    event_bus: Option<Arc<EventBus>>,
}

fn render_input<'a>(spec: &CarouselSpec, state: &'a CarouselState) -> RenderInput<'a> {
    RenderInput {
        position: state.position,
        slide_count: spec.slide_count,
        policy: spec.policy,
        expanded: &state.expanded,
        metrics: state.metrics,
        return_to_start: spec.return_to_start,
        cloned_loop: spec.cloned_loop,
        deferred_activation: spec.activation_delay.is_some(),
    }
}

impl CarouselController {
    /// Validate `spec` and perform the first, non-animated render pass
    pub fn initialize(spec: CarouselSpec, scheduler: Arc<dyn Scheduler>) -> Result<Self> {
        if spec.slide_count == 0 {
            return Err(FolioError::InvalidConfiguration(format!(
                "carousel '{}' has no slides",
                spec.name
            )));
        }
        if spec.initial_position >= spec.slide_count {
            return Err(FolioError::InvalidConfiguration(format!(
                "carousel '{}' initial position {} out of bounds (max: {})",
                spec.name,
                spec.initial_position,
                spec.slide_count - 1
            )));
        }

        let expanded = BTreeSet::new();
        let last_pass = RenderPass::compute(
            RenderInput {
                position: spec.initial_position,
                slide_count: spec.slide_count,
                policy: spec.policy,
                expanded: &expanded,
                metrics: spec.metrics,
                return_to_start: spec.return_to_start,
                cloned_loop: spec.cloned_loop,
                deferred_activation: spec.activation_delay.is_some(),
            },
            false,
        );
        let state = CarouselState {
            position: spec.initial_position,
            expanded,
            metrics: spec.metrics,
            last_pass,
        };

        debug!(
            carousel = %spec.name,
            slides = spec.slide_count,
            policy = ?spec.policy,
            position = spec.initial_position,
            "carousel initialized"
        );

        Ok(Self {
            spec,
            state: Arc::new(RwLock::new(state)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            scheduler,
            event_bus: None,
        })
    }

    /// Publish navigation events on `bus`
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Jump to `index`. Returns whether a render pass ran.
    pub fn go_to(&self, index: usize, animate: bool) -> bool {
        self.navigate(animate, |_| index as i128)
    }

    /// Move one slide in `direction`. Returns whether a render pass ran.
    pub fn step(&self, direction: Direction, animate: bool) -> bool {
        self.navigate(animate, |position| position as i128 + direction.delta())
    }

    /// Target of the "return to start" affordance
    pub fn go_to_start(&self, animate: bool) -> bool {
        self.go_to(0, animate)
    }

    fn navigate(&self, animate: bool, target: impl FnOnce(usize) -> i128) -> bool {
        let (from, pass) = {
            let mut state = self.state.write();
            let requested = target(state.position);

            let Some(index) = self.spec.policy.resolve(requested, self.spec.slide_count) else {
                trace!(carousel = %self.spec.name, requested = %requested, "navigation ignored at boundary");
                return false;
            };

            let from = state.position;
            state.position = index;
            let pass = RenderPass::compute(render_input(&self.spec, &state), animate);
            state.last_pass = pass.clone();
            (from, pass)
        };

        if from != pass.position {
            debug!(carousel = %self.spec.name, from, to = pass.position, animate, "slide changed");
            if let Some(bus) = &self.event_bus {
                bus.publish(SlideChanged {
                    carousel: self.spec.name.clone(),
                    from,
                    to: pass.position,
                });
            }
        }

        self.dispatch(pass);
        true
    }

    /// Flip the expand flag of `index`.
    ///
    /// Returns the new flag, or `None` when `index` is not a slide.
    pub fn toggle_expanded(&self, index: usize) -> Option<bool> {
        if index >= self.spec.slide_count {
            trace!(carousel = %self.spec.name, index, "expand toggle ignored");
            return None;
        }

        let expanded = {
            let mut state = self.state.write();
            let expanded = if state.expanded.remove(&index) {
                false
            } else {
                state.expanded.insert(index);
                true
            };
            state.last_pass.set_expanded(index, expanded);
            expanded
        };

        debug!(carousel = %self.spec.name, slide = index, expanded, "expansion toggled");

        for subscriber in self.live_subscribers() {
            subscriber.on_expansion_change(index, expanded);
        }
        if let Some(bus) = &self.event_bus {
            bus.publish(ExpansionToggled {
                carousel: self.spec.name.clone(),
                slide: index,
                expanded,
            });
        }

        Some(expanded)
    }

    /// Store new layout metrics and replay the current position without animation
    pub fn relayout(&self, metrics: SlideMetrics) {
        let pass = {
            let mut state = self.state.write();
            state.metrics = metrics;
            let pass = RenderPass::compute(render_input(&self.spec, &state), false);
            state.last_pass = pass.clone();
            pass
        };

        trace!(carousel = %self.spec.name, pitch = metrics.pitch(), "relayout");
        self.dispatch(pass);
    }

    fn dispatch(&self, pass: RenderPass) {
        trace!(
            carousel = %self.spec.name,
            position = pass.position,
            progress = pass.progress,
            animate = pass.animate,
            "render pass"
        );

        for subscriber in self.live_subscribers() {
            subscriber.on_render(&pass);
        }

        if let (Some(slot), Some(delay)) = (pass.pending_activation, self.spec.activation_delay) {
            let state = Arc::downgrade(&self.state);
            let subscribers = self.subscribers.read().clone();
            self.scheduler.schedule(
                delay,
                Box::new(move || {
                    if let Some(state) = state.upgrade() {
                        state.write().last_pass.activate(slot);
                    }
                    for subscriber in subscribers.iter().filter_map(Weak::upgrade) {
                        subscriber.on_activate(slot);
                    }
                }),
            );
        }

        if pass.animate {
            if let Some(stagger) = self.spec.stagger {
                for card in 0..stagger.count {
                    let subscribers = self.subscribers.read().clone();
                    self.scheduler.schedule(
                        stagger.delay_for(card),
                        Box::new(move || {
                            for subscriber in subscribers.iter().filter_map(Weak::upgrade) {
                                subscriber.on_stagger(card);
                            }
                        }),
                    );
                }
            }
        }
    }

    /// Add a subscriber. It immediately receives the current render pass.
    pub fn add_subscriber(&self, subscriber: Arc<dyn CarouselSubscriber>) {
        self.subscribers.write().push(Arc::downgrade(&subscriber));
        let current = self.last_render();
        subscriber.on_render(&current);
    }

    fn live_subscribers(&self) -> Vec<Arc<dyn CarouselSubscriber>> {
        let mut subscribers = self.subscribers.write();

        // Remove any dead weak references
        subscribers.retain(|weak| weak.strong_count() > 0);
        subscribers.iter().filter_map(Weak::upgrade).collect()
    }

    /// Get current carousel context
    pub fn context(&self) -> CarouselContext {
        let state = self.state.read();
        CarouselContext {
            position: state.position,
            slide_count: self.spec.slide_count,
            policy: self.spec.policy,
            expanded: state.expanded.clone(),
        }
    }

    /// The most recent render pass, including fired deferred activations
    pub fn last_render(&self) -> RenderPass {
        self.state.read().last_pass.clone()
    }

    pub fn position(&self) -> usize {
        self.state.read().position
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.state.read().expanded.contains(&index)
    }

    pub fn slide_count(&self) -> usize {
        self.spec.slide_count
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::handler_from_fn;
    use crate::navigation::{BoundaryPolicy, StaggerSpec};
    use crate::schedule::ManualScheduler;
    use parking_lot::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        passes: Mutex<Vec<RenderPass>>,
        activations: Mutex<Vec<usize>>,
        stagger: Mutex<Vec<usize>>,
        expansions: Mutex<Vec<(usize, bool)>>,
    }

    impl Recorder {
        fn render_count(&self) -> usize {
            self.passes.lock().len()
        }

        fn last(&self) -> RenderPass {
            self.passes.lock().last().cloned().expect("at least one pass")
        }
    }

    impl CarouselSubscriber for Recorder {
        fn on_render(&self, pass: &RenderPass) {
            self.passes.lock().push(pass.clone());
        }

        fn on_activate(&self, slot: usize) {
            self.activations.lock().push(slot);
        }

        fn on_stagger(&self, card: usize) {
            self.stagger.lock().push(card);
        }

        fn on_expansion_change(&self, slide: usize, expanded: bool) {
            self.expansions.lock().push((slide, expanded));
        }
    }

    fn build(spec: CarouselSpec) -> (CarouselController, Arc<Recorder>, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        let controller = CarouselController::initialize(spec, Arc::new(scheduler.clone()))
            .expect("valid spec");
        let recorder = Arc::new(Recorder::default());
        controller.add_subscriber(recorder.clone());
        (controller, recorder, scheduler)
    }

    #[test]
    fn test_initialize_rejects_empty_sequence() {
        let spec = CarouselSpec::new("empty", 0, BoundaryPolicy::Clamped);
        let result = CarouselController::initialize(spec, Arc::new(ManualScheduler::new()));
        assert!(matches!(result, Err(FolioError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_initialize_rejects_out_of_bounds_start() {
        let spec = CarouselSpec::new("timeline", 3, BoundaryPolicy::WrapAround).with_initial_position(3);
        let result = CarouselController::initialize(spec, Arc::new(ManualScheduler::new()));
        assert!(matches!(result, Err(FolioError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_initial_pass_is_not_animated() {
        let spec = CarouselSpec::new("stepper", 3, BoundaryPolicy::Clamped)
            .with_activation_delay(Duration::from_millis(50));
        let (controller, recorder, scheduler) = build(spec);

        let first = recorder.last();
        assert!(!first.animate);
        assert_eq!(first.active_slot(), Some(0));
        assert_eq!(first.pending_activation, None);
        assert_eq!(controller.last_render(), first);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_clamped_scenario_five_slides() {
        let (controller, recorder, _) = build(CarouselSpec::new("timeline", 5, BoundaryPolicy::Clamped));

        for _ in 0..4 {
            assert!(controller.step(Direction::Next, true));
        }
        assert_eq!(controller.position(), 4);
        let pass = recorder.last();
        assert!(pass.next_disabled);
        assert!(!pass.prev_disabled);

        let renders = recorder.render_count();
        assert!(!controller.step(Direction::Next, true));
        assert_eq!(controller.position(), 4);
        assert_eq!(recorder.render_count(), renders);
    }

    #[test]
    fn test_clamped_step_back_at_start_is_noop() {
        let (controller, recorder, _) = build(CarouselSpec::new("timeline", 3, BoundaryPolicy::Clamped));
        let renders = recorder.render_count();

        assert!(!controller.step(Direction::Previous, true));
        assert!(!controller.go_to(3, true));
        assert_eq!(controller.position(), 0);
        assert_eq!(recorder.render_count(), renders);
    }

    #[test]
    fn test_wrap_around_scenario_three_slides() {
        let spec = CarouselSpec::new("timeline", 3, BoundaryPolicy::WrapAround).with_return_to_start(true);
        let (controller, recorder, _) = build(spec);

        assert!(controller.step(Direction::Previous, true));
        assert_eq!(controller.position(), 2);
        let pass = recorder.last();
        assert!(pass.return_to_start_visible);
        assert!(!pass.prev_disabled && !pass.next_disabled);

        assert!(controller.step(Direction::Next, true));
        assert_eq!(controller.position(), 0);
        assert!(!recorder.last().return_to_start_visible);
    }

    #[test]
    fn test_wrap_around_normalizes_go_to() {
        let (controller, _, _) = build(CarouselSpec::new("timeline", 4, BoundaryPolicy::WrapAround));
        assert!(controller.go_to(9, false));
        assert_eq!(controller.position(), 1);
    }

    #[test]
    fn test_go_to_current_position_is_idempotent() {
        let (controller, recorder, _) = build(CarouselSpec::new("timeline", 4, BoundaryPolicy::Clamped));
        controller.go_to(2, true);
        let before = recorder.last();
        let renders = recorder.render_count();

        assert!(controller.go_to(2, true));
        assert_eq!(recorder.render_count(), renders + 1);
        assert_eq!(recorder.last(), before);
    }

    #[test]
    fn test_progress_tracks_position() {
        let (controller, recorder, _) = build(CarouselSpec::new("timeline", 5, BoundaryPolicy::Clamped));
        for index in 0..5 {
            controller.go_to(index, false);
            assert_eq!(recorder.last().progress, (index + 1) as f32 / 5.0);
        }
    }

    #[test]
    fn test_position_stays_in_bounds() {
        for policy in [BoundaryPolicy::Clamped, BoundaryPolicy::WrapAround] {
            for count in 1..6 {
                let (controller, _, _) = build(CarouselSpec::new("timeline", count, policy));
                let mut seed: u64 = 0x2545_f491_4f6c_dd1d ^ count as u64;
                for _ in 0..200 {
                    seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
                    match seed >> 61 {
                        0 | 1 => { controller.step(Direction::Next, true); }
                        2 | 3 => { controller.step(Direction::Previous, true); }
                        _ => { controller.go_to((seed >> 33) as usize % (count * 3), true); }
                    }
                    assert!(controller.position() < count);
                }
            }
        }
    }

    #[test]
    fn test_rapid_steps_each_run_a_full_pass() {
        for policy in [BoundaryPolicy::Clamped, BoundaryPolicy::WrapAround] {
            let (controller, recorder, _) = build(CarouselSpec::new("timeline", 8, policy));
            let renders = recorder.render_count();

            let steps = 5;
            for _ in 0..steps {
                assert!(controller.step(Direction::Next, true));
            }

            let passes = recorder.passes.lock();
            assert_eq!(passes.len(), renders + steps);
            let positions: Vec<usize> = passes[renders..].iter().map(|p| p.position).collect();
            assert_eq!(positions, vec![1, 2, 3, 4, 5]);
            assert!(passes[renders..].iter().all(|p| p.animate && p.slides.len() == 8));
        }
    }

    #[test]
    fn test_toggle_expanded_twice_restores_state() {
        let (controller, recorder, _) = build(CarouselSpec::new("timeline", 5, BoundaryPolicy::Clamped));
        controller.go_to(1, false);
        let before = controller.context();

        assert_eq!(controller.toggle_expanded(2), Some(true));
        assert!(controller.is_expanded(2));
        assert!(controller.last_render().slides[2].expanded);
        assert_eq!(controller.toggle_expanded(2), Some(false));

        assert_eq!(controller.context(), before);
        assert_eq!(*recorder.expansions.lock(), vec![(2, true), (2, false)]);
        assert_eq!(controller.toggle_expanded(5), None);
    }

    #[test]
    fn test_relayout_replays_without_animation() {
        let (controller, recorder, _) = build(CarouselSpec::new("timeline", 4, BoundaryPolicy::WrapAround));
        controller.go_to(2, true);

        controller.relayout(SlideMetrics { width: 200.0, margin_right: 0.0, gap: 40.0 });
        let pass = recorder.last();
        assert_eq!(controller.position(), 2);
        assert!(!pass.animate);
        assert_eq!(pass.track_offset, -480.0);
    }

    #[test]
    fn test_deferred_activation_fires_after_delay() {
        let spec = CarouselSpec::new("stepper", 3, BoundaryPolicy::Clamped)
            .with_activation_delay(Duration::from_millis(50));
        let (controller, recorder, scheduler) = build(spec);

        controller.step(Direction::Next, true);
        assert_eq!(recorder.last().active_slot(), None);
        assert_eq!(controller.last_render().pending_activation, Some(1));

        scheduler.advance(Duration::from_millis(49));
        assert!(recorder.activations.lock().is_empty());

        scheduler.advance(Duration::from_millis(1));
        assert_eq!(*recorder.activations.lock(), vec![1]);
        assert_eq!(controller.last_render().active_slot(), Some(1));
    }

    #[test]
    fn test_overlapping_activations_settle_on_latest() {
        let spec = CarouselSpec::new("stepper", 3, BoundaryPolicy::Clamped)
            .with_activation_delay(Duration::from_millis(50));
        let (controller, recorder, scheduler) = build(spec);

        controller.step(Direction::Next, true);
        controller.step(Direction::Next, true);
        scheduler.advance(Duration::from_millis(100));

        assert_eq!(*recorder.activations.lock(), vec![1, 2]);
        assert_eq!(controller.last_render().active_slot(), Some(2));
    }

    #[test]
    fn test_non_animated_jump_activates_immediately() {
        let spec = CarouselSpec::new("stepper", 3, BoundaryPolicy::Clamped)
            .with_activation_delay(Duration::from_millis(50));
        let (controller, recorder, scheduler) = build(spec);

        controller.go_to(2, false);
        assert_eq!(recorder.last().active_slot(), Some(2));
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_stagger_restarts_cards_on_animated_pass() {
        let spec = CarouselSpec::new("stepper", 3, BoundaryPolicy::Clamped).with_stagger(StaggerSpec {
            count: 3,
            base_delay: Duration::from_millis(50),
            step_delay: Duration::from_millis(100),
        });
        let (controller, recorder, scheduler) = build(spec);

        controller.go_to(1, false);
        assert_eq!(scheduler.pending(), 0);

        controller.go_to(2, true);
        scheduler.advance(Duration::from_millis(150));
        assert_eq!(*recorder.stagger.lock(), vec![0, 1]);
        scheduler.advance(Duration::from_millis(100));
        assert_eq!(*recorder.stagger.lock(), vec![0, 1, 2]);
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let (controller, _recorder, _) = build(CarouselSpec::new("timeline", 3, BoundaryPolicy::Clamped));
        let transient = Arc::new(Recorder::default());
        controller.add_subscriber(transient.clone());
        drop(transient);

        controller.step(Direction::Next, true);
        assert_eq!(controller.subscribers.read().len(), 1);
    }

    #[test]
    fn test_slide_changed_published_only_on_move() {
        let bus = Arc::new(EventBus::new());
        let moves = Arc::new(Mutex::new(Vec::new()));
        let sink = moves.clone();
        bus.subscribe::<SlideChanged>(handler_from_fn(move |event| {
            if let Some(changed) = event.as_any().downcast_ref::<SlideChanged>() {
                sink.lock().push((changed.from, changed.to));
            }
        }));

        let controller = CarouselController::initialize(
            CarouselSpec::new("timeline", 3, BoundaryPolicy::Clamped),
            Arc::new(ManualScheduler::new()),
        )
        .expect("valid spec")
        .with_event_bus(bus);

        controller.step(Direction::Next, true);
        controller.go_to(1, true);
        controller.step(Direction::Previous, true);

        assert_eq!(*moves.lock(), vec![(0, 1), (1, 0)]);
    }
}
