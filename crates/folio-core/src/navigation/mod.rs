use serde::{Serialize, Deserialize};
use std::collections::BTreeSet;
use std::time::Duration;

mod engine;
mod position;
mod render;
mod subscriber;

pub use engine::CarouselController;
pub use position::{Direction, progress_ratio};
pub use render::{RenderPass, SlideIndicator, SlideMetrics};
pub use subscriber::CarouselSubscriber;

/// Rule applied to navigation requests past the first or last slide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Out-of-range moves are ignored, edge affordances are disabled
    #[default]
    Clamped,
    /// Out-of-range moves wrap around, affordances stay enabled
    WrapAround,
}

impl BoundaryPolicy {
    /// Resolve a requested index into `[0, slide_count)`.
    ///
    /// Returns `None` when the request must be ignored.
    pub fn resolve(self, index: i128, slide_count: usize) -> Option<usize> {
        if slide_count == 0 {
            return None;
        }
        let count = slide_count as i128;
        match self {
            BoundaryPolicy::Clamped => {
                if (0..count).contains(&index) {
                    Some(index as usize)
                } else {
                    None
                }
            }
            BoundaryPolicy::WrapAround => Some(index.rem_euclid(count) as usize),
        }
    }

    /// Whether edge affordances can ever be disabled under this policy
    pub fn disables_edges(self) -> bool {
        matches!(self, BoundaryPolicy::Clamped)
    }
}

/// Restart schedule for auxiliary cards after an animated step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaggerSpec {
    pub count: usize,
    pub base_delay: Duration,
    pub step_delay: Duration,
}

impl StaggerSpec {
    /// Delay before card `index` restarts
    pub fn delay_for(&self, index: usize) -> Duration {
        self.base_delay + self.step_delay * index as u32
    }
}

/// Everything needed to build a controller
#[derive(Debug, Clone)]
pub struct CarouselSpec {
    pub name: String,
    pub slide_count: usize,
    pub policy: BoundaryPolicy,
    pub initial_position: usize,
    /// Variant shows a "return to start" affordance
    pub return_to_start: bool,
    /// Track renders a clone of every slide after the last one
    pub cloned_loop: bool,
    /// Delay before the target slide turns active on animated passes
    pub activation_delay: Option<Duration>,
    pub stagger: Option<StaggerSpec>,
    pub metrics: SlideMetrics,
}

impl CarouselSpec {
    pub fn new(name: impl Into<String>, slide_count: usize, policy: BoundaryPolicy) -> Self {
        Self {
            name: name.into(),
            slide_count,
            policy,
            initial_position: 0,
            return_to_start: false,
            cloned_loop: false,
            activation_delay: None,
            stagger: None,
            metrics: SlideMetrics::default(),
        }
    }

    pub fn with_initial_position(mut self, position: usize) -> Self {
        self.initial_position = position;
        self
    }

    pub fn with_return_to_start(mut self, enabled: bool) -> Self {
        self.return_to_start = enabled;
        self
    }

    pub fn with_cloned_loop(mut self, enabled: bool) -> Self {
        self.cloned_loop = enabled;
        self
    }

    pub fn with_activation_delay(mut self, delay: Duration) -> Self {
        self.activation_delay = Some(delay);
        self
    }

    pub fn with_stagger(mut self, stagger: StaggerSpec) -> Self {
        self.stagger = Some(stagger);
        self
    }

    pub fn with_metrics(mut self, metrics: SlideMetrics) -> Self {
        self.metrics = metrics;
        self
    }
}

/// Read-only snapshot of a controller
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselContext {
    pub position: usize,
    pub slide_count: usize,
    pub policy: BoundaryPolicy,
    pub expanded: BTreeSet<usize>,
}

impl CarouselContext {
    /// 1-indexed position, as the stepper presents it
    pub fn display_number(&self) -> usize {
        self.position + 1
    }

    pub fn progress(&self) -> f32 {
        progress_ratio(self.position, self.slide_count)
    }

    pub fn is_last(&self) -> bool {
        self.position + 1 == self.slide_count
    }
}
