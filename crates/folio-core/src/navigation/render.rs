//! Render pass snapshots
//!
//! A render pass is a total function of position, expanded set and layout.
//! Adapters apply it to whatever presentation layer they drive.

use serde::{Serialize, Deserialize};
use std::collections::BTreeSet;

use super::{BoundaryPolicy, position::progress_ratio};

/// Gap between slides on the track, in pixels
pub const DEFAULT_SLIDE_GAP: f32 = 40.0;

/// Layout measurements used to compute the track offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideMetrics {
    pub width: f32,
    pub margin_right: f32,
    pub gap: f32,
}

impl Default for SlideMetrics {
    fn default() -> Self {
        Self {
            width: 320.0,
            margin_right: 0.0,
            gap: DEFAULT_SLIDE_GAP,
        }
    }
}

impl SlideMetrics {
    /// Distance between the left edges of two neighbouring slides
    pub fn pitch(&self) -> f32 {
        self.width + self.margin_right + self.gap
    }
}

/// Presentation state of one rendered slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlideIndicator {
    pub active: bool,
    /// Slot sits before the current position
    pub previous: bool,
    pub expanded: bool,
    /// Set for the duplicated slots of a cloned loop
    pub clone_of: Option<usize>,
}

/// Full indicator state produced after every position change
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    pub position: usize,
    pub slide_count: usize,
    pub slides: Vec<SlideIndicator>,
    pub progress: f32,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    pub return_to_start_visible: bool,
    /// Horizontal track translation in pixels
    pub track_offset: f32,
    pub animate: bool,
    /// Slot that turns active once the deferred activation fires
    pub pending_activation: Option<usize>,
}

pub(crate) struct RenderInput<'a> {
    pub position: usize,
    pub slide_count: usize,
    pub policy: BoundaryPolicy,
    pub expanded: &'a BTreeSet<usize>,
    pub metrics: SlideMetrics,
    pub return_to_start: bool,
    pub cloned_loop: bool,
    pub deferred_activation: bool,
}

impl RenderPass {
    pub(crate) fn compute(input: RenderInput<'_>, animate: bool) -> Self {
        let RenderInput {
            position,
            slide_count,
            policy,
            expanded,
            metrics,
            return_to_start,
            cloned_loop,
            deferred_activation,
        } = input;

        let defer = animate && deferred_activation;
        let rendered = if cloned_loop { slide_count * 2 } else { slide_count };

        let slides = (0..rendered)
            .map(|slot| {
                if slot < slide_count {
                    SlideIndicator {
                        active: slot == position && !defer,
                        previous: slot < position,
                        expanded: expanded.contains(&slot),
                        clone_of: None,
                    }
                } else {
                    let original = slot - slide_count;
                    SlideIndicator {
                        active: false,
                        previous: false,
                        expanded: expanded.contains(&original),
                        clone_of: Some(original),
                    }
                }
            })
            .collect();

        let edges = policy.disables_edges();

        Self {
            position,
            slide_count,
            slides,
            progress: progress_ratio(position, slide_count),
            prev_disabled: edges && position == 0,
            next_disabled: edges && position + 1 == slide_count,
            return_to_start_visible: return_to_start && position != 0,
            track_offset: -(position as f32) * metrics.pitch(),
            animate,
            pending_activation: defer.then_some(position),
        }
    }

    /// Mark a deferred slot active. Idempotent.
    pub fn activate(&mut self, slot: usize) {
        if self.position != slot {
            return;
        }
        if let Some(indicator) = self.slides.get_mut(slot) {
            indicator.active = true;
        }
        if self.pending_activation == Some(slot) {
            self.pending_activation = None;
        }
    }

    pub fn set_expanded(&mut self, slide: usize, expanded: bool) {
        for (slot, indicator) in self.slides.iter_mut().enumerate() {
            if slot == slide || indicator.clone_of == Some(slide) {
                indicator.expanded = expanded;
            }
        }
    }

    /// Index of the slot currently carrying the active indicator
    pub fn active_slot(&self) -> Option<usize> {
        self.slides.iter().position(|s| s.active)
    }
}
