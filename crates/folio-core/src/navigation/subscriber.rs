//! Carousel subscriber trait

use super::RenderPass;

/// Trait for components that mirror carousel state
pub trait CarouselSubscriber: Send + Sync {
    /// Called after every render pass
    fn on_render(&self, pass: &RenderPass);

    /// Called when a deferred activation fires for `slot`
    fn on_activate(&self, _slot: usize) {}

    /// Called when an auxiliary card should restart its animation
    fn on_stagger(&self, _card: usize) {}

    /// Called when a slide's expand flag flips
    fn on_expansion_change(&self, _slide: usize, _expanded: bool) {}
}
