//! Core functionality for the portfolio site
//!
//! This crate provides the carousel/stepper controller, its render passes
//! and the small services around it: deferred activation, autoplay, input
//! mapping and site configuration.

pub mod autoplay;
pub mod config;
pub mod error;
pub mod events;
pub mod input;
pub mod navigation;
pub mod schedule;
pub mod state;

// Re-export commonly used types
pub use config::{CarouselConfig, SiteConfig, SlideContent};
pub use error::{FolioError, Result};
pub use navigation::{
    BoundaryPolicy, CarouselContext, CarouselController, CarouselSpec, CarouselSubscriber,
    Direction, RenderPass, SlideIndicator, SlideMetrics,
};
pub use schedule::{ManualScheduler, Scheduler, TokioScheduler};
pub use state::{Carousel, PortfolioState, SiteSettings};
