//! Site configuration
//!
//! Describes both carousels on the page: their content, boundary policy and
//! the optional affordances each variant shows. Every field has a default,
//! so a partial JSON file is enough.

use std::path::Path;
use std::time::Duration;
use serde::{Serialize, Deserialize};
use tracing::info;

use crate::autoplay::{Autoplay, DEFAULT_AUTOPLAY_INTERVAL};
use crate::error::{FolioError, Result};
use crate::input::{KeyBindings, DEFAULT_SWIPE_THRESHOLD};
use crate::navigation::{BoundaryPolicy, CarouselSpec, SlideMetrics, StaggerSpec};

/// Content of one slide
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideContent {
    /// Short label used on dots and year indicators
    pub label: String,
    pub title: String,
    pub body: String,
    /// Lines revealed by the expand toggle
    pub details: Vec<String>,
}

impl SlideContent {
    fn new(label: &str, title: &str, body: &str, details: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            details: details.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Staggered restart of auxiliary cards, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaggerConfig {
    pub count: usize,
    pub base_delay_ms: u64,
    pub step_delay_ms: u64,
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            count: 3,
            base_delay_ms: 50,
            step_delay_ms: 100,
        }
    }
}

/// Configuration for one carousel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub name: String,
    pub policy: BoundaryPolicy,
    pub initial_position: usize,
    pub return_to_start: bool,
    pub cloned_loop: bool,
    /// Delay before an animated step marks its target active
    pub activation_delay_ms: Option<u64>,
    pub stagger: Option<StaggerConfig>,
    /// Autoplay interval; `None` means the variant has no autoplay
    pub autoplay_interval_ms: Option<u64>,
    pub keys: KeyBindings,
    pub swipe_threshold_px: f32,
    pub metrics: SlideMetrics,
    pub slides: Vec<SlideContent>,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            name: "carousel".to_string(),
            policy: BoundaryPolicy::Clamped,
            initial_position: 0,
            return_to_start: false,
            cloned_loop: false,
            activation_delay_ms: None,
            stagger: None,
            autoplay_interval_ms: None,
            keys: KeyBindings::default(),
            swipe_threshold_px: DEFAULT_SWIPE_THRESHOLD,
            metrics: SlideMetrics::default(),
            slides: Vec::new(),
        }
    }
}

impl CarouselConfig {
    /// Horizontal timeline of career entries
    pub fn timeline() -> Self {
        Self {
            name: "timeline".to_string(),
            policy: BoundaryPolicy::WrapAround,
            return_to_start: true,
            cloned_loop: true,
            autoplay_interval_ms: Some(DEFAULT_AUTOPLAY_INTERVAL.as_millis() as u64),
            keys: KeyBindings { digit_keys: false, autoplay_key: true },
            slides: vec![
                SlideContent::new("2017", "Computer Science, B.Sc.", "Systems, compilers and distributed computing.", &["Thesis on incremental parsing", "Teaching assistant, operating systems"]),
                SlideContent::new("2019", "Backend Engineer", "Payment APIs and reconciliation jobs.", &["Cut settlement latency from hours to minutes", "On-call rotation lead"]),
                SlideContent::new("2021", "Senior Engineer", "Receipt ingestion and fraud checks.", &["Designed the receipt validation pipeline", "Mentored four engineers"]),
                SlideContent::new("2023", "Staff Engineer", "Platform reliability and tooling.", &["Migrated services to a shared runtime", "Led the observability working group"]),
            ],
            ..Self::default()
        }
    }

    /// Phone-screen stepper of the receipt validation demo
    pub fn receipt_stepper() -> Self {
        Self {
            name: "receipt".to_string(),
            policy: BoundaryPolicy::Clamped,
            activation_delay_ms: Some(50),
            stagger: Some(StaggerConfig::default()),
            keys: KeyBindings { digit_keys: true, autoplay_key: false },
            slides: vec![
                SlideContent::new("1", "Capture", "Photograph the receipt.", &["Edges detected on device"]),
                SlideContent::new("2", "Review", "Confirm merchant, date and total.", &["Fields pre-filled from OCR"]),
                SlideContent::new("3", "Submit", "Send the receipt for validation.", &["Duplicate check runs server side"]),
            ],
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.slides.is_empty() {
            return Err(FolioError::InvalidConfiguration(format!(
                "carousel '{}' has no slides",
                self.name
            )));
        }
        if self.initial_position >= self.slides.len() {
            return Err(FolioError::InvalidConfiguration(format!(
                "carousel '{}' initial position {} out of bounds (max: {})",
                self.name,
                self.initial_position,
                self.slides.len() - 1
            )));
        }
        if self.autoplay_interval_ms == Some(0) {
            return Err(FolioError::InvalidConfiguration(format!(
                "carousel '{}' autoplay interval must be greater than zero",
                self.name
            )));
        }
        if self.swipe_threshold_px.is_nan() || self.swipe_threshold_px <= 0.0 {
            return Err(FolioError::InvalidConfiguration(format!(
                "carousel '{}' swipe threshold must be positive",
                self.name
            )));
        }
        Ok(())
    }

    /// Controller spec for this carousel
    pub fn to_spec(&self) -> CarouselSpec {
        let mut spec = CarouselSpec::new(self.name.clone(), self.slides.len(), self.policy)
            .with_initial_position(self.initial_position)
            .with_return_to_start(self.return_to_start)
            .with_cloned_loop(self.cloned_loop)
            .with_metrics(self.metrics);

        if let Some(delay) = self.activation_delay_ms {
            spec = spec.with_activation_delay(Duration::from_millis(delay));
        }
        if let Some(stagger) = self.stagger {
            spec = spec.with_stagger(StaggerSpec {
                count: stagger.count,
                base_delay: Duration::from_millis(stagger.base_delay_ms),
                step_delay: Duration::from_millis(stagger.step_delay_ms),
            });
        }
        spec
    }

    /// Autoplay state for variants that define one
    pub fn autoplay(&self) -> Result<Option<Autoplay>> {
        self.autoplay_interval_ms
            .map(|ms| Autoplay::new(Duration::from_millis(ms)))
            .transpose()
    }
}

/// Configuration for the whole page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub timeline: CarouselConfig,
    pub stepper: CarouselConfig,
    /// Theme at startup. Never written back.
    pub dark_mode: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            timeline: CarouselConfig::timeline(),
            stepper: CarouselConfig::receipt_stepper(),
            dark_mode: true,
        }
    }
}

impl SiteConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SiteConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        info!(path = %path.display(), "loaded site configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.timeline.validate()?;
        self.stepper.validate()
    }
}
