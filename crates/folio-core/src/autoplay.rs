//! Timed advancement through a carousel
//!
//! The caller supplies the clock, so the same type drives a UI frame loop
//! and deterministic tests.

use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{FolioError, Result};
use crate::navigation::{CarouselController, Direction};

/// Default time each slide stays on screen
pub const DEFAULT_AUTOPLAY_INTERVAL: Duration = Duration::from_millis(4000);

/// Playback state for one carousel
#[derive(Debug, Clone)]
pub struct Autoplay {
    interval: Duration,
    playing: bool,
    last_advance: Option<Instant>,
}

impl Autoplay {
    pub fn new(interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(FolioError::InvalidConfiguration(
                "autoplay interval must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            interval,
            playing: false,
            last_advance: None,
        })
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Flip playback. Returns the new state.
    pub fn toggle(&mut self, now: Instant) -> bool {
        if self.playing {
            self.stop();
        } else {
            self.start(now);
        }
        self.playing
    }

    pub fn start(&mut self, now: Instant) {
        self.playing = true;
        self.last_advance = Some(now);
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.last_advance = None;
    }

    /// Time until the next advance, if playing
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        let last = self.last_advance?;
        Some((last + self.interval).saturating_duration_since(now))
    }

    /// Advance `controller` once if an interval has elapsed.
    ///
    /// At most one advance per poll. A caller that fell more than one
    /// interval behind is re-anchored to `now` instead of catching up.
    /// Returns the number of advances performed.
    pub fn poll(&mut self, now: Instant, controller: &CarouselController) -> usize {
        if !self.playing {
            return 0;
        }
        let Some(last) = self.last_advance else {
            return 0;
        };
        if now.saturating_duration_since(last) < self.interval {
            return 0;
        }

        let due = last + self.interval;
        self.last_advance = if now.saturating_duration_since(due) < self.interval {
            Some(due)
        } else {
            debug!(carousel = %controller.name(), "autoplay fell behind, re-anchoring");
            Some(now)
        };
        advance_or_restart(controller);
        1
    }
}

/// Step forward, or jump back to the first slide from the last one
pub fn advance_or_restart(controller: &CarouselController) {
    let context = controller.context();
    if context.is_last() {
        debug!(carousel = %controller.name(), "autoplay looping to start");
        controller.go_to(0, true);
    } else {
        controller.step(Direction::Next, true);
    }
}
