//! Input abstraction layer.
//!
//! Translates raw key presses and swipe gestures into carousel commands.
//! Adapters feed these from whatever event source they own.

use serde::{Serialize, Deserialize};

use crate::navigation::Direction;

/// Minimum horizontal travel, in pixels, for a swipe to count
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 50.0;

/// Keys the carousels react to
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Space,
    /// A digit key, `0..=9`
    Digit(u8),
}

/// A key press and where it landed
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyPress {
    pub key: Key,
    /// Focus was inside a text field
    pub in_text_input: bool,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self { key, in_text_input: false }
    }
}

/// Logical actions consumed by a carousel
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NavCommand {
    Step(Direction),
    GoTo(usize),
    ToggleAutoplay,
}

/// Which optional keys a carousel variant listens to
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    /// Digits `1..=N` jump to the matching slide
    pub digit_keys: bool,
    /// Space toggles autoplay
    pub autoplay_key: bool,
}

impl KeyBindings {
    /// Map a key press to a command, if this variant handles it
    pub fn command_for(&self, press: KeyPress, slide_count: usize) -> Option<NavCommand> {
        if press.in_text_input {
            return None;
        }

        match press.key {
            Key::ArrowLeft => Some(NavCommand::Step(Direction::Previous)),
            Key::ArrowRight => Some(NavCommand::Step(Direction::Next)),
            Key::Space if self.autoplay_key => Some(NavCommand::ToggleAutoplay),
            Key::Digit(digit) if self.digit_keys => {
                let number = usize::from(digit);
                (1..=slide_count).contains(&number).then(|| NavCommand::GoTo(number - 1))
            }
            _ => None,
        }
    }
}

/// Tracks one touch or drag gesture
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwipeTracker {
    threshold: f32,
    start_x: Option<f32>,
}

impl Default for SwipeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

impl SwipeTracker {
    pub fn new(threshold: f32) -> Self {
        Self { threshold, start_x: None }
    }

    pub fn begin(&mut self, x: f32) {
        self.start_x = Some(x);
    }

    pub fn is_tracking(&self) -> bool {
        self.start_x.is_some()
    }

    pub fn cancel(&mut self) {
        self.start_x = None;
    }

    /// Finish the gesture. Leftward travel past the threshold means next.
    pub fn finish(&mut self, end_x: f32) -> Option<Direction> {
        let start = self.start_x.take()?;
        let travel = start - end_x;

        if travel.abs() < self.threshold {
            return None;
        }
        Some(if travel > 0.0 { Direction::Next } else { Direction::Previous })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrows_always_step() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.command_for(KeyPress::new(Key::ArrowLeft), 3),
            Some(NavCommand::Step(Direction::Previous))
        );
        assert_eq!(
            bindings.command_for(KeyPress::new(Key::ArrowRight), 3),
            Some(NavCommand::Step(Direction::Next))
        );
    }

    #[test]
    fn test_text_input_swallows_keys() {
        let bindings = KeyBindings { digit_keys: true, autoplay_key: true };
        let press = KeyPress { key: Key::ArrowRight, in_text_input: true };
        assert_eq!(bindings.command_for(press, 3), None);
    }

    #[test]
    fn test_digits_map_to_one_indexed_slides() {
        let bindings = KeyBindings { digit_keys: true, autoplay_key: false };
        assert_eq!(bindings.command_for(KeyPress::new(Key::Digit(1)), 3), Some(NavCommand::GoTo(0)));
        assert_eq!(bindings.command_for(KeyPress::new(Key::Digit(3)), 3), Some(NavCommand::GoTo(2)));
        assert_eq!(bindings.command_for(KeyPress::new(Key::Digit(4)), 3), None);
        assert_eq!(bindings.command_for(KeyPress::new(Key::Digit(0)), 3), None);
    }

    #[test]
    fn test_optional_keys_ignored_when_unbound() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.command_for(KeyPress::new(Key::Digit(1)), 3), None);
        assert_eq!(bindings.command_for(KeyPress::new(Key::Space), 3), None);

        let bindings = KeyBindings { digit_keys: false, autoplay_key: true };
        assert_eq!(bindings.command_for(KeyPress::new(Key::Space), 3), Some(NavCommand::ToggleAutoplay));
    }

    #[test]
    fn test_swipe_threshold() {
        let mut swipe = SwipeTracker::default();

        swipe.begin(200.0);
        assert_eq!(swipe.finish(151.0), None);

        swipe.begin(200.0);
        assert_eq!(swipe.finish(150.0), Some(Direction::Next));

        swipe.begin(100.0);
        assert_eq!(swipe.finish(180.0), Some(Direction::Previous));
    }

    #[test]
    fn test_finish_without_begin() {
        let mut swipe = SwipeTracker::default();
        assert_eq!(swipe.finish(0.0), None);

        swipe.begin(10.0);
        swipe.cancel();
        assert!(!swipe.is_tracking());
        assert_eq!(swipe.finish(500.0), None);
    }
}
