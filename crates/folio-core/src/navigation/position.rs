use serde::{Serialize, Deserialize};

/// Direction of a single navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    /// Signed index delta for this direction
    pub fn delta(self) -> i128 {
        match self {
            Direction::Previous => -1,
            Direction::Next => 1,
        }
    }
}

/// Fraction of the sequence covered up to and including `position`
pub fn progress_ratio(position: usize, slide_count: usize) -> f32 {
    if slide_count == 0 {
        return 0.0;
    }
    (position + 1) as f32 / slide_count as f32
}
