//! Widget utilities for managing IDs
//!
//! Two carousels share one window, so animation and interaction IDs are
//! namespaced per carousel and per slide.

use egui::Id;
use std::fmt::Display;

/// Widget ID builder that ensures unique IDs by combining multiple components
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetId {
    components: Vec<String>,
}

impl WidgetId {
    /// Create a new widget ID builder
    pub fn new(base: impl Display) -> Self {
        Self {
            components: vec![base.to_string()],
        }
    }

    /// A nested ID with one more component
    pub fn child(&self, component: impl Display) -> Self {
        let mut components = self.components.clone();
        components.push(component.to_string());
        Self { components }
    }

    /// A nested ID for the `idx`-th item (useful in loops)
    pub fn index(&self, idx: usize) -> Self {
        self.child(format!("idx_{}", idx))
    }

    /// Build the final ID string
    pub fn build(&self) -> String {
        self.components.join("_")
    }

    /// Create an egui ID from this widget ID
    pub fn id(&self) -> Id {
        Id::new(self.build())
    }
}
