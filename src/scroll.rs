//! Scroll position signals

use serde::{Deserialize, Serialize};

/// Default distance from the document bottom, in pixels, at which the next
/// page is requested
pub const DEFAULT_THRESHOLD_PX: f64 = 150.0;

/// Snapshot of the viewport against the document
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    /// Distance scrolled from the top of the document
    pub scroll_top: f64,
    /// Height of the visible viewport
    pub viewport_height: f64,
    /// Full height of the document
    pub document_height: f64,
}

impl ScrollMetrics {
    /// Create a snapshot
    pub fn new(scroll_top: f64, viewport_height: f64, document_height: f64) -> Self {
        Self {
            scroll_top,
            viewport_height,
            document_height,
        }
    }

    /// Snapshot with the viewport resting on the document bottom
    pub fn at_bottom(viewport_height: f64, document_height: f64) -> Self {
        Self::new(
            (document_height - viewport_height).max(0.0),
            viewport_height,
            document_height,
        )
    }

    /// Pixels between the viewport's bottom edge and the document's
    pub fn distance_to_bottom(&self) -> f64 {
        self.document_height - (self.scroll_top + self.viewport_height)
    }

    /// Whether the viewport bottom is within `threshold` pixels of the
    /// document bottom
    pub fn is_near_bottom(&self, threshold: f64) -> bool {
        self.scroll_top + self.viewport_height >= self.document_height - threshold
    }
}
