//! Controller configuration and statistics

use crate::pagination::InitialState;
use crate::scroll::DEFAULT_THRESHOLD_PX;
use crate::throttle::DEFAULT_THROTTLE_INTERVAL;
use crate::types::FallbackPolicy;
use serde::Serialize;
use std::time::Duration;

/// Settings for a [`super::PaginationController`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    /// Distance from the document bottom that triggers a load
    pub threshold_px: f64,
    /// Minimum spacing between evaluated scroll signals
    pub throttle_interval: Duration,
    /// Reaction to a failed structured request
    pub fallback: FallbackPolicy,
    /// Starting pagination state
    pub initial: InitialState,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            threshold_px: DEFAULT_THRESHOLD_PX,
            throttle_interval: DEFAULT_THROTTLE_INTERVAL,
            fallback: FallbackPolicy::None,
            initial: InitialState::default(),
        }
    }
}

impl ControllerConfig {
    /// Create a config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trigger threshold
    #[must_use]
    pub fn threshold(mut self, px: f64) -> Self {
        self.threshold_px = px;
        self
    }

    /// Set the throttle interval
    #[must_use]
    pub fn throttle(mut self, interval: Duration) -> Self {
        self.throttle_interval = interval;
        self
    }

    /// Set the fallback policy
    #[must_use]
    pub fn fallback(mut self, policy: FallbackPolicy) -> Self {
        self.fallback = policy;
        self
    }

    /// Set the starting page and `has_next` flag
    #[must_use]
    pub fn initial(mut self, page: u32, has_next: bool) -> Self {
        self.initial = InitialState { page, has_next };
        self
    }
}

/// Counters kept while a feed runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    /// Structured requests issued
    pub requests: u64,
    /// Markup fallback requests issued
    pub fallback_requests: u64,
    /// Responses accepted as a loaded page
    pub pages_loaded: u64,
    /// Fragments appended to the container
    pub fragments_appended: u64,
    /// Bytes of markup appended
    pub bytes_appended: u64,
    /// Requests that settled as failed, and failed appends. A structured
    /// failure rescued by the markup fallback is not counted.
    pub failures: u64,
}

impl FeedStats {
    /// Total requests of either kind
    pub fn total_requests(&self) -> u64 {
        self.requests + self.fallback_requests
    }
}
