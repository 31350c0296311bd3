//! Pagination controller
//!
//! The shell around the pure state machine. It owns the pagination state,
//! the scroll throttle, the page source and the container, and it runs the
//! effects each transition asks for.
//!
//! # Overview
//!
//! - `on_scroll_signal` / `begin_request` / `complete` are synchronous and
//!   return the request to perform, so an event loop can keep delivering
//!   scroll signals while a fetch is in flight (see [`crate::driver`]).
//! - `request_next_page` / `handle_scroll` drive a request to completion for
//!   callers that just want to await it.
//!
//! Fetch failures never escape: they settle the request and are logged.

mod types;

pub use types::{ControllerConfig, FeedStats};

use crate::container::Container;
use crate::error::FailureKind;
use crate::pagination::{
    Effect, Event, FetchOutcome, PageRequest, Pager, PaginationState, Phase,
};
use crate::scroll::ScrollMetrics;
use crate::source::FeedSource;
use crate::throttle::{Clock, SystemClock, Throttle};
use crate::types::FetchMode;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Scroll-driven page loader for one list
pub struct PaginationController<S, C, K = SystemClock>
where
    S: FeedSource,
    C: Container,
    K: Clock,
{
    pager: Pager,
    throttle: Throttle<K>,
    threshold_px: f64,
    listening: bool,
    source: Arc<S>,
    container: C,
    stats: FeedStats,
}

impl<S: FeedSource, C: Container> PaginationController<S, C, SystemClock> {
    /// Create a controller on the system clock
    pub fn new(source: Arc<S>, container: C, config: &ControllerConfig) -> Self {
        Self::with_clock(source, container, config, SystemClock)
    }
}

impl<S: FeedSource, C: Container, K: Clock> PaginationController<S, C, K> {
    /// Create a controller whose throttle reads `clock`
    pub fn with_clock(source: Arc<S>, container: C, config: &ControllerConfig, clock: K) -> Self {
        let state = PaginationState::from(config.initial);
        Self {
            pager: Pager::new(state, config.fallback),
            throttle: Throttle::with_clock(config.throttle_interval, clock),
            threshold_px: config.threshold_px,
            // Nothing to listen for when the first render was the last page
            listening: state.has_next,
            source,
            container,
            stats: FeedStats::default(),
        }
    }

    /// Current pagination state
    pub fn state(&self) -> &PaginationState {
        self.pager.state()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.pager.state().phase()
    }

    /// Whether scroll signals are still observed
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Statistics so far
    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    /// Shared handle to the page source
    pub fn source(&self) -> Arc<S> {
        Arc::clone(&self.source)
    }

    /// The container pages are appended to
    pub fn container(&self) -> &C {
        &self.container
    }

    /// Mutable access to the container
    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    /// Consume the controller, returning the container
    pub fn into_container(self) -> C {
        self.container
    }

    /// React to a scroll position.
    ///
    /// Returns the request to perform when the signal passes the throttle,
    /// the preconditions and the near-bottom test. The state is already
    /// `Loading` at that point.
    pub fn on_scroll_signal(&mut self, metrics: &ScrollMetrics) -> Option<PageRequest> {
        if !self.listening {
            return None;
        }
        if !self.throttle.try_acquire() {
            trace!("scroll signal throttled");
            return None;
        }
        if !self.pager.state().can_request() {
            return None;
        }

        let near_bottom = metrics.is_near_bottom(self.threshold_px);
        self.dispatch(Event::ScrollSignal { near_bottom })
    }

    /// Start a request for the next page if none is outstanding
    pub fn begin_request(&mut self) -> Option<PageRequest> {
        self.dispatch(Event::RequestNextPage)
    }

    /// Apply the outcome of `request`.
    ///
    /// Returns a follow-up request when the fallback policy asks for one;
    /// the state stays `Loading` until that one settles too.
    pub fn complete(&mut self, request: PageRequest, outcome: FetchOutcome) -> Option<PageRequest> {
        if !self.pager.state().awaits(&request) {
            debug!(page = request.page, "ignoring completion for a request not in flight");
            return None;
        }

        let loaded = match &outcome {
            FetchOutcome::Page(result) => result.appendable_html().is_some() || result.has_next,
            FetchOutcome::Markup(html) => !html.trim().is_empty(),
            FetchOutcome::Empty | FetchOutcome::Failed(_) => false,
        };
        let failed = matches!(outcome, FetchOutcome::Failed(_));

        let next = self.dispatch(Event::Settled { request, outcome });

        if loaded {
            self.stats.pages_loaded += 1;
        }
        // A failure that hands over to the markup fallback has not settled yet
        if failed && next.is_none() {
            self.stats.failures += 1;
        }
        next
    }

    /// Request the next page and wait until it settles
    pub async fn request_next_page(&mut self) -> Phase {
        let request = self.begin_request();
        self.drive(request).await
    }

    /// React to a scroll position and wait for any request it starts
    pub async fn handle_scroll(&mut self, metrics: &ScrollMetrics) -> Phase {
        let request = self.on_scroll_signal(metrics);
        self.drive(request).await
    }

    async fn drive(&mut self, mut request: Option<PageRequest>) -> Phase {
        while let Some(current) = request {
            let outcome = fetch_page(self.source.as_ref(), current).await;
            request = self.complete(current, outcome);
        }
        self.phase()
    }

    fn dispatch(&mut self, event: Event) -> Option<PageRequest> {
        let mut next = None;

        for effect in self.pager.apply(event) {
            match effect {
                Effect::Fetch(request) => {
                    match request.mode {
                        FetchMode::Structured => {
                            self.stats.requests += 1;
                            info!(page = request.page, "requesting page");
                        }
                        FetchMode::Markup => {
                            self.stats.fallback_requests += 1;
                            warn!(
                                page = request.page,
                                "structured request failed, falling back to markup"
                            );
                        }
                    }
                    next = Some(request);
                }
                Effect::Append(html) => match self.container.append(&html) {
                    Ok(()) => {
                        self.stats.fragments_appended += 1;
                        self.stats.bytes_appended += html.len() as u64;
                    }
                    Err(e) => {
                        self.stats.failures += 1;
                        error!(error = %e, "failed to append page markup");
                    }
                },
                Effect::DetachListener => {
                    self.listening = false;
                    info!(page = self.pager.state().current_page, "no more pages");
                }
            }
        }

        next
    }
}

impl<S, C, K> std::fmt::Debug for PaginationController<S, C, K>
where
    S: FeedSource,
    C: Container,
    K: Clock,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationController")
            .field("state", self.pager.state())
            .field("policy", &self.pager.policy())
            .field("listening", &self.listening)
            .field("threshold_px", &self.threshold_px)
            .field("throttle_interval", &self.throttle.interval())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// Perform one page request against a source.
///
/// Never fails: errors are logged and folded into [`FetchOutcome::Failed`].
pub async fn fetch_page<S: FeedSource + ?Sized>(source: &S, request: PageRequest) -> FetchOutcome {
    let page = request.page;
    match request.mode {
        FetchMode::Structured => match source.fetch_structured(page).await {
            Ok(Some(result)) => FetchOutcome::Page(result),
            Ok(None) => {
                warn!(page, "empty response");
                FetchOutcome::Empty
            }
            Err(e) => failed(page, request.mode, &e),
        },
        FetchMode::Markup => match source.fetch_markup(page).await {
            Ok(Some(html)) => FetchOutcome::Markup(html),
            Ok(None) => {
                warn!(page, "empty markup response");
                FetchOutcome::Empty
            }
            Err(e) => failed(page, request.mode, &e),
        },
    }
}

fn failed(page: u32, mode: FetchMode, e: &crate::Error) -> FetchOutcome {
    let kind = e.failure_kind();
    match kind {
        FailureKind::TransientNetwork => {
            error!(page, %mode, error = %e, "page request failed");
        }
        FailureKind::EmptyOrMalformed => {
            warn!(page, %mode, error = %e, "malformed page response");
        }
    }
    FetchOutcome::Failed(kind)
}
