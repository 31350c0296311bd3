//! Scroll event loop
//!
//! Feeds scroll signals from a channel into a [`PaginationController`] while
//! page requests run on spawned tasks. Signals keep arriving during a fetch;
//! the controller's `loading` guard is what keeps them from starting a
//! second one.

use crate::container::Container;
use crate::controller::{fetch_page, FeedStats, PaginationController};
use crate::error::FailureKind;
use crate::pagination::{FetchOutcome, PageRequest};
use crate::scroll::ScrollMetrics;
use crate::source::FeedSource;
use crate::throttle::Clock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error};

type Settled = (PageRequest, FetchOutcome);

/// Run until the list is exhausted or the signal channel closes.
///
/// A request still in flight when the channel closes is awaited before
/// returning.
pub async fn run<S, C, K>(
    controller: &mut PaginationController<S, C, K>,
    signals: mpsc::Receiver<ScrollMetrics>,
) -> FeedStats
where
    S: FeedSource + 'static,
    C: Container,
    K: Clock,
{
    run_limited(controller, signals, RunLimits::default()).await
}

/// Caps on a driver run; `None` means unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLimits {
    /// Stop taking signals once this many pages have loaded
    pub max_pages: Option<u64>,
    /// Stop taking signals once this many requests have failed
    pub max_failures: Option<u64>,
}

impl RunLimits {
    fn reached(&self, stats: &FeedStats) -> bool {
        self.max_pages.is_some_and(|max| stats.pages_loaded >= max)
            || self.max_failures.is_some_and(|max| stats.failures >= max)
    }
}

/// Like [`run`], but also stops taking signals once a limit is reached
pub async fn run_limited<S, C, K>(
    controller: &mut PaginationController<S, C, K>,
    mut signals: mpsc::Receiver<ScrollMetrics>,
    limits: RunLimits,
) -> FeedStats
where
    S: FeedSource + 'static,
    C: Container,
    K: Clock,
{
    let source = controller.source();
    let mut tasks: JoinSet<Settled> = JoinSet::new();
    let mut pending: Option<PageRequest> = None;
    let mut signals_open = true;

    loop {
        let accepting =
            signals_open && controller.is_listening() && !limits.reached(controller.stats());
        if tasks.is_empty() && !accepting {
            break;
        }

        tokio::select! {
            Some(joined) = tasks.join_next() => {
                let (request, outcome) = match joined {
                    Ok(settled) => settled,
                    Err(e) => {
                        error!(error = %e, "page request task failed");
                        let Some(request) = pending else { continue };
                        (request, FetchOutcome::Failed(FailureKind::TransientNetwork))
                    }
                };
                pending = controller.complete(request, outcome);
                if let Some(next) = pending {
                    spawn_fetch(&mut tasks, &source, next);
                }
            }
            signal = signals.recv(), if accepting => {
                match signal {
                    Some(metrics) => {
                        if let Some(request) = controller.on_scroll_signal(&metrics) {
                            pending = Some(request);
                            spawn_fetch(&mut tasks, &source, request);
                        }
                    }
                    None => {
                        debug!("scroll signal channel closed");
                        signals_open = false;
                    }
                }
            }
            else => break,
        }
    }

    *controller.stats()
}

fn spawn_fetch<S: FeedSource + 'static>(
    tasks: &mut JoinSet<Settled>,
    source: &Arc<S>,
    request: PageRequest,
) {
    let source = Arc::clone(source);
    tasks.spawn(async move {
        let outcome = fetch_page(source.as_ref(), request).await;
        (request, outcome)
    });
}
