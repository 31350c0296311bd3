//! Pagination state machine
//!
//! `Idle -> Loading` on a qualifying signal, `Loading -> Idle` on a page with
//! more to come or a transient failure, `Loading -> Exhausted` on the last
//! page or an empty response. `Exhausted` has no way out.

use super::types::{Effect, Event, FetchOutcome, PageRequest, PaginationState};
use crate::error::FailureKind;
use crate::types::{FallbackPolicy, FetchMode};

/// Apply one event to a state.
///
/// Pure: no I/O happens here. The returned effects are carried out by the
/// caller in order.
pub fn transition(
    state: PaginationState,
    event: Event,
    policy: FallbackPolicy,
) -> (PaginationState, Vec<Effect>) {
    match event {
        Event::ScrollSignal { near_bottom: false } => (state, Vec::new()),
        Event::ScrollSignal { near_bottom: true } | Event::RequestNextPage => begin(state),
        Event::Settled { request, outcome } => {
            if !state.awaits(&request) {
                return (state, Vec::new());
            }
            settle(state, request, outcome, policy)
        }
    }
}

fn begin(state: PaginationState) -> (PaginationState, Vec<Effect>) {
    if !state.can_request() {
        return (state, Vec::new());
    }

    let request = PageRequest::structured(state.next_page_number());
    let next = PaginationState {
        loading: true,
        ..state
    };
    (next, vec![Effect::Fetch(request)])
}

fn settle(
    state: PaginationState,
    request: PageRequest,
    outcome: FetchOutcome,
    policy: FallbackPolicy,
) -> (PaginationState, Vec<Effect>) {
    match outcome {
        FetchOutcome::Page(result) => {
            let mut effects = Vec::new();
            if let Some(html) = result.appendable_html() {
                effects.push(Effect::Append(html.to_string()));
            }

            let next = PaginationState {
                current_page: result.page.unwrap_or(request.page),
                has_next: result.has_next,
                loading: false,
            };
            if !next.has_next {
                effects.push(Effect::DetachListener);
            }
            (next, effects)
        }
        FetchOutcome::Markup(html) => {
            if html.trim().is_empty() {
                return exhaust(state);
            }
            // Markup says nothing about further pages; has_next is kept and
            // the following request decides.
            let next = PaginationState {
                current_page: request.page,
                loading: false,
                ..state
            };
            (next, vec![Effect::Append(html)])
        }
        FetchOutcome::Empty => exhaust(state),
        FetchOutcome::Failed(kind) => match (request.mode, policy, kind) {
            (FetchMode::Structured, FallbackPolicy::Markup, _) => {
                (state, vec![Effect::Fetch(PageRequest::markup(request.page))])
            }
            (FetchMode::Structured, FallbackPolicy::None, FailureKind::EmptyOrMalformed) => {
                exhaust(state)
            }
            _ => (
                PaginationState {
                    loading: false,
                    ..state
                },
                Vec::new(),
            ),
        },
    }
}

fn exhaust(state: PaginationState) -> (PaginationState, Vec<Effect>) {
    let next = PaginationState {
        has_next: false,
        loading: false,
        ..state
    };
    (next, vec![Effect::DetachListener])
}
