//! Pagination module
//!
//! # Overview
//!
//! Page-number pagination for a scroll-driven list. The state machine is a
//! pure function from `(state, event)` to `(state, effects)`; fetching pages
//! and appending markup are effects the controller executes.

mod machine;
mod types;

pub use machine::transition;
pub use types::{
    is_truthy, parse_int_prefix, parse_positive_int, Effect, Event, FetchOutcome, FetchResult,
    InitialState, PageRequest, Pager, PaginationState, Phase,
};
