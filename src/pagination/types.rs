//! Pagination types
//!
//! State, events and effects shared by the transition function and the
//! controller shell.

use crate::error::{Error, FailureKind, Result};
use crate::types::{FallbackPolicy, FetchMode, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

// ============================================================================
// State
// ============================================================================

/// Lifecycle phase derived from [`PaginationState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a qualifying scroll signal
    Idle,
    /// A request is outstanding
    Loading,
    /// The server reported no more pages. Terminal.
    Exhausted,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Tracks pagination progress for one list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    /// Last page loaded into the container
    pub current_page: u32,
    /// Whether the server reported more content
    pub has_next: bool,
    /// True exactly while a request is outstanding
    pub loading: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(1, true)
    }
}

impl PaginationState {
    /// Create an idle state. Page numbers start at 1.
    pub fn new(current_page: u32, has_next: bool) -> Self {
        Self {
            current_page: current_page.max(1),
            has_next,
            loading: false,
        }
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.has_next {
            Phase::Idle
        } else {
            Phase::Exhausted
        }
    }

    /// Whether a new request may start
    pub fn can_request(&self) -> bool {
        !self.loading && self.has_next
    }

    /// Page number the next request asks for
    pub fn next_page_number(&self) -> u32 {
        self.current_page.saturating_add(1)
    }

    /// Whether `request` is the one currently outstanding
    pub fn awaits(&self, request: &PageRequest) -> bool {
        self.loading && request.page == self.next_page_number()
    }
}

impl From<InitialState> for PaginationState {
    fn from(initial: InitialState) -> Self {
        Self::new(initial.page, initial.has_next)
    }
}

/// Starting point read from the page's bootstrap attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialState {
    /// Page already rendered on the document
    #[serde(default = "default_page")]
    pub page: u32,
    /// Whether the server rendered a "more pages" hint
    #[serde(default = "default_has_next")]
    pub has_next: bool,
}

fn default_page() -> u32 {
    1
}

fn default_has_next() -> bool {
    true
}

impl Default for InitialState {
    fn default() -> Self {
        Self {
            page: default_page(),
            has_next: default_has_next(),
        }
    }
}

impl InitialState {
    /// Build from `data-page` / `data-has-next` attribute values.
    ///
    /// An unparseable or missing page falls back to 1. A missing `has-next`
    /// attribute means more pages are assumed; a present one is true only
    /// for `1` or `true`.
    pub fn from_attributes(page: Option<&str>, has_next: Option<&str>) -> Self {
        let page = page.and_then(parse_int_prefix).unwrap_or(1);
        let has_next = has_next.map_or(true, |raw| {
            matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true")
        });
        Self { page, has_next }
    }
}

// ============================================================================
// Requests and Responses
// ============================================================================

/// A single page request issued by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number sent as the query parameter
    pub page: u32,
    /// Response shape asked for
    pub mode: FetchMode,
}

impl PageRequest {
    /// Request a page as JSON
    pub fn structured(page: u32) -> Self {
        Self {
            page,
            mode: FetchMode::Structured,
        }
    }

    /// Request a page as plain markup
    pub fn markup(page: u32) -> Self {
        Self {
            page,
            mode: FetchMode::Markup,
        }
    }
}

/// Decoded structured page response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FetchResult {
    /// Markup fragment to append, if any
    pub html: Option<String>,
    /// Whether more pages exist
    pub has_next: bool,
    /// Page number the server says it served
    pub page: Option<u32>,
    /// Next page number the server advertises
    pub next_page: Option<u32>,
}

impl FetchResult {
    /// Create a result with markup and a `has_next` flag
    pub fn new(html: impl Into<String>, has_next: bool) -> Self {
        Self {
            html: Some(html.into()),
            has_next,
            page: None,
            next_page: None,
        }
    }

    /// Set the server-reported page
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Decode a response body.
    ///
    /// Returns `Ok(None)` for an empty body or a JSON `null`, and an error
    /// when the body is not a JSON object.
    pub fn from_body(body: &str) -> Result<Option<Self>> {
        if body.trim().is_empty() {
            return Ok(None);
        }

        let value: JsonValue = serde_json::from_str(body)?;
        match value {
            JsonValue::Null => Ok(None),
            JsonValue::Object(map) => Ok(Some(Self::from_object(&map))),
            other => Err(Error::malformed(format!(
                "expected a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Decode from a JSON object, coercing loosely typed fields
    pub fn from_object(map: &JsonObject) -> Self {
        let html = map
            .get("html")
            .and_then(JsonValue::as_str)
            .map(String::from);
        let page = map.get("page").and_then(parse_positive_int);
        let next_page = map.get("next_page").and_then(parse_positive_int);

        // `next_page` only speaks when `has_next` is absent
        let has_next = match map.get("has_next") {
            Some(value) => is_truthy(value),
            None => next_page.is_some(),
        };

        Self {
            html,
            has_next,
            page,
            next_page,
        }
    }

    /// Markup worth appending: present and not blank
    pub fn appendable_html(&self) -> Option<&str> {
        self.html.as_deref().filter(|html| !html.trim().is_empty())
    }
}

/// How a request settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Structured response with a body
    Page(FetchResult),
    /// Markup fallback response
    Markup(String),
    /// Response succeeded without a usable body
    Empty,
    /// Request failed
    Failed(FailureKind),
}

// ============================================================================
// State Machine
// ============================================================================

/// Input to the transition function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Throttled scroll signal; `near_bottom` is the trigger test result
    ScrollSignal {
        /// Whether the viewport reached the load threshold
        near_bottom: bool,
    },
    /// Direct request for the next page
    RequestNextPage,
    /// A request issued earlier settled
    Settled {
        /// The request that settled
        request: PageRequest,
        /// Its outcome
        outcome: FetchOutcome,
    },
}

/// Side effect the shell must carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue a request
    Fetch(PageRequest),
    /// Append markup to the end of the container
    Append(String),
    /// Stop observing scroll signals, permanently
    DetachListener,
}

/// Pagination state paired with its fallback policy
#[derive(Debug, Clone, Default)]
pub struct Pager {
    state: PaginationState,
    policy: FallbackPolicy,
}

impl Pager {
    /// Create a pager
    pub fn new(state: PaginationState, policy: FallbackPolicy) -> Self {
        Self { state, policy }
    }

    /// Current state
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Fallback policy
    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Feed an event, keep the new state and return the effects
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        let (state, effects) = super::machine::transition(self.state, event, self.policy);
        self.state = state;
        effects
    }
}

// ============================================================================
// Coercion helpers
// ============================================================================

/// JSON truthiness: `false`, `0`, `""` and `null` are falsy
pub fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Positive page number from a JSON number or numeric string
pub fn parse_positive_int(value: &JsonValue) -> Option<u32> {
    match value {
        JsonValue::Number(n) => {
            if let Some(v) = n.as_u64() {
                u32::try_from(v).ok().filter(|v| *v > 0)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 1.0 && *f <= f64::from(u32::MAX))
                    .map(|f| f.trunc() as u32)
            }
        }
        JsonValue::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

/// Leading integer of a string, `parseInt` style. Zero and negatives yield `None`.
pub fn parse_int_prefix(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let digits_start = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if digits_start.starts_with('-') {
        return None;
    }

    let end = digits_start
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits_start.len());
    digits_start[..end].parse::<u32>().ok().filter(|v| *v > 0)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
