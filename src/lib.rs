// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # scroll-pager
//!
//! Scroll-driven pagination for server-rendered lists. When the reader nears
//! the bottom of the document, the next page is requested and its markup is
//! appended to the list, until the server reports there is nothing left.
//!
//! ## Features
//!
//! - **Throttled scroll handling**: leading-edge throttle over an injectable clock
//! - **Single request in flight**: a `loading` guard drops signals during a fetch
//! - **Structured responses**: `{ html, has_next, page }` JSON with a markup fallback
//! - **Pure core**: every state change is a `transition(state, event)` call
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scroll_pager::{ControllerConfig, HtmlBuffer, HttpClient, HttpFeedSource};
//! use scroll_pager::{PaginationController, ScrollMetrics};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> scroll_pager::Result<()> {
//!     let source = HttpFeedSource::new(HttpClient::new()?, "https://board.example.com/posts/")?;
//!     let mut controller =
//!         PaginationController::new(Arc::new(source), HtmlBuffer::new(), &ControllerConfig::new());
//!
//!     let phase = controller.handle_scroll(&ScrollMetrics::at_bottom(800.0, 2400.0)).await;
//!     println!("{phase}: {}", controller.container().html());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐  ScrollMetrics   ┌──────────────────────┐  FeedSource  ┌────────────┐
//! │ scroll signal │ ───────────────▶ │ PaginationController │ ───────────▶ │ HTTP / mock│
//! └───────────────┘   (driver)       │  Throttle + Pager    │              └────────────┘
//!                                    └──────────┬───────────┘
//!                                               │ Append
//!                                               ▼
//!                                        ┌─────────────┐
//!                                        │  Container  │
//!                                        └─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Pagination state machine
pub mod pagination;

/// Leading-edge throttle and clocks
pub mod throttle;

/// Scroll geometry
pub mod scroll;

/// Append targets for page markup
pub mod container;

/// HTTP client with rate limiting
pub mod http;

/// Page sources
pub mod source;

/// Pagination controller
pub mod controller;

/// Scroll event loop
pub mod driver;

/// Feed configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, FailureKind, Result};
pub use types::*;

// Re-export commonly used types
pub use config::FeedConfig;
pub use container::{Container, HtmlBuffer, WriterContainer};
pub use controller::{ControllerConfig, FeedStats, PaginationController};
pub use http::{HttpClient, HttpClientConfig};
pub use pagination::{FetchResult, InitialState, PaginationState, Phase};
pub use scroll::ScrollMetrics;
pub use source::{FeedSource, HttpFeedSource};
pub use throttle::{Clock, ManualClock, SystemClock, Throttle};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
