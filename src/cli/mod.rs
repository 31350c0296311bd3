//! CLI module
//!
//! Command-line interface for driving a feed.
//!
//! # Commands
//!
//! - `fetch` - Request a single page and print the decoded response
//! - `drain` - Scroll until the list is exhausted, writing appended markup
//! - `validate` - Check the feed configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
