//! CLI commands and argument parsing

use crate::types::FallbackPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Scroll-driven pagination client for server-rendered lists
#[derive(Parser, Debug)]
#[command(name = "scroll-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Feed configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// List page URL, overrides the config file
    #[arg(short, long, global = true)]
    pub endpoint: Option<String>,

    /// Fallback policy, overrides the config file
    #[arg(long, global = true)]
    pub fallback: Option<FallbackPolicy>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Request a single page and print the decoded response
    Fetch {
        /// Page number to request
        #[arg(short, long, default_value = "2")]
        page: u32,

        /// Request markup instead of the structured response
        #[arg(long)]
        markup: bool,
    },

    /// Scroll to the bottom repeatedly until the list is exhausted
    Drain {
        /// Write appended markup to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u64>,
    },

    /// Validate the feed configuration
    Validate,
}

/// Output format for status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
