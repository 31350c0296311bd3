//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::FeedConfig;
use crate::container::WriterContainer;
use crate::controller::{FeedStats, PaginationController};
use crate::driver::{self, RunLimits};
use crate::error::{Error, Result};
use crate::pagination::Phase;
use crate::scroll::ScrollMetrics;
use crate::source::FeedSource;
use serde_json::{json, Value};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Viewport used for synthetic scroll signals
const VIEWPORT_HEIGHT: f64 = 800.0;

/// Document height used for synthetic scroll signals
const DOCUMENT_HEIGHT: f64 = 4000.0;

/// Failed requests tolerated by `drain` before giving up
const DRAIN_MAX_FAILURES: u64 = 3;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch { page, markup } => self.fetch(*page, *markup).await,
            Commands::Drain { output, max_pages } => {
                self.drain(output.as_deref(), *max_pages).await
            }
            Commands::Validate => self.validate(),
        }
    }

    /// Load the feed configuration, applying command-line overrides
    pub fn load_config(&self) -> Result<FeedConfig> {
        let mut config = match (&self.cli.config, &self.cli.endpoint) {
            (Some(path), _) => FeedConfig::from_file(path)?,
            (None, Some(endpoint)) => FeedConfig::new(endpoint.clone()),
            (None, None) => {
                return Err(Error::config(
                    "No feed specified (use --config or --endpoint)",
                ))
            }
        };

        if let Some(endpoint) = &self.cli.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        if let Some(policy) = self.cli.fallback {
            config.fallback = policy;
        }

        config.validate()?;
        Ok(config)
    }

    /// Request one page and print what came back
    async fn fetch(&self, page: u32, markup: bool) -> Result<()> {
        let config = self.load_config()?;
        let source = config.build_source()?;
        let url = source.page_url(page);

        let start = Instant::now();
        let result = if markup {
            serde_json::to_value(source.fetch_markup(page).await?)?
        } else {
            serde_json::to_value(source.fetch_structured(page).await?)?
        };

        self.output_message(&json!({
            "type": "PAGE",
            "page": {
                "number": page,
                "url": url.as_str(),
                "mode": if markup { "markup" } else { "structured" },
                "duration_ms": start.elapsed().as_millis() as u64,
                "result": result
            }
        }));

        Ok(())
    }

    /// Feed bottom-of-page signals through the controller until the list
    /// runs out
    async fn drain(&self, output: Option<&Path>, max_pages: Option<u64>) -> Result<()> {
        let config = self.load_config()?;
        let source = Arc::new(config.build_source()?);
        let controller_config = config.controller_config();

        let writer: Box<dyn Write + Send> = match output {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(io::stdout()),
        };
        let mut controller =
            PaginationController::new(source, WriterContainer::new(writer), &controller_config);

        let (tx, rx) = mpsc::channel(16);
        let period = controller_config.throttle_interval;
        let producer = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let metrics = ScrollMetrics::at_bottom(VIEWPORT_HEIGHT, DOCUMENT_HEIGHT);
                if tx.send(metrics).await.is_err() {
                    break;
                }
            }
        });

        let start = Instant::now();
        let limits = RunLimits {
            max_pages,
            max_failures: Some(DRAIN_MAX_FAILURES),
        };
        let stats = driver::run_limited(&mut controller, rx, limits).await;
        producer.abort();

        let state = *controller.state();
        let phase = controller.phase();
        let mut writer = controller.into_container().into_inner();
        writer.flush()?;
        debug!(?state, "drain finished");

        let summary = json!({
            "type": "STATS",
            "stats": {
                "endpoint": config.endpoint,
                "phase": phase.to_string(),
                "current_page": state.current_page,
                "has_next": state.has_next,
                "duration_ms": start.elapsed().as_millis() as u64,
                "counters": stats_json(&stats),
                "output": output.map(|p| p.display().to_string())
            }
        });

        // Markup already went to stdout, keep it clean
        if output.is_some() {
            self.output_message(&summary);
        } else {
            eprintln!("{}", self.render(&summary));
        }

        if stats.failures >= DRAIN_MAX_FAILURES && phase != Phase::Exhausted {
            return Err(Error::Other(format!(
                "Gave up after {} failed requests",
                stats.failures
            )));
        }

        Ok(())
    }

    /// Validate the feed configuration
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Feed '{}' is valid (page param '{}', fallback {:?})",
                    config.endpoint, config.page_param, config.fallback
                )
            }
        }));

        Ok(())
    }

    fn render(&self, msg: &Value) -> String {
        match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg).unwrap_or_default(),
            OutputFormat::Pretty => serde_json::to_string_pretty(msg).unwrap_or_default(),
        }
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        println!("{}", self.render(msg));
    }
}

fn stats_json(stats: &FeedStats) -> Value {
    serde_json::to_value(stats).unwrap_or(Value::Null)
}
