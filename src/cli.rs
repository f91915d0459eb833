//! CLI commands for odds-api.
//!
//! Supports the API server mode and a one-shot scrape mode.

use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::scraper::{OddsExtractor, PageSession};

#[derive(Parser)]
#[command(name = "odds-api")]
#[command(version, about = "Horse racing odds scraper API and CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value_t = 8080)]
        port: u16,
    },

    /// Scrape odds for a single event and print them as JSON
    Scrape {
        /// URL of the event page on the bookmaker site
        #[arg(value_name = "EVENT_URL")]
        event_url: String,
    },
}

/// Run a one-shot scrape and print the result to stdout.
pub async fn run_scrape(event_url: String) -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    let session = Arc::new(PageSession::new(&config.scraper));
    let extractor = OddsExtractor::new(session.clone(), &config.scraper);

    let result = extractor.extract(&event_url).await;

    // close the shared browser before reporting the outcome
    session.close().await;

    let response = result?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
