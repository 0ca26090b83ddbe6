//! # News to Notion
//!
//! Aggregates Naver news search results for a list of categories and
//! publishes them as a Notion page.
//!
//! ## Usage
//!
//! ```sh
//! news_to_notion fetch --categories AI,경제 --count 5
//! news_to_notion publish --title "Morning digest" < results.json
//! news_to_notion digest
//! ```
//!
//! ## Architecture
//!
//! 1. **Search**: Page through the search API per category ([`search`])
//! 2. **Aggregation**: Over-fetch, deduplicate across categories, trim to quota ([`aggregator`])
//! 3. **Normalization**: Shorten descriptions and dates ([`normalize`])
//! 4. **Rendering**: Template to markdown-like text, then to blocks ([`render`])
//! 5. **Publishing**: Create the page and append blocks in batches ([`notion`])
//!
//! Results go to stdout as JSON. Logs and the `{"error": ...}` report go to
//! stderr.

use clap::Parser;
use serde::Serialize;
use serde_json::json;
use std::error::Error;
use std::process::ExitCode;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregator;
mod api;
mod cli;
mod config;
mod error;
mod models;
mod normalize;
mod notion;
mod render;
mod search;
mod tools;
mod utils;

use cli::{Cli, Command};
use config::AppConfig;
use notion::NotionClient;
use search::NaverClient;
use tools::{NewsToPageInput, PageContent, PublishPageInput};
use utils::write_json_file;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(config = %args.config.display(), command = ?args.command, "Parsed CLI arguments");

    match run(args).await {
        Ok(()) => {
            let elapsed = start_time.elapsed();
            info!(?elapsed, millis = elapsed.as_millis() as u64, "Execution complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("{}", json!({ "error": e.to_string() }));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = AppConfig::load(&args.config).await?;
    config.apply_overrides(args.credential_overrides());
    config.validate()?;
    let timeout = config.http.timeout_secs;

    match args.command {
        Command::Fetch { selection, output } => {
            let naver = NaverClient::new(&config.naver, timeout)?;
            let results = tools::fetch_news(&naver, selection.into(), &config.news).await?;
            if let Some(path) = output {
                write_json_file(&path, &results).await?;
            }
            print_json(&results)?;
        }
        Command::Publish { title, template } => {
            let mut stdin = String::new();
            tokio::io::stdin().read_to_string(&mut stdin).await?;
            let content = PageContent::from_text(&stdin);
            info!(
                categories = matches!(content, PageContent::Categories(_)),
                bytes = stdin.len(),
                "Read page content from stdin"
            );

            let notion = NotionClient::new(&config.notion, timeout)?;
            let page = tools::publish_page(
                &notion,
                PublishPageInput {
                    title,
                    content,
                    template,
                },
            )
            .await?;
            print_json(&page)?;
        }
        Command::Digest {
            selection,
            title,
            template,
        } => {
            let naver = NaverClient::new(&config.naver, timeout)?;
            let notion = NotionClient::new(&config.notion, timeout)?;
            let input = NewsToPageInput {
                fetch: selection.into(),
                title,
                template,
            };
            let page = tools::news_to_page(&naver, &notion, input, &config.news).await?;
            print_json(&page)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
