//! `profile-search` command line: search, record feedback, inspect status,
//! or serve router commands over stdin/stdout.

pub mod app;
pub mod stdio;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use runtime_config::Config;
use runtime_router::{
    CommandRouter, RouterCommand, RouterResponse, FEEDBACK_SUBMIT, SEARCH, STATUS,
};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "profile-search", version, about = "Semantic search over professional profiles")]
pub struct Cli {
    /// TOML config file; built-in defaults apply when omitted.
    #[arg(long, short = 'c', value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rank profiles against a free-text query.
    Search {
        query: String,
        #[arg(long)]
        top_n: Option<usize>,
        /// Base relevance threshold; the adaptive threshold never drops below it.
        #[arg(long)]
        threshold: Option<f32>,
        /// Print the raw JSON response instead of a listing.
        #[arg(long)]
        json: bool,
    },
    /// Record which profiles were relevant for a query.
    Feedback {
        query: String,
        /// Profile id or name; repeat for several profiles.
        #[arg(long = "select", value_name = "ID_OR_NAME", required = true)]
        selected: Vec<String>,
    },
    /// Show corpus and feedback counts.
    Status,
    /// Read one JSON command per line from stdin, answer one per line on stdout.
    ServeStdio,
}

pub fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => runtime_config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    init_tracing(&config.logging.level);

    let router = app::build_router(&config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::Search {
            query,
            top_n,
            threshold,
            json,
        } => {
            let mut payload = json!({ "query": query });
            if let Some(top_n) = top_n {
                payload["top_n"] = json!(top_n);
            }
            if let Some(threshold) = threshold {
                payload["base_threshold"] = json!(threshold);
            }
            let response = dispatch(router.as_ref(), SEARCH, payload)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&response.payload)?)?;
            } else {
                print_results(&mut out, &response.payload)?;
            }
        }
        Command::Feedback { query, selected } => {
            let response = dispatch(
                router.as_ref(),
                FEEDBACK_SUBMIT,
                json!({ "query": query, "selected": selected }),
            )?;
            let count = response.payload["selected"]
                .as_array()
                .map_or(0, Vec::len);
            writeln!(
                out,
                "recorded feedback {} for {count} profile(s)",
                response.payload["entry_id"].as_str().unwrap_or_default()
            )?;
        }
        Command::Status => {
            let response = dispatch(router.as_ref(), STATUS, json!({}))?;
            if let Value::Object(fields) = &response.payload {
                for (key, value) in fields {
                    writeln!(out, "{key}: {value}")?;
                }
            }
        }
        Command::ServeStdio => {
            drop(out);
            let stdin = io::stdin();
            stdio::serve(router.as_ref(), stdin.lock(), io::stdout().lock())?;
        }
    }
    Ok(())
}

fn dispatch(router: &dyn CommandRouter, name: &str, payload: Value) -> Result<RouterResponse> {
    router
        .dispatch(RouterCommand::new(name, payload))
        .map_err(|err| anyhow!(err))
}

fn print_results(out: &mut impl Write, payload: &Value) -> Result<()> {
    let results = payload["results"].as_array().cloned().unwrap_or_default();
    if results.is_empty() {
        writeln!(out, "no matching profiles")?;
        return Ok(());
    }
    for (rank, result) in results.iter().enumerate() {
        let name = result["profile"]["name"]
            .as_str()
            .filter(|name| !name.is_empty())
            .or_else(|| result["profile_id"].as_str())
            .unwrap_or_default();
        writeln!(
            out,
            "{}. {name}  similarity {:.3}  boost {}",
            rank + 1,
            result["similarity"].as_f64().unwrap_or_default(),
            result["boost"].as_u64().unwrap_or_default(),
        )?;
        writeln!(out, "   {}", result["explanation"].as_str().unwrap_or_default())?;
    }
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
