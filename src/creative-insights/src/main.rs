//! Creative Insights CLI: cohort win rates, kill/scale buckets, iteration
//! priorities, and chained report snapshots over a JSON export of creatives.

mod file_store;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use creative_core::config::{LogFormat, LoggingConfig};
use creative_core::goal::CAMPAIGN_GOAL_KEY;
use creative_core::repository::{AccountCurrencies, InMemoryCreativeRepository, StaticSettings};
use creative_core::{AccountScope, AppConfig, Creative, InsightsError, InsightsResult};
use creative_reporting::{InsightsService, SnapshotOutcome};
use file_store::JsonFileSnapshotStore;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "creative-insights")]
#[command(about = "Scoring, classification, and reporting for ad creatives")]
#[command(version)]
struct Cli {
    /// Config file (TOML/JSON/YAML)
    #[arg(long, global = true, env = "CREATIVE_INSIGHTS_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of creative records
    #[arg(long, global = true, env = "CREATIVE_INSIGHTS__CREATIVES")]
    creatives: Option<PathBuf>,

    /// JSON object of string settings, merged over the config file's
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Restrict to one ad account
    #[arg(long, global = true)]
    account: Option<String>,

    /// Campaign goal: roas, lead_gen, traffic (overrides settings)
    #[arg(long, global = true)]
    goal: Option<String>,

    /// Display currency code (overrides config)
    #[arg(long, global = true, env = "CREATIVE_INSIGHTS__CURRENCY")]
    currency: Option<String>,

    /// Snapshot file (overrides config)
    #[arg(long, global = true, env = "CREATIVE_INSIGHTS__SNAPSHOT_PATH")]
    snapshot_path: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Per-funnel-stage win rates and scored creatives
    WinRates,

    /// Scale / watch / kill buckets with rationale
    KillScale,

    /// Ranked iteration priorities
    Priorities,

    /// Generate and store a report snapshot
    Report,

    /// List stored snapshots for the scope, newest first
    Snapshots,

    /// Show one stored snapshot
    Snapshot {
        /// Snapshot UUID
        id: String,
    },
}

#[derive(Serialize)]
struct NoDataReport<'a> {
    status: &'static str,
    scope: &'a AccountScope,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Apply CLI overrides
    if let Some(currency) = cli.currency {
        config.currency = currency;
    }
    if let Some(path) = cli.snapshot_path {
        config.snapshot_path = path;
    }
    if let Some(path) = &cli.settings {
        config.settings.extend(load_settings(path)?);
    }
    if let Some(goal) = cli.goal {
        config.settings.insert(CAMPAIGN_GOAL_KEY.to_string(), goal);
    }

    init_tracing(&config.logging);

    let scope = AccountScope::from(cli.account);
    info!(
        scope = %scope,
        currency = %config.currency,
        snapshot_path = %config.snapshot_path,
        "Creative Insights starting"
    );

    let repo = InMemoryCreativeRepository::new();
    if let Some(path) = &cli.creatives {
        let creatives = load_creatives(path)
            .with_context(|| format!("Failed to load creatives from {}", path.display()))?;
        let total = creatives.len();
        let rejected = repo.load(creatives);
        if rejected > 0 {
            warn!(rejected, total, "Some creative records were rejected");
        }
        info!(loaded = repo.len(), "Creatives loaded");
    } else if needs_creatives(&cli.command) {
        bail!("--creatives <path> is required for this command");
    }

    let service = InsightsService::new(
        Arc::new(repo),
        Arc::new(StaticSettings::new(config.settings.clone())),
        Arc::new(AccountCurrencies::new(config.currency.clone())),
        Arc::new(JsonFileSnapshotStore::new(&config.snapshot_path)),
    );

    match cli.command {
        Commands::WinRates => print_json(&service.win_rates(&scope)?),
        Commands::KillScale => print_json(&service.kill_scale(&scope)?),
        Commands::Priorities => print_json(&service.iteration_priorities(&scope)?),
        Commands::Report => match service.generate_snapshot(&scope)? {
            SnapshotOutcome::Created(snapshot) => {
                println!("{}", snapshot.to_json_pretty()?);
                Ok(())
            }
            SnapshotOutcome::NoData => {
                warn!(scope = %scope, "No delivering creatives, nothing to report");
                print_json(&NoDataReport {
                    status: "no_data",
                    scope: &scope,
                })
            }
        },
        Commands::Snapshots => print_json(&service.snapshots(&scope)?),
        Commands::Snapshot { id } => {
            let id = Uuid::parse_str(&id).with_context(|| format!("Invalid snapshot id '{id}'"))?;
            match service.snapshot(&id)? {
                Some(snapshot) => print_json(&snapshot),
                None => bail!("Snapshot {id} not found"),
            }
        }
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.filter.as_str().into());
    // stdout carries the JSON results
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

fn needs_creatives(command: &Commands) -> bool {
    matches!(
        command,
        Commands::WinRates | Commands::KillScale | Commands::Priorities | Commands::Report
    )
}

fn load_creatives(path: &Path) -> InsightsResult<Vec<Creative>> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| InsightsError::Repository(format!("{}: {e}", path.display())))
}

fn load_settings(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    let raw: HashMap<String, serde_json::Value> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse settings from {}", path.display()))?;
    // Settings are string-valued; accept bare numbers too.
    Ok(raw
        .into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => (key, s),
            other => (key, other.to_string()),
        })
        .collect())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
