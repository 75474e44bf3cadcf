// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context, Result};
use azdns::azure::AzureProvider;
use azdns::config::{AzureConfig, DomainFilter, ZoneIdFilter};
use azdns::endpoint::ChangeSet;
use azdns::provider::Provider;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing::{debug, info};

/// Azure DNS provider command-line interface.
///
/// Reads current endpoint state from Azure DNS zones and applies
/// externally planned change sets, including traffic manager routing
/// profiles.
#[derive(Parser)]
#[command(name = "azdns", version, about)]
struct Cli {
    /// Path to the azure.json credentials file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Limit managed names to these domain suffixes (repeatable)
    #[arg(long = "domain-filter", global = true)]
    domain_filter: Vec<String>,

    /// Additionally filter read records by the domain filter (repeatable)
    #[arg(long = "zone-name-filter", global = true)]
    zone_name_filter: Vec<String>,

    /// Limit managed zones to these zone IDs or ID suffixes (repeatable)
    #[arg(long = "zone-id-filter", global = true)]
    zone_id_filter: Vec<String>,

    /// Log intended mutations without performing any
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the current endpoint state of all managed zones
    Records,

    /// Apply a planned change set (YAML, keyed by zone)
    Apply {
        /// Path to the change-set file
        #[arg(long)]
        changes: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .thread_name("azdns")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::Completions { shell } = &cli.command {
        clap_complete::generate(
            *shell,
            &mut Cli::command(),
            "azdns",
            &mut std::io::stdout(),
        );
        return Ok(());
    }

    // Initialize logging with custom format
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug azdns records
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json azdns records
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    let Some(config_path) = &cli.config else {
        bail!("--config is required");
    };
    let mut config = AzureConfig::from_file(config_path)?;
    config.domain_filter = DomainFilter::new(cli.domain_filter.iter().cloned());
    config.zone_name_filter = DomainFilter::new(cli.zone_name_filter.iter().cloned());
    config.id_filter = ZoneIdFilter::new(cli.zone_id_filter.iter().cloned());
    config.dry_run = cli.dry_run;

    info!(
        resource_group = %config.resource_group,
        dry_run = config.dry_run,
        "starting azure DNS provider"
    );
    let provider = AzureProvider::from_config(config)?;

    match cli.command {
        Command::Records => {
            let endpoints = Provider::records(&provider).await?;
            info!(endpoints = endpoints.len(), "read current endpoint state");
            print!("{}", serde_yaml::to_string(&endpoints)?);
        }
        Command::Apply { changes } => {
            let contents = std::fs::read_to_string(&changes)
                .with_context(|| format!("failed to read change set {}", changes.display()))?;
            let change_set: ChangeSet = serde_yaml::from_str(&contents)
                .with_context(|| format!("failed to parse change set {}", changes.display()))?;
            debug!(endpoints = change_set.len(), "loaded change set");
            provider.apply_changes(&change_set).await?;
        }
        Command::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
