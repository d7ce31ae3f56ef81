//! ghremote - GitHub remote spec resolver
//!
//! Usage:
//!   ghremote parse hadley/httr@v1.0       # Parse specs offline
//!   ghremote resolve klutometis/roxygen#142
//!   ghremote fetch hadley/devtools@*      # Download and record provenance
//!   ghremote sha archive.zip              # Read the sha from a zipball
//!   ghremote --owner hadley config --save # Persist defaults

mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ghremote_core::config::{ConfigStore, RemoteConfig};
use ghremote_core::github::GitHubApi;
use ghremote_core::pipeline::{BatchItem, FetchPipeline, RemoteResolver, failure_count, run_batch};
use ghremote_core::provenance::{ProvenanceStore, extract_sha};
use ghremote_core::spec::RepoSpec;

#[derive(Parser)]
#[command(name = "ghremote")]
#[command(about = "Resolve and fetch GitHub remote specs", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// API host (default: api.github.com)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Access token (default: read from $GITHUB_PAT)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Owner used when a spec has none (deprecated)
    #[arg(long, global = true)]
    owner: Option<String>,

    /// Subdirectory used when a spec has none
    #[arg(long, global = true)]
    subdir: Option<String>,

    /// Ref used when a spec has no selector
    #[arg(long = "ref", global = true, value_name = "REF")]
    default_ref: Option<String>,

    /// Config file (default: ~/.config/ghremote/ghremote.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// State directory holding provenance.json
    #[arg(long, global = true, value_name = "DIR")]
    state_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse specs without touching the network
    Parse {
        /// Specs such as owner/repo/subdir@ref, owner/repo#123, owner/repo@*
        #[arg(required = true)]
        specs: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Resolve specs to concrete owner, repo and ref
    Resolve {
        #[arg(required = true)]
        specs: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Download archives and record where they came from
    Fetch {
        #[arg(required = true)]
        specs: Vec<String>,

        /// Download even when the recorded sha is current
        #[arg(long, short = 'F')]
        force: bool,

        /// Where archives are written (default: <state-dir>/downloads)
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show the effective configuration
    Config {
        /// Write the --host, --owner, --subdir and --ref values to the config file
        #[arg(long)]
        save: bool,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Print the commit sha stored in zipball comments
    Sha {
        #[arg(required = true)]
        archives: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    /// Human-readable lines
    #[default]
    Table,
    /// Machine-readable JSON
    Json,
    /// Only report failures
    Quiet,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ghremote=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(Cli::parse())
}

/// Dispatch a command; any failed item makes the whole run fail.
fn run(cli: Cli) -> Result<()> {
    let failed = match cli.command {
        Commands::Parse { specs, format } => run_parse(&specs, format)?,
        Commands::Resolve { specs, format } => run_resolve(&cli.global, &specs, format)?,
        Commands::Fetch {
            specs,
            force,
            download_dir,
            format,
        } => run_fetch(&cli.global, &specs, force, download_dir, format)?,
        Commands::Config { save, format } => run_config(&cli.global, save, format)?,
        Commands::Sha { archives, format } => run_sha(&archives, format)?,
    };

    if failed > 0 {
        anyhow::bail!("{} item(s) failed", failed);
    }
    Ok(())
}

fn config_store(global: &GlobalArgs) -> Result<ConfigStore> {
    match &global.config {
        Some(path) => Ok(ConfigStore::from_path(path.clone())),
        None => ConfigStore::from_default_location(),
    }
}

fn load_config(global: &GlobalArgs) -> Result<RemoteConfig> {
    load_config_with(global, |name| std::env::var(name).ok())
}

/// Load the config file, then apply flag overrides and the token.
///
/// `env` looks up environment variables by name.
fn load_config_with(
    global: &GlobalArgs,
    env: impl Fn(&str) -> Option<String>,
) -> Result<RemoteConfig> {
    let config = apply_overrides(config_store(global)?.load()?, global, env);
    tracing::debug!(
        host = %config.host,
        authenticated = config.auth_token.is_some(),
        "Loaded configuration"
    );
    Ok(config)
}

fn apply_overrides(
    mut config: RemoteConfig,
    global: &GlobalArgs,
    env: impl Fn(&str) -> Option<String>,
) -> RemoteConfig {
    if let Some(host) = &global.host {
        config = config.with_host(host);
    }
    if let Some(owner) = &global.owner {
        config = config.with_default_owner(owner);
    }
    if let Some(subdir) = &global.subdir {
        config = config.with_default_subdir(subdir);
    }
    if let Some(reference) = &global.default_ref {
        config = config.with_default_ref(reference);
    }

    let present = |token: &String| !token.trim().is_empty();
    let token = global
        .token
        .clone()
        .filter(present)
        .or_else(|| env(&config.token_env).filter(present));
    if let Some(token) = token {
        config = config.with_auth_token(token);
    }
    config
}

fn state_dir(global: &GlobalArgs) -> Result<PathBuf> {
    match &global.state_dir {
        Some(dir) => Ok(dir.clone()),
        None => ProvenanceStore::default_state_dir(),
    }
}

fn run_parse(specs: &[String], format: OutputFormat) -> Result<usize> {
    let items: Vec<BatchItem<RepoSpec>> = run_batch(specs, RepoSpec::parse);
    output::print_parsed(&items, format)?;
    Ok(failure_count(&items))
}

fn run_resolve(global: &GlobalArgs, specs: &[String], format: OutputFormat) -> Result<usize> {
    let config = load_config(global)?;
    let api = GitHubApi::from_config(&config)?;
    let resolver = RemoteResolver::new(&config, &api);

    let items = resolver.resolve_all(specs);
    output::print_resolved(&items, format)?;
    Ok(failure_count(&items))
}

fn run_fetch(
    global: &GlobalArgs,
    specs: &[String],
    force: bool,
    download_dir: Option<PathBuf>,
    format: OutputFormat,
) -> Result<usize> {
    let config = load_config(global)?;
    let api = GitHubApi::from_config(&config)?;
    let state_dir = state_dir(global)?;
    let store = ProvenanceStore::new(&state_dir);
    let download_dir = download_dir.unwrap_or_else(|| state_dir.join("downloads"));

    let pipeline = FetchPipeline::new(&config, &api, &store, download_dir);
    let items = pipeline.fetch_all(specs, force);
    output::print_fetched(&items, format)?;
    Ok(failure_count(&items))
}

fn run_config(global: &GlobalArgs, save: bool, format: OutputFormat) -> Result<usize> {
    let store = config_store(global)?;
    let config = load_config(global)?;
    if save {
        store.save(&config)?;
    }
    output::print_config(&config, store.config_path(), save, format)?;
    Ok(0)
}

fn run_sha(archives: &[PathBuf], format: OutputFormat) -> Result<usize> {
    let mut failed = 0;
    let mut rows = Vec::with_capacity(archives.len());
    for path in archives {
        let sha = extract_sha(path)
            .with_context(|| format!("Failed to inspect {}", path.display()));
        if sha.is_err() {
            failed += 1;
        }
        rows.push((path.as_path(), sha));
    }
    output::print_shas(&rows, format)?;
    Ok(failed)
}
