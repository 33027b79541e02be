mod app;
mod catalogs;
mod commands;
mod library;
mod metrics;
mod progress;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use unitunes_core::{
    load_config, load_default_config, validate_config, CachePolicy, CatalogKind, Config,
};

use app::App;

/// Config file read when `--config` is not given.
const DEFAULT_CONFIG_FILE: &str = "unitunes.toml";

#[derive(Parser, Debug)]
#[command(name = "unitunes", version, about = "Keep playlists in sync across music catalogs")]
struct Cli {
    /// Configuration file.
    #[arg(long, short, global = true, env = "UNITUNES_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured cache policy for this run.
    #[arg(long, global = true, value_enum)]
    cache: Option<CacheMode>,

    /// Hide progress bars.
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Write Prometheus metrics to this file when the command finishes.
    #[arg(long, global = true)]
    metrics: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default configuration and create the playlist directory.
    Init {
        #[arg(default_value = ".")]
        directory: PathBuf,
    },
    /// Show a playlist.
    View { playlist: String },
    /// Manage local playlists.
    #[command(subcommand)]
    Playlist(PlaylistCommand),
    /// Pull linked remote playlists and reconcile them into the local ones.
    Pull {
        /// Playlists to pull (default: all).
        playlists: Vec<String>,
        /// Catalogs to pull from (default: every linked catalog).
        #[arg(long = "catalog", short = 's')]
        catalogs: Vec<CatalogKind>,
        /// Print the changed tracks.
        #[arg(long, short)]
        verbose: bool,
    },
    /// Search a catalog for every track of a playlist.
    Search {
        catalog: CatalogKind,
        playlist: String,
        /// Show confident matches too.
        #[arg(long)]
        show_all: bool,
        /// Show only tracks without a match, with their candidates.
        #[arg(long)]
        only_failed: bool,
        /// Show the score breakdown of every candidate.
        #[arg(long)]
        explain: bool,
        /// Candidates shown per track.
        #[arg(long, default_value_t = 3)]
        limit: usize,
        /// Store found identifiers on the playlist tracks.
        #[arg(long)]
        link: bool,
        /// Tracks searched at once.
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
    },
    /// Measure resolution accuracy against labelled pairs.
    Eval {
        /// JSON file holding a list of `{ "source": ..., "expected": ... }` cases.
        cases: PathBuf,
        #[arg(long)]
        source: CatalogKind,
        #[arg(long)]
        target: CatalogKind,
        /// Cases evaluated at once.
        #[arg(long, default_value_t = 4)]
        concurrency: usize,
        /// Write the full report as JSON.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Manage the remote call cache.
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Subcommand, Debug)]
enum PlaylistCommand {
    /// Create an empty playlist.
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Link a playlist to a remote playlist, by id or URL.
    Link {
        name: String,
        catalog: CatalogKind,
        remote: String,
    },
    /// List playlists.
    List,
}

#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// Drop cached responses.
    Clear {
        /// Only this catalog's entries.
        #[arg(long)]
        catalog: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CacheMode {
    Use,
    Refresh,
    Bypass,
}

impl From<CacheMode> for CachePolicy {
    fn from(mode: CacheMode) -> Self {
        match mode {
            CacheMode::Use => CachePolicy::Use,
            CacheMode::Refresh => CachePolicy::Refresh,
            CacheMode::Bypass => CachePolicy::Bypass,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    progress::set_hidden(cli.quiet);

    if let Command::Init { directory } = &cli.command {
        return commands::init::run(directory);
    }

    let mut config = read_config(cli.config.as_ref())?;
    if let Some(mode) = cli.cache {
        config.cache.policy = mode.into();
    }
    validate_config(&config).context("Configuration validation failed")?;

    let app = App::from_config(config).context("Failed to set up catalogs")?;

    match cli.command {
        Command::Init { .. } => unreachable!("handled before loading the configuration"),
        Command::View { playlist } => commands::playlist::view(&app, &playlist)?,
        Command::Playlist(PlaylistCommand::Add { name, description }) => {
            commands::playlist::add(&app, &name, &description)?
        }
        Command::Playlist(PlaylistCommand::Link {
            name,
            catalog,
            remote,
        }) => commands::playlist::link(&app, &name, catalog, &remote)?,
        Command::Playlist(PlaylistCommand::List) => commands::playlist::list(&app)?,
        Command::Pull {
            playlists,
            catalogs,
            verbose,
        } => commands::pull::run(&app, &playlists, &catalogs, verbose).await?,
        Command::Search {
            catalog,
            playlist,
            show_all,
            only_failed,
            explain,
            limit,
            link,
            concurrency,
        } => {
            let options = commands::search::SearchOptions {
                show_all,
                only_failed,
                explain,
                limit,
                link,
                concurrency,
            };
            commands::search::run(&app, catalog, &playlist, &options).await?
        }
        Command::Eval {
            cases,
            source,
            target,
            concurrency,
            output,
        } => {
            commands::eval::run(&app, &cases, source, target, concurrency, output.as_deref())
                .await?
        }
        Command::Cache(CacheCommand::Clear { catalog }) => {
            commands::cache::clear(&app, catalog.as_deref())?
        }
    }

    if let Some(path) = &cli.metrics {
        std::fs::write(path, metrics::encode_metrics())
            .with_context(|| format!("Failed to write metrics to {:?}", path))?;
        info!("Metrics written to {:?}", path);
    }

    Ok(())
}

/// Load the configuration file, or defaults when `unitunes.toml` is absent.
fn read_config(explicit: Option<&PathBuf>) -> Result<Config> {
    let config_path = match explicit {
        Some(path) => path.clone(),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !path.exists() {
                info!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                return load_default_config().context("Failed to apply environment overrides");
            }
            path
        }
    };

    info!("Loading configuration from {:?}", config_path);
    load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))
}
