//! `almanac`: collect Immich photos taken around holidays and other dates into
//! albums.
//!
//! # Usage
//!
//! ```text
//! almanac --url https://photos.example.com --api-key KEY \
//!   collect --holiday Christmas --holiday "Easter=Spring" --start-year 2015
//! almanac holidays --year 2025
//! almanac people --search "smith and jo"
//! ```

mod collect;
mod listing;
mod preset;
mod settings;

use std::{path::PathBuf, process::ExitCode};

use almanac_immich::{DEFAULT_TIMEOUT, ImmichClient};
use anyhow::{Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use collect::CollectArgs;
use settings::{Connection, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
  name = "almanac",
  version,
  about = "Holiday album collector for Immich"
)]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, global = true, default_value = "almanac.toml")]
  config: PathBuf,

  /// Server URL; a bare host gets `/api` appended.
  #[arg(long, global = true, env = "ALMANAC_URL")]
  url: Option<String>,

  /// Immich API key.
  #[arg(long, global = true, env = "ALMANAC_API_KEY", hide_env_values = true)]
  api_key: Option<String>,

  /// Per-request timeout in seconds.
  #[arg(
    long,
    global = true,
    value_name = "SECS",
    default_value_t = DEFAULT_TIMEOUT.as_secs()
  )]
  timeout: u64,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Collect assets around holidays or a date into albums.
  Collect(CollectArgs),

  /// List supported holidays and their dates.
  Holidays {
    /// Year to show [default: current year].
    #[arg(long)]
    year: Option<i32>,
  },

  /// List people as lines that can be pasted into `--people`.
  People {
    /// Filter expression, e.g. `smith and jo, ann`.
    #[arg(long, value_name = "EXPR")]
    search: Option<String>,

    /// Include hidden people.
    #[arg(long)]
    with_hidden: bool,
  },
}

impl Cli {
  fn client(&self) -> Result<ImmichClient> {
    let settings = Settings::load(&self.config)?;
    let connection = Connection {
      url:          self.url.clone(),
      api_key:      self.api_key.clone(),
      timeout_secs: self.timeout,
    };
    let config = connection.api_config(&settings)?;
    ImmichClient::new(config).context("failed to set up the Immich client")
  }
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let current_year = chrono::Local::now().year();

  match &cli.command {
    Command::Collect(args) => {
      let client = cli.client()?;
      tracing::info!(url = client.base_url(), "connecting");
      collect::execute(args, client, current_year).await
    }
    Command::Holidays { year } => {
      listing::holidays(year.unwrap_or(current_year))?;
      Ok(ExitCode::SUCCESS)
    }
    Command::People {
      search,
      with_hidden,
    } => {
      let client = cli.client()?;
      listing::people(&client, search.as_deref(), *with_hidden).await
    }
  }
}
