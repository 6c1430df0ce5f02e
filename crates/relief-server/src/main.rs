//! relief-server binary.
//!
//! Reads `relief.toml` (or the path given with `--config`) layered with
//! `RELIEF_*` environment variables, opens the SQLite store, and serves the
//! JSON API under `/api`.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use relief_server::{ServerConfig, config::expand_tilde};
use relief_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Disaster-relief request server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "relief.toml")]
  config: PathBuf,

  /// Print the effective configuration and exit.
  #[arg(long)]
  print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  if cli.print_config {
    println!("{server_cfg:#?}");
    return Ok(());
  }

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let service = relief_server::service(store, &server_cfg)
    .await
    .context("failed to prepare relief service")?;

  let app = relief_server::router(service);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
