//! sanya-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) plus `SANYA_*`
//! environment variables, opens the table files under `data_dir`, and serves
//! the JSON API over HTTP.
//!
//! # Bootstrapping an admin
//!
//! ```text
//! echo 'a-strong-password' | sanya-server create-admin --username admin
//! ```

use std::{
  io::{self, BufRead, Write as _},
  path::PathBuf,
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sanya_api::AppState;
use sanya_core::accounts::Accounts;
use sanya_server::{ServerConfig, import};
use sanya_store_csv::CsvStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Sanya promise tracker server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Create an admin account; the password is read from stdin.
  CreateAdmin {
    #[arg(long)]
    username: String,
  },
  /// Append the rows of a table file to the data directory.
  Import {
    #[arg(long, value_enum)]
    table: import::Table,
    file:  PathBuf,
  },
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
  let server_cfg = ServerConfig::load(&cli.config)?;

  let data_dir = server_cfg.data_dir();
  let store = CsvStore::open(&data_dir)
    .await
    .with_context(|| format!("failed to open data directory {data_dir:?}"))?;
  let store = Arc::new(store);

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(&server_cfg, store).await,
    Command::CreateAdmin { username } => {
      eprint!("Password: ");
      io::stderr().flush()?;
      let password = read_password(io::stdin().lock())?;
      let user = Accounts::new(store)
        .create_admin(&username, &password)
        .await
        .context("failed to create admin")?;
      println!("created admin {} (id {})", user.username, user.id);
      Ok(())
    }
    Command::Import { table, file } => {
      let report = import::import_file(store, table, &file).await?;
      println!("imported {} rows, skipped {}", report.imported, report.skipped);
      Ok(())
    }
  }
}

async fn serve(server_cfg: &ServerConfig, store: Arc<CsvStore>) -> anyhow::Result<()> {
  let state = AppState::new(store, server_cfg.session_keys());
  let app = sanya_server::app(state);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// The first line of `input`, without its line ending.
fn read_password(input: impl BufRead) -> anyhow::Result<String> {
  let line = input.lines().next().context("no password given")??;
  Ok(line)
}
