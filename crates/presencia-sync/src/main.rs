//! `presencia-sync` — batch inspector for the employee SOAP service.
//!
//! Pages through one basic table of the administremos SOAP endpoint until
//! a page comes back empty, accumulates the rows in memory, and prints a
//! preview plus the total row count. Nothing is persisted.
//!
//! # Usage
//!
//! ```
//! presencia-sync --config sync.toml
//! presencia-sync --url http://host/ws --username 2 --password secret \
//!   --key _300.8P --token 8d45... --table empleado
//! ```

mod client;
mod table;

use anyhow::{Context, Result};
use clap::Parser;
use client::{SoapClient, SoapConfig, TableQuery};
use serde::Deserialize;
use table::Table;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
  name = "presencia-sync",
  about = "Page through the employee SOAP service into a local table"
)]
struct Args {
  /// Path to a TOML config file (url, username, password, key, token, ...).
  #[arg(short, long, value_name = "FILE")]
  config: Option<std::path::PathBuf>,

  /// SOAP endpoint URL.
  #[arg(long, env = "PRESENCIA_SYNC_URL")]
  url: Option<String>,

  /// Service account user name.
  #[arg(long, env = "PRESENCIA_SYNC_USERNAME")]
  username: Option<String>,

  /// Service account password.
  #[arg(long, env = "PRESENCIA_SYNC_PASSWORD")]
  password: Option<String>,

  /// Installation key.
  #[arg(long, env = "PRESENCIA_SYNC_KEY")]
  key: Option<String>,

  /// Access token.
  #[arg(long, env = "PRESENCIA_SYNC_TOKEN")]
  token: Option<String>,

  /// Basic table to page through (default: empleado).
  #[arg(long)]
  table: Option<String>,

  /// Company identifier passed to the service.
  #[arg(long)]
  company_id: Option<i64>,

  /// PESV plan version passed to the service.
  #[arg(long)]
  pesv_version: Option<i64>,

  /// Stop after this many pages even if the service keeps returning rows.
  #[arg(long)]
  max_pages: Option<u32>,

  /// How many preview rows to print.
  #[arg(long, default_value_t = 5)]
  head: usize,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:          String,
  #[serde(default)]
  username:     String,
  #[serde(default)]
  password:     String,
  #[serde(default)]
  key:          String,
  #[serde(default)]
  token:        String,
  #[serde(default)]
  table:        String,
  company_id:   Option<i64>,
  pesv_version: Option<i64>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  // Load config file if provided.
  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let soap_config = SoapConfig {
    url:      args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .context("no SOAP endpoint configured; pass --url or set it in the config file")?,
    username: args
      .username
      .or_else(|| (!file_cfg.username.is_empty()).then(|| file_cfg.username.clone()))
      .unwrap_or_default(),
    password: args
      .password
      .or_else(|| (!file_cfg.password.is_empty()).then(|| file_cfg.password.clone()))
      .unwrap_or_default(),
    key:      args
      .key
      .or_else(|| (!file_cfg.key.is_empty()).then(|| file_cfg.key.clone()))
      .unwrap_or_default(),
    token:    args
      .token
      .or_else(|| (!file_cfg.token.is_empty()).then(|| file_cfg.token.clone()))
      .unwrap_or_default(),
  };
  let query = TableQuery {
    company_id:   args.company_id.or(file_cfg.company_id).unwrap_or(1),
    pesv_version: args.pesv_version.or(file_cfg.pesv_version).unwrap_or(1),
    table:        args
      .table
      .or_else(|| (!file_cfg.table.is_empty()).then(|| file_cfg.table.clone()))
      .unwrap_or_else(|| "empleado".to_string()),
  };

  let client = SoapClient::new(soap_config)?;
  let table = fetch_all(&client, &query, args.max_pages).await?;

  if table.is_empty() {
    println!("no rows retrieved for table {:?}", query.table);
    return Ok(());
  }

  println!("{}", table.head(args.head));
  println!("total rows: {}", table.len());

  Ok(())
}

// ─── Pagination loop ──────────────────────────────────────────────────────────

/// Walk pages starting at 1 until one comes back empty (or the optional
/// page cap is hit). Any malformed page aborts the run; the error names
/// the page that failed.
async fn fetch_all(
  client: &SoapClient,
  query: &TableQuery,
  max_pages: Option<u32>,
) -> Result<Table> {
  let mut table = Table::new();
  let mut page = 1u32;

  loop {
    if let Some(max) = max_pages
      && page > max
    {
      tracing::warn!(max, "stopping at the page cap");
      break;
    }

    let rows = client.fetch_page(query, page).await?;
    if rows.is_empty() {
      tracing::info!(page, "no more data");
      break;
    }

    tracing::info!(page, rows = rows.len(), "page processed");
    for row in &rows {
      table.push_row(row);
    }
    page += 1;
  }

  Ok(table)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
