//! Import a resident export into PostgreSQL using the bulk synchroniser.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use mockable::DefaultClock;
use resident_directory::domain::ResidentSyncService;
use resident_directory::domain::SyncPayload;
use resident_directory::domain::ports::ResidentSyncCommand;
use resident_directory::outbound::persistence::{DbPool, DieselResidentRepository, PoolConfig};
use tokio::runtime::Builder;
use tracing_subscriber::{EnvFilter, fmt};

/// `import-residents` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "import-residents",
    about = "Insert residents from a JSON export, skipping duplicate plates and permits",
    version
)]
struct CliArgs {
    /// JSON file holding an array of residents or `{"residents": [...]}`.
    #[arg(long = "file", value_name = "path")]
    file: PathBuf,
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
    {
        eprintln!("tracing init failed: {error}");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let payload = read_payload(&args.file)?;

    let database_url = resolve_database_url(args.database_url)?;
    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let repo = Arc::new(DieselResidentRepository::new(pool, Arc::new(DefaultClock)));
    let report = ResidentSyncService::new(repo)
        .sync(payload)
        .await
        .map_err(|error| io::Error::other(format!("import failed: {error}")))?;

    println!("inserted_count={}", report.inserted_count());
    println!("rejected_count={}", report.rejected_count());

    Ok(())
}

fn read_payload(path: &Path) -> io::Result<SyncPayload> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "input path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        io::Error::other(format!(
            "open input parent directory '{}': {error}",
            parent.display()
        ))
    })?;
    let mut file = directory.open(Path::new(file_name)).map_err(|error| {
        io::Error::other(format!("open input file '{}': {error}", path.display()))
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|error| {
        io::Error::other(format!("read input file '{}': {error}", path.display()))
    })?;

    parse_payload(&contents)
}

fn parse_payload(contents: &str) -> io::Result<SyncPayload> {
    let value: serde_json::Value = serde_json::from_str(contents).map_err(|error| {
        io::Error::new(io::ErrorKind::InvalidData, format!("parse JSON: {error}"))
    })?;
    SyncPayload::try_from(value)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error.to_string()))
}

fn resolve_database_url(explicit: Option<String>) -> io::Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "--database-url must not be empty when provided",
            ));
        }
        return Ok(value);
    }

    let from_env = env::var("DATABASE_URL").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "database URL missing: set --database-url or DATABASE_URL",
        )
    })?;
    if from_env.trim().is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "DATABASE_URL must not be empty",
        ));
    }
    Ok(from_env)
}
