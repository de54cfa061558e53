// src/lib.rs
// Public library surface for the service binary and integration tests.

pub mod api;
pub mod company;
pub mod directory;
pub mod error;
pub mod ingest;
pub mod query;
pub mod telemetry;

pub use crate::api::{router, AppState};
pub use crate::company::{Company, Founder, SocialPlatform, TeamSizeBucket};
pub use crate::directory::{CompanyListing, Directory};
pub use crate::error::DirectoryError;
pub use crate::query::{DirectorySession, FilterState, QueryInput, SortKey};

use anyhow::Context;
use axum::Router;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::ingest::config::DirectoryConfig;

pub const ENV_LOG_FORMAT: &str = "DIRECTORY_LOG_FORMAT";

/// Install the global tracing subscriber. `RUST_LOG` controls the filter;
/// `DIRECTORY_LOG_FORMAT=json` switches to JSON lines. Safe to call twice.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("startup_directory=info,warn"));

    let json = std::env::var(ENV_LOG_FORMAT)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Load config, ingest once, and build the full router (API + /metrics).
/// A broken config still yields a router; listings are then empty and carry
/// the config error as their diagnostic.
pub async fn app() -> anyhow::Result<Router> {
    let directory = match DirectoryConfig::load_default() {
        Ok(cfg) => Directory::load(cfg).await,
        Err(e) => Directory::unavailable(DirectoryConfig::default(), format!("{e:#}")),
    };
    app_with(directory)
}

pub fn app_with(directory: Directory) -> anyhow::Result<Router> {
    let metrics = telemetry::Metrics::init().context("installing prometheus recorder")?;
    Ok(api::router(AppState { directory }).merge(metrics.router()))
}
