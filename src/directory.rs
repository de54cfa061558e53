// src/directory.rs
//! The in-memory record set and the `list_companies` boundary.

use std::sync::{Arc, RwLock};

use metrics::gauge;
use serde::Serialize;
use tracing::{info, warn};

use crate::company::Company;
use crate::error::DirectoryError;
use crate::ingest::{self, config::DirectoryConfig, types::IngestReport, types::SourceReport};
use crate::query::{DirectorySession, FacetOptions};

/// Immutable result of one ingest run.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub companies: Arc<Vec<Company>>,
    pub facets: FacetOptions,
    pub summary: IngestSummary,
    /// Set when the run could not even start (bad config, etc).
    pub diagnostic: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub loaded_at: i64,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub total_loaded: usize,
    pub unique: usize,
    pub duplicates_dropped: usize,
    pub sources: Vec<SourceReport>,
}

impl Snapshot {
    pub fn from_report(report: IngestReport) -> Self {
        let summary = IngestSummary {
            loaded_at: chrono::Utc::now().timestamp(),
            rows_read: report.rows_read,
            rows_skipped: report.rows_skipped,
            total_loaded: report.total_loaded,
            unique: report.companies.len(),
            duplicates_dropped: report.duplicates_dropped,
            sources: report.sources,
        };
        let facets = FacetOptions::derive(&report.companies);
        Self {
            companies: Arc::new(report.companies),
            facets,
            summary,
            diagnostic: None,
        }
    }

    fn failed(err: &DirectoryError) -> Self {
        Self {
            diagnostic: Some(err.to_string()),
            ..Default::default()
        }
    }
}

/// What `list_companies` hands back: never an error, at worst empty plus a
/// diagnostic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompanyListing {
    pub companies: Arc<Vec<Company>>,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

/// Shared directory state. Readers clone the current `Arc<Snapshot>`; a reload
/// swaps it wholesale.
#[derive(Debug, Clone)]
pub struct Directory {
    config: DirectoryConfig,
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl Directory {
    pub fn new(config: DirectoryConfig, snapshot: Snapshot) -> Self {
        gauge!("directory_companies_loaded").set(snapshot.companies.len() as f64);
        Self {
            config,
            current: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// Ingest the configured file sources once and wrap the result.
    pub async fn load(config: DirectoryConfig) -> Self {
        let snapshot = ingest_files(&config).await;
        Self::new(config, snapshot)
    }

    /// Directory whose configuration could not be loaded; serves nothing.
    pub fn unavailable(config: DirectoryConfig, reason: impl ToString) -> Self {
        let err = DirectoryError::boundary(reason);
        warn!(error = %err, "directory unavailable");
        Self::new(config, Snapshot::failed(&err))
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    pub fn page_size(&self) -> usize {
        self.config.page_size
    }

    pub fn snapshot(&self) -> Result<Arc<Snapshot>, DirectoryError> {
        self.current
            .read()
            .map(|g| Arc::clone(&*g))
            .map_err(|_| DirectoryError::boundary("snapshot lock poisoned"))
    }

    /// The full deduplicated collection. Failures become an empty listing with
    /// a diagnostic.
    pub fn list_companies(&self) -> CompanyListing {
        match self.snapshot() {
            Ok(s) => CompanyListing {
                companies: Arc::clone(&s.companies),
                diagnostic: s.diagnostic.clone(),
            },
            Err(e) => {
                warn!(error = %e, "list_companies failed");
                CompanyListing {
                    companies: Arc::new(Vec::new()),
                    diagnostic: Some(e.to_string()),
                }
            }
        }
    }

    /// Re-run ingestion and swap the snapshot in one step.
    pub async fn reload(&self) -> Result<IngestSummary, DirectoryError> {
        let fresh = ingest_files(&self.config).await;
        let summary = fresh.summary.clone();
        gauge!("directory_companies_loaded").set(fresh.companies.len() as f64);
        let mut guard = self
            .current
            .write()
            .map_err(|_| DirectoryError::boundary("snapshot lock poisoned"))?;
        *guard = Arc::new(fresh);
        Ok(summary)
    }

    /// A fresh client session over the current snapshot.
    pub fn session(&self) -> DirectorySession {
        DirectorySession::new(self.list_companies().companies, self.config.page_size)
    }
}

async fn ingest_files(config: &DirectoryConfig) -> Snapshot {
    let sources = ingest::file_sources(&config.data_dir, &config.sources);
    let report = ingest::run_once(&sources).await;
    info!(
        data_dir = %config.data_dir.display(),
        unique = report.companies.len(),
        "directory snapshot built"
    );
    Snapshot::from_report(report)
}
