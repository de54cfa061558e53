// src/ingest/types.rs
use crate::company::Company;
use crate::error::DirectoryError;

/// Companies parsed from one source, before cross-source deduplication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceBatch {
    pub companies: Vec<Company>,
    pub rows_read: usize,
    pub rows_skipped: usize, // malformed rows
}

#[async_trait::async_trait]
pub trait CompanySource: Send + Sync {
    async fn load(&self) -> Result<SourceBatch, DirectoryError>;
    fn name(&self) -> &str;
}

/// How a single source fared during an ingest run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Loaded { companies: usize, skipped_rows: usize },
    Unavailable { reason: String },
    Malformed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SourceReport {
    pub source: String,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
}

/// Result of one ingest run: the deduplicated companies plus bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub companies: Vec<Company>,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub total_loaded: usize,
    pub duplicates_dropped: usize,
    pub sources: Vec<SourceReport>,
}
