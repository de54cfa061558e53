// src/error.rs
//! Error taxonomy for ingestion and the listing boundary. None of these are
//! fatal: callers log them and degrade to fewer (or zero) companies.

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// File or resource missing / unreadable. The source contributes nothing.
    #[error("source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    /// Header contract violated (whole source skipped) or a row that could not
    /// be decoded (that row skipped).
    #[error("source {source_name} malformed: {reason}")]
    SourceMalformed { source_name: String, reason: String },

    /// `list_companies` could not produce a snapshot at all.
    #[error("company listing failed: {reason}")]
    BoundaryFailure { reason: String },
}

impl DirectoryError {
    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceMalformed {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn boundary(reason: impl ToString) -> Self {
        Self::BoundaryFailure {
            reason: reason.to_string(),
        }
    }

    /// Short label used for metrics and per-source outcomes.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SourceUnavailable { .. } => "unavailable",
            Self::SourceMalformed { .. } => "malformed",
            Self::BoundaryFailure { .. } => "boundary",
        }
    }
}
