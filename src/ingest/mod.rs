// src/ingest/mod.rs
pub mod config;
pub mod providers;
pub mod types;

use crate::company::Company;
use crate::error::DirectoryError;
use crate::ingest::providers::CsvFileSource;
use crate::ingest::types::{CompanySource, IngestReport, SourceOutcome, SourceReport};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::path::Path;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("directory_ingest_rows_total", "CSV rows read from all sources.");
        describe_counter!(
            "directory_ingest_kept_total",
            "Companies kept after deduplication."
        );
        describe_counter!(
            "directory_ingest_dedup_total",
            "Companies dropped as duplicates of an earlier source."
        );
        describe_counter!(
            "directory_ingest_malformed_rows_total",
            "Rows skipped because they could not be mapped to a company."
        );
        describe_counter!(
            "directory_ingest_source_errors_total",
            "Sources that were unavailable or malformed."
        );
        describe_histogram!("directory_ingest_parse_ms", "Source parse time in milliseconds.");
        describe_gauge!("directory_companies_loaded", "Companies in the current snapshot.");
        describe_gauge!(
            "directory_ingest_last_run_ts",
            "Unix ts when the ingest pipeline last ran."
        );
    });
}

/// Build file sources for `names` under `data_dir`, preserving priority order.
pub fn file_sources<S: AsRef<str>>(data_dir: &Path, names: &[S]) -> Vec<Box<dyn CompanySource>> {
    names
        .iter()
        .map(|n| Box::new(CsvFileSource::new(data_dir.join(n.as_ref()))) as Box<dyn CompanySource>)
        .collect()
}

/// Merge per-source batches in priority order, keeping the first record seen
/// for every lowercase `name|website` key. Returns (unique, dropped).
pub fn merge_dedup<I>(batches: I) -> (Vec<Company>, usize)
where
    I: IntoIterator<Item = Vec<Company>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::new();
    let mut dropped = 0usize;
    for batch in batches {
        for company in batch {
            if seen.insert(company.dedup_key()) {
                unique.push(company);
            } else {
                dropped += 1;
            }
        }
    }
    (unique, dropped)
}

/// Run ingest once over `sources` (earlier sources win on key collisions).
///
/// Never fails: unavailable or malformed sources are logged, counted, and
/// contribute nothing.
pub async fn run_once(sources: &[Box<dyn CompanySource>]) -> IngestReport {
    ensure_metrics_described();

    let mut report = IngestReport::default();
    let mut batches = Vec::with_capacity(sources.len());

    for src in sources {
        let outcome = match src.load().await {
            Ok(batch) => {
                tracing::info!(
                    target: "ingest",
                    source = src.name(),
                    companies = batch.companies.len(),
                    skipped = batch.rows_skipped,
                    "read {} companies from {}",
                    batch.companies.len(),
                    src.name()
                );
                report.rows_read += batch.rows_read;
                report.rows_skipped += batch.rows_skipped;
                report.total_loaded += batch.companies.len();
                let outcome = SourceOutcome::Loaded {
                    companies: batch.companies.len(),
                    skipped_rows: batch.rows_skipped,
                };
                batches.push(batch.companies);
                outcome
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = %e, source = src.name(), "source skipped");
                counter!("directory_ingest_source_errors_total", "kind" => e.kind()).increment(1);
                match e {
                    DirectoryError::SourceUnavailable { reason, .. }
                    | DirectoryError::BoundaryFailure { reason } => {
                        SourceOutcome::Unavailable { reason }
                    }
                    DirectoryError::SourceMalformed { reason, .. } => {
                        SourceOutcome::Malformed { reason }
                    }
                }
            }
        };
        report.sources.push(SourceReport {
            source: src.name().to_string(),
            outcome,
        });
    }

    let (unique, dropped) = merge_dedup(batches);
    report.duplicates_dropped = dropped;
    report.companies = unique;

    tracing::info!(
        target: "ingest",
        total = report.total_loaded,
        unique = report.companies.len(),
        duplicates = dropped,
        "ingest finished"
    );

    let now = chrono::Utc::now().timestamp().max(0) as u64;
    counter!("directory_ingest_kept_total").increment(report.companies.len() as u64);
    counter!("directory_ingest_dedup_total").increment(dropped as u64);
    gauge!("directory_ingest_last_run_ts").set(now as f64);

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(name: &str, website: &str, team_size: u32) -> Company {
        Company {
            name: name.into(),
            website: website.into(),
            team_size,
            ..Default::default()
        }
    }

    #[test]
    fn first_source_wins_on_collision() {
        let a = vec![c("Acme", "a.co", 5)];
        let b = vec![c("Acme", "a.co", 50), c("Zen", "z.co", 3)];
        let (out, dropped) = merge_dedup(vec![a, b]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].team_size, 5);
        assert_eq!(out[1].name, "Zen");
        assert_eq!(dropped, 1);
    }

    #[test]
    fn dedup_ignores_case_and_keeps_order() {
        let a = vec![c("Zen", "z.co", 1), c("acme", "A.CO", 2), c("ACME", "a.co", 3)];
        let (out, dropped) = merge_dedup(vec![a]);
        let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Zen", "acme"]);
        assert_eq!(dropped, 1);
    }

    struct Failing(DirectoryError);

    #[async_trait::async_trait]
    impl CompanySource for Failing {
        async fn load(&self) -> Result<crate::ingest::types::SourceBatch, DirectoryError> {
            Err(match &self.0 {
                DirectoryError::BoundaryFailure { reason } => DirectoryError::boundary(reason),
                DirectoryError::SourceMalformed { source_name, reason } => {
                    DirectoryError::malformed(source_name, reason)
                }
                DirectoryError::SourceUnavailable { source_name, reason } => {
                    DirectoryError::unavailable(source_name, reason)
                }
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn source_errors_map_to_matching_outcomes() {
        let sources: Vec<Box<dyn CompanySource>> = vec![
            Box::new(Failing(DirectoryError::boundary("lock poisoned"))),
            Box::new(Failing(DirectoryError::malformed("failing", "bad header"))),
            Box::new(Failing(DirectoryError::unavailable("failing", "gone"))),
        ];
        let report = run_once(&sources).await;
        assert!(report.companies.is_empty());
        assert_eq!(
            report.sources[0].outcome,
            SourceOutcome::Unavailable {
                reason: "lock poisoned".into()
            }
        );
        assert!(matches!(report.sources[1].outcome, SourceOutcome::Malformed { .. }));
        assert!(matches!(report.sources[2].outcome, SourceOutcome::Unavailable { .. }));
    }

    #[test]
    fn same_name_different_website_is_distinct() {
        let (out, dropped) = merge_dedup(vec![vec![c("Acme", "a.co", 1), c("Acme", "acme.io", 1)]]);
        assert_eq!(out.len(), 2);
        assert_eq!(dropped, 0);
    }
}
