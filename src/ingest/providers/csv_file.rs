// src/ingest/providers/csv_file.rs
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use metrics::{counter, histogram};

use crate::company::{Company, Founder};
use crate::error::DirectoryError;
use crate::ingest::types::{CompanySource, SourceBatch};

pub const COL_COMPANY_NAME: &str = "Company Name";
pub const COL_WEBSITE: &str = "Website";
pub const COL_DESCRIPTION: &str = "Company Description";
pub const COL_INDUSTRY: &str = "Industry";
pub const COL_FOUNDER_NAME: &str = "Founder Name";
pub const COL_FOUNDER_LINKEDIN: &str = "Founder LinkedIn";
pub const COL_FOUNDED: &str = "Founded";
pub const COL_TEAM_SIZE: &str = "Team Size";
pub const COL_LOCATION: &str = "Location";
pub const COL_SOCIALS: &str = "Socials";

/// Header contract, in the order the source files usually carry it.
pub const COLUMNS: [&str; 10] = [
    COL_COMPANY_NAME,
    COL_WEBSITE,
    COL_DESCRIPTION,
    COL_INDUSTRY,
    COL_FOUNDER_NAME,
    COL_FOUNDER_LINKEDIN,
    COL_FOUNDED,
    COL_TEAM_SIZE,
    COL_LOCATION,
    COL_SOCIALS,
];

/// Column positions resolved from a header row. `None` = column absent.
#[derive(Debug, Default)]
struct ColumnMap {
    idx: [Option<usize>; COLUMNS.len()],
}

impl ColumnMap {
    fn from_headers(source_name: &str, headers: &csv::StringRecord) -> Result<Self, DirectoryError> {
        let mut map = ColumnMap::default();
        for (pos, raw) in headers.iter().enumerate() {
            let h = raw.trim_start_matches('\u{feff}').trim();
            if let Some(slot) = COLUMNS.iter().position(|c| *c == h) {
                map.idx[slot].get_or_insert(pos);
                continue;
            }
            // Same letters, different spelling: the contract is exact, so refuse
            // the source rather than silently dropping the column.
            let key = header_key(h);
            if let Some(expected) = COLUMNS.iter().find(|c| header_key(c) == key) {
                return Err(DirectoryError::malformed(
                    source_name,
                    format!("column '{h}' does not match expected header '{expected}'"),
                ));
            }
        }
        if map.idx[0].is_none() {
            return Err(DirectoryError::malformed(
                source_name,
                format!("missing required column '{COL_COMPANY_NAME}'"),
            ));
        }
        Ok(map)
    }

    fn cell<'r>(&self, record: &'r csv::StringRecord, column: &str) -> &'r str {
        COLUMNS
            .iter()
            .position(|c| *c == column)
            .and_then(|slot| self.idx[slot])
            .and_then(|pos| record.get(pos))
            .unwrap_or_default()
    }
}

fn header_key(h: &str) -> String {
    h.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parse CSV bytes into companies tagged with `source_tag`.
///
/// Header problems fail the whole source; row problems skip that row only.
pub fn parse_companies(
    source_name: &str,
    source_tag: Option<&str>,
    bytes: &[u8],
) -> Result<SourceBatch, DirectoryError> {
    let t0 = std::time::Instant::now();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| DirectoryError::malformed(source_name, e))?
        .clone();
    if headers.is_empty() {
        return Err(DirectoryError::malformed(source_name, "empty header row"));
    }
    let columns = ColumnMap::from_headers(source_name, &headers)?;

    let mut batch = SourceBatch::default();
    for (line, result) in reader.records().enumerate() {
        batch.rows_read += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                batch.rows_skipped += 1;
                let err = DirectoryError::malformed(source_name, e);
                tracing::warn!(target: "ingest", row = line + 1, error = %err, "skipping row");
                continue;
            }
        };
        match company_from_record(&columns, &record, source_tag) {
            Some(c) => batch.companies.push(c),
            None => {
                batch.rows_skipped += 1;
                tracing::warn!(
                    target: "ingest",
                    source = source_name,
                    row = line + 1,
                    "skipping row without company name"
                );
            }
        }
    }

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("directory_ingest_parse_ms").record(ms);
    counter!("directory_ingest_rows_total").increment(batch.rows_read as u64);
    counter!("directory_ingest_malformed_rows_total").increment(batch.rows_skipped as u64);

    Ok(batch)
}

fn company_from_record(
    columns: &ColumnMap,
    record: &csv::StringRecord,
    source_tag: Option<&str>,
) -> Option<Company> {
    let name = columns.cell(record, COL_COMPANY_NAME);
    if name.is_empty() {
        return None;
    }
    Some(Company {
        name: name.to_string(),
        website: columns.cell(record, COL_WEBSITE).to_string(),
        description: columns.cell(record, COL_DESCRIPTION).to_string(),
        industry: columns.cell(record, COL_INDUSTRY).to_string(),
        founders: parse_founders(
            columns.cell(record, COL_FOUNDER_NAME),
            columns.cell(record, COL_FOUNDER_LINKEDIN),
        ),
        founded: columns.cell(record, COL_FOUNDED).to_string(),
        team_size: parse_team_size(columns.cell(record, COL_TEAM_SIZE)),
        location: columns.cell(record, COL_LOCATION).to_string(),
        socials: columns.cell(record, COL_SOCIALS).to_string(),
        source: source_tag.map(str::to_string),
    })
}

/// Pair comma-separated founder names with comma-separated LinkedIn URLs by
/// position. Names without a matching URL get an empty one.
pub fn parse_founders(names: &str, linkedins: &str) -> Vec<Founder> {
    if names.trim().is_empty() {
        return Vec::new();
    }
    let urls: Vec<&str> = if linkedins.trim().is_empty() {
        Vec::new()
    } else {
        linkedins.split(',').map(str::trim).collect()
    };
    names
        .split(',')
        .map(str::trim)
        .enumerate()
        .map(|(i, name)| Founder {
            name: name.to_string(),
            linkedin: urls.get(i).copied().unwrap_or_default().to_string(),
        })
        .collect()
}

/// Non-negative integer team size; decimals truncate, everything else is 0.
pub fn parse_team_size(raw: &str) -> u32 {
    let t = raw.trim();
    if let Ok(n) = t.parse::<u32>() {
        return n;
    }
    match t.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 => f.trunc().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

/// A CSV file on disk. The provenance tag is the file name.
pub struct CsvFileSource {
    path: PathBuf,
    name: String,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CompanySource for CsvFileSource {
    async fn load(&self) -> Result<SourceBatch, DirectoryError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            DirectoryError::unavailable(&self.name, format!("{}: {e}", self.path.display()))
        })?;
        parse_companies(&self.name, Some(&self.name), &bytes)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// In-memory CSV text, for fixtures and tests.
pub struct CsvTextSource {
    name: String,
    content: String,
}

impl CsvTextSource {
    pub fn from_fixture(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.to_string(),
        }
    }
}

#[async_trait]
impl CompanySource for CsvTextSource {
    async fn load(&self) -> Result<SourceBatch, DirectoryError> {
        parse_companies(&self.name, Some(&self.name), self.content.as_bytes())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Company Name,Website,Company Description,Industry,Founder Name,Founder LinkedIn,Founded,Team Size,Location,Socials";

    #[test]
    fn founders_pair_positionally() {
        let f = parse_founders("Ann, Bob ,Cy", "https://l/ann, https://l/bob");
        assert_eq!(f.len(), 3);
        assert_eq!(f[0].linkedin, "https://l/ann");
        assert_eq!(f[1].name, "Bob");
        assert_eq!(f[1].linkedin, "https://l/bob");
        assert_eq!(f[2].linkedin, "");
        assert!(parse_founders("", "https://l/ann").is_empty());
    }

    #[test]
    fn team_size_parsing() {
        assert_eq!(parse_team_size("12"), 12);
        assert_eq!(parse_team_size(" 7 "), 7);
        assert_eq!(parse_team_size("12.9"), 12);
        assert_eq!(parse_team_size(""), 0);
        assert_eq!(parse_team_size("-4"), 0);
        assert_eq!(parse_team_size("about 20"), 0);
        assert_eq!(parse_team_size("NaN"), 0);
    }

    #[test]
    fn parses_full_row() {
        let csv = format!(
            "{HEADER}\nAcme,https://acme.co,\"Cloud tools, fast\",\"saas, ai\",\"Ann, Bob\",https://l/ann,2021,12,\"New York, NY\",https://x.com/acme\n"
        );
        let batch = parse_companies("list1.csv", Some("list1.csv"), csv.as_bytes()).unwrap();
        assert_eq!(batch.rows_read, 1);
        assert_eq!(batch.rows_skipped, 0);
        let c = &batch.companies[0];
        assert_eq!(c.name, "Acme");
        assert_eq!(c.description, "Cloud tools, fast");
        assert_eq!(c.industry, "saas, ai");
        assert_eq!(c.founders.len(), 2);
        assert_eq!(c.founders[1].linkedin, "");
        assert_eq!(c.team_size, 12);
        assert_eq!(c.location, "New York, NY");
        assert_eq!(c.source.as_deref(), Some("list1.csv"));
    }

    #[test]
    fn missing_optional_columns_default() {
        let csv = "Company Name,Website\nAcme,a.co\n";
        let batch = parse_companies("t", None, csv.as_bytes()).unwrap();
        let c = &batch.companies[0];
        assert_eq!(c.website, "a.co");
        assert_eq!(c.team_size, 0);
        assert!(c.founders.is_empty());
        assert_eq!(c.founded, "");
        assert_eq!(c.source, None);
    }

    #[test]
    fn misspelled_header_fails_source() {
        let csv = "Company Name,Website,team size\nAcme,a.co,3\n";
        let err = parse_companies("t", None, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DirectoryError::SourceMalformed { .. }));
    }

    #[test]
    fn missing_name_column_fails_source() {
        let csv = "Name,Website\nAcme,a.co\n";
        let err = parse_companies("t", None, csv.as_bytes()).unwrap_err();
        assert_eq!(err.kind(), "malformed");
    }

    #[test]
    fn unrelated_extra_columns_are_ignored() {
        let csv = "Company Name,Batch,Website\nAcme,W21,a.co\n";
        let batch = parse_companies("t", None, csv.as_bytes()).unwrap();
        assert_eq!(batch.companies[0].website, "a.co");
    }

    #[test]
    fn bad_rows_are_skipped_individually() {
        let mut bytes = b"Company Name,Website\nAcme,a.co\n".to_vec();
        bytes.extend_from_slice(b"Bad\xff\xfe,b.co\n");
        bytes.extend_from_slice(b",c.co\n");
        bytes.extend_from_slice(b"Zen,z.co\n");
        let batch = parse_companies("t", None, &bytes).unwrap();
        let names: Vec<&str> = batch.companies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Zen"]);
        assert_eq!(batch.rows_read, 4);
        assert_eq!(batch.rows_skipped, 2);
    }

    #[test]
    fn blank_lines_between_rows_are_skipped() {
        let csv = "Company Name,Website\n\nAcme,a.co\n\nZen,z.co\n\n\nOrbit,o.co\n\n";
        let batch = parse_companies("t", None, csv.as_bytes()).unwrap();
        let names: Vec<&str> = batch.companies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Zen", "Orbit"]);
        assert_eq!(batch.rows_read, 3);
        assert_eq!(batch.rows_skipped, 0);
    }

    #[test]
    fn short_rows_tolerated() {
        let csv = format!("{HEADER}\nAcme,a.co\n");
        let batch = parse_companies("t", None, csv.as_bytes()).unwrap();
        assert_eq!(batch.companies.len(), 1);
        assert_eq!(batch.companies[0].location, "");
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let src = CsvFileSource::new("definitely/not/here/list9.csv");
        assert_eq!(src.name(), "list9.csv");
        let err = src.load().await.unwrap_err();
        assert!(matches!(err, DirectoryError::SourceUnavailable { .. }));
    }
}
