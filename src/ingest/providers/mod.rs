// src/ingest/providers/mod.rs
pub mod csv_file;

pub use csv_file::{CsvFileSource, CsvTextSource};
