//! CSV grounding context
//!
//! Parses an uploaded product sheet into header-keyed rows and keeps a bounded
//! prefix of them, serialized as a JSON array, for the model's system prompt.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;

use crate::Result;

/// Rows kept for the prompt unless configured otherwise
pub const DEFAULT_CONTEXT_ROWS: usize = 25;

/// One CSV record keyed by header name, in header order
pub type Row = IndexMap<String, String>;

/// Bounded CSV context handed to the inference step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvContext {
    rows: Vec<Row>,
    total_rows: usize,
    serialized: String,
}

impl CsvContext {
    /// Parse a CSV file from disk
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or is not valid CSV
    pub fn from_path(path: impl AsRef<Path>, limit: usize) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), limit, "parsing CSV file");
        let file = File::open(path)?;
        Self::from_reader(file, limit)
    }

    /// Parse CSV data with a header row, keeping the first `limit` data rows
    ///
    /// Empty lines are skipped. Short rows omit their missing columns and
    /// fields past the last header are dropped. A repeated header name gets a
    /// numeric suffix (`price`, `price_1`, ...) so no column is lost.
    ///
    /// # Errors
    ///
    /// Returns error if the data is not valid CSV
    pub fn from_reader<R: Read>(reader: R, limit: usize) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = unique_headers(reader.headers()?);
        let mut rows = Vec::with_capacity(limit.min(64));
        let mut total_rows = 0;

        for record in reader.records() {
            let record = record?;
            if is_blank(&record) {
                continue;
            }

            total_rows += 1;
            if rows.len() >= limit {
                continue;
            }

            if record.len() > headers.len() {
                tracing::warn!(
                    row = total_rows,
                    fields = record.len(),
                    columns = headers.len(),
                    "dropping fields beyond the header"
                );
            }

            rows.push(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(column, value)| (column.clone(), value.to_string()))
                    .collect(),
            );
        }

        let serialized = serde_json::to_string(&rows)?;

        tracing::info!(total_rows, kept = rows.len(), "CSV context built");

        Ok(Self {
            rows,
            total_rows,
            serialized,
        })
    }

    /// Rows kept for the prompt
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of data rows in the source file, before truncation
    #[must_use]
    pub const fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Kept rows as a JSON array of objects
    #[must_use]
    pub fn as_text(&self) -> &str {
        &self.serialized
    }
}

/// Header names with repeats renamed to `<name>_<n>`
fn unique_headers(record: &csv::StringRecord) -> Vec<String> {
    let mut seen: HashSet<String> = record.iter().map(str::to_string).collect();
    let mut headers: Vec<String> = Vec::with_capacity(record.len());

    for name in record {
        if !headers.iter().any(|h| h == name) {
            headers.push(name.to_string());
            continue;
        }

        let mut n = 1;
        let renamed = loop {
            let candidate = format!("{name}_{n}");
            if !seen.contains(&candidate) {
                break candidate;
            }
            n += 1;
        };
        tracing::debug!(column = name, renamed = %renamed, "renaming duplicate header");
        seen.insert(renamed.clone());
        headers.push(renamed);
    }
    headers
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.is_empty() || (record.len() == 1 && record[0].is_empty())
}
