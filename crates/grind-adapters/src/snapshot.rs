//! CSV snapshot of the aggregate store
//!
//! Layout (first column is the person key, as an indexed table export):
//!
//! ```text
//! ,Highest React,Mentions,Posts,Total,TimeStamp
//! Ada Lovelace,0,2,5,7,1700000000.0002
//! ```
//!
//! Columns after the key are located by header name. Counters accept float
//! spellings such as `3.0`; an empty `TimeStamp` reads as zero.

use crate::error::{AdapterError, AdapterResult};
use crate::traits::SnapshotStore;
use async_trait::async_trait;
use grind_core::{AggregateStore, CounterRow, PersonKey, Timestamp};
use std::path::{Path, PathBuf};

/// Default snapshot file name
pub const DEFAULT_SNAPSHOT_FILE: &str = "Total_Grind.csv";

const COLUMNS: [&str; 5] = ["Highest React", "Mentions", "Posts", "Total", "TimeStamp"];

/// Snapshot stored as a CSV file
#[derive(Debug, Clone)]
pub struct CsvSnapshot {
    path: PathBuf,
}

impl CsvSnapshot {
    /// Snapshot at `path`
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SnapshotStore for CsvSnapshot {
    async fn load(&self) -> AdapterResult<Option<AggregateStore>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No snapshot at {}, starting empty", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(AdapterError::io_error(&self.path, e)),
        };

        let store = parse_snapshot(&content)?;
        let inconsistent = store.inconsistent_rows();
        if !inconsistent.is_empty() {
            tracing::warn!(
                "Snapshot rows with Total != Posts + Mentions: {:?}",
                inconsistent
            );
        }
        tracing::debug!("Loaded {} rows from {}", store.len(), self.path.display());
        Ok(Some(store))
    }

    async fn save(&self, store: &AggregateStore) -> AdapterResult<()> {
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, render_snapshot(store)?)
            .await
            .map_err(|e| AdapterError::io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AdapterError::io_error(&self.path, e))?;
        tracing::info!("Saved {} rows to {}", store.len(), self.path.display());
        Ok(())
    }
}

/// Serialize store to CSV text
///
/// # Errors
/// `AdapterError::Snapshot` for a row whose name could not be read back
pub fn render_snapshot(store: &AggregateStore) -> AdapterResult<String> {
    let mut out = String::new();
    out.push(',');
    out.push_str(&COLUMNS.join(","));
    out.push('\n');

    for (i, (key, row)) in store.iter().enumerate() {
        if key.as_str().is_empty() {
            return Err(AdapterError::snapshot(i + 2, "refusing to write empty name"));
        }
        let fields = [
            quote(key.as_str()),
            row.highest_react.to_string(),
            row.mentions.to_string(),
            row.posts.to_string(),
            row.total.to_string(),
            row.last_seen.to_string(),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    Ok(out)
}

/// Parse CSV text into a store
///
/// # Errors
/// `AdapterError::Snapshot` on a missing column, bad number or duplicate key
pub fn parse_snapshot(content: &str) -> AdapterResult<AggregateStore> {
    let mut records = split_records(content)?.into_iter();

    let Some((header_line, header)) = records.next() else {
        return Ok(AggregateStore::new());
    };
    let index =
        ColumnIndex::from_header(&header).map_err(|m| AdapterError::snapshot(header_line, m))?;

    let mut store = AggregateStore::new();
    for (line_no, fields) in records {
        let (key, row) = index
            .row(&fields)
            .map_err(|m| AdapterError::snapshot(line_no, m))?;
        if store.insert_row(key.clone(), row).is_some() {
            return Err(AdapterError::snapshot(line_no, format!("duplicate name '{key}'")));
        }
    }
    Ok(store)
}

/// Positions of the named columns within a record
#[derive(Debug)]
struct ColumnIndex {
    highest_react: Option<usize>,
    mentions: usize,
    posts: usize,
    total: usize,
    timestamp: usize,
}

impl ColumnIndex {
    fn from_header(header: &[String]) -> Result<Self, String> {
        let find = |name: &str| header.iter().skip(1).position(|h| h.trim() == name).map(|p| p + 1);
        let require = |name: &str| find(name).ok_or_else(|| format!("missing column '{name}'"));
        Ok(Self {
            highest_react: find("Highest React"),
            mentions: require("Mentions")?,
            posts: require("Posts")?,
            total: require("Total")?,
            timestamp: require("TimeStamp")?,
        })
    }

    fn row(&self, fields: &[String]) -> Result<(PersonKey, CounterRow), String> {
        let cell = |i: usize| fields.get(i).map_or("", |s| s.as_str());
        let name = cell(0);
        if name.is_empty() {
            return Err("empty name".to_string());
        }
        let row = CounterRow {
            total: parse_counter("Total", cell(self.total))?,
            posts: parse_counter("Posts", cell(self.posts))?,
            mentions: parse_counter("Mentions", cell(self.mentions))?,
            highest_react: match self.highest_react {
                Some(i) => parse_counter("Highest React", cell(i))?,
                None => 0,
            },
            last_seen: parse_timestamp(cell(self.timestamp))?,
        };
        Ok((PersonKey::new(name), row))
    }
}

fn parse_counter(column: &str, raw: &str) -> Result<u64, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Ok(n);
    }
    match raw.parse::<f64>() {
        // Whole, non-negative floats only; `as` saturates above u64::MAX
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => Ok(f as u64),
        _ => Err(format!("bad {column} value '{raw}'")),
    }
}

fn parse_timestamp(raw: &str) -> Result<Timestamp, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Timestamp::ZERO);
    }
    raw.parse::<Timestamp>()
        .map_err(|e| format!("bad TimeStamp: {e}"))
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split CSV text into records, each tagged with its starting line
///
/// Quoted fields may span lines. Blank lines are skipped.
fn split_records(content: &str) -> AdapterResult<Vec<(usize, Vec<String>)>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = content.chars().peekable();
    let mut in_quotes = false;
    let mut line = 1;
    let mut start = 1;

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut field)),
            ('\r', false) if chars.peek() == Some(&'\n') => {}
            ('\n', false) => {
                fields.push(std::mem::take(&mut field));
                push_record(&mut records, start, std::mem::take(&mut fields));
                line += 1;
                start = line;
            }
            (c, _) => {
                if c == '\n' {
                    line += 1;
                }
                field.push(c);
            }
        }
    }
    if in_quotes {
        return Err(AdapterError::snapshot(start, "unterminated quoted field"));
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        push_record(&mut records, start, fields);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<(usize, Vec<String>)>, line: usize, fields: Vec<String>) {
    let blank = matches!(fields.as_slice(), [only] if only.trim().is_empty());
    if !blank {
        records.push((line, fields));
    }
}
