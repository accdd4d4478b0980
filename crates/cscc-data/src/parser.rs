//! Streaming CSV parser with per-column numeric coercion.
//!
//! [`RowStream`] reads one row per `next()` call, so a filter can discard rows
//! before the rest of the file is read. The end of the iterator is the
//! completion signal; [`RowStream::summary`] is final once it has been reached.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{DataError, DataResult, RowError};
use crate::record::{Field, Record};

/// Where CSV text comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum CsvSource {
    Path(PathBuf),
    Inline(String),
}

impl CsvSource {
    pub fn describe(&self) -> String {
        match self {
            CsvSource::Path(path) => path.display().to_string(),
            CsvSource::Inline(content) => format!("<inline, {} bytes>", content.len()),
        }
    }

    fn open(&self) -> DataResult<Box<dyn Read + Send>> {
        match self {
            CsvSource::Path(path) => {
                let file = File::open(path).map_err(|e| DataError::SourceOpen {
                    path: path.clone(),
                    source: e,
                })?;
                Ok(Box::new(io::BufReader::new(file)))
            }
            CsvSource::Inline(content) => Ok(Box::new(io::Cursor::new(content.clone().into_bytes()))),
        }
    }
}

/// Which columns are eligible for numeric coercion.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum NumericColumns {
    #[default]
    None,
    Named(HashSet<String>),
    /// Every column whose name does not start with the prefix.
    AllExceptPrefix(String),
}

impl NumericColumns {
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NumericColumns::Named(names.into_iter().map(Into::into).collect())
    }

    pub fn is_numeric(&self, column: &str) -> bool {
        match self {
            NumericColumns::None => false,
            NumericColumns::Named(names) => names.contains(column),
            NumericColumns::AllExceptPrefix(prefix) => !column.starts_with(prefix.as_str()),
        }
    }
}

/// Counters collected while a stream is consumed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseSummary {
    pub rows_read: usize,
    /// Rows delivered best-effort (ragged or not valid UTF-8).
    pub malformed: usize,
    pub row_errors: Vec<RowError>,
    pub complete: bool,
}

pub struct RowParser {
    source: CsvSource,
    numeric: NumericColumns,
}

impl RowParser {
    pub fn new(source: CsvSource) -> Self {
        Self {
            source,
            numeric: NumericColumns::None,
        }
    }

    pub fn numeric_columns(mut self, numeric: NumericColumns) -> Self {
        self.numeric = numeric;
        self
    }

    /// Open the source and read the header row.
    pub fn rows(self) -> DataResult<RowStream> {
        let description = self.source.describe();
        let reader = self.source.open()?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Arc<[String]> = reader
            .byte_headers()?
            .iter()
            .map(|h| String::from_utf8_lossy(h).trim().to_string())
            .collect::<Vec<_>>()
            .into();
        let numeric = headers
            .iter()
            .map(|h| self.numeric.is_numeric(h))
            .collect();

        debug!(source = %description, columns = headers.len(), "opened csv source");

        Ok(RowStream {
            reader,
            headers,
            numeric,
            buffer: csv::ByteRecord::new(),
            summary: ParseSummary::default(),
            done: false,
        })
    }
}

pub struct RowStream {
    reader: csv::Reader<Box<dyn Read + Send>>,
    headers: Arc<[String]>,
    numeric: Vec<bool>,
    buffer: csv::ByteRecord,
    summary: ParseSummary,
    done: bool,
}

impl RowStream {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn summary(&self) -> &ParseSummary {
        &self.summary
    }

    pub fn into_summary(self) -> ParseSummary {
        self.summary
    }

    fn build_record(&mut self, line: u64) -> Record {
        let mut malformed = self.buffer.len() != self.headers.len();
        let mut values = Vec::with_capacity(self.buffer.len().min(self.headers.len()));
        for (idx, raw) in self.buffer.iter().enumerate().take(self.headers.len()) {
            let text = match std::str::from_utf8(raw) {
                Ok(s) => s.to_string(),
                Err(_) => {
                    malformed = true;
                    String::from_utf8_lossy(raw).into_owned()
                }
            };
            let numeric = self.numeric.get(idx).copied().unwrap_or(false);
            values.push(Field::coerce(&text, numeric));
        }
        if malformed {
            self.summary.malformed += 1;
            warn!(
                line,
                fields = self.buffer.len(),
                expected = self.headers.len(),
                "malformed csv row, keeping best-effort values"
            );
        }
        Record::new(line, Arc::clone(&self.headers), values)
    }
}

impl Iterator for RowStream {
    type Item = Result<Record, RowError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_byte_record(&mut self.buffer) {
            Ok(true) => {
                self.summary.rows_read += 1;
                let line = self.buffer.position().map(|p| p.line()).unwrap_or(0);
                Some(Ok(self.build_record(line)))
            }
            Ok(false) => {
                self.done = true;
                self.summary.complete = true;
                None
            }
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                // An I/O failure cannot be resumed; anything else skips one row.
                if e.is_io_error() {
                    self.done = true;
                }
                let err = RowError::new(line, format!("CSV parse error: {e}"));
                warn!(%err, "skipping unreadable csv row");
                self.summary.row_errors.push(err.clone());
                Some(Err(err))
            }
        }
    }
}
