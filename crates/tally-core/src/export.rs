//! # CSV Export
//!
//! Flat tables rendered as CSV: header row first, comma separated, fields
//! containing a quote, comma or line break wrapped in double quotes with
//! inner quotes doubled.
//!
//! Rendering is pure; writing the bytes somewhere is the caller's business.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer could not be flushed: {0}")]
    Flush(String),

    #[error("CSV output is not valid UTF-8")]
    Encoding,
}

/// A header plus rows of already formatted cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CsvTable {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the table, rows separated by `\n`.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::export::CsvTable;
    ///
    /// let mut table = CsvTable::new(["Code", "Name"]);
    /// table.push_row(vec!["TIL-010".into(), "Tiles, White".into()]);
    /// assert_eq!(table.to_csv().unwrap(), "Code,Name\nTIL-010,\"Tiles, White\"\n");
    /// ```
    pub fn to_csv(&self) -> Result<String, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(Vec::new());

        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Flush(e.error().to_string()))?;
        String::from_utf8(bytes).map_err(|_| ExportError::Encoding)
    }
}
