//! # CSV table
//!
//! A loosely typed CSV table. Trajectory and boundary files carry a varying set of columns, the
//! table keeps every one of them as text so that columns the tools don't understand survive a
//! load/save round trip untouched.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use csv::{ReaderBuilder, WriterBuilder};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A CSV table held in memory, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors reading or writing tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Cannot open {0:?}: {1}")]
    OpenError(PathBuf, std::io::Error),

    #[error("Cannot read the CSV data: {0}")]
    ReadError(csv::Error),

    #[error("Cannot write the CSV data: {0}")]
    WriteError(csv::Error),

    #[error("Cannot flush the CSV data: {0}")]
    FlushError(std::io::Error),
}

/// A row of a table which is missing a required value, or holds one that can't be used.
///
/// Rows are counted from 0, not including the header.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Malformed row {row}: column `{column}` {reason}")]
pub struct MalformedRowError {
    pub row: usize,
    pub column: String,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CsvTable {
    /// Create a new empty table with the given headers.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Read a table from the file at the given path.
    ///
    /// The file is only held open for the duration of the read.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let file = std::fs::File::open(path.as_ref())
            .map_err(|e| TableError::OpenError(path.as_ref().to_path_buf(), e))?;

        Self::from_reader(file)
    }

    /// Read a table from any reader. The first record is the header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .comment(Some(b'#'))
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(TableError::ReadError)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(TableError::ReadError)?;
            rows.push(record.iter().map(String::from).collect());
        }

        Ok(Self { headers, rows })
    }

    /// Write the table to the file at the given path, creating parent directories if needed.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), TableError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| TableError::OpenError(path.to_path_buf(), e))?;
            }
        }

        let file =
            std::fs::File::create(path).map_err(|e| TableError::OpenError(path.to_path_buf(), e))?;

        self.to_writer(file)
    }

    /// Write the table to any writer.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

        wtr.write_record(&self.headers)
            .map_err(TableError::WriteError)?;
        for row in self.rows.iter() {
            wtr.write_record(row).map_err(TableError::WriteError)?;
        }

        wtr.flush().map_err(TableError::FlushError)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the index of the column with the given header.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Get the index of the column with the given header, appending an empty column if it
    /// doesn't exist yet.
    pub fn ensure_column(&mut self, column: &str) -> usize {
        match self.column_index(column) {
            Some(i) => i,
            None => {
                self.headers.push(column.to_string());
                for row in self.rows.iter_mut() {
                    row.push(String::new());
                }
                self.headers.len() - 1
            }
        }
    }

    /// Get a row of the table.
    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    /// Append a row. Short rows are padded with empty cells, long rows are truncated.
    pub fn push_row(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Get the text in a cell, or `None` if the column doesn't exist.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.column_index(column)?;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
    }

    /// Returns true if the column exists and every row has a non-blank value in it.
    pub fn has_values(&self, column: &str) -> bool {
        match self.column_index(column) {
            Some(col) => self
                .rows
                .iter()
                .all(|r| r.get(col).map(|c| !c.trim().is_empty()).unwrap_or(false)),
            None => false,
        }
    }

    /// Parse the value in a cell as a float.
    pub fn float(&self, row: usize, column: &str) -> Result<f64, MalformedRowError> {
        let malformed = |reason: String| MalformedRowError {
            row,
            column: column.to_string(),
            reason,
        };

        let text = match self.cell(row, column) {
            Some(t) => t.trim(),
            None => return Err(malformed(String::from("is missing"))),
        };

        if text.is_empty() {
            return Err(malformed(String::from("is empty")));
        }

        let value: f64 = text
            .parse()
            .map_err(|_| malformed(format!("has a non-numeric value \"{}\"", text)))?;

        if !value.is_finite() {
            return Err(malformed(format!("has a non-finite value \"{}\"", text)));
        }

        Ok(value)
    }

    /// Parse a whole column as floats.
    pub fn float_column(&self, column: &str) -> Result<Vec<f64>, MalformedRowError> {
        (0..self.num_rows()).map(|r| self.float(r, column)).collect()
    }
}
