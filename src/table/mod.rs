//! Delimited tables: lookup inputs and series output.
//!
//! - **Metadata table**: variable short name → dataset field name
//! - **Coordinates table**: location index → latitude/longitude
//! - **Series table**: `date,<short_name>` rows written per extraction
//!
//! # File Formats
//!
//! ## Metadata
//!
//! ```text
//! short_name,field_name,long_name,units
//! T2,t2m,2 metre temperature,K
//! TPRC,tp,Total precipitation,m
//! ```
//!
//! ## Coordinates
//!
//! ```text
//! index,name,latitude,longitude
//! 0,Ankara,39.93,32.86
//! 1,Izmir,38.42,27.14
//! ```
//!
//! Lookups are keyed and return [`TableError`] when the key is absent.

mod coordinates;
mod metadata;
mod writer;

pub use coordinates::{CoordinatesTable, Location};
pub use metadata::{MetadataTable, VariableMeta};
pub use writer::{DATE_FORMAT, SeriesWriter, write_series, write_series_file};

use thiserror::Error;

/// Error type for table reading, lookup and writing.
#[derive(Debug, Error)]
pub enum TableError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed delimited data
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Short name absent from the metadata table
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// Index absent from the coordinates table
    #[error("Unknown location index: {0}")]
    UnknownLocation(usize),

    /// Same key listed twice
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Invalid row content
    #[error("Invalid row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    /// Table has no rows
    #[error("Table {0} contains no rows")]
    Empty(String),
}

pub(crate) fn reader_builder(delimiter: u8) -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'));
    builder
}
