//! Series table writer (`date,<short_name>` rows).

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;

use super::TableError;
use crate::series::PointSeries;

/// Timestamp format of the `date` column.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Row-by-row writer for one extracted series.
///
/// Undefined values are written as empty fields.
pub struct SeriesWriter<W: Write> {
    inner: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> SeriesWriter<W> {
    /// Create a writer and emit the header row.
    pub fn new(writer: W, value_column: &str, delimiter: u8) -> Result<Self, TableError> {
        let mut inner = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(writer);
        inner.write_record(["date", value_column])?;
        Ok(Self { inner, rows: 0 })
    }

    /// Append one row.
    pub fn write_row(&mut self, time: NaiveDateTime, value: Option<f64>) -> Result<(), TableError> {
        let date = time.format(DATE_FORMAT).to_string();
        let value = value.map(|v| v.to_string()).unwrap_or_default();
        self.inner.write_record([date.as_str(), value.as_str()])?;
        self.rows += 1;
        Ok(())
    }

    /// Flush and return the number of data rows written.
    pub fn finish(mut self) -> Result<usize, TableError> {
        self.inner.flush()?;
        Ok(self.rows)
    }
}

/// Write a whole series to any writer.
pub fn write_series<W: Write>(
    writer: W,
    series: &PointSeries,
    delimiter: u8,
) -> Result<usize, TableError> {
    let mut out = SeriesWriter::new(writer, &series.variable, delimiter)?;
    for row in series.iter() {
        out.write_row(row.time, row.value)?;
    }
    out.finish()
}

/// Write a series to `path`, creating parent directories.
///
/// Data goes to a `.part` sibling first and is renamed into place, so an
/// interrupted run never leaves a complete-looking table behind. On error
/// the `.part` file is removed.
pub fn write_series_file(
    path: &Path,
    series: &PointSeries,
    delimiter: u8,
) -> Result<usize, TableError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = Path::new(&part);

    let result = fs::File::create(part)
        .map_err(TableError::from)
        .and_then(|file| write_series(std::io::BufWriter::new(file), series, delimiter))
        .and_then(|rows| {
            fs::rename(part, path)?;
            Ok(rows)
        });
    if result.is_err() {
        // The partial file may not exist if creation itself failed.
        let _ = fs::remove_file(part);
    }
    result
}
