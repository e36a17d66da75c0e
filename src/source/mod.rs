//! Sources of gridded time-step fields.
//!
//! A [`GridSource`] exposes one grid, its time axis and per-step 2D fields
//! by dataset field name. Implementations:
//! - [`MemorySource`]: fields already in memory
//! - `NetcdfSource`: ERA5-Land style NetCDF files (requires `netcdf` feature)
//!
//! A [`SourceOpener`] turns a file path into a source, so the batch driver
//! is independent of where grids come from.

mod memory;
#[cfg(feature = "netcdf")]
mod netcdf_source;
mod time_axis;

pub use memory::{MemoryOpener, MemorySource};
#[cfg(feature = "netcdf")]
pub use netcdf_source::NetcdfSource;
pub use time_axis::{TimeUnit, TimeUnits, decode_times};

use std::path::Path;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::grid::{Field, Grid, GridError};
use crate::types::TimeIndex;

/// Error type for grid sources.
#[derive(Debug, Error)]
pub enum SourceError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// NetCDF library error
    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    /// Missing variable
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Invalid data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Coordinates or field shapes fail grid validation
    #[error("Invalid grid: {0}")]
    Grid(#[from] GridError),

    /// Unparseable CF time units
    #[error("Invalid time units: '{0}'")]
    TimeUnits(String),

    /// Requested step beyond the time axis
    #[error("time index {index} out of range ({n_times} steps)")]
    TimeIndex { index: TimeIndex, n_times: usize },

    /// Feature not enabled
    #[error("NetCDF feature not enabled")]
    FeatureDisabled,
}

/// Gridded data for one file: a grid, a time axis and named fields.
pub trait GridSource {
    /// Grid shared by every field of the source.
    fn grid(&self) -> &Grid;

    /// Timestamps of the time axis, in file order.
    fn times(&self) -> &[NaiveDateTime];

    /// Whether a field with this dataset name exists.
    fn has_field(&self, field_name: &str) -> bool;

    /// Read one time step of a field.
    fn read_field(&self, field_name: &str, t: TimeIndex) -> Result<Field, SourceError>;

    /// Number of time steps.
    fn n_times(&self) -> usize {
        self.times().len()
    }
}

/// Opens a [`GridSource`] for a file path.
///
/// The source owns any file handle; dropping it releases the file.
pub trait SourceOpener: Sync {
    type Source: GridSource;

    fn open(&self, path: &Path) -> Result<Self::Source, SourceError>;
}

/// Opener for NetCDF grid files.
///
/// Without the `netcdf` feature every open fails with
/// [`SourceError::FeatureDisabled`].
#[derive(Clone, Copy, Debug, Default)]
pub struct NetcdfOpener;

impl SourceOpener for NetcdfOpener {
    #[cfg(feature = "netcdf")]
    type Source = NetcdfSource;
    #[cfg(not(feature = "netcdf"))]
    type Source = MemorySource;

    #[cfg(feature = "netcdf")]
    fn open(&self, path: &Path) -> Result<Self::Source, SourceError> {
        NetcdfSource::open(path)
    }

    #[cfg(not(feature = "netcdf"))]
    fn open(&self, _path: &Path) -> Result<Self::Source, SourceError> {
        Err(SourceError::FeatureDisabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "netcdf"))]
    #[test]
    fn test_netcdf_opener_without_feature() {
        assert!(matches!(
            NetcdfOpener.open(Path::new("t2m_2018_01.nc")),
            Err(SourceError::FeatureDisabled)
        ));
    }

    #[test]
    fn test_error_messages() {
        let e = SourceError::TimeIndex {
            index: TimeIndex::new(5),
            n_times: 3,
        };
        assert_eq!(e.to_string(), "time index t#5 out of range (3 steps)");
        assert_eq!(
            SourceError::MissingVariable("t2m".into()).to_string(),
            "Missing variable: t2m"
        );
    }
}
