//! # era5-extract
//!
//! Point time series extraction from gridded reanalysis data (ERA5-Land).
//!
//! This crate provides:
//! - Validated latitude/longitude grids with either latitude orientation
//! - Bilinear point interpolation with explicit boundary and missing-data handling
//! - A reference interpolator for cross-checking
//! - Grid sources (in-memory, NetCDF) with CF time decoding
//! - Metadata/coordinates tables and series table output
//! - Single-series and batch extraction drivers

pub mod batch;
pub mod config;
pub mod grid;
pub mod interpolate;
pub mod series;
pub mod source;
pub mod table;
pub mod types;

// Re-export main types for convenience
pub use batch::{BatchPlan, BatchSummary, Job, JobReport, JobStatus, run_batch, run_job};
pub use config::{ArchiveLayout, ConfigError, DEFAULT_PATTERN, ExtractConfig};
pub use grid::{Field, Grid, GridError, Orientation};
pub use interpolate::{
    BoundaryPolicy, Bracket, InterpolationError, interpolate, interpolate_on,
    interpolate_reference, locate,
};
pub use series::{ExtractError, ExtractOptions, PointSeries, SeriesRow, extract_point_series};
#[cfg(feature = "netcdf")]
pub use source::NetcdfSource;
pub use source::{
    GridSource, MemoryOpener, MemorySource, NetcdfOpener, SourceError, SourceOpener,
};
pub use table::{CoordinatesTable, Location, MetadataTable, TableError, VariableMeta};
pub use types::{GeoBounds, GeoPoint, LatIndex, LonIndex, TimeIndex};
