//! Single-point time series extraction.
//!
//! [`extract_point_series`] walks the time axis of one [`GridSource`],
//! interpolating one variable at one point per step. The bracket around the
//! point depends only on the grid, so it is located once and reused for
//! every step.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use era5_extract::grid::{Field, Grid};
//! use era5_extract::series::{ExtractOptions, extract_point_series};
//! use era5_extract::source::MemorySource;
//! use era5_extract::table::VariableMeta;
//! use era5_extract::types::GeoPoint;
//!
//! let grid = Grid::new(vec![52.0, 51.9], vec![10.0, 10.1]).unwrap();
//! let t0 = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let field = Field::from_rows(vec![vec![300.0, 302.0], vec![298.0, 299.0]]).unwrap();
//! let source = MemorySource::new(grid, vec![t0]).with_field("t2m", vec![field]).unwrap();
//!
//! let meta = VariableMeta {
//!     short_name: "T2".into(),
//!     field_name: "t2m".into(),
//!     long_name: None,
//!     units: None,
//! };
//! let series = extract_point_series(
//!     &source,
//!     &meta,
//!     GeoPoint::new(51.95, 10.05),
//!     ExtractOptions::default(),
//! )
//! .unwrap();
//! assert!((series.values()[0].unwrap() - 299.75).abs() < 1e-9);
//! ```

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ConfigError;
use crate::interpolate::{
    BoundaryPolicy, InterpolationError, REFERENCE_TOLERANCE, agrees, interpolate_reference, locate,
};
use crate::source::{GridSource, SourceError};
use crate::table::{TableError, VariableMeta};
use crate::types::{GeoPoint, TimeIndex};

/// Error type for extraction runs.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Per-series interpolation options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub boundary: BoundaryPolicy,
    pub verify_reference: bool,
}

/// One time step of an extracted series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeriesRow {
    pub time: NaiveDateTime,
    /// `None` when a bracket corner was missing
    pub value: Option<f64>,
}

/// Time series of one variable at one point, in time-step order.
#[derive(Clone, Debug, PartialEq)]
pub struct PointSeries {
    /// Variable short name (output column header)
    pub variable: String,
    /// Requested location
    pub point: GeoPoint,
    rows: Vec<SeriesRow>,
}

impl PointSeries {
    pub fn new(variable: impl Into<String>, point: GeoPoint) -> Self {
        Self {
            variable: variable.into(),
            point,
            rows: Vec::new(),
        }
    }

    /// Append a row.
    pub fn push(&mut self, row: SeriesRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesRow> {
        self.rows.iter()
    }

    pub fn times(&self) -> Vec<NaiveDateTime> {
        self.rows.iter().map(|r| r.time).collect()
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.value).collect()
    }

    /// Number of undefined steps.
    pub fn n_undefined(&self) -> usize {
        self.rows.iter().filter(|r| r.value.is_none()).count()
    }

}

/// Interpolate `variable` at `point` for every time step of `source`.
///
/// Longitudes given in -180..180 are shifted onto grids stored in 0..360
/// (and vice versa). Out-of-range points and grid errors abort the series;
/// steps with missing corners are kept as undefined rows.
pub fn extract_point_series<S: GridSource + ?Sized>(
    source: &S,
    variable: &VariableMeta,
    point: GeoPoint,
    options: ExtractOptions,
) -> Result<PointSeries, ExtractError> {
    let field_name = variable.field_name.as_str();
    if !source.has_field(field_name) {
        return Err(SourceError::MissingVariable(field_name.to_string()).into());
    }

    let grid = source.grid();
    let query = GeoPoint::new(point.lat, grid.wrap_longitude(point.lon));
    let bracket = locate(grid, query, options.boundary)?;
    debug!(
        "{} at {}: rows {}..{}, cols {}..{} on {}",
        variable.short_name,
        query,
        bracket.south(),
        bracket.north(),
        bracket.west(),
        bracket.east(),
        grid.summary()
    );

    let mut series = PointSeries::new(variable.short_name.clone(), point);
    let mut mismatches = 0usize;
    for (t, &time) in TimeIndex::iter(source.n_times()).zip(source.times()) {
        let field = source.read_field(field_name, t)?;
        let value = bracket.apply(&field).map_err(InterpolationError::from)?;
        if value.is_none() {
            debug!(
                "{} undefined at {} ({}: {} missing cells in field)",
                variable.short_name,
                time,
                t,
                field.count_missing()
            );
        }

        if options.verify_reference {
            let reference = interpolate_reference(grid, &field, bracket.point)?;
            if !agrees(value, reference, REFERENCE_TOLERANCE) {
                mismatches += 1;
                debug!(
                    "{}: {:?} vs reference {:?} at {}",
                    variable.short_name, value, reference, time
                );
            }
        }

        series.push(SeriesRow { time, value });
    }

    let undefined = series.n_undefined();
    if undefined > 0 {
        warn!(
            "{} at {}: {} of {} steps undefined (missing grid values)",
            variable.short_name,
            point,
            undefined,
            series.len()
        );
    }
    if mismatches > 0 {
        warn!(
            "{} at {}: {} steps disagree with the reference interpolator",
            variable.short_name, point, mismatches
        );
    }

    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Field, Grid};
    use crate::source::MemorySource;
    use chrono::NaiveDate;

    fn meta() -> VariableMeta {
        VariableMeta {
            short_name: "T2".into(),
            field_name: "t2m".into(),
            long_name: None,
            units: None,
        }
    }

    fn source(steps: Vec<Vec<Vec<f64>>>) -> MemorySource {
        let grid = Grid::new(vec![52.0, 51.9], vec![10.0, 10.1]).unwrap();
        let t0 = NaiveDate::from_ymd_opt(2018, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let times = (0..steps.len())
            .map(|h| t0 + chrono::TimeDelta::hours(h as i64))
            .collect();
        let fields = steps
            .into_iter()
            .map(|rows| Field::from_rows(rows).unwrap())
            .collect();
        MemorySource::new(grid, times).with_field("t2m", fields).unwrap()
    }

    fn extract(
        src: &MemorySource,
        m: &VariableMeta,
        point: GeoPoint,
    ) -> Result<PointSeries, ExtractError> {
        extract_point_series(src, m, point, ExtractOptions::default())
    }

    #[test]
    fn test_series_preserves_order() {
        let src = source(vec![
            vec![vec![1.0, 1.0], vec![1.0, 1.0]],
            vec![vec![2.0, 2.0], vec![2.0, 2.0]],
            vec![vec![3.0, 3.0], vec![3.0, 3.0]],
        ]);
        let s = extract(&src, &meta(), GeoPoint::new(51.95, 10.05)).unwrap();
        let values: Vec<f64> = s.values().into_iter().map(|v| v.unwrap()).collect();
        for (v, expected) in values.iter().zip([1.0, 2.0, 3.0]) {
            assert!((v - expected).abs() < 1e-12);
        }
        assert_eq!(s.times()[2].format("%H").to_string(), "02");
    }

    #[test]
    fn test_undefined_steps_are_kept() {
        let src = source(vec![
            vec![vec![1.0, 1.0], vec![1.0, 1.0]],
            vec![vec![f64::NAN, 2.0], vec![2.0, 2.0]],
        ]);
        let s = extract(&src, &meta(), GeoPoint::new(51.95, 10.05)).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.n_undefined(), 1);
        assert_eq!(s.values()[1], None);
        assert!((s.values()[0].unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_out_of_range_point_aborts() {
        let src = source(vec![vec![vec![1.0, 1.0], vec![1.0, 1.0]]]);
        let err = extract(&src, &meta(), GeoPoint::new(40.0, 10.05)).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Interpolation(InterpolationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_missing_variable() {
        let src = source(vec![vec![vec![1.0, 1.0], vec![1.0, 1.0]]]);
        let mut m = meta();
        m.field_name = "tp".into();
        let err = extract(&src, &m, GeoPoint::new(51.95, 10.05)).unwrap_err();
        assert!(matches!(err, ExtractError::Source(SourceError::MissingVariable(_))));
    }

    #[test]
    fn test_verify_reference_runs() {
        let src = source(vec![vec![vec![300.0, 302.0], vec![298.0, 299.0]]]);
        let options = ExtractOptions {
            boundary: BoundaryPolicy::Strict,
            verify_reference: true,
        };
        let s = extract_point_series(&src, &meta(), GeoPoint::new(51.97, 10.02), options).unwrap();
        assert_eq!(s.len(), 1);
    }
}
