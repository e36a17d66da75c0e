//! NetCDF reader for ERA5-Land monthly grid files.
//!
//! Expected layout:
//! - `latitude`/`lat`: 1D latitude coordinate (ERA5 stores it north-to-south)
//! - `longitude`/`lon`: 1D longitude coordinate
//! - `time`/`valid_time`: time coordinate with a CF `units` attribute
//! - data variables shaped `(time, latitude, longitude)`, optionally packed
//!   as `short` with `scale_factor`/`add_offset`
//!
//! Raw values equal to `_FillValue` or `missing_value` are read as NaN, so
//! they surface as missing cells of the returned [`Field`].

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tracing::debug;

use super::{GridSource, SourceError, decode_times};
use crate::grid::{Field, Grid, is_valid_f64};
use crate::types::TimeIndex;

/// Grid source reading one NetCDF file.
///
/// The file handle is held for the lifetime of the source and closed on
/// drop.
pub struct NetcdfSource {
    file: netcdf::File,
    path: PathBuf,
    grid: Grid,
    times: Vec<NaiveDateTime>,
}

impl NetcdfSource {
    /// Open a file and read its coordinates.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let file = netcdf::open(&path)?;

        let lats = read_coord(&file, &["latitude", "lat"])?;
        let lons = read_coord(&file, &["longitude", "lon"])?;
        let grid = Grid::new(lats, lons)?;

        let time_name = ["time", "valid_time"]
            .into_iter()
            .find(|name| file.variable(name).is_some())
            .ok_or_else(|| SourceError::MissingVariable("time or valid_time".to_string()))?;
        let time_var = file
            .variable(time_name)
            .ok_or_else(|| SourceError::MissingVariable(time_name.to_string()))?;
        let units = get_attr_str(&time_var, "units").ok_or_else(|| {
            SourceError::InvalidData(format!("{} has no units attribute", time_name))
        })?;
        let raw_times: Vec<f64> = time_var.get_values(..)?;
        let times = decode_times(&raw_times, &units)?;

        debug!(
            "opened {}: {}, {} time steps",
            path.display(),
            grid.summary(),
            times.len()
        );

        Ok(Self {
            file,
            path,
            grid,
            times,
        })
    }
}

impl GridSource for NetcdfSource {
    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    fn has_field(&self, field_name: &str) -> bool {
        self.file.variable(field_name).is_some()
    }

    fn read_field(&self, field_name: &str, t: TimeIndex) -> Result<Field, SourceError> {
        let n_times = self.times.len();
        if t.get() >= n_times {
            return Err(SourceError::TimeIndex { index: t, n_times });
        }

        let var = self
            .file
            .variable(field_name)
            .ok_or_else(|| SourceError::MissingVariable(field_name.to_string()))?;

        let (n_lat, n_lon) = self.grid.shape();
        let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
        if shape != [n_times, n_lat, n_lon] {
            return Err(SourceError::InvalidData(format!(
                "{}: {} has shape {:?}, expected [{}, {}, {}]",
                self.path.display(),
                field_name,
                shape,
                n_times,
                n_lat,
                n_lon
            )));
        }

        let scale = get_attr_f64(&var, "scale_factor").unwrap_or(1.0);
        let offset = get_attr_f64(&var, "add_offset").unwrap_or(0.0);
        let fill = get_attr_f64(&var, "_FillValue");
        let missing = get_attr_f64(&var, "missing_value");

        let raw: Vec<f64> = var.get_values((t.get(), .., ..))?;
        let values = raw
            .into_iter()
            .map(|v| {
                if Some(v) == fill || Some(v) == missing || !is_valid_f64(v) {
                    f64::NAN
                } else {
                    v * scale + offset
                }
            })
            .collect();

        Ok(Field::new(values, n_lat, n_lon)?)
    }
}

/// Read a coordinate variable.
fn read_coord(file: &netcdf::File, names: &[&str]) -> Result<Vec<f64>, SourceError> {
    for name in names {
        if let Some(var) = file.variable(name) {
            let data: Vec<f64> = var.get_values(..)?;
            return Ok(data);
        }
    }
    Err(SourceError::MissingVariable(names.join(" or ")))
}

/// Get a numeric attribute as f64.
fn get_attr_f64(var: &netcdf::Variable, name: &str) -> Option<f64> {
    var.attribute_value(name)
        .and_then(|r| r.ok())
        .and_then(|v| match v {
            netcdf::AttributeValue::Double(d) => Some(d),
            netcdf::AttributeValue::Float(f) => Some(f as f64),
            netcdf::AttributeValue::Short(s) => Some(s as f64),
            netcdf::AttributeValue::Int(i) => Some(i as f64),
            netcdf::AttributeValue::Longlong(i) => Some(i as f64),
            netcdf::AttributeValue::Schar(b) => Some(b as f64),
            _ => None,
        })
}

/// Get a text attribute.
fn get_attr_str(var: &netcdf::Variable, name: &str) -> Option<String> {
    var.attribute_value(name)
        .and_then(|r| r.ok())
        .and_then(|v| match v {
            netcdf::AttributeValue::Str(s) => Some(s),
            _ => None,
        })
}
