//! Rectilinear latitude/longitude grids.
//!
//! A [`Grid`] pairs a latitude axis (M values) with a longitude axis
//! (N values). ERA5 files store latitude north-to-south, other products
//! south-to-north, so the latitude axis may run either way; the longitude
//! axis must increase. Both must be strictly monotonic.
//!
//! A [`Field`] holds one M×N snapshot aligned with the grid.

mod field;

pub use field::{FILL_VALUE_F64, Field, is_valid_f64};

use std::fmt;

use thiserror::Error;

use crate::types::{GeoBounds, LatIndex, LonIndex};

/// Grid axis, for error reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Latitude => write!(f, "latitude"),
            Axis::Longitude => write!(f, "longitude"),
        }
    }
}

/// Error type for grid and field validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Axis has fewer than two coordinates
    #[error("{axis} axis needs at least 2 coordinates, got {len}")]
    TooShort { axis: Axis, len: usize },

    /// Axis contains NaN or infinity
    #[error("{axis} coordinate {index} is not finite")]
    NonFinite { axis: Axis, index: usize },

    /// Axis is not strictly monotonic in the allowed direction
    #[error("{axis} axis is not strictly {expected} at index {index}")]
    NotMonotonic {
        axis: Axis,
        index: usize,
        expected: &'static str,
    },

    /// Field shape disagrees with the grid
    #[error("field shape {found:?} does not match grid shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Flat value buffer has the wrong length
    #[error("field needs {expected} values, got {found}")]
    FieldLength { expected: usize, found: usize },

    /// Nested rows of unequal length
    #[error("row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Direction of the latitude axis with increasing array index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// `lats[0]` is the southernmost row
    SouthToNorth,
    /// `lats[0]` is the northernmost row (ERA5 convention)
    NorthToSouth,
}

/// Validated latitude/longitude grid.
///
/// # Example
///
/// ```
/// use era5_extract::grid::{Grid, Orientation};
///
/// let grid = Grid::new(vec![52.0, 51.9], vec![10.0, 10.1]).unwrap();
/// assert_eq!(grid.orientation(), Orientation::NorthToSouth);
/// assert_eq!(grid.shape(), (2, 2));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    lats: Vec<f64>,
    lons: Vec<f64>,
    orientation: Orientation,
}

impl Grid {
    /// Validate axes and build a grid.
    pub fn new(lats: Vec<f64>, lons: Vec<f64>) -> Result<Self, GridError> {
        let orientation = latitude_orientation(&lats)?;
        check_longitudes(&lons)?;
        Ok(Self {
            lats,
            lons,
            orientation,
        })
    }

    /// Latitude coordinates in array order.
    #[inline]
    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    /// Longitude coordinates (increasing).
    #[inline]
    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Shape as (n_lat, n_lon).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.lats.len(), self.lons.len())
    }

    #[inline]
    pub fn lat(&self, row: LatIndex) -> f64 {
        self.lats[row.get()]
    }

    #[inline]
    pub fn lon(&self, col: LonIndex) -> f64 {
        self.lons[col.get()]
    }

    /// Row adjacent to `row` on its northern side, if any.
    pub fn north_of(&self, row: LatIndex) -> Option<LatIndex> {
        match self.orientation {
            Orientation::SouthToNorth => row.checked_next(self.lats.len()),
            Orientation::NorthToSouth => row.checked_prev(),
        }
    }

    /// Row adjacent to `row` on its southern side, if any.
    pub fn south_of(&self, row: LatIndex) -> Option<LatIndex> {
        match self.orientation {
            Orientation::SouthToNorth => row.checked_prev(),
            Orientation::NorthToSouth => row.checked_next(self.lats.len()),
        }
    }

    /// Geographic envelope covered by the grid nodes.
    pub fn bounds(&self) -> GeoBounds {
        let (first, last) = (self.lats[0], self.lats[self.lats.len() - 1]);
        GeoBounds::new(
            first.min(last),
            first.max(last),
            self.lons[0],
            self.lons[self.lons.len() - 1],
        )
    }

    /// Ensure a field is aligned with this grid.
    pub fn check_field(&self, field: &Field) -> Result<(), GridError> {
        if field.shape() != self.shape() {
            return Err(GridError::ShapeMismatch {
                expected: self.shape(),
                found: field.shape(),
            });
        }
        Ok(())
    }

    /// Copy of this grid with the latitude axis reversed.
    pub fn flip_lats(&self) -> Self {
        let lats: Vec<f64> = self.lats.iter().rev().copied().collect();
        let orientation = match self.orientation {
            Orientation::SouthToNorth => Orientation::NorthToSouth,
            Orientation::NorthToSouth => Orientation::SouthToNorth,
        };
        Self {
            lats,
            lons: self.lons.clone(),
            orientation,
        }
    }

    /// Shift `lon` by ±360 so that it falls inside the longitude axis.
    ///
    /// Lets -180..180 queries address 0..360 grids and vice versa. Values
    /// that land outside the axis either way are returned unchanged.
    pub fn wrap_longitude(&self, lon: f64) -> f64 {
        let (west, east) = (self.lons[0], self.lons[self.lons.len() - 1]);
        if (west..=east).contains(&lon) {
            return lon;
        }
        [lon + 360.0, lon - 360.0]
            .into_iter()
            .find(|l| (west..=east).contains(l))
            .unwrap_or(lon)
    }

    /// Short description for log messages.
    pub fn summary(&self) -> String {
        let b = self.bounds();
        format!(
            "{}x{} grid ({:?}), {}",
            self.lats.len(),
            self.lons.len(),
            self.orientation,
            b
        )
    }
}

/// Determine the orientation of a latitude axis, validating monotonicity.
pub fn latitude_orientation(lats: &[f64]) -> Result<Orientation, GridError> {
    check_axis(Axis::Latitude, lats)?;
    let orientation = if lats[1] > lats[0] {
        Orientation::SouthToNorth
    } else {
        Orientation::NorthToSouth
    };

    for i in 1..lats.len() {
        let ok = match orientation {
            Orientation::SouthToNorth => lats[i] > lats[i - 1],
            Orientation::NorthToSouth => lats[i] < lats[i - 1],
        };
        if !ok {
            return Err(GridError::NotMonotonic {
                axis: Axis::Latitude,
                index: i,
                expected: match orientation {
                    Orientation::SouthToNorth => "increasing",
                    Orientation::NorthToSouth => "decreasing",
                },
            });
        }
    }
    Ok(orientation)
}

fn check_longitudes(lons: &[f64]) -> Result<(), GridError> {
    check_axis(Axis::Longitude, lons)?;
    if let Some(i) = (1..lons.len()).find(|&i| lons[i] <= lons[i - 1]) {
        return Err(GridError::NotMonotonic {
            axis: Axis::Longitude,
            index: i,
            expected: "increasing",
        });
    }
    Ok(())
}

fn check_axis(axis: Axis, coords: &[f64]) -> Result<(), GridError> {
    if coords.len() < 2 {
        return Err(GridError::TooShort {
            axis,
            len: coords.len(),
        });
    }
    if let Some(index) = coords.iter().position(|c| !c.is_finite()) {
        return Err(GridError::NonFinite { axis, index });
    }
    Ok(())
}
