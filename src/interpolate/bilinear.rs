//! Bilinear point interpolation with nearest-node bracket selection.
//!
//! The enclosing cell is found per axis by locating the grid node nearest
//! to the query coordinate and then picking its neighbour on the side of
//! the query. Latitude neighbours are chosen geographically through
//! [`Grid::north_of`] / [`Grid::south_of`], so grids stored north-to-south
//! need no re-ordering.
//!
//! When the query coincides exactly with a node on an axis, that axis
//! collapses to the single node and no blend (and no division by the
//! zero-width span) is performed on it.

use super::{BoundaryPolicy, InterpolationError};
use crate::grid::{Field, Grid, GridError};
use crate::types::{GeoPoint, LatIndex, LonIndex};

/// Bracket along one axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Span<I> {
    /// Query sits exactly on this node
    Node(I),
    /// Query lies between `low` (south/west) and `high` (north/east)
    Cell {
        low: I,
        high: I,
        /// Weight of the `low` node, `(high - q) / (high - low)`
        w_low: f64,
        /// Weight of the `high` node, `(q - low) / (high - low)`
        w_high: f64,
    },
}

impl<I: Copy> Span<I> {
    /// Low (south/west) node.
    pub fn low(&self) -> I {
        match *self {
            Span::Node(i) => i,
            Span::Cell { low, .. } => low,
        }
    }

    /// High (north/east) node.
    pub fn high(&self) -> I {
        match *self {
            Span::Node(i) => i,
            Span::Cell { high, .. } => high,
        }
    }

    /// True when the axis collapsed onto a single node.
    pub fn is_node(&self) -> bool {
        matches!(self, Span::Node(_))
    }
}

/// The 2×2 neighbourhood of a query point and its blend weights.
///
/// A bracket depends only on the grid and the point, so a driver can
/// locate it once per file and [`apply`](Bracket::apply) it to every time
/// step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bracket {
    /// Point the bracket was built for (after any clamping)
    pub point: GeoPoint,
    /// South/north rows
    pub lat: Span<LatIndex>,
    /// West/east columns
    pub lon: Span<LonIndex>,
    shape: (usize, usize),
}

impl Bracket {
    pub fn south(&self) -> LatIndex {
        self.lat.low()
    }

    pub fn north(&self) -> LatIndex {
        self.lat.high()
    }

    pub fn west(&self) -> LonIndex {
        self.lon.low()
    }

    pub fn east(&self) -> LonIndex {
        self.lon.high()
    }

    /// Interpolate a field at the bracketed point.
    ///
    /// Returns `Ok(None)` if any corner taking part in the blend is
    /// missing; the field must have the shape of the grid the bracket was
    /// located on.
    pub fn apply(&self, field: &Field) -> Result<Option<f64>, GridError> {
        if field.shape() != self.shape {
            return Err(GridError::ShapeMismatch {
                expected: self.shape,
                found: field.shape(),
            });
        }
        Ok(self.lat_blend(field))
    }

    fn lat_blend(&self, field: &Field) -> Option<f64> {
        match self.lat {
            Span::Node(row) => self.lon_blend(field, row),
            Span::Cell {
                low: south,
                high: north,
                w_low,
                w_high,
            } => {
                let south_row = self.lon_blend(field, south)?;
                let north_row = self.lon_blend(field, north)?;
                Some(w_low * south_row + w_high * north_row)
            }
        }
    }

    fn lon_blend(&self, field: &Field, row: LatIndex) -> Option<f64> {
        match self.lon {
            Span::Node(col) => field.get(row, col),
            Span::Cell {
                low: west,
                high: east,
                w_low,
                w_high,
            } => Some(w_low * field.get(row, west)? + w_high * field.get(row, east)?),
        }
    }
}

/// Index of the coordinate nearest to `value` (first one on ties).
///
/// # Panics
///
/// Panics if `coords` is empty.
pub fn nearest_index(coords: &[f64], value: f64) -> usize {
    assert!(!coords.is_empty(), "nearest_index on empty axis");
    let mut best = 0;
    let mut best_dist = (coords[0] - value).abs();
    for (i, &c) in coords.iter().enumerate().skip(1) {
        let dist = (c - value).abs();
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

/// Locate the bracket of `point` on `grid`.
pub fn locate(
    grid: &Grid,
    point: GeoPoint,
    policy: BoundaryPolicy,
) -> Result<Bracket, InterpolationError> {
    if !point.lat.is_finite() || !point.lon.is_finite() {
        return Err(InterpolationError::InvalidPoint(point));
    }

    let bounds = grid.bounds();
    let out_of_range = || InterpolationError::OutOfRange { point, bounds };
    let q = match policy {
        BoundaryPolicy::Strict if !bounds.contains_strict(point) => return Err(out_of_range()),
        BoundaryPolicy::Strict => point,
        BoundaryPolicy::Clamp => bounds.clamp(point),
    };

    let lat = lat_span(grid, q.lat).ok_or_else(out_of_range)?;
    let lon = lon_span(grid, q.lon).ok_or_else(out_of_range)?;

    Ok(Bracket {
        point: q,
        lat,
        lon,
        shape: grid.shape(),
    })
}

fn lat_span(grid: &Grid, q: f64) -> Option<Span<LatIndex>> {
    let near = LatIndex::new(nearest_index(grid.lats(), q));
    let near_lat = grid.lat(near);
    if near_lat == q {
        return Some(Span::Node(near));
    }

    let (south, north) = if near_lat < q {
        (near, grid.north_of(near)?)
    } else {
        (grid.south_of(near)?, near)
    };
    let (s, n) = (grid.lat(south), grid.lat(north));
    Some(Span::Cell {
        low: south,
        high: north,
        w_low: (n - q) / (n - s),
        w_high: (q - s) / (n - s),
    })
}

fn lon_span(grid: &Grid, q: f64) -> Option<Span<LonIndex>> {
    let n_lon = grid.lons().len();
    let near = LonIndex::new(nearest_index(grid.lons(), q));
    let near_lon = grid.lon(near);
    if near_lon == q {
        return Some(Span::Node(near));
    }

    let (west, east) = if near_lon < q {
        (near, near.checked_next(n_lon)?)
    } else {
        (near.checked_prev()?, near)
    };
    let (w, e) = (grid.lon(west), grid.lon(east));
    Some(Span::Cell {
        low: west,
        high: east,
        w_low: (e - q) / (e - w),
        w_high: (q - w) / (e - w),
    })
}
