//! Textbook bilinear interpolation used to cross-check the bracket search.
//!
//! The latitude axis is walked in ascending order, the enclosing cell is
//! found by linear scan and the value is evaluated from fractional offsets.
//! Edges are inclusive here; every corner with non-zero weight is read.

use super::InterpolationError;
use crate::grid::{Field, Grid, Orientation};
use crate::types::{GeoPoint, LatIndex, LonIndex};

/// Interpolate with the textbook formula.
pub fn interpolate_reference(
    grid: &Grid,
    field: &Field,
    point: GeoPoint,
) -> Result<Option<f64>, InterpolationError> {
    grid.check_field(field)?;
    let out_of_range = || InterpolationError::OutOfRange {
        point,
        bounds: grid.bounds(),
    };

    let n_lat = grid.lats().len();
    let to_row = |k: usize| match grid.orientation() {
        Orientation::SouthToNorth => LatIndex::new(k),
        Orientation::NorthToSouth => LatIndex::new(n_lat - 1 - k),
    };
    let ascending_lats: Vec<f64> = (0..n_lat).map(|k| grid.lat(to_row(k))).collect();

    let (k, fy) = find_cell(&ascending_lats, point.lat).ok_or_else(out_of_range)?;
    let (i, fx) = find_cell(grid.lons(), point.lon).ok_or_else(out_of_range)?;

    let (j0, j1) = (to_row(k), to_row(k + 1));
    let (i0, i1) = (LonIndex::new(i), LonIndex::new(i + 1));

    // Corners with zero weight are not read, so a point on a grid line
    // only depends on that line.
    let weighted = [
        ((j0, i0), (1.0 - fx) * (1.0 - fy)),
        ((j0, i1), fx * (1.0 - fy)),
        ((j1, i0), (1.0 - fx) * fy),
        ((j1, i1), fx * fy),
    ];
    let mut value = 0.0;
    for ((row, col), w) in weighted {
        if w == 0.0 {
            continue;
        }
        match field.get(row, col) {
            Some(v) => value += w * v,
            None => return Ok(None),
        }
    }
    Ok(Some(value))
}

/// Check whether two interpolation outcomes agree within `rel_tol`.
///
/// Two undefined results agree; a defined and an undefined one do not.
pub fn agrees(a: Option<f64>, b: Option<f64>, rel_tol: f64) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => (x - y).abs() <= rel_tol * x.abs().max(y.abs()).max(1.0),
        (None, None) => true,
        _ => false,
    }
}

/// Lower cell index and fractional offset of `value` on an ascending axis.
fn find_cell(coords: &[f64], value: f64) -> Option<(usize, f64)> {
    (0..coords.len() - 1).find_map(|i| {
        let (c0, c1) = (coords[i], coords[i + 1]);
        (c0 <= value && value <= c1).then(|| (i, (value - c0) / (c1 - c0)))
    })
}
