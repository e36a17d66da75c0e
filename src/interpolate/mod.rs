//! Point interpolation on latitude/longitude grids.
//!
//! The main entry points are:
//! - [`interpolate`]: one-shot interpolation from raw axes, validating the grid
//! - [`locate`] + [`Bracket::apply`]: locate once, apply to many time steps
//! - [`interpolate_reference`]: textbook formula for cross-checking
//!
//! # Outcomes
//!
//! | Situation | Result |
//! |-----------|--------|
//! | Point inside the grid, all corners valid | `Ok(Some(value))` |
//! | A corner holds a fill value | `Ok(None)` |
//! | Point on/beyond the outer edge (strict policy) | `Err(OutOfRange)` |
//! | Axes not monotonic, field misaligned | `Err(InvalidGrid)` |
//!
//! # Example
//!
//! ```
//! use era5_extract::grid::Field;
//! use era5_extract::interpolate::interpolate;
//!
//! let lats = [52.0, 51.9];
//! let lons = [10.0, 10.1];
//! let field = Field::from_rows(vec![vec![300.0, 302.0], vec![298.0, 299.0]]).unwrap();
//!
//! let v = interpolate(&lats, &lons, &field, 51.95, 10.05).unwrap().unwrap();
//! assert!((v - 299.75).abs() < 1e-9);
//! ```

mod bilinear;
mod reference;

pub use bilinear::{Bracket, Span, locate, nearest_index};
pub use reference::{agrees, interpolate_reference};

use thiserror::Error;

use crate::grid::{Field, Grid, GridError};
use crate::types::{GeoBounds, GeoPoint};

/// Relative tolerance used when cross-checking against the reference.
pub const REFERENCE_TOLERANCE: f64 = 1e-9;

/// What to do with query points on or beyond the grid's outer coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Require the point to lie strictly inside the grid envelope.
    #[default]
    Strict,
    /// Clamp the point onto the envelope and use the edge values.
    Clamp,
}

/// Error type for interpolation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    /// No 2×2 bracket can be formed around the point
    #[error("point {point} is outside the interpolation envelope {bounds}")]
    OutOfRange { point: GeoPoint, bounds: GeoBounds },

    /// Query coordinates are NaN or infinite
    #[error("query point {0} is not finite")]
    InvalidPoint(GeoPoint),

    /// Axes or field fail validation
    #[error("invalid grid: {0}")]
    InvalidGrid(#[from] GridError),
}

/// Bilinearly interpolate `field` at (`query_lat`, `query_lon`).
///
/// `lats` may be ordered either way; `lons` must increase. Uses
/// [`BoundaryPolicy::Strict`].
pub fn interpolate(
    lats: &[f64],
    lons: &[f64],
    field: &Field,
    query_lat: f64,
    query_lon: f64,
) -> Result<Option<f64>, InterpolationError> {
    let grid = Grid::new(lats.to_vec(), lons.to_vec())?;
    interpolate_on(
        &grid,
        field,
        GeoPoint::new(query_lat, query_lon),
        BoundaryPolicy::Strict,
    )
}

/// Interpolate on an already validated grid with an explicit policy.
pub fn interpolate_on(
    grid: &Grid,
    field: &Field,
    point: GeoPoint,
    policy: BoundaryPolicy,
) -> Result<Option<f64>, InterpolationError> {
    grid.check_field(field)?;
    let bracket = locate(grid, point, policy)?;
    Ok(bracket.apply(field)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> (Vec<f64>, Vec<f64>, Field) {
        let field = Field::from_rows(vec![vec![300.0, 302.0], vec![298.0, 299.0]]).unwrap();
        (vec![52.0, 51.9], vec![10.0, 10.1], field)
    }

    #[test]
    fn test_cell_center_scenario() {
        let (lats, lons, field) = scenario();
        let v = interpolate(&lats, &lons, &field, 51.95, 10.05).unwrap().unwrap();
        assert!((v - 299.75).abs() < 1e-9, "got {}", v);
    }

    #[test]
    fn test_weighted_point() {
        let (lats, lons, field) = scenario();
        // 3/4 of the way north, 1/4 of the way east
        let v = interpolate(&lats, &lons, &field, 51.975, 10.025).unwrap().unwrap();
        let south = 0.75 * 298.0 + 0.25 * 299.0;
        let north = 0.75 * 300.0 + 0.25 * 302.0;
        let expected = 0.25 * south + 0.75 * north;
        assert!((v - expected).abs() < 1e-9, "got {} expected {}", v, expected);
    }

    #[test]
    fn test_missing_corner_is_undefined() {
        let (lats, lons, field) = scenario();
        let mut rows = vec![vec![300.0, 302.0], vec![298.0, f64::NAN]];
        let f = Field::from_rows(rows.clone()).unwrap();
        assert_eq!(interpolate(&lats, &lons, &f, 51.95, 10.05).unwrap(), None);

        rows[1][1] = -32767.0;
        let f = Field::from_rows(rows).unwrap().with_fill_value(-32767.0);
        assert_eq!(interpolate(&lats, &lons, &f, 51.95, 10.05).unwrap(), None);

        assert!(interpolate(&lats, &lons, &field, 51.95, 10.05).unwrap().is_some());
    }

    #[test]
    fn test_invalid_grid() {
        let (_, lons, field) = scenario();
        assert!(matches!(
            interpolate(&[52.0, 52.0], &lons, &field, 52.0, 10.05),
            Err(InterpolationError::InvalidGrid(_))
        ));
        assert!(matches!(
            interpolate(&[52.0, 51.9, 51.8], &lons, &field, 51.95, 10.05),
            Err(InterpolationError::InvalidGrid(GridError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn test_out_of_range() {
        let (lats, lons, field) = scenario();
        let err = interpolate(&lats, &lons, &field, 52.0, 10.05).unwrap_err();
        assert!(matches!(err, InterpolationError::OutOfRange { .. }));
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn test_clamp_policy_returns_edge_value() {
        let (lats, lons, field) = scenario();
        let grid = Grid::new(lats, lons).unwrap();
        let v = interpolate_on(&grid, &field, GeoPoint::new(60.0, 10.1), BoundaryPolicy::Clamp)
            .unwrap();
        assert_eq!(v, Some(302.0));
    }
}
