//! Property tests for bilinear point interpolation.
//!
//! Covers exactness on bilinear fields, node coincidence, latitude
//! orientation invariance, boundary handling, missing-data propagation and
//! agreement with the reference interpolator.

use era5_extract::grid::{Field, Grid};
use era5_extract::interpolate::{
    BoundaryPolicy, InterpolationError, REFERENCE_TOLERANCE, agrees, interpolate, interpolate_on,
    interpolate_reference,
};
use era5_extract::types::GeoPoint;

const TOL: f64 = 1e-9;

/// f(lat, lon) = a + b*lat + c*lon + d*lat*lon
fn bilinear(lat: f64, lon: f64) -> f64 {
    3.0 + 0.5 * lat - 1.25 * lon + 0.01 * lat * lon
}

/// ERA5-style grid (latitude north-to-south, 0.1° spacing).
fn era5_grid() -> Grid {
    let lats = (0..6).map(|j| 52.0 - 0.1 * j as f64).collect();
    let lons = (0..7).map(|i| 10.0 + 0.1 * i as f64).collect();
    Grid::new(lats, lons).unwrap()
}

fn sample(grid: &Grid, f: impl Fn(f64, f64) -> f64) -> Field {
    let rows = grid
        .lats()
        .iter()
        .map(|&lat| grid.lons().iter().map(|&lon| f(lat, lon)).collect())
        .collect();
    Field::from_rows(rows).unwrap()
}

/// Interior query points spread over the grid (avoiding the outer edges).
fn interior_points(grid: &Grid) -> Vec<GeoPoint> {
    let b = grid.bounds();
    let mut points = Vec::new();
    for j in 1..12 {
        for i in 1..14 {
            let lat = b.lat_min + (b.lat_max - b.lat_min) * j as f64 / 12.0;
            let lon = b.lon_min + (b.lon_max - b.lon_min) * i as f64 / 14.0;
            points.push(GeoPoint::new(lat, lon));
        }
    }
    points
}

// =============================================================================
// Exactness and orientation
// =============================================================================

#[test]
fn test_exact_on_bilinear_fields() {
    let grid = era5_grid();
    let field = sample(&grid, bilinear);

    for p in interior_points(&grid) {
        let v = interpolate_on(&grid, &field, p, BoundaryPolicy::Strict)
            .unwrap()
            .unwrap();
        let expected = bilinear(p.lat, p.lon);
        assert!(
            (v - expected).abs() < TOL,
            "at {}: got {}, expected {}",
            p,
            v,
            expected
        );
    }
}

#[test]
fn test_exact_on_south_to_north_grid() {
    let grid = era5_grid().flip_lats();
    let field = sample(&grid, bilinear);

    for p in interior_points(&grid) {
        let v = interpolate_on(&grid, &field, p, BoundaryPolicy::Strict)
            .unwrap()
            .unwrap();
        assert!((v - bilinear(p.lat, p.lon)).abs() < TOL, "at {}", p);
    }
}

#[test]
fn test_orientation_invariance() {
    let grid = era5_grid();
    // Not bilinear, so the result depends on picking the right cell.
    let field = sample(&grid, |lat, lon| (lat * 7.0).sin() * (lon * 3.0).cos() + lat * lon);
    let flipped_grid = grid.flip_lats();
    let flipped_field = field.flip_rows();

    for p in interior_points(&grid) {
        let a = interpolate_on(&grid, &field, p, BoundaryPolicy::Strict).unwrap();
        let b = interpolate_on(&flipped_grid, &flipped_field, p, BoundaryPolicy::Strict).unwrap();
        assert!(agrees(a, b, 1e-12), "at {}: {:?} vs {:?}", p, a, b);
    }
}

#[test]
fn test_cell_midpoint_is_corner_average() {
    let grid = era5_grid();
    let field = sample(&grid, |lat, lon| (lat * 11.0).cos() + lon.powi(2));

    let (south, north): (f64, f64) = (51.8, 51.9);
    let (west, east): (f64, f64) = (10.3, 10.4);
    let corners = [
        (south, west),
        (south, east),
        (north, west),
        (north, east),
    ];
    let average = corners
        .iter()
        .map(|&(lat, lon)| (lat * 11.0).cos() + lon.powi(2))
        .sum::<f64>()
        / 4.0;

    let v = interpolate(grid.lats(), grid.lons(), &field, 51.85, 10.35)
        .unwrap()
        .unwrap();
    assert!((v - average).abs() < 1e-6, "got {}, expected {}", v, average);
}

#[test]
fn test_documented_scenario() {
    let field = Field::from_rows(vec![vec![300.0, 302.0], vec![298.0, 299.0]]).unwrap();
    let v = interpolate(&[52.0, 51.9], &[10.0, 10.1], &field, 51.95, 10.05)
        .unwrap()
        .unwrap();
    assert!((v - 299.75).abs() < TOL);
}

// =============================================================================
// Node coincidence
// =============================================================================

#[test]
fn test_interior_nodes_reproduce_values_strict() {
    let grid = era5_grid();
    let field = sample(&grid, |lat, lon| lat * 100.0 + lon);
    let (n_lat, n_lon) = grid.shape();

    for j in 1..n_lat - 1 {
        for i in 1..n_lon - 1 {
            let p = GeoPoint::new(grid.lats()[j], grid.lons()[i]);
            let v = interpolate_on(&grid, &field, p, BoundaryPolicy::Strict)
                .unwrap()
                .unwrap();
            assert_eq!(v, field.values()[j * n_lon + i], "node ({}, {})", j, i);
        }
    }
}

#[test]
fn test_all_nodes_reproduce_values_clamp() {
    let grid = era5_grid();
    let field = sample(&grid, |lat, lon| lat * 100.0 + lon);
    let (n_lat, n_lon) = grid.shape();

    for j in 0..n_lat {
        for i in 0..n_lon {
            let p = GeoPoint::new(grid.lats()[j], grid.lons()[i]);
            let v = interpolate_on(&grid, &field, p, BoundaryPolicy::Clamp)
                .unwrap()
                .unwrap();
            assert_eq!(v, field.values()[j * n_lon + i], "node ({}, {})", j, i);
        }
    }
}

#[test]
fn test_point_on_grid_line_uses_one_axis() {
    let grid = era5_grid();
    let field = sample(&grid, bilinear);
    // On the 51.9 row, between two columns.
    let p = GeoPoint::new(51.9, 10.25);
    let v = interpolate_on(&grid, &field, p, BoundaryPolicy::Strict)
        .unwrap()
        .unwrap();
    assert!((v - bilinear(51.9, 10.25)).abs() < TOL);
}

// =============================================================================
// Boundaries
// =============================================================================

#[test]
fn test_outer_edge_is_out_of_range_strict() {
    let grid = era5_grid();
    let field = sample(&grid, bilinear);
    let b = grid.bounds();

    for p in [
        GeoPoint::new(b.lat_max, 10.25), // northern edge
        GeoPoint::new(b.lat_min, 10.25), // southern edge
        GeoPoint::new(51.75, b.lon_min), // western edge
        GeoPoint::new(51.75, b.lon_max), // eastern edge
        GeoPoint::new(53.0, 10.25),      // beyond north
        GeoPoint::new(51.75, 9.0),       // beyond west
    ] {
        let err = interpolate_on(&grid, &field, p, BoundaryPolicy::Strict).unwrap_err();
        assert!(
            matches!(err, InterpolationError::OutOfRange { .. }),
            "at {}: {:?}",
            p,
            err
        );
    }
}

#[test]
fn test_clamp_uses_edge_values() {
    let grid = era5_grid();
    let field = sample(&grid, bilinear);

    // Beyond the north edge: value along the 52.0 row.
    let v = interpolate_on(&grid, &field, GeoPoint::new(55.0, 10.25), BoundaryPolicy::Clamp)
        .unwrap()
        .unwrap();
    assert!((v - bilinear(52.0, 10.25)).abs() < TOL);

    // Beyond the south-west corner: the corner value.
    let v = interpolate_on(&grid, &field, GeoPoint::new(40.0, 0.0), BoundaryPolicy::Clamp)
        .unwrap()
        .unwrap();
    assert_eq!(v, field.values()[5 * 7]);
}

#[test]
fn test_non_finite_query() {
    let grid = era5_grid();
    let field = sample(&grid, bilinear);
    let err = interpolate_on(&grid, &field, GeoPoint::new(f64::NAN, 10.2), BoundaryPolicy::Clamp)
        .unwrap_err();
    assert!(matches!(err, InterpolationError::InvalidPoint(_)));
}

#[test]
fn test_invalid_grid_is_reported() {
    let field = Field::new(vec![0.0; 6], 3, 2).unwrap();
    let err = interpolate(&[51.8, 52.0, 51.9], &[10.0, 10.1], &field, 51.85, 10.05).unwrap_err();
    assert!(matches!(err, InterpolationError::InvalidGrid(_)));

    let mismatched = Field::new(vec![0.0; 4], 2, 2).unwrap();
    let err = interpolate(&[52.0, 51.9, 51.8], &[10.0, 10.1], &mismatched, 51.85, 10.05)
        .unwrap_err();
    assert!(matches!(err, InterpolationError::InvalidGrid(_)));
}

// =============================================================================
// Missing data
// =============================================================================

#[test]
fn test_missing_corner_gives_undefined() {
    let lats = [52.0, 51.9];
    let lons = [10.0, 10.1];
    for missing in [f64::NAN, 9.96920996838687e+36, -32767.0] {
        let field = Field::from_rows(vec![vec![300.0, missing], vec![298.0, 299.0]])
            .unwrap()
            .with_fill_value(-32767.0);
        let v = interpolate(&lats, &lons, &field, 51.95, 10.05).unwrap();
        assert_eq!(v, None, "fill {}", missing);
    }
}

#[test]
fn test_missing_value_outside_bracket_is_ignored() {
    let grid = era5_grid();
    let mut rows: Vec<Vec<f64>> = vec![vec![280.0; 7]; 6];
    rows[5][6] = f64::NAN;
    let field = Field::from_rows(rows).unwrap();

    let v = interpolate_on(&grid, &field, GeoPoint::new(51.95, 10.05), BoundaryPolicy::Strict)
        .unwrap();
    assert_eq!(v, Some(280.0));

    // At a node only the node itself is read.
    let v = interpolate_on(&grid, &field, GeoPoint::new(51.6, 10.5), BoundaryPolicy::Strict)
        .unwrap();
    assert_eq!(v, Some(280.0));
}

// =============================================================================
// Reference cross-check
// =============================================================================

#[test]
fn test_agrees_with_reference_both_orientations() {
    let grid = era5_grid();
    let field = sample(&grid, |lat, lon| (lat * 5.0).sin() * 40.0 + (lon * 9.0).cos() * 15.0);

    for (g, f) in [
        (grid.clone(), field.clone()),
        (grid.flip_lats(), field.flip_rows()),
    ] {
        for p in interior_points(&g) {
            let core = interpolate_on(&g, &f, p, BoundaryPolicy::Strict).unwrap();
            let reference = interpolate_reference(&g, &f, p).unwrap();
            assert!(
                agrees(core, reference, REFERENCE_TOLERANCE),
                "at {}: {:?} vs {:?}",
                p,
                core,
                reference
            );
        }
    }
}
