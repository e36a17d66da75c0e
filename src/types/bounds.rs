//! Geographic envelope and query point types.

use std::fmt;

/// A latitude/longitude location in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    /// Latitude (degrees North)
    pub lat: f64,
    /// Longitude (degrees East)
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new point.
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}°N, {:.4}°E)", self.lat, self.lon)
    }
}

/// Rectangular geographic envelope of a grid.
///
/// # Example
///
/// ```
/// use era5_extract::types::{GeoBounds, GeoPoint};
///
/// let bounds = GeoBounds::new(51.9, 52.0, 10.0, 10.1);
/// assert!(bounds.contains_strict(GeoPoint::new(51.95, 10.05)));
/// assert!(!bounds.contains_strict(GeoPoint::new(52.0, 10.05)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoBounds {
    /// Southern edge (minimum latitude)
    pub lat_min: f64,
    /// Northern edge (maximum latitude)
    pub lat_max: f64,
    /// Western edge (minimum longitude)
    pub lon_min: f64,
    /// Eastern edge (maximum longitude)
    pub lon_max: f64,
}

impl GeoBounds {
    /// Create new bounds.
    ///
    /// # Panics
    ///
    /// Panics if `lat_max < lat_min` or `lon_max < lon_min`.
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        assert!(
            lat_max >= lat_min,
            "lat_max ({}) must not be below lat_min ({})",
            lat_max,
            lat_min
        );
        assert!(
            lon_max >= lon_min,
            "lon_max ({}) must not be below lon_min ({})",
            lon_max,
            lon_min
        );

        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    /// Check if a point lies inside the envelope (inclusive).
    #[inline]
    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.lat_min
            && p.lat <= self.lat_max
            && p.lon >= self.lon_min
            && p.lon <= self.lon_max
    }

    /// Check if a point lies strictly inside the envelope on both axes.
    #[inline]
    pub fn contains_strict(&self, p: GeoPoint) -> bool {
        p.lat > self.lat_min && p.lat < self.lat_max && p.lon > self.lon_min && p.lon < self.lon_max
    }

    /// Clamp a point onto the envelope.
    pub fn clamp(&self, p: GeoPoint) -> GeoPoint {
        GeoPoint::new(
            p.lat.clamp(self.lat_min, self.lat_max),
            p.lon.clamp(self.lon_min, self.lon_max),
        )
    }
}

impl fmt::Display for GeoBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat [{:.4}, {:.4}] × lon [{:.4}, {:.4}]",
            self.lat_min, self.lat_max, self.lon_min, self.lon_max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains() {
        let b = GeoBounds::new(50.0, 60.0, 0.0, 10.0);
        assert!(b.contains(GeoPoint::new(55.0, 5.0)));
        assert!(b.contains(GeoPoint::new(50.0, 0.0)));
        assert!(b.contains(GeoPoint::new(60.0, 10.0)));
        assert!(!b.contains(GeoPoint::new(49.9, 5.0)));
        assert!(!b.contains(GeoPoint::new(55.0, 10.1)));
    }

    #[test]
    fn test_contains_strict_excludes_edges() {
        let b = GeoBounds::new(50.0, 60.0, 0.0, 10.0);
        assert!(b.contains_strict(GeoPoint::new(55.0, 5.0)));
        assert!(!b.contains_strict(GeoPoint::new(50.0, 5.0)));
        assert!(!b.contains_strict(GeoPoint::new(55.0, 10.0)));
    }

    #[test]
    fn test_clamp() {
        let b = GeoBounds::new(50.0, 60.0, 0.0, 10.0);
        assert_eq!(b.clamp(GeoPoint::new(70.0, -3.0)), GeoPoint::new(60.0, 0.0));
        assert_eq!(b.clamp(GeoPoint::new(55.0, 5.0)), GeoPoint::new(55.0, 5.0));
    }

    #[test]
    #[should_panic(expected = "lat_max")]
    fn test_invalid_lat() {
        GeoBounds::new(60.0, 50.0, 0.0, 10.0);
    }
}
