//! Two-dimensional field snapshot co-indexed with a [`Grid`](super::Grid).

use super::GridError;
use crate::types::{LatIndex, LonIndex};

/// Fill value for missing data (CF-conventions default for doubles).
pub const FILL_VALUE_F64: f64 = 9.96920996838687e+36;

/// Check if a value is valid (finite and not a CF-style fill value).
#[inline]
pub fn is_valid_f64(v: f64) -> bool {
    v.is_finite() && v.abs() < 1.0e+30
}

/// One time-step snapshot of one variable on an M×N grid.
///
/// Values are stored row-major: row `i` follows `lats[i]`, column `j`
/// follows `lons[j]`. A value counts as missing when it is not
/// [`is_valid_f64`] or equals the declared fill value.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    values: Vec<f64>,
    n_lat: usize,
    n_lon: usize,
    fill_value: Option<f64>,
}

impl Field {
    /// Create a field from row-major values.
    pub fn new(values: Vec<f64>, n_lat: usize, n_lon: usize) -> Result<Self, GridError> {
        let expected = n_lat * n_lon;
        if values.len() != expected {
            return Err(GridError::FieldLength {
                expected,
                found: values.len(),
            });
        }
        Ok(Self {
            values,
            n_lat,
            n_lon,
            fill_value: None,
        })
    }

    /// Create a field from nested rows (`rows[lat][lon]`).
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, GridError> {
        let n_lat = rows.len();
        let n_lon = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != n_lon) {
            return Err(GridError::RaggedRow {
                row: bad,
                expected: n_lon,
                found: rows[bad].len(),
            });
        }
        Self::new(rows.into_iter().flatten().collect(), n_lat, n_lon)
    }

    /// Declare the sentinel used for missing cells.
    pub fn with_fill_value(mut self, fill: f64) -> Self {
        self.fill_value = Some(fill);
        self
    }

    /// Shape as (n_lat, n_lon).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_lat, self.n_lon)
    }

    /// Declared fill value, if any.
    pub fn fill_value(&self) -> Option<f64> {
        self.fill_value
    }

    /// Raw row-major values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at a cell, or `None` if the cell is missing or out of range.
    #[inline]
    pub fn get(&self, row: LatIndex, col: LonIndex) -> Option<f64> {
        if row.get() >= self.n_lat || col.get() >= self.n_lon {
            return None;
        }
        let v = self.values[row.get() * self.n_lon + col.get()];
        (!self.is_missing(v)).then_some(v)
    }

    /// Check whether a value is treated as missing by this field.
    #[inline]
    pub fn is_missing(&self, v: f64) -> bool {
        !is_valid_f64(v) || self.fill_value.is_some_and(|fill| v == fill)
    }

    /// Number of missing cells.
    pub fn count_missing(&self) -> usize {
        self.values.iter().filter(|&&v| self.is_missing(v)).count()
    }

    /// Copy of this field with the row order reversed.
    ///
    /// Pairs with [`Grid::flip_lats`](super::Grid::flip_lats).
    pub fn flip_rows(&self) -> Self {
        let values = self
            .values
            .chunks(self.n_lon.max(1))
            .rev()
            .flatten()
            .copied()
            .collect();
        Self {
            values,
            n_lat: self.n_lat,
            n_lon: self.n_lon,
            fill_value: self.fill_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_value_check() {
        assert!(is_valid_f64(10.0));
        assert!(is_valid_f64(-5.0));
        assert!(!is_valid_f64(f64::NAN));
        assert!(!is_valid_f64(f64::INFINITY));
        assert!(!is_valid_f64(FILL_VALUE_F64));
        assert!(!is_valid_f64(1.0e31));
    }

    #[test]
    fn test_from_rows_layout() {
        let f = Field::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(f.shape(), (2, 3));
        assert_eq!(f.get(LatIndex::new(1), LonIndex::new(2)), Some(6.0));
        assert_eq!(f.get(LatIndex::new(0), LonIndex::new(1)), Some(2.0));
        assert_eq!(f.get(LatIndex::new(2), LonIndex::new(0)), None);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Field::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, GridError::RaggedRow { row: 1, .. }));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = Field::new(vec![1.0; 5], 2, 3).unwrap_err();
        assert!(matches!(err, GridError::FieldLength { expected: 6, found: 5 }));
    }

    #[test]
    fn test_declared_fill_value_is_missing() {
        let f = Field::from_rows(vec![vec![1.0, -32767.0], vec![f64::NAN, 4.0]])
            .unwrap()
            .with_fill_value(-32767.0);
        assert_eq!(f.get(LatIndex::new(0), LonIndex::new(1)), None);
        assert_eq!(f.get(LatIndex::new(1), LonIndex::new(0)), None);
        assert_eq!(f.count_missing(), 2);
        assert_eq!(f.values()[1], -32767.0);
    }

    #[test]
    fn test_flip_rows() {
        let f = Field::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let flipped = f.flip_rows();
        assert_eq!(flipped.values(), &[5.0, 6.0, 3.0, 4.0, 1.0, 2.0]);
    }
}
