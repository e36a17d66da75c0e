//! Location coordinates table.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::{TableError, reader_builder};
use crate::types::GeoPoint;

/// A named extraction location.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    pub index: usize,
    pub name: Option<String>,
    pub point: GeoPoint,
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    #[serde(default)]
    index: Option<usize>,
    #[serde(default)]
    name: Option<String>,
    latitude: f64,
    longitude: f64,
}

/// Locations keyed by integer index.
///
/// When the file has no `index` column, the 0-based row position is used.
#[derive(Clone, Debug, Default)]
pub struct CoordinatesTable {
    locations: BTreeMap<usize, Location>,
}

impl CoordinatesTable {
    /// Build a table, rejecting duplicate indexes and invalid coordinates.
    pub fn from_locations(locations: Vec<Location>) -> Result<Self, TableError> {
        let mut map = BTreeMap::new();
        for (row, loc) in locations.into_iter().enumerate() {
            let p = loc.point;
            if !(-90.0..=90.0).contains(&p.lat) || !p.lon.is_finite() {
                return Err(TableError::InvalidRow {
                    row: row + 1,
                    message: format!("invalid coordinates {}", p),
                });
            }
            let index = loc.index;
            if map.insert(index, loc).is_some() {
                return Err(TableError::Duplicate(format!("location index {}", index)));
            }
        }
        Ok(Self { locations: map })
    }

    /// Read a coordinates table from a delimited file.
    pub fn read(path: &Path, delimiter: u8) -> Result<Self, TableError> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file, delimiter)?;
        if table.is_empty() {
            return Err(TableError::Empty(path.display().to_string()));
        }
        Ok(table)
    }

    /// Parse a coordinates table from any reader.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, TableError> {
        let mut csv_reader = reader_builder(delimiter).from_reader(reader);
        let mut locations = Vec::new();
        for (row, result) in csv_reader.deserialize::<LocationRow>().enumerate() {
            let r = result?;
            locations.push(Location {
                index: r.index.unwrap_or(row),
                name: r.name,
                point: GeoPoint::new(r.latitude, r.longitude),
            });
        }
        Self::from_locations(locations)
    }

    /// Look up a location by index.
    pub fn get(&self, index: usize) -> Result<&Location, TableError> {
        self.locations
            .get(&index)
            .ok_or(TableError::UnknownLocation(index))
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Locations in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }
}
