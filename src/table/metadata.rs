//! Variable metadata table.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use super::{TableError, reader_builder};

/// One variable of the metadata table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct VariableMeta {
    /// Short name used on the command line and as output column header
    pub short_name: String,
    /// Name of the variable inside the NetCDF files
    pub field_name: String,
    #[serde(default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
}

/// Mapping from variable short names to dataset fields.
#[derive(Clone, Debug, Default)]
pub struct MetadataTable {
    entries: Vec<VariableMeta>,
    by_short_name: HashMap<String, usize>,
}

impl MetadataTable {
    /// Build a table, rejecting duplicate short names.
    pub fn from_entries(entries: Vec<VariableMeta>) -> Result<Self, TableError> {
        let mut by_short_name = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if entry.short_name.is_empty() || entry.field_name.is_empty() {
                return Err(TableError::InvalidRow {
                    row: i + 1,
                    message: "short_name and field_name must not be empty".to_string(),
                });
            }
            if by_short_name.insert(entry.short_name.clone(), i).is_some() {
                return Err(TableError::Duplicate(entry.short_name.clone()));
            }
        }
        Ok(Self {
            entries,
            by_short_name,
        })
    }

    /// Read a metadata table from a delimited file.
    pub fn read(path: &Path, delimiter: u8) -> Result<Self, TableError> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file, delimiter)?;
        if table.is_empty() {
            return Err(TableError::Empty(path.display().to_string()));
        }
        Ok(table)
    }

    /// Parse a metadata table from any reader.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, TableError> {
        let mut csv_reader = reader_builder(delimiter).from_reader(reader);
        let entries = csv_reader
            .deserialize()
            .collect::<Result<Vec<VariableMeta>, csv::Error>>()?;
        Self::from_entries(entries)
    }

    /// Look up a variable by short name.
    pub fn get(&self, short_name: &str) -> Result<&VariableMeta, TableError> {
        self.by_short_name
            .get(short_name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| TableError::UnknownVariable(short_name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in file order.
    pub fn iter(&self) -> impl Iterator<Item = &VariableMeta> {
        self.entries.iter()
    }
}
