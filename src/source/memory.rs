//! In-memory grid source.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use super::{GridSource, SourceError, SourceOpener};
use crate::grid::{Field, Grid};
use crate::types::TimeIndex;

/// Grid source backed by fields already held in memory.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use era5_extract::grid::{Field, Grid};
/// use era5_extract::source::{GridSource, MemorySource};
/// use era5_extract::types::TimeIndex;
///
/// let grid = Grid::new(vec![52.0, 51.9], vec![10.0, 10.1]).unwrap();
/// let t0 = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let field = Field::new(vec![300.0, 302.0, 298.0, 299.0], 2, 2).unwrap();
///
/// let source = MemorySource::new(grid, vec![t0])
///     .with_field("t2m", vec![field])
///     .unwrap();
/// assert_eq!(source.n_times(), 1);
/// assert!(source.read_field("t2m", TimeIndex::new(0)).is_ok());
/// ```
#[derive(Clone, Debug)]
pub struct MemorySource {
    grid: Grid,
    times: Vec<NaiveDateTime>,
    fields: HashMap<String, Vec<Field>>,
}

impl MemorySource {
    pub fn new(grid: Grid, times: Vec<NaiveDateTime>) -> Self {
        Self {
            grid,
            times,
            fields: HashMap::new(),
        }
    }

    /// Add a variable with one field per time step.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        steps: Vec<Field>,
    ) -> Result<Self, SourceError> {
        let name = name.into();
        if steps.len() != self.times.len() {
            return Err(SourceError::InvalidData(format!(
                "variable {} has {} steps, time axis has {}",
                name,
                steps.len(),
                self.times.len()
            )));
        }
        for step in &steps {
            self.grid.check_field(step)?;
        }
        self.fields.insert(name, steps);
        Ok(self)
    }
}

impl GridSource for MemorySource {
    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn times(&self) -> &[NaiveDateTime] {
        &self.times
    }

    fn has_field(&self, field_name: &str) -> bool {
        self.fields.contains_key(field_name)
    }

    fn read_field(&self, field_name: &str, t: TimeIndex) -> Result<Field, SourceError> {
        let steps = self
            .fields
            .get(field_name)
            .ok_or_else(|| SourceError::MissingVariable(field_name.to_string()))?;
        steps
            .get(t.get())
            .cloned()
            .ok_or(SourceError::TimeIndex {
                index: t,
                n_times: steps.len(),
            })
    }
}

/// Opener that hands out clones of in-memory sources keyed by path.
#[derive(Clone, Debug, Default)]
pub struct MemoryOpener {
    sources: HashMap<PathBuf, MemorySource>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source under a path.
    pub fn insert(&mut self, path: impl Into<PathBuf>, source: MemorySource) {
        self.sources.insert(path.into(), source);
    }
}

impl SourceOpener for MemoryOpener {
    type Source = MemorySource;

    fn open(&self, path: &Path) -> Result<MemorySource, SourceError> {
        self.sources.get(path).cloned().ok_or_else(|| {
            SourceError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such grid file: {}", path.display()),
            ))
        })
    }
}
