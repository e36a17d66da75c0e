//! Extraction configuration.
//!
//! All settings the drivers need travel in an explicit [`ExtractConfig`]
//! value; nothing is read from global state.
//!
//! # Example
//!
//! ```
//! use era5_extract::config::ExtractConfig;
//! use era5_extract::interpolate::BoundaryPolicy;
//!
//! let config = ExtractConfig::new("/data/ERA5-Land", "out")
//!     .with_pattern("{year}/{field}_{year}{month}.nc")
//!     .unwrap()
//!     .with_boundary(BoundaryPolicy::Clamp)
//!     .with_check(true);
//!
//! assert!(config.check);
//! assert_eq!(config.boundary, BoundaryPolicy::Clamp);
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::interpolate::BoundaryPolicy;
use crate::series::ExtractOptions;
use crate::table::VariableMeta;

/// Default archive file pattern, relative to the archive root.
pub const DEFAULT_PATTERN: &str = "{year}/{variable}_{year}_{month}.nc";

/// Error type for configuration problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Pattern uses a placeholder that is not provided
    #[error("unknown placeholder {{{0}}} in file pattern")]
    UnknownPlaceholder(String),

    /// Pattern has an opening brace without a closing one
    #[error("unclosed placeholder in file pattern '{0}'")]
    UnclosedPlaceholder(String),

    /// Month outside 1..=12
    #[error("invalid month {0}, expected 1-12")]
    InvalidMonth(u32),

    /// Batch list left empty
    #[error("no {0} given")]
    Empty(&'static str),
}

/// Maps (year, month, variable) to a NetCDF file inside the archive.
///
/// Placeholders: `{year}`, `{month}` (two digits), `{variable}` (short
/// name) and `{field}` (dataset field name).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveLayout {
    pub root: PathBuf,
    pub pattern: String,
}

impl ArchiveLayout {
    /// Create a layout, validating the pattern.
    pub fn new(root: impl Into<PathBuf>, pattern: impl Into<String>) -> Result<Self, ConfigError> {
        let pattern = pattern.into();
        render(&pattern, &sample_vars())?;
        Ok(Self {
            root: root.into(),
            pattern,
        })
    }

    /// Path of the grid file for one month of one variable.
    pub fn resolve(
        &self,
        year: i32,
        month: u32,
        variable: &VariableMeta,
    ) -> Result<PathBuf, ConfigError> {
        if !(1..=12).contains(&month) {
            return Err(ConfigError::InvalidMonth(month));
        }
        let vars = [
            ("year", year.to_string()),
            ("month", format!("{:02}", month)),
            ("variable", variable.short_name.clone()),
            ("field", variable.field_name.clone()),
        ];
        Ok(self.root.join(render(&self.pattern, &vars)?))
    }
}

fn sample_vars() -> [(&'static str, String); 4] {
    [
        ("year", "2000".to_string()),
        ("month", "01".to_string()),
        ("variable", "V".to_string()),
        ("field", "f".to_string()),
    ]
}

fn render(pattern: &str, vars: &[(&str, String)]) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| ConfigError::UnclosedPlaceholder(pattern.to_string()))?;
        let key = &after[..end];
        let value = vars
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
            .ok_or_else(|| ConfigError::UnknownPlaceholder(key.to_string()))?;
        out.push_str(value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Settings for extraction runs.
#[derive(Clone, Debug)]
pub struct ExtractConfig {
    /// Where input grid files live
    pub layout: ArchiveLayout,
    /// Directory receiving output tables
    pub output_dir: PathBuf,
    /// Handling of points on/beyond the grid edge
    pub boundary: BoundaryPolicy,
    /// Delimiter for input tables and output series
    pub delimiter: u8,
    /// Rewrite outputs that already exist
    pub overwrite: bool,
    /// Dry run: plan and log, read and write nothing
    pub check: bool,
    /// Cross-check every value against the reference interpolator
    pub verify_reference: bool,
}

impl ExtractConfig {
    /// Create a configuration with the default archive pattern.
    pub fn new(archive_root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            layout: ArchiveLayout {
                root: archive_root.into(),
                pattern: DEFAULT_PATTERN.to_string(),
            },
            output_dir: output_dir.into(),
            boundary: BoundaryPolicy::Strict,
            delimiter: b',',
            overwrite: false,
            check: false,
            verify_reference: false,
        }
    }

    /// Set the archive file pattern.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Result<Self, ConfigError> {
        self.layout = ArchiveLayout::new(self.layout.root, pattern)?;
        Ok(self)
    }

    /// Set the boundary policy.
    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    /// Set the table delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Enable/disable overwriting existing outputs.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Enable/disable check (dry-run) mode.
    pub fn with_check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    /// Enable/disable reference cross-checking.
    pub fn with_verify_reference(mut self, verify: bool) -> Self {
        self.verify_reference = verify;
        self
    }

    /// Interpolation options for the series driver.
    pub fn options(&self) -> ExtractOptions {
        ExtractOptions {
            boundary: self.boundary,
            verify_reference: self.verify_reference,
        }
    }
}
