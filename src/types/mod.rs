//! Strongly-typed domain types for safer APIs.
//!
//! - **Index newtypes**: `LatIndex`, `LonIndex` and `TimeIndex` cannot be
//!   swapped by accident when addressing a field.
//! - **Geographic types**: `GeoPoint` for query locations and `GeoBounds`
//!   for the envelope covered by a grid.
//!
//! # Example
//!
//! ```
//! use era5_extract::types::{GeoBounds, GeoPoint, LatIndex, LonIndex};
//!
//! let bounds = GeoBounds::new(51.9, 52.0, 10.0, 10.1);
//! let p = GeoPoint::new(51.95, 10.05);
//! assert!(bounds.contains(p));
//!
//! let (row, col) = (LatIndex::new(1), LonIndex::new(0));
//! assert_eq!((row.get(), col.get()), (1, 0));
//! ```

mod bounds;
mod indices;

pub use bounds::{GeoBounds, GeoPoint};
pub use indices::{LatIndex, LonIndex, TimeIndex};
