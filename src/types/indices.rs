//! Strongly-typed index newtypes.
//!
//! These types prevent mixing up row (latitude), column (longitude) and
//! time-step indices when addressing a gridded field.

use std::fmt;

/// Macro to generate index newtypes with common functionality.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// Following index, if it is below `len`.
            #[inline]
            pub fn checked_next(self, len: usize) -> Option<Self> {
                let next = self.0.checked_add(1)?;
                (next < len).then_some(Self(next))
            }

            /// Preceding index, or `None` at zero.
            #[inline]
            pub fn checked_prev(self) -> Option<Self> {
                self.0.checked_sub(1).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }
    };
}

define_index!(
    /// Row index of a field, aligned with the latitude axis.
    ///
    /// # Example
    ///
    /// ```
    /// use era5_extract::types::LatIndex;
    ///
    /// let row = LatIndex::new(3);
    /// assert_eq!(row.get(), 3);
    /// assert_eq!(row.checked_prev(), Some(LatIndex::new(2)));
    /// ```
    LatIndex,
    "lat#"
);

define_index!(
    /// Column index of a field, aligned with the longitude axis.
    LonIndex,
    "lon#"
);

define_index!(
    /// Index along the time dimension of a grid file.
    TimeIndex,
    "t#"
);

impl TimeIndex {
    /// Iterate over [0, n) time indices.
    pub fn iter(n: usize) -> impl ExactSizeIterator<Item = TimeIndex> {
        (0..n).map(TimeIndex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_index() {
        let idx = LatIndex::new(42);
        assert_eq!(idx.get(), 42);
        assert_eq!(usize::from(idx), 42);
    }

    #[test]
    fn test_checked_neighbours() {
        let idx = LonIndex::new(0);
        assert_eq!(idx.checked_prev(), None);
        assert_eq!(idx.checked_next(2), Some(LonIndex::new(1)));
        assert_eq!(LonIndex::new(1).checked_next(2), None);
    }

    #[test]
    fn test_time_index_iter() {
        let indices: Vec<_> = TimeIndex::iter(4).collect();
        assert_eq!(indices.len(), 4);
        assert_eq!(indices[3].get(), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", LatIndex::new(7)), "lat#7");
        assert_eq!(format!("{}", LonIndex::new(2)), "lon#2");
        assert_eq!(format!("{}", TimeIndex::new(5)), "t#5");
    }

    #[test]
    fn test_from_conversions() {
        let t: TimeIndex = 12.into();
        let back: usize = t.into();
        assert_eq!(back, 12);
    }
}
