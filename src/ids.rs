//! Distinct unsigned-integer identifiers used throughout the storage layer.
//!
//! `ColumnID`, `ChunkID`, `ChunkOffset`, `ColumnCount` and `ValueID` are all
//! plain `u32` newtypes, kept deliberately non-interchangeable so that mixing
//! up e.g. a `ColumnID` and a `ChunkOffset` is a type error rather than a
//! silent bug.

use std::fmt;

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            #[inline]
            pub const fn get(self) -> u32 {
                self.0
            }

            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<u32> for $name {
            #[inline]
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

index_type!(
    /// Identifies a column by its position in a table's schema.
    ColumnID
);
index_type!(
    /// Identifies a chunk by its position in a table's chunk vector.
    ChunkID
);
index_type!(
    /// Identifies a row within a chunk.
    ChunkOffset
);
index_type!(
    /// A count of columns (distinct from `ColumnID` so the two can't be confused at a call site).
    ColumnCount
);
index_type!(
    /// An index into a dictionary segment's sorted dictionary.
    ValueID
);

/// Sentinel meaning "no such dictionary entry". The maximum representable `ValueID`.
pub const INVALID_VALUE_ID: ValueID = ValueID(u32::MAX);

/// The global address of a row: which chunk, and which offset within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowID {
    pub chunk_id: ChunkID,
    pub chunk_offset: ChunkOffset,
}

impl RowID {
    #[inline]
    pub const fn new(chunk_id: ChunkID, chunk_offset: ChunkOffset) -> Self {
        Self {
            chunk_id,
            chunk_offset,
        }
    }
}

impl fmt::Display for RowID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowID{{{}, {}}}", self.chunk_id, self.chunk_offset)
    }
}
