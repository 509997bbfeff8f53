//! The storage layer's error taxonomy.
//!
//! One enum, one variant per failure mode named in the design: schema
//! violations, type-resolution failures, cast failures, immutability
//! violations, not-yet-executed reads, registry lookups, and internal
//! invariant breaks. All of them are fatal to the enclosing query; nothing
//! here is retried internally.

use crate::ids::{ChunkID, ColumnID};
use crate::value::Value;

/// The result type used across the entire crate.
pub type StorageResult<T> = Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A type-tag string outside of `{"int", "long", "float", "double", "string"}`.
    #[error("'{0}' is not a recognized column type tag")]
    UnknownColumnType(String),

    /// A column name that does not exist in a table's schema.
    #[error("no column named '{0}' in this table's schema")]
    UnknownColumnName(String),

    /// A `Value` could not be converted to the requested column type.
    #[error("cannot cast {value:?} to column type '{to}'")]
    CastFailure { value: Value, to: &'static str },

    /// `add_column` called on a table that already has rows.
    #[error("adding a column is only allowed on an empty table")]
    AddColumnOnNonEmptyTable,

    /// A row passed to `append` has the wrong number of values.
    #[error("row has {got} value(s) but the table has {expected} column(s)")]
    RowArityMismatch { expected: usize, got: usize },

    /// `DictionarySegment::build` called on an empty value segment.
    #[error("a dictionary segment must be built from a non-empty value segment")]
    EmptyDictionarySource,

    /// `append` called on a dictionary or reference segment.
    #[error("{kind} segments are immutable and cannot be appended to")]
    ImmutabilityViolation { kind: &'static str },

    /// The adaptive width rule (1/2/4 bytes) cannot address this many distinct codes.
    #[error("no 1/2/4-byte attribute vector width can address {0} distinct codes")]
    AttributeVectorWidthOverflow(usize),

    /// `Operator::output` called before `Operator::execute`.
    #[error("operator output was read before execute() was called")]
    NotYetExecuted,

    /// `StorageManager::add_table` called with a name already present.
    #[error("table '{0}' already exists in the registry")]
    TableAlreadyExists(String),

    /// `StorageManager::get_table`/`drop_table` called with an absent name.
    #[error("table '{0}' was not found in the registry")]
    TableNotFound(String),

    /// A scan expected a value or dictionary segment of a specific type at this column but
    /// found something else. Only possible if a table's declared column types and its
    /// segments' actual types have diverged, which the public API never permits.
    #[error("segment at column {0} was not of the expected kind/type during a scan")]
    SegmentKindMismatch(ColumnID),

    /// A reference segment's base table itself contained a reference segment.
    #[error("a reference segment's base table must contain only value or dictionary segments")]
    ReferenceToReference,

    /// A chunk index past the end of a table's chunk vector.
    #[error("chunk {0} does not exist in this table")]
    ChunkNotFound(ChunkID),

    /// A column index past the end of a chunk's or table's column count.
    #[error("column {0} does not exist in this chunk/table")]
    ColumnIndexOutOfBounds(ColumnID),
}
