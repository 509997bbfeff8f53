//! The segment capability set and its three variants.
//!
//! Segments are a tagged union over `{value-of-T, dictionary-of-T,
//! reference}`. We express the tag as [`SegmentKind`] and the union as a
//! trait object (`Box<dyn AnySegment>`): scan loops resolve a column's static
//! element type once via [`crate::with_column_type!`], then use
//! `Any::downcast_ref` (the same pattern `arrow2`'s `Array` trait object uses
//! everywhere in this codebase) to recover a concrete, statically typed
//! `&ValueSegment<T>` / `&DictionarySegment<T>` for the rest of the loop. The
//! downcast happens once per chunk, not once per row.

mod dictionary_segment;
mod reference_segment;
mod value_segment;

pub use dictionary_segment::DictionarySegment;
pub use reference_segment::ReferenceSegment;
pub use value_segment::ValueSegment;

use std::any::Any;
use std::fmt;

use crate::error::StorageResult;
use crate::ids::{ChunkOffset, ColumnID};
use crate::value::Value;

/// Which of the three segment variants a given segment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Value,
    Dictionary,
    Reference,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Value => "value",
            Self::Dictionary => "dictionary",
            Self::Reference => "reference",
        };
        f.write_str(name)
    }
}

/// The shared capability set every segment variant implements:
/// `value_at`, `append`, `size`, `memory_estimate`, plus the `Any` escape
/// hatch scans use to recover the concrete type after resolving it.
pub trait AnySegment: Any + Send + Sync + fmt::Debug {
    fn kind(&self) -> SegmentKind;

    fn size(&self) -> usize;

    /// A rough byte estimate of this segment's footprint; cheap to compute,
    /// not a precise accounting (heap bytes behind e.g. `String` values are
    /// not included, matching `sizeof(T)`-style estimates).
    fn memory_estimate(&self) -> usize;

    fn value_at(&self, offset: ChunkOffset) -> Value;

    /// Appends `value` to this segment. Fails on dictionary/reference
    /// segments (immutable) or on a value/type mismatch.
    fn append(&mut self, value: &Value) -> StorageResult<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Downcasts `segment` to a concrete `&ValueSegment<T>`/`&DictionarySegment<T>`/
/// `&ReferenceSegment`, wrapping the dyn-cast failure in the crate's error
/// type with `column` for context.
///
/// A mismatch here only happens if a table's declared column type and a
/// segment's actual type have diverged, which the public API never permits;
/// it is an internal-invariant error, not something callers are expected to
/// hit.
pub(crate) fn downcast<'a, S: AnySegment>(
    segment: &'a dyn AnySegment,
    column: ColumnID,
) -> StorageResult<&'a S> {
    segment
        .as_any()
        .downcast_ref::<S>()
        .ok_or(crate::error::Error::SegmentKindMismatch(column))
}
