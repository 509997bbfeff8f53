//! A [`Chunk`]: one horizontal slice of a table, holding exactly one segment
//! per column, all of equal length.

use smallvec::SmallVec;

use crate::error::{Error, StorageResult};
use crate::ids::{ChunkOffset, ColumnID};
use crate::segment::AnySegment;
use crate::value::Value;

/// A small, fixed-cardinality list of a chunk's segments -- most tables have
/// a handful of columns, so this avoids a heap allocation per chunk in the
/// common case.
type SegmentList = SmallVec<[Box<dyn AnySegment>; 4]>;

/// One horizontal slice of a [`crate::table::Table`].
///
/// Every segment in a chunk has the same `size()`; `Chunk::append` enforces
/// this by appending to every column's segment in lockstep and is the only
/// mutator once a chunk has reached [`crate::config::StorageConfig::target_chunk_size`].
#[derive(Debug, Default)]
pub struct Chunk {
    segments: SegmentList,
}

impl Chunk {
    pub fn new() -> Self {
        Self {
            segments: SegmentList::new(),
        }
    }

    /// Adds a new, empty column segment. Only meaningful while the chunk is
    /// itself empty (mirrors `Table::add_column`'s "schema first" discipline).
    pub(crate) fn add_segment(&mut self, segment: Box<dyn AnySegment>) {
        self.segments.push(segment);
    }

    pub fn column_count(&self) -> usize {
        self.segments.len()
    }

    /// The number of rows in this chunk: the common `size()` of all its segments,
    /// or `0` if the chunk has no columns yet.
    pub fn size(&self) -> usize {
        self.segments.first().map(|s| s.size()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn segment(&self, column: ColumnID) -> StorageResult<&dyn AnySegment> {
        self.segments
            .get(column.index())
            .map(|b| b.as_ref())
            .ok_or(Error::ColumnIndexOutOfBounds(column))
    }

    pub fn segment_mut(&mut self, column: ColumnID) -> StorageResult<&mut Box<dyn AnySegment>> {
        self.segments
            .get_mut(column.index())
            .ok_or(Error::ColumnIndexOutOfBounds(column))
    }

    pub fn segments(&self) -> &[Box<dyn AnySegment>] {
        &self.segments
    }

    pub fn value_at(&self, column: ColumnID, offset: ChunkOffset) -> StorageResult<Value> {
        Ok(self.segment(column)?.value_at(offset))
    }

    /// Appends one row, given as one value per column in schema order.
    ///
    /// Arity is the caller's responsibility (`Table::append` checks it against
    /// the schema before calling this). A cast failure partway through leaves
    /// the earlier columns in this row already appended, matching the
    /// column-at-a-time semantics this is modeled on.
    pub fn append(&mut self, row: &[Value]) -> StorageResult<()> {
        for (segment, value) in self.segments.iter_mut().zip(row) {
            segment.append(value)?;
        }
        Ok(())
    }
}
