use std::any::Any;
use std::sync::Arc;

use crate::error::{Error, StorageResult};
use crate::ids::{ChunkOffset, ColumnID, RowID};
use crate::table::Table;
use crate::value::Value;

use super::{AnySegment, SegmentKind};

/// An indirection segment: a position list of [`RowID`]s into some other
/// table's column, rather than values of its own.
///
/// Produced by [`crate::scan::TableScan`] and similar operators; a reference
/// segment is immutable and its `base_table` must itself contain only value
/// or dictionary segments ([`Error::ReferenceToReference`] -- chained
/// indirection is rejected rather than silently followed).
#[derive(Debug, Clone)]
pub struct ReferenceSegment {
    base_table: Arc<Table>,
    base_column: ColumnID,
    positions: Arc<Vec<RowID>>,
}

impl ReferenceSegment {
    pub fn new(
        base_table: Arc<Table>,
        base_column: ColumnID,
        positions: Arc<Vec<RowID>>,
    ) -> StorageResult<Self> {
        for chunk in base_table.chunks().iter() {
            if chunk.segment(base_column)?.kind() == SegmentKind::Reference {
                return Err(Error::ReferenceToReference);
            }
        }
        Ok(Self {
            base_table,
            base_column,
            positions,
        })
    }

    pub fn base_table(&self) -> &Arc<Table> {
        &self.base_table
    }

    pub fn base_column(&self) -> ColumnID {
        self.base_column
    }

    pub fn positions(&self) -> &[RowID] {
        &self.positions
    }
}

impl AnySegment for ReferenceSegment {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Reference
    }

    fn size(&self) -> usize {
        self.positions.len()
    }

    fn memory_estimate(&self) -> usize {
        std::mem::size_of::<RowID>() * self.positions.len()
    }

    fn value_at(&self, offset: ChunkOffset) -> Value {
        let row = self.positions[offset.index()];
        let chunk = self
            .base_table
            .chunk(row.chunk_id)
            .expect("a reference segment's positions always point into its base table");
        let segment = chunk
            .segment(self.base_column)
            .expect("a reference segment's base_column always exists in its base table");
        segment.value_at(row.chunk_offset)
    }

    fn append(&mut self, _value: &Value) -> StorageResult<()> {
        Err(Error::ImmutabilityViolation { kind: "reference" })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::ids::ChunkID;

    fn one_chunk_table() -> Arc<Table> {
        let mut table = Table::new(StorageConfig::default());
        table.add_column("name", "string").unwrap();
        table.append(&[Value::String("Alexander".into())]).unwrap();
        table.append(&[Value::String("Hasso".into())]).unwrap();
        Arc::new(table)
    }

    #[test]
    fn value_at_indirects_through_the_base_table() {
        let base = one_chunk_table();
        let positions = Arc::new(vec![
            RowID::new(ChunkID::new(0), ChunkOffset::new(1)),
            RowID::new(ChunkID::new(0), ChunkOffset::new(0)),
        ]);
        let reference = ReferenceSegment::new(base, ColumnID::new(0), positions).unwrap();

        assert_eq!(reference.size(), 2);
        assert_eq!(reference.value_at(ChunkOffset::new(0)), Value::String("Hasso".into()));
        assert_eq!(reference.value_at(ChunkOffset::new(1)), Value::String("Alexander".into()));
    }

    #[test]
    fn append_on_reference_segment_always_fails() {
        let base = one_chunk_table();
        let mut reference =
            ReferenceSegment::new(base, ColumnID::new(0), Arc::new(Vec::new())).unwrap();
        assert!(reference.append(&Value::String("nope".into())).is_err());
    }
}
