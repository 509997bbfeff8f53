use std::any::Any;

use crate::error::StorageResult;
use crate::ids::ChunkOffset;
use crate::value::{ColumnType, Value};

use super::{AnySegment, SegmentKind};

/// An append-only, densely packed typed column of raw values.
#[derive(Debug, Clone)]
pub struct ValueSegment<T: ColumnType> {
    values: Vec<T>,
}

impl<T: ColumnType> ValueSegment<T> {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Exposes the dense value buffer for scan loops; the whole point of a
    /// value segment is that this slice can be iterated without any
    /// per-element dispatch.
    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T: ColumnType> Default for ValueSegment<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ColumnType> AnySegment for ValueSegment<T> {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Value
    }

    fn size(&self) -> usize {
        self.values.len()
    }

    fn memory_estimate(&self) -> usize {
        std::mem::size_of::<T>() * self.values.len()
    }

    fn value_at(&self, offset: ChunkOffset) -> Value {
        self.values[offset.index()].clone().into_value()
    }

    fn append(&mut self, value: &Value) -> StorageResult<()> {
        self.values.push(T::from_value(value)?);
        Ok(())
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
    use crate::ids::ChunkOffset;

    #[test]
    fn append_and_read_back() {
        let mut segment = ValueSegment::<i32>::new();
        segment.append(&Value::Int(10)).unwrap();
        segment.append(&Value::Int(20)).unwrap();
        assert_eq!(segment.size(), 2);
        assert_eq!(segment.value_at(ChunkOffset::new(1)), Value::Int(20));
    }

    #[test]
    fn append_rejects_unrelated_type() {
        let mut segment = ValueSegment::<i32>::new();
        assert!(segment.append(&Value::String("nope".into())).is_err());
    }

    #[test]
    fn memory_estimate_is_sizeof_times_len() {
        let mut segment = ValueSegment::<i64>::new();
        for i in 0..10 {
            segment.append(&Value::Long(i)).unwrap();
        }
        assert_eq!(segment.memory_estimate(), std::mem::size_of::<i64>() * 10);
    }
}
