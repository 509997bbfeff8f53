use std::any::Any;
use std::cmp::Ordering;

use itertools::Itertools as _;

use crate::attribute_vector::AttributeVector;
use crate::error::{Error, StorageResult};
use crate::ids::{ChunkOffset, ValueID, INVALID_VALUE_ID};
use crate::value::{ColumnType, Value};

use super::{AnySegment, SegmentKind, ValueSegment};

/// An immutable, sorted-dictionary-encoded column.
///
/// Built once from a [`ValueSegment`] (see [`DictionarySegment::build`]) and
/// never mutated afterwards: `append` always fails.
#[derive(Debug, Clone)]
pub struct DictionarySegment<T: ColumnType> {
    /// Sorted, distinct values. `dictionary[attribute_vector.get(i)] == original value at row i`.
    dictionary: Vec<T>,
    attribute_vector: AttributeVector,
}

impl<T: ColumnType> DictionarySegment<T> {
    /// Builds a dictionary segment from a value segment's contents.
    ///
    /// 1. Collects the distinct values into a sorted set.
    /// 2. Materializes the dictionary as that sorted, distinct sequence.
    /// 3. Allocates an attribute vector sized to the *dictionary's*
    ///    cardinality (not the row count -- width tracks cardinality).
    /// 4. Binary-searches each input row's value in the dictionary to find
    ///    its code.
    ///
    /// Fails if `source` is empty.
    pub fn build(source: &ValueSegment<T>) -> StorageResult<Self> {
        if source.size() == 0 {
            return Err(Error::EmptyDictionarySource);
        }

        let dictionary: Vec<T> = source
            .values()
            .iter()
            .cloned()
            .sorted_by(T::natural_cmp)
            .dedup_by(|a, b| a.natural_cmp(b) == Ordering::Equal)
            .collect();

        let mut attribute_vector = AttributeVector::with_capacity(dictionary.len(), source.size())?;
        for value in source.values() {
            let code = dictionary
                .binary_search_by(|probe| probe.natural_cmp(value))
                .expect("every input value is present in its own dictionary by construction");
            attribute_vector.push(ValueID::new(code as u32));
        }

        Ok(Self {
            dictionary,
            attribute_vector,
        })
    }

    pub fn dictionary(&self) -> &[T] {
        &self.dictionary
    }

    pub fn attribute_vector(&self) -> &AttributeVector {
        &self.attribute_vector
    }

    pub fn value_of_value_id(&self, value_id: ValueID) -> &T {
        &self.dictionary[value_id.index()]
    }

    pub fn unique_values_count(&self) -> usize {
        self.dictionary.len()
    }

    /// The smallest index `k` with `dictionary[k] >= value`, or [`INVALID_VALUE_ID`] if none.
    pub fn lower_bound(&self, value: &T) -> ValueID {
        let index = self
            .dictionary
            .partition_point(|probe| probe.natural_cmp(value) == Ordering::Less);
        if index < self.dictionary.len() {
            ValueID::new(index as u32)
        } else {
            INVALID_VALUE_ID
        }
    }

    /// The smallest index `k` with `dictionary[k] > value`, or [`INVALID_VALUE_ID`] if none.
    pub fn upper_bound(&self, value: &T) -> ValueID {
        let index = self
            .dictionary
            .partition_point(|probe| probe.natural_cmp(value) != Ordering::Greater);
        if index < self.dictionary.len() {
            ValueID::new(index as u32)
        } else {
            INVALID_VALUE_ID
        }
    }
}

impl<T: ColumnType> AnySegment for DictionarySegment<T> {
    fn kind(&self) -> SegmentKind {
        SegmentKind::Dictionary
    }

    fn size(&self) -> usize {
        self.attribute_vector.size()
    }

    fn memory_estimate(&self) -> usize {
        std::mem::size_of::<T>() * self.dictionary.len()
            + self.attribute_vector.width_in_bytes() * self.attribute_vector.size()
    }

    fn value_at(&self, offset: ChunkOffset) -> Value {
        let code = self.attribute_vector.get(offset.index());
        self.value_of_value_id(code).clone().into_value()
    }

    fn append(&mut self, _value: &Value) -> StorageResult<()> {
        Err(Error::ImmutabilityViolation { kind: "dictionary" })
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

    fn build_string_segment(values: &[&str]) -> ValueSegment<String> {
        let mut segment = ValueSegment::<String>::new();
        for v in values {
            segment.append(&Value::String((*v).to_string())).unwrap();
        }
        segment
    }

    #[test]
    fn dictionary_encoding_of_strings() {
        let source = build_string_segment(&["Bill", "Steve", "Alexander", "Steve", "Hasso", "Bill"]);
        let dict = DictionarySegment::build(&source).unwrap();

        assert_eq!(
            dict.dictionary(),
            &["Alexander".to_string(), "Bill".to_string(), "Hasso".to_string(), "Steve".to_string()]
        );
        let codes: Vec<u32> = (0..dict.size()).map(|i| dict.attribute_vector().get(i).get()).collect();
        assert_eq!(codes, vec![1, 3, 0, 3, 2, 1]);
        assert_eq!(dict.unique_values_count(), 4);
        assert_eq!(dict.size(), 6);
        assert_eq!(dict.value_of_value_id(ValueID::new(0)), "Alexander");
    }

    #[test]
    fn lower_and_upper_bound() {
        let mut source = ValueSegment::<i32>::new();
        for v in [0, 2, 4, 6, 8, 10] {
            source.append(&Value::Int(v)).unwrap();
        }
        let dict = DictionarySegment::build(&source).unwrap();

        assert_eq!(dict.lower_bound(&4).get(), 2);
        assert_eq!(dict.upper_bound(&4).get(), 3);
        assert_eq!(dict.lower_bound(&5).get(), 3);
        assert_eq!(dict.upper_bound(&5).get(), 3);
        assert_eq!(dict.lower_bound(&15), INVALID_VALUE_ID);
        assert_eq!(dict.upper_bound(&15), INVALID_VALUE_ID);
    }

    #[test]
    fn append_on_dictionary_segment_always_fails() {
        let source = build_string_segment(&["a"]);
        let mut dict = DictionarySegment::build(&source).unwrap();
        assert!(dict.append(&Value::String("b".into())).is_err());
    }

    #[test]
    fn building_from_empty_value_segment_fails() {
        let source = ValueSegment::<i32>::new();
        assert!(matches!(
            DictionarySegment::build(&source),
            Err(Error::EmptyDictionarySource)
        ));
    }

    #[test]
    fn decoding_every_row_reproduces_the_original_sequence() {
        let original = vec![5, 1, 5, 3, 1, 9, 3];
        let mut source = ValueSegment::<i32>::new();
        for v in &original {
            source.append(&Value::Int(*v)).unwrap();
        }
        let dict = DictionarySegment::build(&source).unwrap();

        let decoded: Vec<i32> = (0..dict.size())
            .map(|i| *dict.value_of_value_id(dict.attribute_vector().get(i)))
            .collect();
        assert_eq!(decoded, original);
        assert!(dict.dictionary().windows(2).all(|w| w[0] < w[1]));
    }
}
