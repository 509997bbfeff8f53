//! Black-box coverage of the quantified invariants, round-trip properties,
//! and end-to-end scenarios this crate is expected to satisfy.

use std::sync::Arc;

use dyod_store::ids::{ChunkID, ChunkOffset, ColumnID, RowID};
use dyod_store::operator::Operator;
use dyod_store::scan::{Comparison, TableScan};
use dyod_store::segment::{DictionarySegment, ValueSegment};
use dyod_store::table::Table;
use dyod_store::value::Value;
use dyod_store::{StorageConfig, StorageManager};

fn source_segment(values: &[i32]) -> ValueSegment<i32> {
    let mut segment = ValueSegment::<i32>::new();
    for v in values {
        segment.append(&Value::Int(*v)).unwrap();
    }
    segment
}

#[test]
fn chunk_size_invariant_holds_across_every_segment() -> anyhow::Result<()> {
    let _ = env_logger::try_init();

    let mut table = Table::new(StorageConfig::default());
    table.add_column("a", "int")?;
    table.add_column("b", "string")?;
    table.append(&[Value::Int(1), Value::String("x".into())])?;
    table.append(&[Value::Int(2), Value::String("y".into())])?;

    let chunk = table.chunk(ChunkID::new(0))?;
    let sizes: Vec<usize> = chunk.segments().iter().map(|s| s.size()).collect();
    assert!(sizes.iter().all(|&s| s == chunk.size()));
    Ok(())
}

#[test]
fn row_count_equals_sum_of_chunk_sizes() {
    let mut table = Table::new(StorageConfig::new(3));
    table.add_column("a", "int").unwrap();
    for i in 0..10 {
        table.append(&[Value::Int(i)]).unwrap();
    }
    let total: usize = table.chunks().iter().map(|c| c.size()).sum();
    assert_eq!(table.row_count().index(), total);
}

#[test]
fn dictionary_decode_round_trip_reproduces_original_values() {
    let original = vec![5, 1, 5, 3, 1, 9, 3, 9, 9];
    let source = source_segment(&original);
    let dictionary = DictionarySegment::build(&source).unwrap();

    assert!(dictionary.dictionary().windows(2).all(|w| w[0] < w[1]));
    for (i, expected) in original.iter().enumerate() {
        let code = dictionary.attribute_vector().get(i);
        assert_eq!(dictionary.value_of_value_id(code), expected);
    }
}

#[test]
fn width_selection_reference_table() {
    let cases = [
        (16usize, 80usize),
        (255, 1275),
        (256, 1536),
        (1024, 6144),
    ];
    for (n, expected_memory) in cases {
        let values: Vec<i32> = (0..n as i32).collect();
        let source = source_segment(&values);
        let dictionary = DictionarySegment::build(&source).unwrap();
        assert_eq!(dictionary.memory_estimate(), expected_memory, "n = {n}");
    }
}

fn scenario_five_table() -> Arc<Table> {
    let mut table = Table::new(StorageConfig::default());
    table.add_column("x", "int").unwrap();
    table.add_column("y", "int").unwrap();
    for (x, y) in [(1, 10), (2, 20), (3, 30), (4, 40)] {
        table.append(&[Value::Int(x), Value::Int(y)]).unwrap();
    }
    Arc::new(table)
}

struct TableSource(Arc<Table>);

impl Operator for TableSource {
    fn execute(&self) -> dyod_store::StorageResult<()> {
        Ok(())
    }
    fn output(&self) -> dyod_store::StorageResult<Arc<Table>> {
        Ok(Arc::clone(&self.0))
    }
}

#[test]
fn scenario_five_table_scan_over_a_two_column_integer_table() -> anyhow::Result<()> {
    let input: Arc<dyn Operator> = Arc::new(TableSource(scenario_five_table()));
    let scan = TableScan::new(input, ColumnID::new(0), Comparison::GreaterThan, Value::Int(2));
    scan.execute()?;
    let output = scan.output()?;

    similar_asserts::assert_eq!(output.column_names(), &["x".to_string(), "y".to_string()]);
    assert_eq!(output.row_count().get(), 2);

    let chunk = output.chunk(ChunkID::new(0))?;
    let got = [
        chunk.value_at(ColumnID::new(0), ChunkOffset::new(0))?,
        chunk.value_at(ColumnID::new(0), ChunkOffset::new(1))?,
        chunk.value_at(ColumnID::new(1), ChunkOffset::new(0))?,
        chunk.value_at(ColumnID::new(1), ChunkOffset::new(1))?,
    ];
    similar_asserts::assert_eq!(got, [Value::Int(3), Value::Int(4), Value::Int(30), Value::Int(40)]);
    Ok(())
}

#[test]
fn scenario_six_chained_scan_through_a_reference_segment() -> anyhow::Result<()> {
    let input: Arc<dyn Operator> = Arc::new(TableSource(scenario_five_table()));
    let first = Arc::new(TableScan::new(input, ColumnID::new(0), Comparison::GreaterThan, Value::Int(2)));
    first.execute()?;

    let second = TableScan::new(first, ColumnID::new(1), Comparison::LessThan, Value::Int(40));
    second.execute()?;
    let output = second.output()?;

    assert_eq!(output.row_count().get(), 1);
    let chunk = output.chunk(ChunkID::new(0))?;
    assert_eq!(chunk.value_at(ColumnID::new(0), ChunkOffset::new(0))?, Value::Int(3));
    assert_eq!(chunk.value_at(ColumnID::new(1), ChunkOffset::new(0))?, Value::Int(30));
    Ok(())
}

#[test]
fn never_matching_predicate_yields_zero_rows_with_input_schema() {
    let input: Arc<dyn Operator> = Arc::new(TableSource(scenario_five_table()));
    let scan = TableScan::new(input, ColumnID::new(0), Comparison::GreaterThan, Value::Int(1_000));
    scan.execute().unwrap();
    let output = scan.output().unwrap();
    assert_eq!(output.row_count().get(), 0);
    assert_eq!(output.column_names(), &["x".to_string(), "y".to_string()]);
}

#[test]
fn repeated_equals_scan_preserves_row_count() {
    let input: Arc<dyn Operator> = Arc::new(TableSource(scenario_five_table()));
    let first = Arc::new(TableScan::new(input, ColumnID::new(0), Comparison::Equals, Value::Int(3)));
    first.execute().unwrap();
    let first_count = first.output().unwrap().row_count().get();

    let second = TableScan::new(first, ColumnID::new(0), Comparison::Equals, Value::Int(3));
    second.execute().unwrap();
    assert_eq!(second.output().unwrap().row_count().get(), first_count);
}

#[test]
fn storage_registry_semantics() {
    let manager = StorageManager::new();
    manager.add_table("a", Arc::new(Table::new(StorageConfig::default()))).unwrap();
    manager.add_table("b", Arc::new(Table::new(StorageConfig::default()))).unwrap();

    assert!(manager.has_table("a"));
    assert!(!manager.has_table("c"));
    assert!(manager.get_table("c").is_err());
    assert!(manager.drop_table("a").is_ok());
    assert!(manager.drop_table("a").is_err());
}

#[test]
fn dictionary_segment_append_always_fails() {
    let source = source_segment(&[1, 2, 3]);
    let mut dictionary = DictionarySegment::build(&source).unwrap();
    assert!(dyod_store::segment::AnySegment::append(&mut dictionary, &Value::Int(4)).is_err());
}

#[test]
fn chained_reference_to_reference_is_rejected() {
    let input: Arc<dyn Operator> = Arc::new(TableSource(scenario_five_table()));
    let first = Arc::new(TableScan::new(input, ColumnID::new(0), Comparison::GreaterThan, Value::Int(0)));
    first.execute().unwrap();
    let first_output = first.output().unwrap();

    let positions: Vec<RowID> = vec![RowID::new(ChunkID::new(0), ChunkOffset::new(0))];
    let result = dyod_store::segment::ReferenceSegment::new(first_output, ColumnID::new(0), Arc::new(positions));
    assert!(result.is_err());
}
