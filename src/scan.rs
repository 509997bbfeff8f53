//! [`TableScan`]: evaluates a comparison predicate against one column and
//! produces a one-chunk table of reference segments.

use std::fmt;
use std::sync::Arc;

use crate::config::StorageConfig;
use crate::error::StorageResult;
use crate::ids::{ChunkID, ChunkOffset, ColumnID, RowID, INVALID_VALUE_ID};
use crate::operator::{Operator, OperatorBase};
use crate::segment::{downcast, DictionarySegment, ReferenceSegment, SegmentKind, ValueSegment};
use crate::table::Table;
use crate::value::{ColumnType, Value};
use crate::with_column_type;

/// The six comparison operators a scan predicate may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::LessThan => "<",
            Self::LessThanEquals => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanEquals => ">=",
        };
        f.write_str(symbol)
    }
}

/// Resolves a [`Comparison`] to a statically typed `(T, T) -> bool` predicate
/// matching its meaning on `T`'s natural order (lexicographic for strings,
/// IEEE-754 for floats -- the comparator is not required to be a total order
/// the way dictionary sorting is, see [`ColumnType::natural_cmp`]).
fn resolve_comparator<T: ColumnType>(comparison: Comparison) -> fn(&T, &T) -> bool {
    match comparison {
        Comparison::Equals => |a, b| a == b,
        Comparison::NotEquals => |a, b| a != b,
        Comparison::LessThan => |a, b| a < b,
        Comparison::LessThanEquals => |a, b| a <= b,
        Comparison::GreaterThan => |a, b| a > b,
        Comparison::GreaterThanEquals => |a, b| a >= b,
    }
}

/// Reads one column of an input table, evaluates `comparison` against
/// `search_value`, and produces a one-chunk table of reference segments
/// covering every column of the (possibly indirected) effective base table.
pub struct TableScan {
    base: OperatorBase,
    column_id: ColumnID,
    comparison: Comparison,
    search_value: Value,
}

impl TableScan {
    pub fn new(
        input: Arc<dyn Operator>,
        column_id: ColumnID,
        comparison: Comparison,
        search_value: Value,
    ) -> Self {
        Self {
            base: OperatorBase::with_left(input),
            column_id,
            comparison,
            search_value,
        }
    }

    pub fn column_id(&self) -> ColumnID {
        self.column_id
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    pub fn search_value(&self) -> &Value {
        &self.search_value
    }

    fn on_execute(&self) -> StorageResult<Arc<Table>> {
        let input_table = self.base.left_input_table()?;

        if input_table.row_count().get() == 0 {
            return Self::empty_output(&input_table);
        }

        let type_tag = input_table.column_type(self.column_id)?.to_string();
        let (base_table, positions) = with_column_type!(type_tag.as_str(), |T| {
            let search: T = T::from_value(&self.search_value)?;
            let cmp = resolve_comparator::<T>(self.comparison);
            Self::walk::<T>(&input_table, self.column_id, self.comparison, cmp, &search)
        })?;

        Self::build_output(base_table, positions)
    }

    /// Walks the input's chunks in order, dispatching on each chunk's segment
    /// variant at `column_id`. Returns the effective base table (the input
    /// table itself, unless a reference segment was observed) and the
    /// matching position list expressed in that base table's `RowID`s.
    fn walk<T: ColumnType>(
        input_table: &Arc<Table>,
        column_id: ColumnID,
        comparison: Comparison,
        cmp: fn(&T, &T) -> bool,
        search: &T,
    ) -> StorageResult<(Arc<Table>, Vec<RowID>)> {
        let mut positions = Vec::new();
        let mut effective_base: Option<Arc<Table>> = None;

        for chunk_index in 0..input_table.chunk_count().get() {
            let chunk_id = ChunkID::new(chunk_index);
            let chunk = input_table.chunk(chunk_id)?;
            let segment = chunk.segment(column_id)?;

            match segment.kind() {
                SegmentKind::Value => {
                    let value_segment = downcast::<ValueSegment<T>>(segment, column_id)?;
                    for (offset, value) in value_segment.values().iter().enumerate() {
                        if cmp(value, search) {
                            positions.push(RowID::new(chunk_id, ChunkOffset::new(offset as u32)));
                        }
                    }
                }
                SegmentKind::Dictionary => {
                    let dictionary = downcast::<DictionarySegment<T>>(segment, column_id)?;
                    let skip = match comparison {
                        Comparison::Equals | Comparison::GreaterThanEquals => {
                            dictionary.lower_bound(search) == INVALID_VALUE_ID
                        }
                        Comparison::GreaterThan => dictionary.upper_bound(search) == INVALID_VALUE_ID,
                        _ => false,
                    };
                    if skip {
                        continue;
                    }
                    for offset in 0..dictionary.size() {
                        let code = dictionary.attribute_vector().get(offset);
                        let decoded = dictionary.value_of_value_id(code);
                        if cmp(decoded, search) {
                            positions.push(RowID::new(chunk_id, ChunkOffset::new(offset as u32)));
                        }
                    }
                }
                SegmentKind::Reference => {
                    let reference = downcast::<ReferenceSegment>(segment, column_id)?;
                    for &row in reference.positions() {
                        let value = reference
                            .base_table()
                            .chunk(row.chunk_id)?
                            .value_at(reference.base_column(), row.chunk_offset)?;
                        let typed = T::from_value(&value)?;
                        if cmp(&typed, search) {
                            positions.push(row);
                        }
                    }
                    effective_base = Some(Arc::clone(reference.base_table()));
                    // A single reference segment is expected to cover its whole input;
                    // the outer input's remaining chunks are not scanned.
                    break;
                }
            }
        }

        let base_table = effective_base.unwrap_or_else(|| Arc::clone(input_table));
        Ok((base_table, positions))
    }

    /// Builds a zero-row table whose schema mirrors `input`.
    fn empty_output(input: &Arc<Table>) -> StorageResult<Arc<Table>> {
        let config = StorageConfig {
            target_chunk_size: input.target_chunk_size(),
            enable_sanity_checks: cfg!(debug_assertions),
        };
        let mut output = Table::new(config);
        for index in 0..input.column_count().get() {
            let column_id = ColumnID::new(index);
            output.add_column(input.column_name(column_id)?, input.column_type(column_id)?)?;
        }
        Ok(Arc::new(output))
    }

    /// For every column of `base_table`, adds a matching column definition and one reference
    /// segment sharing `positions`, `base_table`, and that column index.
    fn build_output(base_table: Arc<Table>, positions: Vec<RowID>) -> StorageResult<Arc<Table>> {
        let positions = Arc::new(positions);
        let column_count = base_table.column_count().get();

        let mut column_names = Vec::with_capacity(column_count as usize);
        let mut column_types = Vec::with_capacity(column_count as usize);
        let mut chunk = crate::chunk::Chunk::new();

        for index in 0..column_count {
            let column_id = ColumnID::new(index);
            column_names.push(base_table.column_name(column_id)?.to_string());
            column_types.push(base_table.column_type(column_id)?.to_string());
            let reference = ReferenceSegment::new(Arc::clone(&base_table), column_id, Arc::clone(&positions))?;
            chunk.add_segment(Box::new(reference));
        }

        let config = StorageConfig {
            target_chunk_size: base_table.target_chunk_size(),
            enable_sanity_checks: cfg!(debug_assertions),
        };
        log::debug!(
            "table_scan: produced {} matching row(s) across {column_count} column(s)",
            chunk.size()
        );
        Ok(Arc::new(Table::from_parts(config, column_names, column_types, vec![chunk])))
    }
}

impl Operator for TableScan {
    fn execute(&self) -> StorageResult<()> {
        if self.base.has_executed() {
            return Ok(());
        }
        let output = self.on_execute()?;
        self.base.set_output(output);
        Ok(())
    }

    fn output(&self) -> StorageResult<Arc<Table>> {
        self.base.output()
    }
}
