//! [`Table`]: an ordered sequence of [`Chunk`]s with column metadata.

use std::sync::Arc;

use parking_lot::{MappedRwLockReadGuard, Mutex, RwLock, RwLockReadGuard};

use crate::chunk::Chunk;
use crate::config::StorageConfig;
use crate::error::{Error, StorageResult};
use crate::ids::{ChunkID, ChunkOffset, ColumnCount, ColumnID};
use crate::segment::{DictionarySegment, ValueSegment};
use crate::value::{Value, SUPPORTED_TYPE_TAGS};
use crate::with_column_type;

/// An ordered sequence of chunks sharing one schema.
///
/// Chunks live behind a single `RwLock` so that [`Table::compress_chunk`] can
/// swap one chunk in atomically while readers of any *other* chunk index are
/// unaffected; readers of the chunk being compressed see either the whole
/// pre-compression or whole post-compression chunk, never a partial one.
#[derive(Debug)]
pub struct Table {
    config: StorageConfig,
    column_names: Vec<String>,
    column_types: Vec<String>,
    chunks: RwLock<Vec<Chunk>>,
}

impl Table {
    /// Creates an empty table (no columns, one empty chunk) with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            column_names: Vec::new(),
            column_types: Vec::new(),
            chunks: RwLock::new(vec![Chunk::new()]),
        }
    }

    /// Assembles a table directly from its parts, bypassing the "empty table" discipline
    /// `add_column`/`append` enforce. Used by operators (e.g. `TableScan`) that build a
    /// fully-formed output table -- schema and chunks together -- in one shot.
    pub(crate) fn from_parts(
        config: StorageConfig,
        column_names: Vec<String>,
        column_types: Vec<String>,
        chunks: Vec<Chunk>,
    ) -> Self {
        Self {
            config,
            column_names,
            column_types,
            chunks: RwLock::new(chunks),
        }
    }

    /// Adds a column of the given name and type tag.
    ///
    /// Only allowed on an empty table (no rows in any chunk), so the
    /// column-count invariant only ever needs establishing once.
    pub fn add_column(&mut self, name: &str, type_tag: &str) -> StorageResult<()> {
        if self.row_count().get() != 0 {
            return Err(Error::AddColumnOnNonEmptyTable);
        }
        if !SUPPORTED_TYPE_TAGS.contains(&type_tag) {
            return Err(Error::UnknownColumnType(type_tag.to_string()));
        }

        self.column_names.push(name.to_string());
        self.column_types.push(type_tag.to_string());

        let segment: Box<dyn crate::segment::AnySegment> =
            with_column_type!(type_tag, |T| Ok(Box::new(ValueSegment::<T>::new())
                as Box<dyn crate::segment::AnySegment>))?;
        self.chunks.write().last_mut().expect("a table always has at least one chunk").add_segment(segment);

        log::debug!("table: added column '{name}' of type '{type_tag}'");
        Ok(())
    }

    /// Appends one row, given as one value per column in schema order.
    ///
    /// Starts a fresh chunk first if the current last chunk has reached
    /// [`StorageConfig::target_chunk_size`].
    pub fn append(&self, row: &[Value]) -> StorageResult<()> {
        if row.len() != self.column_names.len() {
            return Err(Error::RowArityMismatch {
                expected: self.column_names.len(),
                got: row.len(),
            });
        }

        let mut chunks = self.chunks.write();
        let needs_new_chunk = chunks
            .last()
            .map(|c| c.size() as u32 >= self.config.target_chunk_size.get())
            .unwrap_or(true);
        if needs_new_chunk {
            chunks.push(self.new_chunk()?);
        }
        let last = chunks.last_mut().expect("just ensured a chunk exists");
        last.append(row)?;

        if self.config.enable_sanity_checks {
            let sizes: Vec<usize> = last.segments().iter().map(|s| s.size()).collect();
            debug_assert!(
                sizes.iter().all(|&s| s == last.size()),
                "chunk segments diverged in size after append: {sizes:?}"
            );
        }
        Ok(())
    }

    fn new_chunk(&self) -> StorageResult<Chunk> {
        let mut chunk = Chunk::new();
        for type_tag in &self.column_types {
            let segment: Box<dyn crate::segment::AnySegment> =
                with_column_type!(type_tag.as_str(), |T| Ok(Box::new(ValueSegment::<T>::new())
                    as Box<dyn crate::segment::AnySegment>))?;
            chunk.add_segment(segment);
        }
        Ok(chunk)
    }

    pub fn column_count(&self) -> ColumnCount {
        ColumnCount::new(self.column_names.len() as u32)
    }

    /// `(chunk_count() - 1) * target_chunk_size + last_chunk.size()`, or `0` if there are no chunks.
    pub fn row_count(&self) -> ChunkOffset {
        let chunks = self.chunks.read();
        match chunks.len() {
            0 => ChunkOffset::new(0),
            n => {
                let full_chunks = (n as u32 - 1) * self.config.target_chunk_size.get();
                ChunkOffset::new(full_chunks + chunks.last().map(|c| c.size() as u32).unwrap_or(0))
            }
        }
    }

    pub fn chunk_count(&self) -> ChunkID {
        ChunkID::new(self.chunks.read().len() as u32)
    }

    pub fn target_chunk_size(&self) -> ChunkOffset {
        self.config.target_chunk_size
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_name(&self, column: ColumnID) -> StorageResult<&str> {
        self.column_names
            .get(column.index())
            .map(String::as_str)
            .ok_or(Error::ColumnIndexOutOfBounds(column))
    }

    pub fn column_type(&self, column: ColumnID) -> StorageResult<&str> {
        self.column_types
            .get(column.index())
            .map(String::as_str)
            .ok_or(Error::ColumnIndexOutOfBounds(column))
    }

    /// Linear lookup, matching the original's "debugging convenience, not a hot path" rationale.
    pub fn column_id_by_name(&self, name: &str) -> StorageResult<ColumnID> {
        self.column_names
            .iter()
            .position(|n| n == name)
            .map(|i| ColumnID::new(i as u32))
            .ok_or_else(|| Error::UnknownColumnName(name.to_string()))
    }

    pub fn chunk(&self, chunk_id: ChunkID) -> StorageResult<MappedRwLockReadGuard<'_, Chunk>> {
        let index = chunk_id.index();
        if index >= self.chunks.read().len() {
            return Err(Error::ChunkNotFound(chunk_id));
        }
        Ok(RwLockReadGuard::map(self.chunks.read(), |chunks| &chunks[index]))
    }

    pub fn chunks(&self) -> RwLockReadGuard<'_, Vec<Chunk>> {
        self.chunks.read()
    }

    /// Replaces the chunk at `chunk_id` with one whose segments are dictionary-encoded
    /// copies of the originals, built one column at a time in parallel.
    ///
    /// Undefined if the chunk already contains reference segments (only
    /// specified on freshly built value chunks).
    pub fn compress_chunk(&self, chunk_id: ChunkID) -> StorageResult<()> {
        let column_types = self.column_types.clone();
        let built: Vec<Mutex<Option<StorageResult<Box<dyn crate::segment::AnySegment>>>>> =
            (0..column_types.len()).map(|_| Mutex::new(None)).collect();

        {
            let chunks = self.chunks.read();
            let input_chunk = chunks
                .get(chunk_id.index())
                .ok_or(Error::ChunkNotFound(chunk_id))?;

            rayon::scope(|s| {
                for (index, type_tag) in column_types.iter().enumerate() {
                    let segment = input_chunk.segment(ColumnID::new(index as u32));
                    let slot = &built[index];
                    s.spawn(move |_| {
                        let result = segment.and_then(|segment| {
                            with_column_type!(type_tag.as_str(), |T| {
                                let source = crate::segment::downcast::<ValueSegment<T>>(
                                    segment,
                                    ColumnID::new(index as u32),
                                )?;
                                let dictionary = DictionarySegment::<T>::build(source)?;
                                Ok(Box::new(dictionary) as Box<dyn crate::segment::AnySegment>)
                            })
                        });
                        *slot.lock() = Some(result);
                    });
                }
            });
        }

        let mut compressed = Chunk::new();
        for slot in built {
            let segment = slot
                .into_inner()
                .expect("every column spawns exactly one compression task")?;
            compressed.add_segment(segment);
        }

        self.chunks.write()[chunk_id.index()] = compressed;
        log::debug!("table: compressed chunk {chunk_id}");
        Ok(())
    }
}

/// A table wrapped for shared ownership, the form reference segments and the
/// storage registry hold it in.
pub type TableRef = Arc<Table>;

#[cfg(test)]
mod tests {
    use super::*;

    fn int_pair_table() -> Table {
        let mut table = Table::new(StorageConfig::default());
        table.add_column("x", "int").unwrap();
        table.add_column("y", "int").unwrap();
        table
    }

    #[test]
    fn add_column_after_rows_exist_fails() {
        let mut table = int_pair_table();
        table.append(&[Value::Int(1), Value::Int(2)]).unwrap();
        assert!(table.add_column("z", "int").is_err());
    }

    #[test]
    fn append_enforces_row_arity() {
        let table = int_pair_table();
        assert!(matches!(
            table.append(&[Value::Int(1)]),
            Err(Error::RowArityMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn append_rolls_into_a_new_chunk_once_target_size_is_reached() {
        let mut table = Table::new(StorageConfig::new(2));
        table.add_column("x", "int").unwrap();
        for i in 0..5 {
            table.append(&[Value::Int(i)]).unwrap();
        }
        assert_eq!(table.chunk_count().get(), 3);
        assert_eq!(table.row_count().get(), 5);
    }

    #[test]
    fn compress_chunk_preserves_values_and_row_count() {
        let mut table = Table::new(StorageConfig::default());
        table.add_column("name", "string").unwrap();
        for name in ["Bill", "Steve", "Alexander", "Steve"] {
            table.append(&[Value::String(name.to_string())]).unwrap();
        }
        table.compress_chunk(ChunkID::new(0)).unwrap();

        let chunk = table.chunk(ChunkID::new(0)).unwrap();
        assert_eq!(chunk.size(), 4);
        assert_eq!(
            chunk.value_at(ColumnID::new(0), ChunkOffset::new(1)).unwrap(),
            Value::String("Steve".into())
        );
    }

    #[test]
    fn column_id_by_name_round_trips() {
        let table = int_pair_table();
        assert_eq!(table.column_id_by_name("y").unwrap().get(), 1);
        assert!(table.column_id_by_name("z").is_err());
    }
}
