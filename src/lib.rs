//! A columnar, chunk-based in-memory analytical table engine.
//!
//! Tables are stored as a sequence of fixed-width [`chunk::Chunk`]s, each
//! holding one [`segment::AnySegment`] per column, stored either as raw
//! values ([`segment::ValueSegment`]), a sorted dictionary plus packed codes
//! ([`segment::DictionarySegment`]), or an indirection into another table
//! ([`segment::ReferenceSegment`]). [`scan::TableScan`] is the one query
//! operator built on top of this storage: it evaluates a comparison
//! predicate against one column and produces a table of reference segments.

pub mod attribute_vector;
pub mod chunk;
pub mod config;
pub mod error;
pub mod ids;
pub mod operator;
pub mod registry;
pub mod scan;
pub mod segment;
pub mod table;
pub mod value;

pub use config::StorageConfig;
pub use error::{Error, StorageResult};
pub use ids::{ChunkID, ChunkOffset, ColumnCount, ColumnID, RowID, ValueID, INVALID_VALUE_ID};
pub use operator::{Operator, OperatorBase};
pub use registry::{StorageManager, STORAGE_MANAGER};
pub use scan::{Comparison, TableScan};
pub use table::Table;
pub use value::Value;
