//! Per-table storage configuration.

use crate::ids::ChunkOffset;

/// The default number of rows a non-terminal chunk holds before a new one
/// is started. Mirrors the original teaching implementation's compiled-in
/// default, made an explicit, per-table setting here instead.
pub const DEFAULT_TARGET_CHUNK_SIZE: u32 = 100_000;

/// Knobs that govern one [`crate::table::Table`]'s storage behavior.
#[derive(Debug, Clone, Copy)]
pub struct StorageConfig {
    /// Maximum row count of any chunk but the last.
    pub target_chunk_size: ChunkOffset,
    /// Enables extra `debug_assert!`-guarded invariant checks (chunk size
    /// uniformity, append arity) that are compiled out in release builds.
    /// The logical invariants still hold either way; this only controls
    /// whether we pay to double-check them.
    pub enable_sanity_checks: bool,
}

impl StorageConfig {
    pub fn new(target_chunk_size: u32) -> Self {
        Self {
            target_chunk_size: ChunkOffset::new(target_chunk_size),
            enable_sanity_checks: cfg!(debug_assertions),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_CHUNK_SIZE)
    }
}
