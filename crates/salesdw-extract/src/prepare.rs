//! Read → normalize → dedupe for one extract

use crate::dedupe::{dedupe, DedupStats};
use crate::error::ExtractError;
use crate::normalize::{normalize, NormalizedTable};
use crate::reader::Extract;
use regex::Regex;
use salesdw_core::{Entity, TableLoadStats, TableSchema};
use std::path::Path;

/// An extract ready for bulk insert
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTable {
    /// Normalized, deduplicated rows
    pub table: NormalizedTable,

    /// Deduplication counts
    pub stats: DedupStats,
}

impl PreparedTable {
    /// Read and shape the extract at `path` for `table`
    pub fn load(
        entity: Entity,
        path: &Path,
        table: &TableSchema,
        artifact_patterns: &[Regex],
    ) -> Result<Self, ExtractError> {
        let extract = Extract::read(entity, path)?;
        let normalized = normalize(extract, table, artifact_patterns)?;
        let (table, stats) = dedupe(normalized)?;

        tracing::info!(
            entity = %entity,
            rows_read = stats.rows_read,
            rows_retained = stats.rows_retained,
            duplicate_keys = stats.duplicate_keys,
            "Prepared extract"
        );

        Ok(Self { table, stats })
    }

    pub fn entity(&self) -> Entity {
        self.table.entity
    }

    /// Report entry for this table; `rows_in_table` is filled by the caller
    pub fn load_stats(&self) -> TableLoadStats {
        TableLoadStats {
            table: self.table.entity.table_name().to_string(),
            source_file: self.table.source.display().to_string(),
            source_sha256: self.table.source_sha256.clone(),
            rows_read: self.stats.rows_read,
            rows_retained: self.stats.rows_retained,
            duplicate_keys: self.stats.duplicate_keys,
            duplicate_rows: self.stats.duplicate_rows,
            artifact_columns_dropped: self.table.dropped_artifacts.clone(),
            rows_in_table: 0,
        }
    }
}
