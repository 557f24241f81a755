//! Business-key deduplication (first occurrence wins)

use crate::cell;
use crate::error::{ExtractError, FormatIssue};
use crate::normalize::NormalizedTable;
use std::collections::HashMap;

/// Counts reported for one table's deduplication pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DedupStats {
    /// Rows before deduplication
    pub rows_read: usize,

    /// Rows kept
    pub rows_retained: usize,

    /// Distinct keys seen more than once
    pub duplicate_keys: usize,

    /// Later occurrences dropped
    pub duplicate_rows: usize,
}

impl DedupStats {
    pub fn has_duplicates(&self) -> bool {
        self.duplicate_rows > 0
    }
}

/// Keep the first row for each business key and drop the rest
///
/// Keys must be integers; an empty or non-integer key is a format error
/// naming the offending line.
pub fn dedupe(mut table: NormalizedTable) -> Result<(NormalizedTable, DedupStats), ExtractError> {
    let key_column = table.entity.key_column();
    let key_index = table.column_index(key_column).ok_or_else(|| {
        ExtractError::format(
            table.entity,
            &table.source,
            FormatIssue::MissingColumns(vec![key_column.to_string()]),
        )
    })?;

    let rows_read = table.rows.len();
    let mut occurrences: HashMap<i64, usize> = HashMap::with_capacity(rows_read);
    let mut retained = Vec::with_capacity(rows_read);

    for row in std::mem::take(&mut table.rows) {
        let raw = &row.values[key_index];
        let key = cell::parse_int(raw).ok_or_else(|| {
            ExtractError::format(
                table.entity,
                &table.source,
                FormatIssue::InvalidKey {
                    line: row.line,
                    column: key_column.to_string(),
                    value: raw.clone(),
                },
            )
        })?;

        let count = occurrences.entry(key).or_insert(0);
        *count += 1;
        if *count == 1 {
            retained.push(row);
        }
    }

    let stats = DedupStats {
        rows_read,
        rows_retained: retained.len(),
        duplicate_keys: occurrences.values().filter(|&&n| n > 1).count(),
        duplicate_rows: rows_read - retained.len(),
    };

    if stats.has_duplicates() {
        tracing::warn!(
            entity = %table.entity,
            duplicate_keys = stats.duplicate_keys,
            duplicate_rows = stats.duplicate_rows,
            "Dropped duplicate business keys"
        );
    }

    table.rows = retained;
    Ok((table, stats))
}
