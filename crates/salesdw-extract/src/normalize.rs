//! Normalization: artifact removal, renaming and column re-ordering

use crate::error::{ExtractError, FormatIssue};
use crate::mapping::ColumnMapping;
use crate::reader::{Extract, SourceRow};
use regex::Regex;
use salesdw_core::{Entity, TableSchema};
use std::path::PathBuf;

/// An extract reshaped to a warehouse table's canonical columns
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    /// Entity this table feeds
    pub entity: Entity,

    /// Extract the rows came from
    pub source: PathBuf,

    /// Hex SHA-256 of the extract
    pub source_sha256: String,

    /// Canonical column names, in table order
    pub columns: Vec<String>,

    /// Rows with values aligned to `columns`
    pub rows: Vec<SourceRow>,

    /// Source columns dropped as export artifacts
    pub dropped_artifacts: Vec<String>,
}

impl NormalizedTable {
    /// Position of a canonical column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate the raw values of one column
    pub fn column_values<'a>(&'a self, name: &str) -> impl Iterator<Item = (&'a SourceRow, &'a str)> + 'a {
        let index = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |row| index.map(|i| (row, row.values[i].as_str())))
    }
}

/// Reshape an extract to the table definition
///
/// Artifact columns are dropped, source names are renamed through the
/// entity's fixed mapping and columns are re-ordered to match `table`.
/// Every table column is required; a column that is neither mapped,
/// canonical nor an artifact is rejected.
pub fn normalize(
    extract: Extract,
    table: &TableSchema,
    artifact_patterns: &[Regex],
) -> Result<NormalizedTable, ExtractError> {
    let entity = extract.entity;
    let mapping = ColumnMapping::for_entity(entity);

    // table column index -> source column index
    let mut source_index: Vec<Option<usize>> = vec![None; table.columns.len()];
    let mut dropped_artifacts = Vec::new();
    let mut unexpected = Vec::new();

    for (i, header) in extract.headers.iter().enumerate() {
        if artifact_patterns.iter().any(|p| p.is_match(header)) {
            dropped_artifacts.push(header.clone());
            continue;
        }

        let canonical = mapping.rename(header);
        match table.column_index(canonical) {
            Some(target) if source_index[target].is_some() => {
                return Err(ExtractError::format(
                    entity,
                    &extract.path,
                    FormatIssue::DuplicateColumn(canonical.to_string()),
                ));
            }
            Some(target) => source_index[target] = Some(i),
            None => unexpected.push(header.clone()),
        }
    }

    let missing: Vec<String> = table
        .columns
        .iter()
        .zip(&source_index)
        .filter(|(_, index)| index.is_none())
        .map(|(column, _)| match mapping.source_name(&column.name) {
            Some(source) => source.to_string(),
            None => column.name.clone(),
        })
        .collect();

    if !missing.is_empty() {
        return Err(ExtractError::format(entity, &extract.path, FormatIssue::MissingColumns(missing)));
    }

    if !unexpected.is_empty() {
        return Err(ExtractError::format(entity, &extract.path, FormatIssue::UnexpectedColumns(unexpected)));
    }

    if !dropped_artifacts.is_empty() {
        tracing::warn!(
            entity = %entity,
            columns = ?dropped_artifacts,
            "Dropped artifact columns"
        );
    }

    let indices: Vec<usize> = source_index.into_iter().flatten().collect();
    let rows = extract
        .rows
        .into_iter()
        .map(|mut row| {
            let values = indices
                .iter()
                .map(|&i| std::mem::take(&mut row.values[i]))
                .collect();
            SourceRow::new(row.line, values)
        })
        .collect();

    Ok(NormalizedTable {
        entity,
        source: extract.path,
        source_sha256: extract.sha256,
        columns: table.column_names().into_iter().map(str::to_string).collect(),
        rows,
        dropped_artifacts,
    })
}
