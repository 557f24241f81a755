//! Reading CSV extracts into memory

use crate::error::{ExtractError, FormatIssue};
use salesdw_core::Entity;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One data row with the line it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    /// 1-indexed line number in the extract (header is line 1)
    pub line: u64,

    /// Raw cell values, positionally aligned with the owning headers
    pub values: Vec<String>,
}

impl SourceRow {
    pub fn new(line: u64, values: Vec<String>) -> Self {
        Self { line, values }
    }
}

/// A tabular extract as read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extract {
    /// Entity this extract feeds
    pub entity: Entity,

    /// Where it was read from
    pub path: PathBuf,

    /// Hex SHA-256 of the file contents
    pub sha256: String,

    /// Header names as written by the upstream export
    pub headers: Vec<String>,

    /// Data rows
    pub rows: Vec<SourceRow>,
}

impl Extract {
    /// Read an extract file
    ///
    /// A missing file is `SourceNotFound`; any other I/O or CSV failure is
    /// `SourceFormat`.
    pub fn read(entity: Entity, path: &Path) -> Result<Self, ExtractError> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExtractError::SourceNotFound {
                    entity,
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                return Err(ExtractError::format(entity, path, FormatIssue::Unreadable(e.to_string())));
            }
        };

        let extract = Self::from_bytes(entity, path, &bytes)?;

        tracing::debug!(
            entity = %entity,
            path = %path.display(),
            rows = extract.rows.len(),
            columns = extract.headers.len(),
            "Read extract"
        );

        Ok(extract)
    }

    /// Parse extract contents already in memory
    pub fn from_bytes(entity: Entity, path: &Path, bytes: &[u8]) -> Result<Self, ExtractError> {
        let sha256 = hex::encode(Sha256::digest(bytes));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| ExtractError::format(entity, path, FormatIssue::Csv(e.to_string())))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut seen = HashSet::new();
        for header in &headers {
            // Blank headers are export artifacts and may legitimately repeat
            if !header.is_empty() && !seen.insert(header.as_str()) {
                return Err(ExtractError::format(
                    entity,
                    path,
                    FormatIssue::DuplicateColumn(header.clone()),
                ));
            }
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record
                .map_err(|e| ExtractError::format(entity, path, FormatIssue::Csv(e.to_string())))?;

            let line = record.position().map(|p| p.line()).unwrap_or_default();
            rows.push(SourceRow::new(line, record.iter().map(str::to_string).collect()));
        }

        Ok(Self {
            entity,
            path: path.to_path_buf(),
            sha256,
            headers,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_headers_and_rows() {
        let csv = "CustomerID,Name\n1,Alice\n2,Bob\n";
        let extract = Extract::from_bytes(Entity::Customer, Path::new("c.csv"), csv.as_bytes()).unwrap();

        assert_eq!(extract.headers, vec!["CustomerID", "Name"]);
        assert_eq!(extract.rows.len(), 2);
        assert_eq!(extract.rows[0], SourceRow::new(2, vec!["1".into(), "Alice".into()]));
        assert_eq!(extract.rows[1].line, 3);
        assert_eq!(extract.sha256.len(), 64);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = Extract::read(Entity::Product, &dir.path().join("nope.csv")).unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.entity(), Entity::Product);
    }

    #[test]
    fn ragged_row_is_format_error() {
        let csv = "CustomerID,Name\n1,Alice,extra\n";
        let err = Extract::from_bytes(Entity::Customer, Path::new("c.csv"), csv.as_bytes()).unwrap_err();

        assert!(matches!(
            err,
            ExtractError::SourceFormat { issue: FormatIssue::Csv(_), .. }
        ));
    }

    #[test]
    fn duplicate_header_rejected() {
        let csv = "CustomerID,CustomerID\n1,1\n";
        let err = Extract::from_bytes(Entity::Customer, Path::new("c.csv"), csv.as_bytes()).unwrap_err();

        match err {
            ExtractError::SourceFormat { issue, .. } => {
                assert_eq!(issue, FormatIssue::DuplicateColumn("CustomerID".into()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn byte_order_mark_stripped() {
        let csv = "\u{feff}CustomerID,Name\n1,A\n";
        let extract = Extract::from_bytes(Entity::Customer, Path::new("c.csv"), csv.as_bytes()).unwrap();
        assert_eq!(extract.headers[0], "CustomerID");
    }
}
