//! Report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use serde::{Deserialize, Serialize};
use crate::diagnostic::{Diagnostic, Severity};

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Per-table figures for one load or check
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableLoadStats {
    /// Warehouse table name
    pub table: String,

    /// Extract file the rows came from (empty for `check`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_file: String,

    /// SHA-256 of the extract file contents
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_sha256: String,

    /// Data rows read from the extract
    pub rows_read: usize,

    /// Rows left after deduplication
    pub rows_retained: usize,

    /// Distinct business keys that appeared more than once
    pub duplicate_keys: usize,

    /// Rows dropped as later occurrences of a key
    pub duplicate_rows: usize,

    /// Artifact columns removed during normalization
    #[serde(default)]
    pub artifact_columns_dropped: Vec<String>,

    /// Rows present in the warehouse table
    pub rows_in_table: usize,
}

/// Summary statistics for a report
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of diagnostics
    pub total: usize,

    /// Number of errors
    pub errors: usize,

    /// Number of warnings
    pub warnings: usize,

    /// Number of info messages
    pub info: usize,

    /// Number of tables covered
    pub tables: usize,

    /// Rows across all tables
    pub rows: usize,
}

/// Load/check report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Per-table statistics, in load order
    #[serde(default)]
    pub tables: Vec<TableLoadStats>,

    /// All diagnostics
    pub diagnostics: Vec<Diagnostic>,

    /// Metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Report {
    /// Create a new empty report
    pub fn new() -> Self {
        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary: ReportSummary::default(),
            tables: Vec::new(),
            diagnostics: Vec::new(),
            metadata: None,
        }
    }

    /// Create a report from diagnostics
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let mut report = Self::new();
        for diagnostic in diagnostics {
            report.add_diagnostic(diagnostic);
        }
        report
    }

    /// Add a diagnostic to the report
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.summary.errors += 1,
            Severity::Warn => self.summary.warnings += 1,
            Severity::Info => self.summary.info += 1,
        }

        self.summary.total += 1;
        self.diagnostics.push(diagnostic);
    }

    /// Add per-table statistics
    pub fn add_table(&mut self, stats: TableLoadStats) {
        self.summary.tables += 1;
        self.summary.rows += stats.rows_in_table;
        self.tables.push(stats);
    }

    /// Statistics for a table by name
    pub fn table(&self, name: &str) -> Option<&TableLoadStats> {
        self.tables.iter().find(|t| t.table == name)
    }

    /// Check if the report has any errors
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCode;

    #[test]
    fn empty_report() {
        let report = Report::new();
        assert_eq!(report.version, ReportVersion::CURRENT);
        assert_eq!(report.summary.total, 0);
        assert!(!report.has_errors());
    }

    #[test]
    fn report_with_diagnostics() {
        let diagnostics = vec![
            Diagnostic::new(DiagnosticCode::DriftTableMissing, Severity::Error, "Table 'sale' is missing"),
            Diagnostic::new(DiagnosticCode::Info, Severity::Info, "All good"),
        ];

        let report = Report::from_diagnostics(diagnostics);
        assert_eq!(report.summary.total, 2);
        assert_eq!(report.summary.errors, 1);
        assert_eq!(report.summary.info, 1);
        assert!(report.has_errors());
    }

    #[test]
    fn table_stats_roll_up() {
        let mut report = Report::new();
        report.add_table(TableLoadStats {
            table: "customer".to_string(),
            rows_read: 3,
            rows_retained: 2,
            duplicate_keys: 1,
            duplicate_rows: 1,
            rows_in_table: 2,
            ..Default::default()
        });
        report.add_table(TableLoadStats {
            table: "product".to_string(),
            rows_in_table: 5,
            ..Default::default()
        });

        assert_eq!(report.summary.tables, 2);
        assert_eq!(report.summary.rows, 7);
        assert_eq!(report.table("customer").unwrap().duplicate_rows, 1);
    }

    #[test]
    fn report_saves_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        Report::new().save_to_file(&path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"diagnostics\""));
        assert!(!json.contains("\"metadata\""));
    }
}
