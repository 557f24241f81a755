//! Diagnostic codes and error reporting
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the report format.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Load observations (1xxx)
    /// Duplicate business keys were dropped from an extract
    LoadDuplicateKeys,

    /// Index/artifact columns were dropped from an extract
    LoadArtifactColumnDropped,

    /// A sale references a customer or product absent from the load
    LoadOrphanReference,

    // Drift detection (2xxx)
    /// Warehouse table is missing entirely
    DriftTableMissing,

    /// Warehouse table schema has changed (column dropped)
    DriftColumnDropped,

    /// Warehouse table schema has changed (type changed)
    DriftTypeChange,

    /// Warehouse table schema has changed (new column added)
    DriftColumnAdded,

    /// Primary key column differs from the definition
    DriftPrimaryKeyChange,

    /// A declared foreign key is missing
    DriftForeignKeyMissing,

    // Consumer contract (3xxx)
    /// Business key column holds duplicate values
    KeyNotUnique,

    // General (9xxx)
    /// General informational message
    Info,

    /// General warning message
    Warning,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadDuplicateKeys => "LOAD_DUPLICATE_KEYS",
            Self::LoadArtifactColumnDropped => "LOAD_ARTIFACT_COLUMN_DROPPED",
            Self::LoadOrphanReference => "LOAD_ORPHAN_REFERENCE",
            Self::DriftTableMissing => "DRIFT_TABLE_MISSING",
            Self::DriftColumnDropped => "DRIFT_COLUMN_DROPPED",
            Self::DriftTypeChange => "DRIFT_TYPE_CHANGE",
            Self::DriftColumnAdded => "DRIFT_COLUMN_ADDED",
            Self::DriftPrimaryKeyChange => "DRIFT_PRIMARY_KEY_CHANGE",
            Self::DriftForeignKeyMissing => "DRIFT_FOREIGN_KEY_MISSING",
            Self::KeyNotUnique => "KEY_NOT_UNIQUE",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - should be reviewed but not blocking
    Warn,

    /// Error - the warehouse does not meet its contract
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where a diagnostic points: an extract file or a warehouse table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path or table name
    pub file: String,

    /// Optional line number (1-indexed, header is line 1)
    pub line: Option<u64>,
}

impl Location {
    /// Create a new location with just a file path
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
        }
    }

    /// Create a location with file and line number
    pub fn with_line(file: impl Into<String>, line: u64) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
        }
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Source location (best-effort)
    pub location: Option<Location>,

    /// Expected value (for comparison diagnostics)
    pub expected: Option<String>,

    /// Actual value (for comparison diagnostics)
    pub actual: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
            expected: None,
            actual: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Set expected/actual values
    pub fn with_comparison(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self.actual = Some(actual.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_code_stability() {
        assert_eq!(DiagnosticCode::LoadDuplicateKeys.as_str(), "LOAD_DUPLICATE_KEYS");
        assert_eq!(DiagnosticCode::DriftTypeChange.as_str(), "DRIFT_TYPE_CHANGE");
        assert_eq!(DiagnosticCode::KeyNotUnique.to_string(), "KEY_NOT_UNIQUE");
    }

    #[test]
    fn diagnostic_serialization() {
        let diag = Diagnostic::new(
            DiagnosticCode::LoadOrphanReference,
            Severity::Warn,
            "Sale 7 references missing customer 99",
        )
        .with_location(Location::with_line("sales_data_prepared.csv", 8));

        let json = serde_json::to_string(&diag).unwrap();
        assert!(json.contains("LOAD_ORPHAN_REFERENCE"));
        assert!(json.contains("\"warn\""));
    }
}
