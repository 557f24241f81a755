//! Drift detection between the warehouse definition and a live table
//!
//! Compares the table as the loader would create it against what the
//! warehouse file actually holds, e.g. after a manual migration or a file
//! written by an older build.

use salesdw_core::{
    Diagnostic, DiagnosticCode, Location, LogicalType, Severity, TableSchema,
};
use std::collections::HashSet;

/// Result of comparing the expected and live schema of one table
#[derive(Debug, Clone)]
pub struct DriftDetection {
    /// The table being checked
    pub table: String,

    /// Schema the loader creates
    pub expected: TableSchema,

    /// Schema found in the warehouse, `None` if the table is missing
    pub actual: Option<TableSchema>,

    /// Diagnostics produced by the comparison
    pub diagnostics: Vec<Diagnostic>,
}

impl DriftDetection {
    /// Compare a table definition with its live counterpart
    ///
    /// Detects:
    /// - Missing tables (error)
    /// - Dropped columns and type changes (error)
    /// - A different primary key (error)
    /// - Missing foreign keys (warning)
    /// - New columns (info)
    pub fn detect(expected: &TableSchema, actual: Option<&TableSchema>) -> Self {
        let table = expected.name.clone();
        let location = Location::new(table.clone());

        let Some(actual) = actual else {
            let diagnostic = Diagnostic::new(
                DiagnosticCode::DriftTableMissing,
                Severity::Error,
                format!("Table '{}' does not exist in the warehouse", table),
            )
            .with_location(location);

            return Self {
                table,
                expected: expected.clone(),
                actual: None,
                diagnostics: vec![diagnostic],
            };
        };

        let mut diagnostics = Vec::new();
        let mut seen_expected_cols = HashSet::new();

        for expected_col in &expected.columns {
            seen_expected_cols.insert(expected_col.name.as_str());

            match actual.find_column(&expected_col.name) {
                Some(actual_col) => {
                    if !types_match(expected_col.logical_type, actual_col.logical_type) {
                        diagnostics.push(
                            Diagnostic::new(
                                DiagnosticCode::DriftTypeChange,
                                Severity::Error,
                                format!(
                                    "Column '{}' type changed: was {}, now {}",
                                    expected_col.name,
                                    expected_col.logical_type,
                                    actual_col.logical_type
                                ),
                            )
                            .with_location(location.clone())
                            .with_comparison(
                                expected_col.logical_type.to_string(),
                                actual_col.logical_type.to_string(),
                            ),
                        );
                    }
                }
                None => {
                    let mut diagnostic = Diagnostic::new(
                        DiagnosticCode::DriftColumnDropped,
                        Severity::Error,
                        format!(
                            "Column '{}' is missing from warehouse table '{}' (expected type: {})",
                            expected_col.name, table, expected_col.logical_type
                        ),
                    )
                    .with_location(location.clone());
                    diagnostic.expected = Some(expected_col.name.clone());
                    diagnostics.push(diagnostic);
                }
            }
        }

        let expected_pk = expected.primary_key().map(|c| c.name.as_str());
        let actual_pk = actual.primary_key().map(|c| c.name.as_str());
        if expected_pk != actual_pk {
            diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::DriftPrimaryKeyChange,
                    Severity::Error,
                    format!("Primary key of '{}' changed", table),
                )
                .with_location(location.clone())
                .with_comparison(expected_pk.unwrap_or("none"), actual_pk.unwrap_or("none")),
            );
        }

        for fk in &expected.foreign_keys {
            if !actual.foreign_keys.contains(fk) {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticCode::DriftForeignKeyMissing,
                        Severity::Warn,
                        format!(
                            "Foreign key {}.{} -> {}.{} is not declared",
                            table, fk.column, fk.references_table, fk.references_column
                        ),
                    )
                    .with_location(location.clone()),
                );
            }
        }

        for actual_col in &actual.columns {
            if !seen_expected_cols.contains(actual_col.name.as_str()) {
                let mut diagnostic = Diagnostic::new(
                    DiagnosticCode::DriftColumnAdded,
                    Severity::Info,
                    format!(
                        "New column '{}' found in warehouse table (type: {})",
                        actual_col.name, actual_col.logical_type
                    ),
                )
                .with_location(location.clone());
                diagnostic.actual = Some(actual_col.name.clone());
                diagnostics.push(diagnostic);
            }
        }

        Self {
            table,
            expected: expected.clone(),
            actual: Some(actual.clone()),
            diagnostics,
        }
    }

    /// Check if there are any drift errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warn).count()
    }

    pub fn info_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Info).count()
    }
}

/// Exact type match; `Unknown` on either side matches anything
fn types_match(expected: LogicalType, actual: LogicalType) -> bool {
    match (expected, actual) {
        (LogicalType::Unknown, _) | (_, LogicalType::Unknown) => true,
        (expected, actual) => expected == actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salesdw_core::{Column, ForeignKey};

    fn create_test_schema() -> TableSchema {
        TableSchema::new(
            "sale",
            vec![
                Column::new("sale_id", LogicalType::Int).primary_key(),
                Column::new("customer_id", LogicalType::Int),
                Column::new("sale_amount", LogicalType::Float),
            ],
        )
        .with_foreign_key(ForeignKey::new("customer_id", "customer", "customer_id"))
    }

    #[test]
    fn test_no_drift() {
        let expected = create_test_schema();
        let actual = expected.clone();

        let drift = DriftDetection::detect(&expected, Some(&actual));

        assert_eq!(drift.diagnostics.len(), 0);
        assert!(!drift.has_errors());
        assert_eq!(drift.warning_count(), 0);
        assert_eq!(drift.info_count(), 0);
    }

    #[test]
    fn test_missing_table() {
        let expected = create_test_schema();
        let drift = DriftDetection::detect(&expected, None);

        assert_eq!(drift.error_count(), 1);
        assert_eq!(drift.diagnostics[0].code, DiagnosticCode::DriftTableMissing);
        assert!(drift.actual.is_none());
    }

    #[test]
    fn test_dropped_column() {
        let expected = create_test_schema();
        let mut actual = expected.clone();
        actual.columns.pop();

        let drift = DriftDetection::detect(&expected, Some(&actual));

        assert_eq!(drift.error_count(), 1);
        assert_eq!(drift.diagnostics[0].code, DiagnosticCode::DriftColumnDropped);
        assert!(drift.diagnostics[0].message.contains("sale_amount"));
    }

    #[test]
    fn test_type_change() {
        let expected = create_test_schema();
        let mut actual = expected.clone();
        actual.columns[2].logical_type = LogicalType::String;

        let drift = DriftDetection::detect(&expected, Some(&actual));

        assert_eq!(drift.error_count(), 1);
        assert_eq!(drift.diagnostics[0].code, DiagnosticCode::DriftTypeChange);
        assert_eq!(drift.diagnostics[0].expected.as_deref(), Some("FLOAT"));
        assert_eq!(drift.diagnostics[0].actual.as_deref(), Some("STRING"));
    }

    #[test]
    fn test_unknown_type_matches() {
        let expected = create_test_schema();
        let mut actual = expected.clone();
        actual.columns[2].logical_type = LogicalType::Unknown;

        assert!(!DriftDetection::detect(&expected, Some(&actual)).has_errors());
    }

    #[test]
    fn test_primary_key_change() {
        let expected = create_test_schema();
        let mut actual = expected.clone();
        actual.columns[0].primary_key = false;

        let drift = DriftDetection::detect(&expected, Some(&actual));

        assert_eq!(drift.error_count(), 1);
        assert_eq!(drift.diagnostics[0].code, DiagnosticCode::DriftPrimaryKeyChange);
        assert_eq!(drift.diagnostics[0].actual.as_deref(), Some("none"));
    }

    #[test]
    fn test_foreign_key_missing() {
        let expected = create_test_schema();
        let mut actual = expected.clone();
        actual.foreign_keys.clear();

        let drift = DriftDetection::detect(&expected, Some(&actual));

        assert_eq!(drift.warning_count(), 1);
        assert!(!drift.has_errors());
        assert_eq!(drift.diagnostics[0].code, DiagnosticCode::DriftForeignKeyMissing);
    }

    #[test]
    fn test_new_column() {
        let expected = create_test_schema();
        let mut actual = expected.clone();
        actual.columns.push(Column::new("loaded_at", LogicalType::String));

        let drift = DriftDetection::detect(&expected, Some(&actual));

        assert_eq!(drift.info_count(), 1);
        assert!(!drift.has_errors());
        assert_eq!(drift.diagnostics[0].code, DiagnosticCode::DriftColumnAdded);
        assert!(drift.diagnostics[0].message.contains("loaded_at"));
    }

    #[test]
    fn test_multiple_drifts() {
        let expected = create_test_schema();
        let actual = TableSchema::new(
            "sale",
            vec![
                Column::new("sale_id", LogicalType::String).primary_key(),
                Column::new("customer_id", LogicalType::Int),
                Column::new("extra", LogicalType::Int),
            ],
        );

        let drift = DriftDetection::detect(&expected, Some(&actual));

        assert_eq!(drift.error_count(), 2); // type change + dropped column
        assert_eq!(drift.warning_count(), 1); // foreign key
        assert_eq!(drift.info_count(), 1); // new column
    }
}
