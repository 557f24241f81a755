//! Post-load verification of an existing warehouse

use crate::drift_detector::DriftDetection;
use salesdw_core::{
    Diagnostic, DiagnosticCode, Entity, Location, Report, Severity, TableLoadStats,
    WarehouseSchema,
};
use salesdw_warehouse::{Warehouse, WarehouseError};

/// Check a warehouse against its definition
///
/// Runs drift detection on every table and checks that each business key
/// column is unique. Row counts go into the per-table statistics; tables that
/// are missing are reported once and otherwise skipped.
pub fn verify_warehouse(
    warehouse: &Warehouse,
    schema: &WarehouseSchema,
) -> Result<Report, WarehouseError> {
    let catalog = warehouse.catalog();
    let mut report = Report::new();

    for entity in Entity::LOAD_ORDER {
        let expected = schema.table(entity);
        let actual = catalog.fetch_schema(&expected.name)?;

        let drift = DriftDetection::detect(expected, actual.as_ref());
        tracing::debug!(
            table = %drift.table,
            errors = drift.error_count(),
            warnings = drift.warning_count(),
            info = drift.info_count(),
            "Checked table schema"
        );
        if drift.has_errors() {
            tracing::warn!(table = %drift.table, "Table has drifted from its definition");
        }
        for diagnostic in drift.diagnostics {
            report.add_diagnostic(diagnostic);
        }

        let Some(actual) = actual else {
            continue;
        };

        let key = entity.key_column();
        if actual.find_column(key).is_some() {
            let duplicates = catalog.duplicate_key_count(&expected.name, key)?;
            if duplicates > 0 {
                report.add_diagnostic(
                    Diagnostic::new(
                        DiagnosticCode::KeyNotUnique,
                        Severity::Error,
                        format!(
                            "{} {} values occur more than once in '{}'",
                            duplicates, key, expected.name
                        ),
                    )
                    .with_location(Location::new(expected.name.clone())),
                );
            }
        }

        report.add_table(TableLoadStats {
            table: expected.name.clone(),
            rows_in_table: catalog.row_count(&expected.name)?,
            ..TableLoadStats::default()
        });
    }

    report.metadata = Some(serde_json::json!({
        "warehouse": warehouse.path().display().to_string(),
    }));

    tracing::info!(
        errors = report.summary.errors,
        warnings = report.summary.warnings,
        "Warehouse check complete"
    );
    Ok(report)
}
