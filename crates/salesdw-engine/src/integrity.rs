//! Referential check between sales and their dimensions
//!
//! SQLite foreign-key enforcement stays off during the load, so this is the
//! only place orphaned sales are noticed. A NULL reference is not an orphan,
//! and a value that is not an integer is left for the insert to reject.

use salesdw_core::{Diagnostic, DiagnosticCode, Entity, Location, Severity};
use salesdw_extract::{cell, NormalizedTable};
use std::collections::HashSet;

/// How many example keys a diagnostic quotes
const SAMPLE_SIZE: usize = 5;

/// A sale pointing at a customer or product absent from the load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanReference {
    /// Business key of the sale
    pub sale_id: i64,

    /// Extract line of the sale
    pub line: u64,

    /// Dimension the reference should resolve in
    pub references: Entity,

    /// The unresolved key
    pub missing_key: i64,
}

fn key_set(table: &NormalizedTable) -> HashSet<i64> {
    table
        .column_values(table.entity.key_column())
        .filter_map(|(_, raw)| cell::parse_int(raw))
        .collect()
}

/// Find every sale whose customer or product is not among the loaded rows
pub fn find_orphans(
    sales: &NormalizedTable,
    customers: &NormalizedTable,
    products: &NormalizedTable,
) -> Vec<OrphanReference> {
    let sale_index = sales.column_index(Entity::Sale.key_column());
    let mut orphans = Vec::new();

    for dimension in [customers, products] {
        let keys = key_set(dimension);
        let references = dimension.entity;

        for (row, raw) in sales.column_values(references.key_column()) {
            if cell::is_null_number(raw) {
                continue;
            }
            let Some(missing_key) = cell::parse_int(raw).filter(|k| !keys.contains(k)) else {
                continue;
            };
            let sale_id = sale_index
                .and_then(|i| cell::parse_int(&row.values[i]))
                .unwrap_or_default();

            orphans.push(OrphanReference {
                sale_id,
                line: row.line,
                references,
                missing_key,
            });
        }
    }

    orphans.sort_by_key(|o| (o.line, o.references));
    orphans
}

/// Summarize orphans as one diagnostic per referenced dimension
pub fn orphan_diagnostics(
    orphans: &[OrphanReference],
    sales: &NormalizedTable,
    severity: Severity,
) -> Vec<Diagnostic> {
    let file = sales.source.display().to_string();

    [Entity::Customer, Entity::Product]
        .into_iter()
        .filter_map(|references| {
            let matching: Vec<&OrphanReference> =
                orphans.iter().filter(|o| o.references == references).collect();
            let first = matching.first()?;

            let mut sample: Vec<String> = Vec::new();
            for orphan in &matching {
                let key = orphan.missing_key.to_string();
                if !sample.contains(&key) {
                    sample.push(key);
                }
                if sample.len() == SAMPLE_SIZE {
                    break;
                }
            }

            let message = format!(
                "{} sale rows reference {} values absent from '{}' (e.g. {})",
                matching.len(),
                references.key_column(),
                references.table_name(),
                sample.join(", "),
            );

            Some(
                Diagnostic::new(DiagnosticCode::LoadOrphanReference, severity, message)
                    .with_location(Location::with_line(file.clone(), first.line)),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use salesdw_extract::SourceRow;
    use std::path::PathBuf;

    fn table(entity: Entity, columns: &[&str], rows: Vec<Vec<&str>>) -> NormalizedTable {
        NormalizedTable {
            entity,
            source: PathBuf::from(format!("{}.csv", entity)),
            source_sha256: String::new(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(i, values)| {
                    SourceRow::new(i as u64 + 2, values.into_iter().map(str::to_string).collect())
                })
                .collect(),
            dropped_artifacts: Vec::new(),
        }
    }

    fn dimensions() -> (NormalizedTable, NormalizedTable) {
        (
            table(Entity::Customer, &["customer_id"], vec![vec!["1"], vec!["2"]]),
            table(Entity::Product, &["product_id"], vec![vec!["10"]]),
        )
    }

    #[test]
    fn resolved_sales_have_no_orphans() {
        let (customers, products) = dimensions();
        let sales = table(
            Entity::Sale,
            &["sale_id", "customer_id", "product_id"],
            vec![vec!["100", "1", "10"], vec!["101", "2.0", "10"]],
        );

        assert!(find_orphans(&sales, &customers, &products).is_empty());
    }

    #[test]
    fn missing_dimension_rows_are_orphans() {
        let (customers, products) = dimensions();
        let sales = table(
            Entity::Sale,
            &["sale_id", "customer_id", "product_id"],
            vec![
                vec!["100", "1", "10"],
                vec!["101", "99", "10"],
                vec!["102", "2", "11"],
            ],
        );

        let orphans = find_orphans(&sales, &customers, &products);
        assert_eq!(
            orphans,
            vec![
                OrphanReference { sale_id: 101, line: 3, references: Entity::Customer, missing_key: 99 },
                OrphanReference { sale_id: 102, line: 4, references: Entity::Product, missing_key: 11 },
            ]
        );
    }

    #[test]
    fn null_and_unparsable_references_are_skipped() {
        let (customers, products) = dimensions();
        let sales = table(
            Entity::Sale,
            &["sale_id", "customer_id", "product_id"],
            vec![vec!["100", "", "10"], vec!["101", "abc", "NaN"]],
        );

        assert!(find_orphans(&sales, &customers, &products).is_empty());
    }

    #[test]
    fn diagnostics_group_by_dimension() {
        let (customers, products) = dimensions();
        let sales = table(
            Entity::Sale,
            &["sale_id", "customer_id", "product_id"],
            vec![
                vec!["100", "99", "10"],
                vec!["101", "99", "10"],
                vec!["102", "98", "10"],
            ],
        );

        let orphans = find_orphans(&sales, &customers, &products);
        let diagnostics = orphan_diagnostics(&orphans, &sales, Severity::Warn);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::LoadOrphanReference);
        assert_eq!(
            diagnostics[0].message,
            "3 sale rows reference customer_id values absent from 'customer' (e.g. 99, 98)"
        );
        assert_eq!(diagnostics[0].location.as_ref().unwrap().line, Some(2));
    }
}
