//! Schema reset: drop and recreate the warehouse tables
//!
//! WARNING: [`reset_schema`] irrecoverably destroys every row in the
//! warehouse tables. Each load is a full refresh; nothing survives from the
//! previous run except through the enclosing transaction's rollback.

use crate::error::SchemaError;
use rusqlite::Connection;
use salesdw_core::{Nullability, TableSchema, WarehouseSchema};

/// Quote an SQL identifier
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Render the CREATE TABLE statement for one table
pub fn create_table_sql(table: &TableSchema) -> String {
    let mut lines: Vec<String> = table
        .columns
        .iter()
        .map(|column| {
            let mut line = format!("    {} {}", quote_ident(&column.name), column.logical_type.sql_type());
            if column.primary_key {
                line.push_str(" PRIMARY KEY");
            } else if column.nullable == Nullability::No {
                line.push_str(" NOT NULL");
            }
            line
        })
        .collect();

    for fk in &table.foreign_keys {
        lines.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {} ({})",
            quote_ident(&fk.column),
            quote_ident(&fk.references_table),
            quote_ident(&fk.references_column),
        ));
    }

    format!("CREATE TABLE {} (\n{}\n)", quote_ident(&table.name), lines.join(",\n"))
}

/// Tables in the order they must be dropped: those declaring foreign keys
/// first, then the rest in declaration order
pub fn drop_order(schema: &WarehouseSchema) -> Vec<&TableSchema> {
    let (dependents, others): (Vec<&TableSchema>, Vec<&TableSchema>) = schema
        .tables()
        .into_iter()
        .partition(|t| !t.foreign_keys.is_empty());

    dependents.into_iter().chain(others).collect()
}

/// Drop every warehouse table if present, then create them from `schema`
///
/// Destroys all existing warehouse data. Runs on whatever transaction state
/// `conn` is in; pass a `Transaction` to make the reset part of the load.
pub fn reset_schema(conn: &Connection, schema: &WarehouseSchema) -> Result<(), SchemaError> {
    for table in drop_order(schema) {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(&table.name)))
            .map_err(|source| SchemaError::Drop {
                table: table.name.clone(),
                source,
            })?;
    }

    let tables = schema.tables();
    for table in tables {
        conn.execute_batch(&create_table_sql(table))
            .map_err(|source| SchemaError::Create {
                table: table.name.clone(),
                source,
            })?;
    }

    tracing::info!(tables = tables.len(), "Warehouse schema reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Warehouse;
    use pretty_assertions::assert_eq;
    use salesdw_core::{Column, Entity, LogicalType};

    #[test]
    fn create_sql_for_sale() {
        let schema = WarehouseSchema::standard();
        let sql = create_table_sql(schema.table(Entity::Sale));

        assert!(sql.starts_with("CREATE TABLE \"sale\" ("));
        assert!(sql.contains("\"sale_id\" INTEGER PRIMARY KEY"));
        assert!(sql.contains("\"sale_amount\" REAL"));
        assert!(sql.contains("FOREIGN KEY (\"customer_id\") REFERENCES \"customer\" (\"customer_id\")"));
        assert!(sql.contains("FOREIGN KEY (\"product_id\") REFERENCES \"product\" (\"product_id\")"));
    }

    #[test]
    fn not_null_rendered() {
        let table = TableSchema::new(
            "t",
            vec![Column::new("x", LogicalType::String).with_nullability(Nullability::No)],
        );
        assert!(create_table_sql(&table).contains("\"x\" TEXT NOT NULL"));
    }

    #[test]
    fn dependents_dropped_first() {
        let schema = WarehouseSchema::standard();
        let order: Vec<&str> = drop_order(&schema).iter().map(|t| t.name.as_str()).collect();
        let expected: Vec<&str> = Entity::DROP_ORDER.iter().map(|e| e.table_name()).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn reset_discards_existing_rows() {
        let warehouse = Warehouse::in_memory().unwrap();
        let conn = warehouse.connection();
        let schema = WarehouseSchema::standard();

        reset_schema(conn, &schema).unwrap();
        conn.execute("INSERT INTO customer (customer_id, name) VALUES (1, 'A')", [])
            .unwrap();

        reset_schema(conn, &schema).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM customer", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn reset_replaces_stale_schema() {
        let warehouse = Warehouse::in_memory().unwrap();
        let conn = warehouse.connection();
        conn.execute_batch("CREATE TABLE sale (sale_id INTEGER, legacy TEXT)").unwrap();

        reset_schema(conn, &WarehouseSchema::standard()).unwrap();

        let actual = warehouse.catalog().fetch_schema("sale").unwrap().unwrap();
        assert!(actual.find_column("legacy").is_none());
        assert_eq!(actual.columns.len(), 9);
    }

    #[test]
    fn rejected_ddl_is_schema_error() {
        let warehouse = Warehouse::in_memory().unwrap();
        let mut schema = WarehouseSchema::standard();
        schema.product.columns.clear();

        let err = reset_schema(warehouse.connection(), &schema).unwrap_err();
        assert!(matches!(err, SchemaError::Create { .. }));
        assert_eq!(err.table(), "product");
    }
}
