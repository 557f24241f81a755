//! Integration tests for the warehouse file
//!
//! These run against real SQLite files in a temporary directory, so they
//! exercise directory creation, reopening and read-only access.

use rusqlite::params;
use salesdw_core::{Entity, LogicalType, WarehouseSchema};
use salesdw_warehouse::{reset_schema, Warehouse, WarehouseError};

// =============================================================================
// Helper Functions
// =============================================================================

fn insert_customer(warehouse: &Warehouse, id: i64, name: &str) {
    warehouse
        .connection()
        .execute(
            "INSERT INTO customer (customer_id, name) VALUES (?1, ?2)",
            params![id, name],
        )
        .unwrap();
}

// =============================================================================
// Open / Close
// =============================================================================

#[test]
fn open_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("dw").join("smart_sales.db");

    let warehouse = Warehouse::open(&path).unwrap();
    assert_eq!(warehouse.path(), path.as_path());
    warehouse.close().unwrap();

    assert!(path.exists());
}

#[test]
fn open_existing_requires_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.db");

    let err = Warehouse::open_existing(&path).unwrap_err();
    assert!(matches!(err, WarehouseError::NotFound { .. }));
    assert!(!path.exists());
}

#[test]
fn data_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smart_sales.db");

    let warehouse = Warehouse::open(&path).unwrap();
    reset_schema(warehouse.connection(), &WarehouseSchema::standard()).unwrap();
    insert_customer(&warehouse, 1, "Alice");
    warehouse.close().unwrap();

    let reopened = Warehouse::open_existing(&path).unwrap();
    assert_eq!(reopened.catalog().row_count("customer").unwrap(), 1);
}

#[test]
fn read_only_handle_rejects_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smart_sales.db");

    let warehouse = Warehouse::open(&path).unwrap();
    reset_schema(warehouse.connection(), &WarehouseSchema::standard()).unwrap();
    warehouse.close().unwrap();

    let reader = Warehouse::open_existing(&path).unwrap();
    let result = reader
        .connection()
        .execute("INSERT INTO customer (customer_id) VALUES (1)", []);
    assert!(result.is_err());
}

// =============================================================================
// Reset Semantics
// =============================================================================

#[test]
fn reset_inside_rolled_back_transaction_keeps_old_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smart_sales.db");
    let schema = WarehouseSchema::standard();

    let mut warehouse = Warehouse::open(&path).unwrap();
    reset_schema(warehouse.connection(), &schema).unwrap();
    insert_customer(&warehouse, 1, "Alice");

    {
        let tx = warehouse.connection_mut().transaction().unwrap();
        reset_schema(&tx, &schema).unwrap();
        assert_eq!(
            salesdw_warehouse::Catalog::new(&tx).row_count("customer").unwrap(),
            0
        );
        // dropped without commit
    }

    assert_eq!(warehouse.catalog().row_count("customer").unwrap(), 1);
}

#[test]
fn catalog_reports_standard_schema() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("smart_sales.db");
    let schema = WarehouseSchema::standard();

    let warehouse = Warehouse::open(&path).unwrap();
    reset_schema(warehouse.connection(), &schema).unwrap();

    let catalog = warehouse.catalog();
    for entity in Entity::LOAD_ORDER {
        let actual = catalog.fetch_schema(entity.table_name()).unwrap().unwrap();
        let expected = schema.table(entity);

        assert_eq!(actual.column_names(), expected.column_names());
        assert_eq!(
            actual.primary_key().map(|c| c.name.as_str()),
            Some(entity.key_column())
        );
    }

    let product = catalog.fetch_schema("product").unwrap().unwrap();
    assert_eq!(
        product.find_column("unit_price").unwrap().logical_type,
        LogicalType::Float
    );
}
