//! SQLite warehouse access
//!
//! This crate owns every statement the loader sends to the warehouse:
//! - Opening and closing the warehouse file
//! - Resetting the schema (drop + create, dependents first)
//! - Bulk inserting prepared rows
//! - Read-only catalog queries used by `check`
//!
//! ## Example
//!
//! ```rust,ignore
//! use salesdw_warehouse::{Warehouse, reset_schema};
//! use salesdw_core::WarehouseSchema;
//!
//! let warehouse = Warehouse::open(Path::new("data/dw/smart_sales.db"))?;
//! reset_schema(warehouse.connection(), &WarehouseSchema::standard())?;
//! let rows = warehouse.catalog().row_count("customer")?;
//! ```

pub mod catalog;
pub mod error;
pub mod loader;
pub mod schema_manager;
pub mod warehouse;

pub use catalog::Catalog;
pub use error::{InsertError, SchemaError, WarehouseError};
pub use loader::bulk_insert;
pub use schema_manager::{create_table_sql, reset_schema};
pub use warehouse::Warehouse;
