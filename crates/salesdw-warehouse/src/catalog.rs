//! Read-only warehouse introspection
//!
//! Table schemas come from SQLite's `pragma_table_info` and
//! `pragma_foreign_key_list` table-valued functions; declared column types
//! map onto logical types with SQLite's affinity rules.

use crate::error::WarehouseError;
use crate::schema_manager::quote_ident;
use rusqlite::{params, Connection, OptionalExtension};
use salesdw_core::{Column, ForeignKey, LogicalType, Nullability, TableSchema};

/// Introspection over one connection
pub struct Catalog<'conn> {
    conn: &'conn Connection,
}

impl<'conn> Catalog<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// User tables, sorted by name
    pub fn table_names(&self) -> Result<Vec<String>, WarehouseError> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    pub fn table_exists(&self, table: &str) -> Result<bool, WarehouseError> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Fetch the live schema of a table, or `None` if it does not exist
    pub fn fetch_schema(&self, table: &str) -> Result<Option<TableSchema>, WarehouseError> {
        if !self.table_exists(table)? {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(
            "SELECT name, type, \"notnull\", pk FROM pragma_table_info(?1) ORDER BY cid",
        )?;
        let columns = stmt
            .query_map(params![table], |row| {
                let name: String = row.get(0)?;
                let declared: String = row.get(1)?;
                let not_null: i64 = row.get(2)?;
                let pk: i64 = row.get(3)?;

                let mut column = Column::new(name, LogicalType::from_declared_type(&declared))
                    .with_nullability(if not_null != 0 { Nullability::No } else { Nullability::Yes });
                if pk > 0 {
                    column = column.primary_key();
                }
                Ok(column)
            })?
            .collect::<Result<Vec<_>, _>>()?;

        // SQLite numbers foreign keys last-declared first
        let mut stmt = self.conn.prepare(
            "SELECT \"from\", \"table\", \"to\" FROM pragma_foreign_key_list(?1) ORDER BY id DESC, seq",
        )?;
        let foreign_keys = stmt
            .query_map(params![table], |row| {
                let from: String = row.get(0)?;
                let references: String = row.get(1)?;
                let to: Option<String> = row.get(2)?;
                Ok(ForeignKey::new(from, references, to.unwrap_or_default()))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut schema = TableSchema::new(table, columns);
        schema.foreign_keys = foreign_keys;
        Ok(Some(schema))
    }

    /// Number of rows in a table
    pub fn row_count(&self, table: &str) -> Result<usize, WarehouseError> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Number of distinct values of `column` that occur more than once
    pub fn duplicate_key_count(&self, table: &str, column: &str) -> Result<usize, WarehouseError> {
        let column = quote_ident(column);
        let sql = format!(
            "SELECT COUNT(*) FROM (SELECT {column} FROM {table} GROUP BY {column} HAVING COUNT(*) > 1)",
            column = column,
            table = quote_ident(table),
        );
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
