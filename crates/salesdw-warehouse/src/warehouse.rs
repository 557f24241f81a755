//! The warehouse file handle

use crate::catalog::Catalog;
use crate::error::WarehouseError;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

/// An open SQLite warehouse
///
/// Acquired once per run and closed on every exit path: explicitly through
/// [`Warehouse::close`], or implicitly when dropped.
pub struct Warehouse {
    conn: Connection,
    path: PathBuf,
}

impl Warehouse {
    /// Open (or create) the warehouse for writing
    ///
    /// Missing parent directories are created. SQLite foreign-key
    /// enforcement is switched off: the load relies on insert order, not on
    /// constraint checking.
    pub fn open(path: &Path) -> Result<Self, WarehouseError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| WarehouseError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path).map_err(|source| WarehouseError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let warehouse = Self {
            conn,
            path: path.to_path_buf(),
        };
        warehouse.configure()?;

        tracing::debug!(path = %path.display(), "Opened warehouse");
        Ok(warehouse)
    }

    /// Open an existing warehouse read-only
    pub fn open_existing(path: &Path) -> Result<Self, WarehouseError> {
        if !path.exists() {
            return Err(WarehouseError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|source| WarehouseError::Open {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// In-memory warehouse (tests and dry runs)
    pub fn in_memory() -> Result<Self, WarehouseError> {
        let conn = Connection::open_in_memory().map_err(|source| WarehouseError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        let warehouse = Self {
            conn,
            path: PathBuf::from(":memory:"),
        };
        warehouse.configure()?;
        Ok(warehouse)
    }

    fn configure(&self) -> Result<(), WarehouseError> {
        self.conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Read-only introspection over this warehouse
    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(&self.conn)
    }

    /// Close the connection, surfacing any error SQLite reports
    pub fn close(self) -> Result<(), WarehouseError> {
        let path = self.path;
        self.conn
            .close()
            .map_err(|(_, e)| WarehouseError::Close(e))?;

        tracing::debug!(path = %path.display(), "Closed warehouse");
        Ok(())
    }
}

impl std::fmt::Debug for Warehouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warehouse").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_keys_are_not_enforced() {
        let warehouse = Warehouse::in_memory().unwrap();
        let enabled: i64 = warehouse
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 0);
    }
}
