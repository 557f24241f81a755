//! Warehouse error types

use salesdw_core::LogicalType;
use std::path::PathBuf;

/// Errors opening, querying or closing the warehouse file
#[derive(Debug, thiserror::Error)]
pub enum WarehouseError {
    #[error("Failed to create warehouse directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Warehouse not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to open warehouse {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Failed to close warehouse: {0}")]
    Close(#[source] rusqlite::Error),
}

/// A rejected DDL statement during schema reset
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Failed to drop table '{table}': {source}")]
    Drop {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Failed to create table '{table}': {source}")]
    Create {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl SchemaError {
    /// Table whose statement failed
    pub fn table(&self) -> &str {
        match self {
            Self::Drop { table, .. } | Self::Create { table, .. } => table,
        }
    }
}

/// A row the warehouse refused during bulk insert
#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("{table}: column '{column}' is not part of the table")]
    UnknownColumn { table: String, column: String },

    #[error("{table}: line {line}: column '{column}' expects {expected}, got '{value}'")]
    TypeMismatch {
        table: String,
        line: u64,
        column: String,
        expected: LogicalType,
        value: String,
    },

    #[error("{table}: line {line}: constraint violation: {source}")]
    Constraint {
        table: String,
        line: u64,
        #[source]
        source: rusqlite::Error,
    },

    #[error("{table}: insert failed: {source}")]
    Statement {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl InsertError {
    /// Table the insert targeted
    pub fn table(&self) -> &str {
        match self {
            Self::UnknownColumn { table, .. }
            | Self::TypeMismatch { table, .. }
            | Self::Constraint { table, .. }
            | Self::Statement { table, .. } => table,
        }
    }
}
