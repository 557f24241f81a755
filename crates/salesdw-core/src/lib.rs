//! salesdw core
//!
//! Domain model shared by every crate: the fixed warehouse schema,
//! configuration, diagnostics and the versioned report format.
//! Never rename diagnostic codes - they are part of the report format.

pub mod diagnostic;
pub mod schema;
pub mod report;
pub mod config;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity, Location};
pub use schema::{LogicalType, Column, Nullability, ForeignKey, TableSchema, Entity, WarehouseSchema};
pub use report::{Report, ReportVersion, ReportSummary, TableLoadStats};
pub use config::{Config, ConfigError, ExtractFiles, ResetPolicy};
