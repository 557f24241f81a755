//! The load executor: reset, read, check, insert, commit
//!
//! One run rebuilds the warehouse from the three prepared extracts. All
//! extracts are read and validated before the first insert, and every insert
//! shares a single transaction that is committed only when all three tables
//! are written.

use crate::error::{LoadError, LoadStep};
use crate::integrity::{find_orphans, orphan_diagnostics};
use regex::Regex;
use salesdw_core::{
    Config, Diagnostic, DiagnosticCode, Entity, Location, Report, ResetPolicy, Severity,
    WarehouseSchema,
};
use salesdw_extract::PreparedTable;
use salesdw_warehouse::{bulk_insert, reset_schema, Warehouse, WarehouseError};

/// Runs full-refresh loads for one configuration
#[derive(Debug, Clone)]
pub struct LoadExecutor {
    config: Config,
    schema: WarehouseSchema,
}

impl LoadExecutor {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            schema: WarehouseSchema::standard(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn schema(&self) -> &WarehouseSchema {
        &self.schema
    }

    /// Open the configured warehouse, load it and close it
    ///
    /// The warehouse is closed on every path. A close failure after a
    /// successful commit is reported as a `close` step failure; after an
    /// earlier error it is only logged.
    pub fn run(&self) -> Result<Report, LoadError> {
        let patterns = self.config.artifact_patterns()?;
        let path = self.config.warehouse_file();

        tracing::info!(
            warehouse = %path.display(),
            reset_policy = %self.config.reset_policy,
            "Starting load"
        );

        let mut warehouse = Warehouse::open(&path).map_err(LoadError::failure(LoadStep::Connect))?;
        let result = self.load_into(&mut warehouse, &patterns);

        match (result, warehouse.close()) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(source)) => Err(LoadError::Failure {
                step: LoadStep::Close,
                source,
            }),
            (Err(err), closed) => {
                if let Err(close_err) = closed {
                    tracing::warn!(error = %close_err, "Failed to close warehouse after load error");
                }
                Err(err)
            }
        }
    }

    /// Load into an already open warehouse
    pub fn run_on(&self, warehouse: &mut Warehouse) -> Result<Report, LoadError> {
        let patterns = self.config.artifact_patterns()?;
        self.load_into(warehouse, &patterns)
    }

    fn load_into(&self, warehouse: &mut Warehouse, patterns: &[Regex]) -> Result<Report, LoadError> {
        let policy = self.config.reset_policy;

        if policy == ResetPolicy::Eager {
            reset_schema(warehouse.connection(), &self.schema)?;
            tracing::info!("Schema reset committed ahead of the load");
        }

        let tx = warehouse
            .connection_mut()
            .transaction()
            .map_err(WarehouseError::from)
            .map_err(LoadError::failure(LoadStep::Connect))?;

        if policy == ResetPolicy::Transactional {
            reset_schema(&tx, &self.schema)?;
        }

        let customers = self.prepare(Entity::Customer, patterns)?;
        let products = self.prepare(Entity::Product, patterns)?;
        let sales = self.prepare(Entity::Sale, patterns)?;

        let mut report = Report::new();

        let orphans = find_orphans(&sales.table, &customers.table, &products.table);
        if !orphans.is_empty() {
            if self.config.enforce_foreign_keys {
                for diagnostic in orphan_diagnostics(&orphans, &sales.table, Severity::Error) {
                    tracing::error!("{}", diagnostic.message);
                }
                return Err(LoadError::ReferentialIntegrity { orphans });
            }

            for diagnostic in orphan_diagnostics(&orphans, &sales.table, Severity::Warn) {
                tracing::warn!("{}", diagnostic.message);
                report.add_diagnostic(diagnostic);
            }
        }

        for prepared in [&customers, &products, &sales] {
            let entity = prepared.entity();
            let inserted = bulk_insert(&tx, self.schema.table(entity), &prepared.table)?;

            let mut stats = prepared.load_stats();
            stats.rows_in_table = inserted;

            for diagnostic in table_diagnostics(prepared) {
                report.add_diagnostic(diagnostic);
            }
            report.add_table(stats);

            tracing::info!(table = %entity, rows = inserted, "Loaded table");
        }

        tx.commit()
            .map_err(WarehouseError::from)
            .map_err(LoadError::failure(LoadStep::Commit))?;

        report.metadata = Some(serde_json::json!({
            "warehouse": warehouse.path().display().to_string(),
            "reset_policy": policy.to_string(),
            "enforce_foreign_keys": self.config.enforce_foreign_keys,
        }));

        tracing::info!(
            tables = report.summary.tables,
            rows = report.summary.rows,
            "Load committed"
        );
        Ok(report)
    }

    fn prepare(&self, entity: Entity, patterns: &[Regex]) -> Result<PreparedTable, LoadError> {
        let path = self.config.extract_path(entity);
        tracing::debug!(entity = %entity, path = %path.display(), "Reading extract");

        Ok(PreparedTable::load(entity, &path, self.schema.table(entity), patterns)?)
    }
}

/// Diagnostics describing what normalization and deduplication dropped
fn table_diagnostics(prepared: &PreparedTable) -> Vec<Diagnostic> {
    let file = prepared.table.source.display().to_string();
    let table = prepared.entity().table_name();
    let stats = prepared.stats;
    let mut diagnostics = Vec::new();

    if stats.has_duplicates() {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::LoadDuplicateKeys,
                Severity::Warn,
                format!(
                    "Dropped {} duplicate rows for {} repeated {} values in '{}'",
                    stats.duplicate_rows,
                    stats.duplicate_keys,
                    prepared.entity().key_column(),
                    table,
                ),
            )
            .with_location(Location::new(file.clone())),
        );
    }

    for column in &prepared.table.dropped_artifacts {
        diagnostics.push(
            Diagnostic::new(
                DiagnosticCode::LoadArtifactColumnDropped,
                Severity::Info,
                format!("Dropped artifact column '{}' from the {} extract", column, table),
            )
            .with_location(Location::new(file.clone())),
        );
    }

    diagnostics
}
