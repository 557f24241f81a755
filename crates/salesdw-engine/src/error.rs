//! Load error types

use crate::integrity::OrphanReference;
use salesdw_core::ConfigError;
use salesdw_extract::ExtractError;
use salesdw_warehouse::{InsertError, SchemaError, WarehouseError};

/// The phase of a load an error happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStep {
    Configure,
    Connect,
    ResetSchema,
    Read,
    ReferentialCheck,
    Insert,
    Commit,
    Close,
}

impl LoadStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Connect => "connect",
            Self::ResetSchema => "reset schema",
            Self::Read => "read",
            Self::ReferentialCheck => "referential check",
            Self::Insert => "insert",
            Self::Commit => "commit",
            Self::Close => "close",
        }
    }
}

impl std::fmt::Display for LoadStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that abort a load
///
/// Every variant leaves the warehouse as it was before the run, except
/// under the eager reset policy where a failure after the reset leaves
/// empty tables behind.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Schema reset failed: {0}")]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Source(#[from] ExtractError),

    #[error("{} sale rows reference customers or products that are not in the load", .orphans.len())]
    ReferentialIntegrity { orphans: Vec<OrphanReference> },

    #[error("Bulk insert failed: {0}")]
    Insert(#[from] InsertError),

    #[error("Load failed during {step}: {source}")]
    Failure {
        step: LoadStep,
        #[source]
        source: WarehouseError,
    },
}

impl LoadError {
    pub(crate) fn failure(step: LoadStep) -> impl FnOnce(WarehouseError) -> Self {
        move |source| Self::Failure { step, source }
    }

    /// The phase that failed
    pub fn step(&self) -> LoadStep {
        match self {
            Self::Config(_) => LoadStep::Configure,
            Self::Schema(_) => LoadStep::ResetSchema,
            Self::Source(_) => LoadStep::Read,
            Self::ReferentialIntegrity { .. } => LoadStep::ReferentialCheck,
            Self::Insert(_) => LoadStep::Insert,
            Self::Failure { step, .. } => *step,
        }
    }
}
