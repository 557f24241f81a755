//! Extract error types

use salesdw_core::Entity;
use std::path::{Path, PathBuf};

/// Errors raised while reading or shaping an extract
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("{entity} extract not found at {}", path.display())]
    SourceNotFound { entity: Entity, path: PathBuf },

    #[error("{entity} extract {} is malformed: {issue}", path.display())]
    SourceFormat {
        entity: Entity,
        path: PathBuf,
        issue: FormatIssue,
    },
}

impl ExtractError {
    pub(crate) fn format(entity: Entity, path: &Path, issue: FormatIssue) -> Self {
        Self::SourceFormat {
            entity,
            path: path.to_path_buf(),
            issue,
        }
    }

    /// Entity whose extract failed
    pub fn entity(&self) -> Entity {
        match self {
            Self::SourceNotFound { entity, .. } | Self::SourceFormat { entity, .. } => *entity,
        }
    }

    /// Path of the offending extract
    pub fn path(&self) -> &Path {
        match self {
            Self::SourceNotFound { path, .. } | Self::SourceFormat { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::SourceNotFound { .. })
    }
}

/// What is wrong with a malformed extract
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatIssue {
    #[error("unreadable file: {0}")]
    Unreadable(String),

    #[error("invalid CSV: {0}")]
    Csv(String),

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("unexpected columns: {}", .0.join(", "))]
    UnexpectedColumns(Vec<String>),

    #[error("line {line}: invalid {column} '{value}'")]
    InvalidKey {
        line: u64,
        column: String,
        value: String,
    },
}
