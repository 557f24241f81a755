//! salesdw engine - load orchestration
//!
//! This crate implements the run-level logic:
//! - The load executor (reset, read, check, insert, commit)
//! - Referential checks between sales and their dimensions
//! - Drift detection and post-load verification

pub mod drift_detector;
pub mod error;
pub mod executor;
pub mod integrity;
pub mod verify;

pub use drift_detector::DriftDetection;
pub use error::{LoadError, LoadStep};
pub use executor::LoadExecutor;
pub use integrity::{find_orphans, OrphanReference};
pub use verify::verify_warehouse;
