//! Extract reading and shaping
//!
//! This crate handles:
//! - Reading the prepared CSV extracts (customers, products, sales)
//! - Dropping export artifact columns and renaming to warehouse names
//! - Deduplicating rows by business key

pub mod cell;
pub mod dedupe;
pub mod error;
pub mod mapping;
pub mod normalize;
pub mod prepare;
pub mod reader;

pub use dedupe::{dedupe, DedupStats};
pub use error::{ExtractError, FormatIssue};
pub use mapping::ColumnMapping;
pub use normalize::{normalize, NormalizedTable};
pub use prepare::PreparedTable;
pub use reader::{Extract, SourceRow};
