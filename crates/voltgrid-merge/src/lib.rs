//! Voltgrid Merge - Deduplication and merge engine
//!
//! Given persisted station records, this crate finds geographically-close
//! duplicate candidates, confirms them with attribute-similarity rules,
//! resolves each duplicate cluster into one canonical record by source
//! priority, and commits the result cluster-by-cluster.

pub mod finder;
pub mod matcher;
pub mod orchestrator;
pub mod resolver;

pub use finder::{DuplicateFinder, FoundDuplicates};
pub use matcher::is_duplicate;
pub use orchestrator::{MergeReport, StationMerger};
pub use resolver::MergeResolver;
