//! External Services
//!
//! This module contains services that orchestrate calls to external systems:
//! - aggregator: Recursive folder walk with bounded concurrent fetches

pub mod aggregator;

// Re-export commonly used types for convenience
pub use aggregator::{AggregateReport, FailedFolder, FileAggregator, FolderSource};
