//! Business Logic
//!
//! This module contains pure business logic functions that can be unit tested:
//! - breadcrumb: Breadcrumb trail construction for selected paths
//! - errors: Error classification for display
//! - file: File type detection
//! - formatting: Date and size formatting

pub mod breadcrumb;
pub mod errors;
pub mod file;
pub mod formatting;
