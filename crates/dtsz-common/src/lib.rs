//! Common types and utilities for the dtsz declaration bundler.
//!
//! This crate provides foundational types used across all dtsz crates:
//! - Diagnostics (`Diagnostic`, `DiagnosticCategory`, bundler diagnostic codes)
//! - Bundler limits and thresholds
//! - Source positions for declaration origin tracking
//! - Source map generation

// Diagnostics reported by the bundling passes
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory};

// Centralized limits and thresholds
pub mod limits;

// Line/column positions of declarations in their originating module
pub mod position;
pub use position::SourcePos;

// Source Map generation
pub mod source_map;
pub use source_map::SourceMapGenerator;
