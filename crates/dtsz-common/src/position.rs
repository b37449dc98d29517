//! Source positions for declarations.
//!
//! Positions are 0-based line/column pairs in the originating module, as
//! reported by the front-end. They are only used to build source maps.

use serde::{Deserialize, Serialize};

/// A 0-based line/column position in a source module.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePos {
    pub line: u32,
    pub column: u32,
}

impl SourcePos {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}
