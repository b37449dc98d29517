//! Bundling options.

use dtsz_common::limits::MAX_REEXPORT_CHAIN_DEPTH;
use serde::{Deserialize, Serialize};

/// Which of two `export *` sources providing the same name keeps the plain
/// exported name. The other one is exported under a suffixed name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StarExportConflict {
    #[default]
    PreferFirst,
    PreferLast,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundleOptions {
    pub star_export_conflict: StarExportConflict,
    /// Produce a source map next to each bundle.
    pub source_map: bool,
    /// Reserve names that stay unresolved (globals such as `Promise`) so no
    /// bundled declaration is renamed into capturing them.
    pub reserve_globals: bool,
    /// Traversal budget for following one re-export chain.
    pub max_reexport_depth: u32,
    /// Emit `export {};` when a bundle exports nothing.
    pub emit_module_marker: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            star_export_conflict: StarExportConflict::PreferFirst,
            source_map: false,
            reserve_globals: true,
            max_reexport_depth: MAX_REEXPORT_CHAIN_DEPTH,
            emit_module_marker: true,
        }
    }
}
