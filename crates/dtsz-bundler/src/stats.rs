//! Per-bundle statistics report.

use crate::graph::ExternalRef;
use crate::reference_graph::Reachability;
use crate::tree_shaker::ShakeStats;
use serde::Serialize;

/// A type a bundle still takes from an external library.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ExternalReference {
    pub library: String,
    /// Imported name, `default`, or `*` for a whole-module reference.
    pub symbol: String,
}

impl From<&ExternalRef> for ExternalReference {
    fn from(external: &ExternalRef) -> Self {
        ExternalReference {
            library: external.specifier.clone(),
            symbol: external.imported.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleStats {
    /// Sorted and deduplicated.
    pub external_references: Vec<ExternalReference>,
    pub kept_declarations: usize,
    pub removed_declarations: usize,
    pub renamed_bindings: usize,
}

impl BundleStats {
    pub fn collect(reach: &Reachability, shake: ShakeStats, renamed: usize) -> Self {
        let mut external_references: Vec<ExternalReference> = reach
            .imports
            .iter()
            .chain(reach.import_types.iter())
            .map(ExternalReference::from)
            .collect();
        external_references.sort();
        external_references.dedup();

        BundleStats {
            external_references,
            kept_declarations: shake.kept,
            removed_declarations: shake.removed,
            renamed_bindings: renamed,
        }
    }

    /// Distinct libraries referenced, sorted.
    pub fn libraries(&self) -> Vec<&str> {
        let mut libraries: Vec<&str> = self
            .external_references
            .iter()
            .map(|r| r.library.as_str())
            .collect();
        libraries.dedup();
        libraries
    }
}
