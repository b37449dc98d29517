//! Bundle manifest: the declaration units handed over by the front-end, the
//! entry points to bundle and the options to bundle them with.

use anyhow::{Context, Result};
use dtsz_bundler::{BundleOptions, EntryPoint};
use dtsz_syntax::{DeclarationUnit, UnitStore};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// In traversal order.
    pub modules: Vec<DeclarationUnit>,
    pub entries: Vec<EntryPoint>,
    #[serde(default)]
    pub options: BundleOptions,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest {}", path.display()))?;
        let manifest = Self::parse(&text)
            .with_context(|| format!("failed to parse manifest {}", path.display()))?;
        debug!(
            modules = manifest.modules.len(),
            entries = manifest.entries.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Move the units into a store, assigning identities.
    pub fn into_parts(self) -> Result<(UnitStore, Vec<EntryPoint>, BundleOptions)> {
        let mut store = UnitStore::new();
        for unit in self.modules {
            store.add(unit)?;
        }
        Ok((store, self.entries, self.options))
    }
}

#[cfg(test)]
#[path = "../tests/manifest.rs"]
mod tests;
