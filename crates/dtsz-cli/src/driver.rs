use anyhow::{Context, Result, bail};
use dtsz_bundler::{BundleOutput, BundleStats, Bundler, EntryPoint};
use dtsz_common::Diagnostic;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::args::CliArgs;
use crate::manifest::Manifest;

pub const STATS_FILE: &str = "stats.json";

#[derive(Debug, Default)]
pub struct RunSummary {
    pub diagnostics: Vec<Diagnostic>,
    /// Bundles, maps and reports, in write order.
    pub written: Vec<PathBuf>,
    pub bundles: usize,
}

impl RunSummary {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

#[derive(Serialize)]
struct StatsRecord<'a> {
    output: &'a str,
    #[serde(flatten)]
    stats: &'a BundleStats,
}

/// Load the manifest, bundle the selected entries and write the results.
#[tracing::instrument(level = "info", skip_all, fields(manifest = %args.manifest.display()))]
pub fn run(args: &CliArgs) -> Result<RunSummary> {
    let manifest = Manifest::load(&args.manifest)?;
    let (store, entries, mut options) = manifest.into_parts()?;
    args.apply_to(&mut options);
    let entries = select_entries(entries, &args.entry)?;

    let out_dir = match &args.out_dir {
        Some(dir) => dir.clone(),
        None => args
            .manifest
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let bundler = Bundler::new(&store, options);
    let outputs = bundler.bundle_all(&entries)?;

    let mut summary = RunSummary {
        bundles: outputs.len(),
        ..RunSummary::default()
    };
    for output in &outputs {
        write_output(&out_dir, output, &mut summary.written)?;
        summary.diagnostics.extend(output.diagnostics.iter().cloned());
    }
    if args.stats {
        let path = out_dir.join(STATS_FILE);
        write_stats(&path, &outputs)?;
        summary.written.push(path);
    }

    info!(
        bundles = summary.bundles,
        files = summary.written.len(),
        diagnostics = summary.diagnostics.len(),
        "run complete"
    );
    Ok(summary)
}

/// Keep the manifest's entries named in `filter`, in manifest order.
fn select_entries(entries: Vec<EntryPoint>, filter: &[String]) -> Result<Vec<EntryPoint>> {
    if filter.is_empty() {
        return Ok(entries);
    }
    for name in filter {
        if !entries.iter().any(|e| &e.module == name) {
            bail!("manifest has no entry for module '{name}'");
        }
    }
    Ok(entries
        .into_iter()
        .filter(|e| filter.contains(&e.module))
        .collect())
}

fn write_output(out_dir: &Path, output: &BundleOutput, written: &mut Vec<PathBuf>) -> Result<()> {
    let path = out_dir.join(&output.file_name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let mut code = output.code.clone();
    if let Some(map) = &output.source_map {
        let map_path = map_path_for(&path);
        std::fs::write(&map_path, map)
            .with_context(|| format!("failed to write {}", map_path.display()))?;
        if let Some(name) = map_path.file_name() {
            code.push_str(&format!("//# sourceMappingURL={}\n", name.to_string_lossy()));
        }
        debug!(path = %map_path.display(), "wrote source map");
        written.push(map_path);
    }

    std::fs::write(&path, code).with_context(|| format!("failed to write {}", path.display()))?;
    debug!(path = %path.display(), "wrote bundle");
    written.push(path);
    Ok(())
}

/// `index.d.ts` -> `index.d.ts.map`
pub fn map_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".map");
    PathBuf::from(name)
}

fn write_stats(path: &Path, outputs: &[BundleOutput]) -> Result<()> {
    let records: Vec<StatsRecord<'_>> = outputs
        .iter()
        .map(|o| StatsRecord {
            output: &o.file_name,
            stats: &o.stats,
        })
        .collect();
    let json = serde_json::to_string_pretty(&records).context("failed to serialize stats")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/driver.rs"]
mod tests;
