//! Bundling driver.
//!
//! `Bundler` links the store and builds the reference graph once, then
//! produces one bundle per entry point: the modules reachable from the entry
//! are shaken against the entry's export surface, deconflicted into one
//! scope, normalized, merged into a single export clause and printed.

use crate::deconflict::{BindingMap, Deconflicted, Deconflicter};
use crate::error::BundleError;
use crate::graph::{ExternalRef, ImportedName, ModuleGraph, SurfaceEntry};
use crate::merger::Merger;
use crate::normalize;
use crate::options::BundleOptions;
use crate::reference_graph::{ReferenceGraph, Target, targets_of};
use crate::stats::BundleStats;
use crate::tree_shaker::{self, ShakenModule};
use dtsz_common::diagnostics::{Diagnostic, codes, dedupe, format_message, messages};
use dtsz_syntax::{
    BundledFile, BundledStatement, DeclId, ExportClause, ExternalImport, IdAllocator,
    ImportSpecifier, ModuleId, Statement, UnitStore,
};
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info};

/// An entry module and the file its bundle is written to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    pub module: String,
    pub output: String,
    /// Export names the bundle must provide; `None` keeps the whole surface.
    #[serde(default)]
    pub exports: Option<Vec<String>>,
}

impl EntryPoint {
    pub fn new(module: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            output: output.into(),
            exports: None,
        }
    }
}

/// Everything produced for one entry point.
#[derive(Debug)]
pub struct BundleOutput {
    pub file_name: String,
    pub code: String,
    pub source_map: Option<String>,
    pub stats: BundleStats,
    pub diagnostics: Vec<Diagnostic>,
    pub binding_map: BindingMap,
    pub export_clause: ExportClause,
}

impl BundleOutput {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

pub struct Bundler<'s> {
    store: &'s UnitStore,
    options: BundleOptions,
    graph: ModuleGraph,
    references: ReferenceGraph,
}

impl<'s> Bundler<'s> {
    #[tracing::instrument(level = "info", skip_all, fields(modules = store.len()))]
    pub fn new(store: &'s UnitStore, options: BundleOptions) -> Self {
        let graph = ModuleGraph::build(store, &options);
        let references = ReferenceGraph::build(store, &graph);
        Self {
            store,
            options,
            graph,
            references,
        }
    }

    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    pub fn options(&self) -> &BundleOptions {
        &self.options
    }

    /// Bundle every entry point. Entries are independent and run in parallel;
    /// outputs keep the order of `entries`.
    pub fn bundle_all(&self, entries: &[EntryPoint]) -> Result<Vec<BundleOutput>, BundleError> {
        entries.par_iter().map(|entry| self.bundle(entry)).collect()
    }

    #[tracing::instrument(level = "info", skip_all, fields(entry = %entry.module))]
    pub fn bundle(&self, entry: &EntryPoint) -> Result<BundleOutput, BundleError> {
        let entry_id = self
            .store
            .lookup(&entry.module)
            .ok_or_else(|| BundleError::UnknownEntry(entry.module.clone()))?;
        let mut diagnostics = Vec::new();

        let modules = self.references.module_closure(&self.graph, entry_id);
        let surface = self.graph.export_surface(entry_id, &mut diagnostics);
        let required = required_entries(
            &entry.module,
            surface.entries,
            entry.exports.as_deref(),
            &mut diagnostics,
        );

        let mut reach = {
            let roots = self.roots(entry_id, &modules, &required, &mut diagnostics);
            self.references.closure(&self.graph, roots, &mut diagnostics)
        };
        for &module in &modules {
            if let Some(opaque) = self.references.opaque_roots(module) {
                reach.globals.extend(opaque.globals.iter().cloned());
                diagnostics.extend(opaque.diagnostics.iter().cloned());
            }
        }

        let (shaken, shake_stats) = tree_shaker::shake(self.store, &modules, &reach);

        let mut deconflicter = Deconflicter::new(
            &self.graph,
            &reach,
            entry_id,
            IdAllocator::starting_at(self.store.next_decl_id()),
        );
        if self.options.reserve_globals {
            deconflicter.reserve(reach.globals.iter().map(String::as_str));
        }
        let Deconflicted {
            modules: mut shaken,
            bindings,
            synthetic,
            mut ids,
        } = deconflicter.run(shaken);

        normalize::ensure_declare(&mut shaken);
        let intents = normalize::strip_exports(&mut shaken, &bindings);

        let merged = Merger {
            graph: &self.graph,
            entry: entry_id,
            surface: &required,
            external_stars: &surface.external_stars,
            modules: &shaken,
            bindings: &bindings,
            synthetic: &synthetic,
            intents: &intents,
        }
        .merge(&mut ids);

        let imports = external_imports(&synthetic.externals, &bindings);
        let mut statements = bundled_statements(shaken);
        statements.extend(merged.statements.into_iter().map(BundledStatement::synthetic));
        let file = BundledFile {
            file_name: entry.output.clone(),
            imports,
            statements,
            export: merged.export,
            module_marker: self.options.emit_module_marker,
        };
        let printed = dtsz_emitter::print(&file, self.options.source_map);

        let stats = BundleStats::collect(&reach, shake_stats, bindings.renamed_count());
        diagnostics.append(&mut reach.diagnostics);
        let diagnostics = dedupe(diagnostics);

        info!(
            output = %entry.output,
            kept = stats.kept_declarations,
            removed = stats.removed_declarations,
            renamed = stats.renamed_bindings,
            diagnostics = diagnostics.len(),
            "bundled entry"
        );
        Ok(BundleOutput {
            file_name: file.file_name,
            code: printed.code,
            source_map: printed.source_map,
            stats,
            diagnostics,
            binding_map: bindings,
            export_clause: file.export,
        })
    }

    /// Root set of an entry: the required surface, the target of `export =`,
    /// and everything opaque statements of bundled modules reference.
    fn roots(
        &self,
        entry: ModuleId,
        modules: &[ModuleId],
        required: &[SurfaceEntry],
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<Target> {
        let mut roots: Vec<Target> = required
            .iter()
            .flat_map(|e| targets_of(&self.graph, &e.resolution))
            .collect();

        if let Some(expression) = self
            .graph
            .scope(entry)
            .and_then(|scope| scope.export_assignment.as_deref())
        {
            let resolution = self.graph.resolve_local(entry, expression, diagnostics);
            roots.extend(targets_of(&self.graph, &resolution));
        }

        for &module in modules {
            if let Some(opaque) = self.references.opaque_roots(module) {
                roots.extend(opaque.targets.iter().cloned());
            }
        }
        debug!(roots = roots.len(), "collected root set");
        roots
    }
}

/// Restrict the entry surface to the names the host asked for, reporting
/// names the entry does not export.
fn required_entries(
    entry: &str,
    surface: Vec<SurfaceEntry>,
    required: Option<&[String]>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<SurfaceEntry> {
    let Some(required) = required else {
        return surface;
    };
    for name in required {
        if !surface.iter().any(|e| &e.name == name) {
            diagnostics.push(Diagnostic::error(
                entry,
                format_message(messages::UNKNOWN_ENTRY_EXPORT, &[name]),
                codes::UNKNOWN_ENTRY_EXPORT,
            ));
        }
    }
    surface
        .into_iter()
        .filter(|e| required.contains(&e.name))
        .collect()
}

/// One import statement per library, in binding order.
fn external_imports(
    externals: &IndexMap<ExternalRef, DeclId>,
    bindings: &BindingMap,
) -> Vec<ExternalImport> {
    let mut by_specifier: IndexMap<&str, ExternalImport> = IndexMap::new();
    for (external, &id) in externals {
        let Some(local) = bindings.get(id) else {
            continue;
        };
        let import = by_specifier
            .entry(external.specifier.as_str())
            .or_insert_with(|| ExternalImport {
                specifier: external.specifier.clone(),
                namespace: None,
                named: Vec::new(),
            });
        match &external.imported {
            ImportedName::Namespace => import.namespace = Some(local.to_string()),
            imported => import.named.push(ImportSpecifier {
                imported: imported.as_str().to_string(),
                local: local.to_string(),
            }),
        }
    }
    by_specifier.into_values().collect()
}

/// Declarations and opaque statements in module order; module plumbing is
/// dropped now that the merger has consumed it.
fn bundled_statements(modules: Vec<ShakenModule>) -> Vec<BundledStatement> {
    let mut statements = Vec::new();
    for module in modules {
        for statement in module.statements {
            let pos = match &statement {
                Statement::Declaration(decl) => decl.pos,
                Statement::Opaque(opaque) => opaque.pos,
                Statement::Import(_)
                | Statement::Export(_)
                | Statement::ExportAll(_)
                | Statement::ExportDefault(_)
                | Statement::ExportAssignment(_) => continue,
            };
            statements.push(BundledStatement {
                origin: Some(module.path.clone()),
                pos,
                statement,
            });
        }
    }
    statements
}

#[cfg(test)]
#[path = "../tests/pipeline.rs"]
mod tests;
