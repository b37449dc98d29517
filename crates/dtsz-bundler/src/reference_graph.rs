//! Reference Graph and reachability.
//!
//! Every top-level declaration identity (each variable declarator on its own)
//! gets the list of targets its free references resolve to through the
//! module linker. The graph is built once per store, module by module in
//! parallel; reachability is computed per entry point from its root set.

use crate::graph::{ExternalRef, ImportedName, ModuleGraph, Resolution};
use crate::references::{self, Analysis, Reference};
use dtsz_common::diagnostics::{Diagnostic, codes, format_message, messages};
use dtsz_syntax::{DeclId, DeclarationKind, DeclarationUnit, ModuleId, Statement, UnitStore};
use indexmap::IndexSet;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::collections::VecDeque;
use tracing::{debug, trace};

/// A node a declaration can depend on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Decl(DeclId),
    /// The materialized namespace of a whole module.
    Namespace(ModuleId),
    /// A binding imported from an external library.
    Import(ExternalRef),
    /// An inline `import("lib").X` type, which needs no import statement.
    ImportType(ExternalRef),
}

/// Outgoing edges of one declaration.
#[derive(Debug, Default, Clone)]
pub struct Edges {
    pub targets: Vec<Target>,
    /// Free names that resolve to nothing in the bundle (globals).
    pub globals: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Edges {
    fn extend(&mut self, other: Edges) {
        self.targets.extend(other.targets);
        self.globals.extend(other.globals);
        self.diagnostics.extend(other.diagnostics);
    }
}

#[derive(Debug, Default)]
struct ModuleAnalysis {
    decls: Vec<(DeclId, Edges)>,
    opaque: Edges,
    import_type_modules: IndexSet<ModuleId>,
}

/// Identity graph of all declarations in a store.
#[derive(Debug)]
pub struct ReferenceGraph {
    edges: FxHashMap<DeclId, Edges>,
    /// References of opaque statements, per module. Opaque statements are
    /// never shaken, so these are roots for every bundle containing the module.
    opaque: Vec<Edges>,
    /// Modules reached through `import("m")` types, per module.
    import_type_modules: Vec<IndexSet<ModuleId>>,
}

/// What one entry point keeps.
#[derive(Debug, Default, Clone)]
pub struct Reachability {
    pub decls: rustc_hash::FxHashSet<DeclId>,
    /// Modules whose namespace object must be materialized, in discovery order.
    pub namespaces: IndexSet<ModuleId>,
    pub imports: IndexSet<ExternalRef>,
    pub import_types: IndexSet<ExternalRef>,
    pub globals: IndexSet<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Reachability {
    pub fn contains(&self, id: DeclId) -> bool {
        self.decls.contains(&id)
    }
}

impl ReferenceGraph {
    #[tracing::instrument(level = "debug", skip_all, fields(modules = store.len()))]
    pub fn build(store: &UnitStore, graph: &ModuleGraph) -> Self {
        let analyses: Vec<ModuleAnalysis> = store
            .units()
            .par_iter()
            .map(|unit| analyze_unit(store, graph, unit))
            .collect();

        let mut edges = FxHashMap::default();
        let mut opaque = Vec::with_capacity(analyses.len());
        let mut import_type_modules = Vec::with_capacity(analyses.len());
        for analysis in analyses {
            edges.extend(analysis.decls);
            opaque.push(analysis.opaque);
            import_type_modules.push(analysis.import_type_modules);
        }
        debug!(declarations = edges.len(), "built reference graph");

        ReferenceGraph {
            edges,
            opaque,
            import_type_modules,
        }
    }

    pub fn edges(&self, id: DeclId) -> Option<&Edges> {
        self.edges.get(&id)
    }

    /// Modules a bundle for `entry` draws from, in store order: everything
    /// reachable through imports, re-exports and `import("m")` types.
    pub fn module_closure(&self, graph: &ModuleGraph, entry: ModuleId) -> Vec<ModuleId> {
        let mut seen = IndexSet::new();
        let mut queue = VecDeque::from([entry]);
        while let Some(module) = queue.pop_front() {
            if !seen.insert(module) {
                continue;
            }
            queue.extend(graph.dependencies(module));
            if let Some(extra) = self.import_type_modules.get(module.index()) {
                queue.extend(extra.iter().copied());
            }
        }
        let mut modules: Vec<ModuleId> = seen.into_iter().collect();
        modules.sort();
        modules
    }

    /// Targets of opaque statements in `module`.
    pub fn opaque_roots(&self, module: ModuleId) -> Option<&Edges> {
        self.opaque.get(module.index())
    }

    /// Transitive closure of `roots`. Reaching a namespace reaches every
    /// binding its module exports.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn closure(
        &self,
        graph: &ModuleGraph,
        roots: impl IntoIterator<Item = Target>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Reachability {
        let mut reach = Reachability::default();
        let mut queue: VecDeque<Target> = roots.into_iter().collect();

        while let Some(target) = queue.pop_front() {
            match target {
                Target::Decl(id) => {
                    if !reach.decls.insert(id) {
                        continue;
                    }
                    trace!(decl = id.0, "reachable");
                    if let Some(edges) = self.edges.get(&id) {
                        queue.extend(edges.targets.iter().cloned());
                        reach.globals.extend(edges.globals.iter().cloned());
                        reach.diagnostics.extend(edges.diagnostics.iter().cloned());
                    }
                }
                Target::Namespace(module) => {
                    if !reach.namespaces.insert(module) {
                        continue;
                    }
                    let surface = graph.export_surface(module, diagnostics);
                    for entry in &surface.entries {
                        queue.extend(targets_of(graph, &entry.resolution));
                    }
                }
                Target::Import(external) => {
                    reach.imports.insert(external);
                }
                Target::ImportType(external) => {
                    reach.import_types.insert(external);
                }
            }
        }

        debug!(
            decls = reach.decls.len(),
            namespaces = reach.namespaces.len(),
            imports = reach.imports.len(),
            "computed reachability"
        );
        reach
    }
}

/// Graph targets a resolution stands for. A merged symbol is reachable as a
/// whole.
pub fn targets_of(graph: &ModuleGraph, resolution: &Resolution) -> SmallVec<[Target; 2]> {
    match resolution {
        Resolution::Local(id) => {
            let merged = graph.symbol_decls(*id);
            if merged.is_empty() {
                SmallVec::from_elem(Target::Decl(*id), 1)
            } else {
                merged.iter().map(|d| Target::Decl(*d)).collect()
            }
        }
        Resolution::Namespace(module) => SmallVec::from_elem(Target::Namespace(*module), 1),
        Resolution::External(external) => {
            SmallVec::from_elem(Target::Import(external.clone()), 1)
        }
        Resolution::Unresolved => SmallVec::new(),
    }
}

fn analyze_unit(store: &UnitStore, graph: &ModuleGraph, unit: &DeclarationUnit) -> ModuleAnalysis {
    let mut analysis = ModuleAnalysis::default();

    for statement in &unit.statements {
        match statement {
            Statement::Declaration(decl) => {
                if let DeclarationKind::Variable(vars) = &decl.kind {
                    for declarator in &vars.declarations {
                        let refs = references::analyze_declarator(declarator);
                        let edges = resolve(store, graph, unit, &refs, &mut analysis);
                        analysis.decls.push((declarator.id, edges));
                    }
                } else {
                    let refs = references::analyze_declaration(decl);
                    let edges = resolve(store, graph, unit, &refs, &mut analysis);
                    analysis.decls.push((decl.id, edges));
                }
            }
            Statement::Opaque(opaque) => {
                let refs = references::analyze_opaque(&opaque.tokens);
                let edges = resolve(store, graph, unit, &refs, &mut analysis);
                analysis.opaque.extend(edges);
            }
            Statement::Import(_)
            | Statement::Export(_)
            | Statement::ExportAll(_)
            | Statement::ExportDefault(_)
            | Statement::ExportAssignment(_) => {}
        }
    }

    trace!(module = %unit.id, decls = analysis.decls.len(), "analyzed module");
    analysis
}

fn resolve(
    store: &UnitStore,
    graph: &ModuleGraph,
    unit: &DeclarationUnit,
    analysis: &Analysis,
    module_analysis: &mut ModuleAnalysis,
) -> Edges {
    let mut edges = Edges::default();
    if analysis.unsupported > 0 {
        edges.diagnostics.push(Diagnostic::warning(
            &unit.id,
            format_message(messages::UNSUPPORTED_NODE, &[&unit.id]),
            codes::UNSUPPORTED_NODE,
        ));
    }

    for reference in &analysis.references {
        match reference {
            Reference::Name(name) => {
                let resolution = graph.resolve_local(unit.module, name, &mut edges.diagnostics);
                if resolution == Resolution::Unresolved {
                    edges.globals.push(name.clone());
                }
                edges.targets.extend(targets_of(graph, &resolution));
            }
            Reference::ImportType {
                specifier,
                qualifier,
            } => match store.lookup(specifier) {
                Some(target) => {
                    module_analysis.import_type_modules.insert(target);
                    let resolution = match qualifier {
                        Some(name) => graph.resolve_export(target, name, &mut edges.diagnostics),
                        None => Resolution::Namespace(target),
                    };
                    if resolution == Resolution::Unresolved {
                        let name = qualifier.as_deref().unwrap_or("*");
                        edges.diagnostics.push(Diagnostic::error(
                            &unit.id,
                            format_message(messages::UNRESOLVED_IMPORT, &[name, specifier]),
                            codes::UNRESOLVED_IMPORT,
                        ));
                    }
                    edges.targets.extend(targets_of(graph, &resolution));
                }
                None => edges.targets.push(Target::ImportType(ExternalRef {
                    specifier: specifier.clone(),
                    imported: qualifier
                        .as_deref()
                        .map(ImportedName::from_remote)
                        .unwrap_or(ImportedName::Namespace),
                })),
            },
        }
    }
    edges
}

#[cfg(test)]
#[path = "../tests/reference_graph.rs"]
mod tests;
