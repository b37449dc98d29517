//! Module linker.
//!
//! Builds, for every declaration unit in the store, the tables the bundling
//! passes resolve names against:
//! - top-level symbols (several declarations under one name form a merged symbol)
//! - import bindings (local name -> source module and remote name)
//! - the export table in source order, and `export *` sources in order
//!
//! and follows re-export chains through them to a terminal `Resolution`.

use crate::lexical_env::suffixed_name;
use crate::options::{BundleOptions, StarExportConflict};
use dtsz_common::diagnostics::{Diagnostic, codes, format_message, messages};
use dtsz_syntax::{
    DeclId, DeclarationKind, DeclarationTag, DeclarationUnit, ModuleId, Statement, UnitStore,
};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Target of an import or re-export specifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleRef {
    Internal(ModuleId),
    /// A library outside the bundle, by specifier.
    External(String),
}

/// Remote side of an import binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImportedName {
    Named(String),
    Default,
    /// `* as ns`
    Namespace,
}

impl ImportedName {
    pub fn from_remote(name: &str) -> Self {
        match name {
            "default" => ImportedName::Default,
            "*" => ImportedName::Namespace,
            other => ImportedName::Named(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImportedName::Named(name) => name,
            ImportedName::Default => "default",
            ImportedName::Namespace => "*",
        }
    }
}

/// A binding provided by an external library.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternalRef {
    pub specifier: String,
    pub imported: ImportedName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub source: ModuleRef,
    pub imported: ImportedName,
}

/// One row of a module's export table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEntry {
    /// `export { local as name }`, `export interface name`, `export default local`
    Local { local: String },
    /// `export { imported as name } from "m"`, `export * as name from "m"`
    ReExport {
        source: ModuleRef,
        imported: ImportedName,
    },
}

/// Top-level declaration facts the later passes need without the tree.
#[derive(Debug, Clone)]
pub struct DeclInfo {
    pub module: ModuleId,
    pub name: String,
    pub tag: DeclarationTag,
}

/// Terminal of a name lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// A top-level declaration (the first of its merged symbol).
    Local(DeclId),
    /// The namespace object of a whole module.
    Namespace(ModuleId),
    External(ExternalRef),
    Unresolved,
}

enum Lookup {
    Found(Resolution),
    NotFound,
    Cycle,
}

/// Linker tables of one module.
#[derive(Debug)]
pub struct ModuleScope {
    pub module: ModuleId,
    pub path: String,
    pub symbols: IndexMap<String, SmallVec<[DeclId; 1]>>,
    pub imports: IndexMap<String, ImportBinding>,
    pub exports: IndexMap<String, ExportEntry>,
    pub star_exports: Vec<ModuleRef>,
    pub export_assignment: Option<String>,
    /// Internal modules this module imports from or re-exports.
    pub dependencies: IndexSet<ModuleId>,
}

impl ModuleScope {
    fn new(module: ModuleId, path: &str) -> Self {
        Self {
            module,
            path: path.to_string(),
            symbols: IndexMap::new(),
            imports: IndexMap::new(),
            exports: IndexMap::new(),
            star_exports: Vec::new(),
            export_assignment: None,
            dependencies: IndexSet::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SurfaceEntry {
    pub name: String,
    pub resolution: Resolution,
}

/// Everything a module exports, in deterministic order.
#[derive(Debug, Clone, Default)]
pub struct ExportSurface {
    pub entries: Vec<SurfaceEntry>,
    /// `export * from "lib"` sources reached from this module.
    pub external_stars: Vec<String>,
}

impl ExportSurface {
    pub fn get(&self, name: &str) -> Option<&Resolution> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.resolution)
    }
}

/// Statistics about the linked modules.
#[derive(Debug, Clone, Default)]
pub struct ModuleGraphStats {
    pub modules: usize,
    pub declarations: usize,
    pub imports: usize,
    pub exports: usize,
    pub star_exports: usize,
    pub external_specifiers: usize,
}

/// Linker over all units of a store.
#[derive(Debug)]
pub struct ModuleGraph {
    scopes: Vec<ModuleScope>,
    by_path: FxHashMap<String, ModuleId>,
    decls: FxHashMap<DeclId, DeclInfo>,
    max_depth: u32,
    star_conflict: StarExportConflict,
}

impl ModuleGraph {
    #[tracing::instrument(level = "debug", skip_all, fields(modules = store.len()))]
    pub fn build(store: &UnitStore, options: &BundleOptions) -> Self {
        let mut graph = ModuleGraph {
            scopes: Vec::with_capacity(store.len()),
            by_path: FxHashMap::default(),
            decls: FxHashMap::default(),
            max_depth: options.max_reexport_depth,
            star_conflict: options.star_export_conflict,
        };
        for unit in store.iter() {
            let scope = graph.link_unit(store, unit);
            graph.by_path.insert(unit.id.clone(), unit.module);
            graph.scopes.push(scope);
        }
        debug!(stats = ?graph.stats(), "linked modules");
        graph
    }

    fn link_unit(&mut self, store: &UnitStore, unit: &DeclarationUnit) -> ModuleScope {
        let mut scope = ModuleScope::new(unit.module, &unit.id);
        let classify = |specifier: &str| match store.lookup(specifier) {
            Some(module) => ModuleRef::Internal(module),
            None => ModuleRef::External(specifier.to_string()),
        };

        for statement in &unit.statements {
            match statement {
                Statement::Declaration(decl) => {
                    let tag = decl.tag();
                    if let DeclarationKind::Variable(vars) = &decl.kind {
                        for declarator in &vars.declarations {
                            self.add_symbol(&mut scope, &declarator.name, declarator.id, tag);
                            if decl.is_exported() {
                                scope
                                    .exports
                                    .entry(declarator.name.clone())
                                    .or_insert_with(|| ExportEntry::Local {
                                        local: declarator.name.clone(),
                                    });
                            }
                        }
                        continue;
                    }

                    let name = decl
                        .name()
                        .map(str::to_string)
                        .unwrap_or_else(|| default_export_name(&unit.id));
                    self.add_symbol(&mut scope, &name, decl.id, tag);
                    if decl.is_default_export() {
                        scope
                            .exports
                            .entry("default".to_string())
                            .or_insert(ExportEntry::Local { local: name });
                    } else if decl.is_exported() {
                        scope
                            .exports
                            .entry(name.clone())
                            .or_insert(ExportEntry::Local { local: name });
                    }
                }
                Statement::Import(import) => {
                    let source = classify(&import.source);
                    if let ModuleRef::Internal(module) = &source {
                        scope.dependencies.insert(*module);
                    }
                    for (local, remote) in import.bindings() {
                        scope.imports.insert(
                            local.to_string(),
                            ImportBinding {
                                source: source.clone(),
                                imported: ImportedName::from_remote(remote),
                            },
                        );
                    }
                }
                Statement::Export(export) => {
                    let source = export.source.as_deref().map(classify);
                    if let Some(ModuleRef::Internal(module)) = &source {
                        scope.dependencies.insert(*module);
                    }
                    for specifier in &export.specifiers {
                        let entry = match &source {
                            None => ExportEntry::Local {
                                local: specifier.local.clone(),
                            },
                            Some(source) => ExportEntry::ReExport {
                                source: source.clone(),
                                imported: ImportedName::from_remote(&specifier.local),
                            },
                        };
                        scope
                            .exports
                            .entry(specifier.exported.clone())
                            .or_insert(entry);
                    }
                }
                Statement::ExportAll(all) => {
                    let source = classify(&all.source);
                    if let ModuleRef::Internal(module) = &source {
                        scope.dependencies.insert(*module);
                    }
                    match &all.alias {
                        Some(alias) => {
                            scope
                                .exports
                                .entry(alias.clone())
                                .or_insert(ExportEntry::ReExport {
                                    source,
                                    imported: ImportedName::Namespace,
                                });
                        }
                        None => scope.star_exports.push(source),
                    }
                }
                Statement::ExportDefault(default) => {
                    scope
                        .exports
                        .entry("default".to_string())
                        .or_insert(ExportEntry::Local {
                            local: default.expression.clone(),
                        });
                }
                Statement::ExportAssignment(assignment) => {
                    scope.export_assignment = Some(assignment.expression.clone());
                }
                Statement::Opaque(_) => {}
            }
        }

        trace!(
            module = %scope.path,
            symbols = scope.symbols.len(),
            exports = scope.exports.len(),
            "linked module"
        );
        scope
    }

    fn add_symbol(&mut self, scope: &mut ModuleScope, name: &str, id: DeclId, tag: DeclarationTag) {
        scope.symbols.entry(name.to_string()).or_default().push(id);
        self.decls.insert(
            id,
            DeclInfo {
                module: scope.module,
                name: name.to_string(),
                tag,
            },
        );
    }

    pub fn scope(&self, module: ModuleId) -> Option<&ModuleScope> {
        self.scopes.get(module.index())
    }

    pub fn scopes(&self) -> &[ModuleScope] {
        &self.scopes
    }

    /// Module with the given path, if it is part of the store.
    pub fn lookup(&self, path: &str) -> Option<ModuleId> {
        self.by_path.get(path).copied()
    }

    pub fn module_path(&self, module: ModuleId) -> &str {
        self.scope(module).map(|s| s.path.as_str()).unwrap_or("")
    }

    pub fn decl(&self, id: DeclId) -> Option<&DeclInfo> {
        self.decls.get(&id)
    }

    /// All declarations merged with `id` under one top-level name, `id` included.
    pub fn symbol_decls(&self, id: DeclId) -> &[DeclId] {
        self.decls
            .get(&id)
            .and_then(|info| self.scope(info.module)?.symbols.get(&info.name))
            .map(|decls| decls.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_import(&self, module: ModuleId, name: &str) -> bool {
        self.scope(module)
            .is_some_and(|scope| scope.imports.contains_key(name))
    }

    /// Resolve a name as used inside `module`: its own top-level symbols
    /// first, then its import bindings, followed to their terminal.
    ///
    /// Free names that are neither resolve to `Unresolved` silently; broken
    /// import chains and cycles are reported.
    pub fn resolve_local(
        &self,
        module: ModuleId,
        name: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Resolution {
        let mut path = Vec::new();
        match self.lookup_local(module, name, &mut path) {
            Lookup::Found(resolution) => resolution,
            Lookup::NotFound => {
                if let Some(binding) = self.scope(module).and_then(|s| s.imports.get(name)) {
                    let source = match &binding.source {
                        ModuleRef::Internal(target) => self.module_path(*target).to_string(),
                        ModuleRef::External(specifier) => specifier.clone(),
                    };
                    diagnostics.push(Diagnostic::error(
                        self.module_path(module),
                        format_message(
                            messages::UNRESOLVED_IMPORT,
                            &[binding.imported.as_str(), &source],
                        ),
                        codes::UNRESOLVED_IMPORT,
                    ));
                }
                Resolution::Unresolved
            }
            Lookup::Cycle => {
                diagnostics.push(self.cycle_diagnostic(module, name));
                Resolution::Unresolved
            }
        }
    }

    /// Resolve `name` as exported by `module`, following re-export chains
    /// through explicit exports and then `export *` sources. `default` is
    /// never forwarded by `export *`.
    pub fn resolve_export(
        &self,
        module: ModuleId,
        name: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Resolution {
        let mut path = Vec::new();
        match self.lookup_export(module, name, &mut path) {
            Lookup::Found(resolution) => resolution,
            Lookup::NotFound => Resolution::Unresolved,
            Lookup::Cycle => {
                diagnostics.push(self.cycle_diagnostic(module, name));
                Resolution::Unresolved
            }
        }
    }

    fn cycle_diagnostic(&self, module: ModuleId, name: &str) -> Diagnostic {
        debug!(module = %self.module_path(module), name, "re-export cycle");
        Diagnostic::error(
            self.module_path(module),
            format_message(messages::REEXPORT_CYCLE, &[name]),
            codes::REEXPORT_CYCLE,
        )
    }

    fn lookup_local(
        &self,
        module: ModuleId,
        name: &str,
        path: &mut Vec<(ModuleId, String)>,
    ) -> Lookup {
        let Some(scope) = self.scope(module) else {
            return Lookup::NotFound;
        };
        if let Some(decls) = scope.symbols.get(name) {
            return Lookup::Found(Resolution::Local(decls[0]));
        }
        match scope.imports.get(name) {
            Some(binding) => self.follow(&binding.source, &binding.imported, path),
            None => Lookup::NotFound,
        }
    }

    fn lookup_export(
        &self,
        module: ModuleId,
        name: &str,
        path: &mut Vec<(ModuleId, String)>,
    ) -> Lookup {
        if path.len() as u32 >= self.max_depth
            || path.iter().any(|(m, n)| *m == module && n == name)
        {
            return Lookup::Cycle;
        }
        let Some(scope) = self.scope(module) else {
            return Lookup::NotFound;
        };

        path.push((module, name.to_string()));
        let result = match scope.exports.get(name) {
            Some(ExportEntry::Local { local }) => self.lookup_local(module, local, path),
            Some(ExportEntry::ReExport { source, imported }) => self.follow(source, imported, path),
            None if name != "default" => self.lookup_star(scope, name, path),
            None => Lookup::NotFound,
        };
        path.pop();
        result
    }

    fn follow(
        &self,
        source: &ModuleRef,
        imported: &ImportedName,
        path: &mut Vec<(ModuleId, String)>,
    ) -> Lookup {
        match (source, imported) {
            (ModuleRef::External(specifier), _) => Lookup::Found(Resolution::External(ExternalRef {
                specifier: specifier.clone(),
                imported: imported.clone(),
            })),
            (ModuleRef::Internal(module), ImportedName::Namespace) => {
                Lookup::Found(Resolution::Namespace(*module))
            }
            (ModuleRef::Internal(module), ImportedName::Default) => {
                self.lookup_export(*module, "default", path)
            }
            (ModuleRef::Internal(module), ImportedName::Named(name)) => {
                self.lookup_export(*module, name, path)
            }
        }
    }

    /// Star sources in policy order. A cycle through stars only means this
    /// branch does not provide the name.
    fn lookup_star(
        &self,
        scope: &ModuleScope,
        name: &str,
        path: &mut Vec<(ModuleId, String)>,
    ) -> Lookup {
        let mut sources: Vec<&ModuleRef> = scope.star_exports.iter().collect();
        if self.star_conflict == StarExportConflict::PreferLast {
            sources.reverse();
        }
        for source in sources {
            let ModuleRef::Internal(module) = source else {
                continue;
            };
            if let Lookup::Found(resolution) = self.lookup_export(*module, name, path) {
                return Lookup::Found(resolution);
            }
        }
        Lookup::NotFound
    }

    /// The full export surface of `module`: explicit exports in source order,
    /// then names provided by `export *` sources, source by source.
    ///
    /// When two star sources provide different bindings under one name, the
    /// `StarExportConflict` winner keeps the name and every other one is
    /// exported as `name_$n`, with a warning.
    pub fn export_surface(&self, module: ModuleId, diagnostics: &mut Vec<Diagnostic>) -> ExportSurface {
        let mut stack = vec![module];
        self.surface_of(module, &mut stack, diagnostics)
    }

    fn surface_of(
        &self,
        module: ModuleId,
        stack: &mut Vec<ModuleId>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> ExportSurface {
        let Some(scope) = self.scope(module) else {
            return ExportSurface::default();
        };

        let mut entries: IndexMap<String, Resolution> = IndexMap::new();
        for name in scope.exports.keys() {
            let resolution = self.resolve_export(module, name, diagnostics);
            if resolution == Resolution::Unresolved {
                diagnostics.push(Diagnostic::error(
                    &scope.path,
                    format_message(messages::UNRESOLVED_EXPORT, &[name]),
                    codes::UNRESOLVED_EXPORT,
                ));
            }
            entries.insert(name.clone(), resolution);
        }

        let mut external_stars: IndexSet<String> = IndexSet::new();
        let mut candidates: IndexMap<String, Vec<Resolution>> = IndexMap::new();
        for source in &scope.star_exports {
            let target = match source {
                ModuleRef::External(specifier) => {
                    external_stars.insert(specifier.clone());
                    continue;
                }
                ModuleRef::Internal(target) => *target,
            };
            if stack.contains(&target) {
                continue;
            }
            stack.push(target);
            let inner = self.surface_of(target, stack, diagnostics);
            stack.pop();

            external_stars.extend(inner.external_stars);
            for entry in inner.entries {
                if entry.name == "default"
                    || entry.resolution == Resolution::Unresolved
                    || entries.contains_key(&entry.name)
                {
                    continue;
                }
                let provided = candidates.entry(entry.name).or_default();
                if !provided.contains(&entry.resolution) {
                    provided.push(entry.resolution);
                }
            }
        }

        let taken: Vec<String> = candidates.keys().cloned().collect();
        for (name, mut provided) in candidates {
            if self.star_conflict == StarExportConflict::PreferLast {
                provided.reverse();
            }
            let mut provided = provided.into_iter();
            if let Some(winner) = provided.next() {
                entries.insert(name.clone(), winner);
            }
            for loser in provided {
                let renamed = suffixed_name(&name, |candidate| {
                    entries.contains_key(candidate) || taken.iter().any(|t| t == candidate)
                });
                diagnostics.push(Diagnostic::warning(
                    &scope.path,
                    format_message(messages::AMBIGUOUS_STAR_EXPORT, &[&name, &renamed]),
                    codes::AMBIGUOUS_STAR_EXPORT,
                ));
                entries.insert(renamed, loser);
            }
        }

        ExportSurface {
            entries: entries
                .into_iter()
                .map(|(name, resolution)| SurfaceEntry { name, resolution })
                .collect(),
            external_stars: external_stars.into_iter().collect(),
        }
    }

    /// Internal modules `module` depends on through import/export statements.
    pub fn dependencies(&self, module: ModuleId) -> impl Iterator<Item = ModuleId> + '_ {
        self.scope(module)
            .into_iter()
            .flat_map(|scope| scope.dependencies.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn stats(&self) -> ModuleGraphStats {
        let mut stats = ModuleGraphStats {
            modules: self.scopes.len(),
            declarations: self.decls.len(),
            ..Default::default()
        };
        let mut external = IndexSet::new();
        for scope in &self.scopes {
            stats.imports += scope.imports.len();
            stats.exports += scope.exports.len();
            stats.star_exports += scope.star_exports.len();
            for binding in scope.imports.values() {
                if let ModuleRef::External(specifier) = &binding.source {
                    external.insert(specifier.as_str());
                }
            }
        }
        stats.external_specifiers = external.len();
        stats
    }
}

/// PascalCase identifier derived from a module path: `src/my-lib.d.ts` -> `MyLib`.
pub fn module_stem(path: &str) -> String {
    let file = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
    let stem = file.split('.').next().unwrap_or(file);
    stem.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect()
}

/// Name given to an anonymous `export default class/function` of a module.
pub fn default_export_name(path: &str) -> String {
    format!("default{}Export", module_stem(path))
}

#[cfg(test)]
#[path = "../tests/graph.rs"]
mod tests;
