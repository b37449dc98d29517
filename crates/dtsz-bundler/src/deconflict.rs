//! Lexical Deconflicter.
//!
//! Walks the surviving modules as if they were concatenated into one file
//! and gives every binding a final name that is unique in the shared output
//! scope. A name already bound by an earlier module (or reserved as a global)
//! is never reused: the later binding becomes `name_$0`, `name_$1`, ...
//!
//! The walk has two phases over the same module order:
//! 1. top-level bindings, import-introduced synthetic bindings (external
//!    imports, materialized namespaces, default aliases) in statement order;
//! 2. nested bindings (type parameters, `infer`, mapped-type keys) and the
//!    rewriting of every reference to its final binding, so references to
//!    declarations of later modules are rewritten too.

use crate::graph::{ExportEntry, ExternalRef, ImportedName, ModuleGraph, Resolution, module_stem};
use crate::lexical_env::LexicalEnvironment;
use crate::reference_graph::Reachability;
use crate::references::{self, Reference, infer_names};
use crate::tree_shaker::ShakenModule;
use dtsz_common::Diagnostic;
use dtsz_syntax::{
    DeclId, Declaration, DeclarationKind, EntityName, ExportDeclaration, ExportSpecifier,
    HeritageType, IdAllocator, Member, Modifiers, ModuleId, OpaqueToken, Parameter, PropertyName,
    Statement, TypeNode, TypeParameter,
};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use tracing::{debug, trace};

/// Final name of a top-level binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundName {
    /// Originating module; `None` for bindings not tied to one module.
    #[serde(skip)]
    pub module: Option<ModuleId>,
    pub original: String,
    pub name: String,
}

impl BoundName {
    pub fn is_renamed(&self) -> bool {
        self.original != self.name
    }
}

/// Declaration identity -> final name. Populated once per identity.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BindingMap {
    top_level: IndexMap<DeclId, BoundName>,
    nested: FxHashMap<DeclId, String>,
    /// Merged symbols share one binding: (module, original name) -> final name.
    symbols: FxHashMap<(ModuleId, String), String>,
}

impl BindingMap {
    pub fn get(&self, id: DeclId) -> Option<&str> {
        self.top_level
            .get(&id)
            .map(|b| b.name.as_str())
            .or_else(|| self.nested.get(&id).map(String::as_str))
    }

    pub fn bound(&self, id: DeclId) -> Option<&BoundName> {
        self.top_level.get(&id)
    }

    /// Final name of the top-level symbol `original` declared in `module`.
    pub fn symbol(&self, module: ModuleId, original: &str) -> Option<&str> {
        self.symbols
            .get(&(module, original.to_string()))
            .map(String::as_str)
    }

    /// Top-level bindings in binding order.
    pub fn top_level(&self) -> impl Iterator<Item = (DeclId, &BoundName)> {
        self.top_level.iter().map(|(id, bound)| (*id, bound))
    }

    pub fn nested_len(&self) -> usize {
        self.nested.len()
    }

    pub fn renamed_count(&self) -> usize {
        self.top_level.values().filter(|b| b.is_renamed()).count()
    }

    fn insert_top_level(&mut self, id: DeclId, bound: BoundName) {
        self.top_level.entry(id).or_insert(bound);
    }

    fn insert_nested(&mut self, id: DeclId, name: &str) {
        if !id.is_none() {
            self.nested.entry(id).or_insert_with(|| name.to_string());
        }
    }
}

/// A `declare const X: typeof T` / `type X = T` alias for a default import
/// the entry module re-exports under its local name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultAlias {
    pub id: DeclId,
    pub terminal: DeclId,
}

/// Bindings that exist in the output without a declaration in any module.
#[derive(Debug, Default, Clone)]
pub struct SyntheticBindings {
    pub externals: IndexMap<ExternalRef, DeclId>,
    pub namespaces: IndexMap<ModuleId, DeclId>,
    /// Keyed by (entry module, local import name).
    pub aliases: IndexMap<(ModuleId, String), DefaultAlias>,
}

/// Result of the deconfliction walk.
#[derive(Debug)]
pub struct Deconflicted {
    pub modules: Vec<ShakenModule>,
    pub bindings: BindingMap,
    pub synthetic: SyntheticBindings,
    pub ids: IdAllocator,
}

impl Deconflicted {
    /// Final name standing for a linker resolution in the bundle.
    pub fn resolved_name(&self, graph: &ModuleGraph, resolution: &Resolution) -> Option<&str> {
        resolved_name(&self.bindings, &self.synthetic, graph, resolution)
    }
}

pub(crate) fn resolved_name<'b>(
    bindings: &'b BindingMap,
    synthetic: &SyntheticBindings,
    graph: &ModuleGraph,
    resolution: &Resolution,
) -> Option<&'b str> {
    match resolution {
        Resolution::Local(id) => {
            let info = graph.decl(*id)?;
            bindings.symbol(info.module, &info.name)
        }
        Resolution::Namespace(module) => bindings.get(*synthetic.namespaces.get(module)?),
        Resolution::External(external) => bindings.get(*synthetic.externals.get(external)?),
        Resolution::Unresolved => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Space {
    Type,
    Value,
    Both,
}

impl Space {
    fn covers(self, use_site: Space) -> bool {
        self == Space::Both || use_site == Space::Both || self == use_site
    }
}

struct Local {
    original: String,
    name: String,
    space: Space,
}

pub struct Deconflicter<'a> {
    graph: &'a ModuleGraph,
    reach: &'a Reachability,
    entry: ModuleId,
    env: LexicalEnvironment,
    bindings: BindingMap,
    synthetic: SyntheticBindings,
    ids: IdAllocator,
    locals: Vec<Vec<Local>>,
    /// Lookups here repeat ones already reported while building the graph.
    scratch: Vec<Diagnostic>,
}

impl<'a> Deconflicter<'a> {
    pub fn new(
        graph: &'a ModuleGraph,
        reach: &'a Reachability,
        entry: ModuleId,
        ids: IdAllocator,
    ) -> Self {
        Self {
            graph,
            reach,
            entry,
            env: LexicalEnvironment::new(),
            bindings: BindingMap::default(),
            synthetic: SyntheticBindings::default(),
            ids,
            locals: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Reserve names before the walk so no binding captures them.
    pub fn reserve<'n>(&mut self, names: impl IntoIterator<Item = &'n str>) {
        for name in names {
            self.env.reserve(name);
        }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(modules = modules.len()))]
    pub fn run(mut self, mut modules: Vec<ShakenModule>) -> Deconflicted {
        for module in &modules {
            self.bind_module(module);
        }
        self.bind_unpositioned();

        for module in &mut modules {
            for statement in &mut module.statements {
                self.rewrite_statement(module.module, statement);
            }
        }

        debug!(
            bindings = self.bindings.top_level.len(),
            renamed = self.bindings.renamed_count(),
            nested = self.bindings.nested_len(),
            "deconflicted"
        );
        Deconflicted {
            modules,
            bindings: self.bindings,
            synthetic: self.synthetic,
            ids: self.ids,
        }
    }

    // -------------------------------------------------------------------------
    // Phase 1: top-level bindings
    // -------------------------------------------------------------------------

    fn bind_module(&mut self, module: &ShakenModule) {
        for statement in &module.statements {
            match statement {
                Statement::Declaration(decl) => match &decl.kind {
                    DeclarationKind::Variable(vars) => {
                        for declarator in &vars.declarations {
                            self.bind_top_level(module.module, declarator.id, &declarator.name);
                        }
                    }
                    _ => {
                        let name = match decl.name() {
                            Some(name) => name.to_string(),
                            None => match self.graph.decl(decl.id) {
                                Some(info) => info.name.clone(),
                                None => continue,
                            },
                        };
                        self.bind_top_level(module.module, decl.id, &name);
                    }
                },
                Statement::Import(import) => {
                    for (local, imported) in import.bindings() {
                        self.bind_import(module.module, local, imported);
                    }
                }
                Statement::Export(export) if export.source.is_some() => {
                    for specifier in &export.specifiers {
                        let resolution = self.graph.resolve_export(
                            module.module,
                            &specifier.exported,
                            &mut self.scratch,
                        );
                        let preferred = match ImportedName::from_remote(&specifier.local) {
                            ImportedName::Named(name) => name,
                            _ => specifier.exported.clone(),
                        };
                        self.bind_synthetic(module.module, &resolution, &preferred);
                    }
                }
                Statement::ExportAll(all) => {
                    if let Some(alias) = &all.alias {
                        let resolution =
                            self.graph
                                .resolve_export(module.module, alias, &mut self.scratch);
                        self.bind_synthetic(module.module, &resolution, alias);
                    }
                }
                _ => {}
            }
        }
    }

    fn bind_top_level(&mut self, module: ModuleId, id: DeclId, original: &str) {
        let key = (module, original.to_string());
        let name = match self.bindings.symbols.get(&key) {
            Some(name) => name.clone(),
            None => {
                let name = self.env.bind_unique(original, Some(module));
                if name != original {
                    debug!(
                        module = %self.graph.module_path(module),
                        from = original,
                        to = %name,
                        "renamed colliding binding"
                    );
                }
                self.bindings.symbols.insert(key, name.clone());
                name
            }
        };
        self.bindings.insert_top_level(
            id,
            BoundName {
                module: Some(module),
                original: original.to_string(),
                name,
            },
        );
    }

    fn bind_import(&mut self, module: ModuleId, local: &str, imported: &str) {
        let resolution = self.graph.resolve_local(module, local, &mut self.scratch);
        if let Resolution::Local(terminal) = resolution {
            // Importing a default under the terminal's own name needs no alias:
            // the clause exports the terminal's binding directly.
            let keeps_name = self
                .graph
                .decl(terminal)
                .is_some_and(|info| info.name == local);
            if imported == "default"
                && !keeps_name
                && module == self.entry
                && self.reach.contains(terminal)
                && self.entry_reexports_local(local)
            {
                let key = (module, local.to_string());
                if !self.synthetic.aliases.contains_key(&key) {
                    let id = self.alloc_binding(Some(module), local);
                    self.synthetic
                        .aliases
                        .insert(key, DefaultAlias { id, terminal });
                }
            }
            return;
        }
        self.bind_synthetic(module, &resolution, local);
    }

    fn entry_reexports_local(&self, local: &str) -> bool {
        self.graph.scope(self.entry).is_some_and(|scope| {
            scope
                .exports
                .values()
                .any(|entry| matches!(entry, ExportEntry::Local { local: l } if l == local))
        })
    }

    /// Bind a reachable external import or namespace object at the position
    /// of the statement introducing it, under the name that statement uses.
    fn bind_synthetic(&mut self, module: ModuleId, resolution: &Resolution, preferred: &str) {
        match resolution {
            Resolution::External(external) => {
                if self.reach.imports.contains(external)
                    && !self.synthetic.externals.contains_key(external)
                {
                    let id = self.alloc_binding(Some(module), preferred);
                    self.synthetic.externals.insert(external.clone(), id);
                }
            }
            Resolution::Namespace(target) => {
                if self.reach.namespaces.contains(target)
                    && !self.synthetic.namespaces.contains_key(target)
                {
                    let id = self.alloc_binding(Some(module), preferred);
                    self.synthetic.namespaces.insert(*target, id);
                }
            }
            Resolution::Local(_) | Resolution::Unresolved => {}
        }
    }

    /// Reachable externals and namespaces no statement introduced by name,
    /// e.g. ones only reached through `import("m")` types.
    fn bind_unpositioned(&mut self) {
        let externals: Vec<ExternalRef> = self
            .reach
            .imports
            .iter()
            .filter(|e| !self.synthetic.externals.contains_key(*e))
            .cloned()
            .collect();
        for external in externals {
            let preferred = match &external.imported {
                ImportedName::Named(name) => name.clone(),
                ImportedName::Default | ImportedName::Namespace => {
                    lower_first(&module_stem(&external.specifier))
                }
            };
            let id = self.alloc_binding(None, &preferred);
            self.synthetic.externals.insert(external, id);
        }

        let namespaces: Vec<ModuleId> = self
            .reach
            .namespaces
            .iter()
            .filter(|m| !self.synthetic.namespaces.contains_key(*m))
            .copied()
            .collect();
        for module in namespaces {
            let preferred = lower_first(&module_stem(self.graph.module_path(module)));
            let id = self.alloc_binding(Some(module), &preferred);
            self.synthetic.namespaces.insert(module, id);
        }
    }

    fn alloc_binding(&mut self, module: Option<ModuleId>, preferred: &str) -> DeclId {
        let id = self.ids.alloc();
        let preferred = if preferred.is_empty() { "ns" } else { preferred };
        let name = self.env.bind_unique(preferred, module);
        trace!(preferred, name = %name, "bound synthetic binding");
        self.bindings.insert_top_level(
            id,
            BoundName {
                module,
                original: preferred.to_string(),
                name,
            },
        );
        id
    }

    // -------------------------------------------------------------------------
    // Phase 2: nested bindings and reference rewriting
    // -------------------------------------------------------------------------

    fn rewrite_statement(&mut self, module: ModuleId, statement: &mut Statement) {
        match statement {
            Statement::Declaration(decl) => {
                self.rename_top_level(module, decl);
                self.rewrite_declaration(module, decl);
            }
            Statement::Opaque(opaque) => self.rewrite_tokens(module, &mut opaque.tokens),
            // Module plumbing; consumed by the merger, never emitted.
            Statement::Import(_)
            | Statement::Export(_)
            | Statement::ExportAll(_)
            | Statement::ExportDefault(_)
            | Statement::ExportAssignment(_) => {}
        }
    }

    fn rename_top_level(&mut self, module: ModuleId, decl: &mut Declaration) {
        if let DeclarationKind::Variable(vars) = &mut decl.kind {
            for declarator in &mut vars.declarations {
                if let Some(name) = self.bindings.get(declarator.id) {
                    if name != declarator.name {
                        declarator.name = name.to_string();
                    }
                }
            }
            return;
        }
        match self.bindings.get(decl.id) {
            Some(name) if decl.name() != Some(name) => {
                let name = name.to_string();
                decl.set_name(&name);
            }
            Some(_) => {}
            None => trace!(module = module.0, decl = decl.id.0, "declaration without binding"),
        }
    }

    fn rewrite_declaration(&mut self, module: ModuleId, decl: &mut Declaration) {
        let captured = if matches!(decl.kind, DeclarationKind::Namespace(_)) {
            self.outer_names(module, decl)
        } else {
            FxHashSet::default()
        };
        match &mut decl.kind {
            DeclarationKind::Interface(iface) => {
                self.enter_type_parameters(module, &mut iface.type_parameters);
                for heritage in &mut iface.extends {
                    self.rewrite_heritage(module, heritage, Space::Type);
                }
                self.rewrite_members(module, &mut iface.members);
                self.exit_scope();
            }
            DeclarationKind::Class(class) => {
                if let Some(heritage) = &mut class.extends {
                    self.rewrite_entity(module, &mut heritage.expression, Space::Value);
                }
                self.enter_type_parameters(module, &mut class.type_parameters);
                if let Some(heritage) = &mut class.extends {
                    self.rewrite_types(module, &mut heritage.type_arguments);
                }
                for heritage in &mut class.implements {
                    self.rewrite_heritage(module, heritage, Space::Type);
                }
                self.rewrite_members(module, &mut class.members);
                self.exit_scope();
            }
            DeclarationKind::Function(function) => {
                self.enter_signature(
                    module,
                    &mut function.type_parameters,
                    &mut function.parameters,
                );
                if let Some(ret) = &mut function.return_type {
                    self.rewrite_type(module, ret);
                }
                self.exit_scope();
            }
            DeclarationKind::Variable(vars) => {
                for declarator in &mut vars.declarations {
                    if let Some(ty) = &mut declarator.type_annotation {
                        self.rewrite_type(module, ty);
                    }
                }
            }
            DeclarationKind::Enum(_) => {}
            DeclarationKind::TypeAlias(alias) => {
                self.enter_type_parameters(module, &mut alias.type_parameters);
                self.rewrite_type(module, &mut alias.target);
                self.exit_scope();
            }
            DeclarationKind::Namespace(namespace) => {
                self.rewrite_namespace_body(module, &mut namespace.body, &captured);
            }
        }
    }

    /// Body members are scoped under the namespace name and keep their
    /// names, except members sharing a final name in `captured`: those would
    /// capture references the body makes to outer bindings and are renamed in
    /// the body's scope, re-exported under their original name when they
    /// were exported.
    fn rewrite_namespace_body(
        &mut self,
        module: ModuleId,
        body: &mut Vec<Statement>,
        captured: &FxHashSet<String>,
    ) {
        self.env.push_scope();
        let members: Vec<String> = body.iter().flat_map(declared_names).collect();
        for name in members.iter().filter(|name| !captured.contains(*name)) {
            self.env.reserve_in_scope(name);
        }

        let mut renamed: IndexMap<String, String> = IndexMap::new();
        let mut scope = Vec::with_capacity(members.len());
        for original in members {
            let name = if captured.contains(&original) {
                match renamed.get(&original) {
                    Some(name) => name.clone(),
                    None => {
                        let name = self.env.bind_unique(&original, Some(module));
                        debug!(from = %original, to = %name, "renamed shadowing namespace member");
                        renamed.insert(original.clone(), name.clone());
                        name
                    }
                }
            } else {
                original.clone()
            };
            scope.push(Local {
                original,
                name,
                space: Space::Both,
            });
        }
        self.locals.push(scope);

        for statement in body.iter_mut() {
            self.rewrite_namespace_statement(module, statement);
        }
        if !renamed.is_empty() {
            self.rename_members(body, &renamed);
        }
        self.exit_scope();
    }

    /// Final names of the outer bindings a namespace's body references.
    fn outer_names(&mut self, module: ModuleId, namespace: &Declaration) -> FxHashSet<String> {
        let analysis = references::analyze_declaration(namespace);
        let mut names = FxHashSet::default();
        for reference in &analysis.references {
            let name = match reference {
                Reference::Name(name) => self.resolve_name(module, name, Space::Both),
                Reference::ImportType {
                    specifier,
                    qualifier,
                } => self.import_type_name(specifier, qualifier.as_deref()),
            };
            names.extend(name);
        }
        names
    }

    fn import_type_name(&mut self, specifier: &str, qualifier: Option<&str>) -> Option<String> {
        let target = self.graph.lookup(specifier)?;
        let resolution = match qualifier {
            Some(name) => self.graph.resolve_export(target, name, &mut self.scratch),
            None => Resolution::Namespace(target),
        };
        resolved_name(&self.bindings, &self.synthetic, self.graph, &resolution).map(str::to_string)
    }

    /// Apply member renames to the declarations of a namespace body. Renamed
    /// members lose `export` and are re-exported under their original names
    /// by one trailing `export { .. }`.
    fn rename_members(&mut self, body: &mut Vec<Statement>, renamed: &IndexMap<String, String>) {
        let mut reexports: Vec<ExportSpecifier> = Vec::new();
        let mut reexport = |local: &str, exported: &str| {
            if !reexports.iter().any(|s| s.exported == exported) {
                reexports.push(ExportSpecifier::new(local, exported));
            }
        };

        for statement in body.iter_mut() {
            match statement {
                Statement::Declaration(decl) => {
                    let exported = decl.is_exported();
                    if let DeclarationKind::Variable(vars) = &mut decl.kind {
                        if !vars.declarations.iter().any(|d| renamed.contains_key(&d.name)) {
                            continue;
                        }
                        for declarator in &mut vars.declarations {
                            let original = declarator.name.clone();
                            if let Some(name) = renamed.get(&original) {
                                declarator.name = name.clone();
                                self.bindings.insert_nested(declarator.id, name);
                            }
                            if exported {
                                reexport(&declarator.name, &original);
                            }
                        }
                    } else {
                        let Some(original) = decl.name().map(str::to_string) else {
                            continue;
                        };
                        let Some(name) = renamed.get(&original) else {
                            continue;
                        };
                        decl.set_name(name);
                        self.bindings.insert_nested(decl.id, name);
                        if exported {
                            reexport(name, &original);
                        }
                    }
                    if exported {
                        decl.modifiers.remove(Modifiers::EXPORT);
                    }
                }
                Statement::Import(import) => {
                    for local in import
                        .default
                        .iter_mut()
                        .chain(import.namespace.iter_mut())
                        .chain(import.named.iter_mut().map(|s| &mut s.local))
                    {
                        if let Some(name) = renamed.get(local.as_str()) {
                            *local = name.clone();
                        }
                    }
                }
                _ => {}
            }
        }

        if !reexports.is_empty() {
            body.push(Statement::Export(ExportDeclaration {
                specifiers: reexports,
                source: None,
                type_only: false,
            }));
        }
    }

    fn rewrite_namespace_statement(&mut self, module: ModuleId, statement: &mut Statement) {
        match statement {
            Statement::Declaration(decl) => self.rewrite_declaration(module, decl),
            Statement::Export(export) if export.source.is_none() => {
                for specifier in &mut export.specifiers {
                    if let Some(name) = self.resolve_name(module, &specifier.local, Space::Both) {
                        specifier.local = name;
                    }
                }
            }
            Statement::ExportDefault(default) => {
                if let Some(name) = self.resolve_name(module, &default.expression, Space::Both) {
                    default.expression = name;
                }
            }
            Statement::ExportAssignment(assignment) => {
                if let Some(name) = self.resolve_name(module, &assignment.expression, Space::Both)
                {
                    assignment.expression = name;
                }
            }
            Statement::Opaque(opaque) => self.rewrite_tokens(module, &mut opaque.tokens),
            Statement::Import(_) | Statement::Export(_) | Statement::ExportAll(_) => {}
        }
    }

    /// Push a scope and bind `params` in it, deconflicted against the whole
    /// chain, before rewriting their constraints and defaults.
    fn enter_type_parameters(&mut self, module: ModuleId, params: &mut [TypeParameter]) {
        self.env.push_scope();
        let mut scope = Vec::with_capacity(params.len());
        for param in params.iter_mut() {
            let name = self.env.bind_unique(&param.name, Some(module));
            self.bindings.insert_nested(param.id, &name);
            if name != param.name {
                debug!(from = %param.name, to = %name, "renamed type parameter");
            }
            scope.push(Local {
                original: std::mem::replace(&mut param.name, name.clone()),
                name,
                space: Space::Type,
            });
        }
        self.locals.push(scope);
        for param in params.iter_mut() {
            self.rewrite_type_parameter_types(module, param);
        }
    }

    fn enter_signature(
        &mut self,
        module: ModuleId,
        type_parameters: &mut [TypeParameter],
        parameters: &mut [Parameter],
    ) {
        self.enter_type_parameters(module, type_parameters);
        if let Some(scope) = self.locals.last_mut() {
            scope.extend(parameters.iter().map(|p| Local {
                original: p.name.clone(),
                name: p.name.clone(),
                space: Space::Value,
            }));
        }
        self.rewrite_parameters(module, parameters);
    }

    fn exit_scope(&mut self) {
        self.env.pop_scope();
        self.locals.pop();
    }

    fn rewrite_type_parameter_types(&mut self, module: ModuleId, param: &mut TypeParameter) {
        if let Some(constraint) = &mut param.constraint {
            self.rewrite_type(module, constraint);
        }
        if let Some(default) = &mut param.default {
            self.rewrite_type(module, default);
        }
    }

    fn rewrite_parameters(&mut self, module: ModuleId, parameters: &mut [Parameter]) {
        for param in parameters {
            if let Some(ty) = &mut param.type_annotation {
                self.rewrite_type(module, ty);
            }
        }
    }

    fn rewrite_heritage(&mut self, module: ModuleId, heritage: &mut HeritageType, space: Space) {
        self.rewrite_entity(module, &mut heritage.expression, space);
        self.rewrite_types(module, &mut heritage.type_arguments);
    }

    /// Final name for `name` used in `module`: the innermost local binding,
    /// else the final binding of whatever the linker resolves it to. `None`
    /// leaves the reference as written.
    fn resolve_name(&mut self, module: ModuleId, name: &str, space: Space) -> Option<String> {
        for scope in self.locals.iter().rev() {
            if let Some(local) = scope
                .iter()
                .rev()
                .find(|l| l.original == name && l.space.covers(space))
            {
                return Some(local.name.clone());
            }
        }
        let resolution = self.graph.resolve_local(module, name, &mut self.scratch);
        resolved_name(&self.bindings, &self.synthetic, self.graph, &resolution).map(str::to_string)
    }

    fn rewrite_entity(&mut self, module: ModuleId, entity: &mut EntityName, space: Space) {
        if let Some(name) = self.resolve_name(module, entity.root(), space) {
            if name != entity.root() {
                trace!(from = entity.root(), to = %name, "rewrote reference");
                entity.set_root(&name);
            }
        }
    }

    fn rewrite_tokens(&mut self, module: ModuleId, tokens: &mut [OpaqueToken]) {
        for token in tokens {
            if let OpaqueToken::Identifier { name } = token {
                if let Some(rewritten) = self.resolve_name(module, name, Space::Both) {
                    *name = rewritten;
                }
            }
        }
    }

    fn rewrite_property_name(&mut self, module: ModuleId, name: &mut PropertyName) {
        if let PropertyName::Computed { expression } = name {
            if expression.root() != "Symbol" {
                self.rewrite_entity(module, expression, Space::Value);
            }
        }
    }

    fn rewrite_members(&mut self, module: ModuleId, members: &mut [Member]) {
        for member in members {
            match member {
                Member::Property {
                    name,
                    type_annotation,
                    ..
                } => {
                    self.rewrite_property_name(module, name);
                    if let Some(ty) = type_annotation {
                        self.rewrite_type(module, ty);
                    }
                }
                Member::Method {
                    name,
                    type_parameters,
                    parameters,
                    return_type,
                    ..
                } => {
                    self.rewrite_property_name(module, name);
                    self.enter_signature(module, type_parameters, parameters);
                    if let Some(ret) = return_type {
                        self.rewrite_type(module, ret);
                    }
                    self.exit_scope();
                }
                Member::CallSignature {
                    type_parameters,
                    parameters,
                    return_type,
                }
                | Member::ConstructSignature {
                    type_parameters,
                    parameters,
                    return_type,
                } => {
                    self.enter_signature(module, type_parameters, parameters);
                    if let Some(ret) = return_type {
                        self.rewrite_type(module, ret);
                    }
                    self.exit_scope();
                }
                Member::IndexSignature {
                    parameters,
                    type_annotation,
                    ..
                } => {
                    self.rewrite_parameters(module, parameters);
                    self.rewrite_type(module, type_annotation);
                }
                Member::Constructor { parameters, .. } => {
                    self.rewrite_parameters(module, parameters)
                }
                Member::GetAccessor {
                    name, return_type, ..
                } => {
                    self.rewrite_property_name(module, name);
                    if let Some(ret) = return_type {
                        self.rewrite_type(module, ret);
                    }
                }
                Member::SetAccessor {
                    name, parameters, ..
                } => {
                    self.rewrite_property_name(module, name);
                    self.rewrite_parameters(module, parameters);
                }
            }
        }
    }

    fn rewrite_types(&mut self, module: ModuleId, types: &mut [TypeNode]) {
        for ty in types {
            self.rewrite_type(module, ty);
        }
    }

    fn rewrite_type(&mut self, module: ModuleId, ty: &mut TypeNode) {
        match ty {
            TypeNode::Keyword { .. } | TypeNode::Literal { .. } => {}
            TypeNode::Reference {
                name,
                type_arguments,
            } => {
                self.rewrite_entity(module, name, Space::Type);
                self.rewrite_types(module, type_arguments);
            }
            TypeNode::TypeQuery {
                name,
                type_arguments,
            } => {
                self.rewrite_entity(module, name, Space::Value);
                self.rewrite_types(module, type_arguments);
            }
            TypeNode::Array { element } => self.rewrite_type(module, element),
            TypeNode::Tuple { elements } => {
                for element in elements {
                    self.rewrite_type(module, &mut element.element);
                }
            }
            TypeNode::Union { types } | TypeNode::Intersection { types } => {
                self.rewrite_types(module, types)
            }
            TypeNode::Function {
                type_parameters,
                parameters,
                return_type,
            }
            | TypeNode::Constructor {
                type_parameters,
                parameters,
                return_type,
                ..
            } => {
                self.enter_signature(module, type_parameters, parameters);
                self.rewrite_type(module, return_type);
                self.exit_scope();
            }
            TypeNode::TypeLiteral { members } => self.rewrite_members(module, members),
            TypeNode::TypeOperator { target, .. } => self.rewrite_type(module, target),
            TypeNode::IndexedAccess { object, index } => {
                self.rewrite_type(module, object);
                self.rewrite_type(module, index);
            }
            TypeNode::Conditional {
                check,
                extends,
                true_type,
                false_type,
            } => {
                self.rewrite_type(module, check);
                self.env.push_scope();
                let mut scope = Vec::new();
                for original in infer_names(extends) {
                    let name = self.env.bind_unique(&original, Some(module));
                    scope.push(Local {
                        original,
                        name,
                        space: Space::Type,
                    });
                }
                self.locals.push(scope);
                self.rewrite_type(module, extends);
                self.rewrite_type(module, true_type);
                self.exit_scope();
                self.rewrite_type(module, false_type);
            }
            TypeNode::Infer { type_parameter } => {
                if let Some(name) = self.resolve_name(module, &type_parameter.name, Space::Type) {
                    self.bindings.insert_nested(type_parameter.id, &name);
                    type_parameter.name = name;
                }
                self.rewrite_type_parameter_types(module, type_parameter);
            }
            TypeNode::Mapped {
                type_parameter,
                name_type,
                target,
                ..
            } => {
                self.rewrite_type_parameter_types(module, type_parameter);
                self.env.push_scope();
                let name = self.env.bind_unique(&type_parameter.name, Some(module));
                self.bindings.insert_nested(type_parameter.id, &name);
                self.locals.push(vec![Local {
                    original: std::mem::replace(&mut type_parameter.name, name.clone()),
                    name,
                    space: Space::Type,
                }]);
                if let Some(name_type) = name_type {
                    self.rewrite_type(module, name_type);
                }
                if let Some(target) = target {
                    self.rewrite_type(module, target);
                }
                self.exit_scope();
            }
            TypeNode::Import {
                argument,
                qualifier,
                type_arguments,
                is_type_of,
            } => {
                self.rewrite_types(module, type_arguments);
                if let Some(inlined) =
                    self.inline_import_type(argument, qualifier.as_ref(), *is_type_of, type_arguments)
                {
                    *ty = inlined;
                }
            }
            TypeNode::Predicate { target, .. } => {
                if let Some(target) = target {
                    self.rewrite_type(module, target);
                }
            }
            TypeNode::Parenthesized { inner } => self.rewrite_type(module, inner),
            TypeNode::TemplateLiteral { spans, .. } => {
                for span in spans {
                    self.rewrite_type(module, &mut span.ty);
                }
            }
            TypeNode::Opaque { tokens } => self.rewrite_tokens(module, tokens),
        }
    }

    /// `import("./a").Foo<T>` of a bundled module becomes a plain reference to
    /// the final binding of `Foo`; `typeof import("./a")` becomes a query of
    /// the materialized namespace.
    fn inline_import_type(
        &mut self,
        argument: &str,
        qualifier: Option<&EntityName>,
        is_type_of: bool,
        type_arguments: &mut Vec<TypeNode>,
    ) -> Option<TypeNode> {
        let target = self.graph.lookup(argument)?;
        let resolution = match qualifier {
            Some(qualifier) => {
                self.graph
                    .resolve_export(target, qualifier.root(), &mut self.scratch)
            }
            None if is_type_of => Resolution::Namespace(target),
            None => return None,
        };
        let root = resolved_name(&self.bindings, &self.synthetic, self.graph, &resolution)?;

        let mut segments = vec![root.to_string()];
        if let Some(qualifier) = qualifier {
            segments.extend(qualifier.segments.iter().skip(1).cloned());
        }
        let name = EntityName { segments };
        let type_arguments = std::mem::take(type_arguments);
        Some(if is_type_of {
            TypeNode::TypeQuery {
                name,
                type_arguments,
            }
        } else {
            TypeNode::Reference {
                name,
                type_arguments,
            }
        })
    }
}

/// Names a namespace body statement declares.
fn declared_names(statement: &Statement) -> Vec<String> {
    match statement {
        Statement::Declaration(decl) => match &decl.kind {
            DeclarationKind::Variable(vars) => {
                vars.declarations.iter().map(|d| d.name.clone()).collect()
            }
            _ => decl.name().map(str::to_string).into_iter().collect(),
        },
        Statement::Import(import) => import.bindings().map(|(l, _)| l.to_string()).collect(),
        _ => Vec::new(),
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../tests/deconflict.rs"]
mod tests;
