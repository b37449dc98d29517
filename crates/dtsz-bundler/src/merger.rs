//! Module/Export Merger.
//!
//! Turns the entry module's export surface into the single export clause of
//! the bundle, using only final bindings: the linker has already followed
//! every re-export chain to its terminal, and the deconflicter has named that
//! terminal. Also synthesizes the declarations no module wrote itself:
//! aliases for re-exported default imports and one ambient namespace block
//! per materialized `import * as ns`.

use crate::deconflict::{BindingMap, DefaultAlias, SyntheticBindings, resolved_name};
use crate::graph::{ExportEntry, ModuleGraph, Resolution, SurfaceEntry};
use crate::normalize::ExportIntent;
use crate::tree_shaker::ShakenModule;
use dtsz_common::Diagnostic;
use dtsz_syntax::{
    DeclId, Declaration, DeclarationKind, DeclarationTag, ExportClause, ExportClauseEntry,
    ExportDeclaration, ExportSpecifier, IdAllocator, Modifiers, ModuleId, NamespaceDeclaration,
    Statement, TypeAliasDeclaration, TypeNode, TypeParameter, VariableDeclarator, VariableFlavor,
    VariableStatement,
};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Output of the merger.
#[derive(Debug, Default)]
pub struct Merged {
    pub export: ExportClause,
    /// Default aliases, then namespace blocks.
    pub statements: Vec<Statement>,
}

pub struct Merger<'a> {
    pub graph: &'a ModuleGraph,
    pub entry: ModuleId,
    /// The entry's export surface, already restricted to the required names.
    pub surface: &'a [SurfaceEntry],
    pub external_stars: &'a [String],
    pub modules: &'a [ShakenModule],
    pub bindings: &'a BindingMap,
    pub synthetic: &'a SyntheticBindings,
    pub intents: &'a [ExportIntent],
}

impl Merger<'_> {
    #[tracing::instrument(level = "debug", skip_all, fields(entries = self.surface.len()))]
    pub fn merge(&self, ids: &mut IdAllocator) -> Merged {
        let intents: FxHashMap<DeclId, &ExportIntent> =
            self.intents.iter().map(|i| (i.decl, i)).collect();

        let mut merged = Merged::default();
        for entry in self.surface {
            match self.clause_local(entry, &intents) {
                Some(local) => merged.export.entries.push(ExportClauseEntry {
                    local,
                    exported: entry.name.clone(),
                }),
                None => trace!(name = %entry.name, "export without a binding in the bundle"),
            }
        }
        merged.export.assignment = self.export_assignment();
        merged.export.external_stars = self.external_stars.to_vec();

        for ((_, local), alias) in &self.synthetic.aliases {
            merged.statements.extend(self.alias_declarations(local, alias, ids));
        }
        for (&module, &id) in &self.synthetic.namespaces {
            if let Some(block) = self.namespace_block(module, id, ids) {
                merged.statements.push(block);
            }
        }

        debug!(
            exports = merged.export.entries.len(),
            synthetic = merged.statements.len(),
            "merged exports"
        );
        merged
    }

    /// Bound name the clause exports `entry` from.
    fn clause_local(
        &self,
        entry: &SurfaceEntry,
        intents: &FxHashMap<DeclId, &ExportIntent>,
    ) -> Option<String> {
        // `import X from "./a"; export { X }` exports the alias, not the terminal.
        if let Some(ExportEntry::Local { local }) = self
            .graph
            .scope(self.entry)
            .and_then(|scope| scope.exports.get(&entry.name))
        {
            if let Some(alias) = self.synthetic.aliases.get(&(self.entry, local.clone())) {
                return self.bindings.get(alias.id).map(str::to_string);
            }
        }

        if let Resolution::Local(id) = &entry.resolution {
            if let Some(intent) = intents.get(id) {
                return Some(intent.binding.clone());
            }
        }
        self.name_of(&entry.resolution)
    }

    fn name_of(&self, resolution: &Resolution) -> Option<String> {
        resolved_name(self.bindings, self.synthetic, self.graph, resolution).map(str::to_string)
    }

    fn export_assignment(&self) -> Option<String> {
        let expression = self.graph.scope(self.entry)?.export_assignment.as_ref()?;
        let mut scratch = Vec::<Diagnostic>::new();
        let resolution = self.graph.resolve_local(self.entry, expression, &mut scratch);
        self.name_of(&resolution)
    }

    /// `declare const X: typeof T;` for value terminals, `type X<..> = T<..>;`
    /// for type terminals, both for classes.
    fn alias_declarations(
        &self,
        local: &str,
        alias: &DefaultAlias,
        ids: &mut IdAllocator,
    ) -> Vec<Statement> {
        let Some(name) = self.bindings.get(alias.id) else {
            return Vec::new();
        };
        let Some(info) = self.graph.decl(alias.terminal) else {
            return Vec::new();
        };
        let Some(target) = self.bindings.symbol(info.module, &info.name) else {
            return Vec::new();
        };

        let tags: Vec<DeclarationTag> = self
            .graph
            .symbol_decls(alias.terminal)
            .iter()
            .filter_map(|id| self.graph.decl(*id).map(|d| d.tag))
            .collect();
        let value_like = tags.iter().any(|t| {
            matches!(
                t,
                DeclarationTag::Function
                    | DeclarationTag::Variable
                    | DeclarationTag::Namespace
                    | DeclarationTag::Class
            )
        });
        let type_like = tags.iter().any(|t| {
            matches!(
                t,
                DeclarationTag::Interface
                    | DeclarationTag::TypeAlias
                    | DeclarationTag::Enum
                    | DeclarationTag::Class
            )
        });
        debug!(local, alias = name, terminal = target, value_like, type_like, "synthesized default alias");

        let mut statements = Vec::new();
        if value_like {
            let mut decl = Declaration::new(DeclarationKind::Variable(VariableStatement {
                flavor: VariableFlavor::Const,
                declarations: vec![VariableDeclarator {
                    id: alias.id,
                    name: name.to_string(),
                    type_annotation: Some(TypeNode::type_query(target)),
                    initializer: None,
                }],
            }));
            decl.id = ids.alloc();
            decl.modifiers = Modifiers::DECLARE;
            statements.push(Statement::Declaration(decl));
        }
        if type_like {
            let type_parameters: Vec<TypeParameter> = self
                .terminal_type_parameters(alias.terminal)
                .into_iter()
                .map(|mut param| {
                    param.id = ids.alloc();
                    param
                })
                .collect();
            let type_arguments = type_parameters
                .iter()
                .map(|p| TypeNode::reference(p.name.as_str()))
                .collect();
            let mut decl = Declaration::new(DeclarationKind::TypeAlias(TypeAliasDeclaration {
                name: name.to_string(),
                type_parameters,
                target: TypeNode::Reference {
                    name: target.into(),
                    type_arguments,
                },
            }));
            decl.id = ids.alloc();
            statements.push(Statement::Declaration(decl));
        }
        statements
    }

    /// Type parameters of the first declaration of the terminal symbol that
    /// has any, as they read after deconfliction.
    fn terminal_type_parameters(&self, terminal: DeclId) -> Vec<TypeParameter> {
        let merged = self.graph.symbol_decls(terminal);
        self.modules
            .iter()
            .flat_map(|m| m.statements.iter())
            .filter_map(Statement::as_declaration)
            .filter(|d| merged.contains(&d.id))
            .find_map(|d| {
                let params = match &d.kind {
                    DeclarationKind::Interface(i) => &i.type_parameters,
                    DeclarationKind::Class(c) => &c.type_parameters,
                    DeclarationKind::TypeAlias(t) => &t.type_parameters,
                    _ => return None,
                };
                (!params.is_empty()).then(|| params.clone())
            })
            .unwrap_or_default()
    }

    /// `declare namespace ns { export { binding as name, ... }; }`
    fn namespace_block(&self, module: ModuleId, id: DeclId, ids: &mut IdAllocator) -> Option<Statement> {
        let name = self.bindings.get(id)?;
        let mut scratch = Vec::<Diagnostic>::new();
        let surface = self.graph.export_surface(module, &mut scratch);

        let specifiers: Vec<ExportSpecifier> = surface
            .entries
            .iter()
            .filter_map(|entry| {
                let local = self.name_of(&entry.resolution)?;
                Some(ExportSpecifier::new(&local, &entry.name))
            })
            .collect();
        trace!(namespace = name, members = specifiers.len(), "materialized namespace");

        let mut body = Vec::new();
        if !specifiers.is_empty() {
            body.push(Statement::Export(ExportDeclaration {
                specifiers,
                source: None,
                type_only: false,
            }));
        }
        let mut decl = Declaration::new(DeclarationKind::Namespace(NamespaceDeclaration {
            name: name.to_string(),
            module_keyword: false,
            body,
        }));
        decl.id = ids.alloc();
        decl.modifiers = Modifiers::DECLARE;
        Some(Statement::Declaration(decl))
    }
}

#[cfg(test)]
#[path = "../tests/merger.rs"]
mod tests;
