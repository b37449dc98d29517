//! Declaration Unit Store.
//!
//! Owns one declaration tree per source module for a bundling run and hands
//! out the identities every later pass keys its lookups by.

use crate::ast::{DeclarationKind, Statement};
use crate::ids::{DeclId, IdAllocator, ModuleId};
use crate::types::{Member, Parameter, TypeNode, TypeParameter};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use thiserror::Error;

/// Precondition violations when populating the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("module id must not be empty")]
    EmptyModuleId,
    #[error("module '{0}' was added twice")]
    DuplicateModule(String),
}

/// One source module's declaration tree.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeclarationUnit {
    #[serde(skip, default = "module_id_none")]
    pub module: ModuleId,
    /// Stable module identifier (the module path).
    pub id: String,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

fn module_id_none() -> ModuleId {
    ModuleId::NONE
}

impl DeclarationUnit {
    pub fn new(id: impl Into<String>, statements: Vec<Statement>) -> Self {
        Self {
            module: ModuleId::NONE,
            id: id.into(),
            statements,
        }
    }
}

/// All declaration units of a bundling run, in traversal order.
#[derive(Debug, Default)]
pub struct UnitStore {
    units: Vec<DeclarationUnit>,
    by_id: FxHashMap<String, ModuleId>,
    allocator: IdAllocator,
}

impl UnitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit, assigning its `ModuleId` and a fresh `DeclId` to every
    /// binding in its tree. Units are traversed in the order they are added.
    pub fn add(&mut self, mut unit: DeclarationUnit) -> Result<ModuleId, StoreError> {
        if unit.id.is_empty() {
            return Err(StoreError::EmptyModuleId);
        }
        if self.by_id.contains_key(&unit.id) {
            return Err(StoreError::DuplicateModule(unit.id));
        }

        let module = ModuleId(self.units.len() as u32);
        unit.module = module;
        assign_statement_ids(&mut unit.statements, &mut self.allocator);

        self.by_id.insert(unit.id.clone(), module);
        self.units.push(unit);
        Ok(module)
    }

    pub fn get(&self, module: ModuleId) -> Option<&DeclarationUnit> {
        self.units.get(module.index())
    }

    /// Resolve a module specifier. Specifiers that are not a module id in the
    /// store refer to external libraries.
    pub fn lookup(&self, specifier: &str) -> Option<ModuleId> {
        self.by_id.get(specifier).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeclarationUnit> {
        self.units.iter()
    }

    pub fn units(&self) -> &[DeclarationUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// First identity not handed out to any stored declaration. Passes that
    /// synthesize declarations allocate from here on.
    pub fn next_decl_id(&self) -> u32 {
        self.allocator.peek()
    }
}

fn assign_statement_ids(statements: &mut [Statement], ids: &mut IdAllocator) {
    for statement in statements {
        let Statement::Declaration(decl) = statement else {
            continue;
        };
        decl.id = ids.alloc();
        match &mut decl.kind {
            DeclarationKind::Interface(d) => {
                assign_type_parameter_ids(&mut d.type_parameters, ids);
                for heritage in &mut d.extends {
                    assign_type_ids_all(&mut heritage.type_arguments, ids);
                }
                assign_member_ids(&mut d.members, ids);
            }
            DeclarationKind::Class(d) => {
                assign_type_parameter_ids(&mut d.type_parameters, ids);
                for heritage in d.extends.iter_mut().chain(d.implements.iter_mut()) {
                    assign_type_ids_all(&mut heritage.type_arguments, ids);
                }
                assign_member_ids(&mut d.members, ids);
            }
            DeclarationKind::Function(d) => {
                assign_type_parameter_ids(&mut d.type_parameters, ids);
                assign_parameter_ids(&mut d.parameters, ids);
                if let Some(ret) = &mut d.return_type {
                    assign_type_ids(ret, ids);
                }
            }
            DeclarationKind::Variable(v) => {
                for declarator in &mut v.declarations {
                    declarator.id = ids.alloc();
                    if let Some(ty) = &mut declarator.type_annotation {
                        assign_type_ids(ty, ids);
                    }
                }
            }
            DeclarationKind::Enum(_) => {}
            DeclarationKind::TypeAlias(d) => {
                assign_type_parameter_ids(&mut d.type_parameters, ids);
                assign_type_ids(&mut d.target, ids);
            }
            DeclarationKind::Namespace(d) => assign_statement_ids(&mut d.body, ids),
        }
    }
}

fn assign_type_parameter_ids(params: &mut [TypeParameter], ids: &mut IdAllocator) {
    for param in params {
        assign_type_parameter_id(param, ids);
    }
}

fn assign_type_parameter_id(param: &mut TypeParameter, ids: &mut IdAllocator) {
    param.id = ids.alloc();
    if let Some(constraint) = &mut param.constraint {
        assign_type_ids(constraint, ids);
    }
    if let Some(default) = &mut param.default {
        assign_type_ids(default, ids);
    }
}

fn assign_parameter_ids(params: &mut [Parameter], ids: &mut IdAllocator) {
    for param in params {
        if let Some(ty) = &mut param.type_annotation {
            assign_type_ids(ty, ids);
        }
    }
}

fn assign_member_ids(members: &mut [Member], ids: &mut IdAllocator) {
    for member in members {
        match member {
            Member::Property {
                type_annotation, ..
            } => {
                if let Some(ty) = type_annotation {
                    assign_type_ids(ty, ids);
                }
            }
            Member::Method {
                type_parameters,
                parameters,
                return_type,
                ..
            }
            | Member::CallSignature {
                type_parameters,
                parameters,
                return_type,
            }
            | Member::ConstructSignature {
                type_parameters,
                parameters,
                return_type,
            } => {
                assign_type_parameter_ids(type_parameters, ids);
                assign_parameter_ids(parameters, ids);
                if let Some(ty) = return_type {
                    assign_type_ids(ty, ids);
                }
            }
            Member::IndexSignature {
                parameters,
                type_annotation,
                ..
            } => {
                assign_parameter_ids(parameters, ids);
                assign_type_ids(type_annotation, ids);
            }
            Member::Constructor { parameters, .. } | Member::SetAccessor { parameters, .. } => {
                assign_parameter_ids(parameters, ids);
            }
            Member::GetAccessor { return_type, .. } => {
                if let Some(ty) = return_type {
                    assign_type_ids(ty, ids);
                }
            }
        }
    }
}

fn assign_type_ids_all(types: &mut [TypeNode], ids: &mut IdAllocator) {
    for ty in types {
        assign_type_ids(ty, ids);
    }
}

/// Type parameters nested in type positions (function types, `infer`,
/// mapped types) are bindings too and get identities of their own.
fn assign_type_ids(ty: &mut TypeNode, ids: &mut IdAllocator) {
    match ty {
        TypeNode::Keyword { .. } | TypeNode::Literal { .. } | TypeNode::Opaque { .. } => {}
        TypeNode::Reference { type_arguments, .. }
        | TypeNode::TypeQuery { type_arguments, .. }
        | TypeNode::Import { type_arguments, .. } => assign_type_ids_all(type_arguments, ids),
        TypeNode::Array { element } => assign_type_ids(element, ids),
        TypeNode::Tuple { elements } => {
            for element in elements {
                assign_type_ids(&mut element.element, ids);
            }
        }
        TypeNode::Union { types } | TypeNode::Intersection { types } => {
            assign_type_ids_all(types, ids)
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
            assign_type_parameter_ids(type_parameters, ids);
            assign_parameter_ids(parameters, ids);
            assign_type_ids(return_type, ids);
        }
        TypeNode::TypeLiteral { members } => assign_member_ids(members, ids),
        TypeNode::TypeOperator { target, .. } => assign_type_ids(target, ids),
        TypeNode::IndexedAccess { object, index } => {
            assign_type_ids(object, ids);
            assign_type_ids(index, ids);
        }
        TypeNode::Conditional {
            check,
            extends,
            true_type,
            false_type,
        } => {
            assign_type_ids(check, ids);
            assign_type_ids(extends, ids);
            assign_type_ids(true_type, ids);
            assign_type_ids(false_type, ids);
        }
        TypeNode::Infer { type_parameter } => assign_type_parameter_id(type_parameter, ids),
        TypeNode::Mapped {
            type_parameter,
            name_type,
            target,
            ..
        } => {
            assign_type_parameter_id(type_parameter, ids);
            if let Some(name_type) = name_type {
                assign_type_ids(name_type, ids);
            }
            if let Some(target) = target {
                assign_type_ids(target, ids);
            }
        }
        TypeNode::Predicate { target, .. } => {
            if let Some(target) = target {
                assign_type_ids(target, ids);
            }
        }
        TypeNode::Parenthesized { inner } => assign_type_ids(inner, ids),
        TypeNode::TemplateLiteral { spans, .. } => {
            for span in spans {
                assign_type_ids(&mut span.ty, ids);
            }
        }
    }
}

/// Every declaration identity in `statements`, in tree order. Variable
/// statements contribute their declarators, not the statement itself.
pub fn collect_decl_ids(statements: &[Statement]) -> Vec<DeclId> {
    let mut out = Vec::new();
    for statement in statements {
        if let Statement::Declaration(decl) = statement {
            match &decl.kind {
                DeclarationKind::Variable(v) => out.extend(v.declarations.iter().map(|d| d.id)),
                _ => out.push(decl.id),
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "../tests/store.rs"]
mod tests;
