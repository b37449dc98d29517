//! Reference Analyzer.
//!
//! Computes the free identifiers a declaration depends on. Binding positions
//! (type parameters, `infer` and mapped-type parameters, function parameters)
//! are tracked on a scope stack so their uses are not reported, and
//! well-known symbol keys (`[Symbol.iterator]`) are skipped.
//!
//! Nodes without a structural rule (`TypeNode::Opaque`) are over-approximated:
//! every identifier token inside them counts as a reference.

use dtsz_syntax::{
    Declaration, DeclarationKind, EntityName, HeritageType, Member, OpaqueToken, Parameter,
    PropertyName, Statement, TypeNode, TypeParameter, VariableDeclarator,
};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// A free reference found by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    /// Leftmost identifier of a type or value reference.
    Name(String),
    /// `import("specifier").Qualifier`; `qualifier` is the leftmost segment.
    ImportType {
        specifier: String,
        qualifier: Option<String>,
    },
}

/// References of one declaration, in first-occurrence order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub references: Vec<Reference>,
    /// Number of nodes that fell back to the opaque rule.
    pub unsupported: u32,
}

impl Analysis {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.references.iter().filter_map(|r| match r {
            Reference::Name(name) => Some(name.as_str()),
            Reference::ImportType { .. } => None,
        })
    }
}

/// Declaration space a local binding lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Space {
    Type,
    Value,
    Both,
}

impl Space {
    /// Opaque tokens use `Both`: their space is unknown, so any binding matches.
    fn covers(self, use_site: Space) -> bool {
        self == Space::Both || use_site == Space::Both || self == use_site
    }
}

type Scope = SmallVec<[(String, Space); 4]>;

pub fn analyze_declaration(decl: &Declaration) -> Analysis {
    let mut collector = ReferenceCollector::default();
    collector.visit_declaration(decl);
    collector.finish()
}

pub fn analyze_declarator(declarator: &VariableDeclarator) -> Analysis {
    let mut collector = ReferenceCollector::default();
    if let Some(ty) = &declarator.type_annotation {
        collector.visit_type(ty);
    }
    collector.finish()
}

/// References of a statement kept regardless of reachability.
pub fn analyze_opaque(tokens: &[OpaqueToken]) -> Analysis {
    let mut collector = ReferenceCollector::default();
    collector.visit_tokens(tokens);
    collector.finish()
}

#[derive(Default)]
struct ReferenceCollector {
    scopes: Vec<Scope>,
    references: Vec<Reference>,
    seen: FxHashSet<Reference>,
    unsupported: u32,
}

impl ReferenceCollector {
    fn finish(self) -> Analysis {
        Analysis {
            references: self.references,
            unsupported: self.unsupported,
        }
    }

    fn is_bound(&self, name: &str, space: Space) -> bool {
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .any(|(bound, bound_space)| bound == name && bound_space.covers(space))
    }

    fn push(&mut self, reference: Reference) {
        if self.seen.insert(reference.clone()) {
            self.references.push(reference);
        }
    }

    fn use_name(&mut self, name: &str, space: Space) {
        if name.is_empty() || self.is_bound(name, space) {
            return;
        }
        self.push(Reference::Name(name.to_string()));
    }

    fn use_entity(&mut self, name: &EntityName, space: Space) {
        self.use_name(name.root(), space);
    }

    fn visit_tokens(&mut self, tokens: &[OpaqueToken]) {
        for token in tokens {
            if let OpaqueToken::Identifier { name } = token {
                self.use_name(name, Space::Both);
            }
        }
    }

    fn visit_declaration(&mut self, decl: &Declaration) {
        match &decl.kind {
            DeclarationKind::Interface(iface) => {
                self.enter_type_parameters(&iface.type_parameters);
                for heritage in &iface.extends {
                    self.visit_heritage(heritage, Space::Type);
                }
                self.visit_members(&iface.members);
                self.scopes.pop();
            }
            DeclarationKind::Class(class) => {
                // `extends` is an expression evaluated outside the type parameter scope.
                if let Some(heritage) = &class.extends {
                    self.use_entity(&heritage.expression, Space::Value);
                }
                self.enter_type_parameters(&class.type_parameters);
                if let Some(heritage) = &class.extends {
                    self.visit_types(&heritage.type_arguments);
                }
                for heritage in &class.implements {
                    self.visit_heritage(heritage, Space::Type);
                }
                self.visit_members(&class.members);
                self.scopes.pop();
            }
            DeclarationKind::Function(function) => {
                self.visit_signature(
                    &function.type_parameters,
                    &function.parameters,
                    function.return_type.as_ref(),
                );
            }
            DeclarationKind::Variable(vars) => {
                for declarator in &vars.declarations {
                    if let Some(ty) = &declarator.type_annotation {
                        self.visit_type(ty);
                    }
                }
            }
            DeclarationKind::Enum(_) => {}
            DeclarationKind::TypeAlias(alias) => {
                self.enter_type_parameters(&alias.type_parameters);
                self.visit_type(&alias.target);
                self.scopes.pop();
            }
            DeclarationKind::Namespace(namespace) => {
                let scope = namespace_locals(&namespace.body);
                self.scopes.push(scope);
                for statement in &namespace.body {
                    self.visit_namespace_statement(statement);
                }
                self.scopes.pop();
            }
        }
    }

    fn visit_namespace_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Declaration(decl) => self.visit_declaration(decl),
            Statement::Export(export) if export.source.is_none() => {
                for specifier in &export.specifiers {
                    self.use_name(&specifier.local, Space::Both);
                }
            }
            Statement::ExportDefault(default) => self.use_name(&default.expression, Space::Both),
            Statement::ExportAssignment(assignment) => {
                self.use_name(&assignment.expression, Space::Both)
            }
            Statement::Opaque(opaque) => self.visit_tokens(&opaque.tokens),
            Statement::Import(_) | Statement::Export(_) | Statement::ExportAll(_) => {}
        }
    }

    fn visit_heritage(&mut self, heritage: &HeritageType, space: Space) {
        self.use_entity(&heritage.expression, space);
        self.visit_types(&heritage.type_arguments);
    }

    /// Push a scope binding `params`, then visit their constraints and
    /// defaults inside it (parameters may refer to each other). The caller
    /// pops the scope.
    fn enter_type_parameters(&mut self, params: &[TypeParameter]) {
        self.scopes.push(
            params
                .iter()
                .map(|p| (p.name.clone(), Space::Type))
                .collect(),
        );
        for param in params {
            self.visit_type_parameter_types(param);
        }
    }

    fn visit_type_parameter_types(&mut self, param: &TypeParameter) {
        if let Some(constraint) = &param.constraint {
            self.visit_type(constraint);
        }
        if let Some(default) = &param.default {
            self.visit_type(default);
        }
    }

    fn visit_signature(
        &mut self,
        type_parameters: &[TypeParameter],
        parameters: &[Parameter],
        return_type: Option<&TypeNode>,
    ) {
        self.enter_type_parameters(type_parameters);
        if let Some(scope) = self.scopes.last_mut() {
            scope.extend(parameters.iter().map(|p| (p.name.clone(), Space::Value)));
        }
        self.visit_parameters(parameters);
        if let Some(ret) = return_type {
            self.visit_type(ret);
        }
        self.scopes.pop();
    }

    fn visit_parameters(&mut self, parameters: &[Parameter]) {
        for param in parameters {
            if let Some(ty) = &param.type_annotation {
                self.visit_type(ty);
            }
        }
    }

    fn visit_property_name(&mut self, name: &PropertyName) {
        if let PropertyName::Computed { expression } = name {
            if expression.root() != "Symbol" {
                self.use_entity(expression, Space::Value);
            }
        }
    }

    fn visit_members(&mut self, members: &[Member]) {
        for member in members {
            match member {
                Member::Property {
                    name,
                    type_annotation,
                    ..
                } => {
                    self.visit_property_name(name);
                    if let Some(ty) = type_annotation {
                        self.visit_type(ty);
                    }
                }
                Member::Method {
                    name,
                    type_parameters,
                    parameters,
                    return_type,
                    ..
                } => {
                    self.visit_property_name(name);
                    self.visit_signature(type_parameters, parameters, return_type.as_ref());
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
                } => self.visit_signature(type_parameters, parameters, return_type.as_ref()),
                Member::IndexSignature {
                    parameters,
                    type_annotation,
                    ..
                } => {
                    self.visit_parameters(parameters);
                    self.visit_type(type_annotation);
                }
                Member::Constructor { parameters, .. } => self.visit_parameters(parameters),
                Member::GetAccessor {
                    name, return_type, ..
                } => {
                    self.visit_property_name(name);
                    if let Some(ty) = return_type {
                        self.visit_type(ty);
                    }
                }
                Member::SetAccessor {
                    name, parameters, ..
                } => {
                    self.visit_property_name(name);
                    self.visit_parameters(parameters);
                }
            }
        }
    }

    fn visit_types(&mut self, types: &[TypeNode]) {
        for ty in types {
            self.visit_type(ty);
        }
    }

    fn visit_type(&mut self, ty: &TypeNode) {
        match ty {
            TypeNode::Keyword { .. } | TypeNode::Literal { .. } => {}
            TypeNode::Reference {
                name,
                type_arguments,
            } => {
                self.use_entity(name, Space::Type);
                self.visit_types(type_arguments);
            }
            TypeNode::TypeQuery {
                name,
                type_arguments,
            } => {
                self.use_entity(name, Space::Value);
                self.visit_types(type_arguments);
            }
            TypeNode::Array { element } => self.visit_type(element),
            TypeNode::Tuple { elements } => {
                for element in elements {
                    self.visit_type(&element.element);
                }
            }
            TypeNode::Union { types } | TypeNode::Intersection { types } => self.visit_types(types),
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
            } => self.visit_signature(type_parameters, parameters, Some(&**return_type)),
            TypeNode::TypeLiteral { members } => self.visit_members(members),
            TypeNode::TypeOperator { target, .. } => self.visit_type(target),
            TypeNode::IndexedAccess { object, index } => {
                self.visit_type(object);
                self.visit_type(index);
            }
            TypeNode::Conditional {
                check,
                extends,
                true_type,
                false_type,
            } => {
                self.visit_type(check);
                let mut inferred = Scope::new();
                collect_infer_names(extends, &mut inferred);
                self.scopes.push(inferred);
                self.visit_type(extends);
                self.visit_type(true_type);
                self.scopes.pop();
                self.visit_type(false_type);
            }
            TypeNode::Infer { type_parameter } => self.visit_type_parameter_types(type_parameter),
            TypeNode::Mapped {
                type_parameter,
                name_type,
                target,
                ..
            } => {
                self.visit_type_parameter_types(type_parameter);
                let mut scope = Scope::new();
                scope.push((type_parameter.name.clone(), Space::Type));
                self.scopes.push(scope);
                if let Some(name_type) = name_type {
                    self.visit_type(name_type);
                }
                if let Some(target) = target {
                    self.visit_type(target);
                }
                self.scopes.pop();
            }
            TypeNode::Import {
                argument,
                qualifier,
                type_arguments,
                ..
            } => {
                self.push(Reference::ImportType {
                    specifier: argument.clone(),
                    qualifier: qualifier.as_ref().map(|q| q.root().to_string()),
                });
                self.visit_types(type_arguments);
            }
            TypeNode::Predicate { target, .. } => {
                if let Some(target) = target {
                    self.visit_type(target);
                }
            }
            TypeNode::Parenthesized { inner } => self.visit_type(inner),
            TypeNode::TemplateLiteral { spans, .. } => {
                for span in spans {
                    self.visit_type(&span.ty);
                }
            }
            TypeNode::Opaque { tokens } => {
                self.unsupported += 1;
                self.visit_tokens(tokens);
            }
        }
    }
}

/// Names declared directly in a namespace body. They are locals of the body,
/// visible in both declaration spaces.
fn namespace_locals(body: &[Statement]) -> Scope {
    let mut scope = Scope::new();
    for statement in body {
        match statement {
            Statement::Declaration(decl) => match &decl.kind {
                DeclarationKind::Variable(vars) => scope.extend(
                    vars.declarations
                        .iter()
                        .map(|d| (d.name.clone(), Space::Both)),
                ),
                _ => {
                    if let Some(name) = decl.name() {
                        scope.push((name.to_string(), Space::Both));
                    }
                }
            },
            Statement::Import(import) => {
                scope.extend(import.bindings().map(|(local, _)| (local.to_string(), Space::Both)))
            }
            _ => {}
        }
    }
    scope
}

/// Names bound by `infer` positions of a conditional type's `extends` clause.
pub(crate) fn infer_names(extends: &TypeNode) -> Vec<String> {
    let mut scope = Scope::new();
    collect_infer_names(extends, &mut scope);
    scope.into_iter().map(|(name, _)| name).collect()
}

/// `infer U` positions inside the `extends` clause of a conditional type bind
/// `U` for that clause and the true branch. Nested conditionals own their
/// own `infer`s.
fn collect_infer_names(ty: &TypeNode, out: &mut Scope) {
    match ty {
        TypeNode::Infer { type_parameter } => {
            out.push((type_parameter.name.clone(), Space::Type));
        }
        TypeNode::Reference { type_arguments, .. }
        | TypeNode::TypeQuery { type_arguments, .. }
        | TypeNode::Import { type_arguments, .. } => {
            for arg in type_arguments {
                collect_infer_names(arg, out);
            }
        }
        TypeNode::Array { element } => collect_infer_names(element, out),
        TypeNode::Tuple { elements } => {
            for element in elements {
                collect_infer_names(&element.element, out);
            }
        }
        TypeNode::Union { types } | TypeNode::Intersection { types } => {
            for ty in types {
                collect_infer_names(ty, out);
            }
        }
        TypeNode::Function {
            parameters,
            return_type,
            ..
        }
        | TypeNode::Constructor {
            parameters,
            return_type,
            ..
        } => {
            for param in parameters {
                if let Some(ty) = &param.type_annotation {
                    collect_infer_names(ty, out);
                }
            }
            collect_infer_names(return_type, out);
        }
        TypeNode::TypeOperator { target, .. } => collect_infer_names(target, out),
        TypeNode::IndexedAccess { object, index } => {
            collect_infer_names(object, out);
            collect_infer_names(index, out);
        }
        TypeNode::Parenthesized { inner } => collect_infer_names(inner, out),
        TypeNode::TemplateLiteral { spans, .. } => {
            for span in spans {
                collect_infer_names(&span.ty, out);
            }
        }
        TypeNode::TypeLiteral { members } => {
            for member in members {
                if let Member::Property {
                    type_annotation: Some(ty),
                    ..
                } = member
                {
                    collect_infer_names(ty, out);
                }
            }
        }
        TypeNode::Keyword { .. }
        | TypeNode::Literal { .. }
        | TypeNode::Conditional { .. }
        | TypeNode::Mapped { .. }
        | TypeNode::Predicate { .. }
        | TypeNode::Opaque { .. } => {}
    }
}

#[cfg(test)]
#[path = "../tests/references.rs"]
mod tests;
