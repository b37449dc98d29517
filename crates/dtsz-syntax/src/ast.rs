//! Statements and declarations of a declaration unit.

use crate::ids::DeclId;
use crate::modifiers::Modifiers;
use crate::types::{EntityName, Member, OpaqueToken, Parameter, TypeNode, TypeParameter};
use dtsz_common::SourcePos;
use serde::{Deserialize, Serialize};

/// A top-level (or namespace-level) statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Statement {
    Declaration(Declaration),
    Import(ImportDeclaration),
    /// `export { a as b }`, `export { a } from "m"`
    Export(ExportDeclaration),
    /// `export * from "m"`, `export * as ns from "m"`
    ExportAll(ExportAll),
    /// `export default Foo;`
    ExportDefault(ExportDefault),
    /// `export = Foo;`
    ExportAssignment(ExportAssignment),
    /// `declare global { ... }`, triple-slash directives, anything else.
    Opaque(OpaqueStatement),
}

impl Statement {
    pub fn as_declaration(&self) -> Option<&Declaration> {
        match self {
            Statement::Declaration(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_declaration_mut(&mut self) -> Option<&mut Declaration> {
        match self {
            Statement::Declaration(decl) => Some(decl),
            _ => None,
        }
    }
}

/// A named top-level construct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    #[serde(skip)]
    pub id: DeclId,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<SourcePos>,
    #[serde(flatten)]
    pub kind: DeclarationKind,
}

/// Kind tag of a declaration, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationTag {
    Interface,
    Class,
    Function,
    Variable,
    Enum,
    TypeAlias,
    Namespace,
}

impl DeclarationTag {
    /// Whether a standalone top-level declaration of this kind needs `declare`.
    pub fn requires_declare(self) -> bool {
        !matches!(self, DeclarationTag::Interface | DeclarationTag::TypeAlias)
    }

    /// Whether the declaration introduces a value binding.
    pub fn has_value(self) -> bool {
        matches!(
            self,
            DeclarationTag::Class
                | DeclarationTag::Function
                | DeclarationTag::Variable
                | DeclarationTag::Enum
                | DeclarationTag::Namespace
        )
    }

    /// Whether the declaration introduces a type binding.
    pub fn has_type(self) -> bool {
        matches!(
            self,
            DeclarationTag::Interface
                | DeclarationTag::Class
                | DeclarationTag::Enum
                | DeclarationTag::TypeAlias
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "declaration", rename_all = "camelCase")]
pub enum DeclarationKind {
    Interface(InterfaceDeclaration),
    Class(ClassDeclaration),
    Function(FunctionDeclaration),
    Variable(VariableStatement),
    Enum(EnumDeclaration),
    TypeAlias(TypeAliasDeclaration),
    Namespace(NamespaceDeclaration),
}

impl Declaration {
    pub fn new(kind: DeclarationKind) -> Self {
        Self {
            id: DeclId::NONE,
            modifiers: Modifiers::empty(),
            pos: None,
            kind,
        }
    }

    pub fn tag(&self) -> DeclarationTag {
        match &self.kind {
            DeclarationKind::Interface(_) => DeclarationTag::Interface,
            DeclarationKind::Class(_) => DeclarationTag::Class,
            DeclarationKind::Function(_) => DeclarationTag::Function,
            DeclarationKind::Variable(_) => DeclarationTag::Variable,
            DeclarationKind::Enum(_) => DeclarationTag::Enum,
            DeclarationKind::TypeAlias(_) => DeclarationTag::TypeAlias,
            DeclarationKind::Namespace(_) => DeclarationTag::Namespace,
        }
    }

    /// The declared name. `None` for variable statements (see `declarators`)
    /// and for anonymous default-exported classes and functions.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            DeclarationKind::Interface(d) => Some(&d.name),
            DeclarationKind::Class(d) => d.name.as_deref(),
            DeclarationKind::Function(d) => d.name.as_deref(),
            DeclarationKind::Variable(_) => None,
            DeclarationKind::Enum(d) => Some(&d.name),
            DeclarationKind::TypeAlias(d) => Some(&d.name),
            DeclarationKind::Namespace(d) => Some(&d.name),
        }
    }

    pub fn set_name(&mut self, name: &str) {
        let name = name.to_string();
        match &mut self.kind {
            DeclarationKind::Interface(d) => d.name = name,
            DeclarationKind::Class(d) => d.name = Some(name),
            DeclarationKind::Function(d) => d.name = Some(name),
            DeclarationKind::Variable(_) => {}
            DeclarationKind::Enum(d) => d.name = name,
            DeclarationKind::TypeAlias(d) => d.name = name,
            DeclarationKind::Namespace(d) => d.name = name,
        }
    }

    pub fn is_exported(&self) -> bool {
        self.modifiers.contains(Modifiers::EXPORT)
    }

    pub fn is_default_export(&self) -> bool {
        self.modifiers
            .contains(Modifiers::EXPORT | Modifiers::DEFAULT)
    }

    pub fn declarators(&self) -> &[VariableDeclarator] {
        match &self.kind {
            DeclarationKind::Variable(v) => &v.declarations,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeritageType {
    pub expression: EntityName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_arguments: Vec<TypeNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterfaceDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<HeritageType>,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDeclaration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<HeritageType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<HeritageType>,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDeclaration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariableFlavor {
    Var,
    Let,
    #[default]
    Const,
}

impl VariableFlavor {
    pub fn keyword(self) -> &'static str {
        match self {
            VariableFlavor::Var => "var",
            VariableFlavor::Let => "let",
            VariableFlavor::Const => "const",
        }
    }
}

/// A variable statement; each declarator is shaken and renamed on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableStatement {
    #[serde(default)]
    pub flavor: VariableFlavor,
    pub declarations: Vec<VariableDeclarator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclarator {
    #[serde(skip)]
    pub id: DeclId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_annotation: Option<TypeNode>,
    /// Literal initializer text (`10`, `"foo"`), as allowed in ambient context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDeclaration {
    pub name: String,
    #[serde(default)]
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAliasDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<TypeParameter>,
    #[serde(rename = "type")]
    pub target: TypeNode,
}

/// `declare namespace X { ... }` / `declare module X { ... }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceDeclaration {
    pub name: String,
    /// Printed with the `module` keyword instead of `namespace`.
    #[serde(default)]
    pub module_keyword: bool,
    #[serde(default)]
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSpecifier {
    /// Remote name; `"default"` for `import { default as x }`.
    pub imported: String,
    pub local: String,
}

/// `import X, { a as b } from "m"`, `import * as ns from "m"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportDeclaration {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub named: Vec<ImportSpecifier>,
    #[serde(default)]
    pub type_only: bool,
}

impl ImportDeclaration {
    /// Every local binding this import introduces, with its remote name
    /// (`"default"`, `"*"`, or the imported name).
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &str)> {
        self.default
            .iter()
            .map(|local| (local.as_str(), "default"))
            .chain(self.namespace.iter().map(|local| (local.as_str(), "*")))
            .chain(
                self.named
                    .iter()
                    .map(|s| (s.local.as_str(), s.imported.as_str())),
            )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

impl ExportSpecifier {
    pub fn new(local: &str, exported: &str) -> Self {
        Self {
            local: local.to_string(),
            exported: exported.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDeclaration {
    pub specifiers: Vec<ExportSpecifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportAll {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDefault {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportAssignment {
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpaqueStatement {
    pub tokens: Vec<OpaqueToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<SourcePos>,
}

#[cfg(test)]
#[path = "../tests/ast.rs"]
mod tests;
