//! Type positions in declaration trees.
//!
//! `TypeNode` is a closed sum type: every pass matches it exhaustively, and
//! anything the front-end cannot express with it arrives as `Opaque`, a token
//! stream in which identifiers are still distinguishable from raw text.

use crate::ids::DeclId;
use crate::modifiers::Modifiers;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A possibly qualified name: `Foo`, `ns.Foo`, `a.b.C`.
///
/// Serialized as the dotted string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct EntityName {
    pub segments: Vec<String>,
}

impl EntityName {
    pub fn new(name: impl Into<String>) -> Self {
        name.into().into()
    }

    /// The leftmost identifier, which is the only segment resolved lexically.
    pub fn root(&self) -> &str {
        self.segments.first().map(String::as_str).unwrap_or("")
    }

    /// Replace the leftmost identifier, keeping the member path.
    pub fn set_root(&mut self, name: &str) {
        match self.segments.first_mut() {
            Some(first) => *first = name.to_string(),
            None => self.segments.push(name.to_string()),
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.segments.len() > 1
    }
}

impl From<String> for EntityName {
    fn from(text: String) -> Self {
        EntityName {
            segments: text.split('.').map(str::to_string).collect(),
        }
    }
}

impl From<&str> for EntityName {
    fn from(text: &str) -> Self {
        EntityName::from(text.to_string())
    }
}

impl From<EntityName> for String {
    fn from(name: EntityName) -> Self {
        name.segments.join(".")
    }
}

impl fmt::Display for EntityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// A type parameter: `T extends Foo = Bar`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeParameter {
    #[serde(skip)]
    pub id: DeclId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<Box<TypeNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Box<TypeNode>>,
    /// `const`, `in`, `out` and similar keywords, printed verbatim.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

/// A function or signature parameter. The name is a binding position and is
/// printed verbatim (destructuring patterns arrive as text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub rest: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_annotation: Option<TypeNode>,
}

/// Element of a tuple type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TupleElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub rest: bool,
    pub element: TypeNode,
}

/// One `${T}literal` span of a template literal type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSpan {
    pub ty: TypeNode,
    pub literal: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeOperatorKind {
    Keyof,
    Unique,
    Readonly,
}

impl TypeOperatorKind {
    pub fn keyword(self) -> &'static str {
        match self {
            TypeOperatorKind::Keyof => "keyof",
            TypeOperatorKind::Unique => "unique",
            TypeOperatorKind::Readonly => "readonly",
        }
    }
}

/// `+`/`-` prefix of a mapped type modifier, or a bare modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MappedModifier {
    Present,
    Plus,
    Minus,
}

impl MappedModifier {
    pub fn prefix(self) -> &'static str {
        match self {
            MappedModifier::Present => "",
            MappedModifier::Plus => "+",
            MappedModifier::Minus => "-",
        }
    }
}

/// A token of an opaque node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OpaqueToken {
    Text { text: String },
    Identifier { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TypeNode {
    /// `string`, `number`, `any`, `void`, `this`, ...
    Keyword { name: String },
    /// `Foo<A, B>`, `ns.Foo`
    Reference {
        name: EntityName,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_arguments: Vec<TypeNode>,
    },
    /// `"foo"`, `1`, `true`, `-1n`
    Literal { text: String },
    Array { element: Box<TypeNode> },
    Tuple { elements: Vec<TupleElement> },
    Union { types: Vec<TypeNode> },
    Intersection { types: Vec<TypeNode> },
    Function {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_parameters: Vec<TypeParameter>,
        #[serde(default)]
        parameters: Vec<Parameter>,
        return_type: Box<TypeNode>,
    },
    Constructor {
        #[serde(default)]
        is_abstract: bool,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_parameters: Vec<TypeParameter>,
        #[serde(default)]
        parameters: Vec<Parameter>,
        return_type: Box<TypeNode>,
    },
    TypeLiteral { members: Vec<Member> },
    /// `typeof Foo`, `typeof ns.foo<T>`
    TypeQuery {
        name: EntityName,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_arguments: Vec<TypeNode>,
    },
    TypeOperator {
        operator: TypeOperatorKind,
        target: Box<TypeNode>,
    },
    IndexedAccess {
        object: Box<TypeNode>,
        index: Box<TypeNode>,
    },
    Conditional {
        check: Box<TypeNode>,
        extends: Box<TypeNode>,
        true_type: Box<TypeNode>,
        false_type: Box<TypeNode>,
    },
    Infer { type_parameter: TypeParameter },
    Mapped {
        type_parameter: TypeParameter,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name_type: Option<Box<TypeNode>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        readonly: Option<MappedModifier>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        optional: Option<MappedModifier>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<Box<TypeNode>>,
    },
    /// `import("./m").Foo<T>`, `typeof import("./m")`
    Import {
        argument: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        qualifier: Option<EntityName>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_arguments: Vec<TypeNode>,
        #[serde(default)]
        is_type_of: bool,
    },
    /// `x is Foo`, `asserts x`, `asserts this is Foo`
    Predicate {
        #[serde(default)]
        asserts: bool,
        parameter: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<Box<TypeNode>>,
    },
    Parenthesized { inner: Box<TypeNode> },
    TemplateLiteral {
        head: String,
        spans: Vec<TemplateSpan>,
    },
    /// Anything without a dedicated variant.
    Opaque { tokens: Vec<OpaqueToken> },
}

impl TypeNode {
    pub fn keyword(name: &str) -> Self {
        TypeNode::Keyword {
            name: name.to_string(),
        }
    }

    pub fn reference(name: impl Into<EntityName>) -> Self {
        TypeNode::Reference {
            name: name.into(),
            type_arguments: Vec::new(),
        }
    }

    pub fn type_query(name: impl Into<EntityName>) -> Self {
        TypeNode::TypeQuery {
            name: name.into(),
            type_arguments: Vec::new(),
        }
    }
}

/// Name of a property-like member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PropertyName {
    Identifier { name: String },
    StringLiteral { value: String },
    NumericLiteral { value: String },
    /// `[Symbol.iterator]`, `[key]`
    Computed { expression: EntityName },
}

impl PropertyName {
    pub fn identifier(name: &str) -> Self {
        PropertyName::Identifier {
            name: name.to_string(),
        }
    }
}

/// A member of an interface, class, or type literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Member {
    Property {
        name: PropertyName,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        optional: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        type_annotation: Option<TypeNode>,
    },
    Method {
        name: PropertyName,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        optional: bool,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_parameters: Vec<TypeParameter>,
        #[serde(default)]
        parameters: Vec<Parameter>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<TypeNode>,
    },
    CallSignature {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_parameters: Vec<TypeParameter>,
        #[serde(default)]
        parameters: Vec<Parameter>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<TypeNode>,
    },
    ConstructSignature {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        type_parameters: Vec<TypeParameter>,
        #[serde(default)]
        parameters: Vec<Parameter>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<TypeNode>,
    },
    IndexSignature {
        #[serde(default)]
        modifiers: Modifiers,
        parameters: Vec<Parameter>,
        type_annotation: TypeNode,
    },
    Constructor {
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        parameters: Vec<Parameter>,
    },
    GetAccessor {
        name: PropertyName,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_type: Option<TypeNode>,
    },
    SetAccessor {
        name: PropertyName,
        #[serde(default)]
        modifiers: Modifiers,
        #[serde(default)]
        parameters: Vec<Parameter>,
    },
}
