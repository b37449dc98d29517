//! Terse constructors for declaration trees.
//!
//! Front-ends normally hand over JSON; these helpers exist for hosts that
//! build trees in Rust, and for tests and benchmarks.

use crate::ast::*;
use crate::modifiers::Modifiers;
use crate::types::{EntityName, Member, Parameter, PropertyName, TypeNode, TypeParameter};

pub fn interface(name: &str, members: Vec<Member>) -> Statement {
    declaration(DeclarationKind::Interface(InterfaceDeclaration {
        name: name.to_string(),
        type_parameters: Vec::new(),
        extends: Vec::new(),
        members,
    }))
}

pub fn interface_extending(name: &str, extends: &[&str], members: Vec<Member>) -> Statement {
    declaration(DeclarationKind::Interface(InterfaceDeclaration {
        name: name.to_string(),
        type_parameters: Vec::new(),
        extends: extends.iter().map(|e| heritage(e)).collect(),
        members,
    }))
}

pub fn class(name: Option<&str>, extends: Option<&str>, members: Vec<Member>) -> Statement {
    declaration(DeclarationKind::Class(ClassDeclaration {
        name: name.map(str::to_string),
        type_parameters: Vec::new(),
        extends: extends.map(heritage),
        implements: Vec::new(),
        members,
    }))
}

pub fn function(name: Option<&str>, parameters: Vec<Parameter>, ret: TypeNode) -> Statement {
    declaration(DeclarationKind::Function(FunctionDeclaration {
        name: name.map(str::to_string),
        type_parameters: Vec::new(),
        parameters,
        return_type: Some(ret),
    }))
}

pub fn type_alias(name: &str, type_parameters: Vec<TypeParameter>, target: TypeNode) -> Statement {
    declaration(DeclarationKind::TypeAlias(TypeAliasDeclaration {
        name: name.to_string(),
        type_parameters,
        target,
    }))
}

/// `const a: A, b: B;`
pub fn variables(declarators: &[(&str, TypeNode)]) -> Statement {
    declaration(DeclarationKind::Variable(VariableStatement {
        flavor: VariableFlavor::Const,
        declarations: declarators
            .iter()
            .map(|(name, ty)| VariableDeclarator {
                id: Default::default(),
                name: name.to_string(),
                type_annotation: Some(ty.clone()),
                initializer: None,
            })
            .collect(),
    }))
}

pub fn enumeration(name: &str, members: &[&str]) -> Statement {
    declaration(DeclarationKind::Enum(EnumDeclaration {
        name: name.to_string(),
        members: members
            .iter()
            .map(|m| EnumMember {
                name: m.to_string(),
                initializer: None,
            })
            .collect(),
    }))
}

pub fn namespace(name: &str, body: Vec<Statement>) -> Statement {
    declaration(DeclarationKind::Namespace(NamespaceDeclaration {
        name: name.to_string(),
        module_keyword: false,
        body,
    }))
}

fn declaration(kind: DeclarationKind) -> Statement {
    Statement::Declaration(Declaration::new(kind))
}

fn heritage(name: &str) -> HeritageType {
    HeritageType {
        expression: EntityName::from(name),
        type_arguments: Vec::new(),
    }
}

/// Add modifiers to a declaration statement; other statements pass through.
pub fn with_modifiers(mut statement: Statement, modifiers: Modifiers) -> Statement {
    if let Statement::Declaration(decl) = &mut statement {
        decl.modifiers |= modifiers;
    }
    statement
}

pub fn exported(statement: Statement) -> Statement {
    with_modifiers(statement, Modifiers::EXPORT)
}

pub fn exported_default(statement: Statement) -> Statement {
    with_modifiers(statement, Modifiers::EXPORT | Modifiers::DEFAULT)
}

pub fn type_param(name: &str, constraint: Option<TypeNode>) -> TypeParameter {
    TypeParameter {
        id: Default::default(),
        name: name.to_string(),
        constraint: constraint.map(Box::new),
        default: None,
        keywords: Vec::new(),
    }
}

pub fn param(name: &str, ty: TypeNode) -> Parameter {
    Parameter {
        name: name.to_string(),
        modifiers: Modifiers::empty(),
        optional: false,
        rest: false,
        type_annotation: Some(ty),
    }
}

pub fn property(name: &str, ty: TypeNode) -> Member {
    Member::Property {
        name: PropertyName::identifier(name),
        modifiers: Modifiers::empty(),
        optional: false,
        type_annotation: Some(ty),
    }
}

pub fn import_named(source: &str, names: &[(&str, &str)]) -> Statement {
    Statement::Import(ImportDeclaration {
        source: source.to_string(),
        default: None,
        namespace: None,
        named: names
            .iter()
            .map(|(imported, local)| ImportSpecifier {
                imported: imported.to_string(),
                local: local.to_string(),
            })
            .collect(),
        type_only: false,
    })
}

pub fn import_default(source: &str, local: &str) -> Statement {
    Statement::Import(ImportDeclaration {
        source: source.to_string(),
        default: Some(local.to_string()),
        namespace: None,
        named: Vec::new(),
        type_only: false,
    })
}

pub fn import_namespace(source: &str, local: &str) -> Statement {
    Statement::Import(ImportDeclaration {
        source: source.to_string(),
        default: None,
        namespace: Some(local.to_string()),
        named: Vec::new(),
        type_only: false,
    })
}

/// `export { local as exported, ... }`, optionally `from source`.
pub fn export_named(source: Option<&str>, names: &[(&str, &str)]) -> Statement {
    Statement::Export(ExportDeclaration {
        specifiers: names
            .iter()
            .map(|(local, exported)| ExportSpecifier::new(local, exported))
            .collect(),
        source: source.map(str::to_string),
        type_only: false,
    })
}

pub fn export_all(source: &str, alias: Option<&str>) -> Statement {
    Statement::ExportAll(ExportAll {
        source: source.to_string(),
        alias: alias.map(str::to_string),
    })
}

pub fn export_default(expression: &str) -> Statement {
    Statement::ExportDefault(ExportDefault {
        expression: expression.to_string(),
    })
}

pub fn export_assignment(expression: &str) -> Statement {
    Statement::ExportAssignment(ExportAssignment {
        expression: expression.to_string(),
    })
}
