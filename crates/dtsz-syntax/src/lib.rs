//! Declaration tree model for the dtsz declaration bundler.
//!
//! The front-end hands over one declaration tree per source module. This
//! crate defines that tree (`Statement`, `Declaration`, `TypeNode`, ...),
//! the stable identities attached to every binding in it (`DeclId`), the
//! store that owns the trees for a bundling run (`UnitStore`), and the shape
//! of a finished bundle (`BundledFile`) that the emitter prints.

pub mod ids;
pub use ids::{DeclId, IdAllocator, ModuleId};

pub mod modifiers;
pub use modifiers::Modifiers;

pub mod types;
pub use types::{
    EntityName, MappedModifier, Member, OpaqueToken, Parameter, PropertyName, TemplateSpan,
    TupleElement, TypeNode, TypeOperatorKind, TypeParameter,
};

pub mod ast;
pub use ast::{
    ClassDeclaration, Declaration, DeclarationKind, DeclarationTag, EnumDeclaration, EnumMember,
    ExportAll, ExportAssignment, ExportDeclaration, ExportDefault, ExportSpecifier,
    FunctionDeclaration, HeritageType, ImportDeclaration, ImportSpecifier, InterfaceDeclaration,
    NamespaceDeclaration, OpaqueStatement, Statement, TypeAliasDeclaration, VariableDeclarator,
    VariableFlavor, VariableStatement,
};

pub mod store;
pub use store::{DeclarationUnit, StoreError, UnitStore};

pub mod output;
pub use output::{BundledFile, BundledStatement, ExportClause, ExportClauseEntry, ExternalImport};

pub mod builder;
