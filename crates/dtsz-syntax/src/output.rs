//! Shape of a finished bundle, as handed to the emitter.

use crate::ast::{ImportSpecifier, Statement};
use dtsz_common::SourcePos;
use serde::Serialize;

/// An import from an external library that surviving declarations still
/// reference. Deduplicated per specifier and imported name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalImport {
    pub specifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub named: Vec<ImportSpecifier>,
}

/// A statement of the bundle together with where it came from. Synthetic
/// statements (default aliases, materialized namespaces) have no origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundledStatement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos: Option<SourcePos>,
    pub statement: Statement,
}

impl BundledStatement {
    pub fn synthetic(statement: Statement) -> Self {
        Self {
            origin: None,
            pos: None,
            statement,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportClauseEntry {
    /// Final bound name in the bundle.
    pub local: String,
    /// Name on the public surface.
    pub exported: String,
}

impl ExportClauseEntry {
    pub fn is_renamed(&self) -> bool {
        self.local != self.exported
    }
}

/// The single export statement closing a bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportClause {
    pub entries: Vec<ExportClauseEntry>,
    /// `export = binding;` for entries using an export assignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<String>,
    /// `export * from "lib";` for external star re-exports on the surface.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub external_stars: Vec<String>,
}

impl ExportClause {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.assignment.is_none() && self.external_stars.is_empty()
    }

    pub fn get(&self, exported: &str) -> Option<&ExportClauseEntry> {
        self.entries.iter().find(|e| e.exported == exported)
    }
}

/// One output file: external imports, flat ambient declarations, one export
/// clause.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundledFile {
    pub file_name: String,
    pub imports: Vec<ExternalImport>,
    pub statements: Vec<BundledStatement>,
    pub export: ExportClause,
    /// Emit `export {};` when the clause is empty.
    pub module_marker: bool,
}
