//! Diagnostic types reported by the declaration bundling passes.
//!
//! None of these are fatal: every pass keeps going on a best-effort basis and
//! the host decides what to do with the collected diagnostics.

use serde::Serialize;
use std::fmt;

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Suggestion => "suggestion",
            DiagnosticCategory::Message => "message",
        };
        f.write_str(label)
    }
}

/// Diagnostic codes used by the bundler.
///
/// The 9xxx range is used so the codes never clash with front-end (`TSxxxx`)
/// diagnostics that a host may merge into the same report.
pub mod codes {
    /// An import binding points at an export the target module does not provide.
    pub const UNRESOLVED_IMPORT: u32 = 9001;
    /// An export of an entry module cannot be traced to a declaration.
    pub const UNRESOLVED_EXPORT: u32 = 9002;
    /// A re-export chain loops back on itself without reaching a declaration.
    pub const REEXPORT_CYCLE: u32 = 9003;
    /// Two `export *` sources provide the same name.
    pub const AMBIGUOUS_STAR_EXPORT: u32 = 9004;
    /// The reference analyzer fell back to treating a node as opaque.
    pub const UNSUPPORTED_NODE: u32 = 9005;
    /// A required entry export does not exist on the entry module.
    pub const UNKNOWN_ENTRY_EXPORT: u32 = 9006;
}

/// A diagnostic produced while bundling, attributed to an originating module.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub file: String,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: u32,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub fn error(file: impl Into<String>, message: impl Into<String>, code: u32) -> Self {
        Self {
            file: file.into(),
            message_text: message.into(),
            category: DiagnosticCategory::Error,
            code,
        }
    }

    /// Create a new warning diagnostic.
    #[must_use]
    pub fn warning(file: impl Into<String>, message: impl Into<String>, code: u32) -> Self {
        Self {
            file: file.into(),
            message_text: message.into(),
            category: DiagnosticCategory::Warning,
            code,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} DTSZ{}: {}",
            self.file, self.category, self.code, self.message_text
        )
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

/// Message templates for the bundler diagnostic codes.
pub mod messages {
    pub const UNRESOLVED_IMPORT: &str = "Import '{0}' from '{1}' does not resolve to any declaration.";
    pub const UNRESOLVED_EXPORT: &str = "Export '{0}' could not be traced to a declaration.";
    pub const REEXPORT_CYCLE: &str =
        "Re-export of '{0}' forms a cycle and never reaches a declaration.";
    pub const AMBIGUOUS_STAR_EXPORT: &str =
        "'{0}' is provided by more than one 'export *' source; the losing one is exported as '{1}'.";
    pub const UNSUPPORTED_NODE: &str =
        "Node in '{0}' has no specific reference rule; all identifiers inside it are kept.";
    pub const UNKNOWN_ENTRY_EXPORT: &str = "Entry module does not export '{0}'.";
}

/// Remove duplicate diagnostics, keeping the first occurrence of each.
pub fn dedupe(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut seen = rustc_hash::FxHashSet::default();
    diagnostics
        .into_iter()
        .filter(|d| seen.insert(d.clone()))
        .collect()
}

#[cfg(test)]
#[path = "../tests/diagnostics.rs"]
mod tests;
