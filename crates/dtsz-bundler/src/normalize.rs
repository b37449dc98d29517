//! Modifier normalization.
//!
//! After deconfliction every surviving top-level declaration is made ambient
//! and loses its per-module export markers: `declare` is added where the
//! declaration kind requires it, and `export` / `export default` are turned
//! into an `ExportIntent` the merger resolves against the entry's surface.

use crate::deconflict::BindingMap;
use crate::tree_shaker::ShakenModule;
use dtsz_syntax::{DeclId, DeclarationKind, Modifiers, ModuleId, Statement};
use tracing::trace;

/// A declaration that carried `export` in its own module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportIntent {
    pub decl: DeclId,
    pub module: ModuleId,
    /// Final binding after deconfliction.
    pub binding: String,
    /// Name the module exported it under: `default` or its original name.
    pub exported_name: String,
}

/// Add `declare` to every top-level declaration kind that requires it.
/// Interfaces and type aliases are ambient already and stay as they are.
pub fn ensure_declare(modules: &mut [ShakenModule]) {
    for module in modules {
        for statement in &mut module.statements {
            if let Statement::Declaration(decl) = statement {
                if decl.tag().requires_declare() && !decl.modifiers.contains(Modifiers::DECLARE) {
                    decl.modifiers.insert(Modifiers::DECLARE);
                }
            }
        }
    }
}

/// Remove `export` and `default` from every top-level declaration, recording
/// what each one exported. Nested namespace members keep their modifiers.
pub fn strip_exports(modules: &mut [ShakenModule], bindings: &BindingMap) -> Vec<ExportIntent> {
    let mut intents = Vec::new();
    for module in modules {
        for statement in &mut module.statements {
            let Statement::Declaration(decl) = statement else {
                continue;
            };
            if !decl.modifiers.intersects(Modifiers::EXPORT | Modifiers::DEFAULT) {
                continue;
            }
            let is_default = decl.modifiers.contains(Modifiers::DEFAULT);
            decl.modifiers.remove(Modifiers::EXPORT | Modifiers::DEFAULT);

            let ids: Vec<DeclId> = match &decl.kind {
                DeclarationKind::Variable(vars) => vars.declarations.iter().map(|d| d.id).collect(),
                _ => vec![decl.id],
            };
            for id in ids {
                let Some(bound) = bindings.bound(id) else {
                    continue;
                };
                let exported_name = if is_default {
                    "default".to_string()
                } else {
                    bound.original.clone()
                };
                trace!(binding = %bound.name, exported = %exported_name, "stripped export");
                intents.push(ExportIntent {
                    decl: id,
                    module: module.module,
                    binding: bound.name.clone(),
                    exported_name,
                });
            }
        }
    }
    intents
}

#[cfg(test)]
#[path = "../tests/normalize.rs"]
mod tests;
