//! Tree Shaker.
//!
//! Removes every top-level declaration whose identity is outside the
//! reachable set. Reachability is computed once, before any removal, so a
//! declaration only referenced by a removed one stays removed.

use crate::reference_graph::Reachability;
use dtsz_syntax::{DeclarationKind, ModuleId, Statement, UnitStore};
use tracing::{debug, trace};

/// One module's statements after shaking, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ShakenModule {
    pub module: ModuleId,
    pub path: String,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ShakeStats {
    pub kept: usize,
    pub removed: usize,
}

/// Copy `modules` out of the store, keeping reachable declarations and every
/// non-declaration statement.
///
/// Variable statements are shaken per declarator and dropped when no
/// declarator survives.
#[tracing::instrument(level = "debug", skip_all, fields(modules = modules.len()))]
pub fn shake(
    store: &UnitStore,
    modules: &[ModuleId],
    reach: &Reachability,
) -> (Vec<ShakenModule>, ShakeStats) {
    let mut stats = ShakeStats::default();
    let mut shaken = Vec::with_capacity(modules.len());

    for &module in modules {
        let Some(unit) = store.get(module) else {
            continue;
        };
        let mut statements = Vec::with_capacity(unit.statements.len());
        for statement in &unit.statements {
            let Statement::Declaration(decl) = statement else {
                statements.push(statement.clone());
                continue;
            };

            if let DeclarationKind::Variable(vars) = &decl.kind {
                let mut kept = decl.clone();
                let DeclarationKind::Variable(kept_vars) = &mut kept.kind else {
                    continue;
                };
                kept_vars.declarations.retain(|d| reach.contains(d.id));
                let removed = vars.declarations.len() - kept_vars.declarations.len();
                stats.removed += removed;
                stats.kept += kept_vars.declarations.len();
                if removed > 0 {
                    trace!(module = %unit.id, removed, "dropped variable declarators");
                }
                if !kept_vars.declarations.is_empty() {
                    statements.push(Statement::Declaration(kept));
                }
            } else if reach.contains(decl.id) {
                stats.kept += 1;
                statements.push(statement.clone());
            } else {
                stats.removed += 1;
                trace!(module = %unit.id, name = decl.name().unwrap_or("<default>"), "removed declaration");
            }
        }
        shaken.push(ShakenModule {
            module,
            path: unit.id.clone(),
            statements,
        });
    }

    debug!(kept = stats.kept, removed = stats.removed, "tree-shaken");
    (shaken, stats)
}

#[cfg(test)]
#[path = "../tests/tree_shaker.rs"]
mod tests;
