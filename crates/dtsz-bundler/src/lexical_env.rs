//! Lexical Environment of the shared output scope.
//!
//! The root scope holds every name bound at the top level of the bundle,
//! together with the module that bound it (`None` for reserved globals).
//! Child scopes hold nested bindings such as type parameters; they are
//! pushed and popped by the deconflicter as it walks into declarations.

use dtsz_common::limits::MAX_UNIQUE_NAME_ATTEMPTS;
use dtsz_syntax::ModuleId;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

#[derive(Debug, Default)]
pub struct LexicalEnvironment {
    root: FxHashMap<String, Option<ModuleId>>,
    scopes: Vec<FxHashSet<String>>,
}

impl LexicalEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a name as taken without binding anything to it.
    pub fn reserve(&mut self, name: &str) {
        self.root.entry(name.to_string()).or_insert(None);
    }

    /// Bind `name` as written in the innermost scope, shadowing outer ones.
    pub fn reserve_in_scope(&mut self, name: &str) {
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name.to_string());
            }
            None => self.reserve(name),
        }
    }

    /// Whether `name` is unbound in every scope of the current chain.
    pub fn is_free(&self, name: &str) -> bool {
        !self.root.contains_key(name) && !self.scopes.iter().any(|s| s.contains(name))
    }

    /// Module that bound a top-level name; `Some(None)` for reserved names.
    pub fn owner(&self, name: &str) -> Option<Option<ModuleId>> {
        self.root.get(name).copied()
    }

    /// `name_$0`, `name_$1`, ...: the first suffixed form free in the chain.
    pub fn generate_unique(&self, name: &str) -> String {
        suffixed_name(name, |candidate| !self.is_free(candidate))
    }

    /// Bind `preferred` if it is free, otherwise a generated alternative, in
    /// the innermost scope. Returns the bound name.
    pub fn bind_unique(&mut self, preferred: &str, owner: Option<ModuleId>) -> String {
        let name = if self.is_free(preferred) {
            preferred.to_string()
        } else {
            self.generate_unique(preferred)
        };
        match self.scopes.last_mut() {
            Some(scope) => {
                scope.insert(name.clone());
            }
            None => {
                self.root.insert(name.clone(), owner);
            }
        }
        name
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashSet::default());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Number of child scopes currently pushed.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn top_level_len(&self) -> usize {
        self.root.len()
    }
}

/// First of `name_$0`, `name_$1`, ... that `is_taken` rejects. Only finitely
/// many names can be taken, so the search always ends on a free one.
pub fn suffixed_name(name: &str, is_taken: impl Fn(&str) -> bool) -> String {
    let mut n: u64 = 0;
    loop {
        let candidate = format!("{name}_${n}");
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
        if n == u64::from(MAX_UNIQUE_NAME_ATTEMPTS) {
            warn!(base = name, attempts = n, "suffix search is unusually long");
        }
    }
}

#[cfg(test)]
#[path = "../tests/lexical_env.rs"]
mod tests;
