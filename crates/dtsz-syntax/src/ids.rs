//! Stable identities for modules and declarations.

use serde::{Deserialize, Serialize};

/// Unique identifier for a module in the store.
///
/// Module ids are dense indices in store insertion order, which is also the
/// deterministic traversal order of every bundling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ModuleId(pub u32);

impl ModuleId {
    pub const NONE: ModuleId = ModuleId(u32::MAX);

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identity of a binding in a declaration tree.
///
/// Assigned once, when the tree enters the store (or when a pass synthesizes
/// a declaration), and never reused. Renaming a declaration never changes its
/// identity, so every lookup after merging begins goes through `DeclId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeclId(pub u32);

impl DeclId {
    pub const NONE: DeclId = DeclId(u32::MAX);

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

impl Default for DeclId {
    fn default() -> Self {
        DeclId::NONE
    }
}

/// Monotonic allocator for `DeclId`s.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue allocating after `next`, e.g. for synthetic declarations
    /// created by a pass that works on a snapshot of the store.
    pub fn starting_at(next: u32) -> Self {
        Self { next }
    }

    pub fn alloc(&mut self) -> DeclId {
        let id = DeclId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to `alloc` will return.
    pub fn peek(&self) -> u32 {
        self.next
    }
}
