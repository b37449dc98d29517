//! Centralized limits and thresholds for the declaration bundler.
//!
//! Every pass in the bundler is a tree walk or a graph traversal over input
//! that comes from outside the crate. These constants bound the walks so that
//! malformed input degrades into diagnostics instead of stack overflows or
//! endless loops.

// =============================================================================
// Traversal budgets
// =============================================================================

/// Maximum number of hops followed when resolving a re-export chain.
///
/// Each hop is one forwarding statement (`export { x } from "./m"`,
/// `export * from "./m"`, or an import binding that is itself re-exported).
/// Chains longer than this are treated as unresolvable, which is how cycles
/// that slip past the visited-set check (e.g. through alternating star
/// exports) are eventually cut.
///
/// # TypeScript example
///
/// ```typescript
/// // a.ts
/// export { Foo } from "./b";
/// // b.ts
/// export { Foo } from "./a";   // never reaches a declaration
/// ```
pub const MAX_REEXPORT_CHAIN_DEPTH: u32 = 64;

// =============================================================================
// Name generation
// =============================================================================

/// Suffix attempts after which generating a collision-free binding is logged
/// as suspicious.
///
/// The deconflicter appends `_$0`, `_$1`, ... to a taken name until one is
/// free. Reaching this many attempts means the environment is corrupt, not
/// that the bundle is large.
pub const MAX_UNIQUE_NAME_ATTEMPTS: u32 = 1_000_000;

// =============================================================================
// Capacity hints
// =============================================================================

/// Initial capacity of the declaration printer's output buffer.
pub const EMIT_BUFFER_CAPACITY: usize = 4096;
