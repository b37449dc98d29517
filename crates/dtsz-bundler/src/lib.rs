//! Declaration bundling pipeline.
//!
//! Passes, in the order a bundling run applies them:
//! - `graph`: per-module symbol/import/export tables and re-export chain resolution
//! - `references` / `reference_graph`: free references of every declaration,
//!   the identity graph built from them, and reachability from an entry's exports
//! - `tree_shaker`: removal of unreachable declarations
//! - `deconflict`: one collision-free name per surviving binding, references rewritten
//! - `normalize`: `declare` added, per-module `export` markers stripped
//! - `merger`: the single export clause, default aliases and materialized namespaces
//!
//! `pipeline::Bundler` drives them per entry point and hands the result to
//! the emitter.

pub mod options;
pub use options::{BundleOptions, StarExportConflict};

pub mod error;
pub use error::BundleError;

pub mod graph;
pub use graph::{ExternalRef, ImportedName, ModuleGraph, ModuleRef, Resolution};

pub mod references;
pub use references::Reference;

pub mod reference_graph;
pub use reference_graph::{Reachability, ReferenceGraph, Target};

pub mod tree_shaker;

pub mod lexical_env;
pub use lexical_env::LexicalEnvironment;

pub mod deconflict;
pub use deconflict::{BindingMap, Deconflicter};

pub mod normalize;
pub use normalize::ExportIntent;

pub mod merger;

pub mod stats;
pub use stats::{BundleStats, ExternalReference};

pub mod pipeline;
pub use pipeline::{BundleOutput, Bundler, EntryPoint};
