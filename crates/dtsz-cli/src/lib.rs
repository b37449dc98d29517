//! Host glue for the `dtsz` binary: argument parsing, manifest loading,
//! driving the bundler and reporting its diagnostics.

pub mod args;
pub mod driver;
pub mod manifest;
pub mod reporter;
pub mod tracing_config;
