use clap::{Parser, ValueEnum};
use dtsz_bundler::{BundleOptions, StarExportConflict};
use std::path::PathBuf;

/// CLI arguments for the dtsz binary.
#[derive(Parser, Debug)]
#[command(
    name = "dtsz",
    version,
    about = "Bundle the declaration trees of a TypeScript project into one .d.ts per entry point"
)]
pub struct CliArgs {
    /// Bundle manifest (JSON) produced by the declaration front-end.
    pub manifest: PathBuf,

    /// Directory the bundles are written to. Defaults to the manifest's directory.
    #[arg(short = 'o', long = "outDir", alias = "out-dir")]
    pub out_dir: Option<PathBuf>,

    /// Only bundle these entry modules (comma separated).
    #[arg(short = 'e', long, value_delimiter = ',')]
    pub entry: Vec<String>,

    /// Write a `.map` file next to each bundle.
    #[arg(long = "sourceMap", alias = "source-map")]
    pub source_map: bool,

    /// Which module keeps the plain name when two `export *` sources collide.
    #[arg(long = "starExportConflict", alias = "star-export-conflict", value_enum)]
    pub star_export_conflict: Option<StarConflict>,

    /// Allow bundled declarations to take the names of unresolved globals.
    #[arg(long = "noReserveGlobals", alias = "no-reserve-globals")]
    pub no_reserve_globals: bool,

    /// Omit `export {};` from bundles that export nothing.
    #[arg(long = "noModuleMarker", alias = "no-module-marker")]
    pub no_module_marker: bool,

    /// Write a `stats.json` report to the output directory.
    #[arg(long)]
    pub stats: bool,

    /// Exit with a failure status when any error diagnostic is reported.
    #[arg(long)]
    pub strict: bool,

    /// Enable color and formatting in diagnostics. Defaults to true on a terminal.
    #[arg(long)]
    pub pretty: Option<bool>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StarConflict {
    #[value(name = "first", alias = "prefer-first")]
    First,
    #[value(name = "last", alias = "prefer-last")]
    Last,
}

impl From<StarConflict> for StarExportConflict {
    fn from(value: StarConflict) -> Self {
        match value {
            StarConflict::First => StarExportConflict::PreferFirst,
            StarConflict::Last => StarExportConflict::PreferLast,
        }
    }
}

impl CliArgs {
    /// Apply command-line overrides on top of the manifest's options.
    pub fn apply_to(&self, options: &mut BundleOptions) {
        if self.source_map {
            options.source_map = true;
        }
        if let Some(conflict) = self.star_export_conflict {
            options.star_export_conflict = conflict.into();
        }
        if self.no_reserve_globals {
            options.reserve_globals = false;
        }
        if self.no_module_marker {
            options.emit_module_marker = false;
        }
    }
}

#[cfg(test)]
#[path = "../tests/args.rs"]
mod tests;
