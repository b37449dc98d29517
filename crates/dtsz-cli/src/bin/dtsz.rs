#![allow(clippy::print_stderr)]

use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;

use dtsz_cli::args::CliArgs;
use dtsz_cli::reporter::Reporter;
use dtsz_cli::{driver, tracing_config};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DIAGNOSTICS_PRESENT: i32 = 2;

fn main() -> Result<()> {
    // Only active when DTSZ_LOG or RUST_LOG is set.
    tracing_config::init_tracing();

    let args = CliArgs::parse();
    let summary = driver::run(&args)?;

    let pretty = args
        .pretty
        .unwrap_or_else(|| std::io::stderr().is_terminal());
    let reporter = Reporter::new(pretty);
    if !summary.diagnostics.is_empty() {
        eprint!("{}", reporter.render(&summary.diagnostics));
    }
    eprintln!("{}", reporter.summary(&summary.diagnostics, summary.bundles));

    if args.strict && summary.has_errors() {
        std::process::exit(EXIT_DIAGNOSTICS_PRESENT);
    }
    std::process::exit(EXIT_SUCCESS);
}
