use super::*;
use dtsz_common::diagnostics::codes;

fn sample() -> Vec<Diagnostic> {
    vec![
        Diagnostic::error("index.ts", "Module 'a.ts' has no export 'Foo'.", codes::UNRESOLVED_IMPORT),
        Diagnostic::warning("b.ts", "Ambiguous star export.", codes::AMBIGUOUS_STAR_EXPORT),
    ]
}

#[test]
fn test_plain_rendering() {
    let reporter = Reporter::new(false);
    assert_eq!(
        reporter.render(&sample()),
        "index.ts - error DTSZ9001: Module 'a.ts' has no export 'Foo'.\n\
         b.ts - warning DTSZ9004: Ambiguous star export.\n"
    );
}

#[test]
fn test_missing_file_is_marked() {
    let reporter = Reporter::new(false);
    let diagnostic = Diagnostic::error("", "boom", codes::REEXPORT_CYCLE);
    assert!(reporter.format_diagnostic(&diagnostic).starts_with("<unknown> - error"));
}

#[test]
fn test_summary_counts() {
    let reporter = Reporter::new(false);
    assert_eq!(
        reporter.summary(&sample(), 2),
        "1 error, 1 warning in 2 bundles."
    );
    assert_eq!(reporter.summary(&[], 1), "0 errors, 0 warnings in 1 bundle.");
}
