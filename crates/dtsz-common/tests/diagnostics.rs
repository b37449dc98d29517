use super::*;

#[test]
fn test_format_message_replaces_placeholders() {
    let text = format_message(messages::UNRESOLVED_IMPORT, &["Foo", "./bar"]);
    assert_eq!(
        text,
        "Import 'Foo' from './bar' does not resolve to any declaration."
    );
}

#[test]
fn test_display_includes_code_and_category() {
    let diag = Diagnostic::warning("index.ts", "something odd", codes::AMBIGUOUS_STAR_EXPORT);
    assert_eq!(diag.to_string(), "index.ts: warning DTSZ9004: something odd");
    assert!(!diag.is_error());
}

#[test]
fn test_dedupe_keeps_first_occurrence_order() {
    let a = Diagnostic::error("a.ts", "first", codes::UNRESOLVED_IMPORT);
    let b = Diagnostic::error("b.ts", "second", codes::UNRESOLVED_EXPORT);
    let result = dedupe(vec![a.clone(), b.clone(), a.clone()]);
    assert_eq!(result, vec![a, b]);
}
