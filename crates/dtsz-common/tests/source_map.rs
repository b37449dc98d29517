use super::*;

fn vlq(value: i64) -> String {
    let mut out = String::new();
    encode_vlq(&mut out, value);
    out
}

#[test]
fn test_vlq_known_values() {
    assert_eq!(vlq(0), "A");
    assert_eq!(vlq(1), "C");
    assert_eq!(vlq(-1), "D");
    assert_eq!(vlq(15), "e");
    assert_eq!(vlq(16), "gB");
    assert_eq!(vlq(123), "2H");
}

#[test]
fn test_add_source_is_deduplicated() {
    let mut generator = SourceMapGenerator::new("index.d.ts");
    assert_eq!(generator.add_source("a.ts"), 0);
    assert_eq!(generator.add_source("b.ts"), 1);
    assert_eq!(generator.add_source("a.ts"), 0);
    assert_eq!(generator.sources(), &["a.ts".to_string(), "b.ts".to_string()]);
}

#[test]
fn test_encode_mappings_across_lines() {
    let mut generator = SourceMapGenerator::new("index.d.ts");
    let a = generator.add_source("a.ts");
    let b = generator.add_source("b.ts");
    generator.add_mapping(Mapping {
        generated_line: 0,
        generated_column: 0,
        source_index: a,
        original_line: 0,
        original_column: 0,
    });
    generator.add_mapping(Mapping {
        generated_line: 2,
        generated_column: 0,
        source_index: b,
        original_line: 3,
        original_column: 4,
    });

    // Second segment: column +0, source +1, line +3, column +4.
    assert_eq!(generator.encode_mappings(), "AAAA;;ACGI");
}

#[test]
fn test_to_json_shape() {
    let mut generator = SourceMapGenerator::new("out.d.ts");
    generator.add_source("x.ts");
    let json: serde_json::Value = serde_json::from_str(&generator.to_json()).unwrap();
    assert_eq!(json["version"], 3);
    assert_eq!(json["file"], "out.d.ts");
    assert_eq!(json["sources"][0], "x.ts");
    assert_eq!(json["mappings"], "");
}
