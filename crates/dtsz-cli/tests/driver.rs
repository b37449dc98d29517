use super::*;
use clap::Parser;
use dtsz_common::diagnostics::codes;

fn manifest_json(entries: &str) -> String {
    format!(
        r#"{{
    "modules": [
        {{
            "id": "a.ts",
            "statements": [
                {{ "kind": "declaration", "declaration": "interface", "modifiers": ["export"],
                   "name": "Foo", "members": [], "pos": {{ "line": 0, "column": 0 }} }},
                {{ "kind": "declaration", "declaration": "interface", "name": "Unused", "members": [] }}
            ]
        }},
        {{
            "id": "index.ts",
            "statements": [ {{ "kind": "exportAll", "source": "a.ts" }} ]
        }}
    ],
    "entries": {entries}
}}"#
    )
}

const INDEX_ENTRY: &str = r#"[ { "module": "index.ts", "output": "index.d.ts" } ]"#;

fn write_manifest(dir: &Path, entries: &str) -> PathBuf {
    let path = dir.join("bundle.json");
    std::fs::write(&path, manifest_json(entries)).unwrap();
    path
}

fn args(manifest: &Path, extra: &[&str]) -> CliArgs {
    let mut argv = vec!["dtsz".to_string(), manifest.display().to_string()];
    argv.extend(extra.iter().map(|s| s.to_string()));
    CliArgs::try_parse_from(argv).unwrap()
}

#[test]
fn test_bundle_written_next_to_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), INDEX_ENTRY);

    let summary = run(&args(&manifest, &[])).unwrap();

    let bundle = dir.path().join("index.d.ts");
    assert_eq!(summary.written, vec![bundle.clone()]);
    assert_eq!(summary.bundles, 1);
    assert!(!summary.has_errors());
    assert_eq!(
        std::fs::read_to_string(bundle).unwrap(),
        "interface Foo { }\nexport { Foo };\n"
    );
}

#[test]
fn test_out_dir_source_map_and_stats() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), INDEX_ENTRY);
    let out = dir.path().join("dist");
    let out_arg = out.display().to_string();

    let summary = run(&args(
        &manifest,
        &["--outDir", &out_arg, "--sourceMap", "--stats"],
    ))
    .unwrap();
    assert_eq!(summary.written.len(), 3);

    let code = std::fs::read_to_string(out.join("index.d.ts")).unwrap();
    assert!(
        code.ends_with("export { Foo };\n//# sourceMappingURL=index.d.ts.map\n"),
        "unexpected bundle: {code}"
    );

    let map: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("index.d.ts.map")).unwrap())
            .unwrap();
    assert_eq!(map["sources"], serde_json::json!(["a.ts"]));

    let stats: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join(STATS_FILE)).unwrap()).unwrap();
    assert_eq!(stats[0]["output"], "index.d.ts");
    assert_eq!(stats[0]["keptDeclarations"], 1);
    assert_eq!(stats[0]["removedDeclarations"], 1);
}

#[test]
fn test_nested_output_directories_are_created() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        dir.path(),
        r#"[ { "module": "index.ts", "output": "types/index.d.ts" } ]"#,
    );

    run(&args(&manifest, &[])).unwrap();
    assert!(dir.path().join("types").join("index.d.ts").is_file());
}

#[test]
fn test_entry_filter() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        dir.path(),
        r#"[ { "module": "index.ts", "output": "index.d.ts" },
             { "module": "a.ts", "output": "a.d.ts" } ]"#,
    );

    let summary = run(&args(&manifest, &["--entry", "a.ts"])).unwrap();
    assert_eq!(summary.written, vec![dir.path().join("a.d.ts")]);

    let err = run(&args(&manifest, &["--entry", "missing.ts"])).unwrap_err();
    assert!(err.to_string().contains("missing.ts"), "unexpected error: {err}");
}

#[test]
fn test_diagnostics_are_collected() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(
        dir.path(),
        r#"[ { "module": "index.ts", "output": "index.d.ts", "exports": ["Missing"] } ]"#,
    );

    let summary = run(&args(&manifest, &[])).unwrap();
    assert!(summary.has_errors());
    assert_eq!(summary.diagnostics[0].code, codes::UNKNOWN_ENTRY_EXPORT);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("index.d.ts")).unwrap(),
        "export {};\n",
        "bundles are still written when diagnostics are reported"
    );
}

#[test]
fn test_map_path() {
    assert_eq!(
        map_path_for(Path::new("dist/index.d.ts")),
        PathBuf::from("dist/index.d.ts.map")
    );
}
