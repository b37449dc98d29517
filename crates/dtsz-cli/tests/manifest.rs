use super::*;
use dtsz_bundler::StarExportConflict;

const MANIFEST: &str = r#"{
    "modules": [
        {
            "id": "a.ts",
            "statements": [
                {
                    "kind": "declaration",
                    "declaration": "interface",
                    "modifiers": ["export"],
                    "name": "Foo",
                    "members": []
                }
            ]
        },
        {
            "id": "index.ts",
            "statements": [
                { "kind": "exportAll", "source": "a.ts" }
            ]
        }
    ],
    "entries": [
        { "module": "index.ts", "output": "index.d.ts" },
        { "module": "a.ts", "output": "a.d.ts", "exports": ["Foo"] }
    ],
    "options": { "starExportConflict": "preferLast" }
}"#;

#[test]
fn test_manifest_parses_units_entries_and_options() {
    let manifest = Manifest::parse(MANIFEST).unwrap();

    assert_eq!(manifest.modules.len(), 2);
    assert_eq!(manifest.entries[0], EntryPoint::new("index.ts", "index.d.ts"));
    assert_eq!(manifest.entries[1].exports, Some(vec!["Foo".to_string()]));
    assert_eq!(
        manifest.options.star_export_conflict,
        StarExportConflict::PreferLast
    );
    assert!(
        manifest.options.reserve_globals,
        "omitted options keep their defaults"
    );
}

#[test]
fn test_options_are_optional() {
    let manifest = Manifest::parse(r#"{ "modules": [], "entries": [] }"#).unwrap();
    assert_eq!(manifest.options, BundleOptions::default());
}

#[test]
fn test_into_parts_builds_the_store() {
    let (store, entries, _) = Manifest::parse(MANIFEST).unwrap().into_parts().unwrap();
    assert_eq!(store.len(), 2);
    assert!(store.lookup("index.ts").is_some());
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_duplicate_module_ids_are_rejected() {
    let text = r#"{
        "modules": [ { "id": "a.ts" }, { "id": "a.ts" } ],
        "entries": []
    }"#;
    let err = Manifest::parse(text).unwrap().into_parts().unwrap_err();
    assert!(err.to_string().contains("a.ts"), "unexpected error: {err}");
}

#[test]
fn test_load_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = Manifest::load(&path).unwrap_err();
    assert!(
        format!("{err:#}").contains("missing.json"),
        "unexpected error: {err:#}"
    );
}
