use super::*;
use crate::options::StarExportConflict;
use crate::stats::ExternalReference;
use dtsz_common::SourcePos;
use dtsz_syntax::builder::*;
use dtsz_syntax::{DeclarationUnit, TypeNode};

fn store_of(units: Vec<(&str, Vec<Statement>)>) -> UnitStore {
    let mut store = UnitStore::new();
    for (id, statements) in units {
        store.add(DeclarationUnit::new(id, statements)).unwrap();
    }
    store
}

fn bundle_with(store: &UnitStore, options: BundleOptions, entry: EntryPoint) -> BundleOutput {
    Bundler::new(store, options).bundle(&entry).unwrap()
}

fn bundle_index(store: &UnitStore) -> BundleOutput {
    bundle_with(
        store,
        BundleOptions::default(),
        EntryPoint::new("index.ts", "index.d.ts"),
    )
}

#[test]
fn test_colliding_declarations_are_renamed() {
    let store = store_of(vec![
        ("a.ts", vec![exported(interface("Foo", Vec::new()))]),
        ("b.ts", vec![exported(interface("Foo", Vec::new()))]),
        (
            "index.ts",
            vec![
                export_named(Some("a.ts"), &[("Foo", "AFoo")]),
                export_named(Some("b.ts"), &[("Foo", "BFoo")]),
            ],
        ),
    ]);
    let output = bundle_index(&store);

    assert_eq!(
        output.code,
        "interface Foo { }\ninterface Foo_$0 { }\nexport { Foo as AFoo, Foo_$0 as BFoo };\n"
    );
    assert_eq!(output.stats.renamed_bindings, 1);
    assert!(output.diagnostics.is_empty());
    assert_eq!(output.file_name, "index.d.ts");
}

#[test]
fn test_reexported_default_import_gets_an_alias() {
    let store = store_of(vec![
        (
            "a.ts",
            vec![exported_default(function(
                Some("create"),
                Vec::new(),
                TypeNode::keyword("void"),
            ))],
        ),
        (
            "index.ts",
            vec![import_default("a.ts", "make"), export_named(None, &[("make", "make")])],
        ),
    ]);
    let output = bundle_index(&store);

    assert_eq!(
        output.code,
        "declare function create(): void;\ndeclare const make: typeof create;\nexport { make };\n"
    );
}

#[test]
fn test_default_import_under_its_own_name_exports_the_declaration() {
    let index = (
        "index.ts",
        vec![import_default("a.ts", "Foo"), export_named(None, &[("Foo", "Foo")])],
    );
    let a = ("a.ts", vec![exported_default(interface("Foo", Vec::new()))]);

    for store in [store_of(vec![index.clone(), a.clone()]), store_of(vec![a, index])] {
        let output = bundle_index(&store);
        assert_eq!(output.code, "interface Foo { }\nexport { Foo };\n");
        assert_eq!(output.stats.renamed_bindings, 0);
        assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    }
}

#[test]
fn test_namespace_member_never_captures_an_imported_name() {
    let store = store_of(vec![
        ("a.ts", vec![exported(interface("Foo", Vec::new()))]),
        (
            "index.ts",
            vec![
                import_named("a.ts", &[("Foo", "AFoo")]),
                exported(namespace(
                    "NS",
                    vec![exported(interface(
                        "Foo",
                        vec![property("x", TypeNode::reference("AFoo"))],
                    ))],
                )),
            ],
        ),
    ]);
    let output = bundle_index(&store);

    assert_eq!(
        output.code,
        "interface Foo { }\ndeclare namespace NS {\n    interface Foo_$0 {\n        x: Foo;\n    }\n    export { Foo_$0 as Foo };\n}\nexport { NS };\n"
    );
}

#[test]
fn test_empty_bundle_keeps_module_marker() {
    let store = store_of(vec![
        ("empty.ts", Vec::new()),
        ("index.ts", vec![export_all("empty.ts", None)]),
    ]);
    assert_eq!(bundle_index(&store).code, "export {};\n");

    let options = BundleOptions {
        emit_module_marker: false,
        ..BundleOptions::default()
    };
    let output = bundle_with(&store, options, EntryPoint::new("index.ts", "index.d.ts"));
    assert_eq!(output.code, "");
}

#[test]
fn test_unused_declarations_are_shaken() {
    let store = store_of(vec![(
        "index.ts",
        vec![
            exported(interface("Api", vec![property("dep", TypeNode::reference("Dep"))])),
            interface("Dep", Vec::new()),
            interface("Unused", Vec::new()),
            exported(variables(&[("kept", TypeNode::reference("Api"))])),
        ],
    )]);
    let output = bundle_index(&store);

    assert_eq!(
        output.code,
        "interface Api {\n    dep: Dep;\n}\ninterface Dep { }\ndeclare const kept: Api;\nexport { Api, kept };\n"
    );
    assert_eq!(output.stats.kept_declarations, 3);
    assert_eq!(output.stats.removed_declarations, 1);
}

#[test]
fn test_namespace_import_is_materialized() {
    let store = store_of(vec![
        ("a.ts", vec![exported(interface("Foo", Vec::new()))]),
        (
            "index.ts",
            vec![
                import_namespace("a.ts", "lib"),
                exported(interface(
                    "Api",
                    vec![property("foo", TypeNode::reference("lib.Foo"))],
                )),
            ],
        ),
    ]);
    let output = bundle_index(&store);

    assert_eq!(
        output.code,
        "interface Foo { }\ninterface Api {\n    foo: lib.Foo;\n}\ndeclare namespace lib {\n    export { Foo };\n}\nexport { Api };\n"
    );
}

#[test]
fn test_external_imports_are_hoisted() {
    let store = store_of(vec![(
        "index.ts",
        vec![
            import_named("stream", &[("Readable", "Readable")]),
            exported(interface(
                "Api",
                vec![property("r", TypeNode::reference("Readable"))],
            )),
            export_all("events", None),
        ],
    )]);
    let output = bundle_index(&store);

    assert_eq!(
        output.code,
        "import { Readable } from \"stream\";\ninterface Api {\n    r: Readable;\n}\nexport * from \"events\";\nexport { Api };\n"
    );
    assert_eq!(
        output.stats.external_references,
        vec![ExternalReference {
            library: "stream".to_string(),
            symbol: "Readable".to_string(),
        }]
    );
    assert_eq!(output.stats.libraries(), vec!["stream"]);
}

#[test]
fn test_globals_are_never_captured() {
    let store = store_of(vec![
        (
            "a.ts",
            vec![exported(interface(
                "Api",
                vec![property("p", TypeNode::reference("Promise"))],
            ))],
        ),
        ("b.ts", vec![exported(interface("Promise", Vec::new()))]),
        (
            "index.ts",
            vec![
                export_named(Some("a.ts"), &[("Api", "Api")]),
                export_named(Some("b.ts"), &[("Promise", "MyPromise")]),
            ],
        ),
    ]);
    let output = bundle_index(&store);

    assert_eq!(
        output.code,
        "interface Api {\n    p: Promise;\n}\ninterface Promise_$0 { }\nexport { Api, Promise_$0 as MyPromise };\n"
    );
}

#[test]
fn test_star_conflict_policy_picks_the_plain_name() {
    let store = store_of(vec![
        ("a.ts", vec![exported(interface("Foo", vec![property("a", TypeNode::keyword("string"))]))]),
        ("b.ts", vec![exported(interface("Foo", vec![property("b", TypeNode::keyword("string"))]))]),
        (
            "index.ts",
            vec![export_all("a.ts", None), export_all("b.ts", None)],
        ),
    ]);

    let output = bundle_index(&store);
    assert_eq!(
        output.export_clause.get("Foo").map(|e| e.local.as_str()),
        Some("Foo")
    );
    assert!(
        output
            .diagnostics
            .iter()
            .any(|d| d.code == codes::AMBIGUOUS_STAR_EXPORT && !d.is_error())
    );

    let options = BundleOptions {
        star_export_conflict: StarExportConflict::PreferLast,
        ..BundleOptions::default()
    };
    let output = bundle_with(&store, options, EntryPoint::new("index.ts", "index.d.ts"));
    assert_eq!(
        output.export_clause.get("Foo").map(|e| e.local.as_str()),
        Some("Foo_$0"),
        "the later module's Foo is the renamed binding"
    );
}

#[test]
fn test_unknown_entry_is_fatal() {
    let store = store_of(vec![("index.ts", Vec::new())]);
    let err = Bundler::new(&store, BundleOptions::default())
        .bundle(&EntryPoint::new("missing.ts", "out.d.ts"))
        .unwrap_err();
    assert_eq!(err, BundleError::UnknownEntry("missing.ts".to_string()));
}

#[test]
fn test_required_exports_restrict_the_surface() {
    let store = store_of(vec![(
        "index.ts",
        vec![
            exported(interface("Foo", Vec::new())),
            exported(interface("Bar", Vec::new())),
        ],
    )]);
    let mut entry = EntryPoint::new("index.ts", "index.d.ts");
    entry.exports = Some(vec!["Foo".to_string(), "Nope".to_string()]);
    let output = bundle_with(&store, BundleOptions::default(), entry);

    assert_eq!(output.code, "interface Foo { }\nexport { Foo };\n");
    assert!(output.has_errors());
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].code, codes::UNKNOWN_ENTRY_EXPORT);
    assert_eq!(output.diagnostics[0].file, "index.ts");
}

#[test]
fn test_bundles_are_deterministic() {
    let store = store_of(vec![
        ("a.ts", vec![exported(interface("Foo", Vec::new()))]),
        ("b.ts", vec![exported(interface("Foo", Vec::new()))]),
        (
            "index.ts",
            vec![export_all("a.ts", Some("a")), export_all("b.ts", Some("b"))],
        ),
        ("other.ts", vec![export_named(Some("b.ts"), &[("Foo", "Foo")])]),
    ]);
    let bundler = Bundler::new(&store, BundleOptions::default());
    let entries = vec![
        EntryPoint::new("index.ts", "index.d.ts"),
        EntryPoint::new("other.ts", "other.d.ts"),
    ];

    let first = bundler.bundle_all(&entries).unwrap();
    let second = bundler.bundle_all(&entries).unwrap();
    let codes: Vec<&str> = first.iter().map(|o| o.code.as_str()).collect();
    assert_eq!(
        codes,
        second.iter().map(|o| o.code.as_str()).collect::<Vec<_>>()
    );
    assert_eq!(first[0].file_name, "index.d.ts");
    assert_eq!(first[1].file_name, "other.d.ts");
    assert_eq!(first[1].code, "interface Foo { }\nexport { Foo };\n");
}

#[test]
fn test_source_map_lists_origins() {
    let mut statement = exported(interface("Foo", Vec::new()));
    if let Some(decl) = statement.as_declaration_mut() {
        decl.pos = Some(SourcePos::new(3, 0));
    }
    let store = store_of(vec![("src/foo.ts", vec![statement])]);
    let options = BundleOptions {
        source_map: true,
        ..BundleOptions::default()
    };
    let output = bundle_with(&store, options, EntryPoint::new("src/foo.ts", "foo.d.ts"));

    let map: serde_json::Value =
        serde_json::from_str(output.source_map.as_deref().unwrap()).unwrap();
    assert_eq!(map["version"], 3);
    assert_eq!(map["file"], "foo.d.ts");
    assert_eq!(map["sources"], serde_json::json!(["src/foo.ts"]));
    assert!(!map["mappings"].as_str().unwrap().is_empty());

    let output = bundle_with(
        &store,
        BundleOptions::default(),
        EntryPoint::new("src/foo.ts", "foo.d.ts"),
    );
    assert!(output.source_map.is_none());
}
