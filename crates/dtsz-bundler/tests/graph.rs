use super::*;
use dtsz_syntax::builder::*;
use dtsz_syntax::{DeclarationUnit, TypeNode};

fn link_with(units: Vec<(&str, Vec<Statement>)>, options: &BundleOptions) -> (UnitStore, ModuleGraph) {
    let mut store = UnitStore::new();
    for (id, statements) in units {
        store.add(DeclarationUnit::new(id, statements)).unwrap();
    }
    let graph = ModuleGraph::build(&store, options);
    (store, graph)
}

fn link(units: Vec<(&str, Vec<Statement>)>) -> (UnitStore, ModuleGraph) {
    link_with(units, &BundleOptions::default())
}

fn symbol(graph: &ModuleGraph, module: &str, name: &str) -> DeclId {
    let module = graph.lookup(module).unwrap();
    graph.scope(module).unwrap().symbols[name][0]
}

fn surface_names(surface: &ExportSurface) -> Vec<&str> {
    surface.entries.iter().map(|e| e.name.as_str()).collect()
}

#[test]
fn test_reexport_chain_resolves_to_terminal_declaration() {
    let (_, graph) = link(vec![
        ("a.ts", vec![exported(interface("Foo", Vec::new()))]),
        ("b.ts", vec![export_named(Some("a.ts"), &[("Foo", "Bar")])]),
        (
            "index.ts",
            vec![
                export_all("b.ts", None),
                export_named(Some("b.ts"), &[("Bar", "Baz")]),
            ],
        ),
    ]);
    let foo = symbol(&graph, "a.ts", "Foo");
    let index = graph.lookup("index.ts").unwrap();
    let mut diagnostics = Vec::new();

    assert_eq!(
        graph.resolve_export(index, "Baz", &mut diagnostics),
        Resolution::Local(foo)
    );
    assert_eq!(
        graph.resolve_export(index, "Bar", &mut diagnostics),
        Resolution::Local(foo)
    );
    assert_eq!(
        graph.resolve_export(index, "Foo", &mut diagnostics),
        Resolution::Unresolved
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let surface = graph.export_surface(index, &mut diagnostics);
    assert_eq!(surface_names(&surface), vec!["Baz", "Bar"]);
}

#[test]
fn test_import_bindings_resolve_through_exports() {
    let (_, graph) = link(vec![
        ("a.ts", vec![exported_default(class(Some("Widget"), None, Vec::new()))]),
        (
            "index.ts",
            vec![
                import_default("a.ts", "W"),
                import_named("stream", &[("Readable", "Stream")]),
                import_namespace("a.ts", "a"),
            ],
        ),
    ]);
    let index = graph.lookup("index.ts").unwrap();
    let a = graph.lookup("a.ts").unwrap();
    let mut diagnostics = Vec::new();

    assert_eq!(
        graph.resolve_local(index, "W", &mut diagnostics),
        Resolution::Local(symbol(&graph, "a.ts", "Widget"))
    );
    assert_eq!(
        graph.resolve_local(index, "Stream", &mut diagnostics),
        Resolution::External(ExternalRef {
            specifier: "stream".to_string(),
            imported: ImportedName::Named("Readable".to_string()),
        })
    );
    assert_eq!(
        graph.resolve_local(index, "a", &mut diagnostics),
        Resolution::Namespace(a)
    );
    assert_eq!(
        graph.resolve_local(index, "Promise", &mut diagnostics),
        Resolution::Unresolved,
        "free globals resolve silently"
    );
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
    assert_eq!(graph.dependencies(index).collect::<Vec<_>>(), vec![a]);
}

#[test]
fn test_broken_import_reports_unresolved_import() {
    let (_, graph) = link(vec![
        ("a.ts", vec![exported(interface("Foo", Vec::new()))]),
        ("index.ts", vec![import_named("a.ts", &[("Missing", "Missing")])]),
    ]);
    let index = graph.lookup("index.ts").unwrap();
    let mut diagnostics = Vec::new();

    assert_eq!(
        graph.resolve_local(index, "Missing", &mut diagnostics),
        Resolution::Unresolved
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::UNRESOLVED_IMPORT);
    assert_eq!(diagnostics[0].file, "index.ts");
}

#[test]
fn test_reexport_cycle_is_reported_and_unresolved() {
    let (_, graph) = link(vec![
        ("a.ts", vec![export_named(Some("b.ts"), &[("x", "x")])]),
        ("b.ts", vec![export_named(Some("a.ts"), &[("x", "x")])]),
    ]);
    let a = graph.lookup("a.ts").unwrap();
    let mut diagnostics = Vec::new();

    assert_eq!(
        graph.resolve_export(a, "x", &mut diagnostics),
        Resolution::Unresolved
    );
    assert!(diagnostics.iter().any(|d| d.code == codes::REEXPORT_CYCLE));
}

#[test]
fn test_star_cycles_do_not_loop() {
    let (_, graph) = link(vec![
        (
            "a.ts",
            vec![export_all("b.ts", None), exported(interface("A", Vec::new()))],
        ),
        (
            "b.ts",
            vec![export_all("a.ts", None), exported(interface("B", Vec::new()))],
        ),
    ]);
    let a = graph.lookup("a.ts").unwrap();
    let mut diagnostics = Vec::new();
    let surface = graph.export_surface(a, &mut diagnostics);

    assert_eq!(surface_names(&surface), vec!["A", "B"]);
    assert_eq!(
        graph.resolve_export(a, "Nope", &mut diagnostics),
        Resolution::Unresolved
    );
}

#[test]
fn test_star_export_never_forwards_default() {
    let (_, graph) = link(vec![
        (
            "a.ts",
            vec![
                exported_default(interface("Hidden", Vec::new())),
                exported(interface("Shown", Vec::new())),
            ],
        ),
        ("index.ts", vec![export_all("a.ts", None)]),
    ]);
    let index = graph.lookup("index.ts").unwrap();
    let mut diagnostics = Vec::new();

    assert_eq!(
        graph.resolve_export(index, "default", &mut diagnostics),
        Resolution::Unresolved
    );
    let surface = graph.export_surface(index, &mut diagnostics);
    assert_eq!(surface_names(&surface), vec!["Shown"]);
}

#[test]
fn test_star_conflict_keeps_first_and_suffixes_the_rest() {
    let units = || {
        vec![
            ("a.ts", vec![exported(interface("Foo", Vec::new()))]),
            ("b.ts", vec![exported(interface("Foo", Vec::new()))]),
            (
                "index.ts",
                vec![export_all("a.ts", None), export_all("b.ts", None)],
            ),
        ]
    };

    let (_, graph) = link(units());
    let index = graph.lookup("index.ts").unwrap();
    let mut diagnostics = Vec::new();
    let surface = graph.export_surface(index, &mut diagnostics);
    assert_eq!(surface_names(&surface), vec!["Foo", "Foo_$0"]);
    assert_eq!(
        surface.get("Foo"),
        Some(&Resolution::Local(symbol(&graph, "a.ts", "Foo")))
    );
    assert_eq!(
        surface.get("Foo_$0"),
        Some(&Resolution::Local(symbol(&graph, "b.ts", "Foo")))
    );
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::AMBIGUOUS_STAR_EXPORT);
    assert!(!diagnostics[0].is_error());

    let options = BundleOptions {
        star_export_conflict: StarExportConflict::PreferLast,
        ..BundleOptions::default()
    };
    let (_, graph) = link_with(units(), &options);
    let index = graph.lookup("index.ts").unwrap();
    let surface = graph.export_surface(index, &mut Vec::new());
    assert_eq!(
        surface.get("Foo"),
        Some(&Resolution::Local(symbol(&graph, "b.ts", "Foo")))
    );
}

#[test]
fn test_star_conflict_suffix_skips_exported_names() {
    let (_, graph) = link(vec![
        (
            "a.ts",
            vec![
                exported(interface("Foo", Vec::new())),
                exported(interface("Foo_$0", Vec::new())),
            ],
        ),
        ("b.ts", vec![exported(interface("Foo", Vec::new()))]),
        (
            "index.ts",
            vec![export_all("a.ts", None), export_all("b.ts", None)],
        ),
    ]);
    let index = graph.lookup("index.ts").unwrap();
    let surface = graph.export_surface(index, &mut Vec::new());

    assert_eq!(surface.entries.len(), 3);
    assert_eq!(
        surface.get("Foo_$0"),
        Some(&Resolution::Local(symbol(&graph, "a.ts", "Foo_$0")))
    );
    assert_eq!(
        surface.get("Foo_$1"),
        Some(&Resolution::Local(symbol(&graph, "b.ts", "Foo")))
    );
}

#[test]
fn test_same_binding_through_two_stars_is_not_a_conflict() {
    let (_, graph) = link(vec![
        ("a.ts", vec![exported(interface("Foo", Vec::new()))]),
        ("b.ts", vec![export_all("a.ts", None)]),
        (
            "index.ts",
            vec![export_all("a.ts", None), export_all("b.ts", None)],
        ),
    ]);
    let index = graph.lookup("index.ts").unwrap();
    let mut diagnostics = Vec::new();
    let surface = graph.export_surface(index, &mut diagnostics);

    assert_eq!(surface_names(&surface), vec!["Foo"]);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[test]
fn test_external_star_sources_are_collected() {
    let (_, graph) = link(vec![
        ("a.ts", vec![export_all("events", None)]),
        (
            "index.ts",
            vec![export_all("a.ts", None), export_all("stream", None)],
        ),
    ]);
    let index = graph.lookup("index.ts").unwrap();
    let surface = graph.export_surface(index, &mut Vec::new());

    assert!(surface.entries.is_empty());
    assert_eq!(surface.external_stars, vec!["events", "stream"]);
}

#[test]
fn test_unresolved_surface_export_is_an_error() {
    let (_, graph) = link(vec![("index.ts", vec![export_named(None, &[("Ghost", "Ghost")])])]);
    let index = graph.lookup("index.ts").unwrap();
    let mut diagnostics = Vec::new();
    let surface = graph.export_surface(index, &mut diagnostics);

    assert_eq!(surface.get("Ghost"), Some(&Resolution::Unresolved));
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, codes::UNRESOLVED_EXPORT);
    assert!(diagnostics[0].is_error());
}

#[test]
fn test_merged_declarations_form_one_symbol() {
    let (_, graph) = link(vec![(
        "a.ts",
        vec![
            exported(interface("Foo", Vec::new())),
            exported(namespace("Foo", Vec::new())),
            variables(&[("a", TypeNode::keyword("string")), ("b", TypeNode::keyword("number"))]),
        ],
    )]);
    let foo = symbol(&graph, "a.ts", "Foo");
    assert_eq!(graph.symbol_decls(foo).len(), 2);
    assert_eq!(graph.decl(foo).map(|d| d.tag), Some(DeclarationTag::Interface));

    let b = symbol(&graph, "a.ts", "b");
    assert_eq!(graph.decl(b).map(|d| d.name.as_str()), Some("b"));
    assert_eq!(graph.symbol_decls(b), &[b]);

    let stats = graph.stats();
    assert_eq!(stats.modules, 1);
    assert_eq!(stats.declarations, 4);
    assert_eq!(stats.exports, 1);
}

#[test]
fn test_anonymous_default_export_gets_module_derived_name() {
    let (_, graph) = link(vec![(
        "src/my-lib.d.ts",
        vec![exported_default(class(None, None, Vec::new()))],
    )]);
    let module = graph.lookup("src/my-lib.d.ts").unwrap();
    let scope = graph.scope(module).unwrap();

    assert!(scope.symbols.contains_key("defaultMyLibExport"));
    assert_eq!(
        scope.exports.get("default"),
        Some(&ExportEntry::Local {
            local: "defaultMyLibExport".to_string()
        })
    );
}

#[test]
fn test_module_stem() {
    assert_eq!(module_stem("src/my-lib.d.ts"), "MyLib");
    assert_eq!(module_stem("index.ts"), "Index");
    assert_eq!(module_stem("@scope/pkg_name"), "PkgName");
    assert_eq!(default_export_name("a/b.ts"), "defaultBExport");
}

#[test]
fn test_export_assignment_is_recorded() {
    let (_, graph) = link(vec![(
        "index.ts",
        vec![
            namespace("Lib", Vec::new()),
            export_assignment("Lib"),
        ],
    )]);
    let index = graph.lookup("index.ts").unwrap();
    assert_eq!(
        graph.scope(index).unwrap().export_assignment.as_deref(),
        Some("Lib")
    );
}
