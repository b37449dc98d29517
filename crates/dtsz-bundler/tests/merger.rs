use super::*;
use crate::deconflict::Deconflicter;
use crate::normalize;
use crate::options::BundleOptions;
use crate::reference_graph::{ReferenceGraph, Target, targets_of};
use crate::tree_shaker;
use dtsz_emitter::DeclarationPrinter;
use dtsz_syntax::builder::*;
use dtsz_syntax::{DeclarationUnit, UnitStore};

/// Run every pass up to and including the merger for `entry`.
fn merge(units: Vec<(&str, Vec<Statement>)>, entry: &str) -> Merged {
    let mut store = UnitStore::new();
    for (id, statements) in units {
        store.add(DeclarationUnit::new(id, statements)).unwrap();
    }
    let graph = ModuleGraph::build(&store, &BundleOptions::default());
    let references = ReferenceGraph::build(&store, &graph);
    let entry = store.lookup(entry).unwrap();

    let mut diagnostics = Vec::new();
    let surface = graph.export_surface(entry, &mut diagnostics);
    let mut roots: Vec<Target> = surface
        .entries
        .iter()
        .flat_map(|e| targets_of(&graph, &e.resolution))
        .collect();
    if let Some(expression) = &graph.scope(entry).unwrap().export_assignment {
        let resolution = graph.resolve_local(entry, expression, &mut diagnostics);
        roots.extend(targets_of(&graph, &resolution));
    }
    let reach = references.closure(&graph, roots, &mut diagnostics);
    let modules = references.module_closure(&graph, entry);
    let (shaken, _) = tree_shaker::shake(&store, &modules, &reach);

    let out = Deconflicter::new(
        &graph,
        &reach,
        entry,
        IdAllocator::starting_at(store.next_decl_id()),
    )
    .run(shaken);
    let mut shaken = out.modules;
    let mut ids = out.ids;
    normalize::ensure_declare(&mut shaken);
    let intents = normalize::strip_exports(&mut shaken, &out.bindings);

    Merger {
        graph: &graph,
        entry,
        surface: &surface.entries,
        external_stars: &surface.external_stars,
        modules: &shaken,
        bindings: &out.bindings,
        synthetic: &out.synthetic,
        intents: &intents,
    }
    .merge(&mut ids)
}

fn printed(statements: &[Statement]) -> Vec<String> {
    statements
        .iter()
        .map(|statement| {
            let mut printer = DeclarationPrinter::new();
            printer.print_statement(statement);
            printer.finish().0
        })
        .collect()
}

fn clause(merged: &Merged) -> Vec<(&str, &str)> {
    merged
        .export
        .entries
        .iter()
        .map(|e| (e.local.as_str(), e.exported.as_str()))
        .collect()
}

fn generic_class(name: &str, param: &str) -> Statement {
    let mut statement = class(Some(name), None, Vec::new());
    if let Some(decl) = statement.as_declaration_mut() {
        if let DeclarationKind::Class(class) = &mut decl.kind {
            class.type_parameters.push(type_param(param, None));
        }
    }
    statement
}

#[test]
fn test_clause_uses_final_bindings() {
    let merged = merge(
        vec![
            ("a.ts", vec![exported(interface("Foo", Vec::new()))]),
            (
                "index.ts",
                vec![
                    exported(interface("Foo", Vec::new())),
                    export_named(Some("a.ts"), &[("Foo", "AFoo")]),
                ],
            ),
        ],
        "index.ts",
    );

    assert_eq!(clause(&merged), vec![("Foo_$0", "Foo"), ("Foo", "AFoo")]);
    assert!(merged.statements.is_empty());
    assert_eq!(merged.export.assignment, None);
}

#[test]
fn test_default_function_import_becomes_const_alias() {
    let merged = merge(
        vec![
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
        ],
        "index.ts",
    );

    assert_eq!(clause(&merged), vec![("make", "make")]);
    assert_eq!(
        printed(&merged.statements),
        vec!["declare const make: typeof create;"]
    );
}

#[test]
fn test_default_class_import_becomes_value_and_type_alias() {
    let merged = merge(
        vec![
            ("a.ts", vec![exported_default(generic_class("Widget", "T"))]),
            (
                "index.ts",
                vec![import_default("a.ts", "W"), export_named(None, &[("W", "W")])],
            ),
        ],
        "index.ts",
    );

    assert_eq!(
        printed(&merged.statements),
        vec!["declare const W: typeof Widget;", "type W<T> = Widget<T>;"]
    );
}

#[test]
fn test_default_interface_import_becomes_type_alias_only() {
    let merged = merge(
        vec![
            ("a.ts", vec![exported_default(interface("Options", Vec::new()))]),
            (
                "index.ts",
                vec![
                    import_default("a.ts", "Opts"),
                    export_named(None, &[("Opts", "Opts")]),
                ],
            ),
        ],
        "index.ts",
    );

    assert_eq!(printed(&merged.statements), vec!["type Opts = Options;"]);
}

#[test]
fn test_namespace_import_is_materialized() {
    let merged = merge(
        vec![
            (
                "a.ts",
                vec![
                    exported(interface("Foo", Vec::new())),
                    interface("Bar", Vec::new()),
                    export_named(None, &[("Bar", "Baz")]),
                ],
            ),
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
        ],
        "index.ts",
    );

    assert_eq!(clause(&merged), vec![("Api", "Api")]);
    assert_eq!(
        printed(&merged.statements),
        vec!["declare namespace lib {\n    export { Foo, Bar as Baz };\n}"]
    );
}

#[test]
fn test_reexported_namespace_of_empty_module() {
    let merged = merge(
        vec![
            ("empty.ts", Vec::new()),
            ("index.ts", vec![export_all("empty.ts", Some("nothing"))]),
        ],
        "index.ts",
    );

    assert_eq!(clause(&merged), vec![("nothing", "nothing")]);
    assert_eq!(
        printed(&merged.statements),
        vec!["declare namespace nothing { }"]
    );
}

#[test]
fn test_export_assignment_and_external_stars() {
    let merged = merge(
        vec![(
            "index.ts",
            vec![
                namespace("Lib", Vec::new()),
                export_assignment("Lib"),
                export_all("events", None),
            ],
        )],
        "index.ts",
    );

    assert!(merged.export.entries.is_empty());
    assert_eq!(merged.export.assignment.as_deref(), Some("Lib"));
    assert_eq!(merged.export.external_stars, vec!["events".to_string()]);
}
