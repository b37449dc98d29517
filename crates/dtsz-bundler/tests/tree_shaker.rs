use super::*;
use crate::reference_graph::Reachability;
use dtsz_syntax::builder::*;
use dtsz_syntax::store::collect_decl_ids;
use dtsz_syntax::{DeclarationUnit, TypeNode};

fn store_with(statements: Vec<Statement>) -> (UnitStore, ModuleId) {
    let mut store = UnitStore::new();
    let module = store.add(DeclarationUnit::new("a.ts", statements)).unwrap();
    (store, module)
}

fn names(module: &ShakenModule) -> Vec<String> {
    module
        .statements
        .iter()
        .filter_map(Statement::as_declaration)
        .flat_map(|decl| match decl.name() {
            Some(name) => vec![name.to_string()],
            None => decl.declarators().iter().map(|d| d.name.clone()).collect(),
        })
        .collect()
}

#[test]
fn test_unreachable_declarations_are_removed() {
    let (store, module) = store_with(vec![
        exported(interface("Keep", Vec::new())),
        interface("Drop", Vec::new()),
        export_named(None, &[("Keep", "Alias")]),
    ]);
    let ids = collect_decl_ids(&store.get(module).unwrap().statements);
    let mut reach = Reachability::default();
    reach.decls.insert(ids[0]);

    let (shaken, stats) = shake(&store, &[module], &reach);

    assert_eq!(shaken.len(), 1);
    assert_eq!(shaken[0].path, "a.ts");
    assert_eq!(names(&shaken[0]), vec!["Keep"]);
    assert!(
        matches!(shaken[0].statements.last(), Some(Statement::Export(_))),
        "module plumbing is never shaken"
    );
    assert_eq!(stats, ShakeStats { kept: 1, removed: 1 });
}

#[test]
fn test_variable_statements_are_shaken_per_declarator() {
    let (store, module) = store_with(vec![
        variables(&[
            ("a", TypeNode::keyword("string")),
            ("b", TypeNode::keyword("number")),
        ]),
        variables(&[("c", TypeNode::keyword("boolean"))]),
    ]);
    let ids = collect_decl_ids(&store.get(module).unwrap().statements);
    let mut reach = Reachability::default();
    reach.decls.insert(ids[1]);

    let (shaken, stats) = shake(&store, &[module], &reach);

    assert_eq!(names(&shaken[0]), vec!["b"]);
    assert_eq!(
        shaken[0].statements.len(),
        1,
        "a statement without surviving declarators disappears"
    );
    assert_eq!(stats, ShakeStats { kept: 1, removed: 2 });
}

#[test]
fn test_shaking_leaves_the_store_untouched() {
    let (store, module) = store_with(vec![interface("Gone", Vec::new())]);
    let (shaken, stats) = shake(&store, &[module], &Reachability::default());

    assert!(shaken[0].statements.is_empty());
    assert_eq!(stats.removed, 1);
    assert_eq!(store.get(module).unwrap().statements.len(), 1);
}

#[test]
fn test_unknown_modules_are_skipped() {
    let (store, module) = store_with(Vec::new());
    let (shaken, _) = shake(&store, &[module, ModuleId(7)], &Reachability::default());
    assert_eq!(shaken.len(), 1);
}
