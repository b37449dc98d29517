use super::*;
use crate::builder::*;
use crate::types::TypeNode;

fn unit(id: &str, statements: Vec<Statement>) -> DeclarationUnit {
    DeclarationUnit::new(id, statements)
}

#[test]
fn test_add_assigns_module_ids_in_order() {
    let mut store = UnitStore::new();
    let a = store.add(unit("a.ts", Vec::new())).unwrap();
    let b = store.add(unit("b.ts", Vec::new())).unwrap();

    assert_eq!(a, ModuleId(0));
    assert_eq!(b, ModuleId(1));
    assert_eq!(store.lookup("b.ts"), Some(b));
    assert_eq!(store.lookup("lodash"), None);
    assert_eq!(store.get(a).map(|u| u.id.as_str()), Some("a.ts"));
}

#[test]
fn test_duplicate_and_empty_module_ids_are_rejected() {
    let mut store = UnitStore::new();
    store.add(unit("a.ts", Vec::new())).unwrap();

    assert_eq!(
        store.add(unit("a.ts", Vec::new())),
        Err(StoreError::DuplicateModule("a.ts".to_string()))
    );
    assert_eq!(store.add(unit("", Vec::new())), Err(StoreError::EmptyModuleId));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_decl_ids_are_unique_across_modules() {
    let mut store = UnitStore::new();
    let a = store
        .add(unit(
            "a.ts",
            vec![
                interface("Foo", Vec::new()),
                variables(&[
                    ("x", TypeNode::keyword("number")),
                    ("y", TypeNode::keyword("string")),
                ]),
            ],
        ))
        .unwrap();
    let b = store
        .add(unit("b.ts", vec![interface("Foo", Vec::new())]))
        .unwrap();

    let mut ids = collect_decl_ids(&store.get(a).unwrap().statements);
    ids.extend(collect_decl_ids(&store.get(b).unwrap().statements));

    assert_eq!(ids.len(), 4, "one id per interface and per declarator");
    assert!(ids.iter().all(|id| !id.is_none()));
    let mut sorted = ids.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), ids.len(), "ids must never be reused: {ids:?}");
}

#[test]
fn test_nested_type_parameters_receive_ids() {
    let mut store = UnitStore::new();
    let alias = type_alias(
        "Box",
        vec![type_param("T", Some(TypeNode::reference("Foo")))],
        TypeNode::reference("T"),
    );
    let module = store.add(unit("a.ts", vec![alias])).unwrap();

    let decl = store.get(module).unwrap().statements[0]
        .as_declaration()
        .unwrap();
    let DeclarationKind::TypeAlias(alias) = &decl.kind else {
        panic!("expected a type alias, got {:?}", decl.kind);
    };
    assert!(!decl.id.is_none());
    assert!(!alias.type_parameters[0].id.is_none());
    assert_ne!(decl.id, alias.type_parameters[0].id);
    assert!(store.next_decl_id() > alias.type_parameters[0].id.0);
}
