use super::*;
use crate::types::TypeNode;

#[test]
fn test_declaration_deserializes_from_manifest_json() {
    let json = r#"{
        "kind": "declaration",
        "declaration": "interface",
        "modifiers": ["export"],
        "name": "Foo",
        "extends": [{ "expression": "Bar" }],
        "members": [
            {
                "kind": "property",
                "name": { "kind": "identifier", "name": "a" },
                "typeAnnotation": { "kind": "reference", "name": "ns.Baz" }
            }
        ]
    }"#;

    let statement: Statement = serde_json::from_str(json).unwrap();
    let decl = statement.as_declaration().unwrap();
    assert_eq!(decl.name(), Some("Foo"));
    assert_eq!(decl.tag(), DeclarationTag::Interface);
    assert!(decl.is_exported());
    assert!(!decl.is_default_export());
    assert!(decl.id.is_none(), "identities are never read from input");

    let DeclarationKind::Interface(iface) = &decl.kind else {
        panic!("expected interface");
    };
    assert_eq!(iface.extends[0].expression.root(), "Bar");
    match &iface.members[0] {
        crate::types::Member::Property {
            type_annotation: Some(TypeNode::Reference { name, .. }),
            ..
        } => assert_eq!(name.segments, vec!["ns", "Baz"]),
        other => panic!("unexpected member {other:?}"),
    }
}

#[test]
fn test_import_bindings_enumerate_every_local() {
    let json = r#"{
        "kind": "import",
        "source": "./a",
        "default": "A",
        "named": [{ "imported": "b", "local": "c" }]
    }"#;
    let statement: Statement = serde_json::from_str(json).unwrap();
    let Statement::Import(import) = statement else {
        panic!("expected import");
    };
    let bindings: Vec<_> = import.bindings().collect();
    assert_eq!(bindings, vec![("A", "default"), ("c", "b")]);
}

#[test]
fn test_unknown_modifier_is_rejected() {
    let json = r#"{ "kind": "declaration", "declaration": "enum",
                    "modifiers": ["exported"], "name": "E" }"#;
    let err = serde_json::from_str::<Statement>(json).unwrap_err();
    assert!(err.to_string().contains("unknown modifier"), "{err}");
}

#[test]
fn test_declare_requirement_by_kind() {
    assert!(DeclarationTag::Function.requires_declare());
    assert!(DeclarationTag::Namespace.requires_declare());
    assert!(!DeclarationTag::Interface.requires_declare());
    assert!(!DeclarationTag::TypeAlias.requires_declare());
    assert!(DeclarationTag::Class.has_value() && DeclarationTag::Class.has_type());
}
