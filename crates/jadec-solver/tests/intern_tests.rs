use super::*;

fn concept(interner: &TypeInterner, name: &str) -> (DefId, TypeId) {
    interner.declare(DefinitionInfo::new(name, DefKind::Concept, format!("onto.{name}")))
}

#[test]
fn test_interner_intrinsics() {
    let interner = TypeInterner::new();

    for kind in IntrinsicKind::ALL {
        assert_eq!(
            interner.lookup(kind.type_id()),
            Some(TypeData::Intrinsic(kind))
        );
    }
    assert_eq!(interner.len(), TypeId::FIRST_USER as usize);
}

#[test]
fn test_interner_deduplication() {
    let interner = TypeInterner::new();

    let a = interner.list(TypeId::INTEGER);
    let b = interner.list(TypeId::INTEGER);
    let c = interner.list(TypeId::TEXT);

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(
        interner.tuple(vec![TypeId::INTEGER, TypeId::TEXT]),
        interner.tuple(vec![TypeId::INTEGER, TypeId::TEXT])
    );
}

#[test]
fn test_keyword_lookup_skips_error() {
    assert_eq!(IntrinsicKind::from_keyword("integer"), Some(IntrinsicKind::Integer));
    assert_eq!(IntrinsicKind::from_keyword("any"), Some(IntrinsicKind::Any));
    assert_eq!(IntrinsicKind::from_keyword("error"), None);
    assert_eq!(IntrinsicKind::from_keyword("Person"), None);
}

#[test]
fn test_declare_native_interns_host_type() {
    let interner = TypeInterner::new();
    let (_, date) = interner.declare(DefinitionInfo::new("Date", DefKind::Native, "java.util.Date"));
    let (_, person) = concept(&interner, "Person");

    assert!(matches!(interner.lookup(date), Some(TypeData::Host(_))));
    assert!(matches!(interner.lookup(person), Some(TypeData::Nominal(_))));
    assert_eq!(category(&interner, date), TypeCategory::Host);
    assert_eq!(category(&interner, person), TypeCategory::Nominal);
}

#[test]
fn test_format_uses_source_syntax() {
    let interner = TypeInterner::new();
    let (_, person) = concept(&interner, "Person");

    let map = interner.map(TypeId::TEXT, TypeId::INTEGER);
    assert_eq!(format_type(&interner, map), "map of text:integer");

    let tuple = interner.tuple(vec![TypeId::INTEGER, TypeId::TEXT]);
    assert_eq!(format_type(&interner, tuple), "(integer, text)");

    let nested = interner.list(interner.map(TypeId::TEXT, person));
    assert_eq!(format_type(&interner, nested), "list of (map of text:Person)");

    let func = interner.function(vec![TypeId::INTEGER], TypeId::BOOLEAN);
    assert_eq!(format_type(&interner, func), "function (integer) -> boolean");
}

#[test]
fn test_host_names() {
    let interner = TypeInterner::new();
    let (_, person) = concept(&interner, "Person");

    assert_eq!(host::host_type_name(&interner, TypeId::INTEGER), "java.lang.Integer");
    assert_eq!(host::host_type_name(&interner, TypeId::REAL), "java.lang.Float");
    assert_eq!(
        host::host_type_name(&interner, interner.list(TypeId::TEXT)),
        "jadescript.util.JadescriptList<java.lang.String>"
    );
    let tuple = interner.tuple(vec![TypeId::INTEGER, person]);
    assert_eq!(
        host::host_type_name(&interner, tuple),
        "jadescript.util.types.Tuple2<java.lang.Integer, onto.Person>"
    );
    assert_eq!(
        host::host_raw_class(&interner, tuple),
        "jadescript.util.types.Tuple2"
    );
    assert!(host::uses_reference_equality(TypeId::BOOLEAN));
    assert!(!host::uses_reference_equality(TypeId::TEXT));
}

#[test]
fn test_supertype_cycle_is_rejected() {
    let interner = TypeInterner::new();
    let store = interner.definitions();
    let (a, _) = concept(&interner, "A");
    let (b, _) = concept(&interner, "B");
    let (c, _) = concept(&interner, "C");

    store.set_supertypes(b, &[a]).expect("B extends A");
    store.set_supertypes(c, &[b]).expect("C extends B");

    let err = store.set_supertypes(a, &[c]).unwrap_err();
    assert!(matches!(err, DefinitionError::CyclicSupertype { .. }));
    assert!(err.to_string().contains("'A' cannot extend 'C'"));
    assert!(store.direct_supertypes(a).is_empty());

    assert!(matches!(
        store.set_supertypes(a, &[a]),
        Err(DefinitionError::CyclicSupertype { .. })
    ));
}

#[test]
fn test_inherited_properties_come_first() {
    let interner = TypeInterner::new();
    let store = interner.definitions();
    let (thing, _) = concept(&interner, "Thing");
    let (person, _) = concept(&interner, "Person");
    store.set_properties(thing, vec![PropertyInfo::new("id", TypeId::INTEGER)]);
    store.set_properties(
        person,
        vec![
            PropertyInfo::new("name", TypeId::TEXT),
            PropertyInfo::new("id", TypeId::INTEGER),
        ],
    );
    store.set_supertypes(person, &[thing]).expect("no cycle");

    let names: Vec<String> = store
        .all_properties(person)
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(names, vec!["id".to_string(), "name".to_string()]);
    assert_eq!(
        store.property(person, "id").map(|p| p.type_id),
        Some(TypeId::INTEGER)
    );
    assert!(store.property(thing, "name").is_none());
}
