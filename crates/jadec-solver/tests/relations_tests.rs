use super::*;
use crate::{DefKind, DefinitionInfo, TypeInterner};

#[test]
fn test_extremes() {
    let interner = TypeInterner::new();
    let list = interner.list(TypeId::TEXT);

    for t in [TypeId::INTEGER, TypeId::TEXT, list] {
        assert_eq!(compare(&interner, t, TypeId::ANY), TypeRelationship::Subtype);
        assert_eq!(compare(&interner, TypeId::NOTHING, t), TypeRelationship::Subtype);
        assert_eq!(compare(&interner, t, t), TypeRelationship::Equal);
    }
    assert_eq!(
        compare(&interner, TypeId::ANY, TypeId::NOTHING),
        TypeRelationship::Supertype
    );
}

#[test]
fn test_error_is_related_to_everything() {
    let interner = TypeInterner::new();

    assert_eq!(compare(&interner, TypeId::ERROR, TypeId::TEXT), TypeRelationship::Equal);
    assert!(is_subtype_of(&interner, TypeId::BOOLEAN, TypeId::ERROR));
}

#[test]
fn test_numeric_promotion() {
    let interner = TypeInterner::new();

    assert_eq!(compare(&interner, TypeId::INTEGER, TypeId::REAL), TypeRelationship::Subtype);
    assert_eq!(compare(&interner, TypeId::REAL, TypeId::INTEGER), TypeRelationship::Supertype);
    assert_eq!(compare(&interner, TypeId::INTEGER, TypeId::TEXT), TypeRelationship::Unrelated);
}

#[test]
fn test_collection_variance() {
    let interner = TypeInterner::new();
    let ints = interner.list(TypeId::INTEGER);
    let reals = interner.list(TypeId::REAL);
    assert_eq!(compare(&interner, ints, reals), TypeRelationship::Subtype);

    // Map keys are invariant, values covariant.
    let int_keys = interner.map(TypeId::INTEGER, TypeId::TEXT);
    let real_keys = interner.map(TypeId::REAL, TypeId::TEXT);
    assert_eq!(compare(&interner, int_keys, real_keys), TypeRelationship::Unrelated);
    let int_values = interner.map(TypeId::TEXT, TypeId::INTEGER);
    let real_values = interner.map(TypeId::TEXT, TypeId::REAL);
    assert_eq!(compare(&interner, int_values, real_values), TypeRelationship::Subtype);

    // Tuples of different arity never relate.
    let pair = interner.tuple(vec![TypeId::INTEGER, TypeId::INTEGER]);
    let triple = interner.tuple(vec![TypeId::INTEGER, TypeId::INTEGER, TypeId::INTEGER]);
    assert_eq!(compare(&interner, pair, triple), TypeRelationship::Unrelated);
}

#[test]
fn test_function_parameters_are_contravariant() {
    let interner = TypeInterner::new();
    let takes_real = interner.function(vec![TypeId::REAL], TypeId::INTEGER);
    let takes_int = interner.function(vec![TypeId::INTEGER], TypeId::REAL);

    assert_eq!(compare(&interner, takes_real, takes_int), TypeRelationship::Subtype);
}

#[test]
fn test_nominal_graph_and_host_assignability() {
    let interner = TypeInterner::new();
    let store = interner.definitions();
    let (thing, thing_ty) = interner.declare(DefinitionInfo::new("Thing", DefKind::Concept, "o.Thing"));
    let (person, person_ty) =
        interner.declare(DefinitionInfo::new("Person", DefKind::Concept, "o.Person"));
    store.set_supertypes(person, &[thing]).expect("acyclic");
    let (_, legacy_ty) = interner.declare(
        DefinitionInfo::new("Legacy", DefKind::Native, "lib.Legacy")
            .with_host_supertypes(vec!["o.Thing".to_string()]),
    );

    assert_eq!(compare(&interner, person_ty, thing_ty), TypeRelationship::Subtype);
    assert_eq!(compare(&interner, legacy_ty, thing_ty), TypeRelationship::Subtype);
    assert_eq!(compare(&interner, legacy_ty, person_ty), TypeRelationship::Unrelated);
}

#[test]
fn test_requirement_predicates() {
    use RelationshipRequirement as R;
    use TypeRelationship as T;

    assert!(R::Related.is_satisfied_by(T::Supertype));
    assert!(!R::Related.is_satisfied_by(T::Unrelated));
    assert!(R::SupertypeOrEqual.is_satisfied_by(T::Equal));
    assert!(!R::SupertypeOrEqual.is_satisfied_by(T::Subtype));
    assert!(T::Subtype.flip().is_strict_supertype());
    assert!(T::Subtype.satisfies(R::SubtypeOrEqual));
}
