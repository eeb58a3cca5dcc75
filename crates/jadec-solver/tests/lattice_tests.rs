use super::*;
use crate::{DefKind, DefinitionInfo, TypeInterner};

/// A small fixed universe: intrinsics, collections over them, a tuple, and a
/// diamond of concepts.
fn universe(interner: &TypeInterner) -> Vec<TypeId> {
    let store = interner.definitions();
    let (thing, thing_ty) = interner.declare(DefinitionInfo::new("Thing", DefKind::Concept, "o.Thing"));
    let (person, person_ty) =
        interner.declare(DefinitionInfo::new("Person", DefKind::Concept, "o.Person"));
    let (worker, worker_ty) =
        interner.declare(DefinitionInfo::new("Worker", DefKind::Concept, "o.Worker"));
    let (student, student_ty) =
        interner.declare(DefinitionInfo::new("Student", DefKind::Concept, "o.Student"));
    store.set_supertypes(person, &[thing]).expect("acyclic");
    store.set_supertypes(worker, &[person]).expect("acyclic");
    store.set_supertypes(student, &[person]).expect("acyclic");

    vec![
        TypeId::ANY,
        TypeId::NOTHING,
        TypeId::INTEGER,
        TypeId::REAL,
        TypeId::BOOLEAN,
        TypeId::TEXT,
        interner.list(TypeId::INTEGER),
        interner.list(TypeId::REAL),
        interner.list(TypeId::TEXT),
        interner.set(TypeId::INTEGER),
        interner.map(TypeId::TEXT, TypeId::INTEGER),
        interner.map(TypeId::INTEGER, TypeId::INTEGER),
        interner.tuple(vec![TypeId::INTEGER, TypeId::TEXT]),
        interner.tuple(vec![TypeId::REAL, TypeId::BOOLEAN]),
        thing_ty,
        person_ty,
        worker_ty,
        student_ty,
    ]
}

#[test]
fn test_scenario_numeric_and_unrelated() {
    let interner = TypeInterner::new();

    assert_eq!(lub(&interner, TypeId::INTEGER, TypeId::REAL), TypeId::REAL);
    assert_eq!(glb(&interner, TypeId::INTEGER, TypeId::REAL), TypeId::INTEGER);

    let bound = lub_explained(&interner, TypeId::INTEGER, TypeId::TEXT);
    assert_eq!(bound.type_id, TypeId::ANY);
    let note = bound.note.expect("degenerate bound carries a note");
    assert!(note.contains("integer"));
    assert!(note.contains("text"));

    let bound = glb_explained(&interner, TypeId::INTEGER, TypeId::TEXT);
    assert_eq!(bound.type_id, TypeId::NOTHING);
    assert!(bound.is_degenerate());
}

#[test]
fn test_lub_is_commutative_and_an_upper_bound() {
    let interner = TypeInterner::new();
    let types = universe(&interner);

    for &a in &types {
        for &b in &types {
            let ab = lub(&interner, a, b);
            let ba = lub(&interner, b, a);
            assert_eq!(ab, ba, "lub not commutative for {} / {}", a.0, b.0);
            assert!(compare(&interner, a, ab).is_subtype_or_equal());
            assert!(compare(&interner, b, ab).is_subtype_or_equal());
        }
    }
}

#[test]
fn test_glb_is_commutative_and_a_lower_bound() {
    let interner = TypeInterner::new();
    let types = universe(&interner);

    for &a in &types {
        for &b in &types {
            let ab = glb(&interner, a, b);
            assert_eq!(ab, glb(&interner, b, a));
            assert!(compare(&interner, ab, a).is_subtype_or_equal());
            assert!(compare(&interner, ab, b).is_subtype_or_equal());
        }
    }
}

#[test]
fn test_lub_is_deterministic() {
    let interner = TypeInterner::new();
    let types = universe(&interner);

    for &a in &types {
        for &b in &types {
            assert_eq!(lub_explained(&interner, a, b), lub_explained(&interner, a, b));
        }
    }
}

#[test]
fn test_siblings_meet_at_common_parent() {
    let interner = TypeInterner::new();
    let types = universe(&interner);
    let (person, worker, student) = (types[15], types[16], types[17]);

    assert_eq!(lub(&interner, worker, student), person);
    assert_eq!(glb(&interner, worker, student), TypeId::NOTHING);
}

#[test]
fn test_pointwise_variance() {
    let interner = TypeInterner::new();

    let ints = interner.list(TypeId::INTEGER);
    let texts = interner.list(TypeId::TEXT);
    let bound = lub_explained(&interner, ints, texts);
    assert_eq!(bound.type_id, interner.list(TypeId::ANY));
    assert!(bound.is_degenerate());

    let a = interner.tuple(vec![TypeId::INTEGER, TypeId::REAL]);
    let b = interner.tuple(vec![TypeId::REAL, TypeId::INTEGER]);
    assert_eq!(lub(&interner, a, b), interner.tuple(vec![TypeId::REAL, TypeId::REAL]));
    assert_eq!(
        glb(&interner, a, b),
        interner.tuple(vec![TypeId::INTEGER, TypeId::INTEGER])
    );

    // Invariant keys that differ fall back to the top.
    let m1 = interner.map(TypeId::INTEGER, TypeId::TEXT);
    let m2 = interner.map(TypeId::TEXT, TypeId::TEXT);
    assert_eq!(lub(&interner, m1, m2), TypeId::ANY);

    let f1 = interner.function(vec![TypeId::INTEGER], TypeId::INTEGER);
    let f2 = interner.function(vec![TypeId::REAL], TypeId::REAL);
    // Parameters meet, results join.
    assert_eq!(
        lub(&interner, f1, f2),
        interner.function(vec![TypeId::INTEGER], TypeId::REAL)
    );
}

#[test]
fn test_error_absorbs() {
    let interner = TypeInterner::new();

    assert_eq!(lub(&interner, TypeId::ERROR, TypeId::TEXT), TypeId::ERROR);
    assert_eq!(glb(&interner, TypeId::TEXT, TypeId::ERROR), TypeId::ERROR);
}

#[test]
fn test_host_assignability_fallback() {
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

    assert_eq!(lub(&interner, person_ty, legacy_ty), thing_ty);
    assert_eq!(lub(&interner, legacy_ty, person_ty), thing_ty);
}

#[test]
fn test_lub_all_folds_from_bottom() {
    let interner = TypeInterner::new();
    let lattice = TypeLattice::new(&interner);

    assert_eq!(lattice.lub_all([]).type_id, TypeId::NOTHING);
    assert_eq!(
        lattice.lub_all([TypeId::INTEGER, TypeId::INTEGER, TypeId::REAL]).type_id,
        TypeId::REAL
    );
    let bound = lattice.lub_all([TypeId::INTEGER, TypeId::TEXT, TypeId::BOOLEAN]);
    assert_eq!(bound.type_id, TypeId::ANY);
    assert!(bound.is_degenerate());
}
