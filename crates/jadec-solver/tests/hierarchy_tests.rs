use super::*;
use crate::{DefinitionInfo, TypeInterner};

#[test]
fn test_intrinsic_walk_ends_at_any() {
    let interner = TypeInterner::new();

    let walk: Vec<TypeId> = all_supertypes(&interner, TypeId::INTEGER).collect();
    assert_eq!(walk, vec![TypeId::INTEGER, TypeId::REAL, TypeId::ANY]);

    let walk: Vec<TypeId> = all_supertypes(&interner, TypeId::ANY).collect();
    assert_eq!(walk, vec![TypeId::ANY]);
}

#[test]
fn test_collection_walk_is_direct_to_any() {
    let interner = TypeInterner::new();
    let list = interner.list(TypeId::INTEGER);

    assert_eq!(direct_supertypes(&interner, list).as_slice(), &[TypeId::ANY]);
    assert_eq!(all_supertypes(&interner, list).count(), 2);
}

#[test]
fn test_diamond_is_walked_breadth_first_once() {
    let interner = TypeInterner::new();
    let store = interner.definitions();
    let (top, top_ty) = interner.declare(DefinitionInfo::new("Top", DefKind::Concept, "o.Top"));
    let (left, left_ty) = interner.declare(DefinitionInfo::new("Left", DefKind::Concept, "o.Left"));
    let (right, right_ty) =
        interner.declare(DefinitionInfo::new("Right", DefKind::Concept, "o.Right"));
    let (bottom, bottom_ty) =
        interner.declare(DefinitionInfo::new("Bottom", DefKind::Concept, "o.Bottom"));
    store.set_supertypes(left, &[top]).expect("acyclic");
    store.set_supertypes(right, &[top]).expect("acyclic");
    store.set_supertypes(bottom, &[left, right]).expect("acyclic");

    let walk: Vec<TypeId> = all_supertypes(&interner, bottom_ty).collect();
    assert_eq!(walk, vec![bottom_ty, left_ty, right_ty, top_ty, TypeId::ANY]);
}

#[test]
fn test_native_supertypes_are_host_types() {
    let interner = TypeInterner::new();
    let store = interner.definitions();
    let (base, base_ty) =
        interner.declare(DefinitionInfo::new("Base", DefKind::Native, "java.util.AbstractList"));
    let (derived, _) =
        interner.declare(DefinitionInfo::new("Derived", DefKind::Native, "java.util.ArrayList"));
    store.set_supertypes(derived, &[base]).expect("acyclic");

    let derived_ty = interner.host(derived);
    assert_eq!(direct_supertypes(&interner, derived_ty).as_slice(), &[base_ty]);
}
