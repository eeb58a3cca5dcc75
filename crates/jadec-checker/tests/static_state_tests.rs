//! Tests for the persistent static state: scopes, facts, reachability and
//! joins.

use jadec_checker::{ExpressionDescriptor, NamedSymbol, StaticState};
use jadec_common::{Atom, Interner};
use jadec_solver::{TypeId, TypeInterner};

fn atoms(names: &[&str]) -> Vec<Atom> {
    let mut interner = Interner::new();
    names.iter().map(|n| interner.intern(n)).collect()
}

fn local(name: &str, type_id: TypeId) -> NamedSymbol {
    NamedSymbol::local(name, type_id)
}

#[test]
fn test_inner_scope_shadows_and_exit_restores() {
    let a = atoms(&["x"]);
    let x = a[0];
    let outer = StaticState::new().assert_named_symbol(x, local("x", TypeId::INTEGER));
    let inner = outer
        .enter_scope()
        .assert_named_symbol(x, local("x", TypeId::TEXT));

    assert_eq!(inner.search_name(x).map(|s| s.type_id), Some(TypeId::TEXT));
    assert!(inner.is_bound_in_current_scope(x));
    assert_eq!(inner.depth(), outer.depth() + 1);

    let back = inner.exit_scope();
    assert_eq!(back.search_name(x).map(|s| s.type_id), Some(TypeId::INTEGER));
    assert_eq!(back.depth(), outer.depth());
}

#[test]
fn test_old_snapshots_are_unchanged() {
    let a = atoms(&["x", "y"]);
    let before = StaticState::new().assert_named_symbol(a[0], local("x", TypeId::ANY));
    let after = before
        .assert_named_symbol(a[1], local("y", TypeId::TEXT))
        .assert_flow_type(ExpressionDescriptor::name(a[0]), TypeId::TEXT);

    assert!(!before.is_bound(a[1]));
    assert_eq!(before.flow_type_of(&ExpressionDescriptor::name(a[0])), None);
    assert!(after.is_bound(a[1]));
    assert_eq!(
        after.flow_type_of(&ExpressionDescriptor::name(a[0])),
        Some(TypeId::TEXT)
    );
}

#[test]
fn test_facts_are_monotonic_on_a_straight_path() {
    let a = atoms(&["v"]);
    let v = ExpressionDescriptor::name(a[0]);
    let state = StaticState::new()
        .assert_named_symbol(a[0], local("v", TypeId::ANY))
        .assert_flow_type(v.clone(), TypeId::REAL)
        .assert_flow_type(v.clone(), TypeId::INTEGER);

    assert_eq!(state.flow_type_of(&v), Some(TypeId::INTEGER));
}

#[test]
fn test_assignment_drops_facts_about_owned_properties() {
    let a = atoms(&["p", "name", "age"]);
    let p = ExpressionDescriptor::name(a[0]);
    let name_of_p = p.property(a[1]);
    let age_of_p = p.property(a[2]);
    let state = StaticState::new()
        .assert_named_symbol(a[0], local("p", TypeId::ANY))
        .assert_flow_type(p.clone(), TypeId::ANY)
        .assert_flow_type(name_of_p.clone(), TypeId::TEXT)
        .assert_flow_type(age_of_p.clone(), TypeId::INTEGER);

    let reassigned_name = state.assert_assignment(&name_of_p);
    assert_eq!(reassigned_name.flow_type_of(&name_of_p), None);
    assert_eq!(reassigned_name.flow_type_of(&age_of_p), Some(TypeId::INTEGER));

    let reassigned_root = state.assert_assignment(&p);
    assert!(reassigned_root.visible_facts().is_empty());
}

#[test]
fn test_rebinding_a_name_forgets_its_facts() {
    let a = atoms(&["x"]);
    let x = ExpressionDescriptor::name(a[0]);
    let state = StaticState::new()
        .assert_named_symbol(a[0], local("x", TypeId::ANY))
        .assert_flow_type(x.clone(), TypeId::TEXT)
        .assert_named_symbol(a[0], local("x", TypeId::ANY));

    assert_eq!(state.flow_type_of(&x), None);
}

#[test]
fn test_join_keeps_common_facts_weakened_to_their_bound() {
    let types = TypeInterner::new();
    let a = atoms(&["v", "w"]);
    let (v, w) = (ExpressionDescriptor::name(a[0]), ExpressionDescriptor::name(a[1]));
    let base = StaticState::new()
        .assert_named_symbol(a[0], local("v", TypeId::ANY))
        .assert_named_symbol(a[1], local("w", TypeId::ANY));
    let left = base
        .assert_flow_type(v.clone(), TypeId::INTEGER)
        .assert_flow_type(w.clone(), TypeId::TEXT);
    let right = base.assert_flow_type(v.clone(), TypeId::REAL);

    let joined = left.intersect(&right, &types);
    assert_eq!(joined.flow_type_of(&v), Some(TypeId::REAL));
    assert_eq!(joined.flow_type_of(&w), None);
    assert!(joined.is_bound(a[0]));
}

#[test]
fn test_join_keeps_only_names_bound_on_every_path() {
    let types = TypeInterner::new();
    let a = atoms(&["x", "y"]);
    let base = StaticState::new().assert_named_symbol(a[0], local("x", TypeId::INTEGER));
    let left = base.assert_named_symbol(a[1], local("y", TypeId::TEXT));

    let joined = left.intersect(&base, &types);
    assert!(joined.is_bound(a[0]));
    assert!(!joined.is_bound(a[1]));
}

#[test]
fn test_join_is_commutative_and_idempotent() {
    let types = TypeInterner::new();
    let a = atoms(&["v"]);
    let v = ExpressionDescriptor::name(a[0]);
    let base = StaticState::new().assert_named_symbol(a[0], local("v", TypeId::ANY));
    let s1 = base.assert_flow_type(v.clone(), TypeId::INTEGER);
    let s2 = base.assert_flow_type(v.clone(), TypeId::TEXT);

    let ab = s1.intersect(&s2, &types);
    let ba = s2.intersect(&s1, &types);
    assert_eq!(ab.visible_facts(), ba.visible_facts());
    assert_eq!(ab.flow_type_of(&v), Some(TypeId::ANY));

    let same = s1.intersect(&s1, &types);
    assert_eq!(same.visible_facts(), s1.visible_facts());
}

#[test]
fn test_join_is_associative() {
    let types = TypeInterner::new();
    let a = atoms(&["v"]);
    let v = ExpressionDescriptor::name(a[0]);
    let base = StaticState::new().assert_named_symbol(a[0], local("v", TypeId::ANY));
    let s1 = base.assert_flow_type(v.clone(), TypeId::INTEGER);
    let s2 = base.assert_flow_type(v.clone(), TypeId::REAL);
    let s3 = base.assert_flow_type(v.clone(), TypeId::INTEGER);

    let left = s1.intersect(&s2, &types).intersect(&s3, &types);
    let right = s1.intersect(&s2.intersect(&s3, &types), &types);
    assert_eq!(left.visible_facts(), right.visible_facts());
}

#[test]
fn test_invalidated_paths_are_absorbed_by_joins() {
    let types = TypeInterner::new();
    let a = atoms(&["v"]);
    let v = ExpressionDescriptor::name(a[0]);
    let base = StaticState::new().assert_named_symbol(a[0], local("v", TypeId::ANY));
    let live = base.assert_flow_type(v.clone(), TypeId::TEXT);
    let dead = base.invalidate_until_exit_operation();

    let joined = live.intersect(&dead, &types);
    assert!(joined.is_valid());
    assert_eq!(joined.flow_type_of(&v), Some(TypeId::TEXT));

    let all_dead = dead.intersect(&dead, &types);
    assert!(!all_dead.is_valid());
}

#[test]
fn test_alternatives_are_joined_on_request() {
    let types = TypeInterner::new();
    let a = atoms(&["v"]);
    let v = ExpressionDescriptor::name(a[0]);
    let base = StaticState::new().assert_named_symbol(a[0], local("v", TypeId::ANY));
    let pending = base
        .assert_flow_type(v.clone(), TypeId::INTEGER)
        .add_alternative(base.assert_flow_type(v.clone(), TypeId::REAL));

    assert_eq!(pending.alternatives().len(), 1);
    let joined = pending.intersect_with_alternatives(&types);
    assert!(joined.alternatives().is_empty());
    assert_eq!(joined.flow_type_of(&v), Some(TypeId::REAL));
}

#[test]
fn test_facts_outside_the_binding_scope_are_not_visible() {
    let a = atoms(&["x"]);
    let x = ExpressionDescriptor::name(a[0]);
    let state = StaticState::new()
        .assert_flow_type(x.clone(), TypeId::TEXT)
        .enter_scope()
        .assert_named_symbol(a[0], local("x", TypeId::ANY));

    assert_eq!(state.flow_type_of(&x), None);
}
