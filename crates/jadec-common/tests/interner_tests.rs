use super::*;

#[test]
fn test_intern_returns_same_atom_for_same_text() {
    let mut interner = Interner::new();
    let a = interner.intern("person");
    let b = interner.intern("person");
    let c = interner.intern("place");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.resolve(a), "person");
}

#[test]
fn test_empty_string_is_none_atom() {
    let mut interner = Interner::new();
    assert!(interner.is_empty());
    assert_eq!(interner.intern(""), Atom::NONE);
    assert!(Atom::NONE.is_none());
}

#[test]
fn test_resolve_out_of_bounds_is_empty() {
    let interner = Interner::new();
    assert_eq!(interner.resolve(Atom(999)), "");
    assert!(interner.try_resolve(Atom(999)).is_none());
}

#[test]
fn test_lookup_does_not_insert() {
    let mut interner = Interner::new();
    assert!(interner.lookup("x").is_none());
    let x = interner.intern("x");
    assert_eq!(interner.lookup("x"), Some(x));
}

#[test]
fn test_intern_common_preloads_keywords() {
    let mut interner = Interner::new();
    interner.intern_common();
    assert!(interner.lookup("integer").is_some());
    assert!(interner.lookup("_").is_some());
}
