//! Supertype enumeration.
//!
//! `all_supertypes` walks the declared supertype graph breadth-first. Only
//! declared edges are followed: `integer → real`, nominal and host
//! declarations to their listed supertypes, and everything else straight to
//! `any`. Structural supertypes such as `list of real` above `list of integer`
//! are not enumerated; they are answered by `compare` and by the pointwise
//! step of the lattice.

use crate::def::DefKind;
use crate::intern::TypeDatabase;
use crate::types::{IntrinsicKind, TypeData, TypeId};
use jadec_common::limits::MAX_SUPERTYPE_WALK;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Declared direct supertypes of `id`. `any` has none.
pub fn direct_supertypes(db: &dyn TypeDatabase, id: TypeId) -> SmallVec<[TypeId; 2]> {
    let mut out = SmallVec::new();
    match db.lookup(id) {
        Some(TypeData::Intrinsic(IntrinsicKind::Any)) => {}
        Some(TypeData::Intrinsic(IntrinsicKind::Integer)) => out.push(TypeId::REAL),
        Some(TypeData::Nominal(def)) | Some(TypeData::Host(def)) => {
            let store = db.definitions();
            for sup in store.direct_supertypes(def) {
                let is_native = store.get(sup).is_some_and(|d| d.kind == DefKind::Native);
                out.push(db.intern(if is_native {
                    TypeData::Host(sup)
                } else {
                    TypeData::Nominal(sup)
                }));
            }
            if out.is_empty() {
                out.push(TypeId::ANY);
            }
        }
        Some(_) => out.push(TypeId::ANY),
        None => {}
    }
    out
}

/// Lazy breadth-first sequence of the supertypes of a type, starting with
/// the type itself and ending with `any`.
///
/// Every type is yielded at most once, so the walk terminates even if the
/// declared graph contains a cycle.
pub struct AllSupertypes<'a> {
    db: &'a dyn TypeDatabase,
    queue: VecDeque<TypeId>,
    visited: FxHashSet<TypeId>,
    any_pending: bool,
    yielded: usize,
}

impl Iterator for AllSupertypes<'_> {
    type Item = TypeId;

    fn next(&mut self) -> Option<TypeId> {
        while let Some(next) = self.queue.pop_front() {
            if self.yielded >= MAX_SUPERTYPE_WALK {
                self.queue.clear();
                break;
            }
            if next == TypeId::ANY || !self.visited.insert(next) {
                continue;
            }
            for sup in direct_supertypes(self.db, next) {
                if !self.visited.contains(&sup) {
                    self.queue.push_back(sup);
                }
            }
            self.yielded += 1;
            return Some(next);
        }
        if self.any_pending {
            self.any_pending = false;
            return Some(TypeId::ANY);
        }
        None
    }
}

pub fn all_supertypes(db: &dyn TypeDatabase, id: TypeId) -> AllSupertypes<'_> {
    AllSupertypes {
        db,
        queue: VecDeque::from([id]),
        visited: FxHashSet::default(),
        any_pending: true,
        yielded: 0,
    }
}

#[cfg(test)]
#[path = "../tests/hierarchy_tests.rs"]
mod hierarchy_tests;
