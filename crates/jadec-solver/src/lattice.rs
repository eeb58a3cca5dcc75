//! Least upper and greatest lower bounds.
//!
//! Both operations are total. When no informative bound exists they fall
//! back to `any` / `nothing` and attach a note, which the checker surfaces as
//! an `InferredTopType` info diagnostic where an inference depends on it.
//!
//! Arguments are put in a canonical order before searching, so the result
//! never depends on which side a type was passed on.

use crate::format::TypeFormatter;
use crate::hierarchy::all_supertypes;
use crate::intern::TypeDatabase;
use crate::relations::{SubtypeChecker, TypeRelationship, compare};
use crate::types::{TypeData, TypeId, Variance};
use tracing::{debug, trace};

/// A lattice bound together with the reason it is degenerate, if it is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatticeBound {
    pub type_id: TypeId,
    pub note: Option<String>,
}

impl LatticeBound {
    pub const fn exact(type_id: TypeId) -> Self {
        Self {
            type_id,
            note: None,
        }
    }

    pub fn degenerate(type_id: TypeId, note: String) -> Self {
        Self {
            type_id,
            note: Some(note),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.note.is_some()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Bound {
    Upper,
    Lower,
}

impl Bound {
    const fn dual(self) -> Bound {
        match self {
            Bound::Upper => Bound::Lower,
            Bound::Lower => Bound::Upper,
        }
    }
}

/// Lattice queries over one `TypeDatabase`.
pub struct TypeLattice<'a> {
    db: &'a dyn TypeDatabase,
    subtype: SubtypeChecker<'a>,
}

impl<'a> TypeLattice<'a> {
    pub fn new(db: &'a dyn TypeDatabase) -> Self {
        Self {
            db,
            subtype: SubtypeChecker::new(db),
        }
    }

    pub fn lub(&self, a: TypeId, b: TypeId) -> TypeId {
        self.lub_explained(a, b).type_id
    }

    pub fn glb(&self, a: TypeId, b: TypeId) -> TypeId {
        self.glb_explained(a, b).type_id
    }

    /// Least upper bound of a sequence; `nothing` for an empty one.
    pub fn lub_all(&self, types: impl IntoIterator<Item = TypeId>) -> LatticeBound {
        let mut acc = LatticeBound::exact(TypeId::NOTHING);
        for t in types {
            let next = self.lub_explained(acc.type_id, t);
            acc = LatticeBound {
                type_id: next.type_id,
                note: merge_notes(acc.note, next.note),
            };
        }
        acc
    }

    pub fn lub_explained(&self, a: TypeId, b: TypeId) -> LatticeBound {
        if a.is_error() || b.is_error() {
            return LatticeBound::exact(TypeId::ERROR);
        }
        let (t1, t2) = canonical(a, b);
        trace!(t1 = t1.0, t2 = t2.0, "lub");

        match compare(self.db, t1, t2) {
            TypeRelationship::Equal | TypeRelationship::Supertype => {
                return LatticeBound::exact(t1);
            }
            TypeRelationship::Subtype => return LatticeBound::exact(t2),
            TypeRelationship::Unrelated => {}
        }

        if let Some(bound) = self.pointwise(t1, t2, Bound::Upper) {
            return bound;
        }

        for candidate in all_supertypes(self.db, t1).skip(1) {
            if candidate == TypeId::ANY {
                break;
            }
            if self.subtype.is_subtype_of(t2, candidate) {
                trace!(found = candidate.0, "lub via supertype walk");
                return LatticeBound::exact(candidate);
            }
        }

        if let Some(found) = self
            .host_chain_bound(t1, t2)
            .or_else(|| self.host_chain_bound(t2, t1))
        {
            trace!(found = found.0, "lub via host assignability");
            return LatticeBound::exact(found);
        }

        let fmt = TypeFormatter::new(self.db);
        let note = format!(
            "Could not find a common supertype of '{}' and '{}'; the inferred type is 'any'",
            fmt.format(t1),
            fmt.format(t2)
        );
        debug!(%note, "lub degenerated to top");
        LatticeBound::degenerate(TypeId::ANY, note)
    }

    pub fn glb_explained(&self, a: TypeId, b: TypeId) -> LatticeBound {
        if a.is_error() || b.is_error() {
            return LatticeBound::exact(TypeId::ERROR);
        }
        let (t1, t2) = canonical(a, b);
        trace!(t1 = t1.0, t2 = t2.0, "glb");

        match compare(self.db, t1, t2) {
            TypeRelationship::Equal | TypeRelationship::Subtype => {
                return LatticeBound::exact(t1);
            }
            TypeRelationship::Supertype => return LatticeBound::exact(t2),
            TypeRelationship::Unrelated => {}
        }

        if let Some(bound) = self.pointwise(t1, t2, Bound::Lower) {
            return bound;
        }

        let fmt = TypeFormatter::new(self.db);
        let note = format!(
            "'{}' and '{}' have no common subtype; the inferred type is 'nothing'",
            fmt.format(t1),
            fmt.format(t2)
        );
        debug!(%note, "glb degenerated to bottom");
        LatticeBound::degenerate(TypeId::NOTHING, note)
    }

    /// Combine two instances of the same parametric constructor argument by
    /// argument. `None` when the constructors differ or an invariant argument
    /// does not match.
    fn pointwise(&self, t1: TypeId, t2: TypeId, bound: Bound) -> Option<LatticeBound> {
        let d1 = self.db.lookup(t1)?;
        let d2 = self.db.lookup(t2)?;
        let key = d1.constructor_key()?;
        if d2.constructor_key() != Some(key) {
            return None;
        }

        let mut args = Vec::new();
        let mut note = None;
        for ((x, variance), (y, _)) in d1.arguments().into_iter().zip(d2.arguments()) {
            let combined = match variance {
                Variance::Covariant => self.bound(x, y, bound),
                Variance::Contravariant => self.bound(x, y, bound.dual()),
                Variance::Invariant => {
                    if !self.subtype.is_equivalent(x, y) {
                        return None;
                    }
                    LatticeBound::exact(x)
                }
            };
            note = merge_notes(note, combined.note);
            args.push(combined.type_id);
        }

        let data = d1.with_arguments(&args)?;
        Some(LatticeBound {
            type_id: self.db.intern(data),
            note,
        })
    }

    fn bound(&self, a: TypeId, b: TypeId, bound: Bound) -> LatticeBound {
        match bound {
            Bound::Upper => self.lub_explained(a, b),
            Bound::Lower => self.glb_explained(a, b),
        }
    }

    /// Walk the first-supertype chain of `base` looking for a declaration
    /// `other` is assignable to at the Java level.
    fn host_chain_bound(&self, base: TypeId, other: TypeId) -> Option<TypeId> {
        let (base_def, other_def) = match (self.db.lookup(base)?, self.db.lookup(other)?) {
            (
                TypeData::Nominal(a) | TypeData::Host(a),
                TypeData::Nominal(b) | TypeData::Host(b),
            ) => (a, b),
            _ => return None,
        };
        let store = self.db.definitions();
        store
            .parent_chain(base_def)
            .into_iter()
            .find(|&ancestor| self.subtype.is_host_assignable(other_def, ancestor))
            .map(|ancestor| {
                let native = store
                    .get(ancestor)
                    .is_some_and(|d| d.kind == crate::def::DefKind::Native);
                self.db.intern(if native {
                    TypeData::Host(ancestor)
                } else {
                    TypeData::Nominal(ancestor)
                })
            })
    }
}

fn canonical(a: TypeId, b: TypeId) -> (TypeId, TypeId) {
    if a <= b { (a, b) } else { (b, a) }
}

fn merge_notes(a: Option<String>, b: Option<String>) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) if a == b => Some(a),
        (Some(a), Some(b)) => Some(format!("{a}; {b}")),
        (a, b) => a.or(b),
    }
}

pub fn lub(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> TypeId {
    TypeLattice::new(db).lub(a, b)
}

pub fn glb(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> TypeId {
    TypeLattice::new(db).glb(a, b)
}

pub fn lub_explained(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> LatticeBound {
    TypeLattice::new(db).lub_explained(a, b)
}

pub fn glb_explained(db: &dyn TypeDatabase, a: TypeId, b: TypeId) -> LatticeBound {
    TypeLattice::new(db).glb_explained(a, b)
}

#[cfg(test)]
#[path = "../tests/lattice_tests.rs"]
mod lattice_tests;
