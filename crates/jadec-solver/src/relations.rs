//! Subtyping and type comparison.
//!
//! `SubtypeChecker` answers `a ≤ b`; `compare` turns two such answers into a
//! `TypeRelationship`. Rules:
//!
//! | Left | Right | Rule |
//! |------|-------|------|
//! | any | `any` | always |
//! | `nothing` | any | always |
//! | `error` | any (either side) | always |
//! | `integer` | `real` | numeric promotion |
//! | `list/set/message of A` | same of `B` | `A ≤ B` |
//! | `map of K1:V1` | `map of K2:V2` | `K1 ≡ K2`, `V1 ≤ V2` |
//! | `(A1..An)` | `(B1..Bn)` | `Ai ≤ Bi` |
//! | `function (P..) -> R` | `function (Q..) -> S` | `Qi ≤ Pi`, `R ≤ S` |
//! | nominal/host | nominal/host | declared supertype graph, or Java host assignability |

use crate::def::DefId;
use crate::intern::TypeDatabase;
use crate::types::{IntrinsicKind, TypeData, TypeId};
use jadec_common::limits::MAX_EXPR_CHECK_DEPTH;
use std::cell::Cell;
use tracing::trace;

// =============================================================================
// TypeRelationship
// =============================================================================

/// Outcome of comparing two types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeRelationship {
    Equal,
    /// The left type is a strict subtype of the right one.
    Subtype,
    /// The left type is a strict supertype of the right one.
    Supertype,
    Unrelated,
}

impl TypeRelationship {
    #[inline]
    pub const fn is_equal(self) -> bool {
        matches!(self, TypeRelationship::Equal)
    }

    #[inline]
    pub const fn is_subtype_or_equal(self) -> bool {
        matches!(self, TypeRelationship::Equal | TypeRelationship::Subtype)
    }

    #[inline]
    pub const fn is_supertype_or_equal(self) -> bool {
        matches!(self, TypeRelationship::Equal | TypeRelationship::Supertype)
    }

    #[inline]
    pub const fn is_strict_subtype(self) -> bool {
        matches!(self, TypeRelationship::Subtype)
    }

    #[inline]
    pub const fn is_strict_supertype(self) -> bool {
        matches!(self, TypeRelationship::Supertype)
    }

    #[inline]
    pub const fn is_related(self) -> bool {
        !matches!(self, TypeRelationship::Unrelated)
    }

    /// The relationship seen from the other side.
    pub const fn flip(self) -> TypeRelationship {
        match self {
            TypeRelationship::Subtype => TypeRelationship::Supertype,
            TypeRelationship::Supertype => TypeRelationship::Subtype,
            other => other,
        }
    }

    pub fn satisfies(self, requirement: RelationshipRequirement) -> bool {
        requirement.is_satisfied_by(self)
    }
}

/// A predicate over `TypeRelationship`, stored where a relationship is
/// demanded rather than computed (pattern modes, argument checks).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelationshipRequirement {
    Equal,
    SubtypeOrEqual,
    SupertypeOrEqual,
    Related,
}

impl RelationshipRequirement {
    pub const fn is_satisfied_by(self, relationship: TypeRelationship) -> bool {
        match self {
            RelationshipRequirement::Equal => relationship.is_equal(),
            RelationshipRequirement::SubtypeOrEqual => relationship.is_subtype_or_equal(),
            RelationshipRequirement::SupertypeOrEqual => relationship.is_supertype_or_equal(),
            RelationshipRequirement::Related => relationship.is_related(),
        }
    }

    pub const fn describe(self) -> &'static str {
        match self {
            RelationshipRequirement::Equal => "equal to",
            RelationshipRequirement::SubtypeOrEqual => "a subtype of",
            RelationshipRequirement::SupertypeOrEqual => "a supertype of",
            RelationshipRequirement::Related => "related to",
        }
    }
}

// =============================================================================
// SubtypeChecker
// =============================================================================

/// Structural/nominal subtype test over one `TypeDatabase`.
pub struct SubtypeChecker<'a> {
    db: &'a dyn TypeDatabase,
    depth: Cell<u32>,
}

impl<'a> SubtypeChecker<'a> {
    pub fn new(db: &'a dyn TypeDatabase) -> Self {
        Self {
            db,
            depth: Cell::new(0),
        }
    }

    /// `true` when a value of `source` can be used where `target` is expected.
    pub fn is_subtype_of(&self, source: TypeId, target: TypeId) -> bool {
        if source == target
            || source.is_error()
            || target.is_error()
            || target == TypeId::ANY
            || source == TypeId::NOTHING
        {
            return true;
        }
        if source == TypeId::ANY || target == TypeId::NOTHING {
            return false;
        }
        if self.depth.get() >= MAX_EXPR_CHECK_DEPTH {
            trace!(source = source.0, target = target.0, "subtype depth exceeded");
            return false;
        }
        self.depth.set(self.depth.get() + 1);
        let result = self.check_structure(source, target);
        self.depth.set(self.depth.get() - 1);
        result
    }

    pub fn is_equivalent(&self, a: TypeId, b: TypeId) -> bool {
        self.is_subtype_of(a, b) && self.is_subtype_of(b, a)
    }

    fn check_structure(&self, source: TypeId, target: TypeId) -> bool {
        let (Some(s), Some(t)) = (self.db.lookup(source), self.db.lookup(target)) else {
            return false;
        };
        match (s, t) {
            (
                TypeData::Intrinsic(IntrinsicKind::Integer),
                TypeData::Intrinsic(IntrinsicKind::Real),
            ) => true,
            (TypeData::List(a), TypeData::List(b))
            | (TypeData::Set(a), TypeData::Set(b))
            | (TypeData::Message(a), TypeData::Message(b)) => self.is_subtype_of(a, b),
            (TypeData::Map { key: k1, value: v1 }, TypeData::Map { key: k2, value: v2 }) => {
                self.is_equivalent(k1, k2) && self.is_subtype_of(v1, v2)
            }
            (TypeData::Tuple(a), TypeData::Tuple(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| self.is_subtype_of(*x, *y))
            }
            (
                TypeData::Function {
                    params: p1,
                    result: r1,
                },
                TypeData::Function {
                    params: p2,
                    result: r2,
                },
            ) => {
                p1.len() == p2.len()
                    && p1.iter().zip(p2.iter()).all(|(x, y)| self.is_subtype_of(*y, *x))
                    && self.is_subtype_of(r1, r2)
            }
            (
                TypeData::Nominal(a) | TypeData::Host(a),
                TypeData::Nominal(b) | TypeData::Host(b),
            ) => self.db.definitions().is_derived_from(a, b) || self.is_host_assignable(a, b),
            _ => false,
        }
    }

    /// Java-level assignability: the class of `target` appears among the
    /// host classes of `source` and its ancestors.
    pub fn is_host_assignable(&self, source: DefId, target: DefId) -> bool {
        let store = self.db.definitions();
        let Some(target_info) = store.get(target) else {
            return false;
        };
        store
            .host_ancestry(source)
            .iter()
            .any(|class| *class == target_info.host_name)
    }
}

/// Compare two types.
pub fn compare(db: &dyn TypeDatabase, left: TypeId, right: TypeId) -> TypeRelationship {
    if left == right {
        return TypeRelationship::Equal;
    }
    let checker = SubtypeChecker::new(db);
    match (
        checker.is_subtype_of(left, right),
        checker.is_subtype_of(right, left),
    ) {
        (true, true) => TypeRelationship::Equal,
        (true, false) => TypeRelationship::Subtype,
        (false, true) => TypeRelationship::Supertype,
        (false, false) => TypeRelationship::Unrelated,
    }
}

pub fn is_subtype_of(db: &dyn TypeDatabase, source: TypeId, target: TypeId) -> bool {
    SubtypeChecker::new(db).is_subtype_of(source, target)
}

#[cfg(test)]
#[path = "../tests/relations_tests.rs"]
mod relations_tests;
