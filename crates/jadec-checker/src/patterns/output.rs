//! Results of matching a pattern.

use indexmap::IndexMap;
use jadec_common::Atom;
use jadec_solver::TypeId;
use std::fmt;
use std::rc::Rc;

/// Type of a pattern. A holed pattern's type depends on the type of the
/// value it is matched against.
#[derive(Clone)]
pub enum PatternType<'c> {
    Simple(TypeId),
    Holed(Rc<dyn Fn(TypeId) -> TypeId + 'c>),
}

impl PatternType<'_> {
    pub fn solve(&self, input: TypeId) -> TypeId {
        match self {
            PatternType::Simple(ty) => *ty,
            PatternType::Holed(solver) => solver(input),
        }
    }

    pub fn is_holed(&self) -> bool {
        matches!(self, PatternType::Holed(_))
    }
}

impl fmt::Debug for PatternType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternType::Simple(ty) => f.debug_tuple("Simple").field(ty).finish(),
            PatternType::Holed(_) => f.write_str("Holed(..)"),
        }
    }
}

/// Names a successful match binds, in term order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum UnificationOutcome {
    #[default]
    None,
    Declares(IndexMap<Atom, TypeId>),
}

impl UnificationOutcome {
    pub fn declared(&self) -> Vec<(Atom, TypeId)> {
        match self {
            UnificationOutcome::None => Vec::new(),
            UnificationOutcome::Declares(names) => names.iter().map(|(n, t)| (*n, *t)).collect(),
        }
    }
}

/// Type the matched value is known to have after a successful match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NarrowingOutcome {
    #[default]
    None,
    Narrows(TypeId),
}

/// What a pattern match produced: `result` is the validity flag when
/// validating and the root procedure call when compiling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternMatchOutput<R> {
    pub result: R,
    /// Type the pattern solved to for the provided input.
    pub solved_type: TypeId,
    pub unification: UnificationOutcome,
    pub narrowing: NarrowingOutcome,
}

impl<R> PatternMatchOutput<R> {
    pub fn map<S>(self, f: impl FnOnce(R) -> S) -> PatternMatchOutput<S> {
        PatternMatchOutput {
            result: f(self.result),
            solved_type: self.solved_type,
            unification: self.unification,
            narrowing: self.narrowing,
        }
    }
}

/// A compiled root pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledPattern {
    /// Qualified root procedure, e.g. `__pm0.__pattern0`.
    pub procedure: String,
}

impl CompiledPattern {
    /// Java expression applying the pattern to `value`.
    pub fn call(&self, value: &str) -> String {
        format!("{}({value})", self.procedure)
    }
}
