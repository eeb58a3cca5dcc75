//! Static state threaded through expressions and statements.
//!
//! A `StaticState` is an immutable snapshot of what is known at one program
//! point: which names are bound (and to what), which expressions have a
//! narrowed type, which alternative states are waiting to be joined, and
//! whether the point is reachable at all.
//!
//! Every operation returns a new state. Scopes are frames linked through
//! `Rc`, and each frame's maps are shared until written (`Rc::make_mut`), so
//! copying a state is cheap and old snapshots stay valid.
//!
//! # Joins
//!
//! `intersect_all_alternatives` merges the states of several control-flow
//! paths. Invalidated states (paths that left the operation) are ignored; a
//! name or fact survives only if every remaining path has it, and its type
//! becomes the least upper bound of the per-path types.

mod descriptor;

pub use descriptor::ExpressionDescriptor;

use crate::symbols::NamedSymbol;
use jadec_common::Atom;
use jadec_solver::{TypeDatabase, TypeId, TypeLattice};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use tracing::{debug, trace};

#[derive(Clone, Debug, Default)]
struct Frame {
    names: Rc<FxHashMap<Atom, NamedSymbol>>,
    facts: Rc<FxHashMap<ExpressionDescriptor, TypeId>>,
    parent: Option<Rc<Frame>>,
}

/// Persistent snapshot of the checker's knowledge at a program point.
#[derive(Clone, Debug)]
pub struct StaticState {
    top: Rc<Frame>,
    depth: usize,
    alternatives: Rc<Vec<StaticState>>,
    invalidated: bool,
}

impl Default for StaticState {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticState {
    /// Reachable state with one empty scope.
    pub fn new() -> Self {
        Self {
            top: Rc::new(Frame::default()),
            depth: 1,
            alternatives: Rc::new(Vec::new()),
            invalidated: false,
        }
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    pub fn enter_scope(&self) -> StaticState {
        let mut next = self.clone();
        next.top = Rc::new(Frame {
            parent: Some(self.top.clone()),
            ..Frame::default()
        });
        next.depth += 1;
        next
    }

    /// Drop the innermost scope with its names and facts. The outermost
    /// scope is never dropped.
    pub fn exit_scope(&self) -> StaticState {
        let mut next = self.clone();
        if let Some(parent) = &self.top.parent {
            next.top = parent.clone();
            next.depth -= 1;
        }
        next
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    // =========================================================================
    // Names
    // =========================================================================

    /// Bind `name` in the innermost scope, replacing what that scope knew
    /// about it.
    pub fn assert_named_symbol(&self, name: Atom, symbol: NamedSymbol) -> StaticState {
        trace!(name = name.0, compiled = %symbol.compiled_name, "assert named symbol");
        let mut next = self.clone();
        let top = Rc::make_mut(&mut next.top);
        if top.facts.keys().any(|d| d.root() == name) {
            Rc::make_mut(&mut top.facts).retain(|d, _| d.root() != name);
        }
        Rc::make_mut(&mut top.names).insert(name, symbol);
        next
    }

    /// Innermost binding of `name`.
    pub fn search_name(&self, name: Atom) -> Option<&NamedSymbol> {
        let mut frame = Some(&self.top);
        while let Some(f) = frame {
            if let Some(symbol) = f.names.get(&name) {
                return Some(symbol);
            }
            frame = f.parent.as_ref();
        }
        None
    }

    pub fn is_bound(&self, name: Atom) -> bool {
        self.search_name(name).is_some()
    }

    /// `true` when the innermost scope binds `name`.
    pub fn is_bound_in_current_scope(&self, name: Atom) -> bool {
        self.top.names.contains_key(&name)
    }

    // =========================================================================
    // Flow facts
    // =========================================================================

    /// Record that `descriptor` currently has type `type_id`.
    pub fn assert_flow_type(&self, descriptor: ExpressionDescriptor, type_id: TypeId) -> StaticState {
        trace!(?descriptor, type_id = type_id.0, "assert flow type");
        let mut next = self.clone();
        let top = Rc::make_mut(&mut next.top);
        Rc::make_mut(&mut top.facts).insert(descriptor, type_id);
        next
    }

    /// Narrowed type of `descriptor`, if known. Facts recorded outside the
    /// scope that binds the descriptor's root are not visible.
    pub fn flow_type_of(&self, descriptor: &ExpressionDescriptor) -> Option<TypeId> {
        let root = descriptor.root();
        let mut frame = Some(&self.top);
        while let Some(f) = frame {
            if let Some(t) = f.facts.get(descriptor) {
                return Some(*t);
            }
            if f.names.contains_key(&root) {
                return None;
            }
            frame = f.parent.as_ref();
        }
        None
    }

    /// Forget every fact about `descriptor` and the expressions it owns.
    pub fn assert_assignment(&self, descriptor: &ExpressionDescriptor) -> StaticState {
        let affected = self
            .frames()
            .iter()
            .any(|f| f.facts.keys().any(|d| descriptor.is_prefix_of(d)));
        if !affected {
            return self.clone();
        }
        trace!(?descriptor, "assignment drops facts");
        let frames = self
            .frames()
            .into_iter()
            .map(|f| {
                let mut f = f.clone();
                if f.facts.keys().any(|d| descriptor.is_prefix_of(d)) {
                    Rc::make_mut(&mut f.facts).retain(|d, _| !descriptor.is_prefix_of(d));
                }
                f
            })
            .collect();
        self.with_frames(frames)
    }

    /// All visible facts, innermost first wins, sorted by descriptor.
    pub fn visible_facts(&self) -> Vec<(ExpressionDescriptor, TypeId)> {
        let mut seen: FxHashMap<ExpressionDescriptor, TypeId> = FxHashMap::default();
        for frame in self.frames().iter().rev() {
            for (d, t) in frame.facts.iter() {
                if self.flow_type_of(d) == Some(*t) {
                    seen.entry(d.clone()).or_insert(*t);
                }
            }
        }
        let mut out: Vec<_> = seen.into_iter().collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// All visible names, innermost binding wins, sorted by atom.
    pub fn visible_names(&self) -> Vec<(Atom, NamedSymbol)> {
        let mut seen: FxHashMap<Atom, NamedSymbol> = FxHashMap::default();
        for frame in self.frames().iter().rev() {
            for (name, symbol) in frame.names.iter() {
                seen.entry(*name).or_insert_with(|| symbol.clone());
            }
        }
        let mut out: Vec<_> = seen.into_iter().collect();
        out.sort_by_key(|(name, _)| *name);
        out
    }

    // =========================================================================
    // Reachability
    // =========================================================================

    /// Mark every later point of the current operation as unreachable.
    pub fn invalidate_until_exit_operation(&self) -> StaticState {
        let mut next = self.clone();
        next.invalidated = true;
        next
    }

    pub fn is_valid(&self) -> bool {
        !self.invalidated
    }

    // =========================================================================
    // Alternatives and joins
    // =========================================================================

    /// Save `alternative` to be joined later with this state.
    pub fn add_alternative(&self, alternative: StaticState) -> StaticState {
        let mut next = self.clone();
        let mut alt = alternative;
        alt.alternatives = Rc::new(Vec::new());
        Rc::make_mut(&mut next.alternatives).push(alt);
        next
    }

    pub fn alternatives(&self) -> &[StaticState] {
        &self.alternatives
    }

    /// Join this state with its saved alternatives.
    pub fn intersect_with_alternatives(&self, db: &dyn TypeDatabase) -> StaticState {
        let mut all = Vec::with_capacity(self.alternatives.len() + 1);
        let mut me = self.clone();
        me.alternatives = Rc::new(Vec::new());
        all.push(me);
        all.extend(self.alternatives.iter().cloned());
        StaticState::intersect_all_alternatives(&all, db)
    }

    /// Pointwise join of path states.
    pub fn intersect_all_alternatives(states: &[StaticState], db: &dyn TypeDatabase) -> StaticState {
        let valid: Vec<&StaticState> = states.iter().filter(|s| s.is_valid()).collect();
        match valid.as_slice() {
            [] => {
                let mut out = states.first().cloned().unwrap_or_default();
                out.invalidated = true;
                out.alternatives = Rc::new(Vec::new());
                out
            }
            [single] => {
                let mut out = (*single).clone();
                out.alternatives = Rc::new(Vec::new());
                out
            }
            many => {
                debug!(paths = many.len(), "join states");
                Self::join(many, db)
            }
        }
    }

    /// Join of two states.
    pub fn intersect(&self, other: &StaticState, db: &dyn TypeDatabase) -> StaticState {
        StaticState::intersect_all_alternatives(&[self.clone(), other.clone()], db)
    }

    fn join(states: &[&StaticState], db: &dyn TypeDatabase) -> StaticState {
        let lattice = TypeLattice::new(db);
        let stacks: Vec<Vec<&Frame>> = states.iter().map(|s| s.frames()).collect();
        let depth = stacks.iter().map(Vec::len).min().unwrap_or(0);

        let mut frames = Vec::with_capacity(depth);
        for level in 0..depth {
            let base = stacks[0][level];
            let others: Vec<&Frame> = stacks[1..].iter().map(|s| s[level]).collect();

            let mut names = FxHashMap::default();
            for (name, symbol) in base.names.iter() {
                let mut joined = symbol.clone();
                let mut everywhere = true;
                for other in &others {
                    match other.names.get(name) {
                        Some(o) => joined.type_id = lattice.lub(joined.type_id, o.type_id),
                        None => {
                            everywhere = false;
                            break;
                        }
                    }
                }
                if everywhere {
                    names.insert(*name, joined);
                }
            }

            let mut facts = FxHashMap::default();
            for (descriptor, type_id) in base.facts.iter() {
                let mut joined = *type_id;
                let mut everywhere = true;
                for other in &others {
                    match other.facts.get(descriptor) {
                        Some(t) => joined = lattice.lub(joined, *t),
                        None => {
                            everywhere = false;
                            break;
                        }
                    }
                }
                if everywhere {
                    facts.insert(descriptor.clone(), joined);
                }
            }

            frames.push(Frame {
                names: Rc::new(names),
                facts: Rc::new(facts),
                parent: None,
            });
        }

        StaticState::new().with_frames(frames)
    }

    /// Frames from the outermost to the innermost.
    fn frames(&self) -> Vec<&Frame> {
        let mut out = Vec::with_capacity(self.depth);
        let mut frame = Some(&self.top);
        while let Some(f) = frame {
            out.push(f.as_ref());
            frame = f.parent.as_ref();
        }
        out.reverse();
        out
    }

    /// Same state with the scope chain rebuilt from `frames` (outermost
    /// first).
    fn with_frames(&self, frames: Vec<Frame>) -> StaticState {
        let mut next = self.clone();
        let depth = frames.len().max(1);
        let mut parent: Option<Rc<Frame>> = None;
        for mut frame in frames {
            frame.parent = parent;
            parent = Some(Rc::new(frame));
        }
        next.top = parent.unwrap_or_default();
        next.depth = depth;
        next
    }
}
