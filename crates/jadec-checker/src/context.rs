//! Checker Context
//!
//! Holds what every expression, pattern and statement of one unit needs to
//! see: the syntax arena, the type interner, the symbol search collaborator,
//! options, and the deterministic name allocators used by compilation.
//! The static state is *not* here; it is threaded explicitly.

use crate::symbols::SymbolSearch;
use jadec_ast::{NodeArena, NodeIndex};
use jadec_common::limits::MAX_EXPR_CHECK_DEPTH;
use jadec_common::{Atom, Span};
use jadec_solver::{LatticeBound, TypeId, TypeInterner, TypeLattice, TypeRelationship};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::{Cell, RefCell};

/// Options for checking and compiling a unit.
#[derive(Debug, Clone)]
pub struct CheckerOptions {
    /// Require side-effect-free patterns in every location, not only in
    /// handler headers.
    pub strict_purity: bool,
    pub report_unreachable_code: bool,
    /// Report an info diagnostic when an inferred type collapses to `any`.
    pub report_inferred_top: bool,
    /// Prepended to the generated Java class name of each unit.
    pub unit_class_prefix: String,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            strict_purity: false,
            report_unreachable_code: true,
            report_inferred_top: true,
            unit_class_prefix: String::new(),
        }
    }
}

impl CheckerOptions {
    /// Turn on every optional check.
    #[must_use]
    pub fn apply_strict_defaults(mut self) -> Self {
        self.strict_purity = true;
        self.report_unreachable_code = true;
        self.report_inferred_top = true;
        self
    }
}

/// Per-unit context shared by all semantic checks.
pub struct CheckerContext<'a> {
    pub file_name: String,
    pub arena: &'a NodeArena,
    pub types: &'a TypeInterner,
    pub symbols: &'a dyn SymbolSearch,
    pub options: CheckerOptions,
    /// Sub-pattern identifiers in the order patterns were visited. Both
    /// validation and compilation append here.
    pub pattern_visits: RefCell<Vec<String>>,
    pattern_roots: RefCell<FxHashMap<NodeIndex, u32>>,
    emitted_patterns: RefCell<FxHashSet<u32>>,
    lambda_ids: RefCell<FxHashMap<NodeIndex, u32>>,
    condition_temps: Cell<u32>,
    depth: Cell<u32>,
}

impl<'a> CheckerContext<'a> {
    pub fn new(
        file_name: impl Into<String>,
        arena: &'a NodeArena,
        types: &'a TypeInterner,
        symbols: &'a dyn SymbolSearch,
        options: CheckerOptions,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            arena,
            types,
            symbols,
            options,
            pattern_visits: RefCell::new(Vec::new()),
            pattern_roots: RefCell::new(FxHashMap::default()),
            emitted_patterns: RefCell::new(FxHashSet::default()),
            lambda_ids: RefCell::new(FxHashMap::default()),
            condition_temps: Cell::new(0),
            depth: Cell::new(0),
        }
    }

    // =========================================================================
    // Syntax helpers
    // =========================================================================

    #[inline]
    pub fn text(&self, atom: Atom) -> &'a str {
        self.arena.text(atom)
    }

    #[inline]
    pub fn span(&self, node: NodeIndex) -> Span {
        self.arena.span(node)
    }

    // =========================================================================
    // Type helpers
    // =========================================================================

    pub fn format_type(&self, type_id: TypeId) -> String {
        jadec_solver::format_type(self.types, type_id)
    }

    pub fn compare(&self, left: TypeId, right: TypeId) -> TypeRelationship {
        jadec_solver::compare(self.types, left, right)
    }

    pub fn is_assignable(&self, source: TypeId, target: TypeId) -> bool {
        jadec_solver::is_subtype_of(self.types, source, target)
    }

    pub fn lattice(&self) -> TypeLattice<'a> {
        TypeLattice::new(self.types)
    }

    pub fn lub_explained(&self, a: TypeId, b: TypeId) -> LatticeBound {
        self.lattice().lub_explained(a, b)
    }

    pub fn glb(&self, a: TypeId, b: TypeId) -> TypeId {
        self.lattice().glb(a, b)
    }

    pub fn host_type(&self, type_id: TypeId) -> String {
        jadec_solver::host::host_type_name(self.types, type_id)
    }

    pub fn host_class(&self, type_id: TypeId) -> String {
        jadec_solver::host::host_raw_class(self.types, type_id)
    }

    // =========================================================================
    // Deterministic names
    // =========================================================================

    /// Number of the pattern rooted at `root`. The same root always gets the
    /// same number, so validating and compiling a pattern name its
    /// procedures identically.
    pub fn pattern_root_id(&self, root: NodeIndex) -> u32 {
        let mut roots = self.pattern_roots.borrow_mut();
        let next = roots.len() as u32;
        *roots.entry(root).or_insert(next)
    }

    /// `true` the first time a pattern's holder class is emitted.
    pub fn mark_pattern_emitted(&self, id: u32) -> bool {
        self.emitted_patterns.borrow_mut().insert(id)
    }

    pub fn lambda_id(&self, lambda: NodeIndex) -> u32 {
        let mut ids = self.lambda_ids.borrow_mut();
        let next = ids.len() as u32;
        *ids.entry(lambda).or_insert(next)
    }

    /// Fresh local holding a partially evaluated boolean connective.
    pub fn fresh_condition_temp(&self) -> String {
        let id = self.condition_temps.get();
        self.condition_temps.set(id + 1);
        format!("__cond{id}")
    }

    pub fn record_pattern_visit(&self, id: String) {
        self.pattern_visits.borrow_mut().push(id);
    }

    pub fn take_pattern_visits(&self) -> Vec<String> {
        std::mem::take(&mut *self.pattern_visits.borrow_mut())
    }

    // =========================================================================
    // Recursion guard
    // =========================================================================

    /// Enter one level of expression nesting; `false` when the limit is
    /// reached and the caller must not recurse.
    pub fn enter_nesting(&self) -> bool {
        let depth = self.depth.get();
        if depth >= MAX_EXPR_CHECK_DEPTH {
            return false;
        }
        self.depth.set(depth + 1);
        true
    }

    pub fn leave_nesting(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
