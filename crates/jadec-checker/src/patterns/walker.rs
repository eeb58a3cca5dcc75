//! Pattern Walker
//!
//! One recursive traversal serves validation, compilation and type probing,
//! so the three agree on which terms exist, in which order they are
//! visited, and which identifiers they get. Each visit threads the static
//! state left to right: a name bound by an earlier term is ground for the
//! terms after it.
//!
//! Structural terms live in `structural.rs`, functional-notation terms in
//! `functional.rs`; both extend [`PatternWalker`].

use super::input::PatternMatchInput;
use super::matcher::{Equality, PatternMatcher};
use super::mode::HolesPolicy;
use crate::context::CheckerContext;
use crate::expr::{self, ExpressionDispatcher};
use crate::state::StaticState;
use crate::symbols::{NamedSymbol, SymbolOrigin};
use crate::type_node::{resolve_type, resolve_type_silently};
use indexmap::IndexMap;
use jadec_ast::{ExprKind, NodeIndex, TypeExpr};
use jadec_common::diagnostics::{DiagnosticAcceptor, IgnoringAcceptor};
use jadec_common::limits::MAX_PATTERN_DEPTH;
use jadec_common::{Atom, DiagnosticCode};
use jadec_emitter::{EmissionSink, StatementBuffer};
use jadec_solver::TypeId;
use tracing::trace;

/// What the code generated for a pattern accumulates.
pub(super) struct Emission<'w> {
    sink: &'w mut dyn EmissionSink,
    /// Holder fields: name to Java type.
    pub(super) fields: IndexMap<String, String>,
    /// Rendered term procedures, children before parents.
    pub(super) methods: Vec<String>,
    /// Statements ground terms need before their values are read.
    pub(super) pending: Vec<String>,
}

pub(super) enum Purpose<'w> {
    Validate(&'w mut dyn DiagnosticAcceptor),
    Compile(Emission<'w>),
    Probe,
}

/// Result of visiting one term.
pub(super) struct TermResult {
    pub ok: bool,
    pub solved: TypeId,
    pub matcher: PatternMatcher,
    /// State after the term, with its bindings asserted.
    pub state: StaticState,
    pub declares: Vec<(Atom, TypeId)>,
}

impl TermResult {
    pub(super) fn failed(state: &StaticState) -> Self {
        Self {
            ok: false,
            solved: TypeId::ERROR,
            matcher: PatternMatcher::failing(),
            state: state.clone(),
            declares: Vec::new(),
        }
    }
}

pub(super) struct PatternWalker<'w, 'a> {
    pub(super) cx: &'w CheckerContext<'a>,
    purpose: Purpose<'w>,
    depth: u32,
}

impl<'w, 'a> PatternWalker<'w, 'a> {
    pub(super) fn validating(cx: &'w CheckerContext<'a>, acceptor: &'w mut dyn DiagnosticAcceptor) -> Self {
        Self {
            cx,
            purpose: Purpose::Validate(acceptor),
            depth: 0,
        }
    }

    pub(super) fn compiling(cx: &'w CheckerContext<'a>, sink: &'w mut dyn EmissionSink) -> Self {
        Self {
            cx,
            purpose: Purpose::Compile(Emission {
                sink,
                fields: IndexMap::new(),
                methods: Vec::new(),
                pending: Vec::new(),
            }),
            depth: 0,
        }
    }

    pub(super) fn probing(cx: &'w CheckerContext<'a>) -> Self {
        Self {
            cx,
            purpose: Purpose::Probe,
            depth: 0,
        }
    }

    /// Holder fields, methods and leftover statements of a compile walk.
    pub(super) fn into_emission(self) -> (IndexMap<String, String>, Vec<String>, Vec<String>) {
        match self.purpose {
            Purpose::Compile(emission) => (emission.fields, emission.methods, emission.pending),
            Purpose::Validate(_) | Purpose::Probe => (IndexMap::new(), Vec::new(), Vec::new()),
        }
    }

    pub(super) const fn is_validating(&self) -> bool {
        matches!(self.purpose, Purpose::Validate(_))
    }

    pub(super) const fn is_compiling(&self) -> bool {
        matches!(self.purpose, Purpose::Compile(_))
    }

    // =========================================================================
    // Reporting and emission helpers
    // =========================================================================

    pub(super) fn error(&mut self, node: NodeIndex, code: DiagnosticCode, message: String) {
        if let Purpose::Validate(acceptor) = &mut self.purpose {
            acceptor.accept_error(message, self.cx.span(node), None, None, code);
        }
    }

    /// Run `f` with the validation acceptor, or a silent one otherwise.
    pub(super) fn with_acceptor<R>(&mut self, f: impl FnOnce(&mut dyn DiagnosticAcceptor) -> R) -> R {
        match &mut self.purpose {
            Purpose::Validate(acceptor) => f(&mut **acceptor),
            Purpose::Compile(_) | Purpose::Probe => f(&mut IgnoringAcceptor),
        }
    }

    fn pending_mark(&self) -> usize {
        match &self.purpose {
            Purpose::Compile(emission) => emission.pending.len(),
            Purpose::Validate(_) | Purpose::Probe => 0,
        }
    }

    pub(super) fn add_field(&mut self, name: &str, host_type: String) {
        if let Purpose::Compile(emission) = &mut self.purpose {
            emission.fields.entry(name.to_string()).or_insert(host_type);
        }
    }

    /// Java text of a ground expression evaluated inside a term procedure.
    pub(super) fn compile_ground(&mut self, node: NodeIndex, state: &StaticState) -> String {
        let cx = self.cx;
        let Purpose::Compile(emission) = &mut self.purpose else {
            return String::new();
        };
        let mut buffer = StatementBuffer::new();
        let text = expr::compile(cx, node, state, &mut buffer);
        for member in buffer.take_members() {
            emission.sink.emit_member(member);
        }
        emission.pending.extend(buffer.take_statements());
        text
    }

    /// Guarded downcast to `solved` followed by `conditions`.
    pub(super) fn composite(&self, solved: TypeId, conditions: Vec<String>) -> PatternMatcher {
        PatternMatcher::Composite {
            guard_class: self.cx.host_class(solved),
            cast_type: self.cx.host_type(solved),
            conditions,
        }
    }

    /// Check `solved` against the provided type under the input's
    /// relationship requirement.
    pub(super) fn check_requirement(&mut self, node: NodeIndex, input: &PatternMatchInput, solved: TypeId) -> bool {
        let provided = input.provided_type;
        if provided.is_error() || solved.is_error() {
            return true;
        }
        let requirement = input.mode.requirement;
        if requirement.is_satisfied_by(self.cx.compare(solved, provided)) {
            return true;
        }
        let message = format!(
            "The type of this pattern ('{}') must be {} the type of the matched value ('{}')",
            self.cx.format_type(solved),
            requirement.describe(),
            self.cx.format_type(provided)
        );
        self.error(node, DiagnosticCode::InvalidPatternType, message);
        false
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Visit the term described by `input` in `state`.
    pub(super) fn visit(&mut self, input: &PatternMatchInput, state: &StaticState) -> TermResult {
        let cx = self.cx;
        if !matches!(self.purpose, Purpose::Probe) {
            cx.record_pattern_visit(input.id.clone());
        }
        if self.depth >= MAX_PATTERN_DEPTH {
            self.error(
                input.pattern,
                DiagnosticCode::InvalidPatternType,
                "Pattern is nested too deeply".to_string(),
            );
            return TermResult::failed(state);
        }
        trace!(id = %input.id, depth = self.depth, "visit pattern term");

        let mark = self.pending_mark();
        self.depth += 1;
        let result = self.visit_term(input, state);
        self.depth -= 1;

        if result.matcher.needs_method()
            && let Purpose::Compile(emission) = &mut self.purpose
        {
            let prelude = emission.pending.split_off(mark);
            emission
                .methods
                .push(result.matcher.render_method(&input.method_name(), prelude));
        }
        result
    }

    fn visit_term(&mut self, input: &PatternMatchInput, state: &StaticState) -> TermResult {
        let cx = self.cx;
        let node = ExpressionDispatcher::traverse(cx, input.pattern);
        if !holed(cx, node, input.mode.within_assignment, state) {
            return self.visit_ground(node, input, state);
        }
        match cx.arena.kind(node) {
            Some(ExprKind::Placeholder) => self.visit_placeholder(node, input, state),
            Some(ExprKind::Name(atom)) => self.visit_free_name(node, *atom, input, state),
            Some(ExprKind::Cast { operand, ty }) => self.visit_cast(node, *operand, ty, input, state),
            Some(ExprKind::TupleLiteral(elements)) => self.visit_tuple(node, elements, input, state),
            Some(ExprKind::ListLiteral { elements, rest, .. }) => {
                self.visit_list(node, elements, *rest, input, state)
            }
            Some(ExprKind::SetLiteral { elements, rest, .. }) => {
                self.visit_set(node, elements, *rest, input, state)
            }
            Some(ExprKind::MapLiteral { entries, rest, .. }) => {
                self.visit_map(node, entries, *rest, input, state)
            }
            Some(ExprKind::Call { callee, args }) => self.visit_functional(node, *callee, args, input, state),
            _ => {
                self.error(
                    node,
                    DiagnosticCode::UnresolvedPattern,
                    "This expression cannot be used as a pattern".to_string(),
                );
                TermResult::failed(state)
            }
        }
    }

    /// A term without holes: an equality test against its value.
    fn visit_ground(&mut self, node: NodeIndex, input: &PatternMatchInput, state: &StaticState) -> TermResult {
        let cx = self.cx;
        let mut ok = true;
        if self.is_validating() {
            ok = self.with_acceptor(|acceptor| expr::validate(cx, node, state, acceptor));
            if ok && input.mode.requires_purity() && !expr::is_without_side_effects(cx, node, state) {
                self.error(
                    node,
                    DiagnosticCode::ImpurePattern,
                    "Patterns in this position must be free of side effects".to_string(),
                );
                ok = false;
            }
        }
        let solved = expr::infer_type(cx, node, state);
        ok &= self.check_requirement(node, input, solved);

        let value = self.compile_ground(node, state);
        let equality = if is_primitive_literal(cx, node)
            && is_primitive(solved)
            && is_primitive(input.provided_type)
        {
            Equality::Primitive {
                numeric: solved != TypeId::BOOLEAN,
            }
        } else {
            Equality::Objects
        };
        TermResult {
            ok,
            solved,
            matcher: PatternMatcher::SingleCondition { value, equality },
            state: expr::advance(cx, node, state),
            declares: Vec::new(),
        }
    }

    /// `_`
    fn visit_placeholder(&mut self, node: NodeIndex, input: &PatternMatchInput, state: &StaticState) -> TermResult {
        if input.mode.holes == HolesPolicy::MustBeGround {
            self.error(
                node,
                DiagnosticCode::HoleNotAllowed,
                "Holes are not allowed in this pattern".to_string(),
            );
            return TermResult::failed(state);
        }
        TermResult {
            ok: true,
            solved: input.provided_type,
            matcher: PatternMatcher::succeeding(),
            state: state.clone(),
            declares: Vec::new(),
        }
    }

    /// A name with no binding: declares a variable holding the matched
    /// value. Under an assignment root, names of existing locals are
    /// reassigned instead and keep their declared type.
    fn visit_free_name(
        &mut self,
        node: NodeIndex,
        atom: Atom,
        input: &PatternMatchInput,
        state: &StaticState,
    ) -> TermResult {
        let cx = self.cx;
        let name = cx.text(atom);
        if input.mode.holes != HolesPolicy::AcceptsAnyHole {
            self.error(
                node,
                DiagnosticCode::HoleNotAllowed,
                format!("Free variable '{name}' is not allowed in this pattern"),
            );
            return TermResult::failed(state);
        }
        if !input.mode.declares() {
            self.error(node, DiagnosticCode::UnresolvedName, format!("Cannot resolve name '{name}'"));
            return TermResult::failed(state);
        }

        let existing = input
            .mode
            .within_assignment
            .then(|| state.search_name(atom).map(|symbol| symbol.type_id))
            .flatten();
        let solved = existing.unwrap_or(input.provided_type);
        let ok = existing.is_none() || self.check_requirement(node, input, solved);

        let stored = if solved.is_error() { TypeId::ANY } else { solved };
        let host_type = cx.host_type(stored);
        self.add_field(name, host_type.clone());

        let state = if input.mode.within_assignment {
            state.clone()
        } else {
            state.assert_named_symbol(
                atom,
                NamedSymbol::local(name, solved)
                    .with_origin(SymbolOrigin::PatternBinding)
                    .with_compiled_name(input.binding(name))
                    .with_span(cx.span(node))
                    .immutable(),
            )
        };
        TermResult {
            ok,
            solved,
            matcher: PatternMatcher::FieldAssigning {
                field: name.to_string(),
                host_type,
            },
            state,
            declares: vec![(atom, solved)],
        }
    }

    /// `p as T`: the value must be a `T`, and `p` is matched against it.
    fn visit_cast(
        &mut self,
        node: NodeIndex,
        operand: NodeIndex,
        ty: &TypeExpr,
        input: &PatternMatchInput,
        state: &StaticState,
    ) -> TermResult {
        let cx = self.cx;
        let target = match &mut self.purpose {
            Purpose::Validate(acceptor) => resolve_type(cx, ty, &mut **acceptor),
            Purpose::Compile(_) | Purpose::Probe => resolve_type_silently(cx, ty),
        };
        if target.is_error() {
            return TermResult::failed(state);
        }
        let mut ok = self.check_requirement(node, input, target);
        let term_input = input.term(0, operand, target);
        let term = self.visit(&term_input, state);
        ok &= term.ok;
        let condition = term.matcher.condition_on("__x", &term_input.method_name());
        TermResult {
            ok,
            solved: target,
            matcher: self.composite(target, vec![condition]),
            state: term.state,
            declares: term.declares,
        }
    }
}

/// Whether `node` contains a hole. Under an assignment root every name is
/// a hole; elsewhere only unbound names and `_` are.
pub(super) fn holed(cx: &CheckerContext<'_>, node: NodeIndex, within_assignment: bool, state: &StaticState) -> bool {
    if within_assignment {
        contains_assignable_hole(cx, node)
    } else {
        expr::is_holed(cx, node, state)
    }
}

/// Whether the type of the pattern at `node` depends on the matched type.
pub(super) fn typely_holed(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    within_assignment: bool,
    state: &StaticState,
) -> bool {
    if within_assignment {
        contains_assignable_hole(cx, node)
    } else {
        expr::is_typely_holed(cx, node, state)
    }
}

fn contains_assignable_hole(cx: &CheckerContext<'_>, node: NodeIndex) -> bool {
    let node = ExpressionDispatcher::traverse(cx, node);
    match cx.arena.kind(node) {
        Some(ExprKind::Name(_) | ExprKind::Placeholder) => true,
        Some(
            kind @ (ExprKind::Cast { .. }
            | ExprKind::TupleLiteral(_)
            | ExprKind::ListLiteral { .. }
            | ExprKind::SetLiteral { .. }
            | ExprKind::MapLiteral { .. }
            | ExprKind::Call { .. }),
        ) => kind
            .children()
            .into_iter()
            .any(|child| contains_assignable_hole(cx, child)),
        _ => false,
    }
}

fn is_primitive_literal(cx: &CheckerContext<'_>, node: NodeIndex) -> bool {
    matches!(
        cx.arena.kind(node),
        Some(ExprKind::IntegerLiteral(_) | ExprKind::RealLiteral(_) | ExprKind::BooleanLiteral(_))
    )
}

const fn is_primitive(type_id: TypeId) -> bool {
    matches!(type_id, TypeId::INTEGER | TypeId::REAL | TypeId::BOOLEAN)
}
