//! Pattern Matching
//!
//! A pattern is an expression read in a pattern position: the right operand
//! of `matches`, a `when` guard, a handler header, or the left side of a
//! deconstructing assignment. Ground terms compare by value; holes (`_` and
//! free names) match anything, and free names bind the matched value.
//!
//! Every root pattern compiles to a holder class `__PatternN` with one
//! `boolean __patternID(Object)` procedure per term that needs one, the
//! bound variables as fields, and one member instance `__pmN`. Term ids are
//! the root number followed by the term path, so validation and
//! compilation visit the same ids in the same order.
//!
//! | Entry point | Purpose |
//! |-------------|---------|
//! | [`validate_pattern`] | report diagnostics, solve the pattern type |
//! | [`compile_pattern`] | emit the holder and return the root call |
//! | [`infer_pattern_type`] | pattern type, possibly depending on the input |
//! | [`assert_did_match`] | state after a successful match |

mod functional;
mod input;
mod matcher;
mod mode;
mod output;
mod structural;
mod walker;

pub use input::PatternMatchInput;
pub use matcher::{Equality, PatternMatcher, render_holder};
pub use mode::{HolesPolicy, Narrowing, PatternLocation, PatternMode, Purity, Unification};
pub use output::{CompiledPattern, NarrowingOutcome, PatternMatchOutput, PatternType, UnificationOutcome};

use crate::context::CheckerContext;
use crate::expr::{self, ExpressionDispatcher};
use crate::state::{ExpressionDescriptor, StaticState};
use crate::symbols::{NamedSymbol, SymbolOrigin};
use jadec_ast::NodeIndex;
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_emitter::EmissionSink;
use jadec_solver::TypeId;
use std::rc::Rc;
use tracing::debug;
use walker::{PatternWalker, TermResult};

fn output<R>(cx: &CheckerContext<'_>, input: &PatternMatchInput, term: &TermResult, result: R) -> PatternMatchOutput<R> {
    let unification = if input.mode.declares() && !term.declares.is_empty() {
        UnificationOutcome::Declares(term.declares.iter().copied().collect())
    } else {
        UnificationOutcome::None
    };
    let provided = input.provided_type;
    let narrows = input.mode.narrows()
        && !provided.is_error()
        && !term.solved.is_error()
        && cx.compare(term.solved, provided).is_strict_subtype();
    PatternMatchOutput {
        result,
        solved_type: term.solved,
        unification,
        narrowing: if narrows {
            NarrowingOutcome::Narrows(expr::narrow_to(cx, provided, term.solved))
        } else {
            NarrowingOutcome::None
        },
    }
}

fn probe(cx: &CheckerContext<'_>, input: &PatternMatchInput, state: &StaticState) -> TermResult {
    PatternWalker::probing(cx).visit(input, state)
}

/// Validate the pattern of `input`; `result` is `true` when no error was
/// reported.
pub fn validate_pattern(
    cx: &CheckerContext<'_>,
    input: &PatternMatchInput,
    state: &StaticState,
    acceptor: &mut dyn DiagnosticAcceptor,
) -> PatternMatchOutput<bool> {
    let term = PatternWalker::validating(cx, acceptor).visit(input, state);
    debug!(root = input.root, ok = term.ok, "validated pattern");
    output(cx, input, &term, term.ok)
}

/// Compile the pattern of `input`. The holder class is emitted once per
/// root; captured locals are copied into it right before the match.
pub fn compile_pattern(
    cx: &CheckerContext<'_>,
    input: &PatternMatchInput,
    state: &StaticState,
    sink: &mut dyn EmissionSink,
) -> PatternMatchOutput<CompiledPattern> {
    let root = input.root_name();
    let captures = expr::captures_of(cx, input.pattern, Vec::new(), state, |name| {
        format!("{root}.__captured_{name}")
    });
    let mut inner = state.enter_scope();
    for capture in &captures {
        inner = inner.assert_named_symbol(
            capture.name,
            NamedSymbol::local(cx.text(capture.name), capture.type_id)
                .with_origin(SymbolOrigin::Capture)
                .with_compiled_name(capture.compiled_name.clone())
                .immutable(),
        );
    }

    let mut walker = PatternWalker::compiling(cx, &mut *sink);
    let term = walker.visit(input, &inner);
    let (mut fields, mut methods, pending) = walker.into_emission();
    if !term.matcher.needs_method() {
        methods.push(term.matcher.render_method(&input.method_name(), pending));
    }
    for capture in &captures {
        fields
            .entry(format!("__captured_{}", cx.text(capture.name)))
            .or_insert_with(|| cx.host_type(capture.type_id));
    }

    if cx.mark_pattern_emitted(input.root) {
        let holder = input.holder_class();
        let fields: Vec<(String, String)> = fields.into_iter().collect();
        sink.emit_member(render_holder(&holder, &fields, &methods));
        sink.emit_member(format!("private final {holder} {root} = new {holder}();"));
    }
    for capture in &captures {
        sink.emit_statement(format!(
            "{root}.__captured_{} = {};",
            cx.text(capture.name),
            capture.source
        ));
    }

    let procedure = CompiledPattern {
        procedure: format!("{root}.{}", input.method_name()),
    };
    output(cx, input, &term, procedure)
}

/// Type of `pattern` under `mode`. Patterns whose type depends on the
/// matched value yield a solver closure.
pub fn infer_pattern_type<'c>(
    cx: &'c CheckerContext<'_>,
    pattern: NodeIndex,
    mode: PatternMode,
    state: &StaticState,
) -> PatternType<'c> {
    let root = PatternMatchInput::root(cx, pattern, mode, TypeId::ANY);
    if !walker::typely_holed(cx, pattern, mode.within_assignment, state) {
        return PatternType::Simple(probe(cx, &root, state).solved);
    }
    let state = state.clone();
    PatternType::Holed(Rc::new(move |provided| {
        let input = PatternMatchInput {
            provided_type: provided,
            ..root.clone()
        };
        probe(cx, &input, &state).solved
    }))
}

/// State after the pattern of `input` matched: its variables are declared
/// (except under an assignment root, where the statement decides) and
/// the matched value, described by `scrutinee`, is narrowed.
pub fn assert_did_match(
    cx: &CheckerContext<'_>,
    input: &PatternMatchInput,
    scrutinee: Option<ExpressionDescriptor>,
    state: &StaticState,
) -> StaticState {
    let term = probe(cx, input, state);
    let outcome = output(cx, input, &term, ());
    let mut next = state.clone();
    if !input.mode.within_assignment {
        for (atom, type_id) in outcome.unification.declared() {
            let name = cx.text(atom);
            next = next.assert_named_symbol(
                atom,
                NamedSymbol::local(name, type_id)
                    .with_origin(SymbolOrigin::PatternBinding)
                    .with_compiled_name(input.binding(name))
                    .immutable(),
            );
        }
    }
    if let (NarrowingOutcome::Narrows(narrowed), Some(descriptor)) = (outcome.narrowing, scrutinee) {
        next = next.assert_flow_type(descriptor, narrowed);
    }
    next
}

/// Bindings and solved type of the pattern of `input`, without reporting.
pub fn probe_pattern(cx: &CheckerContext<'_>, input: &PatternMatchInput, state: &StaticState) -> PatternMatchOutput<()> {
    let term = probe(cx, input, state);
    output(cx, input, &term, ())
}

/// Whether evaluating the ground parts of `pattern` has no side effects.
/// Deconstruction itself only reads.
pub fn is_pattern_pure(cx: &CheckerContext<'_>, pattern: NodeIndex, state: &StaticState) -> bool {
    let node = ExpressionDispatcher::traverse(cx, pattern);
    if !expr::is_holed(cx, node, state) {
        return expr::is_without_side_effects(cx, node, state);
    }
    cx.arena.kind(node).is_none_or(|kind| {
        kind.children()
            .into_iter()
            .all(|child| is_pattern_pure(cx, child, state))
    })
}
