//! `if`, `when … matches` and `while`.
//!
//! Every branch runs in its own scope. The state after the statement is the
//! join of the branch exits and the fall-through path (the state in which
//! every condition was false, or every pattern failed).

use super::StatementChecker;
use crate::expr;
use crate::patterns::{self, PatternMatchInput, PatternMode};
use crate::state::StaticState;
use jadec_ast::{Block, NodeIndex};
use jadec_common::DiagnosticCode;
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_emitter::{EmissionSink, block};
use jadec_solver::{TypeDatabase, TypeId};
use tracing::debug;

/// One compiled branch of a conditional chain.
struct CompiledBranch {
    /// Statements the condition needs before it is evaluated.
    prelude: Vec<String>,
    condition: String,
    body: Vec<String>,
}

/// `if (c1) { … } else if (c2) { … } else { … }`. A condition with a
/// prelude cannot be an `else if`; its prelude and test nest in the
/// previous `else`. The first branch's prelude goes to `sink`.
fn emit_chain(branches: Vec<CompiledBranch>, otherwise: Option<Vec<String>>, sink: &mut dyn EmissionSink) {
    let mut tail = otherwise.map(|lines| block("", &lines).trim_start().to_string());
    let mut first_prelude = Vec::new();
    let count = branches.len();
    for (i, branch) in branches.into_iter().enumerate().rev() {
        let mut text = block(&format!("if ({})", branch.condition), &branch.body);
        if let Some(rest) = tail.take() {
            text = format!("{text} else {rest}");
        }
        tail = Some(if i == 0 || branch.prelude.is_empty() {
            if i == 0 {
                first_prelude = branch.prelude;
            }
            text
        } else {
            let mut lines = branch.prelude;
            lines.push(text);
            block("", &lines).trim_start().to_string()
        });
    }
    debug!(branches = count, "emit conditional chain");
    for line in first_prelude {
        sink.emit_statement(line);
    }
    if let Some(text) = tail {
        sink.emit_statement(text);
    }
}

/// Join of the given path states.
fn join(db: &dyn TypeDatabase, exits: Vec<StaticState>) -> StaticState {
    let mut exits = exits.into_iter();
    let Some(first) = exits.next() else {
        return StaticState::new().invalidate_until_exit_operation();
    };
    exits
        .fold(first, |joined, exit| joined.add_alternative(exit))
        .intersect_with_alternatives(db)
}

impl StatementChecker<'_, '_> {
    pub(crate) fn validate_condition(&self, condition: NodeIndex, state: &StaticState, acceptor: &mut dyn DiagnosticAcceptor) -> bool {
        let cx = self.cx;
        if !expr::validate(cx, condition, state, acceptor) {
            return false;
        }
        let ty = expr::infer_type(cx, condition, state);
        if ty.is_error() || ty == TypeId::BOOLEAN {
            return true;
        }
        acceptor.accept_error(
            format!("A condition must be of type 'boolean', found '{}'", cx.format_type(ty)),
            cx.span(condition),
            Some("condition"),
            None,
            DiagnosticCode::InvalidCondition,
        );
        false
    }

    // =========================================================================
    // if
    // =========================================================================

    pub(super) fn validate_if(
        &self,
        branches: &[(NodeIndex, Block)],
        otherwise: Option<&Block>,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let cx = self.cx;
        let mut ok = true;
        let mut current = state.clone();
        for (condition, body) in branches {
            ok &= self.validate_condition(*condition, &current, acceptor);
            let taken = expr::assert_returned_true(cx, *condition, &current);
            ok &= self.validate_block(body, &taken, acceptor).0;
            current = expr::assert_returned_false(cx, *condition, &current);
        }
        if let Some(otherwise) = otherwise {
            ok &= self.validate_block(otherwise, &current, acceptor).0;
        }
        ok
    }

    pub(super) fn compile_if(
        &self,
        branches: &[(NodeIndex, Block)],
        otherwise: Option<&Block>,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) {
        let cx = self.cx;
        let mut compiled = Vec::with_capacity(branches.len());
        let mut current = state.clone();
        for (condition, body) in branches {
            let (prelude, text) = self.compile_detached(*condition, &current, sink);
            let taken = expr::assert_returned_true(cx, *condition, &current);
            let (lines, _) = self.compile_nested(body, &taken, sink);
            compiled.push(CompiledBranch {
                prelude,
                condition: text,
                body: lines,
            });
            current = expr::assert_returned_false(cx, *condition, &current);
        }
        let otherwise = otherwise.map(|block| self.compile_nested(block, &current, sink).0);
        emit_chain(compiled, otherwise, sink);
    }

    pub(super) fn advance_if(
        &self,
        branches: &[(NodeIndex, Block)],
        otherwise: Option<&Block>,
        state: &StaticState,
    ) -> StaticState {
        let cx = self.cx;
        let mut exits = Vec::with_capacity(branches.len() + 1);
        let mut current = state.clone();
        for (condition, body) in branches {
            let taken = expr::assert_returned_true(cx, *condition, &current);
            exits.push(self.advance_block(body, &taken));
            current = expr::assert_returned_false(cx, *condition, &current);
        }
        exits.push(match otherwise {
            Some(otherwise) => self.advance_block(otherwise, &current),
            None => current,
        });
        join(cx.types, exits)
    }

    // =========================================================================
    // when … matches
    // =========================================================================

    fn branch_input(&self, pattern: NodeIndex, provided: TypeId) -> PatternMatchInput {
        let mode = PatternMode::statement_guard().with_options(&self.cx.options);
        PatternMatchInput::root(self.cx, pattern, mode, provided)
    }

    /// State a branch body starts in when its pattern matched.
    fn matched_state(&self, scrutinee: NodeIndex, input: &PatternMatchInput, before: &StaticState, after: &StaticState) -> StaticState {
        let descriptor = expr::describe_expression(self.cx, scrutinee, before);
        patterns::assert_did_match(self.cx, input, descriptor, after)
    }

    pub(super) fn validate_when(
        &self,
        scrutinee: NodeIndex,
        branches: &[(NodeIndex, Block)],
        otherwise: Option<&Block>,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let cx = self.cx;
        let mut ok = expr::validate(cx, scrutinee, state, acceptor);
        let provided = expr::infer_type(cx, scrutinee, state);
        let after = expr::advance(cx, scrutinee, state);
        for (pattern, body) in branches {
            let input = self.branch_input(*pattern, provided);
            ok &= patterns::validate_pattern(cx, &input, &after, acceptor).result;
            let matched = self.matched_state(scrutinee, &input, state, &after);
            ok &= self.validate_block(body, &matched, acceptor).0;
        }
        if let Some(otherwise) = otherwise {
            ok &= self.validate_block(otherwise, &after, acceptor).0;
        }
        ok
    }

    pub(super) fn compile_when(
        &self,
        scrutinee: NodeIndex,
        branches: &[(NodeIndex, Block)],
        otherwise: Option<&Block>,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) {
        let cx = self.cx;
        let provided = expr::infer_type(cx, scrutinee, state);
        let value = expr::compile(cx, scrutinee, state, sink);
        let after = expr::advance(cx, scrutinee, state);
        let Some((first, _)) = branches.first() else {
            sink.emit_statement(super::expression_statement(cx, scrutinee, value));
            return;
        };
        let temporary = format!("__when{}", cx.pattern_root_id(*first));
        sink.emit_statement(format!("final {} {temporary} = {value};", cx.host_type(provided)));

        let mut compiled = Vec::with_capacity(branches.len());
        for (pattern, body) in branches {
            let input = self.branch_input(*pattern, provided);
            let mut prelude = jadec_emitter::StatementBuffer::new();
            let procedure = patterns::compile_pattern(cx, &input, &after, &mut prelude);
            for member in prelude.take_members() {
                sink.emit_member(member);
            }
            let matched = self.matched_state(scrutinee, &input, state, &after);
            let (lines, _) = self.compile_nested(body, &matched, sink);
            compiled.push(CompiledBranch {
                prelude: prelude.take_statements(),
                condition: procedure.result.call(&temporary),
                body: lines,
            });
        }
        let otherwise = otherwise.map(|block| self.compile_nested(block, &after, sink).0);
        emit_chain(compiled, otherwise, sink);
    }

    pub(super) fn advance_when(
        &self,
        scrutinee: NodeIndex,
        branches: &[(NodeIndex, Block)],
        otherwise: Option<&Block>,
        state: &StaticState,
    ) -> StaticState {
        let cx = self.cx;
        let provided = expr::infer_type(cx, scrutinee, state);
        let after = expr::advance(cx, scrutinee, state);
        let mut exits = Vec::with_capacity(branches.len() + 1);
        for (pattern, body) in branches {
            let input = self.branch_input(*pattern, provided);
            let matched = self.matched_state(scrutinee, &input, state, &after);
            exits.push(self.advance_block(body, &matched));
        }
        exits.push(match otherwise {
            Some(otherwise) => self.advance_block(otherwise, &after),
            None => after,
        });
        join(cx.types, exits)
    }

    // =========================================================================
    // while
    // =========================================================================

    /// State at the loop head: entry joined with the state after one pass
    /// of the body. This is not iterated to a fixpoint, so a fact the body
    /// only invalidates on its second pass is still assumed at the head.
    fn loop_head(&self, condition: NodeIndex, body: &Block, state: &StaticState) -> StaticState {
        let cx = self.cx;
        let once = self.advance_block(body, &expr::assert_returned_true(cx, condition, state));
        state.intersect(&once, cx.types)
    }

    pub(super) fn validate_while(
        &self,
        condition: NodeIndex,
        body: &Block,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let head = self.loop_head(condition, body, state);
        let condition_ok = self.validate_condition(condition, &head, acceptor);
        let taken = expr::assert_returned_true(self.cx, condition, &head);
        let (body_ok, _) = self.validate_block(body, &taken, acceptor);
        condition_ok && body_ok
    }

    pub(super) fn compile_while(&self, condition: NodeIndex, body: &Block, state: &StaticState, sink: &mut dyn EmissionSink) {
        let cx = self.cx;
        let head = self.loop_head(condition, body, state);
        let (prelude, text) = self.compile_detached(condition, &head, sink);
        let taken = expr::assert_returned_true(cx, condition, &head);
        let (mut lines, _) = self.compile_nested(body, &taken, sink);
        if prelude.is_empty() {
            sink.emit_statement(block(&format!("while ({text})"), &lines));
        } else {
            let mut loop_body = prelude;
            loop_body.push(format!("if (!({text})) break;"));
            loop_body.append(&mut lines);
            sink.emit_statement(block("while (true)", &loop_body));
        }
    }

    pub(super) fn advance_while(&self, condition: NodeIndex, body: &Block, state: &StaticState) -> StaticState {
        let head = self.loop_head(condition, body, state);
        expr::assert_returned_false(self.cx, condition, &head)
    }
}
