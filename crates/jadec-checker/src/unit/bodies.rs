//! Operation and handler bodies.
//!
//! An operation body starts in a scope binding its parameters (immutable).
//! A handler first matches the message content against its pattern in
//! handler-header mode, then evaluates the guard; the body starts in the
//! state where both succeeded.

use super::declarations::{Declarations, OperationSignature};
use crate::context::CheckerContext;
use crate::expr;
use crate::patterns::{self, PatternMatchInput, PatternMode};
use crate::state::StaticState;
use crate::statements::StatementChecker;
use crate::symbols::{NamedSymbol, SymbolOrigin};
use jadec_ast::{HandlerDecl, OperationDecl, OperationKind, SourceUnit};
use jadec_common::DiagnosticCode;
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_emitter::{EmissionSink, JavaMethod, StatementBuffer, java_string_literal};
use jadec_solver::TypeId;
use tracing::{debug, trace};

const CONTENT_PARAM: &str = "content";

fn operation_state(cx: &CheckerContext<'_>, op: &OperationDecl, signature: &OperationSignature) -> StaticState {
    op.params
        .iter()
        .zip(&signature.params)
        .fold(StaticState::new().enter_scope(), |state, (param, &type_id)| {
            state.assert_named_symbol(
                param.name,
                NamedSymbol::local(cx.text(param.name), type_id)
                    .with_origin(SymbolOrigin::Parameter)
                    .with_span(param.span)
                    .immutable(),
            )
        })
}

fn content_input(cx: &CheckerContext<'_>, handler: &HandlerDecl) -> Option<PatternMatchInput> {
    let pattern = handler.content?;
    let mode = PatternMode::handler_header().with_options(&cx.options);
    Some(PatternMatchInput::root(cx, pattern, mode, TypeId::ANY))
}

/// State after the content matched, and after the guard held.
fn handler_states(cx: &CheckerContext<'_>, handler: &HandlerDecl) -> (StaticState, StaticState) {
    let entry = StaticState::new().enter_scope();
    let matched = match content_input(cx, handler) {
        Some(input) => patterns::assert_did_match(cx, &input, None, &entry),
        None => entry,
    };
    let guarded = match handler.guard {
        Some(guard) => expr::assert_returned_true(cx, guard, &matched),
        None => matched.clone(),
    };
    (matched, guarded)
}

// =============================================================================
// Validation
// =============================================================================

pub(super) fn validate(
    cx: &CheckerContext<'_>,
    unit: &SourceUnit,
    declarations: &Declarations,
    acceptor: &mut dyn DiagnosticAcceptor,
) {
    for (op, signature) in unit.operations.iter().zip(&declarations.operations) {
        validate_operation(cx, op, signature, acceptor);
    }
    for handler in &unit.handlers {
        validate_handler(cx, handler, acceptor);
    }
}

fn validate_operation(
    cx: &CheckerContext<'_>,
    op: &OperationDecl,
    signature: &OperationSignature,
    acceptor: &mut dyn DiagnosticAcceptor,
) {
    let state = operation_state(cx, op, signature);
    let checker = StatementChecker::new(cx, signature.return_type);
    let (_, exit) = checker.validate_block(&op.body, &state, acceptor);
    let Some(return_type) = signature.return_type else {
        return;
    };
    if op.kind == OperationKind::Function && exit.is_valid() && !return_type.is_error() {
        acceptor.accept_error(
            format!(
                "Function '{}' can complete without returning a value of type '{}'",
                cx.text(op.name),
                cx.format_type(return_type)
            ),
            op.span,
            Some("body"),
            None,
            DiagnosticCode::MissingReturn,
        );
    }
}

fn validate_handler(cx: &CheckerContext<'_>, handler: &HandlerDecl, acceptor: &mut dyn DiagnosticAcceptor) {
    let entry = StaticState::new().enter_scope();
    let mut header_ok = true;
    if let Some(input) = content_input(cx, handler) {
        header_ok = patterns::validate_pattern(cx, &input, &entry, acceptor).result;
    }
    let (matched, guarded) = handler_states(cx, handler);
    let checker = StatementChecker::new(cx, None);
    if let Some(guard) = handler.guard {
        header_ok &= checker.validate_condition(guard, &matched, acceptor);
    }
    let (body_ok, _) = checker.validate_block(&handler.body, &guarded, acceptor);
    trace!(
        performative = cx.text(handler.performative),
        header_ok,
        body_ok,
        "validated handler"
    );
}

// =============================================================================
// Compilation
// =============================================================================

/// Class members for constants, operations and handlers, preceded by the
/// members their bodies hoisted (pattern holders).
pub(super) fn compile(cx: &CheckerContext<'_>, unit: &SourceUnit, declarations: &Declarations) -> Vec<String> {
    let mut hoisted = StatementBuffer::new();
    let mut members = Vec::new();

    for (global, &type_id) in unit.globals.iter().zip(&declarations.globals) {
        members.push(compile_global(cx, global.name, global.value, type_id, &mut hoisted));
    }
    for (op, signature) in unit.operations.iter().zip(&declarations.operations) {
        if signature.registered {
            members.push(compile_operation(cx, op, signature, &mut hoisted));
        }
    }
    for (index, handler) in unit.handlers.iter().enumerate() {
        members.extend(compile_handler(cx, index, handler, &mut hoisted));
    }
    debug!(
        members = members.len(),
        hoisted = hoisted.members().len(),
        "compiled unit members"
    );

    let mut out = hoisted.take_members();
    out.append(&mut members);
    out
}

fn compile_global(
    cx: &CheckerContext<'_>,
    name: jadec_common::Atom,
    value: jadec_ast::NodeIndex,
    type_id: TypeId,
    hoisted: &mut StatementBuffer,
) -> String {
    let host = cx.host_type(type_id);
    let mut buffer = StatementBuffer::new();
    let text = expr::compile_expecting(cx, value, &StaticState::new(), Some(type_id), &mut buffer);
    for member in buffer.take_members() {
        hoisted.emit_member(member);
    }
    let statements = buffer.take_statements();
    if statements.is_empty() {
        return format!("private final {host} {} = {text};", cx.text(name));
    }
    let mut body = statements;
    body.push(format!("return {text};"));
    let supplier = jadec_emitter::block("() ->", &body);
    format!(
        "private final {host} {} = ((java.util.function.Supplier<{host}>) {supplier}).get();",
        cx.text(name)
    )
}

fn compile_operation(
    cx: &CheckerContext<'_>,
    op: &OperationDecl,
    signature: &OperationSignature,
    hoisted: &mut StatementBuffer,
) -> String {
    let state = operation_state(cx, op, signature);
    let checker = StatementChecker::new(cx, signature.return_type);
    let body = hoisted.nested(|buffer| {
        checker.compile_block(&op.body, &state, buffer);
    });
    let return_type = signature
        .return_type
        .map_or_else(|| "void".to_string(), |ty| cx.host_type(ty));
    op.params
        .iter()
        .zip(&signature.params)
        .fold(
            JavaMethod::new("public", return_type, cx.text(op.name)),
            |method, (param, &ty)| method.param(cx.host_type(ty), cx.text(param.name)),
        )
        .body(body)
        .render()
}

/// `__handlerN_performative`, `__handlerN_matches` and `__handlerN_body`.
fn compile_handler(
    cx: &CheckerContext<'_>,
    index: usize,
    handler: &HandlerDecl,
    hoisted: &mut StatementBuffer,
) -> Vec<String> {
    let prefix = format!("__handler{index}");
    let entry = StaticState::new().enter_scope();
    let (matched, guarded) = handler_states(cx, handler);

    let test = hoisted.nested(|buffer| {
        if let Some(input) = content_input(cx, handler) {
            let compiled = patterns::compile_pattern(cx, &input, &entry, buffer);
            buffer.emit_statement(format!("if (!{}) return false;", compiled.result.call(CONTENT_PARAM)));
        }
        let result = match handler.guard {
            Some(guard) => expr::compile(cx, guard, &matched, buffer),
            None => "true".to_string(),
        };
        buffer.emit_statement(format!("return {result};"));
    });
    let checker = StatementChecker::new(cx, None);
    let body = hoisted.nested(|buffer| {
        checker.compile_block(&handler.body, &guarded, buffer);
    });

    vec![
        format!(
            "public static final java.lang.String {prefix}_performative = {};",
            java_string_literal(cx.text(handler.performative))
        ),
        JavaMethod::new("public", "boolean", format!("{prefix}_matches"))
            .param("java.lang.Object", CONTENT_PARAM)
            .body(test)
            .render(),
        JavaMethod::new("public", "void", format!("{prefix}_body"))
            .param("java.lang.Object", CONTENT_PARAM)
            .body(body)
            .render(),
    ]
}
