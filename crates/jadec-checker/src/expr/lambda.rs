//! Lambdas and their capture lists.
//!
//! A lambda copies every local it mentions into a `final` temporary before
//! the lambda expression, and its body reads the copies. The capture list
//! is computed bottom-up from the free names of the body.

use super::ExpressionSemantics;
use crate::context::CheckerContext;
use crate::state::{ExpressionDescriptor, StaticState};
use crate::symbols::{NamedSymbol, SymbolOrigin};
use crate::type_node::{resolve_type, resolve_type_silently};
use indexmap::IndexSet;
use jadec_ast::{ExprKind, LambdaParam, NodeIndex};
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_common::{Atom, DiagnosticCode};
use jadec_emitter::{EmissionSink, StatementBuffer};
use jadec_solver::TypeId;
use rustc_hash::FxHashSet;
use tracing::trace;

/// A local copied into a lambda.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capture {
    pub name: Atom,
    /// Type of the copy: the narrowed type at the lambda, if any.
    pub type_id: TypeId,
    /// Java expression read when the copy is made.
    pub source: String,
    /// Name of the `final` copy.
    pub compiled_name: String,
}

fn parts<'n>(cx: &'n CheckerContext<'_>, node: NodeIndex) -> Option<(&'n [LambdaParam], NodeIndex)> {
    match cx.arena.kind(node) {
        Some(ExprKind::Lambda { params, body }) => Some((params.as_slice(), *body)),
        _ => None,
    }
}

/// Names read by `node` that are not bound inside it, in first-use order.
fn free_names(cx: &CheckerContext<'_>, node: NodeIndex, bound: &mut Vec<Atom>, out: &mut IndexSet<Atom>) {
    match cx.arena.kind(node) {
        Some(ExprKind::Name(atom)) => {
            if !bound.contains(atom) {
                out.insert(*atom);
            }
        }
        Some(ExprKind::Call { callee, args }) => {
            if !bound.contains(callee) {
                out.insert(*callee);
            }
            for arg in args {
                free_names(cx, arg.value, bound, out);
            }
        }
        Some(ExprKind::Lambda { params, body }) => {
            let before = bound.len();
            bound.extend(params.iter().map(|p| p.name));
            free_names(cx, *body, bound, out);
            bound.truncate(before);
        }
        Some(kind) => {
            for child in kind.children() {
                free_names(cx, child, bound, out);
            }
        }
        None => {}
    }
}

/// Locals of `state` read by `body` (apart from the `bound` names), each
/// with the name of its copy.
pub(crate) fn captures_of(
    cx: &CheckerContext<'_>,
    body: NodeIndex,
    mut bound: Vec<Atom>,
    state: &StaticState,
    copy_name: impl Fn(&str) -> String,
) -> Vec<Capture> {
    let mut names = IndexSet::new();
    free_names(cx, body, &mut bound, &mut names);
    names
        .into_iter()
        .filter_map(|name| {
            let symbol = state.search_name(name)?;
            if !symbol.is_capturable() {
                return None;
            }
            let flow = state.flow_type_of(&ExpressionDescriptor::name(name));
            let type_id = flow.unwrap_or(symbol.type_id);
            let source = match flow {
                Some(narrowed) if narrowed != symbol.type_id => {
                    format!("(({}) {})", cx.host_type(narrowed), symbol.compiled_name)
                }
                _ => symbol.compiled_name.clone(),
            };
            Some(Capture {
                name,
                type_id,
                source,
                compiled_name: copy_name(cx.text(name)),
            })
        })
        .collect()
}

/// Locals of `state` that the lambda at `node` must copy.
pub fn capture_list(cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> Vec<Capture> {
    let Some((params, body)) = parts(cx, node) else {
        return Vec::new();
    };
    let id = cx.lambda_id(node);
    let bound = params.iter().map(|p| p.name).collect();
    captures_of(cx, body, bound, state, |name| format!("__lambda{id}_{name}"))
}

fn param_types(cx: &CheckerContext<'_>, params: &[LambdaParam]) -> Vec<TypeId> {
    params.iter().map(|p| resolve_type_silently(cx, &p.ty)).collect()
}

/// State the body is checked in. With `captures`, captured locals are
/// rebound to their copies.
fn body_state(
    cx: &CheckerContext<'_>,
    params: &[LambdaParam],
    types: &[TypeId],
    captures: &[Capture],
    state: &StaticState,
) -> StaticState {
    let mut inner = state.enter_scope();
    for capture in captures {
        inner = inner.assert_named_symbol(
            capture.name,
            NamedSymbol::local(cx.text(capture.name), capture.type_id)
                .with_origin(SymbolOrigin::Capture)
                .with_compiled_name(capture.compiled_name.clone())
                .immutable(),
        );
    }
    for (param, ty) in params.iter().zip(types) {
        inner = inner.assert_named_symbol(
            param.name,
            NamedSymbol::local(cx.text(param.name), *ty)
                .with_origin(SymbolOrigin::Parameter)
                .with_span(param.span)
                .immutable(),
        );
    }
    inner
}

/// `lambda (x as T, …) => body`
pub(super) struct LambdaSemantics;

impl ExpressionSemantics for LambdaSemantics {
    fn infer_type(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> TypeId {
        let Some((params, body)) = parts(cx, node) else {
            return TypeId::ERROR;
        };
        let types = param_types(cx, params);
        let result = super::infer_type(cx, body, &body_state(cx, params, &types, &[], state));
        cx.types.function(types, result)
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) -> String {
        let Some((params, body)) = parts(cx, node) else {
            return super::unresolved_placeholder("lambda");
        };
        let captures = capture_list(cx, node, state);
        trace!(captures = captures.len(), "compile lambda");
        for capture in &captures {
            sink.emit_statement(format!(
                "final {} {} = {};",
                cx.host_type(capture.type_id),
                capture.compiled_name,
                capture.source
            ));
        }

        let types = param_types(cx, params);
        let inner = body_state(cx, params, &types, &captures, state);
        let mut buffer = StatementBuffer::new();
        let text = super::compile(cx, body, &inner, &mut buffer);
        for member in buffer.take_members() {
            sink.emit_member(member);
        }
        let statements = buffer.take_statements();

        let names: Vec<&str> = params.iter().map(|p| cx.text(p.name)).collect();
        let result = super::infer_type(cx, body, &inner);
        let function_type = cx.host_type(cx.types.function(types, result));
        let body_text = if statements.is_empty() {
            text
        } else {
            let mut lines = statements;
            lines.push(format!("return {text};"));
            jadec_emitter::block("", &lines).trim_start().to_string()
        };
        format!("(({function_type}) ({}) -> {body_text})", names.join(", "))
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let Some((params, body)) = parts(cx, node) else {
            return false;
        };
        let mut ok = true;
        let mut seen = FxHashSet::default();
        let mut types = Vec::with_capacity(params.len());
        for (i, param) in params.iter().enumerate() {
            if !seen.insert(param.name) {
                acceptor.accept_error(
                    format!("Parameter '{}' is declared more than once", cx.text(param.name)),
                    param.span,
                    Some("params"),
                    Some(i),
                    DiagnosticCode::DuplicateDeclaration,
                );
                ok = false;
            }
            let ty = resolve_type(cx, &param.ty, acceptor);
            ok &= !ty.is_error();
            types.push(ty);
        }
        ok && super::validate(cx, body, &body_state(cx, params, &types, &[], state), acceptor)
    }

    fn advance(&self, _cx: &CheckerContext<'_>, _node: NodeIndex, state: &StaticState) -> StaticState {
        state.clone()
    }

    fn is_without_side_effects(&self, _cx: &CheckerContext<'_>, _node: NodeIndex, _state: &StaticState) -> bool {
        true
    }
}
