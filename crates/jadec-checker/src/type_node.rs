//! Resolution of written type expressions to interned types.

use crate::context::CheckerContext;
use jadec_ast::TypeExpr;
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_common::limits::MAX_TUPLE_ARITY;
use jadec_common::DiagnosticCode;
use jadec_solver::{DefKind, IntrinsicKind, TypeDatabase, TypeId, TypeInterner};

/// Resolve `ty`, reporting what cannot be resolved. Unresolvable parts
/// become the error type so checking can continue.
pub fn resolve_type(
    cx: &CheckerContext<'_>,
    ty: &TypeExpr,
    acceptor: &mut dyn DiagnosticAcceptor,
) -> TypeId {
    match ty {
        TypeExpr::Named { name, span } => {
            let text = cx.text(*name);
            if let Some(kind) = IntrinsicKind::from_keyword(text) {
                return kind.type_id();
            }
            match cx.types.definitions().find_by_name(text) {
                Some(def) => {
                    let native = cx
                        .types
                        .definitions()
                        .get(def)
                        .is_some_and(|d| d.kind == DefKind::Native);
                    if native {
                        cx.types.host(def)
                    } else {
                        cx.types.nominal(def)
                    }
                }
                None => {
                    acceptor.accept_error(
                        format!("Cannot resolve type '{text}'"),
                        *span,
                        Some("type"),
                        None,
                        DiagnosticCode::UnresolvedType,
                    );
                    TypeId::ERROR
                }
            }
        }
        TypeExpr::List { element, .. } => {
            let element = resolve_type(cx, element, acceptor);
            cx.types.list(element)
        }
        TypeExpr::Set { element, .. } => {
            let element = resolve_type(cx, element, acceptor);
            cx.types.set(element)
        }
        TypeExpr::Map { key, value, .. } => {
            let key = resolve_type(cx, key, acceptor);
            let value = resolve_type(cx, value, acceptor);
            cx.types.map(key, value)
        }
        TypeExpr::Tuple { elements, span } => {
            if !TypeInterner::is_tuple_arity_supported(elements.len()) {
                acceptor.accept_error(
                    format!(
                        "Tuple types must have between 1 and {MAX_TUPLE_ARITY} elements, found {}",
                        elements.len()
                    ),
                    *span,
                    Some("type"),
                    None,
                    DiagnosticCode::TupleTooBig,
                );
            }
            let elements = elements
                .iter()
                .map(|e| resolve_type(cx, e, acceptor))
                .collect();
            cx.types.tuple(elements)
        }
        TypeExpr::Message { content, .. } => {
            let content = resolve_type(cx, content, acceptor);
            cx.types.message(content)
        }
        TypeExpr::Function { params, result, .. } => {
            let params = params
                .iter()
                .map(|p| resolve_type(cx, p, acceptor))
                .collect();
            let result = resolve_type(cx, result, acceptor);
            cx.types.function(params, result)
        }
    }
}

/// Resolve without reporting.
pub fn resolve_type_silently(cx: &CheckerContext<'_>, ty: &TypeExpr) -> TypeId {
    resolve_type(cx, ty, &mut jadec_common::diagnostics::IgnoringAcceptor)
}
