//! Calls and callable resolution.
//!
//! Resolution is shared with functional-notation patterns: both look a
//! name up through `SymbolSearch` and map named arguments onto parameter
//! positions.

use super::{ExpressionSemantics, infer_sequence, validate_expecting};
use crate::context::CheckerContext;
use crate::expr::names::lookup_name;
use crate::state::StaticState;
use crate::symbols::{CallableKind, CallableParam, CallableSymbol, NamedSymbol};
use jadec_ast::{Argument, ExprKind, NodeIndex};
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_common::{Atom, Diagnostic, DiagnosticCode};
use jadec_emitter::EmissionSink;
use jadec_solver::{TypeData, TypeDatabase, TypeId};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

/// Outcome of resolving the target of `name(args…)`.
#[derive(Clone, Debug)]
pub enum CallResolution {
    /// A bound name holding a function value.
    FunctionValue {
        symbol: NamedSymbol,
        params: Vec<TypeId>,
        result: TypeId,
    },
    Callable(CallableSymbol),
    /// Nothing matches; carries the attempted signature.
    Unresolved(String),
    Ambiguous(Vec<CallableSymbol>),
}

impl CallResolution {
    pub fn result_type(&self) -> TypeId {
        match self {
            CallResolution::FunctionValue { result, .. } => *result,
            CallResolution::Callable(callable) => callable.result_type(),
            CallResolution::Unresolved(_) | CallResolution::Ambiguous(_) => TypeId::ERROR,
        }
    }

    /// Parameter types in declaration order.
    pub fn param_types(&self) -> Vec<TypeId> {
        match self {
            CallResolution::FunctionValue { params, .. } => params.clone(),
            CallResolution::Callable(callable) => callable.params.iter().map(|p| p.type_id).collect(),
            CallResolution::Unresolved(_) | CallResolution::Ambiguous(_) => Vec::new(),
        }
    }
}

/// Report `DuplicateArgumentName` and `MixedArgumentStyles`.
pub(crate) fn check_argument_style(
    cx: &CheckerContext<'_>,
    args: &[Argument],
    acceptor: &mut dyn DiagnosticAcceptor,
) -> bool {
    let named = args.iter().filter(|a| a.name.is_some()).count();
    if named != 0 && named != args.len() {
        let first_positional = args.iter().position(|a| a.name.is_none()).unwrap_or(0);
        acceptor.accept_error(
            "Named and positional arguments cannot be mixed".to_string(),
            cx.span(args[first_positional].value),
            Some("arguments"),
            Some(first_positional),
            DiagnosticCode::MixedArgumentStyles,
        );
        return false;
    }
    let mut seen: FxHashSet<Atom> = FxHashSet::default();
    let mut ok = true;
    for (i, arg) in args.iter().enumerate() {
        if let Some(name) = arg.name
            && !seen.insert(name)
        {
            acceptor.accept_error(
                format!("Argument '{}' is given more than once", cx.text(name)),
                cx.span(arg.value),
                Some("arguments"),
                Some(i),
                DiagnosticCode::DuplicateArgumentName,
            );
            ok = false;
        }
    }
    ok
}

/// For each parameter, the argument bound to it. `None` when an argument
/// names no parameter, or when `require_all` and some parameter is missing.
pub(crate) fn map_arguments(
    cx: &CheckerContext<'_>,
    args: &[Argument],
    params: &[CallableParam],
    require_all: bool,
) -> Option<Vec<Option<NodeIndex>>> {
    if args.iter().all(|a| a.name.is_none()) {
        return (args.len() == params.len())
            .then(|| args.iter().map(|a| Some(a.value)).collect());
    }
    let mut slots = vec![None; params.len()];
    for arg in args {
        let name = cx.text(arg.name?);
        let index = params.iter().position(|p| p.name == name)?;
        slots[index] = Some(arg.value);
    }
    if require_all && slots.iter().any(Option::is_none) {
        return None;
    }
    Some(slots)
}

/// Human-readable signature of an attempted call.
fn attempted_signature(cx: &CheckerContext<'_>, callee: &str, args: &[Argument], types: &[TypeId]) -> String {
    let rendered: Vec<String> = args
        .iter()
        .zip(types)
        .map(|(arg, ty)| match arg.name {
            Some(name) => format!("{}: {}", cx.text(name), cx.format_type(*ty)),
            None => cx.format_type(*ty),
        })
        .collect();
    format!("{callee}({})", rendered.join(", "))
}

/// Declared signature of a callable, for candidate lists.
pub(crate) fn describe_callable(cx: &CheckerContext<'_>, callable: &CallableSymbol) -> String {
    let params: Vec<String> = callable
        .params
        .iter()
        .map(|p| format!("{} as {}", p.name, cx.format_type(p.type_id)))
        .collect();
    match callable.return_type {
        Some(ret) => format!("{}({}) as {}", callable.name, params.join(", "), cx.format_type(ret)),
        None => format!("{}({})", callable.name, params.join(", ")),
    }
}

/// Report an ambiguity, listing every candidate with its location.
pub(crate) fn report_ambiguity(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    what: &str,
    candidates: &[CallableSymbol],
    code: DiagnosticCode,
    acceptor: &mut dyn DiagnosticAcceptor,
) {
    let listed: Vec<String> = candidates.iter().map(|c| describe_callable(cx, c)).collect();
    let mut diagnostic = Diagnostic::error(
        cx.span(node),
        format!("Ambiguous {what}; candidates are: {}", listed.join("; ")),
        code,
    );
    for (candidate, text) in candidates.iter().zip(listed) {
        if let Some(span) = candidate.span {
            diagnostic = diagnostic.with_related(cx.file_name.clone(), span, format!("Candidate: {text}"));
        }
    }
    acceptor.accept(diagnostic);
}

/// Resolve the target of a call with arguments of the given types.
pub fn resolve_call_target(
    cx: &CheckerContext<'_>,
    callee: Atom,
    args: &[Argument],
    arg_types: &[TypeId],
    state: &StaticState,
) -> CallResolution {
    let name = cx.text(callee);

    if let Some(symbol) = lookup_name(cx, callee, state)
        && let Some(TypeData::Function { params, result }) = cx.types.lookup(symbol.type_id)
        && params.len() == args.len()
    {
        return CallResolution::FunctionValue {
            params: params.to_vec(),
            result,
            symbol,
        };
    }

    let by_shape = cx.symbols.search_callable(name, &|_| true, &|params| {
        map_arguments(cx, args, params, true).is_some()
    });
    let type_of: FxHashMap<NodeIndex, TypeId> = args
        .iter()
        .map(|a| a.value)
        .zip(arg_types.iter().copied())
        .collect();
    let accepts = |candidate: &CallableSymbol| {
        map_arguments(cx, args, &candidate.params, true).is_some_and(|slots| {
            slots.iter().zip(&candidate.params).all(|(slot, param)| {
                slot.and_then(|node| type_of.get(&node))
                    .is_some_and(|ty| cx.is_assignable(*ty, param.type_id))
            })
        })
    };
    let mut by_type: Vec<CallableSymbol> = by_shape.iter().filter(|c| accepts(c)).cloned().collect();
    trace!(callee = name, by_shape = by_shape.len(), by_type = by_type.len(), "resolve call");

    if by_type.len() > 1 {
        return CallResolution::Ambiguous(by_type);
    }
    // A single candidate of the right shape is kept so its arguments can
    // be reported one by one.
    match by_type.pop().or_else(|| (by_shape.len() == 1).then(|| by_shape[0].clone())) {
        Some(callable) => CallResolution::Callable(callable),
        None => CallResolution::Unresolved(attempted_signature(cx, name, args, arg_types)),
    }
}

/// `callee(args…)`
pub(super) struct CallSemantics;

impl CallSemantics {
    fn parts<'n>(cx: &'n CheckerContext<'_>, node: NodeIndex) -> Option<(Atom, &'n [Argument])> {
        match cx.arena.kind(node) {
            Some(ExprKind::Call { callee, args }) => Some((*callee, args.as_slice())),
            _ => None,
        }
    }

    fn resolve<'n>(
        cx: &'n CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> Option<(CallResolution, &'n [Argument])> {
        let (callee, args) = Self::parts(cx, node)?;
        let values: Vec<NodeIndex> = args.iter().map(|a| a.value).collect();
        let (types, _) = infer_sequence(cx, &values, state);
        Some((resolve_call_target(cx, callee, args, &types, state), args))
    }

    /// Arguments in parameter order (positional calls keep source order).
    fn ordered_arguments(cx: &CheckerContext<'_>, resolution: &CallResolution, args: &[Argument]) -> Vec<NodeIndex> {
        match resolution {
            CallResolution::Callable(callable) => map_arguments(cx, args, &callable.params, true)
                .map(|slots| slots.into_iter().flatten().collect())
                .unwrap_or_else(|| args.iter().map(|a| a.value).collect()),
            _ => args.iter().map(|a| a.value).collect(),
        }
    }
}

impl ExpressionSemantics for CallSemantics {
    fn infer_type(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> TypeId {
        Self::resolve(cx, node, state).map_or(TypeId::ERROR, |(r, _)| r.result_type())
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) -> String {
        let Some((resolution, args)) = Self::resolve(cx, node, state) else {
            return super::unresolved_placeholder("call");
        };
        let ordered = Self::ordered_arguments(cx, &resolution, args);
        let params = resolution.param_types();
        let mut compiled = Vec::with_capacity(ordered.len());
        let mut current = state.clone();
        for (i, &arg) in ordered.iter().enumerate() {
            compiled.push(super::compile_expecting(cx, arg, &current, params.get(i).copied(), sink));
            current = super::advance(cx, arg, &current);
        }
        let compiled = compiled.join(", ");
        match resolution {
            CallResolution::FunctionValue { symbol, .. } => format!("{}.apply({compiled})", symbol.compiled_name),
            CallResolution::Callable(callable) => match callable.kind {
                CallableKind::Function { host_name } => format!("{host_name}({compiled})"),
                CallableKind::Constructor { host_class, .. } => format!("new {host_class}({compiled})"),
            },
            CallResolution::Unresolved(signature) => super::unresolved_placeholder(&signature),
            CallResolution::Ambiguous(_) => super::unresolved_placeholder("ambiguous call"),
        }
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let Some((callee, args)) = Self::parts(cx, node) else {
            return false;
        };
        if !check_argument_style(cx, args, acceptor) {
            return false;
        }
        let Some((resolution, _)) = Self::resolve(cx, node, state) else {
            return false;
        };
        match &resolution {
            CallResolution::Unresolved(signature) => {
                acceptor.accept_error(
                    format!("Cannot resolve call to '{signature}'"),
                    cx.span(node),
                    Some("callee"),
                    None,
                    DiagnosticCode::UnresolvedCall,
                );
                // Arguments are still checked on their own.
                let values: Vec<NodeIndex> = args.iter().map(|a| a.value).collect();
                super::validate_sequence(cx, &values, state, acceptor);
                return false;
            }
            CallResolution::Ambiguous(candidates) => {
                report_ambiguity(
                    cx,
                    node,
                    &format!("call to '{}'", cx.text(callee)),
                    candidates,
                    DiagnosticCode::AmbiguousCallResolution,
                    acceptor,
                );
                return false;
            }
            CallResolution::Callable(_) | CallResolution::FunctionValue { .. } => {}
        }

        let ordered = Self::ordered_arguments(cx, &resolution, args);
        let params = resolution.param_types();
        let mut ok = true;
        let mut current = state.clone();
        for (i, (&arg, &param)) in ordered.iter().zip(&params).enumerate() {
            if validate_expecting(cx, arg, &current, Some(param), acceptor) {
                let ty = super::infer_type_expecting(cx, arg, &current, Some(param));
                if !cx.is_assignable(ty, param) {
                    acceptor.accept_error(
                        format!(
                            "Argument of type '{}' is not assignable to parameter of type '{}'",
                            cx.format_type(ty),
                            cx.format_type(param)
                        ),
                        cx.span(arg),
                        Some("arguments"),
                        Some(i),
                        DiagnosticCode::InvalidArgumentType,
                    );
                    ok = false;
                }
            } else {
                ok = false;
            }
            current = super::advance(cx, arg, &current);
        }
        ok
    }

    fn is_without_side_effects(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        let Some((resolution, args)) = Self::resolve(cx, node, state) else {
            return false;
        };
        let target_pure = match &resolution {
            CallResolution::Callable(callable) => callable.pure,
            _ => false,
        };
        target_pure && {
            let mut current = state.clone();
            args.iter().all(|arg| {
                let pure = super::is_without_side_effects(cx, arg.value, &current);
                current = super::advance(cx, arg.value, &current);
                pure
            })
        }
    }

    fn is_holed(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        Self::parts(cx, node).is_some_and(|(_, args)| args.iter().any(|a| super::is_holed(cx, a.value, state)))
    }
}
