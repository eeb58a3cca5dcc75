//! Tuple, list, set and map literals.
//!
//! Element types come from, in order: the explicit `of T` clause, the
//! least upper bound of the elements (including the rest's elements), and
//! the expected type of the surrounding context. An empty literal with none
//! of these cannot be typed.

use super::{ExpressionSemantics, advance, compile_expecting, infer_type_expecting};
use crate::context::CheckerContext;
use crate::state::StaticState;
use crate::type_node::{resolve_type, resolve_type_silently};
use jadec_ast::{ExprKind, NodeIndex, TypeExpr};
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_common::limits::MAX_TUPLE_ARITY;
use jadec_common::{Diagnostic, DiagnosticCode};
use jadec_emitter::EmissionSink;
use jadec_solver::host::{COLLECTIONS_CLASS, tuple_class};
use jadec_solver::{LatticeBound, TypeData, TypeDatabase, TypeId};
use tracing::trace;

/// Compile `nodes` in sequence, each with its own expected type.
fn compile_each(
    cx: &CheckerContext<'_>,
    nodes: &[NodeIndex],
    state: &StaticState,
    expected: impl Fn(usize) -> Option<TypeId>,
    sink: &mut dyn EmissionSink,
) -> (Vec<String>, StaticState) {
    let mut texts = Vec::with_capacity(nodes.len());
    let mut state = state.clone();
    for (i, &node) in nodes.iter().enumerate() {
        texts.push(compile_expecting(cx, node, &state, expected(i), sink));
        state = advance(cx, node, &state);
    }
    (texts, state)
}

fn validate_each(
    cx: &CheckerContext<'_>,
    nodes: &[NodeIndex],
    state: &StaticState,
    expected: impl Fn(usize) -> Option<TypeId>,
    acceptor: &mut dyn DiagnosticAcceptor,
) -> (bool, StaticState) {
    let mut ok = true;
    let mut state = state.clone();
    for (i, &node) in nodes.iter().enumerate() {
        ok &= super::validate_expecting(cx, node, &state, expected(i), acceptor);
        state = advance(cx, node, &state);
    }
    (ok, state)
}

fn infer_each(
    cx: &CheckerContext<'_>,
    nodes: &[NodeIndex],
    state: &StaticState,
    expected: impl Fn(usize) -> Option<TypeId>,
) -> (Vec<TypeId>, StaticState) {
    let mut types = Vec::with_capacity(nodes.len());
    let mut state = state.clone();
    for (i, &node) in nodes.iter().enumerate() {
        types.push(infer_type_expecting(cx, node, &state, expected(i)));
        state = advance(cx, node, &state);
    }
    (types, state)
}

/// Bound of `types`, replaced by `expected` when every type fits it.
fn element_bound(cx: &CheckerContext<'_>, types: &[TypeId], expected: Option<TypeId>) -> Option<LatticeBound> {
    if let Some(expected) = expected
        && types.iter().all(|t| cx.is_assignable(*t, expected))
    {
        return Some(LatticeBound::exact(expected));
    }
    if types.is_empty() {
        return None;
    }
    Some(cx.lattice().lub_all(types.iter().copied()))
}

fn report_inferred_top(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    bound: &LatticeBound,
    acceptor: &mut dyn DiagnosticAcceptor,
) {
    if let Some(note) = &bound.note
        && cx.options.report_inferred_top
    {
        acceptor.accept(Diagnostic::info(
            cx.span(node),
            format!("Element type inferred as '{}': {note}", cx.format_type(bound.type_id)),
            DiagnosticCode::InferredTopType,
        ));
    }
}

fn report_mismatch(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    what: &str,
    found: TypeId,
    required: TypeId,
    index: Option<usize>,
    acceptor: &mut dyn DiagnosticAcceptor,
) {
    acceptor.accept_error(
        format!(
            "{what} of type '{}' is not assignable to '{}'",
            cx.format_type(found),
            cx.format_type(required)
        ),
        cx.span(node),
        Some("elements"),
        index,
        DiagnosticCode::TypeMismatch,
    );
}

// =============================================================================
// Tuples
// =============================================================================

/// `(a, b, …)`
pub(super) struct TupleSemantics;

impl TupleSemantics {
    fn elements<'n>(cx: &'n CheckerContext<'_>, node: NodeIndex) -> &'n [NodeIndex] {
        match cx.arena.kind(node) {
            Some(ExprKind::TupleLiteral(elements)) => elements,
            _ => &[],
        }
    }

    /// Expected element types when `expected` is a tuple of the same arity.
    fn expected_elements(cx: &CheckerContext<'_>, expected: Option<TypeId>, arity: usize) -> Vec<Option<TypeId>> {
        match expected.and_then(|e| cx.types.tuple_elements(e)) {
            Some(elements) if elements.len() == arity => elements.iter().copied().map(Some).collect(),
            _ => vec![None; arity],
        }
    }
}

impl ExpressionSemantics for TupleSemantics {
    fn infer_type(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> TypeId {
        self.infer_type_expecting(cx, node, state, None)
    }

    fn infer_type_expecting(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        expected: Option<TypeId>,
    ) -> TypeId {
        let elements = Self::elements(cx, node);
        let hints = Self::expected_elements(cx, expected, elements.len());
        let (types, _) = infer_each(cx, elements, state, |i| hints[i]);
        cx.types.tuple(types)
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) -> String {
        self.compile_expecting(cx, node, state, None, sink)
    }

    fn compile_expecting(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        expected: Option<TypeId>,
        sink: &mut dyn EmissionSink,
    ) -> String {
        let elements = Self::elements(cx, node);
        let arity = elements.len();
        let hints = Self::expected_elements(cx, expected, arity);
        let (texts, _) = compile_each(cx, elements, state, |i| hints[i], sink);
        if arity > MAX_TUPLE_ARITY {
            trace!(arity, "degraded tuple literal");
            return format!("null /* tuple of {arity} elements */");
        }
        let (types, _) = infer_each(cx, elements, state, |i| hints[i]);
        let hosts: Vec<String> = types.iter().map(|t| cx.host_type(*t)).collect();
        format!("new {}<{}>({})", tuple_class(arity), hosts.join(", "), texts.join(", "))
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        self.validate_expecting(cx, node, state, None, acceptor)
    }

    fn validate_expecting(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        expected: Option<TypeId>,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let elements = Self::elements(cx, node);
        let hints = Self::expected_elements(cx, expected, elements.len());
        let (ok, _) = validate_each(cx, elements, state, |i| hints[i], acceptor);
        if elements.len() > MAX_TUPLE_ARITY {
            acceptor.accept_error(
                format!(
                    "Tuples can have at most {MAX_TUPLE_ARITY} elements, found {}",
                    elements.len()
                ),
                cx.span(node),
                None,
                None,
                DiagnosticCode::TupleTooBig,
            );
            return false;
        }
        ok
    }

    fn is_holed(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        Self::elements(cx, node).iter().any(|e| super::is_holed(cx, *e, state))
    }

    fn is_typely_holed(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        Self::elements(cx, node)
            .iter()
            .any(|e| super::is_typely_holed(cx, *e, state))
    }
}

// =============================================================================
// Lists and sets
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum Sequence {
    List,
    Set,
}

struct SequenceParts<'n> {
    elements: &'n [NodeIndex],
    rest: Option<NodeIndex>,
    element_type: Option<&'n TypeExpr>,
}

impl SequenceParts<'_> {
    fn children(&self) -> Vec<NodeIndex> {
        self.elements.iter().copied().chain(self.rest).collect()
    }
}

impl Sequence {
    fn parts<'n>(self, cx: &'n CheckerContext<'_>, node: NodeIndex) -> Option<SequenceParts<'n>> {
        match (self, cx.arena.kind(node)?) {
            (
                Sequence::List,
                ExprKind::ListLiteral {
                    elements,
                    rest,
                    element_type,
                },
            )
            | (
                Sequence::Set,
                ExprKind::SetLiteral {
                    elements,
                    rest,
                    element_type,
                },
            ) => Some(SequenceParts {
                elements,
                rest: *rest,
                element_type: element_type.as_ref(),
            }),
            _ => None,
        }
    }

    const fn noun(self) -> &'static str {
        match self {
            Sequence::List => "list",
            Sequence::Set => "set",
        }
    }

    const fn factory(self) -> &'static str {
        match self {
            Sequence::List => "List",
            Sequence::Set => "Set",
        }
    }

    const fn cannot_compute(self) -> DiagnosticCode {
        match self {
            Sequence::List => DiagnosticCode::ListLiteralCannotComputeType,
            Sequence::Set => DiagnosticCode::SetLiteralCannotComputeType,
        }
    }

    fn wrap(self, cx: &CheckerContext<'_>, element: TypeId) -> TypeId {
        match self {
            Sequence::List => cx.types.list(element),
            Sequence::Set => cx.types.set(element),
        }
    }

    /// Element type of `ty` when it is a collection of this kind.
    fn element_of(self, cx: &CheckerContext<'_>, ty: TypeId) -> Option<TypeId> {
        match (self, cx.types.lookup(ty)?) {
            (Sequence::List, TypeData::List(e)) | (Sequence::Set, TypeData::Set(e)) => Some(e),
            _ => None,
        }
    }

    /// Element type of the literal, or `None` when it cannot be computed.
    fn bound(
        self,
        cx: &CheckerContext<'_>,
        parts: &SequenceParts<'_>,
        state: &StaticState,
        expected: Option<TypeId>,
    ) -> Option<LatticeBound> {
        if let Some(ty) = parts.element_type {
            return Some(LatticeBound::exact(resolve_type_silently(cx, ty)));
        }
        let expected_element = expected.and_then(|e| self.element_of(cx, e));
        let (mut types, after) = infer_each(cx, parts.elements, state, |_| expected_element);
        if let Some(rest) = parts.rest {
            let rest_type = infer_type_expecting(cx, rest, &after, expected);
            if rest_type.is_error() {
                types.push(TypeId::ERROR);
            } else if let Some(element) = self.element_of(cx, rest_type) {
                types.push(element);
            }
        }
        element_bound(cx, &types, expected_element)
    }

    fn infer(self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState, expected: Option<TypeId>) -> TypeId {
        self.parts(cx, node)
            .and_then(|parts| self.bound(cx, &parts, state, expected))
            .map_or(TypeId::ERROR, |b| self.wrap(cx, b.type_id))
    }

    fn validate(
        self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        expected: Option<TypeId>,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let Some(parts) = self.parts(cx, node) else {
            return false;
        };
        let declared = match parts.element_type {
            Some(ty) => match resolve_type(cx, ty, acceptor) {
                ty if ty.is_error() => return false,
                ty => Some(ty),
            },
            None => None,
        };
        let hint = declared.or_else(|| expected.and_then(|e| self.element_of(cx, e)));
        let (mut ok, after) = validate_each(cx, parts.elements, state, |_| hint, acceptor);
        let rest_ok = parts
            .rest
            .is_none_or(|rest| super::validate_expecting(cx, rest, &after, hint.map(|h| self.wrap(cx, h)), acceptor));
        if !(ok && rest_ok) {
            return false;
        }

        let Some(bound) = self.bound(cx, &parts, state, expected) else {
            acceptor.accept_error(
                format!(
                    "Cannot compute the element type of this {0}; write '{0} of T' or give it a declared type",
                    self.noun()
                ),
                cx.span(node),
                None,
                None,
                self.cannot_compute(),
            );
            return false;
        };
        report_inferred_top(cx, node, &bound, acceptor);

        let element = bound.type_id;
        let (types, after) = infer_each(cx, parts.elements, state, |_| hint);
        for (i, (&e, ty)) in parts.elements.iter().zip(types).enumerate() {
            if !cx.is_assignable(ty, element) {
                report_mismatch(cx, e, "Element", ty, element, Some(i), acceptor);
                ok = false;
            }
        }
        if let Some(rest) = parts.rest {
            let rest_type = infer_type_expecting(cx, rest, &after, Some(self.wrap(cx, element)));
            let required = self.wrap(cx, element);
            if !cx.is_assignable(rest_type, required) {
                report_mismatch(cx, rest, "Rest", rest_type, required, None, acceptor);
                ok = false;
            }
        }
        ok
    }

    fn compile(
        self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        expected: Option<TypeId>,
        sink: &mut dyn EmissionSink,
    ) -> String {
        let Some(parts) = self.parts(cx, node) else {
            return super::unresolved_placeholder(self.noun());
        };
        let Some(bound) = self.bound(cx, &parts, state, expected) else {
            return super::unresolved_placeholder(&format!("{} type", self.noun()));
        };
        let element = bound.type_id;
        let host = cx.host_type(element);
        let (texts, after) = compile_each(cx, parts.elements, state, |_| Some(element), sink);
        let items = format!("java.util.Arrays.<{host}>asList({})", texts.join(", "));
        match parts.rest {
            None => format!("{COLLECTIONS_CLASS}.<{host}>create{}({items})", self.factory()),
            Some(rest) => {
                let rest = compile_expecting(cx, rest, &after, Some(self.wrap(cx, element)), sink);
                format!("{COLLECTIONS_CLASS}.<{host}>concat{}({items}, {rest})", self.factory())
            }
        }
    }

    fn is_holed(self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        self.parts(cx, node)
            .is_some_and(|p| p.children().into_iter().any(|c| super::is_holed(cx, c, state)))
    }

    fn is_typely_holed(self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        self.parts(cx, node)
            .is_some_and(|p| p.children().into_iter().any(|c| super::is_typely_holed(cx, c, state)))
    }
}

macro_rules! sequence_semantics {
    ($name:ident, $sequence:expr) => {
        pub(super) struct $name;

        impl ExpressionSemantics for $name {
            fn infer_type(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> TypeId {
                $sequence.infer(cx, node, state, None)
            }

            fn infer_type_expecting(
                &self,
                cx: &CheckerContext<'_>,
                node: NodeIndex,
                state: &StaticState,
                expected: Option<TypeId>,
            ) -> TypeId {
                $sequence.infer(cx, node, state, expected)
            }

            fn compile(
                &self,
                cx: &CheckerContext<'_>,
                node: NodeIndex,
                state: &StaticState,
                sink: &mut dyn EmissionSink,
            ) -> String {
                $sequence.compile(cx, node, state, None, sink)
            }

            fn compile_expecting(
                &self,
                cx: &CheckerContext<'_>,
                node: NodeIndex,
                state: &StaticState,
                expected: Option<TypeId>,
                sink: &mut dyn EmissionSink,
            ) -> String {
                $sequence.compile(cx, node, state, expected, sink)
            }

            fn validate(
                &self,
                cx: &CheckerContext<'_>,
                node: NodeIndex,
                state: &StaticState,
                acceptor: &mut dyn DiagnosticAcceptor,
            ) -> bool {
                $sequence.validate(cx, node, state, None, acceptor)
            }

            fn validate_expecting(
                &self,
                cx: &CheckerContext<'_>,
                node: NodeIndex,
                state: &StaticState,
                expected: Option<TypeId>,
                acceptor: &mut dyn DiagnosticAcceptor,
            ) -> bool {
                $sequence.validate(cx, node, state, expected, acceptor)
            }

            fn is_holed(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
                $sequence.is_holed(cx, node, state)
            }

            fn is_typely_holed(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
                $sequence.is_typely_holed(cx, node, state)
            }
        }
    };
}

sequence_semantics!(ListSemantics, Sequence::List);
sequence_semantics!(SetSemantics, Sequence::Set);

// =============================================================================
// Maps
// =============================================================================

/// `{k: v, … | rest}`; `{:}` is the empty map.
pub(super) struct MapSemantics;

struct MapParts<'n> {
    entries: &'n [(NodeIndex, NodeIndex)],
    rest: Option<NodeIndex>,
    key_type: Option<&'n TypeExpr>,
    value_type: Option<&'n TypeExpr>,
}

impl MapParts<'_> {
    /// Keys and values in evaluation order.
    fn flattened(&self) -> Vec<NodeIndex> {
        self.entries.iter().flat_map(|(k, v)| [*k, *v]).collect()
    }
}

impl MapSemantics {
    fn parts<'n>(cx: &'n CheckerContext<'_>, node: NodeIndex) -> Option<MapParts<'n>> {
        match cx.arena.kind(node)? {
            ExprKind::MapLiteral {
                entries,
                rest,
                key_type,
                value_type,
            } => Some(MapParts {
                entries,
                rest: *rest,
                key_type: key_type.as_ref(),
                value_type: value_type.as_ref(),
            }),
            _ => None,
        }
    }

    /// Key and value types, or `None` when they cannot be computed.
    fn bounds(
        cx: &CheckerContext<'_>,
        parts: &MapParts<'_>,
        state: &StaticState,
        expected: Option<TypeId>,
    ) -> Option<(LatticeBound, LatticeBound)> {
        if let (Some(k), Some(v)) = (parts.key_type, parts.value_type) {
            return Some((
                LatticeBound::exact(resolve_type_silently(cx, k)),
                LatticeBound::exact(resolve_type_silently(cx, v)),
            ));
        }
        let (expected_key, expected_value) = expected
            .and_then(|e| cx.types.map_types(e))
            .map_or((None, None), |(k, v)| (Some(k), Some(v)));
        let flat = parts.flattened();
        let (types, after) = infer_each(cx, &flat, state, |i| {
            if i % 2 == 0 { expected_key } else { expected_value }
        });
        let mut keys: Vec<TypeId> = types.iter().step_by(2).copied().collect();
        let mut values: Vec<TypeId> = types.iter().skip(1).step_by(2).copied().collect();
        if let Some(rest) = parts.rest {
            let rest_type = infer_type_expecting(cx, rest, &after, expected);
            if rest_type.is_error() {
                keys.push(TypeId::ERROR);
                values.push(TypeId::ERROR);
            } else if let Some((k, v)) = cx.types.map_types(rest_type) {
                keys.push(k);
                values.push(v);
            }
        }
        Some((
            element_bound(cx, &keys, expected_key)?,
            element_bound(cx, &values, expected_value)?,
        ))
    }

    fn entry_hint(key: Option<TypeId>, value: Option<TypeId>) -> impl Fn(usize) -> Option<TypeId> {
        move |i| if i % 2 == 0 { key } else { value }
    }
}

impl ExpressionSemantics for MapSemantics {
    fn infer_type(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> TypeId {
        self.infer_type_expecting(cx, node, state, None)
    }

    fn infer_type_expecting(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        expected: Option<TypeId>,
    ) -> TypeId {
        Self::parts(cx, node)
            .and_then(|parts| Self::bounds(cx, &parts, state, expected))
            .map_or(TypeId::ERROR, |(k, v)| cx.types.map(k.type_id, v.type_id))
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) -> String {
        self.compile_expecting(cx, node, state, None, sink)
    }

    fn compile_expecting(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        expected: Option<TypeId>,
        sink: &mut dyn EmissionSink,
    ) -> String {
        let Some(parts) = Self::parts(cx, node) else {
            return super::unresolved_placeholder("map");
        };
        let Some((key, value)) = Self::bounds(cx, &parts, state, expected) else {
            return super::unresolved_placeholder("map type");
        };
        let (key, value) = (key.type_id, value.type_id);
        let (key_host, value_host) = (cx.host_type(key), cx.host_type(value));
        let flat = parts.flattened();
        let (texts, after) = compile_each(cx, &flat, state, Self::entry_hint(Some(key), Some(value)), sink);
        let keys: Vec<&str> = texts.iter().step_by(2).map(String::as_str).collect();
        let values: Vec<&str> = texts.iter().skip(1).step_by(2).map(String::as_str).collect();
        let arguments = format!(
            "java.util.Arrays.<{key_host}>asList({}), java.util.Arrays.<{value_host}>asList({})",
            keys.join(", "),
            values.join(", ")
        );
        match parts.rest {
            None => format!("{COLLECTIONS_CLASS}.<{key_host}, {value_host}>createMap({arguments})"),
            Some(rest) => {
                let rest = compile_expecting(cx, rest, &after, Some(cx.types.map(key, value)), sink);
                format!("{COLLECTIONS_CLASS}.<{key_host}, {value_host}>concatMap({arguments}, {rest})")
            }
        }
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        self.validate_expecting(cx, node, state, None, acceptor)
    }

    fn validate_expecting(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        expected: Option<TypeId>,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let Some(parts) = Self::parts(cx, node) else {
            return false;
        };
        let declared_key = parts.key_type.map(|k| resolve_type(cx, k, acceptor));
        let declared_value = parts.value_type.map(|v| resolve_type(cx, v, acceptor));
        if declared_key.is_some_and(TypeId::is_error) || declared_value.is_some_and(TypeId::is_error) {
            return false;
        }
        let expected_parts = expected.and_then(|e| cx.types.map_types(e));
        let key_hint = declared_key.or(expected_parts.map(|(k, _)| k));
        let value_hint = declared_value.or(expected_parts.map(|(_, v)| v));

        let flat = parts.flattened();
        let (mut ok, after) = validate_each(cx, &flat, state, Self::entry_hint(key_hint, value_hint), acceptor);
        if let Some(rest) = parts.rest {
            let rest_hint = key_hint.zip(value_hint).map(|(k, v)| cx.types.map(k, v));
            ok &= super::validate_expecting(cx, rest, &after, rest_hint, acceptor);
        }
        if !ok {
            return false;
        }

        let Some((key, value)) = Self::bounds(cx, &parts, state, expected) else {
            acceptor.accept_error(
                "Cannot compute the key and value types of this map; write 'of K:V' or give it a declared type"
                    .to_string(),
                cx.span(node),
                None,
                None,
                DiagnosticCode::MapLiteralCannotComputeType,
            );
            return false;
        };
        report_inferred_top(cx, node, &key, acceptor);
        report_inferred_top(cx, node, &value, acceptor);

        let (key, value) = (key.type_id, value.type_id);
        let (types, after) = infer_each(cx, &flat, state, Self::entry_hint(key_hint, value_hint));
        for (i, (&e, ty)) in flat.iter().zip(types).enumerate() {
            let (what, required) = if i % 2 == 0 { ("Key", key) } else { ("Value", value) };
            if !cx.is_assignable(ty, required) {
                report_mismatch(cx, e, what, ty, required, Some(i / 2), acceptor);
                ok = false;
            }
        }
        if let Some(rest) = parts.rest {
            let required = cx.types.map(key, value);
            let rest_type = infer_type_expecting(cx, rest, &after, Some(required));
            if !cx.is_assignable(rest_type, required) {
                report_mismatch(cx, rest, "Rest", rest_type, required, None, acceptor);
                ok = false;
            }
        }
        ok
    }

    fn is_holed(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        Self::parts(cx, node).is_some_and(|p| {
            p.flattened()
                .into_iter()
                .chain(p.rest)
                .any(|c| super::is_holed(cx, c, state))
        })
    }

    fn is_typely_holed(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        Self::parts(cx, node).is_some_and(|p| {
            p.flattened()
                .into_iter()
                .chain(p.rest)
                .any(|c| super::is_typely_holed(cx, c, state))
        })
    }
}
