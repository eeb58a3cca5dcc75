//! Names, property reads and the `_` placeholder.

use super::{ExpressionSemantics, report};
use crate::context::CheckerContext;
use crate::naming::getter_name;
use crate::state::{ExpressionDescriptor, StaticState};
use crate::symbols::NamedSymbol;
use jadec_ast::{ExprKind, NodeIndex};
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_common::{Atom, DiagnosticCode};
use jadec_emitter::EmissionSink;
use jadec_solver::{TypeData, TypeDatabase, TypeId};

/// Binding of `name`: locals in `state` shadow globals.
pub(crate) fn lookup_name(
    cx: &CheckerContext<'_>,
    name: Atom,
    state: &StaticState,
) -> Option<NamedSymbol> {
    if let Some(symbol) = state.search_name(name) {
        return Some(symbol.clone());
    }
    cx.symbols.search_name(cx.text(name)).into_iter().next()
}

/// Java text reading `compiled`, cast when the flow type is narrower than
/// the declared one.
fn read_with_flow_type(
    cx: &CheckerContext<'_>,
    compiled: String,
    declared: TypeId,
    flow: Option<TypeId>,
) -> String {
    match flow {
        Some(narrowed) if narrowed != declared && !narrowed.is_error() => {
            format!("(({}) {compiled})", cx.host_type(narrowed))
        }
        _ => compiled,
    }
}

pub(super) struct NameSemantics;

impl NameSemantics {
    fn atom(cx: &CheckerContext<'_>, node: NodeIndex) -> Option<Atom> {
        match cx.arena.kind(node) {
            Some(ExprKind::Name(atom)) => Some(*atom),
            _ => None,
        }
    }
}

impl ExpressionSemantics for NameSemantics {
    fn infer_type(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> TypeId {
        let Some(atom) = Self::atom(cx, node) else {
            return TypeId::ERROR;
        };
        match lookup_name(cx, atom, state) {
            Some(symbol) => state
                .flow_type_of(&ExpressionDescriptor::name(atom))
                .unwrap_or(symbol.type_id),
            None => TypeId::ERROR,
        }
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        _sink: &mut dyn EmissionSink,
    ) -> String {
        let Some(atom) = Self::atom(cx, node) else {
            return super::unresolved_placeholder("name");
        };
        match lookup_name(cx, atom, state) {
            Some(symbol) => read_with_flow_type(
                cx,
                symbol.compiled_name,
                symbol.type_id,
                state.flow_type_of(&ExpressionDescriptor::name(atom)),
            ),
            None => super::unresolved_placeholder(cx.text(atom)),
        }
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let Some(atom) = Self::atom(cx, node) else {
            return false;
        };
        if lookup_name(cx, atom, state).is_some() {
            return true;
        }
        report(
            cx,
            acceptor,
            node,
            DiagnosticCode::UnresolvedName,
            format!("Cannot resolve name '{}'", cx.text(atom)),
        );
        false
    }

    fn advance(&self, _cx: &CheckerContext<'_>, _node: NodeIndex, state: &StaticState) -> StaticState {
        state.clone()
    }

    fn describe_expression(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> Option<ExpressionDescriptor> {
        let atom = Self::atom(cx, node)?;
        lookup_name(cx, atom, state).map(|_| ExpressionDescriptor::name(atom))
    }

    fn is_without_side_effects(
        &self,
        _cx: &CheckerContext<'_>,
        _node: NodeIndex,
        _state: &StaticState,
    ) -> bool {
        true
    }

    fn is_holed(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        self.is_unbound(cx, node, state)
    }

    fn is_typely_holed(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        self.is_unbound(cx, node, state)
    }

    fn is_unbound(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> bool {
        Self::atom(cx, node).is_some_and(|atom| lookup_name(cx, atom, state).is_none())
    }
}

/// `_`: a hole that binds nothing. Meaningless outside patterns.
pub(super) struct PlaceholderSemantics;

impl ExpressionSemantics for PlaceholderSemantics {
    fn infer_type(&self, _cx: &CheckerContext<'_>, _node: NodeIndex, _state: &StaticState) -> TypeId {
        TypeId::ANY
    }

    fn compile(
        &self,
        _cx: &CheckerContext<'_>,
        _node: NodeIndex,
        _state: &StaticState,
        _sink: &mut dyn EmissionSink,
    ) -> String {
        super::unresolved_placeholder("placeholder")
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        _state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        report(
            cx,
            acceptor,
            node,
            DiagnosticCode::PlaceholderOutsidePattern,
            "'_' can only be used inside a pattern".to_string(),
        );
        false
    }

    fn advance(&self, _cx: &CheckerContext<'_>, _node: NodeIndex, state: &StaticState) -> StaticState {
        state.clone()
    }

    fn is_without_side_effects(
        &self,
        _cx: &CheckerContext<'_>,
        _node: NodeIndex,
        _state: &StaticState,
    ) -> bool {
        true
    }

    fn is_holed(&self, _cx: &CheckerContext<'_>, _node: NodeIndex, _state: &StaticState) -> bool {
        true
    }

    fn is_typely_holed(&self, _cx: &CheckerContext<'_>, _node: NodeIndex, _state: &StaticState) -> bool {
        true
    }
}

// =============================================================================
// Property access
// =============================================================================

/// Where a property read is answered from.
enum PropertyTarget {
    /// Declared (or inherited) property of a nominal type.
    Declared(TypeId),
    /// Built-in property of an intrinsic or collection type, with its Java
    /// accessor call.
    Builtin(TypeId, &'static str),
}

/// Resolve `property` on a value of type `owner`.
fn resolve_property(cx: &CheckerContext<'_>, owner: TypeId, property: &str) -> Option<PropertyTarget> {
    let builtin = |ty, accessor| Some(PropertyTarget::Builtin(ty, accessor));
    match cx.types.lookup(owner)? {
        TypeData::Intrinsic(_) if owner == TypeId::TEXT => match property {
            "length" => builtin(TypeId::INTEGER, "length()"),
            _ => None,
        },
        TypeData::List(_) | TypeData::Set(_) => match property {
            "size" | "length" => builtin(TypeId::INTEGER, "size()"),
            _ => None,
        },
        TypeData::Map { key, value } => match property {
            "size" => builtin(TypeId::INTEGER, "size()"),
            "keys" => builtin(cx.types.set(key), "getKeys()"),
            "values" => builtin(cx.types.list(value), "getValues()"),
            _ => None,
        },
        TypeData::Tuple(_) => match property {
            "length" => builtin(TypeId::INTEGER, "getLength()"),
            _ => None,
        },
        TypeData::Message(content) => match property {
            "content" => builtin(content, "getContent()"),
            "performative" => builtin(TypeId::PERFORMATIVE, "getPerformative()"),
            "sender" => builtin(TypeId::AID, "getSender()"),
            _ => None,
        },
        TypeData::Nominal(def) | TypeData::Host(def) => cx
            .types
            .definitions()
            .property(def, property)
            .map(|p| PropertyTarget::Declared(p.type_id)),
        TypeData::Intrinsic(_) | TypeData::Function { .. } => None,
    }
}

/// `property of target`
pub(super) struct PropertySemantics;

impl PropertySemantics {
    fn parts(cx: &CheckerContext<'_>, node: NodeIndex) -> Option<(NodeIndex, Atom)> {
        match cx.arena.kind(node) {
            Some(ExprKind::PropertyAccess { target, property }) => Some((*target, *property)),
            _ => None,
        }
    }
}

impl ExpressionSemantics for PropertySemantics {
    fn infer_type(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> TypeId {
        let Some((target, property)) = Self::parts(cx, node) else {
            return TypeId::ERROR;
        };
        if let Some(narrowed) = self
            .describe_expression(cx, node, state)
            .and_then(|d| state.flow_type_of(&d))
        {
            return narrowed;
        }
        let owner = super::infer_type(cx, target, state);
        if owner.is_error() {
            return TypeId::ERROR;
        }
        match resolve_property(cx, owner, cx.text(property)) {
            Some(PropertyTarget::Declared(ty) | PropertyTarget::Builtin(ty, _)) => ty,
            None => TypeId::ERROR,
        }
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) -> String {
        let Some((target, property)) = Self::parts(cx, node) else {
            return super::unresolved_placeholder("property");
        };
        let owner = super::infer_type(cx, target, state);
        let receiver = super::compile(cx, target, state, sink);
        let name = cx.text(property);
        let (declared, read) = match resolve_property(cx, owner, name) {
            Some(PropertyTarget::Declared(ty)) => (ty, format!("{receiver}.{}()", getter_name(name))),
            Some(PropertyTarget::Builtin(ty, accessor)) => (ty, format!("{receiver}.{accessor}")),
            None => return super::unresolved_placeholder(name),
        };
        let flow = self
            .describe_expression(cx, node, state)
            .and_then(|d| state.flow_type_of(&d));
        read_with_flow_type(cx, read, declared, flow)
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let Some((target, property)) = Self::parts(cx, node) else {
            return false;
        };
        if !super::validate(cx, target, state, acceptor) {
            return false;
        }
        let owner = super::infer_type(cx, target, state);
        if owner.is_error() || resolve_property(cx, owner, cx.text(property)).is_some() {
            return true;
        }
        report(
            cx,
            acceptor,
            node,
            DiagnosticCode::UnresolvedProperty,
            format!(
                "Cannot resolve property '{}' of a value of type '{}'",
                cx.text(property),
                cx.format_type(owner)
            ),
        );
        false
    }

    fn describe_expression(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
    ) -> Option<ExpressionDescriptor> {
        let (target, property) = Self::parts(cx, node)?;
        super::describe_expression(cx, target, state).map(|d| d.property(property))
    }
}
