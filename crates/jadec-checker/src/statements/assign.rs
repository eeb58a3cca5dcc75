//! Declarations, assignments and deconstructing assignments.
//!
//! `x = e` with an unbound `x` declares it. A tuple, list, map, set or
//! functional-notation target is a pattern matched in assignment mode:
//! every name in it is assigned (or declared when unbound), and a failed
//! match throws.

use super::{EXCEPTION_CLASS, StatementChecker, default_value};
use crate::expr::{self, ExpressionDispatcher};
use crate::naming::setter_name;
use crate::patterns::{self, PatternMatchInput, PatternMode};
use crate::state::{ExpressionDescriptor, StaticState};
use crate::symbols::{NamedSymbol, SymbolOrigin};
use crate::type_node::{resolve_type, resolve_type_silently};
use jadec_ast::{ExprKind, NodeIndex, StmtIndex, TypeExpr};
use jadec_common::diagnostics::{Diagnostic, DiagnosticAcceptor};
use jadec_common::{Atom, DiagnosticCode};
use jadec_emitter::EmissionSink;
use jadec_solver::{TypeData, TypeDatabase, TypeId};

/// What the left side of an assignment denotes.
enum Target {
    /// A name; `None` when nothing binds it yet.
    Name(Atom, Option<NamedSymbol>),
    Property {
        node: NodeIndex,
        owner: NodeIndex,
        property: Atom,
    },
    Pattern(NodeIndex),
    Invalid(NodeIndex),
}

impl StatementChecker<'_, '_> {
    fn classify(&self, target: NodeIndex, state: &StaticState) -> Target {
        let cx = self.cx;
        let node = ExpressionDispatcher::traverse(cx, target);
        match cx.arena.kind(node) {
            Some(ExprKind::Name(atom)) => {
                let symbol = state
                    .search_name(*atom)
                    .cloned()
                    .or_else(|| cx.symbols.search_name(cx.text(*atom)).into_iter().next());
                Target::Name(*atom, symbol)
            }
            Some(ExprKind::PropertyAccess { target: owner, property }) => Target::Property {
                node,
                owner: *owner,
                property: *property,
            },
            Some(
                ExprKind::TupleLiteral(_)
                | ExprKind::ListLiteral { .. }
                | ExprKind::MapLiteral { .. }
                | ExprKind::SetLiteral { .. }
                | ExprKind::Call { .. }
                | ExprKind::Cast { .. },
            ) => Target::Pattern(node),
            _ => Target::Invalid(node),
        }
    }

    /// Type of a declared property `property` of `owner`, if it can be set.
    fn settable_property(&self, owner: TypeId, property: Atom) -> Option<TypeId> {
        let cx = self.cx;
        match cx.types.lookup(owner)? {
            TypeData::Nominal(def) | TypeData::Host(def) => cx
                .types
                .definitions()
                .property(def, cx.text(property))
                .map(|p| p.type_id),
            _ => None,
        }
    }

    fn deconstruction_input(&self, pattern: NodeIndex, value: NodeIndex, state: &StaticState) -> PatternMatchInput {
        let cx = self.cx;
        let provided = expr::infer_type(cx, value, state);
        let mode = PatternMode::assignment_root().with_options(&cx.options);
        PatternMatchInput::root(cx, pattern, mode, provided)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn declared_type(&self, ty: Option<&TypeExpr>, init: Option<NodeIndex>, state: &StaticState) -> TypeId {
        match (ty, init) {
            (Some(ty), _) => resolve_type_silently(self.cx, ty),
            (None, Some(init)) => expr::infer_type(self.cx, init, state),
            (None, None) => TypeId::ERROR,
        }
    }

    pub(super) fn validate_declaration(
        &self,
        stmt: StmtIndex,
        name: Atom,
        ty: Option<&TypeExpr>,
        init: Option<NodeIndex>,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let cx = self.cx;
        let span = cx.arena.stmt_span(stmt);
        let text = cx.text(name);
        let mut ok = true;

        if let Some(existing) = state.search_name(name)
            && matches!(existing.origin, SymbolOrigin::Local | SymbolOrigin::Parameter)
        {
            let mut diagnostic = Diagnostic::error(
                span,
                format!("'{text}' is already declared"),
                DiagnosticCode::DuplicateDeclaration,
            )
            .with_feature("name", None);
            if let Some(previous) = existing.span {
                diagnostic = diagnostic.with_related(
                    cx.file_name.clone(),
                    previous,
                    format!("'{text}' is declared here"),
                );
            }
            acceptor.accept(diagnostic);
            ok = false;
        }

        let declared = ty.map(|ty| resolve_type(cx, ty, acceptor));
        ok &= !declared.is_some_and(TypeId::is_error);

        let Some(init) = init else {
            if declared.is_none() {
                acceptor.accept_error(
                    format!("Cannot infer the type of '{text}' without an initial value"),
                    span,
                    Some("type"),
                    None,
                    DiagnosticCode::TypeMismatch,
                );
                ok = false;
            }
            return ok;
        };
        if !expr::validate_expecting(cx, init, state, declared, acceptor) {
            return false;
        }
        let actual = expr::infer_type_expecting(cx, init, state, declared);
        match declared {
            Some(declared) if !declared.is_error() && !actual.is_error() && !cx.is_assignable(actual, declared) => {
                acceptor.accept_error(
                    format!(
                        "Cannot initialize '{text}' of type '{}' with a value of type '{}'",
                        cx.format_type(declared),
                        cx.format_type(actual)
                    ),
                    cx.span(init),
                    Some("init"),
                    None,
                    DiagnosticCode::TypeMismatch,
                );
                ok = false;
            }
            None if actual == TypeId::NOTHING => {
                acceptor.accept_error(
                    format!("Cannot declare '{text}' with a value of type 'nothing'"),
                    cx.span(init),
                    Some("init"),
                    None,
                    DiagnosticCode::TypeMismatch,
                );
                ok = false;
            }
            _ => {}
        }
        ok
    }

    pub(super) fn compile_declaration(
        &self,
        name: Atom,
        ty: Option<&TypeExpr>,
        init: Option<NodeIndex>,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) {
        let cx = self.cx;
        let declared = self.declared_type(ty, init, state);
        let value = match init {
            Some(init) => expr::compile_expecting(cx, init, state, Some(declared), sink),
            None => default_value(declared).to_string(),
        };
        sink.emit_statement(format!("{} {} = {value};", cx.host_type(declared), cx.text(name)));
    }

    pub(super) fn advance_declaration(
        &self,
        name: Atom,
        ty: Option<&TypeExpr>,
        init: Option<NodeIndex>,
        state: &StaticState,
    ) -> StaticState {
        let cx = self.cx;
        let declared = self.declared_type(ty, init, state);
        let after = init.map_or_else(|| state.clone(), |init| expr::advance(cx, init, state));
        let next = after.assert_named_symbol(name, NamedSymbol::local(cx.text(name), declared));
        match (ty, init) {
            (Some(_), Some(init)) => {
                let actual = expr::infer_type_expecting(cx, init, state, Some(declared));
                self.narrow_after_write(next, name, actual, declared)
            }
            _ => next,
        }
    }

    /// Record the written value's type when it is narrower than the
    /// declared one.
    fn narrow_after_write(&self, state: StaticState, name: Atom, actual: TypeId, declared: TypeId) -> StaticState {
        if !actual.is_error() && !declared.is_error() && self.cx.compare(actual, declared).is_strict_subtype() {
            state.assert_flow_type(ExpressionDescriptor::name(name), actual)
        } else {
            state
        }
    }

    // =========================================================================
    // Assignments
    // =========================================================================

    pub(super) fn validate_assignment(
        &self,
        stmt: StmtIndex,
        target: NodeIndex,
        value: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let cx = self.cx;
        match self.classify(target, state) {
            Target::Name(name, None) => self.validate_declaration(stmt, name, None, Some(value), state, acceptor),
            Target::Name(name, Some(symbol)) => {
                let mut ok = expr::validate_expecting(cx, value, state, Some(symbol.type_id), acceptor);
                if !symbol.mutable {
                    acceptor.accept_error(
                        format!("Cannot assign to '{}': it is not a variable", cx.text(name)),
                        cx.span(target),
                        None,
                        None,
                        DiagnosticCode::NotAssignable,
                    );
                    ok = false;
                }
                ok && self.check_written_type(value, symbol.type_id, state, acceptor)
            }
            Target::Property { node, owner, property } => {
                if !expr::validate(cx, owner, state, acceptor) {
                    return false;
                }
                let owner_type = expr::infer_type(cx, owner, state);
                if owner_type.is_error() {
                    return false;
                }
                let Some(property_type) = self.settable_property(owner_type, property) else {
                    acceptor.accept_error(
                        format!(
                            "Property '{}' of '{}' cannot be assigned",
                            cx.text(property),
                            cx.format_type(owner_type)
                        ),
                        cx.span(node),
                        None,
                        None,
                        DiagnosticCode::NotAssignable,
                    );
                    return false;
                };
                let after = expr::advance(cx, owner, state);
                expr::validate_expecting(cx, value, &after, Some(property_type), acceptor)
                    && self.check_written_type(value, property_type, &after, acceptor)
            }
            Target::Pattern(pattern) => {
                let value_ok = expr::validate(cx, value, state, acceptor);
                let input = self.deconstruction_input(pattern, value, state);
                let after = expr::advance(cx, value, state);
                let output = patterns::validate_pattern(cx, &input, &after, acceptor);
                let mut ok = value_ok && output.result;
                for (name, _) in output.unification.declared() {
                    if let Some(existing) = after.search_name(name)
                        && !existing.mutable
                    {
                        acceptor.accept_error(
                            format!("Cannot assign to '{}': it is not a variable", cx.text(name)),
                            cx.span(pattern),
                            None,
                            None,
                            DiagnosticCode::NotAssignable,
                        );
                        ok = false;
                    }
                }
                ok
            }
            Target::Invalid(node) => {
                acceptor.accept_error(
                    "This expression cannot be assigned".to_string(),
                    cx.span(node),
                    None,
                    None,
                    DiagnosticCode::NotAssignable,
                );
                false
            }
        }
    }

    fn check_written_type(
        &self,
        value: NodeIndex,
        target_type: TypeId,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let cx = self.cx;
        let actual = expr::infer_type_expecting(cx, value, state, Some(target_type));
        if actual.is_error() || target_type.is_error() || cx.is_assignable(actual, target_type) {
            return true;
        }
        acceptor.accept_error(
            format!(
                "Cannot assign a value of type '{}' to a target of type '{}'",
                cx.format_type(actual),
                cx.format_type(target_type)
            ),
            cx.span(value),
            None,
            None,
            DiagnosticCode::TypeMismatch,
        );
        false
    }

    pub(super) fn compile_assignment(
        &self,
        target: NodeIndex,
        value: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) {
        let cx = self.cx;
        match self.classify(target, state) {
            Target::Name(name, None) => self.compile_declaration(name, None, Some(value), state, sink),
            Target::Name(_, Some(symbol)) => {
                let text = expr::compile_expecting(cx, value, state, Some(symbol.type_id), sink);
                sink.emit_statement(format!("{} = {text};", symbol.compiled_name));
            }
            Target::Property { owner, property, .. } => {
                let receiver = expr::compile(cx, owner, state, sink);
                let owner_type = expr::infer_type(cx, owner, state);
                let expected = self.settable_property(owner_type, property);
                let after = expr::advance(cx, owner, state);
                let text = expr::compile_expecting(cx, value, &after, expected, sink);
                sink.emit_statement(format!("{receiver}.{}({text});", setter_name(cx.text(property))));
            }
            Target::Pattern(pattern) => {
                let text = expr::compile(cx, value, state, sink);
                let input = self.deconstruction_input(pattern, value, state);
                let after = expr::advance(cx, value, state);
                let compiled = patterns::compile_pattern(cx, &input, &after, sink);
                sink.emit_statement(jadec_emitter::block(
                    &format!("if (!{})", compiled.result.call(&text)),
                    &[format!("throw new {EXCEPTION_CLASS}(\"Deconstruction failed\");")],
                ));
                for (name, type_id) in compiled.unification.declared() {
                    let text = cx.text(name);
                    let binding = input.binding(text);
                    match after.search_name(name) {
                        Some(existing) => sink.emit_statement(format!("{} = {binding};", existing.compiled_name)),
                        None => sink.emit_statement(format!("{} {text} = {binding};", cx.host_type(type_id))),
                    }
                }
            }
            Target::Invalid(_) => {}
        }
    }

    pub(super) fn advance_assignment(&self, target: NodeIndex, value: NodeIndex, state: &StaticState) -> StaticState {
        let cx = self.cx;
        match self.classify(target, state) {
            Target::Name(name, None) => self.advance_declaration(name, None, Some(value), state),
            Target::Name(name, Some(symbol)) => {
                let after = expr::advance(cx, value, state);
                if !state.is_bound(name) {
                    return after;
                }
                let next = after.assert_assignment(&ExpressionDescriptor::name(name));
                let actual = expr::infer_type_expecting(cx, value, state, Some(symbol.type_id));
                self.narrow_after_write(next, name, actual, symbol.type_id)
            }
            Target::Property { node, owner, .. } => {
                let after = expr::advance(cx, value, &expr::advance(cx, owner, state));
                match expr::describe_expression(cx, node, state) {
                    Some(descriptor) => after.assert_assignment(&descriptor),
                    None => after,
                }
            }
            Target::Pattern(pattern) => {
                let input = self.deconstruction_input(pattern, value, state);
                let after = expr::advance(cx, value, state);
                let output = patterns::probe_pattern(cx, &input, &after);
                output
                    .unification
                    .declared()
                    .into_iter()
                    .fold(after, |next, (name, type_id)| {
                        if next.is_bound(name) {
                            next.assert_assignment(&ExpressionDescriptor::name(name))
                        } else {
                            next.assert_named_symbol(name, NamedSymbol::local(cx.text(name), type_id))
                        }
                    })
            }
            Target::Invalid(_) => expr::advance(cx, value, state),
        }
    }
}
