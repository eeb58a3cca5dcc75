//! Unit-level declarations: nominal types, native types, operation
//! signatures and global constants.
//!
//! Types are registered in two steps so a declaration may mention types
//! declared after it: every name gets a `DefId` first, then supertypes are
//! linked (rejecting cycles), properties resolved and constructors added.

use crate::context::CheckerContext;
use crate::expr;
use crate::naming::{getter_name, setter_name};
use crate::state::StaticState;
use crate::symbols::{
    CallableKind, CallableParam, CallableSymbol, NamedSymbol, SymbolOrigin, SymbolSearch, SymbolTable,
};
use crate::type_node::resolve_type;
use jadec_ast::{OperationDecl, OperationKind, SourceUnit, TypeDeclKind};
use jadec_common::diagnostics::{Diagnostic, DiagnosticAcceptor};
use jadec_common::{DiagnosticCode, Span};
use jadec_emitter::{JavaClass, JavaMethod, block};
use jadec_solver::{DefId, DefKind, DefinitionInfo, IntrinsicKind, PropertyInfo, TypeDatabase, TypeId};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

const fn def_kind(kind: TypeDeclKind) -> DefKind {
    match kind {
        TypeDeclKind::Concept => DefKind::Concept,
        TypeDeclKind::Predicate => DefKind::Predicate,
        TypeDeclKind::Action => DefKind::Action,
        TypeDeclKind::Agent => DefKind::Agent,
        TypeDeclKind::Behaviour => DefKind::Behaviour,
        TypeDeclKind::Record => DefKind::Record,
    }
}

/// Resolved signature of one operation declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationSignature {
    pub params: Vec<TypeId>,
    /// `None` for procedures.
    pub return_type: Option<TypeId>,
    /// `false` when the declaration clashed with an earlier one; its body is
    /// still validated but not compiled.
    pub registered: bool,
}

/// What phase 1 and 2 learned about a unit.
#[derive(Clone, Debug, Default)]
pub struct Declarations {
    /// Parallel to `SourceUnit::types`; `None` for rejected duplicates.
    types: Vec<Option<DefId>>,
    /// Parallel to `SourceUnit::operations`.
    pub operations: Vec<OperationSignature>,
    /// Parallel to `SourceUnit::globals`.
    pub globals: Vec<TypeId>,
}

/// Record `name` as a declared type; `true` (after reporting) when it is
/// a keyword type or already declared.
fn claim_type_name(
    cx: &CheckerContext<'_>,
    declared: &mut Vec<(String, Span)>,
    name: &str,
    span: Span,
    acceptor: &mut dyn DiagnosticAcceptor,
) -> bool {
    if IntrinsicKind::from_keyword(name).is_some() {
        acceptor.accept(duplicate(cx, "type", name, span, None));
        return true;
    }
    if let Some((_, previous)) = declared.iter().find(|(n, _)| n == name) {
        acceptor.accept(duplicate(cx, "type", name, span, Some(*previous)));
        return true;
    }
    declared.push((name.to_string(), span));
    false
}

fn duplicate(cx: &CheckerContext<'_>, what: &str, name: &str, span: Span, previous: Option<Span>) -> Diagnostic {
    let diagnostic = Diagnostic::error(
        span,
        format!("Duplicate declaration of {what} '{name}'"),
        DiagnosticCode::DuplicateDeclaration,
    );
    match previous {
        Some(previous) => diagnostic.with_related(cx.file_name.clone(), previous, "Previously declared here".to_string()),
        None => diagnostic,
    }
}

impl Declarations {
    /// Register every declaration of `unit` in `cx.types` and `symbols`.
    pub fn register(
        cx: &CheckerContext<'_>,
        symbols: &SymbolTable,
        unit: &SourceUnit,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> Self {
        let mut declarations = Declarations::default();
        let natives = declarations.declare_types(cx, unit, acceptor);
        declarations.link_types(cx, unit, &natives, acceptor);
        declarations.add_constructors(cx, symbols, unit);
        declarations.operations = unit
            .operations
            .iter()
            .map(|op| operation_signature(cx, symbols, op, acceptor))
            .collect();
        declarations.globals = declare_globals(cx, symbols, unit, acceptor);
        debug!(
            types = declarations.types.iter().flatten().count(),
            natives = natives.len(),
            operations = declarations.operations.len(),
            globals = declarations.globals.len(),
            "registered declarations"
        );
        declarations
    }

    // =========================================================================
    // Types
    // =========================================================================

    /// Allocate ids. Returns the native declarations' ids.
    fn declare_types(
        &mut self,
        cx: &CheckerContext<'_>,
        unit: &SourceUnit,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> Vec<Option<DefId>> {
        let mut spans: Vec<(String, Span)> = Vec::new();
        for decl in &unit.types {
            let name = cx.text(decl.name);
            if claim_type_name(cx, &mut spans, name, decl.span, acceptor) {
                self.types.push(None);
                continue;
            }
            let host = decl.host_name.clone().unwrap_or_else(|| name.to_string());
            let (def, _) = cx.types.declare(DefinitionInfo::new(name, def_kind(decl.kind), host));
            self.types.push(Some(def));
        }

        let mut natives = Vec::with_capacity(unit.native_types.len());
        for decl in &unit.native_types {
            let name = cx.text(decl.name);
            if claim_type_name(cx, &mut spans, name, decl.span, acceptor) {
                natives.push(None);
                continue;
            }
            let info = DefinitionInfo::new(name, DefKind::Native, decl.class_name.clone())
                .with_host_supertypes(decl.host_supertypes.clone());
            let (def, _) = cx.types.declare(info);
            natives.push(Some(def));
        }
        trace!(declared = cx.types.definitions().len(), "declared type ids");
        natives
    }

    /// Link supertypes and resolve properties.
    fn link_types(
        &self,
        cx: &CheckerContext<'_>,
        unit: &SourceUnit,
        natives: &[Option<DefId>],
        acceptor: &mut dyn DiagnosticAcceptor,
    ) {
        let defs = cx.types.definitions();
        for (decl, def) in unit.types.iter().zip(&self.types) {
            let Some(def) = *def else {
                continue;
            };
            let mut supertypes = Vec::with_capacity(decl.supertypes.len());
            for (index, (name, span)) in decl.supertypes.iter().enumerate() {
                let text = cx.text(*name);
                match defs.find_by_name(text).filter(|sup| !natives.contains(&Some(*sup))) {
                    Some(sup) => supertypes.push(sup),
                    None => acceptor.accept_error(
                        format!("Cannot resolve supertype '{text}'"),
                        *span,
                        Some("supertypes"),
                        Some(index),
                        DiagnosticCode::UnresolvedType,
                    ),
                }
            }
            if let Err(error) = defs.set_supertypes(def, &supertypes) {
                acceptor.accept_error(
                    error.to_string(),
                    decl.span,
                    Some("supertypes"),
                    None,
                    DiagnosticCode::CyclicSupertypeDeclaration,
                );
            }
        }

        for (decl, def) in unit.types.iter().zip(&self.types) {
            let Some(def) = *def else {
                continue;
            };
            let mut seen = FxHashSet::default();
            let mut properties = Vec::with_capacity(decl.properties.len());
            for property in &decl.properties {
                let name = cx.text(property.name);
                if !seen.insert(name) {
                    acceptor.accept(duplicate(cx, "property", name, property.span, None));
                    continue;
                }
                properties.push(PropertyInfo::new(name, resolve_type(cx, &property.ty, acceptor)));
            }
            defs.set_properties(def, properties);
        }
    }

    /// One constructor per declared type, taking every property (inherited
    /// first) in order.
    fn add_constructors(&self, cx: &CheckerContext<'_>, symbols: &SymbolTable, unit: &SourceUnit) {
        let defs = cx.types.definitions();
        for (decl, def) in unit.types.iter().zip(&self.types) {
            let Some(def) = *def else {
                continue;
            };
            let Some(info) = defs.get(def) else {
                continue;
            };
            let properties = defs.all_properties(def);
            symbols.add_callable(CallableSymbol {
                name: info.name.clone(),
                params: properties
                    .iter()
                    .map(|p| CallableParam::new(p.name.clone(), p.type_id))
                    .collect(),
                return_type: Some(cx.types.nominal(def)),
                pure: true,
                kind: CallableKind::Constructor {
                    def,
                    host_class: info.host_name.clone(),
                    accessors: properties.iter().map(|p| getter_name(&p.name)).collect(),
                },
                span: Some(decl.span),
            });
        }
    }

    /// Nested Java classes for the declared types that have no existing
    /// host class.
    pub fn type_classes(&self, cx: &CheckerContext<'_>, unit: &SourceUnit) -> Vec<String> {
        unit.types
            .iter()
            .zip(&self.types)
            .filter(|(decl, _)| decl.host_name.is_none())
            .filter_map(|(_, def)| def.and_then(|def| type_class(cx, def)))
            .collect()
    }
}

fn type_class(cx: &CheckerContext<'_>, def: DefId) -> Option<String> {
    let defs = cx.types.definitions();
    let info = defs.get(def)?;
    let all = defs.all_properties(def);
    let parent = info.supertypes.first().and_then(|&p| defs.get(p).map(|d| (p, d)));
    let inherited = parent
        .as_ref()
        .map(|(p, _)| defs.all_properties(*p))
        .unwrap_or_default();
    let own: Vec<&PropertyInfo> = all
        .iter()
        .filter(|p| !inherited.iter().any(|i| i.name == p.name))
        .collect();

    let mut class = JavaClass::new("public static", info.host_name.clone());
    if let Some((_, parent)) = &parent {
        class = class.extends(parent.host_name.clone());
    }
    for property in &own {
        class.member(format!("private {} {};", cx.host_type(property.type_id), property.name));
    }

    let params = all
        .iter()
        .map(|p| format!("{} {}", cx.host_type(p.type_id), p.name))
        .collect::<Vec<_>>()
        .join(", ");
    let mut body = Vec::with_capacity(own.len() + 1);
    if !inherited.is_empty() {
        let names = inherited.iter().map(|p| p.name.as_str()).collect::<Vec<_>>().join(", ");
        body.push(format!("super({names});"));
    }
    body.extend(own.iter().map(|p| format!("this.{0} = {0};", p.name)));
    class.member(block(&format!("public {}({params})", info.host_name), &body));

    for property in &own {
        let host = cx.host_type(property.type_id);
        class.member(
            JavaMethod::new("public", host.clone(), getter_name(&property.name))
                .body(vec![format!("return {};", property.name)])
                .render(),
        );
        class.member(
            JavaMethod::new("public", "void", setter_name(&property.name))
                .param(host, property.name.clone())
                .body(vec![format!("this.{0} = {0};", property.name)])
                .render(),
        );
    }
    Some(class.render())
}

// =============================================================================
// Operations
// =============================================================================

fn operation_signature(
    cx: &CheckerContext<'_>,
    symbols: &SymbolTable,
    op: &OperationDecl,
    acceptor: &mut dyn DiagnosticAcceptor,
) -> OperationSignature {
    let name = cx.text(op.name);
    let mut seen = FxHashSet::default();
    let mut params = Vec::with_capacity(op.params.len());
    for param in &op.params {
        let text = cx.text(param.name);
        if !seen.insert(text) {
            acceptor.accept(duplicate(cx, "parameter", text, param.span, None));
        }
        params.push(resolve_type(cx, &param.ty, acceptor));
    }

    let return_type = match (op.kind, &op.return_type) {
        (OperationKind::Function, Some(ty)) => Some(resolve_type(cx, ty, acceptor)),
        (OperationKind::Function, None) => {
            acceptor.accept_error(
                format!("Function '{name}' must declare its result type"),
                op.span,
                Some("type"),
                None,
                DiagnosticCode::TypeMismatch,
            );
            Some(TypeId::ERROR)
        }
        (OperationKind::Procedure, Some(_)) => {
            acceptor.accept_error(
                format!("Procedure '{name}' cannot declare a result type"),
                op.span,
                Some("type"),
                None,
                DiagnosticCode::TypeMismatch,
            );
            None
        }
        (OperationKind::Procedure, None) => None,
    };

    let clash = symbols
        .callables_named(name)
        .into_iter()
        .find(|c| c.is_constructor() || c.params.len() == params.len());
    if let Some(previous) = clash {
        acceptor.accept(duplicate(cx, "operation", name, op.span, previous.span));
        return OperationSignature {
            params,
            return_type,
            registered: false,
        };
    }

    let mut callable = CallableSymbol::function(
        name,
        op.params
            .iter()
            .zip(&params)
            .map(|(p, &ty)| CallableParam::new(cx.text(p.name), ty))
            .collect(),
        return_type,
        name,
    )
    .with_span(op.span);
    if op.pure {
        callable = callable.pure();
    }
    symbols.add_callable(callable);
    OperationSignature {
        params,
        return_type,
        registered: true,
    }
}

// =============================================================================
// Globals
// =============================================================================

/// Validate each constant's value in declaration order and bind it as an
/// immutable global. A constant sees the constants declared before it.
fn declare_globals(
    cx: &CheckerContext<'_>,
    symbols: &SymbolTable,
    unit: &SourceUnit,
    acceptor: &mut dyn DiagnosticAcceptor,
) -> Vec<TypeId> {
    let state = StaticState::new();
    let mut types = Vec::with_capacity(unit.globals.len());
    for global in &unit.globals {
        let name = cx.text(global.name);
        let declared = global.ty.as_ref().map(|ty| resolve_type(cx, ty, acceptor));
        let valid = expr::validate_expecting(cx, global.value, &state, declared, acceptor);
        let inferred = expr::infer_type_expecting(cx, global.value, &state, declared);
        let type_id = match declared {
            Some(declared) => {
                if valid && !inferred.is_error() && !declared.is_error() && !cx.is_assignable(inferred, declared) {
                    acceptor.accept_error(
                        format!(
                            "Cannot initialize '{name}' of type '{}' with a value of type '{}'",
                            cx.format_type(declared),
                            cx.format_type(inferred)
                        ),
                        cx.span(global.value),
                        Some("value"),
                        None,
                        DiagnosticCode::TypeMismatch,
                    );
                }
                declared
            }
            None => inferred,
        };
        types.push(type_id);

        if let Some(previous) = symbols.search_name(name).into_iter().next() {
            acceptor.accept(duplicate(cx, "constant", name, global.span, previous.span));
            continue;
        }
        symbols.add_name(
            NamedSymbol::local(name, type_id)
                .with_origin(SymbolOrigin::Global)
                .with_span(global.span)
                .immutable(),
        );
    }
    types
}
