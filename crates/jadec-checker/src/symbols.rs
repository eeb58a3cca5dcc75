//! Named and callable symbols, and the symbol search collaborator.
//!
//! Names bound by the code being checked live in the `StaticState`; names
//! and callables visible from outside (unit-level constants, operations,
//! constructors of declared types) are found through `SymbolSearch`. Local
//! names shadow global ones.

use jadec_common::Span;
use jadec_solver::{DefId, TypeId};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use tracing::trace;

/// Where a named symbol comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolOrigin {
    Local,
    Parameter,
    PatternBinding,
    Global,
    /// A local copied into a lambda.
    Capture,
}

/// A value bound to a name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedSymbol {
    pub name: String,
    pub type_id: TypeId,
    pub mutable: bool,
    /// Java expression that reads the value.
    pub compiled_name: String,
    pub origin: SymbolOrigin,
    pub span: Option<Span>,
}

impl NamedSymbol {
    pub fn local(name: impl Into<String>, type_id: TypeId) -> Self {
        let name = name.into();
        Self {
            compiled_name: name.clone(),
            name,
            type_id,
            mutable: true,
            origin: SymbolOrigin::Local,
            span: None,
        }
    }

    pub fn with_origin(mut self, origin: SymbolOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_compiled_name(mut self, compiled_name: impl Into<String>) -> Self {
        self.compiled_name = compiled_name.into();
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn immutable(mut self) -> Self {
        self.mutable = false;
        self
    }

    /// Locals and parameters are copied into lambdas that mention them.
    pub const fn is_capturable(&self) -> bool {
        matches!(
            self.origin,
            SymbolOrigin::Local | SymbolOrigin::Parameter | SymbolOrigin::Capture
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallableParam {
    pub name: String,
    pub type_id: TypeId,
}

impl CallableParam {
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            type_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallableKind {
    /// A Java static method or operation of the unit, called by name.
    Function { host_name: String },
    /// Constructor of a declared type; doubles as a deconstructor in
    /// functional-notation patterns.
    Constructor {
        def: DefId,
        host_class: String,
        /// Java getter per parameter, in parameter order.
        accessors: Vec<String>,
    },
}

/// Something that can be invoked with arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallableSymbol {
    pub name: String,
    pub params: Vec<CallableParam>,
    /// `None` for procedures.
    pub return_type: Option<TypeId>,
    pub pure: bool,
    pub kind: CallableKind,
    pub span: Option<Span>,
}

impl CallableSymbol {
    pub fn function(
        name: impl Into<String>,
        params: Vec<CallableParam>,
        return_type: Option<TypeId>,
        host_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            pure: false,
            kind: CallableKind::Function {
                host_name: host_name.into(),
            },
            span: None,
        }
    }

    pub fn pure(mut self) -> Self {
        self.pure = true;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn is_constructor(&self) -> bool {
        matches!(self.kind, CallableKind::Constructor { .. })
    }

    /// Position of the parameter called `name`.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// Type an invocation evaluates to.
    pub fn result_type(&self) -> TypeId {
        self.return_type.unwrap_or(TypeId::NOTHING)
    }
}

/// Lookup of names and callables visible from the code being checked.
pub trait SymbolSearch {
    /// Callables called `name` whose return type and parameter list satisfy
    /// the given predicates.
    fn search_callable(
        &self,
        name: &str,
        returns: &dyn Fn(Option<TypeId>) -> bool,
        params: &dyn Fn(&[CallableParam]) -> bool,
    ) -> Vec<CallableSymbol>;

    fn search_name(&self, name: &str) -> Vec<NamedSymbol>;
}

/// In-memory `SymbolSearch` populated from a unit's declarations.
///
/// Append-only: declarations are added while the unit is walked top-down,
/// so the table is shared by reference with the checker context.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    names: RefCell<FxHashMap<String, Vec<NamedSymbol>>>,
    callables: RefCell<FxHashMap<String, Vec<CallableSymbol>>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_name(&self, symbol: NamedSymbol) {
        trace!(name = %symbol.name, "add global name");
        self.names
            .borrow_mut()
            .entry(symbol.name.clone())
            .or_default()
            .push(symbol);
    }

    pub fn add_callable(&self, callable: CallableSymbol) {
        trace!(name = %callable.name, arity = callable.params.len(), "add callable");
        self.callables
            .borrow_mut()
            .entry(callable.name.clone())
            .or_default()
            .push(callable);
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names.borrow().contains_key(name)
    }

    pub fn has_callable(&self, name: &str) -> bool {
        self.callables.borrow().contains_key(name)
    }

    /// All callables called `name`, regardless of signature.
    pub fn callables_named(&self, name: &str) -> Vec<CallableSymbol> {
        self.callables.borrow().get(name).cloned().unwrap_or_default()
    }
}

impl SymbolSearch for SymbolTable {
    fn search_callable(
        &self,
        name: &str,
        returns: &dyn Fn(Option<TypeId>) -> bool,
        params: &dyn Fn(&[CallableParam]) -> bool,
    ) -> Vec<CallableSymbol> {
        self.callables
            .borrow()
            .get(name)
            .map(|candidates| {
                candidates
                    .iter()
                    .filter(|c| returns(c.return_type) && params(&c.params))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn search_name(&self, name: &str) -> Vec<NamedSymbol> {
        self.names.borrow().get(name).cloned().unwrap_or_default()
    }
}
