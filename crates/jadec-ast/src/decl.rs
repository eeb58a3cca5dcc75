//! Declarations and compilation units.

use crate::node::{NodeArena, NodeIndex};
use crate::stmt::Block;
use crate::type_expr::TypeExpr;
use jadec_common::{Atom, Span};

/// Kind of a nominal type declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeDeclKind {
    Concept,
    Predicate,
    Action,
    Agent,
    Behaviour,
    Record,
}

impl TypeDeclKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            TypeDeclKind::Concept => "concept",
            TypeDeclKind::Predicate => "predicate",
            TypeDeclKind::Action => "action",
            TypeDeclKind::Agent => "agent",
            TypeDeclKind::Behaviour => "behaviour",
            TypeDeclKind::Record => "record",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyDecl {
    pub name: Atom,
    pub ty: TypeExpr,
    pub span: Span,
}

/// `concept Person extends Thing (name as text, age as integer)`
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDecl {
    pub name: Atom,
    pub kind: TypeDeclKind,
    pub supertypes: Vec<(Atom, Span)>,
    pub properties: Vec<PropertyDecl>,
    /// Fully qualified Java class; derived from the name when absent.
    pub host_name: Option<String>,
    pub span: Span,
}

/// `native Date is "java.util.Date" extends "java.lang.Object"`
#[derive(Clone, Debug, PartialEq)]
pub struct NativeTypeDecl {
    pub name: Atom,
    pub class_name: String,
    pub host_supertypes: Vec<String>,
    pub span: Span,
}

/// Module-level constant.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalDecl {
    pub name: Atom,
    pub ty: Option<TypeExpr>,
    pub value: NodeIndex,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Atom,
    pub ty: TypeExpr,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Function,
    Procedure,
}

/// `function f(x as integer) as integer do …` / `procedure p(…) do …`
#[derive(Clone, Debug, PartialEq)]
pub struct OperationDecl {
    pub name: Atom,
    pub kind: OperationKind,
    pub params: Vec<Param>,
    pub return_type: Option<TypeExpr>,
    /// Declared free of side effects; calls to it may appear in pure contexts.
    pub pure: bool,
    pub body: Block,
    pub span: Span,
}

/// `on inform <pattern> when <guard> do …`
#[derive(Clone, Debug, PartialEq)]
pub struct HandlerDecl {
    pub performative: Atom,
    pub content: Option<NodeIndex>,
    pub guard: Option<NodeIndex>,
    pub body: Block,
    pub span: Span,
}

/// One compilation unit: its syntax arena plus top-level declarations.
#[derive(Clone, Debug, Default)]
pub struct SourceUnit {
    pub name: String,
    pub arena: NodeArena,
    pub types: Vec<TypeDecl>,
    pub native_types: Vec<NativeTypeDecl>,
    pub globals: Vec<GlobalDecl>,
    pub operations: Vec<OperationDecl>,
    pub handlers: Vec<HandlerDecl>,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, arena: NodeArena) -> Self {
        Self {
            name: name.into(),
            arena,
            ..Self::default()
        }
    }
}
