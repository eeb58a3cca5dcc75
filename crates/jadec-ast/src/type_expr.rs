//! Written type expressions (`integer`, `list of text`, `(integer, real)`).

use jadec_common::{Atom, Span};

/// A type as written in source.
///
/// Type expressions are small trees owned by the declaration or expression
/// that mentions them; they are resolved to `TypeId`s by the checker.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeExpr {
    /// A keyword type (`integer`, `any`, …) or a declared type name.
    Named { name: Atom, span: Span },
    /// `list of T`
    List { element: Box<TypeExpr>, span: Span },
    /// `set of T`
    Set { element: Box<TypeExpr>, span: Span },
    /// `map of K:V`
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
        span: Span,
    },
    /// `(T1, T2, …)`
    Tuple { elements: Vec<TypeExpr>, span: Span },
    /// `message of T`
    Message { content: Box<TypeExpr>, span: Span },
    /// `function (P1, P2) -> R`
    Function {
        params: Vec<TypeExpr>,
        result: Box<TypeExpr>,
        span: Span,
    },
}

impl TypeExpr {
    pub fn named(name: Atom) -> Self {
        TypeExpr::Named {
            name,
            span: Span::DUMMY,
        }
    }

    pub fn list(element: TypeExpr) -> Self {
        TypeExpr::List {
            element: Box::new(element),
            span: Span::DUMMY,
        }
    }

    pub fn set(element: TypeExpr) -> Self {
        TypeExpr::Set {
            element: Box::new(element),
            span: Span::DUMMY,
        }
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
            span: Span::DUMMY,
        }
    }

    pub fn tuple(elements: Vec<TypeExpr>) -> Self {
        TypeExpr::Tuple {
            elements,
            span: Span::DUMMY,
        }
    }

    pub fn message(content: TypeExpr) -> Self {
        TypeExpr::Message {
            content: Box::new(content),
            span: Span::DUMMY,
        }
    }

    pub fn function(params: Vec<TypeExpr>, result: TypeExpr) -> Self {
        TypeExpr::Function {
            params,
            result: Box::new(result),
            span: Span::DUMMY,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named { span, .. }
            | TypeExpr::List { span, .. }
            | TypeExpr::Set { span, .. }
            | TypeExpr::Map { span, .. }
            | TypeExpr::Tuple { span, .. }
            | TypeExpr::Message { span, .. }
            | TypeExpr::Function { span, .. } => *span,
        }
    }
}
