//! Abstract syntax for the jadec semantic core.
//!
//! The parser is an external collaborator; this crate fixes the shape it must
//! produce:
//! - `node` - expression arena (`NodeArena`, `NodeIndex`, `ExprKind`)
//! - `stmt` - statements and blocks
//! - `type_expr` - written type expressions
//! - `decl` - declarations and the `SourceUnit` they belong to

pub mod decl;
pub mod node;
pub mod stmt;
pub mod type_expr;

pub use decl::{
    GlobalDecl, HandlerDecl, NativeTypeDecl, OperationDecl, OperationKind, Param, PropertyDecl,
    SourceUnit, TypeDecl, TypeDeclKind,
};
pub use node::{
    Argument, ArithmeticOp, ComparisonOp, ExprKind, LambdaParam, Node, NodeArena, NodeIndex,
};
pub use stmt::{Block, Stmt, StmtIndex, StmtKind};
pub use type_expr::TypeExpr;
