//! Statements and blocks.

use crate::node::NodeIndex;
use crate::type_expr::TypeExpr;
use jadec_common::{Atom, Span};

/// Index of a statement in a `NodeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StmtIndex(pub u32);

/// A sequence of statements forming one scope.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub statements: Vec<StmtIndex>,
    pub span: Span,
}

impl Block {
    pub fn new(statements: Vec<StmtIndex>) -> Self {
        Self {
            statements,
            span: Span::DUMMY,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// `x as T = e` / `x as T`
    Declaration {
        name: Atom,
        ty: Option<TypeExpr>,
        init: Option<NodeIndex>,
    },
    /// `target = value`
    ///
    /// With an unbound name as target this declares the name; with a tuple,
    /// list or functional-notation target it deconstructs the value.
    Assignment { target: NodeIndex, value: NodeIndex },
    /// `if c1 do … else if c2 do … else do …`
    If {
        branches: Vec<(NodeIndex, Block)>,
        otherwise: Option<Block>,
    },
    /// `when e matches p1 do … p2 do … otherwise do …`
    WhenMatches {
        scrutinee: NodeIndex,
        branches: Vec<(NodeIndex, Block)>,
        otherwise: Option<Block>,
    },
    While { condition: NodeIndex, body: Block },
    Return(Option<NodeIndex>),
    Throw(NodeIndex),
    /// `fail this with reason`
    Fail(NodeIndex),
    Expression(NodeIndex),
    Block(Block),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}
