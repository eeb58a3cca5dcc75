//! Expression nodes and the arena that owns them.
//!
//! Patterns share the expression grammar: `(x, 2)` is a tuple literal when
//! evaluated and a tuple pattern when matched. Whether a name is a binding or
//! a reference is decided by the checker from the static state.

use crate::stmt::{Block, Stmt, StmtIndex, StmtKind};
use crate::type_expr::TypeExpr;
use jadec_common::{Atom, Interner, Span};
use smallvec::SmallVec;

/// Index of an expression node in a `NodeArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Sentinel for a missing node.
    pub const NONE: NodeIndex = NodeIndex(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        !self.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl ComparisonOp {
    pub const fn is_equality(self) -> bool {
        matches!(self, ComparisonOp::Equal | ComparisonOp::NotEqual)
    }

    pub const fn source_text(self) -> &'static str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::Less => "<",
            ComparisonOp::LessOrEqual => "<=",
            ComparisonOp::Greater => ">",
            ComparisonOp::GreaterOrEqual => ">=",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl ArithmeticOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Subtract => "-",
            ArithmeticOp::Multiply => "*",
            ArithmeticOp::Divide => "/",
            ArithmeticOp::Modulo => "%",
        }
    }
}

/// A call or functional-notation argument, positional or named.
#[derive(Clone, Debug, PartialEq)]
pub struct Argument {
    pub name: Option<Atom>,
    pub value: NodeIndex,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LambdaParam {
    pub name: Atom,
    pub ty: TypeExpr,
    pub span: Span,
}

/// Expression kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    IntegerLiteral(i64),
    RealLiteral(f64),
    BooleanLiteral(bool),
    TextLiteral(String),
    Name(Atom),
    /// `_` - only meaningful inside patterns.
    Placeholder,
    /// `( e )` - a thin wrapper without semantics of its own.
    Parenthesized(NodeIndex),
    /// `property of target`
    PropertyAccess {
        target: NodeIndex,
        property: Atom,
    },
    /// `a and b and …` (flattened, evaluated left to right)
    And(Vec<NodeIndex>),
    /// `a or b or …`
    Or(Vec<NodeIndex>),
    Not(NodeIndex),
    Comparison {
        op: ComparisonOp,
        left: NodeIndex,
        right: NodeIndex,
    },
    Arithmetic {
        op: ArithmeticOp,
        left: NodeIndex,
        right: NodeIndex,
    },
    Negate(NodeIndex),
    /// `operand is T`
    TypeTest {
        operand: NodeIndex,
        ty: TypeExpr,
    },
    /// `operand as T`
    Cast {
        operand: NodeIndex,
        ty: TypeExpr,
    },
    /// `name(args…)` - a call, or a functional-notation pattern.
    Call {
        callee: Atom,
        args: Vec<Argument>,
    },
    TupleLiteral(Vec<NodeIndex>),
    /// `[a, b | rest] of T`
    ListLiteral {
        elements: Vec<NodeIndex>,
        rest: Option<NodeIndex>,
        element_type: Option<TypeExpr>,
    },
    /// `{k: v, … | rest} of K:V` - `{:}` is the empty map.
    MapLiteral {
        entries: Vec<(NodeIndex, NodeIndex)>,
        rest: Option<NodeIndex>,
        key_type: Option<TypeExpr>,
        value_type: Option<TypeExpr>,
    },
    /// `{a, b | rest} of T`
    SetLiteral {
        elements: Vec<NodeIndex>,
        rest: Option<NodeIndex>,
        element_type: Option<TypeExpr>,
    },
    /// `scrutinee matches pattern`
    Matches {
        scrutinee: NodeIndex,
        pattern: NodeIndex,
    },
    /// `lambda (x as T, …) => body`
    Lambda {
        params: Vec<LambdaParam>,
        body: NodeIndex,
    },
}

impl ExprKind {
    /// Direct sub-expressions in left-to-right evaluation order.
    pub fn children(&self) -> SmallVec<[NodeIndex; 4]> {
        let mut out = SmallVec::new();
        match self {
            ExprKind::IntegerLiteral(_)
            | ExprKind::RealLiteral(_)
            | ExprKind::BooleanLiteral(_)
            | ExprKind::TextLiteral(_)
            | ExprKind::Name(_)
            | ExprKind::Placeholder => {}
            ExprKind::Parenthesized(inner) | ExprKind::Not(inner) | ExprKind::Negate(inner) => {
                out.push(*inner)
            }
            ExprKind::PropertyAccess { target, .. } => out.push(*target),
            ExprKind::And(operands) | ExprKind::Or(operands) | ExprKind::TupleLiteral(operands) => {
                out.extend(operands.iter().copied())
            }
            ExprKind::Comparison { left, right, .. } | ExprKind::Arithmetic { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            ExprKind::TypeTest { operand, .. } | ExprKind::Cast { operand, .. } => {
                out.push(*operand)
            }
            ExprKind::Call { args, .. } => out.extend(args.iter().map(|a| a.value)),
            ExprKind::ListLiteral { elements, rest, .. }
            | ExprKind::SetLiteral { elements, rest, .. } => {
                out.extend(elements.iter().copied());
                out.extend(rest.iter().copied());
            }
            ExprKind::MapLiteral { entries, rest, .. } => {
                for (k, v) in entries {
                    out.push(*k);
                    out.push(*v);
                }
                out.extend(rest.iter().copied());
            }
            ExprKind::Matches { scrutinee, pattern } => {
                out.push(*scrutinee);
                out.push(*pattern);
            }
            ExprKind::Lambda { body, .. } => out.push(*body),
        }
        out
    }

    /// Short name of the kind, used in traces and diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            ExprKind::IntegerLiteral(_) => "integer literal",
            ExprKind::RealLiteral(_) => "real literal",
            ExprKind::BooleanLiteral(_) => "boolean literal",
            ExprKind::TextLiteral(_) => "text literal",
            ExprKind::Name(_) => "name",
            ExprKind::Placeholder => "placeholder",
            ExprKind::Parenthesized(_) => "parenthesized expression",
            ExprKind::PropertyAccess { .. } => "property access",
            ExprKind::And(_) => "and",
            ExprKind::Or(_) => "or",
            ExprKind::Not(_) => "not",
            ExprKind::Comparison { .. } => "comparison",
            ExprKind::Arithmetic { .. } => "arithmetic expression",
            ExprKind::Negate(_) => "negation",
            ExprKind::TypeTest { .. } => "type test",
            ExprKind::Cast { .. } => "cast",
            ExprKind::Call { .. } => "call",
            ExprKind::TupleLiteral(_) => "tuple",
            ExprKind::ListLiteral { .. } => "list",
            ExprKind::MapLiteral { .. } => "map",
            ExprKind::SetLiteral { .. } => "set",
            ExprKind::Matches { .. } => "matches",
            ExprKind::Lambda { .. } => "lambda",
        }
    }
}

/// An expression node with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: ExprKind,
    pub span: Span,
}

/// Owner of all syntax of one compilation unit.
///
/// Expressions and statements live in flat vectors and refer to each other
/// through `NodeIndex` / `StmtIndex`. The arena also owns the unit's atom
/// interner.
#[derive(Clone, Debug, Default)]
pub struct NodeArena {
    nodes: Vec<Node>,
    stmts: Vec<Stmt>,
    interner: Interner,
}

impl NodeArena {
    pub fn new() -> Self {
        let mut interner = Interner::new();
        interner.intern_common();
        Self {
            nodes: Vec::new(),
            stmts: Vec::new(),
            interner,
        }
    }

    // =========================================================================
    // Access
    // =========================================================================

    #[inline]
    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx.0 as usize)
    }

    #[inline]
    pub fn kind(&self, idx: NodeIndex) -> Option<&ExprKind> {
        self.get(idx).map(|n| &n.kind)
    }

    #[inline]
    pub fn span(&self, idx: NodeIndex) -> Span {
        self.get(idx).map_or(Span::DUMMY, |n| n.span)
    }

    #[inline]
    pub fn stmt(&self, idx: StmtIndex) -> Option<&Stmt> {
        self.stmts.get(idx.0 as usize)
    }

    #[inline]
    pub fn stmt_span(&self, idx: StmtIndex) -> Span {
        self.stmt(idx).map_or(Span::DUMMY, |s| s.span)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Resolve an atom to its text.
    #[inline]
    pub fn text(&self, atom: Atom) -> &str {
        self.interner.resolve(atom)
    }

    pub fn intern(&mut self, s: &str) -> Atom {
        self.interner.intern(s)
    }

    /// The atom of `s` if it occurs anywhere in the unit.
    pub fn lookup_atom(&self, s: &str) -> Option<Atom> {
        self.interner.lookup(s)
    }

    // =========================================================================
    // Construction
    // =========================================================================

    pub fn add_expr(&mut self, kind: ExprKind, span: Span) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node { kind, span });
        idx
    }

    pub fn add_stmt(&mut self, kind: StmtKind, span: Span) -> StmtIndex {
        let idx = StmtIndex(self.stmts.len() as u32);
        self.stmts.push(Stmt { kind, span });
        idx
    }

    /// Builder helpers below create nodes with a synthetic span equal to the
    /// node position, so diagnostics still point at distinct places.
    fn synthetic(&mut self, kind: ExprKind) -> NodeIndex {
        let at = self.nodes.len() as u32;
        self.add_expr(kind, Span::new(at, at + 1))
    }

    pub fn int(&mut self, value: i64) -> NodeIndex {
        self.synthetic(ExprKind::IntegerLiteral(value))
    }

    pub fn real(&mut self, value: f64) -> NodeIndex {
        self.synthetic(ExprKind::RealLiteral(value))
    }

    pub fn boolean(&mut self, value: bool) -> NodeIndex {
        self.synthetic(ExprKind::BooleanLiteral(value))
    }

    pub fn text_lit(&mut self, value: &str) -> NodeIndex {
        self.synthetic(ExprKind::TextLiteral(value.to_string()))
    }

    pub fn name(&mut self, name: &str) -> NodeIndex {
        let atom = self.intern(name);
        self.synthetic(ExprKind::Name(atom))
    }

    pub fn placeholder(&mut self) -> NodeIndex {
        self.synthetic(ExprKind::Placeholder)
    }

    pub fn paren(&mut self, inner: NodeIndex) -> NodeIndex {
        self.synthetic(ExprKind::Parenthesized(inner))
    }

    pub fn property(&mut self, target: NodeIndex, property: &str) -> NodeIndex {
        let property = self.intern(property);
        self.synthetic(ExprKind::PropertyAccess { target, property })
    }

    pub fn and(&mut self, operands: Vec<NodeIndex>) -> NodeIndex {
        self.synthetic(ExprKind::And(operands))
    }

    pub fn or(&mut self, operands: Vec<NodeIndex>) -> NodeIndex {
        self.synthetic(ExprKind::Or(operands))
    }

    pub fn not(&mut self, operand: NodeIndex) -> NodeIndex {
        self.synthetic(ExprKind::Not(operand))
    }

    pub fn compare(&mut self, op: ComparisonOp, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.synthetic(ExprKind::Comparison { op, left, right })
    }

    pub fn arith(&mut self, op: ArithmeticOp, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.synthetic(ExprKind::Arithmetic { op, left, right })
    }

    pub fn negate(&mut self, operand: NodeIndex) -> NodeIndex {
        self.synthetic(ExprKind::Negate(operand))
    }

    pub fn is_type(&mut self, operand: NodeIndex, ty: TypeExpr) -> NodeIndex {
        self.synthetic(ExprKind::TypeTest { operand, ty })
    }

    pub fn cast(&mut self, operand: NodeIndex, ty: TypeExpr) -> NodeIndex {
        self.synthetic(ExprKind::Cast { operand, ty })
    }

    pub fn call(&mut self, callee: &str, args: Vec<NodeIndex>) -> NodeIndex {
        let callee = self.intern(callee);
        let args = args
            .into_iter()
            .map(|value| Argument {
                name: None,
                value,
                span: Span::DUMMY,
            })
            .collect();
        self.synthetic(ExprKind::Call { callee, args })
    }

    pub fn call_named(&mut self, callee: &str, args: Vec<(&str, NodeIndex)>) -> NodeIndex {
        let callee = self.intern(callee);
        let args = args
            .into_iter()
            .map(|(name, value)| Argument {
                name: Some(self.intern(name)),
                value,
                span: Span::DUMMY,
            })
            .collect();
        self.synthetic(ExprKind::Call { callee, args })
    }

    pub fn tuple(&mut self, elements: Vec<NodeIndex>) -> NodeIndex {
        self.synthetic(ExprKind::TupleLiteral(elements))
    }

    pub fn list(
        &mut self,
        elements: Vec<NodeIndex>,
        rest: Option<NodeIndex>,
        element_type: Option<TypeExpr>,
    ) -> NodeIndex {
        self.synthetic(ExprKind::ListLiteral {
            elements,
            rest,
            element_type,
        })
    }

    pub fn map(
        &mut self,
        entries: Vec<(NodeIndex, NodeIndex)>,
        rest: Option<NodeIndex>,
        types: Option<(TypeExpr, TypeExpr)>,
    ) -> NodeIndex {
        let (key_type, value_type) = match types {
            Some((k, v)) => (Some(k), Some(v)),
            None => (None, None),
        };
        self.synthetic(ExprKind::MapLiteral {
            entries,
            rest,
            key_type,
            value_type,
        })
    }

    pub fn set(
        &mut self,
        elements: Vec<NodeIndex>,
        rest: Option<NodeIndex>,
        element_type: Option<TypeExpr>,
    ) -> NodeIndex {
        self.synthetic(ExprKind::SetLiteral {
            elements,
            rest,
            element_type,
        })
    }

    pub fn matches(&mut self, scrutinee: NodeIndex, pattern: NodeIndex) -> NodeIndex {
        self.synthetic(ExprKind::Matches { scrutinee, pattern })
    }

    pub fn lambda(&mut self, params: Vec<(&str, TypeExpr)>, body: NodeIndex) -> NodeIndex {
        let params = params
            .into_iter()
            .map(|(name, ty)| LambdaParam {
                name: self.intern(name),
                ty,
                span: Span::DUMMY,
            })
            .collect();
        self.synthetic(ExprKind::Lambda { params, body })
    }

    /// Type expression for a keyword or declared type name.
    pub fn ty(&mut self, name: &str) -> TypeExpr {
        TypeExpr::named(self.intern(name))
    }

    // Statements

    fn synthetic_stmt(&mut self, kind: StmtKind) -> StmtIndex {
        let at = self.stmts.len() as u32;
        self.add_stmt(kind, Span::new(at, at + 1))
    }

    pub fn declare(&mut self, name: &str, ty: Option<TypeExpr>, init: Option<NodeIndex>) -> StmtIndex {
        let name = self.intern(name);
        self.synthetic_stmt(StmtKind::Declaration { name, ty, init })
    }

    pub fn assign(&mut self, target: NodeIndex, value: NodeIndex) -> StmtIndex {
        self.synthetic_stmt(StmtKind::Assignment { target, value })
    }

    pub fn if_stmt(
        &mut self,
        branches: Vec<(NodeIndex, Block)>,
        otherwise: Option<Block>,
    ) -> StmtIndex {
        self.synthetic_stmt(StmtKind::If {
            branches,
            otherwise,
        })
    }

    pub fn when_matches(
        &mut self,
        scrutinee: NodeIndex,
        branches: Vec<(NodeIndex, Block)>,
        otherwise: Option<Block>,
    ) -> StmtIndex {
        self.synthetic_stmt(StmtKind::WhenMatches {
            scrutinee,
            branches,
            otherwise,
        })
    }

    pub fn while_stmt(&mut self, condition: NodeIndex, body: Block) -> StmtIndex {
        self.synthetic_stmt(StmtKind::While { condition, body })
    }

    pub fn return_stmt(&mut self, value: Option<NodeIndex>) -> StmtIndex {
        self.synthetic_stmt(StmtKind::Return(value))
    }

    pub fn throw_stmt(&mut self, value: NodeIndex) -> StmtIndex {
        self.synthetic_stmt(StmtKind::Throw(value))
    }

    pub fn fail_stmt(&mut self, reason: NodeIndex) -> StmtIndex {
        self.synthetic_stmt(StmtKind::Fail(reason))
    }

    pub fn expr_stmt(&mut self, expr: NodeIndex) -> StmtIndex {
        self.synthetic_stmt(StmtKind::Expression(expr))
    }

    pub fn block_stmt(&mut self, block: Block) -> StmtIndex {
        self.synthetic_stmt(StmtKind::Block(block))
    }
}

#[cfg(test)]
#[path = "../tests/node_tests.rs"]
mod node_tests;
