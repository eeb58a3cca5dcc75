//! Lowering of decoded program files into arena-backed source units.

use super::{
    ArithmeticSyntax, BranchSyntax, ComparisonSyntax, CompositeType, ExprSyntax, OperationKindSyntax,
    ProgramFile, StmtSyntax, TypeKindSyntax, TypeSyntax, TypedName,
};
use jadec_ast::{
    Argument, ArithmeticOp, Block, ComparisonOp, ExprKind, GlobalDecl, HandlerDecl, NativeTypeDecl,
    NodeArena, NodeIndex, OperationDecl, OperationKind, Param, PropertyDecl, SourceUnit,
    StmtIndex, TypeDecl, TypeDeclKind, TypeExpr,
};
use jadec_common::Span;
use tracing::debug;

/// Build a `SourceUnit` from `program`; `fallback_name` names units that do
/// not carry their own name.
pub fn lower(program: &ProgramFile, fallback_name: &str) -> SourceUnit {
    let name = program.name.as_deref().unwrap_or(fallback_name);
    let mut lowering = Lowering {
        arena: NodeArena::new(),
    };

    let types = program
        .types
        .iter()
        .map(|decl| TypeDecl {
            name: lowering.arena.intern(&decl.name),
            kind: type_kind(decl.kind),
            supertypes: decl
                .extends
                .iter()
                .map(|name| (lowering.arena.intern(name), Span::DUMMY))
                .collect(),
            properties: decl
                .properties
                .iter()
                .map(|property| PropertyDecl {
                    name: lowering.arena.intern(&property.name),
                    ty: lowering.type_expr(&property.ty),
                    span: Span::DUMMY,
                })
                .collect(),
            host_name: decl.host_name.clone(),
            span: Span::DUMMY,
        })
        .collect();

    let native_types = program
        .native_types
        .iter()
        .map(|decl| NativeTypeDecl {
            name: lowering.arena.intern(&decl.name),
            class_name: decl.class_name.clone(),
            host_supertypes: decl.extends.clone(),
            span: Span::DUMMY,
        })
        .collect();

    let globals = program
        .globals
        .iter()
        .map(|global| GlobalDecl {
            name: lowering.arena.intern(&global.name),
            ty: global.ty.as_ref().map(|ty| lowering.type_expr(ty)),
            value: lowering.expr(&global.value),
            span: Span::DUMMY,
        })
        .collect();

    let operations = program
        .operations
        .iter()
        .map(|op| OperationDecl {
            name: lowering.arena.intern(&op.name),
            kind: match op.kind {
                OperationKindSyntax::Function => OperationKind::Function,
                OperationKindSyntax::Procedure => OperationKind::Procedure,
            },
            params: op.params.iter().map(|param| lowering.param(param)).collect(),
            return_type: op.returns.as_ref().map(|ty| lowering.type_expr(ty)),
            pure: op.pure,
            body: lowering.block(&op.body),
            span: Span::DUMMY,
        })
        .collect();

    let handlers = program
        .handlers
        .iter()
        .map(|handler| HandlerDecl {
            performative: lowering.arena.intern(&handler.performative),
            content: handler.content.as_ref().map(|content| lowering.expr(content)),
            guard: handler.guard.as_ref().map(|guard| lowering.expr(guard)),
            body: lowering.block(&handler.body),
            span: Span::DUMMY,
        })
        .collect();

    debug!(unit = name, nodes = lowering.arena.len(), "lowered program");

    SourceUnit {
        types,
        native_types,
        globals,
        operations,
        handlers,
        ..SourceUnit::new(name, lowering.arena)
    }
}

fn type_kind(kind: TypeKindSyntax) -> TypeDeclKind {
    match kind {
        TypeKindSyntax::Concept => TypeDeclKind::Concept,
        TypeKindSyntax::Predicate => TypeDeclKind::Predicate,
        TypeKindSyntax::Action => TypeDeclKind::Action,
        TypeKindSyntax::Agent => TypeDeclKind::Agent,
        TypeKindSyntax::Behaviour => TypeDeclKind::Behaviour,
        TypeKindSyntax::Record => TypeDeclKind::Record,
    }
}

fn comparison(op: ComparisonSyntax) -> ComparisonOp {
    match op {
        ComparisonSyntax::Equal => ComparisonOp::Equal,
        ComparisonSyntax::NotEqual => ComparisonOp::NotEqual,
        ComparisonSyntax::Less => ComparisonOp::Less,
        ComparisonSyntax::LessOrEqual => ComparisonOp::LessOrEqual,
        ComparisonSyntax::Greater => ComparisonOp::Greater,
        ComparisonSyntax::GreaterOrEqual => ComparisonOp::GreaterOrEqual,
    }
}

fn arithmetic(op: ArithmeticSyntax) -> ArithmeticOp {
    match op {
        ArithmeticSyntax::Add => ArithmeticOp::Add,
        ArithmeticSyntax::Subtract => ArithmeticOp::Subtract,
        ArithmeticSyntax::Multiply => ArithmeticOp::Multiply,
        ArithmeticSyntax::Divide => ArithmeticOp::Divide,
        ArithmeticSyntax::Modulo => ArithmeticOp::Modulo,
    }
}

struct Lowering {
    arena: NodeArena,
}

impl Lowering {
    fn type_expr(&mut self, ty: &TypeSyntax) -> TypeExpr {
        match ty {
            TypeSyntax::Named(name) => self.arena.ty(name),
            TypeSyntax::Composite(composite) => match composite.as_ref() {
                CompositeType::List(element) => TypeExpr::list(self.type_expr(element)),
                CompositeType::Set(element) => TypeExpr::set(self.type_expr(element)),
                CompositeType::Map(key, value) => {
                    let key = self.type_expr(key);
                    TypeExpr::map(key, self.type_expr(value))
                }
                CompositeType::Tuple(elements) => {
                    TypeExpr::tuple(elements.iter().map(|e| self.type_expr(e)).collect())
                }
                CompositeType::Message(content) => TypeExpr::message(self.type_expr(content)),
                CompositeType::Function { params, result } => {
                    let params = params.iter().map(|p| self.type_expr(p)).collect();
                    TypeExpr::function(params, self.type_expr(result))
                }
            },
        }
    }

    fn param(&mut self, param: &TypedName) -> Param {
        Param {
            name: self.arena.intern(&param.name),
            ty: self.type_expr(&param.ty),
            span: Span::DUMMY,
        }
    }

    fn exprs(&mut self, exprs: &[ExprSyntax]) -> Vec<NodeIndex> {
        exprs.iter().map(|e| self.expr(e)).collect()
    }

    fn optional(&mut self, expr: Option<&ExprSyntax>) -> Option<NodeIndex> {
        expr.map(|e| self.expr(e))
    }

    fn expr(&mut self, expr: &ExprSyntax) -> NodeIndex {
        match expr {
            ExprSyntax::Int(value) => self.arena.int(*value),
            ExprSyntax::Real(value) => self.arena.real(*value),
            ExprSyntax::Bool(value) => self.arena.boolean(*value),
            ExprSyntax::Text(value) => self.arena.text_lit(value),
            ExprSyntax::Name(name) => self.arena.name(name),
            ExprSyntax::Placeholder => self.arena.placeholder(),
            ExprSyntax::Paren(inner) => {
                let inner = self.expr(inner);
                self.arena.paren(inner)
            }
            ExprSyntax::Property { target, name } => {
                let target = self.expr(target);
                self.arena.property(target, name)
            }
            ExprSyntax::And(operands) => {
                let operands = self.exprs(operands);
                self.arena.and(operands)
            }
            ExprSyntax::Or(operands) => {
                let operands = self.exprs(operands);
                self.arena.or(operands)
            }
            ExprSyntax::Not(operand) => {
                let operand = self.expr(operand);
                self.arena.not(operand)
            }
            ExprSyntax::Compare { op, left, right } => {
                let left = self.expr(left);
                let right = self.expr(right);
                self.arena.compare(comparison(*op), left, right)
            }
            ExprSyntax::Arith { op, left, right } => {
                let left = self.expr(left);
                let right = self.expr(right);
                self.arena.arith(arithmetic(*op), left, right)
            }
            ExprSyntax::Negate(operand) => {
                let operand = self.expr(operand);
                self.arena.negate(operand)
            }
            ExprSyntax::Is { operand, ty } => {
                let operand = self.expr(operand);
                let ty = self.type_expr(ty);
                self.arena.is_type(operand, ty)
            }
            ExprSyntax::As { operand, ty } => {
                let operand = self.expr(operand);
                let ty = self.type_expr(ty);
                self.arena.cast(operand, ty)
            }
            ExprSyntax::Call {
                callee,
                args,
                named,
            } => {
                let mut arguments: Vec<Argument> = args
                    .iter()
                    .map(|arg| Argument {
                        name: None,
                        value: self.expr(arg),
                        span: Span::DUMMY,
                    })
                    .collect();
                for arg in named {
                    arguments.push(Argument {
                        name: Some(self.arena.intern(&arg.name)),
                        value: self.expr(&arg.value),
                        span: Span::DUMMY,
                    });
                }
                let callee = self.arena.intern(callee);
                let at = self.arena.len() as u32;
                self.arena.add_expr(
                    ExprKind::Call {
                        callee,
                        args: arguments,
                    },
                    Span::new(at, at + 1),
                )
            }
            ExprSyntax::Tuple(elements) => {
                let elements = self.exprs(elements);
                self.arena.tuple(elements)
            }
            ExprSyntax::List { elements, rest, of } => {
                let elements = self.exprs(elements);
                let rest = self.optional(rest.as_deref());
                let of = of.as_ref().map(|ty| self.type_expr(ty));
                self.arena.list(elements, rest, of)
            }
            ExprSyntax::Set { elements, rest, of } => {
                let elements = self.exprs(elements);
                let rest = self.optional(rest.as_deref());
                let of = of.as_ref().map(|ty| self.type_expr(ty));
                self.arena.set(elements, rest, of)
            }
            ExprSyntax::Map { entries, rest, of } => {
                let entries = entries
                    .iter()
                    .map(|(key, value)| {
                        let key = self.expr(key);
                        (key, self.expr(value))
                    })
                    .collect();
                let rest = self.optional(rest.as_deref());
                let of = of.as_ref().map(|(key, value)| {
                    let key = self.type_expr(key);
                    (key, self.type_expr(value))
                });
                self.arena.map(entries, rest, of)
            }
            ExprSyntax::Matches { value, pattern } => {
                let value = self.expr(value);
                let pattern = self.expr(pattern);
                self.arena.matches(value, pattern)
            }
            ExprSyntax::Lambda { params, body } => {
                let params: Vec<(String, TypeExpr)> = params
                    .iter()
                    .map(|param| (param.name.clone(), self.type_expr(&param.ty)))
                    .collect();
                let body = self.expr(body);
                self.arena.lambda(
                    params
                        .iter()
                        .map(|(name, ty)| (name.as_str(), ty.clone()))
                        .collect(),
                    body,
                )
            }
        }
    }

    fn block(&mut self, stmts: &[StmtSyntax]) -> Block {
        Block::new(stmts.iter().map(|s| self.stmt(s)).collect())
    }

    fn branches(&mut self, branches: &[BranchSyntax<ExprSyntax>]) -> Vec<(NodeIndex, Block)> {
        branches
            .iter()
            .map(|branch| {
                let head = self.expr(&branch.head);
                (head, self.block(&branch.body))
            })
            .collect()
    }

    fn stmt(&mut self, stmt: &StmtSyntax) -> StmtIndex {
        match stmt {
            StmtSyntax::Declare { name, ty, value } => {
                let ty = ty.as_ref().map(|ty| self.type_expr(ty));
                let value = self.optional(value.as_ref());
                self.arena.declare(name, ty, value)
            }
            StmtSyntax::Assign { target, value } => {
                let target = self.expr(target);
                let value = self.expr(value);
                self.arena.assign(target, value)
            }
            StmtSyntax::If {
                branches,
                otherwise,
            } => {
                let branches = self.branches(branches);
                let otherwise = otherwise.as_deref().map(|body| self.block(body));
                self.arena.if_stmt(branches, otherwise)
            }
            StmtSyntax::When {
                value,
                branches,
                otherwise,
            } => {
                let value = self.expr(value);
                let branches = self.branches(branches);
                let otherwise = otherwise.as_deref().map(|body| self.block(body));
                self.arena.when_matches(value, branches, otherwise)
            }
            StmtSyntax::While { condition, body } => {
                let condition = self.expr(condition);
                let body = self.block(body);
                self.arena.while_stmt(condition, body)
            }
            StmtSyntax::Return(value) => {
                let value = self.optional(value.as_ref());
                self.arena.return_stmt(value)
            }
            StmtSyntax::Throw(value) => {
                let value = self.expr(value);
                self.arena.throw_stmt(value)
            }
            StmtSyntax::Fail(reason) => {
                let reason = self.expr(reason);
                self.arena.fail_stmt(reason)
            }
            StmtSyntax::Expr(expr) => {
                let expr = self.expr(expr);
                self.arena.expr_stmt(expr)
            }
            StmtSyntax::Block(body) => {
                let body = self.block(body);
                self.arena.block_stmt(body)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/program_tests.rs"]
mod program_tests;
