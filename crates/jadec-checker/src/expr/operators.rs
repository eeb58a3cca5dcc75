//! Comparison and arithmetic operators.

use super::{ExpressionSemantics, advance, infer_type};
use crate::context::CheckerContext;
use crate::state::StaticState;
use jadec_ast::{ArithmeticOp, ComparisonOp, ExprKind, NodeIndex};
use jadec_common::DiagnosticCode;
use jadec_common::diagnostics::DiagnosticAcceptor;
use jadec_emitter::EmissionSink;
use jadec_solver::TypeId;

fn is_numeric(ty: TypeId) -> bool {
    matches!(ty, TypeId::INTEGER | TypeId::REAL)
}

/// Operands of a binary node, with the state the right operand sees.
fn binary_operands(
    cx: &CheckerContext<'_>,
    left: NodeIndex,
    right: NodeIndex,
    state: &StaticState,
) -> (TypeId, TypeId, StaticState) {
    let left_type = infer_type(cx, left, state);
    let after_left = advance(cx, left, state);
    let right_type = infer_type(cx, right, &after_left);
    (left_type, right_type, after_left)
}

fn validate_operands(
    cx: &CheckerContext<'_>,
    left: NodeIndex,
    right: NodeIndex,
    state: &StaticState,
    acceptor: &mut dyn DiagnosticAcceptor,
) -> bool {
    let left_ok = super::validate(cx, left, state, acceptor);
    let after_left = advance(cx, left, state);
    let right_ok = super::validate(cx, right, &after_left, acceptor);
    left_ok && right_ok
}

fn report_operands(
    cx: &CheckerContext<'_>,
    node: NodeIndex,
    operator: &str,
    left: TypeId,
    right: TypeId,
    acceptor: &mut dyn DiagnosticAcceptor,
) {
    acceptor.accept_error(
        format!(
            "Operator '{operator}' cannot be applied to operands of type '{}' and '{}'",
            cx.format_type(left),
            cx.format_type(right)
        ),
        cx.span(node),
        Some("operator"),
        None,
        DiagnosticCode::InvalidOperandType,
    );
}

// =============================================================================
// Comparison
// =============================================================================

pub(super) struct ComparisonSemantics;

impl ComparisonSemantics {
    fn parts(cx: &CheckerContext<'_>, node: NodeIndex) -> Option<(ComparisonOp, NodeIndex, NodeIndex)> {
        match cx.arena.kind(node) {
            Some(ExprKind::Comparison { op, left, right }) => Some((*op, *left, *right)),
            _ => None,
        }
    }

    fn operands_compatible(cx: &CheckerContext<'_>, op: ComparisonOp, left: TypeId, right: TypeId) -> bool {
        if left.is_error() || right.is_error() {
            return true;
        }
        if op.is_equality() {
            return cx.compare(left, right).is_related();
        }
        (is_numeric(left) && is_numeric(right))
            || (left == right && matches!(left, TypeId::TEXT | TypeId::DURATION | TypeId::TIMESTAMP))
    }
}

impl ExpressionSemantics for ComparisonSemantics {
    fn infer_type(&self, _cx: &CheckerContext<'_>, _node: NodeIndex, _state: &StaticState) -> TypeId {
        TypeId::BOOLEAN
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) -> String {
        let Some((op, left, right)) = Self::parts(cx, node) else {
            return super::unresolved_placeholder("comparison");
        };
        let (left_type, right_type, after_left) = binary_operands(cx, left, right, state);
        let l = super::compile(cx, left, state, sink);
        let r = super::compile(cx, right, &after_left, sink);
        let numeric = is_numeric(left_type) && is_numeric(right_type);
        match op {
            ComparisonOp::Equal | ComparisonOp::NotEqual => {
                let test = if numeric {
                    format!("((double) ({l})) == ((double) ({r}))")
                } else {
                    format!("java.util.Objects.equals({l}, {r})")
                };
                if op == ComparisonOp::Equal {
                    format!("({test})")
                } else {
                    format!("(!({test}))")
                }
            }
            _ if numeric => format!("({l} {} {r})", java_ordering(op)),
            _ => format!("({l}.compareTo({r}) {} 0)", java_ordering(op)),
        }
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let Some((op, left, right)) = Self::parts(cx, node) else {
            return false;
        };
        if !validate_operands(cx, left, right, state, acceptor) {
            return false;
        }
        let (left_type, right_type, _) = binary_operands(cx, left, right, state);
        if Self::operands_compatible(cx, op, left_type, right_type) {
            return true;
        }
        report_operands(cx, node, op.source_text(), left_type, right_type, acceptor);
        false
    }
}

fn java_ordering(op: ComparisonOp) -> &'static str {
    match op {
        ComparisonOp::Less => "<",
        ComparisonOp::LessOrEqual => "<=",
        ComparisonOp::Greater => ">",
        ComparisonOp::GreaterOrEqual => ">=",
        ComparisonOp::Equal => "==",
        ComparisonOp::NotEqual => "!=",
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

/// Result type of `left op right`, or `None` when the operator does not
/// apply. Error operands yield the error type without a report.
pub(crate) fn arithmetic_result(op: ArithmeticOp, left: TypeId, right: TypeId) -> Option<TypeId> {
    if left.is_error() || right.is_error() {
        return Some(TypeId::ERROR);
    }
    if is_numeric(left) && is_numeric(right) {
        return Some(if left == TypeId::INTEGER && right == TypeId::INTEGER {
            TypeId::INTEGER
        } else {
            TypeId::REAL
        });
    }
    match (op, left, right) {
        (ArithmeticOp::Add, TypeId::TEXT, _) | (ArithmeticOp::Add, _, TypeId::TEXT) => Some(TypeId::TEXT),
        (ArithmeticOp::Add | ArithmeticOp::Subtract, TypeId::DURATION, TypeId::DURATION) => {
            Some(TypeId::DURATION)
        }
        (ArithmeticOp::Add, TypeId::TIMESTAMP, TypeId::DURATION)
        | (ArithmeticOp::Add, TypeId::DURATION, TypeId::TIMESTAMP)
        | (ArithmeticOp::Subtract, TypeId::TIMESTAMP, TypeId::DURATION) => Some(TypeId::TIMESTAMP),
        (ArithmeticOp::Subtract, TypeId::TIMESTAMP, TypeId::TIMESTAMP) => Some(TypeId::DURATION),
        _ => None,
    }
}

pub(super) struct ArithmeticSemantics;

impl ArithmeticSemantics {
    fn parts(cx: &CheckerContext<'_>, node: NodeIndex) -> Option<(ArithmeticOp, NodeIndex, NodeIndex)> {
        match cx.arena.kind(node) {
            Some(ExprKind::Arithmetic { op, left, right }) => Some((*op, *left, *right)),
            _ => None,
        }
    }
}

impl ExpressionSemantics for ArithmeticSemantics {
    fn infer_type(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> TypeId {
        let Some((op, left, right)) = Self::parts(cx, node) else {
            return TypeId::ERROR;
        };
        let (left_type, right_type, _) = binary_operands(cx, left, right, state);
        arithmetic_result(op, left_type, right_type).unwrap_or(TypeId::ERROR)
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) -> String {
        let Some((op, left, right)) = Self::parts(cx, node) else {
            return super::unresolved_placeholder("arithmetic");
        };
        let (left_type, right_type, after_left) = binary_operands(cx, left, right, state);
        let l = super::compile(cx, left, state, sink);
        let r = super::compile(cx, right, &after_left, sink);
        match arithmetic_result(op, left_type, right_type) {
            Some(TypeId::TEXT) => {
                format!("(java.lang.String.valueOf({l}) + java.lang.String.valueOf({r}))")
            }
            Some(TypeId::DURATION | TypeId::TIMESTAMP) => match op {
                ArithmeticOp::Add if left_type == TypeId::DURATION && right_type == TypeId::TIMESTAMP => {
                    format!("{r}.plus({l})")
                }
                ArithmeticOp::Add => format!("{l}.plus({r})"),
                _ => format!("{l}.minus({r})"),
            },
            _ => format!("({l} {} {r})", op.symbol()),
        }
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let Some((op, left, right)) = Self::parts(cx, node) else {
            return false;
        };
        if !validate_operands(cx, left, right, state, acceptor) {
            return false;
        }
        let (left_type, right_type, _) = binary_operands(cx, left, right, state);
        if arithmetic_result(op, left_type, right_type).is_some() {
            return true;
        }
        report_operands(cx, node, op.symbol(), left_type, right_type, acceptor);
        false
    }
}

/// Unary minus.
pub(super) struct NegateSemantics;

impl NegateSemantics {
    fn operand(cx: &CheckerContext<'_>, node: NodeIndex) -> Option<NodeIndex> {
        match cx.arena.kind(node) {
            Some(ExprKind::Negate(operand)) => Some(*operand),
            _ => None,
        }
    }
}

impl ExpressionSemantics for NegateSemantics {
    fn infer_type(&self, cx: &CheckerContext<'_>, node: NodeIndex, state: &StaticState) -> TypeId {
        match Self::operand(cx, node).map(|o| infer_type(cx, o, state)) {
            Some(ty) if is_numeric(ty) || ty == TypeId::DURATION => ty,
            _ => TypeId::ERROR,
        }
    }

    fn compile(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        sink: &mut dyn EmissionSink,
    ) -> String {
        let Some(operand) = Self::operand(cx, node) else {
            return super::unresolved_placeholder("operand");
        };
        let text = super::compile(cx, operand, state, sink);
        if infer_type(cx, operand, state) == TypeId::DURATION {
            format!("{text}.negate()")
        } else {
            format!("(-{text})")
        }
    }

    fn validate(
        &self,
        cx: &CheckerContext<'_>,
        node: NodeIndex,
        state: &StaticState,
        acceptor: &mut dyn DiagnosticAcceptor,
    ) -> bool {
        let Some(operand) = Self::operand(cx, node) else {
            return false;
        };
        if !super::validate(cx, operand, state, acceptor) {
            return false;
        }
        let ty = infer_type(cx, operand, state);
        if ty.is_error() || is_numeric(ty) || ty == TypeId::DURATION {
            return true;
        }
        acceptor.accept_error(
            format!("Cannot negate a value of type '{}'", cx.format_type(ty)),
            cx.span(node),
            Some("operand"),
            None,
            DiagnosticCode::InvalidOperandType,
        );
        false
    }
}
