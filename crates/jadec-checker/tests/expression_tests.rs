//! Expression typing, validation, compilation and flow refinement.

use jadec_ast::{ComparisonOp, NodeArena};
use jadec_checker::expr;
use jadec_checker::{
    CallableParam, CallableSymbol, CheckerContext, CheckerOptions, ExpressionDescriptor, NamedSymbol, StaticState,
    SymbolTable,
};
use jadec_common::{Atom, DiagnosticCode, DiagnosticCollector, Span};
use jadec_emitter::StatementBuffer;
use jadec_solver::{TypeId, TypeInterner};

struct Fixture {
    arena: NodeArena,
    types: TypeInterner,
    symbols: SymbolTable,
}

impl Fixture {
    fn new() -> Self {
        Self {
            arena: NodeArena::new(),
            types: TypeInterner::new(),
            symbols: SymbolTable::new(),
        }
    }

    fn cx(&self) -> CheckerContext<'_> {
        CheckerContext::new("expr.jade", &self.arena, &self.types, &self.symbols, CheckerOptions::default())
    }
}

fn with_locals(locals: &[(Atom, &str, TypeId)]) -> StaticState {
    locals.iter().fold(StaticState::new(), |state, &(atom, name, ty)| {
        state.assert_named_symbol(atom, NamedSymbol::local(name, ty))
    })
}

#[test]
fn test_literals_compile_to_java_values() {
    let mut fx = Fixture::new();
    let nodes = [
        fx.arena.int(42),
        fx.arena.int(-1),
        fx.arena.real(2.5),
        fx.arena.boolean(true),
        fx.arena.text_lit("hi"),
    ];
    let cx = fx.cx();
    let state = StaticState::new();
    let mut sink = StatementBuffer::new();

    let texts: Vec<String> = nodes.iter().map(|n| expr::compile(&cx, *n, &state, &mut sink)).collect();
    assert_eq!(texts, ["42", "(-1)", "2.5f", "true", "\"hi\""]);
    assert!(sink.is_empty());

    let types: Vec<TypeId> = nodes.iter().map(|n| expr::infer_type(&cx, *n, &state)).collect();
    assert_eq!(
        types,
        [TypeId::INTEGER, TypeId::INTEGER, TypeId::REAL, TypeId::BOOLEAN, TypeId::TEXT]
    );
}

#[test]
fn test_unresolved_name_is_reported() {
    let mut fx = Fixture::new();
    let missing = fx.arena.name("missing");
    let cx = fx.cx();

    let mut diagnostics = DiagnosticCollector::new("expr.jade");
    assert!(!expr::validate(&cx, missing, &StaticState::new(), &mut diagnostics));
    assert_eq!(diagnostics.count_code(DiagnosticCode::UnresolvedName), 1);
    assert_eq!(
        diagnostics.diagnostics()[0].message_text,
        "Cannot resolve name 'missing'"
    );
}

#[test]
fn test_global_names_resolve_through_the_symbol_table() {
    let mut fx = Fixture::new();
    let limit = fx.arena.name("LIMIT");
    fx.symbols
        .add_name(NamedSymbol::local("LIMIT", TypeId::INTEGER).with_compiled_name("this.LIMIT").immutable());
    let cx = fx.cx();
    let state = StaticState::new();

    let mut diagnostics = DiagnosticCollector::new("expr.jade");
    assert!(expr::validate(&cx, limit, &state, &mut diagnostics));
    assert_eq!(expr::infer_type(&cx, limit, &state), TypeId::INTEGER);
    assert_eq!(expr::compile(&cx, limit, &state, &mut StatementBuffer::new()), "this.LIMIT");
}

#[test]
fn test_type_test_narrows_on_true_only() {
    let mut fx = Fixture::new();
    let v = fx.arena.intern("v");
    let operand = fx.arena.name("v");
    let integer = fx.arena.ty("integer");
    let test = fx.arena.is_type(operand, integer);
    let cx = fx.cx();
    let state = with_locals(&[(v, "v", TypeId::ANY)]);
    let descriptor = ExpressionDescriptor::name(v);

    assert_eq!(
        expr::assert_returned_true(&cx, test, &state).flow_type_of(&descriptor),
        Some(TypeId::INTEGER)
    );
    assert_eq!(
        expr::assert_returned_false(&cx, test, &state).flow_type_of(&descriptor),
        None
    );
    assert_eq!(
        expr::compile(&cx, test, &state, &mut StatementBuffer::new()),
        "(v instanceof java.lang.Integer)"
    );
}

#[test]
fn test_narrowed_name_is_read_through_a_cast() {
    let mut fx = Fixture::new();
    let v = fx.arena.intern("v");
    let read = fx.arena.name("v");
    let cx = fx.cx();
    let state = with_locals(&[(v, "v", TypeId::ANY)]).assert_flow_type(ExpressionDescriptor::name(v), TypeId::TEXT);

    assert_eq!(expr::infer_type(&cx, read, &state), TypeId::TEXT);
    assert_eq!(
        expr::compile(&cx, read, &state, &mut StatementBuffer::new()),
        "((java.lang.String) v)"
    );
}

#[test]
fn test_type_test_of_unrelated_type_is_an_invalid_cast() {
    let mut fx = Fixture::new();
    let n = fx.arena.intern("n");
    let operand = fx.arena.name("n");
    let text = fx.arena.ty("text");
    let test = fx.arena.is_type(operand, text);
    let cx = fx.cx();
    let state = with_locals(&[(n, "n", TypeId::INTEGER)]);

    let mut diagnostics = DiagnosticCollector::new("expr.jade");
    assert!(!expr::validate(&cx, test, &state, &mut diagnostics));
    assert_eq!(diagnostics.count_code(DiagnosticCode::InvalidCast), 1);
}

#[test]
fn test_and_applies_refinements_left_to_right() {
    // v is integer and v > 0
    let mut fx = Fixture::new();
    let v = fx.arena.intern("v");
    let tested = fx.arena.name("v");
    let integer = fx.arena.ty("integer");
    let is_integer = fx.arena.is_type(tested, integer);
    let compared = fx.arena.name("v");
    let zero = fx.arena.int(0);
    let positive = fx.arena.compare(ComparisonOp::Greater, compared, zero);
    let both = fx.arena.and(vec![is_integer, positive]);
    let cx = fx.cx();
    let state = with_locals(&[(v, "v", TypeId::ANY)]);

    let mut diagnostics = DiagnosticCollector::new("expr.jade");
    assert!(expr::validate(&cx, both, &state, &mut diagnostics));
    assert!(diagnostics.diagnostics().is_empty());

    assert_eq!(
        expr::compile(&cx, both, &state, &mut StatementBuffer::new()),
        "((v instanceof java.lang.Integer) && (((java.lang.Integer) v) > 0))"
    );
}

#[test]
fn test_comparison_without_refinement_is_rejected() {
    let mut fx = Fixture::new();
    let v = fx.arena.intern("v");
    let compared = fx.arena.name("v");
    let zero = fx.arena.int(0);
    let positive = fx.arena.compare(ComparisonOp::Greater, compared, zero);
    let cx = fx.cx();
    let state = with_locals(&[(v, "v", TypeId::ANY)]);

    let mut diagnostics = DiagnosticCollector::new("expr.jade");
    assert!(!expr::validate(&cx, positive, &state, &mut diagnostics));
    assert_eq!(diagnostics.count_code(DiagnosticCode::InvalidOperandType), 1);
}

#[test]
fn test_and_outcomes_true_and_false() {
    // a is integer and b is text
    let mut fx = Fixture::new();
    let a = fx.arena.intern("a");
    let b = fx.arena.intern("b");
    let a_node = fx.arena.name("a");
    let integer = fx.arena.ty("integer");
    let a_test = fx.arena.is_type(a_node, integer);
    let b_node = fx.arena.name("b");
    let text = fx.arena.ty("text");
    let b_test = fx.arena.is_type(b_node, text);
    let both = fx.arena.and(vec![a_test, b_test]);
    let cx = fx.cx();
    let state = with_locals(&[(a, "a", TypeId::ANY), (b, "b", TypeId::ANY)]);
    let (da, db) = (ExpressionDescriptor::name(a), ExpressionDescriptor::name(b));

    let on_true = expr::assert_returned_true(&cx, both, &state);
    assert_eq!(on_true.flow_type_of(&da), Some(TypeId::INTEGER));
    assert_eq!(on_true.flow_type_of(&db), Some(TypeId::TEXT));

    // {a false} joined with {a true, b false}: nothing is known for sure.
    let on_false = expr::assert_returned_false(&cx, both, &state);
    assert!(on_false.is_valid());
    assert_eq!(on_false.flow_type_of(&da), None);
    assert_eq!(on_false.flow_type_of(&db), None);

    let after = expr::advance(&cx, both, &state);
    assert!(after.visible_facts().is_empty());
}

#[test]
fn test_or_outcome_false_keeps_every_negation() {
    // `or` over `not (a is integer)`: false means a is integer.
    let mut fx = Fixture::new();
    let a = fx.arena.intern("a");
    let first = fx.arena.name("a");
    let integer = fx.arena.ty("integer");
    let test = fx.arena.is_type(first, integer);
    let negated = fx.arena.not(test);
    let either = fx.arena.or(vec![negated]);
    let cx = fx.cx();
    let state = with_locals(&[(a, "a", TypeId::ANY)]);

    let on_false = expr::assert_returned_false(&cx, either, &state);
    assert_eq!(on_false.flow_type_of(&ExpressionDescriptor::name(a)), Some(TypeId::INTEGER));
    assert_eq!(
        expr::compile(&cx, either, &state, &mut StatementBuffer::new()),
        "((!(a instanceof java.lang.Integer)))"
    );
}

#[test]
fn test_false_literal_makes_the_true_branch_unreachable() {
    let mut fx = Fixture::new();
    let no = fx.arena.boolean(false);
    let cx = fx.cx();
    let state = StaticState::new();

    assert!(!expr::assert_returned_true(&cx, no, &state).is_valid());
    assert!(expr::assert_returned_false(&cx, no, &state).is_valid());
}

#[test]
fn test_boolean_operands_are_required() {
    let mut fx = Fixture::new();
    let one = fx.arena.int(1);
    let yes = fx.arena.boolean(true);
    let both = fx.arena.and(vec![yes, one]);
    let cx = fx.cx();

    let mut diagnostics = DiagnosticCollector::new("expr.jade");
    assert!(!expr::validate(&cx, both, &StaticState::new(), &mut diagnostics));
    let error = &diagnostics.diagnostics()[0];
    assert_eq!(error.code, DiagnosticCode::InvalidOperandType);
    assert_eq!(error.index, Some(1));
}

#[test]
fn test_named_arguments_compile_in_parameter_order() {
    let mut fx = Fixture::new();
    let high = fx.arena.int(10);
    let low = fx.arena.int(1);
    let call = fx.arena.call_named("between", vec![("high", high), ("low", low)]);
    fx.symbols.add_callable(
        CallableSymbol::function(
            "between",
            vec![
                CallableParam::new("low", TypeId::INTEGER),
                CallableParam::new("high", TypeId::INTEGER),
            ],
            Some(TypeId::INTEGER),
            "Ranges.between",
        )
        .pure(),
    );
    let cx = fx.cx();
    let state = StaticState::new();

    let mut diagnostics = DiagnosticCollector::new("expr.jade");
    assert!(expr::validate(&cx, call, &state, &mut diagnostics));
    assert_eq!(expr::infer_type(&cx, call, &state), TypeId::INTEGER);
    assert_eq!(
        expr::compile(&cx, call, &state, &mut StatementBuffer::new()),
        "Ranges.between(1, 10)"
    );
    assert!(expr::is_without_side_effects(&cx, call, &state));
}

#[test]
fn test_call_argument_errors() {
    let mut fx = Fixture::new();
    let word = fx.arena.text_lit("x");
    let bad_type = fx.arena.call("twice", vec![word]);
    let one = fx.arena.int(1);
    let two = fx.arena.int(2);
    let wrong_arity = fx.arena.call("twice", vec![one, two]);
    fx.symbols.add_callable(CallableSymbol::function(
        "twice",
        vec![CallableParam::new("n", TypeId::INTEGER)],
        Some(TypeId::INTEGER),
        "Numbers.twice",
    ));
    let cx = fx.cx();
    let state = StaticState::new();

    let mut diagnostics = DiagnosticCollector::new("expr.jade");
    assert!(!expr::validate(&cx, bad_type, &state, &mut diagnostics));
    assert_eq!(diagnostics.count_code(DiagnosticCode::InvalidArgumentType), 1);

    let mut diagnostics = DiagnosticCollector::new("expr.jade");
    assert!(!expr::validate(&cx, wrong_arity, &state, &mut diagnostics));
    assert_eq!(diagnostics.count_code(DiagnosticCode::UnresolvedCall), 1);
    assert!(
        diagnostics.diagnostics()[0]
            .message_text
            .contains("twice(integer, integer)")
    );
    assert!(!expr::is_without_side_effects(&cx, bad_type, &state));
}

#[test]
fn test_placeholder_is_rejected_outside_patterns() {
    let mut fx = Fixture::new();
    let hole = fx.arena.placeholder();
    let cx = fx.cx();

    let mut diagnostics = DiagnosticCollector::new("expr.jade");
    assert!(!expr::validate(&cx, hole, &StaticState::new(), &mut diagnostics));
    assert_eq!(diagnostics.count_code(DiagnosticCode::PlaceholderOutsidePattern), 1);
}

#[test]
fn test_and_runs_later_operand_statements_only_after_earlier_operands() {
    // v is integer and t matches (x, v): the narrowed capture of `v` must
    // not be evaluated before the type test.
    let mut fx = Fixture::new();
    let v = fx.arena.intern("v");
    let t = fx.arena.intern("t");
    let tested = fx.arena.name("v");
    let integer = fx.arena.ty("integer");
    let is_integer = fx.arena.is_type(tested, integer);
    let scrutinee = fx.arena.name("t");
    let x_node = fx.arena.name("x");
    let v_node = fx.arena.name("v");
    let pattern = fx.arena.tuple(vec![x_node, v_node]);
    let matched = fx.arena.matches(scrutinee, pattern);
    let both = fx.arena.and(vec![is_integer, matched]);
    let pair = fx.types.tuple(vec![TypeId::INTEGER, TypeId::INTEGER]);
    let cx = fx.cx();
    let state = with_locals(&[(v, "v", TypeId::ANY), (t, "t", pair)]);

    let mut sink = StatementBuffer::new();
    let text = expr::compile(&cx, both, &state, &mut sink);
    assert_eq!(text, "(__cond0)");

    let statements = sink.statements();
    assert_eq!(statements.len(), 2);
    assert_eq!(statements[0], "boolean __cond0 = ((v instanceof java.lang.Integer));");
    assert!(!statements[0].contains("__captured_v"));
    assert!(statements[1].starts_with("if (__cond0) {"));
    let capture = statements[1].find("__pm0.__captured_v = ((java.lang.Integer) v);");
    let update = statements[1].find("__cond0 = __pm0.__pattern0(t);");
    assert!(capture.is_some() && update.is_some());
    assert!(capture < update);
}

#[test]
fn test_or_guards_later_operand_statements_on_false() {
    // not (v is integer) or t matches (x, v)
    let mut fx = Fixture::new();
    let v = fx.arena.intern("v");
    let t = fx.arena.intern("t");
    let tested = fx.arena.name("v");
    let integer = fx.arena.ty("integer");
    let is_integer = fx.arena.is_type(tested, integer);
    let not_integer = fx.arena.not(is_integer);
    let scrutinee = fx.arena.name("t");
    let x_node = fx.arena.name("x");
    let v_node = fx.arena.name("v");
    let pattern = fx.arena.tuple(vec![x_node, v_node]);
    let matched = fx.arena.matches(scrutinee, pattern);
    let either = fx.arena.or(vec![not_integer, matched]);
    let pair = fx.types.tuple(vec![TypeId::INTEGER, TypeId::INTEGER]);
    let cx = fx.cx();
    let state = with_locals(&[(v, "v", TypeId::ANY), (t, "t", pair)]);

    let mut sink = StatementBuffer::new();
    assert_eq!(expr::compile(&cx, either, &state, &mut sink), "(__cond0)");
    let statements = sink.statements();
    assert_eq!(statements[0], "boolean __cond0 = ((!(v instanceof java.lang.Integer)));");
    assert!(statements[1].starts_with("if (!__cond0) {"));
    assert!(statements[1].contains("__pm0.__captured_v = ((java.lang.Integer) v);"));
}

#[test]
fn test_ambiguous_call_lists_every_candidate_with_its_location() {
    // f(1) where both f(x as integer) and f(x as any) accept an integer.
    let mut fx = Fixture::new();
    let one = fx.arena.int(1);
    let call = fx.arena.call("f", vec![one]);
    fx.symbols.add_callable(
        CallableSymbol::function("f", vec![CallableParam::new("x", TypeId::INTEGER)], Some(TypeId::TEXT), "f")
            .with_span(Span::new(3, 4)),
    );
    fx.symbols.add_callable(
        CallableSymbol::function("f", vec![CallableParam::new("x", TypeId::ANY)], Some(TypeId::TEXT), "f")
            .with_span(Span::new(20, 21)),
    );
    let cx = fx.cx();
    let state = StaticState::new();

    let mut diagnostics = DiagnosticCollector::new("expr.jade");
    assert!(!expr::validate(&cx, call, &state, &mut diagnostics));
    assert_eq!(diagnostics.count_code(DiagnosticCode::AmbiguousCallResolution), 1);
    let diagnostic = &diagnostics.diagnostics()[0];
    assert!(diagnostic.message_text.starts_with("Ambiguous call to 'f'; candidates are: "));
    assert_eq!(diagnostic.related_information.len(), 2);
    assert!(diagnostic.related_information.iter().all(|r| r.file == "expr.jade"));
    assert_eq!(diagnostic.related_information[1].span, Span::new(20, 21));
    assert_eq!(expr::infer_type(&cx, call, &state), TypeId::ERROR);
}
