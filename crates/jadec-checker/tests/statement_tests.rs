//! Statements: declarations, assignments, control flow and reachability.

use jadec_ast::{Block, NodeArena};
use jadec_checker::{
    CallableParam, CallableSymbol, CheckerContext, CheckerOptions, ExpressionDescriptor, NamedSymbol,
    StatementChecker, StaticState, SymbolTable,
};
use jadec_common::{DiagnosticCategory, DiagnosticCode, DiagnosticCollector};
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
        CheckerContext::new("statements.jade", &self.arena, &self.types, &self.symbols, CheckerOptions::default())
    }
}

fn collector() -> DiagnosticCollector {
    DiagnosticCollector::new("statements.jade")
}

#[test]
fn test_declarations_compile_to_typed_locals() {
    let mut fx = Fixture::new();
    let integer = fx.arena.ty("integer");
    let one = fx.arena.int(1);
    let with_init = fx.arena.declare("x", Some(integer), Some(one));
    let text = fx.arena.ty("text");
    let without_init = fx.arena.declare("s", Some(text), None);
    let body = Block::new(vec![with_init, without_init]);
    let cx = fx.cx();
    let checker = StatementChecker::new(&cx, None);
    let state = StaticState::new();

    let mut diagnostics = collector();
    assert!(checker.validate_block(&body, &state, &mut diagnostics).0);

    let mut sink = StatementBuffer::new();
    checker.compile_block(&body, &state, &mut sink);
    assert_eq!(sink.statements(), ["java.lang.Integer x = 1;", "java.lang.String s = \"\";"]);
}

#[test]
fn test_declaration_binds_the_name_in_the_current_scope() {
    let mut fx = Fixture::new();
    let x = fx.arena.intern("x");
    let value = fx.arena.real(1.5);
    let stmt = fx.arena.declare("x", None, Some(value));
    let cx = fx.cx();

    let after = StatementChecker::new(&cx, None).advance(stmt, &StaticState::new());
    assert!(after.is_bound_in_current_scope(x));
    assert_eq!(after.search_name(x).map(|s| s.type_id), Some(TypeId::REAL));
}

#[test]
fn test_redeclaration_is_reported() {
    let mut fx = Fixture::new();
    let one = fx.arena.int(1);
    let first = fx.arena.declare("x", None, Some(one));
    let two = fx.arena.int(2);
    let second = fx.arena.declare("x", None, Some(two));
    let body = Block::new(vec![first, second]);
    let cx = fx.cx();

    let mut diagnostics = collector();
    let (ok, _) = StatementChecker::new(&cx, None).validate_block(&body, &StaticState::new(), &mut diagnostics);
    assert!(!ok);
    assert_eq!(diagnostics.count_code(DiagnosticCode::DuplicateDeclaration), 1);
    assert_eq!(diagnostics.diagnostics()[0].message_text, "'x' is already declared");
}

#[test]
fn test_initializer_must_fit_the_declared_type() {
    let mut fx = Fixture::new();
    let integer = fx.arena.ty("integer");
    let word = fx.arena.text_lit("a");
    let stmt = fx.arena.declare("x", Some(integer), Some(word));
    let cx = fx.cx();

    let mut diagnostics = collector();
    assert!(!StatementChecker::new(&cx, None).validate(stmt, &StaticState::new(), &mut diagnostics));
    assert_eq!(diagnostics.count_code(DiagnosticCode::TypeMismatch), 1);
    assert_eq!(
        diagnostics.diagnostics()[0].message_text,
        "Cannot initialize 'x' of type 'integer' with a value of type 'text'"
    );
}

#[test]
fn test_declared_supertype_keeps_the_written_type_as_a_fact() {
    let mut fx = Fixture::new();
    let x = fx.arena.intern("x");
    let real = fx.arena.ty("real");
    let one = fx.arena.int(1);
    let stmt = fx.arena.declare("x", Some(real), Some(one));
    let cx = fx.cx();

    let after = StatementChecker::new(&cx, None).advance(stmt, &StaticState::new());
    assert_eq!(after.search_name(x).map(|s| s.type_id), Some(TypeId::REAL));
    assert_eq!(after.flow_type_of(&ExpressionDescriptor::name(x)), Some(TypeId::INTEGER));
}

#[test]
fn test_assignment_to_a_bound_name_reuses_it() {
    let mut fx = Fixture::new();
    let flag = fx.arena.intern("flag");
    let target = fx.arena.name("flag");
    let value = fx.arena.boolean(false);
    let stmt = fx.arena.assign(target, value);
    let cx = fx.cx();
    let state = StaticState::new().assert_named_symbol(flag, NamedSymbol::local("flag", TypeId::BOOLEAN));

    let mut sink = StatementBuffer::new();
    StatementChecker::new(&cx, None).compile(stmt, &state, &mut sink);
    assert_eq!(sink.statements(), ["flag = false;"]);
}

#[test]
fn test_return_checks_against_the_enclosing_function() {
    let mut fx = Fixture::new();
    let word = fx.arena.text_lit("a");
    let wrong_value = fx.arena.return_stmt(Some(word));
    let no_value = fx.arena.return_stmt(None);
    let one = fx.arena.int(1);
    let from_procedure = fx.arena.return_stmt(Some(one));
    let cx = fx.cx();
    let state = StaticState::new();

    let function = StatementChecker::new(&cx, Some(TypeId::INTEGER));
    let procedure = StatementChecker::new(&cx, None);

    let mut diagnostics = collector();
    assert!(!function.validate(wrong_value, &state, &mut diagnostics));
    assert!(!function.validate(no_value, &state, &mut diagnostics));
    assert!(!procedure.validate(from_procedure, &state, &mut diagnostics));
    assert!(procedure.validate(no_value, &state, &mut diagnostics));

    let messages: Vec<&str> = diagnostics
        .diagnostics()
        .iter()
        .map(|d| d.message_text.as_str())
        .collect();
    assert_eq!(
        messages,
        [
            "Cannot return a value of type 'text' from a function returning 'integer'",
            "A function returning 'integer' must return a value",
            "Procedures and handlers cannot return a value",
        ]
    );
    assert_eq!(diagnostics.count_code(DiagnosticCode::ReturnTypeMismatch), 3);
}

#[test]
fn test_statements_after_leaving_are_reported_once_and_dropped() {
    let mut fx = Fixture::new();
    let leave = fx.arena.return_stmt(None);
    let one = fx.arena.int(1);
    let dead = fx.arena.declare("x", None, Some(one));
    let two = fx.arena.int(2);
    let also_dead = fx.arena.declare("y", None, Some(two));
    let body = Block::new(vec![leave, dead, also_dead]);
    let cx = fx.cx();
    let checker = StatementChecker::new(&cx, None);
    let state = StaticState::new();

    let mut diagnostics = collector();
    let (ok, exit) = checker.validate_block(&body, &state, &mut diagnostics);
    assert!(ok);
    assert!(!exit.is_valid());
    assert_eq!(diagnostics.diagnostics().len(), 1);
    let info = &diagnostics.diagnostics()[0];
    assert_eq!(info.category, DiagnosticCategory::Info);
    assert_eq!(info.code, DiagnosticCode::UnreachableCode);
    assert_eq!(info.message_text, "Unreachable code");

    let mut sink = StatementBuffer::new();
    checker.compile_block(&body, &state, &mut sink);
    assert_eq!(sink.statements(), ["return;"]);
}

#[test]
fn test_unreachable_note_can_be_disabled() {
    let mut fx = Fixture::new();
    let leave = fx.arena.return_stmt(None);
    let one = fx.arena.int(1);
    let dead = fx.arena.declare("x", None, Some(one));
    let body = Block::new(vec![leave, dead]);
    let options = CheckerOptions {
        report_unreachable_code: false,
        ..CheckerOptions::default()
    };
    let cx = CheckerContext::new("statements.jade", &fx.arena, &fx.types, &fx.symbols, options);

    let mut diagnostics = collector();
    StatementChecker::new(&cx, None).validate_block(&body, &StaticState::new(), &mut diagnostics);
    assert!(diagnostics.diagnostics().is_empty());
}

#[test]
fn test_throw_and_fail_leave_the_operation() {
    let mut fx = Fixture::new();
    let message = fx.arena.text_lit("boom");
    let throw = fx.arena.throw_stmt(message);
    let reason = fx.arena.text_lit("gave up");
    let fail = fx.arena.fail_stmt(reason);
    let cx = fx.cx();
    let checker = StatementChecker::new(&cx, None);
    let state = StaticState::new();

    assert!(!checker.advance(throw, &state).is_valid());
    assert!(!checker.advance(fail, &state).is_valid());

    let mut sink = StatementBuffer::new();
    checker.compile(throw, &state, &mut sink);
    checker.compile(fail, &state, &mut sink);
    assert_eq!(
        sink.statements(),
        [
            "throw new jadescript.core.exception.JadescriptException(\"boom\");",
            "throw new jadescript.core.exception.BehaviourFailure(\"gave up\");",
        ]
    );
}

#[test]
fn test_if_condition_must_be_boolean() {
    let mut fx = Fixture::new();
    let one = fx.arena.int(1);
    let stmt = fx.arena.if_stmt(vec![(one, Block::new(vec![]))], None);
    let cx = fx.cx();

    let mut diagnostics = collector();
    assert!(!StatementChecker::new(&cx, None).validate(stmt, &StaticState::new(), &mut diagnostics));
    assert_eq!(diagnostics.count_code(DiagnosticCode::InvalidCondition), 1);
}

#[test]
fn test_if_branch_sees_the_narrowed_type() {
    // if v is integer { n = v }
    let mut fx = Fixture::new();
    let v = fx.arena.intern("v");
    let integer = fx.arena.ty("integer");
    let operand = fx.arena.name("v");
    let test = fx.arena.is_type(operand, integer);
    let read = fx.arena.name("v");
    let n = fx.arena.name("n");
    let body = fx.arena.assign(n, read);
    let stmt = fx.arena.if_stmt(vec![(test, Block::new(vec![body]))], None);
    let cx = fx.cx();
    let state = StaticState::new().assert_named_symbol(v, NamedSymbol::local("v", TypeId::ANY));
    let checker = StatementChecker::new(&cx, None);

    let mut diagnostics = collector();
    assert!(checker.validate(stmt, &state, &mut diagnostics));

    let mut sink = StatementBuffer::new();
    checker.compile(stmt, &state, &mut sink);
    let compiled = &sink.statements()[0];
    assert!(compiled.starts_with("if ((v instanceof java.lang.Integer)) {"));
    assert!(compiled.contains("java.lang.Integer n = ((java.lang.Integer) v);"));
}

#[test]
fn test_else_if_chain_renders_in_order() {
    let mut fx = Fixture::new();
    let a = fx.arena.intern("a");
    let first = fx.arena.name("a");
    let second = fx.arena.not(first);
    let condition = fx.arena.name("a");
    let one = fx.arena.int(1);
    let x1 = fx.arena.declare("x", None, Some(one));
    let two = fx.arena.int(2);
    let x2 = fx.arena.declare("x", None, Some(two));
    let three = fx.arena.int(3);
    let x3 = fx.arena.declare("x", None, Some(three));
    let stmt = fx.arena.if_stmt(
        vec![(condition, Block::new(vec![x1])), (second, Block::new(vec![x2]))],
        Some(Block::new(vec![x3])),
    );
    let cx = fx.cx();
    let state = StaticState::new().assert_named_symbol(a, NamedSymbol::local("a", TypeId::BOOLEAN));

    let mut sink = StatementBuffer::new();
    StatementChecker::new(&cx, None).compile(stmt, &state, &mut sink);
    assert_eq!(sink.statements().len(), 1);
    let compiled = &sink.statements()[0];
    let if_at = compiled.find("if (a) {").expect("first branch");
    let else_if_at = compiled.find("} else if ((!a)) {").expect("second branch");
    let else_at = compiled.find("} else {").expect("otherwise");
    assert!(if_at < else_if_at && else_if_at < else_at);
    assert!(compiled.contains("java.lang.Integer x = 3;"));
}

#[test]
fn test_while_compiles_its_condition_and_body() {
    let mut fx = Fixture::new();
    let flag = fx.arena.intern("flag");
    let condition = fx.arena.name("flag");
    let target = fx.arena.name("flag");
    let value = fx.arena.boolean(false);
    let reset = fx.arena.assign(target, value);
    let stmt = fx.arena.while_stmt(condition, Block::new(vec![reset]));
    let cx = fx.cx();
    let state = StaticState::new().assert_named_symbol(flag, NamedSymbol::local("flag", TypeId::BOOLEAN));
    let checker = StatementChecker::new(&cx, None);

    let mut diagnostics = collector();
    assert!(checker.validate(stmt, &state, &mut diagnostics));

    let mut sink = StatementBuffer::new();
    checker.compile(stmt, &state, &mut sink);
    let compiled = &sink.statements()[0];
    assert!(compiled.starts_with("while (flag) {"));
    assert!(compiled.contains("flag = false;"));
    assert!(checker.advance(stmt, &state).is_valid());
}

#[test]
fn test_when_matches_binds_pattern_variables_in_its_branch() {
    // when t matches (x, 2) do n = x
    let mut fx = Fixture::new();
    let t = fx.arena.intern("t");
    let scrutinee = fx.arena.name("t");
    let x = fx.arena.name("x");
    let two = fx.arena.int(2);
    let pattern = fx.arena.tuple(vec![x, two]);
    let n = fx.arena.name("n");
    let read = fx.arena.name("x");
    let body = fx.arena.assign(n, read);
    let stmt = fx.arena.when_matches(scrutinee, vec![(pattern, Block::new(vec![body]))], None);
    let cx = fx.cx();
    let provided = fx.types.tuple(vec![TypeId::TEXT, TypeId::INTEGER]);
    let state = StaticState::new().assert_named_symbol(t, NamedSymbol::local("t", provided));
    let checker = StatementChecker::new(&cx, None);

    let mut diagnostics = collector();
    assert!(checker.validate(stmt, &state, &mut diagnostics), "{:?}", diagnostics.diagnostics());

    let mut sink = StatementBuffer::new();
    checker.compile(stmt, &state, &mut sink);
    let statements = sink.statements();
    assert_eq!(
        statements[0],
        "final jadescript.util.types.Tuple2<java.lang.String, java.lang.Integer> __when0 = t;"
    );
    assert!(statements[1].starts_with("if (__pm0.__pattern0(__when0)) {"));
    assert!(statements[1].contains("java.lang.String n = __pm0.x;"));
    assert_eq!(sink.members()[1], "private final __Pattern0 __pm0 = new __Pattern0();");
}

#[test]
fn test_when_with_invalid_scrutinee_still_checks_every_branch() {
    // when undeclared matches (x, 2) do y: integer = "a"
    let mut fx = Fixture::new();
    let scrutinee = fx.arena.name("undeclared");
    let x = fx.arena.name("x");
    let two = fx.arena.int(2);
    let pattern = fx.arena.tuple(vec![x, two]);
    let integer = fx.arena.ty("integer");
    let word = fx.arena.text_lit("a");
    let body = fx.arena.declare("y", Some(integer), Some(word));
    let stmt = fx.arena.when_matches(scrutinee, vec![(pattern, Block::new(vec![body]))], None);
    let cx = fx.cx();
    let state = StaticState::new();
    let checker = StatementChecker::new(&cx, None);

    let mut diagnostics = collector();
    assert!(!checker.validate(stmt, &state, &mut diagnostics));
    assert_eq!(diagnostics.count_code(DiagnosticCode::UnresolvedName), 1);
    assert_eq!(diagnostics.count_code(DiagnosticCode::TypeMismatch), 1);
    let validated = cx.take_pattern_visits();

    checker.compile(stmt, &state, &mut StatementBuffer::new());
    assert_eq!(validated, ["0", "0_0", "0_1"]);
    assert_eq!(validated, cx.take_pattern_visits());
}

#[test]
fn test_deconstructing_assignment_declares_the_names() {
    // (a, b) = pair
    let mut fx = Fixture::new();
    let pair = fx.arena.intern("pair");
    let a = fx.arena.intern("a");
    let b = fx.arena.intern("b");
    let a_node = fx.arena.name("a");
    let b_node = fx.arena.name("b");
    let target = fx.arena.tuple(vec![a_node, b_node]);
    let value = fx.arena.name("pair");
    let stmt = fx.arena.assign(target, value);
    let cx = fx.cx();
    let pair_type = fx.types.tuple(vec![TypeId::INTEGER, TypeId::TEXT]);
    let state = StaticState::new().assert_named_symbol(pair, NamedSymbol::local("pair", pair_type));
    let checker = StatementChecker::new(&cx, None);

    let mut diagnostics = collector();
    assert!(checker.validate(stmt, &state, &mut diagnostics), "{:?}", diagnostics.diagnostics());

    let after = checker.advance(stmt, &state);
    assert_eq!(after.search_name(a).map(|s| s.type_id), Some(TypeId::INTEGER));
    assert_eq!(after.search_name(b).map(|s| s.type_id), Some(TypeId::TEXT));

    let mut sink = StatementBuffer::new();
    checker.compile(stmt, &state, &mut sink);
    let statements = sink.statements();
    assert!(statements[0].starts_with("if (!__pm0.__pattern0(pair)) {"));
    assert!(statements[0].contains("throw new jadescript.core.exception.JadescriptException(\"Deconstruction failed\");"));
    assert_eq!(statements[1], "java.lang.Integer a = __pm0.a;");
    assert_eq!(statements[2], "java.lang.String b = __pm0.b;");
}

#[test]
fn test_procedure_call_is_an_expression_statement() {
    let mut fx = Fixture::new();
    let message = fx.arena.text_lit("hello");
    let call = fx.arena.call("log", vec![message]);
    let stmt = fx.arena.expr_stmt(call);
    fx.symbols.add_callable(CallableSymbol::function(
        "log",
        vec![CallableParam::new("message", TypeId::TEXT)],
        None,
        "Log.write",
    ));
    let cx = fx.cx();
    let checker = StatementChecker::new(&cx, None);
    let state = StaticState::new();

    let mut diagnostics = collector();
    assert!(checker.validate(stmt, &state, &mut diagnostics));

    let mut sink = StatementBuffer::new();
    checker.compile(stmt, &state, &mut sink);
    assert_eq!(sink.statements(), ["Log.write(\"hello\");"]);
}
