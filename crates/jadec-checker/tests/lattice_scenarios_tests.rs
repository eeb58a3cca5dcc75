//! Least upper bounds as they surface through the checker: collection
//! element types and the join of `if` branches.

use jadec_ast::{Block, NodeArena};
use jadec_checker::expr;
use jadec_checker::{CheckerContext, CheckerOptions, ExpressionDescriptor, NamedSymbol, StatementChecker, StaticState, SymbolTable};
use jadec_common::{DiagnosticCategory, DiagnosticCode, DiagnosticCollector};
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

    fn cx(&self, options: CheckerOptions) -> CheckerContext<'_> {
        CheckerContext::new("lattice.jade", &self.arena, &self.types, &self.symbols, options)
    }
}

#[test]
fn test_numeric_elements_meet_at_real() {
    let mut fx = Fixture::new();
    let one = fx.arena.int(1);
    let half = fx.arena.real(2.5);
    let list = fx.arena.list(vec![one, half], None, None);
    let cx = fx.cx(CheckerOptions::default());
    let state = StaticState::new();

    let mut diagnostics = DiagnosticCollector::new("lattice.jade");
    assert!(expr::validate(&cx, list, &state, &mut diagnostics));
    assert!(diagnostics.diagnostics().is_empty());

    let ty = expr::infer_type(&cx, list, &state);
    assert_eq!(ty, fx.types.list(TypeId::REAL));
    assert_eq!(cx.format_type(ty), "list of real");
}

#[test]
fn test_unrelated_elements_meet_at_any_with_a_note() {
    let mut fx = Fixture::new();
    let one = fx.arena.int(1);
    let word = fx.arena.text_lit("one");
    let list = fx.arena.list(vec![one, word], None, None);
    let cx = fx.cx(CheckerOptions::default());
    let state = StaticState::new();

    let mut diagnostics = DiagnosticCollector::new("lattice.jade");
    assert!(expr::validate(&cx, list, &state, &mut diagnostics));
    assert!(!diagnostics.has_errors());
    assert_eq!(diagnostics.count_code(DiagnosticCode::InferredTopType), 1);

    let info = &diagnostics.diagnostics()[0];
    assert_eq!(info.category, DiagnosticCategory::Info);
    assert!(info.message_text.starts_with("Element type inferred as 'any'"));
    assert!(info.message_text.contains("integer"));
    assert!(info.message_text.contains("text"));

    assert_eq!(expr::infer_type(&cx, list, &state), fx.types.list(TypeId::ANY));
}

#[test]
fn test_inferred_top_note_can_be_silenced() {
    let mut fx = Fixture::new();
    let one = fx.arena.int(1);
    let yes = fx.arena.boolean(true);
    let set = fx.arena.set(vec![one, yes], None, None);
    let options = CheckerOptions {
        report_inferred_top: false,
        ..CheckerOptions::default()
    };
    let cx = fx.cx(options);

    let mut diagnostics = DiagnosticCollector::new("lattice.jade");
    assert!(expr::validate(&cx, set, &StaticState::new(), &mut diagnostics));
    assert!(diagnostics.diagnostics().is_empty());
}

#[test]
fn test_if_branches_join_narrowed_types_at_their_bound() {
    // if v is integer { } else if v is real { } else { return }
    let mut fx = Fixture::new();
    let v = fx.arena.intern("v");
    let integer = fx.arena.ty("integer");
    let real = fx.arena.ty("real");
    let v1 = fx.arena.name("v");
    let is_integer = fx.arena.is_type(v1, integer);
    let v2 = fx.arena.name("v");
    let is_real = fx.arena.is_type(v2, real);
    let leave = fx.arena.return_stmt(None);
    let stmt = fx.arena.if_stmt(
        vec![(is_integer, Block::new(vec![])), (is_real, Block::new(vec![]))],
        Some(Block::new(vec![leave])),
    );
    let cx = fx.cx(CheckerOptions::default());
    let state = StaticState::new().assert_named_symbol(v, NamedSymbol::local("v", TypeId::ANY));

    let checker = StatementChecker::new(&cx, None);
    let mut diagnostics = DiagnosticCollector::new("lattice.jade");
    assert!(checker.validate(stmt, &state, &mut diagnostics));

    let after = checker.advance(stmt, &state);
    assert!(after.is_valid());
    assert_eq!(after.flow_type_of(&ExpressionDescriptor::name(v)), Some(TypeId::REAL));
}

#[test]
fn test_if_without_else_keeps_the_declared_type() {
    let mut fx = Fixture::new();
    let v = fx.arena.intern("v");
    let text = fx.arena.ty("text");
    let operand = fx.arena.name("v");
    let is_text = fx.arena.is_type(operand, text);
    let stmt = fx.arena.if_stmt(vec![(is_text, Block::new(vec![]))], None);
    let cx = fx.cx(CheckerOptions::default());
    let state = StaticState::new().assert_named_symbol(v, NamedSymbol::local("v", TypeId::ANY));

    let after = StatementChecker::new(&cx, None).advance(stmt, &state);
    assert_eq!(after.flow_type_of(&ExpressionDescriptor::name(v)), None);
    assert_eq!(after.search_name(v).map(|s| s.type_id), Some(TypeId::ANY));
}
