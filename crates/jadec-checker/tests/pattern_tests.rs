//! Pattern validation, typing, state effects and compiled shape.

use jadec_ast::NodeArena;
use jadec_checker::patterns::{self, NarrowingOutcome, PatternMatchInput, PatternMode, PatternType};
use jadec_checker::symbols::CallableKind;
use jadec_checker::{
    CallableParam, CallableSymbol, CheckerContext, CheckerOptions, ExpressionDescriptor, NamedSymbol, StaticState,
    SymbolTable, expr,
};
use jadec_common::{DiagnosticCode, DiagnosticCollector, Span};
use jadec_emitter::StatementBuffer;
use jadec_solver::{DefKind, DefinitionInfo, TypeId, TypeInterner};

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
        self.cx_with(CheckerOptions::default())
    }

    fn cx_with(&self, options: CheckerOptions) -> CheckerContext<'_> {
        CheckerContext::new("patterns.jade", &self.arena, &self.types, &self.symbols, options)
    }

    /// `Point(x, y)` with integer coordinates; returns its type.
    fn declare_point(&self) -> TypeId {
        let (def, ty) = self
            .types
            .declare(DefinitionInfo::new("Point", DefKind::Concept, "Point"));
        self.symbols.add_callable(
            CallableSymbol {
                kind: CallableKind::Constructor {
                    def,
                    host_class: "Point".to_string(),
                    accessors: vec!["getX".to_string(), "getY".to_string()],
                },
                ..CallableSymbol::function(
                    "Point",
                    vec![
                        CallableParam::new("x", TypeId::INTEGER),
                        CallableParam::new("y", TypeId::INTEGER),
                    ],
                    Some(ty),
                    "Point",
                )
            }
            .pure(),
        );
        ty
    }
}

#[test]
fn test_tuple_pattern_binds_free_names_and_compares_ground_terms() {
    // (x, 2) against (integer, integer)
    let mut fx = Fixture::new();
    let x = fx.arena.intern("x");
    let x_node = fx.arena.name("x");
    let two = fx.arena.int(2);
    let pattern = fx.arena.tuple(vec![x_node, two]);
    let cx = fx.cx();
    let provided = fx.types.tuple(vec![TypeId::INTEGER, TypeId::INTEGER]);
    let input = PatternMatchInput::root(&cx, pattern, PatternMode::boolean_expression(), provided);
    let state = StaticState::new();

    let mut diagnostics = DiagnosticCollector::new("patterns.jade");
    let validated = patterns::validate_pattern(&cx, &input, &state, &mut diagnostics);
    assert!(validated.result);
    assert!(diagnostics.diagnostics().is_empty());
    assert_eq!(validated.solved_type, provided);
    assert_eq!(validated.unification.declared(), vec![(x, TypeId::INTEGER)]);
    assert_eq!(validated.narrowing, NarrowingOutcome::None);

    let mut sink = StatementBuffer::new();
    let compiled = patterns::compile_pattern(&cx, &input, &state, &mut sink);
    assert_eq!(compiled.result.call("t"), "__pm0.__pattern0(t)");

    let members = sink.members();
    assert_eq!(members.len(), 2);
    let holder = &members[0];
    assert!(holder.starts_with("private class __Pattern0 {"));
    assert!(holder.contains("public java.lang.Integer x;"));
    assert!(holder.contains("public boolean __pattern0_0(java.lang.Object __objx) {"));
    assert!(holder.contains("x = (java.lang.Integer) __objx;"));
    assert!(holder.contains("if (__objx instanceof jadescript.util.types.Tuple2) {"));
    assert!(holder.contains("return __x.getLength()==2 && __pattern0_0(__x.get(0)) && __x.get(1)==2;"));
    assert_eq!(members[1], "private final __Pattern0 __pm0 = new __Pattern0();");
    assert!(sink.statements().is_empty());
}

#[test]
fn test_successful_match_declares_bindings_read_from_the_holder() {
    let mut fx = Fixture::new();
    let t = fx.arena.intern("t");
    let x = fx.arena.intern("x");
    let scrutinee = fx.arena.name("t");
    let x_node = fx.arena.name("x");
    let two = fx.arena.int(2);
    let pattern = fx.arena.tuple(vec![x_node, two]);
    let test = fx.arena.matches(scrutinee, pattern);
    let cx = fx.cx();
    let provided = fx.types.tuple(vec![TypeId::TEXT, TypeId::INTEGER]);
    let state = StaticState::new().assert_named_symbol(t, NamedSymbol::local("t", provided));

    let mut diagnostics = DiagnosticCollector::new("patterns.jade");
    assert!(expr::validate(&cx, test, &state, &mut diagnostics));

    let matched = expr::assert_returned_true(&cx, test, &state);
    let binding = matched.search_name(x).expect("x is bound after the match");
    assert_eq!(binding.type_id, TypeId::TEXT);
    assert_eq!(binding.compiled_name, "__pm0.x");
    assert!(!binding.mutable);

    assert!(!expr::assert_returned_false(&cx, test, &state).is_bound(x));
    assert_eq!(
        expr::compile(&cx, test, &state, &mut StatementBuffer::new()),
        "__pm0.__pattern0(t)"
    );
}

#[test]
fn test_tuple_pattern_arity_must_match() {
    let mut fx = Fixture::new();
    let terms: Vec<_> = ["a", "b", "c"].iter().map(|n| fx.arena.name(n)).collect();
    let pattern = fx.arena.tuple(terms);
    let cx = fx.cx();
    let provided = fx.types.tuple(vec![TypeId::INTEGER, TypeId::INTEGER]);
    let input = PatternMatchInput::root(&cx, pattern, PatternMode::boolean_expression(), provided);

    let mut diagnostics = DiagnosticCollector::new("patterns.jade");
    assert!(!patterns::validate_pattern(&cx, &input, &StaticState::new(), &mut diagnostics).result);
    assert_eq!(diagnostics.count_code(DiagnosticCode::InvalidPatternTermsCount), 1);
}

#[test]
fn test_ground_pattern_of_unrelated_type_is_rejected() {
    let mut fx = Fixture::new();
    let pattern = fx.arena.text_lit("a");
    let cx = fx.cx();
    let input = PatternMatchInput::root(&cx, pattern, PatternMode::boolean_expression(), TypeId::INTEGER);

    let mut diagnostics = DiagnosticCollector::new("patterns.jade");
    assert!(!patterns::validate_pattern(&cx, &input, &StaticState::new(), &mut diagnostics).result);
    assert_eq!(diagnostics.count_code(DiagnosticCode::InvalidPatternType), 1);
}

#[test]
fn test_set_elements_and_map_keys_must_be_ground() {
    let mut fx = Fixture::new();
    let element = fx.arena.name("e");
    let set = fx.arena.set(vec![element], None, None);
    let key = fx.arena.name("k");
    let value = fx.arena.int(1);
    let map = fx.arena.map(vec![(key, value)], None, None);
    let cx = fx.cx();
    let state = StaticState::new();
    let mode = PatternMode::boolean_expression();

    let mut diagnostics = DiagnosticCollector::new("patterns.jade");
    let set_input = PatternMatchInput::root(&cx, set, mode, fx.types.set(TypeId::INTEGER));
    assert!(!patterns::validate_pattern(&cx, &set_input, &state, &mut diagnostics).result);
    let map_input = PatternMatchInput::root(&cx, map, mode, fx.types.map(TypeId::TEXT, TypeId::INTEGER));
    assert!(!patterns::validate_pattern(&cx, &map_input, &state, &mut diagnostics).result);

    assert_eq!(diagnostics.count_code(DiagnosticCode::HoleNotAllowed), 1);
    assert_eq!(diagnostics.count_code(DiagnosticCode::InvalidMapKeyPattern), 1);
}

#[test]
fn test_list_pattern_with_rest_binds_the_tail() {
    let mut fx = Fixture::new();
    let head = fx.arena.intern("head");
    let tail = fx.arena.intern("tail");
    let head_node = fx.arena.name("head");
    let tail_node = fx.arena.name("tail");
    let pattern = fx.arena.list(vec![head_node], Some(tail_node), None);
    let cx = fx.cx();
    let provided = fx.types.list(TypeId::TEXT);
    let input = PatternMatchInput::root(&cx, pattern, PatternMode::statement_guard(), provided);
    let state = StaticState::new();

    let output = patterns::probe_pattern(&cx, &input, &state);
    assert_eq!(output.solved_type, provided);
    assert_eq!(
        output.unification.declared(),
        vec![(head, TypeId::TEXT), (tail, provided)]
    );

    let mut sink = StatementBuffer::new();
    patterns::compile_pattern(&cx, &input, &state, &mut sink);
    let holder = &sink.members()[0];
    assert!(holder.contains("__x.size()>=1"));
    assert!(holder.contains("__pattern0_1(__x.subList(1, __x.size()))"));
}

#[test]
fn test_functional_pattern_deconstructs_and_narrows() {
    // Point(px, 0) against any
    let mut fx = Fixture::new();
    let v = fx.arena.intern("v");
    let px = fx.arena.intern("px");
    let px_node = fx.arena.name("px");
    let zero = fx.arena.int(0);
    let pattern = fx.arena.call("Point", vec![px_node, zero]);
    let point = fx.declare_point();
    let cx = fx.cx();
    let input = PatternMatchInput::root(&cx, pattern, PatternMode::statement_guard(), TypeId::ANY);
    let state = StaticState::new().assert_named_symbol(v, NamedSymbol::local("v", TypeId::ANY));

    let mut diagnostics = DiagnosticCollector::new("patterns.jade");
    let validated = patterns::validate_pattern(&cx, &input, &state, &mut diagnostics);
    assert!(validated.result, "{:?}", diagnostics.diagnostics());
    assert_eq!(validated.solved_type, point);
    assert_eq!(validated.narrowing, NarrowingOutcome::Narrows(point));

    let matched = patterns::assert_did_match(&cx, &input, Some(ExpressionDescriptor::name(v)), &state);
    assert_eq!(matched.flow_type_of(&ExpressionDescriptor::name(v)), Some(point));
    assert_eq!(matched.search_name(px).map(|s| s.type_id), Some(TypeId::INTEGER));

    let mut sink = StatementBuffer::new();
    patterns::compile_pattern(&cx, &input, &state, &mut sink);
    let holder = &sink.members()[0];
    assert!(holder.contains("if (__objx instanceof Point) {"));
    assert!(holder.contains("return __pattern0_0(__x.getX()) && __x.getY()==0;"));
}

#[test]
fn test_functional_pattern_errors() {
    let mut fx = Fixture::new();
    let a = fx.arena.name("a");
    let unknown = fx.arena.call("Nope", vec![a]);
    let b = fx.arena.name("b");
    let short = fx.arena.call("Point", vec![b]);
    fx.declare_point();
    let cx = fx.cx();
    let state = StaticState::new();
    let mode = PatternMode::boolean_expression();

    let mut diagnostics = DiagnosticCollector::new("patterns.jade");
    let input = PatternMatchInput::root(&cx, unknown, mode, TypeId::ANY);
    assert!(!patterns::validate_pattern(&cx, &input, &state, &mut diagnostics).result);
    assert_eq!(diagnostics.count_code(DiagnosticCode::UnresolvedPattern), 1);

    let mut diagnostics = DiagnosticCollector::new("patterns.jade");
    let input = PatternMatchInput::root(&cx, short, mode, TypeId::ANY);
    assert!(!patterns::validate_pattern(&cx, &input, &state, &mut diagnostics).result);
    assert_eq!(diagnostics.count_code(DiagnosticCode::InvalidPatternTermsCount), 1);
}

#[test]
fn test_impure_ground_terms_depend_on_the_mode() {
    let mut fx = Fixture::new();
    let roll = fx.arena.call("roll", vec![]);
    let x = fx.arena.name("x");
    let pattern = fx.arena.tuple(vec![x, roll]);
    fx.symbols
        .add_callable(CallableSymbol::function("roll", vec![], Some(TypeId::INTEGER), "Dice.roll"));
    let provided = fx.types.tuple(vec![TypeId::INTEGER, TypeId::INTEGER]);
    let state = StaticState::new();

    let cx = fx.cx();
    let mut diagnostics = DiagnosticCollector::new("patterns.jade");
    let input = PatternMatchInput::root(&cx, pattern, PatternMode::boolean_expression(), provided);
    assert!(patterns::validate_pattern(&cx, &input, &state, &mut diagnostics).result);
    let input = PatternMatchInput::root(&cx, pattern, PatternMode::handler_header(), provided);
    assert!(!patterns::validate_pattern(&cx, &input, &state, &mut diagnostics).result);
    assert_eq!(diagnostics.count_code(DiagnosticCode::ImpurePattern), 1);

    let strict = fx.cx_with(CheckerOptions::default().apply_strict_defaults());
    let mut diagnostics = DiagnosticCollector::new("patterns.jade");
    let mode = PatternMode::boolean_expression().with_options(&strict.options);
    let input = PatternMatchInput::root(&strict, pattern, mode, provided);
    assert!(!patterns::validate_pattern(&strict, &input, &state, &mut diagnostics).result);
    assert_eq!(diagnostics.count_code(DiagnosticCode::ImpurePattern), 1);
}

#[test]
fn test_pattern_type_depends_on_holes() {
    let mut fx = Fixture::new();
    let ground = fx.arena.int(2);
    let x = fx.arena.name("x");
    let holed = fx.arena.tuple(vec![x, ground]);
    let cx = fx.cx();
    let state = StaticState::new();
    let mode = PatternMode::boolean_expression();

    let simple = patterns::infer_pattern_type(&cx, ground, mode, &state);
    assert!(!simple.is_holed());
    assert_eq!(simple.solve(TypeId::TEXT), TypeId::INTEGER);

    let pattern_type = patterns::infer_pattern_type(&cx, holed, mode, &state);
    assert!(matches!(pattern_type, PatternType::Holed(_)));
    let input = fx.types.tuple(vec![TypeId::TEXT, TypeId::INTEGER]);
    assert_eq!(pattern_type.solve(input), input);
}

#[test]
fn test_captured_locals_are_copied_into_the_holder() {
    let mut fx = Fixture::new();
    let limit = fx.arena.intern("limit");
    let x = fx.arena.name("x");
    let read = fx.arena.name("limit");
    let pattern = fx.arena.tuple(vec![x, read]);
    let cx = fx.cx();
    let provided = fx.types.tuple(vec![TypeId::INTEGER, TypeId::INTEGER]);
    let input = PatternMatchInput::root(&cx, pattern, PatternMode::boolean_expression(), provided);
    let state = StaticState::new().assert_named_symbol(limit, NamedSymbol::local("limit", TypeId::INTEGER));

    let mut sink = StatementBuffer::new();
    patterns::compile_pattern(&cx, &input, &state, &mut sink);
    assert!(sink.members()[0].contains("public java.lang.Integer __captured_limit;"));
    assert_eq!(sink.statements(), ["__pm0.__captured_limit = limit;"]);
}

#[test]
fn test_holder_is_emitted_once_per_root() {
    let mut fx = Fixture::new();
    let x = fx.arena.name("x");
    let pattern = fx.arena.tuple(vec![x]);
    let cx = fx.cx();
    let provided = fx.types.tuple(vec![TypeId::TEXT]);
    let input = PatternMatchInput::root(&cx, pattern, PatternMode::boolean_expression(), provided);
    let state = StaticState::new();

    let mut sink = StatementBuffer::new();
    patterns::compile_pattern(&cx, &input, &state, &mut sink);
    patterns::compile_pattern(&cx, &input, &state, &mut sink);
    assert_eq!(sink.members().len(), 2);
}

#[test]
fn test_ambiguous_deconstructor_lists_every_candidate() {
    // Shape(r) where two declared types both offer a one-term `Shape`.
    let mut fx = Fixture::new();
    let r = fx.arena.name("r");
    let pattern = fx.arena.call("Shape", vec![r]);
    for (i, host) in ["Circle", "Square"].into_iter().enumerate() {
        let (def, ty) = fx.types.declare(DefinitionInfo::new(host, DefKind::Concept, host));
        let start = 10 * i as u32;
        fx.symbols.add_callable(
            CallableSymbol {
                kind: CallableKind::Constructor {
                    def,
                    host_class: host.to_string(),
                    accessors: vec!["getSize".to_string()],
                },
                ..CallableSymbol::function("Shape", vec![CallableParam::new("size", TypeId::INTEGER)], Some(ty), host)
            }
            .pure()
            .with_span(Span::new(start, start + 5)),
        );
    }
    let cx = fx.cx();
    let input = PatternMatchInput::root(&cx, pattern, PatternMode::boolean_expression(), TypeId::ANY);
    let state = StaticState::new();

    let mut diagnostics = DiagnosticCollector::new("patterns.jade");
    let validated = patterns::validate_pattern(&cx, &input, &state, &mut diagnostics);
    assert!(!validated.result);
    assert_eq!(diagnostics.count_code(DiagnosticCode::AmbiguousPatternResolution), 1);
    let diagnostic = &diagnostics.diagnostics()[0];
    assert!(diagnostic.message_text.starts_with("Ambiguous pattern 'Shape'; candidates are: "));
    assert_eq!(diagnostic.message_text.matches("Shape(size as integer)").count(), 2);
    let related: Vec<Span> = diagnostic.related_information.iter().map(|r| r.span).collect();
    assert_eq!(related, [Span::new(0, 5), Span::new(10, 15)]);

    let mut sink = StatementBuffer::new();
    patterns::compile_pattern(&cx, &input, &state, &mut sink);
    assert!(sink.members()[0].contains("return false;"));
}
