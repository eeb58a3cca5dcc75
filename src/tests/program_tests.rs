use crate::program::{
    ComparisonSyntax, CompositeType, ExprSyntax, ProgramFile, StmtSyntax, TypeSyntax, lower,
    parse_program,
};
use jadec_ast::{ExprKind, OperationKind, StmtKind, TypeExpr};
use jadec_checker::{CheckerOptions, check_unit, compile_unit};
use jadec_common::DiagnosticCode;

const IDENTITY: &str = r#"
{
  "name": "clean",
  "operations": [
    {
      "kind": "function",
      "name": "identity",
      "params": [{ "name": "x", "type": "integer" }],
      "returns": "integer",
      "body": [{ "return": { "name": "x" } }]
    }
  ]
}
"#;

fn lowered(source: &str) -> jadec_ast::SourceUnit {
    let program = parse_program(source).expect("program should decode");
    lower(&program, "fallback")
}

#[test]
fn decodes_keyword_and_composite_types() {
    let named: TypeSyntax = serde_json::from_str(r#""integer""#).unwrap();
    assert_eq!(named, TypeSyntax::Named("integer".to_string()));

    let map: TypeSyntax = serde_json::from_str(r#"{ "map": ["text", { "list": "integer" }] }"#).unwrap();
    let TypeSyntax::Composite(composite) = map else {
        panic!("expected a composite type");
    };
    assert_eq!(
        *composite,
        CompositeType::Map(
            TypeSyntax::Named("text".to_string()),
            TypeSyntax::Composite(Box::new(CompositeType::List(TypeSyntax::Named(
                "integer".to_string()
            )))),
        )
    );
}

#[test]
fn decodes_operators_by_symbol() {
    let expr: ExprSyntax = serde_json::from_str(
        r#"{ "compare": { "op": "<=", "left": { "int": 1 }, "right": { "name": "x" } } }"#,
    )
    .unwrap();
    let ExprSyntax::Compare { op, .. } = expr else {
        panic!("expected a comparison");
    };
    assert_eq!(op, ComparisonSyntax::LessOrEqual);
}

#[test]
fn decodes_placeholder_and_bare_return() {
    let stmt: StmtSyntax = serde_json::from_str(r#"{ "return": null }"#).unwrap();
    assert_eq!(stmt, StmtSyntax::Return(None));
    let hole: ExprSyntax = serde_json::from_str(r#""placeholder""#).unwrap();
    assert_eq!(hole, ExprSyntax::Placeholder);
}

#[test]
fn rejects_unknown_expression_kinds() {
    let result = parse_program(r#"{ "globals": [{ "name": "X", "value": { "bogus": 1 } }] }"#);
    assert!(result.is_err());
}

#[test]
fn lowered_unit_checks_cleanly() {
    let unit = lowered(IDENTITY);
    assert_eq!(unit.name, "clean");
    assert_eq!(unit.operations.len(), 1);
    assert_eq!(unit.operations[0].kind, OperationKind::Function);
    assert!(check_unit(&unit, &CheckerOptions::default()).is_empty());

    let compiled = compile_unit(&unit, &CheckerOptions::default());
    assert_eq!(compiled.class_name, "Clean");
    assert!(compiled.java_source.contains("return x;"));
}

#[test]
fn unnamed_program_takes_the_fallback_name() {
    let program: ProgramFile = serde_json::from_str("{}").unwrap();
    let unit = lower(&program, "agents");
    assert_eq!(unit.name, "agents");
    assert!(unit.types.is_empty());
}

#[test]
fn lowering_preserves_statement_structure() {
    let unit = lowered(
        r#"{
          "operations": [{
            "kind": "procedure",
            "name": "p",
            "params": [{ "name": "flag", "type": "boolean" }],
            "body": [
              { "declare": { "name": "n", "type": "integer", "value": { "int": 0 } } },
              { "if": { "branches": [{ "condition": { "name": "flag" },
                                       "body": [{ "assign": { "target": { "name": "n" },
                                                              "value": { "int": 1 } } }] }],
                        "else": [] } }
            ]
          }]
        }"#,
    );
    let body = &unit.operations[0].body.statements;
    assert_eq!(body.len(), 2);
    let declaration = unit.arena.stmt(body[0]).map(|s| &s.kind);
    assert!(matches!(
        declaration,
        Some(StmtKind::Declaration { ty: Some(TypeExpr::Named { .. }), init: Some(_), .. })
    ));
    let Some(StmtKind::If { branches, otherwise }) = unit.arena.stmt(body[1]).map(|s| &s.kind) else {
        panic!("expected an if statement");
    };
    assert_eq!(branches.len(), 1);
    assert!(otherwise.as_ref().is_some_and(|block| block.statements.is_empty()));
    assert!(check_unit(&unit, &CheckerOptions::default()).is_empty());
}

#[test]
fn calls_keep_positional_then_named_arguments() {
    let unit = lowered(
        r#"{
          "globals": [{ "name": "P", "value": { "call": {
            "callee": "Point",
            "args": [{ "int": 1 }],
            "named": [{ "name": "y", "value": { "int": 2 } }]
          } } }]
        }"#,
    );
    let Some(ExprKind::Call { callee, args }) = unit.arena.kind(unit.globals[0].value) else {
        panic!("expected a call");
    };
    assert_eq!(unit.arena.text(*callee), "Point");
    assert_eq!(args.len(), 2);
    assert!(args[0].name.is_none());
    assert_eq!(args[1].name.map(|name| unit.arena.text(name)), Some("y"));
}

#[test]
fn lowered_fallthrough_is_reported_by_the_checker() {
    let unit = lowered(
        r#"{
          "operations": [{
            "kind": "function",
            "name": "f",
            "params": [{ "name": "x", "type": "integer" }],
            "returns": "integer",
            "body": [{ "declare": { "name": "y", "value": { "name": "x" } } }]
          }]
        }"#,
    );
    let diagnostics = check_unit(&unit, &CheckerOptions::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, DiagnosticCode::MissingReturn);
}
