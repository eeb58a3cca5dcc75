//! JSON Program Format
//!
//! The CLI reads compilation units as JSON documents describing the syntax
//! tree; [`load_program`] decodes one and [`lower`] builds the arena-backed
//! `SourceUnit` the checker consumes.
//!
//! ```json
//! {
//!   "name": "geometry",
//!   "types": [{ "kind": "concept", "name": "Point",
//!               "properties": [{ "name": "x", "type": "integer" }] }],
//!   "operations": [{ "kind": "function", "name": "origin", "returns": "Point",
//!                    "body": [{ "return": { "call": { "callee": "Point",
//!                                                     "args": [{ "int": 0 }] } } }] }],
//!   "handlers": [{ "performative": "inform",
//!                  "content": { "call": { "callee": "Point", "args": [{ "name": "px" }] } },
//!                  "body": [] }]
//! }
//! ```
//!
//! Types are written as a keyword or declared name (`"integer"`), or as a
//! one-key object: `{"list": T}`, `{"set": T}`, `{"map": [K, V]}`,
//! `{"tuple": [..]}`, `{"message": T}`, `{"function": {"params": [..],
//! "result": T}}`.

mod lower;

pub use lower::lower;

use anyhow::{Context, Result};
use jadec_ast::SourceUnit;
use serde::Deserialize;
use std::path::Path;

/// A written type.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TypeSyntax {
    Named(String),
    Composite(Box<CompositeType>),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompositeType {
    List(TypeSyntax),
    Set(TypeSyntax),
    Map(TypeSyntax, TypeSyntax),
    Tuple(Vec<TypeSyntax>),
    Message(TypeSyntax),
    Function {
        #[serde(default)]
        params: Vec<TypeSyntax>,
        result: TypeSyntax,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum ComparisonSyntax {
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum ArithmeticSyntax {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Modulo,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NamedArgument {
    pub name: String,
    pub value: ExprSyntax,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TypedName {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeSyntax,
}

/// An expression, or a pattern in pattern positions.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExprSyntax {
    Int(i64),
    Real(f64),
    Bool(bool),
    Text(String),
    Name(String),
    /// `_`
    Placeholder,
    Paren(Box<ExprSyntax>),
    Property {
        target: Box<ExprSyntax>,
        name: String,
    },
    And(Vec<ExprSyntax>),
    Or(Vec<ExprSyntax>),
    Not(Box<ExprSyntax>),
    Compare {
        op: ComparisonSyntax,
        left: Box<ExprSyntax>,
        right: Box<ExprSyntax>,
    },
    Arith {
        op: ArithmeticSyntax,
        left: Box<ExprSyntax>,
        right: Box<ExprSyntax>,
    },
    Negate(Box<ExprSyntax>),
    Is {
        operand: Box<ExprSyntax>,
        #[serde(rename = "type")]
        ty: TypeSyntax,
    },
    As {
        operand: Box<ExprSyntax>,
        #[serde(rename = "type")]
        ty: TypeSyntax,
    },
    /// Positional `args` or `named` arguments; mixing is reported by the
    /// checker.
    Call {
        callee: String,
        #[serde(default)]
        args: Vec<ExprSyntax>,
        #[serde(default)]
        named: Vec<NamedArgument>,
    },
    Tuple(Vec<ExprSyntax>),
    List {
        #[serde(default)]
        elements: Vec<ExprSyntax>,
        #[serde(default)]
        rest: Option<Box<ExprSyntax>>,
        #[serde(default)]
        of: Option<TypeSyntax>,
    },
    Set {
        #[serde(default)]
        elements: Vec<ExprSyntax>,
        #[serde(default)]
        rest: Option<Box<ExprSyntax>>,
        #[serde(default)]
        of: Option<TypeSyntax>,
    },
    Map {
        #[serde(default)]
        entries: Vec<(ExprSyntax, ExprSyntax)>,
        #[serde(default)]
        rest: Option<Box<ExprSyntax>>,
        #[serde(default)]
        of: Option<(TypeSyntax, TypeSyntax)>,
    },
    Matches {
        value: Box<ExprSyntax>,
        pattern: Box<ExprSyntax>,
    },
    Lambda {
        #[serde(default)]
        params: Vec<TypedName>,
        body: Box<ExprSyntax>,
    },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BranchSyntax<H> {
    #[serde(alias = "condition", alias = "pattern")]
    pub head: H,
    #[serde(default)]
    pub body: Vec<StmtSyntax>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StmtSyntax {
    Declare {
        name: String,
        #[serde(default, rename = "type")]
        ty: Option<TypeSyntax>,
        #[serde(default)]
        value: Option<ExprSyntax>,
    },
    Assign {
        target: ExprSyntax,
        value: ExprSyntax,
    },
    If {
        branches: Vec<BranchSyntax<ExprSyntax>>,
        #[serde(default, rename = "else")]
        otherwise: Option<Vec<StmtSyntax>>,
    },
    When {
        value: ExprSyntax,
        branches: Vec<BranchSyntax<ExprSyntax>>,
        #[serde(default, rename = "else")]
        otherwise: Option<Vec<StmtSyntax>>,
    },
    While {
        condition: ExprSyntax,
        #[serde(default)]
        body: Vec<StmtSyntax>,
    },
    Return(Option<ExprSyntax>),
    Throw(ExprSyntax),
    Fail(ExprSyntax),
    Expr(ExprSyntax),
    Block(Vec<StmtSyntax>),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TypeKindSyntax {
    #[default]
    Concept,
    Predicate,
    Action,
    Agent,
    Behaviour,
    Record,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDeclSyntax {
    #[serde(default)]
    pub kind: TypeKindSyntax,
    pub name: String,
    #[serde(default)]
    pub extends: Vec<String>,
    #[serde(default)]
    pub properties: Vec<TypedName>,
    #[serde(default)]
    pub host_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeTypeSyntax {
    pub name: String,
    pub class_name: String,
    #[serde(default)]
    pub extends: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct GlobalSyntax {
    pub name: String,
    #[serde(default, rename = "type")]
    pub ty: Option<TypeSyntax>,
    pub value: ExprSyntax,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKindSyntax {
    Function,
    Procedure,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct OperationSyntax {
    pub kind: OperationKindSyntax,
    pub name: String,
    #[serde(default)]
    pub params: Vec<TypedName>,
    #[serde(default)]
    pub returns: Option<TypeSyntax>,
    #[serde(default)]
    pub pure: bool,
    #[serde(default)]
    pub body: Vec<StmtSyntax>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct HandlerSyntax {
    pub performative: String,
    #[serde(default)]
    pub content: Option<ExprSyntax>,
    #[serde(default)]
    pub guard: Option<ExprSyntax>,
    #[serde(default)]
    pub body: Vec<StmtSyntax>,
}

/// One compilation unit as written in a program file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramFile {
    /// Defaults to the file stem.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDeclSyntax>,
    #[serde(default)]
    pub native_types: Vec<NativeTypeSyntax>,
    #[serde(default)]
    pub globals: Vec<GlobalSyntax>,
    #[serde(default)]
    pub operations: Vec<OperationSyntax>,
    #[serde(default)]
    pub handlers: Vec<HandlerSyntax>,
}

pub fn parse_program(source: &str) -> Result<ProgramFile> {
    serde_json::from_str(source).context("failed to decode program")
}

/// Read and lower the program file at `path`.
pub fn load_program(path: &Path) -> Result<SourceUnit> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read program: {}", path.display()))?;
    let program: ProgramFile = serde_json::from_str(&source)
        .with_context(|| format!("failed to parse program: {}", path.display()))?;
    let fallback = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unit".to_string());
    Ok(lower(&program, &fallback))
}
