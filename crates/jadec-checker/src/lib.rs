//! Flow-sensitive type inference and pattern compilation.
//!
//! This crate is organized into several modules:
//! - `context` - `CheckerContext` shared by one unit's checks, and options
//! - `state` - persistent `StaticState` threaded through every check
//! - `symbols` - named/callable symbols and the `SymbolSearch` collaborator
//! - `expr` - expression semantics, one implementation per node kind
//! - `patterns` - pattern validation, typing and compilation
//! - `statements` - statement semantics and reachability
//! - `unit` - declarations, operations, handlers; `check_unit` / `compile_unit`
//! - `type_node` - resolution of written types
//! - `naming` - Java names derived from source names

pub mod context;
pub mod expr;
pub mod naming;
pub mod patterns;
pub mod state;
pub mod statements;
pub mod symbols;
pub mod type_node;
pub mod unit;

pub use context::{CheckerContext, CheckerOptions};
pub use patterns::{PatternMatchInput, PatternMatchOutput, PatternMode, PatternType};
pub use state::{ExpressionDescriptor, StaticState};
pub use statements::StatementChecker;
pub use symbols::{CallableKind, CallableParam, CallableSymbol, NamedSymbol, SymbolOrigin, SymbolSearch, SymbolTable};
pub use unit::{CompiledUnit, check_unit, compile_unit};
