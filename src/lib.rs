//! jadec: type checking and Java compilation of JADE agent programs.
//!
//! The semantic core lives in the workspace crates and is re-exported here:
//! - [`jadec_common`] - atoms, spans and diagnostics
//! - [`jadec_ast`] - syntax arena and declarations
//! - [`jadec_solver`] - the type lattice
//! - [`jadec_emitter`] - Java source building
//! - [`jadec_checker`] - inference, patterns and unit compilation
//!
//! This crate adds the JSON program format, the CLI and tracing setup.

pub mod cli;
pub mod program;
pub mod tracing_config;

pub use jadec_ast as ast;
pub use jadec_checker as checker;
pub use jadec_common as common;
pub use jadec_emitter as emitter;
pub use jadec_solver as solver;

pub use jadec_checker::{CheckerOptions, CompiledUnit, check_unit, compile_unit};
pub use jadec_common::{Diagnostic, DiagnosticCategory, DiagnosticCode};
pub use program::load_program;
