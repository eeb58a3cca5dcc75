//! Compilation Units
//!
//! Checks and compiles one `SourceUnit`. The unit owns its type interner and
//! symbol table; one `CheckerContext` is shared by every phase so pattern
//! and lambda numbers agree between validation and compilation.
//!
//! ## Phases
//! 1. Type declarations: ids first, then supertypes, properties and
//!    constructors (see `declarations.rs`).
//! 2. Operation signatures, then global constants, in declaration order.
//! 3. Operation and handler bodies (see `bodies.rs`).
//! 4. `compile_unit` only: the Java class, rendered even when errors were
//!    reported.

mod bodies;
mod declarations;

use crate::context::{CheckerContext, CheckerOptions};
use crate::naming::unit_class_name;
use crate::symbols::SymbolTable;
use jadec_ast::SourceUnit;
use jadec_common::diagnostics::{Diagnostic, DiagnosticCollector};
use jadec_emitter::JavaClass;
use jadec_solver::TypeInterner;
use tracing::{Level, debug, span};

pub use declarations::{Declarations, OperationSignature};

/// Result of compiling one unit.
#[derive(Clone, Debug)]
pub struct CompiledUnit {
    pub class_name: String,
    pub java_source: String,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledUnit {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

/// Validate `unit`; returns every diagnostic, errors and infos.
pub fn check_unit(unit: &SourceUnit, options: &CheckerOptions) -> Vec<Diagnostic> {
    run(unit, options, false).diagnostics
}

/// Validate and compile `unit` to one Java class.
pub fn compile_unit(unit: &SourceUnit, options: &CheckerOptions) -> CompiledUnit {
    run(unit, options, true)
}

fn run(unit: &SourceUnit, options: &CheckerOptions, compile: bool) -> CompiledUnit {
    let _span = span!(Level::DEBUG, "unit", name = %unit.name).entered();
    let types = TypeInterner::new();
    let symbols = SymbolTable::new();
    let cx = CheckerContext::new(unit.name.clone(), &unit.arena, &types, &symbols, options.clone());
    let mut collector = DiagnosticCollector::new(unit.name.clone());

    let declarations = Declarations::register(&cx, &symbols, unit, &mut collector);
    bodies::validate(&cx, unit, &declarations, &mut collector);
    debug!(
        diagnostics = collector.diagnostics().len(),
        errors = collector.has_errors(),
        "validated unit"
    );

    let class_name = unit_class_name(&options.unit_class_prefix, &unit.name);
    let java_source = if compile {
        let mut class = JavaClass::new("public", class_name.clone());
        for member in declarations.type_classes(&cx, unit) {
            class.member(member);
        }
        for member in bodies::compile(&cx, unit, &declarations) {
            class.member(member);
        }
        debug!(class = %class_name, members = class.members.len(), "compiled unit");
        class.render()
    } else {
        String::new()
    };

    CompiledUnit {
        class_name,
        java_source,
        diagnostics: collector.into_diagnostics(),
    }
}
