//! Diagnostic types, the diagnostic code taxonomy and acceptors.
//!
//! Every validation operation reports through a `DiagnosticAcceptor` passed
//! down explicitly; nothing is buffered in module-level state. Codes are
//! short machine-readable keys (`InvalidArgumentType`,
//! `AmbiguousPatternResolution`, …) consumed by tooling outside the core.

use crate::span::Span;
use serde::Serialize;
use std::fmt;

// =============================================================================
// Diagnostic Types
// =============================================================================

/// Diagnostic category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Info = 2,
}

/// Machine-readable diagnostic taxonomy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    // Resolution
    UnresolvedName,
    UnresolvedCall,
    UnresolvedPattern,
    UnresolvedProperty,
    UnresolvedType,
    AmbiguousCallResolution,
    AmbiguousPatternResolution,
    // Typing
    InvalidArgumentType,
    InvalidOperandType,
    InvalidCondition,
    InvalidCast,
    TypeMismatch,
    ReturnTypeMismatch,
    MissingReturn,
    NotAssignable,
    InferredTopType,
    // Literals
    MapLiteralCannotComputeType,
    ListLiteralCannotComputeType,
    SetLiteralCannotComputeType,
    TupleTooBig,
    // Patterns
    InvalidPatternType,
    InvalidPatternTermsCount,
    InvalidMapKeyPattern,
    HoleNotAllowed,
    ImpurePattern,
    PlaceholderOutsidePattern,
    // Calls and declarations
    DuplicateArgumentName,
    MixedArgumentStyles,
    DuplicateDeclaration,
    CyclicSupertypeDeclaration,
    // Flow
    UnreachableCode,
}

impl DiagnosticCode {
    /// The taxonomy key as it appears in serialized output.
    pub const fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::UnresolvedName => "UnresolvedName",
            DiagnosticCode::UnresolvedCall => "UnresolvedCall",
            DiagnosticCode::UnresolvedPattern => "UnresolvedPattern",
            DiagnosticCode::UnresolvedProperty => "UnresolvedProperty",
            DiagnosticCode::UnresolvedType => "UnresolvedType",
            DiagnosticCode::AmbiguousCallResolution => "AmbiguousCallResolution",
            DiagnosticCode::AmbiguousPatternResolution => "AmbiguousPatternResolution",
            DiagnosticCode::InvalidArgumentType => "InvalidArgumentType",
            DiagnosticCode::InvalidOperandType => "InvalidOperandType",
            DiagnosticCode::InvalidCondition => "InvalidCondition",
            DiagnosticCode::InvalidCast => "InvalidCast",
            DiagnosticCode::TypeMismatch => "TypeMismatch",
            DiagnosticCode::ReturnTypeMismatch => "ReturnTypeMismatch",
            DiagnosticCode::MissingReturn => "MissingReturn",
            DiagnosticCode::NotAssignable => "NotAssignable",
            DiagnosticCode::InferredTopType => "InferredTopType",
            DiagnosticCode::MapLiteralCannotComputeType => "MapLiteralCannotComputeType",
            DiagnosticCode::ListLiteralCannotComputeType => "ListLiteralCannotComputeType",
            DiagnosticCode::SetLiteralCannotComputeType => "SetLiteralCannotComputeType",
            DiagnosticCode::TupleTooBig => "TupleTooBig",
            DiagnosticCode::InvalidPatternType => "InvalidPatternType",
            DiagnosticCode::InvalidPatternTermsCount => "InvalidPatternTermsCount",
            DiagnosticCode::InvalidMapKeyPattern => "InvalidMapKeyPattern",
            DiagnosticCode::HoleNotAllowed => "HoleNotAllowed",
            DiagnosticCode::ImpurePattern => "ImpurePattern",
            DiagnosticCode::PlaceholderOutsidePattern => "PlaceholderOutsidePattern",
            DiagnosticCode::DuplicateArgumentName => "DuplicateArgumentName",
            DiagnosticCode::MixedArgumentStyles => "MixedArgumentStyles",
            DiagnosticCode::DuplicateDeclaration => "DuplicateDeclaration",
            DiagnosticCode::CyclicSupertypeDeclaration => "CyclicSupertypeDeclaration",
            DiagnosticCode::UnreachableCode => "UnreachableCode",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Related information for a diagnostic (e.g., candidate declarations).
#[derive(Clone, Debug, Serialize)]
pub struct DiagnosticRelatedInformation {
    pub file: String,
    pub span: Span,
    pub message_text: String,
}

/// A validation diagnostic with optional related information.
#[derive(Clone, Debug, Serialize)]
pub struct Diagnostic {
    pub file: String,
    pub span: Span,
    pub message_text: String,
    pub category: DiagnosticCategory,
    pub code: DiagnosticCode,
    /// Name of the syntactic feature of the node the diagnostic points into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<&'static str>,
    /// Index inside a multi-valued feature (argument position, element …).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<DiagnosticRelatedInformation>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    #[must_use]
    pub fn error(span: Span, message: impl Into<String>, code: DiagnosticCode) -> Self {
        Self::new(DiagnosticCategory::Error, span, message.into(), code)
    }

    /// Create a new informational diagnostic.
    #[must_use]
    pub fn info(span: Span, message: impl Into<String>, code: DiagnosticCode) -> Self {
        Self::new(DiagnosticCategory::Info, span, message.into(), code)
    }

    const fn new(
        category: DiagnosticCategory,
        span: Span,
        message_text: String,
        code: DiagnosticCode,
    ) -> Self {
        Self {
            file: String::new(),
            span,
            message_text,
            category,
            code,
            feature: None,
            index: None,
            related_information: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_feature(mut self, feature: &'static str, index: Option<usize>) -> Self {
        self.feature = Some(feature);
        self.index = index;
        self
    }

    /// Add related information to this diagnostic.
    #[must_use]
    pub fn with_related(mut self, file: String, span: Span, message: String) -> Self {
        self.related_information.push(DiagnosticRelatedInformation {
            file,
            span,
            message_text: message,
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

/// Format a diagnostic message by replacing {0}, {1}, etc. with arguments.
#[must_use]
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{i}}}"), arg);
    }
    result
}

// =============================================================================
// Acceptors
// =============================================================================

/// Write-only sink for diagnostics, scoped to one traversal.
pub trait DiagnosticAcceptor {
    fn accept(&mut self, diagnostic: Diagnostic);

    fn accept_error(
        &mut self,
        message: String,
        span: Span,
        feature: Option<&'static str>,
        index: Option<usize>,
        code: DiagnosticCode,
    ) {
        let mut diagnostic = Diagnostic::error(span, message, code);
        diagnostic.feature = feature;
        diagnostic.index = index;
        self.accept(diagnostic);
    }

    fn accept_info(
        &mut self,
        message: String,
        span: Span,
        feature: Option<&'static str>,
        index: Option<usize>,
        code: DiagnosticCode,
    ) {
        let mut diagnostic = Diagnostic::info(span, message, code);
        diagnostic.feature = feature;
        diagnostic.index = index;
        self.accept(diagnostic);
    }
}

/// Acceptor that drops everything. Used when a result is computed only for
/// its value (e.g. validating a sub-expression speculatively).
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoringAcceptor;

impl DiagnosticAcceptor for IgnoringAcceptor {
    fn accept(&mut self, _diagnostic: Diagnostic) {}
}

/// Collects diagnostics for one compilation unit, stamping the file name.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticCollector {
    file: String,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            diagnostics: Vec::new(),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn count_code(&self, code: DiagnosticCode) -> usize {
        self.diagnostics.iter().filter(|d| d.code == code).count()
    }
}

impl DiagnosticAcceptor for DiagnosticCollector {
    fn accept(&mut self, mut diagnostic: Diagnostic) {
        if diagnostic.file.is_empty() {
            diagnostic.file = self.file.clone();
        }
        self.diagnostics.push(diagnostic);
    }
}

#[cfg(test)]
#[path = "../../tests/diagnostics_tests.rs"]
mod diagnostics_tests;
