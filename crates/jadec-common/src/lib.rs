//! Common types and utilities for the jadec compiler core.
//!
//! This crate provides foundational types used across all jadec crates:
//! - String interning (`Atom`, `Interner`)
//! - Source spans (`Span`)
//! - Diagnostics, the diagnostic code taxonomy and acceptors
//! - Compiler limits and thresholds

// String interning for identifier deduplication
pub mod interner;
pub use interner::{Atom, Interner};

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Centralized limits and thresholds
pub mod limits;

pub mod diagnostics;
pub use diagnostics::{
    Diagnostic, DiagnosticAcceptor, DiagnosticCategory, DiagnosticCode, DiagnosticCollector,
    DiagnosticRelatedInformation,
};
