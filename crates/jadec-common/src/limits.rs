//! Centralized limits and thresholds for the compiler core.
//!
//! # Categories
//!
//! - **Language limits**: hard caps the language imposes (tuple arity)
//! - **Recursion depths**: limits that keep recursive walks off the stack edge
//! - **Operation counts**: limits that keep iterative walks finite

// =============================================================================
// Language Limits
// =============================================================================

/// Maximum number of elements of a tuple type or tuple literal.
///
/// The Java runtime ships `Tuple1` … `Tuple20`; a tuple literal with more
/// elements is reported as `TupleTooBig` and compiled to a degraded
/// expression.
///
/// ```text
/// t = (1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21)
/// //  ~~~ TupleTooBig
/// ```
pub const MAX_TUPLE_ARITY: usize = 20;

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum depth for expression type inference and validation.
///
/// Each nested sub-expression adds a few frames; past this depth the
/// dispatcher returns the error type instead of recursing further.
pub const MAX_EXPR_CHECK_DEPTH: u32 = 500;

/// Maximum nesting depth of sub-patterns.
///
/// Deeper pattern trees are compiled to a failing placeholder.
pub const MAX_PATTERN_DEPTH: u32 = 64;

// =============================================================================
// Operation Count Limits
// =============================================================================

/// Maximum number of supertypes visited by a single breadth-first walk.
///
/// Declared supertype graphs are acyclic (cycles are rejected at declaration
/// time) and every walk keeps a visited set, so this only guards against
/// pathological DAG fan-out.
pub const MAX_SUPERTYPE_WALK: usize = 4096;
