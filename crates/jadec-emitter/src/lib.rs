//! Java emission for the jadec compiler core.
//!
//! The semantic core produces Java as opaque text fragments. This crate
//! provides the sinks those fragments are pushed into and the writer that
//! lays them out as source:
//! - `sink` - `EmissionSink`, `StatementBuffer`, `DiscardingSink`
//! - `writer` - indentation-aware `SourceWriter`
//! - `java` - method/class renderers and literal escaping

pub mod java;
pub mod sink;
pub mod writer;

pub use java::{JavaClass, JavaMethod, block, java_string_literal};
pub use sink::{DiscardingSink, EmissionSink, StatementBuffer};
pub use writer::SourceWriter;
