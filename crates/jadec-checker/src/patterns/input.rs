//! The input of one pattern (or sub-pattern) match.

use super::mode::PatternMode;
use crate::context::CheckerContext;
use jadec_ast::NodeIndex;
use jadec_solver::TypeId;

/// A pattern, what it is matched against, and under which mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternMatchInput {
    pub pattern: NodeIndex,
    /// Unique within the unit: the root number followed by the term path,
    /// e.g. `3_0_1`.
    pub id: String,
    pub mode: PatternMode,
    /// Static type of the matched value.
    pub provided_type: TypeId,
    /// Number of the root pattern, shared by all its terms.
    pub root: u32,
}

impl PatternMatchInput {
    /// Input of the root pattern `pattern`.
    pub fn root(cx: &CheckerContext<'_>, pattern: NodeIndex, mode: PatternMode, provided_type: TypeId) -> Self {
        let root = cx.pattern_root_id(pattern);
        Self {
            pattern,
            id: root.to_string(),
            mode,
            provided_type,
            root,
        }
    }

    /// Input of the term at `index`, matched against `provided_type`.
    pub fn term(&self, index: usize, pattern: NodeIndex, provided_type: TypeId) -> Self {
        Self {
            pattern,
            id: format!("{}_{index}", self.id),
            mode: self.mode.sub_pattern(),
            provided_type,
            root: self.root,
        }
    }

    /// Same path, different mode (map keys, set elements).
    #[must_use]
    pub fn with_mode(mut self, mode: PatternMode) -> Self {
        self.mode = mode;
        self
    }

    /// Java method testing this term.
    pub fn method_name(&self) -> String {
        format!("__pattern{}", self.id)
    }

    /// Class holding the root's bindings and procedures.
    pub fn holder_class(&self) -> String {
        format!("__Pattern{}", self.root)
    }

    /// Member instance of the holder class.
    pub fn root_name(&self) -> String {
        format!("__pm{}", self.root)
    }

    /// Java expression reading the field bound to `name`.
    pub fn binding(&self, name: &str) -> String {
        format!("{}.{name}", self.root_name())
    }
}
