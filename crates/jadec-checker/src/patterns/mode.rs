//! Pattern match modes: what a pattern may contain and what matching it
//! does to the static state, per syntactic location.

use crate::context::CheckerOptions;
use jadec_solver::RelationshipRequirement;

/// Which holes a pattern may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HolesPolicy {
    MustBeGround,
    /// `_` is allowed, free variables are not.
    AcceptsNonVarHolesOnly,
    AcceptsAnyHole,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Purity {
    PureRequired,
    ImpureAllowed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unification {
    WithVariableDeclaration,
    WithoutVariableDeclaration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Narrowing {
    DoesNarrow,
    DoesNotNarrow,
}

/// Where a pattern appears.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatternLocation {
    /// `e matches p`
    BooleanExpression,
    /// `when e matches p do`
    StatementGuard,
    /// `on inform p do`
    HandlerHeader,
    /// `(a, b) = e`
    AssignedExpressionRoot,
    SubPattern,
}

/// Policy bundle governing one pattern match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PatternMode {
    pub holes: HolesPolicy,
    /// Required relationship of the pattern's type to the input type.
    pub requirement: RelationshipRequirement,
    pub purity: Purity,
    pub unification: Unification,
    pub narrowing: Narrowing,
    pub location: PatternLocation,
    /// Set under an assignment root: every name is a hole.
    pub within_assignment: bool,
}

impl PatternMode {
    const fn declaring(location: PatternLocation, purity: Purity) -> Self {
        Self {
            holes: HolesPolicy::AcceptsAnyHole,
            requirement: RelationshipRequirement::Related,
            purity,
            unification: Unification::WithVariableDeclaration,
            narrowing: Narrowing::DoesNarrow,
            location,
            within_assignment: false,
        }
    }

    pub const fn boolean_expression() -> Self {
        Self::declaring(PatternLocation::BooleanExpression, Purity::ImpureAllowed)
    }

    pub const fn statement_guard() -> Self {
        Self::declaring(PatternLocation::StatementGuard, Purity::ImpureAllowed)
    }

    pub const fn handler_header() -> Self {
        Self::declaring(PatternLocation::HandlerHeader, Purity::PureRequired)
    }

    pub const fn assignment_root() -> Self {
        Self {
            requirement: RelationshipRequirement::SupertypeOrEqual,
            narrowing: Narrowing::DoesNotNarrow,
            within_assignment: true,
            ..Self::declaring(PatternLocation::AssignedExpressionRoot, Purity::ImpureAllowed)
        }
    }

    /// Mode of a term of a pattern in this mode.
    #[must_use]
    pub const fn sub_pattern(self) -> Self {
        Self {
            location: PatternLocation::SubPattern,
            requirement: if self.within_assignment {
                RelationshipRequirement::SupertypeOrEqual
            } else {
                RelationshipRequirement::Related
            },
            ..self
        }
    }

    #[must_use]
    pub const fn with_holes(self, holes: HolesPolicy) -> Self {
        Self { holes, ..self }
    }

    #[must_use]
    pub const fn with_unification(self, unification: Unification) -> Self {
        Self {
            unification,
            ..self
        }
    }

    /// Apply unit-wide options: `strict_purity` requires pure patterns
    /// everywhere.
    #[must_use]
    pub fn with_options(self, options: &CheckerOptions) -> Self {
        if options.strict_purity {
            Self {
                purity: Purity::PureRequired,
                ..self
            }
        } else {
            self
        }
    }

    pub const fn declares(self) -> bool {
        matches!(self.unification, Unification::WithVariableDeclaration)
    }

    pub const fn narrows(self) -> bool {
        matches!(self.narrowing, Narrowing::DoesNarrow)
    }

    pub const fn requires_purity(self) -> bool {
        matches!(self.purity, Purity::PureRequired)
    }
}
