//! Type model for the jadec compiler core.
//!
//! - **Interning**: structural `TypeData` behind dense `TypeId` handles, so
//!   type equality is id equality
//! - **Nominal declarations**: a `DefinitionStore` with a cycle-free
//!   supertype graph and Java host classes
//! - **Relations**: `compare` / `SubtypeChecker` with per-constructor variance
//! - **Lattice**: total, commutative `lub` / `glb` with explanatory notes
mod category;
pub mod def;
mod format;
pub mod hierarchy;
pub mod host;
mod intern;
pub mod lattice;
pub mod relations;
pub mod types;

pub use category::{TypeCategory, category};
pub use def::{DefId, DefKind, DefinitionError, DefinitionInfo, DefinitionStore, PropertyInfo};
pub use format::{TypeFormatter, format_type};
pub use hierarchy::{AllSupertypes, all_supertypes, direct_supertypes};
pub use intern::{TypeDatabase, TypeInterner};
pub use lattice::{LatticeBound, TypeLattice, glb, glb_explained, lub, lub_explained};
pub use relations::{
    RelationshipRequirement, SubtypeChecker, TypeRelationship, compare, is_subtype_of,
};
pub use types::{ConstructorKey, IntrinsicKind, TypeData, TypeId, Variance};

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod intern_tests;
