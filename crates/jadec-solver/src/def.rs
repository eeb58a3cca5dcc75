//! Definition identifiers and storage for nominal types.
//!
//! Nominal types (`concept`, `agent`, `record`, `native`, …) are interned as
//! `TypeData::Nominal(DefId)` / `TypeData::Host(DefId)`. The `DefId` points
//! into a `DefinitionStore` holding the declaration's name, kind, supertypes,
//! properties and Java host class.
//!
//! Declarations are registered in two steps so that a unit can mention types
//! before they are declared: `register` allocates the id, `set_supertypes`
//! links it into the graph and rejects cycles.

use crate::types::TypeId;
use jadec_common::limits::MAX_SUPERTYPE_WALK;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

// =============================================================================
// DefId
// =============================================================================

/// Solver-owned definition identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(pub u32);

/// Declaration keyword of a nominal type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefKind {
    Concept,
    Predicate,
    Action,
    Agent,
    Behaviour,
    Record,
    /// Opaque Java class.
    Native,
}

impl DefKind {
    /// Ontology element kinds share the ontology host hierarchy.
    pub const fn is_ontology_element(self) -> bool {
        matches!(self, DefKind::Concept | DefKind::Predicate | DefKind::Action)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyInfo {
    pub name: String,
    pub type_id: TypeId,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, type_id: TypeId) -> Self {
        Self {
            name: name.into(),
            type_id,
        }
    }
}

/// Everything the solver knows about one nominal declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinitionInfo {
    pub name: String,
    pub kind: DefKind,
    /// Direct supertypes, in declaration order.
    pub supertypes: Vec<DefId>,
    /// Own properties, in declaration order.
    pub properties: Vec<PropertyInfo>,
    /// Fully qualified Java class.
    pub host_name: String,
    /// Java classes this class is assignable to, besides those of its
    /// declared supertypes.
    pub host_supertypes: Vec<String>,
}

impl DefinitionInfo {
    pub fn new(name: impl Into<String>, kind: DefKind, host_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            supertypes: Vec::new(),
            properties: Vec::new(),
            host_name: host_name.into(),
            host_supertypes: Vec::new(),
        }
    }

    pub fn with_properties(mut self, properties: Vec<PropertyInfo>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_host_supertypes(mut self, host_supertypes: Vec<String>) -> Self {
        self.host_supertypes = host_supertypes;
        self
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Failure to link a declaration into the supertype graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefinitionError {
    /// The id does not belong to this store.
    UnknownDefinition(DefId),
    /// Adding `supertype` above `declaration` would close a cycle.
    CyclicSupertype {
        declaration: String,
        supertype: String,
    },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionError::UnknownDefinition(id) => write!(f, "unknown definition {}", id.0),
            DefinitionError::CyclicSupertype {
                declaration,
                supertype,
            } => write!(
                f,
                "'{declaration}' cannot extend '{supertype}': the supertype graph would contain a cycle"
            ),
        }
    }
}

impl std::error::Error for DefinitionError {}

// =============================================================================
// DefinitionStore
// =============================================================================

/// Storage for nominal declarations.
///
/// Interior mutability keeps the whole solver API on `&self`; one store
/// belongs to one compilation unit.
#[derive(Debug, Default)]
pub struct DefinitionStore {
    defs: RefCell<Vec<Rc<DefinitionInfo>>>,
    by_name: RefCell<FxHashMap<String, DefId>>,
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for `info`. Supertypes listed in `info` are ignored;
    /// link them with `set_supertypes`.
    pub fn register(&self, mut info: DefinitionInfo) -> DefId {
        info.supertypes.clear();
        let mut defs = self.defs.borrow_mut();
        let id = DefId(defs.len() as u32);
        trace!(def = id.0, name = %info.name, "register definition");
        self.by_name.borrow_mut().insert(info.name.clone(), id);
        defs.push(Rc::new(info));
        id
    }

    pub fn get(&self, id: DefId) -> Option<Rc<DefinitionInfo>> {
        self.defs.borrow().get(id.0 as usize).cloned()
    }

    pub fn find_by_name(&self, name: &str) -> Option<DefId> {
        self.by_name.borrow().get(name).copied()
    }

    /// The declaration whose Java class is `class_name`.
    pub fn find_by_host_name(&self, class_name: &str) -> Option<DefId> {
        self.defs
            .borrow()
            .iter()
            .position(|d| d.host_name == class_name)
            .map(|i| DefId(i as u32))
    }

    pub fn len(&self) -> usize {
        self.defs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.borrow().is_empty()
    }

    pub fn name(&self, id: DefId) -> String {
        self.get(id)
            .map_or_else(|| format!("<def {}>", id.0), |d| d.name.clone())
    }

    /// Link `id` below `supertypes`.
    ///
    /// Rejects the whole list when any entry would close a cycle (including
    /// `id` extending itself); the declaration is then left without
    /// supertypes.
    pub fn set_supertypes(&self, id: DefId, supertypes: &[DefId]) -> Result<(), DefinitionError> {
        let current = self.get(id).ok_or(DefinitionError::UnknownDefinition(id))?;
        for &sup in supertypes {
            if self.get(sup).is_none() {
                return Err(DefinitionError::UnknownDefinition(sup));
            }
            if sup == id || self.is_derived_from(sup, id) {
                return Err(DefinitionError::CyclicSupertype {
                    declaration: current.name.clone(),
                    supertype: self.name(sup),
                });
            }
        }
        let mut updated = (*current).clone();
        updated.supertypes = supertypes.to_vec();
        self.defs.borrow_mut()[id.0 as usize] = Rc::new(updated);
        Ok(())
    }

    pub fn set_properties(&self, id: DefId, properties: Vec<PropertyInfo>) {
        let Some(current) = self.get(id) else {
            return;
        };
        let mut updated = (*current).clone();
        updated.properties = properties;
        self.defs.borrow_mut()[id.0 as usize] = Rc::new(updated);
    }

    pub fn direct_supertypes(&self, id: DefId) -> Vec<DefId> {
        self.get(id).map(|d| d.supertypes.clone()).unwrap_or_default()
    }

    /// Strict ancestors of `id` in breadth-first order.
    pub fn ancestors(&self, id: DefId) -> Vec<DefId> {
        let mut visited = FxHashSet::default();
        visited.insert(id);
        let mut queue: VecDeque<DefId> = self.direct_supertypes(id).into();
        let mut out = Vec::new();
        while let Some(next) = queue.pop_front() {
            if out.len() >= MAX_SUPERTYPE_WALK {
                break;
            }
            if !visited.insert(next) {
                continue;
            }
            out.push(next);
            queue.extend(self.direct_supertypes(next));
        }
        out
    }

    /// `true` when `ancestor` is a strict ancestor of `id`.
    pub fn is_derived_from(&self, id: DefId, ancestor: DefId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// The chain `id`, first supertype of `id`, first supertype of that, …
    pub fn parent_chain(&self, id: DefId) -> Vec<DefId> {
        let mut out = vec![id];
        let mut current = id;
        while let Some(&parent) = self.direct_supertypes(current).first() {
            if out.contains(&parent) || out.len() >= MAX_SUPERTYPE_WALK {
                break;
            }
            out.push(parent);
            current = parent;
        }
        out
    }

    /// Java classes an instance of `id` is assignable to: its own class, its
    /// declared host supertypes and those of every ancestor.
    pub fn host_ancestry(&self, id: DefId) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for def in std::iter::once(id).chain(self.ancestors(id)) {
            let Some(info) = self.get(def) else {
                continue;
            };
            for class in std::iter::once(&info.host_name).chain(info.host_supertypes.iter()) {
                if !out.contains(class) {
                    out.push(class.clone());
                }
            }
        }
        out
    }

    /// Properties of `id` including inherited ones: supertypes' properties
    /// first, in declaration order, then own properties. A redeclared name
    /// keeps its first position and takes the most derived type.
    pub fn all_properties(&self, id: DefId) -> Vec<PropertyInfo> {
        let mut visited = FxHashSet::default();
        let mut out = Vec::new();
        self.collect_properties(id, &mut visited, &mut out);
        out
    }

    fn collect_properties(
        &self,
        id: DefId,
        visited: &mut FxHashSet<DefId>,
        out: &mut Vec<PropertyInfo>,
    ) {
        if !visited.insert(id) {
            return;
        }
        let Some(info) = self.get(id) else {
            return;
        };
        for &sup in &info.supertypes {
            self.collect_properties(sup, visited, out);
        }
        for prop in &info.properties {
            match out.iter_mut().find(|p| p.name == prop.name) {
                Some(existing) => existing.type_id = prop.type_id,
                None => out.push(prop.clone()),
            }
        }
    }

    /// Look up a property, own or inherited.
    pub fn property(&self, id: DefId, name: &str) -> Option<PropertyInfo> {
        self.all_properties(id).into_iter().find(|p| p.name == name)
    }
}
