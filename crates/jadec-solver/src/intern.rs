//! Type interning.
//!
//! `TypeInterner` maps structural `TypeData` to dense `TypeId`s. It also owns
//! the unit's `DefinitionStore`, so one value answers every type question the
//! checker asks.

use crate::def::{DefId, DefinitionInfo, DefinitionStore};
use crate::types::{IntrinsicKind, TypeData, TypeId};
use jadec_common::limits::MAX_TUPLE_ARITY;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Read access to interned types, the seam the relation and lattice code
/// is written against.
pub trait TypeDatabase {
    fn lookup(&self, id: TypeId) -> Option<TypeData>;
    fn intern(&self, data: TypeData) -> TypeId;
    fn definitions(&self) -> &DefinitionStore;
}

#[derive(Debug, Default)]
struct InternTables {
    types: Vec<TypeData>,
    ids: FxHashMap<TypeData, TypeId>,
}

/// Per-unit type interner.
#[derive(Debug)]
pub struct TypeInterner {
    tables: RefCell<InternTables>,
    defs: DefinitionStore,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    pub fn new() -> Self {
        let mut tables = InternTables::default();
        for kind in IntrinsicKind::ALL {
            let data = TypeData::Intrinsic(kind);
            let id = TypeId(tables.types.len() as u32);
            debug_assert_eq!(id, kind.type_id());
            tables.ids.insert(data.clone(), id);
            tables.types.push(data);
        }
        Self {
            tables: RefCell::new(tables),
            defs: DefinitionStore::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tables.borrow().types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn list(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::List(element))
    }

    pub fn set(&self, element: TypeId) -> TypeId {
        self.intern(TypeData::Set(element))
    }

    pub fn map(&self, key: TypeId, value: TypeId) -> TypeId {
        self.intern(TypeData::Map { key, value })
    }

    /// Tuple type. Arity is not checked here; callers report `TupleTooBig`
    /// and may still build the type to keep going.
    pub fn tuple(&self, elements: Vec<TypeId>) -> TypeId {
        self.intern(TypeData::Tuple(elements.into()))
    }

    pub fn message(&self, content: TypeId) -> TypeId {
        self.intern(TypeData::Message(content))
    }

    pub fn function(&self, params: Vec<TypeId>, result: TypeId) -> TypeId {
        self.intern(TypeData::Function {
            params: params.into(),
            result,
        })
    }

    pub fn nominal(&self, def: DefId) -> TypeId {
        self.intern(TypeData::Nominal(def))
    }

    pub fn host(&self, def: DefId) -> TypeId {
        self.intern(TypeData::Host(def))
    }

    /// Register a declaration and return its type.
    pub fn declare(&self, info: DefinitionInfo) -> (DefId, TypeId) {
        let native = info.kind == crate::def::DefKind::Native;
        let def = self.defs.register(info);
        let ty = if native {
            self.host(def)
        } else {
            self.nominal(def)
        };
        (def, ty)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Declaration behind a nominal or host type.
    pub fn def_of(&self, id: TypeId) -> Option<DefId> {
        match self.lookup(id)? {
            TypeData::Nominal(def) | TypeData::Host(def) => Some(def),
            _ => None,
        }
    }

    pub fn definition_of(&self, id: TypeId) -> Option<Rc<DefinitionInfo>> {
        self.def_of(id).and_then(|def| self.defs.get(def))
    }

    pub fn tuple_elements(&self, id: TypeId) -> Option<Rc<[TypeId]>> {
        match self.lookup(id)? {
            TypeData::Tuple(elements) => Some(elements),
            _ => None,
        }
    }

    /// Element type of a list or set.
    pub fn element_type(&self, id: TypeId) -> Option<TypeId> {
        match self.lookup(id)? {
            TypeData::List(e) | TypeData::Set(e) => Some(e),
            _ => None,
        }
    }

    pub fn map_types(&self, id: TypeId) -> Option<(TypeId, TypeId)> {
        match self.lookup(id)? {
            TypeData::Map { key, value } => Some((key, value)),
            _ => None,
        }
    }

    pub fn is_tuple_arity_supported(arity: usize) -> bool {
        (1..=MAX_TUPLE_ARITY).contains(&arity)
    }
}

impl TypeDatabase for TypeInterner {
    fn lookup(&self, id: TypeId) -> Option<TypeData> {
        self.tables.borrow().types.get(id.0 as usize).cloned()
    }

    fn intern(&self, data: TypeData) -> TypeId {
        if let Some(&id) = self.tables.borrow().ids.get(&data) {
            return id;
        }
        let mut tables = self.tables.borrow_mut();
        let id = TypeId(tables.types.len() as u32);
        tables.ids.insert(data.clone(), id);
        tables.types.push(data);
        id
    }

    fn definitions(&self) -> &DefinitionStore {
        &self.defs
    }
}
