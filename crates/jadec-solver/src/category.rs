//! Coarse type classification.

use crate::intern::TypeDatabase;
use crate::types::{IntrinsicKind, TypeData, TypeId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeCategory {
    Intrinsic,
    Top,
    Bottom,
    Error,
    List,
    Set,
    Map,
    Tuple,
    Message,
    Function,
    Nominal,
    Host,
}

impl TypeCategory {
    /// Lists, sets and maps.
    pub const fn is_collection(self) -> bool {
        matches!(self, TypeCategory::List | TypeCategory::Set | TypeCategory::Map)
    }

    /// Types that may be deconstructed by a composite pattern.
    pub const fn is_deconstructible(self) -> bool {
        self.is_collection() || matches!(self, TypeCategory::Tuple | TypeCategory::Nominal)
    }
}

pub fn category(db: &dyn TypeDatabase, id: TypeId) -> TypeCategory {
    match db.lookup(id) {
        Some(TypeData::Intrinsic(IntrinsicKind::Any)) => TypeCategory::Top,
        Some(TypeData::Intrinsic(IntrinsicKind::Nothing)) => TypeCategory::Bottom,
        Some(TypeData::Intrinsic(IntrinsicKind::Error)) | None => TypeCategory::Error,
        Some(TypeData::Intrinsic(_)) => TypeCategory::Intrinsic,
        Some(TypeData::List(_)) => TypeCategory::List,
        Some(TypeData::Set(_)) => TypeCategory::Set,
        Some(TypeData::Map { .. }) => TypeCategory::Map,
        Some(TypeData::Tuple(_)) => TypeCategory::Tuple,
        Some(TypeData::Message(_)) => TypeCategory::Message,
        Some(TypeData::Function { .. }) => TypeCategory::Function,
        Some(TypeData::Nominal(_)) => TypeCategory::Nominal,
        Some(TypeData::Host(_)) => TypeCategory::Host,
    }
}
