//! Java host representation of types.

use crate::intern::TypeDatabase;
use crate::types::{IntrinsicKind, TypeData, TypeId};

pub const LIST_CLASS: &str = "jadescript.util.JadescriptList";
pub const SET_CLASS: &str = "jadescript.util.JadescriptSet";
pub const MAP_CLASS: &str = "jadescript.util.JadescriptMap";
/// Factories used by compiled collection literals.
pub const COLLECTIONS_CLASS: &str = "jadescript.util.JadescriptCollections";
pub const TUPLE_PACKAGE: &str = "jadescript.util.types";
pub const MESSAGE_CLASS: &str = "jadescript.core.message.Message";
pub const FUNCTION_PACKAGE: &str = "jadescript.lang.functions";

const fn intrinsic_class(kind: IntrinsicKind) -> &'static str {
    match kind {
        IntrinsicKind::Integer => "java.lang.Integer",
        IntrinsicKind::Real => "java.lang.Float",
        IntrinsicKind::Boolean => "java.lang.Boolean",
        IntrinsicKind::Text => "java.lang.String",
        IntrinsicKind::Duration => "jadescript.lang.Duration",
        IntrinsicKind::Timestamp => "jadescript.lang.Timestamp",
        IntrinsicKind::Aid => "jade.core.AID",
        IntrinsicKind::Performative => "jadescript.core.message.Performative",
        IntrinsicKind::Nothing => "java.lang.Void",
        IntrinsicKind::Any | IntrinsicKind::Error => "java.lang.Object",
    }
}

/// Java type with generic arguments, e.g.
/// `jadescript.util.JadescriptList<java.lang.Integer>`.
pub fn host_type_name(db: &dyn TypeDatabase, id: TypeId) -> String {
    match db.lookup(id) {
        Some(TypeData::Intrinsic(kind)) => intrinsic_class(kind).to_string(),
        Some(TypeData::List(e)) => format!("{LIST_CLASS}<{}>", host_type_name(db, e)),
        Some(TypeData::Set(e)) => format!("{SET_CLASS}<{}>", host_type_name(db, e)),
        Some(TypeData::Message(e)) => format!("{MESSAGE_CLASS}<{}>", host_type_name(db, e)),
        Some(TypeData::Map { key, value }) => format!(
            "{MAP_CLASS}<{}, {}>",
            host_type_name(db, key),
            host_type_name(db, value)
        ),
        Some(TypeData::Tuple(elements)) => format!(
            "{}<{}>",
            tuple_class(elements.len()),
            join_hosts(db, &elements)
        ),
        Some(TypeData::Function { params, result }) => {
            let mut args: Vec<TypeId> = params.to_vec();
            args.push(result);
            format!("{}<{}>", function_class(params.len()), join_hosts(db, &args))
        }
        Some(TypeData::Nominal(def) | TypeData::Host(def)) => db
            .definitions()
            .get(def)
            .map_or_else(|| "java.lang.Object".to_string(), |d| d.host_name.clone()),
        None => "java.lang.Object".to_string(),
    }
}

/// Erased Java class, usable with `instanceof` and casts.
pub fn host_raw_class(db: &dyn TypeDatabase, id: TypeId) -> String {
    let full = host_type_name(db, id);
    match full.find('<') {
        Some(at) => full[..at].to_string(),
        None => full,
    }
}

pub fn tuple_class(arity: usize) -> String {
    format!("{TUPLE_PACKAGE}.Tuple{arity}")
}

pub fn function_class(arity: usize) -> String {
    format!("{FUNCTION_PACKAGE}.Function{arity}")
}

/// Boxed Java value types compared with `==` in generated conditions.
pub fn uses_reference_equality(id: TypeId) -> bool {
    matches!(id, TypeId::INTEGER | TypeId::REAL | TypeId::BOOLEAN)
}

fn join_hosts(db: &dyn TypeDatabase, items: &[TypeId]) -> String {
    items
        .iter()
        .map(|t| host_type_name(db, *t))
        .collect::<Vec<_>>()
        .join(", ")
}
