//! Rendering types in source syntax for diagnostics.

use crate::intern::TypeDatabase;
use crate::types::{TypeData, TypeId};

pub struct TypeFormatter<'a> {
    db: &'a dyn TypeDatabase,
}

impl<'a> TypeFormatter<'a> {
    pub fn new(db: &'a dyn TypeDatabase) -> Self {
        Self { db }
    }

    pub fn format(&self, id: TypeId) -> String {
        let mut out = String::new();
        self.write(id, &mut out);
        out
    }

    fn write(&self, id: TypeId, out: &mut String) {
        let Some(data) = self.db.lookup(id) else {
            out.push_str("<unknown>");
            return;
        };
        match data {
            TypeData::Intrinsic(kind) => out.push_str(kind.keyword()),
            TypeData::List(e) => {
                out.push_str("list of ");
                self.write_argument(e, out);
            }
            TypeData::Set(e) => {
                out.push_str("set of ");
                self.write_argument(e, out);
            }
            TypeData::Message(e) => {
                out.push_str("message of ");
                self.write_argument(e, out);
            }
            TypeData::Map { key, value } => {
                out.push_str("map of ");
                self.write_argument(key, out);
                out.push(':');
                self.write_argument(value, out);
            }
            TypeData::Tuple(elements) => {
                out.push('(');
                self.write_list(&elements, out);
                out.push(')');
            }
            TypeData::Function { params, result } => {
                out.push_str("function (");
                self.write_list(&params, out);
                out.push_str(") -> ");
                self.write(result, out);
            }
            TypeData::Nominal(def) | TypeData::Host(def) => {
                out.push_str(&self.db.definitions().name(def));
            }
        }
    }

    fn write_list(&self, items: &[TypeId], out: &mut String) {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            self.write(*item, out);
        }
    }

    /// Nested map types are parenthesized so `map of text:map of text:integer`
    /// stays readable.
    fn write_argument(&self, id: TypeId, out: &mut String) {
        if matches!(self.db.lookup(id), Some(TypeData::Map { .. } | TypeData::Function { .. })) {
            out.push('(');
            self.write(id, out);
            out.push(')');
        } else {
            self.write(id, out);
        }
    }
}

pub fn format_type(db: &dyn TypeDatabase, id: TypeId) -> String {
    TypeFormatter::new(db).format(id)
}
