//! Type representation.
//!
//! Types are interned: a `TypeId` is a handle into a `TypeInterner`, and two
//! handles are equal exactly when the structural `TypeData` behind them is
//! equal. The well-known intrinsics occupy fixed ids so they can be named as
//! constants without touching an interner.

use crate::def::DefId;
use std::rc::Rc;

/// Interned type handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    /// Error marker; assignable to and from everything.
    pub const ERROR: TypeId = TypeId(0);
    /// Top of the lattice.
    pub const ANY: TypeId = TypeId(1);
    /// Bottom of the lattice.
    pub const NOTHING: TypeId = TypeId(2);
    pub const INTEGER: TypeId = TypeId(3);
    pub const REAL: TypeId = TypeId(4);
    pub const BOOLEAN: TypeId = TypeId(5);
    pub const TEXT: TypeId = TypeId(6);
    pub const DURATION: TypeId = TypeId(7);
    pub const TIMESTAMP: TypeId = TypeId(8);
    pub const AID: TypeId = TypeId(9);
    pub const PERFORMATIVE: TypeId = TypeId(10);

    /// First id handed out for non-intrinsic types.
    pub const FIRST_USER: u32 = 11;

    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 == Self::ERROR.0
    }
}

/// Built-in scalar types and the lattice extremes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntrinsicKind {
    Error,
    Any,
    Nothing,
    Integer,
    Real,
    Boolean,
    Text,
    Duration,
    Timestamp,
    Aid,
    Performative,
}

impl IntrinsicKind {
    /// All intrinsics, in `TypeId` order.
    pub const ALL: [IntrinsicKind; 11] = [
        IntrinsicKind::Error,
        IntrinsicKind::Any,
        IntrinsicKind::Nothing,
        IntrinsicKind::Integer,
        IntrinsicKind::Real,
        IntrinsicKind::Boolean,
        IntrinsicKind::Text,
        IntrinsicKind::Duration,
        IntrinsicKind::Timestamp,
        IntrinsicKind::Aid,
        IntrinsicKind::Performative,
    ];

    pub const fn type_id(self) -> TypeId {
        TypeId(self as u32)
    }

    /// Source keyword of the intrinsic.
    pub const fn keyword(self) -> &'static str {
        match self {
            IntrinsicKind::Error => "error",
            IntrinsicKind::Any => "any",
            IntrinsicKind::Nothing => "nothing",
            IntrinsicKind::Integer => "integer",
            IntrinsicKind::Real => "real",
            IntrinsicKind::Boolean => "boolean",
            IntrinsicKind::Text => "text",
            IntrinsicKind::Duration => "duration",
            IntrinsicKind::Timestamp => "timestamp",
            IntrinsicKind::Aid => "aid",
            IntrinsicKind::Performative => "performative",
        }
    }

    /// Resolve a type keyword. `error` is not writable in source.
    pub fn from_keyword(keyword: &str) -> Option<IntrinsicKind> {
        IntrinsicKind::ALL
            .into_iter()
            .skip(1)
            .find(|k| k.keyword() == keyword)
    }
}

/// How a type constructor's argument takes part in subtyping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variance {
    Covariant,
    Contravariant,
    Invariant,
}

/// Structural description of a type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    Intrinsic(IntrinsicKind),
    List(TypeId),
    Set(TypeId),
    Map { key: TypeId, value: TypeId },
    Tuple(Rc<[TypeId]>),
    Message(TypeId),
    Function { params: Rc<[TypeId]>, result: TypeId },
    /// User-declared ontology/agent/record type.
    Nominal(DefId),
    /// Opaque Java class declared with `native`.
    Host(DefId),
}

impl TypeData {
    /// Type arguments paired with their variance, in a fixed order.
    ///
    /// Two values with the same `constructor_key` have argument lists of the
    /// same length, so they can be combined pointwise.
    pub fn arguments(&self) -> Vec<(TypeId, Variance)> {
        match self {
            TypeData::Intrinsic(_) | TypeData::Nominal(_) | TypeData::Host(_) => Vec::new(),
            TypeData::List(e) | TypeData::Set(e) | TypeData::Message(e) => {
                vec![(*e, Variance::Covariant)]
            }
            TypeData::Map { key, value } => vec![
                (*key, Variance::Invariant),
                (*value, Variance::Covariant),
            ],
            TypeData::Tuple(elements) => elements
                .iter()
                .map(|e| (*e, Variance::Covariant))
                .collect(),
            TypeData::Function { params, result } => params
                .iter()
                .map(|p| (*p, Variance::Contravariant))
                .chain(std::iter::once((*result, Variance::Covariant)))
                .collect(),
        }
    }

    /// Rebuild this constructor around new arguments, given in the order of
    /// `arguments`. `None` if the count does not match.
    pub fn with_arguments(&self, args: &[TypeId]) -> Option<TypeData> {
        let data = match (self, args) {
            (TypeData::List(_), [e]) => TypeData::List(*e),
            (TypeData::Set(_), [e]) => TypeData::Set(*e),
            (TypeData::Message(_), [e]) => TypeData::Message(*e),
            (TypeData::Map { .. }, [key, value]) => TypeData::Map {
                key: *key,
                value: *value,
            },
            (TypeData::Tuple(elements), _) if elements.len() == args.len() => {
                TypeData::Tuple(args.into())
            }
            (TypeData::Function { params, .. }, [init @ .., result])
                if params.len() == init.len() =>
            {
                TypeData::Function {
                    params: init.into(),
                    result: *result,
                }
            }
            _ => return None,
        };
        Some(data)
    }

    /// Identity of the type constructor including arity, or `None` for
    /// non-parametric types.
    pub fn constructor_key(&self) -> Option<ConstructorKey> {
        match self {
            TypeData::List(_) => Some(ConstructorKey::List),
            TypeData::Set(_) => Some(ConstructorKey::Set),
            TypeData::Map { .. } => Some(ConstructorKey::Map),
            TypeData::Message(_) => Some(ConstructorKey::Message),
            TypeData::Tuple(elements) => Some(ConstructorKey::Tuple(elements.len())),
            TypeData::Function { params, .. } => Some(ConstructorKey::Function(params.len())),
            TypeData::Intrinsic(_) | TypeData::Nominal(_) | TypeData::Host(_) => None,
        }
    }
}

/// Parametric type constructor with its arity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConstructorKey {
    List,
    Set,
    Map,
    Message,
    Tuple(usize),
    Function(usize),
}
