//! Semantic type handles.
//!
//! A [`SemType`] describes the shape of a parameter's type the way a reflection
//! collaborator sees it. Rules never look at the declared name of a type: every
//! classification goes through [`SemType::underlying`], so `type Celsius float64`
//! classifies exactly like `float64`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Predeclared scalar kinds.
///
/// `Byte` and `Rune` are kept apart from `Uint8` and `Int32` only so the
/// textual form round-trips; they classify identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Byte,
    Rune,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
}

impl BasicKind {
    /// Every predeclared kind, in declaration order.
    pub const ALL: [BasicKind; 19] = [
        BasicKind::Bool,
        BasicKind::Int,
        BasicKind::Int8,
        BasicKind::Int16,
        BasicKind::Int32,
        BasicKind::Int64,
        BasicKind::Uint,
        BasicKind::Uint8,
        BasicKind::Uint16,
        BasicKind::Uint32,
        BasicKind::Uint64,
        BasicKind::Uintptr,
        BasicKind::Byte,
        BasicKind::Rune,
        BasicKind::Float32,
        BasicKind::Float64,
        BasicKind::Complex64,
        BasicKind::Complex128,
        BasicKind::String,
    ];

    /// The predeclared identifier for this kind.
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Byte => "byte",
            BasicKind::Rune => "rune",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::String => "string",
        }
    }

    /// Look up a kind by its predeclared identifier.
    pub fn from_name(name: &str) -> Option<BasicKind> {
        BasicKind::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            BasicKind::Int
                | BasicKind::Int8
                | BasicKind::Int16
                | BasicKind::Int32
                | BasicKind::Int64
                | BasicKind::Uint
                | BasicKind::Uint8
                | BasicKind::Uint16
                | BasicKind::Uint32
                | BasicKind::Uint64
                | BasicKind::Uintptr
                | BasicKind::Byte
                | BasicKind::Rune
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, BasicKind::Float32 | BasicKind::Float64)
    }

    pub fn is_complex(self) -> bool {
        matches!(self, BasicKind::Complex64 | BasicKind::Complex128)
    }

    pub fn is_string(self) -> bool {
        self == BasicKind::String
    }

    /// True for single-byte elements (`uint8` and its alias `byte`).
    pub fn is_byte(self) -> bool {
        matches!(self, BasicKind::Uint8 | BasicKind::Byte)
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field of a struct type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: SemType,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: SemType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A semantic type handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemType {
    /// Predeclared scalar: `int`, `string`, `bool`, ...
    Basic(BasicKind),
    /// `[]T`
    Slice(Box<SemType>),
    /// `[N]T`
    Array(usize, Box<SemType>),
    /// `map[K]V`
    Map(Box<SemType>, Box<SemType>),
    /// `*T`
    Pointer(Box<SemType>),
    /// `struct{...}`
    Struct(Vec<Field>),
    /// `interface{}`
    Interface,
    /// A declared type; `name` is the qualified name used in generated code.
    Named {
        name: String,
        underlying: Box<SemType>,
    },
}

impl SemType {
    pub fn basic(kind: BasicKind) -> Self {
        SemType::Basic(kind)
    }

    pub fn string() -> Self {
        SemType::Basic(BasicKind::String)
    }

    pub fn int() -> Self {
        SemType::Basic(BasicKind::Int)
    }

    pub fn slice(elem: SemType) -> Self {
        SemType::Slice(Box::new(elem))
    }

    /// `[]byte`
    pub fn bytes() -> Self {
        SemType::slice(SemType::Basic(BasicKind::Byte))
    }

    pub fn array(len: usize, elem: SemType) -> Self {
        SemType::Array(len, Box::new(elem))
    }

    pub fn map(key: SemType, value: SemType) -> Self {
        SemType::Map(Box::new(key), Box::new(value))
    }

    pub fn pointer(elem: SemType) -> Self {
        SemType::Pointer(Box::new(elem))
    }

    pub fn structure(fields: Vec<Field>) -> Self {
        SemType::Struct(fields)
    }

    /// Declare a named type over an underlying representation.
    ///
    /// Naming a named type collapses to the innermost representation, matching
    /// how `type B A` takes `A`'s underlying type rather than `A` itself.
    pub fn named(name: impl Into<String>, underlying: SemType) -> Self {
        SemType::Named {
            name: name.into(),
            underlying: Box::new(underlying.underlying().clone()),
        }
    }

    /// The representation this type is built from, with every name stripped.
    pub fn underlying(&self) -> &SemType {
        let mut ty = self;
        while let SemType::Named { underlying, .. } = ty {
            ty = underlying;
        }
        ty
    }

    pub fn is_named(&self) -> bool {
        matches!(self, SemType::Named { .. })
    }

    /// Short description of the underlying representation, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self.underlying() {
            SemType::Basic(_) => "basic",
            SemType::Slice(_) => "slice",
            SemType::Array(..) => "array",
            SemType::Map(..) => "map",
            SemType::Pointer(_) => "pointer",
            SemType::Struct(_) => "struct",
            SemType::Interface => "interface",
            // underlying() never yields Named
            SemType::Named { .. } => "named",
        }
    }
}

impl fmt::Display for SemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SemType::Basic(kind) => f.write_str(kind.name()),
            SemType::Slice(elem) => write!(f, "[]{elem}"),
            SemType::Array(len, elem) => write!(f, "[{len}]{elem}"),
            SemType::Map(key, value) => write!(f, "map[{key}]{value}"),
            SemType::Pointer(elem) => write!(f, "*{elem}"),
            SemType::Struct(fields) => {
                f.write_str("struct{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{} {}", field.name, field.ty)?;
                }
                f.write_str("}")
            }
            SemType::Interface => f.write_str("interface{}"),
            SemType::Named { name, .. } => f.write_str(name),
        }
    }
}

/// A parameter a rule is attached to. Carries no runtime value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: SemType,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: SemType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}
