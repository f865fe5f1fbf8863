//! Type classification.
//!
//! Validator declarations do not name the Go types they accept. They name
//! structural classes instead (`comparable`, `ordered`, ...), and a parameter's
//! type is matched against those classes by the predicates in this module.
//! All predicates look through named types to the underlying representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sem::SemType;

/// Any predeclared scalar: numeric, string or boolean.
pub fn is_comparable(ty: &SemType) -> bool {
    matches!(ty.underlying(), SemType::Basic(_))
}

/// Integers of every width, floats, and strings.
pub fn is_ordered(ty: &SemType) -> bool {
    match ty.underlying() {
        SemType::Basic(kind) => kind.is_integer() || kind.is_float() || kind.is_string(),
        _ => false,
    }
}

pub fn is_string(ty: &SemType) -> bool {
    matches!(ty.underlying(), SemType::Basic(kind) if kind.is_string())
}

/// A slice of single-byte elements.
pub fn is_bytes(ty: &SemType) -> bool {
    match ty.underlying() {
        SemType::Slice(elem) => matches!(elem.underlying(), SemType::Basic(kind) if kind.is_byte()),
        _ => false,
    }
}

pub fn is_slice(ty: &SemType) -> bool {
    matches!(ty.underlying(), SemType::Slice(_))
}

pub fn is_struct(ty: &SemType) -> bool {
    matches!(ty.underlying(), SemType::Struct(_))
}

/// A structural type-class tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeClass {
    Comparable,
    Ordered,
    String,
    Bytes,
    Slice,
    Struct,
}

impl TypeClass {
    pub const ALL: [TypeClass; 6] = [
        TypeClass::Comparable,
        TypeClass::Ordered,
        TypeClass::String,
        TypeClass::Bytes,
        TypeClass::Slice,
        TypeClass::Struct,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TypeClass::Comparable => "comparable",
            TypeClass::Ordered => "ordered",
            TypeClass::String => "string",
            TypeClass::Bytes => "bytes",
            TypeClass::Slice => "slice",
            TypeClass::Struct => "struct",
        }
    }

    /// Whether `ty` belongs to this class.
    pub fn matches(self, ty: &SemType) -> bool {
        match self {
            TypeClass::Comparable => is_comparable(ty),
            TypeClass::Ordered => is_ordered(ty),
            TypeClass::String => is_string(ty),
            TypeClass::Bytes => is_bytes(ty),
            TypeClass::Slice => is_slice(ty),
            TypeClass::Struct => is_struct(ty),
        }
    }

    /// Every class `ty` belongs to, in tag order.
    pub fn classify(ty: &SemType) -> Vec<TypeClass> {
        TypeClass::ALL
            .into_iter()
            .filter(|class| class.matches(ty))
            .collect()
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag that is not one of the six type classes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown type class `{0}`")]
pub struct UnknownTypeClass(pub String);

impl FromStr for TypeClass {
    type Err = UnknownTypeClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TypeClass::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| UnknownTypeClass(s.to_string()))
    }
}

/// The ordered list of classes a declaration accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllowedTypes(Vec<TypeClass>);

impl AllowedTypes {
    pub fn new(classes: Vec<TypeClass>) -> Self {
        Self(classes)
    }

    /// Parse a `|`-separated tag list such as `string|bytes`.
    pub fn parse(spec: &str) -> Result<Self, UnknownTypeClass> {
        spec.split('|')
            .map(|tag| tag.trim().parse())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// True iff at least one listed class matches `ty`.
    pub fn allows(&self, ty: &SemType) -> bool {
        self.0.iter().any(|class| class.matches(ty))
    }

    pub fn classes(&self) -> &[TypeClass] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<TypeClass>> for AllowedTypes {
    fn from(classes: Vec<TypeClass>) -> Self {
        Self(classes)
    }
}

impl fmt::Display for AllowedTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, class) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            f.write_str(class.as_str())?;
        }
        Ok(())
    }
}
