//! Validator descriptors.

use std::fmt;

use serde::Serialize;
use vgen_types::{AllowedTypes, SemType};

/// Number of arguments a validator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ArgRange {
    pub min: usize,
    /// `None` means no upper bound.
    pub max: Option<usize>,
}

impl ArgRange {
    pub const fn exact(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    pub const fn at_least(n: usize) -> Self {
        Self { min: n, max: None }
    }

    pub fn contains(&self, n: usize) -> bool {
        n >= self.min && self.max.is_none_or(|max| n <= max)
    }

    /// Parse an `args=` metadata value: `2` or `1+`.
    pub fn parse(text: &str) -> Option<Self> {
        match text.strip_suffix('+') {
            Some(min) => min.parse().ok().map(Self::at_least),
            None => text.parse().ok().map(Self::exact),
        }
    }
}

impl Default for ArgRange {
    fn default() -> Self {
        Self::exact(0)
    }
}

impl fmt::Display for ArgRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{max}"),
            Some(max) => write!(f, "{}..={max}", self.min),
            None => write!(f, "{}+", self.min),
        }
    }
}

/// A validator available to rules.
///
/// Loaded once from declaration text and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    /// Import path of the package declaring the validator, version suffix kept.
    pub import_path: Option<String>,
    /// Package qualifier used in generated code, such as `v` or `vext`.
    pub qualifier: String,
    /// Go name of the validator, such as `LenString`.
    pub declared_name: String,
    /// Instantiated with the parameter's type when emitted.
    pub is_generic: bool,
    /// Name rules refer to it by.
    pub alias: String,
    pub allowed_types: AllowedTypes,
    pub arg_count: ArgRange,
}

impl Descriptor {
    /// `qualifier.DeclaredName`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.qualifier, self.declared_name)
    }

    pub fn accepts(&self, ty: &SemType) -> bool {
        self.allowed_types.allows(ty)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())?;
        if self.is_generic {
            write!(f, "[T]")?;
        }
        write!(f, " as {} (type={} args={})", self.alias, self.allowed_types, self.arg_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", ArgRange::exact(0))]
    #[case("2", ArgRange::exact(2))]
    #[case("1+", ArgRange::at_least(1))]
    #[case("0+", ArgRange::at_least(0))]
    fn parse_args(#[case] text: &str, #[case] want: ArgRange) {
        assert_eq!(ArgRange::parse(text), Some(want));
    }

    #[rstest]
    #[case("")]
    #[case("+")]
    #[case("-1")]
    #[case("two")]
    #[case("1++")]
    fn parse_bad_args(#[case] text: &str) {
        assert_eq!(ArgRange::parse(text), None);
    }

    #[test]
    fn contains() {
        assert!(ArgRange::exact(2).contains(2));
        assert!(!ArgRange::exact(2).contains(1));
        assert!(!ArgRange::exact(2).contains(3));
        assert!(ArgRange::at_least(1).contains(1));
        assert!(ArgRange::at_least(1).contains(100));
        assert!(!ArgRange::at_least(1).contains(0));
        let bounded = ArgRange { min: 1, max: Some(3) };
        assert!(bounded.contains(3));
        assert!(!bounded.contains(4));
    }

    #[test]
    fn display() {
        assert_eq!(ArgRange::exact(2).to_string(), "2");
        assert_eq!(ArgRange::at_least(1).to_string(), "1+");
        assert_eq!(ArgRange { min: 1, max: Some(3) }.to_string(), "1..=3");
    }
}
