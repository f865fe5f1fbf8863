//! vgen-types: pure data types shared across the vgen workspace.
//!
//! This crate provides:
//!
//! - **Semantic types** ([`SemType`]): the type handles that rules are bound
//!   against, with a Go-style textual form for generic instantiation
//! - **Type classes** ([`TypeClass`], [`AllowedTypes`]): the closed set of
//!   structural tags a validator declaration can accept, and the predicates
//!   that classify a type against them
//! - **Parameters** ([`Param`]): a named, typed slot a rule is attached to
//! - **Type syntax** ([`parse_type`]): a reader for Go-style type text, used by
//!   tooling that has no reflection collaborator at hand
//!
//! Nothing here performs I/O.

pub mod classify;
pub mod sem;
pub mod syntax;

pub use classify::{
    AllowedTypes, TypeClass, UnknownTypeClass, is_bytes, is_comparable, is_ordered, is_slice,
    is_string, is_struct,
};
pub use sem::{BasicKind, Field, Param, SemType};
pub use syntax::{TypeSyntaxError, parse_type};
