//! Abstract Syntax Tree types for validation rules.
//!
//! This module provides:
//! - AST type definitions (`types` module, re-exported at this level)
//! - S-expression formatter for test snapshots (`sexpr` module)

mod types;
pub mod sexpr;

pub use types::*;
