//! vgen-kernel: the core of vgen.
//!
//! This crate provides:
//!
//! - **Declarations**: loads validator declarations from Go list literals
//!   into a [`Registry`] of overloads keyed by alias
//! - **Lexer**: Tokenizes rule text using logos
//! - **Parser**: Builds the rule AST from tokens using chumsky
//! - **AST**: Type definitions for rules, plus an S-expression formatter
//! - **Binder**: Resolves every leaf of a rule against a typed parameter
//! - **Emitter**: Renders bound rules as Go validator expressions
//! - **Compiler**: One facade over all of the above
//!
//! ```text
//! len(0, 20).msg("bad length") && match(`^\w+$`)       name string
//! v.All(v.LenString(0, 20).Msg("bad length"), v.Match(regexp.MustCompile(`^\w+$`)))
//! ```
//!
//! Nothing here performs I/O.

pub mod ast;
pub mod binder;
pub mod compiler;
pub mod decl;
mod diagnostic;
pub mod emit;
pub mod error;
pub mod lexer;
pub mod options;
pub mod parser;

pub use ast::Node;
pub use binder::{Binder, BoundNode, BoundRule, bind};
pub use compiler::{CompiledParam, Compiler};
pub use decl::{ArgRange, Descriptor, Registry};
pub use emit::{Emitter, emit};
pub use error::{CompileError, Result};
pub use options::CompileOptions;
pub use parser::parse;
