//! Errors raised while loading declarations or compiling a rule.
//!
//! Every failure is fatal to the rule being compiled: there is no partial
//! result. Syntax errors carry a byte offset into the text they came from;
//! resolution errors carry the offset of the offending leaf and its alias.

use crate::decl::ArgRange;

/// A compilation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The declaration source does not have the expected shape.
    #[error("bad declaration at line {line}: {message}")]
    DeclSyntax { line: usize, message: String },

    /// The rule text does not lex or parse.
    #[error("1:{}: {message}", .offset + 1)]
    ExpressionSyntax { offset: usize, message: String },

    /// A `.msg(...)` suffix is malformed.
    #[error("1:{}: {message}", .offset + 1)]
    MessageSyntax { offset: usize, message: String },

    /// No declaration is registered under the alias.
    #[error("unrecognized validator {alias:?}")]
    UnrecognizedValidator { alias: String, offset: usize },

    /// No declaration under the alias accepts the parameter's type.
    #[error("cannot use validator `{alias}` on type {ty} ({kind})")]
    TypeMismatch {
        alias: String,
        ty: String,
        kind: String,
        offset: usize,
    },

    /// The selected declaration takes a different number of arguments.
    #[error("wrong number of arguments for validator {alias:?}: got {got}, want {want}")]
    Arity {
        alias: String,
        got: usize,
        want: ArgRange,
        offset: usize,
    },

    /// A literal pattern passed to the regex validator does not compile.
    #[error("invalid pattern {pattern} for validator `{alias}`: {message}")]
    InvalidPattern {
        alias: String,
        pattern: String,
        message: String,
        offset: usize,
    },
}

impl CompileError {
    /// Byte offset into the rule text, when the error points into one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            CompileError::DeclSyntax { .. } => None,
            CompileError::ExpressionSyntax { offset, .. }
            | CompileError::MessageSyntax { offset, .. }
            | CompileError::UnrecognizedValidator { offset, .. }
            | CompileError::TypeMismatch { offset, .. }
            | CompileError::Arity { offset, .. }
            | CompileError::InvalidPattern { offset, .. } => Some(*offset),
        }
    }

    /// Short, stable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CompileError::DeclSyntax { .. } => "declaration syntax",
            CompileError::ExpressionSyntax { .. } => "expression syntax",
            CompileError::MessageSyntax { .. } => "message syntax",
            CompileError::UnrecognizedValidator { .. } => "unrecognized validator",
            CompileError::TypeMismatch { .. } => "type mismatch",
            CompileError::Arity { .. } => "arity",
            CompileError::InvalidPattern { .. } => "invalid pattern",
        }
    }

    pub(crate) fn decl(line: usize, message: impl Into<String>) -> Self {
        CompileError::DeclSyntax {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn syntax(offset: usize, message: impl Into<String>) -> Self {
        CompileError::ExpressionSyntax {
            offset,
            message: message.into(),
        }
    }

    pub(crate) fn message(offset: usize, message: impl Into<String>) -> Self {
        CompileError::MessageSyntax {
            offset,
            message: message.into(),
        }
    }
}

/// Result type for the kernel.
pub type Result<T> = std::result::Result<T, CompileError>;
