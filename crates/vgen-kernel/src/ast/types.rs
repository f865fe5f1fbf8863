//! Rule AST.
//!
//! The parser produces a [`Node`] tree; the binder reads it and produces a
//! separate bound tree, so a parsed rule can be bound against any number of
//! parameters.

use std::fmt;
use std::ops::Range;

/// A parsed rule expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A single validator reference: `len(0, 20).msg("bad length")`
    Leaf(Leaf),
    /// Negation: `!rule`
    Not(Box<Node>),
    /// Conjunction or disjunction: `a && b`, `a || b`
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    pub fn leaf(alias: impl Into<String>, args: Vec<String>) -> Self {
        Node::Leaf(Leaf::new(alias, args))
    }

    pub fn not(inner: Node) -> Self {
        Node::Not(Box::new(inner))
    }

    pub fn and(left: Node, right: Node) -> Self {
        Node::Binary {
            op: BinaryOp::And,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Node, right: Node) -> Self {
        Node::Binary {
            op: BinaryOp::Or,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Visit every leaf, left to right.
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Leaf>) {
        match self {
            Node::Leaf(leaf) => out.push(leaf),
            Node::Not(inner) => inner.collect_leaves(out),
            Node::Binary { left, right, .. } => {
                left.collect_leaves(out);
                right.collect_leaves(out);
            }
        }
    }
}

/// The alias that delegates to the parameter's own schema.
pub const DELEGATE_ALIAS: &str = "_";

/// A validator reference.
///
/// Arguments are kept verbatim, exactly as written in the rule, so string
/// literals keep their quotes and numbers keep their spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    pub alias: String,
    pub args: Vec<String>,
    /// Verbatim string literal from `.msg(...)`, quotes included.
    pub message: Option<String>,
    /// Byte range of the leaf in the rule text.
    pub span: Range<usize>,
}

impl Leaf {
    pub fn new(alias: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            alias: alias.into(),
            args,
            message: None,
            span: 0..0,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.span = span;
        self
    }

    pub fn is_delegate(&self) -> bool {
        self.alias == DELEGATE_ALIAS
    }
}

/// Binary logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    And,
    Or,
}

impl BinaryOp {
    /// Combinator name used when emitting Go code.
    pub fn combinator(self) -> &'static str {
        match self {
            BinaryOp::And => "All",
            BinaryOp::Or => "Any",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::And => write!(f, "&&"),
            BinaryOp::Or => write!(f, "||"),
        }
    }
}

impl fmt::Display for Node {
    /// Canonical rule text. Re-parsing it yields an equal tree, spans aside.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(leaf) => {
                write!(f, "{}", leaf.alias)?;
                if !leaf.args.is_empty() {
                    write!(f, "({})", leaf.args.join(", "))?;
                }
                if let Some(message) = &leaf.message {
                    write!(f, ".msg({message})")?;
                }
                Ok(())
            }
            Node::Not(inner) => match inner.as_ref() {
                Node::Binary { .. } => write!(f, "!({inner})"),
                _ => write!(f, "!{inner}"),
            },
            Node::Binary { op, left, right } => {
                write_operand(f, left, *op, false)?;
                write!(f, " {op} ")?;
                write_operand(f, right, *op, true)
            }
        }
    }
}

/// Parenthesise an operand when its precedence or position requires it.
/// Both operators are left-associative, so a right operand of equal
/// precedence needs parentheses too.
fn write_operand(f: &mut fmt::Formatter<'_>, node: &Node, parent: BinaryOp, right: bool) -> fmt::Result {
    let needs_parens = match node {
        Node::Binary { op, .. } => (parent == BinaryOp::And && *op == BinaryOp::Or) || (right && *op == parent),
        _ => false,
    };
    if needs_parens {
        write!(f, "({node})")
    } else {
        write!(f, "{node}")
    }
}
