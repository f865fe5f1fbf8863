//! S-expression rendering of rule trees, used by file-driven parser tests.
//!
//! ```text
//! !nonzero || len(0, 20).msg("bad") && _
//! (or (not (leaf nonzero)) (and (leaf len 0 20 :msg "bad") (leaf _)))
//! ```

use super::{BinaryOp, Leaf, Node};

/// Render `node` on one line.
pub fn format_node(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Leaf(leaf) => write_leaf(out, leaf),
        Node::Not(inner) => {
            out.push_str("(not ");
            write_node(out, inner);
            out.push(')');
        }
        Node::Binary { op, left, right } => {
            out.push('(');
            out.push_str(match op {
                BinaryOp::And => "and",
                BinaryOp::Or => "or",
            });
            out.push(' ');
            write_node(out, left);
            out.push(' ');
            write_node(out, right);
            out.push(')');
        }
    }
}

fn write_leaf(out: &mut String, leaf: &Leaf) {
    out.push_str("(leaf ");
    out.push_str(&leaf.alias);
    for arg in &leaf.args {
        out.push(' ');
        out.push_str(arg);
    }
    if let Some(message) = &leaf.message {
        out.push_str(" :msg ");
        out.push_str(message);
    }
    out.push(')');
}
