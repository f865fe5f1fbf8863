//! Bound rule tree.

use std::sync::Arc;

use vgen_types::Param;

use crate::ast::BinaryOp;
use crate::decl::Descriptor;

/// A rule resolved against one parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundRule {
    pub param: Param,
    pub root: BoundNode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundNode {
    /// `_`: defer to the parameter's own schema.
    Delegate { message: Option<String> },
    /// A leaf resolved to one descriptor.
    Check {
        descriptor: Arc<Descriptor>,
        args: Vec<String>,
        message: Option<String>,
    },
    Not(Box<BoundNode>),
    Binary {
        op: BinaryOp,
        left: Box<BoundNode>,
        right: Box<BoundNode>,
    },
}

impl BoundNode {
    /// Descriptors chosen for each leaf, left to right. `_` leaves are skipped.
    pub fn descriptors(&self) -> Vec<&Arc<Descriptor>> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Arc<Descriptor>>) {
        match self {
            BoundNode::Delegate { .. } => {}
            BoundNode::Check { descriptor, .. } => out.push(descriptor),
            BoundNode::Not(inner) => inner.collect(out),
            BoundNode::Binary { left, right, .. } => {
                left.collect(out);
                right.collect(out);
            }
        }
    }
}
