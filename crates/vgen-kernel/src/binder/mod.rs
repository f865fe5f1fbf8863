//! Binding: resolve every leaf of a rule against one parameter.
//!
//! For each leaf the binder picks the first registered overload of its alias
//! whose type classes accept the parameter's type, then checks the argument
//! count. `_` is handled here rather than through the registry: it requires
//! a struct parameter and takes no arguments.
//!
//! The parsed rule and the registry are only read. The result is a separate
//! [`BoundRule`] tree.

mod bound;
pub mod pattern;

pub use bound::{BoundNode, BoundRule};

use std::sync::Arc;

use vgen_types::{Param, is_struct};

use crate::ast::{Leaf, Node};
use crate::decl::{ArgRange, Descriptor, Registry};
use crate::error::{CompileError, Result};
use crate::options::CompileOptions;

/// Binds rules against a registry.
#[derive(Debug, Clone, Copy)]
pub struct Binder<'a> {
    registry: &'a Registry,
    options: &'a CompileOptions,
}

impl<'a> Binder<'a> {
    pub fn new(registry: &'a Registry, options: &'a CompileOptions) -> Self {
        Self { registry, options }
    }

    /// Bind `rule` against `param`. The first failing leaf aborts.
    pub fn bind(&self, rule: &Node, param: &Param) -> Result<BoundRule> {
        let root = self.bind_node(rule, param)?;
        Ok(BoundRule {
            param: param.clone(),
            root,
        })
    }

    fn bind_node(&self, node: &Node, param: &Param) -> Result<BoundNode> {
        match node {
            Node::Leaf(leaf) => self.bind_leaf(leaf, param),
            Node::Not(inner) => Ok(BoundNode::Not(Box::new(self.bind_node(inner, param)?))),
            Node::Binary { op, left, right } => Ok(BoundNode::Binary {
                op: *op,
                left: Box::new(self.bind_node(left, param)?),
                right: Box::new(self.bind_node(right, param)?),
            }),
        }
    }

    fn bind_leaf(&self, leaf: &Leaf, param: &Param) -> Result<BoundNode> {
        let offset = leaf.span.start;

        if leaf.is_delegate() {
            if !is_struct(&param.ty) {
                return Err(type_mismatch(leaf, param));
            }
            if !leaf.args.is_empty() {
                return Err(CompileError::Arity {
                    alias: leaf.alias.clone(),
                    got: leaf.args.len(),
                    want: ArgRange::exact(0),
                    offset,
                });
            }
            tracing::debug!(param = %param.name, "bound `_` to the parameter's schema");
            return Ok(BoundNode::Delegate {
                message: leaf.message.clone(),
            });
        }

        let overloads = self.registry.lookup(&leaf.alias);
        if overloads.is_empty() {
            return Err(CompileError::UnrecognizedValidator {
                alias: leaf.alias.clone(),
                offset,
            });
        }

        let descriptor = overloads
            .iter()
            .find(|d| d.accepts(&param.ty))
            .ok_or_else(|| type_mismatch(leaf, param))?;

        if !descriptor.arg_count.contains(leaf.args.len()) {
            return Err(CompileError::Arity {
                alias: leaf.alias.clone(),
                got: leaf.args.len(),
                want: descriptor.arg_count,
                offset,
            });
        }

        if self.options.check_patterns && descriptor.alias == self.options.regex_alias {
            self.check_patterns(leaf, descriptor)?;
        }

        tracing::debug!(
            alias = %leaf.alias,
            validator = %descriptor.qualified_name(),
            param = %param.name,
            ty = %param.ty,
            "resolved validator"
        );

        Ok(BoundNode::Check {
            descriptor: Arc::clone(descriptor),
            args: leaf.args.clone(),
            message: leaf.message.clone(),
        })
    }

    fn check_patterns(&self, leaf: &Leaf, descriptor: &Descriptor) -> Result<()> {
        for arg in &leaf.args {
            pattern::check(arg).map_err(|message| CompileError::InvalidPattern {
                alias: descriptor.alias.clone(),
                pattern: arg.clone(),
                message,
                offset: leaf.span.start,
            })?;
        }
        Ok(())
    }
}

fn type_mismatch(leaf: &Leaf, param: &Param) -> CompileError {
    CompileError::TypeMismatch {
        alias: leaf.alias.clone(),
        ty: param.ty.to_string(),
        kind: param.ty.kind_name().to_string(),
        offset: leaf.span.start,
    }
}

/// Bind with default options.
pub fn bind(rule: &Node, param: &Param, registry: &Registry) -> Result<BoundRule> {
    Binder::new(registry, &CompileOptions::default()).bind(rule, param)
}
