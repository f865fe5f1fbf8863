//! The compiler facade: parse, bind and emit with one shared registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use vgen_types::Param;

use crate::ast::Node;
use crate::binder::{Binder, BoundRule};
use crate::decl::{BUILTIN_DECLS, Registry};
use crate::emit::Emitter;
use crate::error::Result;
use crate::options::CompileOptions;
use crate::parser;

/// Compiles rule text into Go validator expressions.
///
/// Cheap to clone; the registry is shared.
#[derive(Debug, Clone)]
pub struct Compiler {
    registry: Arc<Registry>,
    options: CompileOptions,
}

/// One parameter's compiled expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledParam {
    pub name: String,
    pub expr: String,
}

impl Compiler {
    pub fn new(registry: Arc<Registry>, options: CompileOptions) -> Self {
        Self { registry, options }
    }

    /// Compiler over the built-in validators.
    pub fn builtin() -> Result<Self> {
        Ok(Self::new(Arc::new(Registry::builtin()?), CompileOptions::default()))
    }

    /// Compiler over the built-in validators followed by `custom` declarations.
    pub fn with_custom(custom: &str) -> Result<Self> {
        let registry = Registry::from_sources(BUILTIN_DECLS, Some(custom))?;
        Ok(Self::new(Arc::new(registry), CompileOptions::default()))
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn parse(&self, rule: &str) -> Result<Node> {
        parser::parse(rule)
    }

    pub fn bind(&self, rule: &Node, param: &Param) -> Result<BoundRule> {
        Binder::new(&self.registry, &self.options).bind(rule, param)
    }

    pub fn emit(&self, rule: &BoundRule) -> String {
        Emitter::new(&self.options).emit(rule)
    }

    /// Parse, bind and emit one rule.
    pub fn compile(&self, rule: &str, param: &Param) -> Result<String> {
        let node = self.parse(rule)?;
        let bound = self.bind(&node, param)?;
        Ok(self.emit(&bound))
    }

    /// Compile the rules of one method.
    ///
    /// `schema` maps parameter names to rule text. Output follows parameter
    /// order and skips parameters without a rule. Keys naming no parameter
    /// are logged and ignored.
    pub fn compile_method(
        &self,
        params: &[Param],
        schema: &BTreeMap<String, String>,
    ) -> Result<Vec<CompiledParam>> {
        for key in schema.keys() {
            if !params.iter().any(|p| &p.name == key) {
                tracing::warn!(param = %key, "rule names no parameter of the method, skipping");
            }
        }

        let mut compiled = Vec::new();
        for param in params {
            let Some(rule) = schema.get(&param.name) else {
                continue;
            };
            let expr = self.compile(rule, param).inspect_err(|e| {
                tracing::debug!(param = %param.name, error = %e, "rule failed to compile");
            })?;
            compiled.push(CompiledParam {
                name: param.name.clone(),
                expr,
            });
        }
        Ok(compiled)
    }
}
