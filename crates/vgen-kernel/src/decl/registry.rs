//! Registry of validator descriptors, keyed by alias.

use std::collections::HashMap;
use std::sync::Arc;

use super::descriptor::Descriptor;
use super::loader;
use crate::error::Result;

/// Declaration text for the validators shipped with vgen.
pub const BUILTIN_DECLS: &str = include_str!("../../decls/builtin.go");

/// Alias to overloads, in load order.
///
/// Several descriptors may share an alias (`len` is declared for strings and
/// for slices). Lookups return them in load order and binding picks the first
/// one that accepts the parameter's type, so descriptors loaded earlier
/// always win.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    by_alias: HashMap<String, Vec<Arc<Descriptor>>>,
    ordered: Vec<Arc<Descriptor>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding only the built-in validators.
    pub fn builtin() -> Result<Self> {
        Self::from_sources(BUILTIN_DECLS, None)
    }

    /// Load `primary` and then `custom`, so built-ins precede custom
    /// declarations under a shared alias.
    pub fn from_sources(primary: &str, custom: Option<&str>) -> Result<Self> {
        let mut registry = Self::new();
        registry.extend(loader::load(primary)?);
        if let Some(custom) = custom {
            let before = registry.len();
            registry.extend(loader::load(custom)?);
            tracing::debug!(count = registry.len() - before, "loaded custom declarations");
        }
        tracing::debug!(
            descriptors = registry.len(),
            aliases = registry.by_alias.len(),
            "built validator registry"
        );
        Ok(registry)
    }

    /// Append descriptors after everything already registered.
    pub fn extend(&mut self, descriptors: impl IntoIterator<Item = Descriptor>) {
        for descriptor in descriptors {
            self.register(descriptor);
        }
    }

    /// Append one descriptor after everything already registered.
    pub fn register(&mut self, descriptor: Descriptor) {
        let descriptor = Arc::new(descriptor);
        self.by_alias
            .entry(descriptor.alias.clone())
            .or_default()
            .push(Arc::clone(&descriptor));
        self.ordered.push(descriptor);
    }

    /// Overloads for `alias`, earliest first. Empty when unknown.
    pub fn lookup(&self, alias: &str) -> &[Arc<Descriptor>] {
        self.by_alias.get(alias).map(Vec::as_slice).unwrap_or_default()
    }

    /// Check if an alias is registered.
    pub fn contains(&self, alias: &str) -> bool {
        !self.lookup(alias).is_empty()
    }

    /// Every descriptor in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Descriptor>> {
        self.ordered.iter()
    }

    /// Registered aliases, sorted.
    pub fn aliases(&self) -> Vec<&str> {
        let mut aliases: Vec<_> = self.by_alias.keys().map(String::as_str).collect();
        aliases.sort_unstable();
        aliases
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::ArgRange;
    use vgen_types::{SemType, TypeClass};

    fn listing(registry: &Registry) -> String {
        registry
            .iter()
            .map(|d| {
                format!(
                    "{:<8} {:<14} generic={:<5} type={:<13} args={:<2} import={}",
                    d.alias,
                    d.qualified_name(),
                    d.is_generic,
                    d.allowed_types.to_string(),
                    d.arg_count.to_string(),
                    d.import_path.as_deref().unwrap_or("-"),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn builtin_golden_list() {
        let registry = Registry::builtin().expect("builtin declarations load");
        insta::assert_snapshot!(listing(&registry), @r"
        nonzero  v.Nonzero      generic=true  type=comparable    args=0  import=github.com/RussellLuo/validating/v3
        zero     v.Zero         generic=true  type=comparable    args=0  import=github.com/RussellLuo/validating/v3
        len      v.LenString    generic=false type=string        args=2  import=github.com/RussellLuo/validating/v3
        len      v.LenSlice     generic=true  type=slice         args=2  import=github.com/RussellLuo/validating/v3
        runecnt  v.RuneCount    generic=false type=string|bytes  args=2  import=github.com/RussellLuo/validating/v3
        eq       v.Eq           generic=true  type=comparable    args=1  import=github.com/RussellLuo/validating/v3
        ne       v.Ne           generic=true  type=comparable    args=1  import=github.com/RussellLuo/validating/v3
        gt       v.Gt           generic=true  type=ordered       args=1  import=github.com/RussellLuo/validating/v3
        gte      v.Gte          generic=true  type=ordered       args=1  import=github.com/RussellLuo/validating/v3
        lt       v.Lt           generic=true  type=ordered       args=1  import=github.com/RussellLuo/validating/v3
        lte      v.Lte          generic=true  type=ordered       args=1  import=github.com/RussellLuo/validating/v3
        xrange   v.Range        generic=true  type=ordered       args=2  import=github.com/RussellLuo/validating/v3
        in       v.In           generic=true  type=ordered       args=1+ import=github.com/RussellLuo/validating/v3
        nin      v.Nin          generic=true  type=ordered       args=1+ import=github.com/RussellLuo/validating/v3
        match    v.Match        generic=false type=string|bytes  args=1  import=github.com/RussellLuo/validating/v3
        email    vext.Email     generic=false type=string        args=0  import=github.com/RussellLuo/vext
        ip       vext.IP        generic=false type=string        args=0  import=github.com/RussellLuo/vext
        time     vext.Time      generic=false type=string        args=1  import=github.com/RussellLuo/vext
        ");
    }

    #[test]
    fn len_overloads_in_declaration_order() {
        let registry = Registry::builtin().expect("builtin declarations load");
        let names: Vec<_> = registry
            .lookup("len")
            .iter()
            .map(|d| d.declared_name.as_str())
            .collect();
        assert_eq!(names, vec!["LenString", "LenSlice"]);
    }

    #[test]
    fn unknown_alias_is_empty() {
        let registry = Registry::builtin().expect("builtin declarations load");
        assert!(registry.lookup("uuid").is_empty());
        assert!(!registry.contains("uuid"));
        assert!(registry.contains("xrange"));
    }

    #[test]
    fn custom_declarations_follow_builtins() {
        let custom = "package c\nimport \"example.com/strs\"\nvar _ = []any{\n// name=len type=string|slice args=1\nstrs.MaxLen,\n// type=string args=0\nstrs.Slug,\n}";
        let registry = Registry::from_sources(BUILTIN_DECLS, Some(custom)).expect("loads");
        assert_eq!(registry.len(), 20);

        let len = registry.lookup("len");
        assert_eq!(len.len(), 3);
        assert_eq!(len[0].declared_name, "LenString");
        assert_eq!(len[2].declared_name, "MaxLen");
        assert_eq!(len[2].arg_count, ArgRange::exact(1));

        let first_for_string = len
            .iter()
            .find(|d| d.accepts(&SemType::string()))
            .expect("some overload accepts string");
        assert_eq!(first_for_string.declared_name, "LenString");

        let slug = registry.lookup("slug");
        assert_eq!(slug[0].import_path.as_deref(), Some("example.com/strs"));
        assert_eq!(slug[0].allowed_types.classes(), &[TypeClass::String]);
    }

    #[test]
    fn custom_errors_propagate() {
        assert!(Registry::from_sources(BUILTIN_DECLS, Some("var _ = []any{ v.X }")).is_err());
    }

    #[test]
    fn aliases_sorted() {
        let registry = Registry::builtin().expect("builtin declarations load");
        let aliases = registry.aliases();
        assert_eq!(aliases.first(), Some(&"email"));
        assert_eq!(aliases.len(), 17);
    }

    #[test]
    fn registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
    }
}
