//! `vgen.toml` loading.
//!
//! ```toml
//! custom_decls = "decls/custom.go"
//! qualifier = "v"
//! check_patterns = true
//! ```
//!
//! Everything besides `custom_decls` is a [`CompileOptions`] field. A relative
//! `custom_decls` path is resolved against the directory of the file that
//! names it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use vgen_kernel::decl::BUILTIN_DECLS;
use vgen_kernel::{CompileOptions, Compiler, Registry};

pub const CONFIG_FILE: &str = "vgen.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Declaration file loaded after the built-ins.
    pub custom_decls: Option<PathBuf>,
    #[serde(flatten)]
    pub options: CompileOptions,
}

impl Config {
    /// Load the configuration the CLI runs with.
    ///
    /// An explicit path must exist. Otherwise the first of `./vgen.toml` and
    /// `<config dir>/vgen/vgen.toml` that exists is used, or the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        Self::load_with(explicit, &search_paths())
    }

    pub fn load_with(explicit: Option<&Path>, candidates: &[PathBuf]) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => Self::from_file(path),
            None => {
                tracing::debug!("no {CONFIG_FILE} found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: Config =
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;

        if let (Some(custom), Some(dir)) = (&config.custom_decls, path.parent()) {
            if custom.is_relative() {
                config.custom_decls = Some(dir.join(custom));
            }
        }
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Build a compiler from these settings. `custom` overrides
    /// `custom_decls`.
    pub fn compiler(&self, custom: Option<&Path>) -> Result<Compiler> {
        let custom_path = custom.or(self.custom_decls.as_deref());
        let custom_text = custom_path
            .map(|path| {
                std::fs::read_to_string(path)
                    .with_context(|| format!("reading declarations {}", path.display()))
            })
            .transpose()?;

        let registry = Registry::from_sources(BUILTIN_DECLS, custom_text.as_deref())
            .with_context(|| match custom_path {
                Some(path) => format!("loading declarations from {}", path.display()),
                None => "loading built-in declarations".to_string(),
            })?;

        Ok(Compiler::new(Arc::new(registry), self.options.clone()))
    }
}

/// `./vgen.toml`, then the user config directory.
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = config_dir() {
        paths.push(dir.join(CONFIG_FILE));
    }
    paths
}

/// `$XDG_CONFIG_HOME/vgen` or the platform equivalent.
pub fn config_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|d| d.config_dir().join("vgen"))
}

/// `$XDG_DATA_HOME/vgen`, where REPL history lives.
pub fn data_dir() -> Option<PathBuf> {
    BaseDirs::new().map(|d| d.data_dir().join("vgen"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattened_options() {
        let config: Config = toml::from_str(
            r#"
            custom_decls = "/etc/vgen/custom.go"
            qualifier = "validating"
            check_patterns = false
            "#,
        )
        .expect("config parses");
        assert_eq!(config.custom_decls, Some(PathBuf::from("/etc/vgen/custom.go")));
        assert_eq!(config.options.qualifier, "validating");
        assert!(!config.options.check_patterns);
        assert_eq!(config.options.regex_alias, "match");
    }

    #[test]
    fn empty_file_is_defaults() {
        let config: Config = toml::from_str("").expect("config parses");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn paths_are_under_vgen() {
        if let Some(dir) = config_dir() {
            assert!(dir.ends_with("vgen"));
        }
        assert_eq!(search_paths()[0], PathBuf::from("vgen.toml"));
    }
}
