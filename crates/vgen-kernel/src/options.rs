//! Knobs for binding and emission.

use serde::{Deserialize, Serialize};

/// How rules are bound and how Go expressions are rendered.
///
/// Every field has a default, so a partial TOML table deserialises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Package qualifier for the `Not`, `All` and `Any` combinators.
    pub qualifier: String,
    /// Appended to the parameter name for `_`.
    pub schema_accessor: String,
    /// Alias whose arguments are regular expressions.
    pub regex_alias: String,
    /// Wraps the arguments of `regex_alias` in generated code.
    pub regex_wrapper: String,
    /// Compile literal patterns given to `regex_alias` while binding.
    pub check_patterns: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            qualifier: "v".to_string(),
            schema_accessor: "Schema()".to_string(),
            regex_alias: "match".to_string(),
            regex_wrapper: "regexp.MustCompile".to_string(),
            check_patterns: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options: CompileOptions =
            serde_json::from_str(r#"{"qualifier": "val", "check_patterns": false}"#).expect("parses");
        assert_eq!(options.qualifier, "val");
        assert!(!options.check_patterns);
        assert_eq!(options.schema_accessor, "Schema()");
        assert_eq!(options.regex_wrapper, "regexp.MustCompile");
    }
}
