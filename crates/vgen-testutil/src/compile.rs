//! Runner for `tests/rules/compile.test`: typed parameter and rule text to a
//! Go expression or an error.
//!
//! Each case names its parameter with `# param: <name> <type>`, where the
//! type is written in the syntax [`vgen_types::parse_type`] reads.
//! Cases may also set `# custom: <file>` to name a declaration file from the
//! `custom` map handed to the runner, loaded after the built-ins.

use std::collections::HashMap;

use vgen_kernel::Compiler;
use vgen_types::{Param, parse_type};

use crate::{TestBlock, TestResult, TestSummary, read_blocks};

/// Read `# param: name type`.
pub fn block_param(block: &TestBlock) -> Result<Param, String> {
    let header = block
        .header("param")
        .ok_or_else(|| "missing `# param: <name> <type>` header".to_string())?;
    let (name, ty) = header
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("`# param: {header}` needs a name and a type"))?;
    let ty = parse_type(ty.trim()).map_err(|e| format!("bad parameter type: {e}"))?;
    Ok(Param::new(name, ty))
}

/// Run one compile case against `compiler`.
pub fn run_case(compiler: &Compiler, block: &TestBlock) -> TestResult {
    let param = match block_param(block) {
        Ok(param) => param,
        Err(message) => return TestResult::Error { message },
    };
    match compiler.compile(&block.input, &param) {
        Ok(expr) => TestResult::check_ok(block, expr),
        Err(err) => TestResult::check_err(block, err.to_string()),
    }
}

/// Run every case in a compile test file.
///
/// `custom` maps `# custom:` names to declaration text.
pub fn run_compile_tests(content: &str, custom: &HashMap<&str, &str>) -> TestSummary {
    let builtin = match Compiler::builtin() {
        Ok(compiler) => compiler,
        Err(err) => {
            let mut summary = TestSummary::new();
            summary.record(
                "builtin declarations",
                0,
                TestResult::Error {
                    message: err.to_string(),
                },
            );
            return summary;
        }
    };

    TestSummary::run(&read_blocks(content), |block| match block.header("custom") {
        None => run_case(&builtin, block),
        Some(name) => match custom.get(name) {
            None => TestResult::Error {
                message: format!("no custom declarations named `{name}`"),
            },
            Some(text) => match Compiler::with_custom(text) {
                Ok(compiler) => run_case(&compiler, block),
                Err(err) => TestResult::check_err(block, err.to_string()),
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_header() {
        let block = TestBlock {
            name: "t".into(),
            line: 1,
            headers: [("param".to_string(), "tags []string".to_string())].into(),
            input: String::new(),
            expected: String::new(),
        };
        let param = block_param(&block).expect("param reads");
        assert_eq!(param.name, "tags");
        assert_eq!(param.ty.to_string(), "[]string");
    }

    #[test]
    fn runs_cases() {
        let content = r#"
# test: range
# param: age int
---
xrange(0, 100)
---
v.Range[int](0, 100)
===

# test: mismatch
# expect: error
# param: tags []string
---
match(`x`)
---
cannot use validator `match` on type []string
===

# test: custom
# param: id string
# custom: ids
---
uuid
---
ids.UUID()
===

# test: no_param
---
nonzero
---
v.Nonzero[string]()
===
"#;
        let custom = HashMap::from([(
            "ids",
            "import \"example.com/ids\"\nvar _ = []any{\n// type=string args=0\nids.UUID,\n}",
        )]);
        let summary = run_compile_tests(content, &custom);
        assert_eq!(summary.passed, 3, "{summary}");
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.failures[0].name, "no_param");
    }
}
