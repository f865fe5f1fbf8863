//! Runner for `tests/rules/parse.test`: rule text to S-expression.

use vgen_kernel::ast::sexpr::format_node;
use vgen_kernel::parser::parse;

use crate::{TestBlock, TestResult, TestSummary, read_blocks};

/// Run one parse case.
pub fn run_case(block: &TestBlock) -> TestResult {
    match parse(&block.input) {
        Ok(node) => TestResult::check_ok(block, format_node(&node)),
        Err(err) => TestResult::check_err(block, err.to_string()),
    }
}

/// Run every case in a parse test file.
pub fn run_parse_tests(content: &str) -> TestSummary {
    TestSummary::run(&read_blocks(content), run_case)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_ok_and_error_cases() {
        let content = r#"
# test: negation
---
!nonzero
---
(not (leaf nonzero))
===

# test: bad_message
# expect: error
---
gt(0).msg(1)
---
expected a string, found 1
===
"#;
        let summary = run_parse_tests(content);
        assert!(summary.all_passed(), "{summary}");
        assert_eq!(summary.passed, 2);
    }

    #[test]
    fn mismatch_is_reported() {
        let content = "# test: wrong\n---\na && b\n---\n(or (leaf a) (leaf b))\n===\n";
        let summary = run_parse_tests(content);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].name, "wrong");
    }
}
