//! Test utilities for vgen.
//!
//! Reads and runs the rule test files kept at the workspace root:
//! - `tests/rules/parse.test`: rule text with the expected S-expression AST
//! - `tests/rules/compile.test`: a typed parameter and rule text with the
//!   expected Go expression or error
//!
//! Both files share one block format:
//!
//! ```text
//! # test: len_on_string
//! # expect: ok
//! # param: name string
//! ---
//! len(0, 20)
//! ---
//! v.LenString(0, 20)
//! ===
//! ```
//!
//! `# expect:` defaults to `ok`. With `# expect: error` the expected section
//! is a fragment the error message must contain. `# skip: <reason>` keeps a
//! case on file without running it.

pub mod compile;
pub mod parse;

use std::collections::BTreeMap;
use std::fmt;

/// One `# test:` block, before it is interpreted by a runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestBlock {
    pub name: String,
    /// Line of the `# test:` header (1-indexed).
    pub line: usize,
    /// Other `# key: value` headers, such as `expect`, `param` and `skip`.
    pub headers: BTreeMap<String, String>,
    pub input: String,
    pub expected: String,
}

impl TestBlock {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(String::as_str)
    }

    /// True unless `# expect: error`.
    pub fn expects_ok(&self) -> bool {
        self.header("expect") != Some("error")
    }
}

/// Split a test file into blocks. Text outside blocks is ignored.
pub fn read_blocks(content: &str) -> Vec<TestBlock> {
    let lines: Vec<&str> = content.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some(name) = lines[i].trim().strip_prefix("# test:") else {
            i += 1;
            continue;
        };
        let name = name.trim().to_string();
        let line = i + 1;
        i += 1;

        let mut headers = BTreeMap::new();
        while let Some(header) = lines.get(i).and_then(|l| l.trim().strip_prefix('#')) {
            if let Some((key, value)) = header.split_once(':') {
                headers.insert(key.trim().to_string(), value.trim().to_string());
            }
            i += 1;
        }

        let section = |i: &mut usize, end: &str| {
            let mut body = Vec::new();
            while *i < lines.len() && lines[*i].trim() != end {
                body.push(lines[*i]);
                *i += 1;
            }
            *i += 1;
            body.join("\n")
        };

        // Skip to the opening ---
        section(&mut i, "---");
        let input = section(&mut i, "---").trim().to_string();
        let expected = section(&mut i, "===").trim().to_string();

        blocks.push(TestBlock {
            name,
            line,
            headers,
            input,
            expected,
        });
    }

    blocks
}

/// The result of running a single test case.
#[derive(Debug, Clone)]
pub enum TestResult {
    /// Test passed.
    Pass,
    /// Test failed with expected vs actual mismatch.
    Fail { expected: String, actual: String },
    /// Test was skipped.
    Skip { reason: String },
    /// The case itself is malformed.
    Error { message: String },
}

impl TestResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, TestResult::Pass)
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, TestResult::Fail { .. })
    }

    /// Compare a successful `actual` against the block's expectation.
    pub fn check_ok(block: &TestBlock, actual: String) -> Self {
        if !block.expects_ok() {
            return TestResult::Fail {
                expected: format!("error containing: {}", block.expected),
                actual,
            };
        }
        if normalize(&actual) == normalize(&block.expected) {
            TestResult::Pass
        } else {
            TestResult::Fail {
                expected: block.expected.clone(),
                actual,
            }
        }
    }

    /// Compare a failure message against the block's expectation.
    pub fn check_err(block: &TestBlock, message: String) -> Self {
        if block.expects_ok() {
            TestResult::Fail {
                expected: block.expected.clone(),
                actual: format!("error: {message}"),
            }
        } else if message.contains(&block.expected) {
            TestResult::Pass
        } else {
            TestResult::Fail {
                expected: format!("error containing: {}", block.expected),
                actual: format!("error: {message}"),
            }
        }
    }
}

/// Collapse whitespace runs for comparison.
fn normalize(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Summary of running multiple test cases.
#[derive(Debug, Default)]
pub struct TestSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errors: usize,
    pub failures: Vec<TestFailure>,
}

/// A single test failure with context.
#[derive(Debug, Clone)]
pub struct TestFailure {
    pub name: String,
    pub line: usize,
    pub result: TestResult,
}

impl TestSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `case` over every block, honouring `# skip:`.
    pub fn run(blocks: &[TestBlock], case: impl Fn(&TestBlock) -> TestResult) -> Self {
        let mut summary = Self::new();
        for block in blocks {
            let result = match block.header("skip") {
                Some(reason) => TestResult::Skip {
                    reason: reason.to_string(),
                },
                None => case(block),
            };
            summary.record(&block.name, block.line, result);
        }
        summary
    }

    pub fn record(&mut self, name: impl Into<String>, line: usize, result: TestResult) {
        match &result {
            TestResult::Pass => self.passed += 1,
            TestResult::Skip { .. } => self.skipped += 1,
            TestResult::Fail { .. } | TestResult::Error { .. } => {
                if result.is_fail() {
                    self.failed += 1;
                } else {
                    self.errors += 1;
                }
                self.failures.push(TestFailure {
                    name: name.into(),
                    line,
                    result,
                });
            }
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped + self.errors
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }
}

impl fmt::Display for TestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{}", "═".repeat(60))?;
        writeln!(f, "Test Summary: {} total", self.total())?;
        writeln!(
            f,
            "  ✓ {} passed  ✗ {} failed  ⊘ {} skipped  ⚠ {} errors",
            self.passed, self.failed, self.skipped, self.errors
        )?;

        if !self.failures.is_empty() {
            writeln!(f, "\nFailures:")?;
            for failure in &self.failures {
                writeln!(f, "\n  {} (line {})", failure.name, failure.line)?;
                match &failure.result {
                    TestResult::Fail { expected, actual } => {
                        writeln!(f, "    expected: {expected}")?;
                        writeln!(f, "    actual:   {actual}")?;
                    }
                    TestResult::Error { message } => {
                        writeln!(f, "    error: {message}")?;
                    }
                    _ => {}
                }
            }
        }
        writeln!(f, "{}", "═".repeat(60))?;
        Ok(())
    }
}
