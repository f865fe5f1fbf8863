//! Human-readable error reports.

use ariadne::{Config, IndexType, Label, Report, ReportKind, Source};

use crate::error::CompileError;

const SOURCE_ID: &str = "rule";

impl CompileError {
    /// Render the error against the rule text it came from, without colour.
    ///
    /// Errors that point into the rule get a labelled excerpt. Declaration
    /// errors, errors against empty text, and offsets that do not fall on a
    /// character boundary of `source` render as a single line.
    pub fn report(&self, source: &str) -> String {
        let Some(offset) = self.offset().filter(|_| !source.is_empty()) else {
            return format!("error: {self}");
        };
        let start = offset.min(source.len());
        // An offset inside a character means the text is not the compiled rule.
        let Some(tail) = source.get(start..) else {
            return format!("error: {self}");
        };
        let end = tail.chars().next().map_or(start, |c| start + c.len_utf8());

        let report = Report::build(ReportKind::Error, (SOURCE_ID, start..end))
            .with_config(
                Config::default()
                    .with_color(false)
                    .with_index_type(IndexType::Byte),
            )
            .with_message(self.headline())
            .with_label(Label::new((SOURCE_ID, start..end)).with_message(self.kind()))
            .finish();

        let mut out = Vec::new();
        match report.write((SOURCE_ID, Source::from(source)), &mut out) {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => format!("error: {self}"),
        }
    }

    /// The message without the `1:<col>:` prefix that syntax errors carry.
    fn headline(&self) -> String {
        match self {
            CompileError::ExpressionSyntax { message, .. }
            | CompileError::MessageSyntax { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::Compiler;
    use crate::error::CompileError;
    use vgen_types::{Param, SemType};

    fn report(rule: &str, ty: SemType) -> String {
        let compiler = Compiler::builtin().expect("builtin declarations load");
        let err = compiler
            .compile(rule, &Param::new("x", ty))
            .expect_err("rule should fail");
        err.report(rule)
    }

    #[test]
    fn syntax_error_points_at_token() {
        let out = report("nonzero &&", SemType::string());
        assert!(out.contains("Error:"), "{out}");
        assert!(out.contains("nonzero &&"), "{out}");
        assert!(out.contains("expression syntax"), "{out}");
    }

    #[test]
    fn resolution_error_labels_leaf() {
        let out = report("nonzero && uuid", SemType::string());
        assert!(out.contains(r#"unrecognized validator "uuid""#), "{out}");
        assert!(out.contains("nonzero && uuid"), "{out}");
    }

    #[test]
    fn decl_errors_render_plainly() {
        let err = Compiler::with_custom("var _ = []any{ x.Y }").unwrap_err();
        assert_eq!(
            err.report(""),
            "error: bad declaration at line 1: missing metadata comment for x.Y"
        );
    }

    #[test]
    fn offset_inside_a_character_renders_plainly() {
        let err = CompileError::UnrecognizedValidator {
            alias: "uuid".into(),
            offset: 1,
        };
        assert_eq!(err.report("é"), r#"error: unrecognized validator "uuid""#);
    }

    #[test]
    fn offset_past_end_is_clamped() {
        let out = report("", SemType::string());
        assert!(out.contains("empty rule"), "{out}");
    }
}
