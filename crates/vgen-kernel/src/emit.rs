//! Rendering bound rules as Go validator expressions.
//!
//! ```text
//! !nonzero || runecnt(10, 20) && match(`^\w+$`)     on x string
//! v.Any(v.Not(v.Nonzero[string]()), v.All(v.RuneCount(10, 20), v.Match(regexp.MustCompile(`^\w+$`))))
//! ```

use crate::binder::{BoundNode, BoundRule};
use crate::options::CompileOptions;

/// Renders bound rules. Emission cannot fail.
#[derive(Debug, Clone, Copy)]
pub struct Emitter<'a> {
    options: &'a CompileOptions,
}

impl<'a> Emitter<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        Self { options }
    }

    pub fn emit(&self, rule: &BoundRule) -> String {
        let mut out = String::new();
        self.write_node(&mut out, &rule.root, rule);
        out
    }

    fn write_node(&self, out: &mut String, node: &BoundNode, rule: &BoundRule) {
        match node {
            BoundNode::Delegate { message } => {
                out.push_str(&rule.param.name);
                out.push('.');
                out.push_str(&self.options.schema_accessor);
                write_message(out, message.as_deref());
            }
            BoundNode::Check {
                descriptor,
                args,
                message,
            } => {
                out.push_str(&descriptor.qualified_name());
                if descriptor.is_generic {
                    out.push('[');
                    out.push_str(&rule.param.ty.to_string());
                    out.push(']');
                }
                out.push('(');
                let joined = args.join(", ");
                if descriptor.alias == self.options.regex_alias {
                    out.push_str(&self.options.regex_wrapper);
                    out.push('(');
                    out.push_str(&joined);
                    out.push(')');
                } else {
                    out.push_str(&joined);
                }
                out.push(')');
                write_message(out, message.as_deref());
            }
            BoundNode::Not(inner) => {
                self.open(out, "Not");
                self.write_node(out, inner, rule);
                out.push(')');
            }
            BoundNode::Binary { op, left, right } => {
                self.open(out, op.combinator());
                self.write_node(out, left, rule);
                out.push_str(", ");
                self.write_node(out, right, rule);
                out.push(')');
            }
        }
    }

    fn open(&self, out: &mut String, combinator: &str) {
        out.push_str(&self.options.qualifier);
        out.push('.');
        out.push_str(combinator);
        out.push('(');
    }
}

fn write_message(out: &mut String, message: Option<&str>) {
    if let Some(message) = message {
        out.push_str(".Msg(");
        out.push_str(message);
        out.push(')');
    }
}

/// Emit with default options.
pub fn emit(rule: &BoundRule) -> String {
    Emitter::new(&CompileOptions::default()).emit(rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::bind;
    use crate::decl::Registry;
    use crate::parser::parse;
    use proptest::prelude::*;
    use rstest::rstest;
    use vgen_types::{BasicKind, Field, Param, SemType, is_bytes};

    fn user() -> SemType {
        SemType::named(
            "usersvc.User",
            SemType::structure(vec![Field::new("Name", SemType::string())]),
        )
    }

    fn compile(rule: &str, ty: SemType) -> String {
        let registry = Registry::builtin().expect("builtin declarations load");
        let node = parse(rule).expect("rule parses");
        emit(&bind(&node, &Param::new("x", ty), &registry).expect("binds"))
    }

    #[rstest]
    #[case("!lt(0)", SemType::int(), "v.Not(v.Lt[int](0))")]
    #[case("xrange(0, 100)", SemType::int(), "v.Range[int](0, 100)")]
    #[case("nonzero", SemType::string(), "v.Nonzero[string]()")]
    #[case(
        r#"len(0,20).msg("bad length") && match(`^\w+$`)"#,
        SemType::string(),
        r#"v.All(v.LenString(0, 20).Msg("bad length"), v.Match(regexp.MustCompile(`^\w+$`)))"#
    )]
    #[case(
        r#"len(0,20).msg("bad length")"#,
        SemType::slice(SemType::string()),
        r#"v.LenSlice[[]string](0, 20).Msg("bad length")"#
    )]
    #[case("_", user(), "x.Schema()")]
    #[case(r#"_.msg("bad user")"#, user(), r#"x.Schema().Msg("bad user")"#)]
    #[case(
        r#"!nonzero || runecnt(10, 20) && match(`^\w+$`)"#,
        SemType::string(),
        r#"v.Any(v.Not(v.Nonzero[string]()), v.All(v.RuneCount(10, 20), v.Match(regexp.MustCompile(`^\w+$`))))"#
    )]
    #[case("in(1, 2, 3)", SemType::named("Level", SemType::int()), "v.In[Level](1, 2, 3)")]
    #[case("email && time(`2006-01-02`)", SemType::string(), "v.All(vext.Email(), vext.Time(`2006-01-02`))")]
    fn golden(#[case] rule: &str, #[case] ty: SemType, #[case] want: &str) {
        assert_eq!(compile(rule, ty), want);
    }

    #[test]
    fn left_associative_nesting() {
        assert_eq!(
            compile("gt(0) || lt(-10) || eq(5)", SemType::int()),
            "v.Any(v.Any(v.Gt[int](0), v.Lt[int](-10)), v.Eq[int](5))"
        );
    }

    #[test]
    fn custom_options() {
        let registry = Registry::builtin().expect("builtin declarations load");
        let node = parse("!match(pattern) && _").expect("rule parses");
        let bound = bind(&node, &Param::new("req", user()), &registry);
        assert!(bound.is_err(), "match does not accept a struct");

        let node = parse("!match(pattern)").expect("rule parses");
        let bound = bind(&node, &Param::new("name", SemType::string()), &registry).expect("binds");
        let options = CompileOptions {
            qualifier: "val".into(),
            regex_wrapper: "mustRegex".into(),
            ..CompileOptions::default()
        };
        assert_eq!(
            Emitter::new(&options).emit(&bound),
            "val.Not(v.Match(mustRegex(pattern)))"
        );

        let node = parse("_").expect("rule parses");
        let bound = bind(&node, &Param::new("req", user()), &registry).expect("binds");
        let options = CompileOptions {
            schema_accessor: "Rules()".into(),
            ..CompileOptions::default()
        };
        assert_eq!(Emitter::new(&options).emit(&bound), "req.Rules()");
    }

    /// Recognizer for emitted expressions:
    /// `qualifiedName ["[" typeArg "]"] "(" args ")" [".Msg(" literal ")"]`,
    /// possibly nested in `v.Not(..)`, `v.All(.., ..)` and `v.Any(.., ..)`.
    struct Shape<'a> {
        rest: &'a str,
        type_args: Vec<&'a str>,
    }

    impl<'a> Shape<'a> {
        /// The type arguments of every generic call, or `None` if `text`
        /// does not match the grammar.
        fn parse(text: &'a str) -> Option<Vec<&'a str>> {
            let mut shape = Shape {
                rest: text,
                type_args: Vec::new(),
            };
            (shape.expr() && shape.rest.is_empty()).then_some(shape.type_args)
        }

        fn eat(&mut self, prefix: &str) -> bool {
            match self.rest.strip_prefix(prefix) {
                Some(rest) => {
                    self.rest = rest;
                    true
                }
                None => false,
            }
        }

        fn expr(&mut self) -> bool {
            if self.eat("v.Not(") {
                return self.expr() && self.eat(")");
            }
            if self.eat("v.All(") || self.eat("v.Any(") {
                return self.expr() && self.eat(", ") && self.expr() && self.eat(")");
            }
            self.call()
        }

        fn call(&mut self) -> bool {
            if !(self.ident() && self.eat(".") && self.ident()) {
                return false;
            }
            if self.rest.starts_with('[') {
                let Some(inner) = self.balanced('[', ']') else {
                    return false;
                };
                self.type_args.push(inner);
            }
            if !self.rest.starts_with('(') || self.balanced('(', ')').is_none() {
                return false;
            }
            if self.eat(".Msg(") {
                return self.literal() && self.eat(")");
            }
            true
        }

        fn ident(&mut self) -> bool {
            let len = self
                .rest
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(self.rest.len());
            self.rest = &self.rest[len..];
            len > 0
        }

        /// A bracketed group starting at `open`, skipping string literals.
        /// Returns the text between the outer brackets.
        fn balanced(&mut self, open: char, close: char) -> Option<&'a str> {
            let text = self.rest;
            let mut depth = 0usize;
            let mut chars = text.char_indices();
            while let Some((i, c)) = chars.next() {
                match c {
                    '"' => while chars.next()?.1 != '"' {},
                    '`' => while chars.next()?.1 != '`' {},
                    c if c == open => depth += 1,
                    c if c == close => {
                        depth -= 1;
                        if depth == 0 {
                            self.rest = &text[i + 1..];
                            return Some(&text[1..i]);
                        }
                    }
                    _ => {}
                }
            }
            None
        }

        fn literal(&mut self) -> bool {
            let mut chars = self.rest.char_indices();
            let end = match chars.next() {
                Some((_, '`')) => self.rest[1..].find('`').map(|i| i + 2),
                Some((_, '"')) => loop {
                    match chars.next() {
                        Some((_, '\\')) => {
                            chars.next();
                        }
                        Some((i, '"')) => break Some(i + 1),
                        Some(_) => {}
                        None => break None,
                    }
                },
                _ => None,
            };
            match end {
                Some(end) => {
                    self.rest = &self.rest[end..];
                    true
                }
                None => false,
            }
        }
    }

    #[rstest]
    #[case("v.Nonzero[string]()", Some(vec!["string"]))]
    #[case(r#"v.LenSlice[[]int](0, 2).Msg("a \"b\"")"#, Some(vec!["[]int"]))]
    #[case("v.Not(v.Match(regexp.MustCompile(`(a)`)))", Some(vec![]))]
    #[case(
        r#"v.All(x.Schema().Msg(`m`), v.Any(v.Gt[int](0), v.Lt[int](9)))"#,
        Some(vec!["int", "int"])
    )]
    #[case("v.Nonzero", None)]
    #[case("v.All(v.Zero[int]())", None)]
    #[case(r#"v.Eq[int](1).Msg(oops)"#, None)]
    #[case("v.Eq(1) trailing", None)]
    fn shape_recognizer(#[case] text: &str, #[case] want: Option<Vec<&str>>) {
        assert_eq!(Shape::parse(text), want);
    }

    fn string_leaves() -> Vec<&'static str> {
        vec![
            "nonzero",
            "zero",
            "len(0, 20)",
            r#"runecnt(1, 5).msg("bad")"#,
            "match(`^[a-z]+$`)",
            r#"in("a", "b")"#,
            "email",
        ]
    }

    /// Leaves that bind for `ty`.
    fn leaves_for(ty: &SemType) -> Vec<&'static str> {
        if is_bytes(ty) {
            return vec!["runecnt(1, 5)", "match(`^a`)", r#"len(0, 9).msg("long")"#];
        }
        match ty.underlying() {
            SemType::Basic(kind) if kind.is_string() => string_leaves(),
            SemType::Basic(_) => vec![
                "nonzero",
                "gt(0)",
                "xrange(0, 10)",
                r#"in(1, 2).msg("not allowed")"#,
                "eq(3)",
            ],
            _ => vec!["len(1, 5)", r#"len(0, 2).msg("too many")"#],
        }
    }

    fn arb_rule_from(leaves: Vec<&'static str>) -> impl Strategy<Value = String> {
        let leaf = proptest::sample::select(leaves).prop_map(str::to_string);
        leaf.prop_recursive(4, 24, 2, |inner| {
            prop_oneof![
                inner.clone().prop_map(|r| format!("!({r})")),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("({l}) && ({r})")),
                (inner.clone(), inner).prop_map(|(l, r)| format!("({l}) || ({r})")),
            ]
        })
    }

    fn arb_rule() -> impl Strategy<Value = String> {
        arb_rule_from(string_leaves())
    }

    fn arb_typed_rule() -> impl Strategy<Value = (SemType, String)> {
        prop_oneof![
            Just(SemType::string()),
            Just(SemType::int()),
            Just(SemType::basic(BasicKind::Float64)),
            Just(SemType::named("Level", SemType::int())),
            Just(SemType::slice(SemType::string())),
            Just(SemType::bytes()),
        ]
        .prop_flat_map(|ty| {
            let leaves = leaves_for(&ty);
            (Just(ty), arb_rule_from(leaves))
        })
    }

    proptest! {
        #[test]
        fn emission_is_idempotent((ty, rule) in arb_typed_rule()) {
            let registry = Registry::builtin().expect("builtin declarations load");
            let node = parse(&rule).expect("generated rules parse");
            let bound = bind(&node, &Param::new("s", ty), &registry).expect("binds");
            let first = emit(&bound);
            let second = emit(&bound);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn emission_follows_the_expression_grammar((ty, rule) in arb_typed_rule()) {
            let registry = Registry::builtin().expect("builtin declarations load");
            let node = parse(&rule).expect("generated rules parse");
            let bound = bind(&node, &Param::new("s", ty.clone()), &registry).expect("binds");
            let out = emit(&bound);
            let type_args = Shape::parse(&out);
            prop_assert!(type_args.is_some(), "{} does not match the grammar", out);
            let want = ty.to_string();
            for arg in type_args.unwrap_or_default() {
                prop_assert_eq!(arg, want.as_str());
            }
        }

        #[test]
        fn canonical_text_emits_the_same(rule in arb_rule()) {
            let registry = Registry::builtin().expect("builtin declarations load");
            let param = Param::new("s", SemType::string());
            let node = parse(&rule).expect("generated rules parse");
            let again = parse(&node.to_string()).expect("canonical text parses");
            let a = emit(&bind(&node, &param, &registry).expect("binds"));
            let b = emit(&bind(&again, &param, &registry).expect("binds"));
            prop_assert_eq!(a, b);
        }
    }
}
