//! Parser for rule text.
//!
//! Transforms the token stream from the lexer into a rule AST in two passes.
//! Chumsky first builds a loose tree that admits any `.name(...)` suffix
//! chain after a primary. A lowering pass then checks the suffixes, so
//! malformed `.msg(...)` calls are reported as message errors pointing at
//! the suffix rather than as generic syntax errors.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! rule    = or
//! or      = and { "||" and }
//! and     = unary { "&&" unary }
//! unary   = "!" unary | primary
//! primary = ( ident [ args ] | "(" rule ")" ) { "." ident [ args ] }
//! args    = "(" [ arg { "," arg } [ "," ] ] ")"
//! ```

use crate::ast::{BinaryOp, Leaf, Node};
use crate::error::{CompileError, Result};
use crate::lexer::{self, Token};
use chumsky::{input::ValueInput, prelude::*};

/// Span type used throughout the parser.
pub type Span = SimpleSpan;

type Extra<'tokens> = extra::Err<Rich<'tokens, Token, Span>>;

/// Parse rule text into an AST.
pub fn parse(source: &str) -> Result<Node> {
    let tokens = lexer::tokenize(source)
        .map_err(|e| CompileError::syntax(e.span.start, e.message()))?;

    if tokens.is_empty() {
        return Err(CompileError::syntax(source.len(), "empty rule"));
    }

    let tokens: Vec<(Token, Span)> = tokens
        .into_iter()
        .map(|spanned| (spanned.token, (spanned.span.start..spanned.span.end).into()))
        .collect();

    let end_span: Span = (source.len()..source.len()).into();

    let parser = rule_parser().then_ignore(end());
    let raw = parser
        .parse(tokens.as_slice().map(end_span, |(t, s)| (t, s)))
        .into_result()
        .map_err(|errs| match errs.into_iter().next() {
            Some(e) => CompileError::syntax(e.span().start, e.to_string()),
            None => CompileError::syntax(0, "invalid rule"),
        })?;

    lower(raw)
}

// ═══════════════════════════════════════════════════════════════════════════
// Loose tree
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct RawArg {
    text: String,
    is_string: bool,
    span: Span,
}

#[derive(Debug, Clone)]
struct Suffix {
    name: String,
    name_span: Span,
    args: Option<Vec<RawArg>>,
    span: Span,
}

#[derive(Debug, Clone)]
enum Raw {
    Leaf {
        alias: String,
        args: Option<Vec<RawArg>>,
        suffixes: Vec<Suffix>,
        span: Span,
    },
    Group {
        inner: Box<Raw>,
        suffixes: Vec<Suffix>,
    },
    Not(Box<Raw>),
    Binary {
        op: BinaryOp,
        left: Box<Raw>,
        right: Box<Raw>,
    },
}

// ═══════════════════════════════════════════════════════════════════════════
// Parser Combinators - generic over input type
// ═══════════════════════════════════════════════════════════════════════════

/// Full rule parser: `||` of `&&` of unary terms.
fn rule_parser<'tokens, I>() -> impl Parser<'tokens, I, Raw, Extra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    recursive(|rule| {
        let primary = leaf_parser().or(group_parser(rule)).labelled("rule");

        let unary = recursive(|unary| {
            just(Token::Bang)
                .ignore_then(unary)
                .map(|inner| Raw::Not(Box::new(inner)))
                .or(primary)
        });

        // and: unary { "&&" unary }
        let and = unary.clone().foldl(
            just(Token::And).ignore_then(unary).repeated(),
            |left, right| Raw::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
            },
        );

        // or: and { "||" and }
        and.clone().foldl(
            just(Token::Or).ignore_then(and).repeated(),
            |left, right| Raw::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            },
        )
    })
    .boxed()
}

/// Validator reference: `alias`, `alias(args)`, with any suffixes.
fn leaf_parser<'tokens, I>() -> impl Parser<'tokens, I, Raw, Extra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    ident_parser()
        .then(args_parser().or_not())
        .then(suffixes_parser())
        .map_with(|((alias, args), suffixes), e| Raw::Leaf {
            alias,
            args,
            suffixes,
            span: e.span(),
        })
        .labelled("validator")
}

/// Parenthesised rule, with any suffixes so they can be rejected later.
fn group_parser<'tokens, I, R>(rule: R) -> impl Parser<'tokens, I, Raw, Extra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
    R: Parser<'tokens, I, Raw, Extra<'tokens>> + Clone,
{
    rule.delimited_by(just(Token::LParen), just(Token::RParen))
        .then(suffixes_parser())
        .map(|(inner, suffixes)| Raw::Group {
            inner: Box::new(inner),
            suffixes,
        })
}

/// Zero or more `.name` / `.name(args)` suffixes.
fn suffixes_parser<'tokens, I>() -> impl Parser<'tokens, I, Vec<Suffix>, Extra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    just(Token::Dot)
        .ignore_then(ident_parser().map_with(|name, e| (name, e.span())))
        .then(args_parser().or_not())
        .map_with(|((name, name_span), args), e| Suffix {
            name,
            name_span,
            args,
            span: e.span(),
        })
        .repeated()
        .collect::<Vec<_>>()
}

/// Parenthesised argument list, trailing comma allowed.
fn args_parser<'tokens, I>() -> impl Parser<'tokens, I, Vec<RawArg>, Extra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    arg_parser()
        .separated_by(just(Token::Comma))
        .allow_trailing()
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LParen), just(Token::RParen))
        .labelled("arguments")
}

/// A single literal or identifier argument, kept verbatim.
fn arg_parser<'tokens, I>() -> impl Parser<'tokens, I, RawArg, Extra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    select! {
        Token::Int(s) => (s, false),
        Token::Float(s) => (s, false),
        Token::Char(s) => (s, false),
        Token::Ident(s) => (s, false),
        Token::Str(s) => (s, true),
        Token::RawStr(s) => (s, true),
    }
    .map_with(|(text, is_string), e| RawArg {
        text,
        is_string,
        span: e.span(),
    })
    .labelled("argument")
}

/// Identifier parser.
fn ident_parser<'tokens, I>() -> impl Parser<'tokens, I, String, Extra<'tokens>> + Clone
where
    I: ValueInput<'tokens, Token = Token, Span = Span>,
{
    select! {
        Token::Ident(s) => s,
    }
    .labelled("identifier")
}

// ═══════════════════════════════════════════════════════════════════════════
// Lowering
// ═══════════════════════════════════════════════════════════════════════════

fn lower(raw: Raw) -> Result<Node> {
    match raw {
        Raw::Leaf {
            alias,
            args,
            suffixes,
            span,
        } => {
            let message = lower_message(&alias, suffixes)?;
            let args = args
                .unwrap_or_default()
                .into_iter()
                .map(|arg| arg.text)
                .collect();
            let leaf = Leaf {
                alias,
                args,
                message,
                span: span.start..span.end,
            };
            Ok(Node::Leaf(leaf))
        }
        Raw::Group { inner, suffixes } => {
            if let Some(suffix) = suffixes.first() {
                return Err(CompileError::syntax(
                    suffix.span.start,
                    format!("unexpected `.{}` after a parenthesised rule", suffix.name),
                ));
            }
            lower(*inner)
        }
        Raw::Not(inner) => Ok(Node::Not(Box::new(lower(*inner)?))),
        Raw::Binary { op, left, right } => Ok(Node::Binary {
            op,
            left: Box::new(lower(*left)?),
            right: Box::new(lower(*right)?),
        }),
    }
}

/// A leaf accepts at most one suffix, and it must be `.msg("...")`.
fn lower_message(alias: &str, suffixes: Vec<Suffix>) -> Result<Option<String>> {
    let mut suffixes = suffixes.into_iter();
    let Some(suffix) = suffixes.next() else {
        return Ok(None);
    };

    if suffix.name != "msg" {
        return Err(CompileError::message(
            suffix.name_span.start,
            format!("expected {alias}.msg, found {alias}.{}", suffix.name),
        ));
    }

    let Some(args) = suffix.args else {
        return Err(CompileError::message(
            suffix.span.end,
            format!("expected {alias}.msg(\"...\"), found {alias}.msg"),
        ));
    };

    let count = args.len();
    let mut args = args.into_iter();
    let arg = match (args.next(), args.next()) {
        (Some(arg), None) => arg,
        _ => {
            return Err(CompileError::message(
                suffix.name_span.start,
                format!("{alias}.msg takes exactly one argument, found {count}"),
            ));
        }
    };

    if !arg.is_string {
        return Err(CompileError::message(
            arg.span.start,
            format!("expected a string, found {}", arg.text),
        ));
    }

    if let Some(extra) = suffixes.next() {
        return Err(CompileError::message(
            extra.span.start,
            format!("unexpected `.{}` after {alias}.msg(...)", extra.name),
        ));
    }

    Ok(Some(arg.text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::sexpr::format_node;
    use rstest::rstest;

    fn sexpr(source: &str) -> String {
        format_node(&parse(source).expect("parses"))
    }

    #[rstest]
    #[case("nonzero", "(leaf nonzero)")]
    #[case("nonzero()", "(leaf nonzero)")]
    #[case("len(0, 20)", "(leaf len 0 20)")]
    #[case("len(0, 20,)", "(leaf len 0 20)")]
    #[case("in(-1, 0x10, 2.5)", "(leaf in -1 0x10 2.5)")]
    #[case(r#"in("a", 'b', `c`)"#, r#"(leaf in "a" 'b' `c`)"#)]
    #[case("eq(Limit)", "(leaf eq Limit)")]
    #[case("_", "(leaf _)")]
    #[case("!lt(0)", "(not (leaf lt 0))")]
    #[case("!!nonzero", "(not (not (leaf nonzero)))")]
    #[case("a && b && c", "(and (and (leaf a) (leaf b)) (leaf c))")]
    #[case("a || b && c", "(or (leaf a) (and (leaf b) (leaf c)))")]
    #[case("(a || b) && c", "(and (or (leaf a) (leaf b)) (leaf c))")]
    #[case("!a && b", "(and (not (leaf a)) (leaf b))")]
    #[case("!(a && b)", "(not (and (leaf a) (leaf b)))")]
    #[case("((a))", "(leaf a)")]
    fn structure(#[case] source: &str, #[case] want: &str) {
        assert_eq!(sexpr(source), want);
    }

    #[test]
    fn message_suffix() {
        assert_eq!(
            sexpr(r#"len(0, 20).msg("bad length")"#),
            r#"(leaf len 0 20 :msg "bad length")"#
        );
        assert_eq!(
            sexpr(r#"nonzero.msg(`required`)"#),
            "(leaf nonzero :msg `required`)"
        );
    }

    #[test]
    fn leaf_spans() {
        let node = parse(r#"!nonzero || gt(0).msg("x")"#).expect("parses");
        let spans: Vec<_> = node.leaves().iter().map(|l| l.span.clone()).collect();
        assert_eq!(spans, vec![1..8, 12..26]);
    }

    #[test]
    fn canonical_text_reparses() {
        let source = r#"!(nonzero && len(1, 2)) || (a || b) && c.msg("m")"#;
        let node = parse(source).expect("parses");
        let again = parse(&node.to_string()).expect("reparses");
        assert_eq!(format_node(&node), format_node(&again));
    }

    #[rstest]
    #[case("", "empty rule")]
    #[case("len(0, 20", "")]
    #[case("a &&", "")]
    #[case("&& a", "")]
    #[case("a b", "")]
    #[case("len(0) & x", "unexpected character `&`")]
    fn syntax_errors(#[case] source: &str, #[case] fragment: &str) {
        match parse(source) {
            Err(CompileError::ExpressionSyntax { message, .. }) => {
                assert!(message.contains(fragment), "{message}")
            }
            other => panic!("expected an expression syntax error, got {other:?}"),
        }
    }

    #[test]
    fn error_offset_points_at_bad_token() {
        let err = parse("a b").unwrap_err();
        assert_eq!(err.offset(), Some(2));
        assert!(err.to_string().starts_with("1:3: "), "{err}");
    }

    #[test]
    fn message_on_group_is_a_syntax_error() {
        let err = parse(r#"(a && b).msg("x")"#).unwrap_err();
        assert!(matches!(err, CompileError::ExpressionSyntax { offset: 8, .. }), "{err:?}");
    }

    #[rstest]
    #[case(r#"gt(0).msg(1)"#, 10, "expected a string, found 1")]
    #[case(r#"gt(0).msg"#, 9, "expected gt.msg(\"...\"), found gt.msg")]
    #[case(r#"gt(0).note("x")"#, 6, "expected gt.msg, found gt.note")]
    #[case(r#"gt(0).msg("a", "b")"#, 6, "gt.msg takes exactly one argument, found 2")]
    #[case(r#"gt(0).msg()"#, 6, "gt.msg takes exactly one argument, found 0")]
    #[case(r#"gt(0).msg("a").msg("b")"#, 14, "unexpected `.msg` after gt.msg(...)")]
    fn message_errors(#[case] source: &str, #[case] offset: usize, #[case] want: &str) {
        match parse(source) {
            Err(CompileError::MessageSyntax { offset: got, message }) => {
                assert_eq!(message, want);
                assert_eq!(got, offset);
            }
            other => panic!("expected a message syntax error, got {other:?}"),
        }
    }
}
