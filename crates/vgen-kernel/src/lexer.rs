//! Lexer for rule text.
//!
//! Rules are short, single-line expressions:
//!
//! ```text
//! !nonzero || len(0, 20).msg("bad length") && match(`^\w+$`)
//! ```
//!
//! Literal tokens keep their exact source text. Arguments and messages are
//! pasted into generated Go code unchanged, so nothing is unescaped here.

use std::fmt;
use std::ops::Range;

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    #[token("&&")]
    And,

    #[token("||")]
    Or,

    #[token("!")]
    Bang,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    /// Decimal, hex, octal or binary integer, optionally negative.
    #[regex(r"-?(0[xX][0-9a-fA-F_]+|0[oO][0-7_]+|0[bB][01_]+|[0-9][0-9_]*)", |lex| lex.slice().to_string())]
    Int(String),

    #[regex(r"-?([0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?|[0-9][0-9_]*[eE][+-]?[0-9]+|\.[0-9][0-9_]*([eE][+-]?[0-9]+)?)", |lex| lex.slice().to_string())]
    Float(String),

    #[regex(r"'([^'\\\n]|\\.)+'", |lex| lex.slice().to_string())]
    Char(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice().to_string())]
    Str(String),

    #[regex(r"`[^`]*`", |lex| lex.slice().to_string())]
    RawStr(String),
}

impl Token {
    /// True for interpreted and raw string literals.
    pub fn is_string(&self) -> bool {
        matches!(self, Token::Str(_) | Token::RawStr(_))
    }

    /// Literal text for tokens that can be validator arguments.
    pub fn literal(&self) -> Option<&str> {
        match self {
            Token::Ident(s)
            | Token::Int(s)
            | Token::Float(s)
            | Token::Char(s)
            | Token::Str(s)
            | Token::RawStr(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::And => write!(f, "&&"),
            Token::Or => write!(f, "||"),
            Token::Bang => write!(f, "!"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Dot => write!(f, "."),
            Token::Ident(s)
            | Token::Int(s)
            | Token::Float(s)
            | Token::Char(s)
            | Token::Str(s)
            | Token::RawStr(s) => write!(f, "{s}"),
        }
    }
}

/// A token and its byte range in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

/// Text the lexer could not turn into a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub span: Range<usize>,
    pub text: String,
}

impl LexError {
    pub fn message(&self) -> String {
        match self.text.chars().next() {
            Some('"') | Some('`') => "unterminated string literal".to_string(),
            Some('\'') => "malformed character literal".to_string(),
            Some(c) => format!("unexpected character `{c}`"),
            None => "unexpected end of input".to_string(),
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {:?}", self.message(), self.span)
    }
}

/// Tokenize rule text. Stops at the first unrecognised input.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, LexError> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push(Spanned { token, span }),
            Err(()) => {
                return Err(LexError {
                    text: source[span.clone()].to_string(),
                    span,
                });
            }
        }
    }
    Ok(tokens)
}
