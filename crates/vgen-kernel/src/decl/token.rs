//! Tokens of declaration source.
//!
//! Declaration files are Go source, but only a small subset matters: the
//! package clause, imports, and one `var _ = []any{...}` list. Line comments
//! are kept as tokens because they carry validator metadata; block comments
//! are skipped.

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
pub enum DeclToken {
    /// Text after `//`.
    #[regex(r"//[^\n]*", callback = |lex| lex.slice()[2..].to_string(), allow_greedy = true)]
    LineComment(String),

    #[token("package")]
    Package,

    #[token("import")]
    Import,

    #[token("var")]
    Var,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    #[regex(r#""([^"\\\n]|\\.)*""#, |lex| lex.slice().to_string())]
    Str(String),

    #[regex(r"`[^`]*`", |lex| lex.slice().to_string())]
    RawStr(String),

    #[regex(r"[0-9][0-9_]*", |lex| lex.slice().to_string())]
    Int(String),

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(",")]
    Comma,

    #[token(".")]
    Dot,

    #[token("=")]
    Assign,

    #[token(";")]
    Semi,

    #[token("*")]
    Star,
}

impl DeclToken {
    pub fn describe(&self) -> String {
        match self {
            DeclToken::LineComment(_) => "comment".to_string(),
            DeclToken::Package => "`package`".to_string(),
            DeclToken::Import => "`import`".to_string(),
            DeclToken::Var => "`var`".to_string(),
            DeclToken::Ident(s) | DeclToken::Str(s) | DeclToken::RawStr(s) | DeclToken::Int(s) => {
                format!("`{s}`")
            }
            DeclToken::LParen => "`(`".to_string(),
            DeclToken::RParen => "`)`".to_string(),
            DeclToken::LBracket => "`[`".to_string(),
            DeclToken::RBracket => "`]`".to_string(),
            DeclToken::LBrace => "`{`".to_string(),
            DeclToken::RBrace => "`}`".to_string(),
            DeclToken::Comma => "`,`".to_string(),
            DeclToken::Dot => "`.`".to_string(),
            DeclToken::Assign => "`=`".to_string(),
            DeclToken::Semi => "`;`".to_string(),
            DeclToken::Star => "`*`".to_string(),
        }
    }
}

/// Byte offset to 1-based line number.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    pub fn line(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}
