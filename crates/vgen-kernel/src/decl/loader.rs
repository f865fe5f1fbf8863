//! Declaration loader.
//!
//! Reads validator declarations written as a Go list literal, each element
//! preceded by a metadata comment:
//!
//! ```text
//! package decl
//!
//! import v "github.com/RussellLuo/validating/v3"
//!
//! var _ = []any{
//!     // name=len type=string args=2
//!     v.LenString,
//!
//!     // type=ordered args=1+
//!     v.In[string],
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::ops::Range;
use std::sync::LazyLock;

use logos::Logos;
use regex::Regex;
use vgen_types::AllowedTypes;

use super::descriptor::{ArgRange, Descriptor};
use super::token::{DeclToken, LineIndex};
use crate::error::{CompileError, Result};

#[allow(clippy::expect_used)]
static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/v[0-9]+$").expect("version suffix pattern"));

/// Load the descriptors declared in `source`, in declaration order.
///
/// Empty or whitespace-only text declares nothing.
pub fn load(source: &str) -> Result<Vec<Descriptor>> {
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }

    let lines = LineIndex::new(source);
    let mut comments = BTreeMap::new();
    let mut tokens = Vec::new();

    for (result, span) in DeclToken::lexer(source).spanned() {
        match result {
            Ok(DeclToken::LineComment(text)) => {
                comments.insert(lines.line(span.start), text);
            }
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(CompileError::decl(
                    lines.line(span.start),
                    format!("unexpected `{}`", &source[span]),
                ));
            }
        }
    }

    let mut reader = DeclReader {
        tokens,
        pos: 0,
        lines,
        comments,
        end: source.len(),
    };
    reader.file()
}

/// Recursive-descent reader over the declaration tokens.
struct DeclReader {
    tokens: Vec<(DeclToken, Range<usize>)>,
    pos: usize,
    lines: LineIndex,
    /// Line number to the text of the `//` comment on that line.
    comments: BTreeMap<usize, String>,
    end: usize,
}

impl DeclReader {
    fn peek(&self) -> Option<&DeclToken> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn peek_at(&self, ahead: usize) -> Option<&DeclToken> {
        self.tokens.get(self.pos + ahead).map(|(t, _)| t)
    }

    fn line(&self) -> usize {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(self.end, |(_, span)| span.start);
        self.lines.line(offset)
    }

    fn advance(&mut self) -> Option<(DeclToken, Range<usize>)> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, want: &DeclToken) -> bool {
        if self.peek() == Some(want) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        CompileError::decl(self.line(), message)
    }

    fn found(&self) -> String {
        self.peek()
            .map_or_else(|| "end of input".to_string(), DeclToken::describe)
    }

    fn expect(&mut self, want: DeclToken) -> Result<()> {
        if self.eat(&want) {
            Ok(())
        } else {
            Err(self.error(format!("expected {}, found {}", want.describe(), self.found())))
        }
    }

    fn ident(&mut self) -> Result<(String, Range<usize>)> {
        match self.tokens.get(self.pos) {
            Some((DeclToken::Ident(name), span)) => {
                let ident = (name.clone(), span.clone());
                self.pos += 1;
                Ok(ident)
            }
            _ => Err(self.error(format!("expected identifier, found {}", self.found()))),
        }
    }

    fn file(&mut self) -> Result<Vec<Descriptor>> {
        if self.eat(&DeclToken::Package) {
            self.ident()?;
            self.eat(&DeclToken::Semi);
        }

        let mut imports = HashMap::new();
        while self.eat(&DeclToken::Import) {
            if self.eat(&DeclToken::LParen) {
                while !self.eat(&DeclToken::RParen) {
                    let (qualifier, path) = self.import_spec()?;
                    imports.insert(qualifier, path);
                    self.eat(&DeclToken::Semi);
                }
            } else {
                let (qualifier, path) = self.import_spec()?;
                imports.insert(qualifier, path);
            }
            self.eat(&DeclToken::Semi);
        }

        let mut found = None;
        while self.peek().is_some() {
            if !self.eat(&DeclToken::Var) {
                self.pos += 1;
                continue;
            }
            if self.eat(&DeclToken::LParen) {
                self.var_group(&imports, &mut found)?;
            } else if self.eat(&DeclToken::Ident("_".into())) {
                self.blank_list(&imports, &mut found)?;
            }
        }

        found.ok_or_else(|| self.error("no `var _ = []any{...}` declaration"))
    }

    /// The specs of `var ( ... )` up to the closing `)`.
    ///
    /// A spec starting with `_ =` at the top level of the group is the list.
    fn var_group(
        &mut self,
        imports: &HashMap<String, String>,
        found: &mut Option<Vec<Descriptor>>,
    ) -> Result<()> {
        let mut depth = 0usize;
        let mut after_comma = false;
        loop {
            let Some(token) = self.peek().cloned() else {
                return Err(self.error("unclosed `var (`"));
            };
            let blank_spec = depth == 0
                && !after_comma
                && token == DeclToken::Ident("_".into())
                && self.peek_at(1) == Some(&DeclToken::Assign);
            self.pos += 1;
            if blank_spec {
                self.blank_list(imports, found)?;
                after_comma = false;
                continue;
            }
            match token {
                DeclToken::RParen if depth == 0 => return Ok(()),
                DeclToken::LParen | DeclToken::LBrace | DeclToken::LBracket => depth += 1,
                DeclToken::RParen | DeclToken::RBrace | DeclToken::RBracket => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            after_comma = token == DeclToken::Comma;
        }
    }

    /// `= []any{...}` after a `_` spec; only one may appear per file.
    fn blank_list(
        &mut self,
        imports: &HashMap<String, String>,
        found: &mut Option<Vec<Descriptor>>,
    ) -> Result<()> {
        if found.is_some() {
            return Err(self.error("more than one `var _` declaration"));
        }
        *found = Some(self.list(imports)?);
        Ok(())
    }

    /// `[name] "path"`, returning `(qualifier, path)`.
    fn import_spec(&mut self) -> Result<(String, String)> {
        let name = match self.peek() {
            Some(DeclToken::Ident(_)) => Some(self.ident()?.0),
            Some(DeclToken::Dot) => {
                self.pos += 1;
                Some(".".to_string())
            }
            _ => None,
        };
        let path = match self.peek() {
            Some(DeclToken::Str(s)) | Some(DeclToken::RawStr(s)) => s[1..s.len() - 1].to_string(),
            _ => return Err(self.error(format!("expected import path, found {}", self.found()))),
        };
        self.pos += 1;
        let qualifier = name.unwrap_or_else(|| qualifier_for(&path));
        Ok((qualifier, path))
    }

    /// `= []T{ elem, ... }` after `var _`.
    fn list(&mut self, imports: &HashMap<String, String>) -> Result<Vec<Descriptor>> {
        self.expect(DeclToken::Assign)?;
        if !(self.eat(&DeclToken::LBracket) && self.eat(&DeclToken::RBracket)) {
            return Err(self.error("`var _` must be a list literal `[]any{...}`"));
        }
        self.element_type()?;
        self.expect(DeclToken::LBrace)?;

        let mut descriptors = Vec::new();
        while !self.eat(&DeclToken::RBrace) {
            descriptors.push(self.element(imports)?);
            if !self.eat(&DeclToken::Comma) {
                self.expect(DeclToken::RBrace)?;
                break;
            }
        }
        Ok(descriptors)
    }

    /// `any`, `interface{}`, or `pkg.T`.
    fn element_type(&mut self) -> Result<()> {
        let (name, _) = self.ident()?;
        if name == "interface" {
            self.expect(DeclToken::LBrace)?;
            self.expect(DeclToken::RBrace)?;
        } else if self.eat(&DeclToken::Dot) {
            self.ident()?;
        }
        Ok(())
    }

    /// `qualifier.Name` or `qualifier.Name[...]`.
    fn element(&mut self, imports: &HashMap<String, String>) -> Result<Descriptor> {
        let line = self.line();
        let (qualifier, _) = self.ident().map_err(|_| {
            CompileError::decl(
                line,
                format!("expected `qualifier.Name`, found {}", self.found()),
            )
        })?;
        if !self.eat(&DeclToken::Dot) {
            return Err(CompileError::decl(
                line,
                format!("element `{qualifier}` is not a qualified reference"),
            ));
        }
        let (declared_name, name_span) = self.ident()?;

        let is_generic = self.peek() == Some(&DeclToken::LBracket);
        if is_generic {
            self.skip_brackets()?;
        }

        let name_line = self.lines.line(name_span.start);
        let comment = name_line
            .checked_sub(1)
            .and_then(|above| self.comments.get(&above))
            .ok_or_else(|| {
                CompileError::decl(
                    name_line,
                    format!("missing metadata comment for {qualifier}.{declared_name}"),
                )
            })?;
        let metadata = Metadata::parse(comment, name_line - 1)?;

        Ok(Descriptor {
            import_path: imports.get(&qualifier).cloned(),
            alias: metadata
                .alias
                .unwrap_or_else(|| declared_name.to_lowercase()),
            qualifier,
            declared_name,
            is_generic,
            allowed_types: metadata.allowed_types,
            arg_count: metadata.arg_count,
        })
    }

    /// Skip a balanced `[...]` group.
    fn skip_brackets(&mut self) -> Result<()> {
        let mut depth = 0usize;
        loop {
            match self.advance() {
                Some((DeclToken::LBracket, _)) => depth += 1,
                Some((DeclToken::RBracket, _)) => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(_) => {}
                None => return Err(self.error("unclosed `[`")),
            }
        }
    }
}

/// Last path segment after dropping a trailing `/vN` major version.
fn qualifier_for(path: &str) -> String {
    let path = VERSION_SUFFIX.replace(path, "");
    path.rsplit('/').next().unwrap_or_default().to_string()
}

/// Metadata carried by a `// key=value ...` comment.
#[derive(Debug, Default)]
struct Metadata {
    alias: Option<String>,
    allowed_types: AllowedTypes,
    arg_count: ArgRange,
}

impl Metadata {
    fn parse(comment: &str, line: usize) -> Result<Self> {
        if comment.trim().is_empty() {
            return Err(CompileError::decl(line, "empty metadata comment"));
        }

        let mut metadata = Metadata::default();
        for field in comment.split_whitespace() {
            let Some((key, value)) = field.split_once('=') else {
                return Err(CompileError::decl(
                    line,
                    format!("metadata `{field}` is not key=value"),
                ));
            };
            match key {
                "name" => metadata.alias = Some(value.to_string()),
                "type" => {
                    metadata.allowed_types = AllowedTypes::parse(value)
                        .map_err(|e| CompileError::decl(line, e.to_string()))?;
                }
                "args" => {
                    metadata.arg_count = ArgRange::parse(value).ok_or_else(|| {
                        CompileError::decl(line, format!("bad argument count `{value}`"))
                    })?;
                }
                _ => {}
            }
        }
        Ok(metadata)
    }
}
