//! Reader for Go-style type text.
//!
//! Tooling (the CLI, file-driven tests) needs to describe parameter types
//! without a reflection collaborator. This reads the textual form that
//! [`SemType`]'s `Display` produces, plus a declaration form for named types:
//!
//! ```text
//! int  string  []string  [4]byte  map[string]int  *T  any  interface{}
//! struct{Name string; Age int}
//! type usersvc.User struct{Name string; Age int}
//! [](type Celsius float64)
//! ```

use crate::sem::{BasicKind, Field, SemType};

/// Error reading type text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} at offset {offset}")]
pub struct TypeSyntaxError {
    pub offset: usize,
    pub message: String,
}

/// Read a complete type from `text`.
pub fn parse_type(text: &str) -> Result<SemType, TypeSyntaxError> {
    let mut reader = TypeReader { src: text, pos: 0 };
    let ty = reader.type_decl()?;
    reader.skip_ws();
    if reader.pos < reader.src.len() {
        return Err(reader.error(format!("unexpected `{}`", reader.rest())));
    }
    Ok(ty)
}

struct TypeReader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> TypeReader<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn error(&self, message: impl Into<String>) -> TypeSyntaxError {
        TypeSyntaxError {
            offset: self.pos,
            message: message.into(),
        }
    }

    /// Consume `token` (after whitespace) if it is next.
    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), TypeSyntaxError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(format!("expected `{token}`")))
        }
    }

    fn ident(&mut self) -> Option<&'a str> {
        self.skip_ws();
        let rest = self.rest();
        let mut chars = rest.char_indices();
        match chars.next() {
            Some((_, c)) if c.is_alphabetic() || c == '_' => {}
            _ => return None,
        }
        let end = chars
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += end;
        Some(&rest[..end])
    }

    /// `pkg.Name` or `Name`.
    fn qualified_ident(&mut self) -> Result<String, TypeSyntaxError> {
        let first = self.ident().ok_or_else(|| self.error("expected identifier"))?;
        if self.peek() == Some('.') {
            self.pos += 1;
            let second = self.ident().ok_or_else(|| self.error("expected identifier after `.`"))?;
            Ok(format!("{first}.{second}"))
        } else {
            Ok(first.to_string())
        }
    }

    /// `type Name Underlying`, or a plain type.
    fn type_decl(&mut self) -> Result<SemType, TypeSyntaxError> {
        self.skip_ws();
        let start = self.pos;
        if self.ident() == Some("type") {
            let name = self.qualified_ident()?;
            let underlying = self.type_expr()?;
            return Ok(SemType::named(name, underlying));
        }
        self.pos = start;
        self.type_expr()
    }

    fn type_expr(&mut self) -> Result<SemType, TypeSyntaxError> {
        self.skip_ws();
        let start = self.pos;

        if self.eat("*") {
            return Ok(SemType::pointer(self.type_expr()?));
        }
        if self.eat("(") {
            let ty = self.type_decl()?;
            self.expect(")")?;
            return Ok(ty);
        }
        if self.eat("[") {
            if self.eat("]") {
                return Ok(SemType::slice(self.type_expr()?));
            }
            self.skip_ws();
            let digits = self.rest().chars().take_while(char::is_ascii_digit).count();
            if digits == 0 {
                return Err(self.error("expected array length or `]`"));
            }
            let len = self.rest()[..digits]
                .parse()
                .map_err(|_| self.error("array length out of range"))?;
            self.pos += digits;
            self.expect("]")?;
            return Ok(SemType::array(len, self.type_expr()?));
        }

        let name = self.qualified_ident()?;
        match name.as_str() {
            "map" => {
                self.expect("[")?;
                let key = self.type_expr()?;
                self.expect("]")?;
                let value = self.type_expr()?;
                Ok(SemType::map(key, value))
            }
            "struct" => self.struct_body(),
            "interface" => {
                self.expect("{")?;
                self.expect("}")?;
                Ok(SemType::Interface)
            }
            "any" => Ok(SemType::Interface),
            other => match BasicKind::from_name(other) {
                Some(kind) => Ok(SemType::Basic(kind)),
                None => Err(TypeSyntaxError {
                    offset: start,
                    message: format!(
                        "unknown type `{other}`; declare it as `type {other} <underlying>`"
                    ),
                }),
            },
        }
    }

    fn struct_body(&mut self) -> Result<SemType, TypeSyntaxError> {
        self.expect("{")?;
        let mut fields = Vec::new();
        loop {
            if self.eat("}") {
                break;
            }
            let name = self
                .ident()
                .ok_or_else(|| self.error("expected field name"))?
                .to_string();
            let ty = self.type_expr()?;
            fields.push(Field::new(name, ty));
            if self.eat(";") {
                continue;
            }
            self.expect("}")?;
            break;
        }
        Ok(SemType::structure(fields))
    }
}
