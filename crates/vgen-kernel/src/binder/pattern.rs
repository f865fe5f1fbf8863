//! Pattern checks for regex validator arguments.
//!
//! A literal pattern is compiled while binding so that a typo is reported
//! against the rule text instead of surfacing as a panic in generated code.
//! Go's RE2 syntax is read with the `regex` crate after two adjustments:
//! `\Q...\E` quoting is expanded, and octal escapes such as `\101` are
//! enabled.

use regex::RegexBuilder;

/// Compile the pattern inside a Go string literal.
///
/// Anything that is not a string literal, such as an identifier naming a
/// pattern variable, passes unchecked.
pub fn check(literal: &str) -> Result<(), String> {
    let Some(pattern) = unquote(literal)? else {
        return Ok(());
    };
    RegexBuilder::new(&expand_quoted(&pattern))
        .octal(true)
        .build()
        .map(drop)
        .map_err(|e| e.to_string())
}

/// Replace each `\Q...\E` span with its escaped text. A `\Q` without a
/// closing `\E` quotes the rest of the pattern.
fn expand_quoted(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    while let Some(i) = rest.find('\\') {
        out.push_str(&rest[..i]);
        let after = &rest[i + 1..];
        match after.chars().next() {
            Some('Q') => {
                let quoted = &after[1..];
                let (text, tail) = quoted.split_once("\\E").unwrap_or((quoted, ""));
                out.push_str(&regex::escape(text));
                rest = tail;
            }
            Some(c) => {
                out.push('\\');
                out.push(c);
                rest = &after[c.len_utf8()..];
            }
            None => {
                out.push('\\');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decode a raw or interpreted Go string literal.
pub fn unquote(literal: &str) -> Result<Option<String>, String> {
    if let Some(raw) = literal
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        return Ok(Some(raw.replace('\r', "")));
    }
    let Some(body) = literal
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    else {
        return Ok(None);
    };

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = chars.next().ok_or("trailing backslash in string literal")?;
        match escaped {
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0b}'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            'x' => out.push(hex_escape(&mut chars, 2)?),
            'u' => out.push(hex_escape(&mut chars, 4)?),
            'U' => out.push(hex_escape(&mut chars, 8)?),
            '0'..='7' => {
                let mut value = escaped.to_digit(8).unwrap_or_default();
                for _ in 0..2 {
                    let digit = chars
                        .next()
                        .and_then(|d| d.to_digit(8))
                        .ok_or("octal escape needs three digits")?;
                    value = value * 8 + digit;
                }
                let c = char::from_u32(value).ok_or("octal escape out of range")?;
                out.push(c);
            }
            other => return Err(format!("unknown escape sequence `\\{other}`")),
        }
    }
    Ok(Some(out))
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Result<char, String> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|d| d.to_digit(16))
            .ok_or_else(|| format!("hex escape needs {digits} digits"))?;
        value = value * 16 + digit;
    }
    char::from_u32(value).ok_or_else(|| format!("escape value {value:#x} is not a character"))
}
