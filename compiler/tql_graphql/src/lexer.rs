//! GraphQL lexer.
//!
//! Commas, whitespace and `#` comments are insignificant and skipped.
//! Keywords (`query`, `type`, `true`, ...) are ordinary names; the parser
//! gives them meaning by position.

use std::fmt;
use std::ops::Range;

use logos::Logos;

/// Byte range in a source text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    pub fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Saturates offsets past `u32::MAX`.
    pub fn from_range(range: Range<usize>) -> Self {
        let clamp = |n: usize| u32::try_from(n).unwrap_or(u32::MAX);
        Span {
            start: clamp(range.start),
            end: clamp(range.end),
        }
    }

    pub fn to_range(self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    /// Smallest span covering both.
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n,]+")]
#[logos(skip r"#[^\n]*")]
pub enum TokenKind {
    // Punctuators
    #[token("!")]
    Bang,
    #[token("$")]
    Dollar,
    #[token("&")]
    Amp,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("...")]
    Spread,
    #[token(":")]
    Colon,
    #[token("=")]
    Eq,
    #[token("@")]
    At,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("|")]
    Pipe,
    #[token("}")]
    RBrace,

    // Names and literals
    #[regex(r"[_A-Za-z][_0-9A-Za-z]*", |lex| lex.slice().to_owned())]
    Name(String),

    #[regex(r"-?(0|[1-9][0-9]*)", |lex| lex.slice().parse::<i64>().ok())]
    Int(i64),

    #[regex(
        r"-?(0|[1-9][0-9]*)(\.[0-9]+([eE][+-]?[0-9]+)?|[eE][+-]?[0-9]+)",
        |lex| lex.slice().parse::<f64>().ok()
    )]
    Float(f64),

    #[regex(r#""([^"\\\n]|\\.)*""#, unescape)]
    String(String),

    #[regex(r#""""([^"]|"[^"]|""[^"])*""""#, block_string)]
    BlockString(String),
}

impl TokenKind {
    /// Short human-readable form for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Bang => "`!`".to_owned(),
            TokenKind::Dollar => "`$`".to_owned(),
            TokenKind::Amp => "`&`".to_owned(),
            TokenKind::LParen => "`(`".to_owned(),
            TokenKind::RParen => "`)`".to_owned(),
            TokenKind::Spread => "`...`".to_owned(),
            TokenKind::Colon => "`:`".to_owned(),
            TokenKind::Eq => "`=`".to_owned(),
            TokenKind::At => "`@`".to_owned(),
            TokenKind::LBracket => "`[`".to_owned(),
            TokenKind::RBracket => "`]`".to_owned(),
            TokenKind::LBrace => "`{`".to_owned(),
            TokenKind::Pipe => "`|`".to_owned(),
            TokenKind::RBrace => "`}`".to_owned(),
            TokenKind::Name(name) => format!("name `{name}`"),
            TokenKind::Int(n) => format!("integer `{n}`"),
            TokenKind::Float(n) => format!("float `{n}`"),
            TokenKind::String(_) | TokenKind::BlockString(_) => "string".to_owned(),
        }
    }
}

fn unescape(lex: &mut logos::Lexer<'_, TokenKind>) -> Option<String> {
    let raw = lex.slice();
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.next()? {
            '"' => '"',
            '\\' => '\\',
            '/' => '/',
            'b' => '\u{8}',
            'f' => '\u{c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'u' => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return None;
                }
                char::from_u32(u32::from_str_radix(&hex, 16).ok()?)?
            }
            _ => return None,
        };
        out.push(escaped);
    }
    Some(out)
}

/// Block string value: common indentation removed, blank edge lines dropped.
fn block_string(lex: &mut logos::Lexer<'_, TokenKind>) -> Option<String> {
    let raw = lex.slice();
    let inner = &raw[3..raw.len() - 3];
    let lines: Vec<&str> = inner.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    let dedented: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                *line
            } else {
                line.get(indent..).unwrap_or("")
            }
        })
        .collect();
    let first = dedented.iter().position(|l| !l.trim().is_empty());
    let last = dedented.iter().rposition(|l| !l.trim().is_empty());
    Some(match (first, last) {
        (Some(first), Some(last)) => dedented[first..=last].join("\n"),
        _ => String::new(),
    })
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Malformed source text, with the offending range.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {span}")]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        SyntaxError {
            message: message.into(),
            span,
        }
    }
}

/// Split `source` into tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        match result {
            Ok(kind) => tokens.push(Token { kind, span }),
            Err(()) => {
                return Err(SyntaxError::new(
                    format!("unexpected character `{}`", lexer.slice()),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
