//! Token cursor for navigating the token stream.

use std::mem;

use crate::lexer::{Span, SyntaxError, Token, TokenKind};

/// Cursor over a token slice with one-token lookahead.
pub(crate) struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Span,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(tokens: &'a [Token], source_len: usize) -> Self {
        let end = Span::from_range(source_len..source_len);
        Cursor {
            tokens,
            pos: 0,
            eof: end,
        }
    }

    // ── Access ──────────────────────────────────────────────────────

    pub(crate) fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn current_kind(&self) -> Option<&'a TokenKind> {
        self.current().map(|t| &t.kind)
    }

    pub(crate) fn current_span(&self) -> Span {
        self.current().map_or(self.eof, |t| t.span)
    }

    /// Span of the most recently consumed token.
    pub(crate) fn previous_span(&self) -> Span {
        self.pos
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map_or(Span::DUMMY, |t| t.span)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    // ── Lookahead ───────────────────────────────────────────────────

    /// Whether the current token has the same kind as `kind` (payload ignored).
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind()
            .is_some_and(|k| mem::discriminant(k) == mem::discriminant(kind))
    }

    /// Whether the current token is the name `keyword`.
    pub(crate) fn check_keyword(&self, keyword: &str) -> bool {
        matches!(self.current_kind(), Some(TokenKind::Name(n)) if n == keyword)
    }

    // ── Consumption ─────────────────────────────────────────────────

    pub(crate) fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it has kind `kind`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        let matched = self.check(kind);
        if matched {
            self.pos += 1;
        }
        matched
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Span, SyntaxError> {
        if self.check(kind) {
            let span = self.current_span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    pub(crate) fn expect_name(&mut self) -> Result<String, SyntaxError> {
        match self.current_kind() {
            Some(TokenKind::Name(name)) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => Err(self.unexpected("a name")),
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str) -> Result<Span, SyntaxError> {
        if self.check_keyword(keyword) {
            let span = self.current_span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.unexpected(&format!("`{keyword}`")))
        }
    }

    /// "expected X, found Y" at the current token.
    pub(crate) fn unexpected(&self, expected: &str) -> SyntaxError {
        let found = self
            .current_kind()
            .map_or_else(|| "end of input".to_owned(), TokenKind::describe);
        SyntaxError::new(format!("expected {expected}, found {found}"), self.current_span())
    }
}
