//! Token source for the parser.
//!
//! This module provides the `Source` struct that wraps a token stream
//! and provides lookahead and consumption operations. Trivia is invisible
//! through this interface; positions are raw indices into the token slice.

use text_size::TextSize;

use crate::lexer::{Token, TokenKind};

/// A token source that provides tokens to the parser.
pub struct Source<'t, 'src> {
    tokens: &'t [Token],
    source: &'src str,
    cursor: usize,
}

impl<'t, 'src> Source<'t, 'src> {
    /// Creates a new source from tokens and source text.
    pub fn new(tokens: &'t [Token], source: &'src str) -> Self {
        Self {
            tokens,
            source,
            cursor: 0,
        }
    }

    /// Returns the current token kind, or `Eof` if at end.
    pub fn current(&self) -> TokenKind {
        self.peek_kind_n(0)
    }

    /// Returns the current token, or `None` if at end.
    pub fn current_token(&self) -> Option<&'t Token> {
        self.peek_token_n(0)
    }

    /// Peeks at the nth non-trivia token ahead.
    pub fn peek_kind_n(&self, n: usize) -> TokenKind {
        self.peek_token_n(n).map_or(TokenKind::Eof, |t| t.kind)
    }

    /// Peeks at the nth non-trivia token ahead and returns the token.
    pub fn peek_token_n(&self, n: usize) -> Option<&'t Token> {
        self.tokens[self.cursor..]
            .iter()
            .filter(|token| !token.kind.is_trivia())
            .nth(n)
    }

    /// Advances past the current token and any trivia before it.
    /// Does nothing at end of input.
    pub fn bump(&mut self) {
        while let Some(token) = self.tokens.get(self.cursor) {
            self.cursor += 1;
            if !token.kind.is_trivia() {
                break;
            }
        }
    }

    /// Returns `true` if at end of input.
    pub fn at_end(&self) -> bool {
        self.current_token().is_none()
    }

    /// Returns the raw cursor, usable with [`Source::reset`].
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Moves the raw cursor back to a previously observed position.
    pub fn reset(&mut self, position: usize) {
        debug_assert!(position <= self.tokens.len());
        self.cursor = position;
    }

    /// Returns the text of the current token.
    pub fn current_text(&self) -> &'src str {
        self.current_token()
            .map(|t| &self.source[usize::from(t.range.start())..usize::from(t.range.end())])
            .unwrap_or("")
    }

    /// Returns the start offset of the current token, or the source length
    /// at end of input.
    pub fn current_offset(&self) -> TextSize {
        self.current_token()
            .map_or_else(|| TextSize::of(self.source), |t| t.range.start())
    }

    /// Returns `true` if the current token is the first significant token
    /// on its line.
    pub fn has_newline_before(&self) -> bool {
        let Some(index) = self.tokens[self.cursor..]
            .iter()
            .position(|token| !token.kind.is_trivia())
            .map(|offset| self.cursor + offset)
        else {
            return true;
        };

        for token in self.tokens[..index].iter().rev() {
            if !token.kind.is_trivia() {
                return false;
            }
            let text = &self.source[usize::from(token.range.start())..usize::from(token.range.end())];
            if text.contains('\n') {
                return true;
            }
        }
        true
    }
}
