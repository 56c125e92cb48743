//! Lexer for the TypoScript-flavoured configuration language.
//!
//! This module provides a lexer that tokenizes source code into a stream
//! of tokens with their positions in the source text. The stream is lossless:
//! every byte of the input belongs to exactly one token.

mod tokens;

pub use tokens::TokenKind;

use logos::Logos;
use std::collections::VecDeque;
use text_size::{TextRange, TextSize};

/// A token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The byte range of the token in the source text.
    pub range: TextRange,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, range: TextRange) -> Self {
        Self { kind, range }
    }
}

fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

/// Lexer for source code.
///
/// The lexer is an iterator over tokens. It handles all error recovery
/// internally - any unrecognized characters are returned as `TokenKind::Error`.
///
/// Outside of conditions, the text following an `=` operator up to the end of
/// the line is returned as a single `TokenKind::ValueText` token.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    pending: VecDeque<Token>,
    bracket_depth: u32,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
            pending: VecDeque::new(),
            bracket_depth: 0,
        }
    }

    /// Splits the rest of the current line into leading blanks and value text.
    fn take_value_text(&mut self) {
        let start = self.inner.span().end;
        let rest = self.inner.remainder();
        let line_len = rest.find(|c: char| c == '\n' || c == '\r').unwrap_or(rest.len());
        let line = &rest[..line_len];

        let value = line.trim_start_matches(|c: char| c == ' ' || c == '\t');
        let blank_len = line.len() - value.len();
        let value_len = value.trim_end_matches(|c: char| c == ' ' || c == '\t').len();

        if blank_len > 0 {
            self.pending
                .push_back(Token::new(TokenKind::Whitespace, range(start, start + blank_len)));
        }
        if value_len > 0 {
            let value_start = start + blank_len;
            self.pending.push_back(Token::new(
                TokenKind::ValueText,
                range(value_start, value_start + value_len),
            ));
        }
        self.inner.bump(blank_len + value_len);
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.pop_front() {
            return Some(token);
        }

        let kind = self.inner.next()?;
        let span = self.inner.span();
        let kind = kind.unwrap_or(TokenKind::Error);

        match kind {
            TokenKind::LBracket => self.bracket_depth += 1,
            TokenKind::RBracket => self.bracket_depth = self.bracket_depth.saturating_sub(1),
            TokenKind::Whitespace if self.source[span.clone()].contains('\n') => {
                // Conditions never span lines; an unclosed `[` must not swallow values.
                self.bracket_depth = 0;
            }
            TokenKind::Assign if self.bracket_depth == 0 => self.take_value_text(),
            _ => {}
        }

        Some(Token::new(kind, range(span.start, span.end)))
    }
}

/// Lex the entire source and return all tokens.
///
/// This is a convenience function for testing and simple use cases.
/// For the parser, use the `Lexer` iterator directly.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

/// Lex source and return tokens paired with their text.
///
/// Useful for debugging and testing.
#[must_use]
pub fn lex_with_text(source: &str) -> Vec<(Token, &str)> {
    Lexer::new(source)
        .map(|token| {
            let text = &source[usize::from(token.range.start())..usize::from(token.range.end())];
            (token, text)
        })
        .collect()
}
