//! Sink for converting parser events into a syntax tree.
//!
//! The sink takes the flat event stream and builds a proper `rowan` green tree.
//! Trivia never appears in the event log; the sink weaves it back in so the
//! tree covers the source text exactly.

use text_size::{TextRange, TextSize};
use thiserror::Error;

use crate::lexer::Token;
use crate::parser::event::Event;
use crate::parser::ParseError;
use crate::syntax::SyntaxKind;

/// A malformed event log. Always a bug in a grammar rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// No events were recorded at all.
    #[error("event log is empty")]
    Empty,
    /// A start event never received a kind.
    #[error("start event {0} was never completed or abandoned")]
    UnresolvedMarker(usize),
    /// A finish event without an open node.
    #[error("finish event {0} has no matching start")]
    UnbalancedFinish(usize),
    /// Nodes still open after the last event.
    #[error("{0} node(s) left unclosed")]
    UnclosedNodes(usize),
    /// An event after the root node was closed, or before it was opened.
    #[error("event {0} lies outside the root node")]
    OutsideRoot(usize),
    /// A forward parent offset that does not land on a start event.
    #[error("forward parent of event {0} does not point at a start event")]
    BrokenForwardParent(usize),
    /// Significant tokens the grammar never consumed.
    #[error("{0} significant token(s) not covered by the tree")]
    UnconsumedTokens(usize),
    /// A token event with no token left to consume.
    #[error("token event {0} runs past the end of input")]
    TokenPastEnd(usize),
}

/// Builds a syntax tree from parser events.
pub struct Sink<'t, 'src> {
    tokens: &'t [Token],
    source: &'src str,
    events: Vec<Event>,
    cursor: usize,
    text_end: TextSize,
    open: Vec<(SyntaxKind, TextSize)>,
    builder: rowan::GreenNodeBuilder<'static>,
    errors: Vec<ParseError>,
}

impl<'t, 'src> Sink<'t, 'src> {
    /// Creates a new sink.
    pub fn new(tokens: &'t [Token], source: &'src str, events: Vec<Event>) -> Self {
        Self {
            tokens,
            source,
            events,
            cursor: 0,
            text_end: TextSize::from(0),
            open: Vec::new(),
            builder: rowan::GreenNodeBuilder::new(),
            errors: Vec::new(),
        }
    }

    /// Consumes the sink and returns the green tree and errors.
    pub fn try_finish(mut self) -> Result<(rowan::GreenNode, Vec<ParseError>), TreeError> {
        if self.events.is_empty() {
            return Err(TreeError::Empty);
        }

        let mut root_closed = false;
        for i in 0..self.events.len() {
            let event = std::mem::replace(&mut self.events[i], Event::Placeholder);
            if root_closed && !matches!(event, Event::Placeholder) {
                return Err(TreeError::OutsideRoot(i));
            }

            match event {
                Event::Start {
                    kind,
                    forward_parent,
                } => {
                    // Handle forward parent chain
                    let mut kinds = vec![kind.ok_or(TreeError::UnresolvedMarker(i))?];
                    let mut idx = i;
                    let mut fp = forward_parent;

                    while let Some(fp_idx) = fp {
                        idx += fp_idx as usize;
                        match self.events.get_mut(idx).map(|e| std::mem::replace(e, Event::Placeholder)) {
                            Some(Event::Start {
                                kind,
                                forward_parent,
                            }) => {
                                kinds.push(kind.ok_or(TreeError::UnresolvedMarker(idx))?);
                                fp = forward_parent;
                            }
                            _ => return Err(TreeError::BrokenForwardParent(idx)),
                        }
                    }

                    if !self.open.is_empty() {
                        self.eat_trivia();
                    }
                    let start = self.offset();
                    for kind in kinds.into_iter().rev() {
                        self.builder.start_node(kind.into());
                        self.open.push((kind, start));
                    }
                }
                Event::Token { kind, n_tokens } => {
                    if self.open.is_empty() {
                        return Err(TreeError::OutsideRoot(i));
                    }
                    self.eat_trivia();
                    let added = match n_tokens {
                        1 => self.token(kind),
                        n => self.glued_token(kind, n),
                    };
                    if !added {
                        return Err(TreeError::TokenPastEnd(i));
                    }
                }
                Event::Finish => {
                    if self.open.len() == 1 {
                        let left = self.tokens[self.cursor..]
                            .iter()
                            .filter(|t| !t.kind.is_trivia())
                            .count();
                        if left > 0 {
                            return Err(TreeError::UnconsumedTokens(left));
                        }
                        self.eat_trivia();
                        root_closed = true;
                    }
                    if self.open.pop().is_none() {
                        return Err(TreeError::UnbalancedFinish(i));
                    }
                    self.builder.finish_node();
                }
                Event::Error { message } => {
                    let closes_error_node = matches!(self.events.get(i + 1), Some(Event::Finish))
                        && matches!(self.open.last(), Some((SyntaxKind::Error, _)));

                    let range = if closes_error_node {
                        let Some(&(_, start)) = self.open.last() else {
                            return Err(TreeError::OutsideRoot(i));
                        };
                        TextRange::new(start, self.text_end.max(start))
                    } else {
                        if self.open.is_empty() {
                            return Err(TreeError::OutsideRoot(i));
                        }
                        self.builder.start_node(SyntaxKind::Error.into());
                        self.builder.finish_node();
                        TextRange::empty(self.text_end)
                    };

                    self.errors.push(ParseError {
                        message: message.to_string(),
                        range,
                    });
                }
                Event::Placeholder => {}
            }
        }

        if !self.open.is_empty() {
            return Err(TreeError::UnclosedNodes(self.open.len()));
        }

        Ok((self.builder.finish(), self.errors))
    }

    /// Adds trivia (whitespace, comments) to the tree.
    fn eat_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.cursor) {
            if !token.kind.is_trivia() {
                break;
            }
            self.token(SyntaxKind::from(token.kind));
        }
    }

    /// Adds the next token to the tree under `kind`.
    fn token(&mut self, kind: SyntaxKind) -> bool {
        let Some(token) = self.tokens.get(self.cursor) else {
            return false;
        };
        let text = &self.source[usize::from(token.range.start())..usize::from(token.range.end())];
        self.builder.token(kind.into(), text);
        self.text_end = token.range.end();
        self.cursor += 1;
        true
    }

    /// Adds the next `n` significant tokens, and the trivia between them,
    /// as a single leaf of `kind`.
    fn glued_token(&mut self, kind: SyntaxKind, n: u32) -> bool {
        if n == 0 {
            return true;
        }
        let start = self.offset();
        let mut end = start;
        let mut left = n;
        while left > 0 {
            let Some(token) = self.tokens.get(self.cursor) else {
                return false;
            };
            self.cursor += 1;
            end = token.range.end();
            if !token.kind.is_trivia() {
                left -= 1;
            }
        }
        self.builder
            .token(kind.into(), &self.source[usize::from(start)..usize::from(end)]);
        self.text_end = end;
        true
    }

    /// Start of the next token, or the end of the text.
    fn offset(&self) -> TextSize {
        self.tokens
            .get(self.cursor)
            .map_or_else(|| TextSize::of(self.source), |t| t.range.start())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::syntax::{debug_tree, SyntaxNode};

    fn build(text: &str, events: Vec<Event>) -> Result<(SyntaxNode, Vec<ParseError>), TreeError> {
        let tokens = lex(text);
        let (green, errors) = Sink::new(&tokens, text, events).try_finish()?;
        Ok((SyntaxNode::new_root(green), errors))
    }

    #[test]
    fn test_trivia_placement() {
        let (node, errors) = build(
            " a b ",
            vec![
                Event::start(SyntaxKind::SourceFile),
                Event::start(SyntaxKind::NameRef),
                Event::token(SyntaxKind::Ident),
                Event::token(SyntaxKind::Ident),
                Event::Finish,
                Event::Finish,
            ],
        )
        .unwrap();

        assert!(errors.is_empty());
        assert_eq!(node.text().to_string(), " a b ");
        let name = node.first_child().unwrap();
        assert_eq!(name.text().to_string(), "a b");
    }

    #[test]
    fn test_forward_parent_opens_outer_first() {
        let (node, _) = build(
            "a",
            vec![
                Event::start(SyntaxKind::SourceFile),
                Event::Start {
                    kind: Some(SyntaxKind::NameRef),
                    forward_parent: Some(3),
                },
                Event::token(SyntaxKind::Ident),
                Event::Finish,
                Event::start(SyntaxKind::ParenExpr),
                Event::Finish,
                Event::Finish,
            ],
        )
        .unwrap();

        assert_eq!(
            debug_tree(&node),
            "SourceFile@0..1\n  ParenExpr@0..1\n    NameRef@0..1\n      Ident@0..1 \"a\"\n"
        );
    }

    #[test]
    fn test_error_ranges() {
        let (_, errors) = build(
            "a b",
            vec![
                Event::start(SyntaxKind::SourceFile),
                Event::error("standalone"),
                Event::start(SyntaxKind::Error),
                Event::token(SyntaxKind::Ident),
                Event::token(SyntaxKind::Ident),
                Event::error("node"),
                Event::Finish,
                Event::Finish,
            ],
        )
        .unwrap();

        assert_eq!(errors[0].to_string(), "standalone at 0..0");
        assert_eq!(errors[1].to_string(), "node at 0..3");
    }

    #[test]
    fn test_multi_token_event_is_one_leaf() {
        let (node, _) = build(
            "a .b c",
            vec![
                Event::start(SyntaxKind::SourceFile),
                Event::Token {
                    kind: SyntaxKind::ValueText,
                    n_tokens: 3,
                },
                Event::token(SyntaxKind::Ident),
                Event::Finish,
            ],
        )
        .unwrap();

        assert_eq!(
            debug_tree(&node),
            "SourceFile@0..6\n  ValueText@0..4 \"a .b\"\n  Ident@5..6 \"c\"\n"
        );
    }

    #[test]
    fn test_malformed_logs() {
        assert_eq!(build("", vec![]).unwrap_err(), TreeError::Empty);
        assert_eq!(
            build("", vec![Event::open(), Event::Finish]).unwrap_err(),
            TreeError::UnresolvedMarker(0)
        );
        assert_eq!(
            build("", vec![Event::start(SyntaxKind::SourceFile)]).unwrap_err(),
            TreeError::UnclosedNodes(1)
        );
        assert_eq!(
            build("a", vec![Event::start(SyntaxKind::SourceFile), Event::Finish]).unwrap_err(),
            TreeError::UnconsumedTokens(1)
        );
        assert_eq!(
            build(
                "",
                vec![Event::start(SyntaxKind::SourceFile), Event::token(SyntaxKind::Ident)]
            )
            .unwrap_err(),
            TreeError::TokenPastEnd(1)
        );
        assert_eq!(
            build(
                "",
                vec![
                    Event::start(SyntaxKind::SourceFile),
                    Event::Finish,
                    Event::Finish
                ]
            )
            .unwrap_err(),
            TreeError::OutsideRoot(2)
        );
    }
}
