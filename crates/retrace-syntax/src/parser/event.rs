//! Parser events.
//!
//! The parser produces a flat stream of events that are later converted
//! into a syntax tree. Every effect a grammar rule has on the parse is an
//! event, so truncating the stream undoes the effect.

use smol_str::SmolStr;

use crate::syntax::SyntaxKind;

/// An event produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Start a new node.
    Start {
        /// The kind of node being started, `None` while the marker is open.
        kind: Option<SyntaxKind>,
        /// Forward parent - used for left recursion handling.
        forward_parent: Option<u32>,
    },
    /// Add a token to the current node.
    Token {
        /// The kind of token.
        kind: SyntaxKind,
        /// Number of significant tokens to consume (usually 1). More than
        /// one are glued into a single leaf, trivia between them included.
        n_tokens: u32,
    },
    /// Finish the current node.
    Finish,
    /// A diagnostic anchored at this point of the stream.
    Error {
        /// Human readable message.
        message: SmolStr,
    },
    /// Placeholder event (left behind by an abandoned marker).
    Placeholder,
}

impl Event {
    /// Creates an open start event with no kind and no forward parent.
    #[must_use]
    pub fn open() -> Self {
        Self::Start {
            kind: None,
            forward_parent: None,
        }
    }

    /// Creates a start event with no forward parent.
    #[must_use]
    pub fn start(kind: SyntaxKind) -> Self {
        Self::Start {
            kind: Some(kind),
            forward_parent: None,
        }
    }

    /// Creates a token event.
    #[must_use]
    pub fn token(kind: SyntaxKind) -> Self {
        Self::Token { kind, n_tokens: 1 }
    }

    /// Creates an error event.
    #[must_use]
    pub fn error(message: impl Into<SmolStr>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Returns `true` for an error event or the start of an error node.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::Error { .. }
                | Self::Start {
                    kind: Some(SyntaxKind::Error),
                    ..
                }
        )
    }
}
