//! Backtracking parser core.
//!
//! This module provides the marker-based builder that grammar rules are
//! written against, the combinators built on top of it, and a recursive
//! descent grammar that exercises them.
//!
//! # Architecture
//!
//! The parser uses a three-phase approach:
//!
//! 1. **Lexing**: Tokenize source text (see `lexer` module)
//! 2. **Parsing**: Build a flat stream of events (start node, add token,
//!    finish node, error). Speculative rules truncate the stream to undo
//!    themselves
//! 3. **Tree Building**: Convert events into a `rowan` green tree

#![allow(clippy::module_inception)]

pub mod combinators;
pub mod event;
mod grammar;
mod guard;
mod parser;
mod sink;
mod source;

pub use guard::GuardFailure;
pub use parser::{
    assemble, grammar_events, parse, parse_entry, parse_events, parse_with_config,
    CompletedMarker, Marker, Parser,
};
pub use sink::TreeError;

use std::fmt;
use std::str::FromStr;

use crate::syntax::{debug_tree, SyntaxKind, SyntaxNode};

/// Result of parsing source text.
#[derive(Debug)]
pub struct Parse {
    /// The root syntax node.
    green_node: rowan::GreenNode,
    /// Parsing errors.
    errors: Vec<ParseError>,
}

impl Parse {
    /// Returns the root syntax node.
    #[must_use]
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green_node.clone())
    }

    /// Returns the parsing errors.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Returns `true` if parsing produced no errors.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Renders the tree in the indented `Kind@range` format.
    #[must_use]
    pub fn debug_tree(&self) -> String {
        debug_tree(&self.syntax())
    }
}

/// A parsing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The error message.
    pub message: String,
    /// The byte range where the error occurred.
    pub range: text_size::TextRange,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {}..{}",
            self.message,
            u32::from(self.range.start()),
            u32::from(self.range.end())
        )
    }
}

impl std::error::Error for ParseError {}

/// Where parsing starts. Each entry point yields a tree rooted at
/// [`EntryPoint::root_kind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EntryPoint {
    /// A whole file of statements.
    #[default]
    SourceFile,
    /// A single dotted object path.
    ObjectPath,
    /// A single expression.
    Expression,
    /// A bracketed condition line.
    Condition,
}

impl EntryPoint {
    /// Kind of the root node produced for this entry point.
    #[must_use]
    pub fn root_kind(self) -> SyntaxKind {
        match self {
            Self::SourceFile | Self::ObjectPath | Self::Condition => SyntaxKind::SourceFile,
            Self::Expression => SyntaxKind::ExpressionRoot,
        }
    }

    /// Name used on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SourceFile => "file",
            Self::ObjectPath => "path",
            Self::Expression => "expr",
            Self::Condition => "condition",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryPoint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::SourceFile),
            "path" => Ok(Self::ObjectPath),
            "expr" => Ok(Self::Expression),
            "condition" => Ok(Self::Condition),
            other => Err(format!(
                "unknown entry point '{other}' (expected file, path, expr or condition)"
            )),
        }
    }
}
