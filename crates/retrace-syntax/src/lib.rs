//! `retrace-syntax` - A backtracking, marker-based concrete syntax tree builder.
//!
//! This crate provides the machinery every parser in the workspace is built on,
//! plus one complete grammar that exercises it:
//!
//! - **Lexer**: Tokenizes source text into a lossless stream of tokens
//! - **Parser**: A builder threaded through grammar rules. Rules open markers,
//!   consume tokens and either commit a node, drop the marker, or roll back
//!   every effect since the marker was opened
//! - **Syntax Tree**: Lossless `rowan` tree assembled from the event log
//!
//! # Design Principles
//!
//! - **Speculative**: Any rule may be tried and undone; rollback restores the
//!   token cursor and the event log exactly
//! - **Guarded**: Non-progressing recursion and empty loop iterations are
//!   turned into ordinary failures instead of hangs
//! - **Error-tolerant**: Unparsable input is wrapped in error nodes and the
//!   tree always covers the whole token stream
//!
//! # Example
//!
//! ```
//! use retrace_syntax::parser::parse;
//! use retrace_syntax::SyntaxKind;
//!
//! let source = "page.10 = TEXT\n";
//! let parse = parse(source);
//!
//! assert!(parse.ok());
//! assert_eq!(parse.syntax().kind(), SyntaxKind::SourceFile);
//! assert_eq!(parse.syntax().text().to_string(), source);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod lexer;
pub mod parser;
pub mod syntax;
mod token_kinds;

pub use config::{EmptyLoopPolicy, ParserConfig};
pub use lexer::{lex, Lexer, Token, TokenKind};
pub use parser::{parse, EntryPoint, Parse, ParseError};
pub use syntax::{SyntaxKind, SyntaxNode, SyntaxToken, TypoLanguage};
