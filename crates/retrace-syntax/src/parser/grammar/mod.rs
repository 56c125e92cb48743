//! Grammar rules for the TypoScript-flavoured configuration language.
//!
//! This module contains the grammar rules organized by category:
//!
//! - `statements.rs` - Statements, operators and the line-based recovery
//! - `paths.rs` - Dotted object paths
//! - `expressions.rs` - Condition expressions (Pratt parser)

mod expressions;
mod paths;
mod statements;

use crate::parser::combinators::recover_until;
use crate::parser::{EntryPoint, Parser};

/// Parses one entry point. The whole token stream ends up under one root.
pub(crate) fn parse(p: &mut Parser<'_, '_>, entry: EntryPoint) {
    let root = p.start();
    match entry {
        EntryPoint::SourceFile => statements::source_file(p),
        EntryPoint::ObjectPath => {
            if !paths::object_path(p) {
                p.error("expected object path");
            }
            trailing(p);
        }
        EntryPoint::Expression => {
            if !expressions::expression(p) {
                p.error("expected expression");
            }
            trailing(p);
        }
        EntryPoint::Condition => {
            if !statements::condition(p) {
                p.error("expected condition");
            }
            trailing(p);
        }
    }
    root.complete(p, entry.root_kind());
}

fn trailing(p: &mut Parser<'_, '_>) {
    recover_until(p, |_| false, "unexpected input");
}

/// Returns `true` for tokens that may begin a path segment.
fn at_path_entity(p: &Parser<'_, '_>) -> bool {
    p.current().is_path_entity()
}
