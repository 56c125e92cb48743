//! Object path parsing.
//!
//! ```text
//! object_path := entity ('.' entity)*
//! entity      := IDENT | NUMBER
//! ```

use crate::lexer::TokenKind;
use crate::parser::combinators::{separated, sequence};
use crate::parser::Parser;
use crate::syntax::SyntaxKind;

use super::at_path_entity;

pub(super) fn object_path(p: &mut Parser<'_, '_>) -> bool {
    if !at_path_entity(p) {
        return false;
    }
    sequence(p, SyntaxKind::ObjectPath, |p| {
        separated(p, "object_path", entity, TokenKind::Dot)
    })
}

fn entity(p: &mut Parser<'_, '_>) -> bool {
    if !at_path_entity(p) {
        return false;
    }
    p.bump();
    true
}
