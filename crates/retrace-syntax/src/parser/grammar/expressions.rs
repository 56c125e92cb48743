//! Expression parsing using Pratt parsing.
//!
//! Operator precedence (low to high):
//! - `||` (1-2)
//! - `&&` (3-4)
//! - `==`, `!=` (5-6)
//! - `<`, `<=`, `>`, `>=` (7-8)
//! - `<<`, `>>` (9-10)
//! - `+`, `-` (11-12)
//! - `*`, `/`, `%` (13-14)
//! - `!`, unary `-` (15)
//!
//! Binary operators are left associative: the loop wraps the expression
//! parsed so far with [`CompletedMarker::precede`]. Postfix forms are
//! parsed as [`left`] sections.

use crate::lexer::TokenKind;
use crate::parser::combinators::left;
use crate::parser::{CompletedMarker, Parser};
use crate::syntax::SyntaxKind;

/// Parses an expression. Returns `false` if no expression starts here.
pub(super) fn expression(p: &mut Parser<'_, '_>) -> bool {
    expr_bp(p, 0).is_some()
}

/// Parse expression with minimum binding power.
fn expr_bp(p: &mut Parser<'_, '_>, min_bp: u8) -> Option<CompletedMarker> {
    p.guarded("expression", |p| expr_bp_inner(p, min_bp))
        .flatten()
}

fn expr_bp_inner(p: &mut Parser<'_, '_>, min_bp: u8) -> Option<CompletedMarker> {
    let mut lhs = if let Some(bp) = p.current().prefix_binding_power() {
        let marker = p.start();
        p.bump();
        if expr_bp(p, bp).is_none() {
            p.error("expected expression");
        }
        marker.complete(p, SyntaxKind::UnaryExpr)
    } else {
        primary_expr(p)?
    };

    loop {
        if let Some(next) = postfix_expr(p, lhs) {
            lhs = next;
            continue;
        }

        let Some((l_bp, r_bp)) = p.current().infix_binding_power() else {
            break;
        };
        if l_bp < min_bp {
            break;
        }

        let marker = lhs.precede(p);
        p.bump(); // operator
        if expr_bp(p, r_bp).is_none() {
            p.error("expected expression");
        }
        lhs = marker.complete(p, SyntaxKind::BinaryExpr);
    }

    Some(lhs)
}

/// Parse postfix expressions (field access, calls, indexing) as left
/// sections over `lhs`.
fn postfix_expr(p: &mut Parser<'_, '_>, lhs: CompletedMarker) -> Option<CompletedMarker> {
    debug_assert_eq!(p.latest_done(), Some(lhs));
    match p.current() {
        TokenKind::Dot => left(p, SyntaxKind::FieldExpr, |p| {
            p.bump();
            if p.current().is_path_entity() {
                name_ref(p);
            } else {
                p.error("expected field name");
            }
            true
        }),
        TokenKind::LParen => left(p, SyntaxKind::CallExpr, |p| {
            arg_list(p);
            true
        }),
        TokenKind::LBracket => left(p, SyntaxKind::IndexExpr, |p| {
            p.bump();
            if !expression(p) {
                p.error("expected expression");
            }
            p.expect(TokenKind::RBracket);
            true
        }),
        _ => None,
    }
}

/// Parse primary expressions (literals, names, parentheses).
fn primary_expr(p: &mut Parser<'_, '_>) -> Option<CompletedMarker> {
    match p.current() {
        TokenKind::Number | TokenKind::String => {
            let marker = p.start();
            p.bump();
            Some(marker.complete(p, SyntaxKind::Literal))
        }
        TokenKind::Ident => Some(name_ref(p)),
        TokenKind::LParen => {
            let marker = p.start();
            p.bump();
            if !expression(p) {
                p.error("expected expression");
            }
            p.expect(TokenKind::RParen);
            Some(marker.complete(p, SyntaxKind::ParenExpr))
        }
        _ => None,
    }
}

fn name_ref(p: &mut Parser<'_, '_>) -> CompletedMarker {
    let marker = p.start();
    p.bump();
    marker.complete(p, SyntaxKind::NameRef)
}

fn arg_list(p: &mut Parser<'_, '_>) {
    let marker = p.start();
    p.bump(); // (
    if !p.at(TokenKind::RParen) {
        if !expression(p) {
            p.error("expected expression");
        }
        while p.eat(TokenKind::Comma) {
            if !expression(p) {
                p.error("expected expression");
            }
        }
    }
    p.expect(TokenKind::RParen);
    marker.complete(p, SyntaxKind::ArgList);
}
