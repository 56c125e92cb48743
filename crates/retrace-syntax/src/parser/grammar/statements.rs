//! Statement parsing.
//!
//! ```text
//! statement          := import | condition | object_statement
//! object_statement   := object_path operator_rule
//! operator_rule      := assignment | reference | value_modification
//!                     | broken_modification | copy | unset | code_block
//! ```
//!
//! Statements are line based: a statement that cannot be parsed is wrapped
//! in an error node up to the next line start (or the closing `}` of the
//! enclosing block).

use crate::lexer::TokenKind;
use crate::parser::combinators::{
    choice, lookahead, pinned, recover_until, rule, separated, sequence, Step,
};
use crate::parser::Parser;
use crate::syntax::SyntaxKind;

use super::{expressions, paths};

pub(super) fn source_file(p: &mut Parser<'_, '_>) {
    statement_list(p, false);
}

fn statement_list(p: &mut Parser<'_, '_>, in_block: bool) {
    let at_stop = move |p: &Parser<'_, '_>| p.at_line_start() || (in_block && p.at(TokenKind::RBrace));

    loop {
        if p.at_end() || (in_block && p.at(TokenKind::RBrace)) {
            break;
        }

        let start = p.position();
        if !statement(p) || !p.empty_element_guard("statement", start) {
            recover_line(p, in_block);
            continue;
        }

        // Anything left on the line belongs to no statement.
        recover_until(p, at_stop, "expected end of line");
    }
}

/// Wraps the current token and the rest of its line in an error node.
fn recover_line(p: &mut Parser<'_, '_>, in_block: bool) {
    let m = p.start();
    p.bump();
    while !p.at_end() && !p.at_line_start() && !(in_block && p.at(TokenKind::RBrace)) {
        p.bump();
    }
    m.error(p, "expected statement");
}

fn statement(p: &mut Parser<'_, '_>) -> bool {
    choice(p, &[import, condition, object_statement])
}

fn import(p: &mut Parser<'_, '_>) -> bool {
    if !lookahead(p, |p| p.eat(TokenKind::At) && p.at(TokenKind::Ident)) {
        return false;
    }

    let m = p.start();
    p.bump();
    if p.current_text() == "import" {
        p.bump_remap(SyntaxKind::ImportKw);
        p.expect(TokenKind::String);
    } else {
        p.error("expected 'import'");
        p.bump();
    }
    m.complete(p, SyntaxKind::Import);
    true
}

pub(super) fn condition(p: &mut Parser<'_, '_>) -> bool {
    if !p.at(TokenKind::LBracket) {
        return false;
    }

    let m = p.start();
    p.bump();
    if !expressions::expression(p) {
        p.error("expected expression");
    }
    recover_until(
        p,
        |p| p.at(TokenKind::RBracket) || p.at_line_start(),
        "unexpected input in condition",
    );
    p.expect(TokenKind::RBracket);
    m.complete(p, SyntaxKind::Condition);
    true
}

fn object_statement(p: &mut Parser<'_, '_>) -> bool {
    pinned(
        p,
        SyntaxKind::ObjectStatement,
        1,
        &[
            Step::Rule("object path", paths::object_path),
            Step::Rule("operator", operator_rule),
        ],
    )
}

fn operator_rule(p: &mut Parser<'_, '_>) -> bool {
    choice(
        p,
        &[
            assignment,
            reference,
            value_modification,
            broken_modification,
            copy,
            unset,
            code_block,
        ],
    )
}

fn assignment(p: &mut Parser<'_, '_>) -> bool {
    sequence(p, SyntaxKind::Assignment, |p| {
        if !p.eat(TokenKind::Assign) {
            return false;
        }
        p.eat(TokenKind::ValueText);
        true
    })
}

fn reference(p: &mut Parser<'_, '_>) -> bool {
    pinned(
        p,
        SyntaxKind::Reference,
        1,
        &[
            Step::Token(TokenKind::ReferenceAssign),
            Step::Rule("object path", paths::object_path),
        ],
    )
}

fn copy(p: &mut Parser<'_, '_>) -> bool {
    pinned(
        p,
        SyntaxKind::Copy,
        1,
        &[
            Step::Token(TokenKind::Lt),
            Step::Rule("object path", paths::object_path),
        ],
    )
}

fn unset(p: &mut Parser<'_, '_>) -> bool {
    sequence(p, SyntaxKind::Unset, |p| p.eat(TokenKind::Gt))
}

/// `:= name(arguments)`, all or nothing.
fn value_modification(p: &mut Parser<'_, '_>) -> bool {
    sequence(p, SyntaxKind::ValueModification, |p| {
        p.eat(TokenKind::ModifyAssign)
            && p.eat(TokenKind::Ident)
            && p.eat(TokenKind::LParen)
            && modifier_arguments(p)
            && p.eat(TokenKind::RParen)
    })
}

/// A `:=` that did not match [`value_modification`]. Reports what is missing.
fn broken_modification(p: &mut Parser<'_, '_>) -> bool {
    pinned(
        p,
        SyntaxKind::ValueModification,
        1,
        &[
            Step::Token(TokenKind::ModifyAssign),
            Step::Token(TokenKind::Ident),
            Step::Token(TokenKind::LParen),
            Step::Rule("modifier arguments", modifier_arguments),
            Step::Token(TokenKind::RParen),
        ],
    )
}

fn modifier_arguments(p: &mut Parser<'_, '_>) -> bool {
    let m = p.start();
    separated(p, "modifier_arguments", modifier_argument, TokenKind::Comma);
    m.complete(p, SyntaxKind::ModifierArguments);
    true
}

fn modifier_argument(p: &mut Parser<'_, '_>) -> bool {
    if !matches!(
        p.current(),
        TokenKind::Ident | TokenKind::Number | TokenKind::String
    ) {
        return false;
    }
    p.bump();
    true
}

fn code_block(p: &mut Parser<'_, '_>) -> bool {
    if !p.at(TokenKind::LBrace) {
        return false;
    }

    rule(p, "code_block", |p| {
        let m = p.start();
        p.bump();
        statement_list(p, true);
        p.expect(TokenKind::RBrace);
        m.complete(p, SyntaxKind::CodeBlock);
        true
    })
}
