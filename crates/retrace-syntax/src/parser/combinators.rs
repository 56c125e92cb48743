//! Grammar combinators.
//!
//! Every combinator is a plain function over the [`Parser`]: it opens
//! markers, calls sub-rules and resolves the markers. None of them keeps
//! state of its own. A sub-rule reports success with `true`; on `false` the
//! combinator has already undone whatever the sub-rule recorded.

use crate::lexer::TokenKind;
use crate::syntax::SyntaxKind;

use super::{CompletedMarker, Parser};

/// A named grammar rule.
pub type Rule = for<'t, 'src> fn(&mut Parser<'t, 'src>) -> bool;

/// One element of a [`pinned`] sequence.
#[derive(Clone, Copy)]
pub enum Step {
    /// A single token of the given kind.
    Token(TokenKind),
    /// A sub-rule, with the name used in "expected" messages.
    Rule(&'static str, Rule),
}

impl Step {
    fn run(self, p: &mut Parser<'_, '_>) -> bool {
        match self {
            Self::Token(kind) => p.eat(kind),
            Self::Rule(_, rule) => attempt(p, rule),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::Token(kind) => kind.describe(),
            Self::Rule(name, _) => name,
        }
    }
}

/// Runs `f` under the recursion guard for `name`. A refused entry counts
/// as a failed match.
pub fn rule<'t, 'src>(
    p: &mut Parser<'t, 'src>,
    name: &'static str,
    f: impl FnOnce(&mut Parser<'t, 'src>) -> bool,
) -> bool {
    p.guarded(name, f).unwrap_or(false)
}

/// All-or-nothing: completes a `kind` node when `f` matches, otherwise
/// rolls back everything `f` did.
pub fn sequence<'t, 'src>(
    p: &mut Parser<'t, 'src>,
    kind: SyntaxKind,
    f: impl FnOnce(&mut Parser<'t, 'src>) -> bool,
) -> bool {
    let m = p.start();
    if f(p) {
        m.complete(p, kind);
        true
    } else {
        m.rollback(p);
        false
    }
}

/// Like [`sequence`], but a match produces no wrapping node.
pub fn attempt<'t, 'src>(
    p: &mut Parser<'t, 'src>,
    f: impl FnOnce(&mut Parser<'t, 'src>) -> bool,
) -> bool {
    let m = p.start();
    if f(p) {
        m.abandon(p);
        true
    } else {
        m.rollback(p);
        false
    }
}

/// `X?`: tries `f` and succeeds either way.
pub fn optional<'t, 'src>(
    p: &mut Parser<'t, 'src>,
    f: impl FnOnce(&mut Parser<'t, 'src>) -> bool,
) -> bool {
    attempt(p, f);
    true
}

/// `X*`: matches `f` until it fails or stops consuming input.
pub fn repeat<'t, 'src>(
    p: &mut Parser<'t, 'src>,
    name: &'static str,
    mut f: impl FnMut(&mut Parser<'t, 'src>) -> bool,
) -> bool {
    loop {
        let start = p.position();
        if !attempt(p, &mut f) || !p.empty_element_guard(name, start) {
            break;
        }
    }
    true
}

/// `X+`: like [`repeat`], but the first match is required.
pub fn repeat1<'t, 'src>(
    p: &mut Parser<'t, 'src>,
    name: &'static str,
    mut f: impl FnMut(&mut Parser<'t, 'src>) -> bool,
) -> bool {
    let start = p.position();
    if !attempt(p, &mut f) {
        return false;
    }
    if p.empty_element_guard(name, start) {
        repeat(p, name, f);
    }
    true
}

/// `X (SEP X)*`. A trailing separator without an item is left unconsumed.
pub fn separated<'t, 'src>(
    p: &mut Parser<'t, 'src>,
    name: &'static str,
    mut item: impl FnMut(&mut Parser<'t, 'src>) -> bool,
    separator: TokenKind,
) -> bool {
    if !attempt(p, &mut item) {
        return false;
    }
    repeat(p, name, |p| p.eat(separator) && item(p))
}

/// `X | Y | Z`: the first alternative that matches wins.
pub fn choice(p: &mut Parser<'_, '_>, alternatives: &[Rule]) -> bool {
    alternatives.iter().any(|&alternative| attempt(p, alternative))
}

/// `&X`: reports whether `f` would match, without consuming anything.
pub fn lookahead<'t, 'src>(
    p: &mut Parser<'t, 'src>,
    f: impl FnOnce(&mut Parser<'t, 'src>) -> bool,
) -> bool {
    let m = p.start();
    let matched = f(p);
    m.rollback(p);
    matched
}

/// `!X`: succeeds when `f` would not match. Never consumes anything.
pub fn not_ahead<'t, 'src>(
    p: &mut Parser<'t, 'src>,
    f: impl FnOnce(&mut Parser<'t, 'src>) -> bool,
) -> bool {
    !lookahead(p, f)
}

/// A sequence that commits once its first `pin` steps have matched.
///
/// Before the pin a missing step fails the whole sequence. After it, the
/// first missing step is reported as "expected ..." and the node is
/// completed with what was parsed so far.
pub fn pinned(p: &mut Parser<'_, '_>, kind: SyntaxKind, pin: usize, steps: &[Step]) -> bool {
    let m = p.start();
    for (index, &step) in steps.iter().enumerate() {
        if step.run(p) {
            continue;
        }
        if index < pin {
            m.rollback(p);
            return false;
        }
        p.error(&format!("expected {}", step.describe()));
        break;
    }
    m.complete(p, kind);
    true
}

/// A left section: when `f` matches, the node completed just before it and
/// everything `f` recorded become a new `kind` node.
///
/// Fails without touching the log when there is no completed node inside
/// the innermost open marker, or when `f` does not match.
pub fn left<'t, 'src>(
    p: &mut Parser<'t, 'src>,
    kind: SyntaxKind,
    f: impl FnOnce(&mut Parser<'t, 'src>) -> bool,
) -> Option<CompletedMarker> {
    let done = p.latest_done()?;
    if !attempt(p, f) {
        return None;
    }
    Some(done.precede(p).complete(p, kind))
}

/// Wraps tokens into one error node until `stop` holds or input ends.
/// Returns `false` if there was nothing to skip.
pub fn recover_until(
    p: &mut Parser<'_, '_>,
    stop: impl Fn(&Parser<'_, '_>) -> bool,
    message: &str,
) -> bool {
    if p.at_end() || stop(&*p) {
        return false;
    }
    let m = p.start();
    while !p.at_end() && !stop(&*p) {
        p.bump();
    }
    m.error(p, message);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::event::Event;

    fn run(text: &str, f: impl FnOnce(&mut Parser<'_, '_>)) -> Vec<Event> {
        let tokens = lex(text);
        let mut parser = Parser::new(&tokens, text);
        f(&mut parser);
        parser.finish()
    }

    fn ident(p: &mut Parser<'_, '_>) -> bool {
        p.eat(TokenKind::Ident)
    }

    fn number(p: &mut Parser<'_, '_>) -> bool {
        p.eat(TokenKind::Number)
    }

    #[test]
    fn test_sequence_rolls_back_on_failure() {
        let events = run("a b", |p| {
            assert!(!sequence(p, SyntaxKind::NameRef, |p| ident(p) && number(p)));
            assert_eq!(p.current_text(), "a");
        });
        assert!(events.is_empty());
    }

    #[test]
    fn test_optional_always_succeeds() {
        run("a", |p| {
            assert!(optional(p, number));
            assert!(optional(p, ident));
            assert!(p.at_end());
        });
    }

    #[test]
    fn test_repeat_stops_on_empty_match() {
        let mut calls = 0;
        run("a", |p| {
            assert!(repeat(p, "nothing", |_| {
                calls += 1;
                true
            }));
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_repeat1_requires_one() {
        run("1 2 a", |p| {
            assert!(!repeat1(p, "idents", ident));
            assert!(repeat1(p, "numbers", number));
            assert_eq!(p.current_text(), "a");
        });
    }

    #[test]
    fn test_separated_leaves_trailing_separator() {
        run("a.b.", |p| {
            assert!(separated(p, "path", ident, TokenKind::Dot));
            assert!(p.at(TokenKind::Dot));
            assert_eq!(p.nth(1), TokenKind::Eof);
        });
    }

    #[test]
    fn test_choice_takes_first_match() {
        run("1", |p| {
            assert!(choice(p, &[ident, number]));
            assert!(!choice(p, &[ident, number]));
        });
    }

    #[test]
    fn test_lookahead_consumes_nothing() {
        let events = run("a", |p| {
            assert!(lookahead(p, ident));
            assert!(not_ahead(p, number));
            assert!(!not_ahead(p, ident));
            assert_eq!(p.position(), 0);
        });
        assert!(events.is_empty());
    }

    #[test]
    fn test_pinned_commits_after_pin() {
        let steps = [
            Step::Token(TokenKind::ModifyAssign),
            Step::Rule("function name", ident),
            Step::Token(TokenKind::LParen),
        ];
        let events = run(":= 1", |p| {
            assert!(pinned(p, SyntaxKind::ValueModification, 1, &steps));
        });
        assert_eq!(
            events,
            vec![
                Event::start(SyntaxKind::ValueModification),
                Event::token(SyntaxKind::ModifyAssign),
                Event::error("expected function name"),
                Event::Finish,
            ]
        );

        let events = run("x", |p| {
            assert!(!pinned(p, SyntaxKind::ValueModification, 1, &steps));
        });
        assert!(events.is_empty());
    }

    #[test]
    fn test_recover_until() {
        run("1 2 a", |p| {
            assert!(recover_until(p, |p| p.at(TokenKind::Ident), "junk"));
            assert!(!recover_until(p, |p| p.at(TokenKind::Ident), "junk"));
            assert_eq!(p.current_text(), "a");
        });
    }

    #[test]
    fn test_left_wraps_previous_node() {
        let events = run("a.b", |p| {
            let root = p.start();
            assert!(left(p, SyntaxKind::FieldExpr, ident).is_none());

            let m = p.start();
            p.bump();
            m.complete(p, SyntaxKind::NameRef);
            assert!(left(p, SyntaxKind::FieldExpr, number).is_none());
            let done = left(p, SyntaxKind::FieldExpr, |p| p.eat(TokenKind::Dot) && ident(p));
            assert_eq!(done.map(CompletedMarker::kind), Some(SyntaxKind::FieldExpr));
            root.complete(p, SyntaxKind::ExpressionRoot);
        });
        assert_eq!(
            events,
            vec![
                Event::start(SyntaxKind::ExpressionRoot),
                Event::Start {
                    kind: Some(SyntaxKind::NameRef),
                    forward_parent: Some(6),
                },
                Event::token(SyntaxKind::Ident),
                Event::Finish,
                Event::Placeholder,
                Event::token(SyntaxKind::Dot),
                Event::token(SyntaxKind::Ident),
                Event::start(SyntaxKind::FieldExpr),
                Event::Finish,
                Event::Finish,
            ]
        );
    }

    #[test]
    fn test_rule_refuses_left_recursion() {
        fn left_recursive(p: &mut Parser<'_, '_>) -> bool {
            rule(p, "left_recursive", |p| {
                attempt(p, |p| left_recursive(p) && p.eat(TokenKind::Plus)) || ident(p)
            })
        }

        run("a", |p| {
            assert!(left_recursive(p));
            assert!(p.at_end());
        });
    }
}
