//! Main parser implementation.
//!
//! `Parser` is the builder threaded through every grammar rule. It owns the
//! token cursor, the event log and the guard table. Rules open a [`Marker`]
//! with [`Parser::start`] and resolve it exactly once: `complete` commits a
//! node, `abandon` keeps the children without a wrapper and `rollback` undoes
//! every event and cursor movement made since the marker was opened.

use drop_bomb::DropBomb;
use text_size::TextSize;
use tracing::{debug, trace, warn};

use crate::config::{EmptyLoopPolicy, ParserConfig};
use crate::lexer::{lex, Token, TokenKind};
use crate::parser::event::Event;
use crate::parser::grammar;
use crate::parser::guard::{GuardFailure, GuardTable};
use crate::parser::sink::{Sink, TreeError};
use crate::parser::source::Source;
use crate::parser::{EntryPoint, Parse};
use crate::syntax::SyntaxKind;

/// Parses a source file into a syntax tree.
#[must_use]
pub fn parse(text: &str) -> Parse {
    parse_entry(text, EntryPoint::SourceFile)
}

/// Parses text starting at the given grammar entry point.
#[must_use]
pub fn parse_entry(text: &str, entry: EntryPoint) -> Parse {
    parse_with_config(text, entry, &ParserConfig::default())
}

/// Parses text with explicit parser settings.
///
/// # Panics
///
/// Panics if the grammar produced a malformed event log. That is a bug in
/// a grammar rule, never a consequence of the input text.
#[must_use]
pub fn parse_with_config(text: &str, entry: EntryPoint, config: &ParserConfig) -> Parse {
    let tokens = lex(text);
    let events = grammar_events(&tokens, text, entry, config);
    match assemble(&tokens, text, events) {
        Ok(parse) => {
            debug!(
                entry = ?entry,
                tokens = tokens.len(),
                errors = parse.errors().len(),
                "parsed"
            );
            parse
        }
        Err(err) => panic!("malformed event log: {err}"),
    }
}

/// Runs the grammar and returns the raw event log without building a tree.
#[must_use]
pub fn parse_events(text: &str, entry: EntryPoint, config: &ParserConfig) -> Vec<Event> {
    let tokens = lex(text);
    grammar_events(&tokens, text, entry, config)
}

/// Builds a tree from a finished event log.
///
/// # Errors
///
/// Returns a [`TreeError`] when the events are not properly nested or do
/// not cover every significant token.
pub fn assemble(tokens: &[Token], text: &str, events: Vec<Event>) -> Result<Parse, TreeError> {
    let (green_node, errors) = Sink::new(tokens, text, events).try_finish()?;
    Ok(Parse { green_node, errors })
}

/// Runs the grammar over already lexed tokens. Pair with [`assemble`] to
/// inspect the event log and the tree of one run.
#[must_use]
pub fn grammar_events(
    tokens: &[Token],
    text: &str,
    entry: EntryPoint,
    config: &ParserConfig,
) -> Vec<Event> {
    let mut parser = Parser::with_config(tokens, text, config.clone());
    grammar::parse(&mut parser, entry);
    parser.finish()
}

/// The parser state.
pub struct Parser<'t, 'src> {
    source: Source<'t, 'src>,
    events: Vec<Event>,
    guards: GuardTable,
    config: ParserConfig,
    completed: Vec<CompletedMarker>,
    open: Vec<usize>,
}

/// An open node boundary in the event log.
///
/// A marker must be resolved exactly once; dropping it unresolved panics.
pub struct Marker {
    pos: usize,
    start: usize,
    token_pos: usize,
    child: Option<usize>,
    bomb: DropBomb,
}

impl Marker {
    fn new(pos: usize, start: usize, token_pos: usize, child: Option<usize>) -> Self {
        Self {
            pos,
            start,
            token_pos,
            child,
            bomb: DropBomb::new("uncompleted marker"),
        }
    }

    /// Finishes the node: everything recorded since the marker was opened
    /// becomes its children.
    pub fn complete(mut self, p: &mut Parser<'_, '_>, kind: SyntaxKind) -> CompletedMarker {
        self.bomb.defuse();
        p.close(self.pos);
        if let Some(Event::Start { kind: slot, .. }) = p.events.get_mut(self.pos) {
            *slot = Some(kind);
        }
        p.events.push(Event::Finish);

        let completed = CompletedMarker {
            pos: self.pos,
            start: self.start,
            token_pos: self.token_pos,
            kind,
        };
        p.completed.push(completed);
        completed
    }

    /// Finishes the node as an error node carrying `message`.
    pub fn error(self, p: &mut Parser<'_, '_>, message: &str) -> CompletedMarker {
        p.events.push(Event::error(message));
        self.complete(p, SyntaxKind::Error)
    }

    /// Finishes the node where `before` was opened. Whatever `before`
    /// becomes is then a following sibling instead of a child.
    ///
    /// `before` must be the innermost open marker and `self` the one right
    /// below it.
    pub fn complete_before(
        self,
        p: &mut Parser<'_, '_>,
        kind: SyntaxKind,
        before: &mut Marker,
    ) -> CompletedMarker {
        self.finish_before(p, kind, before, None)
    }

    /// Like [`Marker::complete_before`], finishing an error node carrying
    /// `message`.
    pub fn error_before(
        self,
        p: &mut Parser<'_, '_>,
        message: &str,
        before: &mut Marker,
    ) -> CompletedMarker {
        self.finish_before(p, SyntaxKind::Error, before, Some(message))
    }

    fn finish_before(
        mut self,
        p: &mut Parser<'_, '_>,
        kind: SyntaxKind,
        before: &mut Marker,
        message: Option<&str>,
    ) -> CompletedMarker {
        assert!(
            self.pos < before.start,
            "marker at event {} cannot be finished before marker at event {}",
            self.pos,
            before.pos
        );
        self.bomb.defuse();
        p.close_below(self.pos, before.pos);

        let at = before.start;
        let mut inserted = Vec::with_capacity(2);
        if let Some(message) = message {
            inserted.push(Event::error(message));
        }
        inserted.push(Event::Finish);
        let shift = inserted.len();
        p.insert_events(at, inserted);

        before.pos += shift;
        before.start += shift;
        if let Some(child) = &mut before.child {
            *child += shift;
        }
        if let Some(Event::Start { kind: slot, .. }) = p.events.get_mut(self.pos) {
            *slot = Some(kind);
        }

        let completed = CompletedMarker {
            pos: self.pos,
            start: self.start,
            token_pos: self.token_pos,
            kind,
        };
        // Nodes completed inside `before` end later in the log.
        let index = p
            .completed
            .iter()
            .rposition(|done| done.pos < at)
            .map_or(0, |index| index + 1);
        p.completed.insert(index, completed);
        completed
    }

    /// Finishes the marker as a single `kind` token spanning every token
    /// recorded since it was opened. Nested nodes are flattened; errors
    /// recorded inside are kept after the token.
    pub fn collapse(mut self, p: &mut Parser<'_, '_>, kind: SyntaxKind) {
        self.bomb.defuse();
        p.close(self.pos);

        let mut n_tokens = 0u32;
        let mut errors = Vec::new();
        for event in p.events.drain(self.start..) {
            match event {
                Event::Token { n_tokens: n, .. } => n_tokens = n_tokens.saturating_add(n),
                Event::Error { .. } => errors.push(event),
                _ => {}
            }
        }
        while p.completed.last().is_some_and(|c| c.pos >= self.start) {
            p.completed.pop();
        }
        if n_tokens > 0 {
            p.events.push(Event::Token { kind, n_tokens });
        }
        p.events.extend(errors);
    }

    /// Removes the node boundary. Children recorded after the marker are
    /// promoted to the enclosing node.
    pub fn abandon(mut self, p: &mut Parser<'_, '_>) {
        self.bomb.defuse();
        p.close(self.pos);

        if let Some(child) = self.child {
            unlink_forward_parent(&mut p.events, child, self.pos);
        }
        if self.pos + 1 == p.events.len() {
            p.events.pop();
        } else {
            p.events[self.pos] = Event::Placeholder;
        }
    }

    /// Undoes every effect since the marker was opened: the event log is
    /// truncated and the token cursor moves back.
    ///
    /// Rolling back a marker obtained from [`CompletedMarker::precede`] also
    /// erases the node it wrapped.
    pub fn rollback(mut self, p: &mut Parser<'_, '_>) {
        self.bomb.defuse();
        p.close(self.pos);

        trace!(
            events = p.events.len() - self.start,
            from = p.source.position(),
            to = self.token_pos,
            "rollback"
        );
        p.events.truncate(self.start);
        p.source.reset(self.token_pos);
        while p.completed.last().is_some_and(|c| c.pos >= self.start) {
            p.completed.pop();
        }
    }
}

/// A finished node that may still be wrapped by a new parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedMarker {
    pos: usize,
    start: usize,
    token_pos: usize,
    kind: SyntaxKind,
}

impl CompletedMarker {
    /// Opens a marker for a new node that will contain this one as its
    /// first child.
    pub fn precede(self, p: &mut Parser<'_, '_>) -> Marker {
        let new_pos = p.events.len();
        p.events.push(Event::open());
        set_forward_parent(&mut p.events, self.pos, new_pos);
        p.open.push(new_pos);
        Marker::new(new_pos, self.start, self.token_pos, Some(self.pos))
    }

    /// The kind the node was completed with.
    #[must_use]
    pub fn kind(self) -> SyntaxKind {
        self.kind
    }
}

fn set_forward_parent(events: &mut [Event], from: usize, to: usize) {
    let mut current = from;
    loop {
        match &mut events[current] {
            Event::Start {
                forward_parent: Some(fp),
                ..
            } => {
                current += *fp as usize;
            }
            Event::Start { forward_parent, .. } => {
                *forward_parent = u32::try_from(to - current).ok();
                break;
            }
            _ => break,
        }
    }
}

fn unlink_forward_parent(events: &mut [Event], from: usize, to: usize) {
    let mut current = from;
    while let Some(Event::Start {
        forward_parent: Some(fp),
        ..
    }) = events.get_mut(current)
    {
        let next = current + *fp as usize;
        if next == to {
            if let Some(Event::Start { forward_parent, .. }) = events.get_mut(current) {
                *forward_parent = None;
            }
            return;
        }
        current = next;
    }
}

impl<'t, 'src> Parser<'t, 'src> {
    /// Creates a parser over `tokens` with default settings.
    pub fn new(tokens: &'t [Token], text: &'src str) -> Self {
        Self::with_config(tokens, text, ParserConfig::default())
    }

    /// Creates a parser over `tokens`.
    pub fn with_config(tokens: &'t [Token], text: &'src str, config: ParserConfig) -> Self {
        Self {
            source: Source::new(tokens, text),
            events: Vec::new(),
            guards: GuardTable::new(),
            config,
            completed: Vec::new(),
            open: Vec::new(),
        }
    }

    /// Consumes the parser and returns the event log.
    ///
    /// # Panics
    ///
    /// Panics with debug checks enabled if a marker is still open.
    pub fn finish(self) -> Vec<Event> {
        if self.config.debug_checks {
            assert!(
                self.open.is_empty(),
                "{} marker(s) still open at end of parse",
                self.open.len()
            );
        }
        self.events
    }

    // =========================================================================
    // Lookahead
    // =========================================================================

    /// The current significant token kind, `Eof` at the end.
    pub fn current(&self) -> TokenKind {
        self.source.current()
    }

    /// The kind `n` significant tokens ahead.
    pub fn nth(&self, n: usize) -> TokenKind {
        self.source.peek_kind_n(n)
    }

    /// Returns `true` if the current token has the given kind.
    pub fn at(&self, kind: TokenKind) -> bool {
        self.current() == kind
    }

    /// Returns `true` if every significant token has been consumed.
    pub fn at_end(&self) -> bool {
        self.source.at_end()
    }

    /// Text of the current token.
    pub fn current_text(&self) -> &'src str {
        self.source.current_text()
    }

    /// Start offset of the current token.
    pub fn current_offset(&self) -> TextSize {
        self.source.current_offset()
    }

    /// Returns `true` if the current token starts a line.
    pub fn at_line_start(&self) -> bool {
        self.source.has_newline_before()
    }

    /// The raw token cursor. Equal positions mean no token was consumed.
    pub fn position(&self) -> usize {
        self.source.position()
    }

    /// Number of events recorded so far.
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// The events recorded so far.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of guarded rule invocations currently active.
    pub fn guard_depth(&self) -> usize {
        self.guards.depth()
    }

    /// Settings of this parse.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    // =========================================================================
    // Building
    // =========================================================================

    /// Opens a new marker at the current position.
    pub fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::open());
        self.open.push(pos);
        Marker::new(pos, pos, self.source.position(), None)
    }

    /// Consumes the current token. Does nothing at end of input.
    pub fn bump(&mut self) {
        let kind = self.current();
        self.bump_remap(SyntaxKind::from(kind));
    }

    /// Consumes the current token, recording it as `kind`.
    pub fn bump_remap(&mut self, kind: SyntaxKind) {
        if self.at_end() {
            return;
        }
        self.events.push(Event::token(kind));
        self.source.bump();
    }

    /// Consumes the current token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> bool {
        if !self.at(kind) {
            return false;
        }
        self.bump();
        true
    }

    /// Like [`Parser::eat`], but records an "expected" error on mismatch.
    pub fn expect(&mut self, kind: TokenKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(&format!("expected {}", kind.describe()));
        false
    }

    /// Records an error at the current token.
    ///
    /// A second error before any further event is ignored, so only the
    /// first diagnostic at a position survives.
    pub fn error(&mut self, message: &str) {
        if matches!(self.events.last(), Some(Event::Error { .. })) {
            return;
        }
        self.events.push(Event::error(message));
    }

    /// The most recently completed node that is still in the log, if it
    /// is a child of the innermost open marker.
    pub fn latest_done(&self) -> Option<CompletedMarker> {
        let done = self.completed.last().copied()?;
        match self.open.last() {
            Some(&open) if done.start <= open => None,
            _ => Some(done),
        }
    }

    /// Returns `true` if an error was recorded inside the node `marker`
    /// opens. For a preceded marker that includes the wrapped node.
    pub fn has_errors_after(&self, marker: &Marker) -> bool {
        self.events
            .get(marker.start..)
            .unwrap_or_default()
            .iter()
            .enumerate()
            .any(|(offset, event)| marker.start + offset != marker.pos && event.is_error())
    }

    fn close(&mut self, pos: usize) {
        if self.open.last() == Some(&pos) {
            self.open.pop();
            return;
        }
        if self.config.debug_checks {
            panic!("marker at event {pos} resolved out of order (open: {:?})", self.open);
        }
        if let Some(index) = self.open.iter().rposition(|&open| open == pos) {
            self.open.remove(index);
        }
    }

    /// Removes `pos` from the open stack when `above` is the only marker
    /// opened after it.
    fn close_below(&mut self, pos: usize, above: usize) {
        if self.open.ends_with(&[pos, above]) {
            self.open.remove(self.open.len() - 2);
            return;
        }
        if self.config.debug_checks {
            panic!("marker at event {pos} resolved out of order (open: {:?})", self.open);
        }
        if let Some(index) = self.open.iter().rposition(|&open| open == pos) {
            self.open.remove(index);
        }
    }

    /// Inserts `inserted` at `at`, shifting every recorded index that
    /// points at or past it.
    fn insert_events(&mut self, at: usize, inserted: Vec<Event>) {
        let shift = inserted.len();
        let jump = u32::try_from(shift).unwrap_or(u32::MAX);
        for (index, event) in self.events[..at].iter_mut().enumerate() {
            if let Event::Start {
                forward_parent: Some(fp),
                ..
            } = event
            {
                if index + *fp as usize >= at {
                    *fp += jump;
                }
            }
        }
        self.events.splice(at..at, inserted);

        for open in &mut self.open {
            if *open >= at {
                *open += shift;
            }
        }
        for done in &mut self.completed {
            if done.pos >= at {
                done.pos += shift;
            }
            if done.start >= at {
                done.start += shift;
            }
        }
    }

    // =========================================================================
    // Guards
    // =========================================================================

    /// Runs `f` unless `rule` is already active at the current position or
    /// the nesting limit is reached. Returns `None` when refused.
    pub fn guarded<R>(&mut self, rule: &'static str, f: impl FnOnce(&mut Self) -> R) -> Option<R> {
        let position = self.position();
        match self.guards.enter(rule, position, self.config.max_depth) {
            Ok(()) => {}
            Err(GuardFailure::Stalled) => {
                trace!(rule, position, "recursion without progress");
                return None;
            }
            Err(GuardFailure::TooDeep(limit)) => {
                warn!(rule, limit, "recursion limit reached");
                self.error(&format!("maximum recursion level ({limit}) reached in '{rule}'"));
                return None;
            }
        }

        let result = f(self);
        self.guards.exit(rule);
        Some(result)
    }

    /// Checks that a loop iteration of `rule` that began at `start` consumed
    /// input. Returns `false` when it did not; the loop must stop then.
    pub fn empty_element_guard(&mut self, rule: &'static str, start: usize) -> bool {
        if self.position() != start {
            return true;
        }

        let offset = u32::from(self.current_offset());
        match self.config.empty_loop {
            EmptyLoopPolicy::Ignore => trace!(rule, offset, "empty element parsed"),
            EmptyLoopPolicy::Warn => warn!(rule, offset, "empty element parsed"),
            EmptyLoopPolicy::Report => {
                warn!(rule, offset, "empty element parsed");
                self.error(&format!("empty element parsed in '{rule}' at offset {offset}"));
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_parser<R>(text: &str, f: impl FnOnce(&mut Parser<'_, '_>) -> R) -> R {
        let tokens = lex(text);
        let mut parser = Parser::new(&tokens, text);
        f(&mut parser)
    }

    #[test]
    fn test_parse_empty() {
        let parse = parse("");
        assert!(parse.ok());
    }

    #[test]
    fn test_parse_simple_statement() {
        let parse = parse("page.10 = TEXT\n");
        assert!(parse.ok(), "errors: {:?}", parse.errors());
    }

    #[test]
    fn test_rollback_restores_log_and_cursor() {
        with_parser("a.b.c", |p| {
            let outer = p.start();
            let len = p.event_count();
            let position = p.position();

            let m = p.start();
            p.bump();
            let inner = p.start();
            p.bump();
            inner.complete(p, SyntaxKind::NameRef);
            p.error("oops");
            m.rollback(p);

            assert_eq!(p.event_count(), len);
            assert_eq!(p.position(), position);
            assert_eq!(p.current_text(), "a");
            assert_eq!(p.latest_done(), None);
            outer.abandon(p);
        });
    }

    #[test]
    fn test_abandon_keeps_children() {
        with_parser("a", |p| {
            let m = p.start();
            p.bump();
            m.abandon(p);
            assert_eq!(
                p.events(),
                &[Event::Placeholder, Event::token(SyntaxKind::Ident)]
            );
        });
    }

    #[test]
    fn test_abandon_last_event_is_removed() {
        with_parser("a", |p| {
            let m = p.start();
            m.abandon(p);
            assert_eq!(p.event_count(), 0);
        });
    }

    #[test]
    fn test_precede_links_forward_parent() {
        with_parser("a + b", |p| {
            let lhs = p.start();
            p.bump();
            let lhs = lhs.complete(p, SyntaxKind::NameRef);
            let m = lhs.precede(p);
            p.bump();
            p.bump();
            let done = m.complete(p, SyntaxKind::BinaryExpr);

            assert_eq!(done.kind(), SyntaxKind::BinaryExpr);
            assert_eq!(
                p.events()[0],
                Event::Start {
                    kind: Some(SyntaxKind::NameRef),
                    forward_parent: Some(3),
                }
            );
        });
    }

    #[test]
    fn test_rollback_of_preceded_marker_erases_wrapped_node() {
        with_parser("a + b", |p| {
            let lhs = p.start();
            p.bump();
            let lhs = lhs.complete(p, SyntaxKind::NameRef);
            let m = lhs.precede(p);
            p.bump();
            m.rollback(p);

            assert_eq!(p.event_count(), 0);
            assert_eq!(p.current_text(), "a");
            assert_eq!(p.latest_done(), None);
        });
    }

    #[test]
    fn test_abandon_of_preceded_marker_unlinks() {
        with_parser("a", |p| {
            let lhs = p.start();
            p.bump();
            let lhs = lhs.complete(p, SyntaxKind::NameRef);
            let m = lhs.precede(p);
            m.abandon(p);

            assert_eq!(
                p.events()[0],
                Event::Start {
                    kind: Some(SyntaxKind::NameRef),
                    forward_parent: None,
                }
            );
            assert_eq!(p.event_count(), 3);
        });
    }

    #[test]
    fn test_error_dedupe() {
        with_parser("a", |p| {
            p.error("first");
            p.error("second");
            assert_eq!(p.events(), &[Event::error("first")]);
            p.bump();
            p.error("third");
            assert_eq!(p.event_count(), 3);
        });
    }

    #[test]
    fn test_bump_at_end_is_noop() {
        with_parser("", |p| {
            p.bump();
            assert_eq!(p.event_count(), 0);
            assert!(p.at_end());
        });
    }

    #[test]
    fn test_has_errors_after() {
        with_parser("a b", |p| {
            let m = p.start();
            p.bump();
            assert!(!p.has_errors_after(&m));
            let e = p.start();
            p.bump();
            e.error(p, "unexpected");
            assert!(p.has_errors_after(&m));
            m.complete(p, SyntaxKind::SourceFile);
        });
    }

    #[test]
    fn test_has_errors_after_includes_wrapped_node() {
        with_parser("a b", |p| {
            let m = p.start();
            p.bump();
            p.error("inside wrapped node");
            let done = m.complete(p, SyntaxKind::NameRef);
            let parent = done.precede(p);
            assert!(p.has_errors_after(&parent));
            parent.complete(p, SyntaxKind::FieldExpr);

            let m = p.start();
            p.bump();
            let done = m.complete(p, SyntaxKind::NameRef);
            let parent = done.precede(p);
            assert!(!p.has_errors_after(&parent));
            parent.abandon(p);
        });
    }

    #[test]
    fn test_latest_done_stays_inside_open_marker() {
        with_parser("a b", |p| {
            let m = p.start();
            p.bump();
            let first = m.complete(p, SyntaxKind::NameRef);

            let m = p.start();
            assert_eq!(p.latest_done(), None);
            m.abandon(p);
            assert_eq!(p.latest_done(), Some(first));
        });
    }

    #[test]
    fn test_complete_before_makes_siblings() {
        with_parser("a b", |p| {
            let m = p.start();
            p.bump();
            let mut next = p.start();
            p.bump();
            let done = m.complete_before(p, SyntaxKind::NameRef, &mut next);
            next.complete(p, SyntaxKind::NameRef);

            assert_eq!(done.kind(), SyntaxKind::NameRef);
            assert_eq!(
                p.events(),
                &[
                    Event::start(SyntaxKind::NameRef),
                    Event::token(SyntaxKind::Ident),
                    Event::Finish,
                    Event::start(SyntaxKind::NameRef),
                    Event::token(SyntaxKind::Ident),
                    Event::Finish,
                ]
            );
        });
    }

    #[test]
    fn test_rollback_after_complete_before_keeps_earlier_node() {
        with_parser("a b", |p| {
            let m = p.start();
            p.bump();
            let mut next = p.start();
            let inner = p.start();
            p.bump();
            inner.complete(p, SyntaxKind::NameRef);
            let done = m.complete_before(p, SyntaxKind::NameRef, &mut next);
            next.rollback(p);

            assert_eq!(p.event_count(), 3);
            assert_eq!(p.current_text(), "b");
            assert_eq!(p.latest_done(), Some(done));
        });
    }

    #[test]
    fn test_error_before() {
        with_parser("a b", |p| {
            let m = p.start();
            p.bump();
            let mut next = p.start();
            p.bump();
            let done = m.error_before(p, "stray", &mut next);
            assert!(!p.has_errors_after(&next));
            next.complete(p, SyntaxKind::NameRef);

            assert_eq!(done.kind(), SyntaxKind::Error);
            assert_eq!(p.events()[2], Event::error("stray"));
            assert_eq!(p.events()[3], Event::Finish);
        });
    }

    #[test]
    fn test_collapse_glues_tokens() {
        with_parser("a .b", |p| {
            let m = p.start();
            p.bump();
            let inner = p.start();
            p.bump();
            p.bump();
            inner.complete(p, SyntaxKind::FieldExpr);
            p.error("kept");
            m.collapse(p, SyntaxKind::ValueText);

            assert_eq!(
                p.events(),
                &[
                    Event::Token {
                        kind: SyntaxKind::ValueText,
                        n_tokens: 3,
                    },
                    Event::error("kept"),
                ]
            );
            assert_eq!(p.latest_done(), None);
        });
    }

    #[test]
    fn test_guarded_refuses_reentry_at_same_position() {
        with_parser("a", |p| {
            let result = p.guarded("rule", |p| p.guarded("rule", |_| true));
            assert_eq!(result, Some(None));
            assert_eq!(p.guard_depth(), 0);

            let depth = p.guarded("outer", |p| p.guarded("inner", |p| p.guard_depth()));
            assert_eq!(depth, Some(Some(2)));

            let result = p.guarded("rule", |p| {
                p.bump();
                p.guarded("rule", |_| true)
            });
            assert_eq!(result, Some(Some(true)));
        });
    }

    #[test]
    fn test_empty_element_guard_report() {
        let tokens = lex("a");
        let config = ParserConfig {
            empty_loop: EmptyLoopPolicy::Report,
            ..ParserConfig::default()
        };
        let mut p = Parser::with_config(&tokens, "a", config);
        let start = p.position();
        assert!(!p.empty_element_guard("items", start));
        assert_eq!(
            p.events(),
            &[Event::error("empty element parsed in 'items' at offset 0")]
        );
        p.bump();
        assert!(p.empty_element_guard("items", start));
    }

    #[test]
    #[should_panic(expected = "uncompleted marker")]
    fn test_unresolved_marker_panics() {
        with_parser("a", |p| {
            let _m = p.start();
        });
    }
}
