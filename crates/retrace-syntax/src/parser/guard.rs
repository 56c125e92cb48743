//! Guards against non-progressing rules.
//!
//! Every guarded rule invocation pushes `(rule, position)` on entry and pops
//! it on exit. Re-entering a rule that is already active at the same token
//! position means the grammar is about to recurse without consuming input.

use std::fmt;

use rustc_hash::FxHashSet;

/// Why a guarded rule was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardFailure {
    /// The rule is already active at the same token position.
    Stalled,
    /// Entering would exceed the configured nesting limit.
    TooDeep(usize),
}

impl fmt::Display for GuardFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stalled => f.write_str("rule re-entered without progress"),
            Self::TooDeep(limit) => write!(f, "maximum recursion level ({limit}) reached"),
        }
    }
}

/// Active guarded rule invocations of one parse.
#[derive(Debug, Default)]
pub struct GuardTable {
    stack: Vec<(&'static str, usize)>,
    active: FxHashSet<(&'static str, usize)>,
}

impl GuardTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records entry into `rule` at `position`.
    pub fn enter(
        &mut self,
        rule: &'static str,
        position: usize,
        max_depth: usize,
    ) -> Result<(), GuardFailure> {
        if self.active.contains(&(rule, position)) {
            return Err(GuardFailure::Stalled);
        }
        if self.stack.len() >= max_depth {
            return Err(GuardFailure::TooDeep(max_depth));
        }
        self.stack.push((rule, position));
        self.active.insert((rule, position));
        Ok(())
    }

    /// Pops the innermost entry, which must belong to `rule`.
    pub fn exit(&mut self, rule: &'static str) {
        if let Some(entry) = self.stack.pop() {
            debug_assert_eq!(entry.0, rule, "guard stack out of order");
            self.active.remove(&entry);
        }
    }

    /// Number of active guarded invocations.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}
