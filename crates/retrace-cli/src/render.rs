//! Output formats of the `retrace` binary.

use std::fmt::Write;

use clap::ValueEnum;
use retrace_syntax::parser::event::Event;
use retrace_syntax::{Parse, ParseError};
use text_size::TextSize;

/// What to print for each input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The syntax tree followed by the diagnostics.
    #[default]
    Tree,
    /// The raw event log the grammar produced.
    Events,
    /// Diagnostics only, one per line.
    Errors,
}

pub fn tree(name: &str, text: &str, parse: &Parse) -> String {
    let mut out = parse.debug_tree();
    if !parse.ok() {
        out.push_str("---\n");
        out.push_str(&errors(name, text, parse.errors()));
    }
    out
}

pub fn errors(name: &str, text: &str, errors: &[ParseError]) -> String {
    let index = LineIndex::new(text);
    let mut out = String::new();
    for error in errors {
        let (line, column) = index.line_col(error.range.start());
        let _ = writeln!(out, "{name}:{line}:{column}: {}", error.message);
    }
    out
}

pub fn events(events: &[Event]) -> String {
    let width = events.len().saturating_sub(1).to_string().len();
    let mut out = String::new();
    for (index, event) in events.iter().enumerate() {
        let _ = write!(out, "{index:>width$} ");
        let _ = match event {
            Event::Start {
                kind,
                forward_parent,
            } => {
                let kind = kind.map_or_else(|| "?".to_string(), |kind| format!("{kind:?}"));
                match forward_parent {
                    Some(offset) => writeln!(out, "start {kind} -> +{offset}"),
                    None => writeln!(out, "start {kind}"),
                }
            }
            Event::Token { kind, n_tokens } if *n_tokens > 1 => {
                writeln!(out, "token {kind:?} x{n_tokens}")
            }
            Event::Token { kind, .. } => writeln!(out, "token {kind:?}"),
            Event::Finish => writeln!(out, "finish"),
            Event::Error { message } => writeln!(out, "error {message:?}"),
            Event::Placeholder => writeln!(out, "placeholder"),
        };
    }
    out
}

/// Start offsets of every line of one input.
struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        Self { text, starts }
    }

    /// One-based line and column (in characters) of `offset`.
    fn line_col(&self, offset: TextSize) -> (usize, usize) {
        let offset = usize::from(offset).min(self.text.len());
        let line = self.starts.partition_point(|&start| start <= offset);
        let line_start = self.starts[line - 1];
        let column = self
            .text
            .get(line_start..offset)
            .map_or(0, |before| before.chars().count());
        (line, column + 1)
    }
}
