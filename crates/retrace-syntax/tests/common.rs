//! Shared helpers for parser snapshot tests.
#![allow(dead_code, unused_imports)]

pub use retrace_syntax::parser::{parse, parse_entry, EntryPoint, Parse};
pub use retrace_syntax::syntax::{SyntaxKind, SyntaxNode};

/// Helper to format a source file parse for snapshot testing.
pub fn snapshot_parse(source: &str) -> String {
    format_parse(&parse(source))
}

/// Same as [`snapshot_parse`] for another entry point.
pub fn snapshot_entry(source: &str, entry: EntryPoint) -> String {
    format_parse(&parse_entry(source, entry))
}

fn format_parse(parsed: &Parse) -> String {
    let mut output = parsed.debug_tree();

    if !parsed.ok() {
        output.push_str("---\nErrors:\n");
        for err in parsed.errors() {
            output.push_str(&format!("  - {}\n", err));
        }
    }

    output
}

/// Kinds of the direct children (nodes and significant tokens) of `node`.
pub fn child_kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
    node.children_with_tokens()
        .map(|child| child.kind())
        .filter(|kind| !kind.is_trivia())
        .collect()
}
