//! Syntax tree types.
//!
//! This module provides the `rowan`-based syntax tree implementation,
//! including the `SyntaxKind` enum that covers both tokens and composite nodes.

use std::fmt::Write;

use crate::lexer::TokenKind;
use crate::token_kinds::for_each_token_kind;

macro_rules! declare_kinds {
    (
        tokens: [$($token:ident),*]
        nodes: [$($(#[$doc:meta])* $node:ident,)*]
    ) => {
        /// All syntax node and token kinds.
        ///
        /// This enum includes both token kinds (from the lexer) and composite
        /// node kinds (produced by the parser). `Error` is used both for
        /// unrecognised lexer tokens and for error nodes built by the parser.
        // Variants mirror lexer/token names; documenting each would be noisy.
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum SyntaxKind {
            // =========================================================================
            // TOKEN KINDS (mirrors TokenKind)
            // =========================================================================
            $($token,)*

            /// Contextual keyword `import` after `@` (remapped identifier)
            ImportKw,

            // =========================================================================
            // COMPOSITE NODE KINDS (produced by parser)
            // =========================================================================
            $($(#[$doc])* $node,)*
        }

        const SYNTAX_KINDS: &[SyntaxKind] = &[
            $(SyntaxKind::$token,)*
            SyntaxKind::ImportKw,
            $(SyntaxKind::$node,)*
        ];
    };
}

macro_rules! define_syntax_kind {
    ($($token:ident),* $(,)?) => {
        declare_kinds! {
            tokens: [$($token),*]
            nodes: [
                /// Root node of a source file
                SourceFile,

                /// Root node of a standalone expression
                ExpressionRoot,

                /// A statement on an object path: `page.10 = TEXT`
                ObjectStatement,

                /// A dotted object path: `page.10.wrap`
                ObjectPath,

                /// Value assignment: `= value`
                Assignment,

                /// Value modification: `:= addToList(1, 2)`
                ValueModification,

                /// Arguments of a value modification: `1, 2`
                ModifierArguments,

                /// Copy operator: `< lib.path`
                Copy,

                /// Reference operator: `=< lib.path`
                Reference,

                /// Unset operator: `>`
                Unset,

                /// Nested statements: `{ ... }`
                CodeBlock,

                /// Import statement: `@import "file"`
                Import,

                /// Condition line: `[expression]`
                Condition,

                /// Binary expression: `a + b`
                BinaryExpr,

                /// Unary expression: `-x`, `!x`
                UnaryExpr,

                /// Parenthesized expression: `(expr)`
                ParenExpr,

                /// Function call: `func(args)`
                CallExpr,

                /// Argument list in call
                ArgList,

                /// Index expression: `arr[i]`
                IndexExpr,

                /// Field access: `object.field`
                FieldExpr,

                /// Name reference
                NameRef,

                /// Literal value
                Literal,
            ]
        }
    };
}

for_each_token_kind!(define_syntax_kind);

impl SyntaxKind {
    /// Returns `true` if this is a trivia kind.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::LineComment | Self::BlockComment
        )
    }

    /// Returns `true` if this is a token kind (not a composite node).
    #[must_use]
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::ImportKw as u16)
    }

    /// Returns `true` if this is a composite node kind.
    #[must_use]
    pub fn is_node(self) -> bool {
        !self.is_token()
    }
}

macro_rules! map_token_kinds {
    ($($name:ident),* $(,)?) => {
        impl From<TokenKind> for SyntaxKind {
            fn from(kind: TokenKind) -> Self {
                match kind {
                    $(TokenKind::$name => SyntaxKind::$name,)*
                }
            }
        }
    };
}

for_each_token_kind!(map_token_kinds);

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// The language type of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypoLanguage {}

impl rowan::Language for TypoLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SYNTAX_KINDS
            .get(raw.0 as usize)
            .copied()
            .unwrap_or(SyntaxKind::Error)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// A syntax node in the syntax tree.
pub type SyntaxNode = rowan::SyntaxNode<TypoLanguage>;

/// A syntax token in the syntax tree.
pub type SyntaxToken = rowan::SyntaxToken<TypoLanguage>;

/// A syntax element (either node or token) in the syntax tree.
pub type SyntaxElement = rowan::SyntaxElement<TypoLanguage>;

/// Renders a tree as indented `Kind@range` lines, one per node and
/// significant token. Trivia tokens are omitted.
#[must_use]
pub fn debug_tree(node: &SyntaxNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out, 0);
    out
}

fn write_node(node: &SyntaxNode, out: &mut String, depth: usize) {
    let indent = "  ".repeat(depth);
    let _ = writeln!(out, "{indent}{:?}@{:?}", node.kind(), node.text_range());

    for child in node.children_with_tokens() {
        match child {
            rowan::NodeOrToken::Node(n) => write_node(&n, out, depth + 1),
            rowan::NodeOrToken::Token(t) => {
                if !t.kind().is_trivia() {
                    let _ = writeln!(
                        out,
                        "{}{:?}@{:?} {:?}",
                        "  ".repeat(depth + 1),
                        t.kind(),
                        t.text_range(),
                        t.text()
                    );
                }
            }
        }
    }
}
