//! Token definitions for the TypoScript-flavoured configuration language.
//!
//! This module defines all lexical tokens that can appear in source text.
//! The token kinds are designed to work with both the `logos` lexer generator
//! and the `rowan` lossless syntax tree library.

use logos::Logos;

fn lex_block_comment(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let remainder = lex.remainder();
    match remainder.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => {
            lex.bump(remainder.len());
            false
        }
    }
}

/// All token kinds of the language.
///
/// Token kinds are divided into categories:
/// - Trivia (whitespace, comments) - preserved but not semantically significant
/// - Punctuation and operators
/// - Literals and identifiers
/// - Special tokens (value text, errors, EOF)
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[derive(Default)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    /// Whitespace (spaces, tabs, newlines)
    #[regex(r"[ \t\r\n]+")]
    Whitespace,

    /// Single-line comment: `# ...` or `// ...`
    #[regex(r"#[^\r\n]*", allow_greedy = true)]
    #[regex(r"//[^\r\n]*", allow_greedy = true)]
    LineComment,

    /// Block comment: `/* ... */`
    #[token("/*", lex_block_comment)]
    BlockComment,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    /// `.`
    #[token(".")]
    Dot,

    /// `,`
    #[token(",")]
    Comma,

    /// `{`
    #[token("{")]
    LBrace,

    /// `}`
    #[token("}")]
    RBrace,

    /// `[`
    #[token("[")]
    LBracket,

    /// `]`
    #[token("]")]
    RBracket,

    /// `(`
    #[token("(")]
    LParen,

    /// `)`
    #[token(")")]
    RParen,

    /// `@`
    #[token("@")]
    At,

    // =========================================================================
    // OPERATORS
    // =========================================================================
    /// Value assignment: `=`
    #[token("=")]
    Assign,

    /// Value modification: `:=`
    #[token(":=")]
    ModifyAssign,

    /// Reference: `=<`
    #[token("=<")]
    ReferenceAssign,

    /// `==`
    #[token("==")]
    EqEq,

    /// `!=`
    #[token("!=")]
    NotEq,

    /// `<` (also the copy operator)
    #[token("<")]
    Lt,

    /// `<=`
    #[token("<=")]
    LtEq,

    /// `>` (also the unset operator)
    #[token(">")]
    Gt,

    /// `>=`
    #[token(">=")]
    GtEq,

    /// `<<`
    #[token("<<")]
    Shl,

    /// `>>`
    #[token(">>")]
    Shr,

    /// `+`
    #[token("+")]
    Plus,

    /// `-`
    #[token("-")]
    Minus,

    /// `*`
    #[token("*")]
    Star,

    /// `/`
    #[token("/")]
    Slash,

    /// `%`
    #[token("%")]
    Percent,

    /// `!`
    #[token("!")]
    Bang,

    /// `&&`
    #[token("&&")]
    AmpAmp,

    /// `||`
    #[token("||")]
    PipePipe,

    // =========================================================================
    // LITERALS AND IDENTIFIERS
    // =========================================================================
    /// Decimal number: `10`
    #[regex(r"[0-9]+")]
    Number,

    /// Quoted string: `"text"` or `'text'`
    #[regex(r#""([^"\\\r\n]|\\.)*""#)]
    #[regex(r"'([^'\\\r\n]|\\.)*'")]
    String,

    /// Identifier: starts with letter or underscore, contains letters, digits, underscores
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // =========================================================================
    // SPECIAL TOKENS
    // =========================================================================
    /// Raw text after `=` up to the end of the line (produced by the lexer adapter)
    ValueText,

    /// Lexer error - unrecognized character
    #[default]
    Error,

    /// End of file marker (not produced by lexer, reported by the parser)
    Eof,
}

impl TokenKind {
    /// Returns `true` if this token is trivia (whitespace or comment).
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::LineComment | Self::BlockComment
        )
    }

    /// Returns `true` if this token can be one segment of an object path.
    pub fn is_path_entity(self) -> bool {
        matches!(self, Self::Ident | Self::Number)
    }

    /// Returns the binding power for Pratt parsing (left, right).
    /// Returns None if not an infix operator.
    pub fn infix_binding_power(self) -> Option<(u8, u8)> {
        Some(match self {
            Self::PipePipe => (1, 2),
            Self::AmpAmp => (3, 4),
            Self::EqEq | Self::NotEq => (5, 6),
            Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => (7, 8),
            Self::Shl | Self::Shr => (9, 10),
            Self::Plus | Self::Minus => (11, 12),
            Self::Star | Self::Slash | Self::Percent => (13, 14),
            _ => return None,
        })
    }

    /// Returns the binding power for prefix operators.
    pub fn prefix_binding_power(self) -> Option<u8> {
        Some(match self {
            Self::Bang | Self::Minus => 15,
            _ => return None,
        })
    }

    /// Human readable name used in "expected ..." diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Whitespace => "whitespace",
            Self::LineComment | Self::BlockComment => "comment",
            Self::Dot => "'.'",
            Self::Comma => "','",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::LBracket => "'['",
            Self::RBracket => "']'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::At => "'@'",
            Self::Assign => "'='",
            Self::ModifyAssign => "':='",
            Self::ReferenceAssign => "'=<'",
            Self::EqEq => "'=='",
            Self::NotEq => "'!='",
            Self::Lt => "'<'",
            Self::LtEq => "'<='",
            Self::Gt => "'>'",
            Self::GtEq => "'>='",
            Self::Shl => "'<<'",
            Self::Shr => "'>>'",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::Percent => "'%'",
            Self::Bang => "'!'",
            Self::AmpAmp => "'&&'",
            Self::PipePipe => "'||'",
            Self::Number => "number",
            Self::String => "string",
            Self::Ident => "identifier",
            Self::ValueText => "value",
            Self::Error => "error",
            Self::Eof => "end of file",
        }
    }
}

impl From<TokenKind> for rowan::SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        Self(kind as u16)
    }
}
