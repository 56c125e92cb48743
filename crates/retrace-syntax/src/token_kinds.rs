//! Single list of lexer token kinds, shared by every macro that must mirror
//! `TokenKind` inside `SyntaxKind`.
//!
//! The order must match the declaration order of `TokenKind`.

macro_rules! for_each_token_kind {
    ($callback:ident) => {
        $callback! {
            Whitespace,
            LineComment,
            BlockComment,
            Dot,
            Comma,
            LBrace,
            RBrace,
            LBracket,
            RBracket,
            LParen,
            RParen,
            At,
            Assign,
            ModifyAssign,
            ReferenceAssign,
            EqEq,
            NotEq,
            Lt,
            LtEq,
            Gt,
            GtEq,
            Shl,
            Shr,
            Plus,
            Minus,
            Star,
            Slash,
            Percent,
            Bang,
            AmpAmp,
            PipePipe,
            Number,
            String,
            Ident,
            ValueText,
            Error,
            Eof,
        }
    };
}

pub(crate) use for_each_token_kind;
