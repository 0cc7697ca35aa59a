//! Token model shared by the lexer and the parser
//!
//! Every token keeps the exact source text it was read from together with the
//! position of its first character, so a diagnostic can always point back at
//! the offending lexeme.

use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// A position in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    /// Line number (0-indexed for LSP compatibility)
    pub line: usize,
    /// Column number in characters (0-indexed)
    pub column: usize,
    /// Byte offset from the start of the source
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Position {
            line,
            column,
            offset,
        }
    }

    /// Position of the character that follows `ch`
    pub fn advance(self, ch: char) -> Self {
        if ch == '\n' {
            Position {
                line: self.line + 1,
                column: 0,
                offset: self.offset + ch.len_utf8(),
            }
        } else {
            Position {
                line: self.line,
                column: self.column + 1,
                offset: self.offset + ch.len_utf8(),
            }
        }
    }

    /// Position just past the end of `text` when it starts here
    pub fn advance_over(self, text: &str) -> Self {
        text.chars().fold(self, Position::advance)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed for humans
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// The kind of a token, carrying the decoded value for literals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TokenKind {
    /// Bare identifier or symbolic word (`dup`, `+`, `f(n)`, `2dup`)
    Word,
    Integer(i64),
    /// `+N` natural literal
    Nat(u64),
    Float(f64),
    /// `n/d` rational literal
    Rational { numerator: i64, denominator: u64 },
    Bool(bool),
    /// String literal with escapes already processed
    Str(String),
    /// Comment text after the `\` marker, trimmed
    Comment(String),
    /// `2Tuple`, `3pack`, `0unpack`
    Numbered { keyword: NumberedKeyword, count: u64 },

    /// `:` opening a word definition
    Colon,
    /// `;` closing any block
    Semicolon,
    /// `match:`
    Match,
    /// `case:`
    Case,
    /// `dip:`
    Dip,
    /// `loop;` closing a `case:` arm that repeats its `match:`
    Loop,
    /// `type:`
    Type,
    /// `alias:`
    Alias,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `--`
    DoubleDash,
    /// `|` separating constructor declarations
    Bar,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,

    /// End of stream
    Eof,
}

impl TokenKind {
    /// Keyword for a whole whitespace-delimited run, if it is one
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            ":" => TokenKind::Colon,
            ";" => TokenKind::Semicolon,
            "match:" => TokenKind::Match,
            "case:" => TokenKind::Case,
            "dip:" => TokenKind::Dip,
            "loop;" => TokenKind::Loop,
            "type:" => TokenKind::Type,
            "alias:" => TokenKind::Alias,
            "(" => TokenKind::OpenParen,
            ")" => TokenKind::CloseParen,
            "--" => TokenKind::DoubleDash,
            "|" => TokenKind::Bar,
            "[" => TokenKind::OpenBracket,
            "]" => TokenKind::CloseBracket,
            "true" => TokenKind::Bool(true),
            "false" => TokenKind::Bool(false),
            _ => return None,
        };
        Some(kind)
    }

    /// True for tokens that can only begin a top-level item
    pub fn starts_top_level(&self) -> bool {
        matches!(
            self,
            TokenKind::Colon | TokenKind::Type | TokenKind::Alias | TokenKind::Eof
        )
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::Integer(_)
                | TokenKind::Nat(_)
                | TokenKind::Float(_)
                | TokenKind::Rational { .. }
                | TokenKind::Bool(_)
                | TokenKind::Str(_)
        )
    }
}

/// Keyword that takes a count written directly in front of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumberedKeyword {
    Tuple,
    Pack,
    Unpack,
}

impl NumberedKeyword {
    pub fn from_suffix(text: &str) -> Option<NumberedKeyword> {
        match text {
            "Tuple" => Some(NumberedKeyword::Tuple),
            "pack" => Some(NumberedKeyword::Pack),
            "unpack" => Some(NumberedKeyword::Unpack),
            _ => None,
        }
    }
}

impl fmt::Display for NumberedKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberedKeyword::Tuple => write!(f, "Tuple"),
            NumberedKeyword::Pack => write!(f, "pack"),
            NumberedKeyword::Unpack => write!(f, "unpack"),
        }
    }
}

/// A token with source position information
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    /// The exact source text of the token
    pub text: String,
    /// Position of the first character
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: Position) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn eof(position: Position) -> Self {
        Token::new(TokenKind::Eof, "", position)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// Byte range of the lexeme in the source
    pub fn span(&self) -> Range<usize> {
        self.position.offset..self.position.offset + self.text.len()
    }

    /// Position just past the last character of the token
    pub fn end(&self) -> Position {
        self.position.advance_over(&self.text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            write!(f, "end of input")
        } else {
            write!(f, "`{}`", self.text)
        }
    }
}
