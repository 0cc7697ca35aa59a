//! Lexical analyzer for Marn source
//!
//! The lexer is a small state machine over a character stream. Each call to
//! [`Lexer::next_token`] scans exactly one token and returns it, so sources of
//! any size are processed without buffering a token list.
//!
//! Rules:
//! - whitespace separates tokens and is never emitted
//! - a maximal run of non-whitespace characters is one token; keywords
//!   (`:` `;` `match:` `case:` `dip:` `loop;` `type:` `alias:` `(` `)` `--`
//!   `|` `[` `]`), numbered keywords (`2Tuple`, `3pack`, `1unpack`) and
//!   literals are recognised only as whole runs, everything else is a word
//! - `\` followed by whitespace starts a comment that runs to end of line
//! - `"` starts a string literal, which may span lines and runs to the next
//!   unescaped `"`
//!
//! Problems are recorded in the caller's [`Diagnostics`] and scanning carries
//! on; the lexer never fails.

use crate::diagnostics::{Diagnostics, ErrorKind};
use crate::token::{NumberedKeyword, Position, Token, TokenKind};
use std::iter::{FusedIterator, Peekable};
use tracing::debug;

/// Anything the parser can pull tokens from
///
/// The diagnostic sink is passed on every pull rather than stored, so a single
/// sink can be shared by the lexer and the parser of one run.
pub trait TokenSource {
    /// Produce the next token. After the end of input this keeps returning
    /// [`TokenKind::Eof`].
    fn next_token(&mut self, errors: &mut Diagnostics) -> Token;
}

pub struct Lexer<I: Iterator<Item = char>> {
    chars: Peekable<I>,
    position: Position,
}

impl<I: Iterator<Item = char>> Lexer<I> {
    pub fn new(chars: I) -> Self {
        Lexer {
            chars: chars.peekable(),
            position: Position::default(),
        }
    }

    /// Position of the next unread character
    pub fn position(&self) -> Position {
        self.position
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.position = self.position.advance(ch);
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    pub fn next_token(&mut self, errors: &mut Diagnostics) -> Token {
        loop {
            self.skip_whitespace();
            let start = self.position;

            let Some(ch) = self.peek() else {
                return Token::eof(start);
            };

            if ch == '"' {
                return self.lex_string(start, errors);
            }

            let mut text = String::new();
            if ch == '\\' {
                self.bump();
                text.push('\\');
                if self.peek().is_none_or(char::is_whitespace) {
                    return self.lex_comment(start, text);
                }
            }

            if let Some(token) = self.lex_run(start, text, errors) {
                return token;
            }
        }
    }

    /// Comment through end of line. The newline itself is left for
    /// whitespace skipping.
    fn lex_comment(&mut self, start: Position, mut text: String) -> Token {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            text.push(ch);
            self.bump();
        }
        let content = text[1..].trim().to_string();
        Token::new(TokenKind::Comment(content), text, start)
    }

    fn lex_string(&mut self, start: Position, errors: &mut Diagnostics) -> Token {
        let mut text = String::new();
        let mut value = String::new();

        // Opening quote
        if let Some(quote) = self.bump() {
            text.push(quote);
        }

        loop {
            match self.peek() {
                None => {
                    errors.error(ErrorKind::UnterminatedString, start);
                    break;
                }
                Some('"') => {
                    self.bump();
                    text.push('"');
                    break;
                }
                Some('\\') => {
                    let escape_at = self.position;
                    self.bump();
                    text.push('\\');
                    let Some(escaped) = self.peek() else {
                        errors.error(ErrorKind::UnterminatedString, start);
                        break;
                    };
                    self.bump();
                    text.push(escaped);
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        'b' => '\u{8}',
                        'a' => '\u{7}',
                        '"' => '"',
                        '\\' => '\\',
                        other => {
                            errors.warning(ErrorKind::UnknownEscape(other), escape_at);
                            other
                        }
                    });
                }
                Some(c) => {
                    self.bump();
                    text.push(c);
                    value.push(c);
                }
            }
        }

        Token::new(TokenKind::Str(value), text, start)
    }

    /// Read the rest of a whitespace-delimited run and classify it.
    ///
    /// Returns `None` when the run contains a character that cannot appear
    /// in any token; the run is dropped and scanning resumes after it.
    fn lex_run(
        &mut self,
        start: Position,
        mut text: String,
        errors: &mut Diagnostics,
    ) -> Option<Token> {
        let mut invalid = None;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                break;
            }
            if ch.is_control() && invalid.is_none() {
                invalid = Some((ch, self.position));
            }
            text.push(ch);
            self.bump();
        }

        if let Some((ch, at)) = invalid {
            debug!(run = %text.escape_debug(), %at, "dropping run with invalid character");
            errors.error(ErrorKind::InvalidCharacter(ch), at);
            return None;
        }

        let kind = match classify(&text) {
            Ok(kind) => kind,
            Err(kind) => {
                errors.error(kind, start);
                TokenKind::Word
            }
        };
        Some(Token::new(kind, text, start))
    }
}

impl<I: Iterator<Item = char>> TokenSource for Lexer<I> {
    fn next_token(&mut self, errors: &mut Diagnostics) -> Token {
        Lexer::next_token(self, errors)
    }
}

/// Classify a complete run. An `Err` means the run looked like a number but
/// is not a valid one; the caller emits it as a word.
fn classify(text: &str) -> Result<TokenKind, ErrorKind> {
    if let Some(keyword) = TokenKind::keyword(text) {
        return Ok(keyword);
    }
    if looks_numeric(text) {
        return parse_number(text);
    }
    if let Some(numbered) = numbered_keyword(text) {
        return numbered;
    }
    Ok(TokenKind::Word)
}

/// Digits directly followed by `Tuple`, `pack` or `unpack`
fn numbered_keyword(text: &str) -> Option<Result<TokenKind, ErrorKind>> {
    let split = text.find(|c: char| !c.is_ascii_digit())?;
    let (digits, suffix) = text.split_at(split);
    if digits.is_empty() {
        return None;
    }
    let keyword = NumberedKeyword::from_suffix(suffix)?;
    let numbered = digits
        .parse()
        .map(|count| TokenKind::Numbered { keyword, count })
        .map_err(|_| ErrorKind::NumberOutOfRange(text.to_string()));
    Some(numbered)
}

/// Optional sign, a digit, then only digits, `.` and `/`
fn looks_numeric(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    unsigned.starts_with(|c: char| c.is_ascii_digit())
        && unsigned
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.' || c == '/')
}

fn parse_number(text: &str) -> Result<TokenKind, ErrorKind> {
    let malformed = || ErrorKind::MalformedNumber(text.to_string());
    let out_of_range = |_| ErrorKind::NumberOutOfRange(text.to_string());

    if let Some((numerator, denominator)) = text.split_once('/') {
        if numerator.contains('.')
            || denominator.is_empty()
            || !denominator.chars().all(|c| c.is_ascii_digit())
        {
            return Err(malformed());
        }
        let numerator: i64 = numerator.parse().map_err(out_of_range)?;
        let denominator: u64 = denominator.parse().map_err(out_of_range)?;
        if denominator == 0 {
            return Err(ErrorKind::ZeroDenominator(text.to_string()));
        }
        return Ok(TokenKind::Rational {
            numerator,
            denominator,
        });
    }

    if let Some((_, fraction)) = text.split_once('.') {
        if fraction.is_empty() || fraction.contains('.') {
            return Err(malformed());
        }
        let value: f64 = text.parse().map_err(|_| malformed())?;
        if !value.is_finite() {
            return Err(ErrorKind::NumberOutOfRange(text.to_string()));
        }
        return Ok(TokenKind::Float(value));
    }

    match text.strip_prefix('+') {
        Some(digits) => digits.parse().map(TokenKind::Nat).map_err(out_of_range),
        None => text.parse().map(TokenKind::Integer).map_err(out_of_range),
    }
}

/// Lazy token sequence returned by [`tokenize`]
///
/// Yields every token up to and including a single end-of-stream token, then
/// stops. Restart by calling [`tokenize`] again on a fresh source.
pub struct Tokens<'e, I: Iterator<Item = char>> {
    lexer: Lexer<I>,
    errors: &'e mut Diagnostics,
    done: bool,
}

impl<I: Iterator<Item = char>> Iterator for Tokens<'_, I> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }
        let token = self.lexer.next_token(self.errors);
        self.done = token.is_eof();
        Some(token)
    }
}

impl<I: Iterator<Item = char>> FusedIterator for Tokens<'_, I> {}

/// Tokenize a character stream, recording lexical errors in `errors`
pub fn tokenize<S>(source: S, errors: &mut Diagnostics) -> Tokens<'_, S::IntoIter>
where
    S: IntoIterator<Item = char>,
{
    Tokens {
        lexer: Lexer::new(source.into_iter()),
        errors,
        done: false,
    }
}

/// Adapter that lets the parser pull from an already-produced token sequence
///
/// If the sequence ends without an end-of-stream token, one is synthesized
/// just past the last token seen.
pub struct TokenStream<I: Iterator<Item = Token>> {
    tokens: I,
    end: Position,
}

impl<I: Iterator<Item = Token>> TokenStream<I> {
    pub fn new(tokens: I) -> Self {
        TokenStream {
            tokens,
            end: Position::default(),
        }
    }
}

impl<I: Iterator<Item = Token>> TokenSource for TokenStream<I> {
    fn next_token(&mut self, _errors: &mut Diagnostics) -> Token {
        match self.tokens.next() {
            Some(token) => {
                self.end = token.end();
                token
            }
            None => Token::eof(self.end),
        }
    }
}
