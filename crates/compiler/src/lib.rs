//! Marn front end
//!
//! Turns Marn source text into an [`Ast`] without resolving names, checking
//! types or running anything. Lexing and parsing are pull-based and total:
//! every problem is recorded in a caller-owned [`Diagnostics`] sink and an
//! aggregate is always returned.
//!
//! ```rust
//! use marnc::{Diagnostics, parse_source};
//!
//! let mut errors = Diagnostics::new();
//! let ast = parse_source(": square ( n -- n ) dup * ;".chars(), &mut errors);
//! assert!(errors.is_empty());
//! assert!(ast.word("square").is_some());
//! ```
//!
//! Each parse run owns its own lexer, parser and sink, so independent sources
//! can be parsed on separate threads without sharing state.

pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{Ast, Item, NameNode, Term};
pub use config::FrontendConfig;
pub use diagnostics::{Diagnostic, Diagnostics, ErrorKind, Severity};
pub use lexer::{Lexer, TokenSource, TokenStream, Tokens, tokenize};
pub use parser::Parser;
pub use token::{NumberedKeyword, Position, Token, TokenKind};

/// Parse an already-produced token sequence
///
/// A missing end-of-stream token is synthesized after the last token.
pub fn parse<T>(tokens: T, errors: &mut Diagnostics) -> Ast
where
    T: IntoIterator<Item = Token>,
{
    parse_with_config(tokens, errors, FrontendConfig::default())
}

pub fn parse_with_config<T>(tokens: T, errors: &mut Diagnostics, config: FrontendConfig) -> Ast
where
    T: IntoIterator<Item = Token>,
{
    Parser::with_config(TokenStream::new(tokens.into_iter()), errors, config).parse()
}

/// Lex and parse a character stream in one pass
///
/// Same result as `parse(tokenize(source, errors), errors)`: tokens are pulled
/// one at a time and lexical and syntax errors land in the same sink, in the
/// order they are found.
pub fn parse_source<S>(source: S, errors: &mut Diagnostics) -> Ast
where
    S: IntoIterator<Item = char>,
{
    parse_source_with_config(source, errors, FrontendConfig::default())
}

pub fn parse_source_with_config<S>(
    source: S,
    errors: &mut Diagnostics,
    config: FrontendConfig,
) -> Ast
where
    S: IntoIterator<Item = char>,
{
    Parser::with_config(Lexer::new(source.into_iter()), errors, config).parse()
}
