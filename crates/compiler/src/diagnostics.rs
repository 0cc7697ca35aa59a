//! Lexical and syntax diagnostics
//!
//! Problems found while lexing or parsing never stop the front end. Each one
//! is recorded as a [`Diagnostic`] in a caller-owned [`Diagnostics`] sink and
//! the producer carries on from a recovery point.

use crate::token::Position;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Which stage produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Lexical,
    Syntax,
}

/// A construct that can be left open at end of input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Construct {
    Definition(String),
    TypeDefinition(String),
    Alias(String),
    StackEffect,
    Bindings,
    CaseArm,
    Dip,
    List,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::Definition(name) => write_named(f, "definition", name),
            Construct::TypeDefinition(name) => write_named(f, "type definition", name),
            Construct::Alias(name) => write_named(f, "alias", name),
            Construct::StackEffect => write!(f, "stack effect"),
            Construct::Bindings => write!(f, "pattern bindings"),
            Construct::CaseArm => write!(f, "`case:` arm"),
            Construct::Dip => write!(f, "`dip:` block"),
            Construct::List => write!(f, "list literal"),
        }
    }
}

/// Nameless constructs render without the name
fn write_named(f: &mut fmt::Formatter<'_>, what: &str, name: &str) -> fmt::Result {
    if name.is_empty() {
        f.write_str(what)
    } else {
        write!(f, "{} `{}`", what, name)
    }
}

/// What went wrong
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ErrorKind {
    // Lexical
    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("malformed number literal `{0}`")]
    MalformedNumber(String),

    #[error("number literal `{0}` does not fit in 64 bits")]
    NumberOutOfRange(String),

    #[error("zero denominator in rational literal `{0}`")]
    ZeroDenominator(String),

    #[error("unknown escape sequence '\\{0}' in string literal")]
    UnknownEscape(char),

    // Syntax
    #[error("unexpected {found} {context}")]
    UnexpectedToken { found: String, context: String },

    #[error("unterminated {0}")]
    Unterminated(Construct),

    #[error("expected a name after `{after}`, found {found}")]
    ExpectedName { after: String, found: String },

    #[error("`case:` outside of a `match:` block")]
    CaseOutsideMatch,

    #[error("`loop;` outside of a `case:` arm")]
    LoopOutsideArm,

    #[error("`match:` block has no `case:` arms")]
    EmptyMatch,

    #[error("stack effect is missing the `--` separator")]
    MissingEffectSeparator,

    #[error("empty constructor declaration in type `{0}`")]
    EmptyConstructor(String),

    #[error("expected `:` after {0}")]
    MissingColon(String),

    #[error("`{name}` is already defined at {original}")]
    Duplicate { name: String, original: Position },

    #[error("blocks nested deeper than {0} levels")]
    NestingTooDeep(usize),
}

impl ErrorKind {
    pub fn stage(&self) -> Stage {
        match self {
            ErrorKind::UnterminatedString
            | ErrorKind::InvalidCharacter(_)
            | ErrorKind::MalformedNumber(_)
            | ErrorKind::NumberOutOfRange(_)
            | ErrorKind::ZeroDenominator(_)
            | ErrorKind::UnknownEscape(_) => Stage::Lexical,
            _ => Stage::Syntax,
        }
    }
}

/// A single problem with its location
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub position: Position,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn error(kind: ErrorKind, position: Position) -> Self {
        Diagnostic {
            kind,
            position,
            severity: Severity::Error,
        }
    }

    pub fn warning(kind: ErrorKind, position: Position) -> Self {
        Diagnostic {
            kind,
            position,
            severity: Severity::Warning,
        }
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn is_lexical(&self) -> bool {
        self.kind.stage() == Stage::Lexical
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.position, self.severity, self.kind)
    }
}

/// Caller-owned diagnostic sink
///
/// One sink belongs to one parse run. It is passed by `&mut` into every pull,
/// so independent runs never share state.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn error(&mut self, kind: ErrorKind, position: Position) {
        self.push(Diagnostic::error(kind, position));
    }

    pub fn warning(&mut self, kind: ErrorKind, position: Position) {
        self.push(Diagnostic::warning(kind, position));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of error-severity entries
    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_error()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(Diagnostic::is_error)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ErrorKind::Unterminated(Construct::Definition("bad".to_string()));
        assert_eq!(err.to_string(), "unterminated definition `bad`");
        let err = ErrorKind::Unterminated(Construct::Definition(String::new()));
        assert_eq!(err.to_string(), "unterminated definition");

        let err = ErrorKind::Duplicate {
            name: "f".to_string(),
            original: Position::new(0, 0, 0),
        };
        assert_eq!(err.to_string(), "`f` is already defined at 1:1");

        assert_eq!(
            ErrorKind::UnknownEscape('q').to_string(),
            "unknown escape sequence '\\q' in string literal"
        );
        assert_eq!(
            ErrorKind::Unterminated(Construct::List).to_string(),
            "unterminated list literal"
        );
        assert_eq!(
            ErrorKind::LoopOutsideArm.to_string(),
            "`loop;` outside of a `case:` arm"
        );
    }

    #[test]
    fn test_stage_classification() {
        assert_eq!(ErrorKind::UnterminatedString.stage(), Stage::Lexical);
        assert_eq!(ErrorKind::EmptyMatch.stage(), Stage::Syntax);
        assert!(Diagnostic::error(ErrorKind::InvalidCharacter('\u{7}'), Position::default())
            .is_lexical());
    }

    #[test]
    fn test_sink_counts_errors_and_warnings() {
        let mut sink = Diagnostics::new();
        assert!(sink.is_empty());
        sink.warning(ErrorKind::UnknownEscape('q'), Position::default());
        assert!(!sink.has_errors());
        sink.error(ErrorKind::EmptyMatch, Position::new(1, 2, 9));
        assert_eq!(sink.len(), 2);
        assert_eq!(sink.error_count(), 1);
        assert_eq!(
            sink.as_slice()[1].to_string(),
            "2:3: error: `match:` block has no `case:` arms"
        );
    }
}
