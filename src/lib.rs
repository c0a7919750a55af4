//! Random string generation from ECMAScript-flavored regular expressions.
//!
//! A pattern is compiled into a tree of generator nodes, which can then
//! produce random strings that match the pattern within requested length
//! bounds. When possible, a second generator producing strings that do
//! *not* match can be derived from the first.
//!
//! ```
//! use rexgen::{Bounds, Random, compile, not_matching, MatchOptions};
//!
//! let generator = compile(r"^[\d]{2,3}$").unwrap();
//! assert_eq!((generator.min_length(), generator.max_length()), (2, 3));
//!
//! let mut random = Random::seeded(1);
//! let value = generator.generate(&mut random, Bounds::ANY).unwrap();
//! assert!(value.chars().all(|c| c.is_ascii_digit()));
//!
//! let invalid = not_matching("^(cat|dog)$", &MatchOptions::default()).unwrap().unwrap();
//! let value = invalid.generate(&mut random, Bounds::ANY).unwrap();
//! assert!(value != "cat" && value != "dog");
//! ```
//!
//! Set `REXGEN_DEBUG=1` to trace parsing, normalization, generation and
//! complement derivation on stderr.

use once_cell::sync::Lazy;
use std::fmt;

#[macro_use]
mod macros;
mod api;
mod bounds;
mod charset;
mod engine;
mod options;
mod random;

pub use api::{CompileDetails, CompileResult, Generator, compile, compile_verbose_with, compile_with, not_matching};
pub use bounds::{Bounds, LengthError, UNBOUNDED};
pub use charset::{CharSet, CharSetBuilder};
pub use engine::CompileMetrics;
pub use options::MatchOptions;
pub use random::{DEFAULT_TYPICAL_EXTRA_LENGTH, Random, RandomSource};

/// Whether `REXGEN_DEBUG` was set when the process first asked.
pub(crate) static DEBUG: Lazy<bool> = Lazy::new(|| std::env::var_os("REXGEN_DEBUG").is_some());

// --- Errors ------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Malformed pattern text.
    Syntax,
    /// Recognized syntax this crate deliberately rejects (word boundaries,
    /// negative lookaround, backreferences).
    Unsupported,
}

/// A pattern could not be compiled. `position` is a 0-based character index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub reason: String,
    pub position: usize,
}

impl ParseError {
    pub(crate) fn syntax(reason: impl Into<String>, position: usize) -> Self {
        ParseError { kind: ParseErrorKind::Syntax, reason: reason.into(), position }
    }

    pub(crate) fn unsupported(reason: impl Into<String>, position: usize) -> Self {
        ParseError { kind: ParseErrorKind::Unsupported, reason: reason.into(), position }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at position {}", self.reason, self.position)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The pattern is malformed or uses an unsupported construct.
    Parse(ParseError),
    /// A requested length is incompatible with the generator.
    Length(LengthError),
    /// `Bounds::new` with `min > max`.
    InvalidBounds { min: usize, max: usize },
    /// `MatchOptions` with an empty or invalid character universe.
    InvalidOptions(String),
    /// A character class has no character left in the configured universe.
    EmptyCharacterSet(String),
    /// An internal invariant does not hold.
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(err) => write!(f, "{err}"),
            Error::Length(err) => write!(f, "{err}"),
            Error::InvalidBounds { min, max } => {
                write!(f, "invalid bounds: minimum {min} is greater than maximum {max}")
            }
            Error::InvalidOptions(reason) => write!(f, "invalid match options: {reason}"),
            Error::EmptyCharacterSet(class) => {
                write!(f, "no character of the configured universe satisfies {class}")
            }
            Error::Internal(reason) => write!(f, "internal error: {reason}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Parse(err)
    }
}

impl From<LengthError> for Error {
    fn from(err: LengthError) -> Self {
        Error::Length(err)
    }
}
