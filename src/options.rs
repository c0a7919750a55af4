use crate::Error;
use crate::charset::{CharSet, ECMA_SPACE, PRINTABLE_LATIN1, is_line_terminator};

/// Character universes used while compiling and generating.
///
/// `any_printable` resolves `.` and every negated class; `space` resolves
/// `\s` and `\S`. When `exact_match` is set the pattern is treated as if it
/// were wrapped in `^...$`, so no implicit padding is generated around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOptions {
    any_printable: CharSet,
    space: CharSet,
    exact_match: bool,
}

impl MatchOptions {
    /// Validate and build options.
    ///
    /// Both sets must be non-empty, and `any_printable` may not contain a
    /// line terminator.
    pub fn new(any_printable: CharSet, space: CharSet, exact_match: bool) -> Result<Self, Error> {
        if any_printable.is_empty() {
            return Err(Error::InvalidOptions("the any-printable set must not be empty".to_string()));
        }
        if let Some(ch) = any_printable.iter().find(|&c| is_line_terminator(c)) {
            return Err(Error::InvalidOptions(format!(
                "the any-printable set must not contain line terminators (found U+{:04X})",
                ch as u32
            )));
        }
        if space.is_empty() {
            return Err(Error::InvalidOptions("the space set must not be empty".to_string()));
        }
        Ok(MatchOptions { any_printable, space, exact_match })
    }

    /// Same universes, different exact-match flag.
    pub fn with_exact_match(mut self, exact_match: bool) -> Self {
        self.exact_match = exact_match;
        self
    }

    pub fn any_printable(&self) -> &CharSet {
        &self.any_printable
    }

    pub fn space(&self) -> &CharSet {
        &self.space
    }

    pub fn exact_match(&self) -> bool {
        self.exact_match
    }
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions { any_printable: PRINTABLE_LATIN1.clone(), space: ECMA_SPACE.clone(), exact_match: false }
    }
}
