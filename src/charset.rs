//! Immutable character sets and the process-wide character tables.
//!
//! Character classes are assembled with a [`CharSetBuilder`] while the parser
//! walks a `[...]` expression and frozen into a [`CharSet`] once the class is
//! closed. A frozen set is a sorted, deduplicated `Arc<[char]>`, so cloning is
//! cheap and uniform sampling is a single index lookup.

use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Sorted, deduplicated, immutable set of characters.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharSet(Arc<[char]>);

impl CharSet {
    pub fn empty() -> Self {
        CharSet(Arc::from(Vec::new()))
    }

    /// All characters in `start..=end`, skipping surrogate code points.
    pub fn range(start: char, end: char) -> Self {
        (start..=end).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.0.binary_search(&ch).is_ok()
    }

    pub fn get(&self, index: usize) -> Option<char> {
        self.0.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[char] {
        &self.0
    }

    pub fn union(&self, other: &CharSet) -> CharSet {
        self.iter().chain(other.iter()).collect()
    }

    pub fn intersection(&self, other: &CharSet) -> CharSet {
        self.iter().filter(|&c| other.contains(c)).collect()
    }

    pub fn difference(&self, other: &CharSet) -> CharSet {
        self.iter().filter(|&c| !other.contains(c)).collect()
    }

    /// At most `limit` characters, evenly spaced over the sorted set.
    pub fn sample(&self, limit: usize) -> CharSet {
        if self.len() <= limit {
            return self.clone();
        }
        if limit == 0 {
            return CharSet::empty();
        }
        let stride = self.len() / limit;
        self.0.iter().step_by(stride).take(limit).copied().collect()
    }
}

impl FromIterator<char> for CharSet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        let set: BTreeSet<char> = iter.into_iter().collect();
        CharSet(set.into_iter().collect())
    }
}

impl fmt::Debug for CharSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharSet({})", render_ranges(self))
    }
}

/// Mutable accumulator used while a class is being parsed.
#[derive(Debug, Default, Clone)]
pub struct CharSetBuilder {
    chars: BTreeSet<char>,
}

impl CharSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, ch: char) -> &mut Self {
        self.chars.insert(ch);
        self
    }

    pub fn insert_range(&mut self, start: char, end: char) -> &mut Self {
        self.chars.extend(start..=end);
        self
    }

    pub fn insert_set(&mut self, set: &CharSet) -> &mut Self {
        self.chars.extend(set.iter());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn build(self) -> CharSet {
        CharSet(self.chars.into_iter().collect())
    }
}

// --- Tables ------------------------------------------------------------------

/// Printable Latin-1: U+0020..=U+007E and U+00A0..=U+00FF.
pub static PRINTABLE_LATIN1: Lazy<CharSet> =
    Lazy::new(|| (' '..='~').chain('\u{A0}'..='\u{FF}').collect());

/// ECMA-262 `\s`: WhiteSpace plus LineTerminator.
pub static ECMA_SPACE: Lazy<CharSet> = Lazy::new(|| {
    ['\t', '\n', '\u{0B}', '\u{0C}', '\r', ' ', '\u{A0}', '\u{1680}', '\u{2028}', '\u{2029}', '\u{202F}']
        .into_iter()
        .chain(['\u{205F}', '\u{3000}', '\u{FEFF}'])
        .chain('\u{2000}'..='\u{200A}')
        .collect()
});

/// `\n`, `\r`, U+2028, U+2029.
pub static LINE_TERMINATORS: Lazy<CharSet> =
    Lazy::new(|| ['\n', '\r', '\u{2028}', '\u{2029}'].into_iter().collect());

/// `\d`
pub static DIGITS: Lazy<CharSet> = Lazy::new(|| CharSet::range('0', '9'));

/// `\w`: `[A-Za-z0-9_]`.
pub static WORD: Lazy<CharSet> =
    Lazy::new(|| ('a'..='z').chain('A'..='Z').chain('0'..='9').chain(std::iter::once('_')).collect());

pub fn is_line_terminator(ch: char) -> bool {
    LINE_TERMINATORS.contains(ch)
}

// --- Rendering ---------------------------------------------------------------

/// Render a set as the body of a bracket expression, collapsing runs of
/// three or more consecutive characters into ranges.
pub(crate) fn render_ranges(set: &CharSet) -> String {
    let mut out = String::new();
    let chars = set.as_slice();
    let mut i = 0;
    while i < chars.len() {
        let start = chars[i];
        let mut j = i;
        while j + 1 < chars.len() && (chars[j + 1] as u32) == (chars[j] as u32) + 1 {
            j += 1;
        }
        if j - i >= 2 {
            push_escaped(&mut out, start, true);
            out.push('-');
            push_escaped(&mut out, chars[j], true);
        } else {
            for &ch in &chars[i..=j] {
                push_escaped(&mut out, ch, true);
            }
        }
        i = j + 1;
    }
    out
}

/// Append `ch` so that it reads back as the same literal.
pub(crate) fn push_escaped(out: &mut String, ch: char, in_class: bool) {
    let special: &[char] = if in_class {
        &['\\', ']', '[', '^', '-']
    } else {
        &['\\', '^', '$', '.', '|', '?', '*', '+', '(', ')', '[', ']', '{', '}']
    };
    match ch {
        '\t' => out.push_str("\\t"),
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\u{0B}' => out.push_str("\\v"),
        '\u{0C}' => out.push_str("\\f"),
        '\0' => out.push_str("\\0"),
        c if special.contains(&c) => {
            out.push('\\');
            out.push(c);
        }
        c if c.is_control() || (c as u32) > 0xFF => out.push_str(&format!("\\u{:04X}", c as u32)),
        c => out.push(c),
    }
}
