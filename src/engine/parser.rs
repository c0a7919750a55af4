//! Recursive-descent parser for the supported regex subset.
//!
//! ```text
//! Pattern     := Alternative ('|' Alternative)*
//! Alternative := Term*
//! Term        := ['^' | '(?<=' Pattern ')'] Quantified ['$' | '(?=' Pattern ')']
//! Quantified  := Atom [('?' | '*' | '+' | '{m}' | '{m,}' | '{m,n}') ['?']]
//! Atom        := Group | Class | Escape | '.' | literal
//! ```
//!
//! Anchors do not become nodes: `^` and `$` set [`Anchors`] flags on the term
//! they belong to, so every later stage can tell at a glance whether a
//! subtree is pinned to either end. Lookarounds are folded into plain
//! sequences (`(?<=x)y` generates `xy`) and flagged so they cannot end up in
//! the middle of an alternative.
//!
//! Positions in errors are character indexes into the pattern.

use std::time::Instant;

use super::metrics::CompileMetrics;
use super::node::{Anchors, Node, NodeKind};
use super::normalize::normalize;
use crate::bounds::Bounds;
use crate::charset::{CharSet, CharSetBuilder, DIGITS, WORD};
use crate::options::MatchOptions;
use crate::{Error, ParseError};

const START_ANCHOR_MISPLACED: &str = "Start anchor is only allowed at the beginning of an alternative";
const END_ANCHOR_MISPLACED: &str = "End anchor is only allowed at the end of an alternative";
const LOOKBEHIND_MISPLACED: &str = "Lookbehind is only allowed at the beginning of an alternative";
const LOOKAHEAD_MISPLACED: &str = "Lookahead is only allowed at the end of an alternative";
const LOOKAROUND_WITH_EXACT_MATCH: &str = "Lookarounds cannot be used with exact matching";

/// Output of [`compile_pattern`].
#[derive(Debug, Clone)]
pub(crate) struct Compiled {
    /// Normalized tree, anchored at both ends.
    pub root: Node,
    /// Whether the pattern itself pinned every branch at both ends.
    pub anchored: bool,
    pub metrics: CompileMetrics,
}

/// Parse and normalize `pattern`.
pub(crate) fn compile_pattern(pattern: &str, options: &MatchOptions) -> Result<Compiled, Error> {
    let started = Instant::now();
    let mut metrics = CompileMetrics::default();

    let parse_started = Instant::now();
    let parsed = Parser::new(pattern, options).parse()?;
    metrics.parse = parse_started.elapsed();
    metrics.parsed_nodes = parsed.count();

    let anchored = options.exact_match() || parsed.anchors().contains(Anchors::ALL_START | Anchors::ALL_END);

    let normalize_started = Instant::now();
    let root = normalize(parsed, options)?;
    metrics.normalize = normalize_started.elapsed();
    metrics.normalized_nodes = root.count();
    metrics.total = started.elapsed();

    trace!(
        "compile",
        "pattern={pattern:?} normalized={root} length={} anchored={anchored} nodes={}->{}",
        root.length(),
        metrics.parsed_nodes,
        metrics.normalized_nodes
    );
    Ok(Compiled { root, anchored, metrics })
}

/// One item of a bracket expression.
enum ClassItem {
    Char(char),
    /// `\d`, `\w`, `\s`
    Allow(CharSet),
    /// `\D`, `\W`, `\S`
    Deny(CharSet),
}

pub(crate) struct Parser {
    chars: Vec<char>,
    pos: usize,
    space: CharSet,
    exact: bool,
    /// Position of the first lookaround seen.
    lookaround_at: Option<usize>,
}

impl Parser {
    pub fn new(pattern: &str, options: &MatchOptions) -> Self {
        Parser {
            chars: pattern.chars().collect(),
            pos: 0,
            space: options.space().clone(),
            exact: options.exact_match(),
            lookaround_at: None,
        }
    }

    /// Parse the whole pattern into an un-normalized tree.
    ///
    /// Surviving lookarounds sit at an outer edge of the pattern, where exact
    /// matching leaves no room for their context.
    pub fn parse(mut self) -> Result<Node, ParseError> {
        let node = self.parse_disjunction()?;
        if let Some(ch) = self.peek() {
            return Err(ParseError::syntax(format!("Unmatched '{ch}'"), self.pos));
        }
        if let (true, Some(at)) = (self.exact, self.lookaround_at) {
            return Err(ParseError::syntax(LOOKAROUND_WITH_EXACT_MATCH, at));
        }
        trace!("parse", "nodes={} length={} anchors={:?}", node.count(), node.length(), node.anchors());
        Ok(node)
    }

    // --- Cursor ------------------------------------------------------------

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        let mut at = self.pos;
        for ch in prefix.chars() {
            if self.chars.get(at) != Some(&ch) {
                return false;
            }
            at += 1;
        }
        true
    }

    /// End of the current term list: end of input, `|` or `)`.
    fn at_alternative_end(&self) -> bool {
        matches!(self.peek(), None | Some('|') | Some(')'))
    }

    fn text(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    // --- Structure ---------------------------------------------------------

    fn parse_disjunction(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        let mut branches = vec![self.parse_alternative()?];
        while self.eat('|') {
            branches.push(self.parse_alternative()?);
        }
        if branches.len() == 1 {
            return Ok(branches.remove(0));
        }
        Ok(Node::alternative(branches).with_source(self.text(start)))
    }

    fn parse_alternative(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        let mut terms: Vec<(usize, Node)> = Vec::new();
        while !self.at_alternative_end() {
            let at = self.pos;
            let term = self.parse_term(terms.is_empty())?;
            terms.push((at, term));
        }
        check_placement(&terms)?;
        Ok(match terms.len() {
            0 => Node::empty(),
            1 => terms.remove(0).1,
            _ => Node::sequence(terms.into_iter().map(|(_, term)| term).collect()).with_source(self.text(start)),
        })
    }

    fn parse_term(&mut self, first: bool) -> Result<Node, ParseError> {
        let start = self.pos;

        let mut anchor_start = false;
        let mut lookbehind = None;
        if self.peek() == Some('^') {
            if !first {
                return Err(ParseError::syntax(START_ANCHOR_MISPLACED, self.pos));
            }
            self.pos += 1;
            anchor_start = true;
        } else if self.starts_with("(?<=") {
            if !first {
                return Err(ParseError::syntax(LOOKBEHIND_MISPLACED, self.pos));
            }
            lookbehind = Some((self.pos, self.parse_lookaround(4)?));
        } else if self.starts_with("(?<!") {
            return Err(ParseError::unsupported("Negative lookbehind is not supported", self.pos));
        }

        let body_at = self.pos;
        let bare = self.at_alternative_end()
            || self.peek() == Some('$')
            || self.starts_with("(?=")
            || self.starts_with("(?!");
        let body = if bare { Node::empty() } else { self.parse_quantified()? };

        let mut anchor_end = false;
        let mut lookahead = None;
        let suffix_at = self.pos;
        if self.peek() == Some('$') {
            self.pos += 1;
            anchor_end = true;
        } else if self.starts_with("(?=") {
            lookahead = Some((self.pos, self.parse_lookaround(3)?));
        } else if self.starts_with("(?!") {
            return Err(ParseError::unsupported("Negative lookahead is not supported", self.pos));
        }
        if !self.at_alternative_end() {
            if anchor_end {
                return Err(ParseError::syntax(END_ANCHOR_MISPLACED, suffix_at));
            }
            if lookahead.is_some() {
                return Err(ParseError::syntax(LOOKAHEAD_MISPLACED, suffix_at));
            }
        }

        let mut node = body;
        if lookbehind.is_some() || lookahead.is_some() {
            let mut parts = Vec::with_capacity(3);
            let mut marks = Anchors::empty();
            if let Some(behind) = lookbehind {
                parts.push(behind);
                marks |= Anchors::LOOKBEHIND;
            }
            parts.push((body_at, node));
            if let Some(ahead) = lookahead {
                parts.push(ahead);
                marks |= Anchors::LOOKAHEAD;
            }
            check_placement(&parts)?;
            node = Node::sequence(parts.into_iter().map(|(_, part)| part).collect())
                .anchored(marks)
                .with_source(self.text(start));
        }
        if anchor_start {
            if node.anchors().contains(Anchors::LOOKBEHIND) {
                return Err(ParseError::syntax(LOOKBEHIND_MISPLACED, body_at));
            }
            node = node.anchored(Anchors::STARTS);
        }
        if anchor_end {
            if node.anchors().contains(Anchors::LOOKAHEAD) {
                return Err(ParseError::syntax(LOOKAHEAD_MISPLACED, body_at));
            }
            node = node.anchored(Anchors::ENDS);
        }
        Ok(node)
    }

    /// `(?<=X)` / `(?=X)`; `prefix_len` covers the opening syntax.
    fn parse_lookaround(&mut self, prefix_len: usize) -> Result<Node, ParseError> {
        let open = self.pos;
        self.lookaround_at.get_or_insert(open);
        self.pos += prefix_len;
        let inner = self.parse_disjunction()?;
        if !self.eat(')') {
            return Err(ParseError::syntax("Unterminated group", open));
        }
        Ok(inner)
    }

    fn parse_quantified(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        let atom = self.parse_atom()?;
        let Some(occurs) = self.parse_quantifier()? else {
            return Ok(atom);
        };
        // Lazy and greedy quantifiers generate the same strings.
        self.eat('?');
        let occurs = limit_anchored_repeat(&atom, occurs, start)?;
        let node = if atom.occurs() == Bounds::ONCE && atom.anchors().is_empty() {
            atom
        } else {
            Node::sequence(vec![atom])
        };
        Ok(node.with_occurs(occurs).with_source(self.text(start)))
    }

    fn parse_quantifier(&mut self) -> Result<Option<Bounds>, ParseError> {
        let occurs = match self.peek() {
            Some('?') => Bounds::OPTIONAL,
            Some('*') => Bounds::ANY,
            Some('+') => Bounds::at_least(1),
            Some('{') => return self.parse_braces().map(Some),
            _ => return Ok(None),
        };
        self.pos += 1;
        Ok(Some(occurs))
    }

    fn parse_braces(&mut self) -> Result<Bounds, ParseError> {
        let open = self.pos;
        self.pos += 1;
        let min = self.parse_decimal()?;
        if self.eat('}') {
            return Ok(Bounds::exactly(min));
        }
        if !self.eat(',') {
            return Err(ParseError::syntax("Malformed quantifier: expected ',' or '}'", self.pos));
        }
        if self.eat('}') {
            return Ok(Bounds::at_least(min));
        }
        let max = self.parse_decimal()?;
        if !self.eat('}') {
            return Err(ParseError::syntax("Malformed quantifier: expected '}'", self.pos));
        }
        Bounds::new(min, max).map_err(|_| ParseError::syntax("Numbers out of order in quantifier", open))
    }

    fn parse_decimal(&mut self) -> Result<usize, ParseError> {
        let start = self.pos;
        let mut value: usize = 0;
        while let Some(digit) = self.peek().and_then(|c| c.to_digit(10)) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit as usize))
                .filter(|&v| v < crate::bounds::UNBOUNDED)
                .ok_or_else(|| ParseError::syntax("Malformed decimal: number too large", start))?;
            self.pos += 1;
        }
        if self.pos == start {
            return Err(ParseError::syntax("Malformed decimal: expected a digit", start));
        }
        Ok(value)
    }

    // --- Atoms -------------------------------------------------------------

    fn parse_atom(&mut self) -> Result<Node, ParseError> {
        let start = self.pos;
        let Some(ch) = self.bump() else {
            return Err(ParseError::syntax("Unexpected end of pattern", start));
        };
        let node = match ch {
            '(' => self.parse_group(start)?,
            '[' => self.parse_class(start)?,
            '\\' => self.parse_escape(start)?,
            '.' => Node::any_printable(),
            '*' | '+' | '?' | '{' => return Err(ParseError::syntax("Nothing to repeat", start)),
            '^' => return Err(ParseError::syntax(START_ANCHOR_MISPLACED, start)),
            '$' => return Err(ParseError::syntax(END_ANCHOR_MISPLACED, start)),
            literal => Node::literal(literal),
        };
        Ok(node.with_source(self.text(start)))
    }

    /// Group body after the opening `(` at `open`.
    fn parse_group(&mut self, open: usize) -> Result<Node, ParseError> {
        if self.eat('?') {
            match self.bump() {
                Some(':') => {}
                Some('<') => match self.peek() {
                    Some('=') => return Err(ParseError::syntax(LOOKBEHIND_MISPLACED, open)),
                    Some('!') => {
                        return Err(ParseError::unsupported("Negative lookbehind is not supported", open));
                    }
                    _ => self.parse_group_name()?,
                },
                Some('=') => return Err(ParseError::syntax(LOOKAHEAD_MISPLACED, open)),
                Some('!') => return Err(ParseError::unsupported("Negative lookahead is not supported", open)),
                _ => return Err(ParseError::syntax("Invalid group", open)),
            }
        }
        let inner = self.parse_disjunction()?;
        if !self.eat(')') {
            return Err(ParseError::syntax("Unterminated group", open));
        }
        Ok(inner)
    }

    /// `name>` of a named group; the name is not kept.
    fn parse_group_name(&mut self) -> Result<(), ParseError> {
        let start = self.pos;
        while let Some(ch) = self.peek() {
            let valid = if self.pos == start {
                ch.is_alphabetic() || ch == '_' || ch == '$'
            } else {
                ch.is_alphanumeric() || ch == '_' || ch == '$'
            };
            if !valid {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start || !self.eat('>') {
            return Err(ParseError::syntax("Invalid capture group name", start));
        }
        Ok(())
    }

    /// Escape outside a class; `start` is the position of the backslash.
    fn parse_escape(&mut self, start: usize) -> Result<Node, ParseError> {
        let Some(ch) = self.bump() else {
            return Err(ParseError::syntax("\\ at end of pattern", start));
        };
        let node = match ch {
            'b' | 'B' => return Err(ParseError::unsupported("Word boundary assertions are not supported", start)),
            '1'..='9' => return Err(ParseError::unsupported("Backreferences are not supported", start)),
            'k' => return Err(ParseError::unsupported("Named backreferences are not supported", start)),
            'd' => Node::any_of(DIGITS.clone()),
            'D' => Node::none_of(DIGITS.clone()),
            'w' => Node::any_of(WORD.clone()),
            'W' => Node::none_of(WORD.clone()),
            's' => Node::any_of(self.space.clone()),
            'S' => Node::none_of(self.space.clone()),
            other => Node::literal(self.parse_char_escape(other, start)?),
        };
        Ok(node)
    }

    /// Single-character escapes shared by atoms and classes. `ch` is the
    /// character after the backslash, already consumed.
    fn parse_char_escape(&mut self, ch: char, start: usize) -> Result<char, ParseError> {
        let value = match ch {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\u{0C}',
            'v' => '\u{0B}',
            '0' => {
                if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    return Err(ParseError::unsupported("Octal escapes are not supported", start));
                }
                '\0'
            }
            'c' => match self.peek() {
                Some(letter) if letter.is_ascii_alphabetic() => {
                    self.pos += 1;
                    char::from(letter as u8 % 32)
                }
                _ => return Err(ParseError::syntax("Invalid control escape: expected a letter", start)),
            },
            'x' => self.parse_hex(2, start, "Malformed hexadecimal escape")?,
            'u' => self.parse_hex(4, start, "Malformed unicode escape")?,
            identity => identity,
        };
        Ok(value)
    }

    fn parse_hex(&mut self, digits: usize, start: usize, reason: &str) -> Result<char, ParseError> {
        let mut value: u32 = 0;
        for _ in 0..digits {
            let Some(digit) = self.peek().and_then(|c| c.to_digit(16)) else {
                return Err(ParseError::syntax(reason, start));
            };
            value = value * 16 + digit;
            self.pos += 1;
        }
        char::from_u32(value).ok_or_else(|| ParseError::syntax(format!("{reason}: lone surrogate"), start))
    }

    // --- Classes -----------------------------------------------------------

    /// Bracket expression after the opening `[` at `open`.
    fn parse_class(&mut self, open: usize) -> Result<Node, ParseError> {
        let negated = self.eat('^');
        let mut allow = CharSetBuilder::new();
        let mut denies: Vec<CharSet> = Vec::new();
        let mut items = 0usize;

        loop {
            let item_at = self.pos;
            let Some(ch) = self.bump() else {
                return Err(ParseError::syntax("Unterminated character class", open));
            };
            if ch == ']' {
                break;
            }
            items += 1;
            let item = self.parse_class_item(ch, open)?;

            let is_range = self.peek() == Some('-') && self.peek_at(1).is_some_and(|next| next != ']');
            if !is_range {
                match item {
                    ClassItem::Char(c) => {
                        allow.insert(c);
                    }
                    ClassItem::Allow(set) => {
                        allow.insert_set(&set);
                    }
                    ClassItem::Deny(set) => denies.push(set),
                }
                continue;
            }

            self.pos += 1;
            let Some(end_ch) = self.bump() else {
                return Err(ParseError::syntax("Unterminated character class", open));
            };
            match (item, self.parse_class_item(end_ch, open)?) {
                (ClassItem::Char(lo), ClassItem::Char(hi)) => {
                    if lo > hi {
                        return Err(ParseError::syntax("Range out of order in character class", item_at));
                    }
                    allow.insert_range(lo, hi);
                }
                _ => {
                    return Err(ParseError::syntax("Range endpoint must be a single character", item_at));
                }
            }
        }

        if items == 0 {
            return Err(ParseError::syntax("Empty character class", open));
        }
        let allow = allow.build();
        let kind = match (negated, intersect_all(denies)) {
            (false, None) => NodeKind::AnyOf(allow),
            (false, Some(deny)) => NodeKind::NoneOf(deny.difference(&allow)),
            (true, None) => NodeKind::NoneOf(allow),
            (true, Some(deny)) => NodeKind::AnyOf(deny.difference(&allow)),
        };
        if matches!(&kind, NodeKind::AnyOf(set) if set.is_empty()) {
            return Err(ParseError::syntax("Character class matches nothing", open));
        }
        Ok(Node::new(kind))
    }

    fn parse_class_item(&mut self, ch: char, open: usize) -> Result<ClassItem, ParseError> {
        if ch != '\\' {
            return Ok(ClassItem::Char(ch));
        }
        let start = self.pos - 1;
        let Some(escaped) = self.bump() else {
            return Err(ParseError::syntax("Unterminated character class", open));
        };
        let item = match escaped {
            'd' => ClassItem::Allow(DIGITS.clone()),
            'D' => ClassItem::Deny(DIGITS.clone()),
            'w' => ClassItem::Allow(WORD.clone()),
            'W' => ClassItem::Deny(WORD.clone()),
            's' => ClassItem::Allow(self.space.clone()),
            'S' => ClassItem::Deny(self.space.clone()),
            'b' => ClassItem::Char('\u{08}'),
            'B' => return Err(ParseError::syntax("Invalid escape in character class", start)),
            '1'..='9' => return Err(ParseError::unsupported("Octal escapes are not supported", start)),
            other => ClassItem::Char(self.parse_char_escape(other, start)?),
        };
        Ok(item)
    }
}

fn intersect_all(sets: Vec<CharSet>) -> Option<CharSet> {
    sets.into_iter().reduce(|acc, set| acc.intersection(&set))
}

/// Reject terms pinned to the front (back) of an alternative that are not
/// its first (last) term. `parts` pairs each term with its position.
fn check_placement(parts: &[(usize, Node)]) -> Result<(), ParseError> {
    let last = parts.len().saturating_sub(1);
    for (idx, (at, node)) in parts.iter().enumerate() {
        let anchors = node.anchors();
        if idx > 0 && anchors.contains(Anchors::START) {
            return Err(ParseError::syntax(START_ANCHOR_MISPLACED, *at));
        }
        if idx > 0 && anchors.contains(Anchors::LOOKBEHIND) {
            return Err(ParseError::syntax(LOOKBEHIND_MISPLACED, *at));
        }
        if idx < last && anchors.contains(Anchors::END) {
            return Err(ParseError::syntax(END_ANCHOR_MISPLACED, *at));
        }
        if idx < last && anchors.contains(Anchors::LOOKAHEAD) {
            return Err(ParseError::syntax(LOOKAHEAD_MISPLACED, *at));
        }
    }
    Ok(())
}

/// An anchored atom can match at most once. When every branch is anchored the
/// repetition is clamped to one occurrence; a partially anchored atom or a
/// lookaround cannot be repeated at all.
fn limit_anchored_repeat(atom: &Node, occurs: Bounds, at: usize) -> Result<Bounds, ParseError> {
    if occurs.max() <= 1 {
        return Ok(occurs);
    }
    let anchors = atom.anchors();
    if anchors.intersects(Anchors::LOOKBEHIND | Anchors::LOOKAHEAD) {
        return Err(ParseError::syntax("Cannot repeat an expression containing a lookaround", at));
    }
    let mut clamped = false;
    for (some, all, side) in [(Anchors::START, Anchors::ALL_START, "start"), (Anchors::END, Anchors::ALL_END, "end")] {
        if !anchors.contains(some) {
            continue;
        }
        if !anchors.contains(all) {
            return Err(ParseError::syntax(
                format!("Cannot repeat an expression anchored at the {side} in only some branches"),
                at,
            ));
        }
        if occurs.min() > 1 {
            return Err(ParseError::syntax(
                format!("An expression anchored at the {side} cannot occur more than once"),
                at,
            ));
        }
        clamped = true;
    }
    if !clamped {
        return Ok(occurs);
    }
    trace!("parse", "clamping {} repetition of anchored atom at {at}", occurs);
    Ok(if occurs.min() == 0 { Bounds::OPTIONAL } else { Bounds::ONCE })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseErrorKind;
    use crate::bounds::UNBOUNDED;

    fn parse(pattern: &str) -> Result<Node, ParseError> {
        Parser::new(pattern, &MatchOptions::default()).parse()
    }

    fn error(pattern: &str) -> ParseError {
        match parse(pattern) {
            Ok(node) => panic!("{pattern:?} parsed as {node}"),
            Err(err) => err,
        }
    }

    fn lengths(pattern: &str) -> (usize, usize) {
        let node = parse(pattern).unwrap();
        (node.min_length(), node.max_length())
    }

    #[test]
    fn infers_lengths() {
        assert_eq!(lengths("abc"), (3, 3));
        assert_eq!(lengths("a{2,4}b?"), (2, 5));
        assert_eq!(lengths("(cat|horse)+"), (3, UNBOUNDED));
        assert_eq!(lengths("x{3}"), (3, 3));
        assert_eq!(lengths("x{3,}"), (3, UNBOUNDED));
        assert_eq!(lengths("(a|)"), (0, 1));
        assert_eq!(lengths(""), (0, 0));
        assert_eq!(lengths("^$"), (0, 0));
    }

    #[test]
    fn quantifier_on_quantified_group_multiplies() {
        assert_eq!(lengths("(a{2}){3}"), (6, 6));
        assert_eq!(lengths("(a?){2,3}"), (0, 3));
        assert_eq!(lengths("a+?"), (1, UNBOUNDED));
    }

    #[test]
    fn anchors_become_flags() {
        let node = parse("^abc$").unwrap();
        assert!(node.anchors().contains(Anchors::BOTH));
        let partial = parse("^a|b").unwrap();
        assert!(partial.anchors().contains(Anchors::START));
        assert!(!partial.anchors().contains(Anchors::ALL_START));
        let grouped = parse("(^a|^b)c").unwrap();
        assert!(grouped.anchors().contains(Anchors::STARTS));
    }

    #[test]
    fn misplaced_anchors_are_rejected() {
        assert_eq!(error("a^b").reason, START_ANCHOR_MISPLACED);
        assert_eq!(error("a^b").position, 1);
        assert_eq!(error("a$b").reason, END_ANCHOR_MISPLACED);
        assert_eq!(error("a(^b)").reason, START_ANCHOR_MISPLACED);
        assert_eq!(error("(a$)b").reason, END_ANCHOR_MISPLACED);
        assert_eq!(error("a(?<=b)c").reason, LOOKBEHIND_MISPLACED);
        assert_eq!(error("a(?=b)c").reason, LOOKAHEAD_MISPLACED);
        assert_eq!(error("^((?<=a)b)").reason, LOOKBEHIND_MISPLACED);
        assert_eq!(error("^((?<=a)b)").position, 1);
        assert_eq!(error("^(x|(?<=a)b)").reason, LOOKBEHIND_MISPLACED);
        assert_eq!(error("(a(?=b))$").reason, LOOKAHEAD_MISPLACED);
        assert_eq!(error("(a(?=b))$").position, 0);
        assert!(parse("^a|^b$|c$").is_ok());
        assert!(parse("^(a(?=b))").is_ok());
        assert!(parse("((?<=a)b)$").is_ok());
    }

    #[test]
    fn anchored_repeats_are_clamped_or_rejected() {
        let clamped = parse("(a$)+").unwrap();
        assert_eq!(clamped.length(), Bounds::exactly(1));
        let optional = parse("(^a)*").unwrap();
        assert_eq!(optional.length(), Bounds::OPTIONAL);
        assert!(error("(a$){2}").reason.contains("more than once"));
        assert!(error("(a$|b)+").reason.contains("only some branches"));
        assert!(error("((?<=a)b)+").reason.contains("lookaround"));
    }

    #[test]
    fn lookarounds_fold_into_sequences() {
        let behind = parse("(?<=ab)c").unwrap();
        assert_eq!(behind.length(), Bounds::exactly(3));
        assert!(behind.anchors().contains(Anchors::LOOKBEHIND));
        let ahead = parse("a(?=b|cd)").unwrap();
        assert_eq!(ahead.length(), Bounds::new(2, 3).unwrap());
        assert!(parse("^(?=x)").is_ok());
    }

    #[test]
    fn exact_match_rejects_lookarounds() {
        let exact = MatchOptions::default().with_exact_match(true);
        for (pattern, position) in [("a(?=b)", 1), ("(?<=a)b", 0), ("(x(?=y)|z)", 2)] {
            let err = Parser::new(pattern, &exact).parse().unwrap_err();
            assert_eq!(err.reason, LOOKAROUND_WITH_EXACT_MATCH, "{pattern}");
            assert_eq!(err.position, position, "{pattern}");
            assert!(parse(pattern).is_ok(), "{pattern}");
        }
    }

    #[test]
    fn unsupported_constructs() {
        for pattern in [r"\bfoo", r"a\B", "a(?!b)", "(?<!a)b", r"(a)\1", r"\k<x>"] {
            let err = error(pattern);
            assert_eq!(err.kind, ParseErrorKind::Unsupported, "{pattern}");
        }
    }

    #[test]
    fn syntax_errors_carry_positions() {
        let cases: &[(&str, &str, usize)] = &[
            ("(ab", "Unterminated group", 0),
            ("ab)", "Unmatched ')'", 2),
            ("x[ab", "Unterminated character class", 1),
            ("[]", "Empty character class", 0),
            ("[^]", "Empty character class", 0),
            ("a{3,1}", "Numbers out of order in quantifier", 1),
            ("a{,3}", "Malformed decimal: expected a digit", 2),
            ("a{99999999999999999999}", "Malformed decimal: number too large", 2),
            (r"\xZZ", "Malformed hexadecimal escape", 0),
            (r"a\u12", "Malformed unicode escape", 1),
            (r"\c1", "Invalid control escape: expected a letter", 0),
            ("*a", "Nothing to repeat", 0),
            ("a**", "Nothing to repeat", 2),
            (r"[\d-z]", "Range endpoint must be a single character", 1),
            ("[z-a]", "Range out of order in character class", 1),
            ("(?x)", "Invalid group", 0),
            ("(?<1a>b)", "Invalid capture group name", 3),
        ];
        for &(pattern, reason, position) in cases {
            let err = error(pattern);
            assert_eq!(err.kind, ParseErrorKind::Syntax, "{pattern}");
            assert_eq!(err.reason, reason, "{pattern}");
            assert_eq!(err.position, position, "{pattern}");
        }
    }

    #[test]
    fn classes_compose_negated_escapes() {
        let kind = |pattern: &str| parse(pattern).unwrap().kind().clone();
        assert_eq!(kind("[a-c]"), NodeKind::AnyOf("abc".chars().collect()));
        assert_eq!(kind("[^a-c]"), NodeKind::NoneOf("abc".chars().collect()));
        assert_eq!(kind(r"[\D5]"), NodeKind::NoneOf("012346789".chars().collect()));
        assert_eq!(kind(r"[^\D5]"), NodeKind::AnyOf("012346789".chars().collect()));
        assert_eq!(kind(r"[\W\D]"), NodeKind::NoneOf("0123456789".chars().collect()));
        assert!(error(r"[^\s\S]").reason.contains("matches nothing"));
    }

    #[test]
    fn escapes_and_literals() {
        let kind = |pattern: &str| parse(pattern).unwrap().kind().clone();
        assert_eq!(kind(r"\x41"), NodeKind::AnyOf("A".chars().collect()));
        assert_eq!(kind(r"é"), NodeKind::AnyOf("é".chars().collect()));
        assert_eq!(kind(r"\cJ"), NodeKind::AnyOf("\n".chars().collect()));
        assert_eq!(kind(r"\cj"), NodeKind::AnyOf("\n".chars().collect()));
        let controls =
            [(r"\t", '\t'), (r"\r", '\r'), (r"\n", '\n'), (r"\f", '\u{0C}'), (r"\v", '\u{0B}'), (r"\0", '\0')];
        for (pattern, ch) in controls {
            let expected = NodeKind::AnyOf([ch].into_iter().collect());
            assert_eq!(kind(pattern), expected, "{pattern}");
            assert_eq!(kind(format!("[{pattern}]").as_str()), expected, "{pattern}");
        }
        assert_eq!(kind(r"[\b]"), NodeKind::AnyOf("\u{08}".chars().collect()));
        assert_eq!(kind(r"\."), NodeKind::AnyOf(".".chars().collect()));
        assert_eq!(kind("]"), NodeKind::AnyOf("]".chars().collect()));
        assert_eq!(kind("}"), NodeKind::AnyOf("}".chars().collect()));
        assert_eq!(kind("[-a]"), NodeKind::AnyOf("-a".chars().collect()));
        assert_eq!(kind("[a-]"), NodeKind::AnyOf("-a".chars().collect()));
        assert_eq!(kind("."), NodeKind::AnyPrintable);
        assert!(parse("(?<name>x)(?:y)(z)").is_ok());
    }

    #[test]
    fn space_class_follows_options() {
        let space: CharSet = " ".chars().collect();
        let options = MatchOptions::new("ab ".chars().collect(), space.clone(), false).unwrap();
        let node = Parser::new(r"\s", &options).parse().unwrap();
        assert_eq!(node.kind(), &NodeKind::AnyOf(space));
    }

    #[test]
    fn compile_reports_anchoring_and_metrics() {
        let options = MatchOptions::default();
        let compiled = compile_pattern("^(a|b)$", &options).unwrap();
        assert!(compiled.anchored);
        assert_eq!(compiled.metrics.parsed_nodes, compiled.metrics.normalized_nodes);

        let compiled = compile_pattern("cat", &options).unwrap();
        assert!(!compiled.anchored);
        assert!(compiled.metrics.normalized_nodes > compiled.metrics.parsed_nodes);
        assert_eq!(compiled.root.min_length(), 3);
        assert!(compiled.root.length().is_unbounded());

        let exact = compile_pattern("cat", &options.clone().with_exact_match(true)).unwrap();
        assert!(exact.anchored);
        assert_eq!(exact.root.length(), Bounds::exactly(3));
    }
}
