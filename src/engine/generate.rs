//! Length-directed random emission.
//!
//! Generation is top-down. The caller's requested bounds are intersected with
//! the root's feasible length and a total is drawn from the result. Every node
//! then receives an exact length to fill:
//!
//! ```text
//! composite with occurs [m,n], one occurrence of length [a,b], total L
//!   count k in [max(m, ceil(L/b)), min(n, floor(L/a))]
//!   L split over k parts, each in [a,b]
//! sequence: L split over the children's [min,max]
//! alternative: any member whose range contains L, tried in random order
//! leaf: L characters drawn uniformly from the resolved set
//! ```
//!
//! Splitting starts every part at its minimum and hands out the remaining
//! slack in random chunks to parts that still have room. Some length sets
//! have holes (`(ab)*` cannot produce odd lengths); those surface as
//! [`LengthError::Infeasible`] and the top level retries with a new total.

use std::borrow::Cow;

use super::node::{Node, NodeKind};
use crate::Error;
use crate::bounds::{Bounds, LengthError, UNBOUNDED, divided_by, divided_by_ceil, exclusive, reduce_by};
use crate::charset::{CharSet, LINE_TERMINATORS};
use crate::options::MatchOptions;
use crate::random::RandomSource;

/// Fresh totals drawn before giving up on a pattern with holes in its length set.
const MAX_ATTEMPTS: usize = 16;

/// Characters a leaf may produce under `options`.
pub(crate) fn resolve_leaf<'a>(kind: &'a NodeKind, options: &MatchOptions) -> Option<Cow<'a, CharSet>> {
    match kind {
        NodeKind::AnyOf(set) => Some(Cow::Borrowed(set)),
        NodeKind::NoneOf(set) => Some(Cow::Owned(options.any_printable().difference(set))),
        NodeKind::AnyPrintable => Some(Cow::Owned(options.any_printable().difference(&LINE_TERMINATORS))),
        NodeKind::Sequence(_) | NodeKind::Alternative(_) => None,
    }
}

fn infeasible(length: usize) -> Error {
    Error::Length(LengthError::Infeasible(length))
}

fn is_retryable(err: &Error) -> bool {
    matches!(err, Error::Length(LengthError::Infeasible(_)) | Error::EmptyCharacterSet(_))
}

pub(crate) struct Emitter<'a, R: RandomSource> {
    options: &'a MatchOptions,
    random: &'a mut R,
}

impl<'a, R: RandomSource> Emitter<'a, R> {
    pub fn new(options: &'a MatchOptions, random: &'a mut R) -> Self {
        Emitter { options, random }
    }

    /// Random string produced by `root` with a length inside `target`.
    pub fn generate(&mut self, root: &Node, target: Bounds) -> Result<String, Error> {
        let bounds = root.length().clipped_to(target)?;
        let mut total = bounds.min();
        for attempt in 1..=MAX_ATTEMPTS {
            total = self.random.range(bounds.min(), exclusive(bounds.max()));
            let mut out = String::new();
            match self.emit(root, total, &mut out) {
                Ok(()) => {
                    trace!("generate", "length={total} attempts={attempt}");
                    return Ok(out);
                }
                Err(Error::Length(LengthError::Infeasible(_))) => {
                    trace!("generate", "attempt {attempt}: no string of length {total} in {bounds}");
                }
                Err(err) => return Err(err),
            }
        }
        Err(infeasible(total))
    }

    /// Append exactly `total` characters produced by `node`.
    fn emit(&mut self, node: &Node, total: usize, out: &mut String) -> Result<(), Error> {
        if !node.length().contains(total) {
            return Err(infeasible(total));
        }
        if node.is_leaf() {
            return self.emit_leaf(node, total, out);
        }

        let inner = node.inner_length();
        let occurs = node.occurs();
        if total == 0 && occurs.min() == 0 {
            return Ok(());
        }
        let lowest = occurs.min().max(divided_by_ceil(total, inner.max()));
        let mut highest = occurs.max().min(divided_by(total, inner.min()));
        if lowest > highest || lowest == UNBOUNDED {
            return Err(infeasible(total));
        }
        if highest == UNBOUNDED {
            // Occurrences that may be empty: no point in more of them than characters.
            highest = lowest.max(total);
        }
        let count = self.random.range(lowest, exclusive(highest));
        let parts = self.distribute(&vec![inner; count], total)?;
        for part in parts {
            self.emit_occurrence(node, part, out)?;
        }
        Ok(())
    }

    fn emit_occurrence(&mut self, node: &Node, length: usize, out: &mut String) -> Result<(), Error> {
        match node.kind() {
            NodeKind::Sequence(children) => {
                let ranges: Vec<Bounds> = children.iter().map(Node::length).collect();
                let lengths = self.distribute(&ranges, length)?;
                for (child, child_length) in children.iter().zip(lengths) {
                    self.emit(child, child_length, out)?;
                }
                Ok(())
            }
            NodeKind::Alternative(members) => {
                let mut candidates: Vec<&Node> = members.iter().filter(|m| m.length().contains(length)).collect();
                self.random.shuffle(&mut candidates);
                let mut last_err = infeasible(length);
                for member in candidates {
                    let mut buffer = String::new();
                    match self.emit(member, length, &mut buffer) {
                        Ok(()) => {
                            out.push_str(&buffer);
                            return Ok(());
                        }
                        Err(err) if is_retryable(&err) => last_err = err,
                        Err(err) => return Err(err),
                    }
                }
                Err(last_err)
            }
            _ => Err(Error::Internal(format!("leaf {} reached composite emission", node.describe()))),
        }
    }

    fn emit_leaf(&mut self, node: &Node, total: usize, out: &mut String) -> Result<(), Error> {
        if total == 0 {
            return Ok(());
        }
        let Some(chars) = resolve_leaf(node.kind(), self.options) else {
            return Err(Error::Internal(format!("{} is not a character class", node.describe())));
        };
        if chars.is_empty() {
            return Err(Error::EmptyCharacterSet(node.describe()));
        }
        for _ in 0..total {
            let idx = self.random.range(0, chars.len());
            if let Some(ch) = chars.get(idx) {
                out.push(ch);
            }
        }
        Ok(())
    }

    /// Split `total` over `parts`, each share inside its range.
    fn distribute(&mut self, parts: &[Bounds], total: usize) -> Result<Vec<usize>, Error> {
        let floor = parts.iter().fold(0usize, |acc, p| acc.saturating_add(p.min()));
        let ceiling = parts.iter().fold(0usize, |acc, p| acc.saturating_add(p.max()));
        if total < floor || total > ceiling {
            return Err(infeasible(total));
        }

        let mut shares: Vec<usize> = parts.iter().map(Bounds::min).collect();
        let mut slack = total - floor;
        let mut open: Vec<usize> = (0..parts.len()).filter(|&i| parts[i].max() > parts[i].min()).collect();
        while slack > 0 {
            if open.is_empty() {
                return Err(Error::Internal(format!("{slack} characters left over after filling every part")));
            }
            let pick = self.random.range(0, open.len());
            let idx = open[pick];
            let room = reduce_by(parts[idx].max(), shares[idx]);
            let chunk = self.random.range(1, exclusive(room.min(slack)));
            shares[idx] += chunk;
            slack -= chunk;
            if reduce_by(parts[idx].max(), shares[idx]) == 0 {
                open.swap_remove(pick);
            }
        }
        Ok(shares)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::parser::compile_pattern;
    use crate::random::Random;

    fn generate(pattern: &str, target: Bounds, seed: u64) -> Result<String, Error> {
        let options = MatchOptions::default();
        let compiled = compile_pattern(pattern, &options)?;
        let mut random = Random::seeded(seed);
        Emitter::new(&options, &mut random).generate(&compiled.root, target)
    }

    #[test]
    fn respects_requested_length() {
        for seed in 0..50 {
            let value = generate("^[a-z]+$", Bounds::new(4, 6).unwrap(), seed).unwrap();
            assert!((4..=6).contains(&value.chars().count()), "{value:?}");
            assert!(value.chars().all(|c| c.is_ascii_lowercase()));
        }
        let exact = generate("^a{2,}b*$", Bounds::exactly(7), 3).unwrap();
        assert_eq!(exact.len(), 7);
        assert!(exact.starts_with("aa"));
    }

    #[test]
    fn reports_length_conflicts() {
        let short = generate("^abc$", Bounds::new(0, 2).unwrap(), 1).unwrap_err();
        assert_eq!(short.to_string(), "Length cannot be less than 3");
        let long = generate("^abc$", Bounds::at_least(4), 1).unwrap_err();
        assert_eq!(long.to_string(), "Length cannot be greater than 3");
    }

    #[test]
    fn retries_around_holes_in_length_set() {
        for seed in 0..20 {
            let value = generate("^(ab)*$", Bounds::new(1, 9).unwrap(), seed).unwrap();
            assert!(value.len() % 2 == 0 && !value.is_empty(), "{value:?}");
        }
        let err = generate("^(ab)*$", Bounds::exactly(3), 1).unwrap_err();
        assert_eq!(err, Error::Length(LengthError::Infeasible(3)));
    }

    #[test]
    fn alternative_picks_member_that_fits() {
        for seed in 0..20 {
            let value = generate("^(cat|horse)$", Bounds::exactly(5), seed).unwrap();
            assert_eq!(value, "horse");
        }
    }

    #[test]
    fn empty_class_is_reported() {
        let options = MatchOptions::new("abc".chars().collect(), " ".chars().collect(), false).unwrap();
        let compiled = compile_pattern("^[^abc]$", &options).unwrap();
        let mut random = Random::seeded(1);
        let err = Emitter::new(&options, &mut random).generate(&compiled.root, Bounds::ANY).unwrap_err();
        assert_eq!(err, Error::EmptyCharacterSet("[^abc]".to_string()));
    }

    #[test]
    fn distribute_fills_every_part_within_range() {
        let options = MatchOptions::default();
        let mut random = Random::seeded(9);
        let mut emitter = Emitter::new(&options, &mut random);
        let parts = [Bounds::new(1, 3).unwrap(), Bounds::exactly(2), Bounds::at_least(0)];
        for total in 3..20 {
            let shares = emitter.distribute(&parts, total).unwrap();
            assert_eq!(shares.iter().sum::<usize>(), total);
            for (share, range) in shares.iter().zip(parts) {
                assert!(range.contains(*share));
            }
        }
        assert!(emitter.distribute(&parts, 2).is_err());
        assert!(emitter.distribute(&[Bounds::exactly(1)], 2).is_err());
        assert_eq!(emitter.distribute(&[], 0).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn unbounded_lengths_stay_finite() {
        for seed in 0..20 {
            let value = generate("x", Bounds::ANY, seed).unwrap();
            assert!(value.contains('x'));
            assert!(value.chars().count() < 1000);
        }
    }
}
