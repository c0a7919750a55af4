//! Derivation of a generator for strings that do not match.
//!
//! Two cheap strategies, combined when both apply:
//!
//! - **wrong first character**: every non-empty match starts with a
//!   character of one of the leading classes. A string that starts with any
//!   other character cannot match. It is also made longer than the longest
//!   match, so an unanchored pattern cannot find its match further in.
//! - **too short**: strings shorter than `min_length` never match.
//!
//! Leading classes are found by walking the normalized tree from the left:
//! a node contributes its first leaves and lets the walk continue past it only
//! when it can be empty.
//!
//! ```text
//! ^(cat|dog)$    leading {c} {d}      ->  ^(?:[^cd]{4,}|[cd]{0,2})$
//! ```
//!
//! No result is produced when the pattern may match the empty string without
//! being anchored, since then every string matches.

use super::generate::resolve_leaf;
use super::node::{Anchors, Node, NodeKind};
use crate::bounds::Bounds;
use crate::charset::{CharSet, CharSetBuilder, LINE_TERMINATORS};
use crate::options::MatchOptions;

/// Characters kept from each set used to build a complement.
pub const SAMPLE_LIMIT: usize = 32;

/// Leaves that can supply the first character of a match.
struct Leading<'a> {
    classes: Vec<&'a Node>,
    /// The whole tree can match the empty string.
    nullable: bool,
}

impl<'a> Leading<'a> {
    fn of(root: &'a Node) -> Self {
        let mut classes = Vec::new();
        let nullable = collect_leading(root, &mut classes);
        Leading { classes, nullable }
    }
}

/// Push the leading leaves of `node`; returns whether `node` can be empty.
fn collect_leading<'a>(node: &'a Node, out: &mut Vec<&'a Node>) -> bool {
    if node.occurs().max() == 0 {
        return true;
    }
    let inner_nullable = match node.kind() {
        NodeKind::AnyOf(_) | NodeKind::NoneOf(_) | NodeKind::AnyPrintable => {
            out.push(node);
            false
        }
        NodeKind::Sequence(children) => children.iter().all(|child| collect_leading(child, out)),
        NodeKind::Alternative(members) => {
            members.iter().fold(false, |nullable, member| collect_leading(member, out) || nullable)
        }
    };
    inner_nullable || node.occurs().min() == 0
}

fn accepts(node: &Node, ch: char) -> bool {
    match node.kind() {
        NodeKind::AnyOf(set) => set.contains(ch),
        NodeKind::NoneOf(set) => !set.contains(ch),
        NodeKind::AnyPrintable => !LINE_TERMINATORS.contains(ch),
        NodeKind::Sequence(_) | NodeKind::Alternative(_) => false,
    }
}

/// Tree producing only strings that `root` does not match, if one can be
/// derived. `anchored` tells whether the source pattern was anchored at both
/// ends.
pub(crate) fn complement(root: &Node, anchored: bool, options: &MatchOptions) -> Option<Node> {
    let leading = Leading::of(root);
    if leading.classes.is_empty() && leading.nullable {
        if !anchored {
            return None;
        }
        trace!("complement", "only the empty string matches");
        return Some(Node::any_printable().with_occurs(Bounds::at_least(1)).anchored(Anchors::BOTH));
    }
    if leading.nullable && !anchored {
        trace!("complement", "unanchored pattern matches the empty string");
        return None;
    }

    let (required, optional): (Vec<&Node>, Vec<&Node>) =
        leading.classes.iter().copied().partition(|node| node.occurs().min() > 0);

    let mut results = Vec::new();
    if let Some(node) = wrong_first_char(&required, &optional, root.length(), options) {
        results.push(node);
    }
    if root.min_length() > 0 {
        results.push(too_short(&required, root.min_length(), options));
    }
    trace!(
        "complement",
        "leading={} required={} results={}",
        leading.classes.len(),
        required.len(),
        results.len()
    );
    let node = match results.len() {
        0 => return None,
        1 => results.remove(0),
        _ => Node::alternative(results),
    };
    Some(node.anchored(Anchors::BOTH))
}

fn wrong_first_char(required: &[&Node], optional: &[&Node], length: Bounds, options: &MatchOptions) -> Option<Node> {
    if required.is_empty() {
        return None;
    }
    let universe = options.any_printable();
    let mut allow = CharSetBuilder::new();
    let mut deny: Option<CharSet> = None;
    for node in required {
        let denied = match node.kind() {
            NodeKind::AnyOf(set) => {
                allow.insert_set(set);
                continue;
            }
            NodeKind::NoneOf(set) => set,
            NodeKind::AnyPrintable => &*LINE_TERMINATORS,
            NodeKind::Sequence(_) | NodeKind::Alternative(_) => continue,
        };
        deny = Some(match deny {
            None => denied.clone(),
            Some(acc) => acc.intersection(denied),
        });
    }
    let allow = allow.build();
    let candidates = match &deny {
        None => universe.difference(&allow),
        Some(deny) => universe.intersection(deny).difference(&allow),
    };
    let mismatch: CharSet = candidates.iter().filter(|&ch| !optional.iter().any(|node| accepts(node, ch))).collect();
    if mismatch.is_empty() {
        trace!("complement", "every first character can start a match");
        return None;
    }
    let min = if length.is_unbounded() { 1 } else { length.max().saturating_add(1) };
    Some(Node::any_of(mismatch.sample(SAMPLE_LIMIT)).with_occurs(Bounds::at_least(min)))
}

fn too_short(required: &[&Node], min_length: usize, options: &MatchOptions) -> Node {
    let mut chars = CharSetBuilder::new();
    for node in required {
        if let Some(set) = resolve_leaf(node.kind(), options) {
            chars.insert_set(&set.sample(SAMPLE_LIMIT));
        }
    }
    let chars = chars.build().sample(SAMPLE_LIMIT);
    let longest = min_length - 1;
    if chars.is_empty() || longest == 0 {
        return Node::empty();
    }
    Node::any_of(chars).with_occurs(Bounds::at_most(longest))
}
