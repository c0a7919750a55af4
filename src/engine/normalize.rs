//! Implicit padding for unanchored patterns.
//!
//! A regex that is not anchored matches anywhere in its input, so `cat` really
//! describes `.*cat.*`. Normalization makes that explicit: after it runs,
//! every branch of the tree is anchored at both ends, and generation can
//! treat the tree as a description of the complete string.
//!
//! ```text
//! cat         ->  ^.*cat.*$
//! ^a|b        ->  ^a.*$|^.*b$         (per member)
//! (^a)?b      ->  ^(?:^a|.*)b.*$      (optional partial anchor)
//! ```

use super::node::{Anchors, Node, NodeKind};
use crate::Error;
use crate::bounds::Bounds;
use crate::options::MatchOptions;

#[derive(Debug, Clone, Copy)]
enum Side {
    Start,
    End,
}

impl Side {
    fn some(self) -> Anchors {
        match self {
            Side::Start => Anchors::START,
            Side::End => Anchors::END,
        }
    }

    fn all(self) -> Anchors {
        match self {
            Side::Start => Anchors::ALL_START,
            Side::End => Anchors::ALL_END,
        }
    }

    fn marks(self) -> Anchors {
        match self {
            Side::Start => Anchors::STARTS,
            Side::End => Anchors::ENDS,
        }
    }
}

/// Pad both ends of `root`, or mark it anchored when `exact_match` is set.
pub(crate) fn normalize(root: Node, options: &MatchOptions) -> Result<Node, Error> {
    if options.exact_match() {
        return Ok(root.anchored(Anchors::BOTH));
    }
    let padded = pad(pad(root, Side::Start)?, Side::End)?;
    Ok(padded)
}

fn pad(node: Node, side: Side) -> Result<Node, Error> {
    let anchors = node.anchors();
    if anchors.contains(side.all()) {
        return Ok(node);
    }
    if !anchors.contains(side.some()) {
        let parts = match side {
            Side::Start => vec![Node::padding(), node],
            Side::End => vec![node, Node::padding()],
        };
        return Ok(Node::sequence(parts).anchored(side.marks()));
    }

    trace!("normalize", "partial {side:?} anchor on {}", node.describe());
    let occurs = node.occurs();
    if occurs == Bounds::ONCE {
        let kind = match node.kind() {
            NodeKind::Alternative(members) => {
                let members = members.iter().cloned().map(|member| pad(member, side)).collect::<Result<_, _>>()?;
                NodeKind::Alternative(members)
            }
            NodeKind::Sequence(children) if !children.is_empty() => {
                let mut children = children.clone();
                let idx = match side {
                    Side::Start => 0,
                    Side::End => children.len() - 1,
                };
                let edge = children.remove(idx);
                children.insert(idx, pad(edge, side)?);
                NodeKind::Sequence(children)
            }
            _ => {
                return Err(Error::Internal(format!("leaf {} is partially anchored", node.describe())));
            }
        };
        return Ok(node.rebuilt(kind));
    }

    if occurs.max() == 1 {
        // Present: pad the single occurrence. Absent: padding alone.
        let trailing = node.own_anchors() & (Anchors::ENDS | Anchors::LOOKAHEAD);
        let once = Node::new(node.kind().clone()).anchored(node.own_anchors());
        let present = pad(once, side)?.anchored(trailing);
        let absent = Node::padding().anchored(side.marks() | trailing);
        return Ok(Node::alternative(vec![present, absent]));
    }

    Err(Error::Internal(format!("partially anchored {} repeats more than once", node.describe())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::UNBOUNDED;
    use crate::engine::parser::Parser;

    fn normalized(pattern: &str) -> Node {
        let options = MatchOptions::default();
        let parsed = Parser::new(pattern, &options).parse().unwrap();
        normalize(parsed, &options).unwrap()
    }

    fn fully_anchored(node: &Node) -> bool {
        node.anchors().contains(Anchors::ALL_START | Anchors::ALL_END)
    }

    #[test]
    fn unanchored_pattern_gains_padding() {
        let node = normalized("cat");
        assert!(fully_anchored(&node));
        assert_eq!(node.to_string(), "^.*cat.*$");
        assert_eq!((node.min_length(), node.max_length()), (3, UNBOUNDED));
    }

    #[test]
    fn anchored_pattern_is_unchanged() {
        let options = MatchOptions::default();
        let parsed = Parser::new("^(a|b)c$", &options).parse().unwrap();
        let node = normalize(parsed.clone(), &options).unwrap();
        assert_eq!(node, parsed);
    }

    #[test]
    fn partially_anchored_alternative_is_padded_per_member() {
        let node = normalized("^a|b");
        assert!(fully_anchored(&node));
        assert_eq!(node.min_length(), 1);
        let NodeKind::Sequence(parts) = node.kind() else { panic!("expected sequence, got {node}") };
        let NodeKind::Alternative(members) = parts[0].kind() else { panic!("expected alternative") };
        assert_eq!(members[0].max_length(), 1);
        assert!(members[1].length().is_unbounded());
    }

    #[test]
    fn optional_partial_anchor_splits_presence() {
        let node = normalized("(^a|b)?c");
        assert!(fully_anchored(&node));
        assert_eq!(node.min_length(), 1);

        let trailing = normalized("c(a$|b)?");
        assert!(fully_anchored(&trailing));
        assert_eq!(trailing.min_length(), 1);
    }

    #[test]
    fn exact_match_skips_padding() {
        let options = MatchOptions::default().with_exact_match(true);
        let parsed = Parser::new("a|bc", &options).parse().unwrap();
        let node = normalize(parsed, &options).unwrap();
        assert!(fully_anchored(&node));
        assert_eq!((node.min_length(), node.max_length()), (1, 2));
    }
}
