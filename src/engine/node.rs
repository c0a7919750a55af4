//! Generator AST.
//!
//! A compiled pattern is a tree of [`Node`]s. Leaves are character classes;
//! composites are [`NodeKind::Sequence`] (concatenation) and
//! [`NodeKind::Alternative`] (union). Every node carries:
//!
//! - an occurrence range (`occurs`, `[1,1]` unless a quantifier set it),
//! - [`Anchors`] flags,
//! - optional source text from the pattern, for traces and error messages.
//!
//! Nodes are finished in one go by the parser: quantifier and anchor flags are
//! applied right after construction and never touched again. Algorithms that
//! need a different tree (normalization, complement derivation) build a new one.
//!
//! ## Anchors
//!
//! ```text
//! START / END          some reachable branch is anchored at that end
//! ALL_START / ALL_END  every branch is anchored at that end
//! ```
//!
//! `(^a|b)` has `START` but not `ALL_START`; `(^a|^b)` and `^(a|b)` have both.
//! A node that may occur zero times loses its `ALL_*` flags, since the branch
//! where it is absent is not anchored.
//!
//! `LOOKBEHIND` / `LOOKAHEAD` mark subtrees whose leading (trailing) part came
//! from a lookaround. They propagate like `START` / `END` and restrict where
//! the subtree may appear in the same way.

use std::fmt;

use crate::bounds::Bounds;
use crate::charset::{CharSet, push_escaped, render_ranges};

bitflags::bitflags! {
    /// Anchoring state of a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Anchors: u8 {
        const START     = 1 << 0;
        const END       = 1 << 1;
        const ALL_START = 1 << 2;
        const ALL_END   = 1 << 3;
        const LOOKBEHIND = 1 << 4;
        const LOOKAHEAD  = 1 << 5;
    }
}

impl Anchors {
    /// Flags set by a `^` in front of a term.
    pub const STARTS: Anchors = Anchors::START.union(Anchors::ALL_START);
    /// Flags set by a `$` after a term.
    pub const ENDS: Anchors = Anchors::END.union(Anchors::ALL_END);
    pub const BOTH: Anchors = Anchors::STARTS.union(Anchors::ENDS);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeKind {
    /// One character out of an explicit set.
    AnyOf(CharSet),
    /// One character of the universe that is not in the set.
    NoneOf(CharSet),
    /// One character of the universe that is not a line terminator.
    AnyPrintable,
    Sequence(Vec<Node>),
    Alternative(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    kind: NodeKind,
    occurs: Bounds,
    anchors: Anchors,
    /// Length of a single occurrence.
    inner: Bounds,
    source: Option<Box<str>>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        let inner = inner_length(&kind);
        let anchors = derived_anchors(&kind);
        Node { kind, occurs: Bounds::ONCE, anchors, inner, source: None }
    }

    pub fn any_of(set: CharSet) -> Self {
        Node::new(NodeKind::AnyOf(set))
    }

    pub fn literal(ch: char) -> Self {
        Node::any_of(std::iter::once(ch).collect())
    }

    pub fn none_of(set: CharSet) -> Self {
        Node::new(NodeKind::NoneOf(set))
    }

    pub fn any_printable() -> Self {
        Node::new(NodeKind::AnyPrintable)
    }

    /// `.*`, the implicit padding around unanchored patterns.
    pub fn padding() -> Self {
        Node::any_printable().with_occurs(Bounds::ANY)
    }

    pub fn sequence(children: Vec<Node>) -> Self {
        Node::new(NodeKind::Sequence(children))
    }

    /// Empty match, used for bare anchors (`^$`) and empty alternatives.
    pub fn empty() -> Self {
        Node::sequence(Vec::new())
    }

    pub fn alternative(members: Vec<Node>) -> Self {
        Node::new(NodeKind::Alternative(members))
    }

    /// Replace the occurrence range. A possibly-absent node is never anchored
    /// across all branches.
    pub fn with_occurs(mut self, occurs: Bounds) -> Self {
        self.occurs = occurs;
        if occurs.min() == 0 {
            self.anchors.remove(Anchors::ALL_START | Anchors::ALL_END);
        }
        self
    }

    /// Add anchor flags (`Anchors::STARTS` / `Anchors::ENDS`).
    pub fn anchored(mut self, anchors: Anchors) -> Self {
        self.anchors |= anchors;
        self
    }

    pub fn with_source(mut self, source: impl Into<Box<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn occurs(&self) -> Bounds {
        self.occurs
    }

    pub fn anchors(&self) -> Anchors {
        self.anchors
    }

    /// Source text for messages: the original text when known, else the
    /// synthesized form.
    pub fn describe(&self) -> String {
        match &self.source {
            Some(source) => source.to_string(),
            None => self.to_string(),
        }
    }

    /// Length of one occurrence.
    pub fn inner_length(&self) -> Bounds {
        self.inner
    }

    /// Feasible length of all occurrences together.
    pub fn length(&self) -> Bounds {
        self.occurs.product(self.inner)
    }

    pub fn min_length(&self) -> usize {
        self.length().min()
    }

    pub fn max_length(&self) -> usize {
        self.length().max()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::AnyOf(_) | NodeKind::NoneOf(_) | NodeKind::AnyPrintable)
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Sequence(children) | NodeKind::Alternative(children) => children,
            _ => &[],
        }
    }

    /// Anchors set on this node itself rather than inherited from children.
    pub fn own_anchors(&self) -> Anchors {
        self.anchors - derived_anchors(&self.kind)
    }

    /// Rebuild this node around a new kind, keeping occurrences, own anchors
    /// and source.
    pub fn rebuilt(&self, kind: NodeKind) -> Node {
        let mut node = Node::new(kind).with_occurs(self.occurs).anchored(self.own_anchors());
        node.source = self.source.clone();
        node
    }

    /// Number of nodes in this subtree.
    pub fn count(&self) -> usize {
        1 + self.children().iter().map(Node::count).sum::<usize>()
    }
}

fn inner_length(kind: &NodeKind) -> Bounds {
    match kind {
        NodeKind::AnyOf(_) | NodeKind::NoneOf(_) | NodeKind::AnyPrintable => Bounds::ONCE,
        NodeKind::Sequence(children) => children.iter().fold(Bounds::EMPTY, |acc, child| acc.sum(child.length())),
        NodeKind::Alternative(members) => {
            let min = members.iter().map(Node::min_length).min().unwrap_or(0);
            let max = members.iter().map(Node::max_length).max().unwrap_or(0);
            Bounds::new(min, max).unwrap_or(Bounds::EMPTY)
        }
    }
}

fn derived_anchors(kind: &NodeKind) -> Anchors {
    match kind {
        NodeKind::AnyOf(_) | NodeKind::NoneOf(_) | NodeKind::AnyPrintable => Anchors::empty(),
        NodeKind::Sequence(children) => {
            let mut anchors = Anchors::empty();
            if let Some(first) = children.first() {
                anchors |= first.anchors & (Anchors::STARTS | Anchors::LOOKBEHIND);
            }
            if let Some(last) = children.last() {
                anchors |= last.anchors & (Anchors::ENDS | Anchors::LOOKAHEAD);
            }
            anchors
        }
        NodeKind::Alternative(members) => {
            let mut anchors = Anchors::empty();
            for member in members {
                anchors |= member.anchors & (Anchors::LOOKBEHIND | Anchors::LOOKAHEAD);
            }
            for (some, all) in [(Anchors::START, Anchors::ALL_START), (Anchors::END, Anchors::ALL_END)] {
                if members.iter().any(|m| m.anchors.contains(some)) {
                    anchors |= some;
                }
                if !members.is_empty() && members.iter().all(|m| m.anchors.contains(all)) {
                    anchors |= all;
                }
            }
            anchors
        }
    }
}

// --- Synthesized source text ---------------------------------------------------

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_node(self, &mut out, false);
        f.write_str(&out)
    }
}

/// Render `node` back into pattern syntax.
///
/// ```text
/// Sequence[^ AnyOf{a}, Alternative[b, c]{2}]  ->  ^a(?:b|c){2}
/// ```
fn write_node(node: &Node, out: &mut String, in_sequence: bool) {
    let own = node.own_anchors();
    let quantified = node.occurs != Bounds::ONCE;
    let grouped = match &node.kind {
        NodeKind::Alternative(_) => in_sequence || quantified || own.intersects(Anchors::BOTH),
        NodeKind::Sequence(children) => quantified && !(children.len() == 1 && children[0].is_plain_leaf()),
        _ => false,
    };

    if own.contains(Anchors::START) {
        out.push('^');
    }
    if grouped {
        out.push_str("(?:");
    }
    match &node.kind {
        NodeKind::AnyOf(set) if set.len() == 1 => {
            if let Some(ch) = set.get(0) {
                push_escaped(out, ch, false);
            }
        }
        NodeKind::AnyOf(set) => {
            out.push('[');
            out.push_str(&render_ranges(set));
            out.push(']');
        }
        NodeKind::NoneOf(set) if set.is_empty() => out.push_str("[\\s\\S]"),
        NodeKind::NoneOf(set) => {
            out.push_str("[^");
            out.push_str(&render_ranges(set));
            out.push(']');
        }
        NodeKind::AnyPrintable => out.push('.'),
        NodeKind::Sequence(children) => {
            for child in children {
                write_node(child, out, true);
            }
        }
        NodeKind::Alternative(members) => {
            for (idx, member) in members.iter().enumerate() {
                if idx > 0 {
                    out.push('|');
                }
                write_node(member, out, false);
            }
        }
    }
    if grouped {
        out.push(')');
    }
    if quantified {
        write_quantifier(node.occurs, out);
    }
    if own.contains(Anchors::END) {
        out.push('$');
    }
}

impl Node {
    fn is_plain_leaf(&self) -> bool {
        self.is_leaf() && self.occurs == Bounds::ONCE && self.own_anchors().is_empty()
    }
}

fn write_quantifier(occurs: Bounds, out: &mut String) {
    let text = match (occurs.min(), occurs.is_unbounded()) {
        (0, true) => "*".to_string(),
        (1, true) => "+".to_string(),
        (min, true) => format!("{{{min},}}"),
        (0, false) if occurs.max() == 1 => "?".to_string(),
        (min, false) if min == occurs.max() => format!("{{{min}}}"),
        (min, false) => format!("{{{min},{}}}", occurs.max()),
    };
    out.push_str(&text);
}
