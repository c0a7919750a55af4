//! Compile metrics.
//!
//! Collected on every compile; surfaced through `compile_verbose_with` and the
//! CLI report. Node counts make it easy to see how much padding
//! normalization added.

use std::time::Duration;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompileMetrics {
    /// Total elapsed time for the compile.
    pub total: Duration,
    /// Time spent parsing pattern text into a tree.
    pub parse: Duration,
    /// Time spent padding the tree.
    pub normalize: Duration,
    /// Nodes in the tree straight out of the parser.
    pub parsed_nodes: usize,
    /// Nodes after normalization.
    pub normalized_nodes: usize,
}
