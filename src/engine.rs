//! Pattern compilation, generation and complement engine.
//!
//! The engine turns pattern text into a tree of generator nodes and answers
//! the two questions asked of that tree: "give me a matching string of about
//! this length" and "give me a tree for strings that do not match".
//!
//! ## How the parts work together
//!
//! ```text
//! pattern ── Parser::parse        (parser.rs)
//!              - recursive descent over the regex subset
//!              - anchors and lookarounds folded into Node flags
//!                      │
//!                      v
//!            normalize            (normalize.rs)
//!              - pad unanchored ends with `.*`
//!              - afterwards every branch is anchored at both ends
//!                      │
//!          ┌───────────┴────────────┐
//!          v                        v
//!   Emitter::generate         complement        (generate.rs, complement.rs)
//!     - length-directed         - wrong first character
//!       random emission         - too short
//! ```
//!
//! ## Responsibilities by module
//!
//! - `node.rs`: the generator AST, `Anchors` flags, length inference and
//!   rendering back to pattern text.
//! - `parser.rs`: grammar, error reporting and the compile pipeline.
//! - `normalize.rs`: implicit padding for unanchored patterns.
//! - `generate.rs`: bounded random emission.
//! - `complement.rs`: derivation of a non-matching generator.
//! - `metrics.rs`: compile timings for verbose runs.
//!
//! ## Debugging
//!
//! Set `REXGEN_DEBUG=1` to print parse, normalization and generation traces.

#[path = "engine/complement.rs"]
mod complement;
#[path = "engine/generate.rs"]
mod generate;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/node.rs"]
mod node;
#[path = "engine/normalize.rs"]
mod normalize;
#[path = "engine/parser.rs"]
mod parser;

#[cfg(test)]
#[path = "engine/tests.rs"]
mod tests;

pub(crate) use complement::complement;
pub(crate) use generate::Emitter;
pub use metrics::CompileMetrics;
pub(crate) use node::Node;
pub(crate) use parser::compile_pattern;
