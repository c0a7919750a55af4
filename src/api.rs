use crate::Error;
use crate::bounds::Bounds;
use crate::engine::{self, CompileMetrics, Emitter, Node};
use crate::options::MatchOptions;
use crate::random::RandomSource;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A compiled pattern, ready to produce random matching strings.
///
/// The tree is normalized: unanchored ends carry explicit `.*` padding. The
/// generator's [`Display`](fmt::Display) shows that normalized form, and
/// generators compare by it.
#[derive(Debug, Clone)]
pub struct Generator {
    root: Node,
    options: Arc<MatchOptions>,
    anchored: bool,
}

impl Generator {
    fn new(root: Node, options: Arc<MatchOptions>, anchored: bool) -> Self {
        Generator { root, options, anchored }
    }

    /// Shortest string this generator can produce.
    pub fn min_length(&self) -> usize {
        self.root.min_length()
    }

    /// Longest string this generator can produce, or [`crate::UNBOUNDED`].
    pub fn max_length(&self) -> usize {
        self.root.max_length()
    }

    pub fn length(&self) -> Bounds {
        self.root.length()
    }

    /// Whether the source pattern was anchored at both ends in every branch
    /// (or compiled with `exact_match`).
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// Random string of a length inside `bounds`.
    ///
    /// # Example
    /// ```
    /// use rexgen::{Bounds, Random, compile};
    ///
    /// let generator = compile("^(ab)+$").unwrap();
    /// let mut random = Random::seeded(7);
    /// let value = generator.generate(&mut random, Bounds::new(4, 6).unwrap()).unwrap();
    /// assert!(value == "abab" || value == "ababab");
    /// ```
    pub fn generate<R: RandomSource>(&self, random: &mut R, bounds: Bounds) -> Result<String, Error> {
        Emitter::new(&self.options, random).generate(&self.root, bounds)
    }

    /// Generator for strings this one's pattern does not match, when one can
    /// be derived.
    pub fn not_matching(&self) -> Option<Generator> {
        let root = engine::complement(&self.root, self.anchored, &self.options)?;
        Some(Generator::new(root, Arc::clone(&self.options), true))
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

impl PartialEq for Generator {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Generator {}

impl PartialOrd for Generator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Generator {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

/// Additional details returned by [`compile_verbose_with`].
#[derive(Debug, Clone)]
pub struct CompileDetails {
    /// Normalized pattern text.
    pub normalized: String,
    pub length: Bounds,
    pub anchored: bool,
    /// Nodes in the normalized tree.
    pub node_count: usize,
    pub metrics: CompileMetrics,
}

/// Result from [`compile_verbose_with`].
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub pattern: String,
    pub generator: Generator,
    pub details: CompileDetails,
}

/// Compile `pattern` with default [`MatchOptions`].
///
/// # Example
/// ```
/// use rexgen::compile;
///
/// let generator = compile("cat").unwrap();
/// assert_eq!(generator.to_string(), "^.*cat.*$");
/// assert!(!generator.is_anchored());
/// ```
pub fn compile(pattern: &str) -> Result<Generator, Error> {
    compile_with(pattern, &MatchOptions::default())
}

/// Compile `pattern` with the provided `options`.
pub fn compile_with(pattern: &str, options: &MatchOptions) -> Result<Generator, Error> {
    compile_verbose_with(pattern, options).map(|result| result.generator)
}

/// Compile `pattern` and return timings and a summary of the compiled tree.
pub fn compile_verbose_with(pattern: &str, options: &MatchOptions) -> Result<CompileResult, Error> {
    let compiled = engine::compile_pattern(pattern, options)?;
    let details = CompileDetails {
        normalized: compiled.root.to_string(),
        length: compiled.root.length(),
        anchored: compiled.anchored,
        node_count: compiled.root.count(),
        metrics: compiled.metrics,
    };
    let generator = Generator::new(compiled.root, Arc::new(options.clone()), compiled.anchored);
    Ok(CompileResult { pattern: pattern.to_string(), generator, details })
}

/// Generator for strings that `pattern` does not match.
///
/// Parse errors propagate; `Ok(None)` means no complement could be derived
/// (for instance, every string matches an unanchored `a*`).
///
/// # Example
/// ```
/// use rexgen::{MatchOptions, not_matching};
///
/// assert!(not_matching("a*", &MatchOptions::default()).unwrap().is_none());
/// assert!(not_matching("^a$", &MatchOptions::default()).unwrap().is_some());
/// ```
pub fn not_matching(pattern: &str, options: &MatchOptions) -> Result<Option<Generator>, Error> {
    Ok(compile_with(pattern, options)?.not_matching())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::UNBOUNDED;
    use crate::random::Random;
    use crate::{ParseError, ParseErrorKind};

    #[test]
    fn compile_reports_lengths() {
        let generator = compile("^a{2,4}b?$").unwrap();
        assert_eq!((generator.min_length(), generator.max_length()), (2, 5));
        assert!(generator.is_anchored());

        let padded = compile("ab").unwrap();
        assert_eq!((padded.min_length(), padded.max_length()), (2, UNBOUNDED));
    }

    #[test]
    fn compile_propagates_parse_errors() {
        let err = compile("a(b").unwrap_err();
        let Error::Parse(ParseError { kind, position, .. }) = &err else { panic!("unexpected {err:?}") };
        assert_eq!(*kind, ParseErrorKind::Syntax);
        assert_eq!(*position, 1);
        assert_eq!(err.to_string(), "Unterminated group at position 1");
    }

    #[test]
    fn verbose_compile_fills_details() {
        let result = compile_verbose_with("^[0-9]{3}$", &MatchOptions::default()).unwrap();
        assert_eq!(result.pattern, "^[0-9]{3}$");
        assert_eq!(result.details.normalized, "^[0-9]{3}$");
        assert_eq!(result.details.length, Bounds::exactly(3));
        assert!(result.details.anchored);
        assert_eq!(result.details.node_count, 1);
        assert!(result.details.metrics.total >= result.details.metrics.parse);
    }

    #[test]
    fn generators_order_by_source_text() {
        let a = compile("^a$").unwrap();
        let b = compile("^b$").unwrap();
        assert!(a < b);
        assert_eq!(a, compile("^a$").unwrap());
        assert_ne!(a, b);
    }

    #[test]
    fn generate_and_complement_through_the_api() {
        let options = MatchOptions::default();
        let generator = compile_with("^(yes|no)$", &options).unwrap();
        let negated = generator.not_matching().unwrap();
        assert!(negated.is_anchored());
        let mut random = Random::seeded(5);
        for _ in 0..50 {
            let good = generator.generate(&mut random, Bounds::ANY).unwrap();
            assert!(good == "yes" || good == "no");
            let bad = negated.generate(&mut random, Bounds::ANY).unwrap();
            assert!(bad != "yes" && bad != "no", "{bad:?}");
        }
        assert_eq!(not_matching("^(yes|no)$", &options).unwrap(), Some(negated));
    }

    #[test]
    fn generator_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Generator>();
    }
}
