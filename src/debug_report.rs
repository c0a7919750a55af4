use rexgen::{CompileDetails, UNBOUNDED};

mod ansi {
    pub const RESET: &str = "\x1b[0m";
    pub const DIM: &str = "\x1b[2m";
    pub const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";

    pub struct Palette {
        enabled: bool,
    }

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Self { enabled }
        }

        pub fn paint(&self, s: impl AsRef<str>, color: &str) -> String {
            if self.enabled { format!("{}{}{}", color, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", BOLD, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            if self.enabled { format!("{}{}{}", DIM, s.as_ref(), RESET) } else { s.as_ref().to_string() }
        }
    }
}

/// Strings produced by one generator.
pub struct Samples {
    /// Normalized source of the generator.
    pub source: String,
    pub values: Vec<Result<String, String>>,
}

pub struct Report<'a> {
    pub pattern: &'a str,
    pub details: &'a CompileDetails,
    /// `None` when only non-matching strings were requested.
    pub matching: Option<Samples>,
    /// `None` when no complement could be derived.
    pub not_matching: Option<Samples>,
}

pub fn print_run(report: &Report<'_>, color: bool) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Pattern: \"{}\"", report.pattern), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Compiled ━━━", ansi::GRAY));
    print_details(report.details, &palette);

    if let Some(samples) = &report.matching {
        println!("\n{}", palette.paint("━━━ Matching ━━━", ansi::GRAY));
        print_samples(samples, &palette);
    }

    println!("\n{}", palette.paint("━━━ Not matching ━━━", ansi::GRAY));
    match &report.not_matching {
        Some(samples) => print_samples(samples, &palette),
        None => {
            println!("{}", palette.dim("  No complement could be derived"));
            println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
            println!("  • The pattern is unanchored and matches the empty string");
            println!("  • Every character can start a match and the pattern has no minimum length");
            println!("\n{}", palette.dim("  Tip: Set REXGEN_DEBUG=1 to see complement derivation details"));
        }
    }

    let metrics = &report.details.metrics;
    println!("\n{}", palette.paint("━━━ Timing ━━━", ansi::GRAY));
    println!(
        "  Total: {}  │  Parse: {}  │  Normalize: {}",
        palette.paint(format!("{:?}", metrics.total), ansi::GREEN),
        palette.paint(format!("{:?}", metrics.parse), ansi::CYAN),
        palette.dim(format!("{:?}", metrics.normalize)),
    );
    println!();
}

fn print_details(details: &CompileDetails, palette: &ansi::Palette) {
    println!("  {} {}", palette.paint("normalized:", ansi::BLUE), palette.bold(&details.normalized));
    let max = if details.length.max() == UNBOUNDED { "∞".to_string() } else { details.length.max().to_string() };
    println!(
        "  {} {}..{}  {} {}  {} {} {}",
        palette.paint("length:", ansi::BLUE),
        palette.paint(details.length.min().to_string(), ansi::YELLOW),
        palette.paint(max, ansi::YELLOW),
        palette.dim("│ anchored:"),
        palette.paint(details.anchored.to_string(), ansi::CYAN),
        palette.dim("│ nodes:"),
        palette.paint(details.metrics.parsed_nodes.to_string(), ansi::CYAN),
        palette.dim(format!("→ {}", details.node_count)),
    );
}

fn print_samples(samples: &Samples, palette: &ansi::Palette) {
    println!("  {} {}", palette.dim("generator:"), palette.paint(&samples.source, ansi::BLUE));
    for (idx, value) in samples.values.iter().enumerate() {
        let line = match value {
            Ok(text) => format!(
                "{} {}",
                palette.bold(palette.paint(format!("{text:?}"), ansi::GREEN)),
                palette.dim(format!("({} chars)", text.chars().count()))
            ),
            Err(err) => palette.paint(format!("✗ {err}"), ansi::RED),
        };
        println!("  {} {}", palette.paint(format!("[{idx}]"), ansi::GRAY), line);
    }
}
