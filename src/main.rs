mod debug_report;

use debug_report::{Report, Samples};
use rexgen::{Bounds, MatchOptions, Random, UNBOUNDED, compile_verbose_with};
use std::io::{self, IsTerminal};

const DEFAULT_COUNT: usize = 5;

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let options = MatchOptions::default().with_exact_match(config.exact);
    let compiled = match compile_verbose_with(&config.pattern, &options) {
        Ok(compiled) => compiled,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };

    let mut random = match config.seed {
        Some(seed) => Random::seeded(seed),
        None => Random::from_entropy(),
    };
    let generate = |generator: &rexgen::Generator, random: &mut Random| Samples {
        source: generator.to_string(),
        values: (0..config.count)
            .map(|_| generator.generate(random, config.bounds).map_err(|e| e.to_string()))
            .collect(),
    };

    let matching = (!config.not_matching).then(|| generate(&compiled.generator, &mut random));
    let not_matching = compiled.generator.not_matching().map(|negated| generate(&negated, &mut random));

    let report = Report { pattern: &compiled.pattern, details: &compiled.details, matching, not_matching };
    debug_report::print_run(&report, config.color);
}

struct CliConfig {
    pattern: String,
    count: usize,
    bounds: Bounds,
    seed: Option<u64>,
    exact: bool,
    not_matching: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut pattern: Option<String> = None;
    let mut count = DEFAULT_COUNT;
    let mut min = 0;
    let mut max = UNBOUNDED;
    let mut seed = None;
    let mut exact = false;
    let mut not_matching = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
            _ => (arg.clone(), None),
        };
        let mut value = |name: &str| -> Result<String, String> {
            match &inline {
                Some(value) => Ok(value.clone()),
                None => args.next().ok_or_else(|| format!("error: {name} expects a value")),
            }
        };
        match flag.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("rexgen {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--exact" => exact = true,
            "--not-matching" => not_matching = true,
            "-n" | "--count" => count = parse_number(&flag, &value(&flag)?)?,
            "--min" => min = parse_number(&flag, &value(&flag)?)?,
            "--max" => max = parse_number(&flag, &value(&flag)?)?,
            "--seed" => seed = Some(parse_number(&flag, &value(&flag)?)?),
            "--" => {
                if let Some(rest) = args.next() {
                    set_pattern(&mut pattern, rest)?;
                }
                if args.next().is_some() {
                    return Err("error: pattern provided multiple times".to_string());
                }
                break;
            }
            _ if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => set_pattern(&mut pattern, arg)?,
        }
    }

    let Some(pattern) = pattern else {
        return Err(format!("error: no pattern provided\n\n{}", help_text()));
    };
    let bounds = Bounds::new(min, max).map_err(|err| format!("error: {err}"))?;

    Ok(CliConfig { pattern, count, bounds, seed, exact, not_matching, color })
}

fn set_pattern(slot: &mut Option<String>, value: String) -> Result<(), String> {
    if slot.is_some() {
        return Err("error: pattern provided multiple times".to_string());
    }
    *slot = Some(value);
    Ok(())
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value.parse().map_err(|_| format!("error: invalid {flag} '{value}' (expected a non-negative integer)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "rexgen {version}

Generate random strings that match (or do not match) a regular expression.

Usage:
  rexgen [OPTIONS] [--] <pattern>

Options:
  -n, --count <n>            Number of strings to generate. Default: {default_count}
  --min <n>                  Minimum string length. Default: 0
  --max <n>                  Maximum string length. Default: unbounded
  --seed <n>                 Seed the random source for reproducible output.
  --exact                    Treat the pattern as anchored at both ends.
  --not-matching             Only generate strings that do not match.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  Success.
  1  The pattern could not be compiled.
  2  Invalid arguments or missing pattern.
",
        version = env!("CARGO_PKG_VERSION"),
        default_count = DEFAULT_COUNT
    )
}
