use crate::{Bounds, CharSet, Error, Generator, LengthError, MatchOptions, Random, compile_with, not_matching};
use regex::Regex;

/// Printable ASCII with plain spaces, so generated strings stay inside what
/// the reference matcher treats the same way.
fn ascii_options() -> MatchOptions {
    MatchOptions::new(CharSet::range(' ', '~'), " \t".chars().collect(), false).unwrap()
}

fn compile(pattern: &str) -> Generator {
    compile_with(pattern, &ascii_options()).unwrap_or_else(|err| panic!("{pattern:?}: {err}"))
}

const CROSS_CHECKED: &[&str] = &[
    "cat",
    "^cat$",
    "^(cat|dog)$",
    "^[a-f0-9]{4,8}$",
    "^a+b*c?$",
    "x[^a-z]y",
    r"^\d{3}-\d{4}$",
    "^(ab)+$",
    "^[A-Z][a-z]*( [A-Z][a-z]*)*$",
    "^(?:a|bc)d$",
    "a.c",
    "^(^a|b)c",
    "(a|b)$",
    "^.{2,5}$",
    r"^\w+@\w+\.com$",
    "^(foo)?bar$",
    "[^x]+",
    "^x?$",
    "^(?<word>[a-z]{2})-(?<num>[0-9]{1,3})$",
    "^[^aeiou]{3}$",
    "^(a|b)$|^c{2,}$",
    "^$",
    "^(a$|b)",
    r"^[\W\d]+$",
    "^a{0}b$",
];

#[test]
fn generated_strings_match() {
    for (n, pattern) in CROSS_CHECKED.iter().enumerate() {
        let reference = Regex::new(pattern).unwrap();
        let generator = compile(pattern);
        let mut random = Random::seeded(n as u64);
        for _ in 0..40 {
            let value = generator.generate(&mut random, Bounds::ANY).unwrap();
            assert!(reference.is_match(&value), "{pattern:?} generated {value:?}");
        }
    }
}

#[test]
fn not_matching_strings_do_not_match() {
    let mut derived = 0;
    for (n, pattern) in CROSS_CHECKED.iter().enumerate() {
        let reference = Regex::new(pattern).unwrap();
        let Some(negated) = compile(pattern).not_matching() else { continue };
        derived += 1;
        let mut random = Random::seeded(1000 + n as u64);
        for _ in 0..40 {
            let value = negated.generate(&mut random, Bounds::ANY).unwrap();
            assert!(!reference.is_match(&value), "{pattern:?} complement generated matching {value:?}");
        }
    }
    assert!(derived > CROSS_CHECKED.len() / 2, "only {derived} complements derived");
}

#[test]
fn generated_lengths_honor_requested_bounds() {
    let cases: &[(&str, usize, usize)] =
        &[("^[a-z]+$", 3, 7), ("^(cat|horse)$", 5, 5), ("word", 10, 12), ("^a{2,}b*$", 6, 6), ("^(ab)+$", 4, 9)];
    for &(pattern, min, max) in cases {
        let reference = Regex::new(pattern).unwrap();
        let generator = compile(pattern);
        let bounds = Bounds::new(min, max).unwrap();
        let mut random = Random::seeded(17);
        for _ in 0..30 {
            let value = generator.generate(&mut random, bounds).unwrap();
            let len = value.chars().count();
            assert!(bounds.contains(len), "{pattern:?} produced {value:?} outside {bounds}");
            assert!(reference.is_match(&value), "{pattern:?} generated {value:?}");
        }
    }
}

#[test]
fn lengths_out_of_reach_are_errors() {
    let generator = compile("^[0-9]{32,40}$");
    let mut random = Random::seeded(1);
    let err = generator.generate(&mut random, Bounds::new(0, 10).unwrap()).unwrap_err();
    assert_eq!(err, Error::Length(LengthError::BelowMinimum(32)));
    assert_eq!(err.to_string(), "Length cannot be less than 32");
    let err = generator.generate(&mut random, Bounds::at_least(41)).unwrap_err();
    assert_eq!(err.to_string(), "Length cannot be greater than 40");
}

#[test]
fn seeded_generation_is_reproducible() {
    let generator = compile(r"^[a-z]{3}\d+(x|yz)*$");
    let run = |seed| {
        let mut random = Random::seeded(seed);
        (0..10).map(|_| generator.generate(&mut random, Bounds::ANY).unwrap()).collect::<Vec<_>>()
    };
    assert_eq!(run(99), run(99));
    assert_ne!(run(99), run(100));
}

#[test]
fn lookarounds_generate_their_context() {
    let mut random = Random::seeded(4);
    let behind = compile("(?<=ab)c$");
    for _ in 0..10 {
        let value = behind.generate(&mut random, Bounds::ANY).unwrap();
        assert!(value.ends_with("abc"), "{value:?}");
    }
    assert!(compile_with("^(?<=ab)c", &ascii_options()).is_err());
    assert!(compile_with("^((?<=a)b)", &ascii_options()).is_err());
    assert!(compile_with("(a(?=b))$", &ascii_options()).is_err());
    let ahead = compile("^x(?=[0-9])");
    let reference = Regex::new("^x[0-9]").unwrap();
    for _ in 0..20 {
        let value = ahead.generate(&mut random, Bounds::ANY).unwrap();
        assert!(reference.is_match(&value), "{value:?}");
    }
}

#[test]
fn exact_match_forbids_padding() {
    let options = ascii_options().with_exact_match(true);
    let generator = compile_with("a|bc", &options).unwrap();
    assert!(generator.is_anchored());
    assert_eq!((generator.min_length(), generator.max_length()), (1, 2));
    let mut random = Random::seeded(8);
    for _ in 0..20 {
        let value = generator.generate(&mut random, Bounds::ANY).unwrap();
        assert!(value == "a" || value == "bc", "{value:?}");
    }

    for pattern in ["a(?=b)", "(?<=a)b"] {
        assert!(matches!(compile_with(pattern, &options), Err(Error::Parse(_))), "{pattern:?}");
        assert!(compile_with(pattern, &ascii_options()).is_ok(), "{pattern:?}");
    }

    let negated = generator.not_matching().unwrap();
    let reference = Regex::new("^(a|bc)$").unwrap();
    for _ in 0..20 {
        let value = negated.generate(&mut random, Bounds::ANY).unwrap();
        assert!(!reference.is_match(&value), "{value:?}");
    }
}

#[test]
fn complements_that_cannot_exist() {
    let options = ascii_options();
    for pattern in ["", "a*", "x?", "(a|)", "^a*$"] {
        assert!(not_matching(pattern, &options).unwrap().is_none(), "{pattern:?}");
    }
    assert!(matches!(not_matching("a(", &options), Err(Error::Parse(_))));
}

#[test]
fn only_empty_pattern_complement_is_non_empty_strings() {
    let negated = compile("^$").not_matching().unwrap();
    assert_eq!(negated.min_length(), 1);
    let mut random = Random::seeded(3);
    for _ in 0..20 {
        assert!(!negated.generate(&mut random, Bounds::ANY).unwrap().is_empty());
    }
}

#[test]
fn default_universe_produces_latin1() {
    let generator = compile_with("^.{20}$", &MatchOptions::default()).unwrap();
    let mut random = Random::seeded(12);
    for _ in 0..20 {
        let value = generator.generate(&mut random, Bounds::ANY).unwrap();
        assert_eq!(value.chars().count(), 20);
        assert!(value.chars().all(|c| (' '..='~').contains(&c) || ('\u{A0}'..='\u{FF}').contains(&c)));
    }
}

#[test]
fn display_shows_normalized_pattern() {
    assert_eq!(compile("^ab$").to_string(), "^ab$");
    assert_eq!(compile("ab").to_string(), "^.*ab.*$");
    assert_eq!(compile("^a|b$").to_string(), "^a.*$|^.*b$");

    let everything = compile(r"^[\d\D]x$");
    assert_eq!(everything.to_string(), r"^[\s\S]x$");
    assert_eq!(compile(&everything.to_string()), everything);
}
