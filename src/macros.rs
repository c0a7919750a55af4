/// Print a `[tag] message` line to stderr when `REXGEN_DEBUG` is set.
///
/// ```text
/// trace!("normalize", "pad_start node={}", node);
/// // [normalize] pad_start node=cat
/// ```
macro_rules! trace {
    ($tag:literal, $($arg:tt)*) => {
        if *$crate::DEBUG {
            eprintln!(concat!("[", $tag, "] {}"), format_args!($($arg)*));
        }
    };
}
