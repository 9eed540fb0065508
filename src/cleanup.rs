//! Character cleanup applied to text before it is written into a PDF.
//!
//! The PDF fonts only cover a narrow character set, so typographic
//! punctuation is mapped to its ASCII counterpart and every other run of
//! non-ASCII characters collapses into a single space.

use std::sync::OnceLock;

use regex::Regex;

const REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2014}', "-"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2019}', "'"),
];

fn non_ascii_run() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^\x00-\x7F]+").expect("static pattern is valid"))
}

/// Returns `text` reduced to ASCII for PDF output.
///
/// Applying the function to its own output returns the output unchanged.
pub fn clean_text(text: &str) -> String {
    let mut replaced = String::with_capacity(text.len());
    for c in text.chars() {
        match REPLACEMENTS.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => replaced.push_str(to),
            None => replaced.push(c),
        }
    }

    non_ascii_run().replace_all(&replaced, " ").into_owned()
}
