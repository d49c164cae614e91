use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

fn cid_marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(cid:\d+\)").unwrap())
}

fn run_together_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([a-z])([A-Z])").unwrap())
}

/// Cleans raw extracted resume text: Unicode NFKD, layout artifact
/// characters replaced, `(cid:N)` font markers stripped, run-together
/// words split at lower/upper boundaries, whitespace collapsed to single
/// spaces, trimmed. Total over any input and idempotent.
pub fn clean_text(text: &str) -> String {
    let decomposed: String = text.nfkd().collect();
    let replaced = decomposed
        .replace('\u{2013}', "-")
        .replace('\u{2022}', "-")
        .replace('\u{a7}', "");
    let stripped = cid_marker_regex().replace_all(&replaced, "");
    let separated = run_together_regex().replace_all(&stripped, "$1 $2");
    separated.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits raw extracted text into cleaned segments, one per source line.
/// Lines whose cleaned form is `min_chars` characters or shorter are
/// dropped. Splitting happens before any whitespace collapse so the line
/// structure of the document survives.
pub fn segment_lines(raw: &str, min_chars: usize) -> Vec<String> {
    raw.lines()
        .map(clean_text)
        .filter(|line| line.chars().count() > min_chars)
        .collect()
}
