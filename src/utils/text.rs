//! Text cleanup applied to multi-valued fields before they are written.

use regex::Regex;
use std::sync::OnceLock;

/// Separator used when flattening multi-valued fields into one column.
pub const FIELD_SEPARATOR: &str = ";";

static LINE_BREAK: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();

fn line_break() -> &'static Regex {
    // Any Unicode line-break sequence; CRLF is matched as a single break.
    LINE_BREAK.get_or_init(|| {
        Regex::new(r"\r\n|[\n\x0B\x0C\r\u{0085}\u{2028}\u{2029}]").expect("valid line break regex")
    })
}

fn whitespace_run() -> &'static Regex {
    // ASCII whitespace only; no-break and other Unicode spaces are kept.
    WHITESPACE_RUN
        .get_or_init(|| Regex::new(r"[ \t\n\x0B\x0C\r]+").expect("valid whitespace regex"))
}

/// Replace every line break with a space, then collapse whitespace runs into
/// a single space.
///
/// Leading and trailing whitespace is collapsed but not trimmed, so an author
/// with no given name stays `" Family"`. The transform is idempotent.
pub fn normalize_whitespace(value: &str) -> String {
    let unbroken = line_break().replace_all(value, " ");
    whitespace_run().replace_all(&unbroken, " ").into_owned()
}

/// Join values with [`FIELD_SEPARATOR`] and normalize the result.
pub fn join_normalized<S: AsRef<str>>(values: &[S]) -> String {
    let joined = values
        .iter()
        .map(|v| v.as_ref())
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR);
    normalize_whitespace(&joined)
}
