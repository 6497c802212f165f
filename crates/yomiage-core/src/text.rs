//! Text normalization applied before a message is read aloud.
//!
//! These are pure functions: the handler layer runs them on the rendered
//! message content and the speech adapter runs [`sanitize`] once more on the
//! text it is asked to synthesize.

use std::sync::LazyLock;

use regex::Regex;

/// Suffix appended when a message is cut short ("the rest is omitted").
pub const TRUNCATION_SUFFIX: &str = " 以下略";

/// Whole message wrapped in parentheses: an aside that is not read.
static ASIDE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[(（)].*[）)]$"));

/// Trailing run of w's, Japanese shorthand for laughter.
static LAUGHTER: LazyLock<Regex> = LazyLock::new(|| compile(r"[wWｗＷ]+$"));

/// Scheme URLs, bare domains, and IPv4 addresses.
///
/// Bare domains are matched relaxed: dot-separated labels ending in an
/// alphabetic label of two or more letters (or a punycode `xn--` label).
static URL: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r#"(?ix)
        [a-z][a-z0-9+.\-]*://[^\s<>"]+
        | \b(?:[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?\.)+
          (?:[a-z]{2,63}|xn--[a-z0-9\-]+)
          \b(?::\d+)?(?:/[^\s<>"]*)?
        | \b\d{1,3}(?:\.\d{1,3}){3}\b(?::\d+)?(?:/[^\s<>"]*)?
        "#,
    )
});

// Patterns are literals; a failure here is caught by the unit tests.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static text pattern must compile")
}

fn is_japanese(lang: &str) -> bool {
    lang == "ja" || lang.starts_with("ja-")
}

/// Make chat text easier to read aloud.
///
/// 1. Trim surrounding whitespace.
/// 2. A message entirely in parentheses becomes empty.
/// 3. For Japanese, a trailing run of `w` becomes ` くさ`.
/// 4. URLs become ` URL `.
/// 5. Whitespace runs collapse to a single space.
#[must_use]
pub fn sanitize(content: &str, lang: &str) -> String {
    let trimmed = content.trim();
    if ASIDE.is_match(trimmed) {
        return String::new();
    }

    let laughed = if is_japanese(lang) {
        LAUGHTER.replace_all(trimmed, " くさ")
    } else {
        trimmed.into()
    };
    let without_urls = URL.replace_all(&laughed, " URL ");

    without_urls.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut text to at most `max_chars` characters, marking the cut.
#[must_use]
pub fn truncate_for_speech(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{TRUNCATION_SUFFIX}", &text[..byte_idx]),
        None => text.to_string(),
    }
}
