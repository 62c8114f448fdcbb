//! Text processing utilities for message content and thread titles.

use once_cell::sync::Lazy;
use regex::Regex;

use super::thread::DEFAULT_THREAD_TITLE;

/// Titles longer than this many characters get cut
pub const TITLE_MAX_CHARS: usize = 48;

/// Characters kept in front of the ellipsis when a title is cut
const TITLE_KEEP_CHARS: usize = 45;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Collapse every run of whitespace (newlines included) to one space and trim.
pub fn collapse_whitespace(input: &str) -> String {
    WHITESPACE_RUN.replace_all(input, " ").trim().to_string()
}

/// Derive a thread title from the first user message.
///
/// Blank input yields the default title. Titles are counted in characters,
/// not bytes, so multi-byte text is never split mid-character.
pub fn derive_title(input: &str) -> String {
    let collapsed = collapse_whitespace(input);
    if collapsed.is_empty() {
        return DEFAULT_THREAD_TITLE.to_string();
    }

    if collapsed.chars().count() <= TITLE_MAX_CHARS {
        collapsed
    } else {
        let kept: String = collapsed.chars().take(TITLE_KEEP_CHARS).collect();
        format!("{}...", kept.trim_end())
    }
}

/// Whether an error text looks like raw markup (an HTML error page, say)
/// rather than a message meant for people.
pub fn looks_like_markup(text: &str) -> bool {
    text.trim_start().starts_with('<')
}
