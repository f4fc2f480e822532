//! Description extraction and normalization.
//!
//! The wiki wraps item flavour text in a blockquote whose paragraph holds the
//! text between `[` and `]`. Normalization runs as a fixed sequence of passes:
//! 1. keep the bracketed span
//! 2. drop newline escapes and backslashes, straighten curly quotes
//! 3. collapse `''` into `'`
//! 4. strip a quote kind entirely when its count is odd
//! 5. reject disallowed characters and adjacent quote pairs

use wikiloot_crawler::{ItemPage, descendants, text_of};

use crate::{BLOCKQUOTE_CLASS, BULLET};

/// Adjacent quote pairs that indicate a bad extraction boundary.
const DUPLICATE_QUOTES: [&str; 4] = ["''", "\"\"", "'\"", "\"'"];

/// Either a usable description or the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionResult {
    Valid(String),
    Invalid(String),
}

impl DescriptionResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, DescriptionResult::Valid(_))
    }

    /// The description text, if valid.
    pub fn text(&self) -> Option<&str> {
        match self {
            DescriptionResult::Valid(text) => Some(text),
            DescriptionResult::Invalid(_) => None,
        }
    }

    /// The rejection reason, if invalid.
    pub fn reason(&self) -> Option<&str> {
        match self {
            DescriptionResult::Valid(_) => None,
            DescriptionResult::Invalid(reason) => Some(reason),
        }
    }
}

/// Extract the description for the 1-based `variation`.
///
/// With `allow_empty`, a page that has no blockquote for the variation yields
/// an empty description instead of an error.
pub fn extract_description(page: &ItemPage, variation: u32, allow_empty: bool) -> DescriptionResult {
    let blocks = page.find("div", BLOCKQUOTE_CLASS);
    let block = (variation as usize)
        .checked_sub(1)
        .and_then(|index| blocks.get(index));

    let raw = match block {
        Some(block) => {
            let paragraphs = descendants(block, "p");
            let text = paragraphs
                .last()
                .map_or_else(|| text_of(block), text_of);
            let tail = text.rsplit_once(BULLET).map(|(_, tail)| tail.to_string());
            tail.unwrap_or(text)
        }
        None if allow_empty => String::new(),
        None => {
            return DescriptionResult::Invalid(format!(
                "Invalid Description: No description for the given variation: {variation}"
            ));
        }
    };

    normalize_description(&raw)
}

/// Run the normalization and validation passes over raw blockquote text.
pub fn normalize_description(raw: &str) -> DescriptionResult {
    let text = bracketed(raw)
        .replace("\\n", "")
        .replace(['\r', '\n'], " ");

    let text: String = text
        .chars()
        .filter(|c| *c != '\\')
        .map(straighten_quote)
        .collect();

    let text = text.replace("''", "'");
    let text = drop_unbalanced(text, '\'');
    let text = drop_unbalanced(text, '"');

    if let Some(c) = text.chars().find(|c| is_disallowed(*c)) {
        return DescriptionResult::Invalid(format!(
            "Invalid Description: Invalid character in description: {c}"
        ));
    }

    if DUPLICATE_QUOTES.iter().any(|pair| text.contains(pair)) {
        return DescriptionResult::Invalid(format!("Invalid Description: Duplicate quotes: {text}"));
    }

    DescriptionResult::Valid(text.trim().to_string())
}

/// The text after the first `[` and before the last `]`; either delimiter may be absent.
fn bracketed(raw: &str) -> &str {
    let start = raw.split_once('[').map_or(raw, |(_, rest)| rest);
    start.rsplit_once(']').map_or(start, |(inner, _)| inner)
}

fn straighten_quote(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
        other => other,
    }
}

/// Remove every `quote` when it occurs an odd number of times.
fn drop_unbalanced(text: String, quote: char) -> String {
    if text.matches(quote).count() % 2 == 0 {
        text
    } else {
        text.replace(quote, "")
    }
}

fn is_disallowed(c: char) -> bool {
    c == BULLET || c == '[' || c == ']' || (c.is_control() && !c.is_whitespace())
}
