//! Rarity, weight, and price extraction from a variation's property block.

use std::sync::LazyLock;

use regex::Regex;
use wikiloot_crawler::{ItemPage, descendants, text_of};
use wikiloot_shared::Rarity;

use crate::PROPERTY_LIST_CLASS;

/// Rarities in the order a substring match tries them: most specific first,
/// so "Very Rare" never resolves to `Rare` and "Uncommon" never to `Common`.
const RARITY_MATCH_ORDER: [Rarity; 6] = [
    Rarity::StoryItem,
    Rarity::VeryRare,
    Rarity::Legendary,
    Rarity::Uncommon,
    Rarity::Common,
    Rarity::Rare,
];

static WEIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("weight regex"));

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("price regex"));

/// Outcome of reading one property block.
///
/// Every field that was expected but could not be read has exactly one
/// matching entry in `errors`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyResult {
    pub rarity: Option<Rarity>,
    pub weight: Option<f64>,
    pub price: Option<u32>,
    pub errors: Vec<String>,
}

impl PropertyResult {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            errors: vec![error.into()],
            ..Self::default()
        }
    }

    /// True when no error was recorded.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Rarity,
    Weight,
    Price,
}

/// Read rarity, weight, and price for the 1-based `variation`.
///
/// Only the block at `variation - 1` is consulted; nothing is borrowed from
/// other variations.
pub fn extract_properties(page: &ItemPage, variation: u32) -> PropertyResult {
    if variation == 0 {
        return PropertyResult::failed("Invalid Variation: 0");
    }

    let blocks = page.find("div", PROPERTY_LIST_CLASS);
    let Some(block) = blocks.get(variation as usize - 1) else {
        return PropertyResult::failed("Error parsing HTML: Too few property lists");
    };

    let mut lines = descendants(block, "li");
    if lines.is_empty() {
        lines = descendants(block, "dd");
    }

    let mut result = PropertyResult::default();
    let mut seen = Vec::with_capacity(3);
    for line in &lines {
        let text = ascii_line(&text_of(line));
        let kind = classify(&text);
        if let Some(kind) = kind {
            seen.push(kind);
        }
        match kind {
            Some(LineKind::Rarity) => match parse_rarity(&text) {
                Ok(rarity) => result.rarity = Some(rarity),
                Err(raw) => result.errors.push(format!("Invalid Rarity: {raw}")),
            },
            Some(LineKind::Weight) => match parse_weight(&text) {
                Ok(weight) => result.weight = Some(weight),
                Err(raw) => result.errors.push(format!("Invalid Weight: {raw}")),
            },
            Some(LineKind::Price) => match parse_price(&text) {
                Ok(price) => result.price = Some(price),
                Err(raw) => result.errors.push(format!("Invalid Price: {raw}")),
            },
            None => {}
        }
    }

    for (kind, label) in [
        (LineKind::Rarity, "Rarity"),
        (LineKind::Weight, "Weight"),
        (LineKind::Price, "Price"),
    ] {
        if !seen.contains(&kind) {
            result.errors.push(format!("Missing {label}"));
        }
    }

    result
}

fn classify(line: &str) -> Option<LineKind> {
    let lower = line.to_lowercase();
    if lower.contains("rarity") {
        Some(LineKind::Rarity)
    } else if lower.contains("weight") {
        Some(LineKind::Weight)
    } else if lower.contains("price") {
        Some(LineKind::Price)
    } else {
        None
    }
}

/// Parse the text after the last `Rarity:` label. On failure the raw text is returned.
fn parse_rarity(line: &str) -> Result<Rarity, String> {
    let raw = after_last(line, "rarity:").trim();

    if let Ok(exact) = raw.parse::<Rarity>() {
        return Ok(exact);
    }

    let lower = raw.to_lowercase();
    RARITY_MATCH_ORDER
        .into_iter()
        .find(|r| lower.contains(&r.as_str().to_lowercase()))
        .ok_or_else(|| raw.to_string())
}

/// Parse the pound figure of a `... kg / <n> lb` line.
fn parse_weight(line: &str) -> Result<f64, String> {
    let after = after_last(line, "kg /");
    let raw = after.rsplit_once("lb").map_or(after, |(left, _)| left).trim();

    if !WEIGHT_RE.is_match(raw) {
        return Err(raw.to_string());
    }
    raw.parse::<f64>().map_err(|_| raw.to_string())
}

/// Parse the gold figure of a `Price: <n> gp` line.
fn parse_price(line: &str) -> Result<u32, String> {
    let after = after_last(line, "price:");
    let raw = after.split_once("gp").map_or(after, |(left, _)| left).trim();

    if !PRICE_RE.is_match(raw) {
        return Err(raw.to_string());
    }
    raw.parse::<u32>().map_err(|_| raw.to_string())
}

/// Text following the last case-insensitive occurrence of an ASCII `marker`,
/// or the whole line when the marker is absent.
fn after_last<'a>(line: &'a str, marker: &str) -> &'a str {
    // ASCII lowercasing keeps byte offsets aligned with `line`.
    let lower = line.to_ascii_lowercase();
    match lower.rfind(marker) {
        Some(pos) => &line[pos + marker.len()..],
        None => line,
    }
}

/// Map Unicode whitespace (e.g. `&nbsp;`) to an ASCII space and drop every
/// other non-ASCII character (zero-width spaces, soft hyphens).
fn ascii_line(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some(' ')
            } else if c.is_ascii() {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_with_lines(lines: &[&str]) -> ItemPage {
        let items: String = lines.iter().map(|l| format!("<li>{l}</li>")).collect();
        ItemPage::parse(&format!(
            r#"<html><body><div class="bg3wiki-property-list"><ul>{items}</ul></div></body></html>"#
        ))
    }

    fn load_fixture(name: &str) -> ItemPage {
        let path = format!("../../../fixtures/html/{name}");
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("missing fixture: {path}"));
        ItemPage::parse(&content)
    }

    #[test]
    fn extracts_all_fields_from_fixture() {
        let page = load_fixture("item_single.html");
        let result = extract_properties(&page, 1);

        assert!(result.is_clean(), "unexpected errors: {:?}", result.errors);
        assert_eq!(result.rarity, Some(Rarity::Legendary));
        assert_eq!(result.weight, Some(2.0));
        assert_eq!(result.price, Some(500));
    }

    #[test]
    fn second_variation_uses_dd_fallback() {
        let page = load_fixture("item_variations.html");

        let first = extract_properties(&page, 1);
        assert_eq!(first.rarity, Some(Rarity::Uncommon));
        assert_eq!(first.price, Some(60));

        let second = extract_properties(&page, 2);
        assert!(second.is_clean());
        assert_eq!(second.rarity, Some(Rarity::VeryRare));
        assert_eq!(second.weight, Some(0.02));
        assert_eq!(second.price, Some(340));
    }

    #[test]
    fn too_few_property_lists() {
        let page = load_fixture("item_single.html");
        let result = extract_properties(&page, 2);

        assert_eq!(result.errors, vec!["Error parsing HTML: Too few property lists"]);
        assert!(result.rarity.is_none());
        assert!(result.weight.is_none());
        assert!(result.price.is_none());

        let empty = ItemPage::parse("<html><body><p>nothing</p></body></html>");
        assert_eq!(extract_properties(&empty, 1).errors.len(), 1);
    }

    #[test]
    fn very_rare_is_not_rare() {
        let page = page_with_lines(&["Rarity: Very Rare"]);
        assert_eq!(extract_properties(&page, 1).rarity, Some(Rarity::VeryRare));

        let page = page_with_lines(&["Rarity: uncommon"]);
        assert_eq!(extract_properties(&page, 1).rarity, Some(Rarity::Uncommon));

        let page = page_with_lines(&["Rarity: Rare (quest reward)"]);
        assert_eq!(extract_properties(&page, 1).rarity, Some(Rarity::Rare));
    }

    #[test]
    fn unknown_rarity_is_reported() {
        let page = page_with_lines(&["Rarity: Mythical", "Weight: 1 kg / 2 lb", "Price: 10 gp"]);
        let result = extract_properties(&page, 1);

        assert!(result.rarity.is_none());
        assert_eq!(result.price, Some(10));
        assert_eq!(result.errors, vec!["Invalid Rarity: Mythical"]);
    }

    #[test]
    fn weight_and_price_tokens() {
        let page = page_with_lines(&["Rarity: Common", "Weight: 1.6 kg / 3.5 lb", "Price: 120 gp"]);
        let result = extract_properties(&page, 1);
        assert_eq!(result.weight, Some(3.5));
        assert_eq!(result.price, Some(120));
        assert!(result.is_clean());
    }

    #[test]
    fn malformed_price_and_weight() {
        let page = page_with_lines(&["Rarity: Common", "Weight: 1 kg / ? lb", "Price: abc gp"]);
        let result = extract_properties(&page, 1);

        assert!(result.weight.is_none());
        assert!(result.price.is_none());
        assert_eq!(
            result.errors,
            vec!["Invalid Weight: ?", "Invalid Price: abc"]
        );
    }

    #[test]
    fn unrelated_lines_are_ignored() {
        let page = page_with_lines(&[
            "Longswords",
            "One-handed",
            "Rarity: Common",
            "Weight: 0.5 kg / 1 lb",
            "Price: 3 gp",
        ]);
        let result = extract_properties(&page, 1);
        assert!(result.is_clean());
        assert_eq!(result.rarity, Some(Rarity::Common));
        assert_eq!(result.price, Some(3));
    }

    #[test]
    fn rarity_keyword_wins_over_price() {
        // A line naming both keywords is classified by the first one checked.
        let page = page_with_lines(&["Rarity: Legendary (price varies)"]);
        let result = extract_properties(&page, 1);
        assert_eq!(result.rarity, Some(Rarity::Legendary));
        assert!(result.price.is_none());
        assert_eq!(result.errors, vec!["Missing Weight", "Missing Price"]);
    }

    #[test]
    fn each_absent_line_kind_is_reported_once() {
        let page = page_with_lines(&["Rarity: Rare"]);
        let result = extract_properties(&page, 1);
        assert_eq!(result.rarity, Some(Rarity::Rare));
        assert_eq!(result.errors, vec!["Missing Weight", "Missing Price"]);

        let page = page_with_lines(&["One-handed"]);
        assert_eq!(
            extract_properties(&page, 1).errors,
            vec!["Missing Rarity", "Missing Weight", "Missing Price"]
        );
    }

    #[test]
    fn invisible_non_ascii_characters_are_dropped() {
        let page = page_with_lines(&[
            "Rarity:\u{ad} Uncommon",
            "Weight: 1 kg / 2\u{200b} lb",
            "Price: 120\u{200b} gp",
        ]);
        let result = extract_properties(&page, 1);

        assert!(result.is_clean(), "unexpected errors: {:?}", result.errors);
        assert_eq!(result.rarity, Some(Rarity::Uncommon));
        assert_eq!(result.weight, Some(2.0));
        assert_eq!(result.price, Some(120));
    }

    #[test]
    fn zero_variation_is_rejected() {
        let page = page_with_lines(&["Rarity: Common"]);
        let result = extract_properties(&page, 0);
        assert_eq!(result.errors, vec!["Invalid Variation: 0"]);
    }
}
