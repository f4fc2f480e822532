//! Parsed item page and the structural queries the extractors use.

use scraper::{ElementRef, Html};
use url::Url;

/// A parsed wiki page.
///
/// Wraps [`scraper::Html`] and exposes only tag + class lookups, descendant
/// lookups, element removal, and text rendering.
pub struct ItemPage {
    html: Html,
}

impl ItemPage {
    /// Parse an HTML document.
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// All elements named `tag` carrying the CSS class `class`, in document order.
    pub fn find(&self, tag: &str, class: &str) -> Vec<ElementRef<'_>> {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|el| is_tagged(el, tag, class))
            .collect()
    }

    /// Detach the first `tag.class` element from the document.
    ///
    /// Returns `false` when no such element exists.
    pub fn remove_first(&mut self, tag: &str, class: &str) -> bool {
        let Some(id) = self.find(tag, class).first().map(|el| el.id()) else {
            return false;
        };
        match self.html.tree.get_mut(id) {
            Some(mut node) => {
                node.detach();
                true
            }
            None => false,
        }
    }
}

/// Descendant elements of `el` named `tag`, excluding `el` itself.
pub fn descendants<'a>(el: &ElementRef<'a>, tag: &str) -> Vec<ElementRef<'a>> {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == tag)
        .collect()
}

/// Concatenated text content of `el`, with markup removed.
pub fn text_of(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

/// Resolve an `href` against the page it was found on.
///
/// Fragments are dropped; anchors, `javascript:` and `mailto:` links yield `None`.
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    if href.starts_with('#') || href.starts_with("javascript:") || href.starts_with("mailto:") {
        return None;
    }
    let mut resolved = base.join(href).ok()?;
    resolved.set_fragment(None);
    Some(resolved.to_string())
}

fn is_tagged(el: &ElementRef<'_>, tag: &str, class: &str) -> bool {
    el.value().name() == tag && el.value().classes().any(|c| c == class)
}
