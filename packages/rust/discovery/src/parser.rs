//! Item-link extraction from wiki listing pages.
//!
//! Two listing layouts exist on the wiki:
//! - icon grids: `span.bg3wiki-itemicon` / `span.bg3wiki-itemicon-wrapper`
//!   wrapping one link per item
//! - icon-text lists (`span.bg3wiki-icontext-icon`), used by a few category
//!   pages whose footer navbox would otherwise leak unrelated links

use std::collections::HashSet;

use scraper::ElementRef;
use url::Url;
use wikiloot_crawler::{ItemPage, descendants, resolve_href, text_of};
use wikiloot_shared::CatalogEntry;

const ITEMICON_CLASSES: [&str; 2] = ["bg3wiki-itemicon", "bg3wiki-itemicon-wrapper"];
const ICONTEXT_CLASS: &str = "bg3wiki-icontext-icon";
const NAVBOX_CLASS: &str = "navbox";

/// Links under the icon-grid spans, skipping index pages.
pub(crate) fn parse_standard(page: &ItemPage, base: &Url) -> Vec<CatalogEntry> {
    let spans = ITEMICON_CLASSES
        .iter()
        .flat_map(|class| page.find("span", class));
    collect_links(spans, base, "index")
}

/// Links under icon-text spans, after the footer navbox is removed.
///
/// Condition pages share this markup and are skipped.
pub(crate) fn parse_special(page: &mut ItemPage, base: &Url) -> Vec<CatalogEntry> {
    page.remove_first("div", NAVBOX_CLASS);
    collect_links(page.find("span", ICONTEXT_CLASS), base, "Condition")
}

fn collect_links<'a>(
    containers: impl IntoIterator<Item = ElementRef<'a>>,
    base: &Url,
    exclude: &str,
) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for container in containers {
        for link in descendants(&container, "a") {
            let Some(url) = link.value().attr("href").and_then(|h| resolve_href(base, h)) else {
                continue;
            };
            if url.contains(exclude) || !seen.insert(url.clone()) {
                continue;
            }
            let name = link
                .value()
                .attr("title")
                .map(str::to_string)
                .unwrap_or_else(|| text_of(&link));
            entries.push(CatalogEntry {
                name: name.trim().to_string(),
                url,
            });
        }
    }

    entries
}
