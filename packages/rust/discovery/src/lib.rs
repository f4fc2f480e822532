//! Item discovery from wiki listing pages.
//!
//! A discovery run starts from a JSON document of seed listing pages and a
//! curated list of items the listings are known to miss. Every seed is
//! fetched and scanned for item links; the result is filtered against the
//! items already known and returned as a `name, url` catalog.

mod parser;

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use wikiloot_crawler::{FetchError, ItemPage, PageFetcher};
use wikiloot_shared::{CatalogEntry, Result, WikilootError};

// ---------------------------------------------------------------------------
// Input document
// ---------------------------------------------------------------------------

/// A listing page to scan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedUrl {
    pub url: String,
    /// Also scan the icon-text layout.
    #[serde(default)]
    pub special: bool,
}

/// The discovery input document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DiscoveryInput {
    #[serde(rename = "Input Urls", default)]
    pub input_urls: Vec<SeedUrl>,
    /// Items the listings never link to, added verbatim.
    #[serde(rename = "Missing Items", default)]
    pub missing_items: Vec<CatalogEntry>,
}

impl DiscoveryInput {
    /// Parse the JSON input document.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| WikilootError::parse(format!("invalid discovery input: {e}")))
    }
}

/// Read and parse the discovery input document at `path`.
pub fn load_input(path: &Path) -> Result<DiscoveryInput> {
    let content = std::fs::read_to_string(path).map_err(|e| WikilootError::io(path, e))?;
    DiscoveryInput::from_json(&content)
}

// ---------------------------------------------------------------------------
// Discovery run
// ---------------------------------------------------------------------------

/// Result of a discovery run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryOutcome {
    /// New items, unique by URL.
    pub catalog: Vec<CatalogEntry>,
    /// One message per seed that could not be fetched.
    pub errors: Vec<String>,
}

/// Scan every seed, append the curated items, and filter the result.
///
/// Filtering drops, in order: URLs in `known_urls`, URLs of the seeds
/// themselves, discovered entries whose URL the curated list also declares,
/// and repeats of a URL already emitted.
#[instrument(skip_all, fields(seeds = input.input_urls.len()))]
pub async fn discover_items<F: PageFetcher>(
    input: &DiscoveryInput,
    known_urls: &HashSet<String>,
    fetcher: &F,
) -> DiscoveryOutcome {
    let mut discovered = Vec::new();
    let mut errors = Vec::new();

    for seed in &input.input_urls {
        let body = match fetcher.fetch(&seed.url).await {
            Ok(body) => body,
            Err(err) => {
                warn!(url = %seed.url, error = %err, "seed fetch failed");
                errors.push(err.to_string());
                continue;
            }
        };

        match scan_seed(seed, &body) {
            Ok(entries) => {
                debug!(url = %seed.url, found = entries.len(), "seed scanned");
                discovered.extend(entries);
            }
            Err(err) => {
                warn!(url = %seed.url, error = %err, "seed url unusable");
                errors.push(err.to_string());
            }
        }
    }

    let catalog = filter_catalog(input, known_urls, discovered);
    info!(
        new_items = catalog.len(),
        failed_seeds = errors.len(),
        "discovery complete"
    );

    DiscoveryOutcome { catalog, errors }
}

/// Parse one fetched seed page with the layouts it declares.
fn scan_seed(seed: &SeedUrl, body: &str) -> std::result::Result<Vec<CatalogEntry>, FetchError> {
    let base = Url::parse(seed.url.trim()).map_err(|_| FetchError::InvalidUrl {
        url: seed.url.clone(),
    })?;

    let mut page = ItemPage::parse(body);
    let mut entries = parser::parse_standard(&page, &base);
    if seed.special {
        entries.extend(parser::parse_special(&mut page, &base));
    }
    Ok(entries)
}

fn filter_catalog(
    input: &DiscoveryInput,
    known_urls: &HashSet<String>,
    discovered: Vec<CatalogEntry>,
) -> Vec<CatalogEntry> {
    let seed_urls: HashSet<String> = input
        .input_urls
        .iter()
        .flat_map(|seed| [seed.url.clone(), normalized(&seed.url)])
        .collect();
    let curated_urls: HashSet<&str> = input.missing_items.iter().map(|e| e.url.as_str()).collect();

    let discovered = discovered
        .into_iter()
        .filter(|entry| !curated_urls.contains(entry.url.as_str()));
    let candidates = discovered.chain(input.missing_items.iter().cloned());

    let mut emitted = HashSet::new();
    candidates
        .filter(|entry| !known_urls.contains(&entry.url))
        .filter(|entry| !seed_urls.contains(&entry.url))
        .filter(|entry| emitted.insert(entry.url.clone()))
        .collect()
}

/// `url` in the form resolved links take (parsed, fragment dropped), or
/// unchanged when it does not parse.
fn normalized(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wikiloot_crawler::HttpFetcher;
    use wikiloot_shared::FetchConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&FetchConfig {
            timeout: Duration::from_secs(2),
            user_agent: "wikiloot-test".into(),
        })
        .unwrap()
    }

    fn fixture(name: &str) -> String {
        let path = format!("../../../fixtures/html/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn entry(name: &str, url: &str) -> CatalogEntry {
        CatalogEntry {
            name: name.into(),
            url: url.into(),
        }
    }

    async fn serve(server: &MockServer, route: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[test]
    fn parses_input_document() {
        let input = DiscoveryInput::from_json(
            r#"{
                "Input Urls": [
                    {"url": "https://bg3.wiki/wiki/Rings", "special": false},
                    {"url": "https://bg3.wiki/wiki/Camp_Supplies", "special": true}
                ],
                "Missing Items": [{"name": "Orb", "url": "https://bg3.wiki/wiki/Orb"}]
            }"#,
        )
        .unwrap();

        assert_eq!(input.input_urls.len(), 2);
        assert!(input.input_urls[1].special);
        assert_eq!(input.missing_items[0].name, "Orb");
    }

    #[test]
    fn malformed_input_is_parse_error() {
        let err = DiscoveryInput::from_json("{ not json").unwrap_err();
        assert!(matches!(err, WikilootError::Parse { .. }));
    }

    #[tokio::test]
    async fn two_seeds_linking_same_item_yield_one_entry() {
        let server = MockServer::start().await;
        let page = r#"<span class="bg3wiki-itemicon"><a href="/wiki/Sword" title="Sword"></a></span>"#;
        serve(&server, "/wiki/A", page.to_string()).await;
        serve(&server, "/wiki/B", page.to_string()).await;

        let input = DiscoveryInput {
            input_urls: vec![
                SeedUrl {
                    url: format!("{}/wiki/A", server.uri()),
                    special: false,
                },
                SeedUrl {
                    url: format!("{}/wiki/B", server.uri()),
                    special: false,
                },
            ],
            missing_items: Vec::new(),
        };

        let outcome = discover_items(&input, &HashSet::new(), &fetcher()).await;
        assert!(outcome.errors.is_empty());
        assert_eq!(
            outcome.catalog,
            vec![entry("Sword", &format!("{}/wiki/Sword", server.uri()))]
        );
    }

    #[tokio::test]
    async fn known_seed_and_curated_urls_are_filtered() {
        let server = MockServer::start().await;
        let uri = server.uri();
        serve(&server, "/wiki/Rings", fixture("listing_standard.html")).await;
        serve(&server, "/wiki/Camp_Supplies", fixture("listing_special.html")).await;

        let input = DiscoveryInput {
            input_urls: vec![
                SeedUrl {
                    url: format!("{uri}/wiki/Rings"),
                    special: false,
                },
                SeedUrl {
                    url: format!("{uri}/wiki/Camp_Supplies"),
                    special: true,
                },
            ],
            missing_items: vec![
                entry("Caustic Band (curated)", &format!("{uri}/wiki/Caustic_Band")),
                entry("Orb", &format!("{uri}/wiki/Orb")),
                entry("Rings", &format!("{uri}/wiki/Rings")),
            ],
        };
        let known: HashSet<String> = [format!("{uri}/wiki/Ring_of_Twins")].into_iter().collect();

        let outcome = discover_items(&input, &known, &fetcher()).await;
        let names: Vec<&str> = outcome.catalog.iter().map(|e| e.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "Band of the Mystic Scoundrel",
                "Camp Supply Pack",
                "Salami",
                "Fresh Bread",
                "Caustic Band (curated)",
                "Orb",
            ]
        );
    }

    #[tokio::test]
    async fn seed_without_trailing_slash_is_not_emitted() {
        let server = MockServer::start().await;
        let page = r#"<span class="bg3wiki-itemicon"><a href="/" title="Main Page"></a></span>
                      <span class="bg3wiki-itemicon"><a href="/wiki/Sword" title="Sword"></a></span>"#;
        serve(&server, "/", page.to_string()).await;

        let input = DiscoveryInput {
            input_urls: vec![SeedUrl {
                url: server.uri(),
                special: false,
            }],
            missing_items: Vec::new(),
        };

        let outcome = discover_items(&input, &HashSet::new(), &fetcher()).await;
        assert_eq!(
            outcome.catalog,
            vec![entry("Sword", &format!("{}/wiki/Sword", server.uri()))]
        );
    }

    #[test]
    fn seed_urls_are_compared_in_resolved_form() {
        assert_eq!(normalized("https://bg3.wiki"), "https://bg3.wiki/");
        assert_eq!(
            normalized("https://bg3.wiki/wiki/Rings#Top"),
            "https://bg3.wiki/wiki/Rings"
        );
        assert_eq!(normalized("not a url"), "not a url");
    }

    #[tokio::test]
    async fn failed_seed_is_recorded_and_skipped() {
        let server = MockServer::start().await;
        serve(&server, "/wiki/Rings", fixture("listing_standard.html")).await;

        let input = DiscoveryInput {
            input_urls: vec![
                SeedUrl {
                    url: "not a url".into(),
                    special: false,
                },
                SeedUrl {
                    url: format!("{}/wiki/Rings", server.uri()),
                    special: false,
                },
            ],
            missing_items: Vec::new(),
        };

        let outcome = discover_items(&input, &HashSet::new(), &fetcher()).await;
        assert_eq!(outcome.errors, vec!["Invalid URL: not a url"]);
        assert_eq!(outcome.catalog.len(), 3);
    }
}
