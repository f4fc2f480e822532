//! Field extraction from wiki item pages.
//!
//! Extraction is keyed to the wiki's markup conventions: property blocks are
//! `div.bg3wiki-property-list`, flavour text lives in
//! `div.bg3wiki-blockquote-text`. Failures are returned as values
//! ([`PropertyResult::errors`], [`DescriptionResult::Invalid`]), never as `Err`.

mod description;
mod properties;
mod variation;

use tracing::debug;
use wikiloot_crawler::ItemPage;

pub use description::{DescriptionResult, extract_description, normalize_description};
pub use properties::{PropertyResult, extract_properties};
pub use variation::{resolve_variation, shares_single_block};

/// Class of the per-variation property block.
pub const PROPERTY_LIST_CLASS: &str = "bg3wiki-property-list";

/// Class of the per-variation flavour-text block.
pub const BLOCKQUOTE_CLASS: &str = "bg3wiki-blockquote-text";

/// Separator between variant names that share one stat block.
pub const BULLET: char = '●';

// ---------------------------------------------------------------------------
// Combined extraction
// ---------------------------------------------------------------------------

/// Which revision of the extraction rules to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Properties and description, with shared-variation detection.
    #[default]
    Full,
    /// Properties only, read from the requested variation as-is.
    Legacy,
}

/// Options for [`extract_item`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub mode: ExtractionMode,
    /// Accept a missing blockquote as an empty description.
    pub allow_empty_description: bool,
}

/// Everything read from one page for one variation.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The variation actually read after shared-block detection.
    pub effective_variation: u32,
    pub properties: PropertyResult,
    /// `None` in [`ExtractionMode::Legacy`].
    pub description: Option<DescriptionResult>,
}

impl Extraction {
    /// Ledger messages for this extraction, empty when it succeeded.
    ///
    /// Property errors take precedence; the description reason is used only
    /// when the properties were clean.
    pub fn errors(&self) -> Vec<String> {
        if !self.properties.is_clean() {
            return self.properties.errors.clone();
        }
        match self.description.as_ref().and_then(DescriptionResult::reason) {
            Some(reason) => vec![reason.to_string()],
            None => Vec::new(),
        }
    }
}

/// Resolve the variation once, then read properties and description from it.
pub fn extract_item(page: &ItemPage, requested: u32, opts: &ExtractOptions) -> Extraction {
    match opts.mode {
        ExtractionMode::Full => {
            let effective = resolve_variation(page, requested);
            if effective != requested {
                debug!(requested, effective, "variations share one block");
            }
            Extraction {
                effective_variation: effective,
                properties: extract_properties(page, effective),
                description: Some(extract_description(
                    page,
                    effective,
                    opts.allow_empty_description,
                )),
            }
        }
        ExtractionMode::Legacy => Extraction {
            effective_variation: requested,
            properties: extract_properties(page, requested),
            description: None,
        },
    }
}
