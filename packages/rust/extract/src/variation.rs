//! Shared-variation detection.
//!
//! Some item pages list several named variants in one blockquote, separated
//! by `●`, and keep a single property block for all of them. Any variation
//! requested on such a page is read from block 1.

use wikiloot_crawler::{ItemPage, text_of};

use crate::{BLOCKQUOTE_CLASS, BULLET};

/// The variation whose blocks should actually be read for `requested`.
pub fn resolve_variation(page: &ItemPage, requested: u32) -> u32 {
    if requested <= 1 {
        return requested;
    }
    if shares_single_block(page) {
        1
    } else {
        requested
    }
}

/// Whether any blockquote on the page carries the variant separator.
pub fn shares_single_block(page: &ItemPage) -> bool {
    page.find("div", BLOCKQUOTE_CLASS)
        .iter()
        .any(|block| text_of(block).contains(BULLET))
}
