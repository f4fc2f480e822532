//! Tabular input and output for wikiloot.
//!
//! Every table is CSV with a header row. The item table is read with only
//! its identity columns present; the derived columns (`rarity`, `price_gp`,
//! `weight_lb`, `description`) are filled by the batch and written back.
//!
//! Final writes go through [`write_with_retry`] so a destination held open
//! by a spreadsheet program can be released and retried once.

mod retry;
mod tables;

pub use retry::{NoPrompt, RetryPrompt, write_with_retry};
pub use tables::{
    CATALOG_COLUMNS, ERROR_COLUMNS, ErrorRow, ITEM_COLUMNS, read_catalog, read_error_rows,
    read_items, read_known_urls, write_catalog, write_error_rows, write_items,
};
