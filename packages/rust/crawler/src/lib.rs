//! Page fetching and parsed-page access.
//!
//! This crate provides:
//! - [`fetch`]: the [`PageFetcher`] seam and its `reqwest` implementation
//! - [`page`]: [`ItemPage`], the parsed document handed to the extractors

pub mod fetch;
pub mod page;

pub use fetch::{FetchError, HttpFetcher, PageFetcher};
pub use page::{ItemPage, descendants, resolve_href, text_of};
