//! Client code for ogtag.
//!
//! This crate provides the upstream fetch pipeline, charset decoding and
//! Open Graph extraction used by the server.

pub mod extract;
pub mod fetch;

pub use extract::{Extractor, OpenGraphExtractor, extract_og_tags, raw_properties};

pub use fetch::{DecodedPage, FetchClient, FetchConfig, FetchResponse};
