//! Open Graph extraction from decoded HTML.
//!
//! Collects every `<meta>` whose `property` (or, failing that, `name`)
//! starts with `og:` and carries a `content` attribute. Keys are then
//! flattened by [`OgTags::from_raw`].
//!
//! ### Stable Abstraction
//! - Uses the `Extractor` trait so the pipeline does not depend on scraper directly.

use std::sync::LazyLock;

use ogtag_core::{Error, OgTags};
use scraper::{Html, Selector};

const OG_PREFIX: &str = "og:";

static META_WITH_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[content]").expect("invalid meta selector"));

/// Stable extractor trait for Open Graph metadata.
pub trait Extractor: Send + Sync {
    /// Extract normalized Open Graph tags from HTML.
    ///
    /// Fails with [`Error::NoMetadata`] when the page has no Open Graph properties.
    fn extract(&self, html: &str) -> Result<OgTags, Error>;
}

/// scraper-based extractor implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenGraphExtractor;

impl OpenGraphExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for OpenGraphExtractor {
    fn extract(&self, html: &str) -> Result<OgTags, Error> {
        let raw = raw_properties(html);

        if raw.is_empty() {
            return Err(Error::NoMetadata);
        }

        let tags = OgTags::from_raw(raw);
        tracing::debug!(count = tags.len(), "extracted open graph tags");
        Ok(tags)
    }
}

/// Raw `(property, content)` pairs in document order.
///
/// html5ever recovers from any markup error, so this never fails.
pub fn raw_properties(html: &str) -> Vec<(String, String)> {
    let document = Html::parse_document(html);

    document
        .select(&META_WITH_CONTENT)
        .filter_map(|element| {
            let meta = element.value();
            let property = [meta.attr("property"), meta.attr("name")]
                .into_iter()
                .flatten()
                .find(|p| is_og_property(p))?;
            let content = meta.attr("content")?;
            Some((property.to_string(), content.to_string()))
        })
        .collect()
}

/// Extract Open Graph tags using the default extractor.
pub fn extract_og_tags(html: &str) -> Result<OgTags, Error> {
    OpenGraphExtractor::new().extract(html)
}

fn is_og_property(name: &str) -> bool {
    name.get(..OG_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(OG_PREFIX))
}
