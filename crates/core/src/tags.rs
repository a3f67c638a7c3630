//! Open Graph tag sets and key normalization.
//!
//! Raw properties such as `og:image:width` are stored under flattened keys:
//!
//! | raw key            | normalized      |
//! |--------------------|-----------------|
//! | `og:title`         | `title`         |
//! | `og:image:width`   | `image_width`   |
//! | `og:a:b:c`         | `a_b`           |
//! | `og`, `og:`        | dropped         |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tag mapping as stored in the cache and returned to callers.
///
/// Values are nullable so records written by other producers round-trip.
pub type TagMap = BTreeMap<String, Option<String>>;

/// Normalized Open Graph tags extracted from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OgTags(BTreeMap<String, String>);

impl OgTags {
    /// Build a tag set from raw `(property, content)` pairs in document order.
    ///
    /// Later pairs overwrite earlier ones when their normalized keys collide.
    pub fn from_raw<I, K, V>(raw: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut tags = BTreeMap::new();
        for (key, value) in raw {
            if let Some(normalized) = normalize_key(key.as_ref()) {
                tags.insert(normalized, value.into());
            }
        }
        Self(tags)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<OgTags> for TagMap {
    fn from(tags: OgTags) -> Self {
        tags.0.into_iter().map(|(k, v)| (k, Some(v))).collect()
    }
}

/// Flatten a raw Open Graph property name.
///
/// Returns `None` when the key has no non-empty segment after the prefix.
pub fn normalize_key(raw: &str) -> Option<String> {
    let mut segments = raw.split(':').skip(1);
    let first = segments.next().filter(|s| !s.is_empty())?;

    match segments.next().filter(|s| !s.is_empty()) {
        Some(second) => Some(format!("{first}_{second}")),
        None => Some(first.to_string()),
    }
}
