//! Day-partitioned cache key generation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Composite `date_url` key: `YYYYMMDD` + `_` + the literal target URL.
///
/// The URL is not normalized; trailing slashes, query order and scheme case
/// all produce distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(day: NaiveDate, url: &str) -> Self {
        Self(format!("{}_{}", day_stamp(day), url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CacheKey {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Format a calendar day as `YYYYMMDD`.
pub fn day_stamp(day: NaiveDate) -> String {
    day.format("%Y%m%d").to_string()
}
