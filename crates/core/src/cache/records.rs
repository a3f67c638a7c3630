//! Cache record reads and writes.

use super::connection::CacheDb;
use super::key::CacheKey;
use crate::{Error, TagMap};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A cached tag mapping for one (day, URL) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub key: CacheKey,
    pub tag: TagMap,
    pub created_at: String,
}

impl CacheDb {
    /// Store the tag mapping for `key`.
    ///
    /// Overwrites any existing record unconditionally.
    pub async fn put_record(&self, key: &CacheKey, tag: &TagMap) -> Result<(), Error> {
        let key = key.as_str().to_string();
        let tag_json = serde_json::to_string(tag)?;
        let created_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO og_tag (date_url, tag, created_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(date_url) DO UPDATE SET
                        tag = excluded.tag,
                        created_at = excluded.created_at",
                    params![key, tag_json, created_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Get the record for `key`.
    ///
    /// Returns None if no record exists.
    pub async fn get_record(&self, key: &CacheKey) -> Result<Option<CacheRecord>, Error> {
        let key = key.as_str().to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheRecord>, Error> {
                let result = conn.query_row(
                    "SELECT date_url, tag, created_at FROM og_tag WHERE date_url = ?1",
                    params![key],
                    |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)),
                );

                match result {
                    Ok((date_url, tag_json, created_at)) => Ok(Some(CacheRecord {
                        key: CacheKey::from(date_url),
                        tag: serde_json::from_str(&tag_json)?,
                        created_at,
                    })),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Number of stored records across all days.
    pub async fn count_records(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM og_tag", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Envelope;
    use chrono::NaiveDate;

    fn key(day: u32, url: &str) -> CacheKey {
        CacheKey::new(NaiveDate::from_ymd_opt(2024, 5, day).unwrap(), url)
    }

    fn tags(pairs: &[(&str, &str)]) -> TagMap {
        pairs.iter().map(|(k, v)| (k.to_string(), Some(v.to_string()))).collect()
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = key(1, "https://example.com/a");
        let tag = tags(&[("title", "A"), ("type", "article")]);

        db.put_record(&key, &tag).await.unwrap();

        let record = db.get_record(&key).await.unwrap().unwrap();
        assert_eq!(record.key, key);
        assert_eq!(record.tag, tag);
        assert!(!record.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.get_record(&key(1, "https://example.com/none")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = key(1, "https://example.com/a");

        db.put_record(&key, &tags(&[("title", "old")])).await.unwrap();
        db.put_record(&key, &tags(&[("title", "new")])).await.unwrap();

        let record = db.get_record(&key).await.unwrap().unwrap();
        assert_eq!(record.tag, tags(&[("title", "new")]));
        assert_eq!(db.count_records().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_days_are_independent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "https://example.com/a";

        db.put_record(&key(1, url), &tags(&[("title", "monday")])).await.unwrap();

        assert!(db.get_record(&key(2, url)).await.unwrap().is_none());

        db.put_record(&key(2, url), &tags(&[("title", "tuesday")])).await.unwrap();
        assert_eq!(db.count_records().await.unwrap(), 2);

        let first = db.get_record(&key(1, url)).await.unwrap().unwrap();
        assert_eq!(first.tag, tags(&[("title", "monday")]));
    }

    #[tokio::test]
    async fn test_null_values_round_trip() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let key = key(3, "https://example.com/nulls");
        let mut tag = TagMap::new();
        tag.insert("image".into(), None);

        db.put_record(&key, &tag).await.unwrap();

        let record = db.get_record(&key).await.unwrap().unwrap();
        assert_eq!(record.tag.get("image"), Some(&None));
    }

    #[tokio::test]
    async fn test_store_failure_reports_sqlite_message() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.conn
            .call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch("DROP TABLE og_tag") })
            .await
            .unwrap();

        let err = db.get_record(&key(1, "https://example.com/a")).await.unwrap_err();
        assert!(matches!(err, Error::Database(_)));

        let envelope = Envelope::from(err);
        assert_eq!(
            envelope,
            Envelope::Failure { status_code: 500, error_code: 500, detail: "no such table: og_tag".into() }
        );
    }
}
