//! SQLite-backed daily cache of Open Graph tags.
//!
//! Records are keyed by day stamp and raw URL, so a page fetched on a new
//! day never sees an earlier day's entry. Nothing expires; stale days are
//! simply never read again.
//!
//! - Async access via tokio-rusqlite
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod key;
pub mod migrations;
pub mod records;

pub use crate::Error;

pub use connection::CacheDb;
pub use key::CacheKey;
pub use records::CacheRecord;
