//! Core types and shared functionality for ogtag.
//!
//! This crate provides:
//! - Daily cache of Open Graph tags with SQLite backend
//! - Unified error types
//! - Configuration structures
//! - The response envelope returned by every invocation

pub mod cache;
pub mod config;
pub mod error;
pub mod response;
pub mod tags;

pub use cache::{CacheDb, CacheKey, CacheRecord};
pub use config::{AppConfig, ConfigError, Transport};
pub use error::Error;
pub use response::{Envelope, InvocationResponse};
pub use tags::{OgTags, TagMap};
