//! Unified error types for ogtag.
//!
//! Every pipeline stage fails with one of these variants. The response layer
//! turns them into an [`Envelope`](crate::response::Envelope) so nothing
//! escapes to the caller as an unhandled fault.

use tokio_rusqlite::rusqlite;

/// Detail message for a request without a usable `url`.
pub const MSG_URL_REQUIRED: &str = "URL을 입력해주세요.";

/// Detail message for an upstream response with no body.
pub const MSG_PAGE_NOT_FOUND: &str = "페이지 정보를 찾을 수 없습니다.";

/// Detail message when a page carries no Open Graph properties.
pub const MSG_NO_METADATA: &str = "메타 정보를 찾을 수 없습니다. ";

/// Unified error types for the ogtag pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request body missing, unparsable, or without a usable `url`.
    #[error("INVALID_PARAMETERS: {0}")]
    InvalidParameters(String),

    /// Target URL could not be used for a request.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Upstream answered with an empty body.
    #[error("PAGE_NOT_FOUND")]
    PageNotFound,

    /// Upstream request failed. `status` is set for non-2xx answers.
    #[error("UPSTREAM_ERROR: {message}")]
    Upstream { status: Option<u16>, message: String },

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// No Open Graph properties in the page.
    #[error("NO_METADATA")]
    NoMetadata,

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored tag mapping could not be (de)serialized.
    #[error("CACHE_ERROR: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Human-readable detail carried in `errorDetailMessage`.
    pub fn detail(&self) -> String {
        match self {
            Error::InvalidParameters(msg)
            | Error::InvalidUrl(msg)
            | Error::FetchTooLarge(msg)
            | Error::MigrationFailed(msg) => msg.clone(),
            Error::Upstream { message, .. } => message.clone(),
            Error::PageNotFound => MSG_PAGE_NOT_FOUND.to_string(),
            Error::NoMetadata => MSG_NO_METADATA.to_string(),
            Error::Database(tokio_rusqlite::Error::Error(e) | tokio_rusqlite::Error::Close((_, e))) => e.to_string(),
            Error::Database(e) => e.to_string(),
            Error::Serialization(e) => e.to_string(),
        }
    }

    /// Code reported as `errorCode`.
    ///
    /// Upstream failures report the upstream status when one exists.
    pub fn error_code(&self) -> u16 {
        match self {
            Error::InvalidParameters(_) => 400,
            Error::Upstream { status: Some(status), .. } => *status,
            _ => 500,
        }
    }

    /// HTTP status of the error envelope.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::InvalidParameters(_) => 400,
            _ => 500,
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}
