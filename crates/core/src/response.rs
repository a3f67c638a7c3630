//! Response envelope shared by every transport.
//!
//! Success bodies are the tag mapping itself. Failure bodies carry
//! `errorCode`, `errorMessage` (looked up from a fixed table) and
//! `errorDetailMessage`.

use serde::Serialize;

use crate::{Error, TagMap};

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success(TagMap),
    Failure { status_code: u16, error_code: u16, detail: String },
}

/// Transport-neutral HTTP-style response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResponse {
    pub status_code: u16,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    error_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<&'static str>,
    error_detail_message: &'a str,
}

/// Fixed label for a status code. Codes outside the table have none.
pub fn status_label(code: u16) -> Option<&'static str> {
    match code {
        400 => Some("Bad Request"),
        401 => Some("Unauthorized"),
        403 => Some("Forbidden"),
        404 => Some("Not Found"),
        405 => Some("Method Not Allowed"),
        406 => Some("Not Acceptable"),
        409 => Some("Conflict"),
        500 => Some("Internal Server Error"),
        _ => None,
    }
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Envelope::Success(_) => 200,
            Envelope::Failure { status_code, .. } => *status_code,
        }
    }

    /// JSON body for this envelope.
    pub fn body(&self) -> String {
        let encoded = match self {
            Envelope::Success(tags) => serde_json::to_string(tags),
            Envelope::Failure { error_code, detail, .. } => serde_json::to_string(&ErrorBody {
                error_code: *error_code,
                error_message: status_label(*error_code),
                error_detail_message: detail,
            }),
        };

        // Both shapes are string-keyed maps of plain values.
        encoded.unwrap_or_else(|_| String::from("{}"))
    }

    pub fn into_response(self) -> InvocationResponse {
        InvocationResponse {
            status_code: self.status_code(),
            headers: vec![("Content-Type", CONTENT_TYPE_JSON)],
            body: self.body(),
        }
    }
}

impl From<Error> for Envelope {
    fn from(err: Error) -> Self {
        Envelope::Failure { status_code: err.status_code(), error_code: err.error_code(), detail: err.detail() }
    }
}

impl From<Result<TagMap, Error>> for Envelope {
    fn from(result: Result<TagMap, Error>) -> Self {
        match result {
            Ok(tags) => Envelope::Success(tags),
            Err(err) => err.into(),
        }
    }
}
