//! HTTP transport.
//!
//! `POST /` with a JSON body `{"url": "..."}`. The response status, body and
//! `Content-Type` come straight from the pipeline's envelope. Requests the
//! router itself turns away (wrong method, unknown path) get envelopes too.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State, rejection::BytesRejection},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use ogtag_core::{Envelope, InvocationResponse};
use tower_http::trace::TraceLayer;

use crate::pipeline::{self, AppContext};

/// Largest request body read. Bigger bodies are treated as missing.
const BODY_LIMIT: usize = 64 * 1024;

/// Build the router for the lookup endpoint.
pub fn router(ctx: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", post(og_tag).fallback(method_not_allowed))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Bind `addr` and serve until the process exits.
pub async fn serve(ctx: Arc<AppContext>, addr: &str) -> anyhow::Result<()> {
    let addr: SocketAddr = addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, router(ctx)).await?;
    Ok(())
}

/// POST / - Open Graph lookup.
async fn og_tag(State(ctx): State<Arc<AppContext>>, body: Result<Bytes, BytesRejection>) -> Response {
    // An unreadable or non-UTF-8 body cannot hold a usable url and is treated as missing.
    let text = match &body {
        Ok(bytes) => std::str::from_utf8(bytes).ok(),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "request body rejected");
            None
        }
    };
    into_http(pipeline::handle(&ctx, text).await)
}

async fn method_not_allowed() -> Response {
    rejected(405, "only POST is supported")
}

async fn not_found() -> Response {
    rejected(404, "only / is served")
}

fn rejected(code: u16, detail: &str) -> Response {
    into_http(Envelope::Failure { status_code: code, error_code: code, detail: detail.to_string() }.into_response())
}

fn into_http(invocation: InvocationResponse) -> Response {
    let status = StatusCode::from_u16(invocation.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut response = (status, invocation.body).into_response();

    for (name, value) in invocation.headers {
        if let Ok(name) = HeaderName::from_bytes(name.as_bytes()) {
            response.headers_mut().insert(name, HeaderValue::from_static(value));
        }
    }

    response
}
