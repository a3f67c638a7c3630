//! MCP server handler implementation.
//!
//! Exposes the lookup pipeline as a single `og_tag` tool for stdio clients.
use std::sync::Arc;

use ogtag_core::Envelope;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult, PaginatedRequestParam,
        ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::pipeline::{self, AppContext};
use crate::request;

/// Input parameters for the og_tag tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OgTagParams {
    /// The page URL whose Open Graph tags should be returned.
    pub url: String,
}

/// The MCP server handler for ogtag.
#[derive(Clone)]
pub struct OgTagServer {
    ctx: Arc<AppContext>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl OgTagServer {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx, tool_router: Self::tool_router() }
    }

    /// Look up a page's Open Graph tags.
    ///
    /// Failures are reported as tool errors carrying the same JSON body the
    /// HTTP transport returns.
    #[tool(description = "Return the Open Graph tags of a web page as a flat JSON object. Results are cached per day.")]
    async fn og_tag(&self, params: Parameters<OgTagParams>) -> Result<CallToolResult, McpError> {
        Ok(lookup_result(&self.ctx, params.0).await)
    }
}

async fn lookup_result(ctx: &AppContext, params: OgTagParams) -> CallToolResult {
    let result = match request::require_url(Some(params.url)) {
        Ok(url) => pipeline::lookup(ctx, &url, ctx.today()).await,
        Err(e) => Err(e),
    };

    let envelope = Envelope::from(result);
    let content = vec![Content::text(envelope.body())];

    if envelope.is_success() { CallToolResult::success(content) } else { CallToolResult::error(content) }
}

impl ServerHandler for OgTagServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "ogtag".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::tests::{ARTICLE_HTML, mount_page, test_context};
    use wiremock::MockServer;

    #[tokio::test]
    async fn test_tool_is_listed() {
        let server = OgTagServer::new(Arc::new(test_context().await));
        let tools = server.tool_router.list_all();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "og_tag");
    }

    #[tokio::test]
    async fn test_lookup_success() {
        let upstream = MockServer::start().await;
        mount_page(&upstream, "/a", ARTICLE_HTML.as_bytes().to_vec(), "text/html; charset=utf-8", 1).await;

        let ctx = test_context().await;
        let result = lookup_result(&ctx, OgTagParams { url: format!("{}/a", upstream.uri()) }).await;

        assert_eq!(result.is_error, Some(false));
    }

    #[tokio::test]
    async fn test_lookup_empty_url() {
        let ctx = test_context().await;
        let result = lookup_result(&ctx, OgTagParams { url: String::new() }).await;

        assert_eq!(result.is_error, Some(true));
    }
}
