//! MCP server integration (stdio + Streamable HTTP) over the dispatcher.
//!
//! `tools/list` renders registry descriptors; `tools/call` goes through
//! [`Dispatcher::dispatch`] and the outcome is mapped onto MCP:
//! handler failures stay in-band (`isError: true`), client faults become
//! JSON-RPC errors.

use std::future::Future;
use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorCode, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
pub use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt};
use serde_json::json;

use crate::core::content::{InvocationRequest, InvocationResult};
use crate::core::dispatch::Dispatcher;
use crate::core::error::DispatchError;

/// The MCP server handler. One per session; all share the dispatcher.
#[derive(Clone)]
pub struct GatewaySvc {
    dispatcher: Dispatcher,
}

impl GatewaySvc {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher
            .descriptors()
            .map(|d| {
                Tool::new(
                    d.name().to_owned(),
                    d.description().to_owned(),
                    Arc::new(d.input_schema()),
                )
            })
            .collect()
    }

    pub async fn invoke(&self, request: CallToolRequestParam) -> Result<CallToolResult, McpError> {
        let invocation =
            InvocationRequest::new(request.name.to_string(), request.arguments.unwrap_or_default());
        to_mcp(self.dispatcher.dispatch(invocation).await)
    }
}

pub fn to_mcp(result: InvocationResult) -> Result<CallToolResult, McpError> {
    match result {
        Ok(resp) => Ok(CallToolResult::success(
            resp.content.into_iter().map(|b| Content::text(b.text)).collect(),
        )),
        Err(DispatchError::HandlerFailure(msg)) => {
            Ok(CallToolResult::error(vec![Content::text(format!("Error: {msg}"))]))
        }
        Err(e @ DispatchError::InvalidParams(_)) => Err(McpError::invalid_params(e.to_string(), None)),
        Err(e @ DispatchError::NotFound(_)) => {
            Err(McpError::new(ErrorCode::METHOD_NOT_FOUND, e.to_string(), None))
        }
        Err(e @ DispatchError::RateLimited { retry_after_secs }) => Err(McpError::invalid_params(
            e.to_string(),
            Some(json!({ "retryAfterSecs": retry_after_secs })),
        )),
    }
}

impl ServerHandler for GatewaySvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Vector store, documentation and checkout tools. Call tools/list for schemas.".into(),
            ),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(self.tools())))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        self.invoke(request)
    }
}

/// Serve MCP over stdin/stdout until the peer disconnects.
pub async fn serve_stdio(dispatcher: Dispatcher) -> anyhow::Result<()> {
    let running = GatewaySvc::new(dispatcher)
        .serve(rmcp::transport::stdio())
        .await
        .inspect_err(|e| tracing::error!(error = ?e, "stdio session failed to start"))?;
    let reason = running.waiting().await?;
    tracing::info!(?reason, "stdio session ended");
    Ok(())
}

pub type GatewayHttpService = StreamableHttpService<GatewaySvc, LocalSessionManager>;

pub fn make_streamable_http_service(
    dispatcher: Dispatcher,
    session_mgr: Arc<LocalSessionManager>,
) -> GatewayHttpService {
    let cfg = StreamableHttpServerConfig::default();
    tracing::debug!(stateful_mode = %cfg.stateful_mode, keep_alive = ?cfg.sse_keep_alive, "streamable http config");
    StreamableHttpService::new(move || Ok(GatewaySvc::new(dispatcher.clone())), session_mgr, cfg)
}
