//! Plain JSON-RPC shim over the dispatcher at `POST /v1/rpc`.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value as J};

use crate::core::content::{envelope, InvocationRequest};
use crate::core::dispatch::Dispatcher;
use crate::core::error::DispatchError;
use crate::core::mcp::{RpcReq, RpcResp, METHOD_NOT_FOUND};
use crate::infra::http::json as http_json;

pub fn server_info() -> J {
    json!({
        "serverInfo": { "name": env!("CARGO_PKG_NAME"), "version": env!("CARGO_PKG_VERSION") },
        "capabilities": { "tools": {} }
    })
}

pub fn tools_list(dispatcher: &Dispatcher) -> J {
    let tools: Vec<J> = dispatcher
        .descriptors()
        .map(|d| json!({ "name": d.name(), "description": d.description(), "inputSchema": d.input_schema() }))
        .collect();
    json!({ "tools": tools })
}

/// Handler failures stay in the result (`isError: true`); client faults become RPC errors.
async fn call_tool(dispatcher: &Dispatcher, id: J, params: J) -> RpcResp {
    let request = match InvocationRequest::from_value(params) {
        Ok(r) => r,
        Err(e) => return http_json::from_dispatch_error(id, &e).0,
    };
    let tool = request.tool_name.clone();
    let result = dispatcher.dispatch(request).await;
    match &result {
        Err(DispatchError::HandlerFailure(msg)) => {
            tracing::warn!(%tool, error = %msg, "tools.call handler failure");
        }
        Err(e) => return http_json::from_dispatch_error(id, e).0,
        Ok(_) => {}
    }
    http_json::ok(id, envelope(&result)).0
}

/// Malformed bodies get HTTP 400 carrying a JSON-RPC parse error.
pub async fn http(State(dispatcher): State<Dispatcher>, body: Bytes) -> (StatusCode, Json<RpcResp>) {
    let req: RpcReq = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, http_json::parse_error(format!("parse error: {e}")))
        }
    };
    tracing::debug!(method = %req.method, id = ?req.id, "rpc request");
    let id = req.id.clone();
    let resp = match req.method.as_str() {
        "initialize" => http_json::ok(id, server_info()).0,
        "shutdown" => http_json::ok(id, J::Null).0,
        "tools.list" | "tools/list" => http_json::ok(id, tools_list(&dispatcher)).0,
        "tools.call" | "tools/call" => call_tool(&dispatcher, id, req.params).await,
        other => http_json::error(id, METHOD_NOT_FOUND, format!("unknown method: {other}")).0,
    };
    tracing::trace!(response = ?resp, "rpc response");
    (StatusCode::OK, Json(resp))
}
