use axum::Json;
use serde_json::json;

use crate::core::error::DispatchError;
use crate::core::mcp::{code_for, err as rpc_err, ok as rpc_ok, RpcResp, PARSE_ERROR};

pub fn ok(id: serde_json::Value, result: serde_json::Value) -> Json<RpcResp> {
    Json(rpc_ok(id, result))
}

pub fn error(id: serde_json::Value, code: i32, message: impl Into<String>) -> Json<RpcResp> {
    Json(rpc_err(id, code, message, None))
}

pub fn parse_error(message: impl Into<String>) -> Json<RpcResp> {
    Json(rpc_err(serde_json::Value::Null, PARSE_ERROR, message, None))
}

/// Map a client-side dispatch fault onto a JSON-RPC error, keeping the fault kind in `data`.
pub fn from_dispatch_error(id: serde_json::Value, e: &DispatchError) -> Json<RpcResp> {
    let mut data = json!({ "kind": e.kind() });
    if let DispatchError::RateLimited { retry_after_secs } = e {
        data["retryAfterSecs"] = json!(retry_after_secs);
    }
    Json(rpc_err(id, code_for(e), e.to_string(), Some(data)))
}
