//! JSON-RPC 2.0 envelope used by the `/v1/rpc` shim.

use serde::{Deserialize, Serialize};
use serde_json::Value as J;

use crate::core::error::DispatchError;

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

#[derive(Deserialize, Debug)]
pub struct RpcReq {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: J,
    pub method: String,
    #[serde(default)]
    pub params: J,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResp {
    pub jsonrpc: String,
    pub id: J,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<J>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErr>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcErr {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<J>,
}

pub fn ok(id: J, result: J) -> RpcResp {
    RpcResp { jsonrpc: "2.0".into(), id, result: Some(result), error: None }
}

pub fn err(id: J, code: i32, msg: impl Into<String>, data: Option<J>) -> RpcResp {
    RpcResp {
        jsonrpc: "2.0".into(),
        id,
        result: None,
        error: Some(RpcErr { code, message: msg.into(), data }),
    }
}

/// Protocol error code for a client fault. Handler failures are not protocol
/// errors; they travel inside the result with `isError: true`.
pub fn code_for(e: &DispatchError) -> i32 {
    match e {
        DispatchError::InvalidParams(_) | DispatchError::RateLimited { .. } => INVALID_PARAMS,
        DispatchError::NotFound(_) => METHOD_NOT_FOUND,
        DispatchError::HandlerFailure(_) => INTERNAL_ERROR,
    }
}
