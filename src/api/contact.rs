use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::contact::{ContactError, ContactForm, ContactService};

pub const ANONYMOUS: &str = "anonymous";

/// The peer address, else [`ANONYMOUS`]. Behind a trusted proxy, the last
/// `X-Forwarded-For` hop (the one the proxy appended) wins instead.
pub fn caller_identity(headers: &HeaderMap, peer: Option<SocketAddr>, trust_proxy: bool) -> String {
    let forwarded = trust_proxy
        .then(|| headers.get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit(',').map(str::trim).find(|hop| !hop.is_empty()))
        .map(str::to_owned);
    forwarded
        .or_else(|| peer.map(|p| p.ip().to_string()))
        .unwrap_or_else(|| ANONYMOUS.to_owned())
}

fn failure(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "success": false, "message": message }))).into_response()
}

pub async fn submit(
    State(service): State<Arc<ContactService>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let identity = caller_identity(
        &headers,
        peer.map(|ConnectInfo(addr)| addr),
        service.trusts_proxy(),
    );
    let form: ContactForm = match serde_json::from_slice(&body) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(error = %e, "contact body rejected");
            let body = json!({
                "success": false,
                "message": "Validation failed",
                "errors": ["Request body must be a JSON object"],
            });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };

    match service.submit(&identity, form).await {
        Ok(receipt) => Json(json!({
            "success": true,
            "message": receipt.message,
            "submissionId": receipt.submission_id,
        }))
        .into_response(),
        Err(ContactError::Validation(errors)) => {
            let body = json!({ "success": false, "message": "Validation failed", "errors": errors });
            (StatusCode::BAD_REQUEST, Json(body)).into_response()
        }
        Err(e @ ContactError::RateLimited { retry_after_secs }) => {
            tracing::info!(%identity, retry_after_secs, "contact submission rate limited");
            let body = json!({
                "success": false,
                "message": e.to_string(),
                "retryAfterSecs": retry_after_secs,
            });
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(body),
            )
                .into_response()
        }
        Err(e @ ContactError::Delivery(_)) => failure(StatusCode::BAD_GATEWAY, e.to_string()),
    }
}
