use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::RequestBuilder;

static REQUEST_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generate a request id suitable for logging/correlation.
pub fn generate_request_id() -> String {
    let now = chrono::Utc::now();
    let seq = REQUEST_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("gw-{}-{seq}", now.timestamp_millis())
}

/// Add standard headers to an outgoing request. Returns the updated builder and the request id used.
pub fn add_standard_headers(
    builder: RequestBuilder,
    request_id: Option<String>,
) -> (RequestBuilder, String) {
    let rid = request_id.unwrap_or_else(generate_request_id);
    let b = builder.header("x-request-id", rid.as_str()).header(
        reqwest::header::USER_AGENT,
        format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    );
    (b, rid)
}
