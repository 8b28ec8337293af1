use std::time::Duration;

use crate::core::error::ToolError;
use crate::infra::config::ToolConfig;

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_TIMEOUT_MS: u64 = 6_000;
pub const DEFAULT_RETRIES: u32 = 2;

/// Build a reqwest client with sane defaults (timeouts from config, no redirects).
pub fn make_http_client_with(cfg: &ToolConfig) -> Result<reqwest::Client, ToolError> {
    let connect = cfg.connect_timeout_ms.unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS);
    let total = cfg.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
    reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(connect))
        .timeout(Duration::from_millis(total))
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(ToolError::from)
}

/// Exponential backoff for async ops. Stops early when `should_retry` says no.
pub async fn retry_async<T, E, Fut, F, P>(mut attempts: u32, should_retry: P, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut try_num: u32 = 0;
    let mut delay_ms: u64 = 50;
    loop {
        match op(try_num).await {
            Ok(v) => return Ok(v),
            Err(e) => {
                if attempts == 0 || !should_retry(&e) {
                    return Err(e);
                }
                attempts -= 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                delay_ms = (delay_ms * 2).min(1_000);
                try_num += 1;
            }
        }
    }
}
