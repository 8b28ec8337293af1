use thiserror::Error;

/// Uniform fault model for every invocation that passes through the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// Request shape or types wrong; never retried automatically.
    #[error("invalid params: {0}")]
    InvalidParams(String),
    #[error("unknown tool: {0}")]
    NotFound(String),
    /// The collaborator failed. Carries the fault's message verbatim.
    #[error("{0}")]
    HandlerFailure(String),
    #[error("rate limited; retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

impl DispatchError {
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::InvalidParams(_) => "InvalidParams",
            DispatchError::NotFound(_) => "NotFound",
            DispatchError::HandlerFailure(_) => "HandlerFailure",
            DispatchError::RateLimited { .. } => "RateLimited",
        }
    }

    /// Whether a caller may reasonably retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::HandlerFailure(_) | DispatchError::RateLimited { .. }
        )
    }
}

/// Fault raised by a handler adapter or the collaborator it wraps.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Message(String),
    #[error("{0} not configured")]
    NotConfigured(&'static str),
    #[error("upstream status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed upstream response: {0}")]
    Decode(String),
}

impl ToolError {
    /// 5xx and transport faults are worth another attempt; 4xx are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ToolError::Upstream { status, .. } => *status >= 500,
            ToolError::Transport(_) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("tool already registered: {0}")]
    DuplicateName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handler_failure_displays_message_verbatim() {
        let e = DispatchError::HandlerFailure("connection refused".into());
        assert_eq!(e.to_string(), "connection refused");
        assert_eq!(e.kind(), "HandlerFailure");
    }

    #[test]
    fn only_transient_faults_are_retryable() {
        assert!(!DispatchError::InvalidParams("x".into()).is_retryable());
        assert!(!DispatchError::NotFound("x".into()).is_retryable());
        assert!(DispatchError::HandlerFailure("x".into()).is_retryable());
        assert!(DispatchError::RateLimited { retry_after_secs: 3 }.is_retryable());
    }

    #[test]
    fn not_configured_names_setting() {
        let e = ToolError::NotConfigured("CHROMA_URL");
        assert_eq!(e.to_string(), "CHROMA_URL not configured");
        assert!(!e.is_transient());
    }

    #[test]
    fn upstream_5xx_is_transient() {
        let e = ToolError::Upstream { status: 503, body: "busy".into() };
        assert!(e.is_transient());
        let e = ToolError::Upstream { status: 404, body: "missing".into() };
        assert!(!e.is_transient());
    }

    #[test]
    fn duplicate_name_mentions_tool() {
        let e = RegistryError::DuplicateName("query_collection".into());
        assert!(e.to_string().contains("query_collection"));
    }
}
