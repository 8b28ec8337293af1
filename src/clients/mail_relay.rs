use async_trait::async_trait;
use reqwest::Client;

use crate::core::error::ToolError;
use crate::domain::{Mailer, OutboundEmail};
use crate::infra::config::MailConfig;
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::{make_http_client_with, retry_async, DEFAULT_RETRIES};

/// Hands composed messages to an HTTP mail relay (`POST {base}/send`).
#[derive(Clone)]
pub struct MailRelayRemote {
    base: String,
    token: Option<String>,
    http: Client,
    retries: u32,
}

impl MailRelayRemote {
    pub fn from_config(cfg: &MailConfig) -> Result<Self, ToolError> {
        let base = cfg.http.base_url().ok_or(ToolError::NotConfigured("MAIL_RELAY_URL"))?;
        Ok(Self {
            base: base.trim_end_matches('/').to_owned(),
            token: cfg.token.clone().filter(|t| !t.trim().is_empty()),
            http: make_http_client_with(&cfg.http)?,
            retries: cfg.http.retries.unwrap_or(DEFAULT_RETRIES),
        })
    }
}

#[async_trait]
impl Mailer for MailRelayRemote {
    async fn send(&self, email: &OutboundEmail) -> Result<(), ToolError> {
        let url = format!("{}/send", self.base);
        let res = retry_async(self.retries, ToolError::is_transient, |_| {
            let (mut builder, _rid) = add_standard_headers(self.http.post(url.as_str()), None);
            if let Some(token) = &self.token {
                builder = builder.bearer_auth(token);
            }
            let builder = builder.json(email);
            async move {
                let resp = builder.send().await?;
                let status = resp.status();
                if status.is_success() {
                    Ok(())
                } else {
                    let body = resp.text().await.unwrap_or_default();
                    Err(ToolError::Upstream { status: status.as_u16(), body })
                }
            }
        })
        .await;
        if let Err(e) = &res {
            tracing::warn!(error = %e, "mail relay rejected message");
            crate::infra::logging::log_metric("mail.send", "remote_error_total", 1.0);
        }
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::config::ToolConfig;
    use httpmock::prelude::*;
    use serde_json::json;

    fn email() -> OutboundEmail {
        OutboundEmail {
            from: "noreply@example.com".into(),
            to: "desk@example.com".into(),
            reply_to: Some("ada@example.com".into()),
            subject: "New Contact Form Submission".into(),
            text: "hello".into(),
            html: "<p>hello</p>".into(),
        }
    }

    fn relay(server: &MockServer, token: Option<&str>) -> MailRelayRemote {
        MailRelayRemote::from_config(&MailConfig {
            http: ToolConfig { base_url: Some(server.base_url()), retries: Some(0), ..Default::default() },
            token: token.map(str::to_owned),
        })
        .unwrap()
    }

    #[test]
    fn missing_url_is_not_configured() {
        let err = MailRelayRemote::from_config(&MailConfig::default()).err().unwrap();
        assert_eq!(err.to_string(), "MAIL_RELAY_URL not configured");
    }

    #[tokio::test]
    async fn it_posts_json_message_with_token() {
        let server = MockServer::start();
        let m = server.mock(|when, then| {
            when.method(POST)
                .path("/send")
                .header("authorization", "Bearer relay-secret")
                .json_body(json!({
                    "from": "noreply@example.com",
                    "to": "desk@example.com",
                    "reply_to": "ada@example.com",
                    "subject": "New Contact Form Submission",
                    "text": "hello",
                    "html": "<p>hello</p>"
                }));
            then.status(202);
        });
        relay(&server, Some("relay-secret")).send(&email()).await.unwrap();
        m.assert();
    }

    #[tokio::test]
    async fn rejection_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/send");
            then.status(422).body("bad recipient");
        });
        let err = relay(&server, None).send(&email()).await.unwrap_err();
        assert_eq!(err.to_string(), "upstream status 422: bad recipient");
    }
}
