use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;

use crate::core::error::ToolError;
use crate::domain::{CheckoutSession, PaymentGateway};
use crate::infra::config::PaymentsConfig;
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::make_http_client_with;

pub const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Creates subscription checkout sessions through the Stripe REST API.
#[derive(Clone)]
pub struct StripeRemote {
    base: String,
    secret_key: String,
    price_id: String,
    public_url: String,
    http: Client,
}

impl StripeRemote {
    pub fn from_config(cfg: &PaymentsConfig) -> Result<Self, ToolError> {
        let secret_key = cfg
            .secret_key
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ToolError::NotConfigured("STRIPE_SECRET_KEY"))?;
        let price_id = cfg
            .price_id
            .clone()
            .filter(|s| !s.trim().is_empty())
            .ok_or(ToolError::NotConfigured("STRIPE_PRICE_ID"))?;
        Ok(Self {
            base: cfg.http.base_url().unwrap_or(DEFAULT_API_BASE).trim_end_matches('/').to_owned(),
            secret_key,
            price_id,
            public_url: cfg.public_url.trim_end_matches('/').to_owned(),
            http: make_http_client_with(&cfg.http)?,
        })
    }

    fn form(&self, user_id: &str) -> Vec<(&'static str, String)> {
        vec![
            ("mode", "subscription".into()),
            ("payment_method_types[0]", "card".into()),
            ("line_items[0][price]", self.price_id.clone()),
            ("line_items[0][quantity]", "1".into()),
            ("success_url", format!("{}/dashboard", self.public_url)),
            ("cancel_url", format!("{}/auth/login", self.public_url)),
            ("metadata[userId]", user_id.to_owned()),
        ]
    }
}

#[async_trait]
impl PaymentGateway for StripeRemote {
    // Not retried: a repeated POST could open a second session.
    async fn create_checkout_session(&self, user_id: &str) -> Result<CheckoutSession, ToolError> {
        let url = format!("{}/v1/checkout/sessions", self.base);
        let (builder, rid) = add_standard_headers(self.http.post(url), None);
        let start = Instant::now();
        let resp = builder
            .bearer_auth(&self.secret_key)
            .form(&self.form(user_id))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(request_id = %rid, status = status.as_u16(), "stripe checkout failed");
            crate::infra::logging::log_metric("stripe.checkout", "remote_error_total", 1.0);
            return Err(ToolError::Upstream { status: status.as_u16(), body });
        }
        let session = resp
            .json::<CheckoutSession>()
            .await
            .map_err(|e| ToolError::Decode(e.to_string()))?;
        crate::infra::logging::log_metric(
            "stripe.checkout",
            "remote_latency_ms",
            start.elapsed().as_millis() as f64,
        );
        Ok(session)
    }
}
