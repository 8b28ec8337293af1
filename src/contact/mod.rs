//! Contact-form submissions: validate, sanitize, rate limit, deliver by mail.

pub mod form;
pub mod template;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use crate::core::error::DispatchError;
use crate::core::rate_limit::RateLimiter;
use crate::domain::Mailer;
use crate::infra::config::ContactConfig;

pub use form::{ContactForm, Submission};

pub const THANK_YOU: &str =
    "Thank you for your inquiry! Our concierge team will contact you within 24 hours.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Validation failed")]
    Validation(Vec<String>),
    #[error("Please wait before submitting another request.")]
    RateLimited { retry_after_secs: u64 },
    #[error("We could not send your message. Please try again later.")]
    Delivery(String),
}

impl From<ContactError> for DispatchError {
    fn from(e: ContactError) -> Self {
        match e {
            ContactError::Validation(errors) => DispatchError::InvalidParams(errors.join("; ")),
            ContactError::RateLimited { retry_after_secs } => {
                DispatchError::RateLimited { retry_after_secs }
            }
            ContactError::Delivery(cause) => DispatchError::HandlerFailure(cause),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub submission_id: String,
    pub message: &'static str,
}

pub struct ContactService {
    cfg: ContactConfig,
    limiter: RateLimiter,
    mailer: Arc<dyn Mailer>,
    send_timeout: Duration,
}

fn next_submission_id() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(1);
    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    format!("CNT-{}-{seq:06}", Utc::now().timestamp_millis())
}

impl ContactService {
    pub fn new(cfg: ContactConfig, mailer: Arc<dyn Mailer>, send_timeout: Duration) -> Self {
        Self {
            limiter: RateLimiter::new(cfg.window(), cfg.max_per_window),
            cfg,
            mailer,
            send_timeout,
        }
    }

    pub fn trusts_proxy(&self) -> bool {
        self.cfg.trust_proxy
    }

    /// Only delivered submissions count toward the caller's window.
    pub async fn submit(&self, identity: &str, form: ContactForm) -> Result<Receipt, ContactError> {
        let result = self.run(identity, form).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => DispatchError::from(e.clone()).kind(),
        };
        metrics::counter!("contact_submissions_total", "outcome" => outcome).increment(1);
        result
    }

    async fn run(&self, identity: &str, form: ContactForm) -> Result<Receipt, ContactError> {
        let submission = form.validate().map_err(ContactError::Validation)?;

        let slot = self.limiter.try_acquire(identity).map_err(|e| match e {
            DispatchError::RateLimited { retry_after_secs } => {
                ContactError::RateLimited { retry_after_secs }
            }
            other => ContactError::Delivery(other.to_string()),
        })?;

        let submission_id = next_submission_id();
        let email = template::compose(
            &self.cfg,
            &template::Envelope {
                submission: &submission,
                submission_id: &submission_id,
                identity,
                received_at: Utc::now(),
            },
        );

        let sent = match tokio::time::timeout(self.send_timeout, self.mailer.send(&email)).await {
            Ok(res) => res.map_err(|e| e.to_string()),
            Err(_) => Err(format!(
                "mail delivery timed out after {}ms",
                self.send_timeout.as_millis()
            )),
        };
        if let Err(cause) = sent {
            self.limiter.release(identity, slot);
            tracing::error!(%submission_id, error = %cause, "contact delivery failed");
            return Err(ContactError::Delivery(cause));
        }

        tracing::info!(%submission_id, service = %submission.service_interest, "contact submission delivered");
        Ok(Receipt { submission_id, message: THANK_YOU })
    }
}
