use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::core::sanitize::{sanitize, SanitizeError};

pub const NAME_LEN: (usize, usize) = (2, 100);
pub const MESSAGE_LEN: (usize, usize) = (10, 5000);
const EMAIL_MAX: usize = 254;
const SERVICE_MAX: usize = 200;
const PHONE_MAX: usize = 50;

/// Raw form body. Every field is optional here so that missing fields surface
/// as validation messages rather than deserialization failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub service_interest: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A submission that passed validation; every field is already sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub full_name: String,
    pub email: String,
    pub service_interest: String,
    pub message: String,
    pub phone: Option<String>,
}

fn is_email(candidate: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(candidate))
}

fn field_error(label: &str, e: SanitizeError) -> String {
    match e {
        SanitizeError::Empty => format!("{label} is required"),
        SanitizeError::TooShort { min } => format!("{label} must be at least {min} characters"),
        SanitizeError::TooLong { max } => format!("{label} must not exceed {max} characters"),
    }
}

impl ContactForm {
    /// Checks every field and collects all failures, in field order.
    pub fn validate(self) -> Result<Submission, Vec<String>> {
        let mut errors = Vec::new();
        let mut check = |label: &str, raw: Option<&str>, (min, max): (usize, usize)| {
            match sanitize(raw.unwrap_or_default(), min, max) {
                Ok(v) => Some(v),
                Err(e) => {
                    errors.push(field_error(label, e));
                    None
                }
            }
        };

        let full_name = check("Full name", self.full_name.as_deref(), NAME_LEN);
        let email = check("Email", self.email.as_deref(), (1, EMAIL_MAX))
            .map(|e| e.to_lowercase());
        let email_ok = email.as_deref().map(is_email);
        let service_interest = check("Service interest", self.service_interest.as_deref(), (1, SERVICE_MAX));
        let message = check("Message", self.message.as_deref(), MESSAGE_LEN);
        let phone = match self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => check("Phone number", Some(p), (1, PHONE_MAX)),
            None => None,
        };

        if email_ok == Some(false) {
            // Keep the format message in the email's slot.
            let at = usize::from(full_name.is_none());
            errors.insert(at, "Invalid email format".to_owned());
        }

        match (full_name, email, service_interest, message) {
            (Some(full_name), Some(email), Some(service_interest), Some(message)) if errors.is_empty() => {
                Ok(Submission { full_name, email, service_interest, message, phone })
            }
            _ => Err(errors),
        }
    }
}
