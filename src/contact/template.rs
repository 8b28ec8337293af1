use chrono::{DateTime, Utc};

use crate::contact::form::Submission;
use crate::domain::OutboundEmail;
use crate::infra::config::ContactConfig;

pub const SUBJECT: &str = "New Contact Form Submission";

/// Submission plus the delivery context the email reports alongside it.
pub struct Envelope<'a> {
    pub submission: &'a Submission,
    pub submission_id: &'a str,
    pub identity: &'a str,
    pub received_at: DateTime<Utc>,
}

/// Sanitized fields never contain angle brackets; this covers the rest.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('"', "&quot;")
}

pub fn compose(cfg: &ContactConfig, env: &Envelope<'_>) -> OutboundEmail {
    let s = env.submission;
    let when = env.received_at.format("%B %-d, %Y at %H:%M:%S UTC").to_string();

    let mut text = format!(
        "{SUBJECT}\n\nFull Name: {}\nEmail: {}\n",
        s.full_name, s.email
    );
    if let Some(phone) = &s.phone {
        text.push_str(&format!("Phone: {phone}\n"));
    }
    text.push_str(&format!(
        "Service Interest: {}\n\nMessage:\n{}\n\n---\nSubmission: {}\nReceived: {}\nFrom: {}\n",
        s.service_interest, s.message, env.submission_id, when, env.identity
    ));

    let field = |label: &str, value: &str| {
        format!("<tr><th align=\"left\">{label}</th><td>{}</td></tr>", escape(value))
    };
    let mut rows = vec![
        field("Full Name", &s.full_name),
        format!(
            "<tr><th align=\"left\">Email</th><td><a href=\"mailto:{0}\">{0}</a></td></tr>",
            escape(&s.email)
        ),
    ];
    if let Some(phone) = &s.phone {
        rows.push(field("Phone", phone));
    }
    rows.push(field("Service Interest", &s.service_interest));

    let html = format!(
        "<!DOCTYPE html><html><body>\
         <h2>{SUBJECT}</h2>\
         <table>{}</table>\
         <h3>Message</h3><p style=\"white-space: pre-wrap\">{}</p>\
         <hr><p><small>Submission {} received {} from {}</small></p>\
         </body></html>",
        rows.join(""),
        escape(&s.message),
        escape(env.submission_id),
        when,
        escape(env.identity),
    );

    OutboundEmail {
        from: cfg.sender.clone(),
        to: cfg.recipient.clone(),
        reply_to: Some(s.email.clone()),
        subject: format!("{SUBJECT} - {}", s.service_interest),
        text,
        html,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn submission(phone: Option<&str>) -> Submission {
        Submission {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            service_interest: "Travel & Events".into(),
            message: "Please call me about the gala.".into(),
            phone: phone.map(str::to_owned),
        }
    }

    fn render(s: &Submission) -> OutboundEmail {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 5, 0).unwrap();
        compose(
            &ContactConfig::default(),
            &Envelope { submission: s, submission_id: "CNT-1-000001", identity: "203.0.113.9", received_at: at },
        )
    }

    #[test]
    fn addresses_come_from_config_and_reply_goes_to_sender() {
        let mail = render(&submission(None));
        let cfg = ContactConfig::default();
        assert_eq!(mail.to, cfg.recipient);
        assert_eq!(mail.from, cfg.sender);
        assert_eq!(mail.reply_to.as_deref(), Some("ada@example.com"));
        assert_eq!(mail.subject, "New Contact Form Submission - Travel & Events");
    }

    #[test]
    fn text_body_lists_fields_and_context() {
        let mail = render(&submission(Some("+353 1 555 0100")));
        assert!(mail.text.contains("Full Name: Ada Lovelace"));
        assert!(mail.text.contains("Phone: +353 1 555 0100"));
        assert!(mail.text.contains("Received: March 14, 2026 at 09:05:00 UTC"));
        assert!(mail.text.contains("From: 203.0.113.9"));
    }

    #[test]
    fn phone_row_only_when_present() {
        assert!(!render(&submission(None)).html.contains("Phone"));
        assert!(render(&submission(Some("123"))).html.contains("<th align=\"left\">Phone</th>"));
    }

    #[test]
    fn html_escapes_ampersands() {
        let mail = render(&submission(None));
        assert!(mail.html.contains("Travel &amp; Events"));
    }
}
