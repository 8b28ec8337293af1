use std::net::SocketAddr;
use std::sync::Arc;

use crate::clients::mail_relay::MailRelayRemote;
use crate::contact::ContactService;
use crate::core::dispatch::Dispatcher;
use crate::domain::{Mailer, Unconfigured};
use crate::infra::config::{AppConfig, Mode};
use crate::infra::http_app::{build_app, AppParts};
use crate::tools::build_registry;

pub fn build_dispatcher(cfg: &AppConfig) -> anyhow::Result<Dispatcher> {
    let registry = build_registry(cfg)?;
    Ok(Dispatcher::new(registry).with_call_timeout(cfg.server.call_timeout()))
}

pub fn build_contact(cfg: &AppConfig) -> Arc<ContactService> {
    let mailer: Arc<dyn Mailer> = match MailRelayRemote::from_config(&cfg.mail) {
        Ok(relay) => Arc::new(relay),
        Err(e) => {
            tracing::warn!(error = %e, "contact form cannot deliver mail");
            Arc::new(Unconfigured("MAIL_RELAY_URL"))
        }
    };
    Arc::new(ContactService::new(cfg.contact.clone(), mailer, cfg.server.call_timeout()))
}

pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    tracing::info!(
        mode = %cfg.server.mode,
        port = cfg.server.port,
        deprecate_rest = cfg.server.deprecate_rest,
        "BOOT concierge-mcp-gateway"
    );

    let dispatcher = build_dispatcher(&cfg)?;
    if cfg.server.mode == Mode::Stdio {
        return crate::infra::mcp::serve_stdio(dispatcher).await;
    }

    let app = build_app(
        AppParts { dispatcher, contact: build_contact(&cfg) },
        &cfg.server,
    );
    let addr: SocketAddr = ([0, 0, 0, 0], cfg.server.port).into();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatcher_uses_configured_timeout() {
        let mut cfg = AppConfig::default();
        cfg.server.call_timeout_ms = 2500;
        let d = build_dispatcher(&cfg).unwrap();
        assert_eq!(d.call_timeout(), std::time::Duration::from_millis(2500));
        assert_eq!(d.descriptors().count(), 8);
    }

    #[tokio::test]
    async fn contact_without_relay_reports_delivery_failure() {
        let svc = build_contact(&AppConfig::default());
        let form = crate::contact::ContactForm {
            full_name: Some("Ada Lovelace".into()),
            email: Some("ada@example.com".into()),
            service_interest: Some("Dining".into()),
            message: Some("A table for four on Friday please.".into()),
            phone: None,
        };
        let err = svc.submit("anonymous", form).await.unwrap_err();
        assert_eq!(err, crate::contact::ContactError::Delivery("MAIL_RELAY_URL not configured".into()));
    }
}
