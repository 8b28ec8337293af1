use std::sync::Arc;

use crate::clients::chroma::ChromaRemote;
use crate::clients::stripe::StripeRemote;
use crate::core::error::{RegistryError, ToolError};
use crate::core::registry::Registry;
use crate::domain::{PaymentGateway, Unconfigured, VectorStore};
use crate::infra::config::AppConfig;
use crate::tools::docs::DocsByTopic;
use crate::tools::payments::CreateCheckoutSession;
use crate::tools::vector::{
    AddDocuments, CreateCollection, DeleteCollection, GetCollection, QueryCollection,
};

/// Collaborators the default tool set is built over.
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn VectorStore>,
    pub payments: Arc<dyn PaymentGateway>,
}

impl Collaborators {
    /// Concrete clients where configured; [`Unconfigured`] stand-ins otherwise.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let store: Arc<dyn VectorStore> = match ChromaRemote::from_config(&cfg.vector) {
            Ok(c) => Arc::new(c),
            Err(e) => {
                log_fallback("vector store", &e);
                Arc::new(Unconfigured("CHROMA_URL"))
            }
        };
        let payments: Arc<dyn PaymentGateway> = match StripeRemote::from_config(&cfg.payments) {
            Ok(c) => Arc::new(c),
            Err(ToolError::NotConfigured(setting)) => {
                tracing::info!(setting, "payments disabled");
                Arc::new(Unconfigured(setting))
            }
            Err(e) => {
                log_fallback("payments", &e);
                Arc::new(Unconfigured("STRIPE_SECRET_KEY"))
            }
        };
        Self { store, payments }
    }
}

fn log_fallback(what: &str, e: &ToolError) {
    match e {
        ToolError::NotConfigured(setting) => tracing::info!(setting, "{what} disabled"),
        other => tracing::warn!(error = %other, "{what} client unavailable"),
    }
}

pub fn build_registry(cfg: &AppConfig) -> Result<Registry, RegistryError> {
    registry_with(Collaborators::from_config(cfg))
}

/// The full tool set, in `tools/list` order.
pub fn registry_with(c: Collaborators) -> Result<Registry, RegistryError> {
    let mut reg = Registry::new();
    reg.register(CreateCollection::descriptor(), Arc::new(CreateCollection::new(c.store.clone())))?;
    reg.register(AddDocuments::descriptor(), Arc::new(AddDocuments::new(c.store.clone())))?;
    reg.register(QueryCollection::descriptor(), Arc::new(QueryCollection::new(c.store.clone())))?;
    reg.register(GetCollection::descriptor(), Arc::new(GetCollection::new(c.store.clone())))?;
    reg.register(DeleteCollection::descriptor(), Arc::new(DeleteCollection::new(c.store)))?;

    for docs in [DocsByTopic::react(), DocsByTopic::general()] {
        reg.register(docs.descriptor(), Arc::new(docs))?;
    }

    reg.register(
        CreateCheckoutSession::descriptor(),
        Arc::new(CreateCheckoutSession::new(c.payments)),
    )?;
    Ok(reg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::content::InvocationRequest;
    use crate::core::dispatch::Dispatcher;
    use crate::core::error::DispatchError;
    use crate::core::tool::JsonObject;
    use crate::tools::vector::tests::StubStore;
    use serde_json::json;

    fn args(v: serde_json::Value) -> JsonObject {
        v.as_object().cloned().unwrap()
    }

    fn stubbed() -> Dispatcher {
        let reg = registry_with(Collaborators {
            store: Arc::new(StubStore::default()),
            payments: Arc::new(Unconfigured("STRIPE_SECRET_KEY")),
        })
        .unwrap();
        Dispatcher::new(reg)
    }

    #[test]
    fn default_registry_lists_every_tool_in_order() {
        let reg = build_registry(&AppConfig::default()).unwrap();
        let names: Vec<&str> = reg.descriptors().map(|d| d.name()).collect();
        assert_eq!(
            names,
            [
                "create_collection",
                "add_documents",
                "query_collection",
                "get_collection",
                "delete_collection",
                "GetReactDocsByTopic",
                "GetGeneralDocsByTopic",
                "create_checkout_session",
            ]
        );
    }

    #[tokio::test]
    async fn query_returns_one_block_with_matches_in_store_order() {
        let resp = stubbed()
            .dispatch(InvocationRequest::new(
                "query_collection",
                args(json!({"collection_name": "docs", "query_texts": ["hello"], "n_results": 2})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.content.len(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&resp.content[0].text).unwrap();
        let ids: Vec<&str> = parsed["results"][0]["matches"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[tokio::test]
    async fn missing_collection_name_is_invalid_params() {
        let err = stubbed()
            .dispatch(InvocationRequest::new("query_collection", args(json!({"query_texts": ["q"]}))))
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::InvalidParams("missing required field: collection_name".into()));
    }

    #[tokio::test]
    async fn malformed_vector_arguments_stop_at_the_dispatcher() {
        let store = Arc::new(StubStore::default());
        let d = Dispatcher::new(
            registry_with(Collaborators {
                store: store.clone(),
                payments: Arc::new(Unconfigured("STRIPE_SECRET_KEY")),
            })
            .unwrap(),
        );

        let err = d
            .dispatch(InvocationRequest::new(
                "query_collection",
                args(json!({"collection_name": "docs", "query_texts": ["q"], "n_results": 2.5})),
            ))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidParams");
        assert!(!err.is_retryable());
        assert!(store.last_query.lock().unwrap().is_none());

        let err = d
            .dispatch(InvocationRequest::new(
                "add_documents",
                args(json!({"collection_name": "docs", "documents": ["x"], "ids": ["1", "2"]})),
            ))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::InvalidParams("field 'ids' must have as many items as 'documents' (2 vs 1)".into())
        );
        assert!(store.added.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_topic_is_caught_by_the_dispatcher() {
        let err = stubbed()
            .dispatch(InvocationRequest::new("GetReactDocsByTopic", args(json!({"topic": "cooking"}))))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "InvalidParams");
    }

    #[tokio::test]
    async fn unconfigured_payments_fail_with_setting_name() {
        let err = stubbed()
            .dispatch(InvocationRequest::new("create_checkout_session", args(json!({"user_id": "u1"}))))
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::HandlerFailure("STRIPE_SECRET_KEY not configured".into()));
    }
}
