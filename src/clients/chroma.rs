use std::time::Instant;

use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::core::error::ToolError;
use crate::core::tool::JsonObject;
use crate::domain::{
    CollectionInfo, NewDocuments, QueryGroup, QueryMatch, QueryParams, QueryResponse, VectorStore,
};
use crate::infra::config::ToolConfig;
use crate::infra::http::headers::add_standard_headers;
use crate::infra::runtime::limits::{make_http_client_with, retry_async, DEFAULT_RETRIES};

/// Chroma REST (v1) client.
#[derive(Clone)]
pub struct ChromaRemote {
    base: Url,
    http: Client,
    retries: u32,
}

impl ChromaRemote {
    pub fn new(base: impl Into<String>) -> Result<Self, ToolError> {
        Self::from_config(&ToolConfig { base_url: Some(base.into()), ..Default::default() })
    }

    pub fn from_config(cfg: &ToolConfig) -> Result<Self, ToolError> {
        let raw = cfg.base_url().ok_or(ToolError::NotConfigured("CHROMA_URL"))?;
        let base = Url::parse(raw).map_err(|e| ToolError::Message(format!("invalid CHROMA_URL: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ToolError::Message(format!("invalid CHROMA_URL: {raw}")));
        }
        Ok(Self {
            base,
            http: make_http_client_with(cfg)?,
            retries: cfg.retries.unwrap_or(DEFAULT_RETRIES),
        })
    }

    /// `{base}/api/v1/<segments>`, each segment escaped on its own so names
    /// cannot reach other endpoints.
    fn url(&self, segments: &[&str]) -> Result<Url, ToolError> {
        if let Some(bad) = segments.iter().find(|s| s.is_empty() || matches!(**s, "." | "..")) {
            return Err(ToolError::Message(format!("invalid collection name: '{bad}'")));
        }
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ToolError::Message("invalid CHROMA_URL".into()))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        op: &'static str,
        method: Method,
        segments: &[&str],
        body: Option<JsonValue>,
    ) -> Result<T, ToolError> {
        let url = self.url(segments)?;
        let start = Instant::now();
        let res = retry_async(self.retries, ToolError::is_transient, |_| {
            let builder = self.http.request(method.clone(), url.as_str());
            let (builder, _rid) = add_standard_headers(builder, None);
            let builder = match &body {
                Some(b) => builder.json(b),
                None => builder,
            };
            async move {
                let resp = builder.send().await?;
                let status = resp.status();
                if !status.is_success() {
                    let body = resp.text().await.unwrap_or_default();
                    return Err(ToolError::Upstream { status: status.as_u16(), body });
                }
                let bytes = resp.bytes().await?;
                // DELETE answers with an empty body.
                let bytes: &[u8] = if bytes.is_empty() { b"null" } else { &bytes };
                serde_json::from_slice::<T>(bytes).map_err(|e| ToolError::Decode(e.to_string()))
            }
        })
        .await;

        match &res {
            Ok(_) => {
                let elapsed_ms = start.elapsed().as_millis() as f64;
                crate::infra::logging::log_metric(op, "remote_latency_ms", elapsed_ms);
            }
            Err(e) => {
                tracing::warn!(op, error = %e, "chroma request failed");
                crate::infra::logging::log_metric(op, "remote_error_total", 1.0);
            }
        }
        res
    }
}

#[derive(Deserialize)]
struct QueryWire {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f64>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<JsonObject>>>>,
}

fn column<T: Clone>(col: &Option<Vec<Vec<Option<T>>>>, q: usize, i: usize) -> Option<T> {
    col.as_ref()
        .and_then(|rows| rows.get(q))
        .and_then(|row| row.get(i))
        .cloned()
        .flatten()
}

impl QueryWire {
    /// Chroma answers column-wise; regroup into one match list per query text.
    fn into_response(self, query_texts: &[String]) -> QueryResponse {
        let results = self
            .ids
            .iter()
            .enumerate()
            .map(|(q, ids)| QueryGroup {
                query: query_texts.get(q).cloned().unwrap_or_default(),
                matches: ids
                    .iter()
                    .enumerate()
                    .map(|(i, id)| QueryMatch {
                        id: id.clone(),
                        document: column(&self.documents, q, i),
                        distance: column(&self.distances, q, i),
                        metadata: column(&self.metadatas, q, i),
                    })
                    .collect(),
            })
            .collect();
        QueryResponse { results }
    }
}

#[async_trait]
impl VectorStore for ChromaRemote {
    async fn create_collection(&self, name: &str) -> Result<CollectionInfo, ToolError> {
        self.send("chroma.create_collection", Method::POST, &["collections"], Some(json!({ "name": name })))
            .await
    }

    async fn get_collection(&self, name: &str) -> Result<CollectionInfo, ToolError> {
        self.send("chroma.get_collection", Method::GET, &["collections", name], None)
            .await
    }

    async fn delete_collection(&self, name: &str) -> Result<(), ToolError> {
        let _: JsonValue = self
            .send("chroma.delete_collection", Method::DELETE, &["collections", name], None)
            .await?;
        Ok(())
    }

    async fn add_documents(&self, collection: &str, docs: NewDocuments) -> Result<usize, ToolError> {
        let info = self.get_collection(collection).await?;
        let count = docs.documents.len();
        let mut body = json!({ "ids": docs.ids, "documents": docs.documents });
        if let Some(metadatas) = docs.metadatas {
            body["metadatas"] = json!(metadatas);
        }
        let _: JsonValue = self
            .send("chroma.add", Method::POST, &["collections", info.id.as_str(), "add"], Some(body))
            .await?;
        Ok(count)
    }

    async fn query(&self, params: QueryParams) -> Result<QueryResponse, ToolError> {
        let info = self.get_collection(&params.collection_name).await?;
        let mut body = json!({
            "query_texts": params.query_texts,
            "n_results": params.n_results,
            "include": ["documents", "metadatas", "distances"],
        });
        if let Some(w) = params.where_filter {
            body["where"] = JsonValue::Object(w);
        }
        if let Some(wd) = params.where_document {
            body["where_document"] = JsonValue::Object(wd);
        }
        let wire: QueryWire = self
            .send("chroma.query", Method::POST, &["collections", info.id.as_str(), "query"], Some(body))
            .await?;
        Ok(wire.into_response(&params.query_texts))
    }
}
