//! Adapters exposing a [`VectorStore`] as five MCP tools.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::error::ToolError;
use crate::core::tool::{
    opt_arg, str_arg, string_list_arg, FieldKind, JsonObject, ToolDescriptor, ToolHandler,
    ToolOutput,
};
use crate::domain::{NewDocuments, QueryParams, VectorStore};

pub const DEFAULT_N_RESULTS: u32 = 10;

pub struct CreateCollection {
    store: Arc<dyn VectorStore>,
}

impl CreateCollection {
    pub const NAME: &'static str = "create_collection";

    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(Self::NAME, "Create a new collection in the vector store")
            .required("name", FieldKind::String, "Name of the collection to create")
    }
}

#[async_trait]
impl ToolHandler for CreateCollection {
    async fn call(&self, arguments: &JsonObject) -> Result<ToolOutput, ToolError> {
        let name = str_arg(arguments, "name")?;
        self.store.create_collection(name).await?;
        Ok(ToolOutput::Text(format!("Collection '{name}' created successfully.")))
    }
}

pub struct AddDocuments {
    store: Arc<dyn VectorStore>,
}

impl AddDocuments {
    pub const NAME: &'static str = "add_documents";

    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(Self::NAME, "Add documents to a collection")
            .required("collection_name", FieldKind::String, "Name of the collection")
            .required("documents", FieldKind::StringArray, "Documents to add")
            .required("ids", FieldKind::StringArray, "One unique id per document")
            .optional("metadatas", FieldKind::ObjectArray, "Optional metadata per document")
            .same_length(&["documents", "ids", "metadatas"])
    }
}

#[async_trait]
impl ToolHandler for AddDocuments {
    async fn call(&self, arguments: &JsonObject) -> Result<ToolOutput, ToolError> {
        let collection = str_arg(arguments, "collection_name")?;
        let documents = string_list_arg(arguments, "documents")?;
        let ids = string_list_arg(arguments, "ids")?;
        let metadatas = opt_arg(arguments, "metadatas")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(|m| m.as_object().cloned()).collect());

        let added = self
            .store
            .add_documents(collection, NewDocuments { ids, documents, metadatas })
            .await?;
        Ok(ToolOutput::Text(format!(
            "Added {added} documents to collection '{collection}'."
        )))
    }
}

pub struct QueryCollection {
    store: Arc<dyn VectorStore>,
}

impl QueryCollection {
    pub const NAME: &'static str = "query_collection";

    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(Self::NAME, "Query a collection for the documents nearest to each query text")
            .required("collection_name", FieldKind::String, "Name of the collection to query")
            .required("query_texts", FieldKind::StringArray, "Texts to search for")
            .optional("n_results", FieldKind::PositiveInteger, "Matches per query text (default 10)")
            .optional("where", FieldKind::Object, "Metadata filter")
            .optional("where_document", FieldKind::Object, "Document content filter")
    }
}

fn n_results(arguments: &JsonObject) -> u32 {
    opt_arg(arguments, "n_results")
        .and_then(|v| v.as_u64())
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(DEFAULT_N_RESULTS)
}

#[async_trait]
impl ToolHandler for QueryCollection {
    async fn call(&self, arguments: &JsonObject) -> Result<ToolOutput, ToolError> {
        let params = QueryParams {
            collection_name: str_arg(arguments, "collection_name")?.to_owned(),
            query_texts: string_list_arg(arguments, "query_texts")?,
            n_results: n_results(arguments),
            where_filter: opt_arg(arguments, "where").and_then(|v| v.as_object().cloned()),
            where_document: opt_arg(arguments, "where_document").and_then(|v| v.as_object().cloned()),
        };
        let response = self.store.query(params).await?;
        let json = serde_json::to_value(&response).map_err(|e| ToolError::Decode(e.to_string()))?;
        Ok(ToolOutput::Json(json))
    }
}

pub struct GetCollection {
    store: Arc<dyn VectorStore>,
}

impl GetCollection {
    pub const NAME: &'static str = "get_collection";

    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(Self::NAME, "Check that a collection exists")
            .required("name", FieldKind::String, "Name of the collection")
    }
}

#[async_trait]
impl ToolHandler for GetCollection {
    async fn call(&self, arguments: &JsonObject) -> Result<ToolOutput, ToolError> {
        let name = str_arg(arguments, "name")?;
        self.store.get_collection(name).await?;
        Ok(ToolOutput::Text(format!("Collection '{name}' exists.")))
    }
}

pub struct DeleteCollection {
    store: Arc<dyn VectorStore>,
}

impl DeleteCollection {
    pub const NAME: &'static str = "delete_collection";

    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(Self::NAME, "Delete a collection and all of its documents")
            .required("name", FieldKind::String, "Name of the collection to delete")
    }
}

#[async_trait]
impl ToolHandler for DeleteCollection {
    async fn call(&self, arguments: &JsonObject) -> Result<ToolOutput, ToolError> {
        let name = str_arg(arguments, "name")?;
        self.store.delete_collection(name).await?;
        Ok(ToolOutput::Text(format!("Collection '{name}' deleted successfully.")))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{CollectionInfo, QueryGroup, QueryMatch, QueryResponse};
    use serde_json::json;
    use std::sync::Mutex;

    /// In-memory store recording the last query it saw.
    #[derive(Default)]
    pub(crate) struct StubStore {
        pub last_query: Mutex<Option<QueryParams>>,
        pub added: Mutex<Vec<NewDocuments>>,
    }

    #[async_trait]
    impl VectorStore for StubStore {
        async fn create_collection(&self, name: &str) -> Result<CollectionInfo, ToolError> {
            Ok(CollectionInfo { id: "c-1".into(), name: name.into(), metadata: None })
        }
        async fn get_collection(&self, name: &str) -> Result<CollectionInfo, ToolError> {
            if name == "missing" {
                return Err(ToolError::Message("Collection missing does not exist.".into()));
            }
            Ok(CollectionInfo { id: "c-1".into(), name: name.into(), metadata: None })
        }
        async fn delete_collection(&self, _name: &str) -> Result<(), ToolError> {
            Ok(())
        }
        async fn add_documents(&self, _c: &str, docs: NewDocuments) -> Result<usize, ToolError> {
            let n = docs.documents.len();
            self.added.lock().unwrap().push(docs);
            Ok(n)
        }
        async fn query(&self, params: QueryParams) -> Result<QueryResponse, ToolError> {
            let query = params.query_texts[0].clone();
            *self.last_query.lock().unwrap() = Some(params);
            Ok(QueryResponse {
                results: vec![QueryGroup {
                    query,
                    matches: vec![
                        QueryMatch { id: "b".into(), document: Some("beta".into()), distance: Some(0.1), metadata: None },
                        QueryMatch { id: "a".into(), document: Some("alpha".into()), distance: Some(0.3), metadata: None },
                    ],
                }],
            })
        }
    }

    fn args(v: serde_json::Value) -> JsonObject {
        v.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn create_reports_name() {
        let tool = CreateCollection::new(Arc::new(StubStore::default()));
        let out = tool.call(&args(json!({"name": "docs"}))).await.unwrap();
        assert_eq!(out, ToolOutput::Text("Collection 'docs' created successfully.".into()));
    }

    #[tokio::test]
    async fn add_counts_documents_and_keeps_metadata() {
        let store = Arc::new(StubStore::default());
        let tool = AddDocuments::new(store.clone());
        let out = tool
            .call(&args(json!({
                "collection_name": "docs",
                "documents": ["x", "y"],
                "ids": ["1", "2"],
                "metadatas": [{"k": 1}, {"k": 2}]
            })))
            .await
            .unwrap();
        assert_eq!(out, ToolOutput::Text("Added 2 documents to collection 'docs'.".into()));
        let added = store.added.lock().unwrap();
        assert_eq!(added[0].metadatas.as_ref().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn query_defaults_n_results_and_passes_filters() {
        let store = Arc::new(StubStore::default());
        let tool = QueryCollection::new(store.clone());
        let out = tool
            .call(&args(json!({
                "collection_name": "docs",
                "query_texts": ["hello"],
                "where": {"lang": "en"},
                "where_document": null
            })))
            .await
            .unwrap();
        let seen = store.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(seen.n_results, DEFAULT_N_RESULTS);
        assert_eq!(seen.where_filter.unwrap()["lang"], "en");
        assert!(seen.where_document.is_none());
        let ToolOutput::Json(v) = out else { panic!("expected json output") };
        assert_eq!(v["results"][0]["matches"][0]["id"], "b");
    }

    #[tokio::test]
    async fn query_passes_explicit_n_results() {
        let store = Arc::new(StubStore::default());
        let tool = QueryCollection::new(store.clone());
        tool.call(&args(json!({"collection_name": "d", "query_texts": ["q"], "n_results": 3})))
            .await
            .unwrap();
        assert_eq!(store.last_query.lock().unwrap().as_ref().unwrap().n_results, 3);
    }

    #[tokio::test]
    async fn get_propagates_store_fault() {
        let tool = GetCollection::new(Arc::new(StubStore::default()));
        let err = tool.call(&args(json!({"name": "missing"}))).await.unwrap_err();
        assert_eq!(err.to_string(), "Collection missing does not exist.");
        let ok = tool.call(&args(json!({"name": "docs"}))).await.unwrap();
        assert_eq!(ok, ToolOutput::Text("Collection 'docs' exists.".into()));
    }

    #[tokio::test]
    async fn delete_reports_name() {
        let tool = DeleteCollection::new(Arc::new(StubStore::default()));
        let out = tool.call(&args(json!({"name": "old"}))).await.unwrap();
        assert_eq!(out, ToolOutput::Text("Collection 'old' deleted successfully.".into()));
    }
}
