//! Collaborator ports and the data that crosses them.

pub mod topic;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::ToolError;
use crate::core::tool::JsonObject;

pub use topic::{Topic, TopicFamily};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub metadata: Option<JsonObject>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewDocuments {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Option<Vec<JsonObject>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    pub collection_name: String,
    pub query_texts: Vec<String>,
    pub n_results: u32,
    pub where_filter: Option<JsonObject>,
    pub where_document: Option<JsonObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMatch {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<JsonObject>,
}

/// Matches for one query text, in the order the store ranked them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryGroup {
    pub query: String,
    pub matches: Vec<QueryMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub results: Vec<QueryGroup>,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn create_collection(&self, name: &str) -> Result<CollectionInfo, ToolError>;
    async fn get_collection(&self, name: &str) -> Result<CollectionInfo, ToolError>;
    async fn delete_collection(&self, name: &str) -> Result<(), ToolError>;
    /// Returns the number of documents stored.
    async fn add_documents(&self, collection: &str, docs: NewDocuments) -> Result<usize, ToolError>;
    async fn query(&self, params: QueryParams) -> Result<QueryResponse, ToolError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout_session(&self, user_id: &str) -> Result<CheckoutSession, ToolError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<(), ToolError>;
}

/// Stand-in used when a collaborator has no configuration; every call fails
/// with a message naming the missing setting so the server still boots.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured(pub &'static str);

#[async_trait]
impl VectorStore for Unconfigured {
    async fn create_collection(&self, _name: &str) -> Result<CollectionInfo, ToolError> {
        Err(ToolError::NotConfigured(self.0))
    }
    async fn get_collection(&self, _name: &str) -> Result<CollectionInfo, ToolError> {
        Err(ToolError::NotConfigured(self.0))
    }
    async fn delete_collection(&self, _name: &str) -> Result<(), ToolError> {
        Err(ToolError::NotConfigured(self.0))
    }
    async fn add_documents(&self, _c: &str, _d: NewDocuments) -> Result<usize, ToolError> {
        Err(ToolError::NotConfigured(self.0))
    }
    async fn query(&self, _p: QueryParams) -> Result<QueryResponse, ToolError> {
        Err(ToolError::NotConfigured(self.0))
    }
}

#[async_trait]
impl PaymentGateway for Unconfigured {
    async fn create_checkout_session(&self, _user_id: &str) -> Result<CheckoutSession, ToolError> {
        Err(ToolError::NotConfigured(self.0))
    }
}

#[async_trait]
impl Mailer for Unconfigured {
    async fn send(&self, _email: &OutboundEmail) -> Result<(), ToolError> {
        Err(ToolError::NotConfigured(self.0))
    }
}
