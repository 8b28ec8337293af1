use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::core::error::ToolError;
use crate::core::tool::{str_arg, FieldKind, JsonObject, ToolDescriptor, ToolHandler, ToolOutput};
use crate::domain::PaymentGateway;

pub struct CreateCheckoutSession {
    gateway: Arc<dyn PaymentGateway>,
}

impl CreateCheckoutSession {
    pub const NAME: &'static str = "create_checkout_session";

    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    pub fn descriptor() -> ToolDescriptor {
        ToolDescriptor::new(Self::NAME, "Start a subscription checkout session for a user")
            .required("user_id", FieldKind::String, "Id of the subscribing user")
    }
}

#[async_trait]
impl ToolHandler for CreateCheckoutSession {
    async fn call(&self, arguments: &JsonObject) -> Result<ToolOutput, ToolError> {
        let user_id = str_arg(arguments, "user_id")?.trim();
        if user_id.is_empty() {
            return Err(ToolError::Message("user_id must not be empty".into()));
        }
        let session = self.gateway.create_checkout_session(user_id).await?;
        Ok(ToolOutput::Json(json!({ "id": session.id, "url": session.url })))
    }
}
