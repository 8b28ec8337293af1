//! Core types & traits: domain-agnostic contracts for tools, dispatch and protocol.

pub mod content;
pub mod dispatch;
pub mod error;
pub mod mcp;
pub mod rate_limit;
pub mod registry;
pub mod sanitize;
pub mod tool;

pub use content::{ContentBlock, InvocationRequest, InvocationResult, ToolResponse};
pub use dispatch::Dispatcher;
pub use error::{DispatchError, RegistryError, ToolError};
pub use registry::Registry;
pub use tool::{FieldKind, JsonObject, ToolDescriptor, ToolHandler, ToolOutput};
