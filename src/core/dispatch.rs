//! Validate-then-route boundary between transports and tool handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::content::{InvocationRequest, InvocationResult, ToolResponse};
use crate::core::error::DispatchError;
use crate::core::registry::Registry;
use crate::core::tool::{JsonObject, ToolDescriptor};

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Routes invocations through a read-only [`Registry`].
///
/// Cheap to clone; every clone shares the same registry.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
    call_timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry: Arc::new(registry),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.registry.descriptors()
    }

    pub async fn dispatch(&self, request: InvocationRequest) -> InvocationResult {
        let started = Instant::now();
        let tool = request.tool_name.clone();
        let result = self.run(request).await;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        metrics::counter!("tool_invocations_total", "tool" => tool.clone(), "outcome" => outcome)
            .increment(1);
        metrics::histogram!("tool_latency_ms", "tool" => tool.clone())
            .record(started.elapsed().as_secs_f64() * 1000.0);
        tracing::debug!(tool = %tool, outcome, elapsed_ms = started.elapsed().as_millis() as u64, "dispatch");
        result
    }

    async fn run(&self, request: InvocationRequest) -> InvocationResult {
        let (descriptor, handler) = self
            .registry
            .lookup(&request.tool_name)
            .ok_or_else(|| DispatchError::NotFound(request.tool_name.clone()))?;

        validate(descriptor, &request.arguments)?;

        // Run on its own task so a panicking handler surfaces as a JoinError
        // rather than unwinding through the transport.
        let handler = Arc::clone(handler);
        let arguments = request.arguments;
        let mut task = tokio::spawn(async move { handler.call(&arguments).await });

        match tokio::time::timeout(self.call_timeout, &mut task).await {
            Ok(Ok(Ok(output))) => Ok(ToolResponse::from_output(output)),
            Ok(Ok(Err(fault))) => Err(DispatchError::HandlerFailure(fault.to_string())),
            Ok(Err(join)) => Err(DispatchError::HandlerFailure(format!(
                "tool '{}' aborted: {join}",
                request.tool_name
            ))),
            Err(_) => {
                task.abort();
                Err(DispatchError::HandlerFailure(format!(
                    "tool '{}' timed out after {}ms",
                    request.tool_name,
                    self.call_timeout.as_millis()
                )))
            }
        }
    }
}

/// Required fields first, in declared order, then any optional fields present.
/// The first failure wins so repeated malformed calls get the same message.
pub fn validate(descriptor: &ToolDescriptor, arguments: &JsonObject) -> Result<(), DispatchError> {
    for field in descriptor.required_fields() {
        match arguments.get(field.name) {
            None | Some(serde_json::Value::Null) => {
                return Err(DispatchError::InvalidParams(format!(
                    "missing required field: {}",
                    field.name
                )));
            }
            Some(value) if !field.kind.matches(value) => {
                return Err(DispatchError::InvalidParams(format!(
                    "field '{}' must be {}",
                    field.name,
                    field.kind.label()
                )));
            }
            Some(_) => {}
        }
    }
    for field in descriptor.optional_fields() {
        if let Some(value) = arguments.get(field.name).filter(|v| !v.is_null()) {
            if !field.kind.matches(value) {
                return Err(DispatchError::InvalidParams(format!(
                    "field '{}' must be {}",
                    field.name,
                    field.kind.label()
                )));
            }
        }
    }
    for group in descriptor.same_length_groups() {
        check_same_length(group, arguments)?;
    }
    Ok(())
}

/// Every present array in `group` must match the first present one.
fn check_same_length(group: &[&str], arguments: &JsonObject) -> Result<(), DispatchError> {
    let mut present = group.iter().filter_map(|name| {
        arguments
            .get(*name)
            .and_then(serde_json::Value::as_array)
            .map(|items| (*name, items.len()))
    });
    let Some((first, expected)) = present.next() else {
        return Ok(());
    };
    match present.find(|(_, len)| *len != expected) {
        Some((name, len)) => Err(DispatchError::InvalidParams(format!(
            "field '{name}' must have as many items as '{first}' ({len} vs {expected})"
        ))),
        None => Ok(()),
    }
}
