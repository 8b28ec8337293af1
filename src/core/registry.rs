use std::collections::HashMap;
use std::sync::Arc;

use crate::core::error::RegistryError;
use crate::core::tool::{ToolDescriptor, ToolHandler};

struct Entry {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
}

/// Authoritative list of invocable tools, in registration order.
///
/// Built once at startup and then moved into a `Dispatcher`, which only ever
/// reads it.
#[derive(Default)]
pub struct Registry {
    entries: Vec<Entry>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        descriptor: ToolDescriptor,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), RegistryError> {
        if self.by_name.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateName(descriptor.name().to_owned()));
        }
        self.by_name.insert(descriptor.name().to_owned(), self.entries.len());
        self.entries.push(Entry { descriptor, handler });
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<(&ToolDescriptor, &Arc<dyn ToolHandler>)> {
        self.by_name
            .get(name)
            .and_then(|&idx| self.entries.get(idx))
            .map(|e| (&e.descriptor, &e.handler))
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.entries.iter().map(|e| &e.descriptor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ToolError;
    use crate::core::tool::{FieldKind, JsonObject, ToolOutput};
    use async_trait::async_trait;

    struct Fixed(&'static str);

    #[async_trait]
    impl ToolHandler for Fixed {
        async fn call(&self, _args: &JsonObject) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::Text(self.0.into()))
        }
    }

    fn descriptor(name: &str) -> ToolDescriptor {
        ToolDescriptor::new(name, "test tool").required("name", FieldKind::String, "Name")
    }

    #[test]
    fn lookup_returns_registered_pair() {
        let mut reg = Registry::new();
        let handler: Arc<dyn ToolHandler> = Arc::new(Fixed("a"));
        reg.register(descriptor("get_collection"), handler.clone()).unwrap();

        let (d, h) = reg.lookup("get_collection").expect("registered");
        assert_eq!(d, &descriptor("get_collection"));
        assert!(Arc::ptr_eq(h, &handler));
    }

    #[test]
    fn lookup_of_unknown_name_is_none() {
        let reg = Registry::new();
        assert!(reg.lookup("nope").is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn duplicate_registration_is_rejected_and_keeps_first() {
        let mut reg = Registry::new();
        let first: Arc<dyn ToolHandler> = Arc::new(Fixed("first"));
        reg.register(descriptor("dup"), first.clone()).unwrap();
        let err = reg.register(descriptor("dup"), Arc::new(Fixed("second"))).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("dup".into()));
        assert_eq!(reg.len(), 1);
        assert!(Arc::ptr_eq(reg.lookup("dup").unwrap().1, &first));
    }

    #[test]
    fn descriptors_keep_registration_order() {
        let mut reg = Registry::new();
        for name in ["c", "a", "b"] {
            reg.register(descriptor(name), Arc::new(Fixed("x"))).unwrap();
        }
        let names: Vec<&str> = reg.descriptors().map(|d| d.name()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }
}
