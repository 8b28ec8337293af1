pub mod docs;
pub mod payments;
pub mod registry;
pub mod vector;

pub use registry::{build_registry, registry_with, Collaborators};
