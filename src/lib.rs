//! Tool gateway for MCP clients: a validated tool registry and dispatcher over
//! vector-store, documentation and payment collaborators, served over stdio,
//! Streamable HTTP and a JSON-RPC shim, plus a rate-limited contact form.

pub mod api;
pub mod cli;
pub mod clients;
pub mod contact;
pub mod core;
pub mod domain;
pub mod infra;
pub mod tools;
