//! Typed client for the knowledge-base HTTP API
//!
//! All business logic (storage, merge semantics, tagging, QA generation)
//! lives on the server; this module is the wire contract plus a thin
//! reqwest wrapper.

pub mod client;
pub mod error;
pub mod types;

pub use client::{get_client, ClientConfig, KnowledgeApi, KnowledgeClient};
pub use error::RequestError;
