//! Curator - Knowledge Base Management Client
//!
//! A CLI client for a remote knowledge-base service: browse and search
//! knowledge bases, merge them, manage per-file tags, watch file parsing
//! progress, and generate question-answer pairs from uploaded documents.

pub mod api;
pub mod cli;
pub mod workflow;
