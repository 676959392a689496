//! CLI command handlers and terminal display helpers

pub mod commands;
pub mod display;
