//! Stateful controllers for the knowledge-base UI workflows
//!
//! Each controller owns its state exclusively; cross-controller coordination
//! happens through explicit calls (e.g. a completed merge clears the
//! selection and reloads the list), never through shared references.

pub mod files;
pub mod list;
pub mod merge;
pub mod qa;
pub mod selection;
pub mod split_rule;
pub mod tags;
