//! Request and response types for the knowledge-base API

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

// Response Envelope
// =================

/// Standard response envelope used by most endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
  /// Service status code (200 on success, independent of HTTP status)
  pub status_code: i32,

  /// Service status message ("SUCCESS" or an error description)
  #[serde(default)]
  pub status_message: String,

  /// Response payload, absent for bare acknowledgements
  pub data: Option<T>,
}

// Knowledge Bases
// ===============

/// A knowledge base record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBase {
  /// Server-assigned identifier
  pub id: i64,

  /// Display name
  pub name: String,

  /// Free-form description
  #[serde(default)]
  pub description: Option<String>,

  /// Owning user id
  #[serde(default)]
  pub user_id: i64,

  /// Embedding model backing this knowledge base
  #[serde(default)]
  pub model: Option<String>,

  /// Creation timestamp as reported by the server
  #[serde(default)]
  pub create_time: Option<String>,

  /// Last update timestamp as reported by the server
  #[serde(default)]
  pub update_time: Option<String>,

  /// Availability state; anything other than 1 means the base is not ready
  #[serde(default = "default_state")]
  pub state: i32,

  /// Whether the server allows copying this knowledge base
  #[serde(default)]
  pub copiable: bool,
}

fn default_state() -> i32 {
  1
}

/// A page of knowledge bases
#[derive(Debug, Serialize, Deserialize)]
pub struct KnowledgePage {
  /// Records on this page
  pub data: Vec<KnowledgeBase>,

  /// Total record count across all pages
  pub total: u64,
}

/// Request body for creating a knowledge base
#[derive(Debug, Serialize, Deserialize)]
pub struct KnowledgeCreate {
  /// Display name
  pub name: String,

  /// Free-form description
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,

  /// Embedding model to back the new knowledge base
  #[serde(skip_serializing_if = "Option::is_none")]
  pub model: Option<String>,
}

/// Request body for updating a knowledge base
#[derive(Debug, Serialize, Deserialize)]
pub struct KnowledgeUpdate {
  /// Identifier of the knowledge base to update
  pub knowledge_id: i64,

  /// New display name
  #[serde(skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,

  /// New description
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

// Merge
// =====

/// How the server resolves duplicate documents during a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
  /// Keep the target's copy, skip the incoming duplicate
  #[default]
  Skip,
  /// Replace the target's copy with the incoming document
  Overwrite,
  /// Keep both, renaming the incoming document
  Rename,
}

/// Request body for merging knowledge bases into a target
#[derive(Debug, Serialize, Deserialize)]
pub struct MergeRequest {
  /// Knowledge bases to fold into the target
  pub source_ids: Vec<i64>,

  /// Knowledge base receiving the merged documents
  pub target_id: i64,

  /// Optional new name for the target
  #[serde(skip_serializing_if = "Option::is_none")]
  pub target_name: Option<String>,

  /// Duplicate-document resolution policy
  pub duplicate_handler: DuplicatePolicy,
}

/// Merge result payload
#[derive(Debug, Serialize, Deserialize)]
pub struct MergeResult {
  /// Number of documents moved into the target
  #[serde(default)]
  pub merged_count: u64,

  /// Server-provided status message
  #[serde(default)]
  pub message: String,
}

// Files
// =====

/// Processing status of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum FileStatus {
  /// Parsing/embedding still running on the backend
  Processing,
  /// Parsed and queryable
  Ready,
  /// Parsing failed; eligible for retry
  Failed,
  /// Status code this client does not know about
  Other(i32),
}

impl From<i32> for FileStatus {
  fn from(code: i32) -> Self {
    match code {
      1 => FileStatus::Processing,
      2 => FileStatus::Ready,
      3 => FileStatus::Failed,
      other => FileStatus::Other(other),
    }
  }
}

impl From<FileStatus> for i32 {
  fn from(status: FileStatus) -> i32 {
    match status {
      FileStatus::Processing => 1,
      FileStatus::Ready => 2,
      FileStatus::Failed => 3,
      FileStatus::Other(code) => code,
    }
  }
}

/// A file record inside a knowledge base
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeFile {
  /// Server-assigned identifier
  pub id: i64,

  /// Display name, including the original suffix
  pub file_name: String,

  /// Processing status
  pub status: FileStatus,

  /// Serialized split rule; absent on legacy records
  #[serde(default)]
  pub split_rule: Option<String>,

  /// Comma-joined tag list
  #[serde(default)]
  pub tags: Option<String>,

  /// Server-generated summary, used by the metadata export
  #[serde(default)]
  pub remark: Option<String>,
}

/// A page of files plus the caller's write permission
#[derive(Debug, Serialize, Deserialize)]
pub struct FilePage {
  /// Records on this page
  pub data: Vec<KnowledgeFile>,

  /// Total record count across all pages
  pub total: u64,

  /// Whether the caller may mutate this knowledge base
  #[serde(default)]
  pub writeable: bool,
}

/// Request body for retrying failed files
#[derive(Debug, Serialize, Deserialize)]
pub struct RetryRequest {
  /// The failed file records, as returned by the file list
  pub file_objs: Vec<KnowledgeFile>,
}

// Tags
// ====

/// Request body for the per-file tag endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct TagUpdateRequest {
  /// Tags to store verbatim, or a single `auto:` entry requesting generation
  pub tags: Vec<String>,

  /// Model used when the server generates tags
  pub model_name: String,
}

/// Response of the per-file tag endpoint (not enveloped)
#[derive(Debug, Serialize, Deserialize)]
pub struct TagUpdateResponse {
  /// Operation status
  #[serde(default)]
  pub status: String,

  /// Canonical tag list after the server normalized it
  pub tags: Vec<String>,
}

/// Response of the knowledge-base tag listing (not enveloped)
#[derive(Debug, Serialize, Deserialize)]
pub struct KnowledgeTagsResponse {
  /// All tags present in the knowledge base
  pub tags: Vec<String>,
}

// Models and QA Generation
// ========================

/// An available generation model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
  /// Identifier passed back in generation requests
  pub id: String,

  /// Human-readable name
  pub name: String,
}

/// Response of the model listing (not enveloped)
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelsResponse {
  /// Models currently online
  pub models: Vec<ModelInfo>,
}

/// Request body for QA pair generation
#[derive(Debug, Serialize, Deserialize)]
pub struct QaGenerationRequest {
  /// Files to generate questions from
  pub file_ids: Vec<i64>,

  /// Generation model identifier
  pub model_id: String,

  /// Optional verification model; the key is omitted when unset
  #[serde(skip_serializing_if = "Option::is_none")]
  pub verify_model_id: Option<String>,

  /// Questions to generate per file
  pub question_count: u32,

  /// Optional custom prompt; the key is omitted when unset
  #[serde(skip_serializing_if = "Option::is_none")]
  pub prompt: Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn merge_request_wire_shape() {
    let req = MergeRequest {
      source_ids: vec![2, 3],
      target_id: 1,
      target_name: None,
      duplicate_handler: DuplicatePolicy::Overwrite,
    };

    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(
      value,
      serde_json::json!({
        "source_ids": [2, 3],
        "target_id": 1,
        "duplicate_handler": "overwrite",
      })
    );
  }

  #[test]
  fn merge_request_includes_rename_when_set() {
    let req = MergeRequest {
      source_ids: vec![5],
      target_id: 4,
      target_name: Some("combined".to_string()),
      duplicate_handler: DuplicatePolicy::Skip,
    };

    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value["target_name"], "combined");
    assert_eq!(value["duplicate_handler"], "skip");
  }

  #[test]
  fn file_status_round_trips_known_and_unknown_codes() {
    assert_eq!(FileStatus::from(1), FileStatus::Processing);
    assert_eq!(FileStatus::from(2), FileStatus::Ready);
    assert_eq!(FileStatus::from(3), FileStatus::Failed);
    assert_eq!(FileStatus::from(9), FileStatus::Other(9));
    assert_eq!(i32::from(FileStatus::Other(9)), 9);
  }

  #[test]
  fn envelope_tolerates_missing_data() {
    let envelope: Envelope<MergeResult> =
      serde_json::from_str(r#"{"status_code": 200, "status_message": "SUCCESS"}"#).unwrap();
    assert_eq!(envelope.status_code, 200);
    assert!(envelope.data.is_none());
  }

  // Mirrors how the client parses envelopes: only a DeserializeOwned bound,
  // so Envelope must not demand Default from its payload type
  fn parse_envelope<T: serde::de::DeserializeOwned>(raw: &str) -> Envelope<T> {
    serde_json::from_str(raw).unwrap()
  }

  #[test]
  fn envelope_parses_with_only_a_deserialize_bound() {
    let envelope: Envelope<MergeResult> =
      parse_envelope(r#"{"status_code": 200, "status_message": "SUCCESS"}"#);
    assert!(envelope.data.is_none());

    let envelope: Envelope<MergeResult> = parse_envelope(
      r#"{"status_code": 200, "status_message": "SUCCESS", "data": {"merged_count": 2, "message": "ok"}}"#,
    );
    assert_eq!(envelope.data.unwrap().merged_count, 2);
  }

  #[test]
  fn file_page_defaults_writeable_to_false() {
    let page: FilePage = serde_json::from_str(r#"{"data": [], "total": 0}"#).unwrap();
    assert!(!page.writeable);
  }
}
