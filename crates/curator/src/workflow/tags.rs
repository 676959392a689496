//! Per-file tag editing
//!
//! The editor holds a local buffer seeded from the file's persisted tags.
//! Saving replaces the buffer with the server's canonical list; a failed
//! request leaves the buffer exactly as the user left it.

use tracing::warn;

use crate::api::client::KnowledgeApi;
use crate::api::error::RequestError;
use crate::api::types::{KnowledgeFile, TagUpdateRequest};

/// Sentinel tag entry that asks the server to generate tags instead of
/// storing the buffer verbatim
pub const AUTO_GENERATE_SENTINEL: &str = "auto:generate";

/// Local tag buffer for one file
#[derive(Debug, Clone)]
pub struct TagEditor {
  file_id: i64,
  model: String,
  buffer: Vec<String>,
}

impl TagEditor {
  /// Seed the buffer from a file's comma-joined tag list
  pub fn from_file(file: &KnowledgeFile, model: impl Into<String>) -> Self {
    let buffer = file
      .tags
      .as_deref()
      .unwrap_or("")
      .split(',')
      .map(str::trim)
      .filter(|tag| !tag.is_empty())
      .map(str::to_string)
      .collect();
    Self { file_id: file.id, model: model.into(), buffer }
  }

  /// Append a tag unless it is blank or already present (exact match, no
  /// normalization); returns whether the buffer changed
  pub fn add_tag(&mut self, value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() || self.buffer.iter().any(|tag| tag == value) {
      return false;
    }
    self.buffer.push(value.to_string());
    true
  }

  /// Remove an exact match; returns whether the buffer changed
  pub fn remove_tag(&mut self, value: &str) -> bool {
    let before = self.buffer.len();
    self.buffer.retain(|tag| tag != value);
    self.buffer.len() != before
  }

  pub fn tags(&self) -> &[String] {
    &self.buffer
  }

  pub fn file_id(&self) -> i64 {
    self.file_id
  }

  /// Persist the buffer; on success adopt the server's canonical list
  pub async fn save(&mut self, api: &dyn KnowledgeApi) -> Result<(), RequestError> {
    let request =
      TagUpdateRequest { tags: self.buffer.clone(), model_name: self.model.clone() };
    self.persist(api, request).await
  }

  /// Ask the server to generate tags for the file, replacing the buffer
  /// with the result
  pub async fn auto_generate(&mut self, api: &dyn KnowledgeApi) -> Result<(), RequestError> {
    let request = TagUpdateRequest {
      tags: vec![AUTO_GENERATE_SENTINEL.to_string()],
      model_name: self.model.clone(),
    };
    self.persist(api, request).await
  }

  async fn persist(
    &mut self,
    api: &dyn KnowledgeApi,
    request: TagUpdateRequest,
  ) -> Result<(), RequestError> {
    match api.update_file_tags(self.file_id, &request).await {
      Ok(canonical) => {
        self.buffer = canonical;
        Ok(())
      }
      Err(err) => {
        // The buffer was never mutated past the user's edits, so there is
        // nothing to roll back
        warn!(file_id = self.file_id, error = %err, "failed to persist tags");
        Err(err)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::client::MockKnowledgeApi;
  use crate::api::types::FileStatus;

  fn file_with_tags(tags: Option<&str>) -> KnowledgeFile {
    KnowledgeFile {
      id: 11,
      file_name: "doc.pdf".to_string(),
      status: FileStatus::Ready,
      split_rule: None,
      tags: tags.map(str::to_string),
      remark: None,
    }
  }

  #[test]
  fn buffer_seeds_from_comma_joined_list() {
    let editor = TagEditor::from_file(&file_with_tags(Some("合同, 法务 ,")), "qwen-plus");
    assert_eq!(editor.tags(), &["合同", "法务"]);
  }

  #[test]
  fn buffer_empty_for_untagged_file() {
    let editor = TagEditor::from_file(&file_with_tags(None), "qwen-plus");
    assert!(editor.tags().is_empty());
  }

  #[test]
  fn add_tag_is_idempotent() {
    let mut editor = TagEditor::from_file(&file_with_tags(Some("合同")), "qwen-plus");
    assert!(!editor.add_tag("合同"));
    assert_eq!(editor.tags(), &["合同"]);
  }

  #[test]
  fn add_tag_is_case_sensitive() {
    let mut editor = TagEditor::from_file(&file_with_tags(Some("Legal")), "qwen-plus");
    assert!(editor.add_tag("legal"));
    assert_eq!(editor.tags(), &["Legal", "legal"]);
  }

  #[test]
  fn blank_tag_is_rejected() {
    let mut editor = TagEditor::from_file(&file_with_tags(None), "qwen-plus");
    assert!(!editor.add_tag("   "));
    assert!(editor.tags().is_empty());
  }

  #[test]
  fn remove_tag_exact_match_only() {
    let mut editor = TagEditor::from_file(&file_with_tags(Some("合同,法务")), "qwen-plus");
    assert!(!editor.remove_tag("合"));
    assert!(editor.remove_tag("合同"));
    assert_eq!(editor.tags(), &["法务"]);
  }

  #[tokio::test]
  async fn save_adopts_canonical_list() {
    let mut api = MockKnowledgeApi::new();
    api
      .expect_update_file_tags()
      .withf(|file_id, req| {
        *file_id == 11 && req.tags == vec!["合同"] && req.model_name == "qwen-plus"
      })
      .returning(|_, _| Ok(vec!["合同".to_string(), "2024".to_string()]));

    let mut editor = TagEditor::from_file(&file_with_tags(Some("合同")), "qwen-plus");
    editor.save(&api).await.unwrap();
    assert_eq!(editor.tags(), &["合同", "2024"]);
  }

  #[tokio::test]
  async fn failed_save_leaves_buffer_unchanged() {
    let mut api = MockKnowledgeApi::new();
    api.expect_update_file_tags().returning(|_, _| {
      Err(RequestError::Api { status: 500, detail: "tag store down".to_string() })
    });

    let mut editor = TagEditor::from_file(&file_with_tags(Some("合同")), "qwen-plus");
    editor.add_tag("法务");
    assert!(editor.save(&api).await.is_err());
    assert_eq!(editor.tags(), &["合同", "法务"]);
  }

  #[tokio::test]
  async fn auto_generate_sends_sentinel_and_adopts_result() {
    let mut api = MockKnowledgeApi::new();
    api
      .expect_update_file_tags()
      .withf(|_, req| req.tags == vec![AUTO_GENERATE_SENTINEL])
      .returning(|_, _| Ok(vec!["示例标签1".to_string(), "示例标签2".to_string()]));

    let mut editor = TagEditor::from_file(&file_with_tags(None), "qwen-plus");
    editor.auto_generate(&api).await.unwrap();
    assert_eq!(editor.tags(), &["示例标签1", "示例标签2"]);
  }
}
