//! QA generation workflow
//!
//! Submits a set of files plus model choices to the generation endpoint.
//! The model list is fetched on open; if that fails the workflow degrades
//! to a built-in list rather than blocking.

use thiserror::Error;
use tracing::warn;

use crate::api::client::KnowledgeApi;
use crate::api::error::RequestError;
use crate::api::types::{ModelInfo, QaGenerationRequest};

/// Questions generated per file when the user leaves the count blank
pub const DEFAULT_QUESTION_COUNT: u32 = 5;

/// Models offered when the model listing is unavailable
const FALLBACK_MODELS: &[(&str, &str)] =
  &[("qwen-plus", "Qwen Plus"), ("qwen-turbo", "Qwen Turbo"), ("gpt-4o-mini", "GPT-4o mini")];

/// Validation failure raised before any network call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QaError {
  #[error("choose a generation model first")]
  NoModel,
}

/// Why a generation request did not complete
#[derive(Debug, Error)]
pub enum QaFailure {
  #[error(transparent)]
  Validation(#[from] QaError),

  #[error("QA generation failed, please try again")]
  Request(#[source] RequestError),
}

/// Parse the user's question-count input, defaulting when blank or
/// non-numeric
pub fn parse_question_count(input: &str) -> u32 {
  input.trim().parse().unwrap_or(DEFAULT_QUESTION_COUNT)
}

fn fallback_models() -> Vec<ModelInfo> {
  FALLBACK_MODELS
    .iter()
    .map(|(id, name)| ModelInfo { id: id.to_string(), name: name.to_string() })
    .collect()
}

/// The generation dialog's state
#[derive(Debug)]
pub struct QaGenerationWorkflow {
  file_ids: Vec<i64>,
  models: Vec<ModelInfo>,
  generation_model: Option<String>,
  verify_model: Option<String>,
  question_count: u32,
  prompt: Option<String>,
}

impl QaGenerationWorkflow {
  /// Open the workflow over the given files, fetching the model list
  ///
  /// A failed fetch degrades to the built-in models so the workflow stays
  /// usable. The default generation model is the first available one.
  pub async fn open(api: &dyn KnowledgeApi, file_ids: Vec<i64>) -> Self {
    let models = match api.list_models().await {
      Ok(models) if !models.is_empty() => models,
      Ok(_) => fallback_models(),
      Err(err) => {
        warn!(error = %err, "model listing unavailable, using built-in models");
        fallback_models()
      }
    };
    let generation_model = models.first().map(|m| m.id.clone());

    Self {
      file_ids,
      models,
      generation_model,
      verify_model: None,
      question_count: DEFAULT_QUESTION_COUNT,
      prompt: None,
    }
  }

  pub fn models(&self) -> &[ModelInfo] {
    &self.models
  }

  pub fn generation_model(&self) -> Option<&str> {
    self.generation_model.as_deref()
  }

  pub fn set_model(&mut self, id: impl Into<String>) {
    self.generation_model = Some(id.into());
  }

  /// Optional verification model; blank clears it
  pub fn set_verify_model(&mut self, id: Option<String>) {
    self.verify_model = id.filter(|v| !v.trim().is_empty());
  }

  /// Optional custom prompt; blank clears it
  pub fn set_prompt(&mut self, prompt: Option<String>) {
    self.prompt = prompt.filter(|p| !p.trim().is_empty());
  }

  pub fn set_question_count(&mut self, input: &str) {
    self.question_count = parse_question_count(input);
  }

  /// Build the request body; unset optional fields are omitted entirely
  pub fn build_request(&self) -> Result<QaGenerationRequest, QaError> {
    let model_id = self.generation_model.clone().ok_or(QaError::NoModel)?;
    Ok(QaGenerationRequest {
      file_ids: self.file_ids.clone(),
      model_id,
      verify_model_id: self.verify_model.clone(),
      question_count: self.question_count,
      prompt: self.prompt.clone(),
    })
  }

  /// Validate, submit, and forward the raw result to the caller
  ///
  /// Entered values are kept on failure so the user can retry as-is.
  pub async fn submit(&self, api: &dyn KnowledgeApi) -> Result<serde_json::Value, QaFailure> {
    let request = self.build_request()?;
    api.generate_qa(&request).await.map_err(QaFailure::Request)
  }
}
