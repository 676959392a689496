//! HTTP client for the knowledge-base REST API
//!
//! A thin reqwest wrapper behind the [`KnowledgeApi`] trait so the workflow
//! controllers can be exercised against a mock in tests.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::timeout;

use crate::api::error::RequestError;
use crate::api::types::{
  Envelope, FilePage, FileStatus, KnowledgeBase, KnowledgeCreate, KnowledgeFile, KnowledgePage,
  KnowledgeTagsResponse, KnowledgeUpdate, MergeRequest, MergeResult, ModelInfo, ModelsResponse,
  QaGenerationRequest, RetryRequest, TagUpdateRequest, TagUpdateResponse,
};

/// Configuration for the knowledge-base HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
  /// Base URL of the knowledge-base server (e.g. "http://localhost:7860")
  pub base_url: String,
  /// Request timeout in seconds
  pub timeout_secs: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self { base_url: "http://localhost:7860".to_string(), timeout_secs: 30 }
  }
}

/// Operations the knowledge-base service exposes to this client
///
/// One trait, one contract: the model listing in particular goes through
/// [`KnowledgeApi::list_models`] and nothing else.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KnowledgeApi: Send + Sync {
  /// List knowledge bases, paginated and optionally filtered by name
  async fn list_knowledge<'a>(
    &self,
    page: u32,
    page_size: u32,
    name: Option<&'a str>,
  ) -> Result<KnowledgePage, RequestError>;

  /// Create a knowledge base
  async fn create_knowledge(&self, req: &KnowledgeCreate) -> Result<KnowledgeBase, RequestError>;

  /// Update a knowledge base's name or description
  async fn update_knowledge(&self, req: &KnowledgeUpdate) -> Result<(), RequestError>;

  /// Soft-delete a knowledge base
  async fn delete_knowledge(&self, knowledge_id: i64) -> Result<(), RequestError>;

  /// Copy a knowledge base; the server rejects bases that are not copiable
  async fn copy_knowledge(&self, knowledge_id: i64) -> Result<KnowledgeBase, RequestError>;

  /// Merge source knowledge bases into a target
  async fn merge_knowledge(&self, req: &MergeRequest) -> Result<MergeResult, RequestError>;

  /// List files in a knowledge base, paginated and filtered
  async fn list_files<'a>(
    &self,
    knowledge_id: i64,
    page: u32,
    page_size: u32,
    file_name: Option<&'a str>,
    status: Option<FileStatus>,
  ) -> Result<FilePage, RequestError>;

  /// Delete a file from its knowledge base
  async fn delete_file(&self, file_id: i64) -> Result<(), RequestError>;

  /// Ask the server to re-parse the given failed files
  async fn retry_files(&self, files: &[KnowledgeFile]) -> Result<(), RequestError>;

  /// Export a knowledge base's file metadata as CSV bytes
  async fn export_files(&self, knowledge_id: i64) -> Result<Vec<u8>, RequestError>;

  /// Export a knowledge base's vector data as CSV bytes
  async fn export_vectors(&self, knowledge_id: i64) -> Result<Vec<u8>, RequestError>;

  /// Import vector data from a CSV upload; returns the imported row count
  async fn import_vectors(
    &self,
    knowledge_id: i64,
    file_name: &str,
    content: Vec<u8>,
  ) -> Result<u64, RequestError>;

  /// Store or auto-generate a file's tags; returns the canonical tag list
  async fn update_file_tags(
    &self,
    file_id: i64,
    req: &TagUpdateRequest,
  ) -> Result<Vec<String>, RequestError>;

  /// List every tag present in a knowledge base
  async fn list_knowledge_tags(&self, knowledge_id: i64) -> Result<Vec<String>, RequestError>;

  /// List generation models currently online
  async fn list_models(&self) -> Result<Vec<ModelInfo>, RequestError>;

  /// Generate QA pairs from the given files
  async fn generate_qa(
    &self,
    req: &QaGenerationRequest,
  ) -> Result<serde_json::Value, RequestError>;
}

/// reqwest-backed implementation of [`KnowledgeApi`]
pub struct KnowledgeClient {
  client: Client,
  config: ClientConfig,
}

impl Default for KnowledgeClient {
  fn default() -> Self {
    Self::new()
  }
}

impl KnowledgeClient {
  /// Create a new client with default configuration
  pub fn new() -> Self {
    Self::with_config(ClientConfig::default())
  }

  /// Create a new client with custom configuration
  pub fn with_config(config: ClientConfig) -> Self {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .expect("Failed to create HTTP client");

    Self { client, config }
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api/v1/knowledge{}", self.config.base_url, path)
  }

  async fn send(
    &self,
    request: reqwest::RequestBuilder,
  ) -> Result<Response, RequestError> {
    let response =
      timeout(Duration::from_secs(self.config.timeout_secs), request.send()).await??;

    let status = response.status();
    if !status.is_success() {
      let detail = extract_detail(response).await;
      return Err(RequestError::Api { status: status.as_u16(), detail });
    }
    Ok(response)
  }

  /// Parse an enveloped response and require its data payload
  async fn enveloped<T: DeserializeOwned>(&self, response: Response) -> Result<T, RequestError> {
    let envelope: Envelope<T> = response.json().await?;
    if envelope.status_code != 200 {
      return Err(RequestError::Api {
        status: envelope.status_code.try_into().unwrap_or(500),
        detail: envelope.status_message,
      });
    }
    envelope.data.ok_or_else(|| RequestError::Decode("missing data payload".to_string()))
  }

  /// Parse an enveloped response, discarding any data payload
  async fn acknowledged(&self, response: Response) -> Result<(), RequestError> {
    let envelope: Envelope<serde_json::Value> = response.json().await?;
    if envelope.status_code != 200 {
      return Err(RequestError::Api {
        status: envelope.status_code.try_into().unwrap_or(500),
        detail: envelope.status_message,
      });
    }
    Ok(())
  }
}

/// Pull the error detail out of a failed response
///
/// The server reports failures as `{"detail": "..."}`; anything else is
/// passed through as raw text.
async fn extract_detail(response: Response) -> String {
  let text = response.text().await.unwrap_or_default();
  match serde_json::from_str::<serde_json::Value>(&text) {
    Ok(value) => value
      .get("detail")
      .and_then(|d| d.as_str())
      .map(|d| d.to_string())
      .unwrap_or(text),
    Err(_) => text,
  }
}

#[async_trait]
impl KnowledgeApi for KnowledgeClient {
  async fn list_knowledge<'a>(
    &self,
    page: u32,
    page_size: u32,
    name: Option<&'a str>,
  ) -> Result<KnowledgePage, RequestError> {
    let mut query: Vec<(&str, String)> =
      vec![("page_num", page.to_string()), ("page_size", page_size.to_string())];
    if let Some(name) = name {
      query.push(("name", name.to_string()));
    }

    let response = self.send(self.client.get(self.url("")).query(&query)).await?;
    self.enveloped(response).await
  }

  async fn create_knowledge(&self, req: &KnowledgeCreate) -> Result<KnowledgeBase, RequestError> {
    let response = self.send(self.client.post(self.url("/create")).json(req)).await?;
    self.enveloped(response).await
  }

  async fn update_knowledge(&self, req: &KnowledgeUpdate) -> Result<(), RequestError> {
    let response = self.send(self.client.put(self.url("/")).json(req)).await?;
    self.acknowledged(response).await
  }

  async fn delete_knowledge(&self, knowledge_id: i64) -> Result<(), RequestError> {
    let body = serde_json::json!({ "knowledge_id": knowledge_id });
    let response = self.send(self.client.delete(self.url("/")).json(&body)).await?;
    self.acknowledged(response).await
  }

  async fn copy_knowledge(&self, knowledge_id: i64) -> Result<KnowledgeBase, RequestError> {
    let body = serde_json::json!({ "knowledge_id": knowledge_id });
    let response = self.send(self.client.post(self.url("/copy")).json(&body)).await?;
    self.enveloped(response).await
  }

  async fn merge_knowledge(&self, req: &MergeRequest) -> Result<MergeResult, RequestError> {
    let response = self.send(self.client.post(self.url("/merge")).json(req)).await?;
    self.enveloped(response).await
  }

  async fn list_files<'a>(
    &self,
    knowledge_id: i64,
    page: u32,
    page_size: u32,
    file_name: Option<&'a str>,
    status: Option<FileStatus>,
  ) -> Result<FilePage, RequestError> {
    let mut query: Vec<(&str, String)> =
      vec![("page_num", page.to_string()), ("page_size", page_size.to_string())];
    if let Some(file_name) = file_name {
      query.push(("file_name", file_name.to_string()));
    }
    if let Some(status) = status {
      query.push(("status", i32::from(status).to_string()));
    }

    let url = self.url(&format!("/file_list/{knowledge_id}"));
    let response = self.send(self.client.get(url).query(&query)).await?;

    // file_list ships data, total and writeable side by side in the envelope
    let page: FilePage = self.enveloped(response).await?;
    Ok(page)
  }

  async fn delete_file(&self, file_id: i64) -> Result<(), RequestError> {
    let url = self.url(&format!("/file/{file_id}"));
    let response = self.send(self.client.delete(url)).await?;
    self.acknowledged(response).await
  }

  async fn retry_files(&self, files: &[KnowledgeFile]) -> Result<(), RequestError> {
    let body = RetryRequest { file_objs: files.to_vec() };
    let response = self.send(self.client.post(self.url("/retry")).json(&body)).await?;
    self.acknowledged(response).await
  }

  async fn export_files(&self, knowledge_id: i64) -> Result<Vec<u8>, RequestError> {
    let url = self.url(&format!("/file/export/{knowledge_id}"));
    let response = self.send(self.client.get(url)).await?;
    Ok(response.bytes().await?.to_vec())
  }

  async fn export_vectors(&self, knowledge_id: i64) -> Result<Vec<u8>, RequestError> {
    let url = self.url(&format!("/file/vector/export/{knowledge_id}"));
    let response = self.send(self.client.get(url)).await?;
    Ok(response.bytes().await?.to_vec())
  }

  async fn import_vectors(
    &self,
    knowledge_id: i64,
    file_name: &str,
    content: Vec<u8>,
  ) -> Result<u64, RequestError> {
    let part = reqwest::multipart::Part::bytes(content)
      .file_name(file_name.to_string())
      .mime_str("text/csv")
      .map_err(RequestError::Transport)?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let url = self.url(&format!("/file/vector/import/{knowledge_id}"));
    let response = self.send(self.client.post(url).multipart(form)).await?;

    #[derive(serde::Deserialize)]
    struct ImportResult {
      #[serde(default)]
      count: u64,
    }
    let result: ImportResult = self.enveloped(response).await?;
    Ok(result.count)
  }

  async fn update_file_tags(
    &self,
    file_id: i64,
    req: &TagUpdateRequest,
  ) -> Result<Vec<String>, RequestError> {
    let url = self.url(&format!("/file/{file_id}/tags"));
    let response = self.send(self.client.post(url).json(req)).await?;

    // This endpoint answers with a bare object, not the envelope
    let result: TagUpdateResponse = response.json().await?;
    Ok(result.tags)
  }

  async fn list_knowledge_tags(&self, knowledge_id: i64) -> Result<Vec<String>, RequestError> {
    let url = self.url(&format!("/{knowledge_id}/tags"));
    let response = self.send(self.client.get(url)).await?;

    let result: KnowledgeTagsResponse = response.json().await?;
    Ok(result.tags)
  }

  async fn list_models(&self) -> Result<Vec<ModelInfo>, RequestError> {
    let response = self.send(self.client.get(self.url("/models"))).await?;

    let result: ModelsResponse = response.json().await?;
    Ok(result.models)
  }

  async fn generate_qa(
    &self,
    req: &QaGenerationRequest,
  ) -> Result<serde_json::Value, RequestError> {
    let response = self.send(self.client.post(self.url("/qa/generate")).json(req)).await?;
    self.enveloped(response).await
  }
}

/// Get the configured client (checks environment variables)
pub fn get_client() -> KnowledgeClient {
  let base_url =
    std::env::var("CURATOR_SERVER_URL").unwrap_or_else(|_| "http://localhost:7860".to_string());

  let timeout_secs = std::env::var("CURATOR_TIMEOUT_SECS")
    .unwrap_or_else(|_| "30".to_string())
    .parse()
    .unwrap_or(30);

  let config = ClientConfig { base_url, timeout_secs };

  KnowledgeClient::with_config(config)
}
