//! CLI command handlers
//!
//! Thin orchestration over the API client and the workflow controllers;
//! all output goes through `cli::display`.

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use colored::*;
use std::path::Path;

use crate::api::client::KnowledgeApi;
use crate::api::error::RequestError;
use crate::api::types::{
  DuplicatePolicy, FileStatus, KnowledgeCreate, KnowledgeUpdate,
};
use crate::cli::display;
use crate::workflow::files::{FileListController, StatusFilter};
use crate::workflow::list::KnowledgeListController;
use crate::workflow::merge::MergeWorkflow;
use crate::workflow::qa::QaGenerationWorkflow;
use crate::workflow::selection::SelectionTracker;
use crate::workflow::tags::TagEditor;

/// Page size used when a command needs the whole relevant slice at once
const LOOKUP_PAGE_SIZE: u32 = 100;

/// File status filter as exposed on the command line
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum StatusArg {
  /// Show every file regardless of status
  #[default]
  All,
  Processing,
  Ready,
  Failed,
}

impl From<StatusArg> for StatusFilter {
  fn from(arg: StatusArg) -> Self {
    match arg {
      StatusArg::All => StatusFilter::All,
      StatusArg::Processing => StatusFilter::Only(FileStatus::Processing),
      StatusArg::Ready => StatusFilter::Only(FileStatus::Ready),
      StatusArg::Failed => StatusFilter::Only(FileStatus::Failed),
    }
  }
}

fn shown(err: RequestError) -> anyhow::Error {
  anyhow!("{}", err.user_message())
}

/// Ask the user for a y/N confirmation on stdin
fn confirm(prompt: &str) -> Result<bool> {
  print!("{prompt} (y/N): ");
  std::io::Write::flush(&mut std::io::stdout())?;

  let mut input = String::new();
  std::io::stdin().read_line(&mut input)?;

  let response = input.trim().to_lowercase();
  Ok(response == "y" || response == "yes")
}

/// List knowledge bases, paginated and optionally filtered by name
pub async fn list_knowledge(
  api: &dyn KnowledgeApi,
  search: Option<String>,
  page: u32,
  page_size: u32,
) -> Result<()> {
  let mut list = KnowledgeListController::new(page_size);
  if let Some(term) = search {
    list.set_search(term);
  }
  list.set_page(page);
  list.load(api).await.map_err(shown)?;

  display::display_knowledge_page(&list);
  Ok(())
}

/// Create a knowledge base
pub async fn create_knowledge(
  api: &dyn KnowledgeApi,
  name: String,
  description: Option<String>,
  model: Option<String>,
) -> Result<()> {
  let req = KnowledgeCreate { name, description, model };
  let kb = api.create_knowledge(&req).await.map_err(shown)?;

  println!("{} Created knowledge base {} ({})", "✓".green(), kb.name.bold(), kb.id);
  Ok(())
}

/// Update a knowledge base's name or description
pub async fn update_knowledge(
  api: &dyn KnowledgeApi,
  knowledge_id: i64,
  name: Option<String>,
  description: Option<String>,
) -> Result<()> {
  if name.is_none() && description.is_none() {
    return Err(anyhow!("At least one of --name or --description must be specified"));
  }

  let req = KnowledgeUpdate { knowledge_id, name, description };
  api.update_knowledge(&req).await.map_err(shown)?;

  println!("{} Updated knowledge base {}", "✓".green(), knowledge_id.to_string().cyan());
  Ok(())
}

/// Soft-delete a knowledge base, with confirmation unless forced
pub async fn delete_knowledge(api: &dyn KnowledgeApi, knowledge_id: i64, force: bool) -> Result<()> {
  if !force
    && !confirm(&format!(
      "Are you sure you want to delete knowledge base {}?",
      knowledge_id.to_string().cyan()
    ))?
  {
    println!("Delete operation cancelled.");
    return Ok(());
  }

  api.delete_knowledge(knowledge_id).await.map_err(shown)?;
  println!("{} Deleted knowledge base {}", "✓".green(), knowledge_id.to_string().cyan());
  Ok(())
}

/// Copy a knowledge base (server rejects bases that are not copiable)
pub async fn copy_knowledge(api: &dyn KnowledgeApi, knowledge_id: i64) -> Result<()> {
  let copy = api.copy_knowledge(knowledge_id).await.map_err(shown)?;
  println!("{} Copied into {} ({})", "✓".green(), copy.name.bold(), copy.id);
  Ok(())
}

/// Merge the selected knowledge bases into a target
///
/// The id list plays the role of the checked selection; the first id is the
/// default target. On success the selection is cleared and the list
/// reloaded, which is rendered as the refreshed first view.
pub async fn merge_knowledge(
  api: &dyn KnowledgeApi,
  ids: Vec<i64>,
  target: Option<i64>,
  rename: Option<String>,
  policy: DuplicatePolicy,
) -> Result<()> {
  let mut selection = SelectionTracker::new();
  for id in ids {
    selection.toggle(id, true);
  }

  let mut workflow = MergeWorkflow::open(&selection)?;
  if let Some(target) = target {
    workflow.set_target(target);
  }
  workflow.set_rename(rename);
  workflow.set_policy(policy);

  let mut list = KnowledgeListController::default();
  let outcome = workflow.submit_and_refresh(api, &mut selection, &mut list).await?;

  println!("{} {} ({} documents merged)", "✓".green(), outcome.message, outcome.merged_count);
  display::display_knowledge_page(&list);
  Ok(())
}

/// List a knowledge base's files; with `watch`, keep refreshing every few
/// seconds until no file is still being parsed
pub async fn list_files(
  api: &dyn KnowledgeApi,
  knowledge_id: i64,
  search: Option<String>,
  status: StatusArg,
  page: u32,
  page_size: u32,
  watch: bool,
) -> Result<()> {
  let mut files = FileListController::new(knowledge_id, page_size);
  if let Some(term) = search {
    files.set_search(term);
  }
  files.set_filter(status.into());
  files.set_page(page);

  loop {
    files.load(api).await.map_err(shown)?;
    display::display_file_page(&files);

    if !watch {
      if files.any_in_progress() {
        println!("{}", "Some files are still parsing; rerun with --watch to follow.".dimmed());
      }
      return Ok(());
    }

    match files.refresh_due() {
      Some(due) => tokio::time::sleep_until(due).await,
      None => return Ok(()),
    }
  }
}

/// Delete a file, with confirmation unless forced
pub async fn delete_file(api: &dyn KnowledgeApi, file_id: i64, force: bool) -> Result<()> {
  if !force
    && !confirm(&format!("Are you sure you want to delete file {}?", file_id.to_string().cyan()))?
  {
    println!("Delete operation cancelled.");
    return Ok(());
  }

  api.delete_file(file_id).await.map_err(shown)?;
  println!("{} Deleted file {}", "✓".green(), file_id.to_string().cyan());
  Ok(())
}

/// Re-parse failed files; with no explicit ids, every failed file on the
/// first page of failures is retried
pub async fn retry_files(
  api: &dyn KnowledgeApi,
  knowledge_id: i64,
  file_ids: Vec<i64>,
) -> Result<()> {
  let failed = api
    .list_files(knowledge_id, 1, LOOKUP_PAGE_SIZE, None, Some(FileStatus::Failed))
    .await
    .map_err(shown)?;

  let retryable: Vec<_> = failed
    .data
    .into_iter()
    .filter(|file| file_ids.is_empty() || file_ids.contains(&file.id))
    .collect();

  if retryable.is_empty() {
    println!("No failed files to retry.");
    return Ok(());
  }

  api.retry_files(&retryable).await.map_err(shown)?;
  println!("{} Retry requested for {} file(s)", "✓".green(), retryable.len());
  Ok(())
}

/// Export a knowledge base's file metadata as CSV
pub async fn export_files(
  api: &dyn KnowledgeApi,
  knowledge_id: i64,
  output: &Path,
) -> Result<()> {
  let bytes = api.export_files(knowledge_id).await.map_err(shown)?;
  std::fs::write(output, bytes)?;
  println!("{} Wrote file metadata to {}", "✓".green(), output.display());
  Ok(())
}

/// Export a knowledge base's vector data as CSV
pub async fn export_vectors(
  api: &dyn KnowledgeApi,
  knowledge_id: i64,
  output: &Path,
) -> Result<()> {
  let bytes = api.export_vectors(knowledge_id).await.map_err(shown)?;
  std::fs::write(output, bytes)?;
  println!("{} Wrote vector data to {}", "✓".green(), output.display());
  Ok(())
}

/// Import vector data from a CSV file
pub async fn import_vectors(
  api: &dyn KnowledgeApi,
  knowledge_id: i64,
  input: &Path,
) -> Result<()> {
  let content = std::fs::read(input)?;
  let file_name = input
    .file_name()
    .map(|n| n.to_string_lossy().to_string())
    .unwrap_or_else(|| "vectors.csv".to_string());

  let count = api.import_vectors(knowledge_id, &file_name, content).await.map_err(shown)?;
  println!("{} Imported {} vector row(s)", "✓".green(), count);
  Ok(())
}

/// Edit or auto-generate a file's tags
pub async fn edit_tags(
  api: &dyn KnowledgeApi,
  knowledge_id: i64,
  file_id: i64,
  add: Vec<String>,
  remove: Vec<String>,
  auto: bool,
  model: String,
) -> Result<()> {
  // Seed the editor from the file's persisted tags
  let page = api
    .list_files(knowledge_id, 1, LOOKUP_PAGE_SIZE, None, None)
    .await
    .map_err(shown)?;
  let file = page
    .data
    .iter()
    .find(|file| file.id == file_id)
    .ok_or_else(|| anyhow!("File {} not found in knowledge base {}", file_id, knowledge_id))?;

  let mut editor = TagEditor::from_file(file, model);

  if auto {
    editor.auto_generate(api).await.map_err(shown)?;
  } else {
    for tag in &remove {
      editor.remove_tag(tag);
    }
    for tag in &add {
      editor.add_tag(tag);
    }
    editor.save(api).await.map_err(shown)?;
  }

  println!("{} Tags for file {}:", "✓".green(), file_id.to_string().cyan());
  display::display_tags(editor.tags());
  Ok(())
}

/// List every tag present in a knowledge base
pub async fn list_knowledge_tags(api: &dyn KnowledgeApi, knowledge_id: i64) -> Result<()> {
  let tags = api.list_knowledge_tags(knowledge_id).await.map_err(shown)?;
  display::display_tags(&tags);
  Ok(())
}

/// List generation models currently online
pub async fn list_models(api: &dyn KnowledgeApi) -> Result<()> {
  let models = api.list_models().await.map_err(shown)?;
  display::display_models(&models);
  Ok(())
}

/// Generate QA pairs from the given files
pub async fn generate_qa(
  api: &dyn KnowledgeApi,
  file_ids: Vec<i64>,
  model: Option<String>,
  verify_model: Option<String>,
  count: Option<String>,
  prompt: Option<String>,
) -> Result<()> {
  let mut workflow = QaGenerationWorkflow::open(api, file_ids).await;
  if let Some(model) = model {
    workflow.set_model(model);
  }
  workflow.set_verify_model(verify_model);
  workflow.set_prompt(prompt);
  if let Some(count) = count {
    workflow.set_question_count(&count);
  }

  let result = workflow.submit(api).await?;

  println!("{} QA generation finished:", "✓".green());
  println!("{}", serde_json::to_string_pretty(&result)?);
  Ok(())
}
