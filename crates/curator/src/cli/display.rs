//! Display formatting utilities for CLI output

use colored::*;

use crate::api::types::{FileStatus, KnowledgeBase, ModelInfo};
use crate::workflow::files::FileListController;
use crate::workflow::list::KnowledgeListController;

/// One-character status marker for a file
pub fn status_icon(status: FileStatus) -> ColoredString {
  match status {
    FileStatus::Processing => "⏳".yellow(),
    FileStatus::Ready => "✓".green(),
    FileStatus::Failed => "✗".red(),
    FileStatus::Other(_) => "?".normal(),
  }
}

/// Render one knowledge-base card
pub fn display_knowledge_base(kb: &KnowledgeBase) {
  let mut line = format!("  {} {}", format!("#{}", kb.id).cyan(), kb.name.bold());
  if let Some(model) = &kb.model {
    line.push_str(&format!(" {}", format!("[{model}]").blue()));
  }
  if kb.copiable {
    line.push_str(&format!(" {}", "(copiable)".dimmed()));
  }
  println!("{line}");

  if let Some(description) = kb.description.as_deref().filter(|d| !d.is_empty()) {
    println!("      {}", description.dimmed());
  }
}

/// Render the current page of the knowledge-base list
pub fn display_knowledge_page(list: &KnowledgeListController) {
  if list.items().is_empty() {
    if list.search().is_empty() {
      println!("No knowledge bases found.");
    } else {
      println!("No knowledge bases match: {}", list.search().yellow());
    }
    return;
  }

  println!("{} Knowledge bases (page {}, {} total):", "📚".cyan(), list.page(), list.total());
  for kb in list.items() {
    display_knowledge_base(kb);
  }
}

/// Render the current page of a knowledge base's file list
pub fn display_file_page(files: &FileListController) {
  if files.items().is_empty() {
    println!("No files found.");
    return;
  }

  let access = if files.writable() { "writable".green() } else { "read-only".yellow() };
  println!("{} Files (page {}, {} total, {}):", "📄".cyan(), files.page(), files.total(), access);

  for row in files.items() {
    println!(
      "  {} {} {}  {}",
      status_icon(row.file.status),
      format!("#{}", row.file.id).cyan(),
      row.file.file_name.bold(),
      row.strategy.dimmed()
    );
    if let Some(tags) = row.file.tags.as_deref().filter(|t| !t.is_empty()) {
      println!("      {} {}", "tags:".dimmed(), tags.blue());
    }
  }
}

/// Render the available model list
pub fn display_models(models: &[ModelInfo]) {
  if models.is_empty() {
    println!("No models online.");
    return;
  }

  println!("{} Available models:", "🤖".cyan());
  for model in models {
    println!("  {} {}", model.id.blue().bold(), model.name.dimmed());
  }
}

/// Render a tag list on one line
pub fn display_tags(tags: &[String]) {
  if tags.is_empty() {
    println!("No tags.");
  } else {
    println!("{}", tags.join(", ").blue());
  }
}
