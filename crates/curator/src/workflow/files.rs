//! Paginated, filtered file list for one knowledge base, with a polling
//! refresh while any file is still being parsed
//!
//! The refresh is a single-shot deadline re-armed after each load, never a
//! free-running timer: at most one deadline is pending, and it is dropped
//! whenever the dataset is about to change or the controller is torn down.

use std::time::Duration;
use tokio::time::Instant;

use crate::api::client::KnowledgeApi;
use crate::api::error::RequestError;
use crate::api::types::{FileStatus, KnowledgeFile};
use crate::workflow::split_rule;

/// Delay before re-checking a list that still has files in progress
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Status filter with an explicit show-all sentinel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
  /// Matches every status
  #[default]
  All,
  /// Matches exactly one status
  Only(FileStatus),
}

impl StatusFilter {
  fn as_query(self) -> Option<FileStatus> {
    match self {
      StatusFilter::All => None,
      StatusFilter::Only(status) => Some(status),
    }
  }
}

/// A file plus its display-ready chunking summary, computed once per load
#[derive(Debug, Clone)]
pub struct FileRow {
  pub file: KnowledgeFile,
  pub strategy: String,
}

/// Owns the file list of a single knowledge base
#[derive(Debug)]
pub struct FileListController {
  knowledge_id: i64,
  page: u32,
  page_size: u32,
  search: String,
  filter: StatusFilter,
  items: Vec<FileRow>,
  total: u64,
  writable: bool,
  loading: bool,
  refresh_due: Option<Instant>,
}

impl FileListController {
  pub fn new(knowledge_id: i64, page_size: u32) -> Self {
    Self {
      knowledge_id,
      page: 1,
      page_size,
      search: String::new(),
      filter: StatusFilter::All,
      items: Vec::new(),
      total: 0,
      writable: false,
      loading: false,
      refresh_due: None,
    }
  }

  /// Change the name filter; cancels any pending refresh and restarts
  /// pagination, the caller reloads immediately
  pub fn set_search(&mut self, term: impl Into<String>) {
    let term = term.into();
    if term != self.search {
      self.search = term;
      self.page = 1;
      self.cancel_refresh();
    }
  }

  /// Change the status filter; same reload semantics as a search change
  pub fn set_filter(&mut self, filter: StatusFilter) {
    if filter != self.filter {
      self.filter = filter;
      self.page = 1;
      self.cancel_refresh();
    }
  }

  pub fn set_page(&mut self, page: u32) {
    self.page = page.max(1);
    self.cancel_refresh();
  }

  /// Fetch the current page and re-arm the refresh deadline if any file is
  /// still in progress
  pub async fn load(&mut self, api: &dyn KnowledgeApi) -> Result<(), RequestError> {
    // The dataset is about to be replaced; any pending refresh is stale
    self.cancel_refresh();

    self.loading = true;
    let search = if self.search.is_empty() { None } else { Some(self.search.as_str()) };
    let result = api
      .list_files(self.knowledge_id, self.page, self.page_size, search, self.filter.as_query())
      .await;
    self.loading = false;

    let page = result?;
    self.items = page
      .data
      .into_iter()
      .map(|file| {
        let strategy = split_rule::strategy_summary(&file.file_name, file.split_rule.as_deref());
        FileRow { file, strategy }
      })
      .collect();
    self.total = page.total;
    self.writable = page.writeable;

    if self.any_in_progress() {
      self.refresh_due = Some(Instant::now() + POLL_INTERVAL);
    }
    Ok(())
  }

  pub fn any_in_progress(&self) -> bool {
    self.items.iter().any(|row| row.file.status == FileStatus::Processing)
  }

  /// Deadline of the single pending refresh, if one is armed
  pub fn refresh_due(&self) -> Option<Instant> {
    self.refresh_due
  }

  pub fn cancel_refresh(&mut self) {
    self.refresh_due = None;
  }

  pub fn items(&self) -> &[FileRow] {
    &self.items
  }

  pub fn item_ids(&self) -> Vec<i64> {
    self.items.iter().map(|row| row.file.id).collect()
  }

  pub fn total(&self) -> u64 {
    self.total
  }

  /// Whether edit/delete/export-import controls should be active
  pub fn writable(&self) -> bool {
    self.writable
  }

  pub fn page(&self) -> u32 {
    self.page
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::client::MockKnowledgeApi;
  use crate::api::types::FilePage;

  fn file(id: i64, name: &str, status: FileStatus) -> KnowledgeFile {
    KnowledgeFile {
      id,
      file_name: name.to_string(),
      status,
      split_rule: None,
      tags: None,
      remark: None,
    }
  }

  fn page_of(files: Vec<KnowledgeFile>) -> FilePage {
    let total = files.len() as u64;
    FilePage { data: files, total, writeable: true }
  }

  #[tokio::test]
  async fn load_with_in_progress_file_arms_single_refresh() {
    let mut api = MockKnowledgeApi::new();
    api.expect_list_files().returning(|_, _, _, _, _| {
      Ok(page_of(vec![
        file(1, "a.pdf", FileStatus::Ready),
        file(2, "b.pdf", FileStatus::Processing),
      ]))
    });

    let mut files = FileListController::new(7, 10);
    files.load(&api).await.unwrap();

    let due = files.refresh_due().expect("refresh should be armed");
    assert!(due <= Instant::now() + POLL_INTERVAL);
    assert!(files.writable());
  }

  #[tokio::test]
  async fn load_with_all_settled_files_arms_nothing() {
    let mut api = MockKnowledgeApi::new();
    api.expect_list_files().returning(|_, _, _, _, _| {
      Ok(page_of(vec![
        file(1, "a.pdf", FileStatus::Ready),
        file(2, "b.pdf", FileStatus::Failed),
      ]))
    });

    let mut files = FileListController::new(7, 10);
    files.load(&api).await.unwrap();
    assert!(files.refresh_due().is_none());
  }

  #[tokio::test]
  async fn reload_replaces_pending_refresh_rather_than_stacking() {
    let mut api = MockKnowledgeApi::new();
    api
      .expect_list_files()
      .returning(|_, _, _, _, _| Ok(page_of(vec![file(1, "a.pdf", FileStatus::Processing)])));

    let mut files = FileListController::new(7, 10);
    files.load(&api).await.unwrap();
    let first = files.refresh_due().unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    files.load(&api).await.unwrap();
    let second = files.refresh_due().unwrap();

    assert!(second > first);
  }

  #[tokio::test]
  async fn filter_change_cancels_pending_refresh_and_resets_page() {
    let mut api = MockKnowledgeApi::new();
    api
      .expect_list_files()
      .returning(|_, _, _, _, _| Ok(page_of(vec![file(1, "a.pdf", FileStatus::Processing)])));

    let mut files = FileListController::new(7, 10);
    files.set_page(3);
    files.load(&api).await.unwrap();
    assert!(files.refresh_due().is_some());

    files.set_filter(StatusFilter::Only(FileStatus::Failed));
    assert!(files.refresh_due().is_none());
    assert_eq!(files.page(), 1);
  }

  #[tokio::test]
  async fn load_failure_clears_loading_and_refresh() {
    let mut api = MockKnowledgeApi::new();
    api.expect_list_files().returning(|_, _, _, _, _| {
      Err(RequestError::Api { status: 500, detail: "boom".to_string() })
    });

    let mut files = FileListController::new(7, 10);
    assert!(files.load(&api).await.is_err());
    assert!(!files.is_loading());
    assert!(files.refresh_due().is_none());
  }

  #[tokio::test]
  async fn status_filter_all_sends_no_status_param() {
    let mut api = MockKnowledgeApi::new();
    api
      .expect_list_files()
      .withf(|_, _, _, _, status| status.is_none())
      .returning(|_, _, _, _, _| Ok(page_of(vec![])));

    let mut files = FileListController::new(7, 10);
    files.set_filter(StatusFilter::All);
    files.load(&api).await.unwrap();
  }

  #[tokio::test]
  async fn rows_carry_precomputed_strategy() {
    let mut api = MockKnowledgeApi::new();
    api.expect_list_files().returning(|_, _, _, _, _| {
      let mut csv = file(1, "table.csv", FileStatus::Ready);
      csv.split_rule = Some(r#"{"excel_rule": {"slice_length": 100}}"#.to_string());
      Ok(page_of(vec![csv, file(2, "legacy.pdf", FileStatus::Ready)]))
    });

    let mut files = FileListController::new(7, 10);
    files.load(&api).await.unwrap();

    assert_eq!(files.items()[0].strategy, "每 100 行作为一个分段");
    assert_eq!(files.items()[1].strategy, "\\n\\n");
  }
}
