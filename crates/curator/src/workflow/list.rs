//! Paginated, searchable knowledge-base collection state

use crate::api::client::KnowledgeApi;
use crate::api::error::RequestError;
use crate::api::types::KnowledgeBase;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Owns the knowledge-base list shown to the user
#[derive(Debug)]
pub struct KnowledgeListController {
  page: u32,
  page_size: u32,
  search: String,
  items: Vec<KnowledgeBase>,
  total: u64,
  loading: bool,
}

impl Default for KnowledgeListController {
  fn default() -> Self {
    Self::new(DEFAULT_PAGE_SIZE)
  }
}

impl KnowledgeListController {
  pub fn new(page_size: u32) -> Self {
    Self {
      page: 1,
      page_size,
      search: String::new(),
      items: Vec::new(),
      total: 0,
      loading: false,
    }
  }

  /// Change the search term; a new search always restarts from page 1
  pub fn set_search(&mut self, term: impl Into<String>) {
    let term = term.into();
    if term != self.search {
      self.search = term;
      self.page = 1;
    }
  }

  pub fn set_page(&mut self, page: u32) {
    self.page = page.max(1);
  }

  /// Fetch the current page, replacing the held collection and total
  ///
  /// The loading flag is cleared on failure too, so the caller can retry.
  pub async fn load(&mut self, api: &dyn KnowledgeApi) -> Result<(), RequestError> {
    self.loading = true;
    let search = if self.search.is_empty() { None } else { Some(self.search.as_str()) };
    let result = api.list_knowledge(self.page, self.page_size, search).await;
    self.loading = false;

    let page = result?;
    self.items = page.data;
    self.total = page.total;
    Ok(())
  }

  pub fn items(&self) -> &[KnowledgeBase] {
    &self.items
  }

  pub fn item_ids(&self) -> Vec<i64> {
    self.items.iter().map(|kb| kb.id).collect()
  }

  pub fn total(&self) -> u64 {
    self.total
  }

  pub fn page(&self) -> u32 {
    self.page
  }

  pub fn search(&self) -> &str {
    &self.search
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }
}
