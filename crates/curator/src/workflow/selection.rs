//! Tracks which knowledge bases or files are currently checked
//!
//! One tracker serves both kinds of id. Insertion order is preserved so a
//! merge submits its sources in the order the user picked them.

/// Ordered set of checked identifiers
#[derive(Debug, Default, Clone)]
pub struct SelectionTracker {
  ids: Vec<i64>,
}

impl SelectionTracker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Check or uncheck a single id; checking an already-checked id is a no-op
  pub fn toggle(&mut self, id: i64, checked: bool) {
    if checked {
      if !self.ids.contains(&id) {
        self.ids.push(id);
      }
    } else {
      self.ids.retain(|existing| *existing != id);
    }
  }

  /// Replace the selection with the given ids, dropping duplicates
  pub fn select_all(&mut self, ids: &[i64]) {
    self.ids.clear();
    for id in ids {
      if !self.ids.contains(id) {
        self.ids.push(*id);
      }
    }
  }

  /// Drop ids that are no longer visible on the active page
  pub fn retain_visible(&mut self, visible: &[i64]) {
    self.ids.retain(|id| visible.contains(id));
  }

  pub fn clear(&mut self) {
    self.ids.clear();
  }

  /// Checked ids in the order they were checked
  pub fn ids(&self) -> &[i64] {
    &self.ids
  }

  pub fn contains(&self, id: i64) -> bool {
    self.ids.contains(&id)
  }

  pub fn len(&self) -> usize {
    self.ids.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ids.is_empty()
  }

  /// A merge is only offered once at least two items are checked
  pub fn merge_available(&self) -> bool {
    self.ids.len() >= 2
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn toggle_preserves_check_order() {
    let mut selection = SelectionTracker::new();
    selection.toggle(3, true);
    selection.toggle(1, true);
    selection.toggle(2, true);
    assert_eq!(selection.ids(), &[3, 1, 2]);
  }

  #[test]
  fn toggle_checked_twice_keeps_single_entry() {
    let mut selection = SelectionTracker::new();
    selection.toggle(7, true);
    selection.toggle(7, true);
    assert_eq!(selection.ids(), &[7]);
  }

  #[test]
  fn toggle_unchecked_removes_id() {
    let mut selection = SelectionTracker::new();
    selection.select_all(&[1, 2, 3]);
    selection.toggle(2, false);
    assert_eq!(selection.ids(), &[1, 3]);
  }

  #[test]
  fn select_all_replaces_and_dedupes() {
    let mut selection = SelectionTracker::new();
    selection.toggle(9, true);
    selection.select_all(&[4, 5, 4, 6]);
    assert_eq!(selection.ids(), &[4, 5, 6]);
  }

  #[test]
  fn retain_visible_drops_stale_ids() {
    let mut selection = SelectionTracker::new();
    selection.select_all(&[1, 2, 3]);
    selection.retain_visible(&[2, 3, 4]);
    assert_eq!(selection.ids(), &[2, 3]);
  }

  #[test]
  fn merge_unavailable_below_two() {
    let mut selection = SelectionTracker::new();
    assert!(!selection.merge_available());
    selection.toggle(1, true);
    assert!(!selection.merge_available());
    selection.toggle(2, true);
    assert!(selection.merge_available());
  }
}
