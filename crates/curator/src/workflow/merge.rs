//! Merge workflow: fold several selected knowledge bases into one target
//!
//! State machine: Idle -> Configuring -> Submitting -> Idle on success, or
//! back to Configuring on a validation or request failure so the user can
//! fix and resubmit.

use thiserror::Error;

use crate::api::client::KnowledgeApi;
use crate::api::error::RequestError;
use crate::api::types::{DuplicatePolicy, MergeRequest};
use crate::workflow::list::KnowledgeListController;
use crate::workflow::selection::SelectionTracker;

/// Validation failures, checked in a fixed order before any network call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MergeError {
  #[error("choose a merge target first")]
  NoTarget,

  #[error("select at least two knowledge bases to merge")]
  NotEnoughSelected,

  #[error("the merge target must be one of the selected knowledge bases")]
  TargetNotSelected,
}

/// Why a submit did not complete
#[derive(Debug, Error)]
pub enum MergeFailure {
  #[error(transparent)]
  Validation(#[from] MergeError),

  #[error("{}", .0.user_message())]
  Request(#[from] RequestError),
}

/// Where the workflow currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
  Idle,
  Configuring,
  Submitting,
}

/// Successful merge outcome, reported upward to the caller
#[derive(Debug)]
pub struct MergeOutcome {
  /// Documents moved into the target
  pub merged_count: u64,
  /// Server message when provided, otherwise a generic one
  pub message: String,
}

/// The merge dialog's state
#[derive(Debug)]
pub struct MergeWorkflow {
  selection: Vec<i64>,
  target: Option<i64>,
  rename: Option<String>,
  policy: DuplicatePolicy,
  state: MergeState,
}

impl MergeWorkflow {
  /// Open the dialog over the current selection
  ///
  /// Refused outright while fewer than two items are checked. The default
  /// target is the first-checked item.
  pub fn open(selection: &SelectionTracker) -> Result<Self, MergeError> {
    if !selection.merge_available() {
      return Err(MergeError::NotEnoughSelected);
    }
    let ids = selection.ids().to_vec();
    let target = ids.first().copied();
    Ok(Self {
      selection: ids,
      target,
      rename: None,
      policy: DuplicatePolicy::default(),
      state: MergeState::Configuring,
    })
  }

  pub fn set_target(&mut self, id: i64) {
    self.target = Some(id);
  }

  pub fn set_rename(&mut self, name: Option<String>) {
    self.rename = name.filter(|n| !n.trim().is_empty());
  }

  pub fn set_policy(&mut self, policy: DuplicatePolicy) {
    self.policy = policy;
  }

  pub fn target(&self) -> Option<i64> {
    self.target
  }

  pub fn policy(&self) -> DuplicatePolicy {
    self.policy
  }

  pub fn state(&self) -> MergeState {
    self.state
  }

  /// Checks run in order; only the first applicable failure is reported
  fn validate(&self) -> Result<i64, MergeError> {
    let target = self.target.ok_or(MergeError::NoTarget)?;
    if self.selection.len() < 2 {
      return Err(MergeError::NotEnoughSelected);
    }
    if !self.selection.contains(&target) {
      return Err(MergeError::TargetNotSelected);
    }
    Ok(target)
  }

  /// Selected ids minus the target, in original check order
  fn source_ids(&self, target: i64) -> Vec<i64> {
    self.selection.iter().copied().filter(|id| *id != target).collect()
  }

  /// Validate and call the merge endpoint
  ///
  /// The submitting state is left behind on every path so the submit
  /// control re-enables.
  pub async fn submit(&mut self, api: &dyn KnowledgeApi) -> Result<MergeOutcome, MergeFailure> {
    let target = self.validate()?;

    self.state = MergeState::Submitting;
    let request = MergeRequest {
      source_ids: self.source_ids(target),
      target_id: target,
      target_name: self.rename.clone(),
      duplicate_handler: self.policy,
    };

    match api.merge_knowledge(&request).await {
      Ok(result) => {
        self.state = MergeState::Idle;
        let message = if result.message.trim().is_empty() {
          "merge completed".to_string()
        } else {
          result.message
        };
        Ok(MergeOutcome { merged_count: result.merged_count, message })
      }
      Err(err) => {
        // Dialog stays open with entered values for another attempt
        self.state = MergeState::Configuring;
        Err(MergeFailure::Request(err))
      }
    }
  }

  /// Submit, then propagate completion: clear the selection and reload the
  /// list (keeping its current page)
  pub async fn submit_and_refresh(
    &mut self,
    api: &dyn KnowledgeApi,
    selection: &mut SelectionTracker,
    list: &mut KnowledgeListController,
  ) -> Result<MergeOutcome, MergeFailure> {
    let outcome = self.submit(api).await?;
    selection.clear();
    list.load(api).await?;
    Ok(outcome)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::client::MockKnowledgeApi;
  use crate::api::types::MergeResult;

  fn selection_of(ids: &[i64]) -> SelectionTracker {
    let mut selection = SelectionTracker::new();
    for id in ids {
      selection.toggle(*id, true);
    }
    selection
  }

  #[test]
  fn open_refused_below_two_selected() {
    let selection = selection_of(&[42]);
    assert_eq!(MergeWorkflow::open(&selection).unwrap_err(), MergeError::NotEnoughSelected);
  }

  #[test]
  fn default_target_is_first_selected() {
    let selection = selection_of(&[5, 3, 8]);
    let workflow = MergeWorkflow::open(&selection).unwrap();
    assert_eq!(workflow.target(), Some(5));
    assert_eq!(workflow.state(), MergeState::Configuring);
  }

  #[test]
  fn validation_order_is_deterministic() {
    let selection = selection_of(&[1, 2]);

    // Missing target fires first
    let mut workflow = MergeWorkflow::open(&selection).unwrap();
    workflow.target = None;
    workflow.selection.clear();
    assert_eq!(workflow.validate().unwrap_err(), MergeError::NoTarget);

    // Then the size check
    let mut workflow = MergeWorkflow::open(&selection).unwrap();
    workflow.selection = vec![1];
    workflow.target = Some(1);
    assert_eq!(workflow.validate().unwrap_err(), MergeError::NotEnoughSelected);

    // Then target membership
    let mut workflow = MergeWorkflow::open(&selection).unwrap();
    workflow.set_target(99);
    assert_eq!(workflow.validate().unwrap_err(), MergeError::TargetNotSelected);
  }

  #[test]
  fn sources_exclude_target_in_original_order() {
    let selection = selection_of(&[10, 20, 30]);
    let mut workflow = MergeWorkflow::open(&selection).unwrap();
    workflow.set_target(20);
    assert_eq!(workflow.source_ids(20), vec![10, 30]);
  }

  #[tokio::test]
  async fn submit_sends_sources_target_and_policy() {
    let mut api = MockKnowledgeApi::new();
    api
      .expect_merge_knowledge()
      .withf(|req| {
        req.source_ids == vec![2, 3]
          && req.target_id == 1
          && req.target_name.is_none()
          && req.duplicate_handler == DuplicatePolicy::Overwrite
      })
      .returning(|_| Ok(MergeResult { merged_count: 4, message: String::new() }));

    let selection = selection_of(&[1, 2, 3]);
    let mut workflow = MergeWorkflow::open(&selection).unwrap();
    workflow.set_policy(DuplicatePolicy::Overwrite);

    let outcome = workflow.submit(&api).await.unwrap();
    assert_eq!(outcome.merged_count, 4);
    assert_eq!(outcome.message, "merge completed");
    assert_eq!(workflow.state(), MergeState::Idle);
  }

  #[tokio::test]
  async fn submit_failure_returns_to_configuring() {
    let mut api = MockKnowledgeApi::new();
    api.expect_merge_knowledge().returning(|_| {
      Err(RequestError::Api { status: 500, detail: "知识库合并失败".to_string() })
    });

    let selection = selection_of(&[1, 2]);
    let mut workflow = MergeWorkflow::open(&selection).unwrap();

    let err = workflow.submit(&api).await.unwrap_err();
    assert_eq!(err.to_string(), "知识库合并失败");
    assert_eq!(workflow.state(), MergeState::Configuring);
  }

  #[tokio::test]
  async fn validation_failure_skips_network_call() {
    let api = MockKnowledgeApi::new(); // no expectations: any call would panic

    let selection = selection_of(&[1, 2]);
    let mut workflow = MergeWorkflow::open(&selection).unwrap();
    workflow.set_target(7);

    let err = workflow.submit(&api).await.unwrap_err();
    assert!(matches!(err, MergeFailure::Validation(MergeError::TargetNotSelected)));
    assert_eq!(workflow.state(), MergeState::Configuring);
  }
}
