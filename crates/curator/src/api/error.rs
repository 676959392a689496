//! Error type for knowledge-base API requests

use thiserror::Error;

/// Failure of a single API request
///
/// Server-provided detail is carried verbatim so the CLI can show it
/// directly; everything else falls back to a generic message.
#[derive(Debug, Error)]
pub enum RequestError {
  /// The server answered with an error status and (usually) a detail string
  #[error("server rejected the request: {detail}")]
  Api {
    /// HTTP or service status code
    status: u16,
    /// Error detail reported by the server, possibly empty
    detail: String,
  },

  /// The request never completed (connection refused, DNS, TLS, ...)
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),

  /// The request exceeded the configured timeout
  #[error("request timed out")]
  Timeout(#[from] tokio::time::error::Elapsed),

  /// The server answered 2xx but the body did not match the contract
  #[error("malformed server response: {0}")]
  Decode(String),
}

impl RequestError {
  /// Message suitable for direct display to the user
  ///
  /// Shows the server's detail verbatim when present, otherwise a generic
  /// message for the failure class.
  pub fn user_message(&self) -> String {
    match self {
      RequestError::Api { detail, .. } if !detail.trim().is_empty() => detail.clone(),
      RequestError::Api { status, .. } => format!("the server reported an error (status {status})"),
      RequestError::Timeout(_) => "the server took too long to respond".to_string(),
      RequestError::Transport(_) | RequestError::Decode(_) => {
        "the request failed, please try again".to_string()
      }
    }
  }
}
