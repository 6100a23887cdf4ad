use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BinderError {
  #[error("Request failed: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("{message}")]
  Http { status: u16, message: String },

  #[error("Unexpected response payload: {0}")]
  Decode(#[from] serde_json::Error),

  #[error("{0}")]
  InvalidInput(String),

  #[error("Binder is read-only.")]
  ReadOnly,

  #[error("Cannot delete the last binder.")]
  LastBinder,

  #[error("Server rejected the request: {0}")]
  Rejected(String),

  #[error("Local store error: {0}")]
  Storage(#[from] rusqlite::Error),

  #[error(transparent)]
  Io(#[from] io::Error),
}

impl BinderError {
  pub fn invalid(message: impl Into<String>) -> Self {
    BinderError::InvalidInput(message.into())
  }

  /// True when the request never left the client.
  pub fn is_local_refusal(&self) -> bool {
    matches!(self, BinderError::InvalidInput(_) | BinderError::ReadOnly)
  }
}

pub type Result<T> = std::result::Result<T, BinderError>;
