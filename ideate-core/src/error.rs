use thiserror::Error;

use crate::completion::CompletionError;

#[derive(Error, Debug)]
pub enum IdeateError {
    #[error("Upstream error: {0}")]
    Upstream(#[from] CompletionError),

    #[error("{reason}:\n{raw}")]
    MalformedUpstreamOutput { raw: String, reason: String },

    #[error("Conversation not found")]
    NotFound(i64),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Other error: {0}")]
    Other(String),
}

impl IdeateError {
    /// Stable error-kind code surfaced to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            IdeateError::Upstream(_) => "upstream",
            IdeateError::MalformedUpstreamOutput { .. } => "malformed_upstream_output",
            IdeateError::NotFound(_) => "not_found",
            IdeateError::Storage(_) => "storage",
            IdeateError::Config(_) => "config",
            IdeateError::Other(_) => "other",
        }
    }

    /// Raw oracle text, if this error carries any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            IdeateError::MalformedUpstreamOutput { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
