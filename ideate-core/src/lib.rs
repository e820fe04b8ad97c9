pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod store;

pub use completion::{CompletionClient, CompletionError, GenerationParams, OpenAiCompletionClient};
pub use crate::config::{IdeateConfig, StoreBackend};
pub use error::IdeateError;
pub use models::{
    Conversation, ConversationContent, ConversationSummary, DraftDocument, NewConversation,
    Requirement,
};
pub use store::{MemorySessionStore, PgSessionStore, SessionStore};
