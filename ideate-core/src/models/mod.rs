pub mod conversation;
pub mod draft;

pub use conversation::{Conversation, ConversationContent, ConversationSummary, NewConversation};
pub use draft::{DraftDocument, Requirement};
