use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: i64,
    pub name: String,
    pub summary: String,
    pub context: String,
    pub draft: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied by the caller at save time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConversation {
    pub name: String,
    pub summary: String,
    pub context: String,
    pub draft: serde_json::Value,
}

/// Listing projection: no summary, context or draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConversationSummary {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Load projection: the content a caller needs to resume work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ConversationContent {
    pub summary: String,
    pub context: String,
    pub draft: serde_json::Value,
}

impl From<&Conversation> for ConversationSummary {
    fn from(c: &Conversation) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            created_at: c.created_at,
        }
    }
}

impl From<&Conversation> for ConversationContent {
    fn from(c: &Conversation) -> Self {
        Self {
            summary: c.summary.clone(),
            context: c.context.clone(),
            draft: c.draft.clone(),
        }
    }
}
