//! Session store - flat persistence for saved conversations
//!
//! `SessionStore` exposes create/list/get. Two backends:
//! - **Postgres** - `conversations` table via sqlx
//! - **Memory** - process-local vector, for local runs and tests

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::error::IdeateError;
use crate::models::{Conversation, ConversationContent, ConversationSummary, NewConversation};

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new conversation and return its store-assigned id.
    async fn create(&self, new: NewConversation) -> Result<i64, IdeateError>;

    /// All conversations in store-native order.
    async fn list(&self) -> Result<Vec<ConversationSummary>, IdeateError>;

    /// `Ok(None)` when no conversation has this id.
    async fn get(&self, id: i64) -> Result<Option<ConversationContent>, IdeateError>;

    /// Storage engine description for health reporting.
    async fn health(&self) -> Result<String, IdeateError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// PgSessionStore
// ============================================================================

#[derive(Debug, Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, new: NewConversation) -> Result<i64, IdeateError> {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO conversations (name, summary, context, draft)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&new.name)
        .bind(&new.summary)
        .bind(&new.context)
        .bind(&new.draft)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>, IdeateError> {
        let rows = sqlx::query_as::<_, ConversationSummary>(
            "SELECT id, name, created_at FROM conversations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get(&self, id: i64) -> Result<Option<ConversationContent>, IdeateError> {
        let row = sqlx::query_as::<_, ConversationContent>(
            "SELECT summary, context, draft FROM conversations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn health(&self) -> Result<String, IdeateError> {
        Ok(crate::db::health_check(&self.pool).await?)
    }

    fn name(&self) -> &str {
        "postgres"
    }
}

// ============================================================================
// MemorySessionStore
// ============================================================================

/// In-process store. Ids start at 1 and are never reused.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    rows: RwLock<Vec<Conversation>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, new: NewConversation) -> Result<i64, IdeateError> {
        let mut rows = self.rows.write().await;
        let id = rows.last().map(|c| c.id + 1).unwrap_or(1);
        rows.push(Conversation {
            id,
            name: new.name,
            summary: new.summary,
            context: new.context,
            draft: new.draft,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>, IdeateError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().map(ConversationSummary::from).collect())
    }

    async fn get(&self, id: i64) -> Result<Option<ConversationContent>, IdeateError> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .find(|c| c.id == id)
            .map(ConversationContent::from))
    }

    async fn health(&self) -> Result<String, IdeateError> {
        let count = self.rows.read().await.len();
        Ok(format!("in-memory ({} conversations)", count))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
