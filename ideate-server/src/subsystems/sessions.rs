use ideate_core::{
    ConversationContent, ConversationSummary, IdeateError, NewConversation, SessionStore,
};

/// Persist a finished session. Id and timestamp come from the store.
pub async fn save(store: &dyn SessionStore, new: NewConversation) -> Result<i64, IdeateError> {
    let name = new.name.clone();
    let id = store.create(new).await?;
    tracing::info!(id, name = %name, backend = store.name(), "Saved conversation");
    Ok(id)
}

pub async fn list(store: &dyn SessionStore) -> Result<Vec<ConversationSummary>, IdeateError> {
    store.list().await
}

/// Load a saved session's content, or `NotFound`.
pub async fn load(store: &dyn SessionStore, id: i64) -> Result<ConversationContent, IdeateError> {
    store.get(id).await?.ok_or(IdeateError::NotFound(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ideate_core::MemorySessionStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let store = MemorySessionStore::new();
        let draft = json!({"subdomains": ["A"], "requirements": [{"id": "R1", "subdomain": "A", "text": "t"}]});
        let id = save(
            &store,
            NewConversation {
                name: "dog bowls".to_string(),
                summary: "S".to_string(),
                context: "C".to_string(),
                draft: draft.clone(),
            },
        )
        .await
        .unwrap();

        let loaded = load(&store, id).await.unwrap();
        assert_eq!(loaded.summary, "S");
        assert_eq!(loaded.context, "C");
        assert_eq!(loaded.draft, draft);

        let listed = list(&store).await.unwrap();
        assert!(listed.iter().any(|c| c.id == id && c.name == "dog bowls"));
    }

    #[tokio::test]
    async fn test_load_unknown_id_is_not_found() {
        let store = MemorySessionStore::new();
        match load(&store, 99).await {
            Err(IdeateError::NotFound(id)) => assert_eq!(id, 99),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
