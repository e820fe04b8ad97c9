//! Ideation workflow - four independent, stateless stages
//!
//! summarize → enrich → draft → refine. Each stage interpolates a fixed
//! prompt, calls the completion client once and reshapes the answer. The
//! caller carries summary/context/draft between stages; nothing is stored.

use ideate_core::{CompletionClient, DraftDocument, GenerationParams, IdeateError, Requirement};

pub const SUMMARIZE_PARAMS: GenerationParams = GenerationParams::new(0.2, 150);
pub const ENRICH_PARAMS: GenerationParams = GenerationParams::new(0.2, 200);
pub const DRAFT_PARAMS: GenerationParams = GenerationParams::new(0.2, 500);
pub const REFINE_PARAMS: GenerationParams = GenerationParams::new(0.2, 200);

// ============================================================================
// Prompt templates
// ============================================================================

pub fn summarize_prompt(text: &str) -> String {
    format!(
        "You are an assistant that transforms raw project ideas into structured summaries.\n\
         Input: {text}\n\
         Task: Provide a 1–2 sentence summary of the idea for confirmation."
    )
}

pub fn enrich_prompt(summary: &str) -> String {
    format!(
        "Given this project summary:\n\
         {summary}\n\
         List three missing pieces of context (target user, pain-point, value proposition)."
    )
}

pub fn draft_prompt(summary: &str, context: &str) -> String {
    format!(
        "Using the following summary and context, generate 5–10 high-level requirements grouped into subdomains.\n\n\
         Summary:\n{summary}\n\n\
         Context:\n{context}\n\n\
         Return strictly JSON in this format:\n\
         {{\n  \"subdomains\": [\"SubdomainA\",\"SubdomainB\"],\n  \"requirements\": [\n    \
         {{\"id\":\"R1\",\"subdomain\":\"SubdomainA\",\"text\":\"First requirement\"}},\n    ...\n  ]\n}}\n"
    )
}

pub fn refine_prompt(text: &str) -> String {
    format!(
        "You are refining one requirement. Original requirement text:\n\
         {text}\n\n\
         Return **only** the improved requirement text. Do not include any metadata (ID or subdomain labels)."
    )
}

// ============================================================================
// Stages
// ============================================================================

async fn run_stage(
    client: &dyn CompletionClient,
    stage: &'static str,
    prompt: String,
    params: GenerationParams,
) -> Result<String, IdeateError> {
    tracing::debug!(
        stage,
        backend = client.name(),
        max_tokens = params.max_tokens,
        "Dispatching stage prompt"
    );

    client.complete(&prompt, params).await.map_err(|e| {
        tracing::warn!(stage, error = %e, "Completion call failed");
        IdeateError::Upstream(e)
    })
}

/// Summarize a raw idea into one or two sentences.
pub async fn summarize(client: &dyn CompletionClient, text: &str) -> Result<String, IdeateError> {
    run_stage(client, "summarize", summarize_prompt(text), SUMMARIZE_PARAMS).await
}

/// Ask for the missing context (target user, pain point, value proposition).
/// The answer stays free text.
pub async fn enrich(client: &dyn CompletionClient, summary: &str) -> Result<String, IdeateError> {
    run_stage(client, "enrich", enrich_prompt(summary), ENRICH_PARAMS).await
}

/// Produce a Draft Document from summary and context.
pub async fn draft(
    client: &dyn CompletionClient,
    summary: &str,
    context: &str,
) -> Result<DraftDocument, IdeateError> {
    let raw = run_stage(client, "draft", draft_prompt(summary, context), DRAFT_PARAMS).await?;

    let document = DraftDocument::parse(&raw).inspect_err(|e| {
        if let IdeateError::MalformedUpstreamOutput { reason, .. } = e {
            tracing::warn!(reason = %reason, "Draft stage returned unparseable output");
        }
    })?;

    let orphans = document.orphaned_requirements();
    if !orphans.is_empty() {
        let ids: Vec<&str> = orphans.iter().map(|r| r.id.as_str()).collect();
        tracing::warn!(?ids, "Draft requirements reference unlisted subdomains");
    }

    Ok(document)
}

/// Rewrite one requirement's text. `id` and `subdomain` are echoed as given.
pub async fn refine(
    client: &dyn CompletionClient,
    requirement: Requirement,
) -> Result<Requirement, IdeateError> {
    let improved = run_stage(
        client,
        "refine",
        refine_prompt(&requirement.text),
        REFINE_PARAMS,
    )
    .await?;

    Ok(Requirement {
        text: improved,
        ..requirement
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ideate_core::CompletionError;
    use std::sync::Mutex;

    /// Scripted oracle: returns a fixed reply and records what it was sent.
    struct ScriptedClient {
        reply: Result<String, u16>,
        seen: Mutex<Vec<(String, GenerationParams)>>,
    }

    impl ScriptedClient {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(code: u16) -> Self {
            Self {
                reply: Err(code),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_call(&self) -> (String, GenerationParams) {
            self.seen.lock().unwrap().last().cloned().expect("no calls recorded")
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(
            &self,
            prompt: &str,
            params: GenerationParams,
        ) -> Result<String, CompletionError> {
            self.seen.lock().unwrap().push((prompt.to_string(), params));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(code) => Err(CompletionError::Api {
                    code: *code,
                    message: "upstream unavailable".to_string(),
                }),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn test_prompts_interpolate_inputs() {
        assert!(summarize_prompt("dog bowls").contains("Input: dog bowls\n"));
        assert!(enrich_prompt("S").starts_with("Given this project summary:\nS\n"));
        let p = draft_prompt("S", "C");
        assert!(p.contains("Summary:\nS\n\nContext:\nC\n\n"));
        assert!(p.contains("{\"id\":\"R1\",\"subdomain\":\"SubdomainA\",\"text\":\"First requirement\"}"));
        assert!(refine_prompt("Old text").contains("Original requirement text:\nOld text\n\n"));
    }

    #[tokio::test]
    async fn test_summarize_returns_oracle_text() {
        let client = ScriptedClient::replying("A hydration reminder app for dog owners.");
        let summary = summarize(
            &client,
            "A tool that reminds dog owners to refill water bowls",
        )
        .await
        .unwrap();

        assert_eq!(summary, "A hydration reminder app for dog owners.");
        let (prompt, params) = client.last_call();
        assert!(prompt.contains("A tool that reminds dog owners to refill water bowls"));
        assert_eq!(params, SUMMARIZE_PARAMS);
    }

    #[tokio::test]
    async fn test_enrich_uses_enrich_params() {
        let client = ScriptedClient::replying("1. Target user: ...");
        let context = enrich(&client, "A summary").await.unwrap();
        assert_eq!(context, "1. Target user: ...");
        assert_eq!(client.last_call().1, ENRICH_PARAMS);
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_upstream_kind() {
        let client = ScriptedClient::failing(503);
        let err = summarize(&client, "idea").await.unwrap_err();
        assert_eq!(err.kind(), "upstream");
    }

    #[tokio::test]
    async fn test_draft_parses_structured_output() {
        let client = ScriptedClient::replying(
            r#"{"subdomains":["Alerts"],"requirements":[{"id":"R1","subdomain":"Alerts","text":"Send reminders"}]}"#,
        );
        let doc = draft(&client, "S", "C").await.unwrap();
        assert_eq!(doc.subdomains, vec!["Alerts"]);
        assert_eq!(doc.requirements[0].text, "Send reminders");
        assert_eq!(client.last_call().1, DRAFT_PARAMS);
    }

    #[tokio::test]
    async fn test_draft_rejects_non_json_with_raw_text() {
        let client = ScriptedClient::replying("Sorry, I can't help");
        let err = draft(&client, "S", "C").await.unwrap_err();
        assert_eq!(err.kind(), "malformed_upstream_output");
        assert_eq!(err.raw_output(), Some("Sorry, I can't help"));
    }

    #[tokio::test]
    async fn test_refine_echoes_id_and_subdomain() {
        let client = ScriptedClient::replying("Owners receive a push notification when the bowl is empty.");
        let input = Requirement {
            id: "R3".to_string(),
            subdomain: "Alerts".to_string(),
            text: "notify".to_string(),
            extra: Default::default(),
        };
        let out = refine(&client, input).await.unwrap();

        assert_eq!(out.id, "R3");
        assert_eq!(out.subdomain, "Alerts");
        assert_eq!(out.text, "Owners receive a push notification when the bowl is empty.");
        let (prompt, params) = client.last_call();
        assert!(prompt.contains("notify"));
        assert!(!prompt.contains("R3"));
        assert_eq!(params, REFINE_PARAMS);
    }

    #[tokio::test]
    async fn test_refine_keeps_extra_requirement_keys() {
        let client = ScriptedClient::replying("Alerts fire within one minute of the bowl emptying.");
        let input: Requirement = serde_json::from_value(serde_json::json!({
            "id": "R2",
            "subdomain": "Alerts",
            "text": "fast alerts",
            "priority": "high"
        }))
        .unwrap();
        let out = refine(&client, input).await.unwrap();

        assert_eq!(out.extra.get("priority"), Some(&serde_json::json!("high")));
        let (prompt, _) = client.last_call();
        assert!(!prompt.contains("priority"));
    }
}
