//! Draft Document - the subdomains/requirements structure emitted by the
//! draft stage and carried by the caller into refine and save.

use serde::{Deserialize, Serialize};

use crate::error::IdeateError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    pub subdomain: String,
    pub text: String,
    /// Extra per-requirement keys (priority, rationale, ...) kept as emitted.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftDocument {
    pub subdomains: Vec<String>,
    pub requirements: Vec<Requirement>,
    /// Any other top-level keys the oracle emitted, passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DraftDocument {
    /// Parse oracle output. Anything that is not a JSON object with a
    /// `subdomains` list and a `requirements` list fails with
    /// `MalformedUpstreamOutput` carrying the raw text.
    pub fn parse(raw: &str) -> Result<Self, IdeateError> {
        let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
            tracing::debug!(error = %e, "Draft output is not JSON");
            IdeateError::MalformedUpstreamOutput {
                raw: raw.to_string(),
                reason: "Invalid JSON returned".to_string(),
            }
        })?;

        serde_json::from_value(value).map_err(|e| IdeateError::MalformedUpstreamOutput {
            raw: raw.to_string(),
            reason: format!("Unexpected draft shape ({})", e),
        })
    }

    /// Requirements whose subdomain is not listed in `subdomains`.
    pub fn orphaned_requirements(&self) -> Vec<&Requirement> {
        self.requirements
            .iter()
            .filter(|r| !self.subdomains.contains(&r.subdomain))
            .collect()
    }
}
