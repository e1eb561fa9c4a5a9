// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Gemini semantic matcher
//!
//! Asks the Generative Language `generateContent` API which catalog items
//! match a query, with a structured-output schema of an array of strings.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::config::SearchConfig;
use super::provider::SemanticMatcher;
use super::types::{CandidateSummary, MatchError};

const PROVIDER_NAME: &str = "gemini";

/// Remote semantic matcher backed by Gemini
pub struct GeminiMatcher {
    api_key: String,
    model: String,
    endpoint: String,
    timeout_ms: u64,
    client: Client,
}

impl GeminiMatcher {
    /// Create a new Gemini matcher
    ///
    /// # Arguments
    /// * `api_key` - Generative Language API key
    /// * `model` - Model name, e.g. `gemini-3-flash-preview`
    /// * `endpoint` - API base URL without trailing slash
    /// * `timeout` - Per-request timeout
    pub fn new(
        api_key: String,
        model: impl Into<String>,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, MatchError> {
        if api_key.trim().is_empty() {
            return Err(MatchError::NoApiKey {
                provider: PROVIDER_NAME.to_string(),
            });
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MatchError::Transport(e.to_string()))?;

        Ok(Self {
            api_key,
            model: model.into(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout_ms: timeout.as_millis() as u64,
            client,
        })
    }

    /// Build from configuration; fails with `NoApiKey` when no key is set
    pub fn from_config(config: &SearchConfig) -> Result<Self, MatchError> {
        let api_key = config
            .provider
            .api_key
            .clone()
            .ok_or_else(|| MatchError::NoApiKey {
                provider: PROVIDER_NAME.to_string(),
            })?;

        Self::new(
            api_key,
            config.provider.model.clone(),
            &config.provider.endpoint,
            config.request_timeout(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl SemanticMatcher for GeminiMatcher {
    async fn semantic_match(
        &self,
        query: &str,
        candidates: &[CandidateSummary],
    ) -> Result<Vec<String>, MatchError> {
        let request = build_request(query, candidates)?;

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MatchError::Timeout {
                        timeout_ms: self.timeout_ms,
                    }
                } else {
                    MatchError::Transport(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            return Err(MatchError::RateLimited {
                retry_after_secs: 60,
            });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MatchError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let data: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| MatchError::MalformedResponse {
                    reason: format!("JSON parse error: {}", e),
                })?;

        let text = data.first_text().ok_or_else(|| MatchError::MalformedResponse {
            reason: "response has no text part".to_string(),
        })?;

        let ids = parse_id_array(text)?;
        debug!("Gemini returned {} ids for {} candidates", ids.len(), candidates.len());
        Ok(ids)
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Prompt sent with every request
///
/// The query is embedded as a JSON string literal so quotes in user input
/// cannot break out of it.
pub(crate) fn build_prompt(query: &str, candidates: &[CandidateSummary]) -> Result<String, MatchError> {
    let query_literal = serde_json::to_string(query).map_err(|e| MatchError::MalformedResponse {
        reason: format!("query encoding: {}", e),
    })?;
    let items = serde_json::to_string(candidates).map_err(|e| MatchError::MalformedResponse {
        reason: format!("candidate encoding: {}", e),
    })?;

    Ok(format!(
        "User search query: {query_literal}.\n\
         Available items: {items}.\n\
         Analyze the user query. It might contain typos, partial words, or be written in Portuguese.\n\
         Return the IDs of the items whose title or description most closely match the user's intent.\n\
         Only return a JSON array of strings containing the IDs."
    ))
}

fn build_request(query: &str, candidates: &[CandidateSummary]) -> Result<GenerateContentRequest, MatchError> {
    Ok(GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts: vec![Part {
                text: build_prompt(query, candidates)?,
            }],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: serde_json::json!({
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }),
        },
    })
}

/// Strictly parse the model's answer as a JSON array of strings
///
/// Anything else, including an array holding a non-string element, is
/// rejected as a whole.
pub fn parse_id_array(text: &str) -> Result<Vec<String>, MatchError> {
    let value: Value = serde_json::from_str(text.trim()).map_err(|e| MatchError::MalformedResponse {
        reason: format!("not JSON: {}", e),
    })?;

    let Value::Array(elements) = value else {
        return Err(MatchError::MalformedResponse {
            reason: "expected a JSON array".to_string(),
        });
    };

    elements
        .into_iter()
        .map(|element| match element {
            Value::String(id) => Ok(id),
            other => Err(MatchError::MalformedResponse {
                reason: format!("non-string element: {}", other),
            }),
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<Content>,
}

impl GenerateContentResponse {
    fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .find(|t| !t.trim().is_empty())
    }
}
