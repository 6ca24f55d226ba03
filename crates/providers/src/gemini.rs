//! Google Gemini provider (`generateContent` REST API).
//!
//! The API key travels as the `key` query parameter. System messages are
//! sent as `system_instruction`; the remaining messages become `contents`
//! with roles `user` / `model`.

use crate::http::{build_client, ensure_success, transport_error};
use async_trait::async_trait;
use miniagent_core::error::ProviderError;
use miniagent_core::message::{Message, Role};
use miniagent_core::provider::*;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A Gemini LLM provider.
pub struct GeminiProvider {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a provider against the public Gemini endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            name: "gemini".into(),
            base_url: DEFAULT_GEMINI_BASE_URL.into(),
            api_key: api_key.into(),
            client: build_client(Duration::from_secs(120)),
        }
    }

    /// Point the provider at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn model_url(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{model}:generateContent", self.base_url)
    }

    fn request_body(request: &ProviderRequest) -> serde_json::Value {
        let system: Vec<&str> = request
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let contents: Vec<serde_json::Value> = request
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| {
                let role = if m.role == Role::Assistant { "model" } else { "user" };
                json!({ "role": role, "parts": [{ "text": m.content }] })
            })
            .collect();

        let mut generation_config = json!({ "temperature": request.temperature });
        if let Some(max_tokens) = request.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }
        if !request.stop.is_empty() {
            generation_config["stopSequences"] = json!(request.stop);
        }

        let mut body = json!({
            "contents": contents,
            "generationConfig": generation_config,
        });

        if !system.is_empty() {
            body["system_instruction"] = json!({ "parts": [{ "text": system.join("\n\n") }] });
        }

        body
    }

    fn extract_text(response: GeminiResponse) -> Option<String> {
        let parts = response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()?
            .content?
            .parts;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        Some(text)
    }
}

#[async_trait]
impl miniagent_core::Provider for GeminiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = self.model_url(&request.model);
        let body = Self::request_body(&request);

        info!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            "Sending request to Gemini"
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let response = ensure_success(&self.name, response).await?;

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;
        debug!("Received response from Gemini");

        let usage = parsed.usage_metadata.as_ref().map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });
        let model = parsed
            .model_version
            .clone()
            .unwrap_or_else(|| request.model.clone());

        let text = Self::extract_text(parsed)
            .ok_or_else(|| ProviderError::InvalidResponse("missing candidate text".into()))?;

        Ok(ProviderResponse {
            message: Message::assistant(text),
            usage,
            model,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniagent_core::Provider;

    #[test]
    fn model_url_accepts_prefixed_names() {
        let provider = GeminiProvider::new("k");
        assert_eq!(
            provider.model_url("models/gemini-1.5-flash"),
            provider.model_url("gemini-1.5-flash")
        );
        assert!(
            provider
                .model_url("gemini-1.5-flash")
                .ends_with("/models/gemini-1.5-flash:generateContent")
        );
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn system_messages_become_system_instruction() {
        let request = ProviderRequest {
            model: "gemini-1.5-flash".into(),
            messages: vec![
                Message::system("Answer tersely"),
                Message::user("What is 2+2?"),
                Message::assistant("4"),
            ],
            temperature: 0.2,
            max_tokens: Some(100),
            stop: vec![],
        };
        let body = GeminiProvider::request_body(&request);
        assert_eq!(
            body["system_instruction"]["parts"][0]["text"],
            "Answer tersely"
        );
        assert_eq!(body["contents"].as_array().unwrap().len(), 2);
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 100);
    }

    #[test]
    fn text_parts_are_concatenated() {
        let data = r#"{
            "candidates": [{"content": {"parts": [{"text": "ACTION: "}, {"text": "none"}], "role": "model"}}],
            "usageMetadata": {"promptTokenCount": 4, "candidatesTokenCount": 2, "totalTokenCount": 6}
        }"#;
        let parsed: GeminiResponse = serde_json::from_str(data).unwrap();
        assert_eq!(parsed.usage_metadata.as_ref().unwrap().total_token_count, 6);
        assert_eq!(
            GeminiProvider::extract_text(parsed).as_deref(),
            Some("ACTION: none")
        );
    }

    #[test]
    fn missing_candidates_yield_none() {
        let parsed: GeminiResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(GeminiProvider::extract_text(parsed).is_none());
    }
}
