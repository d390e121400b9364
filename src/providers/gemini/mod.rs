use crate::core::error::AgentError;
use crate::providers::base_client::{AuthScheme, BaseApiClient};
use crate::providers::{GenerateOptions, Message, ModelProvider, ModelReply, Role};
use async_trait::async_trait;
use serde_json::Value;

mod types;

use types::*;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Adapter for the Google generative language API (`generateContent`).
pub struct GeminiProvider {
    model: String,
    // None when no credential was present at construction; every call then
    // reports BackendUnavailable for the lifetime of this instance.
    client: Option<BaseApiClient>,
}

impl GeminiProvider {
    pub fn new(api_key: Option<String>, model: String) -> Result<Self, AgentError> {
        Self::with_endpoint(DEFAULT_ENDPOINT.to_string(), api_key, model)
    }

    pub fn with_endpoint(
        endpoint: String,
        api_key: Option<String>,
        model: String,
    ) -> Result<Self, AgentError> {
        let client = match api_key {
            Some(key) => Some(BaseApiClient::new(endpoint, key, AuthScheme::QueryParam("key"))?),
            None => None,
        };
        Ok(Self { model, client })
    }

    fn build_payload(&self, messages: &[Message], options: &GenerateOptions) -> GeminiRequest {
        let mut contents = Vec::new();
        let mut system_instruction = None;

        for message in messages {
            match message.role {
                Role::System => {
                    // Gemini takes a single dedicated system instruction
                    if system_instruction.is_none() {
                        system_instruction = Some(SystemInstruction {
                            parts: vec![GeminiPart {
                                text: message.content.clone(),
                            }],
                        });
                    }
                }
                Role::User | Role::Assistant => {
                    let role = match message.role {
                        Role::User => "user",
                        _ => "model",
                    };
                    contents.push(GeminiContent {
                        role: role.to_string(),
                        parts: vec![GeminiPart {
                            text: message.content.clone(),
                        }],
                    });
                }
            }
        }

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_output_tokens,
            },
        }
    }
}

/// Pulls a flat text string out of a reply body, trying each known shape in
/// priority order: candidate list with nested content parts, then a direct
/// top-level text field, then the stringified body as a last resort. Callers
/// always get text, never a structured object.
fn extract_text(raw: &Value) -> String {
    if let Some(candidates) = raw.get("candidates").and_then(|c| c.as_array()) {
        if let Some(parts) = candidates
            .first()
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
        {
            let pieces: Vec<&str> = parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect();
            if !pieces.is_empty() {
                return pieces.join(" ").trim().to_string();
            }
        }
    }

    if let Some(text) = raw.get("text").and_then(|t| t.as_str()) {
        return text.trim().to_string();
    }

    raw.to_string()
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    async fn generate(
        &self,
        history: &[Message],
        options: &GenerateOptions,
    ) -> Result<ModelReply, AgentError> {
        let client = self.client.as_ref().ok_or(AgentError::BackendUnavailable)?;

        let payload = self.build_payload(history, options);
        let response = client
            .post(&format!("v1beta/models/{}:generateContent", self.model), &payload)
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Generation(format!(
                "Gemini returned status {}",
                status
            )));
        }

        let raw: Value = serde_json::from_str(&response.text().await?)
            .map_err(|e| AgentError::Generation(format!("Unparseable Gemini response: {}", e)))?;

        Ok(ModelReply {
            text: extract_text(&raw),
            raw,
        })
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}
