use crate::core::error::AgentError;
use crate::providers::base_client::{AuthScheme, BaseApiClient};
use crate::providers::{GenerateOptions, Message, ModelProvider, ModelReply, Role};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct ChatCompletionMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatCompletionMessage>,
    temperature: f32,
    max_tokens: u32,
}

/// Adapter for any chat-completions style backend (OpenAI and compatibles).
pub struct OpenAiCompatProvider {
    model: String,
    client: Option<BaseApiClient>,
}

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

impl OpenAiCompatProvider {
    pub fn new(api_key: Option<String>, model: String) -> Result<Self, AgentError> {
        Self::with_endpoint(DEFAULT_ENDPOINT.to_string(), api_key, model)
    }

    pub fn with_endpoint(
        endpoint: String,
        api_key: Option<String>,
        model: String,
    ) -> Result<Self, AgentError> {
        let client = match api_key {
            Some(key) => Some(BaseApiClient::new(endpoint, key, AuthScheme::Bearer)?),
            None => None,
        };
        Ok(Self { model, client })
    }
}

/// Same contract as the Gemini extractor: candidate completion list first,
/// direct text field second, stringified body last.
fn extract_text(raw: &Value) -> String {
    if let Some(content) = raw
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
    {
        return content.trim().to_string();
    }

    if let Some(text) = raw.get("text").and_then(|t| t.as_str()) {
        return text.trim().to_string();
    }

    raw.to_string()
}

#[async_trait]
impl ModelProvider for OpenAiCompatProvider {
    async fn generate(
        &self,
        history: &[Message],
        options: &GenerateOptions,
    ) -> Result<ModelReply, AgentError> {
        let client = self.client.as_ref().ok_or(AgentError::BackendUnavailable)?;

        let messages = history
            .iter()
            .map(|m| ChatCompletionMessage {
                role: match m.role {
                    Role::System => "system".to_string(),
                    Role::User => "user".to_string(),
                    Role::Assistant => "assistant".to_string(),
                },
                content: m.content.clone(),
            })
            .collect();

        let payload = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: options.temperature,
            max_tokens: options.max_output_tokens,
        };

        let response = client.post("chat/completions", &payload).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Generation(format!(
                "Backend returned status {}",
                status
            )));
        }

        let raw: Value = serde_json::from_str(&response.text().await?)
            .map_err(|e| AgentError::Generation(format!("Unparseable response: {}", e)))?;

        Ok(ModelReply {
            text: extract_text(&raw),
            raw,
        })
    }

    fn is_configured(&self) -> bool {
        self.client.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_first_choice_content() {
        let raw = json!({
            "choices": [
                {"message": {"role": "assistant", "content": " Eat more fiber. "}},
                {"message": {"role": "assistant", "content": "second"}}
            ]
        });
        assert_eq!(extract_text(&raw), "Eat more fiber.");
    }

    #[test]
    fn unknown_shape_stringifies() {
        let raw = json!({"error": {"message": "quota"}});
        assert_eq!(extract_text(&raw), raw.to_string());
    }
}
