use crate::core::error::AgentError;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation, tagged with its speaker.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling options passed through to the backend.
#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_output_tokens: 250,
        }
    }
}

/// A normalized backend reply. `raw` is kept for diagnostic logging only;
/// nothing downstream depends on its shape.
#[derive(Debug, Clone)]
pub struct ModelReply {
    pub text: String,
    pub raw: serde_json::Value,
}

/// Abstraction over one generative-model backend. One concrete adapter per
/// backend variant, selected at construction time.
///
/// An adapter built without a credential returns
/// `AgentError::BackendUnavailable` from every call for its whole lifetime.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn generate(
        &self,
        history: &[Message],
        options: &GenerateOptions,
    ) -> Result<ModelReply, AgentError>;

    /// Whether a credential was present at construction time.
    fn is_configured(&self) -> bool;
}

pub mod base_client;
pub mod factory;
pub mod gemini;
pub mod openai_compatible;
