use crate::config::{Provider, ProviderConfig};
use crate::core::error::AgentError;
use crate::providers::{
    ModelProvider, gemini::GeminiProvider, openai_compatible::OpenAiCompatProvider,
};
use std::collections::HashMap;

type ProviderCreator =
    Box<dyn Fn(&ProviderConfig) -> Result<Box<dyn ModelProvider>, AgentError> + Send + Sync>;

pub struct ProviderFactory {
    creators: HashMap<Provider, ProviderCreator>,
}

impl ProviderFactory {
    pub fn new() -> Self {
        let mut creators = HashMap::new();

        creators.insert(
            Provider::Gemini,
            Box::new(|config: &ProviderConfig| {
                let model = config
                    .model
                    .clone()
                    .unwrap_or_else(|| "models/gemini-2.5-flash".to_string());
                let provider = if let Some(base_url) = &config.base_url {
                    GeminiProvider::with_endpoint(base_url.clone(), config.api_key.clone(), model)?
                } else {
                    GeminiProvider::new(config.api_key.clone(), model)?
                };
                Ok(Box::new(provider) as Box<dyn ModelProvider>)
            }) as ProviderCreator,
        );

        creators.insert(
            Provider::OpenAiCompat,
            Box::new(|config: &ProviderConfig| {
                let model = config
                    .model
                    .clone()
                    .unwrap_or_else(|| "gpt-4.1-mini".to_string());
                let provider = if let Some(base_url) = &config.base_url {
                    OpenAiCompatProvider::with_endpoint(
                        base_url.clone(),
                        config.api_key.clone(),
                        model,
                    )?
                } else {
                    OpenAiCompatProvider::new(config.api_key.clone(), model)?
                };
                Ok(Box::new(provider) as Box<dyn ModelProvider>)
            }) as ProviderCreator,
        );

        Self { creators }
    }

    pub fn create(
        &self,
        provider: &Provider,
        config: &ProviderConfig,
    ) -> Result<Box<dyn ModelProvider>, AgentError> {
        self.creators
            .get(provider)
            .ok_or_else(|| AgentError::Config(format!("Provider not found: {:?}", provider)))
            .and_then(|creator| creator(config))
    }
}

impl Default for ProviderFactory {
    fn default() -> Self {
        Self::new()
    }
}
