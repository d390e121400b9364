use crate::core::error::AgentError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Gemini,
    #[serde(rename = "openai")]
    OpenAiCompat,
}

impl Provider {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Some(Provider::Gemini),
            "openai" => Some(Provider::OpenAiCompat),
            _ => None,
        }
    }
}

impl Default for Provider {
    fn default() -> Self {
        Provider::Gemini
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub active_provider: Option<Provider>,
    #[serde(default)]
    pub bind_addr: Option<String>,
    #[serde(default)]
    pub providers: HashMap<Provider, ProviderConfig>,
}

impl Config {
    fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hbuddy")
            .join("config.yaml")
    }

    /// Loads the YAML config file when one exists, then applies environment
    /// overrides. A missing file is not an error; the environment alone is a
    /// complete configuration.
    pub fn load(path: Option<&str>) -> Result<Config, AgentError> {
        let path = path.map(PathBuf::from).unwrap_or_else(Self::default_path);

        let mut config = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_yml::from_str::<Config>(&contents)
                .map_err(|e| AgentError::Config(format!("Parse {}: {}", path.display(), e)))?
        } else {
            Config::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Environment wins over the file. Credential fallback order for Gemini
    /// follows the original deployment: GEMINI_API_KEY, then GOOGLE_API_KEY.
    fn apply_env(&mut self) {
        let gemini = self.providers.entry(Provider::Gemini).or_default();
        if let Some(key) = env::var("GEMINI_API_KEY")
            .ok()
            .or_else(|| env::var("GOOGLE_API_KEY").ok())
        {
            gemini.api_key = Some(key);
        }
        if let Ok(model) = env::var("GEMINI_MODEL_NAME") {
            gemini.model = Some(model);
        }

        if let Ok(key) = env::var("OPENAI_API_KEY") {
            self.providers
                .entry(Provider::OpenAiCompat)
                .or_default()
                .api_key = Some(key);
        }

        if let Ok(bind) = env::var("HBUDDY_BIND") {
            self.bind_addr = Some(bind);
        }
    }

    pub fn provider_config(&self, provider: &Provider) -> ProviderConfig {
        self.providers.get(provider).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_round_trip() {
        assert_eq!(Provider::from_str("gemini"), Some(Provider::Gemini));
        assert_eq!(Provider::from_str("GEMINI"), Some(Provider::Gemini));
        assert_eq!(Provider::from_str("openai"), Some(Provider::OpenAiCompat));
        assert_eq!(Provider::from_str("cohere"), None);
    }

    #[test]
    fn yaml_config_parses() {
        let yaml = r#"
active_provider: gemini
bind_addr: "127.0.0.1:9000"
providers:
  gemini:
    api_key: k
    model: models/gemini-2.5-flash
"#;
        let config: Config = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.active_provider, Some(Provider::Gemini));
        assert_eq!(config.bind_addr.as_deref(), Some("127.0.0.1:9000"));
        assert_eq!(
            config.provider_config(&Provider::Gemini).api_key.as_deref(),
            Some("k")
        );
    }
}
