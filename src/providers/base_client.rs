use crate::core::error::AgentError;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;

/// Upper bound on a single backend call. A hung call surfaces as a
/// generation failure, never an indefinitely stalled chat.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// How the credential is attached to outbound requests.
#[derive(Debug, Clone)]
pub enum AuthScheme {
    /// `Authorization: Bearer <key>` header (OpenAI-style APIs)
    Bearer,
    /// Query parameter, e.g. `?key=<key>` (Google generative language API)
    QueryParam(&'static str),
}

/// Shared JSON-POST client for backend adapters.
#[derive(Clone)]
pub struct BaseApiClient {
    endpoint: String,
    api_key: String,
    auth: AuthScheme,
    client: Client,
}

impl BaseApiClient {
    pub fn new(endpoint: String, api_key: String, auth: AuthScheme) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AgentError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint,
            api_key,
            auth,
            client,
        })
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, AgentError> {
        let url = format!("{}/{}", self.endpoint.trim_end_matches('/'), path);

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        request = match &self.auth {
            AuthScheme::Bearer => {
                request.header("Authorization", format!("Bearer {}", self.api_key))
            }
            AuthScheme::QueryParam(name) => request.query(&[(*name, self.api_key.as_str())]),
        };

        let response = request.json(payload).send().await?;
        Ok(response)
    }
}
