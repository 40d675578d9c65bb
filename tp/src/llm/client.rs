//! LlmClient trait and the HTTP endpoint shared by providers

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{CompletionRequest, CompletionResponse, LlmError};
use crate::config::LlmConfig;

/// Stateless completion client - each call is independent
///
/// Every pipeline stage sends one request with a fresh conversation; no
/// state is carried between calls.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request and wait for the full response
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Where and how a provider is reached
pub(crate) struct Endpoint {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub http: Client,
}

impl Endpoint {
    /// Resolve the API key from the configured env var and build the HTTP client
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, base_url = %config.base_url, "Endpoint::from_config: called");
        let api_key = config.get_api_key().map_err(|e| LlmError::Setup(e.to_string()))?;
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_tokens: config.max_tokens,
            http,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Requested output budget, never above the configured ceiling
    pub fn cap(&self, requested: u32) -> u32 {
        requested.min(self.max_tokens)
    }

    #[cfg(test)]
    pub fn fixture(model: &str, max_tokens: u32) -> Self {
        Self {
            model: model.to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://provider.test".to_string(),
            max_tokens,
            http: Client::new(),
        }
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock LLM client for unit tests
    ///
    /// Replays responses in order and records every request it receives.
    pub struct MockLlmClient {
        responses: Vec<CompletionResponse>,
        fail_at: Option<usize>,
        call_count: AtomicUsize,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockLlmClient {
        pub fn new(responses: Vec<CompletionResponse>) -> Self {
            debug!(response_count = %responses.len(), "MockLlmClient::new: called");
            Self {
                responses,
                fail_at: None,
                call_count: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Build a client that answers each call with the given text
        pub fn with_texts(texts: &[&str]) -> Self {
            Self::new(texts.iter().map(|t| CompletionResponse::text(*t)).collect())
        }

        /// Make the call at `index` (0-based) fail with a provider error
        pub fn failing_at(mut self, index: usize) -> Self {
            self.fail_at = Some(index);
            self
        }

        pub fn call_count(&self) -> usize {
            debug!("MockLlmClient::call_count: called");
            self.call_count.load(Ordering::SeqCst)
        }

        /// Requests received so far
        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!("MockLlmClient::complete: called");
            self.requests.lock().unwrap().push(request);
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            debug!(%idx, "MockLlmClient::complete: fetching response");

            if self.fail_at == Some(idx) {
                return Err(LlmError::ApiError {
                    status: 500,
                    message: "mock provider failure".to_string(),
                });
            }

            self.responses.get(idx).cloned().ok_or_else(|| {
                debug!("MockLlmClient::complete: no more mock responses");
                LlmError::InvalidResponse("No more mock responses".to_string())
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::llm::Message;

        fn request() -> CompletionRequest {
            CompletionRequest {
                system_prompt: "Test".to_string(),
                messages: vec![Message::user("hi")],
                max_tokens: 1000,
            }
        }

        #[tokio::test]
        async fn test_mock_client_returns_responses() {
            let client = MockLlmClient::with_texts(&["Response 1", "Response 2"]);

            let resp1 = client.complete(request()).await.unwrap();
            assert_eq!(resp1.content, Some("Response 1".to_string()));

            let resp2 = client.complete(request()).await.unwrap();
            assert_eq!(resp2.content, Some("Response 2".to_string()));

            assert_eq!(client.call_count(), 2);
            assert_eq!(client.requests().len(), 2);
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::new(vec![]);
            assert!(client.complete(request()).await.is_err());
        }

        #[tokio::test]
        async fn test_mock_client_fails_at_index() {
            let client = MockLlmClient::with_texts(&["a", "b"]).failing_at(1);
            assert!(client.complete(request()).await.is_ok());
            assert!(matches!(
                client.complete(request()).await,
                Err(LlmError::ApiError { status: 500, .. })
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_caps_output_budget() {
        let endpoint = Endpoint::fixture("any-model", 2048);
        assert_eq!(endpoint.cap(4096), 2048);
        assert_eq!(endpoint.cap(512), 512);
    }

    #[test]
    fn test_endpoint_from_config_trims_base_url() {
        // SAFETY: test-only env var with a name no other test reads
        unsafe { std::env::set_var("TRIPPLANNER_TEST_ENDPOINT_KEY", "k") };
        let config = LlmConfig {
            api_key_env: "TRIPPLANNER_TEST_ENDPOINT_KEY".to_string(),
            base_url: "https://gateway.test/".to_string(),
            ..LlmConfig::default()
        };
        let endpoint = Endpoint::from_config(&config).unwrap();
        assert_eq!(endpoint.api_key, "k");
        assert_eq!(endpoint.url("/v1/messages"), "https://gateway.test/v1/messages");
    }
}
