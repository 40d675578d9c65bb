//! OpenAI-compatible chat-completions client
//!
//! Works against OpenAI itself or any gateway exposing
//! `POST {base_url}/v1/chat/completions`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::client::Endpoint;
use super::error::check_status;
use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Role, StopReason, TokenUsage};
use crate::config::LlmConfig;

/// Model families that reject `max_tokens` in favour of `max_completion_tokens`
const COMPLETION_TOKEN_MODELS: &[&str] = &["gpt-5", "o1", "o3", "o4"];

pub struct OpenAIClient {
    endpoint: Endpoint,
}

impl OpenAIClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            endpoint: Endpoint::from_config(config)?,
        })
    }

    fn token_field(&self) -> &'static str {
        if COMPLETION_TOKEN_MODELS.iter().any(|p| self.endpoint.model.starts_with(p)) {
            "max_completion_tokens"
        } else {
            "max_tokens"
        }
    }

    /// Chat body with the system prompt as the leading message
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let system = json!({ "role": "system", "content": request.system_prompt });
        let messages: Vec<_> = std::iter::once(system)
            .chain(request.messages.iter().map(|m| {
                let role = match m.role {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                };
                json!({ "role": role, "content": m.content })
            }))
            .collect();

        let mut body = json!({
            "model": self.endpoint.model,
            "messages": messages,
        });
        body[self.token_field()] = json!(self.endpoint.cap(request.max_tokens));
        body
    }

    /// Only the first choice is read
    fn parse_response(&self, reply: ChatReply) -> CompletionResponse {
        let (content, stop_reason) = reply
            .choices
            .into_iter()
            .next()
            .map(|c| (c.message.content, StopReason::from_openai(c.finish_reason.as_deref())))
            .unwrap_or((None, StopReason::EndTurn));

        CompletionResponse {
            content,
            stop_reason,
            usage: reply
                .usage
                .map(|u| TokenUsage {
                    input_tokens: u.prompt_tokens,
                    output_tokens: u.completion_tokens,
                })
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(model = %self.endpoint.model, max_tokens = request.max_tokens, "OpenAIClient::complete: called");
        let response = self
            .endpoint
            .http
            .post(self.endpoint.url("/v1/chat/completions"))
            .bearer_auth(&self.endpoint.api_key)
            .json(&self.build_request_body(&request))
            .send()
            .await?;

        let reply: ChatReply = check_status(response).await?.json().await?;
        debug!(choices = reply.choices.len(), "OpenAIClient::complete: reply received");
        Ok(self.parse_response(reply))
    }
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;

    fn client(model: &str, max_tokens: u32) -> OpenAIClient {
        OpenAIClient {
            endpoint: Endpoint::fixture(model, max_tokens),
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let request = CompletionRequest {
            system_prompt: "You are helpful".to_string(),
            messages: vec![Message::user("Hello")],
            max_tokens: 1000,
        };

        let body = client("gpt-4o", 8192).build_request_body(&request);

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You are helpful");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Hello");
    }

    #[test]
    fn test_max_tokens_capped() {
        let request = CompletionRequest {
            system_prompt: "Test".to_string(),
            messages: vec![],
            max_tokens: 5000,
        };

        let body = client("gpt-4o", 1000).build_request_body(&request);
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn test_completion_tokens_for_reasoning_models() {
        let request = CompletionRequest {
            system_prompt: "Test".to_string(),
            messages: vec![],
            max_tokens: 500,
        };

        let body = client("o3-mini", 1000).build_request_body(&request);
        assert_eq!(body["max_completion_tokens"], 500);
        assert!(body.get("max_tokens").is_none());
    }

    #[test]
    fn test_parse_response() {
        let api_response: ChatReply = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"content": "Bonjour"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        }))
        .unwrap();

        let response = client("gpt-4o", 1000).parse_response(api_response);
        assert_eq!(response.content.as_deref(), Some("Bonjour"));
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.usage.total(), 15);
    }

    #[test]
    fn test_parse_response_without_choices() {
        let api_response: ChatReply = serde_json::from_value(serde_json::json!({})).unwrap();
        let response = client("gpt-4o", 1000).parse_response(api_response);
        assert!(response.content.is_none());
        assert_eq!(response.usage, TokenUsage::default());
    }
}
