//! Anthropic Messages API client

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::client::Endpoint;
use super::error::check_status;
use super::{CompletionRequest, CompletionResponse, LlmClient, LlmError, StopReason, TokenUsage};
use crate::config::LlmConfig;

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicClient {
    endpoint: Endpoint,
}

impl AnthropicClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            endpoint: Endpoint::from_config(config)?,
        })
    }

    /// Messages API body; the system prompt travels outside the message list
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let messages: Vec<_> = request
            .messages
            .iter()
            .map(|m| json!({ "role": m.role, "content": m.content }))
            .collect();

        json!({
            "model": self.endpoint.model,
            "max_tokens": self.endpoint.cap(request.max_tokens),
            "system": request.system_prompt,
            "messages": messages,
        })
    }

    /// Join every text block; thinking and tool blocks are dropped
    fn parse_response(&self, reply: MessagesReply) -> CompletionResponse {
        let text: String = reply
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect();

        CompletionResponse {
            content: (!text.is_empty()).then_some(text),
            stop_reason: reply
                .stop_reason
                .as_deref()
                .map(StopReason::from_anthropic)
                .unwrap_or(StopReason::EndTurn),
            usage: TokenUsage {
                input_tokens: reply.usage.input_tokens,
                output_tokens: reply.usage.output_tokens,
            },
        }
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(model = %self.endpoint.model, max_tokens = request.max_tokens, "AnthropicClient::complete: called");
        let response = self
            .endpoint
            .http
            .post(self.endpoint.url("/v1/messages"))
            .header("x-api-key", &self.endpoint.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.build_request_body(&request))
            .send()
            .await?;

        let reply: MessagesReply = check_status(response).await?.json().await?;
        debug!(stop_reason = ?reply.stop_reason, "AnthropicClient::complete: reply received");
        Ok(self.parse_response(reply))
    }
}

#[derive(Debug, Deserialize)]
struct MessagesReply {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    usage: MessagesUsage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Message;

    fn client(max_tokens: u32) -> AnthropicClient {
        AnthropicClient {
            endpoint: Endpoint::fixture("claude-sonnet-4", max_tokens),
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let request = CompletionRequest {
            system_prompt: "You are helpful".to_string(),
            messages: vec![Message::user("Hello")],
            max_tokens: 1000,
        };

        let body = client(8192).build_request_body(&request);

        assert_eq!(body["model"], "claude-sonnet-4");
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["system"], "You are helpful");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Hello");
    }

    #[test]
    fn test_max_tokens_capped() {
        let request = CompletionRequest {
            system_prompt: "Test".to_string(),
            messages: vec![],
            max_tokens: 5000,
        };

        let body = client(1000).build_request_body(&request);
        assert_eq!(body["max_tokens"], 1000);
    }

    #[test]
    fn test_parse_response_joins_text_blocks() {
        let api_response: MessagesReply = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "{\"summary\":"},
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "\"x\"}"}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 4}
        }))
        .unwrap();

        let response = client(1000).parse_response(api_response);
        assert_eq!(response.content.as_deref(), Some("{\"summary\":\"x\"}"));
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert_eq!(response.usage.output_tokens, 4);
    }

    #[test]
    fn test_parse_response_without_text() {
        let api_response: MessagesReply = serde_json::from_value(serde_json::json!({
            "content": [],
            "stop_reason": "max_tokens",
            "usage": {"input_tokens": 10, "output_tokens": 0}
        }))
        .unwrap();

        let response = client(1000).parse_response(api_response);
        assert!(response.content.is_none());
        assert_eq!(response.stop_reason, StopReason::MaxTokens);
    }
}
