//! Stage functions
//!
//! Each stage renders its prompt, sends one single-turn completion request
//! with the stage's role instruction and returns the model's text.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::branch::{CurationBranch, ResearchBranch, Stage};
use super::error::PipelineError;
use super::parser::parse_itinerary;
use crate::domain::ItineraryDocument;
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message};
use crate::prompts::{PromptContext, PromptLoader, embedded};

/// Runs stage prompts against a completion client
pub struct StageRunner {
    llm: Arc<dyn LlmClient>,
    prompts: PromptLoader,
    timeout: Duration,
    max_tokens: u32,
}

impl StageRunner {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: PromptLoader, timeout: Duration, max_tokens: u32) -> Self {
        Self {
            llm,
            prompts,
            timeout,
            max_tokens,
        }
    }

    fn render(&self, template: &str, ctx: &PromptContext) -> Result<String, PipelineError> {
        self.prompts
            .render(template, ctx)
            .map_err(|e| PipelineError::Prompt(e.to_string()))
    }

    /// One bounded completion call
    async fn complete(&self, stage: Stage, system_prompt: &str, prompt: String) -> Result<String, PipelineError> {
        debug!(%stage, prompt_len = prompt.len(), "StageRunner::complete: called");
        let request = CompletionRequest {
            system_prompt: system_prompt.to_string(),
            messages: vec![Message::user(prompt)],
            max_tokens: self.max_tokens,
        };

        let result = match tokio::time::timeout(self.timeout, self.llm.complete(request)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout(self.timeout)),
        };

        let response = result.map_err(|source| PipelineError::Stage { stage, source })?;
        debug!(%stage, usage = response.usage.total(), stop_reason = ?response.stop_reason, "StageRunner::complete: response");
        response.content.ok_or_else(|| PipelineError::Stage {
            stage,
            source: LlmError::InvalidResponse("completion returned no text".to_string()),
        })
    }

    /// Intent analysis from the trip attributes alone
    pub async fn intent(&self, ctx: &PromptContext) -> Result<String, PipelineError> {
        let prompt = self.render("intent", ctx)?;
        self.complete(Stage::Intent, embedded::INTENT_SYSTEM, prompt).await
    }

    /// Destination research; expects `ctx.intent` and optional enrichment
    pub async fn research(&self, branch: ResearchBranch, ctx: &PromptContext) -> Result<String, PipelineError> {
        let prompt = self.render(branch.template_name(), ctx)?;
        self.complete(Stage::Research(branch), branch.system_prompt(), prompt)
            .await
    }

    /// Activity curation; expects `ctx.intent`, `ctx.research` and `ctx.style_guidance`
    pub async fn curation(&self, branch: CurationBranch, ctx: &PromptContext) -> Result<String, PipelineError> {
        let prompt = self.render(branch.template_name(), ctx)?;
        self.complete(Stage::Curation(branch), branch.system_prompt(), prompt)
            .await
    }

    /// Final itinerary, parsed or degraded
    pub async fn synthesis(&self, ctx: &PromptContext) -> Result<ItineraryDocument, PipelineError> {
        let prompt = self.render("synthesis", ctx)?;
        let raw = self
            .complete(Stage::Synthesis, embedded::SYNTHESIS_SYSTEM, prompt)
            .await?;
        Ok(parse_itinerary(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockLlmClient;
    use crate::llm::{CompletionResponse, Role};
    use async_trait::async_trait;

    fn ctx() -> PromptContext {
        PromptContext {
            destination: "Kyoto".to_string(),
            budget_tier: "low".to_string(),
            budget_label: "LOW".to_string(),
            travel_style: "cultural".to_string(),
            group_size: 3,
            duration_days: 4,
            intent: "Temples and tea".to_string(),
            research: "Fushimi Inari at dawn".to_string(),
            ..PromptContext::default()
        }
    }

    fn runner(llm: Arc<dyn LlmClient>) -> StageRunner {
        StageRunner::new(llm, PromptLoader::embedded_only(), Duration::from_secs(5), 2048)
    }

    struct SlowClient;

    #[async_trait]
    impl LlmClient for SlowClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(CompletionResponse::text("too late"))
        }
    }

    #[tokio::test]
    async fn test_intent_sends_single_user_turn() {
        let mock = Arc::new(MockLlmClient::with_texts(&["Intent analysis"]));
        let out = runner(mock.clone()).intent(&ctx()).await.unwrap();
        assert_eq!(out, "Intent analysis");

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system_prompt, embedded::INTENT_SYSTEM);
        assert_eq!(requests[0].max_tokens, 2048);
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[0].messages[0].role, Role::User);
        assert!(requests[0].messages[0].content.contains("Destination: Kyoto"));
    }

    #[tokio::test]
    async fn test_research_uses_branch_prompt() {
        let mock = Arc::new(MockLlmClient::with_texts(&["lux", "std"]));
        let runner = runner(mock.clone());
        runner.research(ResearchBranch::Luxury, &ctx()).await.unwrap();
        runner.research(ResearchBranch::Standard, &ctx()).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].system_prompt, embedded::RESEARCH_LUXURY_SYSTEM);
        assert!(requests[0].messages[0].content.contains("LUXURY"));
        assert_eq!(requests[1].system_prompt, embedded::RESEARCH_STANDARD_SYSTEM);
        assert!(requests[1].messages[0].content.contains("Temples and tea"));
    }

    #[tokio::test]
    async fn test_curation_includes_prior_outputs() {
        let mock = Arc::new(MockLlmClient::with_texts(&["curated"]));
        let mut ctx = ctx();
        ctx.style_guidance = "CULTURAL FOCUS: Museums".to_string();
        runner(mock.clone()).curation(CurationBranch::Active, &ctx).await.unwrap();

        let prompt = &mock.requests()[0].messages[0].content;
        assert!(prompt.contains("CULTURAL FOCUS: Museums"));
        assert!(prompt.contains("Temples and tea"));
        assert!(prompt.contains("Fushimi Inari at dawn"));
    }

    #[tokio::test]
    async fn test_synthesis_parses_output() {
        let mock = Arc::new(MockLlmClient::with_texts(&["Here you go: {\"summary\":\"x\",\"days\":[]} enjoy"]));
        let doc = runner(mock.clone()).synthesis(&ctx()).await.unwrap();
        assert!(doc.is_structured());
        assert_eq!(doc.summary(), Some("x"));
        assert!(mock.requests()[0].messages[0].content.contains("exactly 4 days"));
    }

    #[tokio::test]
    async fn test_provider_error_names_stage() {
        let mock = Arc::new(MockLlmClient::with_texts(&[]).failing_at(0));
        let err = runner(mock).research(ResearchBranch::Standard, &ctx()).await.unwrap_err();
        match err {
            PipelineError::Stage { stage, source } => {
                assert_eq!(stage, Stage::Research(ResearchBranch::Standard));
                assert!(matches!(source, LlmError::ApiError { status: 500, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_content_is_invalid_response() {
        let mut response = CompletionResponse::text("");
        response.content = None;
        let mock = Arc::new(MockLlmClient::new(vec![response]));
        let err = runner(mock).intent(&ctx()).await.unwrap_err();
        assert!(matches!(
            err.llm_error(),
            Some(LlmError::InvalidResponse(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_maps_to_llm_timeout() {
        let err = runner(Arc::new(SlowClient)).intent(&ctx()).await.unwrap_err();
        assert!(matches!(err.llm_error(), Some(LlmError::Timeout(d)) if *d == Duration::from_secs(5)));
    }
}
