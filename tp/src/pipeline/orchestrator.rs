//! Pipeline orchestrator
//!
//! Drives one generation run for a trip: intent, research, curation and
//! synthesis in sequence, persisting the trip's status before every stage.
//! A failed stage ends the run with the trip left at that stage's status;
//! calling `run` again starts over from intent.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use super::branch::{BranchPlan, Stage, style_guidance};
use super::enrichment::Enricher;
use super::error::PipelineError;
use super::stages::StageRunner;
use crate::auth::Authenticator;
use crate::config::Config;
use crate::domain::{Trip, TripId, UserId};
use crate::llm::LlmClient;
use crate::prompts::{PromptContext, PromptLoader};
use crate::state::StateManager;
use crate::travel::TravelData;

/// Tunables for a pipeline run
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Itinerary length for trips without dates
    pub default_duration_days: u32,
    /// Upper bound on each completion call
    pub stage_timeout: Duration,
    /// Departure location code for flight lookups
    pub origin_code: String,
    pub max_tokens: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            default_duration_days: 5,
            stage_timeout: Duration::from_secs(180),
            origin_code: "NYC".to_string(),
            max_tokens: 4096,
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            default_duration_days: config.pipeline.default_duration_days,
            stage_timeout: Duration::from_millis(config.pipeline.stage_timeout_ms),
            origin_code: config.travel.origin_code.clone(),
            max_tokens: config.llm.max_tokens,
        }
    }
}

/// Itinerary generation pipeline
pub struct Pipeline {
    stages: StageRunner,
    travel: Arc<dyn TravelData>,
    state: StateManager,
    auth: Arc<dyn Authenticator>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        travel: Arc<dyn TravelData>,
        state: StateManager,
        auth: Arc<dyn Authenticator>,
        prompts: PromptLoader,
        settings: PipelineSettings,
    ) -> Self {
        let stages = StageRunner::new(llm, prompts, settings.stage_timeout, settings.max_tokens);
        Self {
            stages,
            travel,
            state,
            auth,
            settings,
        }
    }

    /// Generate an itinerary for a caller-supplied trip ID and credential
    ///
    /// The ID format and the credential are checked before anything is read.
    pub async fn generate(&self, trip_id: &str, credential: &str) -> Result<Trip, PipelineError> {
        debug!(%trip_id, "generate: called");
        let id = TripId::parse(trip_id)?;
        let user = self.auth.authenticate(credential).await?;
        self.run(&id, &user).await
    }

    /// Run every stage once for a trip owned by `user`
    pub async fn run(&self, id: &TripId, user: &UserId) -> Result<Trip, PipelineError> {
        let id = id.to_string();
        debug!(%id, %user, "run: called");

        let trip = self
            .state
            .get_trip(&id)
            .await?
            .ok_or_else(|| PipelineError::NotFound(id.clone()))?;
        if !trip.is_owned_by(user) {
            info!(%id, %user, "Rejected generation request from non-owner");
            return Err(PipelineError::Unauthorized);
        }

        let result = self.run_stages(&trip).await;
        if let Err(e) = &result {
            error!(%id, error = %e, "Itinerary generation failed");
        }
        result
    }

    async fn run_stages(&self, trip: &Trip) -> Result<Trip, PipelineError> {
        let id = trip.id.as_str();
        let plan = BranchPlan::select(trip.budget_tier, trip.travel_style);
        let duration_days = trip.duration_days(self.settings.default_duration_days);
        info!(%id, research = %plan.research, curation = %plan.curation, duration_days, "Starting itinerary generation");

        let enricher = Enricher::new(self.travel.clone(), trip, self.settings.origin_code.as_str());
        let mut ctx = PromptContext::for_trip(trip, duration_days);

        self.state.begin_run(id).await?;
        info!(%id, stage = %Stage::Intent, "Stage started");
        ctx.intent = self.stages.intent(&ctx).await?;

        self.enter(id, Stage::Research(plan.research)).await?;
        ctx.enrichment = enricher.research_context(plan.research).await;
        ctx.research = self.stages.research(plan.research, &ctx).await?;

        self.enter(id, Stage::Curation(plan.curation)).await?;
        ctx.enrichment = enricher.curation_context(plan.curation).await;
        ctx.style_guidance = style_guidance(trip.travel_style).to_string();
        ctx.curation = self.stages.curation(plan.curation, &ctx).await?;

        self.enter(id, Stage::Synthesis).await?;
        ctx.enrichment.clear();
        let itinerary = self.stages.synthesis(&ctx).await?;

        let structured = itinerary.is_structured();
        let trip = self.state.complete(id, itinerary).await?;
        info!(%id, structured, "Itinerary generation completed");
        Ok(trip)
    }

    async fn enter(&self, id: &str, stage: Stage) -> Result<(), PipelineError> {
        self.state.advance(id, stage.status()).await?;
        info!(%id, %stage, "Stage started");
        Ok(())
    }
}
