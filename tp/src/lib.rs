//! TripPlanner - multi-stage itinerary generation
//!
//! Turns a traveler's trip request into a day-by-day itinerary by running
//! four completion stages in sequence, choosing stage variants from the
//! trip's budget tier and travel style.
//!
//! # Core Concepts
//!
//! - **Persisted progress**: the trip's status is written before every stage
//! - **Branching**: luxury or standard research, active or leisure curation
//! - **Best-effort enrichment**: live flight and lodging prices when available
//! - **Degraded results**: unparseable itineraries are stored, not dropped
//!
//! # Modules
//!
//! - [`pipeline`] - Stage functions, branch selection, parser and orchestrator
//! - [`llm`] - Completion client trait with OpenAI-compatible and Anthropic implementations
//! - [`travel`] - Travel-data client with cached OAuth2 token
//! - [`state`] - Actor owning the trip store
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod auth;
pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod state;
pub mod travel;

// Re-export commonly used types
pub use auth::{AuthError, Authenticator, StaticAuthenticator};
pub use config::Config;
pub use domain::{
    BudgetTier, DegradedItinerary, Itinerary, ItineraryDocument, TravelStyle, Trip, TripId, TripRequest, TripStatus,
    UserId,
};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, create_client};
pub use pipeline::{BranchPlan, CurationBranch, Pipeline, PipelineError, PipelineSettings, ResearchBranch, Stage};
pub use state::{StateEvent, StateManager};
pub use travel::{TravelData, create_travel_client};
