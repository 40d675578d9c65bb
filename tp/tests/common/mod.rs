//! Shared test doubles for the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::json;
use tempfile::TempDir;

use tripplanner::auth::StaticAuthenticator;
use tripplanner::domain::{BudgetTier, TravelStyle, Trip, TripRequest, UserId};
use tripplanner::llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError};
use tripplanner::pipeline::{Pipeline, PipelineSettings};
use tripplanner::prompts::{PromptLoader, embedded};
use tripplanner::state::StateManager;
use tripplanner::travel::{FlightOffer, LodgingOffer, TravelData};

/// Completion client that answers by stage
///
/// Synthesis replies carry as many days as the prompt asks for, wrapped in
/// prose the way real models tend to answer.
#[derive(Default)]
pub struct ScriptedLlm {
    fail_on: Mutex<Option<&'static str>>,
    synthesis_reply: Mutex<Option<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call whose system prompt is `system_prompt`
    pub fn fail_on(&self, system_prompt: &'static str) {
        *self.fail_on.lock().unwrap() = Some(system_prompt);
    }

    pub fn clear_failure(&self) {
        *self.fail_on.lock().unwrap() = None;
    }

    /// Answer synthesis with fixed text instead of a generated itinerary
    pub fn synthesis_reply(&self, text: &str) {
        *self.synthesis_reply.lock().unwrap() = Some(text.to_string());
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// System prompts in call order
    pub fn system_prompts(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.system_prompt).collect()
    }

    /// User prompt of the most recent call with this system prompt
    pub fn prompt_for(&self, system_prompt: &str) -> Option<String> {
        self.requests()
            .into_iter()
            .rev()
            .find(|r| r.system_prompt == system_prompt)
            .map(|r| r.messages[0].content.clone())
    }
}

/// Day count from "exactly N days" in the synthesis prompt
fn requested_days(prompt: &str) -> usize {
    prompt
        .split("exactly ")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(1)
}

fn itinerary_reply(days: usize) -> String {
    let days: Vec<_> = (1..=days)
        .map(|day| {
            json!({
                "day": day,
                "title": format!("Day {day}"),
                "activities": [{"time": "9:00 AM", "activity": "Explore", "location": "Old town"}]
            })
        })
        .collect();
    let body = json!({
        "summary": "A scripted trip",
        "total_estimated_cost": "USD 1000",
        "days": days,
        "tips": ["Pack light"]
    });
    format!("Here is your itinerary:\n```json\n{}\n```\nEnjoy!", body)
}

#[async_trait]
impl LlmClient for ScriptedLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        if *self.fail_on.lock().unwrap() == Some(request.system_prompt.as_str()) {
            return Err(LlmError::ApiError {
                status: 503,
                message: "provider unavailable".to_string(),
            });
        }

        let prompt = &request.messages[0].content;
        let text = match request.system_prompt.as_str() {
            s if s == embedded::INTENT_SYSTEM => "INTENT: slow mornings, big views".to_string(),
            s if s == embedded::RESEARCH_LUXURY_SYSTEM => "RESEARCH: luxury picks".to_string(),
            s if s == embedded::RESEARCH_STANDARD_SYSTEM => "RESEARCH: value picks".to_string(),
            s if s == embedded::CURATION_ACTIVE_SYSTEM => "CURATION: active plan".to_string(),
            s if s == embedded::CURATION_LEISURE_SYSTEM => "CURATION: leisure plan".to_string(),
            _ => match self.synthesis_reply.lock().unwrap().clone() {
                Some(text) => text,
                None => itinerary_reply(requested_days(prompt)),
            },
        };
        Ok(CompletionResponse::text(text))
    }
}

/// Travel data double with fixed answers and a call log
#[derive(Default)]
pub struct ScriptedTravel {
    pub location: Option<String>,
    pub flights: Option<Vec<FlightOffer>>,
    pub lodging: Option<Vec<LodgingOffer>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTravel {
    /// Paris with one business fare and two priced hotels
    pub fn paris() -> Self {
        Self {
            location: Some("PAR".to_string()),
            flights: Some(vec![
                serde_json::from_value(json!({
                    "price": {"total": "2400.00", "currency": "EUR"},
                    "travelerPricings": [{"fareDetailsBySegment": [{"cabin": "BUSINESS"}]}]
                }))
                .unwrap(),
                serde_json::from_value(json!({
                    "price": {"total": "610.00", "currency": "EUR"},
                    "travelerPricings": [{"fareDetailsBySegment": [{"cabin": "ECONOMY"}]}]
                }))
                .unwrap(),
            ]),
            lodging: Some(vec![
                serde_json::from_value(json!({
                    "hotel": {"hotelId": "PAR01", "name": "Le Grand"},
                    "offers": [{"price": {"total": "780.00", "currency": "EUR"}}]
                }))
                .unwrap(),
                serde_json::from_value(json!({
                    "hotel": {"hotelId": "PAR02", "name": "Petit Marais"},
                    "offers": [{"price": {"total": "190.00", "currency": "EUR"}}]
                }))
                .unwrap(),
            ]),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A destination the provider does not know
    pub fn unknown_location() -> Self {
        Self {
            flights: Self::paris().flights,
            lodging: Self::paris().lodging,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

#[async_trait]
impl TravelData for ScriptedTravel {
    async fn resolve_location_code(&self, _name: &str) -> Option<String> {
        self.record("location");
        self.location.clone()
    }

    async fn flight_offers(&self, _origin: &str, _dest: &str, _date: NaiveDate, _travelers: u32) -> Option<Vec<FlightOffer>> {
        self.record("flights");
        self.flights.clone()
    }

    async fn lodging_offers(&self, _code: &str, _check_in: NaiveDate, _check_out: NaiveDate) -> Option<Vec<LodgingOffer>> {
        self.record("lodging");
        self.lodging.clone()
    }
}

/// Pipeline wired to scripted collaborators and a temporary store
pub struct TestEnv {
    pub pipeline: Pipeline,
    pub state: StateManager,
    pub llm: Arc<ScriptedLlm>,
    pub travel: Arc<ScriptedTravel>,
    _temp: TempDir,
}

pub const ALICE_TOKEN: &str = "tok-alice";
pub const BOB_TOKEN: &str = "tok-bob";

impl TestEnv {
    pub fn new(travel: ScriptedTravel) -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let state = StateManager::spawn(temp.path()).expect("Failed to spawn state manager");
        let llm = Arc::new(ScriptedLlm::new());
        let travel = Arc::new(travel);
        let auth = StaticAuthenticator::new(HashMap::from([
            (ALICE_TOKEN.to_string(), "alice".to_string()),
            (BOB_TOKEN.to_string(), "bob".to_string()),
        ]));

        let pipeline = Pipeline::new(
            llm.clone(),
            travel.clone(),
            state.clone(),
            Arc::new(auth),
            PromptLoader::embedded_only(),
            PipelineSettings::default(),
        );

        Self {
            pipeline,
            state,
            llm,
            travel,
            _temp: temp,
        }
    }

    /// Store a trip for alice and return its ID
    pub async fn create_trip(
        &self,
        destination: &str,
        dates: Option<(&str, &str)>,
        budget_tier: BudgetTier,
        travel_style: TravelStyle,
        group_size: u32,
    ) -> String {
        let request = TripRequest {
            destination: destination.to_string(),
            start_date: dates.map(|(s, _)| s.parse().unwrap()),
            end_date: dates.map(|(_, e)| e.parse().unwrap()),
            budget_tier,
            travel_style,
            group_size,
        };
        let trip = Trip::new(&UserId::new("alice"), request).unwrap();
        self.state.create_trip(trip).await.unwrap()
    }
}
