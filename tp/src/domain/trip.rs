//! Trip domain type
//!
//! A trip is created by its owner in `Draft` status and then advanced through
//! the generation stages by the pipeline.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use tripstore::{IndexValue, Record, now_ms};

use super::id::{TripId, UserId};
use super::itinerary::ItineraryDocument;

/// Largest group a trip can be planned for
pub const MAX_GROUP_SIZE: u32 = 50;

/// Shortest accepted destination name
const MIN_DESTINATION_CHARS: usize = 2;

/// Unrecognized enum value from user input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} '{value}', expected one of: {expected}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// Trip generation status
///
/// Ordered: each pipeline run walks these front to back. There is no failed
/// state; a failed run leaves the trip at whichever stage it reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    /// Submitted, never generated
    #[default]
    Draft,
    AnalyzingIntent,
    ResearchingDestination,
    CuratingActivities,
    GeneratingItinerary,
    /// Itinerary written
    Completed,
}

impl TripStatus {
    /// All statuses in pipeline order
    pub const ALL: [TripStatus; 6] = [
        TripStatus::Draft,
        TripStatus::AnalyzingIntent,
        TripStatus::ResearchingDestination,
        TripStatus::CuratingActivities,
        TripStatus::GeneratingItinerary,
        TripStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::AnalyzingIntent => "analyzing_intent",
            Self::ResearchingDestination => "researching_destination",
            Self::CuratingActivities => "curating_activities",
            Self::GeneratingItinerary => "generating_itinerary",
            Self::Completed => "completed",
        }
    }

    /// True while a pipeline stage owns the trip
    pub fn is_processing(&self) -> bool {
        !matches!(self, Self::Draft | Self::Completed)
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseEnumError {
                kind: "status",
                value: s.to_string(),
                expected: "draft, analyzing_intent, researching_destination, curating_activities, generating_itinerary, completed",
            })
    }
}

/// Budget tier chosen by the traveler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Low,
    Medium,
    High,
}

impl BudgetTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BudgetTier {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(ParseEnumError {
                kind: "budget tier",
                value: s.to_string(),
                expected: "low, medium, high",
            }),
        }
    }
}

/// Travel style chosen by the traveler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelStyle {
    Adventure,
    Relaxation,
    Cultural,
    Nightlife,
}

impl TravelStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Adventure => "adventure",
            Self::Relaxation => "relaxation",
            Self::Cultural => "cultural",
            Self::Nightlife => "nightlife",
        }
    }
}

impl fmt::Display for TravelStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TravelStyle {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "adventure" => Ok(Self::Adventure),
            "relaxation" => Ok(Self::Relaxation),
            "cultural" => Ok(Self::Cultural),
            "nightlife" => Ok(Self::Nightlife),
            _ => Err(ParseEnumError {
                kind: "travel style",
                value: s.to_string(),
                expected: "adventure, relaxation, cultural, nightlife",
            }),
        }
    }
}

/// Rejected trip request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TripValidationError {
    #[error("Destination must be at least {min} characters", min = MIN_DESTINATION_CHARS)]
    DestinationTooShort,

    #[error("Start and end date must both be given or both omitted")]
    PartialDates,

    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("Group size must be between 1 and {max}, got {0}", max = MAX_GROUP_SIZE)]
    GroupSize(u32),
}

/// Traveler preferences submitted when creating a trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget_tier: BudgetTier,
    pub travel_style: TravelStyle,
    pub group_size: u32,
}

impl TripRequest {
    /// Check the request against the accepted attribute ranges
    pub fn validate(&self) -> Result<(), TripValidationError> {
        debug!(destination = %self.destination, group_size = self.group_size, "TripRequest::validate: called");
        if self.destination.trim().chars().count() < MIN_DESTINATION_CHARS {
            return Err(TripValidationError::DestinationTooShort);
        }

        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if end < start => {
                return Err(TripValidationError::EndBeforeStart { start, end });
            }
            (Some(_), None) | (None, Some(_)) => return Err(TripValidationError::PartialDates),
            _ => {}
        }

        if self.group_size == 0 || self.group_size > MAX_GROUP_SIZE {
            return Err(TripValidationError::GroupSize(self.group_size));
        }

        Ok(())
    }
}

/// A planned trip and its generation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    /// Canonical lowercase UUID
    pub id: String,

    /// User who created the trip
    pub owner_id: String,

    pub destination: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub budget_tier: BudgetTier,
    pub travel_style: TravelStyle,
    pub group_size: u32,

    /// Current generation status
    #[serde(default)]
    pub status: TripStatus,

    /// Generated itinerary (None until a run completes)
    #[serde(default)]
    pub itinerary: Option<ItineraryDocument>,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,

    /// Last update timestamp (Unix milliseconds)
    pub updated_at: i64,
}

impl Trip {
    /// Create a draft trip from a validated request
    pub fn new(owner: &UserId, request: TripRequest) -> Result<Self, TripValidationError> {
        Self::with_id(TripId::generate(), owner, request)
    }

    /// Create a draft trip with a specific ID (for testing or import)
    pub fn with_id(id: TripId, owner: &UserId, request: TripRequest) -> Result<Self, TripValidationError> {
        debug!(%id, %owner, "Trip::with_id: called");
        request.validate()?;
        let now = now_ms();

        Ok(Self {
            id: id.to_string(),
            owner_id: owner.to_string(),
            destination: request.destination.trim().to_string(),
            start_date: request.start_date,
            end_date: request.end_date,
            budget_tier: request.budget_tier,
            travel_style: request.travel_style,
            group_size: request.group_size,
            status: TripStatus::Draft,
            itinerary: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Start and end date when both are set
    pub fn dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }

    /// Inclusive day count between start and end, or the given default
    pub fn duration_days(&self, default_days: u32) -> u32 {
        match self.dates() {
            Some((start, end)) => {
                let days = (end - start).num_days() + 1;
                u32::try_from(days).ok().filter(|d| *d > 0).unwrap_or(default_days)
            }
            None => default_days,
        }
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        self.owner_id == user.as_str()
    }

    /// Update the status
    pub fn set_status(&mut self, status: TripStatus) {
        debug!(%self.id, ?status, "Trip::set_status: called");
        self.status = status;
        self.updated_at = now_ms();
    }

    /// Replace or clear the itinerary
    pub fn set_itinerary(&mut self, itinerary: Option<ItineraryDocument>) {
        debug!(%self.id, has_itinerary = itinerary.is_some(), "Trip::set_itinerary: called");
        self.itinerary = itinerary;
        self.updated_at = now_ms();
    }
}

impl Record for Trip {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
    }

    fn collection_name() -> &'static str {
        "trips"
    }

    fn indexed_fields(&self) -> HashMap<String, IndexValue> {
        let mut fields = HashMap::new();
        fields.insert("owner_id".to_string(), IndexValue::String(self.owner_id.clone()));
        fields.insert("status".to_string(), IndexValue::String(self.status.to_string()));
        fields
    }
}
