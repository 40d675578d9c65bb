//! Itinerary documents
//!
//! The generated itinerary is persisted in one of two shapes:
//!
//! - structured: the JSON object the model produced, kept as-is
//! - degraded: `{summary, raw_itinerary, error}` when no object could be parsed
//!
//! Consumers tell them apart by the presence of `days`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Characters of raw model output kept as the degraded summary
pub const DEGRADED_SUMMARY_CHARS: usize = 200;

/// Error marker written into degraded itineraries
pub const PARSE_FAILED: &str = "parse failed";

/// Fallback itinerary when the model output held no parseable object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DegradedItinerary {
    pub summary: String,
    pub raw_itinerary: String,
    pub error: String,
}

impl DegradedItinerary {
    /// Wrap raw model output, keeping a short prefix as the summary
    pub fn from_raw(raw: &str) -> Self {
        Self {
            summary: raw.chars().take(DEGRADED_SUMMARY_CHARS).collect(),
            raw_itinerary: raw.to_string(),
            error: PARSE_FAILED.to_string(),
        }
    }
}

/// A persisted itinerary, structured or degraded
///
/// Degraded is tried first when deserializing; it rejects unknown fields so
/// any structured object carrying extra keys lands in `Structured`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItineraryDocument {
    Degraded(DegradedItinerary),
    Structured(Map<String, Value>),
}

impl ItineraryDocument {
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }

    /// The `days` array of a structured itinerary
    pub fn days(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Structured(map) => map.get("days").and_then(Value::as_array),
            Self::Degraded(_) => None,
        }
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            Self::Structured(map) => map.get("summary").and_then(Value::as_str),
            Self::Degraded(degraded) => Some(&degraded.summary),
        }
    }

    /// Typed view of a structured itinerary
    ///
    /// Returns None for degraded documents or when the model's object does not
    /// fit the typed schema; callers fall back to the raw JSON.
    pub fn as_itinerary(&self) -> Option<Itinerary> {
        match self {
            Self::Structured(map) => serde_json::from_value(Value::Object(map.clone())).ok(),
            Self::Degraded(_) => None,
        }
    }
}

/// Typed itinerary schema requested from the synthesis stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub total_estimated_cost: Option<String>,

    #[serde(default)]
    pub days: Vec<ItineraryDay>,

    #[serde(default)]
    pub tips: Vec<String>,
}

/// One day of an itinerary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    /// 1-based day number; 0 when the model left it out
    #[serde(default)]
    pub day: u32,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub activities: Vec<Activity>,
}

/// One scheduled activity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub activity: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub cost: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}
