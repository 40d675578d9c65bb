//! Synthesis output parser
//!
//! Models wrap the itinerary JSON in prose or code fences. The object is
//! taken to run from the first `{` to the last `}`; anything else in the
//! reply is ignored. No schema validation happens here.

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{DegradedItinerary, ItineraryDocument};

/// Slice from the first `{` through the last `}`, if both exist in order
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Parse the synthesis reply, falling back to the degraded form
pub fn parse_itinerary(raw: &str) -> ItineraryDocument {
    debug!(raw_len = raw.len(), "parse_itinerary: called");
    let parsed = extract_json_object(raw).and_then(|candidate| serde_json::from_str::<Value>(candidate).ok());

    match parsed {
        Some(Value::Object(map)) => ItineraryDocument::Structured(map),
        _ => {
            warn!(raw_len = raw.len(), "Itinerary reply is not a JSON object, storing degraded result");
            ItineraryDocument::Degraded(DegradedItinerary::from_raw(raw))
        }
    }
}
