//! Domain types for TripPlanner
//!
//! Core domain types: Trip and the itinerary document produced for it.
//! Trip implements the Record trait for TripStore persistence.

mod id;
mod itinerary;
mod trip;

pub use id::{TripId, TripIdError, UserId};
pub use itinerary::{
    Activity, DEGRADED_SUMMARY_CHARS, DegradedItinerary, Itinerary, ItineraryDay, ItineraryDocument, PARSE_FAILED,
};
pub use trip::{
    BudgetTier, MAX_GROUP_SIZE, ParseEnumError, TravelStyle, Trip, TripRequest, TripStatus, TripValidationError,
};

// Re-export tripstore types for convenience
pub use tripstore::{Filter, FilterOp, IndexValue, Record, Store};
