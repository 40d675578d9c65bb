//! State manager messages
//!
//! Commands and responses for the actor pattern.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::{ItineraryDocument, Trip, TripStatus};

/// Errors from state operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Channel error")]
    ChannelError,
}

/// Response from state operations
pub type StateResponse<T> = Result<T, StateError>;

/// What a status transition does to the stored itinerary
#[derive(Debug, Clone, PartialEq)]
pub enum ItineraryUpdate {
    /// Leave it as it is
    Keep,
    /// Remove it (a fresh run is starting)
    Clear,
    /// Replace it with the run's result
    Set(ItineraryDocument),
}

/// Commands sent to the StateManager actor
#[derive(Debug)]
pub enum StateCommand {
    CreateTrip {
        trip: Trip,
        reply: oneshot::Sender<StateResponse<String>>,
    },
    GetTrip {
        id: String,
        reply: oneshot::Sender<StateResponse<Option<Trip>>>,
    },
    ListTrips {
        owner_filter: Option<String>,
        status_filter: Option<String>,
        reply: oneshot::Sender<StateResponse<Vec<Trip>>>,
    },

    /// Set status and apply the itinerary update in a single store write
    TransitionTrip {
        id: String,
        status: TripStatus,
        itinerary: ItineraryUpdate,
        reply: oneshot::Sender<StateResponse<Trip>>,
    },

    // Shutdown
    Shutdown,
}
