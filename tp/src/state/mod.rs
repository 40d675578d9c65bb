//! State management with actor pattern
//!
//! StateManager owns the trip Store and processes messages via channels,
//! providing thread-safe access to persistent state.

mod manager;
mod messages;

pub use manager::{StateEvent, StateManager};
pub use messages::{ItineraryUpdate, StateCommand, StateError, StateResponse};
