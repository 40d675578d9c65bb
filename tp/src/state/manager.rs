//! StateManager - actor that owns the trip Store
//!
//! Processes commands via channels for thread-safe access to persistent state.
//! Every successful status write is broadcast so observers see progress as
//! soon as it is durable.

use std::path::Path;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};

use crate::domain::{Filter, ItineraryDocument, Store, Trip, TripStatus};

use super::messages::{ItineraryUpdate, StateCommand, StateError, StateResponse};

/// Event broadcast after a state change is persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// A new trip was stored
    TripCreated { id: String },
    /// A trip's status was written
    TripStatusChanged { id: String, status: TripStatus },
    /// A trip's itinerary was written (structured or degraded)
    ItineraryWritten { id: String, structured: bool },
}

/// Handle to send commands to the StateManager
#[derive(Clone)]
pub struct StateManager {
    tx: mpsc::Sender<StateCommand>,
    /// Broadcast sender for state change notifications
    event_tx: broadcast::Sender<StateEvent>,
}

impl StateManager {
    /// Spawn a new StateManager actor over the store in `store_path`
    pub fn spawn(store_path: impl AsRef<Path>) -> eyre::Result<Self> {
        debug!(store_path = %store_path.as_ref().display(), "spawn: called");
        let mut store = Store::open(store_path.as_ref())?;

        // Status queries depend on the index rows
        let trip_count = store.rebuild_indexes::<Trip>()?;
        info!(trip_count, "Rebuilt indexes for Trip records");

        let (tx, rx) = mpsc::channel(256);
        let (event_tx, _) = broadcast::channel(64);

        tokio::spawn(actor_loop(store, rx));

        info!("StateManager spawned");

        Ok(Self { tx, event_tx })
    }

    /// Subscribe to state change events
    pub fn subscribe_events(&self) -> broadcast::Receiver<StateEvent> {
        self.event_tx.subscribe()
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<StateResponse<T>>) -> StateCommand) -> StateResponse<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| StateError::ChannelError)?;
        reply_rx.await.map_err(|_| StateError::ChannelError)?
    }

    // === Trip operations ===

    /// Store a new trip
    pub async fn create_trip(&self, trip: Trip) -> StateResponse<String> {
        debug!(trip_id = %trip.id, owner = %trip.owner_id, "create_trip: called");
        let id = self.request(|reply| StateCommand::CreateTrip { trip, reply }).await?;
        let _ = self.event_tx.send(StateEvent::TripCreated { id: id.clone() });
        Ok(id)
    }

    /// Get a trip by ID
    pub async fn get_trip(&self, id: &str) -> StateResponse<Option<Trip>> {
        debug!(%id, "get_trip: called");
        self.request(|reply| StateCommand::GetTrip {
            id: id.to_string(),
            reply,
        })
        .await
    }

    /// Get a trip by ID, returning error if not found
    pub async fn get_trip_required(&self, id: &str) -> StateResponse<Trip> {
        debug!(%id, "get_trip_required: called");
        self.get_trip(id)
            .await?
            .ok_or_else(|| StateError::NotFound(format!("Trip {}", id)))
    }

    /// List trips, most recently updated first
    pub async fn list_trips(
        &self,
        owner_filter: Option<String>,
        status_filter: Option<TripStatus>,
    ) -> StateResponse<Vec<Trip>> {
        debug!(?owner_filter, ?status_filter, "list_trips: called");
        self.request(|reply| StateCommand::ListTrips {
            owner_filter,
            status_filter: status_filter.map(|s| s.to_string()),
            reply,
        })
        .await
    }

    /// Write a status and itinerary change in one store update
    pub async fn transition(&self, id: &str, status: TripStatus, itinerary: ItineraryUpdate) -> StateResponse<Trip> {
        debug!(%id, ?status, ?itinerary, "transition: called");
        let written = match &itinerary {
            ItineraryUpdate::Set(doc) => Some(doc.is_structured()),
            _ => None,
        };

        let trip = self
            .request(|reply| StateCommand::TransitionTrip {
                id: id.to_string(),
                status,
                itinerary,
                reply,
            })
            .await?;

        let _ = self.event_tx.send(StateEvent::TripStatusChanged {
            id: trip.id.clone(),
            status,
        });
        if let Some(structured) = written {
            let _ = self.event_tx.send(StateEvent::ItineraryWritten {
                id: trip.id.clone(),
                structured,
            });
        }

        Ok(trip)
    }

    /// Start a run: `analyzing_intent` with any previous itinerary cleared
    pub async fn begin_run(&self, id: &str) -> StateResponse<Trip> {
        self.transition(id, TripStatus::AnalyzingIntent, ItineraryUpdate::Clear)
            .await
    }

    /// Move to the next stage's status, leaving the itinerary alone
    pub async fn advance(&self, id: &str, status: TripStatus) -> StateResponse<Trip> {
        self.transition(id, status, ItineraryUpdate::Keep).await
    }

    /// Finish a run: `completed` together with its itinerary
    pub async fn complete(&self, id: &str, itinerary: ItineraryDocument) -> StateResponse<Trip> {
        self.transition(id, TripStatus::Completed, ItineraryUpdate::Set(itinerary))
            .await
    }

    /// Shutdown the StateManager
    pub async fn shutdown(&self) -> Result<(), StateError> {
        debug!("shutdown: called");
        self.tx
            .send(StateCommand::Shutdown)
            .await
            .map_err(|_| StateError::ChannelError)
    }
}

fn store_error(e: eyre::Report) -> StateError {
    StateError::StoreError(e.to_string())
}

async fn actor_loop(mut store: Store, mut rx: mpsc::Receiver<StateCommand>) {
    debug!("StateManager actor started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            StateCommand::CreateTrip { trip, reply } => {
                debug!(trip_id = %trip.id, "actor_loop: CreateTrip command");
                let result = store.create(trip).map_err(store_error);
                let _ = reply.send(result);
            }

            StateCommand::GetTrip { id, reply } => {
                debug!(%id, "actor_loop: GetTrip command");
                let result: StateResponse<Option<Trip>> = store.get(&id).map_err(store_error);
                let _ = reply.send(result);
            }

            StateCommand::ListTrips {
                owner_filter,
                status_filter,
                reply,
            } => {
                debug!(?owner_filter, ?status_filter, "actor_loop: ListTrips command");
                let mut filters = Vec::new();
                if let Some(owner) = owner_filter {
                    filters.push(Filter::eq("owner_id", owner));
                }
                if let Some(status) = status_filter {
                    filters.push(Filter::eq("status", status));
                }

                let result: StateResponse<Vec<Trip>> = store.list(&filters).map_err(store_error);
                let _ = reply.send(result);
            }

            StateCommand::TransitionTrip {
                id,
                status,
                itinerary,
                reply,
            } => {
                debug!(%id, ?status, "actor_loop: TransitionTrip command");
                let result = transition_trip(&mut store, &id, status, itinerary);
                if let Ok(trip) = &result {
                    info!(trip_id = %trip.id, %status, "Trip status written");
                }
                let _ = reply.send(result);
            }

            StateCommand::Shutdown => {
                debug!("actor_loop: Shutdown command");
                info!("StateManager shutting down");
                break;
            }
        }
    }

    debug!("StateManager actor stopped");
}

fn transition_trip(store: &mut Store, id: &str, status: TripStatus, itinerary: ItineraryUpdate) -> StateResponse<Trip> {
    let mut trip: Trip = store
        .get(id)
        .map_err(store_error)?
        .ok_or_else(|| StateError::NotFound(format!("Trip {}", id)))?;

    match itinerary {
        ItineraryUpdate::Keep => {}
        ItineraryUpdate::Clear => trip.set_itinerary(None),
        ItineraryUpdate::Set(doc) => trip.set_itinerary(Some(doc)),
    }
    trip.set_status(status);

    store.update(trip.clone()).map_err(store_error)?;
    Ok(trip)
}
