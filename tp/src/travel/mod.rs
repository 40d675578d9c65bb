//! Travel-data enrichment
//!
//! Best-effort price and availability context for the research and curation
//! stages. Lookups return None instead of failing; the pipeline treats a
//! missing result as "no enrichment" and carries on.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

mod amadeus;
mod error;
mod token;
mod types;

pub use amadeus::AmadeusClient;
pub use error::TravelError;
pub use token::{IssuedToken, TokenCache};
pub use types::{FareDetail, FlightOffer, HotelListing, Location, LodgingOffer, MISSING_PRICE, Price, RoomOffer, TravelerPricing};

use crate::config::TravelConfig;

/// Source of flight and lodging enrichment
#[async_trait]
pub trait TravelData: Send + Sync {
    /// Provider location code for a place name
    async fn resolve_location_code(&self, name: &str) -> Option<String>;

    /// Flight offers departing on `date`, bounded by the client's limit
    async fn flight_offers(&self, origin: &str, destination: &str, date: NaiveDate, travelers: u32)
    -> Option<Vec<FlightOffer>>;

    /// Priced offers for the first few properties in a location
    async fn lodging_offers(&self, code: &str, check_in: NaiveDate, check_out: NaiveDate) -> Option<Vec<LodgingOffer>>;
}

/// Travel data source that never has anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTravelData;

#[async_trait]
impl TravelData for NoTravelData {
    async fn resolve_location_code(&self, _name: &str) -> Option<String> {
        None
    }

    async fn flight_offers(
        &self,
        _origin: &str,
        _destination: &str,
        _date: NaiveDate,
        _travelers: u32,
    ) -> Option<Vec<FlightOffer>> {
        None
    }

    async fn lodging_offers(&self, _code: &str, _check_in: NaiveDate, _check_out: NaiveDate) -> Option<Vec<LodgingOffer>> {
        None
    }
}

/// Create the travel-data source described by config
///
/// Falls back to [`NoTravelData`] when enrichment is disabled or the
/// credentials are not available.
pub fn create_travel_client(config: &TravelConfig) -> Arc<dyn TravelData> {
    debug!(enabled = config.enabled, "create_travel_client: called");
    if !config.enabled {
        info!("Travel-data enrichment disabled");
        return Arc::new(NoTravelData);
    }

    match AmadeusClient::from_config(config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            warn!(error = %e, "Travel-data client unavailable, itineraries will be generated without price data");
            Arc::new(NoTravelData)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_travel_data_is_empty() {
        let source = NoTravelData;
        let day = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(source.resolve_location_code("Paris").await.is_none());
        assert!(source.flight_offers("NYC", "PAR", day, 1).await.is_none());
        assert!(source.lodging_offers("PAR", day, day).await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_config_yields_no_data() {
        let config = TravelConfig {
            enabled: false,
            ..TravelConfig::default()
        };
        let source = create_travel_client(&config);
        assert!(source.resolve_location_code("Paris").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_credentials_yield_no_data() {
        let config = TravelConfig {
            api_key_env: "TRIPPLANNER_TEST_NO_KEY".to_string(),
            api_secret_env: "TRIPPLANNER_TEST_NO_SECRET".to_string(),
            ..TravelConfig::default()
        };
        let source = create_travel_client(&config);
        assert!(source.resolve_location_code("Paris").await.is_none());
    }
}
