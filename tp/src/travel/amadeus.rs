//! Amadeus self-service API client
//!
//! OAuth2 client-credentials auth with a cached token, then plain REST
//! lookups. Every public lookup absorbs its errors: a failure is logged at
//! warn and reported as "no data".

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::error::TravelError;
use super::token::{IssuedToken, TokenCache};
use super::types::{DataEnvelope, FlightOffer, HotelListing, Location, LodgingOffer, TokenResponse};
use super::TravelData;
use crate::config::TravelConfig;

const LOCATIONS_PATH: &str = "/v1/reference-data/locations";
const FLIGHT_OFFERS_PATH: &str = "/v2/shopping/flight-offers";
const HOTELS_BY_CITY_PATH: &str = "/v1/reference-data/locations/hotels/by-city";
const HOTEL_OFFERS_PATH: &str = "/v3/shopping/hotel-offers";

/// Amadeus travel-data client
pub struct AmadeusClient {
    http: Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
    max_flight_offers: u32,
    max_lodging_lookups: usize,
    tokens: TokenCache,
}

impl AmadeusClient {
    /// Create a client with credentials read from the configured env vars
    pub fn from_config(config: &TravelConfig) -> Result<Self, TravelError> {
        debug!(base_url = %config.base_url, "AmadeusClient::from_config: called");
        let (client_id, client_secret) = config.credentials().ok_or_else(|| {
            TravelError::Credentials(format!("set {} and {}", config.api_key_env, config.api_secret_env))
        })?;
        Self::new(config, client_id, client_secret)
    }

    /// Create a client with explicit credentials
    pub fn new(
        config: &TravelConfig,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, TravelError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_url: config.token_url.clone(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            max_flight_offers: config.max_flight_offers,
            max_lodging_lookups: config.max_lodging_lookups,
            tokens: TokenCache::new(Duration::from_secs(config.token_margin_secs)),
        })
    }

    /// Current bearer token, exchanging credentials when the cache is stale
    pub async fn token(&self) -> Result<String, TravelError> {
        self.tokens.get_or_refresh(|| self.exchange_token()).await
    }

    async fn exchange_token(&self) -> Result<IssuedToken, TravelError> {
        debug!(token_url = %self.token_url, "AmadeusClient::exchange_token: called");
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TravelError::Auth { status, message });
        }

        let body: TokenResponse = serde_json::from_str(&response.text().await?)?;
        let value = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TravelError::Auth {
                status,
                message: "response carried no access_token".to_string(),
            })?;

        debug!(expires_in = ?body.expires_in, "AmadeusClient::exchange_token: issued");
        Ok(IssuedToken {
            value,
            expires_in_secs: body.expires_in.unwrap_or(0),
        })
    }

    /// Authenticated GET returning the `data` array of the response
    async fn get_data<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>, TravelError> {
        let token = self.token().await?;
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "AmadeusClient::get_data: called");

        let response = self.http.get(&url).bearer_auth(&token).query(query).send().await?;

        let status = response.status().as_u16();
        if status == 401 {
            // Provider revoked the token early
            self.tokens.clear().await;
        }
        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TravelError::Api { status, message });
        }

        let envelope: DataEnvelope<T> = serde_json::from_str(&response.text().await?)?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn try_resolve_location(&self, name: &str) -> Result<Option<String>, TravelError> {
        let locations: Vec<Location> = self
            .get_data(
                LOCATIONS_PATH,
                &[("keyword", name.to_string()), ("subType", "CITY".to_string())],
            )
            .await?;

        Ok(locations.into_iter().next().and_then(|l| l.iata_code).filter(|c| !c.is_empty()))
    }

    async fn try_flight_offers(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        travelers: u32,
    ) -> Result<Vec<FlightOffer>, TravelError> {
        let mut offers: Vec<FlightOffer> = self
            .get_data(
                FLIGHT_OFFERS_PATH,
                &[
                    ("originLocationCode", origin.to_string()),
                    ("destinationLocationCode", destination.to_string()),
                    ("departureDate", date.to_string()),
                    ("adults", travelers.to_string()),
                    ("max", self.max_flight_offers.to_string()),
                ],
            )
            .await?;

        offers.truncate(self.max_flight_offers as usize);
        Ok(offers)
    }

    async fn try_lodging_offers(
        &self,
        code: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> Result<Option<Vec<LodgingOffer>>, TravelError> {
        let listings: Vec<HotelListing> = self
            .get_data(HOTELS_BY_CITY_PATH, &[("cityCode", code.to_string())])
            .await?;

        let hotel_ids: Vec<String> = listings
            .into_iter()
            .filter_map(|h| h.hotel_id)
            .take(self.max_lodging_lookups)
            .collect();

        if hotel_ids.is_empty() {
            debug!(%code, "AmadeusClient::try_lodging_offers: no properties listed");
            return Ok(None);
        }

        let offers: Vec<LodgingOffer> = self
            .get_data(
                HOTEL_OFFERS_PATH,
                &[
                    ("hotelIds", hotel_ids.join(",")),
                    ("checkInDate", check_in.to_string()),
                    ("checkOutDate", check_out.to_string()),
                ],
            )
            .await?;

        Ok(Some(offers))
    }
}

#[async_trait]
impl TravelData for AmadeusClient {
    async fn resolve_location_code(&self, name: &str) -> Option<String> {
        debug!(%name, "AmadeusClient::resolve_location_code: called");
        match self.try_resolve_location(name).await {
            Ok(code) => code,
            Err(e) => {
                warn!(%name, error = %e, "Location lookup failed, continuing without travel data");
                None
            }
        }
    }

    async fn flight_offers(
        &self,
        origin: &str,
        destination: &str,
        date: NaiveDate,
        travelers: u32,
    ) -> Option<Vec<FlightOffer>> {
        debug!(%origin, %destination, %date, %travelers, "AmadeusClient::flight_offers: called");
        match self.try_flight_offers(origin, destination, date, travelers).await {
            Ok(offers) => Some(offers),
            Err(e) => {
                warn!(%origin, %destination, error = %e, "Flight lookup failed, continuing without flight data");
                None
            }
        }
    }

    async fn lodging_offers(&self, code: &str, check_in: NaiveDate, check_out: NaiveDate) -> Option<Vec<LodgingOffer>> {
        debug!(%code, %check_in, %check_out, "AmadeusClient::lodging_offers: called");
        match self.try_lodging_offers(code, check_in, check_out).await {
            Ok(offers) => offers,
            Err(e) => {
                warn!(%code, error = %e, "Lodging lookup failed, continuing without lodging data");
                None
            }
        }
    }
}
