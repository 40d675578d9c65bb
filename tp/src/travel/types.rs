//! Travel-data provider response types
//!
//! Every field is optional: the provider omits fields freely and a missing
//! value must never fail a lookup.

use serde::Deserialize;

/// Price used for ordering when an offer carries none
pub const MISSING_PRICE: f64 = 9999.0;

/// `{ "data": [...] }` envelope used by every lookup endpoint
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: Option<Vec<T>>,
}

/// OAuth2 client-credentials token response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
}

/// A resolved place
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub iata_code: Option<String>,
    pub name: Option<String>,
}

/// Total price and currency
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Price {
    pub total: Option<String>,
    pub currency: Option<String>,
}

impl Price {
    /// Numeric total, if present and parseable
    pub fn amount(&self) -> Option<f64> {
        self.total.as_deref().and_then(|t| t.trim().parse().ok())
    }

    /// `"<total> <currency>"`, with empty parts left blank
    pub fn label(&self) -> String {
        format!(
            "{} {}",
            self.total.as_deref().unwrap_or(""),
            self.currency.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// A priced flight offer
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOffer {
    pub id: Option<String>,
    pub price: Option<Price>,
    pub traveler_pricings: Option<Vec<TravelerPricing>>,
}

impl FlightOffer {
    /// Cabin of the first segment for the first traveler
    pub fn cabin(&self) -> Option<&str> {
        self.traveler_pricings
            .as_ref()?
            .first()?
            .fare_details_by_segment
            .as_ref()?
            .first()?
            .cabin
            .as_deref()
    }

    /// True for business or first class fares
    pub fn is_premium_cabin(&self) -> bool {
        matches!(self.cabin(), Some("BUSINESS") | Some("FIRST"))
    }

    pub fn amount(&self) -> Option<f64> {
        self.price.as_ref().and_then(Price::amount)
    }

    pub fn price_label(&self) -> String {
        self.price.as_ref().map(Price::label).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelerPricing {
    pub fare_details_by_segment: Option<Vec<FareDetail>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FareDetail {
    pub cabin: Option<String>,
}

/// A property returned by the by-city listing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelListing {
    pub hotel_id: Option<String>,
    pub name: Option<String>,
}

/// A property with its priced room offers
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LodgingOffer {
    pub hotel: Option<HotelListing>,
    pub offers: Option<Vec<RoomOffer>>,
}

impl LodgingOffer {
    /// Property name, or "Hotel" when the provider gave none
    pub fn name(&self) -> &str {
        self.hotel.as_ref().and_then(|h| h.name.as_deref()).unwrap_or("Hotel")
    }

    /// Price of the first room offer
    pub fn first_price(&self) -> Option<&Price> {
        self.offers.as_ref()?.first()?.price.as_ref()
    }

    pub fn amount(&self) -> Option<f64> {
        self.first_price().and_then(Price::amount)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RoomOffer {
    pub price: Option<Price>,
}
