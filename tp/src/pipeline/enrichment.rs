//! Travel-data context for the research and curation prompts
//!
//! An [`Enricher`] lives for one pipeline run. The location code and the
//! lodging offers are looked up at most once per run and shared between the
//! research and curation stages. Any lookup that comes back empty just drops
//! its section from the prompt.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use super::branch::{CurationBranch, ResearchBranch};
use crate::domain::Trip;
use crate::travel::{FlightOffer, LodgingOffer, MISSING_PRICE, TravelData};

/// Offers shown per research section
const RESEARCH_SHOWN: usize = 3;

/// Properties listed in the curation prompt
const CURATION_SHOWN: usize = 5;

/// Per-run travel-data lookups
pub struct Enricher {
    travel: Arc<dyn TravelData>,
    destination: String,
    dates: Option<(NaiveDate, NaiveDate)>,
    travelers: u32,
    origin: String,
    location: OnceCell<Option<String>>,
    lodging: OnceCell<Option<Vec<LodgingOffer>>>,
}

impl Enricher {
    pub fn new(travel: Arc<dyn TravelData>, trip: &Trip, origin: impl Into<String>) -> Self {
        Self {
            travel,
            destination: trip.destination.clone(),
            dates: trip.dates(),
            travelers: trip.group_size,
            origin: origin.into(),
            location: OnceCell::new(),
            lodging: OnceCell::new(),
        }
    }

    async fn location_code(&self) -> Option<&str> {
        self.location
            .get_or_init(|| async {
                let code = self.travel.resolve_location_code(&self.destination).await;
                if code.is_none() {
                    warn!(destination = %self.destination, "No location code, skipping flight and lodging data");
                }
                code
            })
            .await
            .as_deref()
    }

    async fn lodging(&self, code: &str, check_in: NaiveDate, check_out: NaiveDate) -> Option<&[LodgingOffer]> {
        self.lodging
            .get_or_init(|| async {
                let offers = self.travel.lodging_offers(code, check_in, check_out).await;
                offers.filter(|o| !o.is_empty())
            })
            .await
            .as_deref()
    }

    /// Flight and lodging context for the research stage, empty when none
    pub async fn research_context(&self, branch: ResearchBranch) -> String {
        debug!(%branch, destination = %self.destination, "research_context: called");
        // Undated trips have nothing to price
        let Some((start, end)) = self.dates else {
            return String::new();
        };
        let Some(code) = self.location_code().await else {
            return String::new();
        };

        let flights = self
            .travel
            .flight_offers(&self.origin, code, start, self.travelers)
            .await
            .filter(|f| !f.is_empty());
        let lodging = self.lodging(code, start, end).await;

        let mut sections = Vec::new();
        if let Some(flights) = flights {
            sections.push(flight_section(branch, &self.origin, &flights));
        }
        if let Some(lodging) = lodging
            && let Some(section) = lodging_section(branch, lodging)
        {
            sections.push(section);
        }
        sections.join("\n\n")
    }

    /// Recommended properties for the curation stage, empty when none
    pub async fn curation_context(&self, branch: CurationBranch) -> String {
        debug!(%branch, destination = %self.destination, "curation_context: called");
        let Some((start, end)) = self.dates else {
            return String::new();
        };
        let Some(code) = self.location_code().await else {
            return String::new();
        };
        match self.lodging(code, start, end).await {
            Some(lodging) => curation_section(branch, lodging),
            None => String::new(),
        }
    }
}

fn by_price_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    b.unwrap_or(0.0).total_cmp(&a.unwrap_or(0.0))
}

fn by_price_asc(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(MISSING_PRICE).total_cmp(&b.unwrap_or(MISSING_PRICE))
}

/// Flight offers to show for a research branch
///
/// Luxury keeps business and first class fares when there are any and lists
/// the most expensive first; standard lists the cheapest first.
pub fn pick_flights(branch: ResearchBranch, offers: &[FlightOffer]) -> Vec<&FlightOffer> {
    let mut picked: Vec<&FlightOffer> = match branch {
        ResearchBranch::Luxury => {
            let premium: Vec<&FlightOffer> = offers.iter().filter(|f| f.is_premium_cabin()).collect();
            if premium.is_empty() { offers.iter().collect() } else { premium }
        }
        ResearchBranch::Standard => offers.iter().collect(),
    };
    match branch {
        ResearchBranch::Luxury => picked.sort_by(|a, b| by_price_desc(a.amount(), b.amount())),
        ResearchBranch::Standard => picked.sort_by(|a, b| by_price_asc(a.amount(), b.amount())),
    }
    picked.truncate(RESEARCH_SHOWN);
    picked
}

/// Lodging offers to show for a research branch, dropping unpriced ones
pub fn pick_lodging(branch: ResearchBranch, offers: &[LodgingOffer]) -> Vec<&LodgingOffer> {
    let mut sorted: Vec<&LodgingOffer> = offers.iter().collect();
    match branch {
        ResearchBranch::Luxury => sorted.sort_by(|a, b| by_price_desc(a.amount(), b.amount())),
        ResearchBranch::Standard => sorted.sort_by(|a, b| by_price_asc(a.amount(), b.amount())),
    }
    sorted
        .into_iter()
        .take(RESEARCH_SHOWN)
        .filter(|o| o.first_price().and_then(|p| p.total.as_ref()).is_some())
        .collect()
}

fn flight_section(branch: ResearchBranch, origin: &str, offers: &[FlightOffer]) -> String {
    let prices: Vec<String> = pick_flights(branch, offers).iter().map(|f| f.price_label()).collect();
    match branch {
        ResearchBranch::Luxury => format!(
            "PREMIUM FLIGHT OPTIONS:\n- Business/First class from {}: {}\n- {} flight options available",
            origin,
            prices.join(", "),
            offers.len()
        ),
        ResearchBranch::Standard => format!(
            "BEST VALUE FLIGHTS:\n- Economy prices from {}: {}\n- {} options available",
            origin,
            prices.join(", "),
            offers.len()
        ),
    }
}

fn lodging_section(branch: ResearchBranch, offers: &[LodgingOffer]) -> Option<String> {
    let prices: Vec<String> = pick_lodging(branch, offers)
        .iter()
        .filter_map(|o| o.first_price().map(|p| p.label()))
        .collect();
    if prices.is_empty() {
        return None;
    }
    let section = match branch {
        ResearchBranch::Luxury => format!(
            "LUXURY HOTEL OPTIONS:\n- Premium properties: {}/night\n- 5-star and boutique hotels prioritized",
            prices.join(", ")
        ),
        ResearchBranch::Standard => format!(
            "BEST VALUE HOTELS:\n- Budget-friendly rates: {}/night\n- {} properties with good reviews",
            prices.join(", "),
            offers.len()
        ),
    };
    Some(section)
}

fn curation_section(branch: CurationBranch, offers: &[LodgingOffer]) -> String {
    let lines: Vec<String> = offers
        .iter()
        .take(CURATION_SHOWN)
        .enumerate()
        .filter_map(|(idx, offer)| {
            let price = offer.first_price()?;
            Some(format!(
                "{}. {} - {}/night ({})",
                idx + 1,
                offer.name(),
                price.label(),
                branch.lodging_note()
            ))
        })
        .collect();
    if lines.is_empty() {
        return String::new();
    }
    format!("{}:\n{}", branch.lodging_heading(), lines.join("\n"))
}
