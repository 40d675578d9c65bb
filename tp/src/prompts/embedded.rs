//! Embedded prompts
//!
//! Per-stage templates are compiled into the binary from .pmt files; role
//! instructions are fixed strings.

use tracing::debug;

pub const INTENT: &str = include_str!("../../prompts/intent.pmt");
pub const RESEARCH_LUXURY: &str = include_str!("../../prompts/research-luxury.pmt");
pub const RESEARCH_STANDARD: &str = include_str!("../../prompts/research-standard.pmt");
pub const CURATION_ACTIVE: &str = include_str!("../../prompts/curation-active.pmt");
pub const CURATION_LEISURE: &str = include_str!("../../prompts/curation-leisure.pmt");
pub const SYNTHESIS: &str = include_str!("../../prompts/synthesis.pmt");

/// Template names, one per stage variant
pub const TEMPLATE_NAMES: [&str; 6] = [
    "intent",
    "research-luxury",
    "research-standard",
    "curation-active",
    "curation-leisure",
    "synthesis",
];

pub const INTENT_SYSTEM: &str = "You are an expert travel intent analyzer. Extract key insights from traveler \
                                 preferences to guide trip planning.";

pub const RESEARCH_LUXURY_SYSTEM: &str = "You are a luxury travel concierge with access to premium pricing data. \
                                          Focus exclusively on high-end experiences, five-star properties and \
                                          VIP services.";

pub const RESEARCH_STANDARD_SYSTEM: &str = "You are a savvy budget travel expert with access to real pricing data. \
                                            Focus on value, free activities and cost-saving strategies without \
                                            compromising the quality of the experience.";

pub const CURATION_ACTIVE_SYSTEM: &str = "You are an adventure and cultural travel expert. Prioritize physically \
                                          engaging and intellectually stimulating experiences. Include practical \
                                          logistics and fitness requirements.";

pub const CURATION_LEISURE_SYSTEM: &str = "You are a relaxation and nightlife travel expert. Prioritize comfort, \
                                           low physical exertion and evening entertainment. Include ambiance \
                                           descriptions and booking tips.";

pub const SYNTHESIS_SYSTEM: &str = "You are an expert itinerary generator. Create detailed, realistic and \
                                    well-paced travel itineraries. Always respond with valid JSON only, with \
                                    no additional text.";

/// Get the embedded template by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "intent" => Some(INTENT),
        "research-luxury" => Some(RESEARCH_LUXURY),
        "research-standard" => Some(RESEARCH_STANDARD),
        "curation-active" => Some(CURATION_ACTIVE),
        "curation-leisure" => Some(CURATION_LEISURE),
        "synthesis" => Some(SYNTHESIS),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
