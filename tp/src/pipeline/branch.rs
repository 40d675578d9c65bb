//! Stages and branch selection
//!
//! The research and curation stages each come in two variants. Which one
//! runs is a pure function of the trip's budget tier and travel style, read
//! once when the run starts.

use std::fmt;

use crate::domain::{BudgetTier, TravelStyle, TripStatus};
use crate::prompts::embedded;

/// Research stage variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResearchBranch {
    /// Premium venues, private transport, highest prices first
    Luxury,
    /// Value venues, public transit, lowest prices first
    Standard,
}

impl From<BudgetTier> for ResearchBranch {
    fn from(tier: BudgetTier) -> Self {
        match tier {
            BudgetTier::High => Self::Luxury,
            BudgetTier::Low | BudgetTier::Medium => Self::Standard,
        }
    }
}

impl ResearchBranch {
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::Luxury => "research-luxury",
            Self::Standard => "research-standard",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::Luxury => embedded::RESEARCH_LUXURY_SYSTEM,
            Self::Standard => embedded::RESEARCH_STANDARD_SYSTEM,
        }
    }
}

impl fmt::Display for ResearchBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Luxury => write!(f, "luxury"),
            Self::Standard => write!(f, "standard"),
        }
    }
}

/// Curation stage variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurationBranch {
    /// Outdoor, physical and cultural-immersion activities
    Active,
    /// Spa, beach, nightlife and low-exertion activities
    Leisure,
}

impl From<TravelStyle> for CurationBranch {
    fn from(style: TravelStyle) -> Self {
        match style {
            TravelStyle::Adventure | TravelStyle::Cultural => Self::Active,
            TravelStyle::Relaxation | TravelStyle::Nightlife => Self::Leisure,
        }
    }
}

impl CurationBranch {
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::Active => "curation-active",
            Self::Leisure => "curation-leisure",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::Active => embedded::CURATION_ACTIVE_SYSTEM,
            Self::Leisure => embedded::CURATION_LEISURE_SYSTEM,
        }
    }

    /// Note attached to each recommended property in the curation prompt
    pub fn lodging_note(&self) -> &'static str {
        match self {
            Self::Active => "close to activities",
            Self::Leisure => "spa/beach access",
        }
    }

    pub fn lodging_heading(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE-TRAVELER HOTELS",
            Self::Leisure => "LEISURE-FOCUSED HOTELS",
        }
    }
}

impl fmt::Display for CurationBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Leisure => write!(f, "leisure"),
        }
    }
}

/// Guidance paragraph for the curation prompt
pub fn style_guidance(style: TravelStyle) -> &'static str {
    match style {
        TravelStyle::Adventure => {
            "ADVENTURE FOCUS: Outdoor activities, hiking trails, water sports (kayaking, surfing, diving), rock \
             climbing, zip-lining, bike tours, extreme sports, wildlife encounters."
        }
        TravelStyle::Cultural => {
            "CULTURAL FOCUS: Museums, art galleries, historical sites, UNESCO heritage locations, local markets, \
             cooking classes, cultural performances, architecture tours, artisan workshops."
        }
        TravelStyle::Relaxation => {
            "RELAXATION FOCUS: Spa treatments, beach clubs, scenic viewpoints, sunset cruises, yoga retreats, \
             thermal baths, meditation spots, leisurely garden walks, wine tastings."
        }
        TravelStyle::Nightlife => {
            "NIGHTLIFE FOCUS: Rooftop bars, nightclubs, live music venues, jazz clubs, cocktail bars, late-night \
             restaurants, sunset lounges, pub crawls, entertainment districts."
        }
    }
}

/// Both branch choices for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BranchPlan {
    pub research: ResearchBranch,
    pub curation: CurationBranch,
}

impl BranchPlan {
    pub fn select(tier: BudgetTier, style: TravelStyle) -> Self {
        Self {
            research: tier.into(),
            curation: style.into(),
        }
    }
}

/// A pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Intent,
    Research(ResearchBranch),
    Curation(CurationBranch),
    Synthesis,
}

impl Stage {
    /// Status written before the stage starts
    pub fn status(&self) -> TripStatus {
        match self {
            Self::Intent => TripStatus::AnalyzingIntent,
            Self::Research(_) => TripStatus::ResearchingDestination,
            Self::Curation(_) => TripStatus::CuratingActivities,
            Self::Synthesis => TripStatus::GeneratingItinerary,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Intent => write!(f, "intent"),
            Self::Research(branch) => write!(f, "research[{}]", branch),
            Self::Curation(branch) => write!(f, "curation[{}]", branch),
            Self::Synthesis => write!(f, "synthesis"),
        }
    }
}
