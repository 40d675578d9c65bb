//! Itinerary generation pipeline
//!
//! Four stages run in order for each trip: intent, research (luxury or
//! standard), curation (active or leisure) and synthesis.

pub mod branch;
pub mod enrichment;
pub mod error;
pub mod orchestrator;
pub mod parser;
pub mod stages;

pub use branch::{BranchPlan, CurationBranch, ResearchBranch, Stage, style_guidance};
pub use enrichment::Enricher;
pub use error::PipelineError;
pub use orchestrator::{Pipeline, PipelineSettings};
pub use parser::{extract_json_object, parse_itinerary};
pub use stages::StageRunner;
