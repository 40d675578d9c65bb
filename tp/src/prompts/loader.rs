//! Prompt Loader
//!
//! Loads stage templates from an override directory or falls back to the
//! embedded defaults, then renders them with Handlebars.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;
use crate::domain::Trip;

/// Shown in place of a missing trip date
const FLEXIBLE: &str = "Flexible";

/// Values available to every stage template
///
/// Stage outputs start empty and are filled in as the run progresses.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromptContext {
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub budget_tier: String,
    /// Upper-case tier for the standard research prompt (LOW / MEDIUM)
    pub budget_label: String,
    pub travel_style: String,
    pub group_size: u32,
    pub duration_days: u32,
    pub style_guidance: String,
    pub intent: String,
    pub research: String,
    pub curation: String,
    /// Formatted travel-data context; empty when none was available
    pub enrichment: String,
}

impl PromptContext {
    /// Context carrying the trip's request attributes
    pub fn for_trip(trip: &Trip, duration_days: u32) -> Self {
        let date_or_flexible = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| FLEXIBLE.to_string());

        Self {
            destination: trip.destination.clone(),
            start_date: date_or_flexible(trip.start_date),
            end_date: date_or_flexible(trip.end_date),
            budget_tier: trip.budget_tier.to_string(),
            budget_label: trip.budget_tier.as_str().to_uppercase(),
            travel_style: trip.travel_style.to_string(),
            group_size: trip.group_size,
            duration_days,
            ..Self::default()
        }
    }
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory holding `{name}.pmt` files
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that prefers templates from `override_dir`
    pub fn new(override_dir: Option<impl AsRef<Path>>) -> Self {
        let override_dir = override_dir.map(|d| d.as_ref().to_path_buf()).filter(|d| d.exists());
        debug!(?override_dir, "PromptLoader::new: called");

        Self {
            hbs: Self::engine(),
            override_dir,
        }
    }

    /// Create a loader that only uses embedded prompts
    pub fn embedded_only() -> Self {
        Self {
            hbs: Self::engine(),
            override_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text; model output must pass through untouched
        hbs.register_escape_fn(handlebars::no_escape);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. Override: `{override_dir}/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        if let Some(ref dir) = self.override_dir {
            let path = dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!("Loading prompt from override: {:?}", path);
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read prompt override {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!("Using embedded prompt: {}", name);
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &PromptContext) -> Result<String> {
        let template = self.load_template(template_name)?;
        debug!(%template_name, destination = %context.destination, "PromptLoader::render: called");

        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}
