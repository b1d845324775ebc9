use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::assessment::{Assessment, load_model_assessments};
use crate::config::Settings;
use crate::error::{FairError, Result};
use crate::indicators::{IndicatorSummary, load_indicators};
use crate::loader;
use crate::table::Table;

/// Everything the dashboard shows, loaded once at startup
#[derive(Clone, Debug, Serialize)]
pub struct Catalog {
    pub indicators: IndicatorSummary,
    pub models: BTreeMap<String, Assessment>,
    pub loaded_at: DateTime<Utc>,
}

impl Catalog {
    /// Load the model assessments, then aggregate them over the template
    pub fn load(settings: &Settings) -> Result<Self> {
        let models = load_model_assessments(settings.assessments_dir())?;
        let template = loader::load_table(settings.template_path())?;
        let catalog = Catalog::from_parts(&template, models)?;
        info!(
            "Catalog ready: {} indicators, {} models",
            catalog.indicators.len(),
            catalog.models.len()
        );
        Ok(catalog)
    }

    pub fn from_parts(template: &Table, models: BTreeMap<String, Assessment>) -> Result<Self> {
        let indicators = load_indicators(template, &models)?;
        Ok(Catalog {
            indicators,
            models,
            loaded_at: Utc::now(),
        })
    }

    pub fn model(&self, model_id: &str) -> Result<&Assessment> {
        self.models
            .get(model_id)
            .ok_or_else(|| FairError::ModelNotFound(model_id.to_string()))
    }

    pub fn model_ids(&self) -> Vec<&str> {
        self.models.keys().map(String::as_str).collect()
    }

    /// The preferred model if loaded, otherwise the first one
    pub fn example_model(&self, preferred: &str) -> Option<&Assessment> {
        self.models
            .get(preferred)
            .or_else(|| self.models.values().next())
    }
}
