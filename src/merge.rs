use log::{info, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assessment::ID;
use crate::downloader::to_csv;
use crate::error::{FairError, Result};
use crate::loader::Workbook;
use crate::table::Table;

pub const INDICATORS_SHEET: &str = "indicators";
pub const MODELS_SHEET: &str = "models";

/// Whether every indicator a model sheet references exists
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelValidity {
    pub model_id: String,
    pub valid: bool,
    pub unknown_indicators: Vec<String>,
}

/// An indicator workbook with each model sheet joined onto the indicators
#[derive(Clone, Debug)]
pub struct MergedWorkbook {
    pub indicators: Table,
    pub models: Table,
    /// Per model sheet, in workbook order
    pub merged: Vec<(String, Table)>,
    pub validity: Vec<ModelValidity>,
}

impl MergedWorkbook {
    pub fn model(&self, model_id: &str) -> Option<&Table> {
        self.merged.iter().find(|(id, _)| id == model_id).map(|(_, t)| t)
    }

    pub fn is_valid(&self) -> bool {
        self.validity.iter().all(|v| v.valid)
    }

    /// Write `indicators.csv`, `models.csv` and one `<model_id>.csv` per model
    pub fn write_csvs(&self, out_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let out_dir = out_dir.as_ref();
        fs::create_dir_all(out_dir)?;

        let mut written = Vec::with_capacity(self.merged.len() + 2);
        let tables = [(INDICATORS_SHEET, &self.indicators), (MODELS_SHEET, &self.models)]
            .into_iter()
            .chain(self.merged.iter().map(|(id, t)| (id.as_str(), t)));
        for (name, table) in tables {
            let path = out_dir.join(format!("{}.csv", name));
            fs::write(&path, to_csv(table))?;
            info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

fn id_set(table: &Table) -> Result<HashSet<String>> {
    Ok(table
        .column_values(ID)?
        .into_iter()
        .filter_map(|v| v.as_text())
        .collect())
}

/// Validate model sheets against the `indicators` and `models` sheets and
/// merge each of them onto the indicators
///
/// A model sheet whose name is not a model ID is an error. Unknown indicator
/// IDs only mark that model as invalid.
pub fn merge_workbook(workbook: &Workbook) -> Result<MergedWorkbook> {
    let indicators = workbook
        .sheet(INDICATORS_SHEET)
        .ok_or_else(|| FairError::MissingSheet(INDICATORS_SHEET.to_string()))?;
    let models = workbook
        .sheet(MODELS_SHEET)
        .ok_or_else(|| FairError::MissingSheet(MODELS_SHEET.to_string()))?;

    let indicator_ids = id_set(indicators)?;
    let model_ids_def = id_set(models)?;

    let model_sheets: Vec<&Table> = workbook
        .sheets
        .iter()
        .filter(|t| t.name != INDICATORS_SHEET && t.name != MODELS_SHEET)
        .collect();

    for sheet in &model_sheets {
        if !model_ids_def.contains(&sheet.name) {
            return Err(FairError::UnknownModel(sheet.name.clone()));
        }
    }

    let mut validity = Vec::with_capacity(model_sheets.len());
    let mut merged = Vec::with_capacity(model_sheets.len());
    for sheet in model_sheets {
        let unknown_indicators: Vec<String> = sheet
            .column_values(ID)?
            .into_iter()
            .filter_map(|v| v.as_text())
            .filter(|id| !indicator_ids.contains(id))
            .collect();
        for id in &unknown_indicators {
            warn!("{}: indicator '{}' incorrect", sheet.name, id);
        }
        let valid = unknown_indicators.is_empty();
        info!("Model {} is valid: {}", sheet.name, valid);
        validity.push(ModelValidity {
            model_id: sheet.name.clone(),
            valid,
            unknown_indicators,
        });

        let mut joined = indicators.inner_join(sheet, ID)?;
        joined.name = sheet.name.clone();
        merged.push((sheet.name.clone(), joined));
    }

    Ok(MergedWorkbook {
        indicators: indicators.clone(),
        models: models.clone(),
        merged,
        validity,
    })
}
