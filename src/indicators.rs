use log::{debug, warn};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::assessment::{
    ASSESSMENT, ASSESSMENT_DETAILS, Assessment, AssessmentClass, CATEGORY, COMMENT, ClassCounts,
    DESCRIPTION, ID, INDICATOR, PRIORITY, SUBCATEGORY,
};
use crate::error::Result;
use crate::table::{Table, Value};

/// An indicator of the assessment template with counts over all models
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Indicator {
    pub id: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub priority: Option<String>,
    pub indicator: Option<String>,
    pub counts: ClassCounts,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct IndicatorSummary {
    pub indicators: Vec<Indicator>,
    pub n_models: usize,
}

impl IndicatorSummary {
    pub fn get(&self, id: &str) -> Option<&Indicator> {
        self.indicators.iter().find(|i| i.id == id)
    }

    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }

    /// Display and export table, one column per assessment class
    pub fn table(&self) -> Table {
        let mut columns: Vec<String> = [ID, CATEGORY, SUBCATEGORY, PRIORITY, INDICATOR]
            .iter()
            .map(|c| c.to_string())
            .collect();
        columns.extend(AssessmentClass::ALL.iter().map(|c| c.label().to_string()));

        let rows = self
            .indicators
            .iter()
            .map(|i| {
                let mut row = vec![
                    Value::from(i.id.as_str()),
                    Value::from(i.category.as_str()),
                    optional_text(&i.subcategory),
                    optional_text(&i.priority),
                    optional_text(&i.indicator),
                ];
                row.extend(i.counts.as_array().iter().map(|&n| Value::Number(n as f64)));
                row
            })
            .collect();
        Table::from_rows("indicators", columns, rows)
    }
}

fn optional_text(s: &Option<String>) -> Value {
    s.as_deref().map(Value::from).unwrap_or(Value::Empty)
}

/// Aggregate the model assessments per template indicator
///
/// Scores are matched by indicator ID. An indicator a model does not list
/// counts as not assessed for that model, so every indicator's total equals
/// the number of models.
pub fn load_indicators(template: &Table, models: &BTreeMap<String, Assessment>) -> Result<IndicatorSummary> {
    let mut template = template.clone();
    template.require_column(ID)?;
    template.require_column(CATEGORY)?;
    for column in [DESCRIPTION, ASSESSMENT_DETAILS, ASSESSMENT, COMMENT] {
        template.drop_column(column);
    }

    let mut indicators = Vec::with_capacity(template.len());
    let mut positions: HashMap<String, usize> = HashMap::new();
    for row in 0..template.len() {
        let Some(id) = template.text(row, ID) else {
            debug!("template: skipping row {} without ID", row + 2);
            continue;
        };
        if positions.contains_key(&id) {
            warn!("template: duplicate indicator '{}' ignored", id);
            continue;
        }
        positions.insert(id.clone(), indicators.len());
        indicators.push(Indicator {
            id,
            category: template.text(row, CATEGORY).unwrap_or_default(),
            subcategory: template.text(row, SUBCATEGORY),
            priority: template.text(row, PRIORITY),
            indicator: template.text(row, INDICATOR),
            counts: ClassCounts::default(),
        });
    }

    for (model_id, model) in models {
        let mut seen = vec![false; indicators.len()];
        for row in &model.indicators {
            let Some(&k) = positions.get(&row.id) else {
                warn!("{}: indicator '{}' is not in the template", model_id, row.id);
                continue;
            };
            if seen[k] {
                continue;
            }
            if let Some(class) = row.class() {
                indicators[k].counts.add(class);
                seen[k] = true;
            }
        }
        for (k, assessed) in seen.iter().enumerate() {
            if !assessed {
                indicators[k].counts.add(AssessmentClass::NotAssessed);
            }
        }
    }

    Ok(IndicatorSummary {
        indicators,
        n_models: models.len(),
    })
}
