use lazy_static::lazy_static;
use log::{debug, error, info, warn};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{FairError, Result};
use crate::loader::{self, Workbook};
use crate::table::{Table, Value};

pub const ID: &str = "ID";
pub const CATEGORY: &str = "Category";
pub const SUBCATEGORY: &str = "Subcategory";
pub const PRIORITY: &str = "Priority";
pub const INDICATOR: &str = "Indicator";
pub const DESCRIPTION: &str = "Description";
pub const ASSESSMENT_DETAILS: &str = "Assessment details";
pub const ASSESSMENT: &str = "Assessment";
pub const COMMENT: &str = "Comment";

lazy_static! {
    static ref UNSAFE_ID_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.\-]+").unwrap();
}

/// The four buckets an indicator score can fall into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AssessmentClass {
    NotAssessed,
    Zero,
    Half,
    One,
}

impl AssessmentClass {
    pub const ALL: [AssessmentClass; 4] = [
        AssessmentClass::NotAssessed,
        AssessmentClass::Zero,
        AssessmentClass::Half,
        AssessmentClass::One,
    ];

    /// Bucket a score; `None` when the value is not one of NA, 0, 0.5, 1
    pub fn classify(value: Option<f64>) -> Option<Self> {
        match value {
            None => Some(AssessmentClass::NotAssessed),
            Some(v) if v.is_nan() => Some(AssessmentClass::NotAssessed),
            Some(v) if is_close(v, 0.0) => Some(AssessmentClass::Zero),
            Some(v) if is_close(v, 0.5) => Some(AssessmentClass::Half),
            Some(v) if is_close(v, 1.0) => Some(AssessmentClass::One),
            Some(_) => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            AssessmentClass::NotAssessed => "NA",
            AssessmentClass::Zero => "0.0",
            AssessmentClass::Half => "0.5",
            AssessmentClass::One => "1.0",
        }
    }
}

impl fmt::Display for AssessmentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// numpy.isclose with default tolerances
fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs()
}

/// Number of indicators per assessment class
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    pub not_assessed: u32,
    pub zero: u32,
    pub half: u32,
    pub one: u32,
}

impl ClassCounts {
    pub fn add(&mut self, class: AssessmentClass) {
        match class {
            AssessmentClass::NotAssessed => self.not_assessed += 1,
            AssessmentClass::Zero => self.zero += 1,
            AssessmentClass::Half => self.half += 1,
            AssessmentClass::One => self.one += 1,
        }
    }

    pub fn get(&self, class: AssessmentClass) -> u32 {
        self.as_array()[class.index()]
    }

    pub fn as_array(&self) -> [u32; 4] {
        [self.not_assessed, self.zero, self.half, self.one]
    }

    pub fn total(&self) -> u32 {
        self.as_array().iter().sum()
    }

    pub fn max(&self) -> u32 {
        self.as_array().into_iter().max().unwrap_or(0)
    }
}

/// One indicator row of a model assessment
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IndicatorAssessment {
    pub id: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub priority: Option<String>,
    pub indicator: Option<String>,
    pub assessment: Option<f64>,
    /// The Assessment cell as written when it is text rather than a number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_assessment: Option<String>,
    pub comment: Option<String>,
}

impl IndicatorAssessment {
    /// Class of the score; `None` for text or out-of-range values
    pub fn class(&self) -> Option<AssessmentClass> {
        if self.raw_assessment.is_some() {
            return None;
        }
        AssessmentClass::classify(self.assessment)
    }
}

/// A model's filled-in assessment sheet
#[derive(Clone, Debug, Serialize)]
pub struct Assessment {
    pub model_id: String,
    pub indicators: Vec<IndicatorAssessment>,
    /// Display table with the description columns removed
    pub table: Table,
}

impl Assessment {
    /// Build an assessment from the first sheet of an assessment file
    ///
    /// Rows without an ID are skipped.
    pub fn from_table(model_id: impl Into<String>, mut table: Table) -> Result<Self> {
        let model_id = model_id.into();
        table.require_column(ID)?;
        table.require_column(CATEGORY)?;
        table.require_column(ASSESSMENT)?;
        table.drop_column(DESCRIPTION);
        table.drop_column(ASSESSMENT_DETAILS);

        let mut indicators = Vec::with_capacity(table.len());
        for row in 0..table.len() {
            let Some(id) = table.text(row, ID) else {
                debug!("{}: skipping row {} without ID", model_id, row + 2);
                continue;
            };
            indicators.push(IndicatorAssessment {
                id,
                category: table.text(row, CATEGORY).unwrap_or_default(),
                subcategory: table.text(row, SUBCATEGORY),
                priority: table.text(row, PRIORITY),
                indicator: table.text(row, INDICATOR),
                assessment: table.number(row, ASSESSMENT),
                raw_assessment: match table.value(row, ASSESSMENT) {
                    Some(Value::Text(text)) if !text.is_empty() => Some(text.clone()),
                    _ => None,
                },
                comment: table.text(row, COMMENT),
            });
        }
        table.name = model_id.clone();

        Ok(Assessment {
            model_id,
            indicators,
            table,
        })
    }

    /// Categories in order of first appearance
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.indicators
            .iter()
            .filter(|i| seen.insert(i.category.as_str()))
            .map(|i| i.category.clone())
            .collect()
    }

    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a IndicatorAssessment> {
        self.indicators.iter().filter(move |i| i.category == category)
    }

    pub fn get(&self, id: &str) -> Option<&IndicatorAssessment> {
        self.indicators.iter().find(|i| i.id == id)
    }

    pub fn class_counts(&self) -> ClassCounts {
        count_classes(self.indicators.iter())
    }

    pub fn counts_by_category(&self) -> Vec<(String, ClassCounts)> {
        self.categories()
            .into_iter()
            .map(|c| {
                let counts = count_classes(self.in_category(&c));
                (c, counts)
            })
            .collect()
    }

    /// Mean of the assessed scores, `None` when nothing has been assessed
    pub fn mean_score(&self) -> Option<f64> {
        let scores: Vec<f64> = self.indicators.iter().filter_map(|i| i.assessment).collect();
        if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        }
    }
}

fn count_classes<'a>(rows: impl Iterator<Item = &'a IndicatorAssessment>) -> ClassCounts {
    let mut counts = ClassCounts::default();
    for class in rows.filter_map(IndicatorAssessment::class) {
        counts.add(class);
    }
    counts
}

/// A single problem found in an assessment
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub id: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.message)
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    pub model_id: String,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        let issues = self
            .issues
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(FairError::InvalidAssessment {
            model_id: self.model_id,
            issues,
        })
    }
}

/// Check IDs are unique, categories set and scores one of NA, 0, 0.5, 1
pub fn validate_assessment(assessment: &Assessment) -> ValidationReport {
    let mut report = ValidationReport {
        model_id: assessment.model_id.clone(),
        issues: Vec::new(),
    };
    let mut seen = HashSet::new();

    for row in &assessment.indicators {
        if !seen.insert(row.id.as_str()) {
            report.issues.push(ValidationIssue {
                id: row.id.clone(),
                message: "duplicate indicator ID".to_string(),
            });
        }
        if row.category.is_empty() {
            report.issues.push(ValidationIssue {
                id: row.id.clone(),
                message: "missing category".to_string(),
            });
        }
        if row.class().is_none() {
            let shown = match (&row.raw_assessment, row.assessment) {
                (Some(text), _) => format!("'{}'", text),
                (None, Some(value)) => value.to_string(),
                (None, None) => "NA".to_string(),
            };
            report.issues.push(ValidationIssue {
                id: row.id.clone(),
                message: format!("assessment {} is not one of NA, 0.0, 0.5, 1.0", shown),
            });
        }
    }

    for issue in &report.issues {
        warn!("{}: {}", report.model_id, issue);
    }
    report
}

fn assessment_from_workbook(model_id: String, workbook: Workbook) -> Result<Assessment> {
    let table = workbook
        .into_first()
        .ok_or_else(|| FairError::MissingSheet(format!("{} (first sheet)", model_id)))?;
    let assessment = Assessment::from_table(model_id, table)?;
    validate_assessment(&assessment).into_result()?;
    Ok(assessment)
}

/// Load and validate an assessment from file; the model id is the file stem
pub fn load_assessment(path: impl AsRef<Path>) -> Result<Assessment> {
    let path = path.as_ref();
    let model_id = loader::file_stem(path);
    assessment_from_workbook(model_id, loader::load_workbook(path)?)
}

/// Replace runs of characters outside `[A-Za-z0-9_.-]` with `_`
pub fn sanitize_name(name: &str) -> String {
    UNSAFE_ID_CHARS.replace_all(name.trim(), "_").into_owned()
}

/// Model id for an uploaded file: the file stem with any directory part
/// removed and runs of unusual characters replaced by `_`
pub fn model_id_from_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = loader::file_stem(Path::new(base));
    let id = sanitize_name(&stem);
    if id.is_empty() {
        "uploaded_model".to_string()
    } else {
        id
    }
}

/// Load and validate an uploaded assessment file
pub fn assessment_from_upload(filename: &str, bytes: &[u8]) -> Result<Assessment> {
    let model_id = model_id_from_filename(filename);
    assessment_from_workbook(model_id, loader::workbook_from_upload(filename, bytes)?)
}

/// Load every `*.xlsx` and `*.csv` assessment in a directory, keyed by model id
///
/// Files that fail to load are logged and skipped. A missing directory gives
/// an empty map.
pub fn load_model_assessments(dir: impl AsRef<Path>) -> Result<BTreeMap<String, Assessment>> {
    let dir = dir.as_ref();
    let mut models = BTreeMap::new();
    if !dir.is_dir() {
        warn!("Assessment directory {} does not exist", dir.display());
        return Ok(models);
    }

    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| matches!(loader::extension(p).as_deref(), Some("xlsx") | Some("csv")))
        .collect();
    paths.sort();

    for path in paths {
        // Excel lock files of open workbooks
        if loader::file_stem(&path).starts_with("~$") {
            continue;
        }
        match load_assessment(&path) {
            Ok(assessment) => {
                if models.contains_key(&assessment.model_id) {
                    warn!("Duplicate model id '{}' in {}, ignored", assessment.model_id, path.display());
                    continue;
                }
                models.insert(assessment.model_id.clone(), assessment);
            }
            Err(e) => error!("Skipping {}: {}", path.display(), e),
        }
    }
    info!("Loaded {} model assessments from {}", models.len(), dir.display());
    Ok(models)
}
