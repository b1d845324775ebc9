/*!
# FAIR assessment dashboard

A browser-based dashboard for FAIR (Findability, Accessibility,
Interoperability, Reusability) assessments of computational models, built in
Rust.

## Overview

Model authors fill in a spreadsheet template that scores every indicator
with NA, 0, 0.5 or 1. The dashboard loads all assessments from a data
directory, aggregates the scores per indicator and shows them as tables and
polar/bar charts. New assessments can be uploaded and inspected without
storing them.

## Data flow

1. **Load** - spreadsheet and CSV files are read into in-memory tables
   (`loader`, `table`)
2. **Validate** - IDs and scores are checked (`assessment`, `merge`)
3. **Aggregate** - scores are counted per indicator and category into four
   buckets (`indicators`)
4. **Render** - charts are drawn with plotters (`graph`) and served by an
   axum web application with tab navigation (`app`)

## Modules

- **table**: Value and Table types
- **loader**: CSV and XLSX import
- **assessment**: a model's assessment, score classes and validation
- **indicators**: indicator catalogue with counts over all models
- **merge**: merging a multi-sheet indicator/model workbook
- **catalog**: everything loaded at startup
- **graph**: polar bar charts, bar plots and inline charts as SVG
- **downloader**: CSV and XLSX export, blank assessment template
- **config**: command line and environment settings
- **app**: routing and page rendering

## Web routes

- `/`, `/models`, `/indicators`, `/assess` - the four tabs
- `/charts/{model}/{category}`, `/barplot/{model}` - charts as SVG
- `/api/models`, `/api/models/{model}`, `/api/indicators` - JSON
- `/download/indicators.csv`, `/download/indicators.xlsx`,
  `/download/template.xlsx` - exports
*/

pub mod app;
pub mod assessment;
pub mod catalog;
pub mod config;
pub mod downloader;
pub mod error;
pub mod graph;
pub mod indicators;
pub mod loader;
pub mod merge;
pub mod table;

pub use assessment::{Assessment, AssessmentClass, ClassCounts, IndicatorAssessment};
pub use catalog::Catalog;
pub use config::Settings;
pub use error::{FairError, Result};
pub use indicators::{Indicator, IndicatorSummary};
pub use table::{Table, Value};
