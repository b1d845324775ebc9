#![cfg(feature = "web")]
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use handlebars::Handlebars;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::assessment::{Assessment, AssessmentClass, assessment_from_upload};
use crate::catalog::Catalog;
use crate::config::Settings;
use crate::downloader::{template_xlsx, to_csv, to_xlsx};
use crate::error::{FairError, Result};
use crate::graph::{ChartOptions, category_polar_barplot, indicator_barchart, visualize_barplot, visualize_polar_barplots};
use crate::table::Table;

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
const UPLOAD_FIELD: &str = "assessment";

const TABS: [(&str, &str, &str); 4] = [
    ("about", "About", "/"),
    ("models", "Models", "/models"),
    ("indicators", "Indicators", "/indicators"),
    ("assess", "Assess your Model", "/assess"),
];

pub struct AppState {
    pub catalog: Catalog,
    pub settings: Settings,
    templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(catalog: Catalog, settings: Settings) -> Result<Self> {
        let mut templates = Handlebars::new();
        templates.register_partial("layout", include_str!("./static/layout.hbs"))?;
        templates.register_partial("model_view", include_str!("./static/model_view.hbs"))?;
        templates.register_template_string("about", include_str!("./static/about.hbs"))?;
        templates.register_template_string("models", include_str!("./static/models.hbs"))?;
        templates.register_template_string("indicators", include_str!("./static/indicators.hbs"))?;
        templates.register_template_string("assess", include_str!("./static/assess.hbs"))?;

        Ok(AppState {
            catalog,
            settings,
            templates,
        })
    }

    // Render a page inside the shared layout with `tab` highlighted
    fn render(&self, page: &str, tab: &str, mut data: JsonValue) -> Result<Html<String>> {
        let tabs: Vec<JsonValue> = TABS
            .iter()
            .map(|(key, label, href)| json!({"label": label, "href": href, "active": *key == tab}))
            .collect();
        if let Some(object) = data.as_object_mut() {
            object.insert("tabs".to_string(), json!(tabs));
            object.insert(
                "loaded_at".to_string(),
                json!(self.catalog.loaded_at.format("%Y-%m-%d %H:%M UTC").to_string()),
            );
        }
        Ok(Html(self.templates.render(page, &data)?))
    }
}

#[derive(Serialize)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

#[derive(Deserialize)]
struct ModelQuery {
    model: Option<String>,
}

impl IntoResponse for FairError {
    fn into_response(self) -> Response {
        let status = match &self {
            FairError::ModelNotFound(_) => StatusCode::NOT_FOUND,
            FairError::InvalidAssessment { .. }
            | FairError::UnsupportedFormat(_)
            | FairError::Csv { .. }
            | FairError::Xlsx(_)
            | FairError::MissingSheet(_)
            | FairError::MissingColumn { .. }
            | FairError::UnknownModel(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{}", self);
        }

        let body = StatusResponse {
            status: "error".to_string(),
            message: Some(self.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the dashboard router
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = state.settings.static_dir.clone();
    Router::new()
        .route("/", get(serve_about))
        .route("/models", get(serve_models))
        .route("/indicators", get(serve_indicators))
        .route("/assess", get(serve_assess).post(upload_assessment))
        .route("/charts/:model/:category", get(get_polar_chart))
        .route("/barplot/:model", get(get_barplot))
        .route("/api/models", get(list_models))
        .route("/api/models/:model", get(get_model))
        .route("/api/indicators", get(get_indicators))
        .route("/download/indicators.csv", get(download_indicators_csv))
        .route("/download/indicators.xlsx", get(download_indicators_xlsx))
        .route("/download/template.xlsx", get(download_template))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Load the catalog and serve the dashboard until the process is stopped
pub async fn run(settings: Settings) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::load(&settings)?;
    let bind = settings.bind;
    let state = Arc::new(AppState::new(catalog, settings)?);
    let app = router(state);

    let listener = TcpListener::bind(bind).await?;
    info!("Listening on http://{}", bind);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_about(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let example = state.catalog.example_model(&state.settings.example_model);
    let (model_id, charts) = match example {
        Some(assessment) => {
            let (figs, keys) = visualize_polar_barplots(assessment)?;
            let charts: Vec<JsonValue> = figs
                .into_iter()
                .zip(keys)
                .take(2)
                .map(|(svg, key)| json!({"key": key, "svg": svg}))
                .collect();
            (Some(assessment.model_id.clone()), charts)
        }
        None => (None, Vec::new()),
    };

    state.render(
        "about",
        "about",
        json!({
            "example_model": model_id,
            "charts": charts,
            "n_models": state.catalog.models.len(),
            "n_indicators": state.catalog.indicators.len(),
        }),
    )
}

async fn serve_models(
    Query(params): Query<ModelQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>> {
    let catalog = &state.catalog;
    let selected = match params.model.as_deref().or_else(|| catalog.model_ids().first().copied()) {
        Some(model_id) => Some(catalog.model(model_id)?),
        None => None,
    };

    let options: Vec<JsonValue> = catalog
        .model_ids()
        .into_iter()
        .map(|id| json!({"id": id, "selected": selected.map(|s| s.model_id == id).unwrap_or(false)}))
        .collect();
    let model = selected.map(model_view).transpose()?;

    state.render("models", "models", json!({"options": options, "model": model}))
}

async fn serve_indicators(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    let summary = &state.catalog.indicators;
    let rows = summary
        .indicators
        .iter()
        .map(|i| -> Result<JsonValue> {
            let chart = indicator_barchart(&i.counts, &ChartOptions::sparkbar())?;
            Ok(json!({
                "id": i.id,
                "category": i.category,
                "subcategory": i.subcategory,
                "priority": i.priority,
                "indicator": i.indicator,
                "counts": i.counts.as_array(),
                "chart": chart,
            }))
        })
        .collect::<Result<Vec<_>>>()?;

    state.render(
        "indicators",
        "indicators",
        json!({
            "classes": class_labels(),
            "rows": rows,
            "n_models": summary.n_models,
        }),
    )
}

async fn serve_assess(State(state): State<Arc<AppState>>) -> Result<Html<String>> {
    state.render("assess", "assess", json!({}))
}

async fn upload_assessment(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Result<Html<String>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some(UPLOAD_FIELD) {
                    continue;
                }
                let filename = field.file_name().unwrap_or("assessment.xlsx").to_string();
                match field.bytes().await {
                    Ok(bytes) => upload = Some((filename, bytes.to_vec())),
                    Err(e) => return render_upload_error(&state, format!("Upload failed: {}", e)),
                }
            }
            Ok(None) => break,
            Err(e) => return render_upload_error(&state, format!("Upload failed: {}", e)),
        }
    }

    let Some((filename, bytes)) = upload.filter(|(_, bytes)| !bytes.is_empty()) else {
        return render_upload_error(&state, "No file data received".to_string());
    };

    match assessment_from_upload(&filename, &bytes) {
        Ok(assessment) => {
            info!("Rendering uploaded assessment {} ({} indicators)", filename, assessment.indicators.len());
            let model = model_view(&assessment)?;
            state.render("assess", "assess", json!({"model": model, "filename": filename}))
        }
        Err(e) => {
            warn!("Rejected upload {}: {}", filename, e);
            render_upload_error(&state, e.to_string())
        }
    }
}

fn render_upload_error(state: &AppState, message: String) -> Result<Html<String>> {
    state.render("assess", "assess", json!({"error": message}))
}

async fn get_polar_chart(
    Path((model_id, category)): Path<(String, String)>,
    State(state): State<Arc<AppState>>,
) -> Result<Response> {
    let assessment = state.catalog.model(&model_id)?;
    match category_polar_barplot(assessment, &category) {
        Some(svg) => Ok(svg_response(svg?)),
        None => Ok((StatusCode::NOT_FOUND, format!("No category '{}'", category)).into_response()),
    }
}

async fn get_barplot(Path(model_id): Path<String>, State(state): State<Arc<AppState>>) -> Result<Response> {
    let assessment = state.catalog.model(&model_id)?;
    Ok(svg_response(visualize_barplot(assessment)?))
}

async fn list_models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let models: Vec<JsonValue> = state
        .catalog
        .models
        .values()
        .map(|m| {
            json!({
                "model_id": m.model_id,
                "n_indicators": m.indicators.len(),
                "counts": m.class_counts(),
                "mean_score": m.mean_score(),
            })
        })
        .collect();
    Json(models)
}

async fn get_model(Path(model_id): Path<String>, State(state): State<Arc<AppState>>) -> Result<Json<Assessment>> {
    Ok(Json(state.catalog.model(&model_id)?.clone()))
}

async fn get_indicators(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.catalog.indicators.clone())
}

async fn download_indicators_csv(State(state): State<Arc<AppState>>) -> Response {
    let csv = to_csv(&state.catalog.indicators.table());
    attachment("text/csv", "indicators.csv", csv.into_bytes())
}

async fn download_indicators_xlsx(State(state): State<Arc<AppState>>) -> Result<Response> {
    let xlsx = to_xlsx(&state.catalog.indicators.table())?;
    Ok(attachment(XLSX_MIME, "indicators.xlsx", xlsx))
}

async fn download_template(State(state): State<Arc<AppState>>) -> Result<Response> {
    let xlsx = template_xlsx(&state.catalog.indicators)?;
    Ok(attachment(XLSX_MIME, "FAIR_assessment_template.xlsx", xlsx))
}

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

fn attachment(content_type: &'static str, filename: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        body,
    )
        .into_response()
}

fn svg_response(svg: String) -> Response {
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
}

fn class_labels() -> Vec<&'static str> {
    AssessmentClass::ALL.iter().map(|c| c.label()).collect()
}

// Charts, counts and table of one assessment, shared by the Models and Assess tabs
fn model_view(assessment: &Assessment) -> Result<JsonValue> {
    let (figs, keys) = visualize_polar_barplots(assessment)?;
    let model_path = urlencoding::encode(&assessment.model_id).into_owned();
    let charts: Vec<JsonValue> = figs
        .into_iter()
        .zip(keys)
        .map(|(svg, key)| {
            let href = format!("/charts/{}/{}", model_path, urlencoding::encode(&key));
            json!({"key": key, "svg": svg, "href": href})
        })
        .collect();

    let counts = assessment.class_counts();
    let counts: Vec<JsonValue> = AssessmentClass::ALL
        .iter()
        .map(|c| json!({"label": c.label(), "count": counts.get(*c)}))
        .collect();

    Ok(json!({
        "model_id": assessment.model_id,
        "charts": charts,
        "barplot": visualize_barplot(assessment)?,
        "counts": counts,
        "mean_score": assessment.mean_score().map(|s| format!("{:.2}", s)),
        "table": table_view(&assessment.table),
    }))
}

fn table_view(table: &Table) -> JsonValue {
    let rows: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|r| r.iter().map(|v| v.to_string()).collect())
        .collect();
    json!({"columns": table.columns(), "rows": rows})
}
