#![cfg(feature = "web")]

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use handlebars::Handlebars;
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;

use crate::analysis::{AdditionalAnalysis, FuelAnalysis};
use crate::config::ServerArgs;
use crate::dashboard::{ChartSettings, Page, RenderedChart, additional_charts, fuel_charts};
use crate::downloader::{
    DATE_SUMMARY_FILENAME, FUEL_ANALYSIS_FILENAME, XLSX_CONTENT_TYPE, date_summary_xlsx,
    fuel_analysis_xlsx,
};
use crate::error::{DashboardError, Result};
use crate::loader::{self, IngestReport, LoadOptions, LoadedLog, RejectedRow};

const DASHBOARD_TEMPLATE: &str = "dashboard";

/// The most recent upload, normalized
pub struct Upload {
    pub filename: String,
    pub log: LoadedLog,
}

pub struct AppState {
    upload: Mutex<Option<Arc<Upload>>>,
    templates: Handlebars<'static>,
    load_options: LoadOptions,
    chart_settings: ChartSettings,
}

impl AppState {
    pub fn new(load_options: LoadOptions, chart_settings: ChartSettings) -> Result<Self> {
        let mut templates = Handlebars::new();
        templates.register_template_string(
            DASHBOARD_TEMPLATE,
            include_str!("./static/dashboard.hbs"),
        )?;

        Ok(AppState {
            upload: Mutex::new(None),
            templates,
            load_options,
            chart_settings,
        })
    }

    /// Snapshot of the current upload; the lock is released on return
    pub fn current_upload(&self) -> Option<Arc<Upload>> {
        self.upload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_upload(&self, upload: Upload) {
        *self.upload.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(upload));
    }
}

#[derive(Deserialize)]
struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    fn page(&self) -> Page {
        Page::from_slug(self.page.as_deref())
    }
}

#[derive(Serialize)]
struct PageLink {
    slug: &'static str,
    title: &'static str,
    active: bool,
}

#[derive(Serialize)]
struct UploadView<'a> {
    filename: &'a str,
    rows_read: usize,
    rows_loaded: usize,
    rejected: &'a [RejectedRow],
    rejected_count: usize,
    missing_dates: usize,
}

#[derive(Serialize)]
struct PageView<'a> {
    title: &'static str,
    page: &'static str,
    pages: Vec<PageLink>,
    upload: Option<UploadView<'a>>,
    charts: Vec<RenderedChart>,
    download: Option<&'static str>,
    error: Option<String>,
}

/// Build the dashboard router around `state`
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/upload", post(upload_log))
        .route(
            &format!("/download/{}", FUEL_ANALYSIS_FILENAME),
            get(download_fuel_analysis),
        )
        .route(
            &format!("/download/{}", DATE_SUMMARY_FILENAME),
            get(download_date_summary),
        )
        .route("/api/analysis", get(get_analysis))
        .route("/health", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes))
        .with_state(state)
}

pub async fn run(args: ServerArgs) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(
        args.analysis.load_options(),
        args.analysis.chart_settings(),
    )?);
    let app = router(state, args.max_upload_bytes());

    let listener = TcpListener::bind(args.bind_address()).await?;
    info!("Listening on http://{}", args.bind_address());
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_dashboard(
    Query(query): Query<PageQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Html<String>> {
    render_page(&state, query.page(), None).map(Html)
}

async fn upload_log(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let (page, result) = read_upload(multipart, &state.load_options).await;

    match result {
        Ok(upload) => {
            info!(
                "Loaded {} ({} of {} rows, {} rejected)",
                upload.filename,
                upload.log.report.rows_loaded(),
                upload.log.report.rows_read,
                upload.log.report.rejected.len()
            );
            state.replace_upload(upload);
            Redirect::to(&format!("/?page={}", page.slug())).into_response()
        }
        Err(err) if err.is_input_error() => {
            error!("Upload rejected: {}", err);
            match render_page(&state, page, Some(err.to_string())) {
                Ok(html) => (StatusCode::BAD_REQUEST, Html(html)).into_response(),
                Err(err) => err.into_response(),
            }
        }
        Err(err) => err.into_response(),
    }
}

// The page field may follow the file, so the page is returned even on failure
async fn read_upload(mut multipart: Multipart, options: &LoadOptions) -> (Page, Result<Upload>) {
    let mut page = Page::default();
    let mut file: Option<(String, Vec<u8>)> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return (page, Err(DashboardError::InvalidUpload(e.to_string()))),
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("page") => {
                if let Ok(slug) = field.text().await {
                    page = Page::from_slug(Some(slug.trim()));
                }
            }
            Some("file") => {
                let filename = field.file_name().unwrap_or("upload.csv").to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((filename, bytes.to_vec())),
                    Err(e) => return (page, Err(DashboardError::InvalidUpload(e.to_string()))),
                }
            }
            _ => {}
        }
    }

    let result = match file {
        Some((_, bytes)) if bytes.is_empty() => Err(DashboardError::InvalidUpload(
            "the uploaded file is empty".to_string(),
        )),
        Some((filename, bytes)) => {
            loader::from_bytes(&bytes, options).map(|log| Upload { filename, log })
        }
        None => Err(DashboardError::InvalidUpload("no file was uploaded".to_string())),
    };
    (page, result)
}

fn render_page(state: &AppState, page: Page, error: Option<String>) -> Result<String> {
    let upload = state.current_upload();

    let charts = match &upload {
        Some(upload) => page_charts(page, &upload.log, &state.chart_settings)?,
        None => Vec::new(),
    };

    let view = PageView {
        title: page.title(),
        page: page.slug(),
        pages: Page::ALL
            .iter()
            .map(|p| PageLink {
                slug: p.slug(),
                title: p.title(),
                active: *p == page,
            })
            .collect(),
        upload: upload.as_deref().map(|u| upload_view(&u.filename, &u.log.report)),
        charts,
        download: upload.as_ref().map(|_| page.download_filename()),
        error,
    };

    Ok(state.templates.render(DASHBOARD_TEMPLATE, &view)?)
}

fn upload_view<'a>(filename: &'a str, report: &'a IngestReport) -> UploadView<'a> {
    UploadView {
        filename,
        rows_read: report.rows_read,
        rows_loaded: report.rows_loaded(),
        rejected: &report.rejected,
        rejected_count: report.rejected.len(),
        missing_dates: report.missing_dates,
    }
}

fn page_charts(page: Page, log: &LoadedLog, settings: &ChartSettings) -> Result<Vec<RenderedChart>> {
    debug!("Rendering {} for {} records", page.title(), log.records.len());
    match page {
        Page::FuelAnalysis => fuel_charts(&FuelAnalysis::compute(&log.records), settings),
        Page::AdditionalAnalysis => {
            additional_charts(&AdditionalAnalysis::compute(&log.records), settings)
        }
    }
}

async fn download_fuel_analysis(State(state): State<Arc<AppState>>) -> Result<Response> {
    let upload = state.current_upload().ok_or(DashboardError::NoUpload)?;
    let bytes = fuel_analysis_xlsx(&FuelAnalysis::compute(&upload.log.records))?;
    info!("Exporting {} for {}", FUEL_ANALYSIS_FILENAME, upload.filename);
    Ok(xlsx_response(FUEL_ANALYSIS_FILENAME, bytes))
}

async fn download_date_summary(State(state): State<Arc<AppState>>) -> Result<Response> {
    let upload = state.current_upload().ok_or(DashboardError::NoUpload)?;
    let analysis = AdditionalAnalysis::compute(&upload.log.records);
    let bytes = date_summary_xlsx(&analysis.date_totals)?;
    info!("Exporting {} for {}", DATE_SUMMARY_FILENAME, upload.filename);
    Ok(xlsx_response(DATE_SUMMARY_FILENAME, bytes))
}

fn xlsx_response(filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        bytes,
    )
        .into_response()
}

async fn get_analysis(
    Query(query): Query<PageQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>> {
    let upload = state.current_upload().ok_or(DashboardError::NoUpload)?;
    let page = query.page();
    let records = &upload.log.records;

    let analysis = match page {
        Page::FuelAnalysis => serde_json::to_value(FuelAnalysis::compute(records)),
        Page::AdditionalAnalysis => serde_json::to_value(AdditionalAnalysis::compute(records)),
    }?;

    Ok(Json(serde_json::json!({
        "page": page.slug(),
        "file": upload.filename,
        "ingest": upload.log.report,
        "analysis": analysis,
    })))
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            DashboardError::NoUpload => StatusCode::NOT_FOUND,
            e if e.is_input_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("{}", self);
        }
        (status, self.to_string()).into_response()
    }
}
