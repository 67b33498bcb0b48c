use crate::data_structures::{reload_holdings, ReloadError, SharedData, SharedSettings};
use axum::{
    extract::{FromRef, Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use etfwatch::api::HoldingsQueryBuilder;
use etfwatch::error::HoldingsError;
use etfwatch::models::{
    ChangeSummary, HoldingRecord, MonthChangeReport, MonthKey, OverviewStats, StableHolding,
    STABLE_DISPLAY_LIMIT,
};
use etfwatch::utils::DEFAULT_TOP_HOLDINGS;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct AppState {
    pub data: SharedData,
    pub settings: SharedSettings,
}

impl FromRef<AppState> for SharedData {
    fn from_ref(app_state: &AppState) -> SharedData {
        app_state.data.clone()
    }
}

impl FromRef<AppState> for SharedSettings {
    fn from_ref(app_state: &AppState) -> SharedSettings {
        app_state.settings.clone()
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/months", get(get_months_handler))
        .route("/changes/{month}", get(get_month_changes_handler))
        .route("/holdings", get(get_holdings_handler))
        .route("/stocks", get(get_stocks_handler))
        .route("/stocks/{code}", get(get_stock_history_handler))
        .route("/overview", get(get_overview_handler))
        .route("/reload", post(reload_handler))
        .with_state(state)
}

/// Error response with a JSON `{"error": ..}` body
pub struct ApiError(StatusCode, String);

impl From<HoldingsError> for ApiError {
    fn from(e: HoldingsError) -> Self {
        let status = match &e {
            e if e.is_not_found() => StatusCode::NOT_FOUND,
            HoldingsError::InvalidMonth(_) | HoldingsError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, e.to_string())
    }
}

impl From<ReloadError> for ApiError {
    fn from(e: ReloadError) -> Self {
        ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

#[instrument(skip(state))]
pub async fn get_months_handler(State(state): State<SharedData>) -> Result<Response, ApiError> {
    debug!("Received request for month list");

    let analyzer = state.lock().await.analyzer.clone();
    let previews = tokio::task::spawn_blocking(move || analyzer.month_previews())
        .await
        .map_err(|e| ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    info!(month_count = previews.len(), "Returning month previews");
    Ok((StatusCode::OK, Json(json!({ "months": previews }))).into_response())
}

#[derive(Serialize)]
struct MonthChangesResponse<'a> {
    #[serde(flatten)]
    report: &'a MonthChangeReport,
    summary: ChangeSummary,
    top_stable: &'a [StableHolding],
    remaining_stable: usize,
}

#[instrument(skip(state))]
pub async fn get_month_changes_handler(
    State(state): State<SharedData>,
    Path(month): Path<String>,
) -> Result<Response, ApiError> {
    let month = MonthKey::parse(&month)?;

    let data = state.lock().await;
    let report = data.analyzer.analyze_month(&month)?;
    let (top_stable, remaining_stable) = report.top_stable(STABLE_DISPLAY_LIMIT);

    let summary = report.summary();
    info!(added = summary.added, removed = summary.removed, stable = summary.stable, "Returning month changes");
    Ok((
        StatusCode::OK,
        Json(MonthChangesResponse {
            report: &report,
            summary,
            top_stable,
            remaining_stable,
        }),
    )
        .into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct HoldingsParams {
    pub date: Option<String>,
    pub stock: Option<String>,
    pub min_weight: Option<f64>,
    pub sort: Option<String>,
    pub direction: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[instrument(skip(data_state, settings))]
pub async fn get_holdings_handler(
    State(data_state): State<SharedData>,
    State(settings): State<SharedSettings>,
    Query(params): Query<HoldingsParams>,
) -> Result<Response, ApiError> {
    let mut builder = HoldingsQueryBuilder::new()
        .with_page_size(params.page_size.unwrap_or(settings.page_size))
        .with_page(params.page.unwrap_or(1))
        .with_min_weight(params.min_weight.unwrap_or(0.0));

    if let Some(date) = params.date {
        builder = builder.with_date(date);
    }
    if let Some(stock) = params.stock {
        builder = builder.with_stock(stock);
    }
    builder = builder
        .with_sort_params(params.sort.as_deref(), params.direction.as_deref())
        .map_err(|e| ApiError(StatusCode::BAD_REQUEST, e))?;

    let data = data_state.lock().await;
    let page = data.analyzer.query_holdings(&builder.build());

    debug!(total_records = page.total_records, page = page.page, "Returning holdings page");
    Ok((StatusCode::OK, Json(page)).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct StockSearchParams {
    pub search: Option<String>,
}

#[derive(Serialize)]
struct StockOptionView {
    code: String,
    name: String,
    max_weight: f64,
    label: String,
}

#[instrument(skip(state))]
pub async fn get_stocks_handler(
    State(state): State<SharedData>,
    Query(params): Query<StockSearchParams>,
) -> impl IntoResponse {
    let data = state.lock().await;
    let options: Vec<StockOptionView> = data
        .analyzer
        .search_stocks(params.search.as_deref().unwrap_or(""))
        .into_iter()
        .map(|option| StockOptionView {
            label: option.label(),
            code: option.code,
            name: option.name,
            max_weight: option.max_weight,
        })
        .collect();

    debug!(option_count = options.len(), "Returning stock options");
    (StatusCode::OK, Json(json!({ "stocks": options })))
}

#[instrument(skip(state))]
pub async fn get_stock_history_handler(
    State(state): State<SharedData>,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let data = state.lock().await;
    let history = data.analyzer.stock_history(&code)?;

    debug!(rows = history.rows.len(), "Returning stock history");
    Ok((StatusCode::OK, Json(history)).into_response())
}

#[derive(Serialize)]
struct OverviewResponse {
    stats: OverviewStats,
    top_holdings: Vec<HoldingRecord>,
}

#[instrument(skip(state))]
pub async fn get_overview_handler(State(state): State<SharedData>) -> Result<Response, ApiError> {
    let data = state.lock().await;
    let stats = data.analyzer.overview()?;
    let top_holdings = data.analyzer.top_holdings(DEFAULT_TOP_HOLDINGS)?;

    Ok((StatusCode::OK, Json(OverviewResponse { stats, top_holdings })).into_response())
}

#[instrument(skip(data_state, settings))]
pub async fn reload_handler(
    State(data_state): State<SharedData>,
    State(settings): State<SharedSettings>,
) -> Result<Response, ApiError> {
    match reload_holdings(&data_state, settings.data_dir.clone()).await {
        Ok(status) => {
            info!(months = status.months.len(), records = status.records, "Reloaded holdings on request");
            Ok((StatusCode::OK, Json(status)).into_response())
        }
        Err(e) => {
            warn!(error = %e, "Reload failed, keeping previous dataset");
            Err(e.into())
        }
    }
}
