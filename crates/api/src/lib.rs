use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use screener_core::domain::ScreenedStock;
use screener_core::ingest::types::SearchHit;
use screener_core::ingest::{normalize_ticker, CompanyDataSource};
use screener_core::render::{pane_html, render_dashboard, sidebar_html, tab_html, DashboardMode};
use screener_core::screen::screen_ticker;
use screener_core::watchlist::Section;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn CompanyDataSource>,
    pub session: Arc<RwLock<Vec<ScreenedStock>>>,
    pub sections: Arc<Vec<Section>>,
    pub consolidated: bool,
}

impl AppState {
    pub fn new(source: Arc<dyn CompanyDataSource>, stocks: Vec<ScreenedStock>) -> Self {
        Self {
            source,
            session: Arc::new(RwLock::new(stocks)),
            sections: Arc::new(Vec::new()),
            consolidated: true,
        }
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = Arc::new(sections);
        self
    }

    pub fn with_consolidated(mut self, consolidated: bool) -> Self {
        self.consolidated = consolidated;
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/ping", get(ping))
        .route("/api/search", get(search))
        .route("/api/tickers", get(list_tickers))
        .route("/api/tickers/:ticker", post(add_ticker).delete(remove_ticker))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let preloaded = state.session.read().await.len();
    tracing::info!(%addr, preloaded, "dashboard server listening");
    println!("Dashboard running at http://{addr}  (ctrl-c to stop)");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("dashboard server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let session = state.session.read().await;
    Html(render_dashboard(&session, &state.sections, DashboardMode::Server))
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Ping {
    pub ok: bool,
}

async fn ping() -> Json<Ping> {
    Json(Ping { ok: true })
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchResponse> {
    match state.source.search(params.q.trim()).await {
        Ok(results) => Json(SearchResponse {
            results,
            error: None,
        }),
        Err(e) => {
            tracing::warn!(query = %params.q, error = %e, "search failed");
            Json(SearchResponse {
                results: Vec::new(),
                error: Some(format!("{e:#}")),
            })
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TickerList {
    pub tickers: Vec<String>,
}

async fn list_tickers(State(state): State<AppState>) -> Json<TickerList> {
    let session = state.session.read().await;
    Json(TickerList {
        tickers: session.iter().map(|s| s.ticker().to_string()).collect(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddedTicker {
    pub ticker: String,
    pub name: String,
    pub price: Option<f64>,
    pub grade: String,
    pub grade_color: String,
    pub tab_html: String,
    pub pane_html: String,
}

impl AddedTicker {
    fn from_stock(stock: &ScreenedStock) -> Self {
        let grade = stock.analysis.scorecard.grade;
        Self {
            ticker: stock.ticker().to_string(),
            name: stock.record.display_name().to_string(),
            price: stock.analysis.key_metrics.current_price,
            grade: grade.as_str().to_string(),
            grade_color: grade.color().to_string(),
            tab_html: tab_html(stock, true),
            pane_html: pane_html(stock, true),
        }
    }
}

async fn add_ticker(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<AddedTicker>, ApiError> {
    let ticker = normalize_ticker(&raw).map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let stock = screen_ticker(state.source.as_ref(), &ticker, state.consolidated)
        .await
        .map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(%ticker, error = %format!("{e:#}"), "fetch failed");
            api_error(StatusCode::BAD_GATEWAY, format!("{e:#}"))
        })?;
    let body = AddedTicker::from_stock(&stock);

    let mut session = state.session.write().await;
    match session.iter().position(|s| s.ticker() == stock.ticker()) {
        Some(idx) => session[idx] = stock,
        None => session.push(stock),
    }
    tracing::info!(ticker = %body.ticker, grade = %body.grade, size = session.len(), "session updated");

    Ok(Json(body))
}

async fn remove_ticker(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Html<String>, ApiError> {
    let ticker = normalize_ticker(&raw).map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let mut session = state.session.write().await;
    let idx = session
        .iter()
        .position(|s| s.ticker() == ticker)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("{ticker} is not in the session")))?;
    session.remove(idx);
    tracing::info!(%ticker, size = session.len(), "removed from session");

    Ok(Html(sidebar_html(&session, &state.sections)))
}
