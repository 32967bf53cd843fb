//! HTTP routes over the ranking core
//!
//! Weight changes go through a single `RwLock<WeightStore>`; each change
//! takes a render ticket while still holding the lock, so ticket order always
//! matches weight order.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use flag_lookup::{render_lists, FlagClient, FlagResolver, FlaggedLists, RenderBoard, RenderTicket};
use geojson::FeatureCollection;
use nation_ranker::choropleth::{bind_geometry, to_geojson, MapSeries};
use nation_ranker::{
    compute_ranking, score_breakdown, ColorScale, CountryRecord, DisplayConfig, ListSize, Metric,
    RankerError, Ranking, Rgb, ScoreBreakdown, ValueRange, WeightControl, WeightStore,
    WeightVector,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<Vec<CountryRecord>>,
    pub weights: Arc<RwLock<WeightStore>>,
    pub board: Arc<RenderBoard>,
    pub resolver: Arc<FlagResolver<FlagClient>>,
    pub geometry: Option<Arc<FeatureCollection>>,
    pub display: DisplayConfig,
    pub scale: ColorScale,
    pub name_property: String,
}

impl AppState {
    pub fn new(
        records: Vec<CountryRecord>,
        resolver: FlagResolver<FlagClient>,
        display: DisplayConfig,
        name_property: String,
    ) -> Self {
        Self {
            records: Arc::new(records),
            weights: Arc::new(RwLock::new(WeightStore::new())),
            board: Arc::new(RenderBoard::new()),
            resolver: Arc::new(resolver),
            geometry: None,
            display,
            scale: ColorScale::default(),
            name_property,
        }
    }

    pub fn with_geometry(mut self, geometry: FeatureCollection) -> Self {
        self.geometry = Some(Arc::new(geometry));
        self
    }

    /// Fresh ranking under the current weights
    pub async fn ranking(&self) -> Ranking {
        let weights = self.weights.read().await.all_weights();
        compute_ranking(&self.records, &weights)
    }

    /// Rebuild the flagged lists for `weights` in the background
    pub fn spawn_render(&self, ticket: RenderTicket, weights: WeightVector) {
        let state = self.clone();
        tokio::spawn(async move {
            let ranking = compute_ranking(&state.records, &weights);
            let lists = state.display.lists(&ranking);
            if !render_lists(&state.board, ticket, &lists, &state.resolver).await {
                debug!("Render {} superseded", ticket.generation());
            }
        });
    }

    /// Kick off the first render for the starting weights
    pub async fn render_initial(&self) -> RenderTicket {
        let store = self.weights.read().await;
        let ticket = self.board.begin();
        self.spawn_render(ticket, store.all_weights());
        ticket
    }
}

/// JSON error body with a status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<RankerError> for ApiError {
    fn from(err: RankerError) -> Self {
        let status = match &err {
            RankerError::UnknownMetric(_) => StatusCode::NOT_FOUND,
            RankerError::OutOfRange { .. }
            | RankerError::MissingMetric(_)
            | RankerError::InvalidColor(_)
            | RankerError::EmptyColorScale => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

// ========== Request/Response Types ==========

#[derive(Serialize, Deserialize)]
pub struct WeightsResponse {
    pub weights: BTreeMap<Metric, f64>,
    pub generation: u64,
}

#[derive(Deserialize)]
pub struct SetWeightRequest {
    pub weight: f64,
}

#[derive(Serialize, Deserialize)]
pub struct WeightUpdate {
    pub metric: Metric,
    pub weight: f64,
    pub label: String,
    pub generation: u64,
}

#[derive(Deserialize)]
pub struct RankingQuery {
    /// "all" or a count; the configured list size when absent
    pub limit: Option<String>,
}

#[derive(Serialize)]
pub struct RankingResponse {
    pub total: usize,
    pub range: ValueRange,
    pub entries: Vec<serde_json::Value>,
}

#[derive(Serialize)]
pub struct ListsResponse {
    /// Generation of the newest render started
    pub generation: u64,
    /// Last completed render, may lag `generation`
    pub published: Option<FlaggedLists>,
}

#[derive(Serialize)]
pub struct MapResponse {
    pub series: MapSeries,
    pub stops: Vec<Rgb>,
    pub geojson: Option<serde_json::Value>,
}

// ========== Route Handlers ==========

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "nation-gateway",
        "records": state.records.len(),
        "geometry": state.geometry.is_some(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// One control descriptor per metric
pub async fn list_metrics(State(state): State<AppState>) -> Json<Vec<WeightControl>> {
    Json(state.weights.read().await.controls())
}

pub async fn get_weights(State(state): State<AppState>) -> Json<WeightsResponse> {
    let weights = state.weights.read().await.all_weights();
    Json(WeightsResponse {
        weights: weights.to_named(),
        generation: state.board.current_generation(),
    })
}

/// Set one weight and start a new render
pub async fn set_weight(
    State(state): State<AppState>,
    Path(metric): Path<String>,
    Json(req): Json<SetWeightRequest>,
) -> Result<Json<WeightUpdate>, ApiError> {
    let (metric, weights, ticket) = {
        let mut store = state.weights.write().await;
        let metric = store.set_named(&metric, req.weight)?;
        (metric, store.all_weights(), state.board.begin())
    };

    info!("Weight {} = {:.2} (render {})", metric, req.weight, ticket.generation());
    state.spawn_render(ticket, weights);

    Ok(Json(WeightUpdate {
        metric,
        weight: weights.get(metric),
        label: nation_ranker::weights::control_label(metric, weights.get(metric)),
        generation: ticket.generation(),
    }))
}

/// Restore default weights and start a new render
pub async fn reset_weights(State(state): State<AppState>) -> Json<WeightsResponse> {
    let (weights, ticket) = {
        let mut store = state.weights.write().await;
        store.reset();
        (store.all_weights(), state.board.begin())
    };

    info!("Weights reset (render {})", ticket.generation());
    state.spawn_render(ticket, weights);

    Json(WeightsResponse {
        weights: weights.to_named(),
        generation: ticket.generation(),
    })
}

pub async fn get_ranking(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<RankingResponse>, ApiError> {
    let limit = match query.limit {
        Some(raw) => raw
            .parse::<ListSize>()
            .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e))?,
        None => state.display.list_size,
    };

    let ranking = state.ranking().await;
    let n = limit.resolve(ranking.len());

    Ok(Json(RankingResponse {
        total: ranking.len(),
        range: ranking.value_range(),
        entries: ranking
            .top(n)
            .iter()
            .map(|nation| state.display.entry_json(nation))
            .collect(),
    }))
}

/// Breakdown of every record carrying `name`
pub async fn get_breakdown(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ScoreBreakdown>>, ApiError> {
    let weights = state.weights.read().await.all_weights();

    let breakdowns: Vec<_> = state
        .records
        .iter()
        .filter(|r| r.nation_name() == Some(name.as_str()))
        .map(|r| score_breakdown(r, &weights))
        .collect();

    if breakdowns.is_empty() {
        return Err(ApiError::new(
            StatusCode::NOT_FOUND,
            format!("Nation {} not found", name),
        ));
    }
    Ok(Json(breakdowns))
}

pub async fn get_lists(State(state): State<AppState>) -> Json<ListsResponse> {
    Json(ListsResponse {
        generation: state.board.current_generation(),
        published: state.board.latest().await,
    })
}

pub async fn get_map(State(state): State<AppState>) -> Json<MapResponse> {
    let series = MapSeries::from_ranking(&state.ranking().await);

    let geojson = state.geometry.as_ref().map(|geometry| {
        let bound = bind_geometry(geometry, &series, &state.scale, &state.name_property);
        to_geojson(&bound, &series, &state.scale)
    });

    Json(MapResponse {
        stops: state.scale.stops().to_vec(),
        series,
        geojson,
    })
}

// ========== Router ==========

pub fn api_routes(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/metrics", get(list_metrics))
        .route("/weights", get(get_weights))
        .route("/weights/reset", post(reset_weights))
        .route("/weights/:metric", put(set_weight))
        .route("/ranking", get(get_ranking))
        .route("/ranking/:name", get(get_breakdown))
        .route("/lists", get(get_lists))
        .route("/map", get(get_map));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", v1)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
