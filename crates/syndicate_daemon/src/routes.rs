use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use syndicate_content::{action_reaction_or_fallback, ProfileHints};
use syndicate_control::{
    draft_candidate, narrate_day, Briefing, Candidate, ControlError, OrderReceipt,
};
use syndicate_core::views::{RosterEntry, RosterStats, SectorView};
use syndicate_core::{
    is_resolving, Action, CharacterId, GameError, NewsItem, SectorId, SettlementReport,
};
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::{AppState, GameDesk};

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, HeaderValue::from_static("http://localhost:5173"))
}

pub fn make_router_with_cors(state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/meta", get(meta_handler))
        .route("/api/v1/snapshot", get(snapshot_handler))
        .route("/api/v1/stats", get(stats_handler))
        .route("/api/v1/roster", get(roster_handler))
        .route("/api/v1/map", get(map_handler))
        .route("/api/v1/news", get(news_handler))
        .route("/api/v1/stream", get(stream_handler))
        .route("/api/v1/recruit/draft", post(draft_handler))
        .route("/api/v1/recruit/confirm", post(confirm_handler))
        .route("/api/v1/recruit/cancel", post(cancel_recruit_handler))
        .route("/api/v1/briefing/:id", post(briefing_handler))
        .route("/api/v1/orders", post(order_handler))
        .route("/api/v1/sector", post(sector_handler))
        .route("/api/v1/sector/cancel", post(cancel_sector_handler))
        .route("/api/v1/end-day", post(end_day_handler))
        .route("/api/v1/report/dismiss", post(dismiss_handler))
        .route("/api/v1/save", post(save_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        let status = match &err {
            ControlError::Game(GameError::InsufficientFunds { .. }) => StatusCode::PAYMENT_REQUIRED,
            ControlError::Game(GameError::UnknownCharacter(_) | GameError::UnknownSector(_)) => {
                StatusCode::NOT_FOUND
            }
            ControlError::Game(_) | ControlError::StaleDay { .. } => StatusCode::CONFLICT,
            ControlError::Portrait(_) => StatusCode::BAD_GATEWAY,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

pub async fn meta_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let desk = app_state.desk.lock();
    let game = desk.session.state();
    Json(serde_json::json!({
        "day": game.day,
        "seed": game.meta.seed,
        "session_id": game.meta.session_id,
        "schema_version": game.meta.schema_version,
        "phase": game.phase,
    }))
}

pub async fn snapshot_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    let desk = app_state.desk.lock();
    match serde_json::to_string(desk.session.state()) {
        Ok(json) => {
            drop(desk);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                json,
            )
        }
        Err(err) => {
            drop(desk);
            tracing::error!("snapshot serialization failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "application/json")],
                r#"{"error":"serialization failed"}"#.to_string(),
            )
        }
    }
}

pub async fn stats_handler(State(app_state): State<AppState>) -> Json<RosterStats> {
    Json(app_state.desk.lock().session.stats())
}

pub async fn roster_handler(State(app_state): State<AppState>) -> Json<Vec<RosterEntry>> {
    Json(app_state.desk.lock().session.roster())
}

pub async fn map_handler(State(app_state): State<AppState>) -> Json<Vec<SectorView>> {
    Json(app_state.desk.lock().session.sector_views())
}

pub async fn news_handler(State(app_state): State<AppState>) -> Json<Vec<NewsItem>> {
    Json(app_state.desk.lock().session.news().to_vec())
}

// ---------------------------------------------------------------------------
// Recruitment
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct DraftResponse {
    pub candidate: Candidate,
    pub cost: i64,
}

pub async fn draft_handler(
    State(app_state): State<AppState>,
    Json(hints): Json<ProfileHints>,
) -> ApiResult<DraftResponse> {
    let cost = app_state.desk.lock().session.check_can_recruit()?;
    let candidate = draft_candidate(app_state.provider.as_ref(), &hints).await?;
    app_state.desk.lock().draft = Some(candidate.clone());
    Ok(Json(DraftResponse { candidate, cost }))
}

pub async fn confirm_handler(State(app_state): State<AppState>) -> ApiResult<serde_json::Value> {
    let mut desk = app_state.desk.lock();
    let GameDesk {
        session,
        rng,
        draft,
    } = &mut *desk;
    let Some(candidate) = draft.take() else {
        return Err(ApiError::new(StatusCode::CONFLICT, "no candidate drafted"));
    };
    match session.confirm_recruit(candidate.clone(), rng) {
        Ok(id) => Ok(Json(serde_json::json!({ "id": id, "stats": session.stats() }))),
        Err(err) => {
            *draft = Some(candidate);
            Err(err.into())
        }
    }
}

pub async fn cancel_recruit_handler(State(app_state): State<AppState>) -> ApiResult<RosterStats> {
    let mut desk = app_state.desk.lock();
    desk.draft = None;
    desk.session.cancel_recruit()?;
    Ok(Json(desk.session.stats()))
}

// ---------------------------------------------------------------------------
// Briefings and orders
// ---------------------------------------------------------------------------

pub async fn briefing_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Briefing> {
    let briefing = app_state
        .desk
        .lock()
        .session
        .open_briefing(&CharacterId(id))?;
    Ok(Json(briefing))
}

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub character: CharacterId,
    pub action: Action,
}

pub async fn order_handler(
    State(app_state): State<AppState>,
    Json(request): Json<OrderRequest>,
) -> ApiResult<OrderReceipt> {
    let sketch = app_state
        .desk
        .lock()
        .session
        .order_sketch(&request.character)?;
    let reaction =
        action_reaction_or_fallback(app_state.provider.as_ref(), &sketch, request.action).await;
    let awaiting_sector = app_state
        .desk
        .lock()
        .session
        .apply_order(&request.character, request.action)?;
    Ok(Json(OrderReceipt {
        reaction,
        awaiting_sector,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SectorRequest {
    pub sector: SectorId,
}

pub async fn sector_handler(
    State(app_state): State<AppState>,
    Json(request): Json<SectorRequest>,
) -> ApiResult<serde_json::Value> {
    let mut desk = app_state.desk.lock();
    desk.session.select_sector(request.sector)?;
    Ok(Json(
        serde_json::json!({ "can_end_day": desk.session.can_end_day() }),
    ))
}

pub async fn cancel_sector_handler(State(app_state): State<AppState>) -> ApiResult<RosterStats> {
    let mut desk = app_state.desk.lock();
    desk.session.cancel_sector_selection()?;
    Ok(Json(desk.session.stats()))
}

// ---------------------------------------------------------------------------
// End of day
// ---------------------------------------------------------------------------

/// The desk stays in `EndOfDay` while the provider works, so every other
/// command is refused until the commit.
///
/// Narration and commit run on their own task: a client that hangs up
/// mid-request does not strand the desk between `begin_day` and `commit_day`.
pub async fn end_day_handler(State(app_state): State<AppState>) -> ApiResult<SettlementReport> {
    let (pending, timeout) = {
        let mut desk = app_state.desk.lock();
        let GameDesk { session, rng, .. } = &mut *desk;
        (session.begin_day(rng)?, session.content_timeout())
    };

    let day = pending.day();
    let task = tokio::spawn(async move {
        let narration = narrate_day(Arc::clone(&app_state.provider), &pending, timeout).await;
        let headlines = pending.outcome().news();
        let report = app_state
            .desk
            .lock()
            .session
            .commit_day(pending, narration)?;
        if !headlines.is_empty() {
            // No subscribers is fine.
            let _ = app_state.news_tx.send(headlines);
        }
        Ok::<_, ControlError>(report)
    });

    let report = task.await.map_err(|err| {
        tracing::error!(day, "end-of-day task failed: {err}");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "end-of-day task failed")
    })??;
    Ok(Json(report))
}

pub async fn dismiss_handler(State(app_state): State<AppState>) -> ApiResult<RosterStats> {
    let mut desk = app_state.desk.lock();
    desk.session.dismiss_report()?;
    Ok(Json(desk.session.stats()))
}

pub async fn save_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, Json<serde_json::Value>) {
    let state = app_state.desk.lock().session.state().clone();
    if is_resolving(&state) {
        return (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": format!("day {} is still being resolved", state.day)})),
        );
    }
    match syndicate_world::save_state(&app_state.save_dir, &state) {
        Ok(path) => (
            StatusCode::OK,
            Json(serde_json::json!({"path": path.display().to_string(), "day": state.day})),
        ),
        Err(err) => {
            tracing::error!("save failed: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("{err:#}")})),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Stream
// ---------------------------------------------------------------------------

/// Each settled day's headlines as one event, plus a heartbeat with the
/// current day and phase.
pub async fn stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.news_tx.subscribe();
    let desk = Arc::clone(&app_state.desk);

    let stream = async_stream::stream! {
        let mut heartbeat = tokio::time::interval(Duration::from_secs(5));
        heartbeat.tick().await; // discard the immediate first tick
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(items) => {
                            let data = serde_json::to_string(&items).unwrap_or_default();
                            yield Ok(Event::default().event("news").data(data));
                        }
                        Err(broadcast::error::RecvError::Lagged(_)) => {}
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = heartbeat.tick() => {
                    let (day, phase) = {
                        let desk = desk.lock();
                        (desk.session.state().day, desk.session.state().phase)
                    };
                    let hb = serde_json::json!({"heartbeat": true, "day": day, "phase": phase});
                    yield Ok(Event::default().data(hb.to_string()));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}
