use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use encart_core::Record;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchInput {
    #[serde(default)]
    pub query: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/search", get(search_records))
        .route("/v1/search/input", post(search_input))
        .route("/v1/search/events", get(search_events))
        .route("/v1/records/{id}", get(get_record))
}

async fn search_records(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Response, AppError> {
    match state.coordinator.search(&params.q).await? {
        Some(records) => Ok(Json(json!({
            "query": params.q.trim(),
            "count": records.len(),
            "records": records,
        }))
        .into_response()),
        // Someone else is fetching this query; the client polls again.
        None => Ok((StatusCode::ACCEPTED, Json(json!({ "status": "pending" }))).into_response()),
    }
}

async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, AppError> {
    state
        .caches
        .entity(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Record {} not in cache", id)))
}

/// Keystroke feed for the debounced search. Results arrive on `/v1/search/events`.
async fn search_input(
    State(state): State<AppState>,
    Json(input): Json<SearchInput>,
) -> (StatusCode, Json<serde_json::Value>) {
    let accepted = state.debouncer.handle(&input.query);
    (StatusCode::ACCEPTED, Json(json!({ "accepted": accepted })))
}

async fn search_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.debouncer.subscribe()).filter_map(|result| match result {
        Ok(event) => match Event::default().event("search").json_data(&event) {
            Ok(sse) => Some(Ok(sse)),
            Err(e) => {
                warn!("Failed to encode search event: {}", e);
                None
            }
        },
        // Lagged receiver: skip what was missed.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
