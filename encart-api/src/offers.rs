use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use encart_catalog::{Money, Publication, PublicationSelection};
use encart_core::Record;
use encart_offer::{ClientProfile, Offer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// Qualification action under which profiles are cached.
const PROFILE_ACTION: &str = "profile";

#[derive(Debug, Deserialize)]
pub struct ComputeOffersRequest {
    pub record: serde_json::Value,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub current_selection_count: usize,
}

#[derive(Debug, Serialize)]
pub struct ComputeOffersResponse {
    pub profile: ClientProfile,
    pub offers: Vec<Offer>,
}

#[derive(Debug, Deserialize)]
pub struct PublicationInput {
    pub month: String,
    pub format: String,
    pub price: Money,
}

#[derive(Debug, Deserialize)]
pub struct PublicationTotalRequest {
    pub publications: Vec<PublicationInput>,
}

#[derive(Debug, Serialize)]
pub struct PublicationTotalResponse {
    pub count: usize,
    pub total: Money,
    pub publications: Vec<Publication>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/clients/profile", post(profile_client))
        .route("/v1/offers", post(compute_offers))
        .route("/v1/offers/{id}", get(get_offer))
        .route("/v1/publications/total", post(publication_total))
}

/// Classify the record as posted and refresh its cached qualification.
///
/// Always recomputed: the same id may arrive with different notes or dates.
fn profile_for(state: &AppState, record: &Record) -> Result<ClientProfile, AppError> {
    let profile = state.profiler.classify(record);
    state
        .caches
        .remember_qualification(&record.id, PROFILE_ACTION, serde_json::to_value(&profile)?);
    Ok(profile)
}

async fn profile_client(
    State(state): State<AppState>,
    Json(raw): Json<serde_json::Value>,
) -> Result<Json<ClientProfile>, AppError> {
    let record = Record::from_value(&raw)?;
    Ok(Json(profile_for(&state, &record)?))
}

async fn compute_offers(
    State(state): State<AppState>,
    Json(req): Json<ComputeOffersRequest>,
) -> Result<Json<ComputeOffersResponse>, AppError> {
    let record = Record::from_value(&req.record)?;
    let profile = profile_for(&state, &record)?;
    let format = state.generator.catalog().resolve(&req.format);

    let offers = state
        .generator
        .compute_offers(&profile, format, req.current_selection_count);
    state.history.write().await.record(&offers);

    info!("Returned {} offers for record {}", offers.len(), record.id);
    Ok(Json(ComputeOffersResponse { profile, offers }))
}

async fn get_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Offer>, AppError> {
    let now = state.clock.now();
    let history = state.history.read().await;
    let offer = history.get_valid(id, now)?;
    Ok(Json(offer.clone()))
}

async fn publication_total(
    State(state): State<AppState>,
    Json(req): Json<PublicationTotalRequest>,
) -> Result<Json<PublicationTotalResponse>, AppError> {
    let mut selection = PublicationSelection::new();
    for input in &req.publications {
        let publication = Publication::from_labels(&input.month, &input.format, input.price)?;
        if let Some(replaced) = selection.add(publication) {
            debug!("Replaced {} publication in selection", replaced.month);
        }
    }

    let total = state.generator.catalog().total_price(selection.publications());
    info!("Selection of {} publications totals {}", selection.len(), total);

    Ok(Json(PublicationTotalResponse {
        count: selection.len(),
        total,
        publications: selection.publications().to_vec(),
    }))
}
