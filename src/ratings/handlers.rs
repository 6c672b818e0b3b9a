use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument};

use crate::{auth::jwt::AuthUser, domain::Role, error::ApiError, state::AppState};

use super::dto::{MessageResponse, SubmitRatingRequest};

pub fn rating_routes() -> Router<AppState> {
    Router::new().route("/ratings", post(submit_rating))
}

/// Rating submission and update share one operation; the caller's id is
/// always the rating's user id.
#[instrument(skip(state))]
pub async fn submit_rating(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<SubmitRatingRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    identity.require_role(&[Role::Normal])?;

    state
        .db
        .upsert_rating(identity.id, payload.store_id, payload.rating)?;

    info!(
        user_id = identity.id,
        store_id = payload.store_id,
        value = payload.rating,
        "rating submitted"
    );
    Ok(Json(MessageResponse {
        message: "Rating submitted successfully".to_string(),
    }))
}
