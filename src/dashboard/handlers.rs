use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{auth::jwt::AuthUser, domain::Role, error::ApiError, state::AppState};

use super::dto::{DashboardStats, RaterInfo, StoreRatingEntry, StoreRatingsResponse};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard/stats", get(stats))
        .route("/dashboard/store-ratings", get(store_ratings))
}

#[instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<DashboardStats>, ApiError> {
    identity.require_role(&[Role::Admin])?;

    let (total_users, total_stores, total_ratings) = state.db.stats();
    Ok(Json(DashboardStats {
        total_users,
        total_stores,
        total_ratings,
    }))
}

#[instrument(skip(state))]
pub async fn store_ratings(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<StoreRatingsResponse>, ApiError> {
    identity.require_role(&[Role::StoreOwner])?;

    // The owner's store is resolved through the back-reference, not a claim;
    // the whole join happens in one snapshot so the average always matches
    // the listed rows.
    let dashboard = state
        .db
        .store_dashboard(identity.id)?
        .ok_or(ApiError::NotFound("Store"))?;

    let ratings = dashboard
        .ratings
        .into_iter()
        .map(|(r, rater)| StoreRatingEntry {
            id: r.id,
            rating: r.value,
            created_at: r.created_at,
            user: RaterInfo {
                name: rater.name,
                email: rater.email,
            },
        })
        .collect();

    Ok(Json(StoreRatingsResponse {
        average_rating: dashboard.average,
        ratings,
    }))
}
