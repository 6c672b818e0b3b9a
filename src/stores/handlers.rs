use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    domain::{NewStore, Role, StoreFilter},
    error::ApiError,
    state::AppState,
};

use super::dto::{CreateStoreRequest, CreatedStore, StoreListItem};

pub fn store_routes() -> Router<AppState> {
    Router::new().route("/stores", get(list_stores).post(create_store))
}

#[instrument(skip(state))]
pub async fn list_stores(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Query(filter): Query<StoreFilter>,
) -> Result<Json<Vec<StoreListItem>>, ApiError> {
    // Any authenticated role may browse stores. Averages and the caller's
    // own ratings come from one snapshot.
    let items = state
        .db
        .list_stores_for(identity.id, &filter)
        .into_iter()
        .map(|l| StoreListItem {
            id: l.store.id,
            name: l.store.name,
            email: l.store.email,
            address: l.store.address,
            rating: l.average,
            user_rating: l.viewer_rating,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn create_store(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<CreatedStore>), ApiError> {
    identity.require_role(&[Role::Admin])?;

    let store = state.db.create_store(NewStore {
        name: payload.name,
        email: payload.email,
        address: payload.address,
    })?;

    info!(store_id = store.id, "store created by admin");
    Ok((
        StatusCode::CREATED,
        Json(CreatedStore {
            id: store.id,
            name: store.name,
            email: store.email,
            address: store.address,
            owner_id: store.owner_id,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::Identity;

    fn identity(id: u64, role: Role) -> Identity {
        Identity {
            id,
            email: format!("user{id}@example.com"),
            role,
        }
    }

    #[tokio::test]
    async fn create_store_is_admin_only() {
        let state = AppState::fake();
        let err = create_store(
            State(state),
            AuthUser(identity(3, Role::Normal)),
            Json(CreateStoreRequest {
                name: "Fresh Grocery".into(),
                email: "fresh@example.com".into(),
                address: "456 Store Avenue".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InsufficientPermission));
    }

    #[tokio::test]
    async fn created_store_starts_unassigned() {
        let state = AppState::fake();
        let (status, Json(store)) = create_store(
            State(state),
            AuthUser(identity(1, Role::Admin)),
            Json(CreateStoreRequest {
                name: "Fresh Grocery".into(),
                email: "fresh@example.com".into(),
                address: "456 Store Avenue".into(),
            }),
        )
        .await
        .expect("create");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(store.owner_id, None);
    }

    #[tokio::test]
    async fn list_is_personalized_per_viewer() {
        let state = AppState::fake();
        let store = state
            .db
            .create_store(NewStore {
                name: "Fresh Grocery".into(),
                email: "fresh@example.com".into(),
                address: "456 Store Avenue".into(),
            })
            .expect("store");
        state.db.upsert_rating(10, store.id, 2).expect("rating");
        state.db.upsert_rating(11, store.id, 4).expect("rating");

        let Json(for_first) = list_stores(
            State(state.clone()),
            AuthUser(identity(10, Role::Normal)),
            Query(StoreFilter::default()),
        )
        .await
        .expect("list");
        let Json(for_second) = list_stores(
            State(state),
            AuthUser(identity(11, Role::Normal)),
            Query(StoreFilter::default()),
        )
        .await
        .expect("list");

        // Shared average, per-caller own rating.
        assert_eq!(for_first[0].rating, 3.0);
        assert_eq!(for_second[0].rating, 3.0);
        assert_eq!(for_first[0].user_rating, Some(2));
        assert_eq!(for_second[0].user_rating, Some(4));
    }

    #[tokio::test]
    async fn unrated_viewer_sees_null_user_rating() {
        let state = AppState::fake();
        state
            .db
            .create_store(NewStore {
                name: "Electronics Hub".into(),
                email: "hub@example.com".into(),
                address: "321 Tech Boulevard".into(),
            })
            .expect("store");

        let Json(items) = list_stores(
            State(state),
            AuthUser(identity(99, Role::StoreOwner)),
            Query(StoreFilter::default()),
        )
        .await
        .expect("list");
        assert_eq!(items[0].rating, 0.0);
        assert_eq!(items[0].user_rating, None);
    }
}
