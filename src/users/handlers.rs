use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::jwt::AuthUser,
    domain::{NewUser, Role, UserFilter},
    error::ApiError,
    state::AppState,
};

use super::dto::{
    ChangePasswordRequest, CreateUserRequest, CreatedUser, MessageResponse, UserListItem,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id/password", put(change_password))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Vec<UserListItem>>, ApiError> {
    identity.require_role(&[Role::Admin])?;

    // Rows and rating annotations come from one snapshot.
    let items = state
        .db
        .list_users_annotated(&filter)
        .into_iter()
        // Other admins stay hidden; the caller still sees their own record.
        .filter(|(u, _)| u.role != Role::Admin || u.id == identity.id)
        .map(|(u, rating)| UserListItem {
            id: u.id,
            name: u.name,
            email: u.email,
            address: u.address,
            role: u.role,
            rating,
        })
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<CreatedUser>), ApiError> {
    identity.require_role(&[Role::Admin])?;

    let user = state.db.create_user(NewUser {
        name: payload.name,
        email: payload.email,
        password: payload.password,
        address: payload.address,
        role: payload.role.unwrap_or(Role::Normal),
    })?;

    info!(user_id = user.id, role = ?user.role, "user created by admin");
    Ok((
        StatusCode::CREATED,
        Json(CreatedUser {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            role: user.role,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<u64>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    // Identity-scoped: the target must be the caller, whatever their role.
    if id != identity.id {
        warn!(
            caller = identity.id,
            target = id,
            "cross-identity password change rejected"
        );
        return Err(ApiError::Forbidden("Can only update own password"));
    }

    state.db.update_password(id, &payload.password)?;
    info!(user_id = id, "password updated");
    Ok(Json(MessageResponse {
        message: "Password updated successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::Identity;
    use crate::domain::Database;

    fn identity(id: u64, role: Role) -> Identity {
        Identity {
            id,
            email: format!("user{id}@example.com"),
            role,
        }
    }

    fn seed(db: &Database, name: &str, email: &str, role: Role) -> u64 {
        db.create_user(NewUser {
            name: name.into(),
            email: email.into(),
            password: "Passw0rd!".into(),
            address: "Somewhere 1".into(),
            role,
        })
        .expect("seed user")
        .id
    }

    #[tokio::test]
    async fn list_users_is_admin_only() {
        let state = AppState::fake();
        let err = list_users(
            State(state),
            AuthUser(identity(1, Role::Normal)),
            Query(UserFilter::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InsufficientPermission));
    }

    #[tokio::test]
    async fn list_users_hides_other_admins() {
        let state = AppState::fake();
        let me = seed(&state.db, "Admin Person", "admin1@example.com", Role::Admin);
        seed(&state.db, "Other Admin", "admin2@example.com", Role::Admin);
        seed(&state.db, "Normal User", "user@example.com", Role::Normal);

        let Json(items) = list_users(
            State(state),
            AuthUser(identity(me, Role::Admin)),
            Query(UserFilter::default()),
        )
        .await
        .expect("list");

        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| i.id == me));
        assert!(!items.iter().any(|i| i.email == "admin2@example.com"));
    }

    #[tokio::test]
    async fn list_users_annotates_store_owner_rating() {
        let state = AppState::fake();
        let admin = seed(&state.db, "Admin Person", "admin@example.com", Role::Admin);
        // Owner without an assigned store reads as 0, others as null.
        seed(&state.db, "Shop Keeper", "owner@example.com", Role::StoreOwner);
        seed(&state.db, "Normal User", "user@example.com", Role::Normal);

        let Json(items) = list_users(
            State(state),
            AuthUser(identity(admin, Role::Admin)),
            Query(UserFilter::default()),
        )
        .await
        .expect("list");

        let owner = items
            .iter()
            .find(|i| i.role == Role::StoreOwner)
            .expect("owner listed");
        assert_eq!(owner.rating, Some(0.0));
        let normal = items
            .iter()
            .find(|i| i.role == Role::Normal)
            .expect("normal listed");
        assert_eq!(normal.rating, None);
    }

    #[tokio::test]
    async fn create_user_accepts_explicit_role() {
        let state = AppState::fake();
        let admin = seed(&state.db, "Admin Person", "admin@example.com", Role::Admin);

        let (status, Json(created)) = create_user(
            State(state),
            AuthUser(identity(admin, Role::Admin)),
            Json(CreateUserRequest {
                name: "Shop Keeper".into(),
                email: "owner@example.com".into(),
                password: "Passw0rd!".into(),
                address: "1 Shop Lane".into(),
                role: Some(Role::StoreOwner),
            }),
        )
        .await
        .expect("create");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.role, Role::StoreOwner);
    }

    #[tokio::test]
    async fn change_password_is_self_only() {
        let state = AppState::fake();
        let me = seed(&state.db, "Normal User", "user@example.com", Role::Normal);

        let err = change_password(
            State(state.clone()),
            AuthUser(identity(me, Role::Normal)),
            Path(me + 1),
            Json(ChangePasswordRequest {
                password: "NewPass1!".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        change_password(
            State(state),
            AuthUser(identity(me, Role::Normal)),
            Path(me),
            Json(ChangePasswordRequest {
                password: "NewPass1!".into(),
            }),
        )
        .await
        .expect("own password change succeeds");
    }
}
