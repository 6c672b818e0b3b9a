use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, SignupRequest},
        jwt::JwtKeys,
        password::verify_password,
    },
    domain::{NewUser, Role},
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    // Email comparison is case-sensitive, exactly as stored.
    let user = state.db.find_user_by_email(&payload.email).ok_or_else(|| {
        warn!(email = %payload.email, "login unknown email");
        ApiError::InvalidCredentials
    })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, user.role)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    // Self-registration always yields a normal user, whatever else the
    // request carries.
    let user = state.db.create_user(NewUser {
        name: payload.name,
        email: payload.email,
        password: payload.password,
        address: payload.address,
        role: Role::Normal,
    })?;

    // Auto-login on signup.
    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, user.role)?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: PublicUser::from(user),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_request(email: &str) -> SignupRequest {
        SignupRequest {
            name: "Sample Person".into(),
            email: email.into(),
            password: "Sample1!".into(),
            address: "12 Sample Street".into(),
        }
    }

    #[tokio::test]
    async fn signup_always_creates_normal_role() {
        let state = AppState::fake();
        let (status, Json(res)) = signup(
            State(state.clone()),
            Json(signup_request("new@example.com")),
        )
        .await
        .expect("signup");
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(res.user.role, Role::Normal);

        // The issued token carries the same identity.
        let keys = JwtKeys::from_ref(&state);
        let claims = keys.verify(&res.token).expect("token verifies");
        assert_eq!(claims.sub, res.user.id);
        assert_eq!(claims.role, Role::Normal);
    }

    #[tokio::test]
    async fn signup_rejects_duplicate_email() {
        let state = AppState::fake();
        signup(
            State(state.clone()),
            Json(signup_request("dup@example.com")),
        )
        .await
        .expect("first signup");
        let err = signup(State(state), Json(signup_request("dup@example.com")))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateEmail));
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_email() {
        let state = AppState::fake();
        signup(
            State(state.clone()),
            Json(signup_request("who@example.com")),
        )
        .await
        .expect("signup");

        let err = login(
            State(state.clone()),
            Json(LoginRequest {
                email: "who@example.com".into(),
                password: "Wrong1!pw".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));

        let err = login(
            State(state),
            Json(LoginRequest {
                email: "nobody@example.com".into(),
                password: "Sample1!".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_roundtrip_returns_identity() {
        let state = AppState::fake();
        signup(State(state.clone()), Json(signup_request("me@example.com")))
            .await
            .expect("signup");
        let Json(res) = login(
            State(state),
            Json(LoginRequest {
                email: "me@example.com".into(),
                password: "Sample1!".into(),
            }),
        )
        .await
        .expect("login");
        assert_eq!(res.user.email, "me@example.com");
        assert_eq!(res.user.role, Role::Normal);
    }
}
