use serde::{Deserialize, Serialize};

use crate::domain::{Role, User};

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for self-registration. Carries no role on purpose; signup
/// always produces a normal user.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
}

/// Public part of a user returned to the client; never carries the hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<u64>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            address: u.address,
            store_id: u.store_id,
        }
    }
}

/// Response returned after login or signup.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}
