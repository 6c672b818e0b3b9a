use serde::{Deserialize, Serialize};

use crate::domain::Role;

/// Admin user creation; unlike signup, an explicit role may be supplied.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

/// Row in the admin listing. `rating` is the average for the store a store
/// owner owns, null for everyone else.
#[derive(Debug, Serialize)]
pub struct UserListItem {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: Role,
    pub rating: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
