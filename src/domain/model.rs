use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Determines which operations a caller may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Normal,
    StoreOwner,
}

impl Role {
    /// Wire name, as carried in tokens and matched by filters.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Normal => "normal",
            Role::StoreOwner => "store_owner",
        }
    }
}

/// Never serialized directly: responses go through per-module DTOs so the
/// password hash cannot leak.
#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub role: Role,
    /// Present iff `role` is `StoreOwner`, pointing at the owned store.
    pub store_id: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Store {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub address: String,
    /// Back-reference to the owning user; stores may be unassigned.
    pub owner_id: Option<u64>,
}

/// One user's 1-5 score for one store; at most one row per (user, store).
#[derive(Debug, Clone)]
pub struct Rating {
    pub id: u64,
    pub user_id: u64,
    pub store_id: u64,
    pub value: u8,
    pub created_at: OffsetDateTime,
}
