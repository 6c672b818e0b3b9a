use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: String,
}

/// Store row personalized per viewer: `rating` is the shared average,
/// `user_rating` the caller's own score for the store if any.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListItem {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub rating: f64,
    pub user_rating: Option<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedStore {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<u64>,
}
