use serde::Serialize;
use time::OffsetDateTime;

/// Live counts, recomputed per request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_stores: usize,
    pub total_ratings: usize,
}

/// The controlled join for store owners: rater name and email, nothing else.
#[derive(Debug, Serialize)]
pub struct RaterInfo {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRatingEntry {
    pub id: u64,
    pub rating: u8,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub user: RaterInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRatingsResponse {
    pub average_rating: f64,
    pub ratings: Vec<StoreRatingEntry>,
}
