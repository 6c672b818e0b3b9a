use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub store_id: u64,
    pub rating: u8,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
