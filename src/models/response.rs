use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "itemSummaries", default)]
    pub item_summaries: Vec<serde_json::Value>,
}
