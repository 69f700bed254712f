use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: u32,
    pub title: String,
    pub author: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeedResponse {
    pub owner: String,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub user_id: u64,
    pub login: String,
    pub registered_users: usize,
    pub active_sessions: usize,
    /// Unix timestamp
    pub server_time: i64,
}
