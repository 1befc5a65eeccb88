use crate::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

pub async fn root() -> &'static str {
    "Bot is running!"
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        uptime_secs: state.stats.uptime().as_secs(),
        guilds: state.stats.guild_count(),
        conversations: state.history.conversation_count(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub guilds: usize,
    pub conversations: usize,
}
