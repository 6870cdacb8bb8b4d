use serde::{Deserialize, Serialize};

// Wire models for the stub cryptogram server

// Form body of POST /cryptogram
#[derive(Debug, Deserialize)]
pub struct CryptogramRequest {
    #[serde(default)]
    pub pubkey: String,
}

// Model for error responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

// Model for service statistics
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
    pub cryptograms_issued: u64,
}
