//! Request and response types for the odds API.

use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Login response carrying the bearer token
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// One runner and its price, exactly as listed on the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerOdds {
    pub name: String,
    /// Fractional odds ("2/1", kept verbatim, never reduced) or "SP"
    pub odds: String,
}

/// Successful extraction payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OddsResponse {
    #[serde(rename = "eventUrl")]
    pub event_url: String,
    /// Runners in page row order
    pub horses: Vec<RunnerOdds>,
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
