//! Endpoint configuration for the remote valuation services.

use serde::{Deserialize, Serialize};

/// Base URLs and credentials for the hosted capabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the ML endpoints (room evaluator, estimator,
    /// comparable search).
    pub ml_base_url: String,
    /// Base URL of the report-drafting service.
    pub ai_base_url: String,
    /// Base URL of the static-map service.
    pub maps_base_url: String,
    /// Bearer token (optional for public deployments).
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            ml_base_url: std::env::var("VALORA_ML_BASE_URL")
                .unwrap_or_else(|_| "https://ml-endpoints.aeontsolutions.com".to_string()),
            ai_base_url: std::env::var("VALORA_AI_BASE_URL")
                .unwrap_or_else(|_| "https://ai-endpoints.aeontsolutions.com".to_string()),
            maps_base_url: std::env::var("VALORA_MAPS_BASE_URL")
                .unwrap_or_else(|_| "https://maps.googleapis.com/maps/api/staticmap".to_string()),
            token: std::env::var("VALORA_API_TOKEN").ok(),
        }
    }
}

impl ApiConfig {
    /// Create a config from environment variables.
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create a config for specific service hosts.
    pub fn new(ml_base_url: &str, ai_base_url: &str) -> Self {
        ApiConfig {
            ml_base_url: ml_base_url.trim_end_matches('/').to_string(),
            ai_base_url: ai_base_url.trim_end_matches('/').to_string(),
            maps_base_url: "https://maps.googleapis.com/maps/api/staticmap".to_string(),
            token: None,
        }
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}
