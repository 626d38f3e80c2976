//! HTTP client for the estimation and comparable-search endpoints.

use async_trait::async_trait;
use tracing::debug;
use valora_core::{
    ComparablesResult, EstimateRequest, FindSimilarRequest, PriceRange, PropertyApi, Result,
    ValuationError,
};

use crate::config::ApiConfig;
use crate::http::{apply_auth, build_client, error_for_status, transport_err};

const ESTIMATOR: &str = "estimator";
const COMPARABLES: &str = "comparable-search";

/// Client for the hosted estimation/comparable-search services.
pub struct HttpPropertyApi {
    config: ApiConfig,
    http: reqwest::Client,
}

impl HttpPropertyApi {
    pub fn new(config: ApiConfig) -> Self {
        HttpPropertyApi {
            config,
            http: build_client(),
        }
    }

    async fn post_json<B, T>(&self, service: &str, url: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        let response = apply_auth(self.http.post(url), &self.config)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_err(service, e))?;
        let response = error_for_status(service, response).await?;
        response
            .json()
            .await
            .map_err(|e| ValuationError::data_shape(service, e.to_string()))
    }
}

#[async_trait]
impl PropertyApi for HttpPropertyApi {
    async fn estimate_value(&self, request: &EstimateRequest) -> Result<PriceRange> {
        let url = format!("{}/v1/property-relative-value/", self.config.ml_base_url);
        debug!(property_type = %request.property_type, "POST {url}");
        self.post_json(ESTIMATOR, &url, request).await
    }

    async fn find_similar(&self, request: &FindSimilarRequest) -> Result<ComparablesResult> {
        let url = format!("{}/v1/similar-properties/", self.config.ml_base_url);
        debug!(parish = %request.parish, "POST {url}");
        self.post_json(COMPARABLES, &url, request).await
    }
}
