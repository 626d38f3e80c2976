//! HTTP report-drafting client.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use valora_core::{ReportBundle, ReportDrafter, Result, ValuationError};

use crate::config::ApiConfig;
use crate::http::{apply_auth, build_client, error_for_status, transport_err};

const SERVICE: &str = "report-drafter";

/// Sends the structured session bundle to the hosted drafting service
/// and returns its markup text verbatim.
pub struct HttpReportDrafter {
    config: ApiConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DraftResponse {
    report: String,
}

impl HttpReportDrafter {
    pub fn new(config: ApiConfig) -> Self {
        HttpReportDrafter {
            config,
            http: build_client(),
        }
    }
}

#[async_trait]
impl ReportDrafter for HttpReportDrafter {
    async fn draft_report(&self, bundle: &ReportBundle) -> Result<String> {
        let url = format!("{}/v1/valuation-report/", self.config.ai_base_url);
        debug!(images = bundle.evaluated_images.len(), "POST {url}");

        let response = apply_auth(self.http.post(&url), &self.config)
            .json(bundle)
            .send()
            .await
            .map_err(|e| transport_err(SERVICE, e))?;
        let response = error_for_status(SERVICE, response).await?;
        let draft: DraftResponse = response
            .json()
            .await
            .map_err(|e| ValuationError::data_shape(SERVICE, e.to_string()))?;
        Ok(draft.report)
    }
}
