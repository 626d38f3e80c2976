//! Remote asset fetching for the document export.

use async_trait::async_trait;
use tracing::debug;
use valora_core::{AssetFetcher, Result};

use crate::config::ApiConfig;
use crate::http::{build_client, error_for_status, transport_err};

const SERVICE: &str = "asset-fetch";

/// Fetches map tiles and property photos over plain GET.
pub struct HttpAssetFetcher {
    config: ApiConfig,
    http: reqwest::Client,
}

impl HttpAssetFetcher {
    pub fn new(config: ApiConfig) -> Self {
        HttpAssetFetcher {
            config,
            http: build_client(),
        }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url = %url, "fetching asset");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_err(SERVICE, e))?;
        let response = error_for_status(SERVICE, response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_err(SERVICE, e))?;
        Ok(bytes.to_vec())
    }

    fn static_map_url(&self, lat: f64, lng: f64) -> String {
        let mut url = format!(
            "{}?center={lat},{lng}&zoom=16&size=600x300&markers={lat},{lng}",
            self.config.maps_base_url
        );
        if let Some(token) = &self.config.token {
            url.push_str("&key=");
            url.push_str(token);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    #[test]
    fn test_static_map_url_format() {
        let fetcher = HttpAssetFetcher::new(ApiConfig::new(
            "https://ml.example",
            "https://ai.example",
        ));
        let url = fetcher.static_map_url(18.017, -76.809);
        assert!(url.starts_with("https://maps.googleapis.com/maps/api/staticmap?"));
        assert!(url.contains("center=18.017,-76.809"));
        assert!(url.contains("markers=18.017,-76.809"));
        assert!(!url.contains("key="));
    }

    #[test]
    fn test_static_map_url_carries_token() {
        let config =
            ApiConfig::new("https://ml.example", "https://ai.example").with_token("t0k");
        let url = HttpAssetFetcher::new(config).static_map_url(0.0, 0.0);
        assert!(url.ends_with("&key=t0k"));
    }
}
