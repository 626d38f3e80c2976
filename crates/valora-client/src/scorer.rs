//! HTTP room-scoring client.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;
use valora_core::{RawRoomScore, Result, RoomScore, RoomScorer, UploadedImage};

use crate::config::ApiConfig;
use crate::http::{apply_auth, build_client, error_for_status, transport_err};

const SERVICE: &str = "room-scorer";

/// One scoring call per image against the hosted room evaluator.
pub struct HttpRoomScorer {
    config: ApiConfig,
    http: reqwest::Client,
    user_id: String,
}

#[derive(Serialize)]
struct ScoreEnvelope<'a> {
    user_id: &'a str,
    eval_id: String,
    photo_data_uri: String,
}

impl HttpRoomScorer {
    pub fn new(config: ApiConfig, user_id: &str) -> Self {
        HttpRoomScorer {
            config,
            http: build_client(),
            user_id: user_id.to_string(),
        }
    }
}

#[async_trait]
impl RoomScorer for HttpRoomScorer {
    async fn score_room(&self, image: &UploadedImage) -> Result<RoomScore> {
        let url = format!("{}/v1/room-evaluator/", self.config.ml_base_url);
        let envelope = ScoreEnvelope {
            user_id: &self.user_id,
            eval_id: format!("eval-{}", Uuid::new_v4()),
            photo_data_uri: to_data_uri(&image.bytes),
        };
        debug!(image = %image.url, eval_id = %envelope.eval_id, "scoring image");

        let response = apply_auth(self.http.post(&url), &self.config)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| transport_err(SERVICE, e))?;
        let response = error_for_status(SERVICE, response).await?;
        let raw: RawRoomScore = response
            .json()
            .await
            .map_err(|e| valora_core::ValuationError::data_shape(SERVICE, e.to_string()))?;

        Ok(RoomScore::normalize(raw))
    }
}

/// Encode image bytes as a self-describing data URI, sniffing the MIME
/// type from the magic bytes.
fn to_data_uri(bytes: &[u8]) -> String {
    let mime = if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "image/png"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else {
        "image/jpeg"
    };
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_uri_sniffs_png() {
        let uri = to_data_uri(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]);
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_data_uri_defaults_to_jpeg() {
        let uri = to_data_uri(&[0xFF, 0xD8, 0xFF, 0xE0]);
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_data_uri_round_trips_payload() {
        let uri = to_data_uri(b"GIF89a....");
        let encoded = uri.split(',').nth(1).unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"GIF89a....");
    }
}
