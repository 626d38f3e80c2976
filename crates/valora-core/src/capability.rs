//! Capability trait definitions for the valuation workflow.
//!
//! These traits define the seams to the externally hosted capabilities:
//! - `RoomScorer`: per-image aesthetic scoring
//! - `PropertyApi`: price estimation and comparable-property search
//! - `ReportDrafter`: structured bundle in, report text out
//! - `AssetFetcher`: remote image bytes for the document export
//!
//! All traits are async and transport-agnostic. In-memory fakes are
//! provided for testing via the `fakes` module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::report::ReportBundle;
use crate::session::{ComparablesResult, PriceRange};

/// Score used when the model's score cannot be parsed at all.
pub const DEFAULT_SCORE: f64 = 5.0;

/// One uploaded image: an opaque reference plus its raw bytes
/// (self-describing payload, PNG/JPEG magic included).
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub url: String,
    pub bytes: Vec<u8>,
}

/// Raw scoring response as the model returns it.
///
/// `Score` arrives as either a number or a numeric string, and the
/// whole pair occasionally comes back nested as a JSON string inside
/// `Description`. Run it through [`RoomScore::normalize`] before use.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRoomScore {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Score")]
    pub score: serde_json::Value,
}

/// Normalized scoring result for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomScore {
    pub description: String,
    pub score: f64,
}

impl RoomScore {
    /// Normalize a raw model response.
    ///
    /// - A numeric-string score is parsed to float; an unparseable one
    ///   falls back to [`DEFAULT_SCORE`].
    /// - A description starting with `{` is re-parsed as a nested
    ///   `{Description, Score}` object; inner fields take precedence
    ///   when present and parseable. Invalid JSON is kept verbatim.
    pub fn normalize(raw: RawRoomScore) -> RoomScore {
        let mut score = parse_score(&raw.score).unwrap_or(DEFAULT_SCORE);
        let mut description = raw.description;

        if description.trim_start().starts_with('{') {
            if let Ok(nested) = serde_json::from_str::<serde_json::Value>(&description) {
                if let Some(inner) = nested.get("Description").and_then(|v| v.as_str()) {
                    description = inner.to_string();
                }
                if let Some(inner) = nested.get("Score").and_then(parse_score) {
                    score = inner;
                }
            }
        }

        RoomScore { description, score }
    }
}

fn parse_score(value: &serde_json::Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

/// Request body for the price-estimation endpoint.
///
/// Coordinates are nullable: when the session has no location the
/// remote service decides whether to reject or degrade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EstimateRequest {
    pub sqft: f64,
    pub rooms: u32,
    pub bathroom: u32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub aes_score: f64,
    pub property_type: String,
}

/// Request body for the comparable-search endpoint.
///
/// Extends the estimation payload with the numeric price triple
/// extracted from the formatted strings and the parish. This endpoint
/// names the room counts `bedrooms`/`bathrooms`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FindSimilarRequest {
    pub sqft: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub aes_score: f64,
    pub property_type: String,
    pub parish: String,
    pub price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

/// Per-image aesthetic scoring capability.
#[async_trait]
pub trait RoomScorer: Send + Sync {
    /// Score a single image. Implementations normalize the raw model
    /// response before returning.
    async fn score_room(&self, image: &UploadedImage) -> Result<RoomScore>;
}

/// Remote estimation and comparable-search services.
#[async_trait]
pub trait PropertyApi: Send + Sync {
    /// Single-shot price estimation. The returned strings are stored
    /// verbatim on the session.
    async fn estimate_value(&self, request: &EstimateRequest) -> Result<PriceRange>;

    /// Single-shot comparable-property search.
    async fn find_similar(&self, request: &FindSimilarRequest) -> Result<ComparablesResult>;
}

/// Report drafting capability: structured bundle in, report text out.
#[async_trait]
pub trait ReportDrafter: Send + Sync {
    async fn draft_report(&self, bundle: &ReportBundle) -> Result<String>;
}

/// Remote asset access for the document export.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Fetch raw bytes for an image URL.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;

    /// URL of a static map tile centered on the given coordinates.
    fn static_map_url(&self, lat: f64, lng: f64) -> String;
}
