//! In-memory fakes for the capability traits (testing only)
//!
//! Provides scripted implementations of `RoomScorer`, `PropertyApi`,
//! `ReportDrafter` and `AssetFetcher` that satisfy the trait contracts
//! without any network dependency. Every fake records the requests it
//! receives so tests can assert on call counts and payloads.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::capability::{
    AssetFetcher, EstimateRequest, FindSimilarRequest, PropertyApi, ReportDrafter, RoomScore,
    RoomScorer, UploadedImage,
};
use crate::error::{Result, ValuationError};
use crate::report::ReportBundle;
use crate::session::{ComparablesResult, PriceRange};

// ---------------------------------------------------------------------------
// ScriptedScorer
// ---------------------------------------------------------------------------

/// Per-image script for [`ScriptedScorer`].
#[derive(Debug, Clone)]
pub struct ScriptedScore {
    pub description: String,
    pub score: f64,
    /// Artificial completion delay, for exercising out-of-order joins.
    pub delay: Duration,
    pub fail: bool,
}

impl ScriptedScore {
    pub fn new(description: &str, score: f64) -> Self {
        ScriptedScore {
            description: description.to_string(),
            score,
            delay: Duration::ZERO,
            fail: false,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing() -> Self {
        ScriptedScore {
            description: String::new(),
            score: 0.0,
            delay: Duration::ZERO,
            fail: true,
        }
    }
}

/// Room scorer keyed by image url.
#[derive(Debug, Default)]
pub struct ScriptedScorer {
    scripts: Mutex<HashMap<String, ScriptedScore>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, url: &str, script: ScriptedScore) {
        self.scripts.lock().unwrap().insert(url.to_string(), script);
    }

    /// Image urls scored so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoomScorer for ScriptedScorer {
    async fn score_room(&self, image: &UploadedImage) -> Result<RoomScore> {
        self.calls.lock().unwrap().push(image.url.clone());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get(&image.url)
            .cloned()
            .ok_or_else(|| ValuationError::remote("room-scorer", "unscripted image"))?;
        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        if script.fail {
            return Err(ValuationError::remote("room-scorer", "scripted failure"));
        }
        Ok(RoomScore {
            description: script.description,
            score: script.score,
        })
    }
}

// ---------------------------------------------------------------------------
// FakePropertyApi
// ---------------------------------------------------------------------------

/// Estimation/comparables fake. Unset responses fail with a remote
/// error, which is the default.
#[derive(Debug, Default)]
pub struct FakePropertyApi {
    estimate_response: Mutex<Option<PriceRange>>,
    similar_response: Mutex<Option<ComparablesResult>>,
    estimate_calls: Mutex<Vec<EstimateRequest>>,
    similar_calls: Mutex<Vec<FindSimilarRequest>>,
}

impl FakePropertyApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_estimate(&self, range: PriceRange) {
        *self.estimate_response.lock().unwrap() = Some(range);
    }

    pub fn set_similar(&self, result: ComparablesResult) {
        *self.similar_response.lock().unwrap() = Some(result);
    }

    pub fn estimate_calls(&self) -> Vec<EstimateRequest> {
        self.estimate_calls.lock().unwrap().clone()
    }

    pub fn similar_calls(&self) -> Vec<FindSimilarRequest> {
        self.similar_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PropertyApi for FakePropertyApi {
    async fn estimate_value(&self, request: &EstimateRequest) -> Result<PriceRange> {
        self.estimate_calls.lock().unwrap().push(request.clone());
        self.estimate_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ValuationError::remote("estimator", "HTTP 503"))
    }

    async fn find_similar(&self, request: &FindSimilarRequest) -> Result<ComparablesResult> {
        self.similar_calls.lock().unwrap().push(request.clone());
        self.similar_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ValuationError::remote("comparable-search", "HTTP 503"))
    }
}

// ---------------------------------------------------------------------------
// FakeDrafter
// ---------------------------------------------------------------------------

/// Report drafter fake; unset response fails with a remote error.
#[derive(Debug, Default)]
pub struct FakeDrafter {
    response: Mutex<Option<String>>,
    calls: Mutex<Vec<ReportBundle>>,
}

impl FakeDrafter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_report(&self, text: &str) {
        *self.response.lock().unwrap() = Some(text.to_string());
    }

    pub fn calls(&self) -> Vec<ReportBundle> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReportDrafter for FakeDrafter {
    async fn draft_report(&self, bundle: &ReportBundle) -> Result<String> {
        self.calls.lock().unwrap().push(bundle.clone());
        self.response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ValuationError::remote("report-drafter", "HTTP 503"))
    }
}

// ---------------------------------------------------------------------------
// FakeAssetFetcher
// ---------------------------------------------------------------------------

/// Asset store keyed by url; missing urls fail with a remote error.
#[derive(Debug, Default)]
pub struct FakeAssetFetcher {
    assets: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakeAssetFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: &str, bytes: Vec<u8>) {
        self.assets.lock().unwrap().insert(url.to_string(), bytes);
    }
}

#[async_trait]
impl AssetFetcher for FakeAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.assets
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ValuationError::remote("asset-fetch", "not found"))
    }

    fn static_map_url(&self, lat: f64, lng: f64) -> String {
        format!("fake://staticmap/{lat},{lng}")
    }
}
