//! Session state for a single valuation run.
//!
//! A [`Session`] is the root aggregate of one valuation: the picked
//! location, the property detail form, the evaluated images with their
//! derived average score, and the outputs of the downstream stages.
//! Nothing here is persisted; a session lives and dies with the run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The four stages of the valuation workflow, in execution order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Evaluation,
    Estimation,
    Comparables,
    Report,
}

impl StageId {
    /// Get the stage name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            StageId::Evaluation => "evaluation",
            StageId::Estimation => "estimation",
            StageId::Comparables => "comparables",
            StageId::Report => "report",
        }
    }
}

/// Lifecycle state of a single stage attempt.
///
/// Used for interface gating and feedback only; reattempting a stage
/// overwrites its prior output.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StageState {
    #[default]
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

/// A geocoded location picked on the map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    /// Formatted address from the geocoding collaborator.
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

/// User-supplied details of the subject property.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PropertyDetails {
    pub address: Option<String>,
    pub property_type: String,
    pub sqft: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub parish: Option<String>,
}

/// One scored property image.
///
/// Created in a batch when the evaluation stage completes; `description`
/// and `score` are user-editable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluatedImage {
    /// Opaque reference to the uploaded image.
    pub url: String,
    pub description: String,
    /// Aesthetic score. Raw ingestion values are stored as returned;
    /// edits are clamped into `[0, 10]`.
    pub score: f64,
}

/// Price range returned by the external estimator.
///
/// All three values are formatted currency strings held as free-form
/// editable text. Numeric values are re-extracted with [`parse_price`]
/// when the comparables stage needs them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRange {
    pub min_price: String,
    pub median_price: String,
    pub max_price: String,
}

/// A comparable market listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarProperty {
    pub title: String,
    pub price: String,
    pub location: String,
    pub link: String,
}

/// A supporting web search result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub displayed_link: String,
    pub snippet: String,
}

/// Output of the comparables stage.
///
/// The explicit empty value (zero listings) is distinct from "stage not
/// yet run", which is an absent `Option` on the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ComparablesResult {
    pub similar_properties: Vec<SimilarProperty>,
    pub google_search_results: Vec<SearchResult>,
}

impl ComparablesResult {
    /// The explicit empty result: the stage ran and found nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.similar_properties.is_empty() && self.google_search_results.is_empty()
    }
}

/// In-memory state of one valuation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub location: Option<Location>,
    pub details: PropertyDetails,
    pub evaluated_images: Vec<EvaluatedImage>,
    /// Arithmetic mean of the current image scores, 2-decimal rounded.
    pub aesthetic_score: f64,
    pub estimation: Option<PriceRange>,
    pub comparables: Option<ComparablesResult>,
    pub report: Option<String>,
    stages: HashMap<StageId, StageState>,
}

impl Session {
    /// Create an empty session for the given property details.
    pub fn new(details: PropertyDetails) -> Self {
        Session {
            details,
            ..Default::default()
        }
    }

    /// Attach the location picked on the map. Also seeds the detail
    /// form's address when it is still blank.
    pub fn set_location(&mut self, location: Location) {
        if self.details.address.is_none() {
            self.details.address = Some(location.address.clone());
        }
        self.location = Some(location);
    }

    /// Current state of a stage.
    pub fn stage_state(&self, stage: StageId) -> StageState {
        self.stages.get(&stage).copied().unwrap_or_default()
    }

    pub(crate) fn set_stage_state(&mut self, stage: StageId, state: StageState) {
        self.stages.insert(stage, state);
    }

    /// Whether a stage's trigger should be enabled: stage N+1 is only
    /// reachable once stage N has produced its output. A rerun of an
    /// earlier stage leaves downstream outputs in place (stale until
    /// rerun), so enablement is keyed on output presence, not state.
    pub fn stage_enabled(&self, stage: StageId) -> bool {
        if self.stage_state(stage) == StageState::Running {
            return false;
        }
        match stage {
            StageId::Evaluation => true,
            StageId::Estimation => !self.evaluated_images.is_empty(),
            StageId::Comparables => self.estimation.is_some(),
            StageId::Report => self.comparables.is_some(),
        }
    }

    /// Replace the whole evaluated batch and recompute the average.
    pub(crate) fn replace_evaluation(&mut self, images: Vec<EvaluatedImage>) {
        self.evaluated_images = images;
        self.recompute_average();
    }

    /// Replace one image's score, clamped into `[0, 10]`, and recompute
    /// the average. An out-of-range index is a programming error.
    pub fn set_image_score(&mut self, index: usize, score: f64) {
        self.evaluated_images[index].score = score.clamp(0.0, 10.0);
        self.recompute_average();
    }

    /// Replace one image's description verbatim. No recomputation.
    pub fn set_image_description(&mut self, index: usize, text: impl Into<String>) {
        self.evaluated_images[index].description = text.into();
    }

    fn recompute_average(&mut self) {
        if self.evaluated_images.is_empty() {
            self.aesthetic_score = 0.0;
            return;
        }
        let sum: f64 = self.evaluated_images.iter().map(|i| i.score).sum();
        self.aesthetic_score = round2(sum / self.evaluated_images.len() as f64);
    }
}

/// Round to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Lenient numeric extraction from a formatted price string.
///
/// Strips every character except digits, dot and minus, then parses.
/// `None` for strings with no parseable number ("N/A", "TBD", ...);
/// callers serialize that as a JSON null.
pub fn parse_price(price: &str) -> Option<f64> {
    let cleaned: String = price
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_scores(scores: &[f64]) -> Session {
        let mut session = Session::new(PropertyDetails::default());
        let images = scores
            .iter()
            .enumerate()
            .map(|(i, s)| EvaluatedImage {
                url: format!("img-{i}"),
                description: String::new(),
                score: *s,
            })
            .collect();
        session.replace_evaluation(images);
        session
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(StageId::Evaluation.name(), "evaluation");
        assert_eq!(StageId::Report.name(), "report");
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$1,500,000"), Some(1_500_000.0));
        assert_eq!(parse_price("JMD 950,000.50"), Some(950_000.5));
        assert_eq!(parse_price("-1200"), Some(-1200.0));
        assert_eq!(parse_price("N/A"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn test_average_recompute_after_batch() {
        let session = session_with_scores(&[4.0, 6.0, 8.0]);
        assert_eq!(session.aesthetic_score, 6.0);
    }

    #[test]
    fn test_average_rounds_to_two_decimals() {
        let session = session_with_scores(&[7.0, 7.0, 8.0]);
        // 22 / 3 = 7.333...
        assert_eq!(session.aesthetic_score, 7.33);
    }

    #[test]
    fn test_set_image_score_recomputes() {
        let mut session = session_with_scores(&[4.0, 6.0, 8.0]);
        session.set_image_score(1, 9.0);
        assert_eq!(session.evaluated_images[1].score, 9.0);
        assert_eq!(session.aesthetic_score, 7.0);
    }

    #[test]
    fn test_set_image_score_clamps() {
        let mut session = session_with_scores(&[5.0]);
        session.set_image_score(0, 15.0);
        assert_eq!(session.evaluated_images[0].score, 10.0);
        session.set_image_score(0, -3.0);
        assert_eq!(session.evaluated_images[0].score, 0.0);
    }

    #[test]
    fn test_set_image_description_no_recompute() {
        let mut session = session_with_scores(&[4.0, 8.0]);
        session.set_image_description(0, "repainted kitchen");
        assert_eq!(session.evaluated_images[0].description, "repainted kitchen");
        assert_eq!(session.aesthetic_score, 6.0);
    }

    #[test]
    fn test_stage_gating_follows_outputs() {
        let mut session = Session::new(PropertyDetails::default());
        assert!(session.stage_enabled(StageId::Evaluation));
        assert!(!session.stage_enabled(StageId::Estimation));
        assert!(!session.stage_enabled(StageId::Comparables));
        assert!(!session.stage_enabled(StageId::Report));

        session.replace_evaluation(vec![EvaluatedImage {
            url: "img-0".to_string(),
            description: String::new(),
            score: 7.0,
        }]);
        assert!(session.stage_enabled(StageId::Estimation));
        assert!(!session.stage_enabled(StageId::Comparables));

        session.estimation = Some(PriceRange {
            min_price: "$1".to_string(),
            median_price: "$2".to_string(),
            max_price: "$3".to_string(),
        });
        assert!(session.stage_enabled(StageId::Comparables));
        assert!(!session.stage_enabled(StageId::Report));

        // The explicit empty result still unlocks the report stage.
        session.comparables = Some(ComparablesResult::empty());
        assert!(session.stage_enabled(StageId::Report));
    }

    #[test]
    fn test_running_stage_is_disabled() {
        let mut session = Session::new(PropertyDetails::default());
        session.set_stage_state(StageId::Evaluation, StageState::Running);
        assert!(!session.stage_enabled(StageId::Evaluation));
    }

    #[test]
    fn test_set_location_seeds_blank_address() {
        let mut session = Session::new(PropertyDetails::default());
        session.set_location(Location {
            address: "12 Main St, Kingston".to_string(),
            lat: 18.01,
            lng: -76.79,
        });
        assert_eq!(session.details.address.as_deref(), Some("12 Main St, Kingston"));

        // An address the user already typed is not overwritten.
        let mut session = Session::new(PropertyDetails {
            address: Some("typed by hand".to_string()),
            ..Default::default()
        });
        session.set_location(Location {
            address: "geocoded".to_string(),
            lat: 0.0,
            lng: 0.0,
        });
        assert_eq!(session.details.address.as_deref(), Some("typed by hand"));
    }
}
