//! The valuation workflow coordinator.
//!
//! Drives a session through its four stages in order, holding the
//! accumulated state and the capability handles. Each stage is one
//! user-triggered attempt: `Running` while its calls are in flight,
//! then `Succeeded` or `Failed`. There are no automatic retries and no
//! cancellation; a rerun overwrites that stage's output and leaves
//! downstream outputs stale until they are rerun themselves.

use std::sync::Arc;

use futures::future;
use tracing::{info, warn};

use crate::capability::{
    EstimateRequest, FindSimilarRequest, PropertyApi, ReportDrafter, RoomScorer, UploadedImage,
};
use crate::error::{Result, ValuationError};
use crate::report::ReportBundle;
use crate::session::{
    parse_price, ComparablesResult, EvaluatedImage, Location, PriceRange, PropertyDetails,
    Session, StageId, StageState,
};

/// Coordinator for one valuation session.
pub struct ValuationWorkflow {
    scorer: Arc<dyn RoomScorer>,
    api: Arc<dyn PropertyApi>,
    drafter: Arc<dyn ReportDrafter>,
    session: Session,
}

impl ValuationWorkflow {
    pub fn new(
        session: Session,
        scorer: Arc<dyn RoomScorer>,
        api: Arc<dyn PropertyApi>,
        drafter: Arc<dyn ReportDrafter>,
    ) -> Self {
        ValuationWorkflow {
            scorer,
            api,
            drafter,
            session,
        }
    }

    /// The accumulated session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Attach the location emitted by the map/geocoding collaborator.
    pub fn set_location(&mut self, location: Location) {
        self.session.set_location(location);
    }

    /// The editable property detail form.
    pub fn details_mut(&mut self) -> &mut PropertyDetails {
        &mut self.session.details
    }

    /// Edit one image's score (clamped to `[0, 10]`); recomputes the
    /// average. Only reachable after the evaluation stage succeeded.
    pub fn set_image_score(&mut self, index: usize, score: f64) {
        self.session.set_image_score(index, score);
    }

    /// Edit one image's description verbatim.
    pub fn set_image_description(&mut self, index: usize, text: impl Into<String>) {
        self.session.set_image_description(index, text);
    }

    /// Stage 1: score every uploaded image concurrently and derive the
    /// average aesthetic score.
    ///
    /// All-or-nothing batch: the calls fan out together (one in-flight
    /// call per image), the outputs keep the input order regardless of
    /// completion order, and any single failure fails the whole stage
    /// without committing a partial batch.
    pub async fn run_evaluation(&mut self, images: &[UploadedImage]) -> Result<f64> {
        if images.is_empty() {
            return Err(ValuationError::input(
                "at least one image is required for evaluation",
            ));
        }

        self.session
            .set_stage_state(StageId::Evaluation, StageState::Running);
        info!(count = images.len(), "scoring room images");

        let scorer = self.scorer.clone();
        let calls = images.iter().map(|image| scorer.score_room(image));
        let scores = match future::try_join_all(calls).await {
            Ok(scores) => scores,
            Err(e) => {
                self.session
                    .set_stage_state(StageId::Evaluation, StageState::Failed);
                warn!(error = %e, "room evaluation batch failed");
                return Err(e);
            }
        };

        let evaluated: Vec<EvaluatedImage> = images
            .iter()
            .zip(scores)
            .map(|(image, result)| EvaluatedImage {
                url: image.url.clone(),
                description: result.description,
                score: result.score,
            })
            .collect();

        self.session.replace_evaluation(evaluated);
        self.session
            .set_stage_state(StageId::Evaluation, StageState::Succeeded);
        info!(
            average = self.session.aesthetic_score,
            "room evaluation complete"
        );
        Ok(self.session.aesthetic_score)
    }

    /// Stage 2: single-shot price estimation.
    ///
    /// A missing location is forwarded as null coordinates; rejecting
    /// or degrading on those is the remote service's call, not ours.
    pub async fn run_estimation(&mut self) -> Result<PriceRange> {
        if self.session.evaluated_images.is_empty() {
            return Err(ValuationError::input(
                "run the evaluation stage before estimating",
            ));
        }

        self.session
            .set_stage_state(StageId::Estimation, StageState::Running);
        let request = self.estimate_request();
        info!(property_type = %request.property_type, "requesting price estimation");

        match self.api.estimate_value(&request).await {
            Ok(range) => {
                self.session.estimation = Some(range.clone());
                self.session
                    .set_stage_state(StageId::Estimation, StageState::Succeeded);
                info!(median = %range.median_price, "price estimation complete");
                Ok(range)
            }
            Err(e) => {
                self.session
                    .set_stage_state(StageId::Estimation, StageState::Failed);
                warn!(error = %e, "price estimation failed");
                Err(e)
            }
        }
    }

    /// Stage 3: comparable-property search.
    ///
    /// Comparables are advisory, never blocking: a remote failure (or an
    /// empty remote payload) degrades to the explicit empty result and
    /// the stage still succeeds, so the report stage stays reachable.
    /// A missing parish is a local input error, checked before any call.
    pub async fn run_comparables(&mut self) -> Result<ComparablesResult> {
        let estimation = self
            .session
            .estimation
            .clone()
            .ok_or_else(|| ValuationError::input("run the estimation stage before comparables"))?;
        let parish = self
            .session
            .details
            .parish
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                ValuationError::input("a parish is required to search for comparables")
            })?;

        self.session
            .set_stage_state(StageId::Comparables, StageState::Running);

        let base = self.estimate_request();
        let request = FindSimilarRequest {
            sqft: base.sqft,
            bedrooms: base.rooms,
            bathrooms: base.bathroom,
            latitude: base.latitude,
            longitude: base.longitude,
            aes_score: base.aes_score,
            property_type: base.property_type,
            parish,
            price: parse_price(&estimation.median_price),
            min_price: parse_price(&estimation.min_price),
            max_price: parse_price(&estimation.max_price),
        };
        info!(parish = %request.parish, "searching for comparable properties");

        let result = match self.api.find_similar(&request).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "comparable search failed, continuing with an empty result");
                ComparablesResult::empty()
            }
        };

        info!(
            listings = result.similar_properties.len(),
            search_results = result.google_search_results.len(),
            "comparable search complete"
        );
        self.session.comparables = Some(result.clone());
        self.session
            .set_stage_state(StageId::Comparables, StageState::Succeeded);
        Ok(result)
    }

    /// Stage 4: draft the report from the full current bundle.
    ///
    /// Edits made after a prior draft are only reflected by rerunning
    /// this stage; the bundle is snapshotted at call time.
    pub async fn run_report(&mut self) -> Result<String> {
        if self.session.comparables.is_none() {
            return Err(ValuationError::input(
                "run the comparables stage before drafting a report",
            ));
        }

        let bundle = ReportBundle::from_session(&self.session)?;
        self.session
            .set_stage_state(StageId::Report, StageState::Running);
        info!(
            images = bundle.evaluated_images.len(),
            "drafting valuation report"
        );

        match self.drafter.draft_report(&bundle).await {
            Ok(text) if !text.trim().is_empty() => {
                self.session.report = Some(text.clone());
                self.session
                    .set_stage_state(StageId::Report, StageState::Succeeded);
                info!(length = text.len(), "report drafted");
                Ok(text)
            }
            Ok(_) => {
                self.session
                    .set_stage_state(StageId::Report, StageState::Failed);
                Err(ValuationError::data_shape(
                    "report-drafter",
                    "drafter returned an empty report",
                ))
            }
            Err(e) => {
                self.session
                    .set_stage_state(StageId::Report, StageState::Failed);
                warn!(error = %e, "report drafting failed");
                Err(e)
            }
        }
    }

    fn estimate_request(&self) -> EstimateRequest {
        let details = &self.session.details;
        EstimateRequest {
            sqft: details.sqft,
            rooms: details.bedrooms,
            bathroom: details.bathrooms,
            latitude: self.session.location.as_ref().map(|l| l.lat),
            longitude: self.session.location.as_ref().map(|l| l.lng),
            aes_score: self.session.aesthetic_score,
            property_type: details.property_type.clone(),
        }
    }
}
