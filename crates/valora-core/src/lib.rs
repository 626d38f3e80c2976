//! Valora Core - Property Valuation Workflow
//!
//! Drives a valuation session through four ordered stages:
//! - Evaluation: concurrent per-image aesthetic scoring, averaged
//! - Estimation: single-shot price range from the remote estimator
//! - Comparables: advisory market search, degrades to empty on failure
//! - Report: drafted from the full (possibly user-edited) session bundle
//!
//! Sessions are transient, in-memory, and scoped to one run. The remote
//! capabilities sit behind async traits; `fakes` provides in-memory
//! implementations for tests.

pub mod capability;
mod error;
pub mod export;
pub mod fakes;
pub mod report;
pub mod session;
pub mod workflow;

// Re-export key types
pub use capability::{
    AssetFetcher, EstimateRequest, FindSimilarRequest, PropertyApi, RawRoomScore, ReportDrafter,
    RoomScore, RoomScorer, UploadedImage, DEFAULT_SCORE,
};
pub use error::{Result, ValuationError};
pub use export::{
    Block, DocumentExporter, DocumentRenderer, LaidOutDocument, Page, PageLayout,
    PlainPageRenderer,
};
pub use report::{ReportBundle, REPORT_SECTIONS};
pub use session::{
    parse_price, ComparablesResult, EvaluatedImage, Location, PriceRange, PropertyDetails,
    SearchResult, Session, SimilarProperty, StageId, StageState,
};
pub use workflow::ValuationWorkflow;
