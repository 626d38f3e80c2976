//! Structured input for the report-drafting capability.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValuationError};
use crate::session::{ComparablesResult, EvaluatedImage, PriceRange, PropertyDetails, Session};

/// Section headings every drafted valuation report must carry, in order.
/// The drafting service owns the prose; this list rides along in the
/// request so the contract is explicit on the wire.
pub const REPORT_SECTIONS: [&str; 10] = [
    "Scope of Work",
    "Intended Use",
    "Intended Users",
    "Purpose of Valuation",
    "Valuation Approaches Adopted",
    "Valuation Methods Applied",
    "Key Inputs Used",
    "Assumptions",
    "Valuation Conclusion",
    "Date of Report",
];

/// Everything the drafting capability needs to write the report:
/// the detail form, the evaluated images with their *current* (possibly
/// user-edited) scores and descriptions, the price range, and the
/// comparables, including the explicit empty case.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportBundle {
    pub property_details: PropertyDetails,
    pub evaluated_images: Vec<EvaluatedImage>,
    pub aesthetic_score: f64,
    pub estimation: PriceRange,
    pub comparables: ComparablesResult,
    pub required_sections: Vec<String>,
}

impl ReportBundle {
    /// Snapshot the current session into a drafting request.
    ///
    /// Fails with an input error when estimation or comparables have not
    /// been produced yet; an empty comparables result is fine.
    pub fn from_session(session: &Session) -> Result<Self> {
        let estimation = session
            .estimation
            .clone()
            .ok_or_else(|| ValuationError::input("estimation must run before the report"))?;
        let comparables = session
            .comparables
            .clone()
            .ok_or_else(|| ValuationError::input("comparables must run before the report"))?;

        Ok(ReportBundle {
            property_details: session.details.clone(),
            evaluated_images: session.evaluated_images.clone(),
            aesthetic_score: session.aesthetic_score,
            estimation,
            comparables,
            required_sections: REPORT_SECTIONS.iter().map(|s| s.to_string()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_requires_prior_stages() {
        let session = Session::new(PropertyDetails::default());
        assert!(ReportBundle::from_session(&session).is_err());
    }

    #[test]
    fn test_bundle_snapshots_session() {
        let mut session = Session::new(PropertyDetails {
            property_type: "House".to_string(),
            ..Default::default()
        });
        session.estimation = Some(PriceRange {
            min_price: "$1".to_string(),
            median_price: "$2".to_string(),
            max_price: "$3".to_string(),
        });
        session.comparables = Some(ComparablesResult::empty());

        let bundle = ReportBundle::from_session(&session).unwrap();
        assert_eq!(bundle.property_details.property_type, "House");
        assert!(bundle.comparables.is_empty());
        assert_eq!(bundle.required_sections.len(), 10);
        assert_eq!(bundle.required_sections[0], "Scope of Work");
    }
}
