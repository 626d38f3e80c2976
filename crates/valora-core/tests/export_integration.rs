//! Integration tests for the document export over the fake asset store.

use std::sync::Arc;

use valora_core::fakes::FakeAssetFetcher;
use valora_core::{
    Block, DocumentExporter, EvaluatedImage, Location, PageLayout, PlainPageRenderer,
    PropertyDetails, Session, ValuationError,
};

fn finished_session() -> Session {
    let mut session = Session::new(PropertyDetails {
        address: Some("12 Main St, Kingston".to_string()),
        property_type: "House".to_string(),
        sqft: 2000.0,
        bedrooms: 3,
        bathrooms: 2,
        parish: Some("St. Andrew".to_string()),
    });
    session.set_location(Location {
        address: "12 Main St, Kingston".to_string(),
        lat: 18.017,
        lng: -76.809,
    });
    session.evaluated_images = vec![
        EvaluatedImage {
            url: "https://img.example/kitchen.jpg".to_string(),
            description: "renovated kitchen with island".to_string(),
            score: 8.0,
        },
        EvaluatedImage {
            url: "https://img.example/bedroom.jpg".to_string(),
            description: "main bedroom, needs paint".to_string(),
            score: 6.0,
        },
    ];
    session.aesthetic_score = 7.0;
    session.report = Some("## Scope of Work\nVisual inspection from photos.\n".to_string());
    session
}

fn assets_for(session: &Session, fetcher: &FakeAssetFetcher) {
    let location = session.location.as_ref().unwrap();
    fetcher.insert(
        &format!("fake://staticmap/{},{}", location.lat, location.lng),
        vec![1, 2, 3],
    );
    for image in &session.evaluated_images {
        fetcher.insert(&image.url, vec![9, 9]);
    }
}

#[tokio::test]
async fn test_export_requires_report_and_location() {
    let exporter = DocumentExporter::new(Arc::new(FakeAssetFetcher::new()));

    let mut session = finished_session();
    session.report = None;
    let err = exporter.lay_out(&session).await.unwrap_err();
    assert!(matches!(err, ValuationError::Input(_)));

    let mut session = finished_session();
    session.location = None;
    let err = exporter.lay_out(&session).await.unwrap_err();
    assert!(matches!(err, ValuationError::Input(_)));
}

#[tokio::test]
async fn test_export_renders_all_sections() {
    let fetcher = Arc::new(FakeAssetFetcher::new());
    let session = finished_session();
    assets_for(&session, &fetcher);

    let exporter = DocumentExporter::new(fetcher);
    let (name, bytes) = exporter
        .export(&session, &PlainPageRenderer::new())
        .await
        .expect("export failed");

    assert_eq!(name, "12_Main_St__Kingston.txt");
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("Valuation Report"));
    assert!(text.contains("12 Main St, Kingston"));
    assert!(text.contains("[image: Location map (3 bytes)]"));
    assert!(text.contains("Score: 8.0 / 10"));
    assert!(text.contains("renovated kitchen with island"));
    assert!(text.contains("Visual inspection from photos."));
}

/// A failed asset fetch degrades to a placeholder line, never an error.
#[tokio::test]
async fn test_export_degrades_missing_assets_to_placeholders() {
    let fetcher = Arc::new(FakeAssetFetcher::new());
    let session = finished_session();
    // Only the first photo is available; map tile and second photo 404.
    fetcher.insert(&session.evaluated_images[0].url, vec![7]);

    let exporter = DocumentExporter::new(fetcher);
    let document = exporter.lay_out(&session).await.expect("export failed");

    let blocks: Vec<&Block> = document.pages.iter().flat_map(|p| &p.blocks).collect();
    assert!(blocks
        .iter()
        .any(|b| matches!(b, Block::Placeholder(t) if t == "[Location map unavailable]")));
    assert!(blocks
        .iter()
        .any(|b| matches!(b, Block::Image { caption, .. } if caption == "Image 1")));
    assert!(blocks
        .iter()
        .any(|b| matches!(b, Block::Placeholder(t) if t == "[Image 2 unavailable]")));
}

#[tokio::test]
async fn test_export_paginates_long_reports() {
    let fetcher = Arc::new(FakeAssetFetcher::new());
    let mut session = finished_session();
    session.evaluated_images.clear();
    session.report = Some(
        (0..120)
            .map(|i| format!("paragraph line {i}"))
            .collect::<Vec<_>>()
            .join("\n"),
    );
    assets_for(&session, &fetcher);

    let exporter = DocumentExporter::new(fetcher).with_layout(PageLayout {
        width: 60,
        height: 20,
        image_height: 6,
    });
    let document = exporter.lay_out(&session).await.expect("export failed");
    assert!(document.pages.len() > 1);
    // Every page fits in the vertical budget: at most `height` lines of
    // height-1 blocks (headings count double, images six).
    for page in &document.pages {
        let used: usize = page
            .blocks
            .iter()
            .map(|b| match b {
                Block::Heading(_) => 2,
                Block::Image { .. } => 6,
                _ => 1,
            })
            .sum();
        assert!(used <= 20, "page overflows: {used}");
    }
}
