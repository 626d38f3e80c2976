//! Valora - AI-assisted property valuation workflow
//!
//! The `valora` command runs one full valuation session from the shell:
//! scores the images in a directory, estimates a price range, searches
//! for comparables, drafts the report, and writes the exported document.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use valora_client::{
    ApiConfig, HttpAssetFetcher, HttpPropertyApi, HttpReportDrafter, HttpRoomScorer,
};
use valora_core::{
    DocumentExporter, Location, PlainPageRenderer, PropertyDetails, Session, UploadedImage,
    ValuationWorkflow,
};

#[derive(Parser)]
#[command(name = "valora")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run a property valuation session", long_about = None)]
struct Cli {
    /// Directory of room images to evaluate (one upload per file)
    #[arg(long)]
    images: PathBuf,

    /// Property type (House, Apartment, Townhouse, Commercial, Land)
    #[arg(long)]
    property_type: String,

    /// Square footage
    #[arg(long)]
    sqft: f64,

    #[arg(long, default_value_t = 0)]
    bedrooms: u32,

    #[arg(long, default_value_t = 0)]
    bathrooms: u32,

    /// Parish of the subject property (required for comparable search)
    #[arg(long)]
    parish: Option<String>,

    /// Formatted address of the subject property
    #[arg(long)]
    address: Option<String>,

    /// Latitude of the picked location
    #[arg(long)]
    lat: Option<f64>,

    /// Longitude of the picked location
    #[arg(long)]
    lng: Option<f64>,

    /// Directory for the exported document
    #[arg(long, default_value = ".")]
    output: PathBuf,

    /// User id sent to the scoring service
    #[arg(long, default_value = "valora-cli")]
    user: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let images = load_images(&cli.images)
        .with_context(|| format!("reading images from {}", cli.images.display()))?;
    info!(count = images.len(), "loaded images");

    let mut session = Session::new(PropertyDetails {
        address: cli.address.clone(),
        property_type: cli.property_type.clone(),
        sqft: cli.sqft,
        bedrooms: cli.bedrooms,
        bathrooms: cli.bathrooms,
        parish: cli.parish.clone(),
    });
    if let (Some(lat), Some(lng)) = (cli.lat, cli.lng) {
        session.set_location(Location {
            address: cli.address.clone().unwrap_or_default(),
            lat,
            lng,
        });
    }

    let config = ApiConfig::from_env();
    let mut workflow = ValuationWorkflow::new(
        session,
        Arc::new(HttpRoomScorer::new(config.clone(), &cli.user)),
        Arc::new(HttpPropertyApi::new(config.clone())),
        Arc::new(HttpReportDrafter::new(config.clone())),
    );

    let average = workflow.run_evaluation(&images).await?;
    println!("Average aesthetic score: {average:.2} / 10");
    for image in &workflow.session().evaluated_images {
        println!("  {:.1}  {}", image.score, image.url);
    }

    let range = workflow.run_estimation().await?;
    println!(
        "Estimated value: {} (range {} - {})",
        range.median_price, range.min_price, range.max_price
    );

    let comparables = workflow.run_comparables().await?;
    if comparables.is_empty() {
        warn!("no comparable properties found; report proceeds without them");
    } else {
        println!(
            "Found {} comparable listing(s), {} search result(s)",
            comparables.similar_properties.len(),
            comparables.google_search_results.len()
        );
    }

    workflow.run_report().await?;
    println!("Report drafted.");

    if workflow.session().location.is_some() {
        let exporter = DocumentExporter::new(Arc::new(HttpAssetFetcher::new(config)));
        let (name, bytes) = exporter
            .export(workflow.session(), &PlainPageRenderer::new())
            .await?;
        let path = cli.output.join(&name);
        fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        println!("Exported document: {}", path.display());
    } else {
        warn!("no location set; skipping document export");
    }

    Ok(())
}

/// Read every regular file in the directory as one upload, in sorted
/// file-name order (this fixes the session's image order).
fn load_images(dir: &Path) -> Result<Vec<UploadedImage>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut images = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        images.push(UploadedImage {
            url: path.display().to_string(),
            bytes,
        });
    }
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_images_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.jpg"), b"bbb").unwrap();
        fs::write(dir.path().join("a.jpg"), b"aaa").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let images = load_images(dir.path()).unwrap();
        assert_eq!(images.len(), 2);
        assert!(images[0].url.ends_with("a.jpg"));
        assert!(images[1].url.ends_with("b.jpg"));
        assert_eq!(images[0].bytes, b"aaa");
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
