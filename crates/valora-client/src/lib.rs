//! Valora Client - HTTP implementations of the capability traits
//!
//! Each hosted capability gets one client type:
//! - `HttpRoomScorer`: per-image aesthetic scoring
//! - `HttpPropertyApi`: price estimation and comparable search
//! - `HttpReportDrafter`: structured bundle in, report text out
//! - `HttpAssetFetcher`: map tiles and photos for the export
//!
//! Endpoints come from [`ApiConfig`] (environment variables with
//! sensible defaults). Non-2xx responses map to
//! `ValuationError::Remote`; undecodable payloads to `DataShape`.

mod assets;
mod config;
mod drafter;
mod http;
mod property;
mod scorer;

pub use assets::HttpAssetFetcher;
pub use config::ApiConfig;
pub use drafter::HttpReportDrafter;
pub use property::HttpPropertyApi;
pub use scorer::HttpRoomScorer;
