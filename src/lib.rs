//! `TourCMS` - typed content layer for a tour operator website
//!
//! This library talks to a headless CMS over its HTTP query API, decodes
//! the results into read-only models and builds image CDN URLs. A small
//! JSON API and a CLI sit on top of it.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod image_url;
pub mod logging;
pub mod models;
pub mod queries;
pub mod web;

// Re-export core types for public API
pub use client::{ContentSource, QueryParams, SanityClient};
pub use config::{CmsConfig, TourCmsConfig};
pub use error::CmsError;
pub use image_url::{ImageUrlBuilder, ImageUrls};
pub use models::{
    AssetId, BlogPost, BlogPostSummary, DestinationDetail, DestinationSummary, Image,
    SiteSettings, Testimonial, TourDetail, TourSummary,
};
pub use queries::{GroqQuery, HomePage, QueryKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, CmsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
