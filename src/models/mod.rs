//! Data models for the site's content
//!
//! Every struct here is the result shape of one or more named queries.
//! Documents are read-only: they are authored in the CMS studio and only
//! ever deserialized by this crate.
//! - Image: asset references and image fields
//! - RichText: block content (text blocks, inline images)
//! - Tour, Destination, Blog, Testimonial, Site: the document types

pub mod blog;
pub mod destination;
pub mod image;
pub mod rich_text;
pub mod site;
pub mod testimonial;
pub mod tour;

// Re-export all public types for convenient access
pub use blog::{ALL_CATEGORIES, Author, BlogPost, BlogPostSummary, PostFilter, featured_posts};
pub use destination::{
    Attraction, CtaSection, DestinationDetail, DestinationSummary, DestinationTour, HeroTags,
    QuickFacts, WhyVisitPoint,
};
pub use image::{AssetId, Crop, Hotspot, Image, ImageAsset};
pub use rich_text::{ImageBlock, RichBlock, Span, TextBlock};
pub use site::{ContactInfo, SeoDefaults, SiteSettings, SocialMedia};
pub use testimonial::{Testimonial, TestimonialTour};
pub use tour::{Difficulty, DestinationRef, TourCategory, TourDetail, TourSummary, TourType};

use serde::{Deserialize, Deserializer};

/// Projections return `null` for absent fields; treat that like a missing one.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a projected slug string or the raw `{ "current": "..." }` object.
pub(crate) fn slug<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawSlug {
        Plain(String),
        Object { current: String },
    }

    Ok(match RawSlug::deserialize(deserializer)? {
        RawSlug::Plain(slug) | RawSlug::Object { current: slug } => slug,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "slug")]
        slug: String,
        #[serde(default, deserialize_with = "null_as_default")]
        tags: Vec<String>,
    }

    #[test]
    fn test_slug_accepts_both_shapes() {
        let plain: Probe = serde_json::from_str(r#"{"slug": "ella-rock"}"#).unwrap();
        assert_eq!(plain.slug, "ella-rock");

        let object: Probe =
            serde_json::from_str(r#"{"slug": {"_type": "slug", "current": "ella-rock"}}"#).unwrap();
        assert_eq!(object.slug, "ella-rock");
    }

    #[test]
    fn test_null_and_missing_lists_are_empty() {
        let null: Probe = serde_json::from_str(r#"{"slug": "a", "tags": null}"#).unwrap();
        assert!(null.tags.is_empty());

        let missing: Probe = serde_json::from_str(r#"{"slug": "a"}"#).unwrap();
        assert!(missing.tags.is_empty());
    }
}
