//! Destination documents

use serde::{Deserialize, Serialize};

use super::{Image, RichBlock, null_as_default, slug};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "slug")]
    pub slug: String,
    #[serde(default)]
    pub image: Option<Image>,
}

/// Info boxes shown on the hero image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroTags {
    #[serde(default)]
    pub best_for: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub climate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickFacts {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub population: Option<String>,
    #[serde(default)]
    pub time_zone: Option<String>,
    #[serde(default)]
    pub best_months: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhyVisitPoint {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CtaSection {
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub subheadline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A tour listed on its destination's page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationTour {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "slug")]
    pub slug: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(deserialize_with = "slug")]
    pub slug: String,
    #[serde(default)]
    pub image: Option<Image>,
    #[serde(default)]
    pub hero_image_url: Option<String>,
    #[serde(default)]
    pub hero_tags: Option<HeroTags>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub overview_description: Vec<RichBlock>,
    #[serde(default)]
    pub quick_facts: Option<QuickFacts>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub why_visit_points: Vec<WhyVisitPoint>,
    #[serde(default)]
    pub cta_section: Option<CtaSection>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_attractions: Vec<Attraction>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub best_time_to_visit: Vec<RichBlock>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub getting_around: Vec<RichBlock>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub local_tips: Vec<RichBlock>,
    /// Tours referencing this destination
    #[serde(default, deserialize_with = "null_as_default")]
    pub tours: Vec<DestinationTour>,
}
