//! Tour documents

use serde::{Deserialize, Deserializer, Serialize};

use super::{Image, null_as_default, slug};

// Values outside the studio option lists decode as `Other`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TourCategory {
    Cultural,
    Adventure,
    Wildlife,
    Beach,
    Family,
    Luxury,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Challenging,
    #[serde(other)]
    Other,
}

/// Stored as `duration_type` on the document, projected as `tourType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TourType {
    HalfDay,
    FullDay,
    MultiDay,
    #[serde(other)]
    Other,
}

/// The expanded `destination->{name, "slug": slug.current}` of a tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationRef {
    pub name: String,
    #[serde(deserialize_with = "slug")]
    pub slug: String,
}

/// Tour as listed on cards and index pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "slug")]
    pub slug: String,
    #[serde(deserialize_with = "price")]
    pub price: f64,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<TourCategory>,
    /// Present only when the query expands the reference
    #[serde(default)]
    pub destination: Option<DestinationRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
}

impl TourSummary {
    /// First gallery image, the one shown on cards
    #[must_use]
    pub fn cover(&self) -> Option<&Image> {
        self.images.first()
    }
}

/// Everything the tour page shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(deserialize_with = "slug")]
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(deserialize_with = "price")]
    pub price: f64,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<TourCategory>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub tour_type: Option<TourType>,
    #[serde(default)]
    pub destination: Option<DestinationRef>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub included: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub not_included: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(default)]
    pub seo_title: Option<String>,
    #[serde(default)]
    pub seo_description: Option<String>,
}

impl TourDetail {
    #[must_use]
    pub fn seo_title(&self) -> &str {
        self.seo_title.as_deref().unwrap_or(&self.title)
    }

    #[must_use]
    pub fn seo_description(&self) -> Option<&str> {
        self.seo_description
            .as_deref()
            .or(self.description.as_deref())
    }
}

fn price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(serde::de::Error::custom(format!(
            "tour price must be a non-negative number, got {value}"
        )))
    }
}
