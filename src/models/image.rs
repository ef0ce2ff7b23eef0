//! Image fields and asset references

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::CmsError;

/// Parsed image asset identity: `image-<id>-<W>x<H>-<format>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

impl AssetId {
    /// Parse an asset reference (`image-...`) or a CDN URL of the same asset
    pub fn parse(reference: &str) -> Result<Self, CmsError> {
        let reference = reference.trim();
        let parsed = if reference.starts_with("http://") || reference.starts_with("https://") {
            Self::parse_url(reference)
        } else {
            Self::parse_ref(reference)
        };
        parsed.ok_or_else(|| CmsError::invalid_asset(reference))
    }

    fn parse_ref(reference: &str) -> Option<Self> {
        let rest = reference.strip_prefix("image-")?;
        let mut parts = rest.rsplitn(3, '-');
        let format = parts.next()?;
        let dimensions = parts.next()?;
        let id = parts.next()?;
        Self::build(id, dimensions, format)
    }

    fn parse_url(url: &str) -> Option<Self> {
        let path = url.split(['?', '#']).next()?;
        if !path.contains("/images/") {
            return None;
        }
        let file = path.rsplit('/').next()?;
        let (stem, format) = file.rsplit_once('.')?;
        let (id, dimensions) = stem.rsplit_once('-')?;
        Self::build(id, dimensions, format)
    }

    fn build(id: &str, dimensions: &str, format: &str) -> Option<Self> {
        let (width, height) = dimensions.split_once('x')?;
        let valid = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid(id) || !valid(format) {
            return None;
        }
        Some(Self {
            id: id.to_string(),
            width: width.parse().ok()?,
            height: height.parse().ok()?,
            format: format.to_string(),
        })
    }

    /// File name on the image CDN, e.g. `abc-2000x3000.jpg`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}-{}x{}.{}", self.id, self.width, self.height, self.format)
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "image-{}-{}x{}-{}",
            self.id, self.width, self.height, self.format
        )
    }
}

impl TryFrom<String> for AssetId {
    type Error = CmsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AssetId> for String {
    fn from(value: AssetId) -> Self {
        value.to_string()
    }
}

/// The `asset` of an image field: a bare reference or an expanded asset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// `reference` when unexpanded, `sanity.imageAsset` when expanded
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "_ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Low-quality placeholder, when the query projects `metadata.lqip`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lqip: Option<String>,
}

impl ImageAsset {
    /// First of `_ref`, `_id`, `url` that parses as an asset id
    #[must_use]
    pub fn asset_id(&self) -> Option<AssetId> {
        [&self.reference, &self.id, &self.url]
            .into_iter()
            .flatten()
            .find_map(|candidate| AssetId::parse(candidate).ok())
    }
}

/// Focal point chosen in the studio, as fractions of the image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
    pub height: f64,
    pub width: f64,
}

/// Crop insets, as fractions of the image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

/// An image field on a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub asset: Option<ImageAsset>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotspot: Option<Hotspot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
}

impl Image {
    /// The asset behind this field, if the field is filled in and well formed
    #[must_use]
    pub fn asset_id(&self) -> Option<AssetId> {
        self.asset.as_ref()?.asset_id()
    }

    #[must_use]
    pub fn lqip(&self) -> Option<&str> {
        self.asset.as_ref()?.lqip.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg", "Tb9Ew8CXIwaY6R1kjMvI0uRR", 2000, 3000, "jpg")]
    #[case("image-abc123-640x480-png", "abc123", 640, 480, "png")]
    #[case(
        "https://cdn.sanity.io/images/p1/production/abc123-640x480.webp?w=100",
        "abc123",
        640,
        480,
        "webp"
    )]
    fn test_parse_asset_id(
        #[case] reference: &str,
        #[case] id: &str,
        #[case] width: u32,
        #[case] height: u32,
        #[case] format: &str,
    ) {
        let asset = AssetId::parse(reference).unwrap();
        assert_eq!(asset.id, id);
        assert_eq!(asset.width, width);
        assert_eq!(asset.height, height);
        assert_eq!(asset.format, format);
    }

    #[rstest]
    #[case("")]
    #[case("file-abc123-pdf")]
    #[case("image-abc123-640x480")]
    #[case("image-abc123-640by480-jpg")]
    #[case("https://example.com/photos/abc123-640x480.jpg")]
    fn test_reject_malformed(#[case] reference: &str) {
        assert!(matches!(
            AssetId::parse(reference),
            Err(CmsError::InvalidAssetRef { .. })
        ));
    }

    #[test]
    fn test_display_round_trips_reference() {
        let reference = "image-abc123-640x480-png";
        assert_eq!(AssetId::parse(reference).unwrap().to_string(), reference);
        assert_eq!(AssetId::parse(reference).unwrap().file_name(), "abc123-640x480.png");
    }

    #[test]
    fn test_image_with_reference() {
        let image: Image = serde_json::from_value(serde_json::json!({
            "_type": "image",
            "asset": {"_type": "reference", "_ref": "image-abc123-640x480-jpg"},
            "alt": "Sigiriya at dawn",
            "hotspot": {"x": 0.5, "y": 0.4, "height": 0.2, "width": 0.3}
        }))
        .unwrap();

        assert_eq!(image.asset_id().unwrap().id, "abc123");
        assert_eq!(image.alt.as_deref(), Some("Sigiriya at dawn"));
        assert!(image.hotspot.is_some());
    }

    #[test]
    fn test_image_with_expanded_asset() {
        let image: Image = serde_json::from_value(serde_json::json!({
            "asset": {
                "url": "https://cdn.sanity.io/images/p1/production/abc123-640x480.jpg",
                "lqip": "data:image/jpeg;base64,AAAA"
            }
        }))
        .unwrap();

        assert_eq!(image.asset_id().unwrap().width, 640);
        assert_eq!(image.lqip(), Some("data:image/jpeg;base64,AAAA"));
    }

    #[test]
    fn test_image_without_asset() {
        let image: Image = serde_json::from_value(serde_json::json!({"alt": "pending upload"})).unwrap();
        assert!(image.asset_id().is_none());
        assert!(image.lqip().is_none());

        let broken = Image {
            asset: Some(ImageAsset {
                reference: Some("not-an-image".to_string()),
                ..ImageAsset::default()
            }),
            ..Image::default()
        };
        assert!(broken.asset_id().is_none());
    }
}
