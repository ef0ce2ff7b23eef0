//! Image transform URL builder
//!
//! Builds CDN URLs of the form
//! `<cdn>/images/<project>/<dataset>/<id>-<W>x<H>.<ext>?w=..&h=..`.
//! Every setter only records a value; `url()` emits the parameters in one
//! fixed order, so the same settings always give the same URL no matter
//! in which order they were applied.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::CmsError;
use crate::config::CmsConfig;
use crate::models::{AssetId, Image};

macro_rules! url_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CmsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(CmsError::config(format!(
                        "Unknown {} '{}'", stringify!($name), other
                    ))),
                }
            }
        }
    };
}

url_enum!(
    /// How the image is fitted into the requested box
    FitMode {
        Clip => "clip",
        Crop => "crop",
        Fill => "fill",
        FillMax => "fillmax",
        Max => "max",
        Scale => "scale",
        Min => "min",
    }
);

url_enum!(
    /// Which part to keep when `fit=crop`
    CropMode {
        Top => "top",
        Bottom => "bottom",
        Left => "left",
        Right => "right",
        Center => "center",
        FocalPoint => "focalpoint",
        Entropy => "entropy",
    }
);

url_enum!(
    OutputFormat {
        Jpg => "jpg",
        Pjpg => "pjpg",
        Png => "png",
        Webp => "webp",
    }
);

url_enum!(
    /// Let the CDN choose transforms automatically
    AutoMode {
        Format => "format",
    }
);

url_enum!(
    Flip {
        Horizontal => "h",
        Vertical => "v",
        Both => "hv",
    }
);

/// Source rectangle in pixels of the original asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// Where transform URLs point: CDN host, project and dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUrls {
    cdn: String,
    project_id: String,
    dataset: String,
}

impl ImageUrls {
    pub fn new(
        cdn: impl Into<String>,
        project_id: impl Into<String>,
        dataset: impl Into<String>,
    ) -> Self {
        Self {
            cdn: cdn.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            dataset: dataset.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &CmsConfig) -> Self {
        Self::new(&config.image_cdn, &config.project_id, &config.dataset)
    }

    /// Start a builder for a known-good asset
    #[must_use]
    pub fn image(&self, asset: &AssetId) -> ImageUrlBuilder {
        ImageUrlBuilder {
            base: format!(
                "{}/images/{}/{}/{}",
                self.cdn,
                self.project_id,
                self.dataset,
                asset.file_name()
            ),
            options: TransformOptions::default(),
        }
    }

    /// Start a builder for an image field, if it has a usable asset
    #[must_use]
    pub fn for_image(&self, image: &Image) -> Option<ImageUrlBuilder> {
        image.asset_id().map(|asset| self.image(&asset))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct TransformOptions {
    rect: Option<Rect>,
    bg: Option<String>,
    focal_point: Option<(f64, f64)>,
    flip: Option<Flip>,
    width: Option<u32>,
    height: Option<u32>,
    format: Option<OutputFormat>,
    blur: Option<u32>,
    sharpen: Option<u32>,
    min_height: Option<u32>,
    max_height: Option<u32>,
    min_width: Option<u32>,
    max_width: Option<u32>,
    quality: Option<u8>,
    fit: Option<FitMode>,
    crop: Option<CropMode>,
    auto: Option<AutoMode>,
    dpr: Option<f64>,
    pad: Option<u32>,
}

/// Fluent transform builder. Setting a value twice keeps the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUrlBuilder {
    base: String,
    options: TransformOptions,
}

impl ImageUrlBuilder {
    #[must_use]
    pub fn width(mut self, px: u32) -> Self {
        self.options.width = Some(px);
        self
    }

    #[must_use]
    pub fn height(mut self, px: u32) -> Self {
        self.options.height = Some(px);
        self
    }

    #[must_use]
    pub fn size(self, width: u32, height: u32) -> Self {
        self.width(width).height(height)
    }

    #[must_use]
    pub fn min_width(mut self, px: u32) -> Self {
        self.options.min_width = Some(px);
        self
    }

    #[must_use]
    pub fn max_width(mut self, px: u32) -> Self {
        self.options.max_width = Some(px);
        self
    }

    #[must_use]
    pub fn min_height(mut self, px: u32) -> Self {
        self.options.min_height = Some(px);
        self
    }

    #[must_use]
    pub fn max_height(mut self, px: u32) -> Self {
        self.options.max_height = Some(px);
        self
    }

    #[must_use]
    pub fn fit(mut self, mode: FitMode) -> Self {
        self.options.fit = Some(mode);
        self
    }

    #[must_use]
    pub fn crop(mut self, mode: CropMode) -> Self {
        self.options.crop = Some(mode);
        self
    }

    #[must_use]
    pub fn auto(mut self, mode: AutoMode) -> Self {
        self.options.auto = Some(mode);
        self
    }

    #[must_use]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.options.format = Some(format);
        self
    }

    /// Quality 0-100, clamped
    #[must_use]
    pub fn quality(mut self, quality: u8) -> Self {
        self.options.quality = Some(quality.min(100));
        self
    }

    #[must_use]
    pub fn dpr(mut self, ratio: f64) -> Self {
        self.options.dpr = Some(ratio);
        self
    }

    #[must_use]
    pub fn blur(mut self, amount: u32) -> Self {
        self.options.blur = Some(amount);
        self
    }

    #[must_use]
    pub fn sharpen(mut self, amount: u32) -> Self {
        self.options.sharpen = Some(amount);
        self
    }

    #[must_use]
    pub fn pad(mut self, px: u32) -> Self {
        self.options.pad = Some(px);
        self
    }

    #[must_use]
    pub fn flip(mut self, flip: Flip) -> Self {
        self.options.flip = Some(flip);
        self
    }

    /// Focal point as fractions (0.0-1.0) of width and height
    #[must_use]
    pub fn focal_point(mut self, x: f64, y: f64) -> Self {
        self.options.focal_point = Some((x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)));
        self
    }

    #[must_use]
    pub fn rect(mut self, rect: Rect) -> Self {
        self.options.rect = Some(rect);
        self
    }

    /// Background color, hex without `#`
    #[must_use]
    pub fn bg(mut self, color: impl Into<String>) -> Self {
        self.options.bg = Some(color.into().trim_start_matches('#').to_string());
        self
    }

    /// The final URL
    #[must_use]
    pub fn url(&self) -> String {
        let params = self.params();
        if params.is_empty() {
            return self.base.clone();
        }
        let query = params
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.base)
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let o = &self.options;
        let mut params = Vec::new();

        if let Some(rect) = o.rect {
            params.push((
                "rect",
                format!("{},{},{},{}", rect.left, rect.top, rect.width, rect.height),
            ));
        }
        if let Some(bg) = &o.bg {
            params.push(("bg", bg.clone()));
        }
        if let Some((x, y)) = o.focal_point {
            params.push(("fp-x", x.to_string()));
            params.push(("fp-y", y.to_string()));
        }
        if let Some(flip) = o.flip {
            params.push(("flip", flip.to_string()));
        }

        let mut push = |key: &'static str, value: Option<String>| {
            if let Some(value) = value {
                params.push((key, value));
            }
        };
        push("w", o.width.map(|v| v.to_string()));
        push("h", o.height.map(|v| v.to_string()));
        push("fm", o.format.map(|v| v.to_string()));
        push("blur", o.blur.map(|v| v.to_string()));
        push("sharp", o.sharpen.map(|v| v.to_string()));
        push("min-h", o.min_height.map(|v| v.to_string()));
        push("max-h", o.max_height.map(|v| v.to_string()));
        push("min-w", o.min_width.map(|v| v.to_string()));
        push("max-w", o.max_width.map(|v| v.to_string()));
        push("q", o.quality.map(|v| v.to_string()));
        push("fit", o.fit.map(|v| v.to_string()));
        push("crop", o.crop.map(|v| v.to_string()));
        push("auto", o.auto.map(|v| v.to_string()));
        push("dpr", o.dpr.map(|v| v.to_string()));
        push("pad", o.pad.map(|v| v.to_string()));

        params
    }
}

impl Display for ImageUrlBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const BASE: &str = "https://cdn.sanity.io/images/abc123xy/production/Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000.jpg";

    #[fixture]
    fn builder() -> ImageUrlBuilder {
        let urls = ImageUrls::new("https://cdn.sanity.io/", "abc123xy", "production");
        let asset = AssetId::parse("image-Tb9Ew8CXIwaY6R1kjMvI0uRR-2000x3000-jpg").unwrap();
        urls.image(&asset)
    }

    #[rstest]
    fn test_plain_url(builder: ImageUrlBuilder) {
        assert_eq!(builder.url(), BASE);
    }

    #[rstest]
    fn test_width_height_order_independent(builder: ImageUrlBuilder) {
        let a = builder.clone().width(400).height(300).url();
        let b = builder.height(300).width(400).url();
        assert_eq!(a, b);
        assert_eq!(a, format!("{BASE}?w=400&h=300"));
    }

    #[rstest]
    fn test_full_chain_canonical_order(builder: ImageUrlBuilder) {
        let url = builder
            .auto(AutoMode::Format)
            .fit(FitMode::Max)
            .width(800)
            .quality(80)
            .dpr(2.0)
            .url();
        assert_eq!(url, format!("{BASE}?w=800&q=80&fit=max&auto=format&dpr=2"));
    }

    #[rstest]
    fn test_idempotent(builder: ImageUrlBuilder) {
        let configured = builder.width(40).height(40).fit(FitMode::Crop);
        assert_eq!(configured.url(), configured.url());
        assert_eq!(configured.to_string(), configured.url());
    }

    #[rstest]
    fn test_last_setting_wins(builder: ImageUrlBuilder) {
        let url = builder.width(100).width(250).url();
        assert_eq!(url, format!("{BASE}?w=250"));
    }

    #[rstest]
    fn test_geometry_params(builder: ImageUrlBuilder) {
        let url = builder
            .flip(Flip::Horizontal)
            .focal_point(0.25, 1.5)
            .bg("#ff0000")
            .rect(Rect {
                left: 10,
                top: 20,
                width: 300,
                height: 200,
            })
            .url();
        assert_eq!(
            url,
            format!("{BASE}?rect=10%2C20%2C300%2C200&bg=ff0000&fp-x=0.25&fp-y=1&flip=h")
        );
    }

    #[rstest]
    fn test_quality_clamped(builder: ImageUrlBuilder) {
        assert_eq!(builder.quality(150).url(), format!("{BASE}?q=100"));
    }

    #[test]
    fn test_for_image_requires_asset() {
        let urls = ImageUrls::new("https://cdn.sanity.io", "abc123xy", "production");
        assert!(urls.for_image(&Image::default()).is_none());

        let image: Image = serde_json::from_value(serde_json::json!({
            "asset": {"_ref": "image-abc-10x20-png"}
        }))
        .unwrap();
        assert_eq!(
            urls.for_image(&image).unwrap().url(),
            "https://cdn.sanity.io/images/abc123xy/production/abc-10x20.png"
        );
    }

    #[rstest]
    #[case("max", FitMode::Max)]
    #[case("fillmax", FitMode::FillMax)]
    #[case("crop", FitMode::Crop)]
    fn test_fit_mode_from_str(#[case] raw: &str, #[case] expected: FitMode) {
        assert_eq!(raw.parse::<FitMode>().unwrap(), expected);
        assert_eq!(expected.to_string(), raw);
    }

    #[test]
    fn test_unknown_fit_mode() {
        assert!("stretch".parse::<FitMode>().is_err());
    }
}
