//! Configuration management for `tourcms`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings. The CMS
//! identifiers have no defaults: a deployment without them must fail at
//! startup instead of quietly rendering empty pages.

use crate::CmsError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourCmsConfig {
    /// Content store connection settings
    pub cms: CmsConfig,
    /// Image transform defaults for API payloads
    #[serde(default)]
    pub images: ImageConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// JSON API server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Content store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CmsConfig {
    /// Project identifier
    pub project_id: String,
    /// Dataset name, e.g. `production`
    pub dataset: String,
    /// Dated API version, e.g. `2024-07-15`
    pub api_version: String,
    /// Read token sent as a bearer credential
    pub token: String,
    /// Read through the API CDN instead of the live API
    #[serde(default)]
    pub use_cdn: bool,
    /// Overrides `https://<project>.api.sanity.io` (proxies, local mocks)
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Base URL of the image CDN
    #[serde(default = "default_image_cdn")]
    pub image_cdn: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Maximum width used when pre-building image URLs
    #[serde(default = "default_image_max_width")]
    pub max_width: u32,
    /// Let the CDN pick the best format for the client
    #[serde(default = "default_auto_format")]
    pub auto_format: bool,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

// Default value functions
fn default_image_cdn() -> String {
    "https://cdn.sanity.io".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_image_max_width() -> u32 {
    800
}

fn default_auto_format() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_width: default_image_max_width(),
            auto_format: default_auto_format(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Environment variables the site has always used for its CMS credentials,
/// first match wins. They take precedence over the file and `TOURCMS_*` values.
const LEGACY_ENV_OVERRIDES: [(&str, &[&str]); 4] = [
    (
        "cms.project_id",
        &["SANITY_PROJECT_ID", "NEXT_PUBLIC_SANITY_PROJECT_ID"],
    ),
    ("cms.dataset", &["SANITY_DATASET", "NEXT_PUBLIC_SANITY_DATASET"]),
    ("cms.api_version", &["SANITY_API_VERSION"]),
    ("cms.token", &["SANITY_API_TOKEN"]),
];

/// First non-empty value among `vars`
fn legacy_value(vars: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    vars.iter()
        .filter_map(|var| lookup(var))
        .find(|value| !value.trim().is_empty())
}

impl CmsConfig {
    /// Build a connection config with defaults for everything optional
    pub fn new(
        project_id: impl Into<String>,
        dataset: impl Into<String>,
        api_version: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
            api_version: api_version.into(),
            token: token.into(),
            use_cdn: false,
            endpoint: None,
            image_cdn: default_image_cdn(),
            timeout_seconds: default_timeout(),
        }
    }

    /// API version as it appears in the request path, without the `v`
    #[must_use]
    pub fn normalized_api_version(&self) -> &str {
        self.api_version
            .strip_prefix('v')
            .unwrap_or(&self.api_version)
    }

    /// Base URL for query requests, without trailing slash
    #[must_use]
    pub fn api_base_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => {
                let host = if self.use_cdn { "apicdn" } else { "api" };
                format!("https://{}.{}.sanity.io", self.project_id, host)
            }
        }
    }

    /// Validate identifiers, credentials and ranges
    pub fn validate(&self) -> std::result::Result<(), CmsError> {
        if self.project_id.is_empty() {
            return Err(CmsError::config("CMS project id is required"));
        }
        if !self
            .project_id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(CmsError::config(format!(
                "CMS project id '{}' may only contain a-z, 0-9 and dashes",
                self.project_id
            )));
        }

        if self.dataset.is_empty() {
            return Err(CmsError::config("CMS dataset is required"));
        }
        if self.dataset.len() > 64
            || !self.dataset.starts_with(|c: char| c.is_ascii_alphanumeric())
            || !self.dataset.chars().all(|c| {
                c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-'
            })
        {
            return Err(CmsError::config(format!(
                "CMS dataset '{}' must be lowercase alphanumeric (with _ or -), at most 64 characters",
                self.dataset
            )));
        }

        if self.api_version.is_empty() {
            return Err(CmsError::config("CMS API version is required"));
        }
        let version = self.normalized_api_version();
        if version != "1"
            && version != "X"
            && NaiveDate::parse_from_str(version, "%Y-%m-%d").is_err()
        {
            return Err(CmsError::config(format!(
                "Invalid CMS API version '{}'. Use a date like 2024-07-15",
                self.api_version
            )));
        }

        if self.token.trim().is_empty() {
            return Err(CmsError::config("CMS read token is required"));
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 300 {
            return Err(CmsError::config(
                "CMS request timeout must be between 1 and 300 seconds",
            ));
        }

        for (name, url) in [
            ("endpoint", self.endpoint.as_deref()),
            ("image CDN", Some(self.image_cdn.as_str())),
        ] {
            if let Some(url) = url {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(CmsError::config(format!(
                        "CMS {name} must be a valid HTTP or HTTPS URL"
                    )));
                }
            }
        }

        Ok(())
    }
}

impl TourCmsConfig {
    /// Config with only the CMS connection set
    #[must_use]
    pub fn with_cms(cms: CmsConfig) -> Self {
        Self {
            cms,
            images: ImageConfig::default(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
        }
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TOURCMS_CMS__PROJECT_ID, TOURCMS_SERVER__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("TOURCMS")
                .prefix_separator("_")
                .separator("__"),
        );

        for (key, vars) in LEGACY_ENV_OVERRIDES {
            builder = builder
                .set_override_option(key, legacy_value(vars, |var| env::var(var).ok()))
                .with_context(|| format!("Failed to apply {}", vars.join(" / ")))?;
        }

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: TourCmsConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration (are the CMS settings present?)")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tourcms").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.cms.validate()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(CmsError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(CmsError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if self.images.max_width == 0 {
            return Err(CmsError::config("Image max width must be positive").into());
        }

        Ok(())
    }
}
