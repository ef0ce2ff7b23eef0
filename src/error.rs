//! Error types and handling for the content layer

use thiserror::Error;

/// Main error type for the content client and its callers
#[derive(Error, Debug)]
pub enum CmsError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Network failures: unreachable host, TLS, timeouts
    #[error("Transport error: {source}")]
    Transport {
        #[from]
        source: reqwest::Error,
    },

    /// The content store rejected our credentials
    #[error("Unauthorized (HTTP {status})")]
    Unauthorized { status: u16 },

    /// The content store rejected the query itself
    #[error("Query error ({kind}): {description}")]
    Query { kind: String, description: String },

    /// Any other non-success response
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Response or result did not match the expected shape
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// An image asset reference could not be parsed
    #[error("Invalid asset reference: {reference}")]
    InvalidAssetRef { reference: String },
}

impl CmsError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(status: u16, message: S) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a new decode error
    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn invalid_asset<S: Into<String>>(reference: S) -> Self {
        Self::InvalidAssetRef {
            reference: reference.into(),
        }
    }

    /// Whether the failure might go away on its own (network trouble, 5xx)
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            CmsError::Transport { .. } => true,
            CmsError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CmsError::Config { .. } => {
                "Configuration error. Please check your config file and CMS credentials.".to_string()
            }
            CmsError::Transport { .. } => {
                "Unable to reach the content service. Please try again later.".to_string()
            }
            CmsError::Unauthorized { .. } => {
                "The content service rejected our credentials. Please check the API token."
                    .to_string()
            }
            CmsError::Query { .. } | CmsError::Decode { .. } => {
                "Content could not be loaded right now.".to_string()
            }
            CmsError::Api { status, .. } => {
                format!("The content service answered with an error (HTTP {status}).")
            }
            CmsError::InvalidAssetRef { reference } => {
                format!("Invalid image reference: {reference}")
            }
        }
    }
}

impl From<serde_json::Error> for CmsError {
    fn from(err: serde_json::Error) -> Self {
        CmsError::decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = CmsError::config("missing project id");
        assert!(matches!(config_err, CmsError::Config { .. }));

        let api_err = CmsError::api(500, "boom");
        assert!(matches!(api_err, CmsError::Api { status: 500, .. }));

        let decode_err = CmsError::decode("expected a string");
        assert!(matches!(decode_err, CmsError::Decode { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = CmsError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = CmsError::api(503, "unavailable");
        assert!(api_err.user_message().contains("503"));

        let asset_err = CmsError::invalid_asset("file-abc");
        assert!(asset_err.user_message().contains("file-abc"));
    }

    #[test]
    fn test_transient_classification() {
        assert!(CmsError::api(502, "bad gateway").is_transient());
        assert!(CmsError::api(429, "slow down").is_transient());
        assert!(!CmsError::api(404, "missing").is_transient());
        assert!(!CmsError::Unauthorized { status: 401 }.is_transient());
        assert!(!CmsError::config("x").is_transient());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("\"nope\"").unwrap_err();
        let cms_err: CmsError = json_err.into();
        assert!(matches!(cms_err, CmsError::Decode { .. }));
    }
}
