use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::capabilities::{CaptureConfig, FixOptions};
use crate::model::Coordinate;

pub const DEFAULT_WELCOME_MESSAGE: &str =
    "👋 Welcome! This chat is ready — type below or use the buttons.";
pub const DEFAULT_MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/";
pub const MAX_WELCOME_LENGTH: usize = 512;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid maps url {url}: {reason}")]
    InvalidMapsUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Show the rationale dialog before touching OS permissions.
    pub explain_before_request: bool,
    pub location: FixOptions,
    pub camera: CaptureConfig,
    pub welcome_message: String,
    pub maps_search_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            explain_before_request: true,
            location: FixOptions::default(),
            camera: CaptureConfig::default(),
            welcome_message: DEFAULT_WELCOME_MESSAGE.into(),
            maps_search_url: DEFAULT_MAPS_SEARCH_URL.into(),
        }
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.maps_base()?;
        Ok(config.validated())
    }

    #[must_use]
    pub fn with_explain_before_request(mut self, explain: bool) -> Self {
        self.explain_before_request = explain;
        self
    }

    #[must_use]
    pub fn with_location_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.location = self.location.with_timeout_ms(timeout_ms);
        self
    }

    #[must_use]
    pub fn with_welcome_message(mut self, message: impl Into<String>) -> Self {
        self.welcome_message = message.into();
        self
    }

    /// Clamps out-of-range values; an unusable maps URL falls back to the default.
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.location = self.location.validated();
        if self.welcome_message.len() > MAX_WELCOME_LENGTH {
            let mut cut = MAX_WELCOME_LENGTH;
            while !self.welcome_message.is_char_boundary(cut) {
                cut -= 1;
            }
            self.welcome_message.truncate(cut);
        }
        if let Err(e) = self.maps_base() {
            tracing::warn!(error = %e, "falling back to default maps url");
            self.maps_search_url = DEFAULT_MAPS_SEARCH_URL.into();
        }
        self
    }

    fn maps_base(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.maps_search_url).map_err(|e| ConfigError::InvalidMapsUrl {
            url: self.maps_search_url.clone(),
            reason: e.to_string(),
        })?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(ConfigError::InvalidMapsUrl {
                url: self.maps_search_url.clone(),
                reason: "scheme must be http or https".into(),
            });
        }
        Ok(url)
    }

    /// `{maps_search_url}?api=1&query={lat},{lng}`
    pub fn map_search_url(&self, coordinate: Coordinate) -> Result<Url, ConfigError> {
        let mut url = self.maps_base()?;
        url.set_query(Some(&format!("api=1&query={coordinate}")));
        Ok(url)
    }
}
