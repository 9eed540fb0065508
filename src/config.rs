//! Startup configuration.
//!
//! All settings are read once, when the process starts, and handed to the
//! components that need them.  Nothing reads the environment afterwards.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::fonts::{FontSources, DEFAULT_SYSTEM_FONTS_DIR};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "STUDY_GUIDE_MODEL";
pub const API_URL_VAR: &str = "STUDY_GUIDE_API_URL";
pub const TIMEOUT_VAR: &str = "STUDY_GUIDE_TIMEOUT_SECS";
pub const ADDR_VAR: &str = "STUDY_GUIDE_ADDR";
pub const TITLE_VAR: &str = "STUDY_GUIDE_TITLE";
pub const FONTS_DIR_VAR: &str = "STUDY_GUIDE_FONTS_DIR";
pub const SYSTEM_FONTS_DIR_VAR: &str = "STUDY_GUIDE_SYSTEM_FONTS_DIR";

pub const DEFAULT_MODEL: &str = "models/gemini-2.5-flash";
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_TITLE: &str = "Study Guide";

/// Settings for the content service client.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// `None` keeps the HTTP client's own default.
    pub timeout: Option<Duration>,
}

impl ServiceConfig {
    /// Creates a configuration for the default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: DEFAULT_API_URL.to_owned(),
            timeout: None,
        }
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub service: ServiceConfig,
    pub bind_addr: String,
    pub document_title: String,
    /// Explicit font directory, searched before the default locations.
    pub fonts_dir: Option<PathBuf>,
    /// Directory holding the system fallback fonts.
    pub system_fonts_dir: PathBuf,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, treating empty values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let api_key = get(API_KEY_VAR).ok_or(ConfigError::MissingVar(API_KEY_VAR))?;

        let timeout = match get(TIMEOUT_VAR) {
            Some(raw) => {
                let secs = raw.parse::<u64>().map_err(|err| ConfigError::Invalid {
                    var: TIMEOUT_VAR,
                    message: format!("'{raw}' is not a number of seconds ({err})"),
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            service: ServiceConfig {
                api_key,
                model: get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
                base_url: get(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
                timeout,
            },
            bind_addr: get(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_owned()),
            document_title: get(TITLE_VAR).unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
            fonts_dir: get(FONTS_DIR_VAR).map(PathBuf::from),
            system_fonts_dir: get(SYSTEM_FONTS_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SYSTEM_FONTS_DIR)),
        })
    }

    /// Font search locations for the PDF renderer.
    pub fn font_sources(&self) -> FontSources {
        FontSources::standard(self.fonts_dir.clone(), self.system_fonts_dir.clone())
    }
}
