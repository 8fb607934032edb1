// src/config.rs
use std::fmt;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_GENDER_URL: &str =
    "https://api-inference.huggingface.co/models/rizvandwiki/gender-classification";
pub const DEFAULT_DETECTOR_URL: &str =
    "https://api-inference.huggingface.co/models/umm-maybe/AI-image-detector";

pub const API_KEY_VAR: &str = "HUGGINGFACE_API_KEY";
pub const GENDER_URL_VAR: &str = "GENDER_MODEL_URL";
pub const DETECTOR_URL_VAR: &str = "DETECTOR_MODEL_URL";
pub const TIMEOUT_VAR: &str = "INFERENCE_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set; export your Hugging Face API token or pass --api-key")]
    MissingApiKey(&'static str),

    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Which remote model a request goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Gender,
    Detector,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Gender => write!(f, "gender"),
            Endpoint::Detector => write!(f, "detector"),
        }
    }
}

/// Endpoint URLs plus the bearer credential, fixed for the life of the process.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub gender_url: String,
    pub detector_url: String,
    /// `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

// keep the token out of logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("gender_url", &self.gender_url)
            .field("detector_url", &self.detector_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            gender_url: DEFAULT_GENDER_URL.to_string(),
            detector_url: DEFAULT_DETECTOR_URL.to_string(),
            timeout: None,
        }
    }

    /// Build from the environment. A missing or blank API key fails here
    /// instead of letting every request die with 401.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = non_empty_var(API_KEY_VAR).ok_or(ConfigError::MissingApiKey(API_KEY_VAR))?;

        let mut config = Self::new(api_key.trim());
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Optional URL and timeout settings; independent of where the key came from.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(url) = non_empty_var(GENDER_URL_VAR) {
            self.gender_url = url;
        }
        if let Some(url) = non_empty_var(DETECTOR_URL_VAR) {
            self.detector_url = url;
        }
        if let Some(raw) = non_empty_var(TIMEOUT_VAR) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: TIMEOUT_VAR,
                value: raw.clone(),
            })?;
            self.timeout = Some(Duration::from_secs(secs));
        }
        Ok(())
    }

    /// Environment first, then whatever the command line supplied on top.
    /// The API key may come from the flag alone.
    pub fn resolve(
        api_key: Option<String>,
        gender_url: Option<String>,
        detector_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match api_key.filter(|key| !key.trim().is_empty()) {
            Some(key) => {
                let mut config = Self::new(key.trim());
                config.apply_env_overrides()?;
                config
            }
            None => Self::from_env()?,
        };

        if let Some(url) = gender_url {
            config.gender_url = url;
        }
        if let Some(url) = detector_url {
            config.detector_url = url;
        }
        Ok(config)
    }

    pub fn url_for(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Gender => &self.gender_url,
            Endpoint::Detector => &self.detector_url,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
