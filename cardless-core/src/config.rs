//! Configuration management
//!
//! The API secret pair and connection settings, either given directly or read
//! from the environment:
//!
//! | Variable                | Required | Default                                          |
//! |-------------------------|----------|--------------------------------------------------|
//! | `CARDLESS_SECRET_ID`    | yes      |                                                  |
//! | `CARDLESS_SECRET_KEY`   | yes      |                                                  |
//! | `CARDLESS_BASE_URL`     | no       | `https://bankaccountdata.gocardless.com/api/v2`  |
//! | `CARDLESS_TIMEOUT_SECS` | no       | `120`                                            |

use std::fmt;
use std::time::Duration;

use crate::adapters::http::DEFAULT_TIMEOUT;
use crate::domain::result::{Error, Result};

/// Default production API URL
pub const PRODUCTION_BASE_URL: &str = "https://bankaccountdata.gocardless.com/api/v2";

pub const SECRET_ID_ENV: &str = "CARDLESS_SECRET_ID";
pub const SECRET_KEY_ENV: &str = "CARDLESS_SECRET_KEY";
/// Override the API base URL (sandbox, mock server)
pub const BASE_URL_ENV: &str = "CARDLESS_BASE_URL";
pub const TIMEOUT_ENV: &str = "CARDLESS_TIMEOUT_SECS";

/// Client configuration
#[derive(Clone)]
pub struct Config {
    pub secret_id: String,
    pub secret_key: String,
    /// Base URL without trailing slash
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    /// Configuration for the production API
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        let secret_id = secret_id.into();
        let secret_key = secret_key.into();
        if secret_id.trim().is_empty() {
            return Err(Error::Config("secret id cannot be empty".to_string()));
        }
        if secret_key.trim().is_empty() {
            return Err(Error::Config("secret key cannot be empty".to_string()));
        }

        Ok(Self {
            secret_id,
            secret_key,
            base_url: PRODUCTION_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Load configuration from `CARDLESS_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_id = lookup(SECRET_ID_ENV)
            .ok_or_else(|| Error::Config(format!("{} is not set", SECRET_ID_ENV)))?;
        let secret_key = lookup(SECRET_KEY_ENV)
            .ok_or_else(|| Error::Config(format!("{} is not set", SECRET_KEY_ENV)))?;

        let mut config = Self::new(secret_id, secret_key)?;

        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(&url);
        }

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("{} must be a number of seconds, got '{}'", TIMEOUT_ENV, raw))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
