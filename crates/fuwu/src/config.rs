//! Configuration loading and resolution.

use std::path::Path;

use serde::Deserialize;

use crate::error::{FuwuError, FuwuResult};

/// Eight years of 365.25 days.
pub const DEFAULT_COOKIE_LIFETIME_DAYS: i64 = 2922;

/// A thousand years of 365.25 days.
pub const MAX_COOKIE_LIFETIME_DAYS: i64 = 365_250;

/// Accept `days` as a persistent cookie lifetime.
pub fn check_cookie_lifetime(days: i64) -> FuwuResult<i64> {
    if (1..=MAX_COOKIE_LIFETIME_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(FuwuError::Config(format!(
            "cookie lifetime must be between 1 and {MAX_COOKIE_LIFETIME_DAYS} days, got {days}"
        )))
    }
}

/// Settings shared by the HTTP clients and the cookie accessor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Headers sent with every request, before per-request headers.
    pub default_headers: Vec<(String, String)>,
    /// Lifetime of persistent cookies written without an explicit expiry.
    pub cookie_lifetime_days: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            default_headers: Vec::new(),
            cookie_lifetime_days: DEFAULT_COOKIE_LIFETIME_DAYS,
        }
    }
}

impl ClientConfig {
    /// Defaults with `FUWU_USER_AGENT` and `FUWU_COOKIE_LIFETIME_DAYS` applied.
    pub fn from_env() -> FuwuResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> FuwuResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values a struct literal or deserializer could have left out of range.
    pub fn validate(&self) -> FuwuResult<()> {
        check_cookie_lifetime(self.cookie_lifetime_days)?;
        Ok(())
    }

    /// Read a JSON config file, then apply environment overrides.
    pub fn load(path: &Path) -> FuwuResult<Self> {
        tracing::debug!("Loading client config from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_json(&text)?;
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> FuwuResult<()> {
        self.apply_overrides(
            std::env::var("FUWU_USER_AGENT").ok(),
            std::env::var("FUWU_COOKIE_LIFETIME_DAYS").ok(),
        )
    }

    fn apply_overrides(
        &mut self,
        user_agent: Option<String>,
        lifetime_days: Option<String>,
    ) -> FuwuResult<()> {
        if let Some(ua) = user_agent {
            self.user_agent = ua;
        }

        if let Some(days) = lifetime_days {
            let days = days.trim().parse().map_err(|_| {
                FuwuError::Config(format!(
                    "FUWU_COOKIE_LIFETIME_DAYS must be a whole number of days, got '{days}'"
                ))
            })?;
            self.cookie_lifetime_days = check_cookie_lifetime(days)?;
        }

        Ok(())
    }
}

fn default_user_agent() -> String {
    format!("fuwu/{}", env!("CARGO_PKG_VERSION"))
}
