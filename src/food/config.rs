use std::str::FromStr;
use std::time::Duration;

use super::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.logmeal.com";
pub const SEGMENTATION_PATH: &str = "/v2/image/segmentation/complete";
pub const NUTRITION_PATH: &str = "/v2/recipe/nutritionalInfo";

#[derive(Debug, Clone)]
pub struct LogMealConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl LogMealConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("LOGMEAL_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("LOGMEAL_API_KEY"))?;
        let base_url = lookup("LOGMEAL_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs: u64 = parse_var(&lookup, "LOGMEAL_TIMEOUT_SECS", 30)?;

        Ok(Self {
            api_key,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn segmentation_url(&self) -> String {
        format!("{}{}", self.base_url, SEGMENTATION_PATH)
    }

    pub fn nutrition_url(&self) -> String {
        format!("{}{}", self.base_url, NUTRITION_PATH)
    }
}

/// Reads `name` through `lookup`, falling back to `default` when unset.
pub(crate) fn parse_var<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
