use std::env;
use std::time::Duration;

use crate::food::analysis::progress::ProgressTiming;
use crate::food::capture::PreprocessOptions;
use crate::food::config::{parse_var, LogMealConfig};
use crate::food::error::ConfigError;

/// Everything the pipeline needs, built once at the application root and
/// handed to each component on construction.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub logmeal: LogMealConfig,
    pub progress: ProgressTiming,
    pub preprocess: PreprocessOptions,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let logmeal = LogMealConfig::from_vars(&lookup)?;

        let defaults = ProgressTiming::default();
        let step_ms: u64 = parse_var(
            &lookup,
            "SNAPMEAL_STEP_INTERVAL_MS",
            defaults.step_interval.as_millis() as u64,
        )?;
        let percent_ms: u64 = parse_var(
            &lookup,
            "SNAPMEAL_PERCENT_INTERVAL_MS",
            defaults.percent_interval.as_millis() as u64,
        )?;
        if step_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "SNAPMEAL_STEP_INTERVAL_MS",
                value: step_ms.to_string(),
            });
        }
        if percent_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "SNAPMEAL_PERCENT_INTERVAL_MS",
                value: percent_ms.to_string(),
            });
        }

        let preprocess_defaults = PreprocessOptions::default();
        let max_width = parse_var(&lookup, "SNAPMEAL_MAX_WIDTH", preprocess_defaults.max_width)?;
        if max_width == 0 {
            return Err(ConfigError::Invalid {
                name: "SNAPMEAL_MAX_WIDTH",
                value: max_width.to_string(),
            });
        }
        let jpeg_quality: u8 =
            parse_var(&lookup, "SNAPMEAL_JPEG_QUALITY", preprocess_defaults.jpeg_quality)?;
        if jpeg_quality == 0 || jpeg_quality > 100 {
            return Err(ConfigError::Invalid {
                name: "SNAPMEAL_JPEG_QUALITY",
                value: jpeg_quality.to_string(),
            });
        }

        Ok(Self {
            logmeal,
            progress: ProgressTiming {
                step_interval: Duration::from_millis(step_ms),
                percent_interval: Duration::from_millis(percent_ms),
                ..defaults
            },
            preprocess: PreprocessOptions {
                max_width,
                jpeg_quality,
                ..preprocess_defaults
            },
        })
    }
}
