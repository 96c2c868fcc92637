use std::time::Duration;

use serde::Deserialize;

use crate::args::{SearchMethod, parse_duration_value};
use crate::error::ValidationError;

/// Mirror of the CLI flags; every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub base_url: Option<String>,
    pub endpoint: Option<String>,
    pub requests: Option<u64>,
    pub timeout: Option<DurationValue>,
    pub api_key_env: Option<String>,
    pub auth_scheme: Option<String>,
    pub no_pre_lookup: Option<bool>,
    pub verbose: Option<bool>,
    pub search: Option<SearchConfig>,
    pub sweep: Option<SweepConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchConfig {
    pub start: Option<u64>,
    pub max: Option<u64>,
    pub step: Option<u64>,
    pub threshold: Option<f64>,
    pub method: Option<SearchMethod>,
    pub stop_on_failure: Option<bool>,
    pub rate: Option<f64>,
    pub pause: Option<DurationValue>,
    pub verify: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SweepConfig {
    #[serde(alias = "concurrency_levels")]
    pub concurrency: Option<Vec<u64>>,
    #[serde(alias = "rates")]
    pub rps: Option<Vec<f64>>,
    pub single_test: Option<bool>,
    pub threshold: Option<f64>,
    pub pause: Option<DurationValue>,
}

/// Either whole seconds or a duration string such as `"500ms"`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    /// Strictly positive duration, for timeouts.
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        let duration = self.to_pause()?;
        if duration.is_zero() {
            return Err(ValidationError::DurationZero);
        }
        Ok(duration)
    }

    /// Duration where zero is allowed.
    pub(crate) fn to_pause(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_value(text),
        }
    }
}
