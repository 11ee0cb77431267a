use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::eligibility::GateRules;
use crate::forecast::{AdvicePools, DEFAULT_FORECAST_DAYS, MAX_FORECAST_DAYS};
use crate::impute::DEFAULT_SAMPLE_CAP;

pub const CONFIG_ENV: &str = "DAILY_FORECAST_CONFIG";

/// Tunables for the pipeline. Every field has a default, so a config file
/// only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sample_cap: usize,
    pub forecast_days: usize,
    #[serde(flatten)]
    pub gate: GateRules,
    pub advice: AdvicePools,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_cap: DEFAULT_SAMPLE_CAP,
            forecast_days: DEFAULT_FORECAST_DAYS,
            gate: GateRules::default(),
            advice: AdvicePools::default(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, falling back to the file named by
    /// `DAILY_FORECAST_CONFIG`, then to defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(path) => Some(path.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV).map(PathBuf::from),
        };

        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let settings = Self::from_json(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let mut settings: Self = serde_json::from_str(raw)?;
        if settings.forecast_days > MAX_FORECAST_DAYS {
            warn!(
                requested = settings.forecast_days,
                max = MAX_FORECAST_DAYS,
                "forecast_days capped"
            );
            settings.forecast_days = MAX_FORECAST_DAYS;
        }
        Ok(settings)
    }
}
