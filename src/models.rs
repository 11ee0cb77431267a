use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One self-report as the log source delivered it. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLogEntry {
    #[serde(default)]
    pub id: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub stress_level: Option<String>,
    #[serde(default)]
    pub sleep_hours: Option<f64>,
    #[serde(default)]
    pub study_hours: Option<f64>,
    #[serde(default)]
    pub extracurricular_hours: Option<f64>,
    #[serde(default)]
    pub social_hours: Option<f64>,
    #[serde(default)]
    pub physical_hours: Option<f64>,
    #[serde(default)]
    pub mood_index: Option<u8>,
    #[serde(default)]
    pub is_restored: bool,
}

impl RawLogEntry {
    /// Hour metrics with non-finite values dropped.
    pub fn metrics(&self) -> Metrics {
        Metrics {
            sleep: finite(self.sleep_hours),
            study: finite(self.study_hours),
            extracurricular: finite(self.extracurricular_hours),
            social: finite(self.social_hours),
            physical: finite(self.physical_hours),
        }
    }

    /// Mood on the 0-4 scale, or `None` when absent or out of range.
    pub fn mood(&self) -> Option<u8> {
        self.mood_index.filter(|mood| *mood <= MAX_MOOD_INDEX)
    }
}

pub const MAX_MOOD_INDEX: u8 = 4;

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    Sleep,
    Study,
    Extracurricular,
    Social,
    Physical,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Sleep,
        Metric::Study,
        Metric::Extracurricular,
        Metric::Social,
        Metric::Physical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Metric::Sleep => "sleep",
            Metric::Study => "study",
            Metric::Extracurricular => "extracurricular",
            Metric::Social => "social",
            Metric::Physical => "physical",
        }
    }
}

/// Daily hour metrics. `None` means the value was never reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub sleep: Option<f64>,
    pub study: Option<f64>,
    pub extracurricular: Option<f64>,
    pub social: Option<f64>,
    pub physical: Option<f64>,
}

impl Metrics {
    pub fn zeroed() -> Self {
        Self {
            sleep: Some(0.0),
            study: Some(0.0),
            extracurricular: Some(0.0),
            social: Some(0.0),
            physical: Some(0.0),
        }
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Sleep => self.sleep,
            Metric::Study => self.study,
            Metric::Extracurricular => self.extracurricular,
            Metric::Social => self.social,
            Metric::Physical => self.physical,
        }
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        let slot = match metric {
            Metric::Sleep => &mut self.sleep,
            Metric::Study => &mut self.study,
            Metric::Extracurricular => &mut self.extracurricular,
            Metric::Social => &mut self.social,
            Metric::Physical => &mut self.physical,
        };
        *slot = value;
    }
}

/// Categorical stress level as derived by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StressLevel {
    Low,
    Moderate,
    High,
}

impl StressLevel {
    /// Case-insensitive parse; unknown labels yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "moderate" | "medium" => Some(Self::Moderate),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

/// Low/Moderate/High classification shared by day records and forecasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskStatus {
    Low,
    Moderate,
    High,
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskStatus::Low => "Low",
            RiskStatus::Moderate => "Moderate",
            RiskStatus::High => "High",
        };
        f.write_str(label)
    }
}

/// The reconciled record for one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub date: NaiveDate,
    pub id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub stress_level: Option<StressLevel>,
    pub stress_score: Option<u8>,
    pub status_band: Option<RiskStatus>,
    pub metrics: Metrics,
    pub mood_index: Option<u8>,
    pub is_restored: bool,
    pub is_empty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilitySnapshot {
    pub streak: u32,
    pub required_streak: u32,
    pub restore_used: u32,
    pub restore_remaining: u32,
    pub restore_limit: u32,
    pub eligible: bool,
    #[serde(default)]
    pub note: String,
}

/// The single-day forecast delivered by the backend model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamForecast {
    pub forecast_date: String,
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub chance_percent: Option<f64>,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub prediction_binary: Option<u8>,
    #[serde(default)]
    pub prediction_label: Option<String>,
    #[serde(default)]
    pub model_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub date_short: String,
    pub date_long: String,
    pub status: RiskStatus,
    pub probability_percent: f64,
    pub advice: String,
    pub model_type: String,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastMode {
    Personalized,
    Global,
}

impl fmt::Display for ForecastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastMode::Personalized => f.write_str("personalized"),
            ForecastMode::Global => f.write_str("global"),
        }
    }
}
