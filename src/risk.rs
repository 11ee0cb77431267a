use crate::models::{RiskStatus, StressLevel};

/// UI-facing 0-100 score for a categorical stress level. Fixed lookup.
pub fn stress_score(level: StressLevel) -> u8 {
    match level {
        StressLevel::High => 85,
        StressLevel::Moderate => 50,
        StressLevel::Low => 20,
    }
}

pub fn status_band(score: u8) -> RiskStatus {
    match score {
        61..=u8::MAX => RiskStatus::High,
        31..=60 => RiskStatus::Moderate,
        _ => RiskStatus::Low,
    }
}

/// Rounds a percentage to one decimal place.
pub fn round_percent(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Rounds an hour value to the nearest half hour.
pub fn round_half_hour(value: f64) -> f64 {
    (value * 2.0).round() / 2.0
}
