//! Expansion of the backend's single-day forecast into a multi-day outlook.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calendar::{add_days, format_long, format_short, parse_date_key};
use crate::eligibility::GateVerdict;
use crate::models::{ForecastDay, RiskStatus, UpstreamForecast};
use crate::risk::round_percent;

pub const DEFAULT_FORECAST_DAYS: usize = 3;
pub const MAX_FORECAST_DAYS: usize = 30;

/// Advice text keyed by risk status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvicePools {
    pub high: Vec<String>,
    pub moderate: Vec<String>,
    pub low: Vec<String>,
}

impl Default for AdvicePools {
    fn default() -> Self {
        let owned = |lines: &[&str]| -> Vec<String> {
            lines.iter().map(|line| line.to_string()).collect()
        };
        Self {
            high: owned(&[
                "Protect your sleep tonight and aim for at least 8 hours.",
                "Break study sessions into short blocks with real breaks between them.",
                "Talk to someone you trust about what is weighing on you.",
                "Cut one non-essential commitment from tomorrow's plan.",
                "Take a 20 minute walk outside before your next study block.",
            ]),
            moderate: owned(&[
                "Keep a steady routine and avoid late-night cramming.",
                "Schedule a short break for something you enjoy.",
                "Check in with a friend or classmate today.",
                "Fit in some light exercise to reset your focus.",
            ]),
            low: owned(&[
                "Keep up your current balance of study and rest.",
                "A good day to get ahead on upcoming deadlines.",
                "Maintain your sleep schedule to stay on track.",
                "Use the extra energy for a hobby or social plan.",
            ]),
        }
    }
}

impl AdvicePools {
    pub fn pool(&self, status: RiskStatus) -> &[String] {
        match status {
            RiskStatus::High => &self.high,
            RiskStatus::Moderate => &self.moderate,
            RiskStatus::Low => &self.low,
        }
    }

    /// Picks advice for `status` only from that status's pool.
    pub fn pick<R: Rng + ?Sized>(&self, status: RiskStatus, rng: &mut R) -> String {
        self.pool(status).choose(rng).cloned().unwrap_or_default()
    }
}

/// Base chance as a probability in `[0, 1]`.
///
/// `chance_percent` wins over `probability`; anything non-finite counts as 0.
pub fn base_probability(upstream: &UpstreamForecast) -> f64 {
    let percent = upstream
        .chance_percent
        .or_else(|| upstream.probability.map(|p| p * 100.0))
        .filter(|value| value.is_finite())
        .unwrap_or(0.0);
    percent.clamp(0.0, 100.0) / 100.0
}

/// Status for one forecast day. The upstream label wins, then the binary
/// prediction, then the threshold comparison.
pub fn classify(upstream: &UpstreamForecast, percent: f64) -> RiskStatus {
    if let Some(label) = upstream.prediction_label.as_deref() {
        let label = label.to_ascii_lowercase();
        if label.contains("high") {
            return RiskStatus::High;
        }
        if label.contains("moderate") {
            return RiskStatus::Moderate;
        }
        if label.contains("low") {
            return RiskStatus::Low;
        }
    }

    if let Some(binary) = upstream.prediction_binary {
        return if binary == 1 {
            RiskStatus::High
        } else {
            RiskStatus::Low
        };
    }

    if percent >= upstream.threshold * 100.0 {
        RiskStatus::High
    } else {
        RiskStatus::Low
    }
}

/// Expands the upstream forecast into `days` entries whose probability
/// compounds: day i is day i-1 times the base rate.
///
/// `days` is capped at [`MAX_FORECAST_DAYS`]. An unparsable forecast date,
/// or a window running past the last representable date, yields no days.
pub fn expand<R: Rng + ?Sized>(
    upstream: &UpstreamForecast,
    days: usize,
    advice: &AdvicePools,
    rng: &mut R,
) -> Vec<ForecastDay> {
    let Some(start) = parse_date_key(&upstream.forecast_date) else {
        warn!(forecast_date = %upstream.forecast_date, "unparsable forecast date");
        return Vec::new();
    };

    let days = days.min(MAX_FORECAST_DAYS);
    let p0 = base_probability(upstream);
    let mut probability = p0;
    let mut forecast = Vec::new();

    for offset in 0..days {
        if offset > 0 {
            probability *= p0;
        }
        let Some(date) = add_days(start, offset as i64) else {
            warn!(%start, days, "forecast window runs past the calendar");
            return Vec::new();
        };
        forecast.push(build_day(upstream, date, round_percent(probability * 100.0), advice, rng));
    }

    debug!(%start, days, base = p0, "expanded forecast");
    forecast
}

/// Like [`expand`], but returns nothing when the gate refuses the forecast.
pub fn expand_gated<R: Rng + ?Sized>(
    verdict: &GateVerdict,
    upstream: &UpstreamForecast,
    days: usize,
    advice: &AdvicePools,
    rng: &mut R,
) -> Vec<ForecastDay> {
    if !verdict.can_show_forecast {
        debug!(mode = %verdict.mode, "forecast withheld by eligibility gate");
        return Vec::new();
    }
    expand(upstream, days, advice, rng)
}

fn build_day<R: Rng + ?Sized>(
    upstream: &UpstreamForecast,
    date: NaiveDate,
    percent: f64,
    advice: &AdvicePools,
    rng: &mut R,
) -> ForecastDay {
    let status = classify(upstream, percent);
    ForecastDay {
        date,
        date_short: format_short(date),
        date_long: format_long(date),
        status,
        probability_percent: percent,
        advice: advice.pick(status, rng),
        model_type: upstream.model_type.clone(),
        threshold: upstream.threshold,
    }
}
