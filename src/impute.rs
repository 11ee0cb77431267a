//! Imputation of plausible metric values for a day without a real log.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::models::{DayRecord, Metric, Metrics};
use crate::reconcile::Reconciled;
use crate::risk::round_half_hour;

pub const DEFAULT_SAMPLE_CAP: usize = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputedProfile {
    pub target: NaiveDate,
    /// Mean per metric at full precision. `None` when no sample carried it.
    pub estimates: Metrics,
    /// Most frequent mood across the samples.
    pub mood: Option<u8>,
    /// Dates the estimate was drawn from, nearest past first.
    pub sample_dates: Vec<NaiveDate>,
}

impl ImputedProfile {
    /// Estimates rounded to the nearest half hour, for display.
    pub fn display_metrics(&self) -> Metrics {
        let mut rounded = Metrics::default();
        for metric in Metric::ALL {
            rounded.set(metric, self.estimates.get(metric).map(round_half_hour));
        }
        rounded
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Imputation {
    Estimated(ImputedProfile),
    /// No real log exists to estimate from; fall back to manual entry.
    InsufficientData,
}

impl Imputation {
    pub fn profile(&self) -> Option<&ImputedProfile> {
        match self {
            Imputation::Estimated(profile) => Some(profile),
            Imputation::InsufficientData => None,
        }
    }
}

/// Estimates metrics for `target` from up to `sample_cap` nearby logged days,
/// preferring the past over the future.
pub fn impute(reconciled: &Reconciled, target: NaiveDate, sample_cap: usize) -> Imputation {
    let candidates: Vec<&DayRecord> = reconciled
        .logged_days()
        .filter(|record| record.date != target)
        .collect();

    // logged_days() is ascending, so reversing the past half puts the nearest first.
    let mut past: Vec<&DayRecord> = candidates
        .iter()
        .copied()
        .filter(|record| record.date < target)
        .collect();
    past.reverse();
    let future = candidates.iter().copied().filter(|record| record.date > target);

    let mut samples: Vec<&DayRecord> = past.into_iter().chain(future).take(sample_cap).collect();
    if samples.is_empty() {
        samples = candidates;
    }

    if samples.is_empty() {
        debug!(%target, "no logged days to impute from");
        return Imputation::InsufficientData;
    }

    let mut estimates = Metrics::default();
    for metric in Metric::ALL {
        estimates.set(metric, mean(samples.iter().filter_map(|r| r.metrics.get(metric))));
    }

    let profile = ImputedProfile {
        target,
        estimates,
        mood: mode(samples.iter().filter_map(|record| record.mood_index)),
        sample_dates: samples.iter().map(|record| record.date).collect(),
    };
    debug!(%target, samples = profile.sample_dates.len(), "imputed profile");
    Imputation::Estimated(profile)
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (total, count) = values
        .filter(|value| value.is_finite())
        .fold((0.0, 0usize), |(total, count), value| (total + value, count + 1));
    if count == 0 {
        None
    } else {
        Some(total / count as f64)
    }
}

/// Most frequent value; ties go to the value seen first.
fn mode(values: impl Iterator<Item = u8>) -> Option<u8> {
    let mut counts: Vec<(u8, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(u8, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}
