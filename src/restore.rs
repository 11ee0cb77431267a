//! Restore bookkeeping: backfilling a missed day within the monthly quota.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::calendar::{date_key, parse_date_key, same_month};
use crate::impute::ImputedProfile;
use crate::models::{
    EligibilitySnapshot, Metric, Metrics, RawLogEntry, StressLevel, MAX_MOOD_INDEX,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    #[error("{date} is not a missed day and cannot be restored")]
    NotMissing { date: NaiveDate },

    #[error("restore quota exhausted: {used} of {limit} used this month")]
    QuotaExhausted { used: u32, limit: u32 },

    #[error("invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Values the user confirms for a restored day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RestoreValues {
    pub metrics: Metrics,
    pub mood_index: Option<u8>,
    pub stress_level: Option<StressLevel>,
}

impl RestoreValues {
    /// Seeds restore values from an imputed profile's display values.
    pub fn from_profile(profile: &ImputedProfile) -> Self {
        Self {
            metrics: profile.display_metrics(),
            mood_index: profile.mood,
            stress_level: None,
        }
    }
}

/// Counts distinct restored dates falling in the same month as `month_of`.
pub fn restores_used_in_month(entries: &[RawLogEntry], month_of: NaiveDate) -> usize {
    entries
        .iter()
        .filter(|entry| entry.is_restored)
        .filter_map(|entry| parse_date_key(&entry.date))
        .filter(|date| same_month(*date, month_of))
        .collect::<BTreeSet<_>>()
        .len()
}

pub fn quota_available(snapshot: &EligibilitySnapshot) -> bool {
    snapshot.restore_remaining > 0 && snapshot.restore_used < snapshot.restore_limit
}

/// Builds the restored entry for `date`, or explains why it cannot exist.
pub fn plan_restore(
    date: NaiveDate,
    values: &RestoreValues,
    missing: &[NaiveDate],
    snapshot: &EligibilitySnapshot,
    now: DateTime<Utc>,
) -> Result<RawLogEntry, RestoreError> {
    if !missing.contains(&date) {
        return Err(RestoreError::NotMissing { date });
    }
    if !quota_available(snapshot) {
        return Err(RestoreError::QuotaExhausted {
            used: snapshot.restore_used,
            limit: snapshot.restore_limit,
        });
    }
    validate(values)?;

    let entry = RawLogEntry {
        id: Uuid::new_v4().to_string(),
        date: date_key(date),
        created_at: now,
        stress_level: values.stress_level.map(|level| level.label().to_string()),
        sleep_hours: values.metrics.sleep,
        study_hours: values.metrics.study,
        extracurricular_hours: values.metrics.extracurricular,
        social_hours: values.metrics.social,
        physical_hours: values.metrics.physical,
        mood_index: values.mood_index,
        is_restored: true,
    };

    info!(
        id = %entry.id,
        date = %entry.date,
        remaining = snapshot.restore_remaining - 1,
        "planned restore"
    );
    Ok(entry)
}

fn validate(values: &RestoreValues) -> Result<(), RestoreError> {
    for metric in Metric::ALL {
        if let Some(hours) = values.metrics.get(metric) {
            if !hours.is_finite() || !(0.0..=24.0).contains(&hours) {
                return Err(RestoreError::InvalidValue {
                    field: metric.label().to_string(),
                    message: format!("{hours} is not between 0 and 24 hours"),
                });
            }
        }
    }

    if let Some(mood) = values.mood_index {
        if mood > MAX_MOOD_INDEX {
            return Err(RestoreError::InvalidValue {
                field: "mood_index".to_string(),
                message: format!("{mood} is outside 0-{}", MAX_MOOD_INDEX),
            });
        }
    }

    Ok(())
}
