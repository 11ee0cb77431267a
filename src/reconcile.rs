//! Log reconciliation: one authoritative record per calendar date.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::calendar::parse_date_key;
use crate::models::{DayRecord, Metrics, RawLogEntry, StressLevel};
use crate::risk;

/// Output of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciled {
    pub days: BTreeMap<NaiveDate, DayRecord>,
    /// Latest date carried by a real entry. The placeholder for today never
    /// counts.
    pub latest: Option<NaiveDate>,
}

impl Reconciled {
    pub fn get(&self, date: NaiveDate) -> Option<&DayRecord> {
        self.days.get(&date)
    }

    /// Records that carry real data, in ascending date order.
    pub fn logged_days(&self) -> impl Iterator<Item = &DayRecord> {
        self.days.values().filter(|record| !record.is_empty)
    }
}

/// Merges raw entries into one record per date.
///
/// A later-listed entry replaces an earlier one when its `created_at` is
/// greater or equal, so callers must pass entries in source order for ties
/// to resolve deterministically. Entries with unparsable dates are skipped.
pub fn reconcile(entries: &[RawLogEntry], today: NaiveDate) -> Reconciled {
    let mut days: BTreeMap<NaiveDate, DayRecord> = BTreeMap::new();
    let mut latest: Option<NaiveDate> = None;

    for entry in entries {
        let Some(date) = parse_date_key(&entry.date) else {
            warn!(id = %entry.id, date = %entry.date, "skipping log entry with unparsable date");
            continue;
        };

        latest = Some(latest.map_or(date, |current| current.max(date)));

        let replace = match days.get(&date) {
            Some(existing) => existing
                .created_at
                .map_or(true, |created_at| entry.created_at >= created_at),
            None => true,
        };

        if replace {
            days.insert(date, to_record(entry, date));
        } else {
            debug!(id = %entry.id, %date, "older duplicate entry ignored");
        }
    }

    if !days.contains_key(&today) {
        days.insert(today, placeholder(today));
    }

    debug!(days = days.len(), latest = ?latest, "reconciled daily logs");
    Reconciled { days, latest }
}

fn to_record(entry: &RawLogEntry, date: NaiveDate) -> DayRecord {
    let stress_level = entry.stress_level.as_deref().and_then(|raw| {
        let parsed = StressLevel::parse(raw);
        if parsed.is_none() {
            warn!(id = %entry.id, stress_level = raw, "unknown stress level ignored");
        }
        parsed
    });
    let stress_score = stress_level.map(risk::stress_score);

    DayRecord {
        date,
        id: Some(entry.id.clone()),
        created_at: Some(entry.created_at),
        stress_level,
        stress_score,
        status_band: stress_score.map(risk::status_band),
        metrics: entry.metrics(),
        mood_index: entry.mood(),
        is_restored: entry.is_restored,
        is_empty: false,
    }
}

fn placeholder(date: NaiveDate) -> DayRecord {
    DayRecord {
        date,
        id: None,
        created_at: None,
        stress_level: None,
        stress_score: None,
        status_band: None,
        metrics: Metrics::zeroed(),
        mood_index: None,
        is_restored: false,
        is_empty: true,
    }
}
