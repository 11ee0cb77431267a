//! File-backed stand-ins for the log, eligibility and forecast sources.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};

use crate::models::{EligibilitySnapshot, RawLogEntry, UpstreamForecast};

/// Loads raw log entries from a `.csv` file or a JSON array, by extension.
pub fn load_logs(path: &Path) -> anyhow::Result<Vec<RawLogEntry>> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    let entries = if is_csv {
        load_logs_csv(path)?
    } else {
        load_logs_json(path)?
    };
    info!(path = %path.display(), entries = entries.len(), "loaded log entries");
    Ok(entries)
}

pub fn load_eligibility(path: &Path) -> anyhow::Result<EligibilitySnapshot> {
    load_json(path)
}

pub fn load_forecast(path: &Path) -> anyhow::Result<UpstreamForecast> {
    load_json(path)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

/// Reads a JSON array of camelCase entries. An element without a usable
/// `date` or `createdAt` is skipped; a bad field only blanks that field.
pub fn load_logs_json(path: &Path) -> anyhow::Result<Vec<RawLogEntry>> {
    let items: Vec<Value> = load_json(path)?;
    let mut entries = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        match json_to_entry(item, index) {
            Some(entry) => entries.push(entry),
            None => warn!(entry = index + 1, "skipping json entry without date or createdAt"),
        }
    }

    Ok(entries)
}

fn json_to_entry(item: &Value, index: usize) -> Option<RawLogEntry> {
    let field = |key: &str| item.get(key).filter(|value| !value.is_null());

    let date = field("date").and_then(json_string)?;
    let created_at = match field("createdAt")? {
        Value::Number(secs) => secs.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        Value::String(raw) => parse_timestamp(raw.trim()),
        _ => None,
    }?;

    Some(RawLogEntry {
        id: field("id")
            .and_then(json_string)
            .unwrap_or_else(|| format!("entry-{}", index + 1)),
        date,
        created_at,
        stress_level: field("stressLevel").and_then(json_string),
        sleep_hours: field("sleepHours").and_then(json_hours),
        study_hours: field("studyHours").and_then(json_hours),
        extracurricular_hours: field("extracurricularHours").and_then(json_hours),
        social_hours: field("socialHours").and_then(json_hours),
        physical_hours: field("physicalHours").and_then(json_hours),
        mood_index: field("moodIndex")
            .and_then(Value::as_u64)
            .and_then(|mood| u8::try_from(mood).ok()),
        is_restored: field("isRestored").and_then(Value::as_bool).unwrap_or(false),
    })
}

/// Strings are trimmed; numbers are accepted as their decimal text.
fn json_string(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => non_empty(Some(raw.clone())),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn json_hours(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|hours| hours.is_finite()),
        Value::String(raw) => parse_hours(Some(raw.clone())),
        _ => None,
    }
}

#[derive(serde::Deserialize)]
struct CsvRow {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    stress_level: Option<String>,
    #[serde(default)]
    sleep_hours: Option<String>,
    #[serde(default)]
    study_hours: Option<String>,
    #[serde(default)]
    extracurricular_hours: Option<String>,
    #[serde(default)]
    social_hours: Option<String>,
    #[serde(default)]
    physical_hours: Option<String>,
    #[serde(default)]
    mood_index: Option<String>,
    #[serde(default)]
    is_restored: Option<String>,
}

/// Reads a CSV export. Rows that cannot be read or lack a date or creation
/// timestamp are skipped; a bad cell only blanks that cell.
pub fn load_logs_csv(path: &Path) -> anyhow::Result<Vec<RawLogEntry>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut entries = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(err) => {
                warn!(row = index + 1, error = %err, "skipping unreadable csv row");
                continue;
            }
        };

        match to_entry(row, index) {
            Some(entry) => entries.push(entry),
            None => warn!(row = index + 1, "skipping csv row without date or created_at"),
        }
    }

    Ok(entries)
}

fn to_entry(row: CsvRow, index: usize) -> Option<RawLogEntry> {
    let date = non_empty(row.date)?;
    let created_at = non_empty(row.created_at).and_then(|raw| parse_timestamp(&raw))?;

    Some(RawLogEntry {
        id: non_empty(row.id).unwrap_or_else(|| format!("row-{}", index + 1)),
        date,
        created_at,
        stress_level: non_empty(row.stress_level),
        sleep_hours: parse_hours(row.sleep_hours),
        study_hours: parse_hours(row.study_hours),
        extracurricular_hours: parse_hours(row.extracurricular_hours),
        social_hours: parse_hours(row.social_hours),
        physical_hours: parse_hours(row.physical_hours),
        mood_index: non_empty(row.mood_index).and_then(|raw| raw.parse().ok()),
        is_restored: non_empty(row.is_restored)
            .map(|raw| matches!(raw.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn parse_hours(value: Option<String>) -> Option<f64> {
    non_empty(value)
        .and_then(|raw| raw.parse::<f64>().ok())
        .filter(|hours| hours.is_finite())
}

/// RFC 3339, or a bare Unix timestamp in seconds.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}
