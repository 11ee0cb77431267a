use std::fmt::Write;

use chrono::NaiveDate;

use crate::calendar::{date_key, format_short};
use crate::eligibility::GateVerdict;
use crate::models::{DayRecord, ForecastDay, Metric, RiskStatus};
use crate::reconcile::Reconciled;

#[derive(Debug, Clone, PartialEq)]
pub struct BandSummary {
    pub status: RiskStatus,
    pub days: usize,
    pub avg_score: f64,
}

pub fn summarize_by_band(reconciled: &Reconciled) -> Vec<BandSummary> {
    let mut summaries: Vec<BandSummary> = Vec::new();

    for status in [RiskStatus::High, RiskStatus::Moderate, RiskStatus::Low] {
        let scores: Vec<u8> = reconciled
            .logged_days()
            .filter(|record| record.status_band == Some(status))
            .filter_map(|record| record.stress_score)
            .collect();
        if scores.is_empty() {
            continue;
        }

        let total: u32 = scores.iter().map(|score| u32::from(*score)).sum();
        summaries.push(BandSummary {
            status,
            days: scores.len(),
            avg_score: total as f64 / scores.len() as f64,
        });
    }

    summaries.sort_by(|a, b| b.days.cmp(&a.days));
    summaries
}

/// One line describing a reconciled day.
pub fn describe_day(record: &DayRecord) -> String {
    if record.is_empty {
        return format!("{}: no log yet", date_key(record.date));
    }

    let mut line = format!("{}:", date_key(record.date));
    match (record.status_band, record.stress_score) {
        (Some(band), Some(score)) => {
            let _ = write!(line, " stress {band} ({score})");
        }
        _ => line.push_str(" stress unknown"),
    }
    for metric in Metric::ALL {
        if let Some(hours) = record.metrics.get(metric) {
            let _ = write!(line, ", {} {:.1}h", metric.label(), hours);
        }
    }
    if let Some(mood) = record.mood_index {
        let _ = write!(line, ", mood {mood}");
    }
    if record.is_restored {
        line.push_str(" [restored]");
    }
    line
}

pub fn build_report(
    today: NaiveDate,
    reconciled: &Reconciled,
    missing: &[NaiveDate],
    verdict: &GateVerdict,
    forecast: &[ForecastDay],
    recent_days: usize,
) -> String {
    let summaries = summarize_by_band(reconciled);
    let mut output = String::new();

    let _ = writeln!(output, "# Daily Stress Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} logged days)",
        today,
        reconciled.logged_days().count()
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Stress Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No stress levels recorded yet.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} days (avg score {:.1})",
                summary.status, summary.days, summary.avg_score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Days");
    for record in reconciled.days.values().rev().take(recent_days) {
        let _ = writeln!(output, "- {}", describe_day(record));
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Missed Days");

    if missing.is_empty() {
        let _ = writeln!(output, "No missed days.");
    } else {
        for date in missing {
            let _ = writeln!(output, "- {} ({})", date_key(*date), format_short(*date));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Forecast ({} model)", verdict.mode);

    if let Some(reason) = verdict.reason.as_deref() {
        for line in reason.lines() {
            let _ = writeln!(output, "> {line}");
        }
    } else if forecast.is_empty() {
        let _ = writeln!(output, "No forecast available.");
    } else {
        for day in forecast {
            let _ = writeln!(
                output,
                "- {}: {} ({:.1}%) {}",
                day.date_short, day.status, day.probability_percent, day.advice
            );
        }
    }

    output
}
