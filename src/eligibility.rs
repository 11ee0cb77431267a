//! Presentation gating for the multi-day forecast.
//!
//! The upstream snapshot already decided eligibility; this module only
//! trusts that verdict, labels the forecast mode and explains refusals.

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{EligibilitySnapshot, ForecastMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateRules {
    /// Streak at which the forecast switches to the personalized model.
    pub personalized_streak: u32,
    /// Original (non-restored) logs required inside the density window.
    pub min_original_logs_in_window: u32,
    pub window_days: u32,
}

impl Default for GateRules {
    fn default() -> Self {
        Self {
            personalized_streak: 60,
            min_original_logs_in_window: 4,
            window_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateVerdict {
    pub can_show_forecast: bool,
    pub mode: ForecastMode,
    /// Set only when the forecast is withheld.
    pub reason: Option<String>,
}

pub fn classify_mode(streak: u32, rules: &GateRules) -> ForecastMode {
    if streak >= rules.personalized_streak {
        ForecastMode::Personalized
    } else {
        ForecastMode::Global
    }
}

pub fn evaluate(snapshot: &EligibilitySnapshot, rules: &GateRules) -> GateVerdict {
    let mode = classify_mode(snapshot.streak, rules);
    let reason = if snapshot.eligible {
        None
    } else {
        Some(ineligible_message(snapshot, rules))
    };

    debug!(
        eligible = snapshot.eligible,
        streak = snapshot.streak,
        %mode,
        "evaluated forecast eligibility"
    );

    GateVerdict {
        can_show_forecast: snapshot.eligible,
        mode,
        reason,
    }
}

/// Multi-line explanation shown when the forecast is withheld. Line order is
/// stable: note, streak progress, requirements, restore counts.
pub fn ineligible_message(snapshot: &EligibilitySnapshot, rules: &GateRules) -> String {
    let mut output = String::new();
    let note = snapshot.note.trim();
    let note = if note.is_empty() {
        "The stress forecast is not available yet."
    } else {
        note
    };

    let _ = writeln!(output, "{note}");
    let _ = writeln!(
        output,
        "Streak progress: {}/{} days",
        snapshot.streak, snapshot.required_streak
    );
    let _ = writeln!(output, "Requirements:");
    let _ = writeln!(
        output,
        "- At least {} distinct daily logs",
        snapshot.required_streak
    );
    let _ = writeln!(
        output,
        "- No more than {} restores used this month",
        snapshot.restore_limit
    );
    let _ = writeln!(
        output,
        "- At least {} original logs within the last {} days",
        rules.min_original_logs_in_window, rules.window_days
    );
    let _ = write!(
        output,
        "Restores: {} remaining, {} used of {}",
        snapshot.restore_remaining, snapshot.restore_used, snapshot.restore_limit
    );

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(streak: u32, eligible: bool) -> EligibilitySnapshot {
        EligibilitySnapshot {
            streak,
            required_streak: 7,
            restore_used: 1,
            restore_remaining: 2,
            restore_limit: 3,
            eligible,
            note: "too few logs".to_string(),
        }
    }

    #[test]
    fn eligible_snapshot_opens_the_gate() {
        let verdict = evaluate(&snapshot(10, true), &GateRules::default());
        assert!(verdict.can_show_forecast);
        assert_eq!(verdict.reason, None);
        assert_eq!(verdict.mode, ForecastMode::Global);
    }

    #[test]
    fn ineligible_message_carries_counts() {
        let verdict = evaluate(&snapshot(3, false), &GateRules::default());
        assert!(!verdict.can_show_forecast);

        let reason = verdict.reason.unwrap();
        assert!(reason.contains("3/7"));
        assert!(reason.contains("too few logs"));
        assert!(reason.contains("1 used"));
        assert!(reason.contains("2 remaining"));
        assert!(reason.starts_with("too few logs\n"));
    }

    #[test]
    fn message_lines_keep_their_order() {
        let message = ineligible_message(&snapshot(3, false), &GateRules::default());
        let lines: Vec<&str> = message.lines().collect();

        assert_eq!(lines.len(), 7);
        assert_eq!(lines[1], "Streak progress: 3/7 days");
        assert_eq!(lines[2], "Requirements:");
        assert_eq!(lines[5], "- At least 4 original logs within the last 7 days");
        assert_eq!(lines[6], "Restores: 2 remaining, 1 used of 3");
    }

    #[test]
    fn blank_note_gets_default_sentence() {
        let mut blank = snapshot(3, false);
        blank.note = "  ".to_string();
        let message = ineligible_message(&blank, &GateRules::default());
        assert!(message.starts_with("The stress forecast is not available yet."));
    }

    #[test]
    fn mode_is_computed_even_when_ineligible() {
        let rules = GateRules::default();
        assert_eq!(evaluate(&snapshot(60, false), &rules).mode, ForecastMode::Personalized);
        assert_eq!(evaluate(&snapshot(59, true), &rules).mode, ForecastMode::Global);
    }
}
