//! End-to-end checks across reconciliation, gap detection, imputation,
//! restore planning and the gated forecast.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use daily_stress_forecast::calendar::date_key;
use daily_stress_forecast::{
    build_report, evaluate, expand_gated, impute, missing_dates, plan_restore, reconcile,
    EligibilitySnapshot, GateRules, Imputation, RawLogEntry, RestoreError, RestoreValues,
    RiskStatus, Settings, UpstreamForecast,
};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn entry(id: &str, date: NaiveDate, created_secs: i64, sleep: f64) -> RawLogEntry {
    RawLogEntry {
        id: id.to_string(),
        date: date_key(date),
        created_at: Utc.timestamp_opt(created_secs, 0).unwrap(),
        stress_level: Some("Moderate".to_string()),
        sleep_hours: Some(sleep),
        study_hours: Some(4.0),
        extracurricular_hours: Some(1.0),
        social_hours: Some(2.0),
        physical_hours: Some(1.0),
        mood_index: Some(2),
        is_restored: false,
    }
}

fn snapshot(eligible: bool, used: u32, remaining: u32) -> EligibilitySnapshot {
    EligibilitySnapshot {
        streak: 3,
        required_streak: 7,
        restore_used: used,
        restore_remaining: remaining,
        restore_limit: 3,
        eligible,
        note: "too few logs".to_string(),
    }
}

fn upstream() -> UpstreamForecast {
    UpstreamForecast {
        forecast_date: "2024-01-11".to_string(),
        probability: Some(0.6),
        chance_percent: None,
        threshold: 0.5,
        prediction_binary: Some(0),
        prediction_label: Some("High".to_string()),
        model_type: "global".to_string(),
    }
}

#[test]
fn backfill_flow_restores_a_missed_day() {
    let today = ymd(2024, 1, 10);
    let entries = vec![
        entry("a", ymd(2024, 1, 5), 100, 6.0),
        entry("b", ymd(2024, 1, 6), 100, 8.0),
        entry("b-late", ymd(2024, 1, 6), 200, 7.0),
        entry("c", ymd(2024, 1, 7), 100, 8.0),
    ];

    let reconciled = reconcile(&entries, today);
    assert_eq!(reconciled.days.len(), 4);

    let missing = missing_dates(reconciled.latest, today);
    assert_eq!(missing, vec![ymd(2024, 1, 8), ymd(2024, 1, 9)]);

    let imputation = impute(&reconciled, ymd(2024, 1, 8), Settings::default().sample_cap);
    let profile = imputation.profile().expect("profile");
    assert_eq!(profile.estimates.sleep, Some(7.0));
    assert_eq!(profile.mood, Some(2));

    let values = RestoreValues::from_profile(profile);
    let restored = plan_restore(
        ymd(2024, 1, 8),
        &values,
        &missing,
        &snapshot(false, 1, 2),
        Utc.timestamp_opt(300, 0).unwrap(),
    )
    .expect("restore");

    let mut with_restore = entries.clone();
    with_restore.push(restored);
    let refreshed = reconcile(&with_restore, today);
    assert!(refreshed.get(ymd(2024, 1, 8)).unwrap().is_restored);
    assert_eq!(missing_dates(refreshed.latest, today), vec![ymd(2024, 1, 9)]);
}

#[test]
fn restore_outside_gap_is_refused() {
    let today = ymd(2024, 1, 10);
    let reconciled = reconcile(&[entry("a", ymd(2024, 1, 8), 100, 7.0)], today);
    let missing = missing_dates(reconciled.latest, today);

    let err = plan_restore(
        ymd(2024, 1, 10),
        &RestoreValues::default(),
        &missing,
        &snapshot(false, 0, 3),
        Utc.timestamp_opt(300, 0).unwrap(),
    )
    .unwrap_err();
    assert_eq!(err, RestoreError::NotMissing { date: ymd(2024, 1, 10) });
}

#[test]
fn fresh_user_has_nothing_to_backfill_or_impute() {
    let today = ymd(2024, 1, 10);
    let reconciled = reconcile(&[], today);

    assert!(missing_dates(reconciled.latest, today).is_empty());
    assert_eq!(impute(&reconciled, ymd(2024, 1, 9), 7), Imputation::InsufficientData);
}

#[test]
fn gated_forecast_and_report() {
    let settings = Settings::default();
    let today = ymd(2024, 1, 10);
    let reconciled = reconcile(&[entry("a", ymd(2024, 1, 7), 100, 7.0)], today);
    let missing = missing_dates(reconciled.latest, today);
    let mut rng = StdRng::seed_from_u64(11);

    let blocked = evaluate(&snapshot(false, 1, 2), &settings.gate);
    let days = expand_gated(
        &blocked,
        &upstream(),
        settings.forecast_days,
        &settings.advice,
        &mut rng,
    );
    assert!(days.is_empty());
    let report = build_report(today, &reconciled, &missing, &blocked, &days, 7);
    assert!(report.contains("3/7"));
    assert!(report.contains("2024-01-08"));

    let open = evaluate(&snapshot(true, 1, 2), &settings.gate);
    let days = expand_gated(
        &open,
        &upstream(),
        settings.forecast_days,
        &settings.advice,
        &mut rng,
    );
    assert_eq!(days.len(), 3);
    assert_eq!(days[0].date, ymd(2024, 1, 11));
    assert!(days.iter().all(|day| day.status == RiskStatus::High));
    assert!(days
        .iter()
        .all(|day| settings.advice.high.contains(&day.advice)));

    let report = build_report(today, &reconciled, &missing, &open, &days, 7);
    assert!(report.contains("Thu, Jan 11: High (60.0%)"));
}

#[test]
fn log_on_last_calendar_date_does_not_break_the_flow() {
    let today = ymd(2024, 1, 10);
    let reconciled = reconcile(&[entry("edge", NaiveDate::MAX, 100, 7.0)], today);
    assert_eq!(reconciled.latest, Some(NaiveDate::MAX));
    assert!(missing_dates(reconciled.latest, today).is_empty());

    let mut edge = upstream();
    edge.forecast_date = date_key(NaiveDate::MAX);
    let open = evaluate(&snapshot(true, 0, 3), &GateRules::default());
    let mut rng = StdRng::seed_from_u64(5);
    let days = expand_gated(&open, &edge, 3, &Settings::default().advice, &mut rng);
    assert!(days.is_empty());
}

#[test]
fn personalized_mode_reported_even_when_blocked() {
    let mut long_streak = snapshot(false, 0, 3);
    long_streak.streak = 75;
    let verdict = evaluate(&long_streak, &GateRules::default());

    assert!(!verdict.can_show_forecast);
    assert_eq!(verdict.mode.to_string(), "personalized");
}

proptest! {
    #[test]
    fn gaps_stay_strictly_inside_the_window(offset in 0i64..400, span in 0i64..60) {
        let latest = ymd(2023, 1, 1) + Duration::days(offset);
        let today = latest + Duration::days(span);
        let missing = missing_dates(Some(latest), today);

        prop_assert_eq!(missing.len() as i64, (span - 1).max(0));
        prop_assert!(missing.iter().all(|date| *date > latest && *date < today));
        prop_assert!(missing.windows(2).all(|pair| pair[1] - pair[0] == Duration::days(1)));
    }

    #[test]
    fn reconcile_keeps_one_record_per_date(days in proptest::collection::vec(0i64..30, 0..40)) {
        let today = ymd(2024, 3, 1);
        let entries: Vec<RawLogEntry> = days
            .iter()
            .enumerate()
            .map(|(i, day)| {
                let date = ymd(2024, 1, 1) + Duration::days(*day);
                entry(&i.to_string(), date, i as i64, 7.0)
            })
            .collect();

        let reconciled = reconcile(&entries, today);
        let mut distinct = days.clone();
        distinct.sort_unstable();
        distinct.dedup();

        prop_assert_eq!(reconciled.logged_days().count(), distinct.len());
        prop_assert_eq!(reconciled.days.len(), distinct.len() + 1);
        for record in reconciled.logged_days() {
            let last_id = days
                .iter()
                .rposition(|day| ymd(2024, 1, 1) + Duration::days(*day) == record.date)
                .map(|i| i.to_string());
            prop_assert_eq!(record.id.clone(), last_id);
        }
    }
}
