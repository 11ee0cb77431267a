use chrono::NaiveDate;

use crate::calendar::add_days;

/// Dates strictly between the latest logged date and today, ascending.
///
/// A user with no logs has no baseline, so nothing counts as missed.
pub fn missing_dates(latest: Option<NaiveDate>, today: NaiveDate) -> Vec<NaiveDate> {
    let Some(latest) = latest else {
        return Vec::new();
    };

    let mut missing = Vec::new();
    let mut cursor = add_days(latest, 1);
    while let Some(date) = cursor.filter(|date| *date < today) {
        missing.push(date);
        cursor = add_days(date, 1);
    }
    missing
}
