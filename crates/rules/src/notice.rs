//! Advance-notice rules.
//!
//! All comparisons are date-only: a delivery at "tomorrow 00:00" has one full
//! day of notice, a delivery at "today 23:59" has none.

use chrono::{Months, NaiveDate};

use crate::RuleError;

pub(crate) fn check_min_notice(
    delivery: NaiveDate,
    today: NaiveDate,
    minimum_days: i64,
) -> Result<(), RuleError> {
    if (delivery - today).num_days() < minimum_days {
        return Err(RuleError::DeliveryTooSoon { minimum_days });
    }
    Ok(())
}

pub(crate) fn check_max_window(
    delivery: NaiveDate,
    today: NaiveDate,
    maximum_months: u32,
) -> Result<(), RuleError> {
    let limit = today
        .checked_add_months(Months::new(maximum_months))
        .unwrap_or(NaiveDate::MAX);
    if delivery > limit {
        return Err(RuleError::DeliveryTooFar { maximum_months });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_tomorrow_satisfies_one_day_notice() {
        // "Tomorrow at 00:00" passes: the time of day was already discarded.
        let today = date(2026, 8, 7);
        assert!(check_min_notice(date(2026, 8, 8), today, 1).is_ok());
    }

    #[test]
    fn test_today_fails_one_day_notice() {
        // "Today at 23:59" fails: date-only comparison.
        let today = date(2026, 8, 7);
        assert!(matches!(
            check_min_notice(date(2026, 8, 7), today, 1),
            Err(RuleError::DeliveryTooSoon { minimum_days: 1 })
        ));
    }

    #[test]
    fn test_seven_day_notice() {
        let today = date(2026, 8, 7);
        assert!(check_min_notice(date(2026, 8, 14), today, 7).is_ok());
        assert!(check_min_notice(date(2026, 8, 13), today, 7).is_err());
    }

    #[test]
    fn test_six_month_window() {
        let today = date(2026, 8, 7);
        assert!(check_max_window(date(2027, 2, 7), today, 6).is_ok());
        assert!(matches!(
            check_max_window(date(2027, 2, 8), today, 6),
            Err(RuleError::DeliveryTooFar { maximum_months: 6 })
        ));
    }

    #[test]
    fn test_past_date_fails_notice() {
        let today = date(2026, 8, 7);
        assert!(check_min_notice(date(2026, 8, 1), today, 1).is_err());
    }
}
