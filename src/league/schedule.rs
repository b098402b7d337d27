use chrono::{DateTime, Datelike, Months, Utc};

/// Calendar years between the starts of two seasons.
pub fn season_year_gap(source_start: DateTime<Utc>, target_start: DateTime<Utc>) -> i32 {
    target_start.year() - source_start.year()
}

/// Move a kickoff by whole years, keeping month, day and time of day.
///
/// 29 February lands on 28 February in a non-leap year. `None` only when the
/// result leaves chrono's range.
pub fn shift_by_years(kickoff: DateTime<Utc>, years: i32) -> Option<DateTime<Utc>> {
    let months = Months::new(years.unsigned_abs().checked_mul(12)?);
    if years >= 0 {
        kickoff.checked_add_months(months)
    } else {
        kickoff.checked_sub_months(months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn gap_counts_calendar_years() {
        let source = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap();
        let target = Utc.with_ymd_and_hms(2025, 7, 25, 0, 0, 0).unwrap();
        assert_eq!(season_year_gap(source, target), 1);
        assert_eq!(season_year_gap(target, source), -1);
    }

    #[test]
    fn kickoff_keeps_its_date_and_time() {
        let kickoff = Utc.with_ymd_and_hms(2024, 12, 26, 15, 0, 0).unwrap();
        assert_eq!(
            shift_by_years(kickoff, 1),
            Some(Utc.with_ymd_and_hms(2025, 12, 26, 15, 0, 0).unwrap())
        );
        assert_eq!(
            shift_by_years(kickoff, -2),
            Some(Utc.with_ymd_and_hms(2022, 12, 26, 15, 0, 0).unwrap())
        );
        assert_eq!(shift_by_years(kickoff, 0), Some(kickoff));
    }

    #[test]
    fn leap_day_falls_back_to_28_february() {
        let kickoff = Utc.with_ymd_and_hms(2024, 2, 29, 19, 45, 0).unwrap();
        assert_eq!(
            shift_by_years(kickoff, 1),
            Some(Utc.with_ymd_and_hms(2025, 2, 28, 19, 45, 0).unwrap())
        );
    }
}
