//! Consecutive-day streak computation.
//!
//! Pure calculators over sorted check-in dates; the engine feeds them
//! from storage and the injected clock.

use std::collections::BTreeSet;

use chrono::NaiveDate;

/// Current streak: consecutive checked-in days ending at `today`
/// (inclusive). Returns 0 when today has no check-in.
///
/// Walks backward one day at a time and stops at the first missing day
/// or at `floor`, so the iteration is bounded even for corrupted or
/// huge histories. `floor` is normally the habit's creation date (or
/// the earliest recorded check-in, whichever is older).
pub fn current_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate, floor: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while day >= floor && dates.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Longest run of consecutive dates over the full history.
///
/// `dates` must be ascending and duplicate-free (the unique constraint
/// on (habit, date) guarantees the latter). Empty history yields 0, a
/// single check-in yields 1.
pub fn longest_streak(dates: &[NaiveDate]) -> u32 {
    let Some(&first) = dates.first() else {
        return 0;
    };

    let mut longest = 1u32;
    let mut run = 1u32;
    let mut prev = first;
    for &date in &dates[1..] {
        if date.signed_duration_since(prev).num_days() == 1 {
            run += 1;
        } else {
            longest = longest.max(run);
            run = 1;
        }
        prev = date;
    }
    longest.max(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn date_set(dates: &[NaiveDate]) -> BTreeSet<NaiveDate> {
        dates.iter().copied().collect()
    }

    #[test]
    fn empty_history_is_zero() {
        let dates = BTreeSet::new();
        assert_eq!(current_streak(&dates, d(2024, 3, 7), d(2024, 1, 1)), 0);
        assert_eq!(longest_streak(&[]), 0);
    }

    #[test]
    fn single_checkin() {
        let today = d(2024, 3, 7);
        let dates = date_set(&[today]);
        assert_eq!(current_streak(&dates, today, d(2024, 1, 1)), 1);
        assert_eq!(longest_streak(&[today]), 1);
    }

    #[test]
    fn seven_consecutive_days() {
        let dates: Vec<NaiveDate> = (1..=7).map(|day| d(2024, 3, day)).collect();
        let set = date_set(&dates);
        assert_eq!(current_streak(&set, d(2024, 3, 7), d(2024, 1, 1)), 7);
        assert_eq!(longest_streak(&dates), 7);
    }

    #[test]
    fn missing_today_breaks_current_streak() {
        let dates = date_set(&[d(2024, 3, 5), d(2024, 3, 6)]);
        assert_eq!(current_streak(&dates, d(2024, 3, 7), d(2024, 1, 1)), 0);
    }

    #[test]
    fn gap_resets_longest_run() {
        let dates = vec![
            d(2024, 3, 1),
            d(2024, 3, 2),
            d(2024, 3, 4),
            d(2024, 3, 5),
            d(2024, 3, 6),
        ];
        assert_eq!(longest_streak(&dates), 3);
    }

    #[test]
    fn floor_caps_the_walk() {
        // Dates below the floor must not be counted even if present.
        let dates = date_set(&[d(2024, 3, 5), d(2024, 3, 6), d(2024, 3, 7)]);
        assert_eq!(current_streak(&dates, d(2024, 3, 7), d(2024, 3, 6)), 2);
    }

    #[test]
    fn month_boundary_is_consecutive() {
        let dates = vec![d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1)];
        assert_eq!(longest_streak(&dates), 3);
    }

    proptest! {
        /// The longest streak over the whole history can never be
        /// shorter than the run ending today.
        #[test]
        fn longest_is_at_least_current(offsets in proptest::collection::btree_set(0i64..120, 0..60)) {
            let today = d(2024, 6, 30);
            let set: BTreeSet<NaiveDate> = offsets
                .iter()
                .filter_map(|&off| today.checked_sub_signed(chrono::Duration::days(off)))
                .collect();
            let asc: Vec<NaiveDate> = set.iter().copied().collect();
            let floor = asc.first().copied().unwrap_or(today);
            prop_assert!(longest_streak(&asc) >= current_streak(&set, today, floor));
        }
    }
}
