//! Integration tests for the check-in ledger and streak flows.
//!
//! Each test pins "today" with a fixed clock and drives the engine
//! through the public Tracker API.

use chrono::NaiveDate;
use ritual_core::points::MAKEUP_COST;
use ritual_core::{
    CoreError, FixedClock, HabitStatus, HabitUpdate, NewCheckin, NewHabit, PointKind, Tracker,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn tracker_at(today: NaiveDate) -> Tracker {
    Tracker::open_memory(Box::new(FixedClock::new(today))).unwrap()
}

fn user_with_habit(tracker: &Tracker, name: &str) -> (i64, i64) {
    let user = tracker.ensure_user("itest", None).unwrap();
    let habit = tracker
        .create_habit(user.id, NewHabit { name: name.into(), ..Default::default() })
        .unwrap();
    (user.id, habit.id)
}

#[test]
fn zero_checkins_means_zero_streaks() {
    let tracker = tracker_at(d(2024, 3, 7));
    let (_, habit_id) = user_with_habit(&tracker, "Read");
    assert_eq!(tracker.current_streak(habit_id).unwrap(), 0);
    assert_eq!(tracker.longest_streak(habit_id).unwrap(), 0);
}

#[test]
fn seven_day_streak_earns_weekly_bonus() {
    let tracker = tracker_at(d(2024, 3, 7));
    let (user_id, habit_id) = user_with_habit(&tracker, "Read");

    let mut last_delta = 0;
    for day in 1..=7 {
        let receipt = tracker
            .record_checkin(user_id, habit_id, d(2024, 3, day), NewCheckin::default())
            .unwrap();
        last_delta = receipt.points_delta;
    }

    assert_eq!(tracker.current_streak(habit_id).unwrap(), 7);
    // Base 10 + weekly streak bonus 50, no monthly trigger on day 7.
    assert_eq!(last_delta, 60);
}

#[test]
fn second_checkin_for_same_date_is_rejected() {
    let tracker = tracker_at(d(2024, 3, 7));
    let (user_id, habit_id) = user_with_habit(&tracker, "Read");
    let date = d(2024, 3, 7);

    tracker
        .record_checkin(user_id, habit_id, date, NewCheckin::default())
        .unwrap();
    let err = tracker
        .record_checkin(user_id, habit_id, date, NewCheckin::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::DuplicateCheckin { .. }));

    let all = tracker.list_checkins(user_id, Some(habit_id), None, None).unwrap();
    assert_eq!(all.len(), 1);
}

#[test]
fn checkin_on_inactive_or_foreign_habit_is_not_found() {
    let tracker = tracker_at(d(2024, 3, 7));
    let (user_id, habit_id) = user_with_habit(&tracker, "Read");
    tracker
        .update_habit(
            user_id,
            habit_id,
            HabitUpdate { status: Some(HabitStatus::Paused), ..Default::default() },
        )
        .unwrap();
    let err = tracker
        .record_checkin(user_id, habit_id, d(2024, 3, 7), NewCheckin::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::HabitNotFound { .. }));

    let stranger = tracker.ensure_user("someone-else", None).unwrap();
    let err = tracker
        .record_checkin(stranger.id, habit_id, d(2024, 3, 7), NewCheckin::default())
        .unwrap_err();
    assert!(matches!(err, CoreError::HabitNotFound { .. }));
}

#[test]
fn makeup_is_restricted_to_exactly_yesterday() {
    let tracker = tracker_at(d(2024, 3, 7));
    let (user_id, habit_id) = user_with_habit(&tracker, "Read");
    tracker
        .apply_point_delta(user_id, 100, PointKind::Earn, "seed")
        .unwrap();

    for bad_date in [d(2024, 3, 5), d(2024, 3, 7), d(2024, 3, 8)] {
        let err = tracker
            .record_makeup_checkin(user_id, habit_id, bad_date)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidMakeupWindow { .. }), "{bad_date}");
    }

    let receipt = tracker
        .record_makeup_checkin(user_id, habit_id, d(2024, 3, 6))
        .unwrap();
    assert!(receipt.checkin.is_makeup);
    assert_eq!(receipt.points_delta, -MAKEUP_COST);
    assert_eq!(receipt.balance, 100 - MAKEUP_COST);
}

#[test]
fn makeup_without_points_leaves_no_state_behind() {
    let tracker = tracker_at(d(2024, 3, 7));
    let (user_id, habit_id) = user_with_habit(&tracker, "Read");
    tracker
        .apply_point_delta(user_id, 15, PointKind::Earn, "seed")
        .unwrap();

    let err = tracker
        .record_makeup_checkin(user_id, habit_id, d(2024, 3, 6))
        .unwrap_err();
    match err {
        CoreError::InsufficientPoints { required, available } => {
            assert_eq!(required, MAKEUP_COST);
            assert_eq!(available, 15);
        }
        other => panic!("expected InsufficientPoints, got {other}"),
    }

    // Balance untouched, no check-in row, ledger still consistent.
    assert_eq!(tracker.user(user_id).unwrap().points, 15);
    assert!(tracker.list_checkins(user_id, Some(habit_id), None, None).unwrap().is_empty());
    assert_eq!(tracker.db().ledger_balance(user_id).unwrap(), 15);
}

#[test]
fn makeup_extends_the_current_streak() {
    let tracker = tracker_at(d(2024, 3, 7));
    let (user_id, habit_id) = user_with_habit(&tracker, "Read");
    tracker
        .apply_point_delta(user_id, 50, PointKind::Earn, "seed")
        .unwrap();
    tracker
        .record_checkin(user_id, habit_id, d(2024, 3, 7), NewCheckin::default())
        .unwrap();
    assert_eq!(tracker.current_streak(habit_id).unwrap(), 1);

    let receipt = tracker
        .record_makeup_checkin(user_id, habit_id, d(2024, 3, 6))
        .unwrap();
    assert_eq!(receipt.streak, 2);
    assert_eq!(tracker.current_streak(habit_id).unwrap(), 2);
}

#[test]
fn missing_day_breaks_current_but_not_longest() {
    let tracker = tracker_at(d(2024, 3, 10));
    let (user_id, habit_id) = user_with_habit(&tracker, "Read");
    for day in [1, 2, 3, 4, 9] {
        tracker
            .record_checkin(user_id, habit_id, d(2024, 3, day), NewCheckin::default())
            .unwrap();
    }
    // Today (the 10th) has no check-in.
    assert_eq!(tracker.current_streak(habit_id).unwrap(), 0);
    assert_eq!(tracker.longest_streak(habit_id).unwrap(), 4);
}

#[test]
fn list_checkins_orders_and_filters() {
    let tracker = tracker_at(d(2024, 3, 10));
    let (user_id, habit_id) = user_with_habit(&tracker, "Read");
    let other = tracker
        .create_habit(user_id, NewHabit { name: "Run".into(), ..Default::default() })
        .unwrap();
    for day in [2, 5, 3] {
        tracker
            .record_checkin(user_id, habit_id, d(2024, 3, day), NewCheckin::default())
            .unwrap();
    }
    tracker
        .record_checkin(user_id, other.id, d(2024, 3, 4), NewCheckin::default())
        .unwrap();

    let all = tracker.list_checkins(user_id, None, None, None).unwrap();
    let dates: Vec<_> = all.iter().map(|c| c.checkin_date).collect();
    assert_eq!(dates, vec![d(2024, 3, 5), d(2024, 3, 4), d(2024, 3, 3), d(2024, 3, 2)]);

    let ranged = tracker
        .list_checkins(user_id, Some(habit_id), Some(d(2024, 3, 3)), Some(d(2024, 3, 5)))
        .unwrap();
    assert_eq!(ranged.len(), 2);
}

#[test]
fn month_calendar_reports_only_recorded_days_and_is_idempotent() {
    let tracker = tracker_at(d(2024, 3, 10));
    let (user_id, habit_id) = user_with_habit(&tracker, "Read");
    tracker
        .record_checkin(
            user_id,
            habit_id,
            d(2024, 3, 3),
            NewCheckin { note: Some("felt good".into()), image: None },
        )
        .unwrap();
    tracker
        .apply_point_delta(user_id, 100, PointKind::Earn, "seed")
        .unwrap();
    tracker
        .record_makeup_checkin(user_id, habit_id, d(2024, 3, 9))
        .unwrap();
    // A February record must not leak into March.
    tracker
        .db()
        .insert_checkin(user_id, habit_id, d(2024, 2, 29), chrono::Utc::now(), None, None, false)
        .unwrap();

    let calendar = tracker.month_calendar(user_id, habit_id, 2024, 3).unwrap();
    assert_eq!(calendar.days.len(), 2);
    let day3 = &calendar.days["2024-03-03"];
    assert!(day3.checked_in);
    assert!(!day3.is_makeup);
    assert_eq!(day3.note.as_deref(), Some("felt good"));
    assert!(calendar.days["2024-03-09"].is_makeup);
    assert!(!calendar.days.contains_key("2024-02-29"));

    let again = tracker.month_calendar(user_id, habit_id, 2024, 3).unwrap();
    assert_eq!(calendar, again);
}

#[test]
fn longest_current_streak_spans_active_habits_only() {
    let tracker = tracker_at(d(2024, 3, 7));
    let user = tracker.ensure_user("itest", None).unwrap();
    assert_eq!(tracker.longest_current_streak(user.id).unwrap(), 0);

    let short = tracker
        .create_habit(user.id, NewHabit { name: "Short".into(), ..Default::default() })
        .unwrap();
    let long = tracker
        .create_habit(user.id, NewHabit { name: "Long".into(), ..Default::default() })
        .unwrap();
    tracker
        .record_checkin(user.id, short.id, d(2024, 3, 7), NewCheckin::default())
        .unwrap();
    for day in 5..=7 {
        tracker
            .record_checkin(user.id, long.id, d(2024, 3, day), NewCheckin::default())
            .unwrap();
    }
    assert_eq!(tracker.longest_current_streak(user.id).unwrap(), 3);

    // Pausing the longer habit removes it from the aggregate.
    tracker
        .update_habit(
            user.id,
            long.id,
            HabitUpdate { status: Some(HabitStatus::Paused), ..Default::default() },
        )
        .unwrap();
    assert_eq!(tracker.longest_current_streak(user.id).unwrap(), 1);
}

#[test]
fn deleted_habits_keep_their_history() {
    let tracker = tracker_at(d(2024, 3, 7));
    let (user_id, habit_id) = user_with_habit(&tracker, "Read");
    tracker
        .record_checkin(user_id, habit_id, d(2024, 3, 7), NewCheckin::default())
        .unwrap();
    tracker.delete_habit(user_id, habit_id).unwrap();

    // Soft-deleted: the habit row and its check-ins remain readable.
    let habit = tracker.habit(user_id, habit_id).unwrap();
    assert_eq!(habit.status, HabitStatus::Deleted);
    assert_eq!(tracker.list_checkins(user_id, Some(habit_id), None, None).unwrap().len(), 1);
    assert!(tracker.habits(user_id).unwrap().is_empty());
}
