//! The engine facade: habits, check-ins, streaks, completion rates,
//! points and statistics behind one struct.
//!
//! A [`Tracker`] owns the SQLite store and a [`Clock`]; every
//! date-sensitive computation goes through the clock so tests can pin
//! "today".

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info};

use crate::checkin::{CalendarDay, Checkin, CheckinReceipt, MonthCalendar, NewCheckin};
use crate::clock::{Clock, SystemClock};
use crate::completion;
use crate::error::{CoreError, Result};
use crate::habit::{Habit, HabitStatus, HabitUpdate, NewHabit};
use crate::points::{
    streak_bonus, PointKind, PointRecord, PointSummary, CHECKIN_BASE_POINTS, MAKEUP_COST,
    MONTHLY_BONUS_EARLIEST_DAY, MONTHLY_BONUS_KIND, MONTHLY_COMPLETION_BONUS,
    REASON_DAILY_CHECKIN, REASON_MONTHLY_BONUS,
};
use crate::rewards::{self, ExchangeOutcome};
use crate::stats::{DailyStats, HabitStats, UserStatistics};
use crate::storage::{Config, Database};
use crate::streak;
use crate::user::User;

/// Habit-tracking engine over a SQLite store and an injected clock.
pub struct Tracker {
    db: Database,
    clock: Box<dyn Clock>,
}

impl Tracker {
    pub fn new(db: Database, clock: Box<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Open the default database with the system clock.
    pub fn open() -> Result<Self> {
        Ok(Self::new(Database::open()?, Box::new(SystemClock::new())))
    }

    /// Open the default database, applying the configured timezone
    /// offset to the calendar-day boundary.
    pub fn open_with(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Database::open()?,
            Box::new(SystemClock::with_offset(config.timezone_offset_hours)),
        ))
    }

    /// In-memory engine with a caller-supplied clock (tests).
    pub fn open_memory(clock: Box<dyn Clock>) -> Result<Self> {
        Ok(Self::new(Database::open_memory()?, clock))
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // === Users ===

    /// Get-or-create a user keyed on `openid`.
    pub fn ensure_user(&self, openid: &str, nickname: Option<&str>) -> Result<User> {
        Ok(self.db.ensure_user(openid, nickname, self.clock.now())?)
    }

    pub fn user(&self, user_id: i64) -> Result<User> {
        self.db
            .user(user_id)?
            .ok_or(CoreError::UserNotFound { user_id })
    }

    // === Habits ===

    pub fn create_habit(&self, user_id: i64, new: NewHabit) -> Result<Habit> {
        let habit_id = self.db.insert_habit(user_id, &new, self.clock.now())?;
        debug!(user_id, habit_id, name = %new.name, "habit created");
        self.habit(user_id, habit_id)
    }

    /// A habit owned by the user, in any lifecycle status.
    pub fn habit(&self, user_id: i64, habit_id: i64) -> Result<Habit> {
        match self.db.habit(habit_id)? {
            Some(habit) if habit.user_id == user_id => Ok(habit),
            _ => Err(CoreError::HabitNotFound { habit_id }),
        }
    }

    /// The user's active habits.
    pub fn habits(&self, user_id: i64) -> Result<Vec<Habit>> {
        Ok(self
            .db
            .habits_for_user(user_id, Some(HabitStatus::Active))?)
    }

    pub fn update_habit(
        &self,
        user_id: i64,
        habit_id: i64,
        update: HabitUpdate,
    ) -> Result<Habit> {
        let mut habit = self.habit(user_id, habit_id)?;
        habit.apply(update);
        self.db.update_habit(&habit)?;
        Ok(habit)
    }

    /// Soft-delete: flips the status, keeps the row and its history.
    pub fn delete_habit(&self, user_id: i64, habit_id: i64) -> Result<()> {
        let mut habit = self.habit(user_id, habit_id)?;
        habit.status = HabitStatus::Deleted;
        self.db.update_habit(&habit)?;
        info!(user_id, habit_id, "habit soft-deleted");
        Ok(())
    }

    /// Owned *and* active, the precondition for check-ins.
    fn active_habit(&self, user_id: i64, habit_id: i64) -> Result<Habit> {
        let habit = self.habit(user_id, habit_id)?;
        if habit.status != HabitStatus::Active {
            return Err(CoreError::HabitNotFound { habit_id });
        }
        Ok(habit)
    }

    // === Check-in ledger ===

    /// Record a check-in and run the award policy.
    ///
    /// Fails with `HabitNotFound` for foreign or inactive habits and
    /// `DuplicateCheckin` when the (habit, date) slot is taken; the
    /// duplicate is detected by the storage-layer unique constraint,
    /// so racing submissions resolve to exactly one winner.
    pub fn record_checkin(
        &self,
        user_id: i64,
        habit_id: i64,
        date: NaiveDate,
        new: NewCheckin,
    ) -> Result<CheckinReceipt> {
        let habit = self.active_habit(user_id, habit_id)?;
        let checkin_id = match self.db.insert_checkin(
            user_id,
            habit_id,
            date,
            self.clock.now(),
            new.note.as_deref(),
            new.image.as_deref(),
            false,
        ) {
            Ok(id) => id,
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(CoreError::DuplicateCheckin { habit_id, date });
            }
            Err(e) => return Err(e.into()),
        };

        let streak = self.streak_for(&habit)?;
        let award = CHECKIN_BASE_POINTS + streak_bonus(streak);
        self.apply_point_delta(user_id, award, PointKind::Earn, REASON_DAILY_CHECKIN)?;
        let bonus = self.monthly_completion_bonus(user_id)?;

        let balance = self.user(user_id)?.points;
        info!(
            user_id,
            habit_id,
            %date,
            streak,
            points = award + bonus,
            "check-in recorded"
        );
        Ok(CheckinReceipt {
            checkin: self.checkin_by_id(checkin_id)?,
            streak,
            points_delta: award + bonus,
            balance,
        })
    }

    /// Backdate a check-in to exactly yesterday, for a fixed point
    /// cost. Deduction, ledger append and check-in row are one
    /// transaction: on `InsufficientPoints` or a duplicate nothing is
    /// written. Makeup check-ins earn no points.
    pub fn record_makeup_checkin(
        &self,
        user_id: i64,
        habit_id: i64,
        date: NaiveDate,
    ) -> Result<CheckinReceipt> {
        let habit = self.active_habit(user_id, habit_id)?;
        let yesterday = self
            .clock
            .today()
            .pred_opt()
            .ok_or(CoreError::InvalidMakeupWindow { date })?;
        if date != yesterday {
            return Err(CoreError::InvalidMakeupWindow { date });
        }

        match self
            .db
            .spend_and_insert_checkin(user_id, habit_id, date, MAKEUP_COST, self.clock.now())
        {
            Ok(Some((checkin_id, balance))) => {
                let streak = self.streak_for(&habit)?;
                info!(user_id, habit_id, %date, "makeup check-in recorded");
                Ok(CheckinReceipt {
                    checkin: self.checkin_by_id(checkin_id)?,
                    streak,
                    points_delta: -MAKEUP_COST,
                    balance,
                })
            }
            Ok(None) => {
                let available = self.user(user_id)?.points;
                Err(CoreError::InsufficientPoints {
                    required: MAKEUP_COST,
                    available,
                })
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(CoreError::DuplicateCheckin { habit_id, date })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The user's check-ins, newest date first, with optional habit and
    /// inclusive date-range filters.
    pub fn list_checkins(
        &self,
        user_id: i64,
        habit_id: Option<i64>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Checkin>> {
        if let Some(habit_id) = habit_id {
            self.habit(user_id, habit_id)?;
        }
        Ok(self.db.checkins(user_id, habit_id, start, end)?)
    }

    /// Calendar view of one habit for one month. Days without a record
    /// are absent from the map.
    pub fn month_calendar(
        &self,
        user_id: i64,
        habit_id: i64,
        year: i32,
        month: u32,
    ) -> Result<MonthCalendar> {
        self.habit(user_id, habit_id)?;
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            CoreError::TransactionFailed(format!("invalid month {year}-{month:02}"))
        })?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let last = next_first
            .and_then(|d| d.pred_opt())
            .unwrap_or(first);

        let mut calendar = MonthCalendar {
            habit_id,
            year,
            month,
            days: Default::default(),
        };
        for checkin in self.db.checkins_between(habit_id, first, last)? {
            calendar.days.insert(
                checkin.checkin_date.to_string(),
                CalendarDay {
                    checked_in: true,
                    is_makeup: checkin.is_makeup,
                    note: checkin.note,
                    image: checkin.image,
                },
            );
        }
        Ok(calendar)
    }

    fn checkin_by_id(&self, checkin_id: i64) -> Result<Checkin> {
        self.db.checkin(checkin_id)?.ok_or_else(|| {
            CoreError::TransactionFailed(format!("check-in {checkin_id} vanished mid-operation"))
        })
    }

    // === Streaks ===

    /// Consecutive checked-in days ending today for one habit.
    pub fn current_streak(&self, habit_id: i64) -> Result<u32> {
        let habit = self
            .db
            .habit(habit_id)?
            .ok_or(CoreError::HabitNotFound { habit_id })?;
        self.streak_for(&habit)
    }

    fn streak_for(&self, habit: &Habit) -> Result<u32> {
        let dates: BTreeSet<NaiveDate> =
            self.db.checkin_dates(habit.id)?.into_iter().collect();
        let today = self.clock.today();
        // The lookback floor bounds the walk even for corrupted
        // histories: nothing before the habit existed (or its earliest
        // record, for backdated rows) can extend a streak.
        let earliest = dates.iter().next().copied().unwrap_or(today);
        let floor = habit.created_at.date_naive().min(earliest);
        Ok(streak::current_streak(&dates, today, floor))
    }

    /// Longest consecutive run over the habit's full history.
    pub fn longest_streak(&self, habit_id: i64) -> Result<u32> {
        let dates = self.db.checkin_dates(habit_id)?;
        Ok(streak::longest_streak(&dates))
    }

    /// Max current streak across the user's active habits.
    pub fn longest_current_streak(&self, user_id: i64) -> Result<u32> {
        let mut longest = 0;
        for habit in self.habits(user_id)? {
            longest = longest.max(self.streak_for(&habit)?);
        }
        Ok(longest)
    }

    // === Completion rates ===

    /// Trailing-window completion rate for one habit, in [0, 100].
    /// Days before the habit existed count as missed.
    pub fn completion_rate(&self, habit_id: i64, window_days: u32) -> Result<f64> {
        let (start, end) = completion::trailing_window(self.clock.today(), window_days);
        let checked = self.db.count_habit_checkins_between(habit_id, start, end)?;
        Ok(completion::rate(checked, u64::from(window_days)))
    }

    /// Month-to-date rate: check-ins across all the user's habits over
    /// active-habit-count x day-of-month. 0 with no active habits.
    pub fn monthly_completion_rate(&self, user_id: i64) -> Result<f64> {
        let active = self.db.count_habits(user_id, Some(HabitStatus::Active))?;
        if active == 0 {
            return Ok(0.0);
        }
        let today = self.clock.today();
        let (first, elapsed) = completion::month_window(today);
        let completed = self.db.count_user_checkins_between(user_id, first, today)?;
        Ok(completion::rate(completed, active * u64::from(elapsed)))
    }

    /// Week-to-date rate with the window anchored at the most recent
    /// Monday.
    pub fn weekly_completion_rate(&self, user_id: i64) -> Result<f64> {
        let active = self.db.count_habits(user_id, Some(HabitStatus::Active))?;
        if active == 0 {
            return Ok(0.0);
        }
        let today = self.clock.today();
        let (monday, elapsed) = completion::week_window(today);
        let completed = self.db.count_user_checkins_between(user_id, monday, today)?;
        Ok(completion::rate(completed, active * u64::from(elapsed)))
    }

    // === Point ledger & policy ===

    /// Atomically mutate the balance and append the ledger entry.
    /// Spends that would overdraw fail with `InsufficientPoints` and
    /// write nothing.
    pub fn apply_point_delta(
        &self,
        user_id: i64,
        delta: i64,
        kind: PointKind,
        reason: &str,
    ) -> Result<i64> {
        match self
            .db
            .apply_point_delta(user_id, delta, kind, reason, self.clock.now())?
        {
            Some(balance) => {
                debug!(user_id, delta, reason, balance, "point delta applied");
                Ok(balance)
            }
            None if delta < 0 => {
                let available = self.user(user_id)?.points;
                Err(CoreError::InsufficientPoints {
                    required: -delta,
                    available,
                })
            }
            None => Err(CoreError::UserNotFound { user_id }),
        }
    }

    /// Award the once-per-month completion bonus when due. Returns the
    /// amount awarded, 0 when not due or already awarded this month.
    ///
    /// Due means: today is day 28 or later, and the month-to-date
    /// completion rate is 100%. The dedup key is the `bonus_awards`
    /// unique index, inserted in the same transaction as the award.
    pub fn monthly_completion_bonus(&self, user_id: i64) -> Result<i64> {
        let today = self.clock.today();
        if today.day() < MONTHLY_BONUS_EARLIEST_DAY {
            return Ok(0);
        }
        if self.monthly_completion_rate(user_id)? < 100.0 {
            return Ok(0);
        }
        let awarded = self.db.award_bonus(
            user_id,
            MONTHLY_BONUS_KIND,
            &completion::year_month(today),
            MONTHLY_COMPLETION_BONUS,
            REASON_MONTHLY_BONUS,
            self.clock.now(),
        )?;
        match awarded {
            Some(balance) => {
                info!(user_id, balance, "monthly completion bonus awarded");
                Ok(MONTHLY_COMPLETION_BONUS)
            }
            None => Ok(0),
        }
    }

    /// Exchange points for a catalog reward.
    pub fn exchange_reward(&self, user_id: i64, reward_id: &str) -> Result<ExchangeOutcome> {
        let reward = rewards::find(reward_id).ok_or_else(|| CoreError::RewardNotFound {
            reward_id: reward_id.to_string(),
        })?;
        let remaining = self.apply_point_delta(
            user_id,
            -reward.cost,
            PointKind::Spend,
            &format!("exchange_{}", reward.id),
        )?;
        info!(user_id, reward_id, remaining, "reward exchanged");
        Ok(ExchangeOutcome {
            reward: *reward,
            remaining_points: remaining,
        })
    }

    /// Balance plus earn totals for today / this week / this month.
    pub fn point_summary(&self, user_id: i64) -> Result<PointSummary> {
        let user = self.user(user_id)?;
        let today = self.clock.today();
        let (monday, _) = completion::week_window(today);
        let (month_first, _) = completion::month_window(today);
        Ok(PointSummary {
            total_points: user.points,
            earned_today: self.db.earned_since(user_id, today)?,
            earned_this_week: self.db.earned_since(user_id, monday)?,
            earned_this_month: self.db.earned_since(user_id, month_first)?,
        })
    }

    /// Ledger page, newest first.
    pub fn point_history(
        &self,
        user_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PointRecord>> {
        Ok(self.db.point_records(user_id, limit, offset)?)
    }

    // === Statistics ===

    /// Account-wide overview.
    pub fn overview(&self, user_id: i64) -> Result<UserStatistics> {
        let user = self.user(user_id)?;
        Ok(UserStatistics {
            total_habits: self.db.count_habits(user_id, None)?,
            active_habits: self.db.count_habits(user_id, Some(HabitStatus::Active))?,
            total_checkins: self.db.count_user_checkins(user_id)?,
            current_longest_streak: self.longest_current_streak(user_id)?,
            total_points: user.points,
            monthly_completion_rate: self.monthly_completion_rate(user_id)?,
            weekly_completion_rate: self.weekly_completion_rate(user_id)?,
        })
    }

    /// Per-habit statistics for the user's active habits.
    pub fn habit_statistics(&self, user_id: i64) -> Result<Vec<HabitStats>> {
        let mut out = Vec::new();
        for habit in self.habits(user_id)? {
            out.push(HabitStats {
                habit_id: habit.id,
                habit_name: habit.name.clone(),
                total_checkins: self.db.count_habit_checkins(habit.id)?,
                current_streak: self.streak_for(&habit)?,
                longest_streak: self.longest_streak(habit.id)?,
                completion_rate: self.completion_rate(habit.id, 30)?,
                last_checkin_date: self.db.last_checkin_date(habit.id)?,
            });
        }
        Ok(out)
    }

    /// Daily check-in counts for the trailing `days` days, ascending,
    /// zero-filled.
    pub fn daily_statistics(&self, user_id: i64, days: u32) -> Result<Vec<DailyStats>> {
        let active = self.db.count_habits(user_id, Some(HabitStatus::Active))?;
        let today = self.clock.today();
        let (start, _) = completion::trailing_window(today, days);

        let mut out = Vec::new();
        let mut date = start;
        while date <= today {
            let count = self.db.count_user_checkins_on(user_id, date)?;
            out.push(DailyStats {
                date,
                total_checkins: count,
                total_habits: active,
                completion_rate: completion::rate(count, active),
            });
            date += Duration::days(1);
        }
        Ok(out)
    }
}
