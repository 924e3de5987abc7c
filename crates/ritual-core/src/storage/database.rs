//! SQLite-backed store for users, habits, check-ins and the point
//! ledger.
//!
//! All multi-write operations (balance + ledger, spend + makeup row,
//! bonus key + award) run inside a single transaction; a transaction
//! dropped without commit rolls back, so no failure leaves partial
//! state. Spends use a guarded UPDATE so the balance check and the
//! decrement are one atomic statement.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, ToSql};

use super::migrations;
use crate::checkin::Checkin;
use crate::error::DatabaseError;
use crate::habit::{Habit, HabitFrequency, HabitStatus, NewHabit};
use crate::points::{PointKind, PointRecord, REASON_MAKEUP_CHECKIN};
use crate::user::User;

// === Helper Functions ===

/// Parse a calendar date from database text with fallback to today.
fn parse_date_fallback(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap_or_else(|_| Utc::now().date_naive())
}

/// Parse a datetime from RFC3339 text with fallback to current time.
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Build a User from a database row.
fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    let created_str: String = row.get(4)?;
    let updated_str: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        openid: row.get(1)?,
        nickname: row.get(2)?,
        points: row.get(3)?,
        created_at: parse_datetime_fallback(&created_str),
        updated_at: parse_datetime_fallback(&updated_str),
    })
}

/// Build a Habit from a database row.
fn row_to_habit(row: &rusqlite::Row) -> Result<Habit, rusqlite::Error> {
    let frequency_str: String = row.get(6)?;
    let status_str: String = row.get(8)?;
    let created_str: String = row.get(9)?;
    Ok(Habit {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        icon: row.get(4)?,
        category: row.get(5)?,
        frequency: HabitFrequency::parse(&frequency_str),
        reminder_time: row.get(7)?,
        status: HabitStatus::parse(&status_str),
        created_at: parse_datetime_fallback(&created_str),
    })
}

/// Build a Checkin from a database row.
fn row_to_checkin(row: &rusqlite::Row) -> Result<Checkin, rusqlite::Error> {
    let date_str: String = row.get(3)?;
    let recorded_str: String = row.get(4)?;
    Ok(Checkin {
        id: row.get(0)?,
        habit_id: row.get(1)?,
        user_id: row.get(2)?,
        checkin_date: parse_date_fallback(&date_str),
        recorded_at: parse_datetime_fallback(&recorded_str),
        note: row.get(5)?,
        image: row.get(6)?,
        is_makeup: row.get(7)?,
    })
}

/// Build a PointRecord from a database row.
fn row_to_point_record(row: &rusqlite::Row) -> Result<PointRecord, rusqlite::Error> {
    let kind_str: String = row.get(3)?;
    let created_str: String = row.get(5)?;
    Ok(PointRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        points: row.get(2)?,
        kind: PointKind::parse(&kind_str),
        reason: row.get(4)?,
        created_at: parse_datetime_fallback(&created_str),
    })
}

const CHECKIN_COLUMNS: &str =
    "id, habit_id, user_id, checkin_date, recorded_at, note, image, is_makeup";
const HABIT_COLUMNS: &str =
    "id, user_id, name, description, icon, category, frequency, reminder_time, status, created_at";
const USER_COLUMNS: &str = "id, openid, nickname, points, created_at, updated_at";

/// SQLite database for habit, check-in and point storage.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/ritual.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> crate::error::Result<Self> {
        let path = super::data_dir()?.join("ritual.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: &Path) -> crate::error::Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_conn(conn)
    }

    /// Open an in-memory database (tests, scratch tooling).
    pub fn open_memory() -> crate::error::Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
                path: PathBuf::from(":memory:"),
                source,
            })?;
        Self::from_conn(conn)
    }

    fn from_conn(conn: Connection) -> crate::error::Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(DatabaseError::from)?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // === Users ===

    /// Get-or-create a user keyed on `openid`.
    pub fn ensure_user(
        &self,
        openid: &str,
        nickname: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<User, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO users (openid, nickname, points, created_at, updated_at)
             VALUES (?1, ?2, 0, ?3, ?3)
             ON CONFLICT(openid) DO NOTHING",
            params![openid, nickname, now.to_rfc3339()],
        )?;
        self.conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE openid = ?1"),
            params![openid],
            row_to_user,
        )
    }

    pub fn user(&self, user_id: i64) -> Result<Option<User>, rusqlite::Error> {
        self.conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![user_id],
                row_to_user,
            )
            .optional()
    }

    // === Habits ===

    pub fn insert_habit(
        &self,
        user_id: i64,
        new: &NewHabit,
        now: DateTime<Utc>,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO habits
                 (user_id, name, description, icon, category, frequency, reminder_time, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'active', ?8)",
            params![
                user_id,
                new.name,
                new.description,
                new.icon,
                new.category,
                new.frequency.as_str(),
                new.reminder_time,
                now.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn habit(&self, habit_id: i64) -> Result<Option<Habit>, rusqlite::Error> {
        self.conn
            .query_row(
                &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
                params![habit_id],
                row_to_habit,
            )
            .optional()
    }

    /// Write back a habit's mutable fields. `created_at` is immutable.
    pub fn update_habit(&self, habit: &Habit) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE habits
             SET name = ?2, description = ?3, icon = ?4, category = ?5,
                 frequency = ?6, reminder_time = ?7, status = ?8
             WHERE id = ?1",
            params![
                habit.id,
                habit.name,
                habit.description,
                habit.icon,
                habit.category,
                habit.frequency.as_str(),
                habit.reminder_time,
                habit.status.as_str(),
            ],
        )?;
        Ok(())
    }

    pub fn habits_for_user(
        &self,
        user_id: i64,
        status: Option<HabitStatus>,
    ) -> Result<Vec<Habit>, rusqlite::Error> {
        match status {
            Some(status) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {HABIT_COLUMNS} FROM habits
                     WHERE user_id = ?1 AND status = ?2 ORDER BY id"
                ))?;
                let rows = stmt.query_map(params![user_id, status.as_str()], row_to_habit)?;
                rows.collect()
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = ?1 ORDER BY id"
                ))?;
                let rows = stmt.query_map(params![user_id], row_to_habit)?;
                rows.collect()
            }
        }
    }

    pub fn count_habits(
        &self,
        user_id: i64,
        status: Option<HabitStatus>,
    ) -> Result<u64, rusqlite::Error> {
        match status {
            Some(status) => self.conn.query_row(
                "SELECT COUNT(*) FROM habits WHERE user_id = ?1 AND status = ?2",
                params![user_id, status.as_str()],
                |row| row.get(0),
            ),
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM habits WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            ),
        }
    }

    // === Check-ins ===

    /// Insert a check-in row. A violation of the
    /// `UNIQUE(habit_id, checkin_date)` constraint surfaces as a
    /// rusqlite constraint error; the caller maps it to
    /// `DuplicateCheckin`.
    #[allow(clippy::too_many_arguments)]
    pub fn insert_checkin(
        &self,
        user_id: i64,
        habit_id: i64,
        date: NaiveDate,
        recorded_at: DateTime<Utc>,
        note: Option<&str>,
        image: Option<&str>,
        is_makeup: bool,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO checkins
                 (habit_id, user_id, checkin_date, recorded_at, note, image, is_makeup)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                habit_id,
                user_id,
                date.to_string(),
                recorded_at.to_rfc3339(),
                note,
                image,
                is_makeup,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn checkin(&self, checkin_id: i64) -> Result<Option<Checkin>, rusqlite::Error> {
        self.conn
            .query_row(
                &format!("SELECT {CHECKIN_COLUMNS} FROM checkins WHERE id = ?1"),
                params![checkin_id],
                row_to_checkin,
            )
            .optional()
    }

    /// A user's check-ins with optional habit and date filters, newest
    /// date first.
    pub fn checkins(
        &self,
        user_id: i64,
        habit_id: Option<i64>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Checkin>, rusqlite::Error> {
        let mut sql =
            format!("SELECT {CHECKIN_COLUMNS} FROM checkins WHERE user_id = ?1");
        let mut bound: Vec<Box<dyn ToSql>> = vec![Box::new(user_id)];
        if let Some(habit_id) = habit_id {
            bound.push(Box::new(habit_id));
            sql.push_str(&format!(" AND habit_id = ?{}", bound.len()));
        }
        if let Some(start) = start {
            bound.push(Box::new(start.to_string()));
            sql.push_str(&format!(" AND checkin_date >= ?{}", bound.len()));
        }
        if let Some(end) = end {
            bound.push(Box::new(end.to_string()));
            sql.push_str(&format!(" AND checkin_date <= ?{}", bound.len()));
        }
        sql.push_str(" ORDER BY checkin_date DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params_from_iter(bound.iter().map(|p| p.as_ref())),
            row_to_checkin,
        )?;
        rows.collect()
    }

    /// One habit's check-ins in an inclusive date range, ascending.
    pub fn checkins_between(
        &self,
        habit_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Checkin>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CHECKIN_COLUMNS} FROM checkins
             WHERE habit_id = ?1 AND checkin_date >= ?2 AND checkin_date <= ?3
             ORDER BY checkin_date"
        ))?;
        let rows = stmt.query_map(
            params![habit_id, start.to_string(), end.to_string()],
            row_to_checkin,
        )?;
        rows.collect()
    }

    /// All check-in dates of a habit, ascending.
    pub fn checkin_dates(&self, habit_id: i64) -> Result<Vec<NaiveDate>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT checkin_date FROM checkins WHERE habit_id = ?1 ORDER BY checkin_date",
        )?;
        let rows = stmt.query_map(params![habit_id], |row| {
            let date_str: String = row.get(0)?;
            Ok(parse_date_fallback(&date_str))
        })?;
        rows.collect()
    }

    pub fn count_habit_checkins(&self, habit_id: i64) -> Result<u64, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM checkins WHERE habit_id = ?1",
            params![habit_id],
            |row| row.get(0),
        )
    }

    pub fn count_habit_checkins_between(
        &self,
        habit_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM checkins
             WHERE habit_id = ?1 AND checkin_date >= ?2 AND checkin_date <= ?3",
            params![habit_id, start.to_string(), end.to_string()],
            |row| row.get(0),
        )
    }

    pub fn count_user_checkins(&self, user_id: i64) -> Result<u64, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM checkins WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
    }

    /// All of a user's check-ins in a range, across every habit.
    pub fn count_user_checkins_between(
        &self,
        user_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM checkins
             WHERE user_id = ?1 AND checkin_date >= ?2 AND checkin_date <= ?3",
            params![user_id, start.to_string(), end.to_string()],
            |row| row.get(0),
        )
    }

    pub fn count_user_checkins_on(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> Result<u64, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM checkins WHERE user_id = ?1 AND checkin_date = ?2",
            params![user_id, date.to_string()],
            |row| row.get(0),
        )
    }

    pub fn last_checkin_date(
        &self,
        habit_id: i64,
    ) -> Result<Option<NaiveDate>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT checkin_date FROM checkins
                 WHERE habit_id = ?1 ORDER BY checkin_date DESC LIMIT 1",
                params![habit_id],
                |row| {
                    let date_str: String = row.get(0)?;
                    Ok(parse_date_fallback(&date_str))
                },
            )
            .optional()
    }

    // === Point ledger ===

    /// Mutate the balance and append the ledger entry in one
    /// transaction. Returns the new balance, or `None` when a negative
    /// delta would overdraw the account (or the user does not exist);
    /// in that case nothing is written.
    pub fn apply_point_delta(
        &self,
        user_id: i64,
        delta: i64,
        kind: PointKind,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, rusqlite::Error> {
        let tx = self.conn.unchecked_transaction()?;
        // The balance guard rides on the UPDATE itself: check and
        // decrement are one atomic statement.
        let updated = tx.execute(
            "UPDATE users SET points = points + ?1, updated_at = ?3
             WHERE id = ?2 AND points + ?1 >= 0",
            params![delta, user_id, now.to_rfc3339()],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        tx.execute(
            "INSERT INTO point_records (user_id, points, kind, reason, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, delta, kind.as_str(), reason, now.to_rfc3339()],
        )?;
        let balance: i64 = tx.query_row(
            "SELECT points FROM users WHERE id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(Some(balance))
    }

    /// Makeup flow: deduct the cost and create the backdated check-in
    /// row as one transaction. Returns `(checkin_id, new_balance)`, or
    /// `None` when the balance cannot cover the cost. A duplicate
    /// (habit, date) pair propagates as a constraint error and rolls
    /// everything back.
    pub fn spend_and_insert_checkin(
        &self,
        user_id: i64,
        habit_id: i64,
        date: NaiveDate,
        cost: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<(i64, i64)>, rusqlite::Error> {
        let tx = self.conn.unchecked_transaction()?;
        let updated = tx.execute(
            "UPDATE users SET points = points - ?1, updated_at = ?3
             WHERE id = ?2 AND points >= ?1",
            params![cost, user_id, now.to_rfc3339()],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        tx.execute(
            "INSERT INTO point_records (user_id, points, kind, reason, created_at)
             VALUES (?1, ?2, 'spend', ?3, ?4)",
            params![user_id, -cost, REASON_MAKEUP_CHECKIN, now.to_rfc3339()],
        )?;
        tx.execute(
            "INSERT INTO checkins (habit_id, user_id, checkin_date, recorded_at, is_makeup)
             VALUES (?1, ?2, ?3, ?4, 1)",
            params![habit_id, user_id, date.to_string(), now.to_rfc3339()],
        )?;
        let checkin_id = tx.last_insert_rowid();
        let balance: i64 = tx.query_row(
            "SELECT points FROM users WHERE id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(Some((checkin_id, balance)))
    }

    /// Award a once-per-month bonus. The `bonus_awards` unique index is
    /// the idempotency key: when a row for (user, kind, year_month)
    /// already exists nothing is written and `None` is returned.
    pub fn award_bonus(
        &self,
        user_id: i64,
        bonus_kind: &str,
        year_month: &str,
        amount: i64,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, rusqlite::Error> {
        let tx = self.conn.unchecked_transaction()?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO bonus_awards (user_id, bonus_kind, year_month, awarded_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, bonus_kind, year_month, now.to_rfc3339()],
        )?;
        if inserted == 0 {
            return Ok(None);
        }
        tx.execute(
            "UPDATE users SET points = points + ?1, updated_at = ?3 WHERE id = ?2",
            params![amount, user_id, now.to_rfc3339()],
        )?;
        tx.execute(
            "INSERT INTO point_records (user_id, points, kind, reason, created_at)
             VALUES (?1, ?2, 'earn', ?3, ?4)",
            params![user_id, amount, reason, now.to_rfc3339()],
        )?;
        let balance: i64 = tx.query_row(
            "SELECT points FROM users WHERE id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(Some(balance))
    }

    /// Ledger page, newest first.
    pub fn point_records(
        &self,
        user_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<PointRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, points, kind, reason, created_at
             FROM point_records WHERE user_id = ?1
             ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
        )?;
        let rows = stmt.query_map(params![user_id, limit, offset], row_to_point_record)?;
        rows.collect()
    }

    /// Sum of earn deltas recorded on or after the given date.
    pub fn earned_since(
        &self,
        user_id: i64,
        since: NaiveDate,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COALESCE(SUM(points), 0) FROM point_records
             WHERE user_id = ?1 AND kind = 'earn' AND created_at >= ?2",
            params![user_id, format!("{since}T00:00:00+00:00")],
            |row| row.get(0),
        )
    }

    /// Signed sum of all ledger deltas; must always equal
    /// `users.points` (consistency audit for tests).
    pub fn ledger_balance(&self, user_id: i64) -> Result<i64, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COALESCE(SUM(points), 0) FROM point_records WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
    }
}
