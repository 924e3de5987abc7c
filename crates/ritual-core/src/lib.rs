//! # Ritual Core Library
//!
//! This library provides the core business logic for Ritual, a
//! habit-tracking application: check-in ledger, streak calculator,
//! completion-rate calculator, and the point ledger & policy engine.
//! The CLI binary (and any future transport layer) is a thin shell
//! over this crate.
//!
//! ## Architecture
//!
//! - **Tracker**: the engine facade composing the store, the clock and
//!   the award policy; every operation is a synchronous
//!   request/response with no state outside SQLite
//! - **Storage**: SQLite-backed ledgers with uniqueness and atomicity
//!   enforced at the SQL layer, plus TOML-based configuration
//! - **Streak / Completion**: pure date arithmetic over check-in
//!   histories, fed through an injectable [`Clock`]
//!
//! ## Key Components
//!
//! - [`Tracker`]: engine entry point
//! - [`Database`]: habit, check-in and point persistence
//! - [`Clock`]: source of "today" (pin it with [`FixedClock`] in tests)
//! - [`CoreError`]: every failure kind the engine reports

pub mod checkin;
pub mod clock;
pub mod completion;
pub mod error;
pub mod habit;
pub mod points;
pub mod rewards;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod tracker;
pub mod user;

pub use checkin::{CalendarDay, Checkin, CheckinReceipt, MonthCalendar, NewCheckin};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, Result};
pub use habit::{Habit, HabitFrequency, HabitStatus, HabitUpdate, NewHabit};
pub use points::{PointKind, PointRecord, PointSummary};
pub use rewards::{ExchangeOutcome, Reward, CATALOG};
pub use stats::{DailyStats, HabitStats, UserStatistics};
pub use storage::{Config, Database};
pub use tracker::Tracker;
pub use user::User;
