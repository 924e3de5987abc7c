//! User model.
//!
//! Identity resolution happens outside the engine; a user here is just
//! a stable `openid` key plus the materialized point balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    /// External identity key (unique).
    pub openid: String,
    pub nickname: Option<String>,
    /// Materialized balance; always equals the sum of the user's
    /// point-ledger deltas.
    pub points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
