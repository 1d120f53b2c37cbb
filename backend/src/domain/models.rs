//! Domain models for the purchase and settlement engine.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A purchased board: a set of chosen numbers plus remaining play-weeks.
///
/// Only the settlement sweep ever mutates a board after creation; the winner
/// matcher is read-only. `won` is reserved for a future settlement step and
/// is never written by the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub user_id: String,
    pub size: i64,
    pub numbers: Vec<i64>,
    /// ISO play-week this board was bought for
    pub week: u32,
    pub year: i32,
    /// Remaining consecutive play-weeks; 0 means exhausted
    pub weeks_purchased: i64,
    pub is_active: bool,
    pub won: bool,
}

/// A board as proposed by a purchase, before any record exists.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBoard {
    pub user_id: String,
    pub size: i64,
    pub numbers: Vec<i64>,
    pub week: u32,
    pub year: i32,
    pub weeks_purchased: i64,
}

/// A ledger entry. Purchases carry a negative amount; the record is immutable
/// once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTransaction {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub pending: bool,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A ledger entry as proposed by a purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub user_id: String,
    pub amount: f64,
    pub description: String,
}

/// One weekly draw: 3 or 5 unique winning numbers. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinningBoard {
    pub id: String,
    pub week: u32,
    pub year: i32,
    pub numbers: Vec<i64>,
}

/// A draw as proposed, before any record exists.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWinningBoard {
    pub week: u32,
    pub year: i32,
    pub numbers: Vec<i64>,
}

/// External collaborator entity; the engine only reads users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub balance: f64,
}
