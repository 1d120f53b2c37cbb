use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A proposed board: the numbers a player wants to play and for how long.
///
/// `week`/`year` are the ISO play-week; when omitted the backend fills in the
/// current week in its local timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDraftDto {
    /// ID of the user buying the board
    pub user_id: String,
    /// Declared board size (5-8); must match the number count
    pub size: i64,
    /// Chosen numbers, each in 1-16
    pub numbers: Vec<i64>,
    /// How many consecutive weeks to play (>= 1)
    pub weeks_purchased: i64,
    pub week: Option<u32>,
    pub year: Option<i32>,
}

/// The ledger side of a purchase request.
///
/// The charge amount is computed server-side from the price table; the client
/// only supplies the owner and an optional description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraftDto {
    /// ID of the user being charged; must match the board's user
    pub user_id: String,
    pub description: Option<String>,
}

/// Request body for POST /api/purchases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub board: BoardDraftDto,
    pub transaction: TransactionDraftDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDto {
    pub id: String,
    pub user_id: String,
    pub size: i64,
    pub numbers: Vec<i64>,
    pub week: u32,
    pub year: i32,
    pub weeks_purchased: i64,
    pub is_active: bool,
    pub won: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDto {
    pub id: String,
    pub user_id: String,
    /// Signed amount; purchases are negative
    pub amount: f64,
    pub pending: bool,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Response body for a successful purchase: the two records created as one
/// atomic unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseReceipt {
    pub board: BoardDto,
    pub transaction: TransactionDto,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub balance: f64,
}

/// Request body for POST /api/winning-boards (recording a draw)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinningBoardDraftDto {
    pub week: u32,
    pub year: i32,
    /// 3 or 5 unique numbers in 1-16
    pub numbers: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinningBoardDto {
    pub id: String,
    pub week: u32,
    pub year: i32,
    pub numbers: Vec<i64>,
}

/// One matched board paired with its owning user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerEntry {
    pub board: BoardDto,
    pub user: UserDto,
}

/// Response body for GET /api/winning-boards/:id/winners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnersResponse {
    pub winning_board: WinningBoardDto,
    pub winners: Vec<WinnerEntry>,
}

/// Response body for POST /api/settlement/advance-week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummaryDto {
    /// Boards whose remaining weeks were decremented
    pub boards_decremented: u64,
    /// Boards deactivated because they ran out of weeks
    pub boards_retired: u64,
}

/// Uniform error body returned by the REST layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
