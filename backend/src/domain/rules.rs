//! Purchase validation rules.
//!
//! Every check here runs before any write. The checks are ordered and fail
//! fast on the first violation, so callers always see the most fundamental
//! problem first. Missing request bodies never reach this module; they are
//! rejected at deserialization in the REST layer.
use crate::domain::models::{NewBoard, NewTransaction};
use crate::domain::prices;
use crate::domain::users::UserStore;
use crate::errors::{DomainError, DomainResult};

pub const MIN_NUMBER: i64 = 1;
pub const MAX_NUMBER: i64 = 16;

pub struct PurchaseRules {
    users: UserStore,
}

impl PurchaseRules {
    pub fn new(users: UserStore) -> Self {
        Self { users }
    }

    /// Validate a proposed (board, transaction) pair. Read-only: the only
    /// collaborator consulted is the user store.
    pub async fn validate(&self, board: &NewBoard, transaction: &NewTransaction) -> DomainResult<()> {
        // Owner ids: both present, and the charge lands on the board's owner
        if board.user_id.trim().is_empty() || transaction.user_id.trim().is_empty() {
            return Err(DomainError::InvalidRequest("user id is required".to_string()));
        }
        if board.user_id != transaction.user_id {
            return Err(DomainError::RangeValidation(format!(
                "board user {} does not match transaction user {}",
                board.user_id, transaction.user_id
            )));
        }

        if !self.users.user_exists(&board.user_id).await? {
            return Err(DomainError::ResourceNotFound(format!(
                "user {} does not exist",
                board.user_id
            )));
        }

        let price = prices::unit_price(board.size)?;
        if price <= 0.0 {
            return Err(DomainError::RangeValidation(format!(
                "board size {} has no positive price",
                board.size
            )));
        }

        if board.weeks_purchased <= 0 {
            return Err(DomainError::RangeValidation(format!(
                "weeks purchased must be at least 1, got {}",
                board.weeks_purchased
            )));
        }

        if board.numbers.is_empty() {
            return Err(DomainError::InvalidRequest("board has no numbers".to_string()));
        }
        if board.numbers.len() as i64 != board.size {
            return Err(DomainError::RangeValidation(format!(
                "board size {} but {} numbers chosen",
                board.size,
                board.numbers.len()
            )));
        }

        for &number in &board.numbers {
            if !(MIN_NUMBER..=MAX_NUMBER).contains(&number) {
                return Err(DomainError::RangeValidation(format!(
                    "number {} is outside {}-{}",
                    number, MIN_NUMBER, MAX_NUMBER
                )));
            }
        }

        let amount = prices::purchase_amount(board.size, board.weeks_purchased)?;
        if amount < -prices::MAX_PURCHASE_DEBIT {
            return Err(DomainError::RangeValidation(format!(
                "purchase amount {} exceeds the {} limit",
                amount,
                -prices::MAX_PURCHASE_DEBIT
            )));
        }

        Ok(())
    }
}
