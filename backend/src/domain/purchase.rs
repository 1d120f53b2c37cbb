//! Purchase orchestration: one board and its charge, created as one unit.
use crate::db::DbConnection;
use crate::domain::models::{Board, LedgerTransaction, NewBoard, NewTransaction};
use crate::domain::prices;
use crate::domain::rules::PurchaseRules;
use crate::domain::users::UserStore;
use crate::domain::window;
use crate::errors::{DomainError, DomainResult};
use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use shared::PurchaseRequest;
use tracing::info;

pub struct PurchaseService {
    db: DbConnection,
    rules: PurchaseRules,
    timezone: Tz,
}

impl PurchaseService {
    pub fn new(db: DbConnection) -> Self {
        let users = UserStore::new(db.clone());
        Self {
            db,
            rules: PurchaseRules::new(users),
            timezone: window::DEFAULT_TIMEZONE,
        }
    }

    #[cfg(test)]
    pub fn with_timezone(db: DbConnection, timezone: Tz) -> Self {
        let mut service = Self::new(db);
        service.timezone = timezone;
        service
    }

    /// Full purchase path for an inbound request: blackout window, then
    /// business rules, then the atomic write. `now` is passed in explicitly
    /// so the window decision is deterministic under test.
    pub async fn purchase(
        &self,
        request: PurchaseRequest,
        now: DateTime<Utc>,
    ) -> DomainResult<(Board, LedgerTransaction)> {
        window::ensure_allowed(now, self.timezone)?;

        let local = now.with_timezone(&self.timezone);
        let week = request.board.week.unwrap_or_else(|| local.iso_week().week());
        let year = request.board.year.unwrap_or_else(|| local.iso_week().year());

        let board = NewBoard {
            user_id: request.board.user_id,
            size: request.board.size,
            numbers: request.board.numbers,
            week,
            year,
            weeks_purchased: request.board.weeks_purchased,
        };
        let mut transaction = NewTransaction {
            user_id: request.transaction.user_id,
            // priced below, once the pair has passed validation
            amount: 0.0,
            description: request.transaction.description.unwrap_or_else(|| {
                format!(
                    "Board purchase: size {}, {} week(s)",
                    board.size, board.weeks_purchased
                )
            }),
        };

        self.rules.validate(&board, &transaction).await?;
        transaction.amount = prices::purchase_amount(board.size, board.weeks_purchased)?;

        self.process_purchase(board, transaction, now).await
    }

    /// The atomicity contract of the engine: the transaction record and the
    /// board record are written inside one storage transaction; if either
    /// insert fails the whole scope rolls back and the original error
    /// propagates. Assumes the pair was validated by `PurchaseRules`; only
    /// structural checks happen here.
    pub async fn process_purchase(
        &self,
        board: NewBoard,
        transaction: NewTransaction,
        now: DateTime<Utc>,
    ) -> DomainResult<(Board, LedgerTransaction)> {
        if board.user_id.trim().is_empty() || transaction.user_id.trim().is_empty() {
            return Err(DomainError::InvalidRequest("user id is required".to_string()));
        }

        let transaction_id = uuid::Uuid::new_v4().to_string();
        let board_id = uuid::Uuid::new_v4().to_string();

        let mut scope = self.db.pool().begin().await?;

        sqlx::query(
            "INSERT INTO transactions (id, user_id, amount, pending, description, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&transaction_id)
        .bind(&transaction.user_id)
        .bind(transaction.amount)
        .bind(false)
        .bind(&transaction.description)
        .bind(now)
        .execute(&mut *scope)
        .await?;

        sqlx::query(
            "INSERT INTO boards (id, user_id, size, week, year, weeks_purchased, is_active, won) VALUES (?, ?, ?, ?, ?, ?, 1, 0)",
        )
        .bind(&board_id)
        .bind(&board.user_id)
        .bind(board.size)
        .bind(board.week as i64)
        .bind(board.year as i64)
        .bind(board.weeks_purchased)
        .execute(&mut *scope)
        .await?;

        for &number in &board.numbers {
            sqlx::query("INSERT INTO board_numbers (board_id, number) VALUES (?, ?)")
                .bind(&board_id)
                .bind(number)
                .execute(&mut *scope)
                .await?;
        }

        // Any failure above drops `scope`, which rolls the whole unit back.
        scope.commit().await?;

        info!(
            "Purchase committed: board {} ({} numbers, {} week(s)) and transaction {} ({}) for user {}",
            board_id,
            board.numbers.len(),
            board.weeks_purchased,
            transaction_id,
            transaction.amount,
            board.user_id
        );

        let stored_board = Board {
            id: board_id,
            user_id: board.user_id,
            size: board.size,
            numbers: board.numbers,
            week: board.week,
            year: board.year,
            weeks_purchased: board.weeks_purchased,
            is_active: true,
            won: false,
        };
        let stored_transaction = LedgerTransaction {
            id: transaction_id,
            user_id: transaction.user_id,
            amount: transaction.amount,
            pending: false,
            description: transaction.description,
            created_at: now,
        };

        Ok((stored_board, stored_transaction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::users::UserStore;
    use chrono::TimeZone;
    use shared::{BoardDraftDto, TransactionDraftDto};
    use sqlx::Row;

    async fn setup() -> (DbConnection, PurchaseService) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        UserStore::new(db.clone()).create_user("u-1", "Anna", 500.0).await.unwrap();
        let service = PurchaseService::new(db.clone());
        (db, service)
    }

    // A Wednesday afternoon, well clear of the blackout window.
    fn open_window() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 9, 12, 0, 0).unwrap()
    }

    fn request(size: i64, numbers: Vec<i64>, weeks: i64) -> PurchaseRequest {
        PurchaseRequest {
            board: BoardDraftDto {
                user_id: "u-1".to_string(),
                size,
                numbers,
                weeks_purchased: weeks,
                week: Some(28),
                year: Some(2025),
            },
            transaction: TransactionDraftDto {
                user_id: "u-1".to_string(),
                description: None,
            },
        }
    }

    async fn count(db: &DbConnection, table: &str) -> i64 {
        sqlx::query(&format!("SELECT COUNT(*) AS n FROM {}", table))
            .fetch_one(db.pool())
            .await
            .unwrap()
            .get("n")
    }

    #[tokio::test]
    async fn size_five_board_costs_twenty_per_week() {
        let (db, service) = setup().await;

        let (board, transaction) = service
            .purchase(request(5, vec![1, 2, 3, 4, 5], 1), open_window())
            .await
            .unwrap();

        assert_eq!(transaction.amount, -20.0);
        assert_eq!(board.user_id, transaction.user_id);
        assert!(board.is_active);
        assert!(!board.won);
        assert_eq!(count(&db, "boards").await, 1);
        assert_eq!(count(&db, "transactions").await, 1);
        assert_eq!(count(&db, "board_numbers").await, 5);
    }

    #[tokio::test]
    async fn stored_rows_match_the_returned_records() {
        let (db, service) = setup().await;

        let (board, transaction) = service
            .purchase(request(6, vec![2, 4, 6, 8, 10, 12], 2), open_window())
            .await
            .unwrap();

        let board_row = sqlx::query("SELECT user_id, size, weeks_purchased, is_active FROM boards WHERE id = ?")
            .bind(&board.id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(board_row.get::<String, _>("user_id"), "u-1");
        assert_eq!(board_row.get::<i64, _>("size"), 6);
        assert_eq!(board_row.get::<i64, _>("weeks_purchased"), 2);
        assert!(board_row.get::<bool, _>("is_active"));

        let tx_row = sqlx::query("SELECT amount, pending FROM transactions WHERE id = ?")
            .bind(&transaction.id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(tx_row.get::<f64, _>("amount"), -80.0);
        assert!(!tx_row.get::<bool, _>("pending"));
    }

    #[tokio::test]
    async fn failed_board_insert_rolls_back_the_transaction_record() {
        let (db, service) = setup().await;

        // Bypass the rules on purpose: size 99 passes no validation here and
        // trips the boards CHECK constraint after the ledger insert succeeded.
        let board = NewBoard {
            user_id: "u-1".to_string(),
            size: 99,
            numbers: vec![1, 2, 3],
            week: 28,
            year: 2025,
            weeks_purchased: 1,
        };
        let transaction = NewTransaction {
            user_id: "u-1".to_string(),
            amount: -20.0,
            description: "doomed".to_string(),
        };

        let result = service.process_purchase(board, transaction, open_window()).await;
        assert!(result.is_err());

        // Neither record may survive: no charge without a board.
        assert_eq!(count(&db, "transactions").await, 0);
        assert_eq!(count(&db, "boards").await, 0);
        assert_eq!(count(&db, "board_numbers").await, 0);
    }

    #[tokio::test]
    async fn validation_failures_happen_before_any_write() {
        let (db, service) = setup().await;

        // 4 numbers on a size-5 board
        let result = service.purchase(request(5, vec![1, 2, 3, 4], 1), open_window()).await;
        assert!(matches!(result, Err(DomainError::RangeValidation(_))));

        assert_eq!(count(&db, "transactions").await, 0);
        assert_eq!(count(&db, "boards").await, 0);
    }

    #[tokio::test]
    async fn oversized_multi_week_charge_is_rejected_before_write() {
        let (db, service) = setup().await;

        // size 8 at 160 for 7 weeks prices at -1120
        let result = service
            .purchase(request(8, vec![1, 2, 3, 4, 5, 6, 7, 8], 7), open_window())
            .await;
        assert!(matches!(result, Err(DomainError::RangeValidation(_))));
        assert_eq!(count(&db, "transactions").await, 0);
    }

    #[tokio::test]
    async fn purchases_inside_the_blackout_window_are_refused() {
        let (db, service) = setup().await;

        // Saturday 18:00 in Copenhagen (16:00 UTC in July)
        let saturday_evening = Utc.with_ymd_and_hms(2025, 7, 5, 16, 0, 0).unwrap();
        let result = service.purchase(request(5, vec![1, 2, 3, 4, 5], 1), saturday_evening).await;

        assert!(matches!(result, Err(DomainError::PurchaseNotAllowed(_))));
        assert_eq!(count(&db, "boards").await, 0);
    }

    #[tokio::test]
    async fn window_follows_the_configured_timezone() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        UserStore::new(db.clone()).create_user("u-1", "Anna", 500.0).await.unwrap();
        let service = PurchaseService::with_timezone(db, chrono_tz::UTC);

        // 15:30 UTC on a Saturday: blocked in Copenhagen, open under UTC
        let now = Utc.with_ymd_and_hms(2025, 7, 5, 15, 30, 0).unwrap();
        let result = service.purchase(request(5, vec![1, 2, 3, 4, 5], 1), now).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_week_defaults_to_the_current_iso_week() {
        let (_db, service) = setup().await;

        let mut req = request(5, vec![1, 2, 3, 4, 5], 1);
        req.board.week = None;
        req.board.year = None;

        // 2025-07-09 falls in ISO week 28
        let (board, _) = service.purchase(req, open_window()).await.unwrap();
        assert_eq!(board.week, 28);
        assert_eq!(board.year, 2025);
    }

    #[tokio::test]
    async fn repeated_numbers_are_stored_as_chosen() {
        let (db, service) = setup().await;

        let (board, _) = service
            .purchase(request(5, vec![7, 7, 7, 7, 7], 1), open_window())
            .await
            .unwrap();

        let rows = sqlx::query("SELECT number FROM board_numbers WHERE board_id = ?")
            .bind(&board.id)
            .fetch_all(db.pool())
            .await
            .unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.get::<i64, _>("number") == 7));
    }
}
