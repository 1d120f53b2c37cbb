//! Weekly settlement sweep.
//!
//! One call represents one tick of real time: every board with remaining
//! weeks loses one, and boards that hit zero are retired. Deliberately not
//! idempotent; callers invoke it once per settlement period.
use crate::db::DbConnection;
use crate::errors::DomainResult;
use tracing::info;

/// What one sweep actually touched, for the caller's logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub boards_decremented: u64,
    pub boards_retired: u64,
}

pub struct SettlementService {
    db: DbConnection,
}

impl SettlementService {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    /// Advance every board by one week and retire the exhausted ones.
    ///
    /// Both mutations are single set-based UPDATE statements, never a
    /// read-modify-write loop, so a board inserted by a concurrent purchase
    /// either sees the whole sweep or none of it. The WHERE guard on the
    /// decrement also clamps at zero: no board ever goes negative.
    pub async fn advance_week(&self) -> DomainResult<SweepSummary> {
        let mut scope = self.db.pool().begin().await?;

        let decremented = sqlx::query(
            "UPDATE boards SET weeks_purchased = weeks_purchased - 1 WHERE weeks_purchased > 0",
        )
        .execute(&mut *scope)
        .await?
        .rows_affected();

        let retired = sqlx::query(
            "UPDATE boards SET is_active = 0 WHERE weeks_purchased = 0 AND is_active = 1",
        )
        .execute(&mut *scope)
        .await?
        .rows_affected();

        scope.commit().await?;

        info!(
            "Settlement sweep: {} board(s) decremented, {} retired",
            decremented, retired
        );

        Ok(SweepSummary {
            boards_decremented: decremented,
            boards_retired: retired,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    async fn setup() -> (DbConnection, SettlementService) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let service = SettlementService::new(db.clone());
        (db, service)
    }

    async fn insert_board(db: &DbConnection, id: &str, weeks_purchased: i64, is_active: bool) {
        sqlx::query(
            "INSERT INTO boards (id, user_id, size, week, year, weeks_purchased, is_active, won) VALUES (?, 'u-1', 5, 30, 2025, ?, ?, 0)",
        )
        .bind(id)
        .bind(weeks_purchased)
        .bind(is_active)
        .execute(db.pool())
        .await
        .unwrap();
    }

    async fn board_state(db: &DbConnection, id: &str) -> (i64, bool) {
        let row = sqlx::query("SELECT weeks_purchased, is_active FROM boards WHERE id = ?")
            .bind(id)
            .fetch_one(db.pool())
            .await
            .unwrap();
        (row.get("weeks_purchased"), row.get("is_active"))
    }

    #[tokio::test]
    async fn every_board_with_remaining_weeks_is_decremented() {
        let (db, service) = setup().await;
        insert_board(&db, "b-3", 3, true).await;
        insert_board(&db, "b-1", 1, true).await;
        insert_board(&db, "b-5", 5, true).await;

        let summary = service.advance_week().await.unwrap();

        assert_eq!(summary.boards_decremented, 3);
        assert_eq!(board_state(&db, "b-3").await, (2, true));
        assert_eq!(board_state(&db, "b-5").await, (4, true));
    }

    #[tokio::test]
    async fn boards_that_reach_zero_are_retired() {
        let (db, service) = setup().await;
        insert_board(&db, "b-last", 1, true).await;
        insert_board(&db, "b-more", 2, true).await;

        let summary = service.advance_week().await.unwrap();

        assert_eq!(summary.boards_retired, 1);
        assert_eq!(board_state(&db, "b-last").await, (0, false));
        assert_eq!(board_state(&db, "b-more").await, (1, true));
    }

    #[tokio::test]
    async fn exhausted_boards_never_go_negative() {
        let (db, service) = setup().await;
        insert_board(&db, "b-last", 1, true).await;

        service.advance_week().await.unwrap();
        assert_eq!(board_state(&db, "b-last").await, (0, false));

        // Second tick: nothing left to decrement or retire.
        let summary = service.advance_week().await.unwrap();
        assert_eq!(summary.boards_decremented, 0);
        assert_eq!(summary.boards_retired, 0);
        assert_eq!(board_state(&db, "b-last").await, (0, false));
    }

    #[tokio::test]
    async fn two_ticks_take_two_weeks_off() {
        let (db, service) = setup().await;
        insert_board(&db, "b-3", 3, true).await;

        service.advance_week().await.unwrap();
        service.advance_week().await.unwrap();

        assert_eq!(board_state(&db, "b-3").await, (1, true));
    }

    #[tokio::test]
    async fn sweep_on_an_empty_table_is_a_no_op() {
        let (_db, service) = setup().await;

        let summary = service.advance_week().await.unwrap();
        assert_eq!(summary.boards_decremented, 0);
        assert_eq!(summary.boards_retired, 0);
    }

    #[tokio::test]
    async fn already_inactive_exhausted_boards_are_left_alone() {
        let (db, service) = setup().await;
        insert_board(&db, "b-done", 0, false).await;

        let summary = service.advance_week().await.unwrap();
        assert_eq!(summary.boards_decremented, 0);
        assert_eq!(summary.boards_retired, 0);
        assert_eq!(board_state(&db, "b-done").await, (0, false));
    }
}
