//! Winning boards and the winner-matching query.
use crate::db::DbConnection;
use crate::domain::models::{Board, NewWinningBoard, User, WinningBoard};
use crate::domain::rules::{MAX_NUMBER, MIN_NUMBER};
use crate::domain::users::UserStore;
use crate::errors::{DomainError, DomainResult};
use sqlx::Row;
use std::collections::BTreeSet;
use tracing::info;

pub struct WinnerService {
    db: DbConnection,
    users: UserStore,
}

impl WinnerService {
    pub fn new(db: DbConnection) -> Self {
        let users = UserStore::new(db.clone());
        Self { db, users }
    }

    /// Record one weekly draw: 3 or 5 unique numbers in 1-16. The record is
    /// immutable once written.
    pub async fn create_winning_board(&self, draft: NewWinningBoard) -> DomainResult<WinningBoard> {
        let unique: BTreeSet<i64> = draft.numbers.iter().copied().collect();
        if unique.len() != draft.numbers.len() {
            return Err(DomainError::RangeValidation(
                "winning numbers must be unique".to_string(),
            ));
        }
        if draft.numbers.len() != 3 && draft.numbers.len() != 5 {
            return Err(DomainError::RangeValidation(format!(
                "a draw has 3 or 5 winning numbers, got {}",
                draft.numbers.len()
            )));
        }
        for &number in &draft.numbers {
            if !(MIN_NUMBER..=MAX_NUMBER).contains(&number) {
                return Err(DomainError::RangeValidation(format!(
                    "winning number {} is outside {}-{}",
                    number, MIN_NUMBER, MAX_NUMBER
                )));
            }
        }

        let id = uuid::Uuid::new_v4().to_string();
        let mut scope = self.db.pool().begin().await?;

        sqlx::query("INSERT INTO winning_boards (id, week, year) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(draft.week as i64)
            .bind(draft.year as i64)
            .execute(&mut *scope)
            .await?;
        for &number in &draft.numbers {
            sqlx::query("INSERT INTO winning_numbers (winning_board_id, number) VALUES (?, ?)")
                .bind(&id)
                .bind(number)
                .execute(&mut *scope)
                .await?;
        }

        scope.commit().await?;

        info!("Recorded draw {} for week {}/{}", id, draft.week, draft.year);

        Ok(WinningBoard {
            id,
            week: draft.week,
            year: draft.year,
            numbers: draft.numbers,
        })
    }

    pub async fn get_winning_board(&self, winning_board_id: &str) -> DomainResult<WinningBoard> {
        if winning_board_id.trim().is_empty() {
            return Err(DomainError::InvalidRequest(
                "winning board id is required".to_string(),
            ));
        }

        let row = sqlx::query("SELECT id, week, year FROM winning_boards WHERE id = ?")
            .bind(winning_board_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| {
                DomainError::ResourceNotFound(format!(
                    "winning board {} does not exist",
                    winning_board_id
                ))
            })?;

        let numbers = sqlx::query("SELECT number FROM winning_numbers WHERE winning_board_id = ?")
            .bind(winning_board_id)
            .fetch_all(self.db.pool())
            .await?
            .iter()
            .map(|r| r.get::<i64, _>("number"))
            .collect();

        Ok(WinningBoard {
            id: row.get("id"),
            week: row.get::<i64, _>("week") as u32,
            year: row.get::<i64, _>("year") as i32,
            numbers,
        })
    }

    /// Every board whose chosen numbers contain all of the draw's numbers,
    /// each paired with its owning user.
    ///
    /// Matching is pure number containment: a board's own week/year play no
    /// part, and neither does its active flag. A draw with no numbers matches
    /// nothing. No ordering is guaranteed.
    pub async fn find_matching_boards(
        &self,
        winning_board_id: &str,
    ) -> DomainResult<Vec<(Board, User)>> {
        let winning = self.get_winning_board(winning_board_id).await?;

        let required: BTreeSet<i64> = winning.numbers.iter().copied().collect();
        if required.is_empty() {
            return Ok(Vec::new());
        }

        // Containment as a conjunction: one EXISTS clause per drawn number.
        let mut sql = String::from(
            "SELECT id, user_id, size, week, year, weeks_purchased, is_active, won FROM boards",
        );
        let mut separator = " WHERE";
        for _ in &required {
            sql.push_str(separator);
            sql.push_str(
                " EXISTS (SELECT 1 FROM board_numbers WHERE board_id = boards.id AND number = ?)",
            );
            separator = " AND";
        }

        let mut query = sqlx::query(&sql);
        for &number in &required {
            query = query.bind(number);
        }
        let rows = query.fetch_all(self.db.pool()).await?;

        let mut winners = Vec::with_capacity(rows.len());
        for row in rows {
            let board_id: String = row.get("id");
            let numbers = sqlx::query("SELECT number FROM board_numbers WHERE board_id = ?")
                .bind(&board_id)
                .fetch_all(self.db.pool())
                .await?
                .iter()
                .map(|r| r.get::<i64, _>("number"))
                .collect();

            let board = Board {
                id: board_id,
                user_id: row.get("user_id"),
                size: row.get("size"),
                numbers,
                week: row.get::<i64, _>("week") as u32,
                year: row.get::<i64, _>("year") as i32,
                weeks_purchased: row.get("weeks_purchased"),
                is_active: row.get("is_active"),
                won: row.get("won"),
            };
            let user = self.users.require_user(&board.user_id).await?;
            winners.push((board, user));
        }

        info!(
            "Draw {}: {} of the boards contain {:?}",
            winning.id,
            winners.len(),
            required
        );

        Ok(winners)
    }
}
