use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:boardlottery.db";

/// Schema statements, applied in order on startup. SQLite CHECK constraints
/// back up the invariants the domain layer enforces: a board row can never
/// carry an unpriced size or a negative week count.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        balance REAL NOT NULL DEFAULT 0
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        amount REAL NOT NULL,
        pending INTEGER NOT NULL DEFAULT 0,
        description TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS boards (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        size INTEGER NOT NULL CHECK (size BETWEEN 5 AND 8),
        week INTEGER NOT NULL,
        year INTEGER NOT NULL,
        weeks_purchased INTEGER NOT NULL CHECK (weeks_purchased >= 0),
        is_active INTEGER NOT NULL DEFAULT 1,
        won INTEGER NOT NULL DEFAULT 0
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS board_numbers (
        board_id TEXT NOT NULL,
        number INTEGER NOT NULL
    );
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_board_numbers_board
        ON board_numbers (board_id, number);
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS winning_boards (
        id TEXT PRIMARY KEY,
        week INTEGER NOT NULL,
        year INTEGER NOT NULL
    );
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS winning_numbers (
        winning_board_id TEXT NOT NULL,
        number INTEGER NOT NULL
    );
    "#,
];

/// DbConnection manages database operations
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        // Connect to the database
        let pool = SqlitePool::connect(url).await?;

        // Setup database schema
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize the standard database
    pub async fn init() -> Result<Self> {
        Self::new(DATABASE_URL).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Generate a unique database name for tests
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &*self.pool
    }
}
