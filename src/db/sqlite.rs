use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::db::models::User;
use crate::db::schema::SQLITE_INIT;
use crate::error::AppError;

pub type SqlitePool = Pool<Sqlite>;

/// Open (creating the database file if absent) and return a user store.
pub async fn connect(database_url: &str) -> Result<UserStorage, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    Ok(UserStorage::new(pool))
}

#[derive(Clone)]
pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), AppError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert a new user. A unique-constraint violation on `username` maps to
    /// `AppError::DuplicateUsername`; there is no SELECT-first existence
    /// check. Returns the new row id.
    pub async fn create_user(&self, username: &str, password_hash: &str) -> Result<i64, AppError> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES (?, ?)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.last_insert_rowid()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::DuplicateUsername)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    async fn temp_storage(tag: &str) -> (UserStorage, std::path::PathBuf) {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!(
            "policyseek-{tag}-{}-{}.sqlite",
            std::process::id(),
            nanos
        ));
        let storage = connect(&format!("sqlite:{}", path.display()))
            .await
            .expect("failed to open temp database");
        storage.init_schema().await.expect("schema init failed");
        (storage, path)
    }

    #[tokio::test]
    async fn create_then_find_round_trips() {
        let (storage, path) = temp_storage("create-find").await;

        let id = storage.create_user("alice", "hash-a").await.expect("insert");
        let user = storage
            .find_by_username("alice")
            .await
            .expect("lookup")
            .expect("user present");
        assert_eq!(user.id, id);
        assert_eq!(user.username, "alice");
        assert_eq!(user.password_hash, "hash-a");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_by_constraint() {
        let (storage, path) = temp_storage("duplicate").await;

        storage.create_user("bob", "hash-1").await.expect("insert");
        let err = storage
            .create_user("bob", "hash-2")
            .await
            .expect_err("second insert must fail");
        assert!(matches!(err, AppError::DuplicateUsername));

        // No second row was created.
        let user = storage
            .find_by_username("bob")
            .await
            .expect("lookup")
            .expect("user present");
        assert_eq!(user.password_hash, "hash-1");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn find_unknown_username_returns_none() {
        let (storage, path) = temp_storage("unknown").await;
        assert!(
            storage
                .find_by_username("nobody")
                .await
                .expect("lookup")
                .is_none()
        );
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn init_schema_is_idempotent() {
        let (storage, path) = temp_storage("idempotent").await;
        storage.init_schema().await.expect("second init");
        let _ = std::fs::remove_file(&path);
    }
}
