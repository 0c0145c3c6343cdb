use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row of the `users` table. The password is stored only as a bcrypt hash;
/// the plaintext never touches the database layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}
