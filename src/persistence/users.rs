//! User persistence: account rows and balance access.

use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::types::Cents;

/// Row returned from DB (username is stored lowercase).
#[derive(FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub balance_cents: Cents,
}

/// Get a user by username (lowercase). For login.
pub async fn get_user_by_username(
    pool: &PgPool,
    username_lowercase: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password_hash, balance_cents FROM users WHERE username = $1",
    )
    .bind(username_lowercase)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Insert a user with a zero starting balance. Username must already be
/// lowercase.
pub async fn insert_user(
    pool: &PgPool,
    id: Uuid,
    username: &str,
    password_hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, username, password_hash, balance_cents) VALUES ($1, $2, $3, 0)",
    )
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .execute(pool)
    .await?;
    Ok(())
}

/// Current balance, outside any transaction (for GET /balance).
pub async fn get_balance(pool: &PgPool, user_id: Uuid) -> Result<Option<Cents>, sqlx::Error> {
    sqlx::query_scalar::<_, Cents>("SELECT balance_cents FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Balance read that locks the user row until the surrounding transaction
/// commits. Every check-then-mutate sequence goes through this so two
/// concurrent operations for one user cannot both validate against the
/// same stale balance.
pub async fn balance_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
) -> Result<Option<Cents>, sqlx::Error> {
    sqlx::query_scalar::<_, Cents>("SELECT balance_cents FROM users WHERE id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Write the new balance inside the same transaction as the lock.
pub async fn set_balance(
    conn: &mut PgConnection,
    user_id: Uuid,
    balance_cents: Cents,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET balance_cents = $1 WHERE id = $2")
        .bind(balance_cents)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
