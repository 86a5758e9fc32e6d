//! Transaction persistence: append on commit, list for display and replay.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool};
use uuid::Uuid;

use crate::types::transaction::{Transaction, TransactionKind};

#[derive(Debug, FromRow)]
pub struct TransactionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ticker: Option<String>,
    pub kind: String,
    pub amount: i64,
    pub price_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Convert a row to a `Transaction`. Rows with an unrecognized kind tag
/// are skipped rather than guessed at.
pub fn transaction_row_to_transaction(row: &TransactionRow) -> Option<Transaction> {
    let kind = TransactionKind::from_tag(&row.kind)?;
    Some(Transaction {
        id: row.id,
        user_id: row.user_id,
        ticker: row.ticker.clone(),
        kind,
        amount: row.amount,
        price_cents: row.price_cents,
        created_at: row.created_at,
    })
}

/// Append one record inside the same transaction as the balance and
/// possession writes it describes.
pub async fn insert_transaction(
    conn: &mut PgConnection,
    tx: &Transaction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO transactions (id, user_id, ticker, kind, amount, price_cents, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(tx.id)
    .bind(tx.user_id)
    .bind(tx.ticker.as_deref())
    .bind(tx.kind.as_tag())
    .bind(tx.amount)
    .bind(tx.price_cents)
    .bind(tx.created_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// List a user's transactions, most recent first (for display).
pub async fn list_transactions_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        "SELECT id, user_id, ticker, kind, amount, price_cents, created_at \
         FROM transactions WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().filter_map(transaction_row_to_transaction).collect())
}

/// BUY/SELL legs for one ticker in chronological order, the canonical
/// replay order for the history reconstructor.
pub async fn list_trades_for_ticker(
    pool: &PgPool,
    user_id: Uuid,
    ticker: &str,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        "SELECT id, user_id, ticker, kind, amount, price_cents, created_at \
         FROM transactions \
         WHERE user_id = $1 AND ticker = $2 AND kind IN ('BUY', 'SELL') \
         ORDER BY created_at ASC",
    )
    .bind(user_id)
    .bind(ticker)
    .fetch_all(pool)
    .await?;
    Ok(rows.iter().filter_map(transaction_row_to_transaction).collect())
}

/// Get one transaction owned by the user.
pub async fn get_transaction(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<Option<Transaction>, sqlx::Error> {
    let row = sqlx::query_as::<_, TransactionRow>(
        "SELECT id, user_id, ticker, kind, amount, price_cents, created_at \
         FROM transactions WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.as_ref().and_then(transaction_row_to_transaction))
}

/// Delete a transaction owned by the user. Returns whether a row was
/// removed. Does not touch balance or possessions.
pub async fn delete_transaction(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
