//! Possession persistence: one row per (user, ticker).

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::types::possession::Possession;
use crate::types::ShareCount;

#[derive(Debug, sqlx::FromRow)]
pub struct PossessionRow {
    pub user_id: Uuid,
    pub ticker: String,
    pub amount: ShareCount,
}

impl PossessionRow {
    pub fn into_possession(self) -> Possession {
        Possession {
            user_id: self.user_id,
            ticker: self.ticker,
            amount: self.amount,
        }
    }
}

/// List a user's possessions for display (includes 0-amount rows).
pub async fn list_possessions_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<PossessionRow>, sqlx::Error> {
    sqlx::query_as::<_, PossessionRow>(
        "SELECT user_id, ticker, amount FROM possessions WHERE user_id = $1 ORDER BY ticker",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Distinct tickers the user has ever held (for the history ticker list).
pub async fn list_held_tickers(pool: &PgPool, user_id: Uuid) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT ticker FROM possessions WHERE user_id = $1 ORDER BY ticker",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Share amount with the possession row locked until the surrounding
/// transaction commits. `None` means the ticker was never held.
pub async fn amount_for_update(
    conn: &mut PgConnection,
    user_id: Uuid,
    ticker: &str,
) -> Result<Option<ShareCount>, sqlx::Error> {
    sqlx::query_scalar::<_, ShareCount>(
        "SELECT amount FROM possessions WHERE user_id = $1 AND ticker = $2 FOR UPDATE",
    )
    .bind(user_id)
    .bind(ticker)
    .fetch_optional(&mut *conn)
    .await
}

/// Upsert a possession (insert or update on conflict). A full sell-down
/// writes amount = 0 rather than deleting the row.
pub async fn upsert_possession(
    conn: &mut PgConnection,
    user_id: Uuid,
    ticker: &str,
    amount: ShareCount,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO possessions (user_id, ticker, amount) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (user_id, ticker) DO UPDATE SET amount = $3",
    )
    .bind(user_id)
    .bind(ticker)
    .bind(amount)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
